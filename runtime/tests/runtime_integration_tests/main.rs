// Licensed under the Apache-2.0 license

mod common;
mod test_aes;
mod test_ecdsa;
mod test_kat;
mod test_rsa;
mod test_sha;
