/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the crypto engine Known Answer Tests.

--*/

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod aes256gcm_kat;
mod aes_dpa_cm_kat;
mod crypto_kat;
mod ecdsa_kat;
mod kats_env;
mod rsa_kat;
mod sha2_256_kat;
mod sha3_kat;

pub use aes256gcm_kat::Aes256GcmKat;
pub use aes_dpa_cm_kat::AesDpaCmKat;
pub use crypto_kat::CryptoKat;
pub use cryptoeng_drivers::{CryptoError, CryptoResult, KatId};
pub use ecdsa_kat::EcdsaKat;
pub use kats_env::{KatsEnv, KAT_SCRATCH_SIZE};
#[cfg(feature = "fips-self-test")]
pub use rsa_kat::RsaPrivDecKat;
pub use rsa_kat::RsaPubEncKat;
pub use sha2_256_kat::Sha2_256Kat;
pub use sha3_kat::{Sha3_256Kat, Sha3_384Kat};

/// Message hashed by the digest tests; the ECDSA test signs its SHA-384 digest
const KAT_MESSAGE: [u8; 32] = [
    0x2f, 0xbf, 0x02, 0x9e, 0xe9, 0xfb, 0xd6, 0x11, 0xc2, 0x4d, 0x81, 0x4e, 0x6a, 0xff, 0x26, 0x77,
    0xc3, 0x5a, 0x83, 0xbc, 0xe5, 0x63, 0x2c, 0xe7, 0x89, 0x43, 0x6c, 0x68, 0x82, 0xca, 0x1c, 0x71,
];
