/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Crypto Engine Emulator crypto library.

--*/

mod ecdsa;
mod gcm;
mod keccak_sponge;
mod modexp;
mod sha_block;

pub use ecdsa::{EccCurve, EccError, Ecdsa};
pub use gcm::{AesGcm, AES_GCM_IV_SIZE, AES_GCM_TAG_SIZE};
pub use keccak_sponge::{KeccakSponge, Sha3Mode};
pub use modexp::ModExp;
pub use sha_block::{Sha2Block, Sha2Mode};
