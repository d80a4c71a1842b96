/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the crypto engine driver library.

--*/

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod reg;

mod aes;
mod arbiter;
mod config;
mod ecdsa;
mod hal;
mod kat_status;
mod key_policy;
mod layout;
pub mod printer;
mod rsa;
mod sha;
pub mod wait;

pub use aes::{
    dpa_cm_fused_off, AesDataParams, AesDirection, AesEngine, AesKeySize, AesOpParams, AesState,
    DpaCmRun, KekDecryptParams, AES_BLOCK_SIZE,
};
pub use arbiter::{Claim, EngineSlot, OwnerId};
pub use config::{DriverConfig, DMA_MAX_TRANSFER_BYTES, MAX_POLLS};
pub use cryptoeng_error::{CryptoError, CryptoResult, ErrorKind};
pub use ecdsa::{Curve, CurveSet, EcdsaEngine, EcdsaSignParams, EcdsaVerifyParams, ECC_MAX_SIZE};
pub use hal::{Addr, DmaChannel, DmaXfer, HwAccess};
pub use kat_status::{KatGate, KatId, KatStatusRegistry, SelfTestToken};
pub use key_policy::{AesKeySrc, KeyClearTarget, KeySourcePolicy, KEY_POLICY};
pub use layout::{copy_with_layout, Layout};
pub use rsa::{RsaDirection, RsaEngine, RsaExponent, RsaKeySize, RsaParams, RSA_MAX_SIZE};
pub use sha::{
    ShaEngine, ShaKind, ShaMode, ShaState, SHA_MAX_BLOCK_SIZE, SHA_MAX_DIGEST_SIZE,
};
