/*++

Licensed under the Apache-2.0 license.

File Name:

    sha3_kat.rs

Abstract:

    File contains the Known Answer Tests (KAT) for SHA3 cryptography operations.

--*/

use cryptoeng_drivers::{HwAccess, ShaMode, ShaState, SHA_MAX_DIGEST_SIZE};
use cryptoeng_error::{CryptoError, CryptoResult};

use crate::kats_env::{expect_eq, kat_gate, KatsEnv, KAT_OWNER};
use crate::KAT_MESSAGE;

const EXPECTED_SHA3_256_DIGEST: [u8; 32] = [
    0xbc, 0x64, 0xdc, 0xbb, 0x66, 0xdd, 0x08, 0xa5, 0xc1, 0x11, 0xe6, 0xb3, 0x55, 0x60, 0xf1, 0xc3,
    0x3e, 0x6d, 0xe8, 0x6a, 0x15, 0xdf, 0x6c, 0xf3, 0xa5, 0xd1, 0xb4, 0x31, 0xc0, 0x67, 0x5c, 0xdd,
];

const EXPECTED_SHA3_384_DIGEST: [u8; 48] = [
    0xff, 0x4e, 0x69, 0xa1, 0x4c, 0xbc, 0xbd, 0x93, 0xbe, 0xaa, 0xb1, 0xc4, 0x7f, 0x57, 0x8b, 0x34,
    0x6d, 0x54, 0x88, 0x93, 0xad, 0xed, 0x45, 0xa3, 0x5f, 0xe1, 0xca, 0x65, 0xb4, 0x56, 0x40, 0x1e,
    0xc0, 0x40, 0xe5, 0x67, 0xd1, 0x61, 0x20, 0xdd, 0x9c, 0x45, 0x89, 0x72, 0x5c, 0x58, 0xbf, 0x02,
];

#[derive(Default, Debug)]
pub struct Sha3_256Kat {}

impl Sha3_256Kat {
    /// This function executes the Known Answer Tests (aka KAT) for SHA3-256.
    ///
    /// # Arguments
    ///
    /// * `env` - Engines and scratch memory
    ///
    /// # Returns
    ///
    /// * `CryptoResult` - Result denoting the KAT outcome.
    pub fn execute<H: HwAccess>(&self, env: &mut KatsEnv<H>) -> CryptoResult<()> {
        sha3_kat(
            env,
            ShaMode::Sha3_256,
            &EXPECTED_SHA3_256_DIGEST,
            CryptoError::KAT_SHA3_256_DIGEST_MISMATCH,
        )
    }
}

#[derive(Default, Debug)]
pub struct Sha3_384Kat {}

impl Sha3_384Kat {
    /// This function executes the Known Answer Tests (aka KAT) for SHA3-384.
    ///
    /// # Arguments
    ///
    /// * `env` - Engines and scratch memory
    ///
    /// # Returns
    ///
    /// * `CryptoResult` - Result denoting the KAT outcome.
    pub fn execute<H: HwAccess>(&self, env: &mut KatsEnv<H>) -> CryptoResult<()> {
        sha3_kat(
            env,
            ShaMode::Sha3_384,
            &EXPECTED_SHA3_384_DIGEST,
            CryptoError::KAT_SHA3_384_DIGEST_MISMATCH,
        )
    }
}

fn sha3_kat<H: HwAccess>(
    env: &mut KatsEnv<H>,
    mode: ShaMode,
    expected: &[u8],
    mismatch: CryptoError,
) -> CryptoResult<()> {
    if env.sha3.state() == ShaState::Uninitialized {
        env.sha3.init(env.hal, KAT_OWNER)?;
    }
    env.scoped(|env| {
        let addr = env.put(0, &KAT_MESSAGE)?;
        let mut digest = [0u8; SHA_MAX_DIGEST_SIZE];
        let len = env.sha3.digest(
            env.hal,
            kat_gate(),
            KAT_OWNER,
            mode,
            addr,
            KAT_MESSAGE.len() as u32,
            &mut digest,
        )?;
        if len != expected.len() {
            Err(mismatch)?;
        }
        expect_eq(&digest[..len], expected, mismatch)
    })
}
