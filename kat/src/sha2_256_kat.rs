/*++

Licensed under the Apache-2.0 license.

File Name:

    sha2_256_kat.rs

Abstract:

    File contains the Known Answer Tests (KAT) for SHA2-256 cryptography operations.

--*/

use cryptoeng_drivers::{HwAccess, ShaMode, ShaState};
use cryptoeng_error::{CryptoError, CryptoResult};

use crate::kats_env::{expect_eq, kat_gate, KatsEnv, KAT_OWNER};
use crate::KAT_MESSAGE;

const EXPECTED_DIGEST: [u8; 32] = [
    0x03, 0xfb, 0xa3, 0xbb, 0x9b, 0x90, 0xbb, 0x5f, 0xf1, 0x07, 0xc0, 0x43, 0x63, 0xf7, 0x99, 0x34,
    0xec, 0xe9, 0x56, 0xb2, 0x3c, 0xfa, 0x13, 0xc7, 0xdf, 0x79, 0xb9, 0xfe, 0x5d, 0x1d, 0xad, 0x3b,
];

#[derive(Default, Debug)]
pub struct Sha2_256Kat {}

impl Sha2_256Kat {
    /// This function executes the Known Answer Tests (aka KAT) for SHA2-256.
    ///
    /// # Arguments
    ///
    /// * `env` - Engines and scratch memory
    ///
    /// # Returns
    ///
    /// * `CryptoResult` - Result denoting the KAT outcome.
    pub fn execute<H: HwAccess>(&self, env: &mut KatsEnv<H>) -> CryptoResult<()> {
        if env.sha2.state() == ShaState::Uninitialized {
            env.sha2.init(env.hal, KAT_OWNER)?;
        }
        env.scoped(|env| {
            let addr = env.put(0, &KAT_MESSAGE)?;
            let mut digest = [0u8; 32];
            env.sha2.digest(
                env.hal,
                kat_gate(),
                KAT_OWNER,
                ShaMode::Sha256,
                addr,
                KAT_MESSAGE.len() as u32,
                &mut digest,
            )?;
            expect_eq(
                &digest,
                &EXPECTED_DIGEST,
                CryptoError::KAT_SHA2_256_DIGEST_MISMATCH,
            )
        })
    }
}
