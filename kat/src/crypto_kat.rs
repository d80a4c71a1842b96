/*++

Licensed under the Apache-2.0 license.

File Name:

    crypto_kat.rs

Abstract:

    File contains function to execute all the Known Answer Tests (KAT) for cryptography operations.

--*/

use cryptoeng_drivers::{cprintln, HwAccess, KatId, KatStatusRegistry};
use cryptoeng_error::{CryptoError, CryptoResult};

use crate::kats_env::KatsEnv;
use crate::{
    Aes256GcmKat, AesDpaCmKat, EcdsaKat, RsaPubEncKat, Sha2_256Kat, Sha3_256Kat, Sha3_384Kat,
};

/// Status bits covered by the AES-GCM test
const AES_GCM: KatId =
    KatId::from_bits_truncate(KatId::AES_ENCRYPT.bits() | KatId::AES_DECRYPT.bits());

/// Status bits covered by the ECDSA test
const ECDSA: KatId =
    KatId::from_bits_truncate(KatId::ECDSA_SIGN.bits() | KatId::ECDSA_VERIFY.bits());

/// Every test, in execution order
const GROUPS: [KatId; 8] = [
    KatId::SHA2_256,
    KatId::SHA3_256,
    KatId::SHA3_384,
    AES_GCM,
    KatId::AES_DPA_CM,
    KatId::RSA_PUB_ENC,
    KatId::RSA_PRIV_DEC,
    ECDSA,
];

#[derive(Default, Debug)]
pub struct CryptoKat {}

impl CryptoKat {
    /// This function executes all the Known Answer Tests (aka KAT).
    ///
    /// Every status bit is cleared first. The tests then run in order and
    /// each one sets its bits once it passed. The first failure stops the run.
    /// Tests the device can't run (countermeasure fused off, test not built)
    /// are skipped and leave their bits clear.
    ///
    /// # Arguments
    ///
    /// * `env` - Engines and scratch memory
    /// * `registry` - Self test status
    ///
    /// # Returns
    ///
    /// * `CryptoResult` - Status bits set after the run.
    pub fn execute<H: HwAccess>(
        &self,
        env: &mut KatsEnv<H>,
        registry: &mut KatStatusRegistry,
    ) -> CryptoResult<KatId> {
        registry.clear(KatId::all())?;
        for group in GROUPS {
            self.run_group(env, registry, group)?;
        }
        registry.bits()
    }

    /// Execute the tests covering any bit of `id`.
    ///
    /// # Returns
    ///
    /// * `KAT_INVALID_ID` if `id` is empty
    /// * `CryptoResult` - Status bits set after the run.
    pub fn execute_selected<H: HwAccess>(
        &self,
        env: &mut KatsEnv<H>,
        registry: &mut KatStatusRegistry,
        id: KatId,
    ) -> CryptoResult<KatId> {
        if id.is_empty() {
            Err(CryptoError::KAT_INVALID_ID)?;
        }
        for group in GROUPS.into_iter().filter(|g| g.intersects(id)) {
            self.run_group(env, registry, group)?;
        }
        registry.bits()
    }

    fn run_group<H: HwAccess>(
        &self,
        env: &mut KatsEnv<H>,
        registry: &mut KatStatusRegistry,
        group: KatId,
    ) -> CryptoResult<()> {
        registry.clear(group)?;
        match dispatch(env, group) {
            Ok(true) => {
                registry.set(group)?;
                cprintln!("[kat] 0x{:X} passed", group.bits());
                Ok(())
            }
            Ok(false) => {
                cprintln!("[kat] 0x{:X} skipped", group.bits());
                Ok(())
            }
            Err(e) => {
                cprintln!("[kat] 0x{:X} failed 0x{:08X}", group.bits(), u32::from(e));
                Err(e)
            }
        }
    }
}

/// Run the test of `group`. `Ok(false)` means it can't run on this device.
fn dispatch<H: HwAccess>(env: &mut KatsEnv<H>, group: KatId) -> CryptoResult<bool> {
    match group {
        KatId::SHA2_256 => Sha2_256Kat::default().execute(env)?,
        KatId::SHA3_256 => Sha3_256Kat::default().execute(env)?,
        KatId::SHA3_384 => Sha3_384Kat::default().execute(env)?,
        AES_GCM => Aes256GcmKat::default().execute(env)?,
        KatId::AES_DPA_CM => match AesDpaCmKat::default().execute(env) {
            Err(CryptoError::AES_DPA_CM_NOT_SUPPORTED) => return Ok(false),
            other => other?,
        },
        KatId::RSA_PUB_ENC => RsaPubEncKat::default().execute(env)?,
        #[cfg(feature = "fips-self-test")]
        KatId::RSA_PRIV_DEC => crate::RsaPrivDecKat::default().execute(env)?,
        #[cfg(not(feature = "fips-self-test"))]
        KatId::RSA_PRIV_DEC => return Ok(false),
        ECDSA => EcdsaKat::default().execute(env)?,
        _ => Err(CryptoError::KAT_INVALID_ID)?,
    }
    Ok(true)
}
