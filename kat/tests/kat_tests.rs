/*++

Licensed under the Apache-2.0 license.

File Name:

    kat_tests.rs

Abstract:

    File contains test cases for the Known Answer Tests running on the engine
    model.

--*/

use cryptoeng_drivers::reg::efuse;
use cryptoeng_drivers::{
    Addr, AesDirection, AesEngine, AesKeySize, AesKeySrc, AesOpParams, CryptoError, DriverConfig,
    EcdsaEngine, KatGate, KatId, KatStatusRegistry, Layout, OwnerId, RsaEngine, ShaEngine, ShaKind,
    ShaMode,
};
use cryptoeng_emu_periph::EmuHal;
use cryptoeng_kat::{
    Aes256GcmKat, AesDpaCmKat, CryptoKat, EcdsaKat, KatsEnv, Sha3_384Kat, KAT_SCRATCH_SIZE,
};

const SCRATCH: Addr = 0x8000;
const USER_DATA: Addr = 0x2000;

struct Fixture {
    hal: EmuHal,
    aes: AesEngine,
    sha2: ShaEngine,
    sha3: ShaEngine,
    rsa: RsaEngine,
    ecdsa: EcdsaEngine,
    registry: KatStatusRegistry,
}

fn config() -> DriverConfig {
    DriverConfig {
        max_polls: 1_000,
        ..Default::default()
    }
}

impl Fixture {
    fn new() -> Self {
        Self::with_config(&config())
    }

    fn with_config(cfg: &DriverConfig) -> Self {
        Self {
            hal: EmuHal::new(),
            aes: AesEngine::new(cfg),
            sha2: ShaEngine::new(ShaKind::Sha2, cfg),
            sha3: ShaEngine::new(ShaKind::Sha3, cfg),
            rsa: RsaEngine::new(cfg),
            ecdsa: EcdsaEngine::new(cfg),
            registry: KatStatusRegistry::new(),
        }
    }

    fn run<F, T>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut KatsEnv<EmuHal>, &mut KatStatusRegistry) -> T,
    {
        let mut env = KatsEnv {
            hal: &mut self.hal,
            aes: &mut self.aes,
            sha2: &mut self.sha2,
            sha3: &mut self.sha3,
            rsa: &mut self.rsa,
            ecdsa: &mut self.ecdsa,
            scratch: SCRATCH,
        };
        f(&mut env, &mut self.registry)
    }

    fn run_all(&mut self) -> Result<KatId, CryptoError> {
        self.run(|env, registry| CryptoKat::default().execute(env, registry))
    }

    fn scratch_is_clear(&self) -> bool {
        self.hal
            .mem
            .slice(SCRATCH, KAT_SCRATCH_SIZE)
            .unwrap()
            .iter()
            .all(|&b| b == 0)
    }
}

#[test]
fn test_run_all_sets_every_bit() {
    let mut fx = Fixture::new();
    assert_eq!(fx.run_all(), Ok(KatId::all()));
    assert!(fx.registry.is_set(KatId::all()));
    assert!(fx.scratch_is_clear());
    assert!(fx.hal.ecdsa().ram_clear());
    assert!(fx.hal.rsa().ram().iter().all(|&w| w == 0));
}

#[test]
fn test_gcm_kat_clears_key() {
    let mut fx = Fixture::new();
    fx.run(|env, _| Aes256GcmKat::default().execute(env)).unwrap();
    assert_eq!(fx.hal.aes().user_key(7), [0u32; 8]);
    assert!(!fx.aes.slot().is_busy());
}

#[test]
fn test_dpa_cm_kat_passes_repeatedly() {
    let mut fx = Fixture::new();
    for _ in 0..4 {
        fx.run(|env, _| AesDpaCmKat::default().execute(env)).unwrap();
    }
    assert!(fx.scratch_is_clear());
    assert_eq!(fx.hal.aes().user_key(7), [0u32; 8]);
}

#[test]
fn test_dpa_cm_kat_fixed_masks() {
    let mut fx = Fixture::new();
    fx.hal.aes_mut().faults.fixed_masks = true;
    assert_eq!(
        fx.run(|env, _| AesDpaCmKat::default().execute(env)),
        Err(CryptoError::KAT_AES_DPA_CM_CHECK1)
    );
    assert!(fx.scratch_is_clear());
}

#[test]
fn test_dpa_cm_kat_countermeasure_stuck_off() {
    let mut fx = Fixture::new();
    fx.hal.aes_mut().faults.cm_stuck_off = true;
    assert_eq!(
        fx.run(|env, _| AesDpaCmKat::default().execute(env)),
        Err(CryptoError::KAT_AES_DPA_CM_CHECK1)
    );
}

#[test]
fn test_dpa_cm_kat_skipped_when_fused_off() {
    let mut fx = Fixture::new();
    fx.hal.set_efuse_misc1(efuse::DPA_CM_DIS_MASK);
    assert_eq!(
        fx.run(|env, _| AesDpaCmKat::default().execute(env)),
        Err(CryptoError::AES_DPA_CM_NOT_SUPPORTED)
    );

    let bits = fx.run_all().unwrap();
    assert!(!bits.contains(KatId::AES_DPA_CM));
    assert_eq!(bits, KatId::all() - KatId::AES_DPA_CM);
}

#[test]
fn test_failure_stops_run_and_clears_bit() {
    let mut fx = Fixture::new();
    assert_eq!(fx.run_all(), Ok(KatId::all()));

    fx.hal.sha3_mut().faults.error = true;
    assert!(fx.run_all().is_err());
    assert!(fx.registry.is_set(KatId::SHA2_256));
    assert!(!fx.registry.is_set(KatId::SHA3_256));
    assert!(!fx.registry.is_set(KatId::SHA3_384));
    assert!(!fx.registry.is_set(KatId::RSA_PUB_ENC));
    assert!(fx.scratch_is_clear());

    fx.hal.sha3_mut().faults.error = false;
    assert_eq!(fx.run_all(), Ok(KatId::all()));
}

#[test]
fn test_tag_glitch_reported() {
    let mut fx = Fixture::new();
    fx.hal.aes_mut().faults.tag_glitch = true;
    let result = fx.run(|env, registry| {
        CryptoKat::default().execute_selected(env, registry, KatId::AES_ENCRYPT)
    });
    assert_eq!(result, Err(CryptoError::AES_GLITCH_DETECTED));
    assert!(!fx.registry.is_set(KatId::AES_ENCRYPT));
    assert!(!fx.registry.is_set(KatId::AES_DECRYPT));
}

#[test]
fn test_selected_runs_only_requested() {
    let mut fx = Fixture::new();
    let bits = fx
        .run(|env, registry| {
            CryptoKat::default().execute_selected(
                env,
                registry,
                KatId::RSA_PUB_ENC | KatId::SHA3_384,
            )
        })
        .unwrap();
    assert_eq!(bits, KatId::RSA_PUB_ENC | KatId::SHA3_384);

    assert_eq!(
        fx.run(|env, registry| {
            CryptoKat::default().execute_selected(env, registry, KatId::empty())
        }),
        Err(CryptoError::KAT_INVALID_ID)
    );
}

#[test]
fn test_rsa_ram_fault_fails_private_kat() {
    let mut fx = Fixture::new();
    fx.hal.rsa_mut().faults.stuck_ram_word = Some(5);
    let result = fx.run(|env, registry| {
        CryptoKat::default().execute_selected(env, registry, KatId::RSA_PRIV_DEC)
    });
    assert_eq!(result, Err(CryptoError::RSA_RAM_ZEROIZE_FAILED));
    assert!(!fx.registry.is_set(KatId::RSA_PRIV_DEC));
}

#[test]
fn test_ecdsa_kat_native_layout() {
    let mut fx = Fixture::with_config(&DriverConfig {
        ecc_layout: Layout::Native,
        ..config()
    });
    fx.run(|env, _| EcdsaKat::default().execute(env)).unwrap();
}

#[test]
fn test_ecdsa_glitch_reported() {
    let mut fx = Fixture::new();
    fx.hal.ecdsa_mut().faults.result_glitch = true;
    assert_eq!(
        fx.run(|env, _| EcdsaKat::default().execute(env)),
        Err(CryptoError::ECDSA_GLITCH_DETECTED)
    );
    assert!(fx.scratch_is_clear());
}

#[test]
fn test_kat_preempts_user_operation() {
    let mut fx = Fixture::new();
    fx.run_all().unwrap();

    let user = OwnerId::new(9).unwrap();
    fx.hal.mem.write(USER_DATA, &[0x5A; 200]).unwrap();
    fx.sha3
        .start(
            &mut fx.hal,
            KatGate::Registry(&fx.registry),
            user,
            ShaMode::Sha3_384,
        )
        .unwrap();
    fx.sha3.update(&mut fx.hal, user, USER_DATA, 200).unwrap();

    fx.run(|env, _| Sha3_384Kat::default().execute(env)).unwrap();

    assert_eq!(
        fx.sha3.update(&mut fx.hal, user, USER_DATA, 16),
        Err(CryptoError::ARBITER_DATA_CONTEXT_LOST)
    );
}

#[test]
fn test_dpa_cm_kat_preempts_user_operation() {
    let mut fx = Fixture::new();
    fx.run_all().unwrap();

    let user = OwnerId::new(9).unwrap();
    fx.hal.mem.write(USER_DATA, &[0x3C; 32]).unwrap();
    fx.hal.mem.write(USER_DATA + 0x40, &[0x11; 16]).unwrap();
    fx.aes
        .write_key(
            &mut fx.hal,
            user,
            AesKeySrc::User0,
            AesKeySize::Key256,
            USER_DATA,
        )
        .unwrap();
    let op = AesOpParams {
        key_src: AesKeySrc::User0,
        key_size: AesKeySize::Key256,
        iv_addr: USER_DATA + 0x40,
        direction: AesDirection::Encrypt,
    };
    fx.aes
        .operation_init(&mut fx.hal, KatGate::Registry(&fx.registry), user, &op)
        .unwrap();

    fx.run(|env, _| AesDpaCmKat::default().execute(env)).unwrap();
    assert!(!fx.aes.slot().is_busy());

    assert_eq!(
        fx.aes.update_aad(&mut fx.hal, user, USER_DATA, 16),
        Err(CryptoError::ARBITER_DATA_CONTEXT_LOST)
    );

    // The user starts over and is served again
    fx.aes
        .operation_init(&mut fx.hal, KatGate::Registry(&fx.registry), user, &op)
        .unwrap();
    fx.aes.update_aad(&mut fx.hal, user, USER_DATA, 16).unwrap();
}
