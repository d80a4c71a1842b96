// Licensed under the Apache-2.0 license

use cryptoeng_drivers::{
    cprintln, Addr, AesEngine, AesState, DriverConfig, EcdsaEngine, HwAccess, KatId,
    KatStatusRegistry, OwnerId, RsaEngine, ShaEngine, ShaKind, ShaState,
};
use cryptoeng_error::CryptoResult;
use cryptoeng_kat::{CryptoKat, KatsEnv};

/// Engine contexts and the hardware they drive
pub struct Drivers<H: HwAccess> {
    pub hal: H,

    /// Self test outcomes gating every operational call
    pub kat_status: KatStatusRegistry,

    pub aes: AesEngine,

    pub sha2: ShaEngine,

    pub sha3: ShaEngine,

    pub rsa: RsaEngine,

    pub ecdsa: EcdsaEngine,

    /// DMA visible region of `KAT_SCRATCH_SIZE` bytes reserved for self tests
    pub kat_scratch: Addr,
}

impl<H: HwAccess> Drivers<H> {
    pub fn new(hal: H, cfg: &DriverConfig, kat_scratch: Addr) -> Self {
        Self {
            hal,
            kat_status: KatStatusRegistry::new(),
            aes: AesEngine::new(cfg),
            sha2: ShaEngine::new(ShaKind::Sha2, cfg),
            sha3: ShaEngine::new(ShaKind::Sha3, cfg),
            rsa: RsaEngine::new(cfg),
            ecdsa: EcdsaEngine::new(cfg),
            kat_scratch,
        }
    }

    /// Bring the stateful engines to `Initialized` and run every self test.
    ///
    /// # Returns
    ///
    /// * `KatId` - Status bits set after the run
    pub fn init_engines(&mut self) -> CryptoResult<KatId> {
        let owner = OwnerId::PRIVILEGED;
        if self.aes.state() == AesState::Uninitialized {
            self.aes.init(&mut self.hal, owner)?;
        }
        for sha in [&mut self.sha2, &mut self.sha3] {
            if sha.state() == ShaState::Uninitialized {
                sha.init(&mut self.hal, owner)?;
            }
        }
        let status = self.run_kats(None)?;
        cprintln!("[rt] Engines ready, KAT status 0x{:X}", status.bits());
        Ok(status)
    }

    /// Run the self tests covering `ids`, or all of them.
    pub fn run_kats(&mut self, ids: Option<KatId>) -> CryptoResult<KatId> {
        let Self {
            hal,
            kat_status,
            aes,
            sha2,
            sha3,
            rsa,
            ecdsa,
            kat_scratch,
        } = self;
        let mut env = KatsEnv {
            hal,
            aes,
            sha2,
            sha3,
            rsa,
            ecdsa,
            scratch: *kat_scratch,
        };
        match ids {
            Some(ids) => CryptoKat::default().execute_selected(&mut env, kat_status, ids),
            None => CryptoKat::default().execute(&mut env, kat_status),
        }
    }

    /// Engine serving `kind`, with the hardware and the self test status
    pub(crate) fn sha(
        &mut self,
        kind: ShaKind,
    ) -> (&mut H, &mut ShaEngine, &KatStatusRegistry) {
        let sha = match kind {
            ShaKind::Sha2 => &mut self.sha2,
            ShaKind::Sha3 => &mut self.sha3,
        };
        (&mut self.hal, sha, &self.kat_status)
    }
}
