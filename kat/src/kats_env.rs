/*++

Licensed under the Apache-2.0 license.

File Name:

    kats_env.rs

Abstract:

    File contains the engines and scratch memory the Known Answer Tests run on.

--*/

use cryptoeng_cfi_lib::ct_compare;
use cryptoeng_drivers::{
    Addr, AesEngine, EcdsaEngine, HwAccess, KatGate, OwnerId, RsaEngine, SelfTestToken, ShaEngine,
};
use cryptoeng_error::{CryptoError, CryptoResult};

/// Bytes of DMA visible scratch memory a test may stage vectors in
pub const KAT_SCRATCH_SIZE: usize = 0x800;

pub struct KatsEnv<'a, H: HwAccess> {
    /// Hardware access
    pub hal: &'a mut H,

    /// AES-GCM Engine
    pub aes: &'a mut AesEngine,

    /// SHA2 Engine
    pub sha2: &'a mut ShaEngine,

    /// SHA3 Engine
    pub sha3: &'a mut ShaEngine,

    /// RSA Engine
    pub rsa: &'a mut RsaEngine,

    /// ECDSA Engine
    pub ecdsa: &'a mut EcdsaEngine,

    /// Start of `KAT_SCRATCH_SIZE` bytes of scratch memory
    pub scratch: Addr,
}

/// Owner every self test runs as
pub(crate) const KAT_OWNER: OwnerId = OwnerId::PRIVILEGED;

/// Gate presented by a self test
pub(crate) fn kat_gate() -> KatGate<'static> {
    // SAFETY: every caller compares the engine output against its vector.
    KatGate::SelfTest(unsafe { SelfTestToken::new() })
}

impl<H: HwAccess> KatsEnv<'_, H> {
    /// Address of `offset` within the scratch region
    pub(crate) fn at(&self, offset: usize) -> Addr {
        self.scratch + offset as Addr
    }

    /// Stage `data` at `offset` and return its address.
    pub(crate) fn put(&mut self, offset: usize, data: &[u8]) -> CryptoResult<Addr> {
        if offset + data.len() > KAT_SCRATCH_SIZE {
            Err(CryptoError::KAT_SCRATCH_OVERFLOW)?;
        }
        let addr = self.at(offset);
        self.hal.mem_write(addr, data)?;
        Ok(addr)
    }

    /// Read `buf.len()` bytes from `offset`.
    pub(crate) fn get(&self, offset: usize, buf: &mut [u8]) -> CryptoResult<()> {
        if offset + buf.len() > KAT_SCRATCH_SIZE {
            Err(CryptoError::KAT_SCRATCH_OVERFLOW)?;
        }
        self.hal.mem_read(self.at(offset), buf)
    }

    /// Zero the whole scratch region.
    pub(crate) fn wipe(&mut self) -> CryptoResult<()> {
        const ZEROS: [u8; 64] = [0; 64];
        for offset in (0..KAT_SCRATCH_SIZE).step_by(ZEROS.len()) {
            let addr = self.at(offset);
            self.hal.mem_write(addr, &ZEROS)?;
        }
        Ok(())
    }

    /// Run `f` and wipe the scratch region whatever its outcome.
    pub(crate) fn scoped<F>(&mut self, f: F) -> CryptoResult<()>
    where
        F: FnOnce(&mut Self) -> CryptoResult<()>,
    {
        let result = f(self);
        let wiped = self.wipe();
        result.and(wiped)
    }
}

/// Compare engine output with its expected value.
///
/// A plain mismatch is reported as `err`; a detected glitch is passed through.
pub(crate) fn expect_eq(actual: &[u8], expected: &[u8], err: CryptoError) -> CryptoResult<()> {
    match ct_compare(actual, expected, expected.len()) {
        Err(CryptoError::SECMEM_COMPARE_MISMATCH) | Err(CryptoError::SECMEM_INVALID_PARAM) => {
            Err(err)
        }
        other => other,
    }
}
