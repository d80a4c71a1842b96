/*++

Licensed under the Apache-2.0 license.

File Name:

    sha.rs

Abstract:

    File contains API for the SHA2 and SHA3 hash engines.

--*/

use tock_registers::LocalRegisterCopy;

use crate::arbiter::{Claim, EngineSlot, OwnerId};
use crate::hal::{words, Addr, DmaXfer, HwAccess};
use crate::kat_status::{KatGate, KatId};
use crate::reg::sha_regs::*;
use crate::reg::{sss, SHA2_BASE, SHA3_BASE, SSS_BASE};
use crate::DriverConfig;
use cryptoeng_cfi_lib::zeroize_verified;
use cryptoeng_error::{CryptoError, CryptoResult};

/// Largest block size of any mode (SHA3-256)
pub const SHA_MAX_BLOCK_SIZE: usize = 136;

/// Largest digest size of any mode
pub const SHA_MAX_DIGEST_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaKind {
    Sha2,
    Sha3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaMode {
    Sha256,
    Sha384,
    Sha512,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

impl ShaMode {
    pub fn kind(&self) -> ShaKind {
        match self {
            Self::Sha256 | Self::Sha384 | Self::Sha512 => ShaKind::Sha2,
            _ => ShaKind::Sha3,
        }
    }

    pub fn block_size(&self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha384 | Self::Sha512 => 128,
            Self::Sha3_256 => 136,
            Self::Sha3_384 => 104,
            Self::Sha3_512 => 72,
        }
    }

    pub fn digest_size(&self) -> usize {
        match self {
            Self::Sha256 | Self::Sha3_256 => 32,
            Self::Sha384 | Self::Sha3_384 => 48,
            Self::Sha512 | Self::Sha3_512 => 64,
        }
    }

    fn reg_value(&self) -> u32 {
        match self {
            Self::Sha256 | Self::Sha3_256 => MODE_REG::MODE::Bits256.value,
            Self::Sha384 | Self::Sha3_384 => MODE_REG::MODE::Bits384.value,
            Self::Sha512 | Self::Sha3_512 => MODE_REG::MODE::Bits512.value,
        }
    }

    /// Self test that has to pass before the mode is used
    pub fn kat_id(&self) -> KatId {
        match self {
            Self::Sha256 | Self::Sha384 | Self::Sha512 => KatId::SHA2_256,
            Self::Sha3_256 => KatId::SHA3_256,
            Self::Sha3_384 | Self::Sha3_512 => KatId::SHA3_384,
        }
    }

    /// Bytes of the message length field appended by SHA2 padding
    fn length_field(&self) -> usize {
        match self {
            Self::Sha256 => 8,
            _ => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaState {
    Uninitialized,
    Initialized,
    EngineStarted,
}

/// SHA engine context, one per engine instance
#[derive(Debug)]
pub struct ShaEngine {
    kind: ShaKind,
    base: u32,
    route: u32,
    state: ShaState,
    mode: ShaMode,
    /// Bytes not yet forming a whole block; always shorter than a block
    partial: [u8; SHA_MAX_BLOCK_SIZE],
    partial_len: usize,
    total_len: u64,
    last_update: bool,
    slot: EngineSlot,
    max_polls: u32,
    dma_max_bytes: u32,
}

impl ShaEngine {
    pub fn new(kind: ShaKind, cfg: &DriverConfig) -> Self {
        let (base, route, mode) = match kind {
            ShaKind::Sha2 => (SHA2_BASE, sss::ROUTE_DMA0_SHA2, ShaMode::Sha256),
            ShaKind::Sha3 => (SHA3_BASE, sss::ROUTE_DMA0_SHA3, ShaMode::Sha3_384),
        };
        Self {
            kind,
            base,
            route,
            state: ShaState::Uninitialized,
            mode,
            partial: [0; SHA_MAX_BLOCK_SIZE],
            partial_len: 0,
            total_len: 0,
            last_update: false,
            slot: EngineSlot::new(),
            max_polls: cfg.max_polls,
            dma_max_bytes: cfg.dma_max_bytes,
        }
    }

    pub fn kind(&self) -> ShaKind {
        self.kind
    }

    pub fn state(&self) -> ShaState {
        self.state
    }

    pub fn slot(&self) -> &EngineSlot {
        &self.slot
    }

    /// Bytes currently buffered
    pub fn partial_len(&self) -> usize {
        self.partial_len
    }

    /// Drop any running operation and hold the engine in reset.
    fn abandon<H: HwAccess>(&mut self, hal: &mut H) {
        self.partial.fill(0);
        self.partial_len = 0;
        self.total_len = 0;
        self.last_update = false;
        if self.state != ShaState::Uninitialized {
            self.state = ShaState::Initialized;
        }
        hal.set_reset(self.base, RESET);
    }

    fn recover<H: HwAccess>(&mut self, hal: &mut H, owner: OwnerId) {
        crate::cprintln!("[sha] Recovering");
        self.abandon(hal);
        self.slot.release_owned(owner);
    }

    /// Initialize the engine.
    pub fn init<H: HwAccess>(&mut self, hal: &mut H, owner: OwnerId) -> CryptoResult<()> {
        if let Claim::Continuation | Claim::Preempted(_) = self.slot.begin_operation(owner)? {
            self.abandon(hal);
        }
        hal.set_reset(self.base, RESET);
        self.state = ShaState::Initialized;
        self.slot.release_owned(owner);
        Ok(())
    }

    /// Start a digest operation.
    pub fn start<H: HwAccess>(
        &mut self,
        hal: &mut H,
        gate: KatGate,
        owner: OwnerId,
        mode: ShaMode,
    ) -> CryptoResult<()> {
        if mode.kind() != self.kind {
            Err(CryptoError::SHA_INVALID_PARAM)?;
        }
        gate.check(mode.kat_id(), CryptoError::SHA_KAT_NOT_EXECUTED)?;

        match self.slot.begin_operation(owner)? {
            Claim::Fresh => {}
            Claim::Preempted(_) => self.abandon(hal),
            Claim::Continuation => Err(CryptoError::SHA_STATE_MISMATCH)?,
        }
        if self.state != ShaState::Initialized {
            self.slot.release_owned(owner);
            Err(CryptoError::SHA_STATE_MISMATCH)?;
        }

        hal.set_reset(self.base, RESET);
        hal.release_reset(self.base, RESET);
        self.select_route(hal);
        hal.write_reg(self.base, MODE, mode.reg_value());
        hal.write_reg(self.base, START, 1);

        self.mode = mode;
        self.partial_len = 0;
        self.total_len = 0;
        self.last_update = false;
        self.state = ShaState::EngineStarted;
        Ok(())
    }

    /// Point the shared stream switch at this engine. Done before every
    /// streaming step, since another engine may have taken the route.
    fn select_route<H: HwAccess>(&self, hal: &mut H) {
        hal.write_reg(SSS_BASE, sss::CFG, self.route);
    }

    fn continuation<H, F, T>(&mut self, hal: &mut H, owner: OwnerId, f: F) -> CryptoResult<T>
    where
        H: HwAccess,
        F: FnOnce(&mut Self, &mut H) -> CryptoResult<T>,
    {
        self.slot.check_context(owner)?;
        if self.state != ShaState::EngineStarted {
            Err(CryptoError::SHA_STATE_MISMATCH)?;
        }
        let result = f(self, hal);
        if result.is_err() {
            self.recover(hal, owner);
        }
        result
    }

    /// Hash `size` bytes at `addr`.
    ///
    /// Whole blocks are streamed to the engine, split into transfers no
    /// larger than the DMA maximum; the remainder is buffered.
    pub fn update<H: HwAccess>(
        &mut self,
        hal: &mut H,
        owner: OwnerId,
        addr: Addr,
        size: u32,
    ) -> CryptoResult<()> {
        self.continuation(hal, owner, |sha, hal| sha.absorb(hal, addr, size))
    }

    fn absorb<H: HwAccess>(&mut self, hal: &mut H, addr: Addr, size: u32) -> CryptoResult<()> {
        if self.last_update {
            Err(CryptoError::SHA_STATE_MISMATCH)?;
        }
        if addr.checked_add(size as Addr).is_none() {
            Err(CryptoError::SHA_INVALID_PARAM)?;
        }
        let bs = self.mode.block_size();
        let mut addr = addr;
        let mut remaining = size as usize;
        self.total_len = self
            .total_len
            .checked_add(size as u64)
            .ok_or(CryptoError::SHA_INVALID_PARAM)?;
        self.select_route(hal);

        if self.partial_len > 0 {
            let take = remaining.min(bs - self.partial_len);
            hal.mem_read(addr, &mut self.partial[self.partial_len..self.partial_len + take])?;
            self.partial_len += take;
            addr += take as Addr;
            remaining -= take;
            if self.partial_len == bs {
                hal.dma_transfer_local(&self.partial[..bs], false)?;
                self.partial_len = 0;
            }
        }

        let chunk = (self.dma_max_bytes as usize / bs) * bs;
        if chunk == 0 {
            Err(CryptoError::SHA_INVALID_PARAM)?;
        }
        let mut whole = remaining - remaining % bs;
        while whole > 0 {
            let n = whole.min(chunk);
            DmaXfer {
                src: Some((addr, words(n as u32), false)),
                dst: None,
            }
            .run(hal, self.max_polls)?;
            addr += n as Addr;
            whole -= n;
            remaining -= n;
        }

        if remaining > 0 {
            hal.mem_read(addr, &mut self.partial[..remaining])?;
            self.partial_len = remaining;
        }
        Ok(())
    }

    /// Mark the data supplied so far as already padded by the caller.
    pub fn last_update<H: HwAccess>(&mut self, hal: &mut H, owner: OwnerId) -> CryptoResult<()> {
        self.continuation(hal, owner, |sha, _| {
            sha.last_update = true;
            Ok(())
        })
    }

    /// Finish the operation and write the digest to `out`.
    ///
    /// # Returns
    ///
    /// * `usize` - Digest size in bytes
    pub fn finish<H: HwAccess>(
        &mut self,
        hal: &mut H,
        owner: OwnerId,
        out: &mut [u8],
    ) -> CryptoResult<usize> {
        self.continuation(hal, owner, |sha, hal| {
            let result = sha.finish_hw(hal, out);
            sha.abandon(hal);
            sha.slot.release_owned(owner);
            let wiped = zeroize_verified(&mut sha.partial);
            let len = result?;
            wiped?;
            Ok(len)
        })
    }

    fn finish_hw<H: HwAccess>(&mut self, hal: &mut H, out: &mut [u8]) -> CryptoResult<usize> {
        let digest_size = self.mode.digest_size();
        if out.len() < digest_size {
            Err(CryptoError::SHA_OUTPUT_TOO_SMALL)?;
        }

        if self.last_update {
            if self.partial_len != 0 {
                Err(CryptoError::SHA_PADDING_NOT_COMPLETE)?;
            }
            hal.write_reg(self.base, FINAL, 1);
        } else {
            self.select_route(hal);
            let mut block = [0u8; 2 * SHA_MAX_BLOCK_SIZE];
            let result = self
                .pad(&mut block)
                .and_then(|n| hal.dma_transfer_local(&block[..n], true));
            zeroize_verified(&mut block)?;
            result?;
        }

        let done = DONE_REG::DONE::SET.value;
        hal.wait_for_event(self.base, DONE, done, done, self.max_polls)
            .map_err(|_| CryptoError::SHA_TIMEOUT)?;
        let status: LocalRegisterCopy<u32, STATUS_REG::Register> =
            LocalRegisterCopy::new(hal.read_reg(self.base, STATUS));
        if status.is_set(STATUS_REG::ERROR) {
            Err(CryptoError::SHA_HW_ERROR)?;
        }

        for (i, chunk) in out[..digest_size].chunks_exact_mut(4).rev().enumerate() {
            let word = hal.read_reg(self.base, DIGEST_0 + (i as u32) * 4);
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        Ok(digest_size)
    }

    /// Pad the buffered remainder into `block`, returning the padded length.
    fn pad(&self, block: &mut [u8]) -> CryptoResult<usize> {
        let bs = self.mode.block_size();
        let len = self.partial_len;
        block[..len].copy_from_slice(&self.partial[..len]);

        match self.mode.kind() {
            ShaKind::Sha2 => {
                let field = self.mode.length_field();
                let total = if len + 1 + field > bs { 2 * bs } else { bs };
                block[len] = 0x80;
                let bits = u128::from(self.total_len) * 8;
                let be = bits.to_be_bytes();
                block[total - field..total].copy_from_slice(&be[16 - field..]);
                Ok(total)
            }
            ShaKind::Sha3 => {
                block[len] ^= 0x06;
                block[bs - 1] ^= 0x80;
                Ok(bs)
            }
        }
    }

    /// Hash `size` bytes at `addr` in one call.
    #[allow(clippy::too_many_arguments)]
    pub fn digest<H: HwAccess>(
        &mut self,
        hal: &mut H,
        gate: KatGate,
        owner: OwnerId,
        mode: ShaMode,
        addr: Addr,
        size: u32,
        out: &mut [u8],
    ) -> CryptoResult<usize> {
        self.start(hal, gate, owner, mode)?;
        self.update(hal, owner, addr, size)?;
        self.finish(hal, owner, out)
    }
}
