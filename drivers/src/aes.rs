/*++

Licensed under the Apache-2.0 license.

File Name:

    aes.rs

Abstract:

    File contains API for the AES-GCM/GMAC engine: key write, load, clear and
    decryption, the multi-step encrypt/decrypt lifecycle and the DPA
    countermeasure configuration.

--*/

use tock_registers::LocalRegisterCopy;

use crate::arbiter::{Claim, EngineSlot, OwnerId};
use crate::hal::{words, Addr, DmaChannel, DmaXfer, HwAccess};
use crate::kat_status::{KatGate, KatId, SelfTestToken};
use crate::key_policy::{AesKeySrc, KeyClearTarget, KeySourcePolicy};
use crate::reg::aes_regs::*;
use crate::reg::{efuse, sss, AES_BASE, EFUSE_CACHE_BASE, SSS_BASE};
use crate::{cprintln, DriverConfig};
use cryptoeng_cfi_lib::{zeroize_verified, VerifiedCall};
use cryptoeng_error::{CryptoError, CryptoResult};

/// Bytes of an AES block and of the GCM tag
pub const AES_BLOCK_SIZE: u32 = 16;

/// Bytes of the IV block transferred to the engine
const IV_XFER_SIZE: u32 = 16;

/// Words of the split-mode DPA countermeasure input and output
const DPA_CM_XFER_WORDS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AesState {
    Uninitialized,
    Initialized,
    EncryptActive,
    DecryptActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AesKeySize {
    Key128,
    Key256,
}

impl AesKeySize {
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Key128 => 16,
            Self::Key256 => 32,
        }
    }

    fn reg_value(&self) -> u32 {
        match self {
            Self::Key128 => KEY_SIZE_REG::SIZE::Key128.value,
            Self::Key256 => KEY_SIZE_REG::SIZE::Key256.value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AesDirection {
    Encrypt,
    Decrypt,
}

impl AesDirection {
    fn reg_value(&self) -> u32 {
        match self {
            Self::Encrypt => MODE_REG::ENC_DEC_N::Encrypt.value,
            Self::Decrypt => MODE_REG::ENC_DEC_N::Decrypt.value,
        }
    }
}

/// Parameters of `operation_init`
#[derive(Debug, Clone, Copy)]
pub struct AesOpParams {
    pub key_src: AesKeySrc,
    pub key_size: AesKeySize,
    pub iv_addr: Addr,
    pub direction: AesDirection,
}

/// Parameters of a single-shot encryption or decryption.
///
/// A zero `data_len` computes a GMAC over the AAD.
#[derive(Debug, Clone, Copy)]
pub struct AesDataParams {
    pub key_src: AesKeySrc,
    pub key_size: AesKeySize,
    pub iv_addr: Addr,
    pub aad_addr: Addr,
    pub aad_len: u32,
    pub in_addr: Addr,
    pub out_addr: Addr,
    pub data_len: u32,
    pub tag_addr: Addr,
}

/// Addresses used by one split-mode DPA countermeasure run
#[derive(Debug, Clone, Copy)]
pub struct DpaCmRun {
    /// 256-bit key, word 0 first, each word little endian
    pub key_addr: Addr,

    /// Sixteen words of split IV and data
    pub data_addr: Addr,

    /// Sixteen words receiving the masked outputs
    pub out_addr: Addr,
}

/// Parameters of `kek_decrypt`
#[derive(Debug, Clone, Copy)]
pub struct KekDecryptParams {
    /// Key encryption key
    pub kek_src: AesKeySrc,

    /// Red key source to decrypt
    pub dst_src: AesKeySrc,

    /// IV used when the key was encrypted
    pub iv_addr: Addr,

    /// Size of both keys
    pub key_size: AesKeySize,
}

/// AES-GCM engine context
#[derive(Debug)]
pub struct AesEngine {
    base: u32,
    state: AesState,
    key_src: Option<AesKeySrc>,
    gmac: bool,
    kup_save: bool,
    dpa_cm: bool,
    /// Length of the next block when decrypting a key-rolled stream
    next_blk_len: u32,
    slot: EngineSlot,
    max_polls: u32,
}

impl AesEngine {
    pub fn new(cfg: &DriverConfig) -> Self {
        Self {
            base: AES_BASE,
            state: AesState::Uninitialized,
            key_src: None,
            gmac: false,
            kup_save: false,
            dpa_cm: false,
            next_blk_len: 0,
            slot: EngineSlot::new(),
            max_polls: cfg.max_polls,
        }
    }

    pub fn state(&self) -> AesState {
        self.state
    }

    pub fn slot(&self) -> &EngineSlot {
        &self.slot
    }

    /// Key source of the active operation
    pub fn key_src(&self) -> Option<AesKeySrc> {
        self.key_src
    }

    pub fn dpa_cm_enabled(&self) -> bool {
        self.dpa_cm
    }

    pub fn next_blk_len(&self) -> u32 {
        self.next_blk_len
    }

    fn is_active(&self) -> bool {
        matches!(self.state, AesState::EncryptActive | AesState::DecryptActive)
    }

    fn write<H: HwAccess>(&self, hal: &mut H, offset: u32, val: u32) {
        hal.write_reg(self.base, offset, val);
    }

    fn status<H: HwAccess>(&self, hal: &H) -> LocalRegisterCopy<u32, STATUS_REG::Register> {
        LocalRegisterCopy::new(hal.read_reg(self.base, STATUS))
    }

    /// Reset the engine and release the engine held by `owner`.
    ///
    /// Runs on every failure once the caller holds the engine.
    fn recover<H: HwAccess>(&mut self, hal: &mut H, owner: OwnerId) {
        cprintln!("[aes] Recovering");
        self.abandon(hal);
        self.slot.release_owned(owner);
    }

    fn abandon<H: HwAccess>(&mut self, hal: &mut H) {
        self.next_blk_len = 0;
        self.gmac = false;
        self.key_src = None;
        if self.state != AesState::Uninitialized {
            self.state = AesState::Initialized;
        }
        self.write(hal, DATA_SWAP, 0);
        self.write(hal, AAD, 0);
        hal.dma_config_endianness(DmaChannel::Src, false);
        hal.dma_config_endianness(DmaChannel::Dst, false);
        hal.set_reset(self.base, SOFT_RST);
    }

    /// Take the engine for a call that does not leave an operation running.
    fn acquire_idle<H: HwAccess>(&mut self, hal: &mut H, owner: OwnerId) -> CryptoResult<()> {
        match self.slot.begin_operation(owner)? {
            Claim::Fresh => Ok(()),
            Claim::Preempted(_) => {
                self.abandon(hal);
                Ok(())
            }
            // The caller is in the middle of its own operation.
            Claim::Continuation => Err(CryptoError::AES_STATE_MISMATCH),
        }
    }

    /// Run `f` holding the engine, releasing it afterwards and recovering on failure.
    fn single_shot<H, F>(&mut self, hal: &mut H, owner: OwnerId, f: F) -> CryptoResult<()>
    where
        H: HwAccess,
        F: FnOnce(&mut Self, &mut H) -> CryptoResult<()>,
    {
        self.acquire_idle(hal, owner)?;
        let result = f(self, hal);
        match result {
            Ok(()) => self.slot.release_owned(owner),
            Err(_) => self.recover(hal, owner),
        }
        result
    }

    /// Validate a continuation call and run `f`, recovering on failure.
    fn continuation<H, F>(&mut self, hal: &mut H, owner: OwnerId, f: F) -> CryptoResult<()>
    where
        H: HwAccess,
        F: FnOnce(&mut Self, &mut H) -> CryptoResult<()>,
    {
        self.slot.check_context(owner)?;
        if !self.is_active() {
            Err(CryptoError::AES_STATE_MISMATCH)?;
        }
        let result = f(self, hal);
        if result.is_err() {
            self.recover(hal, owner);
        }
        result
    }

    fn require_initialized(&self) -> CryptoResult<()> {
        if self.state != AesState::Initialized {
            Err(CryptoError::AES_STATE_MISMATCH)?;
        }
        Ok(())
    }

    /// Route the DMA to the engine and byte swap both DMA channels and the
    /// engine data port while `f` runs.
    ///
    /// The stream switch is shared with the SHA engines, so every transfer
    /// selects its route again.
    fn with_swap<H, F>(&self, hal: &mut H, f: F) -> CryptoResult<()>
    where
        H: HwAccess,
        F: FnOnce(&mut H) -> CryptoResult<()>,
    {
        hal.write_reg(SSS_BASE, sss::CFG, sss::ROUTE_DMA0_AES);
        hal.dma_config_endianness(DmaChannel::Src, true);
        hal.dma_config_endianness(DmaChannel::Dst, true);
        self.write(hal, DATA_SWAP, 1);
        let result = f(hal);
        self.write(hal, DATA_SWAP, 0);
        hal.dma_config_endianness(DmaChannel::Src, false);
        hal.dma_config_endianness(DmaChannel::Dst, false);
        result
    }

    /// Initialize the engine.
    ///
    /// Resets the hardware and clears any pending key clear request. May be
    /// called from any state; the caller's own unfinished operation is dropped.
    pub fn init<H: HwAccess>(&mut self, hal: &mut H, owner: OwnerId) -> CryptoResult<()> {
        if let Claim::Continuation | Claim::Preempted(_) = self.slot.begin_operation(owner)? {
            self.abandon(hal);
        }
        hal.release_reset(self.base, SOFT_RST);
        self.write(hal, KEY_CLEAR, 0);
        hal.set_reset(self.base, SOFT_RST);
        self.state = AesState::Initialized;
        self.next_blk_len = 0;
        self.slot.release_owned(owner);
        Ok(())
    }

    /// Write a key into a writable key source.
    ///
    /// # Arguments
    ///
    /// * `src` - Destination key source
    /// * `size` - Key size
    /// * `key_addr` - Address of the key, big endian
    pub fn write_key<H: HwAccess>(
        &mut self,
        hal: &mut H,
        owner: OwnerId,
        src: AesKeySrc,
        size: AesKeySize,
        key_addr: Addr,
    ) -> CryptoResult<()> {
        let policy = src.policy();
        if policy.key_reg.is_none() || !(policy.user_writable || owner.is_privileged()) {
            Err(CryptoError::AES_KEY_SRC_NOT_WRITABLE)?;
        }
        if size == AesKeySize::Key128 && !policy.allows_128 {
            Err(CryptoError::AES_INVALID_KEY_SIZE)?;
        }

        self.single_shot(hal, owner, |aes, hal| {
            if aes.state == AesState::Uninitialized {
                Err(CryptoError::AES_STATE_MISMATCH)?;
            }
            aes.write_key_regs(hal, policy, size, key_addr)
        })
    }

    fn write_key_regs<H: HwAccess>(
        &self,
        hal: &mut H,
        policy: &KeySourcePolicy,
        size: AesKeySize,
        key_addr: Addr,
    ) -> CryptoResult<()> {
        let reg = policy
            .key_reg
            .ok_or(CryptoError::AES_KEY_SRC_NOT_WRITABLE)?;
        let mut key = [0u8; 32];
        let len = size.bytes();
        let result = hal.mem_read(key_addr, &mut key[..len]).map(|_| {
            let n = len / 4;
            for (i, chunk) in key[..len].chunks_exact(4).enumerate() {
                let word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                hal.write_reg(self.base, reg + ((n - 1 - i) as u32) * 4, word);
            }
        });
        let wiped = zeroize_verified(&mut key);
        result?;
        wiped
    }

    /// Select a key source and wait for the key schedule.
    fn key_load<H: HwAccess>(
        &self,
        hal: &mut H,
        policy: &KeySourcePolicy,
        size: AesKeySize,
    ) -> CryptoResult<()> {
        self.write(hal, KEY_SIZE, size.reg_value());
        self.write(hal, KEY_SEL, policy.sel);
        self.write(hal, KEY_LOAD, 1);
        let done = STATUS_REG::KEY_INIT_DONE::SET.value;
        hal.wait_for_event(self.base, STATUS, done, done, self.max_polls)
            .map_err(|_| CryptoError::AES_KEY_INIT_TIMEOUT)
    }

    fn transfer_iv<H: HwAccess>(&self, hal: &mut H, iv_addr: Addr, last: bool) -> CryptoResult<()> {
        let max_polls = self.max_polls;
        self.with_swap(hal, |hal| {
            DmaXfer {
                src: Some((iv_addr, words(IV_XFER_SIZE), last)),
                dst: None,
            }
            .run(hal, max_polls)
        })
    }

    /// Start an encryption or decryption.
    ///
    /// Loads the key, starts the message and transfers the IV. The self test of
    /// the direction must have passed, and with the DPA countermeasure enabled
    /// its self test too.
    pub fn operation_init<H: HwAccess>(
        &mut self,
        hal: &mut H,
        gate: KatGate,
        owner: OwnerId,
        params: &AesOpParams,
    ) -> CryptoResult<()> {
        let policy = params.key_src.policy();
        let (allowed, mut kat, denied) = match params.direction {
            AesDirection::Encrypt => (
                policy.encrypt_allowed,
                KatId::AES_ENCRYPT,
                CryptoError::AES_ENCRYPT_NOT_ALLOWED,
            ),
            AesDirection::Decrypt => (
                policy.decrypt_allowed,
                KatId::AES_DECRYPT,
                CryptoError::AES_DECRYPT_NOT_ALLOWED,
            ),
        };
        if !allowed {
            Err(denied)?;
        }
        if policy.device_key && !owner.is_privileged() {
            Err(CryptoError::AES_DEVICE_KEY_NOT_ALLOWED)?;
        }
        if params.key_size == AesKeySize::Key128 && !policy.allows_128 {
            Err(CryptoError::AES_INVALID_KEY_SIZE)?;
        }
        if self.dpa_cm {
            kat |= KatId::AES_DPA_CM;
        }
        gate.check(kat, CryptoError::AES_KAT_NOT_EXECUTED)?;

        self.single_shot_begin(hal, owner)?;
        let result = self.operation_init_hw(hal, policy, params);
        match result {
            Ok(()) => {
                self.key_src = Some(params.key_src);
                self.state = match params.direction {
                    AesDirection::Encrypt => AesState::EncryptActive,
                    AesDirection::Decrypt => AesState::DecryptActive,
                };
            }
            Err(_) => self.recover(hal, owner),
        }
        result
    }

    /// Claim for a new operation; only an initialized, idle engine may start one.
    fn single_shot_begin<H: HwAccess>(&mut self, hal: &mut H, owner: OwnerId) -> CryptoResult<()> {
        self.acquire_idle(hal, owner)?;
        if let Err(e) = self.require_initialized() {
            self.slot.release_owned(owner);
            Err(e)?;
        }
        Ok(())
    }

    fn operation_init_hw<H: HwAccess>(
        &mut self,
        hal: &mut H,
        policy: &KeySourcePolicy,
        params: &AesOpParams,
    ) -> CryptoResult<()> {
        if params.key_src == AesKeySrc::Puf
            && hal.read_reg(self.base, KEY_ZEROED_STATUS) & key_clear::PUF != 0
        {
            Err(CryptoError::AES_ZEROED_PUF_KEY)?;
        }

        // A key-rolled decryption continues on the running engine.
        if params.direction == AesDirection::Encrypt || self.next_blk_len == 0 {
            hal.release_reset(self.base, SOFT_RST);
        }

        self.write(hal, MODE, params.direction.reg_value());
        self.key_load(hal, policy, params.key_size)?;
        self.write(hal, START_MSG, 1);
        self.transfer_iv(hal, params.iv_addr, false)
    }

    /// Select GMAC (authentication only) for the active operation.
    pub fn gmac_cfg<H: HwAccess>(
        &mut self,
        hal: &mut H,
        owner: OwnerId,
        enable: bool,
    ) -> CryptoResult<()> {
        self.continuation(hal, owner, |aes, _| {
            aes.gmac = enable;
            Ok(())
        })
    }

    /// Feed additional authenticated data.
    ///
    /// `size` must be a non-zero multiple of the block size. In GMAC mode the
    /// AAD ends the message.
    pub fn update_aad<H: HwAccess>(
        &mut self,
        hal: &mut H,
        owner: OwnerId,
        aad_addr: Addr,
        size: u32,
    ) -> CryptoResult<()> {
        self.continuation(hal, owner, |aes, hal| {
            if size == 0 || size % AES_BLOCK_SIZE != 0 {
                Err(CryptoError::AES_INVALID_SIZE)?;
            }
            let last = aes.gmac;
            let max_polls = aes.max_polls;
            aes.write(hal, AAD, 1);
            let result = aes.with_swap(hal, |hal| {
                DmaXfer {
                    src: Some((aad_addr, words(size), last)),
                    dst: None,
                }
                .run(hal, max_polls)
            });
            aes.write(hal, AAD, 0);
            result
        })
    }

    /// Stream data through the engine.
    ///
    /// `size` must be word aligned, and block aligned unless `is_last`. The
    /// last update does not finish the operation; `finish` is still required.
    pub fn update<H: HwAccess>(
        &mut self,
        hal: &mut H,
        owner: OwnerId,
        in_addr: Addr,
        out_addr: Addr,
        size: u32,
        is_last: bool,
    ) -> CryptoResult<()> {
        self.continuation(hal, owner, |aes, hal| {
            if size == 0 || size % 4 != 0 || (!is_last && size % AES_BLOCK_SIZE != 0) {
                Err(CryptoError::AES_INVALID_SIZE)?;
            }
            if aes.gmac {
                Err(CryptoError::AES_STATE_MISMATCH)?;
            }
            let max_polls = aes.max_polls;
            aes.with_swap(hal, |hal| {
                DmaXfer {
                    src: Some((in_addr, words(size), is_last)),
                    dst: Some((out_addr, words(size))),
                }
                .run(hal, max_polls)
            })
        })
    }

    /// Finish the active operation.
    ///
    /// Encryption writes the tag to `tag_addr`. Decryption checks the tag at
    /// `tag_addr` and fails with `AES_TAG_MISMATCH` if it does not match. The
    /// engine always returns to `Initialized` and is released.
    pub fn finish<H: HwAccess>(
        &mut self,
        hal: &mut H,
        owner: OwnerId,
        tag_addr: Addr,
    ) -> CryptoResult<()> {
        self.slot.check_context(owner)?;
        match self.state {
            AesState::EncryptActive => self.finish_encrypt(hal, owner, tag_addr),
            AesState::DecryptActive => self.finish_decrypt(hal, owner, tag_addr),
            _ => Err(CryptoError::AES_STATE_MISMATCH),
        }
    }

    fn finish_encrypt<H: HwAccess>(
        &mut self,
        hal: &mut H,
        owner: OwnerId,
        tag_addr: Addr,
    ) -> CryptoResult<()> {
        let max_polls = self.max_polls;
        let result = self.with_swap(hal, |hal| {
            DmaXfer {
                src: None,
                dst: Some((tag_addr, words(AES_BLOCK_SIZE))),
            }
            .run(hal, max_polls)
        });

        let cleared = self.clear_keys(hal, key_clear::KUP | key_clear::EXPANDED);
        self.state = AesState::Initialized;
        self.gmac = false;
        self.key_src = None;
        hal.set_reset(self.base, SOFT_RST);
        self.slot.release_owned(owner);
        result.and(cleared)
    }

    fn finish_decrypt<H: HwAccess>(
        &mut self,
        hal: &mut H,
        owner: OwnerId,
        tag_addr: Addr,
    ) -> CryptoResult<()> {
        let result = self.check_tag(hal, tag_addr);
        match result {
            Err(CryptoError::AES_GLITCH_DETECTED) => cprintln!("[aes] Glitch on tag check"),
            Err(CryptoError::AES_TAG_MISMATCH) => cprintln!("[aes] Tag mismatch"),
            _ => {}
        }

        self.next_blk_len = 0;
        if result.is_ok() && self.kup_save {
            self.next_blk_len = hal.read_reg(self.base, IV_3).wrapping_mul(4);
        }
        self.state = AesState::Initialized;
        self.gmac = false;
        self.key_src = None;

        let mut cleared = Ok(());
        if self.next_blk_len == 0 {
            cleared = self.clear_keys(hal, key_clear::KUP | key_clear::EXPANDED);
            hal.set_reset(self.base, SOFT_RST);
        }
        self.slot.release_owned(owner);
        result.and(cleared)
    }

    fn check_tag<H: HwAccess>(&self, hal: &mut H, tag_addr: Addr) -> CryptoResult<()> {
        let max_polls = self.max_polls;
        self.with_swap(hal, |hal| {
            DmaXfer {
                src: Some((tag_addr, words(AES_BLOCK_SIZE), true)),
                dst: None,
            }
            .run(hal, max_polls)
        })?;

        let done = STATUS_REG::DONE::SET.value;
        hal.wait_for_event(self.base, STATUS, done, done, self.max_polls)
            .map_err(|_| CryptoError::AES_DONE_TIMEOUT)?;
        if self.status(hal).is_set(STATUS_REG::ERROR) {
            Err(CryptoError::AES_HW_ERROR)?;
        }

        VerifiedCall::new(true).check(
            || self.status(hal).is_set(STATUS_REG::GCM_TAG_PASS),
            |_| CryptoError::AES_TAG_MISMATCH,
            CryptoError::AES_GLITCH_DETECTED,
        )
    }

    /// Request a key clear and verify the zeroed status of every bit in `mask`.
    ///
    /// The engine must be out of reset.
    fn clear_keys<H: HwAccess>(&self, hal: &mut H, mask: u32) -> CryptoResult<()> {
        self.write(hal, KEY_CLEAR, mask);
        let result = hal
            .wait_for_event(self.base, KEY_ZEROED_STATUS, mask, mask, self.max_polls)
            .map_err(|_| CryptoError::AES_KEY_CLEAR_TIMEOUT)
            .and_then(|_| {
                VerifiedCall::new(mask).check(
                    || hal.read_reg(self.base, KEY_ZEROED_STATUS) & mask,
                    |_| CryptoError::AES_KEY_CLEAR_TIMEOUT,
                    CryptoError::AES_GLITCH_DETECTED,
                )
            });
        self.write(hal, KEY_CLEAR, 0);
        result
    }

    /// Zeroize a key source, the expanded keys or every key.
    ///
    /// # Returns
    ///
    /// * `AES_KEY_NOT_CLEARABLE` before any register write for a source that
    ///   can't be cleared on its own
    /// * `AES_KEY_CLEAR_TIMEOUT` if the zeroed status does not show up
    pub fn key_zero<H: HwAccess>(
        &mut self,
        hal: &mut H,
        owner: OwnerId,
        target: KeyClearTarget,
    ) -> CryptoResult<()> {
        let mask = target.mask()?;
        self.single_shot(hal, owner, |aes, hal| {
            if aes.state == AesState::Uninitialized {
                Err(CryptoError::AES_STATE_MISMATCH)?;
            }
            let held = hal.read_reg(aes.base, SOFT_RST) != 0;
            if held {
                hal.release_reset(aes.base, SOFT_RST);
            }
            let result = aes.clear_keys(hal, mask);
            if held {
                hal.set_reset(aes.base, SOFT_RST);
            }
            result
        })
    }

    /// Decrypt a red key in place using a key encryption key.
    pub fn kek_decrypt<H: HwAccess>(
        &mut self,
        hal: &mut H,
        gate: KatGate,
        owner: OwnerId,
        params: &KekDecryptParams,
    ) -> CryptoResult<()> {
        let KekDecryptParams {
            kek_src,
            dst_src,
            iv_addr,
            key_size: size,
        } = *params;
        let kek = kek_src.policy();
        let dst = dst_src.policy();
        if !kek.kek_src_allowed {
            Err(CryptoError::AES_KEK_SRC_NOT_ALLOWED)?;
        }
        let dec_sel = dst.dec_sel.ok_or(CryptoError::AES_INVALID_KEY_SRC)?;
        if !owner.is_privileged() {
            Err(CryptoError::AES_DEVICE_KEY_NOT_ALLOWED)?;
        }
        if size == AesKeySize::Key128 && !(kek.allows_128 && dst.allows_128) {
            Err(CryptoError::AES_INVALID_KEY_SIZE)?;
        }
        gate.check(KatId::AES_DECRYPT, CryptoError::AES_KAT_NOT_EXECUTED)?;

        self.single_shot_begin(hal, owner)?;
        let result = self.kek_decrypt_hw(hal, kek, dst, dec_sel, iv_addr, size);
        self.write(hal, KEY_DEC_TRIG, 0);
        self.write(hal, KEY_DEC, 0);
        self.abandon(hal);
        self.slot.release_owned(owner);
        result
    }

    fn kek_decrypt_hw<H: HwAccess>(
        &self,
        hal: &mut H,
        kek: &KeySourcePolicy,
        dst: &KeySourcePolicy,
        dec_sel: u32,
        iv_addr: Addr,
        size: AesKeySize,
    ) -> CryptoResult<()> {
        hal.release_reset(self.base, SOFT_RST);
        self.write(hal, MODE, AesDirection::Decrypt.reg_value());
        self.key_load(hal, kek, size)?;
        self.write(hal, START_MSG, 1);
        self.transfer_iv(hal, iv_addr, true)?;

        self.write(hal, KEY_DEC, KEY_DEC_MAGIC);
        self.write(hal, KEY_DEC_SEL, dec_sel);
        self.write(hal, KEY_SEL, dst.sel);
        self.write(hal, KEY_DEC_TRIG, 1);

        let done = STATUS_REG::BLK_KEY_DEC_DONE::SET.value;
        hal.wait_for_event(self.base, STATUS, done, done, self.max_polls)
            .map_err(|_| CryptoError::AES_KEK_DECRYPT_TIMEOUT)
    }

    /// Enable or disable the DPA countermeasure.
    ///
    /// # Returns
    ///
    /// * `AES_DPA_CM_NOT_SUPPORTED` if the countermeasure is fused off
    /// * `AES_DPA_CM_CONFIG_MISMATCH` if the engine does not report the requested state
    pub fn set_dpa_cm<H: HwAccess>(
        &mut self,
        hal: &mut H,
        owner: OwnerId,
        enable: bool,
    ) -> CryptoResult<()> {
        self.single_shot(hal, owner, |aes, hal| {
            if aes.state == AesState::Uninitialized {
                Err(CryptoError::AES_STATE_MISMATCH)?;
            }
            if enable && dpa_cm_fused_off(hal) {
                Err(CryptoError::AES_DPA_CM_NOT_SUPPORTED)?;
            }
            hal.release_reset(aes.base, SOFT_RST);
            aes.write(hal, CM_EN, u32::from(enable));
            let result = VerifiedCall::new(enable).check(
                || aes.status(hal).is_set(STATUS_REG::CM_ENABLED),
                |_| CryptoError::AES_DPA_CM_CONFIG_MISMATCH,
                CryptoError::AES_GLITCH_DETECTED,
            );
            hal.set_reset(aes.base, SOFT_RST);
            result?;
            aes.dpa_cm = enable;
            Ok(())
        })
    }

    /// Enable or disable saving the key and IV carried at the end of a
    /// decrypted block, for key-rolled streams.
    pub fn cfg_kup_key_n_iv<H: HwAccess>(
        &mut self,
        hal: &mut H,
        owner: OwnerId,
        enable: bool,
    ) -> CryptoResult<()> {
        self.single_shot(hal, owner, |aes, hal| {
            aes.require_initialized()?;
            let val = if enable {
                KUP_WR_REG::KEY_SAVE::SET.value | KUP_WR_REG::IV_SAVE::SET.value
            } else {
                0
            };
            aes.write(hal, KUP_WR, val);
            aes.kup_save = enable;
            Ok(())
        })
    }

    /// Encrypt `data_len` bytes (or compute a GMAC when zero) in one call.
    pub fn encrypt_data<H: HwAccess>(
        &mut self,
        hal: &mut H,
        gate: KatGate,
        owner: OwnerId,
        params: &AesDataParams,
    ) -> CryptoResult<()> {
        self.process_data(hal, gate, owner, params, AesDirection::Encrypt)
    }

    /// Decrypt `data_len` bytes (or check a GMAC when zero) in one call.
    pub fn decrypt_data<H: HwAccess>(
        &mut self,
        hal: &mut H,
        gate: KatGate,
        owner: OwnerId,
        params: &AesDataParams,
    ) -> CryptoResult<()> {
        self.process_data(hal, gate, owner, params, AesDirection::Decrypt)
    }

    fn process_data<H: HwAccess>(
        &mut self,
        hal: &mut H,
        gate: KatGate,
        owner: OwnerId,
        params: &AesDataParams,
        direction: AesDirection,
    ) -> CryptoResult<()> {
        if params.data_len == 0 && params.aad_len == 0 {
            Err(CryptoError::AES_INVALID_SIZE)?;
        }
        self.operation_init(
            hal,
            gate,
            owner,
            &AesOpParams {
                key_src: params.key_src,
                key_size: params.key_size,
                iv_addr: params.iv_addr,
                direction,
            },
        )?;
        if params.data_len == 0 {
            self.gmac_cfg(hal, owner, true)?;
        }
        if params.aad_len != 0 {
            self.update_aad(hal, owner, params.aad_addr, params.aad_len)?;
        }
        if params.data_len != 0 {
            self.update(
                hal,
                owner,
                params.in_addr,
                params.out_addr,
                params.data_len,
                true,
            )?;
        }
        self.finish(hal, owner, params.tag_addr)
    }

    /// Run one split-mode decryption with the DPA countermeasure enabled.
    ///
    /// Used by the countermeasure self test only. The key goes through user
    /// key 7 and is cleared afterwards. A running operation is preempted and
    /// its owner sees `ARBITER_DATA_CONTEXT_LOST` on its next call.
    ///
    /// # Returns
    ///
    /// * `AES_STATE_MISMATCH` if the engine is not initialized
    /// * `AES_DPA_CM_NOT_SUPPORTED` if the countermeasure is fused off
    pub fn dpa_cm_split_decrypt<H: HwAccess>(
        &mut self,
        hal: &mut H,
        _token: SelfTestToken,
        run: &DpaCmRun,
    ) -> CryptoResult<()> {
        if self.state == AesState::Uninitialized {
            Err(CryptoError::AES_STATE_MISMATCH)?;
        }
        if dpa_cm_fused_off(hal) {
            Err(CryptoError::AES_DPA_CM_NOT_SUPPORTED)?;
        }

        let owner = OwnerId::PRIVILEGED;
        self.acquire_idle(hal, owner)?;
        let key = AesKeySrc::User7.policy();
        let cm_was = hal.read_reg(self.base, CM_EN);

        hal.release_reset(self.base, SOFT_RST);
        let result = self.dpa_cm_split_hw(hal, key, run);

        self.write(hal, SPLIT_CFG, 0);
        let cleared = self.clear_keys(hal, key_clear::USER_0 << 7 | key_clear::EXPANDED);
        self.write(hal, CM_EN, cm_was);
        self.abandon(hal);
        self.slot.release_owned(owner);
        result.and(cleared)
    }

    fn dpa_cm_split_hw<H: HwAccess>(
        &self,
        hal: &mut H,
        key: &KeySourcePolicy,
        run: &DpaCmRun,
    ) -> CryptoResult<()> {
        self.write_key_regs(hal, key, AesKeySize::Key256, run.key_addr)?;
        self.write(hal, CM_EN, 1);
        self.write(hal, MODE, AesDirection::Decrypt.reg_value());
        self.write(
            hal,
            SPLIT_CFG,
            SPLIT_CFG_REG::KEY_SPLIT::SET.value | SPLIT_CFG_REG::DATA_SPLIT::SET.value,
        );
        for i in 0..8 {
            self.write(hal, KEY_MASK_0 + i * 4, 0);
        }
        self.key_load(hal, key, AesKeySize::Key256)?;
        self.write(hal, START_MSG, 1);
        hal.write_reg(SSS_BASE, sss::CFG, sss::ROUTE_DMA0_AES);

        DmaXfer {
            src: Some((run.data_addr, DPA_CM_XFER_WORDS, true)),
            dst: Some((run.out_addr, DPA_CM_XFER_WORDS)),
        }
        .run(hal, self.max_polls)
    }
}

/// True when the eFuses disable the DPA countermeasure.
pub fn dpa_cm_fused_off<H: HwAccess>(hal: &H) -> bool {
    let misc = hal.read_reg(EFUSE_CACHE_BASE, efuse::SECURITY_MISC1);
    misc & efuse::DPA_CM_DIS_MASK == efuse::DPA_CM_DIS_MASK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kat_status::KatStatusRegistry;
    use crate::reg::aes_regs;
    use std::collections::BTreeMap;

    /// Register file that records writes and reports every wait as done.
    #[derive(Default)]
    struct RecordingHal {
        regs: BTreeMap<(u32, u32), u32>,
        writes: Vec<(u32, u32, u32)>,
        mem: Vec<u8>,
    }

    impl HwAccess for RecordingHal {
        fn read_reg(&self, base: u32, offset: u32) -> u32 {
            match (base, offset) {
                (AES_BASE, STATUS) => 0xFFFF_FFFF,
                (AES_BASE, KEY_ZEROED_STATUS) => {
                    self.regs.get(&(base, KEY_CLEAR)).copied().unwrap_or(0)
                }
                _ => self.regs.get(&(base, offset)).copied().unwrap_or(0),
            }
        }

        fn write_reg(&mut self, base: u32, offset: u32, val: u32) {
            self.writes.push((base, offset, val));
            self.regs.insert((base, offset), val);
        }

        fn dma_config_endianness(&mut self, _channel: DmaChannel, _enable: bool) {}

        fn dma_transfer(
            &mut self,
            _channel: DmaChannel,
            _addr: Addr,
            _words: u32,
            _last: bool,
        ) -> CryptoResult<()> {
            Ok(())
        }

        fn dma_transfer_local(&mut self, _data: &[u8], _last: bool) -> CryptoResult<()> {
            Ok(())
        }

        fn dma_wait_done(&mut self, _channel: DmaChannel, _max_polls: u32) -> CryptoResult<()> {
            Ok(())
        }

        fn mem_read(&self, addr: Addr, buf: &mut [u8]) -> CryptoResult<()> {
            let start = addr as usize;
            buf.copy_from_slice(&self.mem[start..start + buf.len()]);
            Ok(())
        }

        fn mem_write(&mut self, addr: Addr, data: &[u8]) -> CryptoResult<()> {
            let start = addr as usize;
            self.mem[start..start + data.len()].copy_from_slice(data);
            Ok(())
        }
    }

    fn owner() -> OwnerId {
        OwnerId::new(1).unwrap()
    }

    fn engine(hal: &mut RecordingHal) -> AesEngine {
        let mut aes = AesEngine::new(&DriverConfig::default());
        aes.init(hal, owner()).unwrap();
        aes
    }

    #[test]
    fn test_write_key_reverses_words() {
        let mut hal = RecordingHal {
            mem: (0u8..32).collect(),
            ..Default::default()
        };
        let mut aes = engine(&mut hal);
        aes.write_key(&mut hal, owner(), AesKeySrc::User1, AesKeySize::Key256, 0)
            .unwrap();

        let base = aes_regs::USER_KEY_0_0 + aes_regs::USER_KEY_STRIDE;
        assert_eq!(hal.regs[&(AES_BASE, base + 7 * 4)], 0x0001_0203);
        assert_eq!(hal.regs[&(AES_BASE, base)], 0x1C1D_1E1F);
        assert!(!aes.slot().is_busy());
    }

    #[test]
    fn test_write_key_rejects_device_keys() {
        let mut hal = RecordingHal::default();
        let mut aes = engine(&mut hal);
        let before = hal.writes.len();
        assert_eq!(
            aes.write_key(&mut hal, owner(), AesKeySrc::BootHeader, AesKeySize::Key256, 0),
            Err(CryptoError::AES_KEY_SRC_NOT_WRITABLE)
        );
        assert_eq!(
            aes.write_key(&mut hal, owner(), AesKeySrc::Efuse, AesKeySize::Key256, 0),
            Err(CryptoError::AES_KEY_SRC_NOT_WRITABLE)
        );
        assert_eq!(hal.writes.len(), before);
    }

    #[test]
    fn test_kat_gate_blocks_before_hardware() {
        let mut hal = RecordingHal::default();
        let mut aes = engine(&mut hal);
        let registry = KatStatusRegistry::new();
        let before = hal.writes.len();

        let params = AesOpParams {
            key_src: AesKeySrc::User0,
            key_size: AesKeySize::Key256,
            iv_addr: 0,
            direction: AesDirection::Encrypt,
        };
        assert_eq!(
            aes.operation_init(&mut hal, KatGate::from(&registry), owner(), &params),
            Err(CryptoError::AES_KAT_NOT_EXECUTED)
        );
        assert_eq!(hal.writes.len(), before);
        assert_eq!(aes.state(), AesState::Initialized);
        assert!(!aes.slot().is_busy());
    }

    #[test]
    fn test_device_key_refused_for_callers() {
        let mut hal = RecordingHal::default();
        let mut aes = engine(&mut hal);
        let token = unsafe { SelfTestToken::new() };
        let params = AesOpParams {
            key_src: AesKeySrc::Bbram,
            key_size: AesKeySize::Key256,
            iv_addr: 0,
            direction: AesDirection::Decrypt,
        };
        assert_eq!(
            aes.operation_init(&mut hal, KatGate::SelfTest(token), owner(), &params),
            Err(CryptoError::AES_DEVICE_KEY_NOT_ALLOWED)
        );
    }

    #[test]
    fn test_boot_header_key_zero_rejected_without_writes() {
        let mut hal = RecordingHal::default();
        let mut aes = engine(&mut hal);
        let before = hal.writes.len();
        assert_eq!(
            aes.key_zero(
                &mut hal,
                owner(),
                KeyClearTarget::Source(AesKeySrc::BootHeader)
            ),
            Err(CryptoError::AES_KEY_NOT_CLEARABLE)
        );
        assert_eq!(hal.writes.len(), before);
    }

    #[test]
    fn test_key_zero_restores_clear_request() {
        let mut hal = RecordingHal::default();
        let mut aes = engine(&mut hal);
        aes.key_zero(&mut hal, owner(), KeyClearTarget::Source(AesKeySrc::User3))
            .unwrap();
        assert!(hal
            .writes
            .contains(&(AES_BASE, KEY_CLEAR, key_clear::USER_0 << 3)));
        assert_eq!(hal.regs[&(AES_BASE, KEY_CLEAR)], 0);
        assert_eq!(hal.regs[&(AES_BASE, SOFT_RST)], 1);
    }

    #[test]
    fn test_continuation_without_operation() {
        let mut hal = RecordingHal::default();
        let mut aes = engine(&mut hal);
        assert_eq!(
            aes.update(&mut hal, owner(), 0, 0, 16, false),
            Err(CryptoError::AES_STATE_MISMATCH)
        );
        assert_eq!(
            aes.finish(&mut hal, owner(), 0),
            Err(CryptoError::AES_STATE_MISMATCH)
        );
    }

    #[test]
    fn test_uninitialized_engine() {
        let mut hal = RecordingHal::default();
        let mut aes = AesEngine::new(&DriverConfig::default());
        let token = unsafe { SelfTestToken::new() };
        let params = AesOpParams {
            key_src: AesKeySrc::User0,
            key_size: AesKeySize::Key128,
            iv_addr: 0,
            direction: AesDirection::Encrypt,
        };
        assert_eq!(
            aes.operation_init(&mut hal, KatGate::SelfTest(token), owner(), &params),
            Err(CryptoError::AES_STATE_MISMATCH)
        );
        assert!(!aes.slot().is_busy());
        assert_eq!(
            aes.set_dpa_cm(&mut hal, owner(), true),
            Err(CryptoError::AES_STATE_MISMATCH)
        );
    }
}
