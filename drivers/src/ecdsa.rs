/*++

Licensed under the Apache-2.0 license.

File Name:

    ecdsa.rs

Abstract:

    File contains API for the ECDSA engine: public key generation, signing,
    signature verification and public key validation over the NIST prime
    curves.

--*/

use bitflags::bitflags;
use tock_registers::LocalRegisterCopy;

use crate::arbiter::{EngineSlot, OwnerId};
use crate::hal::{Addr, HwAccess};
use crate::kat_status::{KatGate, KatId};
use crate::layout::{copy_with_layout, Layout};
use crate::reg::ecdsa_regs::*;
use crate::reg::ECDSA_BASE;
use crate::{cprintln, wait, DriverConfig};
use cryptoeng_cfi_lib::{zeroize_verified, VerifiedCall};
use cryptoeng_error::{CryptoError, CryptoResult};

/// Largest operand in bytes (P-521)
pub const ECC_MAX_SIZE: usize = 66;

const SLOT_WORDS: u32 = SLOT_BYTES / 4;

bitflags! {
    /// Set of curves an engine accepts
    pub struct CurveSet: u32 {
        const P256 = 1 << 0;
        const P384 = 1 << 1;
        const P521 = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    P256,
    P384,
    P521,
}

impl Curve {
    /// Operand size in bytes
    pub const fn size(&self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }

    pub fn flag(&self) -> CurveSet {
        match self {
            Self::P256 => CurveSet::P256,
            Self::P384 => CurveSet::P384,
            Self::P521 => CurveSet::P521,
        }
    }

    fn ctrl_value(&self) -> u32 {
        match self {
            Self::P256 => CTRL_REG::CURVE::P256.value,
            Self::P384 => CTRL_REG::CURVE::P384.value,
            Self::P521 => CTRL_REG::CURVE::P521.value,
        }
    }
}

impl TryFrom<u32> for Curve {
    type Error = CryptoError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::P256),
            1 => Ok(Self::P384),
            2 => Ok(Self::P521),
            _ => Err(CryptoError::ECDSA_UNSUPPORTED_CURVE),
        }
    }
}

/// Signature generation request. The signature is written as `r || s`.
#[derive(Debug, Clone, Copy)]
pub struct EcdsaSignParams {
    pub curve: Curve,
    pub key_addr: Addr,
    pub ephemeral_addr: Addr,
    pub hash_addr: Addr,
    pub hash_len: u32,
    pub sig_addr: Addr,
}

/// Signature verification request. The public key is read as `x || y`.
#[derive(Debug, Clone, Copy)]
pub struct EcdsaVerifyParams {
    pub curve: Curve,
    pub pub_key_addr: Addr,
    pub hash_addr: Addr,
    pub hash_len: u32,
    pub sig_addr: Addr,
}

/// Operands staged in engine byte order
struct Operands {
    d: [u8; ECC_MAX_SIZE],
    k: [u8; ECC_MAX_SIZE],
    hash: [u8; ECC_MAX_SIZE],
    hash_len: usize,
    qx: [u8; ECC_MAX_SIZE],
    qy: [u8; ECC_MAX_SIZE],
    r: [u8; ECC_MAX_SIZE],
    s: [u8; ECC_MAX_SIZE],
}

impl Operands {
    const fn new() -> Self {
        Self {
            d: [0; ECC_MAX_SIZE],
            k: [0; ECC_MAX_SIZE],
            hash: [0; ECC_MAX_SIZE],
            hash_len: 0,
            qx: [0; ECC_MAX_SIZE],
            qy: [0; ECC_MAX_SIZE],
            r: [0; ECC_MAX_SIZE],
            s: [0; ECC_MAX_SIZE],
        }
    }

    fn wipe(&mut self) -> CryptoResult<()> {
        let d = zeroize_verified(&mut self.d);
        let k = zeroize_verified(&mut self.k);
        zeroize_verified(&mut self.hash)?;
        zeroize_verified(&mut self.qx)?;
        zeroize_verified(&mut self.qy)?;
        zeroize_verified(&mut self.r)?;
        zeroize_verified(&mut self.s)?;
        d.and(k)
    }
}

// Pairwise consistency test inputs, big endian. P-521 operands are the same
// values zero extended.
const PWCT_MSG: [u8; 48] = [
    0x2F, 0xBF, 0x02, 0x9E, 0xE9, 0xFB, 0xD6, 0x11, 0xC2, 0x4D, 0x81, 0x4E, 0x6A, 0xFF, 0x26, 0x77,
    0xC3, 0x5A, 0x83, 0xBC, 0xE5, 0x63, 0x2C, 0xE7, 0x89, 0x43, 0x6C, 0x68, 0x82, 0xCA, 0x1C, 0x71,
    0xF8, 0x2B, 0x72, 0xD3, 0xA4, 0xC2, 0x8E, 0x10, 0xD8, 0x25, 0x5D, 0x21, 0x33, 0xD5, 0xCA, 0x38,
];

const PWCT_EPHEMERAL: [u8; 48] = [
    0x36, 0x77, 0xFB, 0xF9, 0xBB, 0x2D, 0x96, 0xA3, 0x1B, 0x01, 0x11, 0x08, 0x57, 0x93, 0x8C, 0xC4,
    0x9D, 0x9A, 0x30, 0xA4, 0xE0, 0x0E, 0x9C, 0xD4, 0xB5, 0x5D, 0x97, 0x77, 0x58, 0x0C, 0x84, 0xC7,
    0x0C, 0x67, 0x48, 0x94, 0xE8, 0x53, 0xD3, 0x6B, 0xBE, 0xC6, 0xC2, 0x1F, 0xDC, 0xFC, 0x7B, 0xD1,
];

/// Big endian PWCT operand for a curve of `len` bytes
fn pwct_operand(src: &[u8; 48], len: usize, out: &mut [u8; ECC_MAX_SIZE]) {
    out.fill(0);
    if len <= src.len() {
        out[..len].copy_from_slice(&src[..len]);
    } else {
        out[len - src.len()..len].copy_from_slice(src);
    }
}

/// Error for a hardware result code
fn result_error(code: u32) -> CryptoError {
    match code {
        result::KEY_ZERO => CryptoError::ECDSA_KEY_ZERO,
        result::KEY_WRONG_ORDER => CryptoError::ECDSA_KEY_WRONG_ORDER,
        result::KEY_NOT_ON_CURVE => CryptoError::ECDSA_KEY_NOT_ON_CURVE,
        result::BAD_SIGN => CryptoError::ECDSA_BAD_SIGNATURE,
        result::BAD_RANDOM_NUMBER => CryptoError::ECDSA_BAD_RANDOM_NUMBER,
        result::INCORRECT_HASH_LEN => CryptoError::ECDSA_INCORRECT_HASH_LEN,
        result::R_S_ZERO_OR_ORDER => CryptoError::ECDSA_SIGNATURE_R_S_ZERO,
        _ => CryptoError::ECDSA_HW_ERROR,
    }
}

/// ECDSA engine context
#[derive(Debug)]
pub struct EcdsaEngine {
    base: u32,
    slot: EngineSlot,
    max_polls: u32,
    layout: Layout,
    curves: CurveSet,
}

impl EcdsaEngine {
    pub fn new(cfg: &DriverConfig) -> Self {
        Self {
            base: ECDSA_BASE,
            slot: EngineSlot::new(),
            max_polls: cfg.max_polls,
            layout: cfg.ecc_layout,
            curves: cfg.ecc_curves,
        }
    }

    pub fn slot(&self) -> &EngineSlot {
        &self.slot
    }

    /// Byte order of operands in caller memory
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Derive the public key of the private key at `key_addr` and write it to
    /// `pub_key_addr` as `x || y`.
    ///
    /// The derived key is validated and a pairwise consistency test signs and
    /// verifies a fixed message before anything is written back.
    pub fn generate_public_key<H: HwAccess>(
        &mut self,
        hal: &mut H,
        gate: KatGate,
        owner: OwnerId,
        curve: Curve,
        key_addr: Addr,
        pub_key_addr: Addr,
    ) -> CryptoResult<()> {
        self.check_curve(curve)?;
        gate.check(KatId::ECDSA_SIGN, CryptoError::ECDSA_KAT_NOT_EXECUTED)?;
        self.single_shot(hal, owner, |eng, hal, ops| {
            let len = curve.size();
            eng.load(hal, key_addr, &mut ops.d, len)?;
            eng.write_slot(hal, SLOT_D, &ops.d[..len]);
            eng.execute(hal, curve, CTRL_REG::OPCODE::PublicKey.value)?;
            eng.read_slot(hal, SLOT_QX, &mut ops.qx[..len]);
            eng.read_slot(hal, SLOT_QY, &mut ops.qy[..len]);

            eng.execute(hal, curve, CTRL_REG::OPCODE::Validate.value)?;
            eng.pairwise_test(hal, curve, ops).map_err(|e| {
                cprintln!("[ecdsa] Pairwise consistency test failed");
                if e.is_fatal() {
                    e
                } else {
                    CryptoError::ECDSA_PWCT_FAILED
                }
            })?;

            eng.store(hal, pub_key_addr, &ops.qx, len)?;
            eng.store(hal, pub_key_addr + len as Addr, &ops.qy, len)
        })
    }

    /// Sign the hash with the private and ephemeral keys of `params`.
    pub fn sign<H: HwAccess>(
        &mut self,
        hal: &mut H,
        gate: KatGate,
        owner: OwnerId,
        params: &EcdsaSignParams,
    ) -> CryptoResult<()> {
        let curve = params.curve;
        self.check_curve(curve)?;
        check_hash_len(params.hash_len)?;
        gate.check(KatId::ECDSA_SIGN, CryptoError::ECDSA_KAT_NOT_EXECUTED)?;
        self.single_shot(hal, owner, |eng, hal, ops| {
            let len = curve.size();
            eng.load(hal, params.key_addr, &mut ops.d, len)?;
            eng.load(hal, params.ephemeral_addr, &mut ops.k, len)?;
            ops.hash_len = params.hash_len as usize;
            eng.load(hal, params.hash_addr, &mut ops.hash, ops.hash_len)?;
            eng.sign_hw(hal, curve, ops)?;
            eng.store(hal, params.sig_addr, &ops.r, len)?;
            eng.store(hal, params.sig_addr + len as Addr, &ops.s, len)
        })
    }

    /// Verify a `r || s` signature over the hash.
    ///
    /// # Returns
    ///
    /// * `ECDSA_BAD_SIGNATURE` if the signature does not match
    pub fn verify<H: HwAccess>(
        &mut self,
        hal: &mut H,
        gate: KatGate,
        owner: OwnerId,
        params: &EcdsaVerifyParams,
    ) -> CryptoResult<()> {
        let curve = params.curve;
        self.check_curve(curve)?;
        check_hash_len(params.hash_len)?;
        gate.check(KatId::ECDSA_VERIFY, CryptoError::ECDSA_KAT_NOT_EXECUTED)?;
        self.single_shot(hal, owner, |eng, hal, ops| {
            let len = curve.size();
            eng.load(hal, params.pub_key_addr, &mut ops.qx, len)?;
            eng.load(hal, params.pub_key_addr + len as Addr, &mut ops.qy, len)?;
            eng.load(hal, params.sig_addr, &mut ops.r, len)?;
            eng.load(hal, params.sig_addr + len as Addr, &mut ops.s, len)?;
            ops.hash_len = params.hash_len as usize;
            eng.load(hal, params.hash_addr, &mut ops.hash, ops.hash_len)?;
            eng.verify_hw(hal, curve, ops)
        })
    }

    /// Check that the `x || y` public key at `pub_key_addr` is on the curve
    /// and of the right order.
    pub fn validate_public_key<H: HwAccess>(
        &mut self,
        hal: &mut H,
        gate: KatGate,
        owner: OwnerId,
        curve: Curve,
        pub_key_addr: Addr,
    ) -> CryptoResult<()> {
        self.check_curve(curve)?;
        gate.check(KatId::ECDSA_VERIFY, CryptoError::ECDSA_KAT_NOT_EXECUTED)?;
        self.single_shot(hal, owner, |eng, hal, ops| {
            let len = curve.size();
            eng.load(hal, pub_key_addr, &mut ops.qx, len)?;
            eng.load(hal, pub_key_addr + len as Addr, &mut ops.qy, len)?;
            eng.write_slot(hal, SLOT_QX, &ops.qx[..len]);
            eng.write_slot(hal, SLOT_QY, &ops.qy[..len]);
            eng.execute(hal, curve, CTRL_REG::OPCODE::Validate.value)
        })
    }

    fn check_curve(&self, curve: Curve) -> CryptoResult<()> {
        if !self.curves.contains(curve.flag()) {
            Err(CryptoError::ECDSA_UNSUPPORTED_CURVE)?;
        }
        Ok(())
    }

    /// Claim the engine, run `f` with freshly zeroed operands out of reset,
    /// then wipe operands and engine RAM and release on every path.
    fn single_shot<H, F>(&mut self, hal: &mut H, owner: OwnerId, f: F) -> CryptoResult<()>
    where
        H: HwAccess,
        F: FnOnce(&Self, &mut H, &mut Operands) -> CryptoResult<()>,
    {
        self.slot.begin_operation(owner)?;
        hal.release_reset(self.base, RESET);

        let mut ops = Operands::new();
        let result = f(self, hal, &mut ops);
        let wiped = ops.wipe();
        self.clear_ram(hal);
        hal.set_reset(self.base, RESET);
        self.slot.release_owned(owner);

        if let Err(e) = result {
            cprintln!("[ecdsa] Operation failed 0x{:08X}", u32::from(e));
        }
        wiped?;
        result
    }

    fn sign_hw<H: HwAccess>(&self, hal: &mut H, curve: Curve, ops: &mut Operands) -> CryptoResult<()> {
        let len = curve.size();
        self.write_slot(hal, SLOT_D, &ops.d[..len]);
        self.write_slot(hal, SLOT_K, &ops.k[..len]);
        self.write_slot(hal, SLOT_HASH, &ops.hash[..ops.hash_len]);
        hal.write_reg(self.base, HASH_LEN, ops.hash_len as u32);
        self.execute(hal, curve, CTRL_REG::OPCODE::Sign.value)?;
        self.read_slot(hal, SLOT_R, &mut ops.r[..len]);
        self.read_slot(hal, SLOT_S, &mut ops.s[..len]);
        Ok(())
    }

    fn verify_hw<H: HwAccess>(&self, hal: &mut H, curve: Curve, ops: &Operands) -> CryptoResult<()> {
        let len = curve.size();
        self.write_slot(hal, SLOT_QX, &ops.qx[..len]);
        self.write_slot(hal, SLOT_QY, &ops.qy[..len]);
        self.write_slot(hal, SLOT_R, &ops.r[..len]);
        self.write_slot(hal, SLOT_S, &ops.s[..len]);
        self.write_slot(hal, SLOT_HASH, &ops.hash[..ops.hash_len]);
        hal.write_reg(self.base, HASH_LEN, ops.hash_len as u32);
        self.execute(hal, curve, CTRL_REG::OPCODE::Verify.value)
    }

    /// Sign a fixed message with the new private key and verify it with the
    /// derived public key.
    fn pairwise_test<H: HwAccess>(
        &self,
        hal: &mut H,
        curve: Curve,
        ops: &mut Operands,
    ) -> CryptoResult<()> {
        let len = curve.size();
        let mut be = [0u8; ECC_MAX_SIZE];

        pwct_operand(&PWCT_EPHEMERAL, len, &mut be);
        copy_with_layout(&mut ops.k, &be, len, Layout::Reversed, CryptoError::ECDSA_INVALID_PARAM)?;
        pwct_operand(&PWCT_MSG, len, &mut be);
        copy_with_layout(&mut ops.hash, &be, len, Layout::Reversed, CryptoError::ECDSA_INVALID_PARAM)?;
        ops.hash_len = len;

        self.sign_hw(hal, curve, ops)?;
        self.verify_hw(hal, curve, ops)
    }

    /// Start `opcode`, wait for completion and decode the result code.
    fn execute<H: HwAccess>(&self, hal: &mut H, curve: Curve, opcode: u32) -> CryptoResult<()> {
        hal.write_reg(
            self.base,
            CTRL,
            opcode | curve.ctrl_value() | CTRL_REG::START::SET.value,
        );
        wait::until(self.max_polls, CryptoError::ECDSA_TIMEOUT, || {
            let status: LocalRegisterCopy<u32, STATUS_REG::Register> =
                LocalRegisterCopy::new(hal.read_reg(self.base, STATUS));
            status.is_set(STATUS_REG::DONE)
        })?;

        let result = VerifiedCall::new(result::SUCCESS).check(
            || hal.read_reg(self.base, RESULT),
            result_error,
            CryptoError::ECDSA_GLITCH_DETECTED,
        );
        if result == Err(CryptoError::ECDSA_GLITCH_DETECTED) {
            cprintln!("[ecdsa] Result code glitch");
        }
        result
    }

    /// Read `len` bytes of caller memory into `dst` in engine byte order.
    fn load<H: HwAccess>(
        &self,
        hal: &H,
        addr: Addr,
        dst: &mut [u8; ECC_MAX_SIZE],
        len: usize,
    ) -> CryptoResult<()> {
        let mut raw = [0u8; ECC_MAX_SIZE];
        let result = hal
            .mem_read(addr, raw.get_mut(..len).ok_or(CryptoError::ECDSA_INVALID_PARAM)?)
            .and_then(|_| {
                copy_with_layout(dst, &raw, len, self.layout, CryptoError::ECDSA_INVALID_PARAM)
            });
        zeroize_verified(&mut raw)?;
        result
    }

    /// Write `len` bytes of an engine order operand to caller memory.
    fn store<H: HwAccess>(
        &self,
        hal: &mut H,
        addr: Addr,
        src: &[u8; ECC_MAX_SIZE],
        len: usize,
    ) -> CryptoResult<()> {
        let mut raw = [0u8; ECC_MAX_SIZE];
        copy_with_layout(&mut raw, src, len, self.layout, CryptoError::ECDSA_INVALID_PARAM)?;
        hal.mem_write(addr, &raw[..len])
    }

    fn write_slot<H: HwAccess>(&self, hal: &mut H, slot: u32, bytes: &[u8]) {
        let offset = RAM + slot * SLOT_BYTES;
        for i in 0..SLOT_WORDS {
            let mut word = [0u8; 4];
            for (j, b) in word.iter_mut().enumerate() {
                *b = bytes.get(i as usize * 4 + j).copied().unwrap_or(0);
            }
            hal.write_reg(self.base, offset + i * 4, u32::from_le_bytes(word));
        }
    }

    fn read_slot<H: HwAccess>(&self, hal: &H, slot: u32, bytes: &mut [u8]) {
        let offset = RAM + slot * SLOT_BYTES;
        for (i, chunk) in bytes.chunks_mut(4).enumerate() {
            let word = hal.read_reg(self.base, offset + i as u32 * 4).to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn clear_ram<H: HwAccess>(&self, hal: &mut H) {
        for i in 0..SLOT_COUNT * SLOT_WORDS {
            hal.write_reg(self.base, RAM + i * 4, 0);
        }
    }
}

fn check_hash_len(hash_len: u32) -> CryptoResult<()> {
    if hash_len == 0 || hash_len as usize > ECC_MAX_SIZE {
        Err(CryptoError::ECDSA_INVALID_PARAM)?;
    }
    Ok(())
}
