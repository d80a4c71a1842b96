/*++

Licensed under the Apache-2.0 license.

File Name:

    rsa.rs

Abstract:

    File contains API for the RSA modular exponentiation engine.

--*/

use tock_registers::LocalRegisterCopy;

use crate::arbiter::{EngineSlot, OwnerId};
use crate::hal::{Addr, HwAccess};
use crate::kat_status::{KatGate, KatId};
use crate::reg::rsa_regs::*;
use crate::reg::RSA_BASE;
use crate::{cprintln, wait, DriverConfig};
use cryptoeng_cfi_lib::{zeroize_verified, VerifiedCall};
use cryptoeng_error::{CryptoError, CryptoResult};

/// Largest operand in bytes
pub const RSA_MAX_SIZE: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsaKeySize {
    Rsa2048,
    Rsa3072,
    Rsa4096,
}

impl RsaKeySize {
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Rsa2048 => 256,
            Self::Rsa3072 => 384,
            Self::Rsa4096 => 512,
        }
    }

    pub const fn bits(&self) -> u32 {
        self.bytes() as u32 * 8
    }

    /// Words of each operand region in use
    pub const fn operand_words(&self) -> u32 {
        self.bytes() as u32 / 4
    }
}

impl TryFrom<u32> for RsaKeySize {
    type Error = CryptoError;

    /// Key size from its length in bits
    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            2048 => Ok(Self::Rsa2048),
            3072 => Ok(Self::Rsa3072),
            4096 => Ok(Self::Rsa4096),
            _ => Err(CryptoError::RSA_INVALID_KEY_SIZE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsaDirection {
    PublicEncrypt,
    PrivateDecrypt,
}

/// Exponent of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsaExponent {
    /// Public exponent
    Public(u32),

    /// Address of the private exponent, big endian, key size bytes
    Private(Addr),
}

impl RsaExponent {
    pub fn direction(&self) -> RsaDirection {
        match self {
            Self::Public(_) => RsaDirection::PublicEncrypt,
            Self::Private(_) => RsaDirection::PrivateDecrypt,
        }
    }
}

/// Parameters of one exponentiation. Operands are big endian in caller memory.
#[derive(Debug, Clone, Copy)]
pub struct RsaParams {
    pub key_size: RsaKeySize,
    pub modulus_addr: Addr,
    pub exponent: RsaExponent,

    /// Precomputed R^2 mod N; computed by the engine when absent
    pub ext_addr: Option<Addr>,

    pub input_addr: Addr,
    pub output_addr: Addr,
}

/// RSA engine context
#[derive(Debug)]
pub struct RsaEngine {
    base: u32,
    slot: EngineSlot,
    max_polls: u32,
}

impl RsaEngine {
    pub fn new(cfg: &DriverConfig) -> Self {
        Self {
            base: RSA_BASE,
            slot: EngineSlot::new(),
            max_polls: cfg.max_polls,
        }
    }

    pub fn slot(&self) -> &EngineSlot {
        &self.slot
    }

    /// Compute `input ^ exponent mod modulus` and write it to `output_addr`.
    ///
    /// A private decryption always zeroizes the whole operand RAM and reads it
    /// back before returning, whatever the outcome; a failed zeroization is
    /// reported in place of any other result.
    pub fn operation<H: HwAccess>(
        &mut self,
        hal: &mut H,
        gate: KatGate,
        owner: OwnerId,
        params: &RsaParams,
    ) -> CryptoResult<()> {
        let direction = params.exponent.direction();
        let kat = match direction {
            RsaDirection::PublicEncrypt => KatId::RSA_PUB_ENC,
            RsaDirection::PrivateDecrypt => KatId::RSA_PRIV_DEC,
        };
        gate.check(kat, CryptoError::RSA_KAT_NOT_EXECUTED)?;
        self.slot.begin_operation(owner)?;

        let mut buf = [0u8; RSA_MAX_SIZE];
        hal.release_reset(self.base, RESET);
        let result = self.exponentiate(hal, params, &mut buf);
        let wiped = zeroize_verified(&mut buf);

        let mut ram_clean = Ok(());
        if direction == RsaDirection::PrivateDecrypt {
            ram_clean = self.zeroize_ram(hal);
            if ram_clean.is_err() {
                cprintln!("[rsa] Operand RAM not clean");
            }
        }
        hal.set_reset(self.base, RESET);
        self.slot.release_owned(owner);

        ram_clean?;
        wiped?;
        result
    }

    fn exponentiate<H: HwAccess>(
        &self,
        hal: &mut H,
        params: &RsaParams,
        buf: &mut [u8; RSA_MAX_SIZE],
    ) -> CryptoResult<()> {
        let size = params.key_size;
        let len = size.bytes();

        hal.mem_read(params.modulus_addr, &mut buf[..len])?;
        if buf[len - 1] & 1 == 0 || buf[0] == 0 {
            Err(CryptoError::RSA_INVALID_PARAM)?;
        }
        self.write_operand(hal, RAM_MODULUS, &buf[..len]);
        let n0 = u32::from_be_bytes([buf[len - 4], buf[len - 3], buf[len - 2], buf[len - 1]]);
        let mut modulus = [0u8; RSA_MAX_SIZE];
        modulus[..len].copy_from_slice(&buf[..len]);

        hal.mem_read(params.input_addr, &mut buf[..len])?;
        if buf[..len] >= modulus[..len] {
            Err(CryptoError::RSA_INVALID_PARAM)?;
        }
        self.write_operand(hal, RAM_DATA, &buf[..len]);

        match params.exponent {
            RsaExponent::Public(e) => {
                if e == 0 {
                    Err(CryptoError::RSA_INVALID_PARAM)?;
                }
                buf[..len].fill(0);
                buf[len - 4..len].copy_from_slice(&e.to_be_bytes());
            }
            RsaExponent::Private(addr) => hal.mem_read(addr, &mut buf[..len])?,
        }
        self.write_operand(hal, RAM_EXPONENT, &buf[..len]);

        let opcode = match params.ext_addr {
            Some(addr) => {
                hal.mem_read(addr, &mut buf[..len])?;
                self.write_operand(hal, RAM_EXTENSION, &buf[..len]);
                CTRL_REG::OPCODE::Exp.value
            }
            None => CTRL_REG::OPCODE::ExpPrecalc.value,
        };

        hal.write_reg(self.base, MINV, minv(n0));
        hal.write_reg(self.base, KEY_LEN, size.bits());
        hal.write_reg(self.base, CTRL, opcode | CTRL_REG::START::SET.value);

        wait::until(self.max_polls, CryptoError::RSA_TIMEOUT, || {
            let status: LocalRegisterCopy<u32, STATUS_REG::Register> =
                LocalRegisterCopy::new(hal.read_reg(self.base, STATUS));
            status.is_set(STATUS_REG::DONE) || status.is_set(STATUS_REG::ERROR)
        })?;
        let status: LocalRegisterCopy<u32, STATUS_REG::Register> =
            LocalRegisterCopy::new(hal.read_reg(self.base, STATUS));
        if status.is_set(STATUS_REG::ERROR) {
            Err(CryptoError::RSA_HW_ERROR)?;
        }

        self.read_operand(hal, RAM_DATA, &mut buf[..len]);
        hal.mem_write(params.output_addr, &buf[..len])
    }

    /// Write a big endian operand, least significant word first.
    fn write_operand<H: HwAccess>(&self, hal: &mut H, region: u32, be: &[u8]) {
        for (i, chunk) in be.rchunks_exact(4).enumerate() {
            let word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            hal.write_reg(self.base, RAM + (region + i as u32) * 4, word);
        }
    }

    fn read_operand<H: HwAccess>(&self, hal: &H, region: u32, be: &mut [u8]) {
        for (i, chunk) in be.rchunks_exact_mut(4).enumerate() {
            let word = hal.read_reg(self.base, RAM + (region + i as u32) * 4);
            chunk.copy_from_slice(&word.to_be_bytes());
        }
    }

    /// Clear every operand word and verify the whole RAM reads back zero.
    fn zeroize_ram<H: HwAccess>(&self, hal: &mut H) -> CryptoResult<()> {
        for i in 0..RAM_WORDS {
            hal.write_reg(self.base, RAM + i * 4, 0);
        }
        VerifiedCall::new(0u32).check(
            || {
                (0..RAM_WORDS).fold(0, |acc, i| acc | hal.read_reg(self.base, RAM + i * 4))
            },
            |_| CryptoError::RSA_RAM_ZEROIZE_FAILED,
            CryptoError::RSA_RAM_ZEROIZE_FAILED,
        )
    }
}

/// Montgomery constant `-n0^-1 mod 2^32` for an odd low modulus word `n0`.
fn minv(n0: u32) -> u32 {
    // Each Newton step doubles the number of correct low bits, starting at 3.
    let mut inv = n0;
    for _ in 0..4 {
        inv = inv.wrapping_mul(2u32.wrapping_sub(n0.wrapping_mul(inv)));
    }
    inv.wrapping_neg()
}
