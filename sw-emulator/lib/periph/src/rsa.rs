/*++

Licensed under the Apache-2.0 license.

File Name:

    rsa.rs

Abstract:

    File contains the RSA modular exponentiation engine peripheral.

--*/

use crate::Peripheral;
use cryptoeng_drivers::reg::rsa_regs::*;
use cryptoeng_emu_crypto::ModExp;
use tock_registers::LocalRegisterCopy;

/// Faults the RSA model can be told to inject
#[derive(Debug, Default, Clone, Copy)]
pub struct RsaFaults {
    /// Raise the error bit on completion
    pub error: bool,

    /// Never set the done bit
    pub hang: bool,

    /// RAM word that keeps its value when written with zero
    pub stuck_ram_word: Option<u32>,
}

pub struct RsaPeriph {
    ram: Vec<u32>,
    ctrl: u32,
    minv: u32,
    key_len: u32,
    in_reset: bool,
    done: bool,
    error: bool,
    pub faults: RsaFaults,
}

impl Default for RsaPeriph {
    fn default() -> Self {
        Self::new()
    }
}

impl RsaPeriph {
    pub fn new() -> Self {
        Self {
            ram: vec![0; RAM_WORDS as usize],
            ctrl: 0,
            minv: 0,
            key_len: 0,
            in_reset: true,
            done: false,
            error: false,
            faults: RsaFaults::default(),
        }
    }

    /// Operand RAM contents, for inspection after an operation
    pub fn ram(&self) -> &[u32] {
        &self.ram
    }

    /// Big endian operand of `words` words stored least significant word first
    fn operand(&self, region: u32, words: usize) -> Vec<u8> {
        let start = region as usize;
        self.ram[start..start + words]
            .iter()
            .rev()
            .flat_map(|w| w.to_be_bytes())
            .collect()
    }

    fn store(&mut self, region: u32, be: &[u8]) {
        for (i, chunk) in be.rchunks_exact(4).enumerate() {
            self.ram[region as usize + i] =
                u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
    }

    fn run(&mut self) {
        self.done = false;
        self.error = self.in_reset || self.exponentiate().is_none();
        self.error |= self.faults.error;
        self.done = !self.faults.hang;
    }

    fn exponentiate(&mut self) -> Option<()> {
        let words = match self.key_len {
            2048 | 3072 | 4096 => (self.key_len / 32) as usize,
            _ => return None,
        };
        let modulus = self.operand(RAM_MODULUS, words);
        if self.minv != ModExp::minv(self.ram[RAM_MODULUS as usize]) {
            return None;
        }

        let ctrl = LocalRegisterCopy::<u32, CTRL_REG::Register>::new(self.ctrl);
        match ctrl.read_as_enum(CTRL_REG::OPCODE) {
            Some(CTRL_REG::OPCODE::Value::Exp) => {
                if self.operand(RAM_EXTENSION, words) != ModExp::r_squared(&modulus)? {
                    return None;
                }
            }
            Some(CTRL_REG::OPCODE::Value::ExpPrecalc) => {}
            _ => return None,
        }

        let result = ModExp::exp(
            &self.operand(RAM_DATA, words),
            &self.operand(RAM_EXPONENT, words),
            &modulus,
        )?;
        self.store(RAM_DATA, &result);
        Some(())
    }
}

impl Peripheral for RsaPeriph {
    fn read(&self, offset: u32) -> u32 {
        match offset {
            CTRL => self.ctrl,
            STATUS => {
                let mut status: LocalRegisterCopy<u32, STATUS_REG::Register> =
                    LocalRegisterCopy::new(0);
                status.modify(
                    STATUS_REG::DONE.val(self.done as u32)
                        + STATUS_REG::ERROR.val(self.error as u32),
                );
                status.get()
            }
            MINV => self.minv,
            KEY_LEN => self.key_len,
            RESET => self.in_reset as u32,
            o if (RAM..RAM + RAM_WORDS * 4).contains(&o) => self.ram[((o - RAM) / 4) as usize],
            _ => 0,
        }
    }

    fn write(&mut self, offset: u32, val: u32) {
        match offset {
            CTRL => {
                self.ctrl = val;
                if val & CTRL_REG::START::SET.value != 0 {
                    self.run();
                }
            }
            MINV => self.minv = val,
            KEY_LEN => self.key_len = val,
            RESET => {
                self.in_reset = val & 1 != 0;
                self.done = false;
                self.error = false;
            }
            o if (RAM..RAM + RAM_WORDS * 4).contains(&o) => {
                let i = (o - RAM) / 4;
                if val == 0 && self.faults.stuck_ram_word == Some(i) {
                    return;
                }
                self.ram[i as usize] = val;
            }
            _ => {}
        }
    }
}
