/*++

Licensed under the Apache-2.0 license.

File Name:

    ecdsa.rs

Abstract:

    File contains the ECDSA engine peripheral. Operand slots hold little
    endian integers and come out of reset holding random data.

--*/

use std::cell::Cell;

use crate::Peripheral;
use cryptoeng_drivers::reg::ecdsa_regs::*;
use cryptoeng_emu_crypto::{EccCurve, EccError, Ecdsa};
use tock_registers::LocalRegisterCopy;

const SLOT_WORDS: usize = (SLOT_BYTES / 4) as usize;

/// Faults the ECDSA model can be told to inject
#[derive(Debug, Default, Clone, Copy)]
pub struct EcdsaFaults {
    /// Corrupt every other read of the result register
    pub result_glitch: bool,

    /// Never set the done bit
    pub hang: bool,
}

pub struct EcdsaPeriph {
    ram: [u32; SLOT_WORDS * SLOT_COUNT as usize],
    ctrl: u32,
    hash_len: u32,
    result: u32,
    done: bool,
    in_reset: bool,
    result_reads: Cell<u32>,
    pub faults: EcdsaFaults,
}

impl Default for EcdsaPeriph {
    fn default() -> Self {
        Self::new()
    }
}

fn result_code(err: EccError) -> u32 {
    match err {
        EccError::KeyZero => result::KEY_ZERO,
        EccError::KeyWrongOrder => result::KEY_WRONG_ORDER,
        EccError::KeyNotOnCurve => result::KEY_NOT_ON_CURVE,
        EccError::BadSignature => result::BAD_SIGN,
        EccError::BadRandomNumber => result::BAD_RANDOM_NUMBER,
        EccError::BadLength => result::INCORRECT_HASH_LEN,
        EccError::RsZero => result::R_S_ZERO_OR_ORDER,
    }
}

impl EcdsaPeriph {
    pub fn new() -> Self {
        Self {
            ram: [0; SLOT_WORDS * SLOT_COUNT as usize],
            ctrl: 0,
            hash_len: 0,
            result: result::SUCCESS,
            done: false,
            in_reset: true,
            result_reads: Cell::new(0),
            faults: EcdsaFaults::default(),
        }
    }

    /// True when every operand slot is zero
    pub fn ram_clear(&self) -> bool {
        self.ram.iter().all(|w| *w == 0)
    }

    /// Big endian value of the low `len` bytes of `slot`
    fn slot(&self, slot: u32, len: usize) -> Vec<u8> {
        let start = slot as usize * SLOT_WORDS;
        let mut be: Vec<u8> = self.ram[start..start + SLOT_WORDS]
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .take(len)
            .collect();
        be.reverse();
        be
    }

    fn set_slot(&mut self, slot: u32, be: &[u8]) {
        let mut le = [0u8; SLOT_BYTES as usize];
        for (dst, src) in le.iter_mut().zip(be.iter().rev()) {
            *dst = *src;
        }
        let start = slot as usize * SLOT_WORDS;
        for (word, chunk) in self.ram[start..start + SLOT_WORDS]
            .iter_mut()
            .zip(le.chunks_exact(4))
        {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
    }

    fn run(&mut self) {
        self.done = false;
        self.result = match self.execute() {
            Ok(()) => result::SUCCESS,
            Err(e) => result_code(e),
        };
        self.done = !self.faults.hang;
    }

    fn execute(&mut self) -> Result<(), EccError> {
        if self.in_reset {
            return Err(EccError::BadLength);
        }
        let ctrl = LocalRegisterCopy::<u32, CTRL_REG::Register>::new(self.ctrl);
        let curve = match ctrl.read_as_enum(CTRL_REG::CURVE) {
            Some(CTRL_REG::CURVE::Value::P256) => EccCurve::P256,
            Some(CTRL_REG::CURVE::Value::P384) => EccCurve::P384,
            Some(CTRL_REG::CURVE::Value::P521) => EccCurve::P521,
            None => return Err(EccError::BadLength),
        };
        let size = curve.size();
        let hash = || {
            if self.hash_len as usize != size {
                return Err(EccError::BadLength);
            }
            Ok(self.slot(SLOT_HASH, size))
        };

        match ctrl.read_as_enum(CTRL_REG::OPCODE) {
            Some(CTRL_REG::OPCODE::Value::PublicKey) => {
                let (x, y) = Ecdsa::public_key(curve, &self.slot(SLOT_D, size))?;
                self.set_slot(SLOT_QX, &x);
                self.set_slot(SLOT_QY, &y);
                Ok(())
            }
            Some(CTRL_REG::OPCODE::Value::Sign) => {
                let hash = hash()?;
                let (r, s) = Ecdsa::sign(
                    curve,
                    &self.slot(SLOT_D, size),
                    &self.slot(SLOT_K, size),
                    &hash,
                )?;
                self.set_slot(SLOT_R, &r);
                self.set_slot(SLOT_S, &s);
                Ok(())
            }
            Some(CTRL_REG::OPCODE::Value::Verify) => Ecdsa::verify(
                curve,
                &self.slot(SLOT_QX, size),
                &self.slot(SLOT_QY, size),
                &hash()?,
                &self.slot(SLOT_R, size),
                &self.slot(SLOT_S, size),
            ),
            Some(CTRL_REG::OPCODE::Value::Validate) => Ecdsa::validate(
                curve,
                &self.slot(SLOT_QX, size),
                &self.slot(SLOT_QY, size),
            ),
            None => Err(EccError::BadLength),
        }
    }
}

impl Peripheral for EcdsaPeriph {
    fn read(&self, offset: u32) -> u32 {
        match offset {
            CTRL => self.ctrl,
            STATUS => STATUS_REG::DONE.val(self.done as u32).value,
            RESULT => {
                let n = self.result_reads.get();
                self.result_reads.set(n.wrapping_add(1));
                if self.faults.result_glitch && n % 2 == 1 {
                    !self.result
                } else {
                    self.result
                }
            }
            HASH_LEN => self.hash_len,
            RESET => self.in_reset as u32,
            o if (RAM..RAM + (self.ram.len() as u32) * 4).contains(&o) => {
                self.ram[((o - RAM) / 4) as usize]
            }
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
            HASH_LEN => self.hash_len = val,
            RESET => {
                let release = self.in_reset && val & 1 == 0;
                self.in_reset = val & 1 != 0;
                self.done = false;
                // Operand RAM comes out of reset undefined
                if release {
                    self.ram.iter_mut().for_each(|w| *w = rand::random());
                }
            }
            o if (RAM..RAM + (self.ram.len() as u32) * 4).contains(&o) => {
                self.ram[((o - RAM) / 4) as usize] = val;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: &str = "c838b85253ef8dc7394fa5808a5183981c7deef5a69ba8f4f2117ffea39cfcd90e95f6cbc854abacab701d50c1f3cf24";
    const K: &str = "dc6b44036989a196e39d1cdac000812f4bdd8b2db41bb33af51372585ebd1db63f0ce8275aa1fd45e2d2a735f8749359";

    fn ctrl(op: u32, curve: u32) -> u32 {
        op | curve | CTRL_REG::START::SET.value
    }

    fn ready() -> EcdsaPeriph {
        let mut ecc = EcdsaPeriph::new();
        ecc.write(RESET, 0);
        ecc
    }

    #[test]
    fn test_sign_then_verify_p384() {
        let mut ecc = ready();
        ecc.set_slot(SLOT_D, &hex::decode(D).unwrap());
        ecc.set_slot(SLOT_K, &hex::decode(K).unwrap());
        ecc.set_slot(SLOT_HASH, &[0x5Au8; 48]);
        ecc.write(HASH_LEN, 48);

        let p384 = CTRL_REG::CURVE::P384.value;
        ecc.write(CTRL, ctrl(CTRL_REG::OPCODE::PublicKey.value, p384));
        assert_eq!(ecc.read(RESULT), result::SUCCESS);
        ecc.write(CTRL, ctrl(CTRL_REG::OPCODE::Sign.value, p384));
        assert_eq!(ecc.read(STATUS), 1);
        assert_eq!(ecc.read(RESULT), result::SUCCESS);
        ecc.write(CTRL, ctrl(CTRL_REG::OPCODE::Verify.value, p384));
        assert_eq!(ecc.read(RESULT), result::SUCCESS);

        ecc.set_slot(SLOT_HASH, &[0x5Bu8; 48]);
        ecc.write(CTRL, ctrl(CTRL_REG::OPCODE::Verify.value, p384));
        assert_eq!(ecc.read(RESULT), result::BAD_SIGN);
    }

    #[test]
    fn test_hash_len_mismatch() {
        let mut ecc = ready();
        ecc.set_slot(SLOT_D, &hex::decode(D).unwrap());
        ecc.set_slot(SLOT_K, &hex::decode(K).unwrap());
        ecc.write(HASH_LEN, 32);
        ecc.write(
            CTRL,
            ctrl(CTRL_REG::OPCODE::Sign.value, CTRL_REG::CURVE::P384.value),
        );
        assert_eq!(ecc.read(RESULT), result::INCORRECT_HASH_LEN);
    }

    #[test]
    fn test_zero_key() {
        let mut ecc = ready();
        ecc.set_slot(SLOT_D, &[0u8; 32]);
        ecc.write(
            CTRL,
            ctrl(CTRL_REG::OPCODE::PublicKey.value, CTRL_REG::CURVE::P256.value),
        );
        assert_eq!(ecc.read(RESULT), result::KEY_ZERO);
    }

    #[test]
    fn test_reset_release_scribbles_ram() {
        let mut ecc = ready();
        assert!(!ecc.ram_clear());
        for i in 0..ecc.ram.len() as u32 {
            ecc.write(RAM + i * 4, 0);
        }
        ecc.write(RESET, 1);
        assert!(ecc.ram_clear());
    }

    #[test]
    fn test_result_glitch() {
        let mut ecc = ready();
        ecc.faults.result_glitch = true;
        assert_ne!(ecc.read(RESULT), ecc.read(RESULT));
    }

    #[test]
    fn test_slot_layout_is_little_endian() {
        let mut ecc = ready();
        ecc.set_slot(SLOT_QX, &[0x01, 0x02, 0x03, 0x04, 0x05]);
        assert_eq!(ecc.read(RAM + SLOT_QX * SLOT_BYTES), 0x0203_0405);
        assert_eq!(ecc.read(RAM + SLOT_QX * SLOT_BYTES + 4), 0x01);
        assert_eq!(ecc.slot(SLOT_QX, 5), vec![1, 2, 3, 4, 5]);
    }
}
