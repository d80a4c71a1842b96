/*++

Licensed under the Apache-2.0 license.

File Name:

    sha.rs

Abstract:

    File contains the SHA2 and SHA3 engine peripherals. Both take already
    padded blocks from the DMA and expose the digest last word first.

--*/

use crate::Peripheral;
use cryptoeng_drivers::reg::sha_regs::*;
use cryptoeng_emu_crypto::{KeccakSponge, Sha2Block, Sha2Mode, Sha3Mode};
use tock_registers::LocalRegisterCopy;

/// Engine family behind a SHA peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaFamily {
    Sha2,
    Sha3,
}

/// Faults the SHA model can be told to inject
#[derive(Debug, Default, Clone, Copy)]
pub struct ShaFaults {
    /// Raise the status error bit on completion
    pub error: bool,

    /// Never set the done bit
    pub hang: bool,
}

enum Core {
    Sha2(Sha2Block),
    Sha3(KeccakSponge),
}

impl Core {
    fn block_size(&self) -> usize {
        match self {
            Self::Sha2(c) => c.mode().block_size(),
            Self::Sha3(c) => c.mode().rate(),
        }
    }

    fn digest_size(&self) -> usize {
        match self {
            Self::Sha2(c) => c.mode().digest_size(),
            Self::Sha3(c) => c.mode().digest_size(),
        }
    }

    fn process(&mut self, block: &[u8]) -> bool {
        match self {
            Self::Sha2(c) => c.compress(block),
            Self::Sha3(c) => c.absorb(block),
        }
    }

    fn copy_digest(&self, out: &mut [u8]) {
        match self {
            Self::Sha2(c) => c.copy_digest(out),
            Self::Sha3(c) => c.copy_digest(out),
        }
    }
}

pub struct ShaPeriph {
    family: ShaFamily,
    in_reset: bool,
    mode: u32,
    core: Option<Core>,
    pending: Vec<u8>,
    digest: [u32; DIGEST_WORDS],
    done: bool,
    error: bool,
    pub faults: ShaFaults,
}

impl ShaPeriph {
    pub fn new(family: ShaFamily) -> Self {
        Self {
            family,
            in_reset: true,
            mode: 0,
            core: None,
            pending: Vec::new(),
            digest: [0; DIGEST_WORDS],
            done: false,
            error: false,
            faults: ShaFaults::default(),
        }
    }

    pub fn family(&self) -> ShaFamily {
        self.family
    }

    /// A message is being absorbed
    pub fn active(&self) -> bool {
        self.core.is_some()
    }

    fn clear(&mut self) {
        self.core = None;
        self.pending.clear();
        self.digest = [0; DIGEST_WORDS];
        self.done = false;
        self.error = false;
    }

    fn start(&mut self) {
        self.clear();
        if self.in_reset {
            self.error = true;
            return;
        }
        let bits = LocalRegisterCopy::<u32, MODE_REG::Register>::new(self.mode)
            .read_as_enum(MODE_REG::MODE);
        self.core = match (self.family, bits) {
            (ShaFamily::Sha2, Some(MODE_REG::MODE::Value::Bits256)) => {
                Some(Core::Sha2(Sha2Block::new(Sha2Mode::Sha256)))
            }
            (ShaFamily::Sha2, Some(MODE_REG::MODE::Value::Bits384)) => {
                Some(Core::Sha2(Sha2Block::new(Sha2Mode::Sha384)))
            }
            (ShaFamily::Sha2, Some(MODE_REG::MODE::Value::Bits512)) => {
                Some(Core::Sha2(Sha2Block::new(Sha2Mode::Sha512)))
            }
            (ShaFamily::Sha3, Some(MODE_REG::MODE::Value::Bits256)) => {
                Some(Core::Sha3(KeccakSponge::new(Sha3Mode::Sha3_256)))
            }
            (ShaFamily::Sha3, Some(MODE_REG::MODE::Value::Bits384)) => {
                Some(Core::Sha3(KeccakSponge::new(Sha3Mode::Sha3_384)))
            }
            (ShaFamily::Sha3, Some(MODE_REG::MODE::Value::Bits512)) => {
                Some(Core::Sha3(KeccakSponge::new(Sha3Mode::Sha3_512)))
            }
            _ => None,
        };
        self.error = self.core.is_none();
    }

    /// Accept padded message bytes from the DMA.
    pub fn push(&mut self, data: &[u8], last: bool) {
        let Some(core) = self.core.as_mut() else {
            self.error = true;
            return;
        };
        self.pending.extend_from_slice(data);
        let bs = core.block_size();
        let whole = self.pending.len() - self.pending.len() % bs;
        for block in self.pending[..whole].chunks_exact(bs) {
            if !core.process(block) {
                self.error = true;
            }
        }
        self.pending.drain(..whole);
        if last {
            self.finalize();
        }
    }

    fn finalize(&mut self) {
        let Some(core) = self.core.take() else {
            self.error = true;
            return;
        };
        if !self.pending.is_empty() {
            self.error = true;
            self.pending.clear();
        }
        let n = core.digest_size();
        let mut out = [0u8; DIGEST_WORDS * 4];
        core.copy_digest(&mut out[..n]);
        for (i, chunk) in out[..n].chunks_exact(4).rev().enumerate() {
            self.digest[i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        self.error |= self.faults.error;
        self.done = !self.faults.hang;
    }
}

impl Peripheral for ShaPeriph {
    fn read(&self, offset: u32) -> u32 {
        match offset {
            DONE => DONE_REG::DONE.val(self.done as u32).value,
            STATUS => STATUS_REG::ERROR.val(self.error as u32).value,
            MODE => self.mode,
            RESET => self.in_reset as u32,
            o if (DIGEST_0..DIGEST_0 + (DIGEST_WORDS as u32) * 4).contains(&o) => {
                self.digest[((o - DIGEST_0) / 4) as usize]
            }
            _ => 0,
        }
    }

    fn write(&mut self, offset: u32, val: u32) {
        match offset {
            RESET => {
                self.in_reset = val & 1 != 0;
                if self.in_reset {
                    self.clear();
                }
            }
            MODE => self.mode = val,
            START if val & 1 != 0 => self.start(),
            FINAL if val & 1 != 0 => self.finalize(),
            _ => {}
        }
    }
}
