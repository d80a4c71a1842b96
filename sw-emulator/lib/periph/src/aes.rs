/*++

Licensed under the Apache-2.0 license.

File Name:

    aes.rs

Abstract:

    File contains the AES-GCM engine peripheral: key registers and device
    keys, key load, clear and decryption, the streamed GCM datapath, key
    update saving and the split-mode DPA countermeasure.

--*/

use std::cell::Cell;
use std::collections::{BTreeMap, VecDeque};

use crate::Peripheral;
use cryptoeng_drivers::reg::aes_regs::*;
use cryptoeng_emu_crypto::{AesGcm, AES_GCM_IV_SIZE, AES_GCM_TAG_SIZE};
use tock_registers::LocalRegisterCopy;

const BLOCK: usize = 16;

/// Bytes of one split-mode run, in and out
const SPLIT_XFER: usize = 64;

/// Bytes carried at the end of a key-rolled block: next key, then next IV
const KUP_TRAILER: usize = 48;

/// Key clear bits of the sources held in the device key store
const DEVICE_CLEAR: [(u32, u32); 10] = [
    (key_sel::EFUSE_USER_0, key_clear::EFUSE_USER_0),
    (key_sel::EFUSE_USER_1, key_clear::EFUSE_USER_1),
    (key_sel::BBRAM_RED, key_clear::BBRAM_RED),
    (key_sel::EFUSE_RED, key_clear::EFUSE_RED),
    (key_sel::EFUSE_USER_RED_0, key_clear::EFUSE_USER_RED_0),
    (key_sel::EFUSE_USER_RED_1, key_clear::EFUSE_USER_RED_1),
    (key_sel::BH_RED, key_clear::BH_RED),
    (key_sel::PUF, key_clear::PUF),
    (key_sel::KUP, key_clear::KUP),
    (key_sel::EFUSE, key_clear::EFUSE),
];

/// Red key selected by each `KEY_DEC_SEL` value
const DEC_TARGETS: [u32; 5] = [
    key_sel::BBRAM_RED,
    key_sel::BH_RED,
    key_sel::EFUSE_RED,
    key_sel::EFUSE_USER_RED_0,
    key_sel::EFUSE_USER_RED_1,
];

/// Faults the AES model can be told to inject
#[derive(Debug, Default, Clone, Copy)]
pub struct AesFaults {
    /// Raise the error bit when a message completes
    pub error: bool,

    /// Alternate the tag pass bit on consecutive status reads
    pub tag_glitch: bool,

    /// Never report cleared keys as zeroed
    pub key_clear_stuck: bool,

    /// Never report the countermeasure as enabled
    pub cm_stuck_off: bool,

    /// Use all zero masks in split mode
    pub fixed_masks: bool,

    /// Never finish a key load
    pub key_init_hang: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Iv,
    Body,
    Tag,
    TagReady,
    Split,
    Done,
}

pub struct AesPeriph {
    regs: BTreeMap<u32, u32>,
    user_keys: [[u32; 8]; 8],
    bh_key: [u32; 8],
    device_keys: BTreeMap<u32, [u8; 32]>,
    zeroed: u32,
    key: Option<Vec<u8>>,
    iv_regs: [u32; 4],
    phase: Phase,
    iv: [u8; AES_GCM_IV_SIZE],
    aad: Vec<u8>,
    /// Plaintext of the message so far
    text: Vec<u8>,
    pending: Vec<u8>,
    out: VecDeque<u8>,
    done: bool,
    key_init_done: bool,
    tag_pass: bool,
    blk_key_dec_done: bool,
    error: bool,
    status_reads: Cell<u32>,
    pub faults: AesFaults,
}

impl Default for AesPeriph {
    fn default() -> Self {
        Self::new()
    }
}

impl AesPeriph {
    pub fn new() -> Self {
        let mut regs = BTreeMap::new();
        regs.insert(SOFT_RST, 1);
        Self {
            regs,
            user_keys: [[0; 8]; 8],
            bh_key: [0; 8],
            device_keys: BTreeMap::new(),
            zeroed: 0,
            key: None,
            iv_regs: [0; 4],
            phase: Phase::Idle,
            iv: [0; AES_GCM_IV_SIZE],
            aad: Vec::new(),
            text: Vec::new(),
            pending: Vec::new(),
            out: VecDeque::new(),
            done: false,
            key_init_done: false,
            tag_pass: false,
            blk_key_dec_done: false,
            error: false,
            status_reads: Cell::new(0),
            faults: AesFaults::default(),
        }
    }

    /// Install a device key (BBRAM, eFuse, PUF or a red key slot)
    pub fn provision_key(&mut self, sel: u32, key: &[u8]) {
        let mut stored = [0u8; 32];
        let len = key.len().min(32);
        stored[..len].copy_from_slice(&key[..len]);
        self.device_keys.insert(sel, stored);
    }

    pub fn device_key(&self, sel: u32) -> Option<[u8; 32]> {
        self.device_keys.get(&sel).copied()
    }

    /// Words of user key register bank `n`
    pub fn user_key(&self, n: usize) -> [u32; 8] {
        self.user_keys[n % 8]
    }

    pub fn zeroed_status(&self) -> u32 {
        self.zeroed
    }

    /// A key schedule is loaded
    pub fn key_loaded(&self) -> bool {
        self.key.is_some()
    }

    /// Engine data port swaps bytes within words
    pub fn data_swap(&self) -> bool {
        self.reg(DATA_SWAP) & 1 != 0
    }

    fn reg(&self, offset: u32) -> u32 {
        self.regs.get(&offset).copied().unwrap_or(0)
    }

    fn encrypting(&self) -> bool {
        self.reg(MODE) & 1 == MODE_REG::ENC_DEC_N::Encrypt.value
    }

    fn cm_enabled(&self) -> bool {
        self.reg(CM_EN) & 1 != 0 && !self.faults.cm_stuck_off
    }

    fn status(&self) -> u32 {
        let pass = if self.faults.tag_glitch {
            let n = self.status_reads.get();
            self.status_reads.set(n.wrapping_add(1));
            n % 2 == 0
        } else {
            self.tag_pass
        };
        let mut status: LocalRegisterCopy<u32, STATUS_REG::Register> = LocalRegisterCopy::new(0);
        status.modify(
            STATUS_REG::READY::SET
                + STATUS_REG::DONE.val(self.done as u32)
                + STATUS_REG::KEY_INIT_DONE.val(self.key_init_done as u32)
                + STATUS_REG::GCM_TAG_PASS.val(pass as u32)
                + STATUS_REG::BLK_KEY_DEC_DONE.val(self.blk_key_dec_done as u32)
                + STATUS_REG::ERROR.val(self.error as u32)
                + STATUS_REG::CM_ENABLED.val(self.cm_enabled() as u32),
        );
        status.get()
    }

    fn clear_message(&mut self) {
        self.aad.clear();
        self.text.clear();
        self.pending.clear();
        self.out.clear();
        self.done = false;
        self.tag_pass = false;
        self.blk_key_dec_done = false;
        self.error = false;
    }

    fn soft_reset(&mut self) {
        self.clear_message();
        self.phase = Phase::Idle;
        self.key = None;
        self.key_init_done = false;
    }

    fn start_message(&mut self) {
        self.clear_message();
        let split = SPLIT_CFG_REG::KEY_SPLIT::SET.value | SPLIT_CFG_REG::DATA_SPLIT::SET.value;
        self.phase = if self.reg(SPLIT_CFG) & split == split {
            Phase::Split
        } else {
            Phase::Iv
        };
    }

    fn key_for(&self, sel: u32, len: usize) -> Option<Vec<u8>> {
        let from_regs = |regs: &[u32; 8]| {
            let n = len / 4;
            (0..n).flat_map(|j| regs[n - 1 - j].to_be_bytes()).collect()
        };
        if (key_sel::USER_0..key_sel::USER_0 + 8).contains(&sel) {
            return Some(from_regs(&self.user_keys[(sel - key_sel::USER_0) as usize]));
        }
        if sel == key_sel::BH {
            return Some(from_regs(&self.bh_key));
        }
        self.device_keys.get(&sel).map(|k| k[..len].to_vec())
    }

    fn load_key(&mut self) {
        if self.faults.key_init_hang {
            return;
        }
        let len = if self.reg(KEY_SIZE) == KEY_SIZE_REG::SIZE::Key256.value {
            32
        } else {
            16
        };
        self.key = self.key_for(self.reg(KEY_SEL), len);
        self.key_init_done = self.key.is_some();
        self.error |= self.key.is_none();
        self.zeroed &= !key_clear::EXPANDED;
    }

    fn clear_keys(&mut self, mask: u32) {
        if mask == 0 || self.faults.key_clear_stuck {
            return;
        }
        for n in 0..8 {
            if mask & (key_clear::USER_0 << n) != 0 {
                self.user_keys[n] = [0; 8];
            }
        }
        if mask & key_clear::BH != 0 {
            self.bh_key = [0; 8];
        }
        if mask & key_clear::EXPANDED != 0 {
            self.key = None;
            self.key_init_done = false;
        }
        for (sel, bit) in DEVICE_CLEAR {
            if mask & bit != 0 {
                if let Some(k) = self.device_keys.get_mut(&sel) {
                    k.fill(0);
                }
            }
        }
        self.zeroed |= mask & key_clear::ALL;
    }

    fn kek_decrypt(&mut self) {
        let target = DEC_TARGETS.get(self.reg(KEY_DEC_SEL) as usize).copied();
        let armed = self.reg(KEY_DEC) == KEY_DEC_MAGIC && self.phase == Phase::Body;
        let (Some(target), Some(kek), true) = (target, self.key.clone(), armed) else {
            self.error = true;
            return;
        };
        let Some(mut red) = self.device_keys.get(&target).copied() else {
            self.error = true;
            return;
        };
        if AesGcm::apply_keystream(&kek, &self.iv, 0, &mut red[..kek.len()]).is_none() {
            self.error = true;
            return;
        }
        self.device_keys.insert(target, red);
        if let Some((_, bit)) = DEVICE_CLEAR.iter().find(|(sel, _)| *sel == target) {
            self.zeroed &= !bit;
        }
        self.blk_key_dec_done = true;
    }

    /// Accept bytes from the DMA, already in engine byte order.
    pub fn push(&mut self, data: &[u8], last: bool) {
        match self.phase {
            Phase::Iv => {
                self.pending.extend_from_slice(data);
                if self.pending.len() >= BLOCK {
                    self.iv.copy_from_slice(&self.pending[..AES_GCM_IV_SIZE]);
                    let rest: Vec<u8> = self.pending.drain(..).skip(BLOCK).collect();
                    self.phase = Phase::Body;
                    if !rest.is_empty() {
                        self.body(&rest, last);
                    }
                }
            }
            Phase::Body => self.body(data, last),
            Phase::Tag => {
                self.pending.extend_from_slice(data);
                if self.pending.len() >= AES_GCM_TAG_SIZE {
                    self.check_tag();
                }
            }
            Phase::Split => {
                self.pending.extend_from_slice(data);
                if last {
                    self.split_run();
                }
            }
            Phase::Idle | Phase::TagReady | Phase::Done => self.error = true,
        }
    }

    fn body(&mut self, data: &[u8], last: bool) {
        if self.reg(AAD) & 1 != 0 {
            self.aad.extend_from_slice(data);
            if last {
                self.message_end();
            }
            return;
        }

        self.pending.extend_from_slice(data);
        while self.pending.len() >= BLOCK || (last && !self.pending.is_empty()) {
            let n = self.pending.len().min(BLOCK);
            let input: Vec<u8> = self.pending.drain(..n).collect();
            let mut block = input.clone();
            let offset = (self.text.len() / BLOCK) as u32;
            let applied = self
                .key
                .as_ref()
                .and_then(|key| AesGcm::apply_keystream(key, &self.iv, offset, &mut block));
            if applied.is_none() {
                self.error = true;
                return;
            }
            if self.encrypting() {
                self.text.extend_from_slice(&input);
            } else {
                self.text.extend_from_slice(&block);
            }
            self.out.extend(block);
        }
        if last {
            self.message_end();
        }
    }

    fn message_end(&mut self) {
        self.phase = if self.encrypting() {
            Phase::TagReady
        } else {
            Phase::Tag
        };
    }

    fn tag(&self) -> Option<[u8; AES_GCM_TAG_SIZE]> {
        let key = self.key.as_ref()?;
        AesGcm::tag(key, &self.iv, &self.aad, &self.text)
    }

    fn complete(&mut self) {
        self.done = true;
        self.error |= self.faults.error;
        self.phase = Phase::Done;
    }

    fn check_tag(&mut self) {
        let received = &self.pending[..AES_GCM_TAG_SIZE];
        self.tag_pass = self.tag().map_or(false, |t| t[..] == *received);

        let kup = LocalRegisterCopy::<u32, KUP_WR_REG::Register>::new(self.reg(KUP_WR));
        let len = self.text.len();
        if self.tag_pass && kup.is_set(KUP_WR_REG::KEY_SAVE) && len >= KUP_TRAILER {
            let trailer = &self.text[len - KUP_TRAILER..];
            let mut key = [0u8; 32];
            key.copy_from_slice(&trailer[..32]);
            self.device_keys.insert(key_sel::KUP, key);
            self.zeroed &= !key_clear::KUP;
            if kup.is_set(KUP_WR_REG::IV_SAVE) {
                for (reg, chunk) in self.iv_regs.iter_mut().zip(trailer[32..].chunks_exact(4)) {
                    *reg = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                }
            }
        }
        self.pending.clear();
        self.complete();
    }

    fn split_run(&mut self) {
        let Some(key) = self.key.clone() else {
            self.error = true;
            return;
        };
        if self.pending.len() != SPLIT_XFER {
            self.error = true;
            return;
        }
        let b = std::mem::take(&mut self.pending);
        let xor = |x: &[u8], y: &[u8]| -> Vec<u8> { x.iter().zip(y).map(|(a, b)| a ^ b).collect() };

        let mut iv = [0u8; AES_GCM_IV_SIZE];
        iv.copy_from_slice(&xor(&b[0..16], &b[16..32])[..AES_GCM_IV_SIZE]);
        let data = xor(&b[32..48], &b[48..64]);
        let masks: Vec<u8> = (0..8)
            .flat_map(|j| self.reg(KEY_MASK_0 + (7 - j) * 4).to_be_bytes())
            .collect();
        let key = xor(&key, &masks[..key.len()]);

        let Some((ct, tag)) = AesGcm::encrypt(&key, &iv, &[], &data) else {
            self.error = true;
            return;
        };
        let randomize = self.cm_enabled() && !self.faults.fixed_masks;
        let rm: [u8; BLOCK] = if randomize { rand::random() } else { [0; BLOCK] };
        let mm: [u8; BLOCK] = if randomize { rand::random() } else { [0; BLOCK] };

        self.out.extend(rm);
        self.out.extend(xor(&ct, &rm));
        self.out.extend(mm);
        self.out.extend(xor(&tag, &mm));
        self.complete();
    }

    /// A destination transfer is waiting for data; emit the tag once an
    /// encryption has ended.
    pub fn request_output(&mut self) {
        if self.phase == Phase::TagReady && self.out.is_empty() {
            match self.tag() {
                Some(tag) => self.out.extend(tag),
                None => self.error = true,
            }
            self.complete();
        }
    }

    /// Take up to `max` output bytes
    pub fn pull(&mut self, max: usize) -> Vec<u8> {
        let n = max.min(self.out.len());
        self.out.drain(..n).collect()
    }

    fn user_key_reg(offset: u32) -> Option<(usize, usize)> {
        let end = USER_KEY_0_0 + 8 * USER_KEY_STRIDE;
        if !(USER_KEY_0_0..end).contains(&offset) {
            return None;
        }
        let rel = offset - USER_KEY_0_0;
        let word = (rel % USER_KEY_STRIDE) / 4;
        (word < 8).then_some(((rel / USER_KEY_STRIDE) as usize, word as usize))
    }
}

impl Peripheral for AesPeriph {
    fn read(&self, offset: u32) -> u32 {
        match offset {
            STATUS => self.status(),
            KEY_ZEROED_STATUS => self.zeroed,
            o if (IV_0..=IV_3).contains(&o) => self.iv_regs[((o - IV_0) / 4) as usize],
            // Key registers are write only
            o if Self::user_key_reg(o).is_some() => 0,
            o if (BH_KEY_0..BH_KEY_0 + 32).contains(&o) => 0,
            o => self.reg(o),
        }
    }

    fn write(&mut self, offset: u32, val: u32) {
        self.regs.insert(offset, val);
        match offset {
            SOFT_RST if val & 1 != 0 => self.soft_reset(),
            KEY_LOAD if val & 1 != 0 => self.load_key(),
            START_MSG if val & 1 != 0 => self.start_message(),
            KEY_CLEAR => self.clear_keys(val),
            KEY_DEC_TRIG if val & 1 != 0 => self.kek_decrypt(),
            o if (BH_KEY_0..BH_KEY_0 + 32).contains(&o) => {
                self.bh_key[((o - BH_KEY_0) / 4) as usize] = val;
                self.zeroed &= !key_clear::BH;
            }
            o => {
                if let Some((n, word)) = Self::user_key_reg(o) {
                    self.user_keys[n][word] = val;
                    self.zeroed &= !(key_clear::USER_0 << n);
                }
            }
        }
    }
}
