/*++

Licensed under the Apache-2.0 license.

File Name:

    aes_dpa_cm_kat.rs

Abstract:

    File contains the Known Answer Test (KAT) for the AES DPA countermeasure.

--*/

use cryptoeng_cfi_lib::{memeq, zeroize_verified};
use cryptoeng_drivers::{cprintln, AesState, DpaCmRun, HwAccess, SelfTestToken, AES_BLOCK_SIZE};
use cryptoeng_error::{CryptoError, CryptoResult};

use crate::kats_env::KatsEnv;

const KEY: [u8; 32] = [
    0x98, 0x07, 0x69, 0x56, 0x4f, 0x15, 0x8c, 0x97, 0x78, 0xba, 0x50, 0xf2, 0x5f, 0x76, 0x63, 0xe4,
    0x97, 0xe6, 0x0c, 0x2f, 0x1b, 0x55, 0xa4, 0x09, 0xdd, 0x3a, 0xcb, 0xd8, 0xb6, 0x87, 0xa0, 0xed,
];

// Split IV (zero share, IV share) followed by split data (zero share, data share)
const DATA: [u8; 64] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x86, 0xc2, 0x37, 0xcf, 0xea, 0xd4, 0x8a, 0xc1, 0xa0, 0xa6, 0x0b, 0x3d, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x24, 0x81, 0x32, 0x2d, 0x56, 0x8d, 0xd5, 0xa8, 0xed, 0x5e, 0x77, 0xd0, 0x88, 0x1a, 0xde, 0x93,
];

const CT: [u8; AES_BLOCK] = [
    0x67, 0x02, 0x0a, 0x3b, 0x3a, 0xde, 0xec, 0xf6, 0x03, 0x09, 0xb3, 0x78, 0x6e, 0xca, 0xd4, 0xeb,
];

const MIC: [u8; AES_BLOCK] = [
    0x64, 0x00, 0xd2, 0x1f, 0x63, 0x63, 0xfc, 0x09, 0x06, 0xd4, 0xf3, 0x79, 0x88, 0x09, 0xca, 0x7e,
];

const AES_BLOCK: usize = AES_BLOCK_SIZE as usize;
const RUN_OUT_SIZE: usize = 4 * AES_BLOCK;

// Scratch layout
const KEY_OFF: usize = 0x00;
const DATA_OFF: usize = 0x20;
const OUT0_OFF: usize = 0x60;
const OUT1_OFF: usize = 0xA0;

/// Masked outputs of one run
struct RunOutput([u8; RUN_OUT_SIZE]);

impl RunOutput {
    /// Random mask of the ciphertext
    fn rm(&self) -> &[u8] {
        &self.0[..AES_BLOCK]
    }

    /// Masked ciphertext
    fn r(&self) -> &[u8] {
        &self.0[AES_BLOCK..2 * AES_BLOCK]
    }

    /// Random mask of the tag
    fn mm(&self) -> &[u8] {
        &self.0[2 * AES_BLOCK..3 * AES_BLOCK]
    }

    /// Masked tag
    fn m(&self) -> &[u8] {
        &self.0[3 * AES_BLOCK..]
    }
}

#[derive(Default, Debug)]
pub struct AesDpaCmKat {}

impl AesDpaCmKat {
    /// This function executes the Known Answer Test (aka KAT) for the AES DPA
    /// countermeasure.
    ///
    /// Runs the same split-mode decryption twice. The masks of both runs must
    /// be non-zero and pairwise distinct, and each run must recombine to the
    /// expected ciphertext and tag.
    ///
    /// # Arguments
    ///
    /// * `env` - Engines and scratch memory
    ///
    /// # Returns
    ///
    /// * `AES_DPA_CM_NOT_SUPPORTED` if the countermeasure is fused off
    /// * `CryptoResult` - Result denoting the KAT outcome.
    pub fn execute<H: HwAccess>(&self, env: &mut KatsEnv<H>) -> CryptoResult<()> {
        if env.aes.state() == AesState::Uninitialized {
            env.aes.init(env.hal, crate::kats_env::KAT_OWNER)?;
        }

        let mut out0 = RunOutput([0; RUN_OUT_SIZE]);
        let mut out1 = RunOutput([0; RUN_OUT_SIZE]);
        let mut result = env.scoped(|env| Self::run_twice(env, &mut out0, &mut out1));
        if result.is_ok() {
            result = Self::check(&out0, &out1);
        }
        let wiped = zeroize_verified(&mut out0.0).and(zeroize_verified(&mut out1.0));
        if let Err(e) = result {
            cprintln!("[kat] DPA countermeasure KAT failed 0x{:08X}", u32::from(e));
        }
        result.and(wiped)
    }

    fn run_twice<H: HwAccess>(
        env: &mut KatsEnv<H>,
        out0: &mut RunOutput,
        out1: &mut RunOutput,
    ) -> CryptoResult<()> {
        // Key words are consumed little endian
        let mut key = KEY;
        for word in key.chunks_exact_mut(4) {
            word.reverse();
        }
        let staged = env.put(KEY_OFF, &key);
        zeroize_verified(&mut key)?;
        let key_addr = staged?;
        let data_addr = env.put(DATA_OFF, &DATA)?;

        // SAFETY: both runs are checked against the vector below.
        let token = unsafe { SelfTestToken::new() };
        for (off, out) in [(OUT0_OFF, &mut *out0), (OUT1_OFF, &mut *out1)] {
            let run = DpaCmRun {
                key_addr,
                data_addr,
                out_addr: env.at(off),
            };
            env.aes.dpa_cm_split_decrypt(env.hal, token, &run)?;
            env.get(off, &mut out.0)?;
        }
        Ok(())
    }

    fn check(out0: &RunOutput, out1: &RunOutput) -> CryptoResult<()> {
        let (rm0, rm1, mm0, mm1) = (out0.rm(), out1.rm(), out0.mm(), out1.mm());

        distinct(rm0, [rm1, mm0, mm1], CryptoError::KAT_AES_DPA_CM_CHECK1)?;
        distinct(rm1, [rm0, mm0, mm1], CryptoError::KAT_AES_DPA_CM_CHECK2)?;
        distinct(mm0, [rm0, rm1, mm1], CryptoError::KAT_AES_DPA_CM_CHECK3)?;
        distinct(mm1, [rm0, rm1, mm0], CryptoError::KAT_AES_DPA_CM_CHECK4)?;

        for out in [out0, out1] {
            if !recombines(out.r(), out.rm(), &CT)? || !recombines(out.m(), out.mm(), &MIC)? {
                Err(CryptoError::KAT_AES_DPA_CM_CHECK5)?;
            }
        }
        Ok(())
    }
}

/// Fail with `err` if `p` is all zero or equal to any of `others`.
fn distinct(p: &[u8], others: [&[u8]; 3], err: CryptoError) -> CryptoResult<()> {
    if memeq(p, &[0u8; AES_BLOCK])? {
        Err(err)?;
    }
    for q in others {
        if memeq(p, q)? {
            Err(err)?;
        }
    }
    Ok(())
}

/// True when `masked ^ mask` equals `expected`.
fn recombines(masked: &[u8], mask: &[u8], expected: &[u8; AES_BLOCK]) -> CryptoResult<bool> {
    let mut clear = [0u8; AES_BLOCK];
    for ((c, a), b) in clear.iter_mut().zip(masked).zip(mask) {
        *c = a ^ b;
    }
    memeq(&clear, expected)
}
