/*++

Licensed under the Apache-2.0 license.

File Name:

    ecdsa_kat.rs

Abstract:

    File contains the Known Answer Tests (KAT) for ECDSA P-384 cryptography operations.

--*/

use cryptoeng_drivers::{
    copy_with_layout, Addr, Curve, EcdsaSignParams, EcdsaVerifyParams, HwAccess, Layout,
    ECC_MAX_SIZE,
};
use cryptoeng_error::{CryptoError, CryptoResult};

use crate::kats_env::{expect_eq, kat_gate, KatsEnv, KAT_OWNER};

// HASH is SHA-384 of the shared KAT message; the signature uses a fixed
// ephemeral key. Operands are big endian, the public key x || y and the
// signature r || s.

const PRIV_KEY: [u8; 48] = [
    0xc8, 0x38, 0xb8, 0x52, 0x53, 0xef, 0x8d, 0xc7, 0x39, 0x4f, 0xa5, 0x80, 0x8a, 0x51, 0x83, 0x98,
    0x1c, 0x7d, 0xee, 0xf5, 0xa6, 0x9b, 0xa8, 0xf4, 0xf2, 0x11, 0x7f, 0xfe, 0xa3, 0x9c, 0xfc, 0xd9,
    0x0e, 0x95, 0xf6, 0xcb, 0xc8, 0x54, 0xab, 0xac, 0xab, 0x70, 0x1d, 0x50, 0xc1, 0xf3, 0xcf, 0x24,
];

const EPHEMERAL: [u8; 48] = [
    0xdc, 0x6b, 0x44, 0x03, 0x69, 0x89, 0xa1, 0x96, 0xe3, 0x9d, 0x1c, 0xda, 0xc0, 0x00, 0x81, 0x2f,
    0x4b, 0xdd, 0x8b, 0x2d, 0xb4, 0x1b, 0xb3, 0x3a, 0xf5, 0x13, 0x72, 0x58, 0x5e, 0xbd, 0x1d, 0xb6,
    0x3f, 0x0c, 0xe8, 0x27, 0x5a, 0xa1, 0xfd, 0x45, 0xe2, 0xd2, 0xa7, 0x35, 0xf8, 0x74, 0x93, 0x59,
];

const HASH: [u8; 48] = [
    0x5a, 0x2c, 0xfc, 0x1c, 0xc1, 0x1e, 0x61, 0x1b, 0xd1, 0xea, 0x4e, 0x51, 0xc8, 0x72, 0x73, 0x40,
    0x01, 0xcd, 0x53, 0x95, 0x5d, 0xc6, 0xf9, 0xff, 0x42, 0xd1, 0x66, 0xa1, 0x6b, 0x76, 0x2e, 0x42,
    0x42, 0x24, 0xc2, 0xbe, 0xc4, 0xea, 0x40, 0xd4, 0xf9, 0x9c, 0x90, 0x10, 0xf6, 0x18, 0xff, 0x95,
];

const PUB_KEY: [u8; 96] = [
    0x1f, 0xba, 0xc8, 0xee, 0xbd, 0x0c, 0xbf, 0x35, 0x64, 0x0b, 0x39, 0xef, 0xe0, 0x80, 0x8d, 0xd7,
    0x74, 0xde, 0xbf, 0xf2, 0x0a, 0x2a, 0x32, 0x9e, 0x91, 0x71, 0x3b, 0xaf, 0x7d, 0x7f, 0x3c, 0x3e,
    0x81, 0x54, 0x6d, 0x88, 0x37, 0x30, 0xbe, 0xe7, 0xe4, 0x86, 0x78, 0xf8, 0x57, 0xb0, 0x2c, 0xa0,
    0xeb, 0x21, 0x31, 0x03, 0xbd, 0x68, 0xce, 0x34, 0x33, 0x65, 0xa8, 0xa4, 0xc3, 0xd4, 0x55, 0x5f,
    0xa3, 0x85, 0xf5, 0x33, 0x02, 0x03, 0xbd, 0xd7, 0x6f, 0xfa, 0xd1, 0xf3, 0xaf, 0xfb, 0x95, 0x75,
    0x1c, 0x13, 0x20, 0x07, 0xe1, 0xb2, 0x40, 0x35, 0x3c, 0xb0, 0xa4, 0xcf, 0x16, 0x93, 0xbd, 0xf9,
];

const SIGNATURE: [u8; 96] = [
    0xa0, 0xc2, 0x7e, 0xc8, 0x93, 0x09, 0x2d, 0xea, 0x1e, 0x1b, 0xd2, 0xcc, 0xfe, 0xd3, 0xcf, 0x94,
    0x5c, 0x81, 0x34, 0xed, 0x0c, 0x9f, 0x81, 0x31, 0x1a, 0x0f, 0x4a, 0x05, 0x94, 0x2d, 0xb8, 0xdb,
    0xed, 0x8d, 0xd5, 0x9f, 0x26, 0x74, 0x71, 0xd5, 0x46, 0x2a, 0xa1, 0x4f, 0xe7, 0x2d, 0xe8, 0x56,
    0x96, 0xb9, 0x36, 0x9b, 0x46, 0xde, 0xf4, 0x52, 0xe0, 0xfa, 0x07, 0x9f, 0x4b, 0x41, 0x8e, 0x70,
    0x42, 0x39, 0x1c, 0xe9, 0x2f, 0x27, 0xa8, 0x45, 0x9e, 0x12, 0x4d, 0x1f, 0xdd, 0x03, 0xce, 0x6c,
    0xf5, 0xf7, 0xcb, 0x89, 0x58, 0xf2, 0xbe, 0xbb, 0xb6, 0x6b, 0x66, 0xc7, 0x8a, 0xdb, 0xa3, 0x41,
];

const CURVE: Curve = Curve::P384;
const LEN: usize = CURVE.size();

// Scratch layout
const PRIV_KEY_OFF: usize = 0x000;
const EPHEMERAL_OFF: usize = 0x040;
const HASH_OFF: usize = 0x080;
const PUB_KEY_OFF: usize = 0x0C0;
const SIGNATURE_OFF: usize = 0x140;
const OUT_OFF: usize = 0x1A0;

#[derive(Default, Debug)]
pub struct EcdsaKat {}

impl EcdsaKat {
    /// This function executes the Known Answer Tests (aka KAT) for ECDSA P-384.
    ///
    /// With the `fips-self-test` feature the public key derivation, including
    /// its pairwise consistency test, is checked too.
    ///
    /// # Arguments
    ///
    /// * `env` - Engines and scratch memory
    ///
    /// # Returns
    ///
    /// * `CryptoResult` - Result denoting the KAT outcome.
    pub fn execute<H: HwAccess>(&self, env: &mut KatsEnv<H>) -> CryptoResult<()> {
        env.scoped(|env| {
            #[cfg(feature = "fips-self-test")]
            self.kat_public_key_generate(env)?;
            self.kat_signature_generate(env)?;
            self.kat_signature_verify(env)
        })
    }

    #[cfg(feature = "fips-self-test")]
    fn kat_public_key_generate<H: HwAccess>(&self, env: &mut KatsEnv<H>) -> CryptoResult<()> {
        let key_addr = stage(env, PRIV_KEY_OFF, &PRIV_KEY)?;
        let pub_key_addr = env.at(OUT_OFF);
        env.ecdsa
            .generate_public_key(env.hal, kat_gate(), KAT_OWNER, CURVE, key_addr, pub_key_addr)?;
        compare(env, OUT_OFF, &PUB_KEY, CryptoError::KAT_ECDSA_PUB_KEY_MISMATCH)
    }

    fn kat_signature_generate<H: HwAccess>(&self, env: &mut KatsEnv<H>) -> CryptoResult<()> {
        let params = EcdsaSignParams {
            curve: CURVE,
            key_addr: stage(env, PRIV_KEY_OFF, &PRIV_KEY)?,
            ephemeral_addr: stage(env, EPHEMERAL_OFF, &EPHEMERAL)?,
            hash_addr: stage(env, HASH_OFF, &HASH)?,
            hash_len: LEN as u32,
            sig_addr: env.at(OUT_OFF),
        };
        env.ecdsa.sign(env.hal, kat_gate(), KAT_OWNER, &params)?;
        compare(env, OUT_OFF, &SIGNATURE, CryptoError::KAT_ECDSA_SIGNATURE_MISMATCH)
    }

    fn kat_signature_verify<H: HwAccess>(&self, env: &mut KatsEnv<H>) -> CryptoResult<()> {
        let params = EcdsaVerifyParams {
            curve: CURVE,
            pub_key_addr: stage(env, PUB_KEY_OFF, &PUB_KEY)?,
            hash_addr: stage(env, HASH_OFF, &HASH)?,
            hash_len: LEN as u32,
            sig_addr: stage(env, SIGNATURE_OFF, &SIGNATURE)?,
        };
        match env.ecdsa.verify(env.hal, kat_gate(), KAT_OWNER, &params) {
            Err(CryptoError::ECDSA_BAD_SIGNATURE) => Err(CryptoError::KAT_ECDSA_VERIFY_FAILED),
            other => other,
        }
    }
}

/// Convert big endian operands to the memory layout of the engine.
fn to_engine_layout<H: HwAccess>(
    env: &KatsEnv<H>,
    be: &[u8],
    out: &mut [u8; 2 * ECC_MAX_SIZE],
) -> CryptoResult<usize> {
    let layout = match env.ecdsa.layout() {
        Layout::Reversed => Layout::Native,
        Layout::Native => Layout::Reversed,
    };
    for (i, chunk) in be.chunks_exact(LEN).enumerate() {
        copy_with_layout(
            &mut out[i * LEN..],
            chunk,
            LEN,
            layout,
            CryptoError::KAT_SCRATCH_OVERFLOW,
        )?;
    }
    Ok(be.len())
}

/// Stage one or two concatenated operands at `offset`.
fn stage<H: HwAccess>(env: &mut KatsEnv<H>, offset: usize, be: &[u8]) -> CryptoResult<Addr> {
    let mut buf = [0u8; 2 * ECC_MAX_SIZE];
    let len = to_engine_layout(env, be, &mut buf)?;
    env.put(offset, &buf[..len])
}

fn compare<H: HwAccess>(
    env: &KatsEnv<H>,
    offset: usize,
    expected_be: &[u8],
    err: CryptoError,
) -> CryptoResult<()> {
    let mut expected = [0u8; 2 * ECC_MAX_SIZE];
    let len = to_engine_layout(env, expected_be, &mut expected)?;
    let mut actual = [0u8; 2 * ECC_MAX_SIZE];
    env.get(offset, &mut actual[..len])?;
    expect_eq(&actual[..len], &expected[..len], err)
}
