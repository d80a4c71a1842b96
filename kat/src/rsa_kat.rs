/*++

Licensed under the Apache-2.0 license.

File Name:

    rsa_kat.rs

Abstract:

    File contains the Known Answer Tests (KAT) for RSA-2048 cryptography operations.

--*/

#[cfg(feature = "fips-self-test")]
use cryptoeng_cfi_lib::zeroize_verified;
use cryptoeng_drivers::{HwAccess, RsaExponent, RsaKeySize, RsaParams};
use cryptoeng_error::{CryptoError, CryptoResult};

use crate::kats_env::{expect_eq, kat_gate, KatsEnv, KAT_OWNER};

const PUB_EXP: u32 = 65537;

const MODULUS: [u8; 256] = [
    0xae, 0xfe, 0xc6, 0x93, 0xf1, 0x06, 0x01, 0x47, 0x17, 0x28, 0xa2, 0x49, 0x6f, 0xa3, 0x1d, 0x8c,
    0xdb, 0xf9, 0xb3, 0x57, 0x67, 0xef, 0x31, 0xcd, 0xac, 0x13, 0x1c, 0x20, 0xe0, 0x9d, 0x55, 0x55,
    0xfd, 0x0c, 0x30, 0xb7, 0x83, 0x28, 0xa5, 0x4c, 0x77, 0xc0, 0x85, 0x11, 0x70, 0xb4, 0x4a, 0xfc,
    0x98, 0xdf, 0x75, 0x69, 0xd8, 0xf9, 0x21, 0x6a, 0x65, 0xaa, 0x30, 0x84, 0xcf, 0x2e, 0xcb, 0x6c,
    0x91, 0xd5, 0x6a, 0x0d, 0x46, 0xe7, 0x37, 0xb0, 0x3f, 0x1f, 0x71, 0xd9, 0x5d, 0x0b, 0xd6, 0x5c,
    0x61, 0xcb, 0xd2, 0x8a, 0x96, 0xb9, 0x7e, 0x1b, 0xa9, 0x33, 0x69, 0xd3, 0xba, 0x50, 0xa1, 0x10,
    0xfe, 0x53, 0x1f, 0x5c, 0x63, 0xb1, 0xf6, 0x3b, 0xb0, 0xe8, 0x83, 0x0b, 0x5f, 0x30, 0x00, 0x35,
    0x1f, 0xa3, 0x4e, 0x7a, 0x3e, 0xe1, 0x51, 0xae, 0x7c, 0x62, 0xaf, 0x06, 0x99, 0x5e, 0x14, 0x73,
    0xf5, 0x7c, 0x35, 0x40, 0xbb, 0xb7, 0xa3, 0x3c, 0x13, 0xe0, 0x92, 0x7e, 0x03, 0x16, 0x73, 0xad,
    0x78, 0x26, 0x0b, 0x13, 0x29, 0x2f, 0x5f, 0x29, 0x40, 0xd8, 0xbf, 0x5e, 0x73, 0xfa, 0x55, 0x2d,
    0x3e, 0xab, 0x7f, 0x3c, 0xb3, 0x58, 0xa5, 0x9f, 0xa8, 0x3c, 0x12, 0x58, 0x27, 0xc5, 0xe3, 0x0b,
    0x11, 0xcd, 0x3f, 0x1d, 0xaa, 0x98, 0x77, 0x0f, 0x6d, 0x99, 0x26, 0xe2, 0x73, 0x28, 0x31, 0x8e,
    0x9c, 0x40, 0x51, 0xc8, 0x58, 0x52, 0xa1, 0x07, 0xad, 0xaf, 0x36, 0xb8, 0xc8, 0x08, 0x49, 0xd7,
    0xce, 0x28, 0x7f, 0xe3, 0xb2, 0xf1, 0xb1, 0xe9, 0x6a, 0x59, 0x43, 0xdc, 0xd8, 0x4d, 0x68, 0xc0,
    0x11, 0x21, 0xee, 0xed, 0xb0, 0x0b, 0xa8, 0x24, 0xe0, 0xd5, 0x36, 0xc2, 0xfd, 0x3e, 0x35, 0xc3,
    0x37, 0xc4, 0xa2, 0x84, 0xa4, 0xc2, 0xd6, 0xec, 0xae, 0xff, 0xfb, 0xc5, 0xd1, 0x05, 0xd2, 0x23,
];

#[cfg(feature = "fips-self-test")]
const PRIV_EXP: [u8; 256] = [
    0x0a, 0xa8, 0x1b, 0x41, 0xb1, 0x20, 0xd3, 0x7d, 0x17, 0xcc, 0xf2, 0xad, 0x14, 0x2e, 0x53, 0xc3,
    0x5b, 0x36, 0x06, 0x94, 0xe1, 0x10, 0x70, 0xf0, 0xfc, 0x74, 0xa1, 0x76, 0xe3, 0x16, 0xd1, 0xb6,
    0x8d, 0xd5, 0x6b, 0x36, 0x11, 0xb7, 0xac, 0xf1, 0x4e, 0x2d, 0x9c, 0x2c, 0xe6, 0xb7, 0x24, 0x05,
    0xe3, 0xed, 0x5f, 0xc2, 0x15, 0x63, 0x7e, 0x84, 0x73, 0x32, 0x7d, 0x07, 0xe9, 0x72, 0x09, 0x13,
    0x50, 0x82, 0x35, 0x96, 0x1f, 0x66, 0x3f, 0x3e, 0xed, 0x69, 0x25, 0xce, 0xbd, 0xda, 0xd5, 0xb0,
    0x04, 0x88, 0x9c, 0x06, 0xb2, 0x8d, 0x13, 0x3f, 0xed, 0xfa, 0xe2, 0x8b, 0xf1, 0x41, 0xad, 0xbd,
    0x52, 0x2f, 0x8f, 0xae, 0x59, 0xa7, 0xe1, 0xbd, 0xda, 0xd5, 0x1d, 0xfd, 0xd8, 0x4b, 0x1d, 0x08,
    0x1f, 0x28, 0x1b, 0xc4, 0x58, 0x05, 0xf2, 0xaa, 0x74, 0x8a, 0xb1, 0xeb, 0xed, 0xf5, 0x0b, 0xbb,
    0xb6, 0x16, 0x8d, 0x2b, 0xe3, 0x81, 0xc5, 0x23, 0xc8, 0x34, 0x37, 0x6d, 0xe0, 0xe6, 0xf3, 0xa8,
    0x57, 0xaf, 0xa2, 0xab, 0x74, 0xae, 0xa1, 0x33, 0x6e, 0x81, 0x0b, 0x73, 0x23, 0x39, 0xe2, 0xcb,
    0xd6, 0xa0, 0xe5, 0xbf, 0x6d, 0x4a, 0x23, 0x10, 0x1b, 0x5b, 0xaa, 0x6e, 0xda, 0x76, 0x11, 0x7c,
    0xb5, 0xfb, 0xca, 0xe2, 0xf8, 0xb5, 0x54, 0x10, 0x29, 0x5c, 0x30, 0x19, 0x0d, 0x09, 0x85, 0x9a,
    0x2d, 0xfb, 0x7a, 0xb7, 0xa2, 0xfb, 0xcb, 0xa7, 0x83, 0x08, 0xb2, 0x87, 0x81, 0xdd, 0x6b, 0x52,
    0x91, 0xc1, 0x10, 0x4d, 0x1d, 0x55, 0xa1, 0x5e, 0xac, 0xfc, 0x3c, 0x6a, 0x1c, 0x0f, 0xdc, 0x55,
    0x64, 0x0f, 0x56, 0x2c, 0x37, 0x2f, 0xf7, 0xe6, 0x90, 0xe8, 0x99, 0xe3, 0x06, 0x34, 0xf8, 0xf2,
    0xe2, 0x90, 0x1c, 0x5c, 0xd9, 0xa8, 0x45, 0x72, 0x40, 0x94, 0x5c, 0x3c, 0x28, 0x32, 0x44, 0xd1,
];

const MESSAGE: [u8; 256] = [
    0x30, 0x68, 0x1b, 0x08, 0x2e, 0x9b, 0xaa, 0x9d, 0x14, 0x81, 0x7a, 0x3a, 0xdf, 0xa0, 0xd8, 0x4b,
    0x77, 0x58, 0xc9, 0x20, 0xc5, 0x8a, 0x08, 0xe7, 0xb9, 0x73, 0x2e, 0x8e, 0x99, 0x8b, 0x0d, 0x44,
    0x0c, 0x59, 0x61, 0xa0, 0x05, 0x32, 0x6c, 0x35, 0xee, 0xac, 0x47, 0x6b, 0xd6, 0x3e, 0x2b, 0xf6,
    0x69, 0x04, 0x5c, 0x26, 0xc2, 0x97, 0xd4, 0xba, 0x53, 0x0f, 0xa6, 0xdb, 0xe9, 0xcd, 0x2d, 0x08,
    0xc3, 0x38, 0x40, 0x3b, 0x44, 0x63, 0x66, 0xc3, 0x8a, 0xf1, 0xfc, 0xbd, 0xa8, 0x4f, 0x2a, 0x6e,
    0x11, 0xde, 0xb8, 0x82, 0x53, 0x91, 0x9a, 0xb3, 0x47, 0x4b, 0xc2, 0x44, 0xa9, 0x75, 0xdd, 0xeb,
    0x6f, 0x85, 0x38, 0xbd, 0xef, 0xb1, 0x13, 0xd8, 0xb3, 0xc7, 0x13, 0x58, 0x05, 0x9f, 0xde, 0x15,
    0x40, 0x91, 0x90, 0x0e, 0x6b, 0x0b, 0x50, 0x89, 0x64, 0x20, 0x2f, 0x08, 0x25, 0x50, 0xd0, 0xa3,
    0xcd, 0xca, 0x78, 0x1a, 0xa8, 0xc3, 0x9f, 0x7c, 0xcd, 0x03, 0x21, 0xc4, 0xeb, 0x2b, 0x05, 0x96,
    0xac, 0x6a, 0xa7, 0x09, 0x3d, 0x53, 0x00, 0xb9, 0xce, 0x6f, 0x5d, 0x7c, 0x1c, 0xf0, 0x71, 0xfc,
    0x20, 0x34, 0xe7, 0xf9, 0x93, 0xa8, 0xbe, 0x47, 0xa1, 0x05, 0x7d, 0x91, 0x9f, 0x0c, 0x2c, 0xaf,
    0xae, 0xa1, 0xfa, 0xbd, 0x2b, 0x3d, 0x83, 0x91, 0xbf, 0xc2, 0x81, 0x76, 0x57, 0x6a, 0xf5, 0xd6,
    0xa4, 0x32, 0xd2, 0x44, 0x4a, 0x08, 0x7d, 0xa8, 0xbc, 0x0d, 0x8e, 0x6c, 0xb8, 0x51, 0xf2, 0xf9,
    0x90, 0x55, 0xed, 0xc1, 0xeb, 0x7f, 0x6b, 0x24, 0xd7, 0xc2, 0x68, 0xd3, 0x02, 0xe9, 0x50, 0x28,
    0xe1, 0xee, 0x29, 0x0b, 0x92, 0x8a, 0xee, 0xd4, 0xfd, 0xaf, 0xef, 0x94, 0x0c, 0xa6, 0xf5, 0xd7,
    0x62, 0x14, 0x97, 0xb8, 0xb3, 0xf5, 0x76, 0xd5, 0x4e, 0x14, 0x80, 0x04, 0xe9, 0x09, 0x47, 0x77,
];

const CIPHERTEXT: [u8; 256] = [
    0x3b, 0xce, 0xc0, 0x73, 0xa9, 0x93, 0x58, 0x71, 0x94, 0xaf, 0xb8, 0xe9, 0x6e, 0x51, 0x81, 0x5a,
    0xe6, 0x0f, 0xcc, 0x17, 0x08, 0xa9, 0xd0, 0x1f, 0xdf, 0x72, 0xf5, 0xab, 0x2b, 0x6c, 0xf7, 0xf8,
    0x75, 0xd1, 0xe8, 0x56, 0xc3, 0x5d, 0x19, 0xd9, 0x50, 0x3c, 0xe0, 0xe3, 0x1c, 0x58, 0x38, 0xb0,
    0x03, 0x01, 0xa4, 0x9b, 0x61, 0xfb, 0x5f, 0x4e, 0xf0, 0x47, 0x9b, 0x79, 0x10, 0xab, 0x68, 0x91,
    0xa4, 0x37, 0x5f, 0x51, 0xa8, 0x6a, 0x5c, 0xd4, 0xf2, 0x20, 0x5a, 0x76, 0x35, 0x6f, 0x90, 0x3e,
    0xd7, 0x86, 0xe0, 0xe4, 0x12, 0xac, 0x54, 0xf6, 0x35, 0x1f, 0x56, 0x41, 0x77, 0x91, 0x3a, 0x46,
    0xe1, 0x78, 0xfb, 0x0c, 0xbf, 0x6d, 0x80, 0xb3, 0xea, 0xbe, 0x2f, 0x38, 0x31, 0x05, 0x03, 0x3b,
    0x54, 0xdc, 0x17, 0x0f, 0x1d, 0x13, 0x75, 0x53, 0xe5, 0x3e, 0x22, 0x8f, 0x98, 0x94, 0x6b, 0x5f,
    0xbb, 0xdf, 0xca, 0x6e, 0x01, 0x41, 0xaf, 0xe0, 0xa7, 0x9a, 0x54, 0x6f, 0x8e, 0x04, 0x93, 0x1a,
    0xf8, 0xcd, 0xc9, 0x77, 0x94, 0x7e, 0x21, 0xb7, 0x94, 0x57, 0xc8, 0x97, 0xf2, 0x96, 0x93, 0xcc,
    0x61, 0xd4, 0x4a, 0xda, 0x09, 0x31, 0xce, 0xe2, 0x5e, 0xc1, 0x9d, 0x43, 0xb3, 0x0a, 0xc8, 0xc1,
    0x81, 0xa0, 0xa5, 0x70, 0xca, 0x80, 0x18, 0x7a, 0x16, 0x2a, 0x34, 0x3b, 0x66, 0x92, 0x30, 0x23,
    0x6d, 0x25, 0x1f, 0xad, 0x26, 0x01, 0xba, 0x8b, 0x52, 0x2e, 0x46, 0xf0, 0x76, 0x70, 0x5f, 0x95,
    0x5d, 0x31, 0xd5, 0xda, 0xb2, 0x9e, 0xf0, 0x41, 0x3e, 0xc2, 0x60, 0x55, 0x89, 0x3c, 0xcd, 0xf3,
    0xf1, 0x0b, 0xa3, 0x45, 0xd6, 0x80, 0xc2, 0xd9, 0x3a, 0xa1, 0x62, 0x5c, 0xa9, 0xa8, 0xac, 0x60,
    0x3f, 0x82, 0x0c, 0x55, 0xb8, 0x7b, 0x69, 0x41, 0x2d, 0x61, 0xc5, 0x32, 0x93, 0x3b, 0xc4, 0x6b,
];

const KEY_SIZE: RsaKeySize = RsaKeySize::Rsa2048;
const LEN: usize = KEY_SIZE.bytes();

// Scratch layout
const MODULUS_OFF: usize = 0x000;
#[cfg(feature = "fips-self-test")]
const EXP_OFF: usize = 0x100;
const INPUT_OFF: usize = 0x200;
const OUTPUT_OFF: usize = 0x300;

#[derive(Default, Debug)]
pub struct RsaPubEncKat {}

impl RsaPubEncKat {
    /// This function executes the Known Answer Test (aka KAT) for RSA-2048
    /// public key encryption.
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
            let exponent = RsaExponent::Public(PUB_EXP);
            let mut output = [0u8; LEN];
            exponentiate(env, exponent, &MESSAGE, &mut output)?;
            expect_eq(&output, &CIPHERTEXT, CryptoError::KAT_RSA_PUB_ENC_MISMATCH)
        })
    }
}

#[cfg(feature = "fips-self-test")]
#[derive(Default, Debug)]
pub struct RsaPrivDecKat {}

#[cfg(feature = "fips-self-test")]
impl RsaPrivDecKat {
    /// This function executes the Known Answer Test (aka KAT) for RSA-2048
    /// private key decryption.
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
            let exponent = RsaExponent::Private(env.put(EXP_OFF, &PRIV_EXP)?);
            let mut output = [0u8; LEN];
            let result = exponentiate(env, exponent, &CIPHERTEXT, &mut output).and_then(|_| {
                expect_eq(&output, &MESSAGE, CryptoError::KAT_RSA_PRIV_DEC_MISMATCH)
            });
            let wiped = zeroize_verified(&mut output);
            result.and(wiped)
        })
    }
}

fn exponentiate<H: HwAccess>(
    env: &mut KatsEnv<H>,
    exponent: RsaExponent,
    input: &[u8; LEN],
    output: &mut [u8; LEN],
) -> CryptoResult<()> {
    let params = RsaParams {
        key_size: KEY_SIZE,
        modulus_addr: env.put(MODULUS_OFF, &MODULUS)?,
        exponent,
        ext_addr: None,
        input_addr: env.put(INPUT_OFF, input)?,
        output_addr: env.at(OUTPUT_OFF),
    };
    env.rsa.operation(env.hal, kat_gate(), KAT_OWNER, &params)?;
    env.get(OUTPUT_OFF, output)
}
