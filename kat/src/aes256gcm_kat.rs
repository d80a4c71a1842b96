/*++

Licensed under the Apache-2.0 license.

File Name:

    aes256gcm_kat.rs

Abstract:

    File contains the Known Answer Tests (KAT) for AES-256-GCM cryptography operations.

--*/

use cryptoeng_drivers::{
    AesDataParams, AesKeySize, AesKeySrc, AesState, HwAccess, KeyClearTarget,
};
use cryptoeng_error::{CryptoError, CryptoResult};

use crate::kats_env::{expect_eq, kat_gate, KatsEnv, KAT_OWNER};

// KEY = d416a6931d52e0f50aa089a757b11a891cbd1b83847d4bed9e2938cd4c54a8ba
// IV = 85365f88b0b56298dfea5ab2
// AAD = 9a7b86e782ccaa6ab221bd03470bdc2e
// PT = 2fbf029ee9fbd611c24d814e6aff2677c35a83bce5632ce789436c6882ca1c71
// CT = 598cd19f1683b41b4c59e1c157d41501a3c08902f0ea3a376a8b0d9988cff8c1
// Tag = adcefe2f6ee4c7060e44aa5edf0dbebc

const KEY: [u8; 32] = [
    0xd4, 0x16, 0xa6, 0x93, 0x1d, 0x52, 0xe0, 0xf5, 0x0a, 0xa0, 0x89, 0xa7, 0x57, 0xb1, 0x1a, 0x89,
    0x1c, 0xbd, 0x1b, 0x83, 0x84, 0x7d, 0x4b, 0xed, 0x9e, 0x29, 0x38, 0xcd, 0x4c, 0x54, 0xa8, 0xba,
];
const IV: [u8; 12] = [
    0x85, 0x36, 0x5f, 0x88, 0xb0, 0xb5, 0x62, 0x98, 0xdf, 0xea, 0x5a, 0xb2,
];
const AAD: [u8; 16] = [
    0x9a, 0x7b, 0x86, 0xe7, 0x82, 0xcc, 0xaa, 0x6a, 0xb2, 0x21, 0xbd, 0x03, 0x47, 0x0b, 0xdc, 0x2e,
];
const PT: [u8; 32] = [
    0x2f, 0xbf, 0x02, 0x9e, 0xe9, 0xfb, 0xd6, 0x11, 0xc2, 0x4d, 0x81, 0x4e, 0x6a, 0xff, 0x26, 0x77,
    0xc3, 0x5a, 0x83, 0xbc, 0xe5, 0x63, 0x2c, 0xe7, 0x89, 0x43, 0x6c, 0x68, 0x82, 0xca, 0x1c, 0x71,
];
const CT: [u8; 32] = [
    0x59, 0x8c, 0xd1, 0x9f, 0x16, 0x83, 0xb4, 0x1b, 0x4c, 0x59, 0xe1, 0xc1, 0x57, 0xd4, 0x15, 0x01,
    0xa3, 0xc0, 0x89, 0x02, 0xf0, 0xea, 0x3a, 0x37, 0x6a, 0x8b, 0x0d, 0x99, 0x88, 0xcf, 0xf8, 0xc1,
];
const TAG: [u8; 16] = [
    0xad, 0xce, 0xfe, 0x2f, 0x6e, 0xe4, 0xc7, 0x06, 0x0e, 0x44, 0xaa, 0x5e, 0xdf, 0x0d, 0xbe, 0xbc,
];

// Scratch layout
const KEY_OFF: usize = 0x00;
const IV_OFF: usize = 0x20;
const AAD_OFF: usize = 0x30;
const PT_OFF: usize = 0x40;
const CT_OFF: usize = 0x60;
const TAG_OFF: usize = 0x80;
const OUT_OFF: usize = 0x90;

/// Key source the test loads its key into
const KAT_KEY_SRC: AesKeySrc = AesKeySrc::User7;

#[derive(Default, Debug)]
pub struct Aes256GcmKat {}

impl Aes256GcmKat {
    /// This function executes the Known Answer Tests (aka KAT) for AES-256-GCM.
    ///
    /// Encrypts the vector, decrypts it back and checks that a corrupted tag
    /// is rejected. The key source is cleared afterwards.
    ///
    /// # Arguments
    ///
    /// * `env` - Engines and scratch memory
    ///
    /// # Returns
    ///
    /// * `CryptoResult` - Result denoting the KAT outcome.
    pub fn execute<H: HwAccess>(&self, env: &mut KatsEnv<H>) -> CryptoResult<()> {
        if env.aes.state() == AesState::Uninitialized {
            env.aes.init(env.hal, KAT_OWNER)?;
        }

        let result = env.scoped(|env| self.encrypt_decrypt(env));
        let cleared = env.aes.key_zero(
            env.hal,
            KAT_OWNER,
            KeyClearTarget::Source(KAT_KEY_SRC),
        );
        result.and(cleared)
    }

    fn params<H: HwAccess>(env: &KatsEnv<H>, in_off: usize, out_off: usize) -> AesDataParams {
        AesDataParams {
            key_src: KAT_KEY_SRC,
            key_size: AesKeySize::Key256,
            iv_addr: env.at(IV_OFF),
            aad_addr: env.at(AAD_OFF),
            aad_len: AAD.len() as u32,
            in_addr: env.at(in_off),
            out_addr: env.at(out_off),
            data_len: PT.len() as u32,
            tag_addr: env.at(TAG_OFF),
        }
    }

    fn encrypt_decrypt<H: HwAccess>(&self, env: &mut KatsEnv<H>) -> CryptoResult<()> {
        let owner = KAT_OWNER;
        let mut iv = [0u8; 16];
        iv[..IV.len()].copy_from_slice(&IV);

        let key_addr = env.put(KEY_OFF, &KEY)?;
        env.put(IV_OFF, &iv)?;
        env.put(AAD_OFF, &AAD)?;
        env.put(PT_OFF, &PT)?;
        env.aes
            .write_key(env.hal, owner, KAT_KEY_SRC, AesKeySize::Key256, key_addr)?;
        env.put(KEY_OFF, &[0u8; 32])?;

        let params = Self::params(env, PT_OFF, CT_OFF);
        env.aes
            .encrypt_data(env.hal, kat_gate(), owner, &params)?;

        let mut ciphertext = [0u8; 32];
        let mut tag = [0u8; 16];
        env.get(CT_OFF, &mut ciphertext)?;
        env.get(TAG_OFF, &mut tag)?;
        expect_eq(&ciphertext, &CT, CryptoError::KAT_AES_CIPHERTEXT_MISMATCH)?;
        expect_eq(&tag, &TAG, CryptoError::KAT_AES_TAG_MISMATCH)?;

        env.put(CT_OFF, &CT)?;
        env.put(TAG_OFF, &TAG)?;
        let params = Self::params(env, CT_OFF, OUT_OFF);
        env.aes
            .decrypt_data(env.hal, kat_gate(), owner, &params)?;

        let mut plaintext = [0u8; 32];
        env.get(OUT_OFF, &mut plaintext)?;
        expect_eq(&plaintext, &PT, CryptoError::KAT_AES_PLAINTEXT_MISMATCH)?;

        // A single flipped tag bit must fail authentication.
        tag = TAG;
        tag[0] ^= 1;
        env.put(TAG_OFF, &tag)?;
        match env
            .aes
            .decrypt_data(env.hal, kat_gate(), owner, &params)
        {
            Err(CryptoError::AES_TAG_MISMATCH) => Ok(()),
            Ok(()) => Err(CryptoError::KAT_AES_TAG_MISMATCH),
            Err(e) => Err(e),
        }
    }
}
