/*++

Licensed under the Apache-2.0 license.

File Name:

    key_policy.rs

Abstract:

    File contains the AES key source table: what each key source may be used
    for and how it is selected, written and cleared in hardware.

--*/

use crate::reg::aes_regs::{self, key_clear, key_dec_sel, key_sel};
use cryptoeng_error::{CryptoError, CryptoResult};

/// AES key source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AesKeySrc {
    Bbram,
    BbramRed,
    BootHeader,
    BootHeaderRed,
    Efuse,
    EfuseRed,
    EfuseUser0,
    EfuseUser1,
    EfuseUserRed0,
    EfuseUserRed1,
    Kup,
    Puf,
    User0,
    User1,
    User2,
    User3,
    User4,
    User5,
    User6,
    User7,
}

impl AesKeySrc {
    /// User key `n`
    pub fn user(n: u32) -> CryptoResult<Self> {
        const USERS: [AesKeySrc; 8] = [
            AesKeySrc::User0,
            AesKeySrc::User1,
            AesKeySrc::User2,
            AesKeySrc::User3,
            AesKeySrc::User4,
            AesKeySrc::User5,
            AesKeySrc::User6,
            AesKeySrc::User7,
        ];
        USERS
            .get(n as usize)
            .copied()
            .ok_or(CryptoError::AES_INVALID_KEY_SRC)
    }

    /// Policy of this source
    pub fn policy(self) -> &'static KeySourcePolicy {
        // Every source has exactly one entry; checked by the tests below.
        KEY_POLICY
            .iter()
            .find(|p| p.src == self)
            .unwrap_or(&KEY_POLICY[0])
    }
}

impl TryFrom<u32> for AesKeySrc {
    type Error = CryptoError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        KEY_POLICY
            .get(raw as usize)
            .map(|p| p.src)
            .ok_or(CryptoError::AES_INVALID_KEY_SRC)
    }
}

/// Usage rules and hardware handles of one key source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySourcePolicy {
    pub src: AesKeySrc,

    /// Value of the `KEY_SEL` register selecting this key
    pub sel: u32,

    /// Key register offset, for sources software may write
    pub key_reg: Option<u32>,

    /// External callers may write the key
    pub user_writable: bool,

    pub encrypt_allowed: bool,

    pub decrypt_allowed: bool,

    /// May act as the key encryption key of a key decryption
    pub kek_src_allowed: bool,

    /// `KEY_DEC_SEL` value when this is a red key that can be decrypted into place
    pub dec_sel: Option<u32>,

    /// `KEY_CLEAR` bit, for sources that can be zeroized on their own
    pub clear_mask: Option<u32>,

    /// Device key; never usable directly by an external caller
    pub device_key: bool,

    pub allows_128: bool,
}

impl KeySourcePolicy {
    const fn device(src: AesKeySrc, sel: u32) -> Self {
        Self {
            src,
            sel,
            key_reg: None,
            user_writable: false,
            encrypt_allowed: true,
            decrypt_allowed: true,
            kek_src_allowed: true,
            dec_sel: None,
            clear_mask: None,
            device_key: true,
            allows_128: true,
        }
    }

    const fn red(mut self, dec_sel: u32, clear_mask: u32) -> Self {
        self.kek_src_allowed = false;
        self.dec_sel = Some(dec_sel);
        self.clear_mask = Some(clear_mask);
        self
    }

    const fn clear(mut self, clear_mask: u32) -> Self {
        self.clear_mask = Some(clear_mask);
        self
    }

    const fn user(src: AesKeySrc, n: u32) -> Self {
        Self {
            src,
            sel: key_sel::USER_0 + n,
            key_reg: Some(aes_regs::USER_KEY_0_0 + n * aes_regs::USER_KEY_STRIDE),
            user_writable: true,
            encrypt_allowed: true,
            decrypt_allowed: true,
            kek_src_allowed: false,
            dec_sel: None,
            clear_mask: Some(key_clear::USER_0 << n),
            device_key: false,
            allows_128: true,
        }
    }

    const fn internal(src: AesKeySrc, sel: u32, clear_mask: u32) -> Self {
        Self {
            src,
            sel,
            key_reg: None,
            user_writable: false,
            encrypt_allowed: true,
            decrypt_allowed: true,
            kek_src_allowed: false,
            dec_sel: None,
            clear_mask: Some(clear_mask),
            device_key: false,
            allows_128: true,
        }
    }
}

/// Key source table, in `AesKeySrc` wire order
pub const KEY_POLICY: [KeySourcePolicy; 20] = [
    KeySourcePolicy::device(AesKeySrc::Bbram, key_sel::BBRAM),
    KeySourcePolicy::device(AesKeySrc::BbramRed, key_sel::BBRAM_RED)
        .red(key_dec_sel::BBRAM_RED, key_clear::BBRAM_RED),
    // Loaded by the boot loader only; cleared only with all keys.
    KeySourcePolicy {
        key_reg: Some(aes_regs::BH_KEY_0),
        allows_128: false,
        ..KeySourcePolicy::device(AesKeySrc::BootHeader, key_sel::BH)
    },
    KeySourcePolicy::device(AesKeySrc::BootHeaderRed, key_sel::BH_RED)
        .red(key_dec_sel::BH_RED, key_clear::BH_RED),
    KeySourcePolicy::device(AesKeySrc::Efuse, key_sel::EFUSE).clear(key_clear::EFUSE),
    KeySourcePolicy::device(AesKeySrc::EfuseRed, key_sel::EFUSE_RED)
        .red(key_dec_sel::EFUSE_RED, key_clear::EFUSE_RED),
    KeySourcePolicy::device(AesKeySrc::EfuseUser0, key_sel::EFUSE_USER_0)
        .clear(key_clear::EFUSE_USER_0),
    KeySourcePolicy::device(AesKeySrc::EfuseUser1, key_sel::EFUSE_USER_1)
        .clear(key_clear::EFUSE_USER_1),
    KeySourcePolicy::device(AesKeySrc::EfuseUserRed0, key_sel::EFUSE_USER_RED_0)
        .red(key_dec_sel::EFUSE_USER_RED_0, key_clear::EFUSE_USER_RED_0),
    KeySourcePolicy::device(AesKeySrc::EfuseUserRed1, key_sel::EFUSE_USER_RED_1)
        .red(key_dec_sel::EFUSE_USER_RED_1, key_clear::EFUSE_USER_RED_1),
    KeySourcePolicy::internal(AesKeySrc::Kup, key_sel::KUP, key_clear::KUP),
    KeySourcePolicy::internal(AesKeySrc::Puf, key_sel::PUF, key_clear::PUF),
    KeySourcePolicy::user(AesKeySrc::User0, 0),
    KeySourcePolicy::user(AesKeySrc::User1, 1),
    KeySourcePolicy::user(AesKeySrc::User2, 2),
    KeySourcePolicy::user(AesKeySrc::User3, 3),
    KeySourcePolicy::user(AesKeySrc::User4, 4),
    KeySourcePolicy::user(AesKeySrc::User5, 5),
    KeySourcePolicy::user(AesKeySrc::User6, 6),
    KeySourcePolicy::user(AesKeySrc::User7, 7),
];

/// What a key zeroization targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClearTarget {
    Source(AesKeySrc),

    /// Expanded round keys of the last loaded key
    ExpandedKeys,

    AllKeys,
}

impl KeyClearTarget {
    /// `KEY_CLEAR` mask of the target
    ///
    /// # Returns
    ///
    /// * `AES_KEY_NOT_CLEARABLE` for a source that can't be cleared on its own
    pub fn mask(self) -> CryptoResult<u32> {
        match self {
            KeyClearTarget::Source(src) => src
                .policy()
                .clear_mask
                .ok_or(CryptoError::AES_KEY_NOT_CLEARABLE),
            KeyClearTarget::ExpandedKeys => Ok(key_clear::EXPANDED),
            KeyClearTarget::AllKeys => Ok(key_clear::ALL),
        }
    }
}
