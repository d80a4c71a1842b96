/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains API and macros used by the crypto engine drivers for error handling

--*/
#![cfg_attr(not(any(feature = "std", test)), no_std)]
use core::convert::From;
use core::num::{NonZeroU32, TryFromIntError};

/// Crypto Engine Error Type
///
/// Error codes are laid out as `0xCCKK_DDDD`: `CC` names the component that
/// raised the error, `KK` the error kind and `DDDD` the detail.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CryptoError(pub NonZeroU32);

/// Error taxonomy shared by all components
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// Bad arguments; local and not retriable
    InvalidParam,

    /// Illegal lifecycle transition
    StateMismatch,

    /// Self-test gate not met
    KatNotExecuted,

    /// Engine owned by another caller
    Busy,

    /// Partial operation was reclaimed or abandoned
    DataLost,

    /// Authentication tag did not match
    TagMismatch,

    /// Signature did not verify
    SignatureInvalid,

    /// Redundant check disagreement
    GlitchDetected,

    /// Poll budget exhausted
    Timeout,

    /// Engine reported an internal error
    HardwareError,

    /// Self-test output differs from its expected value
    KatFailed,

    /// Code does not carry a known kind
    Unknown,
}

impl ErrorKind {
    const fn from_bits(bits: u32) -> Self {
        match bits {
            0x01 => Self::InvalidParam,
            0x02 => Self::StateMismatch,
            0x03 => Self::KatNotExecuted,
            0x04 => Self::Busy,
            0x05 => Self::DataLost,
            0x06 => Self::TagMismatch,
            0x07 => Self::SignatureInvalid,
            0x08 => Self::GlitchDetected,
            0x09 => Self::Timeout,
            0x0A => Self::HardwareError,
            0x0B => Self::KatFailed,
            _ => Self::Unknown,
        }
    }
}

/// Component that raised an error
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorComponent {
    Aes,
    Sha,
    Rsa,
    Ecdsa,
    Kat,
    Arbiter,
    SecMem,
    Hal,
    Cfi,
    Runtime,
    Unknown,
}

/// Macro to define error constants ensuring uniqueness
///
/// This macro takes a list of (name, value, doc) tuples and generates
/// constant definitions for each error code.
#[macro_export]
macro_rules! define_error_constants {
    ($(($name:ident, $value:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: CryptoError = CryptoError::new_const($value);
        )*

        #[cfg(test)]
        /// Returns a vector of all defined error constants for testing uniqueness
        pub fn all_constants() -> Vec<(& 'static str, u32)> {
            vec![
                $(
                    (stringify!($name), $value),
                )*
            ]
        }
    };
}

impl CryptoError {
    /// Create an error; intended to only be used from const contexts, as we don't want
    /// runtime panics if val is zero. The preferred way to get a CryptoError from a u32 is to
    /// use `CryptoError::try_from()` from the `TryFrom` trait impl.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("CryptoError cannot be 0"),
        }
    }

    /// Error kind encoded in the code
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::from_bits((self.0.get() >> 16) & 0xFF)
    }

    /// Component encoded in the code
    pub const fn component(&self) -> ErrorComponent {
        match self.0.get() >> 24 {
            0x01 => ErrorComponent::Aes,
            0x02 => ErrorComponent::Sha,
            0x03 => ErrorComponent::Rsa,
            0x04 => ErrorComponent::Ecdsa,
            0x05 => ErrorComponent::Kat,
            0x06 => ErrorComponent::Arbiter,
            0x07 => ErrorComponent::SecMem,
            0x08 => ErrorComponent::Hal,
            0x09 => ErrorComponent::Cfi,
            0x0A => ErrorComponent::Runtime,
            _ => ErrorComponent::Unknown,
        }
    }

    /// Glitches abort the call and must not be retried
    pub const fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::GlitchDetected)
    }

    // Use the macro to define all error constants
    define_error_constants![
        // AES
        (AES_INVALID_PARAM, 0x0101_0001, "AES invalid parameter"),
        (AES_INVALID_KEY_SRC, 0x0101_0002, "AES invalid key source"),
        (AES_INVALID_KEY_SIZE, 0x0101_0003, "AES invalid key size"),
        (
            AES_INVALID_SIZE,
            0x0101_0004,
            "AES data or AAD size is not aligned"
        ),
        (
            AES_KEY_SRC_NOT_WRITABLE,
            0x0101_0005,
            "AES key source is not user writable"
        ),
        (
            AES_DEVICE_KEY_NOT_ALLOWED,
            0x0101_0006,
            "AES device key cannot be used directly"
        ),
        (
            AES_ENCRYPT_NOT_ALLOWED,
            0x0101_0007,
            "AES key source does not permit encryption"
        ),
        (
            AES_DECRYPT_NOT_ALLOWED,
            0x0101_0008,
            "AES key source does not permit decryption"
        ),
        (
            AES_KEK_SRC_NOT_ALLOWED,
            0x0101_0009,
            "AES key source cannot decrypt a key"
        ),
        (
            AES_KEY_NOT_CLEARABLE,
            0x0101_000A,
            "AES key source has no clear mask"
        ),
        (AES_ZEROED_PUF_KEY, 0x0101_000B, "AES PUF key is zeroed"),
        (
            AES_DPA_CM_NOT_SUPPORTED,
            0x0101_000C,
            "AES DPA countermeasure disabled in eFuse"
        ),
        (AES_STATE_MISMATCH, 0x0102_0001, "AES state mismatch"),
        (
            AES_KAT_NOT_EXECUTED,
            0x0103_0001,
            "AES known answer test not executed"
        ),
        (AES_TAG_MISMATCH, 0x0106_0001, "AES GCM tag mismatch"),
        (
            AES_GLITCH_DETECTED,
            0x0108_0001,
            "AES redundant status check disagreed"
        ),
        (AES_KEY_CLEAR_TIMEOUT, 0x0109_0001, "AES key clear timeout"),
        (
            AES_KEY_INIT_TIMEOUT,
            0x0109_0002,
            "AES key load did not complete"
        ),
        (AES_DONE_TIMEOUT, 0x0109_0003, "AES operation did not complete"),
        (
            AES_KEK_DECRYPT_TIMEOUT,
            0x0109_0004,
            "AES key decryption did not complete"
        ),
        (AES_HW_ERROR, 0x010A_0001, "AES engine reported an error"),
        (
            AES_DPA_CM_CONFIG_MISMATCH,
            0x010A_0002,
            "AES DPA countermeasure status does not match configuration"
        ),
        // SHA
        (SHA_INVALID_PARAM, 0x0201_0001, "SHA invalid parameter"),
        (
            SHA_PADDING_NOT_COMPLETE,
            0x0201_0002,
            "SHA caller padded data does not end on a block boundary"
        ),
        (SHA_OUTPUT_TOO_SMALL, 0x0201_0003, "SHA digest buffer too small"),
        (SHA_STATE_MISMATCH, 0x0202_0001, "SHA state mismatch"),
        (
            SHA_KAT_NOT_EXECUTED,
            0x0203_0001,
            "SHA known answer test not executed"
        ),
        (SHA_TIMEOUT, 0x0209_0001, "SHA operation did not complete"),
        (SHA_HW_ERROR, 0x020A_0001, "SHA engine reported an error"),
        // RSA
        (RSA_INVALID_PARAM, 0x0301_0001, "RSA invalid parameter"),
        (RSA_INVALID_KEY_SIZE, 0x0301_0002, "RSA invalid key size"),
        (
            RSA_KAT_NOT_EXECUTED,
            0x0303_0001,
            "RSA known answer test not executed"
        ),
        (
            RSA_RAM_ZEROIZE_FAILED,
            0x0308_0001,
            "RSA RAM readback after zeroization is not zero"
        ),
        (RSA_TIMEOUT, 0x0309_0001, "RSA operation did not complete"),
        (RSA_HW_ERROR, 0x030A_0001, "RSA engine reported an error"),
        // ECDSA
        (ECDSA_INVALID_PARAM, 0x0401_0001, "ECDSA invalid parameter"),
        (ECDSA_UNSUPPORTED_CURVE, 0x0401_0002, "ECDSA curve not supported"),
        (ECDSA_KEY_ZERO, 0x0401_0003, "ECDSA key is zero"),
        (
            ECDSA_KEY_WRONG_ORDER,
            0x0401_0004,
            "ECDSA key is not below the curve order"
        ),
        (
            ECDSA_KEY_NOT_ON_CURVE,
            0x0401_0005,
            "ECDSA public key is not on the curve"
        ),
        (
            ECDSA_BAD_RANDOM_NUMBER,
            0x0401_0006,
            "ECDSA ephemeral key is invalid"
        ),
        (ECDSA_INCORRECT_HASH_LEN, 0x0401_0007, "ECDSA hash length invalid"),
        (
            ECDSA_KAT_NOT_EXECUTED,
            0x0403_0001,
            "ECDSA known answer test not executed"
        ),
        (ECDSA_BAD_SIGNATURE, 0x0407_0001, "ECDSA signature invalid"),
        (
            ECDSA_SIGNATURE_R_S_ZERO,
            0x0407_0002,
            "ECDSA signature r or s is zero or not below the order"
        ),
        (
            ECDSA_GLITCH_DETECTED,
            0x0408_0001,
            "ECDSA redundant status check disagreed"
        ),
        (ECDSA_TIMEOUT, 0x0409_0001, "ECDSA operation did not complete"),
        (ECDSA_HW_ERROR, 0x040A_0001, "ECDSA engine reported an error"),
        (
            ECDSA_PWCT_FAILED,
            0x040B_0001,
            "ECDSA pairwise consistency test failed"
        ),
        // KAT
        (KAT_INVALID_ID, 0x0501_0001, "KAT identifier invalid"),
        (
            KAT_SCRATCH_OVERFLOW,
            0x0501_0002,
            "KAT vector does not fit the scratch region"
        ),
        (
            KAT_STATUS_GLITCH,
            0x0508_0001,
            "KAT status registry shadow disagreed"
        ),
        (
            KAT_AES_CIPHERTEXT_MISMATCH,
            0x050B_0001,
            "AES KAT ciphertext mismatch"
        ),
        (KAT_AES_TAG_MISMATCH, 0x050B_0002, "AES KAT tag mismatch"),
        (
            KAT_AES_PLAINTEXT_MISMATCH,
            0x050B_0003,
            "AES KAT plaintext mismatch"
        ),
        (
            KAT_AES_DPA_CM_CHECK1,
            0x050B_0004,
            "AES DPA countermeasure KAT check 1 failed"
        ),
        (
            KAT_AES_DPA_CM_CHECK2,
            0x050B_0005,
            "AES DPA countermeasure KAT check 2 failed"
        ),
        (
            KAT_AES_DPA_CM_CHECK3,
            0x050B_0006,
            "AES DPA countermeasure KAT check 3 failed"
        ),
        (
            KAT_AES_DPA_CM_CHECK4,
            0x050B_0007,
            "AES DPA countermeasure KAT check 4 failed"
        ),
        (
            KAT_AES_DPA_CM_CHECK5,
            0x050B_0008,
            "AES DPA countermeasure KAT check 5 failed"
        ),
        (
            KAT_SHA2_256_DIGEST_MISMATCH,
            0x050B_0009,
            "SHA2-256 KAT digest mismatch"
        ),
        (
            KAT_SHA3_256_DIGEST_MISMATCH,
            0x050B_000A,
            "SHA3-256 KAT digest mismatch"
        ),
        (
            KAT_SHA3_384_DIGEST_MISMATCH,
            0x050B_000B,
            "SHA3-384 KAT digest mismatch"
        ),
        (
            KAT_RSA_PUB_ENC_MISMATCH,
            0x050B_000C,
            "RSA KAT public encrypt mismatch"
        ),
        (
            KAT_RSA_PRIV_DEC_MISMATCH,
            0x050B_000D,
            "RSA KAT private decrypt mismatch"
        ),
        (
            KAT_ECDSA_PUB_KEY_MISMATCH,
            0x050B_000E,
            "ECDSA KAT public key mismatch"
        ),
        (
            KAT_ECDSA_SIGNATURE_MISMATCH,
            0x050B_000F,
            "ECDSA KAT signature mismatch"
        ),
        (
            KAT_ECDSA_VERIFY_FAILED,
            0x050B_0010,
            "ECDSA KAT signature verification failed"
        ),
        // Arbiter
        (ARBITER_INVALID_OWNER, 0x0601_0001, "Arbiter owner id invalid"),
        (ARBITER_ENGINE_BUSY, 0x0604_0001, "Engine owned by another caller"),
        (
            ARBITER_NOT_OWNER,
            0x0604_0002,
            "Release requested by a caller that does not own the engine"
        ),
        (
            ARBITER_DATA_CONTEXT_LOST,
            0x0605_0001,
            "Operation context was lost to another owner"
        ),
        (
            ARBITER_GLITCH_DETECTED,
            0x0608_0001,
            "Arbiter ownership shadow disagreed"
        ),
        // Secure memory
        (
            SECMEM_INVALID_PARAM,
            0x0701_0001,
            "Secure memory length exceeds buffer capacity"
        ),
        (SECMEM_COMPARE_MISMATCH, 0x0706_0001, "Buffers differ"),
        (
            SECMEM_ZEROIZE_VERIFY_FAILED,
            0x0708_0001,
            "Zeroized buffer readback is not zero"
        ),
        // Hardware access layer
        (HAL_DMA_INVALID_ADDR, 0x0801_0001, "DMA address out of range"),
        (HAL_WAIT_TIMEOUT, 0x0809_0001, "Hardware event wait timed out"),
        (HAL_DMA_TIMEOUT, 0x0809_0002, "DMA transfer timed out"),
        (HAL_DMA_ERROR, 0x080A_0001, "DMA reported an error"),
        // Control flow integrity
        (
            CFI_ASSERT_EQ_FAILURE,
            0x0908_0001,
            "Redundant equality check failed"
        ),
        (
            CFI_ASSERT_NE_FAILURE,
            0x0908_0002,
            "Redundant inequality check failed"
        ),
        (
            CFI_ASSERT_GT_FAILURE,
            0x0908_0003,
            "Redundant greater than check failed"
        ),
        (
            CFI_ASSERT_LT_FAILURE,
            0x0908_0004,
            "Redundant less than check failed"
        ),
        (
            CFI_ASSERT_GE_FAILURE,
            0x0908_0005,
            "Redundant greater or equal check failed"
        ),
        (
            CFI_ASSERT_LE_FAILURE,
            0x0908_0006,
            "Redundant less or equal check failed"
        ),
        (
            CFI_VERIFIED_CALL_MISMATCH,
            0x0908_0007,
            "Redundant evaluations disagreed"
        ),
        (
            CFI_MASKED_VALUE_CORRUPT,
            0x0908_0008,
            "Masked value failed its integrity check"
        ),
        (CFI_UNKNOWN, 0x0908_00FF, "Unknown control flow integrity error"),
        // Runtime
        (
            RUNTIME_UNSUPPORTED_COMMAND,
            0x0A01_0001,
            "Command not supported"
        ),
        (
            RUNTIME_INVALID_OWNER,
            0x0A01_0002,
            "Owner token invalid"
        ),
    ];
}

impl From<core::num::NonZeroU32> for crate::CryptoError {
    fn from(val: core::num::NonZeroU32) -> Self {
        crate::CryptoError(val)
    }
}

impl From<CryptoError> for core::num::NonZeroU32 {
    fn from(val: CryptoError) -> Self {
        val.0
    }
}

impl From<CryptoError> for u32 {
    fn from(val: CryptoError) -> Self {
        core::num::NonZeroU32::from(val).get()
    }
}

impl TryFrom<u32> for CryptoError {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        match NonZeroU32::try_from(val) {
            Ok(val) => Ok(CryptoError(val)),
            Err(err) => Err(err),
        }
    }
}

pub type CryptoResult<T> = Result<T, CryptoError>;
