/*++

Licensed under the Apache-2.0 license.

File Name:

    cfi.rs

Abstract:

    File contains CFI launder implementation and redundant condition checks.

References:
    https://github.com/lowRISC/opentitan/blob/7a61300cf7c409fa68fd892942c1d7b58a7cd4c0/sw/device/lib/base/hardened.h#L260

--*/

use cryptoeng_error::{CryptoError, CryptoResult};

use core::cfg;
use core::cmp::{Eq, Ord, PartialEq, PartialOrd};
use core::marker::Copy;

/// CFI Failure Information
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CfiPanicInfo {
    /// CFI Assert Equal failed
    AssertEqFail,

    /// CFI Assert Not Equal failed
    AssertNeFail,

    /// CFI Greater Than failed
    AssertGtFail,

    /// CFI Less Than failed
    AssertLtFail,

    /// CFI Greater Than Equal failed
    AssertGeFail,

    /// CFI Less Than Equal failed
    AssertLeFail,

    /// Two evaluations of the same call disagreed
    VerifiedCallMismatch,

    /// Masked value and its complement no longer match
    MaskedValueCorrupt,

    /// Unknown error
    UnknownError,
}

impl From<CfiPanicInfo> for CryptoError {
    /// Converts to this type from the input type.
    fn from(info: CfiPanicInfo) -> CryptoError {
        match info {
            CfiPanicInfo::AssertEqFail => CryptoError::CFI_ASSERT_EQ_FAILURE,
            CfiPanicInfo::AssertNeFail => CryptoError::CFI_ASSERT_NE_FAILURE,
            CfiPanicInfo::AssertGtFail => CryptoError::CFI_ASSERT_GT_FAILURE,
            CfiPanicInfo::AssertLtFail => CryptoError::CFI_ASSERT_LT_FAILURE,
            CfiPanicInfo::AssertGeFail => CryptoError::CFI_ASSERT_GE_FAILURE,
            CfiPanicInfo::AssertLeFail => CryptoError::CFI_ASSERT_LE_FAILURE,
            CfiPanicInfo::VerifiedCallMismatch => CryptoError::CFI_VERIFIED_CALL_MISMATCH,
            CfiPanicInfo::MaskedValueCorrupt => CryptoError::CFI_MASKED_VALUE_CORRUPT,
            CfiPanicInfo::UnknownError => CryptoError::CFI_UNKNOWN,
        }
    }
}

/// Launder the value to prevent compiler optimization
///
/// # Arguments
///
/// * `val` - Value to launder
///
/// # Returns
///
/// `T` - Same value
#[inline(always)]
pub fn cfi_launder<T>(val: T) -> T {
    if cfg!(feature = "cfi") {
        core::hint::black_box(val)
    } else {
        val
    }
}

macro_rules! cfi_assert_macro {
    ($name: ident, $op: tt, $trait1: path, $trait2: path, $panic_info: ident) => {
        /// CFI Binary Condition Assertion
        ///
        /// The condition is evaluated twice on laundered operands. Either
        /// evaluation failing is reported as a glitch.
        ///
        /// # Arguments
        ///
        /// `lhs` - Left hand side
        /// `rhs` - Right hand side
        #[inline(always)]
        #[allow(unused)]
        pub fn $name<T>(lhs: T, rhs: T) -> CryptoResult<()>
        where
            T: $trait1 + $trait2 + Copy,
        {
            if !(lhs $op rhs) {
                Err(CryptoError::from(CfiPanicInfo::$panic_info))?;
            }

            // Second check for glitch protection
            if cfg!(feature = "cfi") && !(cfi_launder(lhs) $op cfi_launder(rhs)) {
                Err(CryptoError::from(CfiPanicInfo::$panic_info))?;
            }

            Ok(())
        }
    };
}

cfi_assert_macro!(cfi_assert_eq, ==, PartialEq, PartialEq, AssertEqFail);
cfi_assert_macro!(cfi_assert_ne, !=, PartialEq, PartialEq, AssertNeFail);
cfi_assert_macro!(cfi_assert_gt, >, Ord, PartialOrd, AssertGtFail);
cfi_assert_macro!(cfi_assert_lt, <, Ord, PartialOrd, AssertLtFail);
cfi_assert_macro!(cfi_assert_ge, >=, Ord, PartialOrd, AssertGeFail);
cfi_assert_macro!(cfi_assert_le, <=, Ord, PartialOrd, AssertLeFail);

#[macro_export]
macro_rules! cfi_assert {
    ($cond: expr) => {
        $crate::cfi_assert_eq($cond, true)
    };
}
