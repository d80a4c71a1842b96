/*++

Licensed under the Apache-2.0 license.

File Name:

    masked.rs

Abstract:

    File contains a word stored alongside its masked copy, used for state that
    a single fault must not be able to flip unnoticed.

--*/

use crate::cfi::{cfi_launder, CfiPanicInfo};
use cryptoeng_error::{CryptoError, CryptoResult};

/// Word with a masked shadow copy
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct MaskedU32 {
    /// Actual Value
    val: u32,

    /// Masked Value
    masked_val: u32,
}

impl MaskedU32 {
    /// Integer mask with high hamming distance
    const MASK: u32 = 0xA5A5A5A5;

    /// Encode the value
    pub const fn new(val: u32) -> Self {
        Self {
            val,
            masked_val: val ^ Self::MASK,
        }
    }

    /// Check if the shadow still matches
    pub fn is_valid(&self) -> bool {
        cfi_launder(self.val) == cfi_launder(self.masked_val) ^ Self::MASK
    }

    /// Read the value, failing if the shadow disagrees
    pub fn get(&self) -> CryptoResult<u32> {
        if !self.is_valid() {
            Err(CryptoError::from(CfiPanicInfo::MaskedValueCorrupt))?;
        }
        Ok(self.val)
    }

    /// Write both copies
    pub fn set(&mut self, val: u32) {
        self.val = val;
        self.masked_val = cfi_launder(val) ^ Self::MASK;
    }

    /// Overwrite only the plain copy.
    #[cfg(test)]
    pub(crate) fn corrupt(&mut self, val: u32) {
        self.val = val;
    }
}

impl Default for MaskedU32 {
    /// Returns the "default value" for a type.
    fn default() -> Self {
        Self::new(0)
    }
}
