/*++

Licensed under the Apache-2.0 license.

File Name:

    layout.rs

Abstract:

    File contains the single copy routine used to move operands between
    caller layout and engine layout.

--*/

use cryptoeng_error::{CryptoError, CryptoResult};

/// Byte order of an operand relative to the engine's order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Same order as the engine
    Native,

    /// Reversed byte order
    #[default]
    Reversed,
}

/// Copy `len` bytes from `src` to `dst`, reversing them for `Layout::Reversed`.
///
/// # Returns
///
/// * `err` if `len` exceeds either buffer
pub fn copy_with_layout(
    dst: &mut [u8],
    src: &[u8],
    len: usize,
    layout: Layout,
    err: CryptoError,
) -> CryptoResult<()> {
    if len > dst.len() || len > src.len() {
        Err(err)?;
    }
    match layout {
        Layout::Native => dst[..len].copy_from_slice(&src[..len]),
        Layout::Reversed => {
            for (d, s) in dst[..len].iter_mut().zip(src[..len].iter().rev()) {
                *d = *s;
            }
        }
    }
    Ok(())
}
