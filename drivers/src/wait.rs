/*++

Licensed under the Apache-2.0 license.

File Name:

    wait.rs

Abstract:

    File contains common functions to implement bounded wait routines.

--*/

use cryptoeng_error::{CryptoError, CryptoResult};

/// Poll `predicate` at most `max_polls` times.
///
/// # Returns
///
/// * `err` if the budget is exhausted before the predicate holds
pub fn until<F>(max_polls: u32, err: CryptoError, mut predicate: F) -> CryptoResult<()>
where
    F: FnMut() -> bool,
{
    for _ in 0..max_polls {
        if predicate() {
            return Ok(());
        }
    }
    Err(err)
}
