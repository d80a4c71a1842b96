/*++

Licensed under the Apache-2.0 license.

File Name:

    verified.rs

Abstract:

    File contains the redundant evaluation wrapper used around security
    decisions.

--*/

use crate::cfi::{cfi_launder, CfiPanicInfo};
use cryptoeng_error::{CryptoError, CryptoResult};

/// Outcome of a redundant evaluation
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Verdict<T> {
    /// Both evaluations returned the expected success value
    Success,

    /// Both evaluations agreed on this non-success value
    Failure(T),

    /// The evaluations disagreed
    Glitch,
}

/// Evaluates a security decision twice into independent variables and
/// accepts success only when both equal the expected success value.
///
/// `f` must be free of side effects on the engine (a status register read,
/// a registry lookup, a comparison), since it runs twice.
#[derive(Debug, Clone, Copy)]
pub struct VerifiedCall<T> {
    expected: T,
}

impl<T: PartialEq + Copy> VerifiedCall<T> {
    pub const fn new(expected: T) -> Self {
        Self { expected }
    }

    /// Run `f` twice and classify the pair of results.
    #[inline(never)]
    pub fn run<F>(&self, mut f: F) -> Verdict<T>
    where
        F: FnMut() -> T,
    {
        let first = cfi_launder(f());
        let second = cfi_launder(f());
        self.classify(first, second)
    }

    /// Classify a pair of independently obtained results.
    pub fn classify(&self, first: T, second: T) -> Verdict<T> {
        let first_ok = cfi_launder(first) == self.expected;
        let second_ok = cfi_launder(second) == cfi_launder(self.expected);

        match (first_ok, second_ok) {
            (true, true) => Verdict::Success,
            (false, false) if cfi_launder(first) == second => Verdict::Failure(first),
            _ => Verdict::Glitch,
        }
    }

    /// Run `f` twice; map a consistent non-success value through `on_failure`
    /// and any disagreement to `glitch`.
    pub fn check<F, M>(&self, f: F, on_failure: M, glitch: CryptoError) -> CryptoResult<()>
    where
        F: FnMut() -> T,
        M: FnOnce(T) -> CryptoError,
    {
        match self.run(f) {
            Verdict::Success => Ok(()),
            Verdict::Failure(v) => Err(on_failure(v)),
            Verdict::Glitch => Err(glitch),
        }
    }
}

impl VerifiedCall<bool> {
    /// Redundantly evaluate a boolean predicate expected to be true.
    pub fn require<F>(f: F, on_false: CryptoError) -> CryptoResult<()>
    where
        F: FnMut() -> bool,
    {
        Self::new(true).check(
            f,
            |_| on_false,
            CryptoError::from(CfiPanicInfo::VerifiedCallMismatch),
        )
    }
}
