/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the glitch-resistant execution library.

--*/

#![cfg_attr(not(test), no_std)]
extern crate core;

mod cfi;
mod masked;
mod secmem;
mod verified;
mod xoshiro;

pub use cfi::*;
pub use masked::MaskedU32;
pub use secmem::{
    ct_compare, hardened_memeq, memeq, secure_copy, secure_move, secure_set, zeroize_verified,
    HardenedBool, HARDENED_BOOL_FALSE, HARDENED_BOOL_TRUE,
};
pub use verified::{Verdict, VerifiedCall};
pub use xoshiro::Xoshiro128;
