/*++

Licensed under the Apache-2.0 license.

File Name:

    secmem.rs

Abstract:

    File contains support routines for secure memory operations: hardened
    comparison, bounds checked copy/move/set and verified zeroization.

--*/

use core::ptr;

use crate::{cfi_assert_eq, cfi_launder, Xoshiro128};
use cryptoeng_error::{CryptoError, CryptoResult};
use zeroize::Zeroize;

// Adapted from https://github.com/lowRISC/opentitan/blob/7a61300cf7c409fa68fd892942c1d7b58a7cd4c0/sw/device/lib/base/hardened_asm.h
// and https://github.com/lowRISC/opentitan/blob/7a61300cf7c409fa68fd892942c1d7b58a7cd4c0/sw/device/lib/base/hardened_memory.c
// which are:
// Copyright lowRISC contributors.

/// Values for a hardened boolean type.
///
/// The values below have a Hamming Distance of 8, and they are 11-bit values
/// so they can be materialized with a single instruction on RISC-V. They are
/// also specifically not the complement of each other.
pub type HardenedBool = u32;
pub const HARDENED_BOOL_TRUE: HardenedBool = 0x739;
pub const HARDENED_BOOL_FALSE: HardenedBool = 0x1d4;

/// Random traversal order over `0..max`.
///
/// Every index in `0..min_len` is visited exactly once; indices at or above
/// `min_len` are decoys.
struct RandomOrder {
    state: u32,
    start: u32,
    max: u32,
}

impl RandomOrder {
    fn new(min_len: u32, rng: &mut Xoshiro128) -> RandomOrder {
        let max = min_len.saturating_mul(2).max(1);
        RandomOrder {
            state: 0,
            start: rng.next() % max,
            max,
        }
    }

    fn len(&self) -> u32 {
        self.max
    }

    fn advance(&mut self) -> u32 {
        let s = (self.start + self.state) % self.max;
        self.state += 1;
        s
    }
}

/// Returns true when both slices hold the same bytes.
#[inline(always)]
pub fn memeq(lhs: &[u8], rhs: &[u8]) -> CryptoResult<bool> {
    Ok(hardened_memeq(lhs, rhs)? == HARDENED_BOOL_TRUE)
}

/// Compare two byte slices scanning the full length in a randomized order.
///
/// Returns an error only when the two accumulators disagree with each other,
/// which a plain mismatch can never produce.
#[inline(never)]
pub fn hardened_memeq(lhs: &[u8], rhs: &[u8]) -> CryptoResult<HardenedBool> {
    let len = lhs.len();
    if len != rhs.len() {
        return Ok(HARDENED_BOOL_FALSE);
    }

    let mut rng = Xoshiro128::new([
        lhs.as_ptr() as usize as u32,
        rhs.as_ptr() as usize as u32,
        len as u32,
        0x5A5A_A5A5,
    ]);
    let mut order = RandomOrder::new(len as u32, &mut rng);

    let mut count = 0;
    let expected_count = order.len();

    // Scratch values with a Hamming weight of 4, compared against each other
    // when the traversal index runs past the end of the buffers.
    const DECOYS: usize = 8;
    let decoys: [u8; DECOYS] = [0xaa; DECOYS];

    let mut zeros: u8 = 0;
    let mut ones: u8 = u8::MAX;

    while count < expected_count {
        let idx = cfi_launder(order.advance()) as usize;

        let (ap, bp): (*const u8, *const u8) = if idx < len {
            (&lhs[idx], &rhs[idx])
        } else {
            (
                &decoys[idx % DECOYS],
                &decoys[(idx + DECOYS / 2) % DECOYS],
            )
        };

        let a = unsafe { ptr::read_volatile(ap) };
        let b = unsafe { ptr::read_volatile(bp) };

        zeros = cfi_launder(zeros) | (cfi_launder(a) ^ b);
        ones = cfi_launder(ones) & (cfi_launder(a) ^ !b);

        count = cfi_launder(count) + 1;
    }
    cfi_assert_eq(count, expected_count)?;

    if cfi_launder(zeros) == 0 {
        cfi_assert_eq(ones, u8::MAX)?;
        return Ok(HARDENED_BOOL_TRUE);
    }

    crate::cfi_assert_ne(ones, u8::MAX)?;
    Ok(HARDENED_BOOL_FALSE)
}

/// Constant time comparison of the first `len` bytes of `a` and `b`.
///
/// # Arguments
///
/// * `a` - First buffer; its length is its capacity
/// * `b` - Second buffer; its length is its capacity
/// * `len` - Number of bytes to compare
///
/// # Returns
///
/// * `SECMEM_INVALID_PARAM` if `len` exceeds either capacity
/// * `SECMEM_COMPARE_MISMATCH` if the bytes differ
pub fn ct_compare(a: &[u8], b: &[u8], len: usize) -> CryptoResult<()> {
    if len > a.len() || len > b.len() {
        Err(CryptoError::SECMEM_INVALID_PARAM)?;
    }

    let first = hardened_memeq(&a[..len], &b[..len])?;
    if cfi_launder(first) != HARDENED_BOOL_TRUE {
        Err(CryptoError::SECMEM_COMPARE_MISMATCH)?;
    }
    cfi_assert_eq(first, HARDENED_BOOL_TRUE)?;
    Ok(())
}

/// Copy `len` bytes from `src` into `dst`.
pub fn secure_copy(dst: &mut [u8], src: &[u8], len: usize) -> CryptoResult<()> {
    if len > dst.len() || len > src.len() {
        Err(CryptoError::SECMEM_INVALID_PARAM)?;
    }
    dst[..len].copy_from_slice(&src[..len]);
    Ok(())
}

/// Move `len` bytes inside `buf` from `src_off` to `dst_off`. The ranges may overlap.
pub fn secure_move(buf: &mut [u8], dst_off: usize, src_off: usize, len: usize) -> CryptoResult<()> {
    let src_end = src_off
        .checked_add(len)
        .ok_or(CryptoError::SECMEM_INVALID_PARAM)?;
    let dst_end = dst_off
        .checked_add(len)
        .ok_or(CryptoError::SECMEM_INVALID_PARAM)?;
    if src_end > buf.len() || dst_end > buf.len() {
        Err(CryptoError::SECMEM_INVALID_PARAM)?;
    }
    buf.copy_within(src_off..src_end, dst_off);
    Ok(())
}

/// Fill the first `len` bytes of `dst` with `val`.
pub fn secure_set(dst: &mut [u8], val: u8, len: usize) -> CryptoResult<()> {
    if len > dst.len() {
        Err(CryptoError::SECMEM_INVALID_PARAM)?;
    }
    dst[..len].fill(val);
    Ok(())
}

/// Zeroize `buf` and read every element back.
///
/// # Returns
///
/// * `SECMEM_ZEROIZE_VERIFY_FAILED` if any element reads back non-zero
pub fn zeroize_verified<T>(buf: &mut [T]) -> CryptoResult<()>
where
    T: Zeroize + Copy + Default + PartialEq,
    [T]: Zeroize,
{
    buf.zeroize();

    let zero = T::default();
    let mut dirty = 0u32;
    let mut count = 0usize;
    for elem in buf.iter() {
        let v = unsafe { ptr::read_volatile(elem) };
        dirty = cfi_launder(dirty) | u32::from(v != zero);
        count = cfi_launder(count) + 1;
    }
    cfi_assert_eq(count, buf.len())?;

    if cfi_launder(dirty) != 0 {
        Err(CryptoError::SECMEM_ZEROIZE_VERIFY_FAILED)?;
    }
    cfi_assert_eq(dirty, 0)?;
    Ok(())
}
