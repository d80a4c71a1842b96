/*++

Licensed under the Apache-2.0 license.

File Name:

    modexp.rs

Abstract:

    File contains the big integer model of the RSA exponentiation engine.
    Operands are big endian byte strings.

--*/

use num_bigint::BigUint;
use num_traits::{One, Zero};

pub enum ModExp {}

impl ModExp {
    /// Compute `base ^ exp mod modulus`, left padded to the modulus length.
    ///
    /// # Returns
    ///
    /// * `None` - Modulus is zero
    pub fn exp(base: &[u8], exp: &[u8], modulus: &[u8]) -> Option<Vec<u8>> {
        let n = BigUint::from_bytes_be(modulus);
        if n.is_zero() {
            return None;
        }
        let r = BigUint::from_bytes_be(base).modpow(&BigUint::from_bytes_be(exp), &n);
        Some(Self::to_fixed(&r, modulus.len()))
    }

    /// Montgomery constant `-n0^-1 mod 2^32`, zero for an even `n0`.
    pub fn minv(n0: u32) -> u32 {
        if n0 & 1 == 0 {
            return 0;
        }
        // Units mod 2^32 have order dividing 2^30
        let m = BigUint::one() << 32u32;
        let inv = BigUint::from(n0).modpow(&((BigUint::one() << 30u32) - 1u32), &m);
        let inv = inv.to_u32_digits().first().copied().unwrap_or(0);
        inv.wrapping_neg()
    }

    /// `R^2 mod N` with `R = 2^(8 * modulus.len())`.
    pub fn r_squared(modulus: &[u8]) -> Option<Vec<u8>> {
        let n = BigUint::from_bytes_be(modulus);
        if n.is_zero() {
            return None;
        }
        let r2 = (BigUint::one() << (16 * modulus.len())) % &n;
        Some(Self::to_fixed(&r2, modulus.len()))
    }

    fn to_fixed(value: &BigUint, len: usize) -> Vec<u8> {
        let bytes = value.to_bytes_be();
        let mut out = vec![0u8; len.saturating_sub(bytes.len())];
        out.extend_from_slice(&bytes);
        out
    }
}
