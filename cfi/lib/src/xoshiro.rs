/*++

Licensed under the Apache-2.0 license.

File Name:

    xoshiro.rs

Abstract:

    File contains a xoshiro128** generator used to randomize the traversal
    order of hardened comparisons.

References:
    http://prng.di.unimi.it/xoshiro128starstar.c

--*/

/// Replaces an all zero seed, which would leave the generator stuck at zero
const FALLBACK_SEED: [u32; 4] = [0x9E37_79B9, 0x243F_6A88, 0xB7E1_5162, 0x5A82_7999];

/// xoshiro128** generator. Not suitable for key material.
pub struct Xoshiro128 {
    s: [u32; 4],
}

impl Xoshiro128 {
    /// Create a generator from `seed`. An all zero seed is replaced.
    pub fn new(seed: [u32; 4]) -> Self {
        if seed.iter().all(|w| *w == 0) {
            Self { s: FALLBACK_SEED }
        } else {
            Self { s: seed }
        }
    }

    /// Get the next random number
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u32 {
        let [mut s0, mut s1, mut s2, mut s3] = self.s;

        let result = u32::wrapping_mul(u32::wrapping_mul(s1, 5).rotate_left(7), 9);
        let t = s1 << 9;

        s2 ^= s0;
        s3 ^= s1;
        s1 ^= s2;
        s0 ^= s3;

        s2 ^= t;
        s3 = s3.rotate_left(11);

        self.s = [s0, s1, s2, s3];
        result
    }
}
