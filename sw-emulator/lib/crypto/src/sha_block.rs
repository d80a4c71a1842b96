/*++

Licensed under the Apache-2.0 license.

File Name:

    sha_block.rs

Abstract:

    File contains the SHA-2 block compression state used by the SHA2 engine
    emulation. Padding is supplied by the caller, the way the hardware sees it.

--*/

use sha2::digest::block_buffer::Block;
use sha2::digest::consts::{U128, U64};

/// SHA-2 Mode
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Sha2Mode {
    Sha256,
    Sha384,
    Sha512,
}

impl Sha2Mode {
    pub fn block_size(&self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha384 | Self::Sha512 => 128,
        }
    }

    pub fn digest_size(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

#[derive(Clone)]
enum State {
    Words32([u32; 8]),
    Words64([u64; 8]),
}

/// SHA-2 running state
#[derive(Clone)]
pub struct Sha2Block {
    mode: Sha2Mode,
    state: State,
}

impl Sha2Block {
    /// SHA-256 Initial Hash Vectors
    const HASH_IV_256: [u32; 8] = [
        0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab,
        0x5be0cd19,
    ];

    /// SHA-384 Initial Hash Vectors
    const HASH_IV_384: [u64; 8] = [
        0xcbbb9d5dc1059ed8,
        0x629a292a367cd507,
        0x9159015a3070dd17,
        0x152fecd8f70e5939,
        0x67332667ffc00b31,
        0x8eb44a8768581511,
        0xdb0c2e0d64f98fa7,
        0x47b5481dbefa4fa4,
    ];

    /// SHA-512 Initial Hash Vectors
    const HASH_IV_512: [u64; 8] = [
        0x6a09e667f3bcc908,
        0xbb67ae8584caa73b,
        0x3c6ef372fe94f82b,
        0xa54ff53a5f1d36f1,
        0x510e527fade682d1,
        0x9b05688c2b3e6c1f,
        0x1f83d9abfb41bd6b,
        0x5be0cd19137e2179,
    ];

    pub fn new(mode: Sha2Mode) -> Self {
        let state = match mode {
            Sha2Mode::Sha256 => State::Words32(Self::HASH_IV_256),
            Sha2Mode::Sha384 => State::Words64(Self::HASH_IV_384),
            Sha2Mode::Sha512 => State::Words64(Self::HASH_IV_512),
        };
        Self { mode, state }
    }

    pub fn mode(&self) -> Sha2Mode {
        self.mode
    }

    /// Compress one block of message bytes, in message order.
    ///
    /// # Returns
    ///
    /// * `false` - `block` is not exactly one block long
    pub fn compress(&mut self, block: &[u8]) -> bool {
        if block.len() != self.mode.block_size() {
            return false;
        }
        match &mut self.state {
            State::Words32(h) => sha2::compress256(h, &[*Block::<U64>::from_slice(block)]),
            State::Words64(h) => sha2::compress512(h, &[*Block::<U128>::from_slice(block)]),
        }
        true
    }

    /// Copy out the big endian digest, truncated to the mode's digest size.
    pub fn copy_digest(&self, digest: &mut [u8]) {
        let bytes: Vec<u8> = match &self.state {
            State::Words32(h) => h.iter().flat_map(|w| w.to_be_bytes()).collect(),
            State::Words64(h) => h.iter().flat_map(|w| w.to_be_bytes()).collect(),
        };
        bytes
            .iter()
            .take(self.mode.digest_size())
            .zip(digest)
            .for_each(|(src, dest)| *dest = *src);
    }
}
