/*++

Licensed under the Apache-2.0 license.

File Name:

    keccak_sponge.rs

Abstract:

    File contains the Keccak sponge used by the SHA3 engine emulation. The
    sponge absorbs whole, already padded, rate sized blocks.

--*/

/// SHA-3 Mode
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Sha3Mode {
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

impl Sha3Mode {
    /// Rate in bytes
    pub fn rate(&self) -> usize {
        200 - 2 * self.digest_size()
    }

    pub fn digest_size(&self) -> usize {
        match self {
            Self::Sha3_256 => 32,
            Self::Sha3_384 => 48,
            Self::Sha3_512 => 64,
        }
    }
}

#[derive(Clone)]
pub struct KeccakSponge {
    mode: Sha3Mode,
    state: [u64; 25],
}

impl KeccakSponge {
    pub fn new(mode: Sha3Mode) -> Self {
        Self {
            mode,
            state: [0u64; 25],
        }
    }

    pub fn mode(&self) -> Sha3Mode {
        self.mode
    }

    /// XOR one rate sized block into the state and permute.
    ///
    /// # Returns
    ///
    /// * `false` - `block` is not exactly one rate long
    pub fn absorb(&mut self, block: &[u8]) -> bool {
        if block.len() != self.mode.rate() {
            return false;
        }
        for (lane, chunk) in self.state.iter_mut().zip(block.chunks_exact(8)) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            *lane ^= u64::from_le_bytes(bytes);
        }
        keccak::f1600(&mut self.state);
        true
    }

    /// Copy out the digest, truncated to the mode's digest size.
    pub fn copy_digest(&self, digest: &mut [u8]) {
        self.state
            .iter()
            .flat_map(|lane| lane.to_le_bytes())
            .take(self.mode.digest_size())
            .zip(digest)
            .for_each(|(src, dest)| *dest = src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha3::Digest;

    fn pad(mode: Sha3Mode, msg: &[u8]) -> Vec<u8> {
        let rate = mode.rate();
        let mut padded = msg.to_vec();
        padded.push(0x06);
        while padded.len() % rate != 0 {
            padded.push(0);
        }
        let last = padded.len() - 1;
        padded[last] |= 0x80;
        padded
    }

    fn hash(mode: Sha3Mode, msg: &[u8]) -> Vec<u8> {
        let mut sponge = KeccakSponge::new(mode);
        for block in pad(mode, msg).chunks(mode.rate()) {
            assert!(sponge.absorb(block));
        }
        let mut digest = vec![0u8; mode.digest_size()];
        sponge.copy_digest(&mut digest);
        digest
    }

    #[test]
    fn test_sha3_256_abc() {
        assert_eq!(
            hex::encode(hash(Sha3Mode::Sha3_256, b"abc")),
            "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"
        );
    }

    #[test]
    fn test_against_reference() {
        for len in [0usize, 1, 103, 104, 135, 136, 300] {
            let msg: Vec<u8> = (0..len).map(|_| rand::random()).collect();
            assert_eq!(
                hash(Sha3Mode::Sha3_256, &msg),
                sha3::Sha3_256::digest(&msg).to_vec()
            );
            assert_eq!(
                hash(Sha3Mode::Sha3_384, &msg),
                sha3::Sha3_384::digest(&msg).to_vec()
            );
            assert_eq!(
                hash(Sha3Mode::Sha3_512, &msg),
                sha3::Sha3_512::digest(&msg).to_vec()
            );
        }
    }

    #[test]
    fn test_rates() {
        assert_eq!(Sha3Mode::Sha3_256.rate(), 136);
        assert_eq!(Sha3Mode::Sha3_384.rate(), 104);
        assert_eq!(Sha3Mode::Sha3_512.rate(), 72);
        assert!(!KeccakSponge::new(Sha3Mode::Sha3_256).absorb(&[0u8; 104]));
    }
}
