/*++

Licensed under the Apache-2.0 license.

File Name:

    gcm.rs

Abstract:

    File contains the AES-GCM model used by the AES engine emulation. Key
    sizes of 128 and 256 bits are supported.

--*/

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes_gcm::aead::AeadInPlace;
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce, Tag};

pub const AES_GCM_IV_SIZE: usize = 12;
pub const AES_GCM_TAG_SIZE: usize = 16;

const AES_BLOCK_SIZE: usize = 16;

/// Counter value of the first data block; counter 1 protects the tag.
const FIRST_DATA_COUNTER: u32 = 2;

enum BlockCipher {
    Aes128(aes::Aes128),
    Aes256(aes::Aes256),
}

impl BlockCipher {
    fn new(key: &[u8]) -> Option<Self> {
        match key.len() {
            16 => aes::Aes128::new_from_slice(key).ok().map(Self::Aes128),
            32 => aes::Aes256::new_from_slice(key).ok().map(Self::Aes256),
            _ => None,
        }
    }

    fn encrypt(&self, block: &mut [u8; AES_BLOCK_SIZE]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            Self::Aes128(c) => c.encrypt_block(block),
            Self::Aes256(c) => c.encrypt_block(block),
        }
    }
}

pub enum AesGcm {}

impl AesGcm {
    /// XOR `data` with the GCM keystream starting `block_offset` blocks into
    /// the message. Encryption and decryption are the same operation.
    ///
    /// # Returns
    ///
    /// * `None` - Key is neither 16 nor 32 bytes long
    pub fn apply_keystream(
        key: &[u8],
        iv: &[u8; AES_GCM_IV_SIZE],
        block_offset: u32,
        data: &mut [u8],
    ) -> Option<()> {
        let cipher = BlockCipher::new(key)?;
        for (i, chunk) in data.chunks_mut(AES_BLOCK_SIZE).enumerate() {
            let counter = FIRST_DATA_COUNTER
                .wrapping_add(block_offset)
                .wrapping_add(i as u32);
            let mut ks = [0u8; AES_BLOCK_SIZE];
            ks[..AES_GCM_IV_SIZE].copy_from_slice(iv);
            ks[AES_GCM_IV_SIZE..].copy_from_slice(&counter.to_be_bytes());
            cipher.encrypt(&mut ks);
            chunk.iter_mut().zip(ks).for_each(|(d, k)| *d ^= k);
        }
        Some(())
    }

    /// One-shot AES-GCM encryption.
    pub fn encrypt(
        key: &[u8],
        iv: &[u8; AES_GCM_IV_SIZE],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Option<(Vec<u8>, [u8; AES_GCM_TAG_SIZE])> {
        let mut buffer = plaintext.to_vec();
        let nonce = Nonce::from_slice(iv);
        let tag = match key.len() {
            16 => Aes128Gcm::new_from_slice(key)
                .ok()?
                .encrypt_in_place_detached(nonce, aad, &mut buffer),
            32 => Aes256Gcm::new_from_slice(key)
                .ok()?
                .encrypt_in_place_detached(nonce, aad, &mut buffer),
            _ => return None,
        };
        tag.ok().map(|tag| (buffer, tag.into()))
    }

    /// One-shot AES-GCM decryption.
    ///
    /// # Returns
    ///
    /// * `None` - Bad key size or tag mismatch
    pub fn decrypt(
        key: &[u8],
        iv: &[u8; AES_GCM_IV_SIZE],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8; AES_GCM_TAG_SIZE],
    ) -> Option<Vec<u8>> {
        let mut buffer = ciphertext.to_vec();
        let nonce = Nonce::from_slice(iv);
        let tag = Tag::from_slice(tag);
        let result = match key.len() {
            16 => Aes128Gcm::new_from_slice(key)
                .ok()?
                .decrypt_in_place_detached(nonce, aad, &mut buffer, tag),
            32 => Aes256Gcm::new_from_slice(key)
                .ok()?
                .decrypt_in_place_detached(nonce, aad, &mut buffer, tag),
            _ => return None,
        };
        result.ok().map(|_| buffer)
    }

    /// Tag over `aad` and the ciphertext that `plaintext` encrypts to.
    pub fn tag(
        key: &[u8],
        iv: &[u8; AES_GCM_IV_SIZE],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Option<[u8; AES_GCM_TAG_SIZE]> {
        Self::encrypt(key, iv, aad, plaintext).map(|(_, tag)| tag)
    }
}
