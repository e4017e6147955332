//! Stateful AES-CBC streams for the encrypted session.
//!
//! The negotiated key is 32 bytes (SHA-256 output), so the cipher is
//! AES-256 with a 16-byte block. There is no padding scheme at this layer;
//! the framing above guarantees every write is block-aligned, and partial
//! blocks on the read side stay queued until their tail arrives. Encrypt
//! and decrypt states are independent objects with their own chained IVs.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use thiserror::Error;

pub const BLOCK_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("cipher input of {0} bytes is not a multiple of the {BLOCK_LEN}-byte block")]
    Misaligned(usize),
}

pub struct EncryptState(cbc::Encryptor<Aes256>);

impl EncryptState {
    pub fn new(key: &[u8; 32], iv: &[u8; 16]) -> Self {
        Self(cbc::Encryptor::new(key.into(), iv.into()))
    }

    /// Encrypts `data` in place, chaining the IV across calls.
    pub fn process(&mut self, data: &mut [u8]) -> Result<(), CipherError> {
        if data.len() % BLOCK_LEN != 0 {
            return Err(CipherError::Misaligned(data.len()));
        }
        for block in data.chunks_exact_mut(BLOCK_LEN) {
            self.0.encrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        Ok(())
    }
}

pub struct DecryptState(cbc::Decryptor<Aes256>);

impl DecryptState {
    pub fn new(key: &[u8; 32], iv: &[u8; 16]) -> Self {
        Self(cbc::Decryptor::new(key.into(), iv.into()))
    }

    /// Decrypts `data` in place, chaining the IV across calls.
    pub fn process(&mut self, data: &mut [u8]) -> Result<(), CipherError> {
        if data.len() % BLOCK_LEN != 0 {
            return Err(CipherError::Misaligned(data.len()));
        }
        for block in data.chunks_exact_mut(BLOCK_LEN) {
            self.0.decrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [7u8; 32];
    const IV: [u8; 16] = [3u8; 16];

    #[test]
    fn roundtrip_across_calls() {
        let mut enc = EncryptState::new(&KEY, &IV);
        let mut dec = DecryptState::new(&KEY, &IV);

        let plaintext: Vec<u8> = (0u8..96).collect();
        let mut wire = plaintext.clone();

        // encrypt in two uneven (but aligned) writes, decrypt in three
        enc.process(&mut wire[..32]).unwrap();
        enc.process(&mut wire[32..]).unwrap();

        dec.process(&mut wire[..16]).unwrap();
        dec.process(&mut wire[16..64]).unwrap();
        dec.process(&mut wire[64..]).unwrap();

        assert_eq!(wire, plaintext);
    }

    #[test]
    fn chained_iv_differs_from_fresh_state() {
        let mut chained = EncryptState::new(&KEY, &IV);
        let mut first = [0u8; 16];
        let mut second = [0u8; 16];
        chained.process(&mut first).unwrap();
        chained.process(&mut second).unwrap();

        let mut fresh = EncryptState::new(&KEY, &IV);
        let mut alone = [0u8; 16];
        fresh.process(&mut alone).unwrap();

        assert_eq!(first, alone);
        assert_ne!(second, alone);
    }

    #[test]
    fn rejects_partial_blocks() {
        let mut enc = EncryptState::new(&KEY, &IV);
        let mut data = [0u8; 15];
        assert_eq!(enc.process(&mut data), Err(CipherError::Misaligned(15)));
    }
}
