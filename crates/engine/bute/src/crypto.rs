//! Block-cipher codec for encrypted attribute files
//!
//! Sources may ship encrypted. The codec runs Blowfish over 8-byte
//! blocks; because the cipher needs whole blocks, the plaintext is
//! zero-padded and a single trailing byte records `len % 8` so
//! decryption can discard the padding. Key scheduling is handled
//! here; callers hand over raw key bytes.

use crate::{Error, Result};
use blowfish::Blowfish;
use cipher::{Block, BlockDecrypt, BlockEncrypt, KeyInit};

/// Cipher block size in bytes
pub const BLOCK_SIZE: usize = 8;

/// Blowfish codec over 8-byte blocks with a trailing length marker
pub struct BlockCodec {
    cipher: Blowfish,
}

impl BlockCodec {
    /// Build the key schedule. Blowfish accepts keys of 4 to 56 bytes.
    pub fn new(key: &[u8]) -> Result<Self> {
        let cipher = Blowfish::new_from_slice(key).map_err(|_| Error::BadKey)?;
        Ok(Self { cipher })
    }

    /// Encrypt arbitrary bytes. Output length is the input rounded up
    /// to a block multiple, plus one marker byte.
    pub fn encrypt(&self, plain: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(plain.len() + BLOCK_SIZE);
        for chunk in plain.chunks(BLOCK_SIZE) {
            let mut block = Block::<Blowfish>::default();
            block[..chunk.len()].copy_from_slice(chunk);
            self.cipher.encrypt_block(&mut block);
            out.extend_from_slice(&block);
        }
        out.push((plain.len() % BLOCK_SIZE) as u8);
        out
    }

    /// Invert [`encrypt`](Self::encrypt), validating the payload shape.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let Some((&suffix, body)) = data.split_last() else {
            return Err(Error::Cipher("empty encrypted payload".to_string()));
        };
        if body.len() % BLOCK_SIZE != 0 {
            return Err(Error::Cipher(format!(
                "payload of {} bytes is not block aligned",
                body.len()
            )));
        }
        let suffix = suffix as usize;
        if suffix >= BLOCK_SIZE || (suffix != 0 && body.is_empty()) {
            return Err(Error::Cipher("invalid trailing length marker".to_string()));
        }

        let mut out = Vec::with_capacity(body.len());
        for chunk in body.chunks(BLOCK_SIZE) {
            let mut block = Block::<Blowfish>::clone_from_slice(chunk);
            self.cipher.decrypt_block(&mut block);
            out.extend_from_slice(&block);
        }
        if suffix != 0 {
            out.truncate(out.len() - (BLOCK_SIZE - suffix));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_remainders() {
        let codec = BlockCodec::new(b"test key").unwrap();
        for len in [0usize, 1, 7, 8, 9, 15, 16, 33] {
            let plain: Vec<u8> = (0..len as u8).collect();
            let cipher_text = codec.encrypt(&plain);
            assert_eq!(cipher_text.len(), len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE + 1);
            assert_eq!(codec.decrypt(&cipher_text).unwrap(), plain, "len {}", len);
        }
    }

    #[test]
    fn test_ciphertext_differs_from_plaintext() {
        let codec = BlockCodec::new(b"test key").unwrap();
        let plain = b"[Weapon]\nDamage = 10\n";
        let cipher_text = codec.encrypt(plain);
        assert_ne!(&cipher_text[..plain.len()], plain.as_slice());
    }

    #[test]
    fn test_wrong_key_garbles() {
        let a = BlockCodec::new(b"key one!").unwrap();
        let b = BlockCodec::new(b"key two!").unwrap();
        let plain = b"0123456789abcdef";
        let decrypted = b.decrypt(&a.encrypt(plain)).unwrap();
        assert_ne!(decrypted, plain);
    }

    #[test]
    fn test_malformed_payloads() {
        let codec = BlockCodec::new(b"test key").unwrap();
        assert!(codec.decrypt(&[]).is_err());
        // not block aligned
        assert!(codec.decrypt(&[1, 2, 3, 4]).is_err());
        // marker out of range
        let mut data = codec.encrypt(b"12345678");
        *data.last_mut().unwrap() = 8;
        assert!(codec.decrypt(&data).is_err());
    }

    #[test]
    fn test_bad_key_rejected() {
        assert!(BlockCodec::new(b"").is_err());
    }
}
