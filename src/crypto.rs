//! Password-based encryption stage of the payload pipeline.
//!
//! Keys are derived with PBKDF2-HMAC-SHA256 and the data is encrypted with
//! AES-256-CBC under PKCS7 padding. Salt and IV are drawn fresh from the OS
//! RNG on every call and travel in front of the ciphertext:
//! `salt[16] ‖ iv[16] ‖ ciphertext`.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::error::StegoError;
use crate::result::Result;

pub const SALT_LEN: usize = 16;
pub const IV_LEN: usize = 16;
pub const KEY_LEN: usize = 32;
pub const BLOCK_LEN: usize = 16;
pub const PBKDF2_ITERATIONS: u32 = 100_000;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Derives an AES-256 key from a password and salt.
///
/// An empty password is deliberately run through the same derivation instead
/// of being rejected, so a missing password upstream cannot bypass the cipher.
pub fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

pub fn encrypt(data: &[u8], password: &str) -> Vec<u8> {
    let mut salt = [0u8; SALT_LEN];
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(password, &salt);
    let ciphertext =
        Aes256CbcEnc::new(&key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(data);

    let mut out = Vec::with_capacity(SALT_LEN + IV_LEN + ciphertext.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    out
}

pub fn decrypt(data: &[u8], password: &str) -> Result<Vec<u8>> {
    if data.len() < SALT_LEN + IV_LEN + BLOCK_LEN {
        return Err(StegoError::DecryptionFailed);
    }

    let (salt, rest) = data.split_at(SALT_LEN);
    let (iv, ciphertext) = rest.split_at(IV_LEN);
    if ciphertext.len() % BLOCK_LEN != 0 {
        return Err(StegoError::DecryptionFailed);
    }

    let key = derive_key(password, salt);
    Aes256CbcDec::new_from_slices(&key, iv)
        .map_err(|_| StegoError::DecryptionFailed)?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| StegoError::InvalidPadding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_derive_a_deterministic_key() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key("hunter42", &salt);
        let b = derive_key("hunter42", &salt);
        assert_eq!(a, b);
        assert_ne!(a, [0u8; KEY_LEN]);

        let c = derive_key("hunter43", &salt);
        assert_ne!(a, c);
    }

    #[test]
    fn should_round_trip() {
        let data = b"resistance is futile";
        let cipher = encrypt(data, "SuperSecret42");
        assert_ne!(&cipher[SALT_LEN + IV_LEN..], data.as_slice());
        assert_eq!(decrypt(&cipher, "SuperSecret42").unwrap(), data.to_vec());
    }

    #[test]
    fn should_round_trip_with_empty_password() {
        let data = b"still encrypted";
        let cipher = encrypt(data, "");
        assert_eq!(decrypt(&cipher, "").unwrap(), data.to_vec());
    }

    #[test]
    fn should_never_reuse_salt_or_iv() {
        let a = encrypt(b"same data", "pw");
        let b = encrypt(b"same data", "pw");
        assert_ne!(a[..SALT_LEN], b[..SALT_LEN]);
        assert_ne!(a[SALT_LEN..SALT_LEN + IV_LEN], b[SALT_LEN..SALT_LEN + IV_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn should_pad_to_block_boundary() {
        let cipher = encrypt(&[0xaa; 5], "pw");
        assert_eq!((cipher.len() - SALT_LEN - IV_LEN) % BLOCK_LEN, 0);
        // exact multiple of the block size grows by one full padding block
        let cipher = encrypt(&[0xaa; 16], "pw");
        assert_eq!(cipher.len() - SALT_LEN - IV_LEN, 32);
    }

    #[test]
    fn should_fail_with_wrong_password() {
        // a wrong key almost always breaks the padding; in the rare case the
        // garbage plaintext unpads cleanly it still cannot equal the input
        let data = b"lorem ipsum dolor sit amet";
        let cipher = encrypt(data, "right");
        match decrypt(&cipher, "wrong") {
            Err(StegoError::InvalidPadding) | Err(StegoError::DecryptionFailed) => {}
            Ok(garbage) => assert_ne!(garbage, data.to_vec()),
            Err(err) => panic!("unexpected error: {err:?}"),
        }
    }

    #[test]
    fn should_fail_on_short_input() {
        let result = decrypt(&[0u8; SALT_LEN + IV_LEN], "pw");
        assert!(matches!(result, Err(StegoError::DecryptionFailed)));
    }

    #[test]
    fn should_fail_on_ragged_ciphertext() {
        let mut cipher = encrypt(b"0123456789", "pw");
        cipher.pop();
        let result = decrypt(&cipher, "pw");
        assert!(matches!(result, Err(StegoError::DecryptionFailed)));
    }
}
