use aes_gcm::aead::KeyInit;
use aes_gcm::{AeadInPlace, Aes256Gcm, Nonce, Tag};

use crate::error::Error;
use crate::format::{IV_LEN, TAG_LEN};
use crate::kdf::KEY_LEN;

fn cipher(key: &[u8; KEY_LEN]) -> Aes256Gcm {
    Aes256Gcm::new(key.into())
}

/// Encrypt `data` in place, authenticating `aad`, and return the detached
/// tag. Ciphertext length equals plaintext length; the tag travels in the
/// container header.
pub fn encrypt(
    key: &[u8; KEY_LEN],
    iv: &[u8],
    aad: &[u8],
    data: &mut [u8],
) -> Result<[u8; TAG_LEN], Error> {
    if iv.len() != IV_LEN {
        return Err(Error::Crypto);
    }
    let tag = cipher(key)
        .encrypt_in_place_detached(Nonce::from_slice(iv), aad, data)
        .map_err(|_| Error::Crypto)?;
    let mut out = [0u8; TAG_LEN];
    out.copy_from_slice(tag.as_slice());
    Ok(out)
}

/// Decrypt `data` in place, verifying `aad` and the detached tag.
///
/// A mismatch means wrong password, tampered ciphertext, or altered header
/// fields; the primitive cannot tell these apart, so the error stays
/// deliberately ambiguous.
pub fn decrypt(
    key: &[u8; KEY_LEN],
    iv: &[u8],
    aad: &[u8],
    data: &mut [u8],
    tag: &[u8],
) -> Result<(), Error> {
    if iv.len() != IV_LEN || tag.len() != TAG_LEN {
        return Err(Error::Crypto);
    }
    cipher(key)
        .decrypt_in_place_detached(Nonce::from_slice(iv), aad, data, Tag::from_slice(tag))
        .map_err(|_| Error::Authentication)
}
