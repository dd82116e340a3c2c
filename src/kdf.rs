use pbkdf2::pbkdf2_hmac;
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

use crate::format::{AAD_LEN, CHECK_LEN, IV_LEN, SALT_LEN};

pub const KEY_LEN: usize = 32;

/// PBKDF2-HMAC-SHA512 work factor. The container stores no iteration count,
/// so changing this is a format break gated on the header version.
pub const PBKDF2_ROUNDS: u32 = 210_000;

const CHECK_DOMAIN: &[u8] = b"binlock\0check\0v1";

pub fn random_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

pub fn random_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    iv
}

pub fn random_aad() -> [u8; AAD_LEN] {
    let mut aad = [0u8; AAD_LEN];
    OsRng.fill_bytes(&mut aad);
    aad
}

/// Derive the symmetric key from a password and the container salt.
///
/// Deterministic for equal password+salt; the decrypt path relies on this to
/// reproduce the key without ever persisting it.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha512>(password, salt, PBKDF2_ROUNDS, &mut *key);
    key
}

/// Non-reversible check value bound to the derived key, not the raw
/// password, so the header never becomes a cheap offline guessing oracle.
/// Optional defense-in-depth; the AEAD tag stays authoritative.
pub fn verification_hash(salt: &[u8], key: &[u8; KEY_LEN]) -> [u8; CHECK_LEN] {
    let mut hasher = Sha512::new();
    hasher.update(CHECK_DOMAIN);
    hasher.update(salt);
    hasher.update(key);
    let digest = hasher.finalize();
    let mut check = [0u8; CHECK_LEN];
    check.copy_from_slice(&digest[..CHECK_LEN]);
    check
}
