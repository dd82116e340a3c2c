//! Container pipeline: key derivation, header protocol and the AEAD engine
//! wired together. The tag is only known once encryption finalizes, so the
//! whole payload is processed in memory and the finished header is emitted
//! ahead of the first ciphertext byte.

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::Error;
use crate::format::{Header, HeaderDraft, HEADER_LEN};
use crate::logger::Logger;
use crate::securemem::MemoryLock;
use crate::{aead, kdf};

/// Encrypt `plaintext` under `password` into a complete container:
/// a 512-byte header followed by the ciphertext.
pub fn seal(plaintext: &[u8], password: &[u8], log: &Logger) -> Result<Vec<u8>, Error> {
    let draft = HeaderDraft::generate();
    log.verbose("deriving key from password");
    let key = MemoryLock::new(kdf::derive_key(password, draft.salt()));

    let mut payload = plaintext.to_vec();
    let tag = aead::encrypt(&key, draft.iv(), draft.aad(), &mut payload)?;
    let check = kdf::verification_hash(draft.salt(), &key);

    let header = draft.seal(tag, check);
    let mut container = header.serialize()?;
    container.extend_from_slice(&payload);
    log.debug(format!(
        "sealed {} payload bytes behind a {HEADER_LEN}-byte header",
        payload.len()
    ));
    Ok(container)
}

/// Validate the header and hand back the payload slice. Runs to completion
/// before any key derivation or decryption is attempted.
pub fn split(container: &[u8]) -> Result<(Header, &[u8]), Error> {
    let header = Header::parse(container)?;
    Ok((header, &container[HEADER_LEN..]))
}

/// Decrypt a payload with an already-validated header.
pub fn open_payload(
    header: &Header,
    payload: &[u8],
    password: &[u8],
    log: &Logger,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    log.verbose("deriving key from password");
    let key = MemoryLock::new(kdf::derive_key(password, &header.salt));

    if let Some(expected) = &header.check {
        let actual = kdf::verification_hash(&header.salt, &key);
        if actual[..].ct_eq(expected).unwrap_u8() != 1 {
            return Err(Error::Authentication);
        }
        log.debug("verification hash matches");
    }

    let mut plaintext = Zeroizing::new(payload.to_vec());
    aead::decrypt(&key, &header.iv, &header.aad, &mut plaintext, &header.tag)?;
    Ok(plaintext)
}

/// Whole-container decryption in one step.
pub fn open(container: &[u8], password: &[u8], log: &Logger) -> Result<Zeroizing<Vec<u8>>, Error> {
    let (header, payload) = split(container)?;
    open_payload(&header, payload, password, log)
}
