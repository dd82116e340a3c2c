use serde::Serialize;
use serde_json::Value;
use subtle::ConstantTimeEq;

use crate::error::Error;
use crate::kdf;

/// Constant marker naming the container format.
pub const MARKER: &str = "binlock";
pub const VERSION: u32 = 1;

/// Fixed on-disk header slot. The payload always begins at this offset.
pub const HEADER_LEN: usize = 512;

pub const SALT_LEN: usize = 32;
pub const IV_LEN: usize = 12;
pub const AAD_LEN: usize = 16;
pub const TAG_LEN: usize = 16;
pub const CHECK_LEN: usize = 32;

/// Parsed or sealed container metadata. Immutable once built; the only
/// mutation in a header's life is the single draft-to-sealed step that
/// inserts the tag after encryption finalizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub version: u32,
    pub salt: Vec<u8>,
    pub iv: Vec<u8>,
    pub aad: Vec<u8>,
    pub tag: Vec<u8>,
    /// Key verification value. Optional on parse for containers written
    /// without it; the AEAD tag is always the authoritative check.
    pub check: Option<Vec<u8>>,
}

/// Header-in-progress for the encrypt path: fresh randomness, no tag yet.
pub struct HeaderDraft {
    salt: Vec<u8>,
    iv: Vec<u8>,
    aad: Vec<u8>,
}

impl HeaderDraft {
    pub fn generate() -> Self {
        Self {
            salt: kdf::random_salt().to_vec(),
            iv: kdf::random_iv().to_vec(),
            aad: kdf::random_aad().to_vec(),
        }
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn aad(&self) -> &[u8] {
        &self.aad
    }

    pub fn seal(self, tag: [u8; TAG_LEN], check: [u8; CHECK_LEN]) -> Header {
        Header {
            version: VERSION,
            salt: self.salt,
            iv: self.iv,
            aad: self.aad,
            tag: tag.to_vec(),
            check: Some(check.to_vec()),
        }
    }
}

#[derive(Serialize)]
struct Record<'a> {
    binlock: &'a str,
    version: u32,
    salt: String,
    iv: String,
    aad: String,
    tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    check: Option<String>,
}

impl Header {
    /// Hex-field JSON record, zero-padded on the right to exactly
    /// [`HEADER_LEN`] bytes. Never truncates: an oversized record is a hard
    /// [`Error::HeaderTooLarge`].
    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        let record = Record {
            binlock: MARKER,
            version: self.version,
            salt: hex::encode(&self.salt),
            iv: hex::encode(&self.iv),
            aad: hex::encode(&self.aad),
            tag: hex::encode(&self.tag),
            check: self.check.as_ref().map(hex::encode),
        };
        let mut bytes = serde_json::to_vec(&record).map_err(|_| Error::Crypto)?;
        if bytes.len() > HEADER_LEN {
            return Err(Error::HeaderTooLarge(bytes.len()));
        }
        bytes.resize(HEADER_LEN, 0);
        Ok(bytes)
    }

    /// Validates framing and every required field before any cryptography
    /// runs. Fails closed: no partial header ever escapes.
    pub fn parse(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() < HEADER_LEN {
            return Err(Error::CorruptHeader(
                "source is shorter than the 512-byte header".into(),
            ));
        }
        let block = &buf[..HEADER_LEN];
        let end = block.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);

        let record: Value = serde_json::from_slice(&block[..end])
            .map_err(|_| Error::CorruptHeader("not a binlock container".into()))?;

        let marker = record
            .get("binlock")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::CorruptHeader("missing format marker".into()))?;
        if marker.as_bytes().ct_eq(MARKER.as_bytes()).unwrap_u8() != 1 {
            return Err(Error::CorruptHeader("unrecognized format marker".into()));
        }

        let version = record
            .get("version")
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::CorruptHeader("missing field 'version'".into()))?;
        if version != u64::from(VERSION) {
            return Err(Error::CorruptHeader(format!(
                "unsupported format version {version}"
            )));
        }

        let salt = hex_field(&record, "salt")?;
        if !(16..=SALT_LEN).contains(&salt.len()) {
            return Err(Error::CorruptHeader("field 'salt' has an invalid length".into()));
        }
        let iv = hex_field(&record, "iv")?;
        if iv.len() != IV_LEN {
            return Err(Error::CorruptHeader("field 'iv' has an invalid length".into()));
        }
        let aad = hex_field(&record, "aad")?;
        if aad.is_empty() {
            return Err(Error::CorruptHeader("field 'aad' is empty".into()));
        }
        let tag = hex_field(&record, "tag")?;
        if tag.len() != TAG_LEN {
            return Err(Error::CorruptHeader("field 'tag' has an invalid length".into()));
        }

        let check = match record.get("check") {
            None => None,
            Some(_) => {
                let check = hex_field(&record, "check")?;
                if check.len() != CHECK_LEN {
                    return Err(Error::CorruptHeader(
                        "field 'check' has an invalid length".into(),
                    ));
                }
                Some(check)
            }
        };

        Ok(Self {
            version: version as u32,
            salt,
            iv,
            aad,
            tag,
            check,
        })
    }

    /// Human-readable rendering of every header field. Read-only; never
    /// touches the sink.
    pub fn dump(&self, source: &str) -> String {
        let mut out = format!("binlock header information:\n\n[file = {source}]\n");
        out.push_str(&format!("[binlock = {MARKER}]\n"));
        out.push_str(&format!("[version = {}]\n", self.version));
        for (name, value) in [
            ("salt", &self.salt),
            ("iv", &self.iv),
            ("aad", &self.aad),
            ("tag", &self.tag),
        ] {
            out.push_str(&format!("[{name} = {}]\n", hex::encode(value)));
        }
        if let Some(check) = &self.check {
            out.push_str(&format!("[check = {}]\n", hex::encode(check)));
        }
        out
    }
}

fn hex_field(record: &Value, name: &'static str) -> Result<Vec<u8>, Error> {
    let text = record
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::CorruptHeader(format!("missing field '{name}'")))?;
    hex::decode(text).map_err(|_| Error::CorruptHeader(format!("field '{name}' is not valid hex")))
}
