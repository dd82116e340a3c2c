//! Stateless byte-for-byte transforms between raw data and an ASCII-safe
//! encoding. No framing, no authentication; the inverse direction is the
//! only fallible path.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::ValueEnum;

use crate::error::Error;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    #[value(name = "b64")]
    Base64,
    #[value(name = "b85")]
    Base85,
    #[value(name = "a85")]
    Ascii85,
}

impl Scheme {
    pub fn extension(self) -> &'static str {
        match self {
            Scheme::Base64 => "b64",
            Scheme::Base85 => "b85",
            Scheme::Ascii85 => "a85",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Scheme::Base64 => "base64",
            Scheme::Base85 => "base85",
            Scheme::Ascii85 => "ascii85",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Inverse,
}

pub fn transcode(scheme: Scheme, direction: Direction, data: &[u8]) -> Result<Vec<u8>, Error> {
    match (scheme, direction) {
        (Scheme::Base64, Direction::Forward) => Ok(STANDARD.encode(data).into_bytes()),
        (Scheme::Base64, Direction::Inverse) => {
            // Encoded files routinely carry a trailing newline.
            let compact: Vec<u8> = data
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            STANDARD
                .decode(&compact)
                .map_err(|_| Error::Decode(scheme.label()))
        }
        (Scheme::Base85, Direction::Forward) => Ok(base85_encode(data)),
        (Scheme::Base85, Direction::Inverse) => {
            base85_decode(data).ok_or(Error::Decode(scheme.label()))
        }
        (Scheme::Ascii85, Direction::Forward) => Ok(ascii85_encode(data)),
        (Scheme::Ascii85, Direction::Inverse) => {
            ascii85_decode(data).ok_or(Error::Decode(scheme.label()))
        }
    }
}

// RFC 1924 alphabet, 4-byte big-endian groups to 5 digits. A partial group
// of n bytes emits n+1 digits.
const B85_ALPHABET: &[u8; 85] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!#$%&()*+-;<=>?@^_`{|}~";

fn b85_reverse() -> [u8; 256] {
    let mut table = [0xff_u8; 256];
    let mut i = 0;
    while i < B85_ALPHABET.len() {
        table[B85_ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

fn base85_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len().div_ceil(4) * 5);
    for chunk in data.chunks(4) {
        let mut group = [0u8; 4];
        group[..chunk.len()].copy_from_slice(chunk);
        let mut value = u32::from_be_bytes(group);
        let mut digits = [0u8; 5];
        for digit in digits.iter_mut().rev() {
            *digit = B85_ALPHABET[(value % 85) as usize];
            value /= 85;
        }
        out.extend_from_slice(&digits[..chunk.len() + 1]);
    }
    out
}

fn base85_decode(data: &[u8]) -> Option<Vec<u8>> {
    let reverse = b85_reverse();
    let mut out = Vec::with_capacity(data.len() / 5 * 4 + 4);
    for chunk in data.chunks(5) {
        // A lone trailing digit cannot carry a byte.
        if chunk.len() == 1 {
            return None;
        }
        // Short groups pad with the maximum digit.
        let mut digits = [84u8; 5];
        for (digit, &byte) in digits.iter_mut().zip(chunk) {
            let value = reverse[byte as usize];
            if value == 0xff {
                return None;
            }
            *digit = value;
        }
        let value = digits.iter().fold(0u64, |acc, &d| acc * 85 + u64::from(d));
        if value > u64::from(u32::MAX) {
            return None;
        }
        let bytes = (value as u32).to_be_bytes();
        out.extend_from_slice(&bytes[..chunk.len() - 1]);
    }
    Some(out)
}

// Adobe alphabet '!'..'u', with 'z' standing in for a full zero group.
fn ascii85_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len().div_ceil(4) * 5);
    for chunk in data.chunks(4) {
        if chunk.len() == 4 && chunk.iter().all(|&b| b == 0) {
            out.push(b'z');
            continue;
        }
        let mut group = [0u8; 4];
        group[..chunk.len()].copy_from_slice(chunk);
        let mut value = u32::from_be_bytes(group);
        let mut digits = [0u8; 5];
        for digit in digits.iter_mut().rev() {
            *digit = (value % 85) as u8 + b'!';
            value /= 85;
        }
        out.extend_from_slice(&digits[..chunk.len() + 1]);
    }
    out
}

fn ascii85_decode(data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 5 * 4 + 4);
    let mut group = [0u8; 5];
    let mut filled = 0;
    for &byte in data {
        match byte {
            b' ' | b'\t' | b'\n' | b'\r' | 0x0b => continue,
            // 'z' is only valid on a group boundary.
            b'z' if filled == 0 => out.extend_from_slice(&[0, 0, 0, 0]),
            b'!'..=b'u' => {
                group[filled] = byte - b'!';
                filled += 1;
                if filled == 5 {
                    out.extend_from_slice(&decode_a85_group(&group)?);
                    filled = 0;
                }
            }
            _ => return None,
        }
    }
    if filled == 1 {
        return None;
    }
    if filled > 0 {
        // Short groups pad with the maximum digit 'u'.
        for digit in group.iter_mut().skip(filled) {
            *digit = 84;
        }
        let bytes = decode_a85_group(&group)?;
        out.extend_from_slice(&bytes[..filled - 1]);
    }
    Some(out)
}

fn decode_a85_group(digits: &[u8; 5]) -> Option<[u8; 4]> {
    let value = digits.iter().fold(0u64, |acc, &d| acc * 85 + u64::from(d));
    if value > u64::from(u32::MAX) {
        return None;
    }
    Some((value as u32).to_be_bytes())
}
