use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("input file '{}' does not exist", .0.display())]
    SourceNotFound(PathBuf),

    #[error("no input detected")]
    NoInput,

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("input is not valid {0}: wrong encoder scheme, or wrong direction?")]
    Decode(&'static str),

    #[error("corrupted container header: {0}")]
    CorruptHeader(String),

    #[error("serialized header is {0} bytes, larger than the fixed 512-byte slot")]
    HeaderTooLarge(usize),

    #[error("invalid tag: wrong password or corrupted file")]
    Authentication,

    #[error("passwords don't match")]
    PasswordMismatch,

    #[error("cryptographic failure")]
    Crypto,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
