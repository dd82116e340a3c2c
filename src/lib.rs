//! binlock library API
//!
//! Exposes the container format, key derivation and AEAD plumbing for tests
//! and embedding. The binary interface lives in main.rs.

pub mod aead;
pub mod cli;
pub mod codec;
pub mod commands;
pub mod container;
pub mod error;
pub mod format;
pub mod kdf;
pub mod logger;
pub mod securemem;

pub use error::Error;
pub use format::{Header, HEADER_LEN};
