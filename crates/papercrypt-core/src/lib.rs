//! # PaperCrypt Core
//!
//! Core library for PaperCrypt: encrypted documents meant to be printed on
//! paper, retyped by hand or scanned, and decrypted years later.
//!
//! This crate holds the document codec and its collaborators, independent of
//! the CLI.
//!
//! ## Architecture
//!
//! - **checksum**: integrity codes over the raw ciphertext
//! - **serial**: human-friendly serial numbers
//! - **document**: the immutable document model
//! - **text**: the paper sheet format and its checked parser
//! - **payload**: JSON payloads for QR codes, with generation sniffing
//! - **qr**: QR rendering and image scanning
//! - **crypto**: the age encryption adapter
//! - **fs**: careful file output

pub mod checksum;
pub mod crypto;
pub mod document;
pub mod error;
pub mod fs;
pub mod payload;
pub mod qr;
pub mod serial;
pub mod text;

pub use checksum::{Checksum, ChecksumAlgorithm};
pub use document::{Ciphertext, Document, NewDocument};
pub use error::{IntegrityFailure, PaperCryptError, Result};
pub use payload::Generation;
pub use serial::SerialNumber;
pub use text::{BodyEncoding, TextOptions};

/// Core version information. Its major component is the document generation
/// this build writes.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
