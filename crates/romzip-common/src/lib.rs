//! Common utilities for romzip.
//!
//! This crate provides the foundational pieces shared by the archive reader:
//!
//! - [`BinaryReader`] - Bounds-checked little-endian reading from byte slices
//! - [`crc`] - CRC-32 (IEEE) checksums as stored in ZIP headers
//! - [`strings`] - ASCII case-insensitive prefix/suffix matching

mod error;
mod reader;

pub mod crc;
pub mod strings;

pub use error::{Error, Result};
pub use reader::BinaryReader;
