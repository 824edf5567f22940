//! Byte-level stream reading and the Pixar Crate integer/LZ4 codecs.
//!
//! This crate has no knowledge of USD semantics: it is pure byte and number
//! plumbing shared by everything built on top of it.

pub mod error;
pub mod intcomp;
pub mod lz4;
pub mod reader;

pub use error::{Error, Result};
pub use reader::ByteReader;
