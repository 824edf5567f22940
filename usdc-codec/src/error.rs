use thiserror::Error;

/// Errors raised by the byte-level reader and the integer/LZ4 codecs.
#[derive(Debug, Error)]
pub enum Error {
    #[error("end of stream: requested {requested} bytes at offset {offset}, {available} available")]
    EndOfStream {
        offset: u64,
        requested: u64,
        available: u64,
    },

    #[error("invalid offset {offset} (stream size is {size})")]
    InvalidOffset { offset: i64, size: u64 },

    #[error("corrupt data: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, Error>;
