use thiserror::Error;

/// Errors raised while interpreting decoded bytes as typed USD values.
#[derive(Debug, Error)]
pub enum Error {
    #[error("type mismatch: value holds type id {actual:?}, requested {requested}")]
    TypeMismatch {
        actual: crate::types::CrateDataTypeId,
        requested: &'static str,
    },

    #[error("unsupported crate data type id {0}")]
    UnsupportedType(u8),

    #[error("malformed path: {0}")]
    MalformedPath(String),

    #[error("malformed value: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
