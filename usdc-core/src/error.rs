use thiserror::Error;
use usdc_value::Path;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] usdc_codec::Error),

    #[error(transparent)]
    Value(#[from] usdc_value::Error),

    #[error("[Crate] {section}:{offset}: {message}")]
    Corrupt {
        section: &'static str,
        offset: u64,
        message: String,
    },

    #[error("unsupported crate version {major}.{minor}.{patch}")]
    UnsupportedVersion { major: u8, minor: u8, patch: u8 },

    #[error("unsupported value type code {0}")]
    UnsupportedType(u8),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("type mismatch: requested {requested}, stored {stored}")]
    TypeMismatch { requested: &'static str, stored: String },

    #[error("invalid apiSchemas entry: {0}")]
    InvalidApiSchema(String),

    #[error("invalid kind: {0}")]
    InvalidKind(String),

    #[error("invalid specifier: {0}")]
    InvalidSpecifier(String),

    #[error("invalid upAxis: {0}")]
    InvalidUpAxis(String),

    #[error("circular connection detected at {0}")]
    CircularConnection(Path),

    #[error("invalid connection target {0}")]
    InvalidConnection(Path),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn corrupt(section: &'static str, offset: u64, message: impl Into<String>) -> Self {
        Error::Corrupt {
            section,
            offset,
            message: message.into(),
        }
    }
}
