//! The type-erased USD value system: interned tokens, scene paths,
//! `ValueRep`-shaped values, list-ops, dictionaries, and time samples.
//!
//! This crate has no knowledge of the on-disk byte layout; it models the
//! decoded, semantic side of the format. `usdc-core` is what turns raw
//! `ValueRep` bits into these types.

pub mod dict;
pub mod error;
pub mod geom;
pub mod listop;
pub mod path;
pub mod time_samples;
pub mod token;
pub mod types;
pub mod value;

pub use dict::Dictionary;
pub use error::{Error, Result};
pub use geom::*;
pub use listop::{ListEditQual, ListOp};
pub use path::{Path, PrimElement, PropElement};
pub use time_samples::{Interpolation, TimeSamples};
pub use token::{Index, Token, TokenTable};
pub use types::CrateDataTypeId;
pub use value::{ArrayValue, FromScalar, Permission, Scalar, Specifier, Value, Variability};
