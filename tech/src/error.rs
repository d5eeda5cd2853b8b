use std::fmt::{Display, Formatter};

/// Errors raised while resolving technology data. Everything here is an input error (§7): an
/// unknown layer or via number, discovered at ingestion time rather than mid-algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    UnknownLayer { number: i32 },
    UnknownVia { name: String },
    InvalidConfig { reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownLayer { number } => write!(f, "no layer with number {number}"),
            Error::UnknownVia { name } => write!(f, "no via definition named {name:?}"),
            Error::InvalidConfig { reason } => write!(f, "invalid router configuration: {reason}"),
        }
    }
}

impl std::error::Error for Error {}
