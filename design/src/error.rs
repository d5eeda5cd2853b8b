use std::fmt::{Display, Formatter};

use crate::ids::NetId;

/// Errors raised by the design model and, via [`crate::Block::check_connectivity`], by the
/// repair engine it hosts. Only the unreachable-pin case is fatal (§7); every other condition in
/// this crate is either an ingestion-time input error or surfaces as a recheck marker instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    UnknownNet { name: String },
    UnknownPin { net: String, term: String },
    ZeroLengthSegment { net: NetId },
    NonOrthogonalSegment { net: NetId },
    /// A pin that Step E's search could not reach from the rest of the net. Fatal (§4.2, §7).
    UnreachablePin { net: NetId, pin: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownNet { name } => write!(f, "no net named {name:?}"),
            Error::UnknownPin { net, term } => write!(f, "net {net:?} has no pin named {term:?}"),
            Error::ZeroLengthSegment { net } => write!(f, "net {net:?}: zero-length path segment rejected at ingestion"),
            Error::NonOrthogonalSegment { net } => write!(f, "net {net:?}: path segment is not axis-aligned"),
            Error::UnreachablePin { net, pin } => {
                write!(f, "net {net:?}: pin {pin:?} is unreachable after connectivity repair")
            }
        }
    }
}

impl std::error::Error for Error {}
