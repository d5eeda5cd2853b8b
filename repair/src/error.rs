use std::fmt::{Display, Formatter};

use design::ids::NetId;

/// The repair engine's only error variant (§4.2 Failure semantics, §7): every other condition
/// Steps A-I encounter is self-healing and becomes a recheck marker instead of an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalConnectivityError {
    pub net: NetId,
    pub net_name: String,
    pub unreachable_pins: Vec<String>,
}

impl Display for FatalConnectivityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "net {:?} ({}): {} pin(s) unreachable after repair search: {}",
            self.net,
            self.net_name,
            self.unreachable_pins.len(),
            self.unreachable_pins.join(", ")
        )
    }
}

impl std::error::Error for FatalConnectivityError {}

pub type Result<T> = std::result::Result<T, FatalConnectivityError>;
