//! The design model: [`Block`], [`Net`], [`Instance`], [`Term`], [`Shape`] and [`Marker`], plus
//! the arena/handle plumbing that replaces the cyclic Net/Shape/Region-Index ownership of the
//! original engine (see the crate-level design ledger for why).
//!
//! `Block` exclusively owns `Net`s, `Instance`s, `Term`s and `Marker`s; `Net` exclusively owns its
//! `Shape`s. Everything else refers to these objects by a newtyped id, never by reference.

pub mod block;
pub mod error;
pub mod guide;
pub mod ids;
pub mod instance;
pub mod marker;
pub mod net;
pub mod pin;
pub mod shape;
pub mod term;

pub use block::Block;
pub use error::{Error, Result};
pub use ids::{InstanceId, MarkerId, NetId, ShapeId, TermId};
pub use instance::Instance;
pub use marker::Marker;
pub use net::Net;
pub use pin::{IoType, PinRef, SigType};
pub use shape::{PatchWire, PathSegment, Shape, Via};
pub use term::Term;
