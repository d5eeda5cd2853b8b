use crate::ids::{InstanceId, TermId};

/// The electrical signal class carried by a [`Term`](crate::Term), mirroring the DEF `+ USE`
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigType {
    Signal,
    Clock,
    Power,
    Ground,
}

/// The signal direction of a [`Term`](crate::Term), mirroring the DEF `+ DIRECTION` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoType {
    Input,
    Output,
    Inout,
    Feedthru,
}

/// A reference to one electrical connection point of a [`Net`](crate::Net): either a top-level
/// block boundary term, or a cell-instance pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinRef {
    BlockTerm(TermId),
    InstanceTerm(InstanceId, TermId),
}
