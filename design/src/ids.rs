use std::fmt::{Debug, Formatter};

macro_rules! newtype_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }
    };
}

newtype_id!(NetId);
newtype_id!(ShapeId);
newtype_id!(MarkerId);
newtype_id!(TermId);
newtype_id!(InstanceId);

/// A monotonic id generator, shared by every arena in the crate. Ids are never reused within a
/// `Block`'s lifetime, which is what lets the region index hold `(NetId, ShapeId)` pairs safely
/// across repair mutations (a stale id simply fails the arena lookup rather than aliasing a
/// different object).
#[derive(Debug, Clone, Default)]
pub struct IdGen(u32);

impl IdGen {
    pub fn next_shape(&mut self) -> ShapeId {
        let id = self.0;
        self.0 += 1;
        ShapeId(id)
    }

    pub fn next_net(&mut self) -> NetId {
        let id = self.0;
        self.0 += 1;
        NetId(id)
    }

    pub fn next_marker(&mut self) -> MarkerId {
        let id = self.0;
        self.0 += 1;
        MarkerId(id)
    }

    pub fn next_term(&mut self) -> TermId {
        let id = self.0;
        self.0 += 1;
        TermId(id)
    }

    pub fn next_instance(&mut self) -> InstanceId {
        let id = self.0;
        self.0 += 1;
        InstanceId(id)
    }
}
