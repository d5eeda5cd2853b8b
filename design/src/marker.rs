use geom::Rect;

use crate::ids::NetId;

/// Which rule (or internal bookkeeping device) produced a [`Marker`]. The DRC engine's checks
/// (§4.3) each map to exactly one variant here; [`Constraint::Recheck`] is the repair engine's
/// non-violation placeholder that tells the next routing iteration an area needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    Recheck,
    MetalSpacing,
    EndOfLine,
    CornerSpacing,
    MinWidth,
    MinStep,
    RectOnly,
    OffGrid,
    MinEnclosedArea,
    CutSpacing,
}

/// One side of a violation: the net (and, where meaningful, the specific shape) whose geometry
/// participates. Spacing checks populate both `victims` and `aggressors`; repair's recheck
/// markers populate only `victims`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Participant {
    pub net: NetId,
    pub fixed: bool,
}

/// A deduplicated violation or recheck record (§3, §4.4). Identity for dedup purposes is
/// `(constraint, layer_num, bbox, victims, aggressors)` -- see
/// [`crate::block::Block::add_marker`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marker {
    pub bbox: Rect,
    pub layer_num: i32,
    pub constraint: Constraint,
    pub victims: Vec<Participant>,
    pub aggressors: Vec<Participant>,
}

impl Marker {
    pub fn recheck(bbox: Rect, layer_num: i32, net: NetId) -> Self {
        Marker {
            bbox,
            layer_num,
            constraint: Constraint::Recheck,
            victims: vec![Participant { net, fixed: false }],
            aggressors: Vec::new(),
        }
    }

    /// The key [`crate::block::Block::add_marker`] uses to suppress duplicates.
    fn dedup_key(&self) -> (Constraint, i32, Rect, &[Participant], &[Participant]) {
        (self.constraint, self.layer_num, self.bbox, &self.victims, &self.aggressors)
    }

    pub fn is_duplicate_of(&self, other: &Marker) -> bool {
        self.dedup_key() == other.dedup_key()
    }
}
