use std::fmt::{Debug, Formatter};

use geom::Rect;

/// A newtyped index into [`crate::Technology`]'s via-definition arena.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ViaDefId(pub(crate) u32);

impl Debug for ViaDefId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ViaDefId({})", self.0)
    }
}

impl From<ViaDefId> for usize {
    fn from(id: ViaDefId) -> usize {
        id.0 as usize
    }
}

/// A via definition: the cut and enclosure figures relating a cut layer to the routing layers
/// immediately above and below it.
#[derive(Debug, Clone)]
pub struct ViaDef {
    pub name: String,
    pub cut_layer_number: i32,
    pub bottom_layer_number: i32,
    pub top_layer_number: i32,
    /// Cut rectangles, relative to the via origin.
    pub cuts: Vec<Rect>,
    /// Bottom-metal enclosure, relative to the via origin.
    pub bottom_enclosure: Rect,
    /// Top-metal enclosure, relative to the via origin.
    pub top_enclosure: Rect,
    pub is_default: bool,
    pub cut_class: Option<String>,
}

impl ViaDef {
    /// Cut rectangles translated to an absolute origin.
    pub fn cuts_at(&self, origin: geom::Point) -> Vec<Rect> {
        self.cuts
            .iter()
            .map(|r| Rect::new(r.xl + origin.x, r.yl + origin.y, r.xh + origin.x, r.yh + origin.y))
            .collect()
    }

    pub fn bottom_enclosure_at(&self, origin: geom::Point) -> Rect {
        let r = &self.bottom_enclosure;
        Rect::new(r.xl + origin.x, r.yl + origin.y, r.xh + origin.x, r.yh + origin.y)
    }

    pub fn top_enclosure_at(&self, origin: geom::Point) -> Rect {
        let r = &self.top_enclosure;
        Rect::new(r.xl + origin.x, r.yl + origin.y, r.xh + origin.x, r.yh + origin.y)
    }
}
