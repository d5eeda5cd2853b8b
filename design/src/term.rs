use geom::Rect;

use crate::pin::{IoType, SigType};

/// One electrical connection point: either a block-boundary term or a cell-instance pin,
/// depending on whether it lives in [`crate::Block::terms`] or an [`crate::Instance`]'s own term
/// arena.
///
/// `access_boxes` are the pin shapes a wire must touch to be considered connected; the repair
/// engine's node-map construction (Step C, §4.2) queries these to find a pin's access point.
#[derive(Debug, Clone)]
pub struct Term {
    pub name: String,
    pub sig_type: SigType,
    pub io_type: IoType,
    pub access_boxes: Vec<(Rect, i32)>,
}

impl Term {
    pub fn new(name: impl Into<String>, sig_type: SigType, io_type: IoType) -> Self {
        Term {
            name: name.into(),
            sig_type,
            io_type,
            access_boxes: Vec::new(),
        }
    }

    pub fn with_access_box(mut self, rect: Rect, layer_num: i32) -> Self {
        self.access_boxes.push((rect, layer_num));
        self
    }

    /// `true` if any access box on `layer_num` contains `pt`.
    pub fn covers(&self, pt: geom::Point, layer_num: i32) -> bool {
        self.access_boxes
            .iter()
            .any(|(r, l)| *l == layer_num && r.contains_point(pt))
    }
}
