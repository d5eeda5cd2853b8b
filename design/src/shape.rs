use geom::direction::EndStyle;
use geom::{Dbu, Point, Rect};
use tech::ViaDefId;

use crate::ids::NetId;

/// The routed geometry owned by a [`Net`](crate::Net): the tagged union that replaces the
/// original engine's `frConnFig` class hierarchy (DESIGN NOTES: inheritance over "connection
/// figure" becomes a tagged variant with a common header).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    PathSegment(PathSegment),
    Via(Via),
    PatchWire(PatchWire),
}

impl Shape {
    pub fn owner(&self) -> NetId {
        match self {
            Shape::PathSegment(s) => s.net,
            Shape::Via(v) => v.net,
            Shape::PatchWire(p) => p.net,
        }
    }

    /// The layer numbers this shape occupies metal on (a via occupies two).
    pub fn layer_numbers(&self) -> Vec<i32> {
        match self {
            Shape::PathSegment(s) => vec![s.layer_num],
            Shape::Via(v) => vec![v.bottom_layer_num, v.top_layer_num],
            Shape::PatchWire(p) => vec![p.layer_num],
        }
    }

    /// `true` if this shape has any metal on the given routing/cut layer number.
    pub fn touches_layer(&self, layer_num: i32) -> bool {
        self.layer_numbers().contains(&layer_num)
    }
}

/// A routed wire segment. **Invariant**: `begin <= end` lexicographically, and the segment is
/// orthogonal (`begin.x == end.x` xor `begin.y == end.y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSegment {
    pub net: NetId,
    pub begin: Point,
    pub end: Point,
    pub layer_num: i32,
    pub half_width: Dbu,
    pub style_begin: EndStyle,
    pub style_end: EndStyle,
}

impl PathSegment {
    pub fn new(
        net: NetId,
        mut p1: Point,
        mut p2: Point,
        layer_num: i32,
        half_width: Dbu,
        style_begin: EndStyle,
        style_end: EndStyle,
    ) -> Self {
        if p2 < p1 {
            std::mem::swap(&mut p1, &mut p2);
        }
        PathSegment {
            net,
            begin: p1,
            end: p2,
            layer_num,
            half_width,
            style_begin,
            style_end,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.begin.y == self.end.y
    }

    /// The track coordinate: `y` for a horizontal segment, `x` for a vertical one.
    pub fn track(&self) -> Dbu {
        if self.is_horizontal() {
            self.begin.y
        } else {
            self.begin.x
        }
    }

    /// The coordinate range of the segment along its own direction of travel.
    pub fn extent(&self) -> (Dbu, Dbu) {
        if self.is_horizontal() {
            (self.begin.x, self.end.x)
        } else {
            (self.begin.y, self.end.y)
        }
    }

    pub fn is_orthogonal(&self) -> bool {
        self.begin.x == self.end.x || self.begin.y == self.end.y
    }

    pub fn is_zero_length(&self) -> bool {
        self.begin == self.end
    }

    pub fn bbox(&self) -> Rect {
        let ext_begin = self.style_begin.extension(self.half_width);
        let ext_end = self.style_end.extension(self.half_width);
        if self.is_horizontal() {
            Rect::new(
                self.begin.x - ext_begin,
                self.begin.y - self.half_width,
                self.end.x + ext_end,
                self.end.y + self.half_width,
            )
        } else {
            Rect::new(
                self.begin.x - self.half_width,
                self.begin.y - ext_begin,
                self.end.x + self.half_width,
                self.end.y + ext_end,
            )
        }
    }

    /// A copy of this segment with its endpoints replaced, re-deriving which supplied end-style
    /// stays attached to which new endpoint (used by the merge and shrink steps of repair).
    pub fn with_extent(&self, begin: Point, end: Point, style_begin: EndStyle, style_end: EndStyle) -> Self {
        PathSegment {
            begin,
            end,
            style_begin,
            style_end,
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Via {
    pub net: NetId,
    pub origin: Point,
    pub def: ViaDefId,
    pub bottom_layer_num: i32,
    pub top_layer_num: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchWire {
    pub net: NetId,
    pub origin: Point,
    /// Offset box relative to `origin`.
    pub offset_box: Rect,
    pub layer_num: i32,
}

impl PatchWire {
    pub fn bbox(&self) -> Rect {
        Rect::new(
            self.origin.x + self.offset_box.xl,
            self.origin.y + self.offset_box.yl,
            self.origin.x + self.offset_box.xh,
            self.origin.y + self.offset_box.yh,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::direction::EndStyle;

    #[test]
    fn path_segment_normalizes_endpoint_order() {
        let net = NetId::from_raw(0);
        let seg = PathSegment::new(
            net,
            Point::new(100, 0),
            Point::new(0, 0),
            1,
            70,
            EndStyle::Extend,
            EndStyle::Truncate,
        );
        assert_eq!(seg.begin, Point::new(0, 0));
        assert_eq!(seg.end, Point::new(100, 0));
        // The end-styles followed their original endpoints, so they're swapped too.
        assert_eq!(seg.style_begin, EndStyle::Truncate);
        assert_eq!(seg.style_end, EndStyle::Extend);
    }
}
