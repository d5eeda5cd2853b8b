use std::collections::HashMap;

use geom::direction::EndStyle;
use geom::{Dbu, Point, Rect};
use tech::ViaDefId;

use crate::error::{Error, Result};
use crate::ids::{IdGen, NetId, ShapeId};
use crate::pin::PinRef;
use crate::shape::{PatchWire, PathSegment, Shape, Via};

/// A net: the set of [`Shape`]s and connected [`PinRef`]s that must end up forming one
/// loop-free, pin-covering tree once [`crate::Block::check_connectivity`] has run (§3).
///
/// Shapes live in a dense `ShapeId`-keyed arena owned by the net, following the handle-based
/// ownership the crate uses everywhere a cycle would otherwise appear (§3.1).
#[derive(Debug, Clone)]
pub struct Net {
    pub id: NetId,
    pub name: String,
    shapes: HashMap<ShapeId, Shape>,
    pub pins: Vec<PinRef>,
    /// Set by ingestion/mutation; cleared by [`crate::Block::check_connectivity`] once the net
    /// has been repaired.
    pub modified: bool,
}

impl Net {
    pub fn new(id: NetId, name: impl Into<String>) -> Self {
        Net {
            id,
            name: name.into(),
            shapes: HashMap::new(),
            pins: Vec::new(),
            modified: true,
        }
    }

    pub fn add_pin(&mut self, pin: PinRef) {
        if !self.pins.contains(&pin) {
            self.pins.push(pin);
        }
    }

    pub fn add_path_segment(
        &mut self,
        ids: &mut IdGen,
        begin: Point,
        end: Point,
        layer_num: i32,
        half_width: Dbu,
        style_begin: EndStyle,
        style_end: EndStyle,
    ) -> Result<ShapeId> {
        if begin == end {
            return Err(Error::ZeroLengthSegment { net: self.id });
        }
        if begin.x != end.x && begin.y != end.y {
            return Err(Error::NonOrthogonalSegment { net: self.id });
        }
        let seg = PathSegment::new(self.id, begin, end, layer_num, half_width, style_begin, style_end);
        let id = ids.next_shape();
        self.shapes.insert(id, Shape::PathSegment(seg));
        self.modified = true;
        Ok(id)
    }

    pub fn add_via(&mut self, ids: &mut IdGen, origin: Point, def: ViaDefId, bottom_layer_num: i32, top_layer_num: i32) -> ShapeId {
        let id = ids.next_shape();
        self.shapes.insert(
            id,
            Shape::Via(Via {
                net: self.id,
                origin,
                def,
                bottom_layer_num,
                top_layer_num,
            }),
        );
        self.modified = true;
        id
    }

    pub fn add_patch_wire(&mut self, ids: &mut IdGen, origin: Point, offset_box: Rect, layer_num: i32) -> ShapeId {
        let id = ids.next_shape();
        self.shapes.insert(
            id,
            Shape::PatchWire(PatchWire {
                net: self.id,
                origin,
                offset_box,
                layer_num,
            }),
        );
        self.modified = true;
        id
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        self.shapes.remove(&id)
    }

    /// Replaces an existing path-segment's geometry in place, keeping its `ShapeId` (Step B, and
    /// Steps G/H of repair rewrite segments this way rather than delete-then-reinsert so the
    /// index update is a single erase/insert pair on the same handle).
    pub fn rewrite_path_segment(&mut self, id: ShapeId, seg: PathSegment) {
        self.shapes.insert(id, Shape::PathSegment(seg));
    }

    /// All shapes, in ascending `ShapeId` order (stable iteration matters: the repair engine's
    /// node list and the A* tie-break both key on shape/node index, §5 Determinism).
    pub fn shapes(&self) -> impl Iterator<Item = (ShapeId, &Shape)> {
        let mut ids: Vec<_> = self.shapes.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().map(move |id| (id, &self.shapes[&id]))
    }

    pub fn path_segments(&self) -> impl Iterator<Item = (ShapeId, &PathSegment)> {
        self.shapes().filter_map(|(id, s)| match s {
            Shape::PathSegment(p) => Some((id, p)),
            _ => None,
        })
    }

    pub fn vias(&self) -> impl Iterator<Item = (ShapeId, &Via)> {
        self.shapes().filter_map(|(id, s)| match s {
            Shape::Via(v) => Some((id, v)),
            _ => None,
        })
    }

    pub fn patch_wires(&self) -> impl Iterator<Item = (ShapeId, &PatchWire)> {
        self.shapes().filter_map(|(id, s)| match s {
            Shape::PatchWire(p) => Some((id, p)),
            _ => None,
        })
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::direction::EndStyle;

    #[test]
    fn rejects_zero_length_segment() {
        let mut ids = IdGen::default();
        let mut net = Net::new(NetId::from_raw(0), "n1");
        let err = net
            .add_path_segment(&mut ids, Point::new(0, 0), Point::new(0, 0), 2, 70, EndStyle::Extend, EndStyle::Extend)
            .unwrap_err();
        assert_eq!(err, Error::ZeroLengthSegment { net: NetId::from_raw(0) });
    }

    #[test]
    fn rejects_non_orthogonal_segment() {
        let mut ids = IdGen::default();
        let mut net = Net::new(NetId::from_raw(0), "n1");
        let err = net
            .add_path_segment(&mut ids, Point::new(0, 0), Point::new(10, 10), 2, 70, EndStyle::Extend, EndStyle::Extend)
            .unwrap_err();
        assert_eq!(err, Error::NonOrthogonalSegment { net: NetId::from_raw(0) });
    }
}
