//! The per-layer spatial region index (§4.1): the only structure the repair and DRC engines use
//! to ask "what geometry is near this box". Both engines read it through read-only reference;
//! all mutation is funneled through [`RegionIndex::insert`]/[`RegionIndex::erase`], which the
//! driver only ever calls from a serial phase (§5).
//!
//! Implementation: one `rstar` R-tree per layer number, following the spec's suggestion of a
//! "boost-rtree-style balanced tree over bounding boxes" (§4.1). Handles are non-owning
//! `(NetId, ShapeId)` pairs or marker indices -- the index never owns geometry, only refers back
//! into the [`design::Block`] that does (§3 Ownership).

use std::collections::HashMap;

use design::ids::{NetId, ShapeId};
use geom::{Dbu, Rect};
use rstar::{RTree, RTreeObject, AABB};

/// A non-owning reference to geometry the index tracks: either a net's shape, or a marker by its
/// position in [`design::Block::markers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Shape(NetId, ShapeId),
    Marker(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    rect: Rect,
    handle: Handle,
}

impl RTreeObject for Entry {
    type Envelope = AABB<[Dbu; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.rect.xl, self.rect.yl], [self.rect.xh, self.rect.yh])
    }
}

/// One layer's tree, plus a handle -> rect side table so [`RegionIndex::erase`] can find the
/// exact entry to remove without the caller re-supplying its bounding box.
#[derive(Debug, Default)]
struct LayerIndex {
    tree: RTree<Entry>,
    by_handle: HashMap<Handle, Rect>,
}

impl LayerIndex {
    fn insert(&mut self, rect: Rect, handle: Handle) {
        self.tree.insert(Entry { rect, handle });
        self.by_handle.insert(handle, rect);
    }

    fn erase(&mut self, handle: Handle) -> bool {
        let Some(rect) = self.by_handle.remove(&handle) else {
            return false;
        };
        self.tree.remove(&Entry { rect, handle })
    }

    fn query_box(&self, box_: Rect) -> Vec<Handle> {
        let envelope = AABB::from_corners([box_.xl, box_.yl], [box_.xh, box_.yh]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| e.handle)
            .collect()
    }

    fn query_box_rects(&self, box_: Rect) -> Vec<(Rect, Handle)> {
        let envelope = AABB::from_corners([box_.xl, box_.yl], [box_.xh, box_.yh]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| (e.rect, e.handle))
            .collect()
    }
}

/// The spatial index over one [`design::Block`]'s geometry, with one tree per layer number.
///
/// `queryMaxRectangle`/`queryPolygonEdge` (§4.1) are approximated here by the rectangle each
/// shape already is: since every `Shape` in the design model is itself rectilinear-rectangular
/// (a path-segment's bbox, a via's enclosure, a patch-wire's offset box), there is no general
/// polygon union to decompose -- a shape's bbox *is* one of its maximal rectangles, and its four
/// sides are its polygon edges. DESIGN.md records this simplification; it is exact for the
/// rectangle-only geometry this crate models and degrades gracefully (as an over-approximation
/// of edge count) for overlapping same-net shapes, which Step B's merge pass eliminates for
/// collinear segments before DRC ever runs.
#[derive(Debug, Default)]
pub struct RegionIndex {
    layers: HashMap<i32, LayerIndex>,
}

impl RegionIndex {
    pub fn new() -> Self {
        RegionIndex::default()
    }

    pub fn insert(&mut self, layer_num: i32, rect: Rect, handle: Handle) {
        self.layers.entry(layer_num).or_default().insert(rect, handle);
    }

    /// `true` if `handle` was present (and is now removed).
    pub fn erase(&mut self, layer_num: i32, handle: Handle) -> bool {
        match self.layers.get_mut(&layer_num) {
            Some(layer) => layer.erase(handle),
            None => false,
        }
    }

    pub fn query_box(&self, layer_num: i32, box_: Rect) -> Vec<Handle> {
        self.layers.get(&layer_num).map(|l| l.query_box(box_)).unwrap_or_default()
    }

    /// Maximal rectangles intersecting `box_` (see the simplification note on the struct).
    pub fn query_max_rectangle(&self, layer_num: i32, box_: Rect) -> Vec<(Rect, Handle)> {
        self.layers.get(&layer_num).map(|l| l.query_box_rects(box_)).unwrap_or_default()
    }

    /// The four polygon edges of every shape intersecting `box_`, each tagged with the owning
    /// handle (see the simplification note on the struct).
    pub fn query_polygon_edge(&self, layer_num: i32, box_: Rect) -> Vec<(geom::Edge, Handle)> {
        self.query_max_rectangle(layer_num, box_)
            .into_iter()
            .flat_map(|(rect, handle)| rect_edges(rect).into_iter().map(move |e| (e, handle)))
            .collect()
    }

    pub fn query_markers(&self, layer_num: i32, box_: Rect) -> Vec<Handle> {
        self.query_box(layer_num, box_)
            .into_iter()
            .filter(|h| matches!(h, Handle::Marker(_)))
            .collect()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

fn rect_edges(r: Rect) -> [geom::Edge; 4] {
    use geom::{Edge, Point};
    [
        Edge::new(Point::new(r.xl, r.yl), Point::new(r.xh, r.yl)),
        Edge::new(Point::new(r.xh, r.yl), Point::new(r.xh, r.yh)),
        Edge::new(Point::new(r.xh, r.yh), Point::new(r.xl, r.yh)),
        Edge::new(Point::new(r.xl, r.yh), Point::new(r.xl, r.yl)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use design::ids::{NetId, ShapeId};

    fn handle(net: u32, shape: u32) -> Handle {
        Handle::Shape(NetId::from_raw(net), ShapeId::from_raw(shape))
    }

    #[test]
    fn insert_then_query_box_finds_the_rect() {
        let mut idx = RegionIndex::new();
        idx.insert(2, Rect::new(0, 0, 100, 100), handle(0, 0));
        let found = idx.query_box(2, Rect::new(50, 50, 150, 150));
        assert_eq!(found, vec![handle(0, 0)]);
    }

    #[test]
    fn query_box_on_disjoint_layer_is_empty() {
        let mut idx = RegionIndex::new();
        idx.insert(2, Rect::new(0, 0, 100, 100), handle(0, 0));
        assert!(idx.query_box(3, Rect::new(0, 0, 100, 100)).is_empty());
    }

    #[test]
    fn erase_removes_the_entry() {
        let mut idx = RegionIndex::new();
        idx.insert(2, Rect::new(0, 0, 100, 100), handle(0, 0));
        assert!(idx.erase(2, handle(0, 0)));
        assert!(idx.query_box(2, Rect::new(0, 0, 100, 100)).is_empty());
        assert!(!idx.erase(2, handle(0, 0)));
    }

    #[test]
    fn query_polygon_edge_returns_four_edges_per_rect() {
        let mut idx = RegionIndex::new();
        idx.insert(2, Rect::new(0, 0, 100, 40), handle(0, 0));
        let edges = idx.query_polygon_edge(2, Rect::new(0, 0, 100, 40));
        assert_eq!(edges.len(), 4);
    }
}
