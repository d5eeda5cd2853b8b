//! The geometric design-rule-check engine (C6, §4.3): a battery of independent per-class checks
//! over the region index, each emitting [`design::marker::Marker`]s through the deduplicating
//! sink (§4.4).
//!
//! Each check module is a pure function of `(&Block, &Technology, &RegionIndex) -> Vec<Marker>`;
//! [`check`] runs them and is the only place that mutates the block (via
//! [`design::Block::add_marker`]) and the index (inserting accepted markers back in so later
//! queries can see "has this already been flagged", §4.4).

pub mod corner;
pub mod cut;
pub mod eol;
pub mod shape_rules;
pub mod spacing;

use design::shape::Shape;
use design::{Block, Marker};
use geom::Rect;
use index::{Handle, RegionIndex};
use tech::{Technology, ViaDef};

/// Runs every check and deposits accepted markers into both `block` and `index`. Checks
/// themselves read `index` and `block` concurrently inside each module (most parallelize their
/// own per-shape work with `rayon`); only this final emission pass is serial, to keep
/// marker-sink output deterministic (§4.3 Emission, §5 Ordering guarantees).
pub fn check(block: &mut Block, tech: &Technology, index: &mut RegionIndex) {
    let mut markers = Vec::new();
    markers.extend(spacing::check(block, tech, index));
    markers.extend(eol::check(block, tech, index));
    markers.extend(corner::check(block, tech, index));
    markers.extend(shape_rules::check(block, tech, index));
    markers.extend(cut::check(block, tech, index));

    for marker in markers {
        let layer_num = marker.layer_num;
        let bbox = marker.bbox;
        if block.add_marker(marker) {
            let idx = block.markers().len() - 1;
            index.insert(layer_num, bbox, Handle::Marker(idx));
        }
    }
}

/// A shape's bounding rectangle *on the given layer number*, standing in for "a maximal
/// rectangle of the polygon" (the index's simplification, documented on [`index::RegionIndex`]).
///
/// A via occupies three layers (bottom metal, cut, top metal) with three different rectangles;
/// callers always know which layer they're checking (it comes from [`Shape::layer_numbers`]),
/// so this takes it explicitly rather than guessing from `shape` alone.
pub(crate) fn shape_rect(shape: &Shape, tech: &Technology, layer_num: i32) -> Rect {
    match shape {
        Shape::PathSegment(s) => s.bbox(),
        Shape::PatchWire(p) => p.bbox(),
        Shape::Via(v) => {
            let def: &ViaDef = tech.via_def(v.def);
            if layer_num == v.bottom_layer_num {
                def.bottom_enclosure_at(v.origin)
            } else if layer_num == v.top_layer_num {
                def.top_enclosure_at(v.origin)
            } else {
                // Cut-layer query: envelope of the cut rectangles (cut.rs handles per-cut checks
                // itself; this fallback only serves shared helpers that want a single box).
                let cuts = def.cuts_at(v.origin);
                cuts.into_iter()
                    .reduce(|a, b| Rect::new(a.xl.min(b.xl), a.yl.min(b.yl), a.xh.max(b.xh), a.yh.max(b.yh)))
                    .unwrap_or_else(|| def.bottom_enclosure_at(v.origin))
            }
        }
    }
}
