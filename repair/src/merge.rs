//! Steps A and B of connectivity repair (§4.2): merges overlapping collinear same-layer,
//! same-track path-segments into their minimal covering span.

use std::collections::HashMap;

use design::ids::ShapeId;
use design::shape::PathSegment;
use design::Net;
use geom::Dbu;

/// One closed interval Step A produced: the merged span plus the shape ids it subsumes, in the
/// order they were walked (the first is rewritten in place in Step B; the rest are dropped).
#[derive(Debug, Clone)]
pub struct MergedSpan {
    pub layer_num: i32,
    pub victims: Vec<ShapeId>,
}

/// Step A ("Merge & Heal"): a pure read of the net's path-segments. Groups them per-layer by
/// track, sorts by extent, and sweeps a closing interval exactly as §4.2 describes. Only
/// intervals with >= 2 constituents are returned (a lone segment needs no merge).
pub fn plan_merges(net: &Net) -> Vec<MergedSpan> {
    // (layer_num, track) -> segments sorted by extent start.
    let mut by_track: HashMap<(i32, Dbu), Vec<(ShapeId, Dbu, Dbu)>> = HashMap::new();
    for (shape_id, seg) in net.path_segments() {
        let (start, end) = seg.extent();
        by_track.entry((seg.layer_num, seg.track())).or_default().push((shape_id, start, end));
    }

    let mut spans = Vec::new();
    let mut tracks: Vec<_> = by_track.into_iter().collect();
    tracks.sort_by_key(|((layer, track), _)| (*layer, *track));

    for ((layer_num, _track), mut segs) in tracks {
        segs.sort_by_key(|(_, start, _)| *start);
        let mut iter = segs.into_iter();
        let Some((first_id, _, mut cur_end)) = iter.next() else {
            continue;
        };
        let mut victims = vec![first_id];
        for (shape_id, start, end) in iter {
            if start <= cur_end {
                cur_end = cur_end.max(end);
                victims.push(shape_id);
            } else {
                if victims.len() >= 2 {
                    spans.push(MergedSpan { layer_num, victims: std::mem::take(&mut victims) });
                }
                victims = vec![shape_id];
                cur_end = end;
            }
        }
        if victims.len() >= 2 {
            spans.push(MergedSpan { layer_num, victims });
        }
    }
    spans
}

/// Step B ("Commit Merge"), mutating `net` and the caller's region index. The first victim's
/// `ShapeId` survives, rewritten to the merged span's extent with its begin-style kept and its
/// end-style taken from the last victim (§4.2 Step B); every other victim is removed.
///
/// Returns `(surviving_id, rewritten_segment, removed_ids)` so the caller can erase/insert the
/// corresponding region-index entries.
pub fn commit_merge(net: &mut Net, span: &MergedSpan) -> (ShapeId, PathSegment, Vec<ShapeId>) {
    let first = *span.victims.first().expect("MergedSpan always has >= 2 victims");
    let last = *span.victims.last().expect("MergedSpan always has >= 2 victims");

    let first_seg = match net.shape(first) {
        Some(design::Shape::PathSegment(s)) => *s,
        _ => panic!("merge victim {first:?} is not a path segment"),
    };
    let last_seg = match net.shape(last) {
        Some(design::Shape::PathSegment(s)) => *s,
        _ => panic!("merge victim {last:?} is not a path segment"),
    };

    let (begin, end) = if first_seg.is_horizontal() {
        let lo = span.victims.iter().filter_map(|id| path_segment(net, *id)).map(|s| s.begin.x).min().unwrap();
        let hi = span.victims.iter().filter_map(|id| path_segment(net, *id)).map(|s| s.end.x).max().unwrap();
        (geom::Point::new(lo, first_seg.begin.y), geom::Point::new(hi, first_seg.begin.y))
    } else {
        let lo = span.victims.iter().filter_map(|id| path_segment(net, *id)).map(|s| s.begin.y).min().unwrap();
        let hi = span.victims.iter().filter_map(|id| path_segment(net, *id)).map(|s| s.end.y).max().unwrap();
        (geom::Point::new(first_seg.begin.x, lo), geom::Point::new(first_seg.begin.x, hi))
    };

    let merged = first_seg.with_extent(begin, end, first_seg.style_begin, last_seg.style_end);
    net.rewrite_path_segment(first, merged);

    let removed: Vec<ShapeId> = span.victims[1..].iter().copied().collect();
    for id in &removed {
        net.remove_shape(*id);
    }
    (first, merged, removed)
}

fn path_segment(net: &Net, id: ShapeId) -> Option<PathSegment> {
    match net.shape(id) {
        Some(design::Shape::PathSegment(s)) => Some(*s),
        _ => None,
    }
}
