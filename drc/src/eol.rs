//! End-of-line spacing check (§4.3.2): the short edge at the tip of a wire run must clear another
//! opposing tip by `eolSpace`, with several optional predicates gating when the rule applies at
//! all.

use design::ids::NetId;
use design::marker::{Constraint, Marker, Participant};
use design::shape::PathSegment;
use design::Block;
use geom::{Dbu, Rect};
use index::{Handle, RegionIndex};
use rayon::prelude::*;
use tech::rule::EolRule;
use tech::Technology;

/// Which way a tip's wire continues, away from the tip itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outward {
    PlusX,
    MinusX,
    PlusY,
    MinusY,
}

impl Outward {
    fn is_horizontal(self) -> bool {
        matches!(self, Outward::PlusX | Outward::MinusX)
    }
}

#[derive(Debug, Clone, Copy)]
struct EolEdge {
    net: NetId,
    layer_num: i32,
    /// The cap rectangle itself: zero-extent along the travel direction, `width` across it.
    tip: Rect,
    outward: Outward,
    run_length: Dbu,
}

pub fn check(block: &Block, tech: &Technology, index: &RegionIndex) -> Vec<Marker> {
    let edges: Vec<EolEdge> = block
        .nets()
        .flat_map(|(net_id, net)| net.path_segments().flat_map(move |(_id, seg)| tips_of(net_id, seg)))
        .collect();

    edges
        .par_iter()
        .flat_map_iter(|edge| check_one(tech, index, edge))
        .collect()
}

fn tips_of(net: NetId, seg: &PathSegment) -> [EolEdge; 2] {
    let layer_num = seg.layer_num;
    let run_length = if seg.is_horizontal() { seg.end.x - seg.begin.x } else { seg.end.y - seg.begin.y };

    if seg.is_horizontal() {
        let y_lo = seg.begin.y - seg.half_width;
        let y_hi = seg.begin.y + seg.half_width;
        [
            EolEdge {
                net,
                layer_num,
                tip: Rect::new(seg.begin.x, y_lo, seg.begin.x, y_hi),
                outward: Outward::MinusX,
                run_length,
            },
            EolEdge {
                net,
                layer_num,
                tip: Rect::new(seg.end.x, y_lo, seg.end.x, y_hi),
                outward: Outward::PlusX,
                run_length,
            },
        ]
    } else {
        let x_lo = seg.begin.x - seg.half_width;
        let x_hi = seg.begin.x + seg.half_width;
        [
            EolEdge {
                net,
                layer_num,
                tip: Rect::new(x_lo, seg.begin.y, x_hi, seg.begin.y),
                outward: Outward::MinusY,
                run_length,
            },
            EolEdge {
                net,
                layer_num,
                tip: Rect::new(x_lo, seg.end.y, x_hi, seg.end.y),
                outward: Outward::PlusY,
                run_length,
            },
        ]
    }
}

fn tip_width(edge: &EolEdge) -> Dbu {
    if edge.outward.is_horizontal() { edge.tip.height() } else { edge.tip.width() }
}

fn check_one(tech: &Technology, index: &RegionIndex, edge: &EolEdge) -> Vec<Marker> {
    let Ok(layer_id) = tech.layer_by_number(edge.layer_num) else {
        return Vec::new();
    };
    let layer = tech.layer(layer_id);
    let width = tip_width(edge);

    let mut markers = Vec::new();
    for rule in &layer.routing_rules.eol_rules {
        if width >= rule.eol_width {
            continue;
        }
        if !predicates_hold(index, edge, rule) {
            continue;
        }
        markers.extend(find_opposing(index, edge, rule));
    }
    markers
}

fn predicates_hold(index: &RegionIndex, edge: &EolEdge, rule: &EolRule) -> bool {
    if let (Some(par_space), Some(par_within)) = (rule.par_space, rule.par_within) {
        if !has_parallel_edge(index, edge, par_space, par_within, rule.two_sided) {
            return false;
        }
    }
    if let Some(min_len) = rule.min_length {
        if edge.run_length < min_len {
            return false;
        }
    }
    if let Some(max_len) = rule.max_length {
        if edge.run_length > max_len {
            return false;
        }
    }
    if let Some(cut_rule) = &rule.encl_cut {
        if !has_enclosing_cut(index, edge, cut_rule.encl_dist, cut_rule.cut_to_metal_space) {
            return false;
        }
    }
    true
}

/// Looks for a same-direction wire edge running alongside `edge`, within `par_space` laterally
/// and `par_within` along the tip's own axis (the query box of "parSpace × (eolWithin+parWithin)",
/// §4.3.2).
fn has_parallel_edge(index: &RegionIndex, edge: &EolEdge, par_space: Dbu, par_within: Dbu, two_sided: bool) -> bool {
    let side_has_edge = |plus_side: bool| {
        let box_ = side_query_box(edge, par_space, par_within, plus_side);
        index
            .query_max_rectangle(edge.layer_num, box_)
            .into_iter()
            .any(|(r, _)| if edge.outward.is_horizontal() { r.height() > 0 } else { r.width() > 0 })
    };

    if two_sided {
        side_has_edge(true) && side_has_edge(false)
    } else {
        side_has_edge(true) || side_has_edge(false)
    }
}

fn side_query_box(edge: &EolEdge, par_space: Dbu, par_within: Dbu, plus_side: bool) -> Rect {
    let t = edge.tip;
    if edge.outward.is_horizontal() {
        let (yl, yh) = if plus_side { (t.yh, t.yh + par_space) } else { (t.yl - par_space, t.yl) };
        Rect::new(t.xl, yl, t.xh, yh).bloat_xy(par_within, 0)
    } else {
        let (xl, xh) = if plus_side { (t.xh, t.xh + par_space) } else { (t.xl - par_space, t.xl) };
        Rect::new(xl, t.yl, xh, t.yh).bloat_xy(0, par_within)
    }
}

/// Approximates "search the layer above/below for a cut within `cutToMetalSpace`" by probing the
/// two layer numbers adjacent to this routing layer, mirroring the cut/routing interleaving
/// `tech::Technology::finalize` assumes when propagating via enclosures.
fn has_enclosing_cut(index: &RegionIndex, edge: &EolEdge, encl_dist: Dbu, cut_to_metal_space: Dbu) -> bool {
    let query = edge.tip.bloat(encl_dist.max(cut_to_metal_space));
    [edge.layer_num - 1, edge.layer_num + 1]
        .into_iter()
        .any(|neighbor| !index.query_max_rectangle(neighbor, query).is_empty())
}

/// Searches forward, within `(eolWithin × eolSpace)` of `edge`'s tip, for an opposing eol edge and
/// emits a marker on the generalized intersection of the two if one is found.
fn find_opposing(index: &RegionIndex, edge: &EolEdge, rule: &EolRule) -> Vec<Marker> {
    let t = edge.tip;
    let forward_box = match edge.outward {
        Outward::PlusX => Rect::new(t.xh, t.yl - rule.eol_within, t.xh + rule.eol_space, t.yh + rule.eol_within),
        Outward::MinusX => Rect::new(t.xl - rule.eol_space, t.yl - rule.eol_within, t.xl, t.yh + rule.eol_within),
        Outward::PlusY => Rect::new(t.xl - rule.eol_within, t.yh, t.xh + rule.eol_within, t.yh + rule.eol_space),
        Outward::MinusY => Rect::new(t.xl - rule.eol_within, t.yl - rule.eol_space, t.xh + rule.eol_within, t.yl),
    };

    let mut out = Vec::new();
    for (r, handle) in index.query_max_rectangle(edge.layer_num, forward_box) {
        let Handle::Shape(net2, _shape2) = handle else { continue };
        if net2 == edge.net {
            continue;
        }
        if net2 < edge.net {
            continue; // canonical ordering, mirrors the metal-spacing pair dedup.
        }
        // The candidate must look like an opposing tip: thin along the travel axis.
        let thin_enough = if edge.outward.is_horizontal() { r.width() <= rule.eol_within } else { r.height() <= rule.eol_within };
        if !thin_enough {
            continue;
        }
        let gap = t.generalized_intersection(&r);
        out.push(Marker {
            bbox: gap.envelope_rect(),
            layer_num: edge.layer_num,
            constraint: Constraint::EndOfLine,
            victims: vec![Participant { net: edge.net, fixed: false }],
            aggressors: vec![Participant { net: net2, fixed: false }],
        });
    }
    out
}
