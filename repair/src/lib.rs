//! The post-routing connectivity repair engine (C5, §4.2): for every modified net, rebuilds the
//! node graph, runs the cost-driven Steiner search over existing geometry, merges/splits/shrinks
//! segments, deletes orphans, and emits recheck markers -- or fails the whole pass with a
//! structured [`error::FatalConnectivityError`] if a pin is unreachable.
//!
//! Steps A-I are implemented as free functions over one net at a time (§4.2); [`check_connectivity`]
//! is the only entry point the parallel driver (C8) calls, in the net order of
//! [`design::Block::modified_nets`] to keep serial-phase output deterministic (§5).

pub mod error;
pub mod merge;
pub mod node_map;
pub mod search;

use design::ids::{NetId, ShapeId};
use design::marker::Marker;
use design::pin::PinRef;
use design::shape::{PatchWire, PathSegment, Shape};
use design::{Block, Net};
use geom::{Point, Rect};
use index::{Handle, RegionIndex};
use tech::{RouterConfig, Technology};

pub use error::{FatalConnectivityError, Result};

/// Runs `checkConnectivity` (§4.2) over every modified net in `block`. Nets are processed in
/// ascending `NetId` order; a net whose search fails is recorded but does not stop the others
/// from being attempted, matching §4.5's "any fatal connectivity failure is recorded and raised
/// only after the batch completes". Returns `Ok(())` if every modified net repaired cleanly, or
/// the full list of failures otherwise.
pub fn check_connectivity(block: &mut Block, tech: &Technology, config: &RouterConfig, index: &mut RegionIndex) -> std::result::Result<(), Vec<FatalConnectivityError>> {
    let net_ids: Vec<NetId> = block.modified_nets().map(|(id, _)| id).collect();
    repair_nets(block, tech, config, index, &net_ids)
}

/// Runs Steps A-I over exactly the given nets, in the order given. The parallel driver (C8) calls
/// this once per batch rather than [`check_connectivity`] so it controls the batch partition
/// itself; a net whose search fails is recorded but does not stop the rest of the batch.
pub fn repair_nets(block: &mut Block, tech: &Technology, config: &RouterConfig, index: &mut RegionIndex, net_ids: &[NetId]) -> std::result::Result<(), Vec<FatalConnectivityError>> {
    let mut failures = Vec::new();

    for &net_id in net_ids {
        match repair_net(block, tech, config, index, net_id) {
            Ok(()) => block.net_mut(net_id).modified = false,
            Err(e) => failures.push(e),
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}

fn shape_bbox(shape: &Shape, tech: &Technology) -> Rect {
    match shape {
        Shape::PathSegment(s) => s.bbox(),
        Shape::PatchWire(p) => p.bbox(),
        Shape::Via(v) => {
            let def = tech.via_def(v.def);
            let bottom = def.bottom_enclosure_at(v.origin);
            let top = def.top_enclosure_at(v.origin);
            Rect::new(
                bottom.xl.min(top.xl),
                bottom.yl.min(top.yl),
                bottom.xh.max(top.xh),
                bottom.yh.max(top.yh),
            )
        }
    }
}

fn pin_name(block: &Block, pin: PinRef) -> String {
    match pin {
        PinRef::BlockTerm(id) => block.term(id).name.clone(),
        PinRef::InstanceTerm(inst, id) => format!("{}/{}", block.instance(inst).name, block.instance(inst).term(id).name),
    }
}

/// One net through Steps A-I (§4.2). `block` and `index` are mutated only in the serial
/// sub-phases (B, F, G, H, I); C-E are a pure read of the post-merge state.
fn repair_net(block: &mut Block, tech: &Technology, config: &RouterConfig, index: &mut RegionIndex, net_id: NetId) -> Result<()> {
    // Step A + B: merge overlapping collinear same-track segments.
    let spans = merge::plan_merges(block.net(net_id));
    for span in &spans {
        for &victim in &span.victims {
            index.erase(span.layer_num, Handle::Shape(net_id, victim));
        }
        let (surviving, merged, _removed) = merge::commit_merge(block.net_mut(net_id), span);
        index.insert(span.layer_num, merged.bbox(), Handle::Shape(net_id, surviving));
    }

    // Step C: node map.
    let map = node_map::build(block, block.net(net_id), tech, config);

    // Step D: graph.
    let graph = search::Graph::build(&map);

    // Step E: repair search.
    let pin_nodes: Vec<node_map::NodeId> = map
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_pin())
        .map(|(i, _)| i)
        .collect();

    let on_path = match search::repair_search(&graph, &map, &pin_nodes) {
        Ok(set) => set,
        Err(unreachable) => {
            let unreachable_pins: Vec<String> = unreachable
                .into_iter()
                .map(|idx| match map.nodes[idx] {
                    node_map::Node::Pin(p) => pin_name(block, p),
                    node_map::Node::Shape(_) => unreachable!("only pin nodes are ever reported unreachable"),
                })
                .collect();
            return Err(FatalConnectivityError {
                net: net_id,
                net_name: block.net(net_id).name.clone(),
                unreachable_pins,
            });
        }
    };

    // Step F: prune orphans.
    let mut orphans: Vec<(ShapeId, i32, Rect)> = Vec::new();
    for (node_idx, node) in map.nodes.iter().enumerate() {
        if on_path.contains(&node_idx) {
            continue;
        }
        if let node_map::Node::Shape(shape_id) = node {
            if let Some(shape) = block.net(net_id).shape(*shape_id) {
                for layer_num in shape.layer_numbers() {
                    orphans.push((*shape_id, layer_num, shape_bbox(shape, tech)));
                }
            }
        }
    }
    for (shape_id, layer_num, bbox) in &orphans {
        index.erase(*layer_num, Handle::Shape(net_id, *shape_id));
        block.add_marker(Marker::recheck(*bbox, *layer_num, net_id));
    }
    for (shape_id, _, _) in &orphans {
        block.net_mut(net_id).remove_shape(*shape_id);
    }

    // Step G: split surviving segments at interior feedthrough pins.
    split_feedthrough_pins(block, index, &map, net_id);

    // Step H: shrink surviving segments to their referenced extremes.
    shrink_segments(block, index, &map, net_id);

    // Step I: sweep patch-wires with no surviving coincident endpoint.
    sweep_patch_wires(block, index, net_id);

    Ok(())
}

/// Step G (§4.2): a pin whose access point lies in the interior (not at an endpoint) of a
/// surviving path-segment forces a split there; both halves are truncated at the new point.
fn split_feedthrough_pins(block: &mut Block, index: &mut RegionIndex, map: &node_map::NodeMap, net_id: NetId) {
    let pin_points: Vec<(Point, i32)> = map
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_pin())
        .flat_map(|(idx, _)| map.points_of(idx))
        .collect();

    // Collect split points per currently-live segment first (segment ids may shrink in number as
    // we rewrite, so do the whole plan against a stable snapshot, then apply descending within
    // each segment to keep earlier split points valid, §4.2 Step G).
    let segments: Vec<(ShapeId, PathSegment)> = block.net(net_id).path_segments().map(|(id, s)| (id, *s)).collect();

    for (shape_id, seg) in segments {
        let mut splits: Vec<Point> = pin_points
            .iter()
            .filter(|(p, layer)| *layer == seg.layer_num && point_in_interior(&seg, *p))
            .map(|(p, _)| *p)
            .collect();
        if splits.is_empty() {
            continue;
        }
        splits.sort();
        splits.dedup();

        index.erase(seg.layer_num, Handle::Shape(net_id, shape_id));
        block.net_mut(net_id).remove_shape(shape_id);

        let mut prev = seg.begin;
        let mut prev_style = seg.style_begin;
        for &split in &splits {
            let (net, ids) = block.net_and_ids_mut(net_id);
            let new_id = net
                .add_path_segment(ids, prev, split, seg.layer_num, seg.half_width, prev_style, geom::direction::EndStyle::Truncate)
                .expect("split-derived segment is always well formed");
            let bbox = match net.shape(new_id) {
                Some(Shape::PathSegment(s)) => s.bbox(),
                _ => unreachable!("just inserted a path segment"),
            };
            index.insert(seg.layer_num, bbox, Handle::Shape(net_id, new_id));
            prev = split;
            prev_style = geom::direction::EndStyle::Truncate;
        }
        let (net, ids) = block.net_and_ids_mut(net_id);
        let last_id = net
            .add_path_segment(ids, prev, seg.end, seg.layer_num, seg.half_width, prev_style, seg.style_end)
            .expect("split-derived segment is always well formed");
        let bbox = match net.shape(last_id) {
            Some(Shape::PathSegment(s)) => s.bbox(),
            _ => unreachable!("just inserted a path segment"),
        };
        index.insert(seg.layer_num, bbox, Handle::Shape(net_id, last_id));
    }
}

fn point_in_interior(seg: &PathSegment, p: Point) -> bool {
    if seg.is_horizontal() {
        p.y == seg.begin.y && seg.begin.x < p.x && p.x < seg.end.x
    } else {
        p.x == seg.begin.x && seg.begin.y < p.y && p.y < seg.end.y
    }
}

/// Step H (§4.2): shrinks each surviving path-segment to the extreme points its original node
/// still references, keyed by the pre-split node map (segments created by Step G are already
/// truncated to exactly their referenced extremes and are skipped).
fn shrink_segments(block: &mut Block, index: &mut RegionIndex, map: &node_map::NodeMap, net_id: NetId) {
    // Map from original ShapeId -> its node index, so we can look up referenced extremes; only
    // covers segments that survived Steps A/B/F unchanged (split-derived segments have no entry
    // here and don't need shrinking).
    let mut node_of_shape: std::collections::HashMap<ShapeId, node_map::NodeId> = std::collections::HashMap::new();
    for (idx, node) in map.nodes.iter().enumerate() {
        if let node_map::Node::Shape(shape_id) = node {
            node_of_shape.insert(*shape_id, idx);
        }
    }

    let segments: Vec<(ShapeId, PathSegment)> = block.net(net_id).path_segments().map(|(id, s)| (id, *s)).collect();
    for (shape_id, seg) in segments {
        let Some(&node_idx) = node_of_shape.get(&shape_id) else {
            continue;
        };
        let points = map.points_of(node_idx);
        if points.is_empty() {
            continue;
        }
        let (lo, hi) = if seg.is_horizontal() {
            let lo = points.iter().map(|(p, _)| p.x).min().unwrap();
            let hi = points.iter().map(|(p, _)| p.x).max().unwrap();
            (lo, hi)
        } else {
            let lo = points.iter().map(|(p, _)| p.y).min().unwrap();
            let hi = points.iter().map(|(p, _)| p.y).max().unwrap();
            (lo, hi)
        };
        let (cur_lo, cur_hi) = seg.extent();
        if lo <= cur_lo && cur_hi <= hi {
            continue;
        }
        let new_lo = lo.max(cur_lo).min(cur_hi);
        let new_hi = hi.min(cur_hi).max(cur_lo);
        let (begin, end) = if seg.is_horizontal() {
            (Point::new(new_lo, seg.begin.y), Point::new(new_hi, seg.begin.y))
        } else {
            (Point::new(seg.begin.x, new_lo), Point::new(seg.begin.x, new_hi))
        };
        if begin == seg.begin && end == seg.end {
            continue;
        }
        let old_bbox = seg.bbox();
        let shrunk = seg.with_extent(begin, end, seg.style_begin, seg.style_end);
        index.erase(seg.layer_num, Handle::Shape(net_id, shape_id));
        block.net_mut(net_id).rewrite_path_segment(shape_id, shrunk);
        index.insert(seg.layer_num, shrunk.bbox(), Handle::Shape(net_id, shape_id));
        block.add_marker(Marker::recheck(old_bbox, seg.layer_num, net_id));
    }
}

/// Step I (§4.2): deletes any patch-wire whose origin is not coincident with a surviving
/// path-segment endpoint or via origin on its layer.
fn sweep_patch_wires(block: &mut Block, index: &mut RegionIndex, net_id: NetId) {
    let net = block.net(net_id);
    let mut surviving_points: std::collections::HashSet<(Point, i32)> = std::collections::HashSet::new();
    for (_, seg) in net.path_segments() {
        surviving_points.insert((seg.begin, seg.layer_num));
        surviving_points.insert((seg.end, seg.layer_num));
    }
    for (_, via) in net.vias() {
        surviving_points.insert((via.origin, via.bottom_layer_num));
        surviving_points.insert((via.origin, via.top_layer_num));
    }

    let stale: Vec<(ShapeId, i32, Rect)> = net
        .patch_wires()
        .filter(|(_, p)| !surviving_points.contains(&(p.origin, p.layer_num)))
        .map(|(id, p): (ShapeId, &PatchWire)| (id, p.layer_num, p.bbox()))
        .collect();

    for (shape_id, layer_num, _bbox) in &stale {
        index.erase(*layer_num, Handle::Shape(net_id, *shape_id));
    }
    for (shape_id, _, _) in &stale {
        block.net_mut(net_id).remove_shape(*shape_id);
    }
}

/// Rebuilds the region index entries for every shape currently owned by `net` -- used once at
/// load time (ingestion is external, §1, but something has to seed the index for tests/the CLI).
pub fn reindex_net(block: &Block, tech: &Technology, index: &mut RegionIndex, net_id: NetId) {
    let net: &Net = block.net(net_id);
    for (shape_id, shape) in net.shapes() {
        for layer_num in shape.layer_numbers() {
            index.insert(layer_num, shape_bbox(shape, tech), Handle::Shape(net_id, shape_id));
        }
    }
}
