//! Metal shape check (§4.3.4): min-width, min-step, rect-only, off-grid and min-enclosed-area,
//! all evaluated against a shape's own maximal rectangle.
//!
//! The design model represents every shape as a single rectangle already (§3 Ownership; see the
//! simplification note on [`index::RegionIndex`]), so "slice the polygon into rectangles" and
//! "decompose into maximal rectangles" are no-ops here: there is exactly one rectangle per shape,
//! and rect-only can never fire because there is no multi-rectangle polygon to flag. Min-step and
//! min-enclosed-area, which are properties of a *merged* same-net polygon, are checked on the
//! shape's own extent as the single-segment approximation of that polygon.

use design::marker::{Constraint, Marker, Participant};
use design::shape::{PathSegment, Shape};
use design::Block;
use rayon::prelude::*;
use tech::Technology;

pub fn check(block: &Block, tech: &Technology, _index: &index::RegionIndex) -> Vec<Marker> {
    let subjects: Vec<(design::NetId, design::ShapeId)> = block
        .nets()
        .flat_map(|(net_id, net)| net.shapes().map(move |(shape_id, _)| (net_id, shape_id)))
        .collect();

    subjects
        .par_iter()
        .flat_map_iter(|&(net_id, shape_id)| check_one(block, tech, net_id, shape_id))
        .collect()
}

fn check_one(block: &Block, tech: &Technology, net_id: design::NetId, shape_id: design::ShapeId) -> Vec<Marker> {
    let net = block.net(net_id);
    let Some(shape) = net.shape(shape_id) else { return Vec::new() };
    let mut markers = Vec::new();
    for layer_num in shape.layer_numbers() {
        let Ok(layer_id) = tech.layer_by_number(layer_num) else { continue };
        let layer = tech.layer(layer_id);
        let rect = super::shape_rect(shape, tech, layer_num);

        if layer.min_width > 0 && rect.min_width() > 0 && rect.min_width() < layer.min_width {
            markers.push(marker(rect, layer_num, Constraint::MinWidth, net_id));
        }

        if tech.manufacturing_grid > 0 && layer.routing_rules.off_grid_check && !rect.is_on_grid(tech.manufacturing_grid) {
            markers.push(marker(rect, layer_num, Constraint::OffGrid, net_id));
        }

        if layer.min_area > 0 && rect.area() > 0 && rect.area() < layer.min_area {
            markers.push(marker(rect, layer_num, Constraint::MinEnclosedArea, net_id));
        }

        if let Shape::PathSegment(seg) = shape {
            if let Some(step) = min_step_violation(layer, seg) {
                markers.push(marker(step, layer_num, Constraint::MinStep, net_id));
            }
        }
    }
    markers
}

fn min_step_violation(layer: &tech::Layer, seg: &PathSegment) -> Option<geom::Rect> {
    let rule = layer.routing_rules.min_step.as_ref()?;
    let run_length = if seg.is_horizontal() { seg.end.x - seg.begin.x } else { seg.end.y - seg.begin.y };
    if run_length >= rule.min_step_length {
        return None;
    }
    if let Some(max_len) = rule.max_length {
        if run_length <= max_len {
            return None;
        }
    }
    if rule.no_between_eol {
        let width = seg.half_width * 2;
        if width >= layer.routing_rules.eol_width {
            return None; // not flanked by genuine eol edges, so the stricter no-between-eol form doesn't apply.
        }
    }
    Some(seg.bbox())
}

fn marker(bbox: geom::Rect, layer_num: i32, constraint: Constraint, net: design::NetId) -> Marker {
    Marker {
        bbox,
        layer_num,
        constraint,
        victims: vec![Participant { net, fixed: false }],
        aggressors: Vec::new(),
    }
}
