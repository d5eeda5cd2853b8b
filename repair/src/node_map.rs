//! Step C of connectivity repair (§4.2): builds the `(point, layer) -> {nodeId}` map and the
//! flat node list `[netRouteObjs…, netPins…]` the rest of the pipeline indexes into.

use std::collections::HashMap;

use design::ids::ShapeId;
use design::pin::PinRef;
use design::shape::Shape;
use design::{Block, Net};
use geom::Point;
use tech::{RouterConfig, Technology};

pub type NodeId = usize;

/// One entry in the combined `[netRouteObjs…, netPins…]` list (§4.2 Step C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Shape(ShapeId),
    Pin(PinRef),
}

impl Node {
    pub fn is_pin(&self) -> bool {
        matches!(self, Node::Pin(_))
    }
}

/// The result of Step C: a flat node list and the point -> node-indices map used to build the
/// connectivity graph (Step D) and to shrink segments (Step H).
#[derive(Debug, Default)]
pub struct NodeMap {
    pub nodes: Vec<Node>,
    pub(crate) points: HashMap<(Point, i32), Vec<NodeId>>,
}

impl NodeMap {
    pub fn points_at(&self, point: Point, layer_num: i32) -> &[NodeId] {
        self.points.get(&(point, layer_num)).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn all_keys(&self) -> impl Iterator<Item = &(Point, i32)> {
        self.points.keys()
    }

    fn push(&mut self, point: Point, layer_num: i32, node: NodeId) {
        let bucket = self.points.entry((point, layer_num)).or_default();
        if !bucket.contains(&node) {
            bucket.push(node);
        }
    }
}

impl NodeMap {
    /// Every `(point, layer)` key that `node` is recorded under. Used by Steps G/H, which need
    /// to go from a node back to the geometry it was matched against.
    pub fn points_of(&self, node: NodeId) -> Vec<(Point, i32)> {
        self.all_keys().filter(|k| self.points_at(k.0, k.1).contains(&node)).copied().collect()
    }
}

/// Builds the node map for `net`. Only path-segments and vias become graph nodes (`netRouteObjs`
/// per §4.2); patch-wires are swept separately in Step I and contribute nothing here.
pub fn build(block: &Block, net: &Net, tech: &Technology, config: &RouterConfig) -> NodeMap {
    let mut map = NodeMap::default();

    // netRouteObjs, in ascending ShapeId order (Step C combined-list order, and the A* tie-break
    // of Step E keys on this same index, §5 Determinism).
    let mut path_segments: Vec<(ShapeId, NodeId, Point, Point, i32)> = Vec::new();
    for (shape_id, shape) in net.shapes() {
        match shape {
            Shape::PathSegment(seg) => {
                let idx = map.nodes.len();
                map.nodes.push(Node::Shape(shape_id));
                map.push(seg.begin, seg.layer_num, idx);
                map.push(seg.end, seg.layer_num, idx);
                path_segments.push((shape_id, idx, seg.begin, seg.end, seg.layer_num));
            }
            Shape::Via(via) => {
                let idx = map.nodes.len();
                map.nodes.push(Node::Shape(shape_id));
                map.push(via.origin, via.bottom_layer_num, idx);
                map.push(via.origin, via.top_layer_num, idx);
                probe_t_junction(&mut map, &path_segments, via.origin, via.bottom_layer_num);
                probe_t_junction(&mut map, &path_segments, via.origin, via.top_layer_num);
            }
            Shape::PatchWire(_) => {}
        }
    }

    // T-junction detection for path-segment endpoints (§4.2 Step C): a segment's endpoint may
    // land in the strict interior of another segment on the same layer, forming a crossing that
    // the node map must record without physically splitting either segment yet.
    for &(_, _, begin, _, layer_num) in &path_segments {
        probe_t_junction(&mut map, &path_segments, begin, layer_num);
    }
    for &(_, _, _, end, layer_num) in &path_segments {
        probe_t_junction(&mut map, &path_segments, end, layer_num);
    }

    // Pins: appended after every route object, per the combined-list order. A pin's access
    // point is any already-collected node-map point that falls inside its term's access box,
    // expanded to a min-width square to tolerate near-miss access (§4.2 Step C). Below
    // `exempt_layer` (§9's open question, named rather than hard-coded as layer 2) the raw,
    // unexpanded access box is tried as a fallback so a planar endpoint just outside a small
    // pin shape is still accepted.
    let exempt_layer = config.planar_endpoint_exempt_layer(tech);

    for &pin in &net.pins {
        let pin_idx = map.nodes.len();
        map.nodes.push(Node::Pin(pin));
        for (rect, layer_num) in access_boxes(block, pin) {
            // A feedthrough pin (GLOSSARY: access point in the interior of a wire, not at an
            // endpoint) may have no node-map key yet at all: nothing else crosses it. Probe the
            // canonical access point against the layer's path-segments first, exactly as a
            // T-junction would, so Step G has a key to split at even when nothing else does.
            probe_t_junction(&mut map, &path_segments, rect.center(), layer_num);

            let min_width = tech
                .layer_by_number(layer_num)
                .map(|id| tech.layer(id).min_width)
                .unwrap_or(0);
            let expanded = rect.bloat(min_width / 2);
            let candidate_points: Vec<Point> = map
                .all_keys()
                .filter(|(_, l)| *l == layer_num)
                .map(|(p, _)| *p)
                .filter(|p| expanded.contains_point(*p) || (layer_num <= exempt_layer && rect.contains_point(*p)))
                .collect();
            for p in candidate_points {
                map.push(p, layer_num, pin_idx);
            }
        }
    }

    map
}

fn access_boxes(block: &Block, pin: PinRef) -> Vec<(geom::Rect, i32)> {
    match pin {
        PinRef::BlockTerm(term_id) => block.term(term_id).access_boxes.clone(),
        PinRef::InstanceTerm(inst_id, term_id) => block.instance(inst_id).term(term_id).access_boxes.clone(),
    }
}

fn probe_t_junction(map: &mut NodeMap, path_segments: &[(ShapeId, NodeId, Point, Point, i32)], point: Point, layer_num: i32) {
    for &(_, node_idx, begin, end, seg_layer) in path_segments {
        if seg_layer != layer_num {
            continue;
        }
        if begin.y == end.y {
            // Horizontal segment: strictly contains `point.x` at track `begin.y`.
            if point.y == begin.y && begin.x < point.x && point.x < end.x {
                map.push(point, layer_num, node_idx);
            }
        } else if begin.x == end.x {
            // Vertical segment: strictly contains `point.y` at track `begin.x`.
            if point.x == begin.x && begin.y < point.y && point.y < end.y {
                map.push(point, layer_num, node_idx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use design::ids::{IdGen, NetId, TermId};
    use design::pin::{IoType, PinRef, SigType};
    use design::term::Term;
    use design::{Block, Net};
    use geom::direction::{EndStyle, PrefDir};
    use geom::Rect;
    use tech::layer::{Layer, RoutingRules};
    use tech::{RouterConfig, Technology};

    fn one_layer_tech() -> Technology {
        let mut tech = Technology::new();
        tech.add_layer(Layer::routing(2, "M1", PrefDir::Horizontal, 140, RoutingRules::default()));
        tech
    }

    /// Scenario 2 (T-junction split): a horizontal and a vertical segment cross at (500,500)
    /// without either endpoint landing there; both indices must share that node-map key, and
    /// neither segment is itself split (that only happens later, and only for a *pin*, in Step G).
    #[test]
    fn t_junction_crossing_shares_one_node_map_key() {
        let mut ids = IdGen::default();
        let mut net = Net::new(NetId::from_raw(0), "n1");
        net.add_path_segment(&mut ids, Point::new(0, 500), Point::new(1000, 500), 2, 70, EndStyle::Extend, EndStyle::Extend).unwrap();
        net.add_path_segment(&mut ids, Point::new(500, 500), Point::new(500, 1500), 2, 70, EndStyle::Extend, EndStyle::Extend).unwrap();

        let block = Block::new("top");
        let tech = one_layer_tech();
        let config = RouterConfig::default();
        let map = build(&block, &net, &tech, &config);

        let at_junction = map.points_at(Point::new(500, 500), 2);
        assert_eq!(at_junction.len(), 2, "both segment nodes should be keyed at the crossing point");
    }

    /// Scenario 3's prerequisite: a pin whose access point falls in the strict interior of a
    /// segment (no other geometry touches it) must still register a shared node-map key, so the
    /// later feedthrough-pin split (Step G) has something to act on.
    #[test]
    fn feedthrough_pin_registers_a_node_at_its_interior_access_point() {
        let mut ids = IdGen::default();
        let mut block = Block::new("top");
        let term_id: TermId = block.add_term(
            Term::new("P", SigType::Signal, IoType::Input).with_access_box(Rect::new(500, 500, 500, 500), 2),
        );

        let mut net = Net::new(NetId::from_raw(0), "n1");
        net.add_path_segment(&mut ids, Point::new(0, 500), Point::new(1000, 500), 2, 70, EndStyle::Extend, EndStyle::Extend).unwrap();
        net.add_pin(PinRef::BlockTerm(term_id));

        let tech = one_layer_tech();
        let config = RouterConfig::default();
        let map = build(&block, &net, &tech, &config);

        let at_pin = map.points_at(Point::new(500, 500), 2);
        assert_eq!(at_pin.len(), 2, "segment node and pin node should both key at the feedthrough point");
        assert!(at_pin.iter().any(|&i| map.nodes[i].is_pin()));
    }
}
