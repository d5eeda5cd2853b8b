//! Steps D and E of connectivity repair (§4.2): builds the undirected connectivity graph over
//! the node map, then runs the cost-driven Prim/Steiner search that connects every pin.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::node_map::{Node, NodeId, NodeMap};

/// An undirected adjacency list over `NodeMap::nodes`; duplicate edges collapse naturally since
/// neighbor sets are `HashSet`s (§4.2 Step D: "the graph is a multigraph but duplicate edges may
/// be collapsed").
#[derive(Debug)]
pub struct Graph {
    adjacency: Vec<HashSet<NodeId>>,
}

impl Graph {
    pub fn build(map: &NodeMap) -> Self {
        let mut adjacency = vec![HashSet::new(); map.nodes.len()];
        for key in map.all_keys() {
            let nodes = map.points_at(key.0, key.1);
            for i in 0..nodes.len() {
                for j in (i + 1)..nodes.len() {
                    let (a, b) = (nodes[i], nodes[j]);
                    if a != b {
                        adjacency[a].insert(b);
                        adjacency[b].insert(a);
                    }
                }
            }
        }
        Graph { adjacency }
    }

    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency[node].iter().copied()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }
}

/// Priority-queue entry ordered so that a [`BinaryHeap`] (a max-heap) pops the *lowest* cost
/// first, and ties break on *descending* node index (§4.2 Step E, §5 Determinism).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PqItem {
    cost: i64,
    node: NodeId,
}

impl Ord for PqItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.cmp(&self.cost).then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for PqItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

const FEEDTHROUGH_PIN_PENALTY: i64 = 5;
const EDGE_COST: i64 = 1;

/// Runs the repair search: repeatedly grows `on_path` from the first pin until every pin in
/// `pins` is connected, or returns the set of pins that could never be reached.
///
/// Each outer iteration is a multi-source Dijkstra seeded from every node already `on_path`; it
/// terminates as soon as it pops an unvisited pin, which becomes that iteration's target, and the
/// path back to the tree is flipped `on_path` before the next iteration restarts (§4.2 Step E).
pub fn repair_search(graph: &Graph, map: &NodeMap, pins: &[NodeId]) -> Result<HashSet<NodeId>, Vec<NodeId>> {
    let mut on_path: HashSet<NodeId> = HashSet::new();
    if pins.is_empty() {
        return Ok(on_path);
    }
    on_path.insert(pins[0]);
    let mut remaining: HashSet<NodeId> = pins[1..].iter().copied().collect();

    while !remaining.is_empty() {
        let mut dist = vec![i64::MAX; graph.node_count()];
        let mut parent = vec![None; graph.node_count()];
        let mut finalized = vec![false; graph.node_count()];
        let mut heap = BinaryHeap::new();

        for &n in &on_path {
            dist[n] = 0;
            heap.push(PqItem { cost: 0, node: n });
        }

        let mut target = None;
        while let Some(PqItem { cost, node }) = heap.pop() {
            if finalized[node] {
                continue;
            }
            finalized[node] = true;
            if remaining.contains(&node) {
                target = Some(node);
                break;
            }
            for nb in graph.neighbors(node) {
                if finalized[nb] {
                    continue;
                }
                let edge_cost = if on_path.contains(&nb) {
                    0
                } else if remaining.contains(&nb) {
                    FEEDTHROUGH_PIN_PENALTY
                } else {
                    EDGE_COST
                };
                let nd = cost + edge_cost;
                if nd < dist[nb] {
                    dist[nb] = nd;
                    parent[nb] = Some(node);
                    heap.push(PqItem { cost: nd, node: nb });
                }
            }
        }

        match target {
            None => {
                let unreachable: Vec<NodeId> = remaining.into_iter().collect();
                return Err(unreachable);
            }
            Some(t) => {
                remaining.remove(&t);
                on_path.insert(t);
                // Back-trace parent pointers, flipping every ancestor `on_path`; the chain
                // always terminates at a node that was already a Dijkstra source (dist 0).
                let mut cur = t;
                while let Some(p) = parent[cur] {
                    on_path.insert(p);
                    cur = p;
                }
            }
        }
    }

    debug_assert!(pins.iter().all(|p| map.nodes[*p].is_pin()));
    Ok(on_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_map::Node;
    use design::ids::TermId;
    use design::pin::PinRef;

    fn pin_node_map(pin_nodes: &[NodeId], total: usize) -> NodeMap {
        let mut nodes = vec![Node::Shape(design::ids::ShapeId::from_raw(0)); total];
        for (i, &p) in pin_nodes.iter().enumerate() {
            nodes[p] = Node::Pin(PinRef::BlockTerm(TermId::from_raw(i as u32)));
        }
        NodeMap { nodes, ..NodeMap::default() }
    }

    fn line_graph(edges: &[(NodeId, NodeId)], node_count: usize) -> Graph {
        let mut adjacency = vec![HashSet::new(); node_count];
        for &(a, b) in edges {
            adjacency[a].insert(b);
            adjacency[b].insert(a);
        }
        Graph { adjacency }
    }

    /// A 3-node path 0-1-2 with 0 and 2 as pins: the search must pull node 1 onto the path too.
    #[test]
    fn connects_a_simple_path_between_two_pins() {
        let graph = line_graph(&[(0, 1), (1, 2)], 3);
        let map = pin_node_map(&[0, 2], 3);

        let on_path = repair_search(&graph, &map, &[0, 2]).expect("0 and 2 are connected via 1");
        assert_eq!(on_path, HashSet::from([0, 1, 2]));
    }

    /// Node 3 has no edges at all: a pin placed there can never be reached.
    #[test]
    fn reports_pins_with_no_path_as_unreachable() {
        let graph = line_graph(&[(0, 1)], 4);
        let map = pin_node_map(&[0, 3], 4);

        let unreachable = repair_search(&graph, &map, &[0, 3]).expect_err("node 3 is isolated");
        assert_eq!(unreachable, vec![3]);
    }
}
