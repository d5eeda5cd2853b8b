//! The technology model: routing/cut/masterslice layers, their rule sets, via definitions, and
//! the [`RouterConfig`] that carries every run-time flag the engines consult.
//!
//! Nothing in this crate is performance-critical; it is built once at start-up and handed to the
//! repair and DRC engines by shared reference.

pub mod config;
pub mod error;
pub mod layer;
pub mod rule;
pub mod via;

pub use config::RouterConfig;
pub use error::{Error, Result};
pub use layer::{Layer, LayerId, LayerKind};
pub use via::{ViaDef, ViaDefId};

use std::collections::HashMap;

use itertools::Itertools;

/// The full set of layers and via definitions for a process node.
///
/// `Technology` owns every [`Layer`] and [`ViaDef`]; everything else refers to them by
/// [`LayerId`] / [`ViaDefId`], following the handle-not-reference convention used for every
/// cross-object link in the crate (see `design::Shape` for the same pattern on the net side).
#[derive(Debug, Clone, Default)]
pub struct Technology {
    layers: Vec<Layer>,
    layers_by_number: HashMap<i32, LayerId>,
    via_defs: Vec<ViaDef>,
    /// The manufacturing grid in DBUs; `0` disables the off-grid check (§4.3.4).
    pub manufacturing_grid: geom::Dbu,
}

impl Technology {
    pub fn new() -> Self {
        Technology::default()
    }

    pub fn add_layer(&mut self, layer: Layer) -> LayerId {
        let id = LayerId(self.layers.len() as u32);
        self.layers_by_number.insert(layer.number, id);
        self.layers.push(layer);
        id
    }

    pub fn add_via_def(&mut self, via: ViaDef) -> ViaDefId {
        let id = ViaDefId(self.via_defs.len() as u32);
        self.via_defs.push(via);
        id
    }

    pub fn layer(&self, id: LayerId) -> &Layer {
        &self.layers[id.0 as usize]
    }

    pub fn layer_mut(&mut self, id: LayerId) -> &mut Layer {
        &mut self.layers[id.0 as usize]
    }

    pub fn layer_by_number(&self, number: i32) -> Result<LayerId> {
        self.layers_by_number
            .get(&number)
            .copied()
            .ok_or(Error::UnknownLayer { number })
    }

    pub fn via_def(&self, id: ViaDefId) -> &ViaDef {
        &self.via_defs[id.0 as usize]
    }

    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layers
            .iter()
            .enumerate()
            .map(|(i, l)| (LayerId(i as u32), l))
    }

    pub fn routing_layers(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layers().filter(|(_, l)| l.kind == LayerKind::Routing)
    }

    /// The lowest-numbered routing layer, used as the default for
    /// [`RouterConfig::planar_endpoint_exempt_layer`] when the config omits it.
    pub fn bottom_routing_layer_number(&self) -> Option<i32> {
        self.routing_layers().map(|(_, l)| l.number).sorted().next()
    }

    /// Runs the via-post-processing pass described for technology initialization: selects a
    /// default via for every cut layer that doesn't already have one, preferring
    /// `(is_default, bottom_enclosure_width, top_enclosure_width, aligns_with_pref_dir)` in that
    /// order, and propagates inter-layer cut-spacing fallbacks (a missing diff-net rule disables
    /// the corresponding same-net rule, per the technology invariant).
    pub fn finalize(&mut self) {
        for layer_idx in 0..self.layers.len() {
            if self.layers[layer_idx].kind != LayerKind::Cut {
                continue;
            }
            if self.layers[layer_idx].default_via.is_some() {
                continue;
            }
            let layer_number = self.layers[layer_idx].number;
            let best = self
                .via_defs
                .iter()
                .enumerate()
                .filter(|(_, v)| v.cut_layer_number == layer_number)
                .sorted_by_key(|(_, v)| {
                    (
                        !v.is_default,
                        v.bottom_enclosure.width(),
                        v.top_enclosure.width(),
                        v.name.clone(),
                    )
                })
                .next()
                .map(|(i, _)| ViaDefId(i as u32));
            self.layers[layer_idx].default_via = best;

            let same_net_rules_without_diff_net: Vec<_> = self.layers[layer_idx]
                .cut_rules
                .same_net_spacing
                .keys()
                .filter(|k| !self.layers[layer_idx].cut_rules.diff_net_spacing.contains_key(*k))
                .cloned()
                .collect();
            for key in same_net_rules_without_diff_net {
                log::warn!(
                    "cut layer {layer_number}: same-net spacing rule for {key:?} has no diff-net \
                     counterpart, disabling it"
                );
                self.layers[layer_idx].cut_rules.same_net_spacing.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::RoutingRules;
    use geom::direction::PrefDir;

    fn routing_layer(number: i32) -> Layer {
        Layer::routing(number, format!("M{number}"), PrefDir::Horizontal, 140, RoutingRules::default())
    }

    #[test]
    fn bottom_routing_layer_is_the_lowest_number() {
        let mut tech = Technology::new();
        tech.add_layer(routing_layer(4));
        tech.add_layer(routing_layer(2));
        tech.add_layer(routing_layer(6));
        assert_eq!(tech.bottom_routing_layer_number(), Some(2));
    }

    #[test]
    fn unknown_layer_number_is_an_error() {
        let tech = Technology::new();
        assert!(matches!(
            tech.layer_by_number(7),
            Err(Error::UnknownLayer { number: 7 })
        ));
    }
}
