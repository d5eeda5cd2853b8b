//! Loads a connectivity guide file into a fresh [`Block`] and seeds the [`RegionIndex`] from it
//! (§4.7). Full LEF/DEF technology ingestion is out of scope (§1 Non-goals); [`default_technology`]
//! stands in with a small representative metal stack until that loader exists.

use std::collections::HashMap;

use design::guide::{self, ParseError};
use design::{Block, PatchWire};
use geom::direction::PrefDir;
use geom::Point;
use index::RegionIndex;
use tech::layer::{Layer, RoutingRules};
use tech::rule::PrlSpacingTable;
use tech::Technology;

/// A three-layer metal stack (M1 vertical, M2 horizontal, M3 vertical) with flat spacing tables,
/// enough to exercise every DRC check at its default settings. Real deployments load this from a
/// LEF file through a collaborator this crate doesn't implement.
pub fn default_technology() -> Technology {
    let mut tech = Technology::new();
    tech.manufacturing_grid = 10;
    tech.add_layer(Layer::routing(1, "M1", PrefDir::Vertical, 140, RoutingRules { prl_spacing: PrlSpacingTable::flat(140), ..Default::default() }));
    tech.add_layer(Layer::routing(3, "M2", PrefDir::Horizontal, 140, RoutingRules { prl_spacing: PrlSpacingTable::flat(140), ..Default::default() }));
    tech.add_layer(Layer::routing(5, "M3", PrefDir::Vertical, 200, RoutingRules { prl_spacing: PrlSpacingTable::flat(200), ..Default::default() }));
    tech.finalize();
    tech
}

pub fn load_guide(text: &str, tech: &Technology, block: &mut Block, index: &mut RegionIndex) -> Result<(), ParseError> {
    let entries = guide::parse(text)?;
    let layer_by_name: HashMap<&str, i32> = tech.layers().map(|(_, l)| (l.name.as_str(), l.number)).collect();

    for entry in entries {
        let net_id = block.add_net(entry.net);
        for guide_rect in entry.rects {
            let Some(&layer_num) = layer_by_name.get(guide_rect.layer_name.as_str()) else {
                log::warn!("guide file references unknown layer {:?}, skipping rect", guide_rect.layer_name);
                continue;
            };
            let origin = Point::new(guide_rect.rect.xl, guide_rect.rect.yl);
            let offset_box = geom::Rect::new(0, 0, guide_rect.rect.width(), guide_rect.rect.height());
            let (net, ids) = block.net_and_ids_mut(net_id);
            let shape_id = net.add_patch_wire(ids, origin, offset_box, layer_num);
            let patch: PatchWire = match net.shape(shape_id) {
                Some(design::shape::Shape::PatchWire(p)) => *p,
                _ => unreachable!("just inserted a patch wire"),
            };
            index.insert(layer_num, patch.bbox(), index::Handle::Shape(net_id, shape_id));
        }
    }
    Ok(())
}
