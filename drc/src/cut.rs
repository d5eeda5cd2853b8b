//! Cut spacing check (§4.3.5): classic and LEF58-class-table spacing between cut rectangles,
//! plus the adjacent-cuts and two-cuts escalation rules.
//!
//! Cuts are never inserted into [`index::RegionIndex`] under their own cut-layer number (a via
//! only ever indexes its bottom/top metal enclosures -- see `repair::shape_bbox`), so this check
//! gathers cut geometry directly from the design instead of querying the spatial index. Designs
//! seen in practice keep cut counts per layer small enough that the pairwise scan this implies is
//! not a bottleneck; DESIGN.md records giving cuts their own index layer as a follow-up.

use design::ids::NetId;
use design::marker::{Constraint, Marker, Participant};
use design::Block;
use geom::Rect;
use rayon::prelude::*;
use tech::rule::CutClass;
use tech::Technology;

struct CutSubject {
    net: NetId,
    rect: Rect,
    class: Option<CutClass>,
}

pub fn check(block: &Block, tech: &Technology, _index: &index::RegionIndex) -> Vec<Marker> {
    let mut by_layer: std::collections::HashMap<i32, Vec<CutSubject>> = std::collections::HashMap::new();

    for (net_id, net) in block.nets() {
        for (_id, via) in net.vias() {
            let def = tech.via_def(via.def);
            let Ok(cut_layer_id) = tech.layer_by_number(def.cut_layer_number) else { continue };
            let cut_layer = tech.layer(cut_layer_id);
            for rect in def.cuts_at(via.origin) {
                let class = classify(&cut_layer.cut_rules.cut_classes, rect);
                by_layer.entry(def.cut_layer_number).or_default().push(CutSubject { net: net_id, rect, class });
            }
        }
    }

    by_layer
        .into_iter()
        .collect::<Vec<_>>()
        .par_iter()
        .flat_map_iter(|(layer_num, subjects)| check_layer(tech, *layer_num, subjects))
        .collect()
}

fn classify(classes: &[CutClass], rect: Rect) -> Option<CutClass> {
    classes.iter().find(|c| c.width == rect.min_width() && c.length == rect.width().max(rect.height())).cloned()
}

fn check_layer(tech: &Technology, layer_num: i32, subjects: &[CutSubject]) -> Vec<Marker> {
    let Ok(layer_id) = tech.layer_by_number(layer_num) else { return Vec::new() };
    let rules = &tech.layer(layer_id).cut_rules;
    let mut markers = Vec::new();

    for i in 0..subjects.len() {
        let within_count = subjects
            .iter()
            .enumerate()
            .filter(|(j, s)| *j != i && within_cut_within(rules, &subjects[i].rect, &s.rect))
            .count();

        for j in (i + 1)..subjects.len() {
            let a = &subjects[i];
            let b = &subjects[j];

            if a.rect.intersects(&b.rect) {
                if a.net != b.net {
                    markers.push(marker(a.rect.intersection(&b.rect).unwrap_or(a.rect), layer_num, a.net, b.net));
                }
                continue;
            }

            let required = required_spacing(rules, a, b, within_count);
            if required <= 0 {
                continue;
            }
            let gap = a.rect.generalized_intersection(&b.rect);
            if gap.dist_sq() < (required as i128) * (required as i128) {
                markers.push(marker(gap.envelope_rect(), layer_num, a.net, b.net));
            }
        }
    }
    markers
}

fn within_cut_within(rules: &tech::rule::CutRules, a: &Rect, b: &Rect) -> bool {
    let gap = a.generalized_intersection(b);
    gap.dist_sq() < (rules.cut_within as i128) * (rules.cut_within as i128)
}

fn required_spacing(rules: &tech::rule::CutRules, a: &CutSubject, b: &CutSubject, within_count: usize) -> geom::Dbu {
    let class_key = |s: &CutSubject| s.class.as_ref().map(|c| c.name.clone()).unwrap_or_default();
    let (k1, k2) = {
        let (ka, kb) = (class_key(a), class_key(b));
        if ka <= kb { (ka, kb) } else { (kb, ka) }
    };
    let table = if a.net == b.net { &rules.same_net_spacing } else { &rules.diff_net_spacing };
    let base = table.get(&(k1, k2)).copied().unwrap_or(rules.classic_spacing).max(rules.cut_within);

    if let Some(adj) = &rules.adjacent_cuts {
        if within_count as u32 >= adj.required_adjacent_cuts {
            return base.max(adj.spacing);
        }
    }
    if let Some(two) = &rules.two_cuts {
        if within_count as u32 >= 2 {
            return base.max(two.spacing);
        }
    }
    base
}

fn marker(bbox: Rect, layer_num: i32, net1: NetId, net2: NetId) -> Marker {
    Marker {
        bbox,
        layer_num,
        constraint: Constraint::CutSpacing,
        victims: vec![Participant { net: net1, fixed: false }],
        aggressors: vec![Participant { net: net2, fixed: false }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use design::ids::IdGen;
    use geom::Point;
    use index::RegionIndex;
    use tech::rule::CutRules;
    use tech::ViaDef;

    /// Scenario 5: two same-class vias on the same net, centers (0,0) and (40,0), under a
    /// classic cut-spacing rule requiring 25 DBU clearance. The cuts themselves are 20x20 boxes
    /// centered on each via origin, so the true edge-to-edge gap is 20 < 25 -- a violation.
    #[test]
    fn close_vias_on_the_same_net_violate_classic_cut_spacing() {
        let mut tech = Technology::new();
        let cut_rules = CutRules {
            classic_spacing: 25,
            cut_within: 0,
            ..CutRules::default()
        };
        tech.add_layer(tech::Layer::cut(3, "V1", cut_rules));
        let via_def = tech.add_via_def(ViaDef {
            name: "Vx".to_string(),
            cut_layer_number: 3,
            bottom_layer_number: 2,
            top_layer_number: 4,
            cuts: vec![Rect::new(-10, -10, 10, 10)],
            bottom_enclosure: Rect::new(-20, -20, 20, 20),
            top_enclosure: Rect::new(-20, -20, 20, 20),
            is_default: true,
            cut_class: None,
        });

        let mut block = Block::new("top");
        let mut ids = IdGen::default();
        let net_id = block.add_net("n1");
        {
            let (net, _) = block.net_and_ids_mut(net_id);
            net.add_via(&mut ids, Point::new(0, 0), via_def, 2, 4);
            net.add_via(&mut ids, Point::new(40, 0), via_def, 2, 4);
        }

        let markers = check(&block, &tech, &RegionIndex::new());
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].layer_num, 3);
        assert_eq!(markers[0].constraint, Constraint::CutSpacing);
    }

    /// Vias far enough apart (gap 60 >= 25) produce no marker.
    #[test]
    fn distant_vias_do_not_violate_cut_spacing() {
        let mut tech = Technology::new();
        let cut_rules = CutRules {
            classic_spacing: 25,
            cut_within: 0,
            ..CutRules::default()
        };
        tech.add_layer(tech::Layer::cut(3, "V1", cut_rules));
        let via_def = tech.add_via_def(ViaDef {
            name: "Vx".to_string(),
            cut_layer_number: 3,
            bottom_layer_number: 2,
            top_layer_number: 4,
            cuts: vec![Rect::new(-10, -10, 10, 10)],
            bottom_enclosure: Rect::new(-20, -20, 20, 20),
            top_enclosure: Rect::new(-20, -20, 20, 20),
            is_default: true,
            cut_class: None,
        });

        let mut block = Block::new("top");
        let mut ids = IdGen::default();
        let net_id = block.add_net("n1");
        {
            let (net, _) = block.net_and_ids_mut(net_id);
            net.add_via(&mut ids, Point::new(0, 0), via_def, 2, 4);
            net.add_via(&mut ids, Point::new(100, 0), via_def, 2, 4);
        }

        let markers = check(&block, &tech, &RegionIndex::new());
        assert!(markers.is_empty());
    }

    proptest::proptest! {
        /// §8 invariant: cut same-net/diff-net consistency -- after [`Technology::finalize`],
        /// every remaining `same_net_spacing` key has a matching `diff_net_spacing` key. Throws
        /// an arbitrary pair of key sets (drawn from a small fixed class vocabulary so the two
        /// sets overlap and diverge in both directions) at `finalize` and checks the invariant
        /// holds no matter which keys started out same-net-only.
        #[test]
        fn finalize_drops_same_net_rules_with_no_diff_net_counterpart(
            same_net_keys in proptest::collection::vec(0usize..4, 0..6),
            diff_net_keys in proptest::collection::vec(0usize..4, 0..6),
        ) {
            const CLASSES: [&str; 4] = ["A", "B", "C", "D"];

            let mut cut_rules = CutRules::default();
            for &i in &same_net_keys {
                cut_rules.same_net_spacing.insert((CLASSES[i].to_string(), CLASSES[i].to_string()), 10);
            }
            for &i in &diff_net_keys {
                cut_rules.diff_net_spacing.insert((CLASSES[i].to_string(), CLASSES[i].to_string()), 10);
            }

            let mut tech = Technology::new();
            tech.add_layer(tech::Layer::cut(3, "V1", cut_rules));
            tech.finalize();

            let layer_id = tech.layer_by_number(3).unwrap();
            let rules = &tech.layer(layer_id).cut_rules;
            for key in rules.same_net_spacing.keys() {
                proptest::prop_assert!(rules.diff_net_spacing.contains_key(key), "same-net key {:?} survived finalize with no diff-net counterpart", key);
            }
        }
    }
}
