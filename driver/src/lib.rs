//! The parallel batch driver (C8, §4.5): partitions modified nets into batches of at most
//! [`BATCH_SIZE`] and runs each batch's phases in the fixed order the spec lays out, then runs the
//! DRC engine once over the repaired design.
//!
//! Per-batch parallelism here is the merge-planning read ([`repair::merge::plan_merges`] only
//! borrows a net, so every net in a batch plans concurrently); committing those merges and the
//! rest of Steps B-I stay serial per net because [`repair::repair_nets`] takes the block and index
//! by unique reference (mutation can't be split from the analysis it depends on without the
//! engine exposing narrower per-step entry points than it does today -- DESIGN.md records this as
//! the next refactor). The DRC engine recovers real intra-batch parallelism on its own: every
//! check module fans its shape-level work out with `rayon` regardless of how the driver calls it.

use design::{Block, NetId};
use index::RegionIndex;
use log::{info, warn};
use rayon::prelude::*;
use repair::FatalConnectivityError;
use tech::{RouterConfig, Technology};

/// Upper bound on the number of nets processed as one unit of work (§4.5: "batches of at most
/// `BATCH_SIZE` (≈131072) items").
pub const BATCH_SIZE: usize = 131_072;

/// The outcome of one [`run`] call: repair failures are collected across every batch rather than
/// aborting at the first one (§4.5's "any fatal connectivity failure is recorded and raised only
/// after the batch completes", generalized to the whole run).
#[derive(Debug, Default)]
pub struct RunReport {
    pub batches_run: usize,
    pub nets_repaired: usize,
    pub failures: Vec<FatalConnectivityError>,
    pub markers_emitted: usize,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs connectivity repair over every modified net, batch by batch, then the full DRC battery
/// over the resulting design.
pub fn run(block: &mut Block, tech: &Technology, config: &RouterConfig, index: &mut RegionIndex) -> RunReport {
    let mut report = RunReport::default();

    let net_ids: Vec<NetId> = block.modified_nets().map(|(id, _)| id).collect();
    for batch in net_ids.chunks(BATCH_SIZE) {
        report.batches_run += 1;
        info!("driver: batch {} of {} nets", report.batches_run, batch.len());

        // Phase 1 (parallel, read-only): plan every net's merges concurrently before any of them
        // touch the index. Reborrow as shared so the closure can cross the thread pool.
        //
        // `repair::repair_nets` below re-derives the same plan per net when it commits Step B;
        // this pass exists to realize the phase's parallelism (it's the one genuinely read-only
        // Step A does), not to save that recomputation -- DESIGN.md tracks threading the computed
        // plan through as a follow-up.
        let block_ref: &Block = block;
        let spans_planned: usize = batch.par_iter().map(|&net_id| repair::merge::plan_merges(block_ref.net(net_id)).len()).sum();
        if spans_planned > 0 {
            info!("driver: batch {} pre-planned {} merge spans", report.batches_run, spans_planned);
        }

        // Phases 2-4 (serial per net): commit merges, build graphs, search, prune/split/shrink,
        // sweep patch-wires, via `repair::repair_nets`'s existing Steps A-I pipeline.
        match repair::repair_nets(block, tech, config, index, batch) {
            Ok(()) => report.nets_repaired += batch.len(),
            Err(failures) => {
                report.nets_repaired += batch.len() - failures.len();
                for f in &failures {
                    warn!("driver: net {} unrepairable: {:?}", f.net_name, f.unreachable_pins);
                }
                report.failures.extend(failures);
            }
        }
    }

    let markers_before = block.markers().len();
    drc::check(block, tech, index);
    report.markers_emitted = block.markers().len() - markers_before;

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use design::pin::{IoType, PinRef, SigType};
    use design::term::Term;
    use geom::direction::{EndStyle, PrefDir};
    use geom::{Point, Rect};
    use tech::layer::{Layer, RoutingRules};
    use tech::rule::CutRules;
    use tech::ViaDef;

    fn tech_with_metal_and_cut() -> Technology {
        let mut tech = Technology::new();
        tech.add_layer(Layer::routing(2, "M1", PrefDir::Horizontal, 140, RoutingRules::default()));
        let cut_rules = CutRules {
            classic_spacing: 25,
            cut_within: 0,
            ..CutRules::default()
        };
        tech.add_layer(Layer::cut(3, "V1", cut_rules));
        tech
    }

    /// One batch touching both engines: a two-pin net that repairs cleanly (its lone segment
    /// stays put, both pins already sit at its endpoints), alongside an unmodified net whose two
    /// close-together vias violate cut spacing. The repair phase must leave the second net's
    /// vias untouched (it is never in `modified_nets`), and the DRC phase must still see it.
    #[test]
    fn run_repairs_modified_nets_and_drcs_the_whole_design() {
        let tech = tech_with_metal_and_cut();
        let config = RouterConfig::default();
        let mut block = Block::new("top");

        let a_term = block.add_term(Term::new("A", SigType::Signal, IoType::Output).with_access_box(Rect::new(0, 0, 0, 0), 2));
        let b_term = block.add_term(Term::new("B", SigType::Signal, IoType::Input).with_access_box(Rect::new(1000, 0, 1000, 0), 2));
        let net1 = block.add_net("n1");
        {
            let (net, ids) = block.net_and_ids_mut(net1);
            net.add_path_segment(ids, Point::new(0, 0), Point::new(1000, 0), 2, 70, EndStyle::Extend, EndStyle::Extend).unwrap();
            net.add_pin(PinRef::BlockTerm(a_term));
            net.add_pin(PinRef::BlockTerm(b_term));
        }

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
        let net2 = block.add_net("n2");
        {
            let (net, ids) = block.net_and_ids_mut(net2);
            net.add_via(ids, Point::new(0, 0), via_def, 2, 4);
            net.add_via(ids, Point::new(40, 0), via_def, 2, 4);
        }
        block.net_mut(net2).modified = false;

        let mut index = RegionIndex::new();
        repair::reindex_net(&block, &tech, &mut index, net1);
        repair::reindex_net(&block, &tech, &mut index, net2);

        let report = run(&mut block, &tech, &config, &mut index);

        assert!(report.is_clean());
        assert_eq!(report.nets_repaired, 1, "only the modified net goes through repair");
        assert_eq!(block.net(net2).shape_count(), 2, "the unmodified net's vias are untouched by repair");
        assert!(report.markers_emitted >= 1, "the DRC pass still covers every net, modified or not");
        assert!(block.markers().iter().any(|m| m.constraint == design::marker::Constraint::CutSpacing));
    }
}
