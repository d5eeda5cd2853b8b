use std::collections::HashMap;

use geom::Dbu;

/// A two-width / parallel-run-length spacing table: required spacing is a function of the wider
/// of the two shapes' widths and the parallel-run length between them (DRC §4.3.1).
///
/// Entries are `(min_width, min_prl) -> required_spacing`; lookup takes the largest table entry
/// not exceeding the query on both axes (the usual LEF `SPACINGTABLE` semantics).
#[derive(Debug, Clone, Default)]
pub struct PrlSpacingTable {
    widths: Vec<Dbu>,
    prls: Vec<Dbu>,
    spacing: Vec<Vec<Dbu>>,
}

impl PrlSpacingTable {
    pub fn new(widths: Vec<Dbu>, prls: Vec<Dbu>, spacing: Vec<Vec<Dbu>>) -> Self {
        debug_assert_eq!(spacing.len(), widths.len());
        for row in &spacing {
            debug_assert_eq!(row.len(), prls.len());
        }
        PrlSpacingTable { widths, prls, spacing }
    }

    /// A single-entry table, for technologies/tests that only need a flat minimum spacing.
    pub fn flat(spacing: Dbu) -> Self {
        PrlSpacingTable {
            widths: vec![0],
            prls: vec![0],
            spacing: vec![vec![spacing]],
        }
    }

    pub fn required_spacing(&self, width: Dbu, prl: Dbu) -> Dbu {
        if self.widths.is_empty() {
            return 0;
        }
        let width_idx = self.widths.iter().rposition(|&w| w <= width).unwrap_or(0);
        let prl_idx = self.prls.iter().rposition(|&p| p <= prl).unwrap_or(0);
        self.spacing[width_idx][prl_idx]
    }

    /// The largest spacing value the table can produce, used as the metal-spacing check's query
    /// bloat distance (§4.3.1: "bloat by the layer's max-spacing value").
    pub fn max_spacing(&self) -> Dbu {
        self.spacing.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// An end-of-line spacing rule (DRC §4.3.2).
#[derive(Debug, Clone)]
pub struct EolRule {
    pub eol_width: Dbu,
    pub eol_space: Dbu,
    pub eol_within: Dbu,
    pub par_space: Option<Dbu>,
    pub par_within: Option<Dbu>,
    pub two_sided: bool,
    pub min_length: Option<Dbu>,
    pub max_length: Option<Dbu>,
    pub encl_cut: Option<EncloseCutRule>,
}

#[derive(Debug, Clone)]
pub struct EncloseCutRule {
    pub encl_dist: Dbu,
    pub cut_to_metal_space: Dbu,
}

/// A LEF58 min-step rule (DRC §4.3.4). `max_edges`/`max_length` are `None` when the rule does not
/// bound that dimension.
#[derive(Debug, Clone)]
pub struct MinStepRule {
    pub min_step_length: Dbu,
    pub max_edges: Option<u32>,
    pub max_length: Option<Dbu>,
    pub no_between_eol: bool,
}

/// A LEF58 corner-spacing rule (DRC §4.3.3): required spacing as a function of the neighboring
/// shape's width, plus whether EOL-width exceptions are honored.
#[derive(Debug, Clone)]
pub struct CornerSpacingTable {
    pub widths: Vec<Dbu>,
    pub spacing: Vec<Dbu>,
    pub except_eol_width: Option<Dbu>,
}

impl CornerSpacingTable {
    pub fn required_spacing(&self, width: Dbu) -> Dbu {
        if self.widths.is_empty() {
            return 0;
        }
        let idx = self.widths.iter().rposition(|&w| w <= width).unwrap_or(0);
        self.spacing[idx]
    }
}

/// A cut-layer equivalence class, used to index LEF58 cut-spacing tables (by width x length).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CutClass {
    pub name: String,
    pub width: Dbu,
    pub length: Dbu,
}

/// Cut spacing and related rules for one cut layer (DRC §4.3.5).
#[derive(Debug, Clone, Default)]
pub struct CutRules {
    pub cut_classes: Vec<CutClass>,
    pub classic_spacing: Dbu,
    pub cut_within: Dbu,
    pub same_net_spacing: HashMap<(String, String), Dbu>,
    pub diff_net_spacing: HashMap<(String, String), Dbu>,
    pub adjacent_cuts: Option<AdjacentCutsRule>,
    pub two_cuts: Option<TwoCutsRule>,
}

#[derive(Debug, Clone)]
pub struct AdjacentCutsRule {
    pub cut_within: Dbu,
    pub required_adjacent_cuts: u32,
    pub spacing: Dbu,
}

#[derive(Debug, Clone)]
pub struct TwoCutsRule {
    pub cut_within: Dbu,
    pub spacing: Dbu,
}
