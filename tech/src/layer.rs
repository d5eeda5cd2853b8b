use std::fmt::{Debug, Formatter};

use geom::direction::PrefDir;
use geom::Dbu;

use crate::rule::{CornerSpacingTable, CutRules, EolRule, MinStepRule, PrlSpacingTable};
use crate::via::ViaDefId;

/// A newtyped index into [`crate::Technology`]'s layer arena.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct LayerId(pub(crate) u32);

impl Debug for LayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "LayerId({})", self.0)
    }
}

impl From<LayerId> for usize {
    fn from(id: LayerId) -> usize {
        id.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Routing,
    Cut,
    Masterslice,
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub number: i32,
    pub name: String,
    pub kind: LayerKind,
    /// `Some` only for [`LayerKind::Routing`].
    pub pref_dir: Option<PrefDir>,
    pub min_width: Dbu,
    pub min_area: i128,
    pub default_via: Option<ViaDefId>,
    pub routing_rules: RoutingRules,
    pub cut_rules: CutRules,
}

impl Layer {
    pub fn routing(number: i32, name: impl Into<String>, pref_dir: PrefDir, min_width: Dbu, rules: RoutingRules) -> Self {
        Layer {
            number,
            name: name.into(),
            kind: LayerKind::Routing,
            pref_dir: Some(pref_dir),
            min_width,
            min_area: 0,
            default_via: None,
            routing_rules: rules,
            cut_rules: CutRules::default(),
        }
    }

    pub fn cut(number: i32, name: impl Into<String>, rules: CutRules) -> Self {
        Layer {
            number,
            name: name.into(),
            kind: LayerKind::Cut,
            pref_dir: None,
            min_width: 0,
            min_area: 0,
            default_via: None,
            routing_rules: RoutingRules::default(),
            cut_rules: rules,
        }
    }

    pub fn masterslice(number: i32, name: impl Into<String>) -> Self {
        Layer {
            number,
            name: name.into(),
            kind: LayerKind::Masterslice,
            pref_dir: None,
            min_width: 0,
            min_area: 0,
            default_via: None,
            routing_rules: RoutingRules::default(),
            cut_rules: CutRules::default(),
        }
    }
}

/// Rule set carried by a routing layer: the spacing/width/shape checks of DRC §4.3 each consult
/// exactly one field of this struct.
#[derive(Debug, Clone, Default)]
pub struct RoutingRules {
    pub min_step: Option<MinStepRule>,
    pub eol_rules: Vec<EolRule>,
    pub prl_spacing: PrlSpacingTable,
    pub corner_spacing: Option<CornerSpacingTable>,
    pub min_enclosed_area: Vec<i128>,
    pub off_grid_check: bool,
    pub rect_only: bool,
    pub eol_width: Dbu,
}
