use geom::{Orientation, Point};

use crate::term::Term;

/// A placed cell instance. `terms` is this instance's own pin arena; a [`crate::pin::PinRef`]
/// addresses into it by plain index (mirroring [`crate::ids::TermId`] but scoped to the owning
/// instance rather than the block).
#[derive(Debug, Clone)]
pub struct Instance {
    pub name: String,
    pub master: String,
    pub origin: Point,
    pub orientation: Orientation,
    pub terms: Vec<Term>,
}

impl Instance {
    pub fn new(name: impl Into<String>, master: impl Into<String>, origin: Point, orientation: Orientation) -> Self {
        Instance {
            name: name.into(),
            master: master.into(),
            origin,
            orientation,
            terms: Vec::new(),
        }
    }

    pub fn add_term(&mut self, term: Term) -> crate::ids::TermId {
        let id = crate::ids::TermId::from_raw(self.terms.len() as u32);
        self.terms.push(term);
        id
    }

    pub fn term(&self, id: crate::ids::TermId) -> &Term {
        &self.terms[usize::from(id)]
    }
}
