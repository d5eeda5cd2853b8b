use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::ids::{IdGen, InstanceId, MarkerId, NetId, TermId};
use crate::instance::Instance;
use crate::marker::Marker;
use crate::net::Net;
use crate::term::Term;

/// The top-level design database: the sole owner of every [`Net`], [`Instance`], block-boundary
/// [`Term`] and [`Marker`] (§3 Ownership). Everything downstream -- the region index, the repair
/// engine, the DRC engine -- borrows from a `Block` and refers back into it by id.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub name: String,
    ids: IdGen,
    nets: HashMap<NetId, Net>,
    net_names: HashMap<String, NetId>,
    instances: HashMap<InstanceId, Instance>,
    terms: HashMap<TermId, Term>,
    markers: Vec<Marker>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Block {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_net(&mut self, name: impl Into<String>) -> NetId {
        let name = name.into();
        let id = self.ids.next_net();
        self.net_names.insert(name.clone(), id);
        self.nets.insert(id, Net::new(id, name));
        id
    }

    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[&id]
    }

    pub fn net_mut(&mut self, id: NetId) -> &mut Net {
        self.nets.get_mut(&id).expect("NetId not present in Block")
    }

    pub fn net_by_name(&self, name: &str) -> Result<NetId> {
        self.net_names.get(name).copied().ok_or_else(|| Error::UnknownNet { name: name.to_string() })
    }

    pub fn id_gen_mut(&mut self) -> &mut IdGen {
        &mut self.ids
    }

    /// Splits the borrow of a net and the block's id generator, for call sites (repair's Step G
    /// split, in particular) that need to add shapes to a net while generating their ids from
    /// the same `Block`.
    pub fn net_and_ids_mut(&mut self, id: NetId) -> (&mut Net, &mut IdGen) {
        (self.nets.get_mut(&id).expect("NetId not present in Block"), &mut self.ids)
    }

    /// All nets, in ascending `NetId` order (the repair driver's per-batch serial phases process
    /// nets in insertion order, §5, and this is the insertion order since ids are monotonic).
    pub fn nets(&self) -> impl Iterator<Item = (NetId, &Net)> {
        let mut ids: Vec<_> = self.nets.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().map(move |id| (id, &self.nets[&id]))
    }

    pub fn modified_nets(&self) -> impl Iterator<Item = (NetId, &Net)> {
        self.nets().filter(|(_, n)| n.modified)
    }

    pub fn add_instance(&mut self, instance: Instance) -> InstanceId {
        let id = self.ids.next_instance();
        self.instances.insert(id, instance);
        id
    }

    pub fn instance(&self, id: InstanceId) -> &Instance {
        &self.instances[&id]
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> &mut Instance {
        self.instances.get_mut(&id).expect("InstanceId not present in Block")
    }

    pub fn add_term(&mut self, term: Term) -> TermId {
        let id = self.ids.next_term();
        self.terms.insert(id, term);
        id
    }

    pub fn term(&self, id: TermId) -> &Term {
        &self.terms[&id]
    }

    /// Accepts `marker` iff no prior marker with the same dedup key exists (§4.4). Returns
    /// `true` if the marker was newly inserted.
    pub fn add_marker(&mut self, marker: Marker) -> bool {
        if self.markers.iter().any(|m| m.is_duplicate_of(&marker)) {
            return false;
        }
        self.markers.push(marker);
        true
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker_id(&self, index: usize) -> MarkerId {
        MarkerId::from_raw(index as u32)
    }

    /// Clears the marker collection, as happens before a new routing iteration (§3 Lifecycles).
    pub fn clear_markers(&mut self) {
        self.markers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_marker_deduplicates() {
        use crate::marker::Marker;
        let mut block = Block::new("top");
        let net = block.add_net("n1");
        let m1 = Marker::recheck(geom::Rect::new(0, 0, 10, 10), 2, net);
        let m2 = m1.clone();
        assert!(block.add_marker(m1));
        assert!(!block.add_marker(m2));
        assert_eq!(block.markers().len(), 1);
    }

    #[test]
    fn unknown_net_name_is_an_error() {
        let block = Block::new("top");
        assert!(matches!(block.net_by_name("missing"), Err(Error::UnknownNet { .. })));
    }
}
