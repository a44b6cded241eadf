//! # Family Registry
//!
//! The high-level facade over the graph store and the confirmation ledger.
//! This is the operation surface the request layer consumes: every
//! mutation funnels through here, and confirmation is transactional with
//! edge materialization — a link is marked Confirmed only after the store
//! accepted the edge, and marked Rejected when materialization fails, so
//! no link is ever left dangling in Pending.
//!
//! The registry has an explicit lifecycle: constructed once at service
//! start, passed by reference to every handler. Tests build isolated
//! instances.

use crate::graph::FamilyGraph;
use crate::kinship::{Kinship, describe_kinship};
use crate::limits::DEFAULT_PENDING_TTL_SECS;
use crate::tree::{Direction, FamilyTree, build_tree};
use crate::types::{
    FamilyError, KinRole, LinkStatus, PendingLink, PendingLinkId, Person, PersonAttrs, PersonId,
    PersonSummary,
};
use crate::generation;
use crate::workflow::ConfirmationLedger;

// =============================================================================
// REGISTRY
// =============================================================================

/// The family registry: canonical people and edges plus pending-link
/// bookkeeping.
#[derive(Debug, Clone)]
pub struct FamilyRegistry {
    graph: FamilyGraph,
    ledger: ConfirmationLedger,
    pending_ttl_secs: u64,
}

impl Default for FamilyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FamilyRegistry {
    /// Create an empty registry with the default pending-link TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_PENDING_TTL_SECS)
    }

    /// Create an empty registry with an explicit pending-link TTL in
    /// seconds. Zero disables expiry.
    #[must_use]
    pub fn with_ttl(pending_ttl_secs: u64) -> Self {
        Self {
            graph: FamilyGraph::new(),
            ledger: ConfirmationLedger::new(),
            pending_ttl_secs,
        }
    }

    /// Read access to the confirmed graph, for query engines and tests.
    #[must_use]
    pub fn graph(&self) -> &FamilyGraph {
        &self.graph
    }

    // =========================================================================
    // PERSON LIFECYCLE
    // =========================================================================

    /// Register a new person.
    pub fn register(&mut self, attrs: PersonAttrs) -> Result<Person, FamilyError> {
        let id = self.graph.create_person(attrs)?;
        Ok(self.graph.person(id)?.clone())
    }

    /// Update a person's attribute fields.
    pub fn update(&mut self, id: PersonId, attrs: PersonAttrs) -> Result<Person, FamilyError> {
        Ok(self.graph.update_person(id, attrs)?.clone())
    }

    /// Delete a person. Refused while confirmed edges reference them; on
    /// success any pending link touching the person is expired as well.
    pub fn delete_person(&mut self, id: PersonId) -> Result<(), FamilyError> {
        self.graph.delete_person(id)?;
        self.ledger.detach_person(id);
        Ok(())
    }

    /// Administrative detach: remove every confirmed edge and expire every
    /// pending link touching the person. The precondition for deletion.
    pub fn detach_person(&mut self, id: PersonId) -> Result<(), FamilyError> {
        self.graph.detach_person(id)?;
        self.ledger.detach_person(id);
        Ok(())
    }

    /// Lookup a person by id.
    pub fn person(&self, id: PersonId) -> Result<Person, FamilyError> {
        Ok(self.graph.person(id)?.clone())
    }

    /// Summary projection of everyone, sorted by id.
    #[must_use]
    pub fn summaries(&self) -> Vec<PersonSummary> {
        self.graph.summaries()
    }

    // =========================================================================
    // PROPOSALS
    // =========================================================================

    /// Register a new person and propose them as a relative of the
    /// proposer. The new member is the link's target and must confirm
    /// before any edge is materialized.
    pub fn propose_family_member(
        &mut self,
        proposer: PersonId,
        attrs: PersonAttrs,
        role: KinRole,
        now_secs: u64,
    ) -> Result<(PersonId, PendingLinkId), FamilyError> {
        self.graph.person(proposer)?;
        let member = self.graph.create_person(attrs)?;
        let link = self.ledger.propose(proposer, member, role, now_secs)?;
        Ok((member, link))
    }

    /// Propose a relationship to an already-registered person.
    pub fn propose_existing(
        &mut self,
        proposer: PersonId,
        target: PersonId,
        role: KinRole,
        now_secs: u64,
    ) -> Result<PendingLinkId, FamilyError> {
        self.graph.person(proposer)?;
        self.graph.person(target)?;
        self.ledger.propose(proposer, target, role, now_secs)
    }

    /// Register a new person and propose them as the proposer's spouse.
    pub fn propose_spouse(
        &mut self,
        proposer: PersonId,
        attrs: PersonAttrs,
        now_secs: u64,
    ) -> Result<(PersonId, PendingLinkId), FamilyError> {
        self.propose_family_member(proposer, attrs, KinRole::Spouse, now_secs)
    }

    // =========================================================================
    // CONFIRMATION
    // =========================================================================

    /// Settle a pending link as its target: accept (materializing the
    /// edge) or decline.
    ///
    /// Confirmation is transactional with materialization. When the store
    /// refuses the edge — a cycle, a third parent, an existing marriage —
    /// the link is marked Rejected and the structural failure is surfaced
    /// to the caller.
    pub fn resolve_confirmation(
        &mut self,
        confirming: PersonId,
        link_id: PendingLinkId,
        accept: bool,
    ) -> Result<LinkStatus, FamilyError> {
        let link = self.ledger.gate(link_id, confirming)?.clone();

        if !accept {
            self.ledger.settle(link_id, LinkStatus::Rejected)?;
            return Ok(LinkStatus::Rejected);
        }

        match self.materialize(&link) {
            Ok(()) => {
                self.ledger.settle(link_id, LinkStatus::Confirmed)?;
                Ok(LinkStatus::Confirmed)
            }
            Err(e) => {
                self.ledger.settle(link_id, LinkStatus::Rejected)?;
                Err(e)
            }
        }
    }

    /// Materialize the edge a link describes. The role decides direction:
    /// mother/father make the target a parent of the proposer, son/daughter
    /// the reverse, spouse an undirected marriage.
    fn materialize(&mut self, link: &PendingLink) -> Result<(), FamilyError> {
        match link.role {
            KinRole::Mother | KinRole::Father => {
                self.graph.add_parent_edge(link.proposer, link.target)
            }
            KinRole::Son | KinRole::Daughter => {
                self.graph.add_parent_edge(link.target, link.proposer)
            }
            KinRole::Spouse => self.graph.add_spouse_edge(link.proposer, link.target),
        }
    }

    /// All links still awaiting this person's acknowledgment, oldest first.
    pub fn pending_confirmations(
        &self,
        target: PersonId,
    ) -> Result<Vec<PendingLink>, FamilyError> {
        self.graph.person(target)?;
        Ok(self
            .ledger
            .pending_for(target)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Run the expiry sweep with the registry's TTL. Returns the number of
    /// links expired.
    pub fn expire_stale(&mut self, now_secs: u64) -> usize {
        self.ledger.expire_stale(now_secs, self.pending_ttl_secs)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Render the genealogy tree anchored at a person.
    pub fn tree(
        &self,
        root: PersonId,
        direction: Direction,
        max_depth: Option<usize>,
    ) -> Result<FamilyTree, FamilyError> {
        build_tree(&self.graph, root, direction, max_depth)
    }

    /// Render the genealogy tree anchored at the first person with the
    /// given name.
    pub fn tree_by_name(
        &self,
        name: &str,
        direction: Direction,
        max_depth: Option<usize>,
    ) -> Result<FamilyTree, FamilyError> {
        let root = self
            .graph
            .find_by_name(name)
            .ok_or_else(|| FamilyError::NameNotFound(name.to_string()))?
            .id;
        build_tree(&self.graph, root, direction, max_depth)
    }

    /// Everyone at the anchor's generational offset, as summaries.
    pub fn same_generation(&self, anchor: PersonId) -> Result<Vec<PersonSummary>, FamilyError> {
        let peers = generation::same_generation(&self.graph, anchor)?;
        peers
            .into_iter()
            .map(|id| {
                let p = self.graph.person(id)?;
                Ok(PersonSummary {
                    id,
                    name: p.name.clone(),
                    married: self.graph.spouse_of(id).is_some(),
                })
            })
            .collect()
    }

    /// Describe how the named person is related to `from`.
    pub fn kinship(&self, from: PersonId, target_name: &str) -> Result<Kinship, FamilyError> {
        let target = self
            .graph
            .find_by_name(target_name)
            .ok_or_else(|| FamilyError::NameNotFound(target_name.to_string()))?
            .id;
        describe_kinship(&self.graph, from, target)
    }

    // =========================================================================
    // COUNTS (for the status endpoint)
    // =========================================================================

    /// Number of registered people.
    #[must_use]
    pub fn person_count(&self) -> usize {
        self.graph.person_count()
    }

    /// Number of confirmed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of links still Pending.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.ledger.pending_count()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn register(reg: &mut FamilyRegistry, name: &str) -> PersonId {
        reg.register(PersonAttrs::named(name)).expect("register").id
    }

    #[test]
    fn confirmed_proposal_materializes_edge() {
        let mut reg = FamilyRegistry::new();
        let ana = register(&mut reg, "Ana");
        let (maria, link) = reg
            .propose_family_member(ana, PersonAttrs::named("María"), KinRole::Mother, NOW)
            .expect("propose");

        // Nothing confirmed yet
        assert_eq!(reg.graph().parents_of(ana).count(), 0);

        let status = reg
            .resolve_confirmation(maria, link, true)
            .expect("confirm");
        assert_eq!(status, LinkStatus::Confirmed);
        assert_eq!(reg.graph().parents_of(ana).collect::<Vec<_>>(), vec![maria]);
    }

    #[test]
    fn only_target_may_confirm() {
        let mut reg = FamilyRegistry::new();
        let ana = register(&mut reg, "Ana");
        let (_flor, link) = reg
            .propose_spouse(ana, PersonAttrs::named("Flor"), NOW)
            .expect("propose");

        // The proposer is not the target
        assert_eq!(
            reg.resolve_confirmation(ana, link, true).map(|_| ()),
            Err(FamilyError::Forbidden)
        );
    }

    #[test]
    fn declined_proposal_leaves_graph_unchanged() {
        let mut reg = FamilyRegistry::new();
        let ana = register(&mut reg, "Ana");
        let (flor, link) = reg
            .propose_spouse(ana, PersonAttrs::named("Flor"), NOW)
            .expect("propose");

        let status = reg
            .resolve_confirmation(flor, link, false)
            .expect("decline");
        assert_eq!(status, LinkStatus::Rejected);
        assert_eq!(reg.graph().spouse_of(ana), None);
        assert_eq!(reg.graph().edge_count(), 0);
    }

    #[test]
    fn failed_materialization_rejects_link() {
        let mut reg = FamilyRegistry::new();
        let ana = register(&mut reg, "Ana");
        let beto = register(&mut reg, "Beto");

        // beto is ana's child (confirmed)
        let link = reg
            .propose_existing(beto, ana, KinRole::Mother, NOW)
            .expect("propose");
        reg.resolve_confirmation(ana, link, true).expect("confirm");

        // Now claim ana is beto's child: confirmed ancestry runs the other way
        let bad = reg
            .propose_existing(ana, beto, KinRole::Mother, NOW)
            .expect("propose");
        let err = reg
            .resolve_confirmation(beto, bad, true)
            .expect_err("cycle");
        assert_eq!(
            err,
            FamilyError::CycleDetected {
                child: ana,
                parent: beto
            }
        );
        // The link is settled, not dangling
        assert_eq!(
            reg.resolve_confirmation(beto, bad, true).map(|_| ()),
            Err(FamilyError::NotPending(bad))
        );
        // And the graph is unchanged
        assert_eq!(reg.edge_count(), 1);
    }

    #[test]
    fn duplicate_pending_toward_same_target() {
        let mut reg = FamilyRegistry::new();
        let ana = register(&mut reg, "Ana");
        let beto = register(&mut reg, "Beto");
        let clara = register(&mut reg, "Clara");

        reg.propose_existing(ana, beto, KinRole::Spouse, NOW)
            .expect("first");
        assert_eq!(
            reg.propose_existing(clara, beto, KinRole::Spouse, NOW + 1),
            Err(FamilyError::DuplicatePending { target: beto })
        );
    }

    #[test]
    fn delete_blocked_until_detached() {
        let mut reg = FamilyRegistry::new();
        let ana = register(&mut reg, "Ana");
        let (maria, link) = reg
            .propose_family_member(ana, PersonAttrs::named("María"), KinRole::Mother, NOW)
            .expect("propose");
        reg.resolve_confirmation(maria, link, true).expect("confirm");

        assert_eq!(
            reg.delete_person(maria),
            Err(FamilyError::HasActiveRelationships(maria))
        );
        reg.detach_person(maria).expect("detach");
        reg.delete_person(maria).expect("delete");
        assert_eq!(reg.person(maria).map(|_| ()), Err(FamilyError::PersonNotFound(maria)));
    }

    #[test]
    fn delete_expires_pending_links() {
        let mut reg = FamilyRegistry::new();
        let ana = register(&mut reg, "Ana");
        let (flor, link) = reg
            .propose_spouse(ana, PersonAttrs::named("Flor"), NOW)
            .expect("propose");

        // flor has no confirmed edges, so deletion is allowed
        reg.delete_person(flor).expect("delete");
        assert_eq!(
            reg.resolve_confirmation(flor, link, true).map(|_| ()),
            Err(FamilyError::NotPending(link))
        );
    }

    #[test]
    fn pending_confirmations_lists_only_open_links() {
        let mut reg = FamilyRegistry::new();
        let ana = register(&mut reg, "Ana");
        let beto = register(&mut reg, "Beto");
        let link = reg
            .propose_existing(ana, beto, KinRole::Spouse, NOW)
            .expect("propose");

        let pending = reg.pending_confirmations(beto).expect("pending");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, link);
        assert_eq!(pending[0].status, LinkStatus::Pending);

        reg.resolve_confirmation(beto, link, true).expect("confirm");
        assert!(reg.pending_confirmations(beto).expect("pending").is_empty());
    }

    #[test]
    fn expiry_sweep_uses_registry_ttl() {
        let mut reg = FamilyRegistry::with_ttl(100);
        let ana = register(&mut reg, "Ana");
        reg.propose_spouse(ana, PersonAttrs::named("Flor"), NOW)
            .expect("propose");

        assert_eq!(reg.expire_stale(NOW + 50), 0);
        assert_eq!(reg.expire_stale(NOW + 100), 1);
        assert_eq!(reg.pending_count(), 0);
    }

    #[test]
    fn kinship_by_name() {
        let mut reg = FamilyRegistry::new();
        let ana = register(&mut reg, "Ana");
        let (maria, l1) = reg
            .propose_family_member(ana, PersonAttrs::named("María"), KinRole::Mother, NOW)
            .expect("propose");
        reg.resolve_confirmation(maria, l1, true).expect("confirm");
        let (_delia, l2) = reg
            .propose_family_member(maria, PersonAttrs::named("Delia"), KinRole::Mother, NOW)
            .expect("propose");
        let delia = reg.graph().find_by_name("Delia").expect("delia").id;
        reg.resolve_confirmation(delia, l2, true).expect("confirm");

        assert_eq!(
            reg.kinship(ana, "Delia"),
            Ok(Kinship::Grandparent { greats: 0 })
        );
        assert_eq!(
            reg.kinship(ana, "Nadie"),
            Err(FamilyError::NameNotFound("Nadie".into()))
        );
    }

    #[test]
    fn tree_by_name_resolves_root() {
        let mut reg = FamilyRegistry::new();
        let ana = register(&mut reg, "Ana");
        let tree = reg
            .tree_by_name("Ana", Direction::Full, None)
            .expect("tree");
        assert_eq!(tree.root.id, ana);
        assert_eq!(
            reg.tree_by_name("Nadie", Direction::Full, None).map(|_| ()),
            Err(FamilyError::NameNotFound("Nadie".into()))
        );
    }
}
