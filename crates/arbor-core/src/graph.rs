//! # Family Graph Store
//!
//! The deterministic store for people and their confirmed relationship
//! edges. This module owns the canonical sets of persons, parent edges,
//! and spouse edges, and enforces the structural invariants on every
//! mutation:
//!
//! - at most two confirmed parents per person
//! - the parent relation stays a DAG (no person is their own ancestor)
//! - at most one active spouse per person, stored symmetrically
//! - no self-loops of either kind
//!
//! People are kept in an arena keyed by id with explicit edge maps; all
//! traversal goes through id lookups, never embedded back-references. All
//! data structures use `BTreeMap`/`BTreeSet` for deterministic ordering.

use crate::limits::MAX_PARENTS;
use crate::types::{FamilyError, Person, PersonAttrs, PersonId, PersonSummary};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// The family graph: an arena of person records plus explicit edge maps.
///
/// Constructed once at service start and passed by reference to every
/// query; tests build isolated instances.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    /// Person storage: PersonId -> Person
    people: BTreeMap<PersonId, Person>,

    /// Parent edges, child side: child -> set of parents (at most two)
    parents: BTreeMap<PersonId, BTreeSet<PersonId>>,

    /// Parent edges, parent side: parent -> set of children
    children: BTreeMap<PersonId, BTreeSet<PersonId>>,

    /// Active spouse edges, stored in both directions
    spouses: BTreeMap<PersonId, PersonId>,

    /// Next available PersonId
    next_person_id: u64,
}

impl FamilyGraph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // PERSON LIFECYCLE
    // =========================================================================

    /// Register a person. Assigns a fresh id; never reuses one.
    pub fn create_person(&mut self, attrs: PersonAttrs) -> Result<PersonId, FamilyError> {
        attrs.validate()?;

        let id = PersonId(self.next_person_id);
        self.next_person_id = self.next_person_id.saturating_add(1);
        self.people.insert(id, Person::new(id, attrs));
        Ok(id)
    }

    /// Replace a person's attribute fields. Identity and edges are untouched.
    pub fn update_person(
        &mut self,
        id: PersonId,
        attrs: PersonAttrs,
    ) -> Result<&Person, FamilyError> {
        attrs.validate()?;
        let person = self
            .people
            .get_mut(&id)
            .ok_or(FamilyError::PersonNotFound(id))?;
        *person = Person::new(id, attrs);
        Ok(person)
    }

    /// Remove a person. Refused while any confirmed edge references them;
    /// the caller must detach first. Irreversible.
    pub fn delete_person(&mut self, id: PersonId) -> Result<(), FamilyError> {
        if !self.people.contains_key(&id) {
            return Err(FamilyError::PersonNotFound(id));
        }
        if self.has_relationships(id) {
            return Err(FamilyError::HasActiveRelationships(id));
        }
        self.people.remove(&id);
        Ok(())
    }

    /// Remove every confirmed edge touching a person.
    ///
    /// This is the administrative detach flow that precedes deletion.
    pub fn detach_person(&mut self, id: PersonId) -> Result<(), FamilyError> {
        if !self.people.contains_key(&id) {
            return Err(FamilyError::PersonNotFound(id));
        }
        if let Some(ps) = self.parents.remove(&id) {
            for p in ps {
                self.drop_child(p, id);
            }
        }
        if let Some(cs) = self.children.remove(&id) {
            for c in cs {
                self.drop_parent(c, id);
            }
        }
        if let Some(s) = self.spouses.remove(&id) {
            self.spouses.remove(&s);
        }
        Ok(())
    }

    fn drop_child(&mut self, parent: PersonId, child: PersonId) {
        if let Some(set) = self.children.get_mut(&parent) {
            set.remove(&child);
            if set.is_empty() {
                self.children.remove(&parent);
            }
        }
    }

    fn drop_parent(&mut self, child: PersonId, parent: PersonId) {
        if let Some(set) = self.parents.get_mut(&child) {
            set.remove(&parent);
            if set.is_empty() {
                self.parents.remove(&child);
            }
        }
    }

    // =========================================================================
    // EDGE MUTATION (invoked only after confirmation)
    // =========================================================================

    /// Materialize a confirmed parent edge `parent -> child`.
    ///
    /// Rejects self-loops, a third parent, and any edge that would make the
    /// parent relation non-well-founded. Inserting an existing edge is a
    /// no-op.
    pub fn add_parent_edge(
        &mut self,
        child: PersonId,
        parent: PersonId,
    ) -> Result<(), FamilyError> {
        if child == parent {
            return Err(FamilyError::SelfReference);
        }
        self.person(child)?;
        self.person(parent)?;

        if self
            .parents
            .get(&child)
            .is_some_and(|set| set.contains(&parent))
        {
            return Ok(());
        }
        if self.parents.get(&child).is_some_and(|set| set.len() >= MAX_PARENTS) {
            return Err(FamilyError::CapacityExceeded(child));
        }
        // Walk ancestors of the proposed parent; if the child appears among
        // them, the proposed parent is already a descendant of the child.
        if self.ancestors_of(parent).contains_key(&child) {
            return Err(FamilyError::CycleDetected { child, parent });
        }

        self.parents.entry(child).or_default().insert(parent);
        self.children.entry(parent).or_default().insert(child);
        Ok(())
    }

    /// Materialize a confirmed spouse edge between two people.
    ///
    /// Symmetric and exclusive: stored in both directions, and refused
    /// while either party has an active spouse.
    pub fn add_spouse_edge(&mut self, a: PersonId, b: PersonId) -> Result<(), FamilyError> {
        if a == b {
            return Err(FamilyError::SelfReference);
        }
        self.person(a)?;
        self.person(b)?;

        if self.spouses.contains_key(&a) {
            return Err(FamilyError::AlreadyMarried(a));
        }
        if self.spouses.contains_key(&b) {
            return Err(FamilyError::AlreadyMarried(b));
        }
        self.spouses.insert(a, b);
        self.spouses.insert(b, a);
        Ok(())
    }

    /// Remove a confirmed parent edge if present.
    pub fn remove_parent_edge(
        &mut self,
        child: PersonId,
        parent: PersonId,
    ) -> Result<(), FamilyError> {
        self.person(child)?;
        self.person(parent)?;
        self.drop_parent(child, parent);
        self.drop_child(parent, child);
        Ok(())
    }

    /// Remove the spouse edge between two people if present.
    pub fn remove_spouse_edge(&mut self, a: PersonId, b: PersonId) -> Result<(), FamilyError> {
        self.person(a)?;
        self.person(b)?;
        if self.spouses.get(&a) == Some(&b) {
            self.spouses.remove(&a);
            self.spouses.remove(&b);
        }
        Ok(())
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    /// Lookup a person by id.
    pub fn person(&self, id: PersonId) -> Result<&Person, FamilyError> {
        self.people.get(&id).ok_or(FamilyError::PersonNotFound(id))
    }

    /// Check if a person is registered.
    #[must_use]
    pub fn contains(&self, id: PersonId) -> bool {
        self.people.contains_key(&id)
    }

    /// Find the first person with the given display name, by ascending id.
    ///
    /// Names are not unique; the lowest id wins deterministically.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Person> {
        self.people.values().find(|p| p.name == name)
    }

    /// Summary projection of every registered person, sorted by id.
    ///
    /// No traversal: O(n) over the arena with an O(log n) spouse probe each.
    #[must_use]
    pub fn summaries(&self) -> Vec<PersonSummary> {
        self.people
            .values()
            .map(|p| PersonSummary {
                id: p.id,
                name: p.name.clone(),
                married: self.spouses.contains_key(&p.id),
            })
            .collect()
    }

    /// Confirmed parents of a person, ascending by id.
    pub fn parents_of(&self, id: PersonId) -> impl Iterator<Item = PersonId> + '_ {
        self.parents.get(&id).into_iter().flatten().copied()
    }

    /// Confirmed children of a person, ascending by id.
    pub fn children_of(&self, id: PersonId) -> impl Iterator<Item = PersonId> + '_ {
        self.children.get(&id).into_iter().flatten().copied()
    }

    /// The active spouse of a person, if any.
    #[must_use]
    pub fn spouse_of(&self, id: PersonId) -> Option<PersonId> {
        self.spouses.get(&id).copied()
    }

    /// Whether any confirmed edge references the person.
    #[must_use]
    pub fn has_relationships(&self, id: PersonId) -> bool {
        self.parents.get(&id).is_some_and(|s| !s.is_empty())
            || self.children.get(&id).is_some_and(|s| !s.is_empty())
            || self.spouses.contains_key(&id)
    }

    /// Total number of registered people.
    #[must_use]
    pub fn person_count(&self) -> usize {
        self.people.len()
    }

    /// Total number of confirmed edges: parent edges plus marriages.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        let parent_edges: usize = self.parents.values().map(BTreeSet::len).sum();
        parent_edges + self.spouses.len() / 2
    }

    // =========================================================================
    // ANCESTRY
    // =========================================================================

    /// Every ancestor of a person with its hop distance, the person
    /// themselves at distance 0.
    ///
    /// Upward BFS along parent edges. This is the reachability check behind
    /// cycle detection and the distance map behind kinship resolution.
    #[must_use]
    pub fn ancestors_of(&self, id: PersonId) -> BTreeMap<PersonId, u32> {
        let mut dist = BTreeMap::new();
        if !self.people.contains_key(&id) {
            return dist;
        }

        let mut queue = VecDeque::new();
        dist.insert(id, 0u32);
        queue.push_back(id);

        while let Some(current) = queue.pop_front() {
            let d = dist[&current];
            for parent in self.parents_of(current) {
                if !dist.contains_key(&parent) {
                    dist.insert(parent, d.saturating_add(1));
                    queue.push_back(parent);
                }
            }
        }
        dist
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PersonAttrs;

    fn person(graph: &mut FamilyGraph, name: &str) -> PersonId {
        graph
            .create_person(PersonAttrs::named(name))
            .expect("create")
    }

    #[test]
    fn create_and_lookup_person() {
        let mut graph = FamilyGraph::new();
        let id = person(&mut graph, "Ana");

        let found = graph.person(id).expect("lookup");
        assert_eq!(found.name, "Ana");
        assert_eq!(graph.person_count(), 1);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut graph = FamilyGraph::new();
        let a = person(&mut graph, "Ana");
        graph.delete_person(a).expect("delete");

        let b = person(&mut graph, "Beto");
        assert_ne!(a, b);
    }

    #[test]
    fn update_replaces_attributes_only() {
        let mut graph = FamilyGraph::new();
        let id = person(&mut graph, "Ana");

        let updated = graph
            .update_person(
                id,
                PersonAttrs {
                    name: "Ana María".into(),
                    born: Some("1950-03-01".into()),
                    ..PersonAttrs::default()
                },
            )
            .expect("update");

        assert_eq!(updated.id, id);
        assert_eq!(updated.name, "Ana María");
        assert_eq!(updated.born.as_deref(), Some("1950-03-01"));
    }

    #[test]
    fn update_unknown_person_fails() {
        let mut graph = FamilyGraph::new();
        let err = graph
            .update_person(PersonId(99), PersonAttrs::named("Nadie"))
            .expect_err("must fail");
        assert_eq!(err, FamilyError::PersonNotFound(PersonId(99)));
    }

    #[test]
    fn parent_edge_rejects_self_loop() {
        let mut graph = FamilyGraph::new();
        let a = person(&mut graph, "Ana");
        assert_eq!(
            graph.add_parent_edge(a, a),
            Err(FamilyError::SelfReference)
        );
    }

    #[test]
    fn parent_edge_enforces_capacity() {
        let mut graph = FamilyGraph::new();
        let child = person(&mut graph, "Ana");
        let m = person(&mut graph, "María");
        let f = person(&mut graph, "Franco");
        let extra = person(&mut graph, "Otro");

        graph.add_parent_edge(child, m).expect("mother");
        graph.add_parent_edge(child, f).expect("father");
        assert_eq!(
            graph.add_parent_edge(child, extra),
            Err(FamilyError::CapacityExceeded(child))
        );
    }

    #[test]
    fn parent_edge_is_idempotent() {
        let mut graph = FamilyGraph::new();
        let child = person(&mut graph, "Ana");
        let m = person(&mut graph, "María");

        graph.add_parent_edge(child, m).expect("first");
        graph.add_parent_edge(child, m).expect("second is no-op");
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn parent_edge_rejects_cycle() {
        let mut graph = FamilyGraph::new();
        let a = person(&mut graph, "Ana");
        let b = person(&mut graph, "Beto");
        let c = person(&mut graph, "Clara");

        // c -> b -> a (a is the eldest)
        graph.add_parent_edge(b, a).expect("edge");
        graph.add_parent_edge(c, b).expect("edge");

        // Making c a parent of a would close the loop
        let err = graph.add_parent_edge(a, c).expect_err("cycle");
        assert_eq!(
            err,
            FamilyError::CycleDetected { child: a, parent: c }
        );
        // No state change
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.parents_of(a).count(), 0);
    }

    #[test]
    fn spouse_edge_is_symmetric_and_exclusive() {
        let mut graph = FamilyGraph::new();
        let a = person(&mut graph, "Ana");
        let b = person(&mut graph, "Beto");
        let c = person(&mut graph, "Clara");

        graph.add_spouse_edge(a, b).expect("marry");
        assert_eq!(graph.spouse_of(a), Some(b));
        assert_eq!(graph.spouse_of(b), Some(a));

        assert_eq!(
            graph.add_spouse_edge(a, c),
            Err(FamilyError::AlreadyMarried(a))
        );
        assert_eq!(
            graph.add_spouse_edge(c, b),
            Err(FamilyError::AlreadyMarried(b))
        );
    }

    #[test]
    fn spouse_edge_rejects_self_loop() {
        let mut graph = FamilyGraph::new();
        let a = person(&mut graph, "Ana");
        assert_eq!(graph.add_spouse_edge(a, a), Err(FamilyError::SelfReference));
    }

    #[test]
    fn delete_refused_while_edges_remain() {
        let mut graph = FamilyGraph::new();
        let child = person(&mut graph, "Ana");
        let parent = person(&mut graph, "María");
        graph.add_parent_edge(child, parent).expect("edge");

        assert_eq!(
            graph.delete_person(parent),
            Err(FamilyError::HasActiveRelationships(parent))
        );

        graph.detach_person(parent).expect("detach");
        graph.delete_person(parent).expect("delete");
        assert!(!graph.contains(parent));
        assert_eq!(graph.parents_of(child).count(), 0);
    }

    #[test]
    fn detach_clears_marriage_on_both_sides() {
        let mut graph = FamilyGraph::new();
        let a = person(&mut graph, "Ana");
        let b = person(&mut graph, "Beto");
        graph.add_spouse_edge(a, b).expect("marry");

        graph.detach_person(a).expect("detach");
        assert_eq!(graph.spouse_of(a), None);
        assert_eq!(graph.spouse_of(b), None);
    }

    #[test]
    fn find_by_name_picks_lowest_id() {
        let mut graph = FamilyGraph::new();
        let first = person(&mut graph, "Ana");
        let _second = person(&mut graph, "Ana");

        assert_eq!(graph.find_by_name("Ana").map(|p| p.id), Some(first));
        assert!(graph.find_by_name("Nadie").is_none());
    }

    #[test]
    fn summaries_derive_marital_status() {
        let mut graph = FamilyGraph::new();
        let a = person(&mut graph, "Ana");
        let b = person(&mut graph, "Beto");
        let c = person(&mut graph, "Clara");
        graph.add_spouse_edge(a, b).expect("marry");

        let summaries = graph.summaries();
        assert_eq!(summaries.len(), 3);
        assert!(summaries.iter().find(|s| s.id == a).expect("a").married);
        assert!(summaries.iter().find(|s| s.id == b).expect("b").married);
        assert!(!summaries.iter().find(|s| s.id == c).expect("c").married);
    }

    #[test]
    fn ancestors_include_self_at_zero() {
        let mut graph = FamilyGraph::new();
        let a = person(&mut graph, "Ana");
        let b = person(&mut graph, "Beto");
        let d = person(&mut graph, "Delia");

        graph.add_parent_edge(a, b).expect("edge");
        graph.add_parent_edge(b, d).expect("edge");

        let anc = graph.ancestors_of(a);
        assert_eq!(anc.get(&a), Some(&0));
        assert_eq!(anc.get(&b), Some(&1));
        assert_eq!(anc.get(&d), Some(&2));
    }

    #[test]
    fn ancestors_take_shortest_path() {
        let mut graph = FamilyGraph::new();
        // g is both parent and grandparent of x through two branches
        let x = person(&mut graph, "X");
        let p = person(&mut graph, "P");
        let g = person(&mut graph, "G");

        graph.add_parent_edge(x, p).expect("edge");
        graph.add_parent_edge(p, g).expect("edge");
        graph.add_parent_edge(x, g).expect("edge");

        let anc = graph.ancestors_of(x);
        assert_eq!(anc.get(&g), Some(&1));
    }
}
