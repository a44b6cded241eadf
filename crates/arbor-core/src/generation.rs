//! # Generation Locator
//!
//! Computes a signed generational offset for every person reachable from
//! an anchor: ancestors negative, descendants positive, and everyone
//! connected by spouse hops or sibling detours at the anchor's own offset.
//!
//! The traversal is a plain BFS where a parent hop contributes −1, a child
//! hop +1, and a spouse hop 0. Stepping up to a shared parent and back
//! down to that parent's other children is exactly the −1/+1 detour that
//! leaves siblings (and cousins) at offset 0, so no special casing is
//! needed. First visit wins, which pins everyone to their fewest-hop
//! offset deterministically.

use crate::graph::FamilyGraph;
use crate::types::{FamilyError, PersonId};
use std::collections::{BTreeMap, VecDeque};

/// The generational offset of every person reachable from the anchor.
///
/// The anchor itself is present at offset 0.
pub fn generation_offsets(
    graph: &FamilyGraph,
    anchor: PersonId,
) -> Result<BTreeMap<PersonId, i32>, FamilyError> {
    graph.person(anchor)?;

    let mut offsets = BTreeMap::new();
    let mut queue = VecDeque::new();
    offsets.insert(anchor, 0i32);
    queue.push_back(anchor);

    while let Some(current) = queue.pop_front() {
        let offset = offsets[&current];
        let mut visit = |person: PersonId, offset: i32, queue: &mut VecDeque<PersonId>| {
            if let std::collections::btree_map::Entry::Vacant(e) = offsets.entry(person) {
                e.insert(offset);
                queue.push_back(person);
            }
        };

        for parent in graph.parents_of(current) {
            visit(parent, offset.saturating_sub(1), &mut queue);
        }
        for child in graph.children_of(current) {
            visit(child, offset.saturating_add(1), &mut queue);
        }
        if let Some(spouse) = graph.spouse_of(current) {
            visit(spouse, offset, &mut queue);
        }
    }

    Ok(offsets)
}

/// Everyone at the anchor's generational offset, excluding the anchor
/// itself. Sorted ascending by id.
pub fn same_generation(
    graph: &FamilyGraph,
    anchor: PersonId,
) -> Result<Vec<PersonId>, FamilyError> {
    let offsets = generation_offsets(graph, anchor)?;
    Ok(offsets
        .into_iter()
        .filter(|&(id, offset)| offset == 0 && id != anchor)
        .map(|(id, _)| id)
        .collect())
}

// =============================================================================
// TESTS
// =============================================================================
