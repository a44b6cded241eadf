//! # Tree Builder
//!
//! Renders a genealogy subtree from an anchor person: breadth-first
//! expansion along parent edges in the requested direction, with the
//! spouse of every visited person attached at the same depth (marriage is
//! not generational). Visited-set deduplication by person id keeps the
//! result a tree even when someone is reachable through multiple paths.

use crate::graph::FamilyGraph;
use crate::limits::MAX_TREE_DEPTH;
use crate::types::{FamilyError, PersonId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

// =============================================================================
// OUTPUT STRUCTURES
// =============================================================================

/// Which generational direction the expansion follows.
///
/// Always explicit; the core never guesses a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Parents, grandparents, and so on.
    Ancestors,
    /// Children, grandchildren, and so on.
    Descendants,
    /// Both directions at once.
    Full,
}

impl Direction {
    const fn upward(self) -> bool {
        matches!(self, Self::Ancestors | Self::Full)
    }

    const fn downward(self) -> bool {
        matches!(self, Self::Descendants | Self::Full)
    }
}

/// Lightweight reference to a person attached to a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: PersonId,
    pub name: String,
}

/// One person in the rendered tree.
///
/// `depth` counts generational hops from the root (0 at the root). The
/// spouse is a reference, not a node: it is never expanded further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: PersonId,
    pub name: String,
    pub depth: usize,
    pub spouse: Option<PersonRef>,
    pub parents: Vec<TreeNode>,
    pub children: Vec<TreeNode>,
}

/// A rendered genealogy tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyTree {
    pub root: TreeNode,
}

impl FamilyTree {
    /// Every person id appearing as a node, in pre-order.
    ///
    /// Spouse references are not nodes and are excluded.
    #[must_use]
    pub fn flatten_ids(&self) -> Vec<PersonId> {
        let mut ids = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            ids.push(node.id);
            stack.extend(node.parents.iter());
            stack.extend(node.children.iter());
        }
        ids
    }
}

// =============================================================================
// CONSTRUCTION
// =============================================================================

/// Which slot of the site node an attached person hangs from.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Parent,
    Child,
}

/// Build the genealogy tree rooted at `root`.
///
/// `max_depth` bounds generational recursion: `None` means the engine-wide
/// bound, `Some(d)` must be a positive integer. Depth 0 is the root itself;
/// spouse hops do not increase depth.
pub fn build_tree(
    graph: &FamilyGraph,
    root: PersonId,
    direction: Direction,
    max_depth: Option<usize>,
) -> Result<FamilyTree, FamilyError> {
    graph.person(root)?;
    let limit = match max_depth {
        None => MAX_TREE_DEPTH,
        Some(0) => return Err(FamilyError::InvalidQuery),
        Some(d) => d.min(MAX_TREE_DEPTH),
    };

    // BFS over parent edges, recording where each newly visited person
    // attaches. First visit wins, so everyone lands at their shallowest
    // position and appears exactly once.
    let mut visited = BTreeSet::new();
    visited.insert(root);
    let mut queue = VecDeque::new();
    queue.push_back((root, 0usize));
    let mut attachments: Vec<(PersonId, PersonId, Slot, usize)> = Vec::new();

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= limit {
            continue;
        }
        if direction.upward() {
            for parent in graph.parents_of(current) {
                if visited.insert(parent) {
                    attachments.push((parent, current, Slot::Parent, depth + 1));
                    queue.push_back((parent, depth + 1));
                }
            }
        }
        if direction.downward() {
            for child in graph.children_of(current) {
                if visited.insert(child) {
                    attachments.push((child, current, Slot::Child, depth + 1));
                    queue.push_back((child, depth + 1));
                }
            }
        }
    }

    // Materialize one node per visited person, then fold the attachment
    // list in reverse BFS order so subtrees are complete before they move
    // into their site.
    let mut nodes: BTreeMap<PersonId, TreeNode> = BTreeMap::new();
    nodes.insert(root, make_node(graph, root, 0)?);
    for &(person, _, _, depth) in &attachments {
        nodes.insert(person, make_node(graph, person, depth)?);
    }

    for &(person, site, slot, _) in attachments.iter().rev() {
        let node = nodes.remove(&person).ok_or(FamilyError::InvalidQuery)?;
        let site_node = nodes.get_mut(&site).ok_or(FamilyError::InvalidQuery)?;
        match slot {
            Slot::Parent => site_node.parents.push(node),
            Slot::Child => site_node.children.push(node),
        }
    }

    let mut root_node = nodes.remove(&root).ok_or(FamilyError::InvalidQuery)?;
    sort_recursive(&mut root_node);
    Ok(FamilyTree { root: root_node })
}

fn make_node(graph: &FamilyGraph, id: PersonId, depth: usize) -> Result<TreeNode, FamilyError> {
    let person = graph.person(id)?;
    let spouse = match graph.spouse_of(id) {
        Some(s) => Some(PersonRef {
            id: s,
            name: graph.person(s)?.name.clone(),
        }),
        None => None,
    };
    Ok(TreeNode {
        id,
        name: person.name.clone(),
        depth,
        spouse,
        parents: Vec::new(),
        children: Vec::new(),
    })
}

fn sort_recursive(node: &mut TreeNode) {
    node.parents.sort_by_key(|n| n.id);
    node.children.sort_by_key(|n| n.id);
    for child in node.parents.iter_mut().chain(node.children.iter_mut()) {
        sort_recursive(child);
    }
}

// =============================================================================
// TESTS
// =============================================================================
