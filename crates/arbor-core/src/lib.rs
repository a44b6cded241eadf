//! # arbor-core
//!
//! The deterministic family-graph engine for Arbor - THE LOGIC.
//!
//! This crate maintains a graph of people connected by parentage and
//! marriage and answers structural queries over it: genealogy trees,
//! same-generation peers, and human-readable kinship labels. Relationship
//! claims go through a two-party confirmation workflow before they become
//! authoritative edges.
//!
//! ## Architectural Constraints
//!
//! The engine:
//! - Is the ONLY place where family state exists (stateful)
//! - Enforces every structural invariant at mutation time: the parent
//!   relation stays a DAG, at most two parents per person, at most one
//!   active spouse
//! - Is pure Rust: no async, no network dependencies, no wall clock —
//!   timestamps are plain seconds supplied by the caller
//! - Uses `BTreeMap`/`BTreeSet` exclusively for deterministic ordering

// =============================================================================
// MODULES
// =============================================================================

pub mod generation;
pub mod graph;
pub mod kinship;
pub mod limits;
pub mod registry;
pub mod tree;
pub mod types;
pub mod workflow;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    FamilyError, KinRole, LinkKind, LinkStatus, PendingLink, PendingLinkId, Person, PersonAttrs,
    PersonId, PersonSummary,
};

// =============================================================================
// RE-EXPORTS: Graph Engine
// =============================================================================

pub use generation::{generation_offsets, same_generation};
pub use graph::FamilyGraph;
pub use kinship::{Kinship, describe_kinship};
pub use registry::FamilyRegistry;
pub use tree::{Direction, FamilyTree, PersonRef, TreeNode, build_tree};
pub use workflow::ConfirmationLedger;
