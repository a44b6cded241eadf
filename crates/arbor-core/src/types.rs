//! # Core Type Definitions
//!
//! This module contains all core types for the Arbor family graph:
//! - Identifiers (`PersonId`, `PendingLinkId`)
//! - Person records and their mutable attribute set
//! - Relationship roles and pending-link state (`KinRole`, `LinkStatus`, `PendingLink`)
//! - The error type (`FamilyError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` where they key a `BTreeMap`/`BTreeSet`
//! - Carry no wall-clock state; timestamps are plain seconds supplied by the caller

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::limits::{MAX_FIELD_LENGTH, MAX_NAME_LENGTH, MAX_NOTES_LENGTH};

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier for a person, assigned on creation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(pub u64);

/// Unique identifier for a pending link in the confirmation ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PendingLinkId(pub u64);

// =============================================================================
// PERSON
// =============================================================================

/// A person record in the family graph.
///
/// Edges reference people by `PersonId` only; the graph store is the single
/// source of truth for these attribute fields. Marital status is derived
/// from spouse edges and is deliberately absent here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// The identifier assigned at registration.
    pub id: PersonId,
    /// Display name.
    pub name: String,
    /// Free-form birth data (the source system stores opaque strings).
    pub born: Option<String>,
    /// Free-form death data.
    pub died: Option<String>,
    /// Free-form profile notes.
    pub notes: Option<String>,
}

impl Person {
    /// Build a person from validated attributes.
    #[must_use]
    pub fn new(id: PersonId, attrs: PersonAttrs) -> Self {
        Self {
            id,
            name: attrs.name,
            born: attrs.born,
            died: attrs.died,
            notes: attrs.notes,
        }
    }
}

/// The mutable attribute set of a person.
///
/// This is what registration and update operations accept; identity and
/// edges are never part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonAttrs {
    pub name: String,
    pub born: Option<String>,
    pub died: Option<String>,
    pub notes: Option<String>,
}

impl PersonAttrs {
    /// Attributes carrying only a display name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validate the attribute set against the engine limits.
    ///
    /// Returns `FamilyError::InvalidAttributes` naming the offending field.
    pub fn validate(&self) -> Result<(), FamilyError> {
        if self.name.trim().is_empty() {
            return Err(FamilyError::InvalidAttributes("name must not be empty".into()));
        }
        if self.name.len() > MAX_NAME_LENGTH {
            return Err(FamilyError::InvalidAttributes(format!(
                "name exceeds {} bytes",
                MAX_NAME_LENGTH
            )));
        }
        for (field, value) in [("born", &self.born), ("died", &self.died)] {
            if let Some(v) = value
                && v.len() > MAX_FIELD_LENGTH
            {
                return Err(FamilyError::InvalidAttributes(format!(
                    "{} exceeds {} bytes",
                    field, MAX_FIELD_LENGTH
                )));
            }
        }
        if let Some(notes) = &self.notes
            && notes.len() > MAX_NOTES_LENGTH
        {
            return Err(FamilyError::InvalidAttributes(format!(
                "notes exceed {} bytes",
                MAX_NOTES_LENGTH
            )));
        }
        Ok(())
    }
}

/// Lightweight person projection for list endpoints.
///
/// `married` is derived from spouse edges at projection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub id: PersonId,
    pub name: String,
    pub married: bool,
}

// =============================================================================
// RELATIONSHIP ROLES & PENDING LINKS
// =============================================================================

/// The role a proposed relative plays relative to the proposer.
///
/// A closed set, not a string field: the role implies both the edge kind
/// and, for parent links, the direction of the materialized edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KinRole {
    /// The target is a parent of the proposer.
    Mother,
    /// The target is a parent of the proposer.
    Father,
    /// The target is a child of the proposer.
    Son,
    /// The target is a child of the proposer.
    Daughter,
    /// The target is the proposer's spouse.
    Spouse,
}

impl KinRole {
    /// The edge kind this role materializes into.
    #[must_use]
    pub const fn kind(self) -> LinkKind {
        match self {
            Self::Mother | Self::Father | Self::Son | Self::Daughter => LinkKind::Parent,
            Self::Spouse => LinkKind::Spouse,
        }
    }

    /// Stable lowercase name, matching the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mother => "mother",
            Self::Father => "father",
            Self::Son => "son",
            Self::Daughter => "daughter",
            Self::Spouse => "spouse",
        }
    }
}

/// The two edge kinds of the family graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Directed parent → child edge.
    Parent,
    /// Undirected, exclusive marriage edge.
    Spouse,
}

/// Lifecycle of a pending link.
///
/// `Pending` is the only non-terminal state; there is no transition out of
/// the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Pending,
    Confirmed,
    Rejected,
    Expired,
}

impl LinkStatus {
    /// Whether the status admits no further transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A proposed relationship awaiting acknowledgment by the target person.
///
/// Only the target may confirm or decline. The corresponding graph edge is
/// materialized on confirmation; a rejected or expired link leaves the
/// graph unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLink {
    pub id: PendingLinkId,
    /// The person who claimed the relationship.
    pub proposer: PersonId,
    /// The counterpart who must acknowledge it.
    pub target: PersonId,
    /// What the target would be to the proposer.
    pub role: KinRole,
    /// Creation time in seconds, as supplied by the caller.
    pub created_at_secs: u64,
    pub status: LinkStatus,
}

impl PendingLink {
    /// The edge kind this link would materialize into.
    #[must_use]
    pub const fn kind(&self) -> LinkKind {
        self.role.kind()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors produced by the Arbor engine.
///
/// Every invariant violation is detected synchronously inside the component
/// that owns the invariant and reported as a typed failure — never a
/// partial mutation, never an internal retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FamilyError {
    /// The requested person is not registered.
    #[error("person not found: {0:?}")]
    PersonNotFound(PersonId),

    /// No registered person carries the requested name.
    #[error("no person named {0:?}")]
    NameNotFound(String),

    /// The requested pending link does not exist.
    #[error("pending link not found: {0:?}")]
    LinkNotFound(PendingLinkId),

    /// A person cannot be related to themselves.
    #[error("a person cannot be related to themselves")]
    SelfReference,

    /// The edge would make a person their own ancestor.
    #[error("edge {parent:?} -> {child:?} would create an ancestry cycle")]
    CycleDetected { child: PersonId, parent: PersonId },

    /// The person already has two confirmed parents.
    #[error("{0:?} already has two confirmed parents")]
    CapacityExceeded(PersonId),

    /// The person already has an active spouse edge.
    #[error("{0:?} already has an active spouse")]
    AlreadyMarried(PersonId),

    /// A pending link of the same kind already targets this person.
    #[error("a pending link of the same kind already targets {target:?}")]
    DuplicatePending { target: PersonId },

    /// Only the link's target may confirm or decline it.
    #[error("only the link target may confirm or decline")]
    Forbidden,

    /// The link has already reached a terminal status.
    #[error("pending link {0:?} is already settled")]
    NotPending(PendingLinkId),

    /// The two people share no discoverable relationship.
    #[error("no relationship found between the two people")]
    NoRelationshipFound,

    /// Degenerate query input, e.g. identical source and target.
    #[error("degenerate query input")]
    InvalidQuery,

    /// Deletion is blocked while confirmed edges reference the person.
    #[error("{0:?} still has confirmed relationships")]
    HasActiveRelationships(PersonId),

    /// The supplied attribute set failed validation.
    #[error("invalid attributes: {0}")]
    InvalidAttributes(String),
}

impl FamilyError {
    /// Stable machine-readable kind, used by boundary layers to translate
    /// errors without losing information.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PersonNotFound(_) => "person_not_found",
            Self::NameNotFound(_) => "name_not_found",
            Self::LinkNotFound(_) => "link_not_found",
            Self::SelfReference => "self_reference",
            Self::CycleDetected { .. } => "cycle_detected",
            Self::CapacityExceeded(_) => "capacity_exceeded",
            Self::AlreadyMarried(_) => "already_married",
            Self::DuplicatePending { .. } => "duplicate_pending",
            Self::Forbidden => "forbidden",
            Self::NotPending(_) => "not_pending",
            Self::NoRelationshipFound => "no_relationship_found",
            Self::InvalidQuery => "invalid_query",
            Self::HasActiveRelationships(_) => "has_active_relationships",
            Self::InvalidAttributes(_) => "invalid_attributes",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attrs_validate_rejects_empty_name() {
        let attrs = PersonAttrs::named("   ");
        assert!(matches!(
            attrs.validate(),
            Err(FamilyError::InvalidAttributes(_))
        ));
    }

    #[test]
    fn attrs_validate_rejects_oversized_name() {
        let attrs = PersonAttrs::named("x".repeat(MAX_NAME_LENGTH + 1));
        assert!(attrs.validate().is_err());
    }

    #[test]
    fn attrs_validate_accepts_plain_name() {
        let attrs = PersonAttrs::named("Ana");
        assert!(attrs.validate().is_ok());
    }

    #[test]
    fn role_kind_mapping() {
        assert_eq!(KinRole::Mother.kind(), LinkKind::Parent);
        assert_eq!(KinRole::Daughter.kind(), LinkKind::Parent);
        assert_eq!(KinRole::Spouse.kind(), LinkKind::Spouse);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!LinkStatus::Pending.is_terminal());
        assert!(LinkStatus::Confirmed.is_terminal());
        assert!(LinkStatus::Rejected.is_terminal());
        assert!(LinkStatus::Expired.is_terminal());
    }

    #[test]
    fn error_kinds_are_distinct_slugs() {
        let kinds = [
            FamilyError::SelfReference.kind(),
            FamilyError::Forbidden.kind(),
            FamilyError::InvalidQuery.kind(),
            FamilyError::NoRelationshipFound.kind(),
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in kinds.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
