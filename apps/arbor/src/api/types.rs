//! # API Request/Response Types
//!
//! JSON structures for the HTTP API, plus the mapping from core error
//! kinds to HTTP statuses. Requests are validated here at the boundary
//! before they reach the engine; every `FamilyError` kind translates to a
//! distinguishable `{ error, message }` body.

use arbor_core::{
    FamilyError, KinRole, LinkStatus, PendingLink, Person, PersonAttrs, PersonSummary,
};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH / STATUS RESPONSES
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Graph status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub people: usize,
    pub edges: usize,
    pub pending_links: usize,
}

// =============================================================================
// PERSON REQUEST/RESPONSE
// =============================================================================

/// Attribute payload for registration and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRequest {
    pub name: String,
    #[serde(default)]
    pub born: Option<String>,
    #[serde(default)]
    pub died: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PersonRequest {
    /// Convert to a validated attribute set.
    ///
    /// Validation runs here at the API boundary so oversized or empty
    /// payloads are rejected before any lock is taken.
    pub fn into_attrs(self) -> Result<PersonAttrs, FamilyError> {
        let attrs = PersonAttrs {
            name: self.name,
            born: self.born,
            died: self.died,
            notes: self.notes,
        };
        attrs.validate()?;
        Ok(attrs)
    }
}

/// Full person representation with derived marital status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonJson {
    pub id: u64,
    pub name: String,
    pub born: Option<String>,
    pub died: Option<String>,
    pub notes: Option<String>,
    pub married: bool,
}

impl PersonJson {
    pub fn from_person(person: &Person, married: bool) -> Self {
        Self {
            id: person.id.0,
            name: person.name.clone(),
            born: person.born.clone(),
            died: person.died.clone(),
            notes: person.notes.clone(),
            married,
        }
    }
}

/// Lightweight person projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryJson {
    pub id: u64,
    pub name: String,
    pub married: bool,
}

impl From<PersonSummary> for SummaryJson {
    fn from(summary: PersonSummary) -> Self {
        Self {
            id: summary.id.0,
            name: summary.name,
            married: summary.married,
        }
    }
}

// =============================================================================
// PROPOSAL REQUESTS
// =============================================================================

/// Propose a family member: either a new person (`member`) or an
/// already-registered one (`member_id`), never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyMemberRequest {
    #[serde(default)]
    pub member: Option<PersonRequest>,
    #[serde(default)]
    pub member_id: Option<u64>,
    pub role: KinRole,
}

/// Propose a spouse (always a newly registered person).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpouseRequest {
    pub spouse: PersonRequest,
}

/// Settle a pending link as its target. `accept` defaults to true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub pending_link_id: u64,
    #[serde(default)]
    pub accept: Option<bool>,
}

/// Acknowledgment for a settled link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmResponse {
    pub status: String,
    pub message: String,
}

impl ConfirmResponse {
    pub fn from_status(status: LinkStatus) -> Self {
        let (status, message) = match status {
            LinkStatus::Confirmed => ("confirmed", "Relationship confirmed."),
            LinkStatus::Rejected => ("rejected", "Relationship declined."),
            LinkStatus::Pending => ("pending", "Relationship still pending."),
            LinkStatus::Expired => ("expired", "Relationship proposal expired."),
        };
        Self {
            status: status.to_string(),
            message: message.to_string(),
        }
    }
}

// =============================================================================
// PENDING LINKS
// =============================================================================

/// Pending link summary with an RFC 3339 creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingJson {
    pub id: u64,
    pub proposer: u64,
    pub target: u64,
    pub role: KinRole,
    pub status: LinkStatus,
    pub created_at: String,
}

impl From<&PendingLink> for PendingJson {
    fn from(link: &PendingLink) -> Self {
        let created_at = chrono::DateTime::from_timestamp(link.created_at_secs as i64, 0)
            .map_or_else(|| link.created_at_secs.to_string(), |t| t.to_rfc3339());
        Self {
            id: link.id.0,
            proposer: link.proposer.0,
            target: link.target.0,
            role: link.role,
            status: link.status,
            created_at,
        }
    }
}

// =============================================================================
// QUERY RESPONSES
// =============================================================================

/// Kinship query response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinshipResponse {
    pub person_id: u64,
    pub target_name: String,
    pub relationship: String,
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// Error body: a stable machine-readable kind plus a human message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<&FamilyError> for ErrorResponse {
    fn from(e: &FamilyError) -> Self {
        Self {
            error: e.kind().to_string(),
            message: e.to_string(),
        }
    }
}

/// The HTTP status each core error kind translates to.
pub fn status_for(e: &FamilyError) -> StatusCode {
    match e {
        FamilyError::PersonNotFound(_)
        | FamilyError::NameNotFound(_)
        | FamilyError::LinkNotFound(_)
        | FamilyError::NoRelationshipFound => StatusCode::NOT_FOUND,

        FamilyError::SelfReference
        | FamilyError::InvalidQuery
        | FamilyError::InvalidAttributes(_) => StatusCode::BAD_REQUEST,

        FamilyError::Forbidden => StatusCode::FORBIDDEN,

        FamilyError::CycleDetected { .. }
        | FamilyError::CapacityExceeded(_)
        | FamilyError::AlreadyMarried(_)
        | FamilyError::DuplicatePending { .. }
        | FamilyError::NotPending(_)
        | FamilyError::HasActiveRelationships(_) => StatusCode::CONFLICT,
    }
}
