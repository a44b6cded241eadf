//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers. Mutations
//! take the registry's write lock for their whole duration; queries run
//! under the shared read lock and observe a consistent snapshot.

use super::{
    AppState,
    types::{
        ConfirmRequest, ConfirmResponse, ErrorResponse, FamilyMemberRequest, HealthResponse,
        KinshipResponse, PendingJson, PersonJson, PersonRequest, SpouseRequest, StatusResponse,
        SummaryJson, status_for,
    },
};
use arbor_core::{Direction, FamilyError, PendingLinkId, PersonId};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

/// Current wall-clock time in seconds, as handed to the core.
fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

fn error_reply(e: &FamilyError) -> Response {
    (status_for(e), Json(ErrorResponse::from(e))).into_response()
}

// =============================================================================
// HEALTH & STATUS HANDLERS
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Graph status: people, confirmed edges, open pending links.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry.read().await;
    let response = StatusResponse {
        people: registry.person_count(),
        edges: registry.edge_count(),
        pending_links: registry.pending_count(),
    };
    (StatusCode::OK, Json(response))
}

// =============================================================================
// PERSON LIFECYCLE HANDLERS
// =============================================================================

/// Register a new person.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<PersonRequest>,
) -> Response {
    let attrs = match request.into_attrs() {
        Ok(a) => a,
        Err(e) => return error_reply(&e),
    };

    let mut registry = state.registry.write().await;
    match registry.register(attrs) {
        Ok(person) => (
            StatusCode::CREATED,
            Json(PersonJson::from_person(&person, false)),
        )
            .into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Update a person's attribute fields.
pub async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<PersonRequest>,
) -> Response {
    let attrs = match request.into_attrs() {
        Ok(a) => a,
        Err(e) => return error_reply(&e),
    };

    let mut registry = state.registry.write().await;
    match registry.update(PersonId(id), attrs) {
        Ok(person) => {
            let married = registry.graph().spouse_of(person.id).is_some();
            (StatusCode::OK, Json(PersonJson::from_person(&person, married))).into_response()
        }
        Err(e) => error_reply(&e),
    }
}

/// Delete a person. 204 on success, 409 while confirmed edges remain.
pub async fn delete_handler(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let mut registry = state.registry.write().await;
    match registry.delete_person(PersonId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Administrative detach: drop every confirmed edge touching the person.
pub async fn detach_handler(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let mut registry = state.registry.write().await;
    match registry.detach_person(PersonId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_reply(&e),
    }
}

/// List everyone as lightweight summaries.
pub async fn list_handler(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry.read().await;
    let summaries: Vec<SummaryJson> = registry
        .summaries()
        .into_iter()
        .map(SummaryJson::from)
        .collect();
    (StatusCode::OK, Json(summaries))
}

// =============================================================================
// PROPOSAL HANDLERS
// =============================================================================

/// Propose a family member for a person and echo their tree, with the new
/// claim still pending.
pub async fn family_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<FamilyMemberRequest>,
) -> Response {
    let proposer = PersonId(id);
    let mut registry = state.registry.write().await;

    let proposed = match (request.member, request.member_id) {
        (Some(member), None) => match member.into_attrs() {
            Ok(attrs) => registry
                .propose_family_member(proposer, attrs, request.role, now_secs())
                .map(|_| ()),
            Err(e) => Err(e),
        },
        (None, Some(member_id)) => registry
            .propose_existing(proposer, PersonId(member_id), request.role, now_secs())
            .map(|_| ()),
        _ => Err(FamilyError::InvalidAttributes(
            "provide exactly one of `member` or `member_id`".into(),
        )),
    };

    if let Err(e) = proposed {
        return error_reply(&e);
    }
    match registry.tree(proposer, Direction::Full, None) {
        Ok(tree) => (StatusCode::OK, Json(tree)).into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Propose a spouse for a person and echo their tree.
pub async fn spouse_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<SpouseRequest>,
) -> Response {
    let proposer = PersonId(id);
    let attrs = match request.spouse.into_attrs() {
        Ok(a) => a,
        Err(e) => return error_reply(&e),
    };

    let mut registry = state.registry.write().await;
    if let Err(e) = registry.propose_spouse(proposer, attrs, now_secs()) {
        return error_reply(&e);
    }
    match registry.tree(proposer, Direction::Full, None) {
        Ok(tree) => (StatusCode::OK, Json(tree)).into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Settle a pending link as its target: accept or decline.
pub async fn confirm_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<ConfirmRequest>,
) -> Response {
    let accept = request.accept.unwrap_or(true);
    let link = PendingLinkId(request.pending_link_id);

    let mut registry = state.registry.write().await;
    match registry.resolve_confirmation(PersonId(id), link, accept) {
        Ok(status) => (StatusCode::OK, Json(ConfirmResponse::from_status(status))).into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Pending links awaiting this person's acknowledgment, oldest first.
pub async fn pending_handler(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let registry = state.registry.read().await;
    match registry.pending_confirmations(PersonId(id)) {
        Ok(links) => {
            let pending: Vec<PendingJson> = links.iter().map(PendingJson::from).collect();
            (StatusCode::OK, Json(pending)).into_response()
        }
        Err(e) => error_reply(&e),
    }
}

// =============================================================================
// QUERY HANDLERS
// =============================================================================

/// Tree query parameters: optional direction (default full family) and
/// optional positive depth bound.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeQuery {
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub depth: Option<usize>,
}

fn parse_direction(raw: Option<&str>) -> Result<Direction, FamilyError> {
    match raw {
        None | Some("full") => Ok(Direction::Full),
        Some("ancestors") => Ok(Direction::Ancestors),
        Some("descendants") => Ok(Direction::Descendants),
        Some(_) => Err(FamilyError::InvalidQuery),
    }
}

/// Render a person's genealogy tree.
pub async fn tree_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<TreeQuery>,
) -> Response {
    let direction = match parse_direction(params.direction.as_deref()) {
        Ok(d) => d,
        Err(e) => return error_reply(&e),
    };

    let registry = state.registry.read().await;
    match registry.tree(PersonId(id), direction, params.depth) {
        Ok(tree) => (StatusCode::OK, Json(tree)).into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Render the tree of the first person carrying the given name.
pub async fn tree_by_name_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<TreeQuery>,
) -> Response {
    let direction = match parse_direction(params.direction.as_deref()) {
        Ok(d) => d,
        Err(e) => return error_reply(&e),
    };

    let registry = state.registry.read().await;
    match registry.tree_by_name(&name, direction, params.depth) {
        Ok(tree) => (StatusCode::OK, Json(tree)).into_response(),
        Err(e) => error_reply(&e),
    }
}

/// Everyone at the person's generational offset.
pub async fn same_generation_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Response {
    let registry = state.registry.read().await;
    match registry.same_generation(PersonId(id)) {
        Ok(peers) => {
            let summaries: Vec<SummaryJson> = peers.into_iter().map(SummaryJson::from).collect();
            (StatusCode::OK, Json(summaries)).into_response()
        }
        Err(e) => error_reply(&e),
    }
}

/// Kinship query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct KinshipQuery {
    pub target_name: String,
}

/// Describe how the named person is related to this one.
pub async fn kinship_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<KinshipQuery>,
) -> Response {
    let registry = state.registry.read().await;
    match registry.kinship(PersonId(id), &params.target_name) {
        Ok(kinship) => (
            StatusCode::OK,
            Json(KinshipResponse {
                person_id: id,
                target_name: params.target_name,
                relationship: kinship.to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_reply(&e),
    }
}
