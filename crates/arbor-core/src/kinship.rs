//! # Kinship Resolver
//!
//! Finds the relationship path between two people and classifies it into a
//! human-readable label. Blood kinship is resolved through the nearest
//! common ancestor: upward BFS from each subject yields a distance map,
//! the common ancestor with the fewest combined hops wins, and the pair of
//! distances `(d_from, d_to)` determines the label. Spouse edges provide
//! the in-law fallback when no common ancestor exists.

use crate::graph::FamilyGraph;
use crate::types::{FamilyError, PersonId};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// KINSHIP LABELS
// =============================================================================

/// A classified relationship, stated relative to the query's `from` side:
/// `Parent` means "`to` is `from`'s parent".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kinship {
    Parent,
    Child,
    Sibling,
    Spouse,
    /// `greats = 0` is a plain grandparent, 1 a great-grandparent, and so on.
    Grandparent { greats: u32 },
    Grandchild { greats: u32 },
    /// `greats = 0` is an uncle/aunt, 1 a granduncle/aunt, and so on.
    UncleAunt { greats: u32 },
    NephewNiece { greats: u32 },
    /// Degree `min(d1, d2) − 1`, removed `|d1 − d2|` generations.
    Cousin { degree: u32, removed: u32 },
    /// A blood relationship reached through a spouse edge.
    InLaw(Box<Kinship>),
}

impl Kinship {
    /// The same structural relationship stated from the other side.
    #[must_use]
    pub fn reciprocal(&self) -> Kinship {
        match self {
            Self::Parent => Self::Child,
            Self::Child => Self::Parent,
            Self::Sibling => Self::Sibling,
            Self::Spouse => Self::Spouse,
            Self::Grandparent { greats } => Self::Grandchild { greats: *greats },
            Self::Grandchild { greats } => Self::Grandparent { greats: *greats },
            Self::UncleAunt { greats } => Self::NephewNiece { greats: *greats },
            Self::NephewNiece { greats } => Self::UncleAunt { greats: *greats },
            Self::Cousin { degree, removed } => Self::Cousin {
                degree: *degree,
                removed: *removed,
            },
            Self::InLaw(inner) => Self::InLaw(Box::new(inner.reciprocal())),
        }
    }
}

impl fmt::Display for Kinship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parent => write!(f, "parent"),
            Self::Child => write!(f, "child"),
            Self::Sibling => write!(f, "sibling"),
            Self::Spouse => write!(f, "spouse"),
            Self::Grandparent { greats } => {
                write_greats(f, *greats)?;
                write!(f, "grandparent")
            }
            Self::Grandchild { greats } => {
                write_greats(f, *greats)?;
                write!(f, "grandchild")
            }
            Self::UncleAunt { greats: 0 } => write!(f, "uncle/aunt"),
            Self::UncleAunt { greats } => {
                write_greats(f, greats - 1)?;
                write!(f, "granduncle/aunt")
            }
            Self::NephewNiece { greats: 0 } => write!(f, "nephew/niece"),
            Self::NephewNiece { greats } => {
                write_greats(f, greats - 1)?;
                write!(f, "grandnephew/niece")
            }
            Self::Cousin { degree, removed } => {
                write!(f, "{} cousin", ordinal(*degree))?;
                match removed {
                    0 => Ok(()),
                    1 => write!(f, " once removed"),
                    2 => write!(f, " twice removed"),
                    n => write!(f, " {} times removed", n),
                }
            }
            Self::InLaw(inner) => write!(f, "{}-in-law", inner),
        }
    }
}

fn write_greats(f: &mut fmt::Formatter<'_>, greats: u32) -> fmt::Result {
    for _ in 0..greats {
        write!(f, "great-")?;
    }
    Ok(())
}

fn ordinal(n: u32) -> String {
    match n {
        1 => "first".into(),
        2 => "second".into(),
        3 => "third".into(),
        4 => "fourth".into(),
        5 => "fifth".into(),
        6 => "sixth".into(),
        7 => "seventh".into(),
        8 => "eighth".into(),
        9 => "ninth".into(),
        n => match n % 10 {
            1 if n % 100 != 11 => format!("{}st", n),
            2 if n % 100 != 12 => format!("{}nd", n),
            3 if n % 100 != 13 => format!("{}rd", n),
            _ => format!("{}th", n),
        },
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Describe how `to` is related to `from`.
///
/// Blood kinship wins; spouse and in-law relationships are the fallback.
/// Fails with `InvalidQuery` when the two ids are identical (rejected
/// before any search) and `NoRelationshipFound` when the two people are
/// not connected at all.
pub fn describe_kinship(
    graph: &FamilyGraph,
    from: PersonId,
    to: PersonId,
) -> Result<Kinship, FamilyError> {
    if from == to {
        return Err(FamilyError::InvalidQuery);
    }
    graph.person(from)?;
    graph.person(to)?;

    if graph.spouse_of(from) == Some(to) {
        return Ok(Kinship::Spouse);
    }
    if let Some((_, d_from, d_to)) = blood_path(graph, from, to) {
        return Ok(classify(d_from, d_to));
    }

    // In-law fallback: a blood relative of the spouse, or the spouse of a
    // blood relative. Both sides may be married, so both readings are
    // candidates; the fewest combined hops wins, ties broken by the id of
    // the spouse the path runs through. The tie-break is invariant under
    // swapping the query direction, which keeps kinship symmetric.
    let mut candidates: Vec<(u32, PersonId, Kinship)> = Vec::new();
    if let Some(s) = graph.spouse_of(from)
        && let Some((total, d1, d2)) = blood_path(graph, s, to)
    {
        candidates.push((total, s, classify(d1, d2)));
    }
    if let Some(t) = graph.spouse_of(to)
        && let Some((total, d1, d2)) = blood_path(graph, from, t)
    {
        candidates.push((total, t, classify(d1, d2)));
    }
    candidates.sort_by_key(|(total, via, _)| (*total, *via));
    match candidates.into_iter().next() {
        Some((_, _, kinship)) => Ok(Kinship::InLaw(Box::new(kinship))),
        None => Err(FamilyError::NoRelationshipFound),
    }
}

/// The blood path through the nearest common ancestor, if any, as
/// `(combined hops, d_from, d_to)`.
fn blood_path(graph: &FamilyGraph, from: PersonId, to: PersonId) -> Option<(u32, u32, u32)> {
    if from == to {
        return None;
    }
    let from_dist = graph.ancestors_of(from);
    let to_dist = graph.ancestors_of(to);

    // Smallest combined hop count wins; a grandparent reachable twice
    // through different branches resolves to the shorter reading. Ties
    // break on the smallest ancestor id for determinism.
    let mut best: Option<(u32, PersonId, u32, u32)> = None;
    for (&ancestor, &d_from) in &from_dist {
        let Some(&d_to) = to_dist.get(&ancestor) else {
            continue;
        };
        let total = d_from + d_to;
        if best.is_none_or(|(t, a, _, _)| (total, ancestor) < (t, a)) {
            best = Some((total, ancestor, d_from, d_to));
        }
    }

    best.map(|(total, _, d_from, d_to)| (total, d_from, d_to))
}

/// Map the distance pair to a label. `d_from` is the hop count from the
/// query subject to the common ancestor, `d_to` the counterpart's.
fn classify(d_from: u32, d_to: u32) -> Kinship {
    match (d_from, d_to) {
        (1, 0) => Kinship::Parent,
        (0, 1) => Kinship::Child,
        (d, 0) => Kinship::Grandparent { greats: d - 2 },
        (0, d) => Kinship::Grandchild { greats: d - 2 },
        (1, 1) => Kinship::Sibling,
        (d, 1) => Kinship::UncleAunt { greats: d - 2 },
        (1, d) => Kinship::NephewNiece { greats: d - 2 },
        (a, b) => Kinship::Cousin {
            degree: a.min(b) - 1,
            removed: a.abs_diff(b),
        },
    }
}

// =============================================================================
// TESTS
// =============================================================================
