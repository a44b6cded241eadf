//! # Engine Limits
//!
//! Hardcoded runtime bounds for the Arbor engine.
//!
//! The engine starts with zero data but fixed rules. These limits are
//! compiled into the binary and are immutable at runtime; every query and
//! mutation must stay computationally bounded by them.

/// Maximum number of confirmed parents a person may have.
///
/// Two biological parent slots. A confirmed parent edge beyond this count
/// is rejected with `CapacityExceeded`.
pub const MAX_PARENTS: usize = 2;

/// Maximum traversal depth for tree building.
///
/// The "unbounded" tree variant is still clamped here so that queries stay
/// computationally bounded on pathological graphs.
pub const MAX_TREE_DEPTH: usize = 64;

/// Default time-to-live for a pending link, in seconds (30 days).
///
/// A Pending link older than this is marked Expired by the periodic sweep.
/// A TTL of zero disables expiry entirely.
pub const DEFAULT_PENDING_TTL_SECS: u64 = 30 * 24 * 60 * 60;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for a person's display name.
///
/// Names longer than this are rejected before any graph mutation.
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum length for the free-form birth/death fields.
pub const MAX_FIELD_LENGTH: usize = 64;

/// Maximum length for the free-form notes field.
///
/// This prevents memory exhaustion from oversized profile payloads.
pub const MAX_NOTES_LENGTH: usize = 4096;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_capacity_is_two() {
        // Biological parent slots must be exactly 2
        assert_eq!(MAX_PARENTS, 2);
    }

    #[test]
    fn tree_depth_is_bounded() {
        assert!(MAX_TREE_DEPTH >= 1);
    }
}
