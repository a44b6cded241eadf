//! # Confirmation Ledger
//!
//! Bookkeeping for relationship claims that are not yet mutually
//! acknowledged. The ledger exclusively owns the set of pending links and
//! their state machine:
//!
//! ```text
//! Pending -> Confirmed   (target accepts, edge materialized by the registry)
//! Pending -> Rejected    (target declines, or materialization fails)
//! Pending -> Expired     (TTL sweep or administrative detach)
//! ```
//!
//! No transition leaves a terminal state. The ledger never mutates graph
//! edges itself; it only gates and records outcomes while the registry
//! performs materialization.

use crate::types::{FamilyError, KinRole, LinkStatus, PendingLink, PendingLinkId, PersonId};
use std::collections::BTreeMap;

// =============================================================================
// LEDGER IMPLEMENTATION
// =============================================================================

/// The set of all pending links, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationLedger {
    links: BTreeMap<PendingLinkId, PendingLink>,
    next_link_id: u64,
}

impl ConfirmationLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a proposed relationship awaiting the target's acknowledgment.
    ///
    /// Rejects self-proposals, and duplicates: at most one Pending link of
    /// a given edge kind may target a person at a time.
    pub fn propose(
        &mut self,
        proposer: PersonId,
        target: PersonId,
        role: KinRole,
        now_secs: u64,
    ) -> Result<PendingLinkId, FamilyError> {
        if proposer == target {
            return Err(FamilyError::SelfReference);
        }
        let duplicate = self.links.values().any(|l| {
            l.status == LinkStatus::Pending && l.target == target && l.kind() == role.kind()
        });
        if duplicate {
            return Err(FamilyError::DuplicatePending { target });
        }

        let id = PendingLinkId(self.next_link_id);
        self.next_link_id = self.next_link_id.saturating_add(1);
        self.links.insert(
            id,
            PendingLink {
                id,
                proposer,
                target,
                role,
                created_at_secs: now_secs,
                status: LinkStatus::Pending,
            },
        );
        Ok(id)
    }

    /// Lookup a link by id.
    pub fn link(&self, id: PendingLinkId) -> Result<&PendingLink, FamilyError> {
        self.links.get(&id).ok_or(FamilyError::LinkNotFound(id))
    }

    /// Gate a confirmation attempt: the link must exist, must still be
    /// Pending, and `confirming` must be its target.
    pub fn gate(
        &self,
        id: PendingLinkId,
        confirming: PersonId,
    ) -> Result<&PendingLink, FamilyError> {
        let link = self.link(id)?;
        if link.status.is_terminal() {
            return Err(FamilyError::NotPending(id));
        }
        if link.target != confirming {
            return Err(FamilyError::Forbidden);
        }
        Ok(link)
    }

    /// Move a Pending link into a terminal status.
    ///
    /// Terminal links are immutable; settling one again is `NotPending`.
    pub fn settle(&mut self, id: PendingLinkId, status: LinkStatus) -> Result<(), FamilyError> {
        let link = self
            .links
            .get_mut(&id)
            .ok_or(FamilyError::LinkNotFound(id))?;
        if link.status.is_terminal() {
            return Err(FamilyError::NotPending(id));
        }
        link.status = status;
        Ok(())
    }

    /// All non-terminal links targeting a person, oldest first.
    ///
    /// Ordered by creation time ascending (ties by link id), since that is
    /// the natural "what are you waiting to act on" order.
    #[must_use]
    pub fn pending_for(&self, target: PersonId) -> Vec<&PendingLink> {
        let mut pending: Vec<&PendingLink> = self
            .links
            .values()
            .filter(|l| l.status == LinkStatus::Pending && l.target == target)
            .collect();
        pending.sort_by_key(|l| (l.created_at_secs, l.id));
        pending
    }

    /// Number of links still Pending.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.links
            .values()
            .filter(|l| l.status == LinkStatus::Pending)
            .count()
    }

    /// Expire every Pending link older than the TTL. Returns the number of
    /// links expired; a TTL of zero disables expiry.
    pub fn expire_stale(&mut self, now_secs: u64, ttl_secs: u64) -> usize {
        if ttl_secs == 0 {
            return 0;
        }
        let mut expired = 0;
        for link in self.links.values_mut() {
            if link.status == LinkStatus::Pending
                && link.created_at_secs.saturating_add(ttl_secs) <= now_secs
            {
                link.status = LinkStatus::Expired;
                expired += 1;
            }
        }
        expired
    }

    /// Expire every non-terminal link that references a person, as either
    /// proposer or target. Used before the person is deleted so no pending
    /// link dangles on a dead id. Returns the number of links expired.
    pub fn detach_person(&mut self, id: PersonId) -> usize {
        let mut expired = 0;
        for link in self.links.values_mut() {
            if link.status == LinkStatus::Pending && (link.proposer == id || link.target == id) {
                link.status = LinkStatus::Expired;
                expired += 1;
            }
        }
        expired
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    #[test]
    fn propose_rejects_self_reference() {
        let mut ledger = ConfirmationLedger::new();
        let err = ledger
            .propose(PersonId(1), PersonId(1), KinRole::Mother, NOW)
            .expect_err("self");
        assert_eq!(err, FamilyError::SelfReference);
    }

    #[test]
    fn propose_rejects_duplicate_pending_of_same_kind() {
        let mut ledger = ConfirmationLedger::new();
        ledger
            .propose(PersonId(1), PersonId(2), KinRole::Mother, NOW)
            .expect("first");

        // Same kind (parent), even under a different role
        let err = ledger
            .propose(PersonId(3), PersonId(2), KinRole::Father, NOW)
            .expect_err("duplicate");
        assert_eq!(err, FamilyError::DuplicatePending { target: PersonId(2) });

        // A spouse link to the same target is a different kind
        ledger
            .propose(PersonId(3), PersonId(2), KinRole::Spouse, NOW)
            .expect("different kind");
    }

    #[test]
    fn duplicate_allowed_after_settlement() {
        let mut ledger = ConfirmationLedger::new();
        let id = ledger
            .propose(PersonId(1), PersonId(2), KinRole::Spouse, NOW)
            .expect("first");
        ledger.settle(id, LinkStatus::Rejected).expect("settle");

        ledger
            .propose(PersonId(1), PersonId(2), KinRole::Spouse, NOW + 1)
            .expect("re-propose after rejection");
    }

    #[test]
    fn gate_enforces_target_identity() {
        let mut ledger = ConfirmationLedger::new();
        let id = ledger
            .propose(PersonId(1), PersonId(2), KinRole::Spouse, NOW)
            .expect("propose");

        assert_eq!(
            ledger.gate(id, PersonId(1)).map(|_| ()),
            Err(FamilyError::Forbidden)
        );
        ledger.gate(id, PersonId(2)).expect("target may confirm");
    }

    #[test]
    fn gate_rejects_settled_links() {
        let mut ledger = ConfirmationLedger::new();
        let id = ledger
            .propose(PersonId(1), PersonId(2), KinRole::Spouse, NOW)
            .expect("propose");
        ledger.settle(id, LinkStatus::Confirmed).expect("settle");

        assert_eq!(
            ledger.gate(id, PersonId(2)).map(|_| ()),
            Err(FamilyError::NotPending(id))
        );
    }

    #[test]
    fn settle_is_terminal() {
        let mut ledger = ConfirmationLedger::new();
        let id = ledger
            .propose(PersonId(1), PersonId(2), KinRole::Mother, NOW)
            .expect("propose");

        ledger.settle(id, LinkStatus::Rejected).expect("settle");
        assert_eq!(
            ledger.settle(id, LinkStatus::Confirmed),
            Err(FamilyError::NotPending(id))
        );
        assert_eq!(ledger.link(id).expect("link").status, LinkStatus::Rejected);
    }

    #[test]
    fn pending_for_is_oldest_first() {
        let mut ledger = ConfirmationLedger::new();
        let late = ledger
            .propose(PersonId(1), PersonId(9), KinRole::Spouse, NOW + 100)
            .expect("propose");
        let early = ledger
            .propose(PersonId(2), PersonId(9), KinRole::Mother, NOW)
            .expect("propose");

        let pending: Vec<PendingLinkId> =
            ledger.pending_for(PersonId(9)).iter().map(|l| l.id).collect();
        assert_eq!(pending, vec![early, late]);
    }

    #[test]
    fn expire_stale_respects_ttl() {
        let mut ledger = ConfirmationLedger::new();
        let old = ledger
            .propose(PersonId(1), PersonId(2), KinRole::Mother, NOW)
            .expect("propose");
        let fresh = ledger
            .propose(PersonId(1), PersonId(3), KinRole::Mother, NOW + 500)
            .expect("propose");

        let expired = ledger.expire_stale(NOW + 1000, 600);
        assert_eq!(expired, 1);
        assert_eq!(ledger.link(old).expect("old").status, LinkStatus::Expired);
        assert_eq!(ledger.link(fresh).expect("fresh").status, LinkStatus::Pending);

        // TTL 0 disables the sweep
        assert_eq!(ledger.expire_stale(NOW + 10_000, 0), 0);
    }

    #[test]
    fn detach_person_expires_both_directions() {
        let mut ledger = ConfirmationLedger::new();
        let as_target = ledger
            .propose(PersonId(1), PersonId(2), KinRole::Mother, NOW)
            .expect("propose");
        let as_proposer = ledger
            .propose(PersonId(2), PersonId(3), KinRole::Spouse, NOW)
            .expect("propose");
        let unrelated = ledger
            .propose(PersonId(4), PersonId(5), KinRole::Spouse, NOW)
            .expect("propose");

        assert_eq!(ledger.detach_person(PersonId(2)), 2);
        assert_eq!(
            ledger.link(as_target).expect("l").status,
            LinkStatus::Expired
        );
        assert_eq!(
            ledger.link(as_proposer).expect("l").status,
            LinkStatus::Expired
        );
        assert_eq!(
            ledger.link(unrelated).expect("l").status,
            LinkStatus::Pending
        );
    }
}
