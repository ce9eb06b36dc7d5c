use std::collections::HashMap;

use uuid::Uuid;

use crate::models::candidate::CandidateRecord;

/// Identifies one issued refresh. Tickets for the same job are strictly
/// increasing in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    job_id: Uuid,
    seq: u64,
}

#[derive(Debug, Default)]
struct LedgerSlot {
    records: Vec<CandidateRecord>,
    issued: u64,
    applied: u64,
}

/// Per-session read-through cache of candidate records, keyed by job id.
///
/// Never patched in place: a slot only changes when a store query result is
/// applied, or when a successful clear empties it. A result whose ticket is
/// older than the last applied one is stale and is dropped, so the newest
/// issued refresh wins regardless of arrival order.
#[derive(Debug, Default)]
pub struct LedgerCache {
    slots: HashMap<Uuid, LedgerSlot>,
}

impl LedgerCache {
    pub fn issue(&mut self, job_id: Uuid) -> RefreshTicket {
        let slot = self.slots.entry(job_id).or_default();
        slot.issued += 1;
        RefreshTicket {
            job_id,
            seq: slot.issued,
        }
    }

    /// Returns false when the result was stale and discarded. A result for a
    /// slot dropped since the ticket was issued is stale too.
    pub fn apply(&mut self, ticket: RefreshTicket, records: Vec<CandidateRecord>) -> bool {
        let Some(slot) = self.slots.get_mut(&ticket.job_id) else {
            return false;
        };
        if ticket.seq <= slot.applied {
            return false;
        }
        slot.records = records;
        slot.applied = ticket.seq;
        true
    }

    /// Empties the slot and invalidates every refresh issued so far.
    pub fn clear(&mut self, job_id: Uuid) {
        let slot = self.slots.entry(job_id).or_default();
        slot.records.clear();
        slot.applied = slot.issued;
    }

    /// Drops every slot except the one for `job_id`.
    pub fn retain_only(&mut self, job_id: Uuid) {
        self.slots.retain(|id, _| *id == job_id);
    }

    pub fn records(&self, job_id: Uuid) -> &[CandidateRecord] {
        self.slots
            .get(&job_id)
            .map(|slot| slot.records.as_slice())
            .unwrap_or_default()
    }
}
