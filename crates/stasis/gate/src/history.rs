//! Per-invariant bounded audit trail.
//!
//! Each invariant gets its own FIFO ring. When a ring is full the oldest
//! record is dropped silently, bounding memory under contest storms.

use std::collections::{HashMap, VecDeque};

use stasis_types::{InvariantId, StasisRecord};

#[derive(Debug)]
pub(crate) struct AuditTrail {
    rings: HashMap<InvariantId, VecDeque<StasisRecord>>,
    limit: usize,
}

impl AuditTrail {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            rings: HashMap::new(),
            limit,
        }
    }

    pub(crate) fn append(&mut self, record: StasisRecord) {
        let ring = self.rings.entry(record.invariant.clone()).or_default();
        ring.push_back(record);
        while ring.len() > self.limit {
            ring.pop_front();
        }
    }

    /// The newest `limit` records for `invariant`, oldest first.
    pub(crate) fn recent(&self, invariant: &str, limit: usize) -> Vec<StasisRecord> {
        match self.rings.get(invariant) {
            Some(ring) => {
                let skip = ring.len().saturating_sub(limit);
                ring.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }
}
