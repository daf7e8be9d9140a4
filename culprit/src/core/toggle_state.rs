//! Toggle State ledger: the enabled flag of every candidate in a session.
//!
//! The ledger is owned by the session and only ever updated after the host
//! confirms a toggle, so it never claims a state the host has not reached.

use std::collections::BTreeMap;

use crate::core::pool::CandidatePool;
use crate::core::types::Candidate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleState {
    enabled: BTreeMap<Candidate, bool>,
}

impl ToggleState {
    /// Every pool member starts enabled (discovery only yields enabled units).
    pub fn all_enabled(pool: &CandidatePool) -> Self {
        Self {
            enabled: pool.iter().map(|c| (c.clone(), true)).collect(),
        }
    }

    pub fn set(&mut self, candidate: &Candidate, enabled: bool) {
        self.enabled.insert(candidate.clone(), enabled);
    }

    /// Unknown candidates are reported as enabled.
    pub fn is_enabled(&self, candidate: &Candidate) -> bool {
        self.enabled.get(candidate).copied().unwrap_or(true)
    }

    /// Currently disabled candidates, in identifier order.
    pub fn disabled(&self) -> Vec<Candidate> {
        self.enabled
            .iter()
            .filter(|(_, enabled)| !**enabled)
            .map(|(candidate, _)| candidate.clone())
            .collect()
    }

    pub fn all_restored(&self) -> bool {
        self.enabled.values().all(|enabled| *enabled)
    }
}
