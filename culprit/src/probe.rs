//! Toggle bookkeeping for a single session.
//!
//! [`Prober`] is the session's handle on the host: every toggle goes through
//! it, the [`ToggleState`] ledger is updated only after the gateway confirms,
//! and at most one probe group is ever outstanding.

use std::fmt;

use anyhow::{Result, anyhow};
use tracing::{debug, warn};

use crate::core::pool::CandidatePool;
use crate::core::toggle_state::ToggleState;
use crate::core::types::Candidate;
use crate::io::gateway::ToggleGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Disable,
    Enable,
}

impl fmt::Display for ToggleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disable => f.write_str("disable"),
            Self::Enable => f.write_str("enable"),
        }
    }
}

/// The host refused or failed a toggle.
///
/// `left_disabled` lists every unit still disabled after the prober finished
/// its own cleanup, so the operator knows what to restore by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleFailure {
    pub action: ToggleAction,
    pub candidate: Candidate,
    pub reason: String,
    pub left_disabled: Vec<Candidate>,
}

impl fmt::Display for ToggleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not {} {}: {}", self.action, self.candidate, self.reason)?;
        if !self.left_disabled.is_empty() {
            let names: Vec<&str> = self.left_disabled.iter().map(Candidate::id).collect();
            write!(f, " (left disabled: {})", names.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ToggleFailure {}

pub struct Prober<'g, G> {
    gateway: &'g mut G,
    state: ToggleState,
    outstanding: Vec<Candidate>,
    toggles: usize,
}

impl<'g, G: ToggleGateway> Prober<'g, G> {
    pub fn new(gateway: &'g mut G, pool: &CandidatePool) -> Self {
        Self {
            gateway,
            state: ToggleState::all_enabled(pool),
            outstanding: Vec::new(),
            toggles: 0,
        }
    }

    pub fn state(&self) -> &ToggleState {
        &self.state
    }

    /// Units disabled for the current probe, if any.
    pub fn outstanding(&self) -> &[Candidate] {
        &self.outstanding
    }

    /// Number of toggles the host has confirmed so far.
    pub fn toggles(&self) -> usize {
        self.toggles
    }

    /// Disable every member of `group` as one probe.
    ///
    /// If a member cannot be disabled, the members already disabled are
    /// re-enabled before the [`ToggleFailure`] is returned.
    pub fn open(&mut self, group: &[Candidate]) -> Result<()> {
        if !self.outstanding.is_empty() {
            return Err(anyhow!(
                "a probe group of {} units is already outstanding",
                self.outstanding.len()
            ));
        }
        for (index, candidate) in group.iter().enumerate() {
            if let Err(err) = self.apply(candidate, ToggleAction::Disable) {
                warn!(unit = %candidate, error = %format!("{err:#}"), "disable failed, rolling back probe");
                self.restore(&group[..index]);
                return Err(ToggleFailure {
                    action: ToggleAction::Disable,
                    candidate: candidate.clone(),
                    reason: format!("{err:#}"),
                    left_disabled: self.state.disabled(),
                }
                .into());
            }
        }
        debug!(units = group.len(), "probe opened");
        self.outstanding = group.to_vec();
        Ok(())
    }

    /// Re-enable the outstanding probe group.
    ///
    /// Every member is attempted even after a failure; the first failure is
    /// returned.
    pub fn close(&mut self) -> Result<()> {
        let group = std::mem::take(&mut self.outstanding);
        let mut failure = None;
        for candidate in &group {
            if let Err(err) = self.apply(candidate, ToggleAction::Enable) {
                warn!(unit = %candidate, error = %format!("{err:#}"), "enable failed");
                if failure.is_none() {
                    failure = Some((candidate.clone(), format!("{err:#}")));
                }
            }
        }
        match failure {
            None => {
                debug!(units = group.len(), "probe closed");
                Ok(())
            }
            Some((candidate, reason)) => Err(ToggleFailure {
                action: ToggleAction::Enable,
                candidate,
                reason,
                left_disabled: self.state.disabled(),
            }
            .into()),
        }
    }

    /// Close the outstanding probe when `result` is an error, then pass it on.
    pub fn revert_on_error<T>(&mut self, result: Result<T>) -> Result<T> {
        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if self.outstanding.is_empty() {
            return Err(err);
        }
        match self.close() {
            Ok(()) => Err(err),
            Err(close_err) => Err(close_err.context(format!("{err:#}"))),
        }
    }

    /// Give up on the outstanding probe without re-enabling it.
    ///
    /// Returns every unit that is still disabled.
    pub fn abandon(&mut self) -> Vec<Candidate> {
        let group = std::mem::take(&mut self.outstanding);
        if !group.is_empty() {
            warn!(units = group.len(), "abandoning probe; units stay disabled");
        }
        self.state.disabled()
    }

    /// Leave `candidate` disabled as the final outcome of a session.
    ///
    /// A candidate the ledger already has disabled is not toggled again.
    pub fn disable_permanently(&mut self, candidate: &Candidate) -> Result<()> {
        if !self.outstanding.is_empty() {
            return Err(anyhow!("cannot disable {candidate} while a probe is outstanding"));
        }
        if !self.state.is_enabled(candidate) {
            debug!(unit = %candidate, "already disabled");
            return Ok(());
        }
        self.apply(candidate, ToggleAction::Disable).map_err(|err| {
            ToggleFailure {
                action: ToggleAction::Disable,
                candidate: candidate.clone(),
                reason: format!("{err:#}"),
                left_disabled: self.state.disabled(),
            }
            .into()
        })
    }

    fn restore(&mut self, group: &[Candidate]) {
        for candidate in group {
            if let Err(err) = self.apply(candidate, ToggleAction::Enable) {
                warn!(unit = %candidate, error = %format!("{err:#}"), "rollback enable failed");
            }
        }
    }

    fn apply(&mut self, candidate: &Candidate, action: ToggleAction) -> Result<()> {
        match action {
            ToggleAction::Disable => self.gateway.disable(candidate)?,
            ToggleAction::Enable => self.gateway.enable(candidate)?,
        }
        self.toggles += 1;
        self.state.set(candidate, action == ToggleAction::Enable);
        debug!(unit = %candidate, %action, "toggle applied");
        Ok(())
    }
}
