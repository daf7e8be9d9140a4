//! Session driver: owns the toggle ledger for one run and dispatches to the
//! chosen algorithm.
//!
//! Every probe is re-enabled before the pool is narrowed and before the
//! session returns, except when the operator's input ends mid-question
//! ([`Verdict::Aborted`]). In that case the units that stayed disabled are
//! reported in [`SessionOutcome::left_disabled`].

use std::fmt;

use anyhow::{Result, bail};
use tracing::info;

use crate::core::pool::CandidatePool;
use crate::core::types::{Answer, Candidate, Question};
use crate::io::gateway::ToggleGateway;
use crate::io::oracle::Oracle;
use crate::probe::Prober;
use crate::scan::{ScanEvent, ScanOutcome, linear_scan};
use crate::search::{SearchEvent, SearchOutcome, bisection_search};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Scan,
    Search,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scan => f.write_str("scan"),
            Self::Search => f.write_str("search"),
        }
    }
}

/// The pool was empty after discovery and filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyPoolError {
    pub mode: Mode,
}

impl fmt::Display for EmptyPoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no candidates to {}: no enabled, unprotected units were found",
            self.mode
        )
    }
}

impl std::error::Error for EmptyPoolError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Ask whether an identified culprit should stay disabled.
    pub offer_leave_disabled: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            offer_leave_disabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// A single unit was identified.
    Identified(Candidate),
    /// The operator stopped a search early with these units left in the pool.
    Narrowed(Vec<Candidate>),
    /// No single unit explains the symptom.
    NotIsolated,
    /// Input ended while waiting for an answer.
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub mode: Mode,
    pub verdict: Verdict,
    /// Units disabled when the session ended.
    pub left_disabled: Vec<Candidate>,
    /// Units a scan could not disable.
    pub skipped: Vec<Candidate>,
}

#[derive(Debug, Clone, Copy)]
pub enum SessionEvent<'a> {
    Started { mode: Mode, pool: &'a [Candidate] },
    Scan(ScanEvent<'a>),
    Search(SearchEvent<'a>),
    Finished(&'a SessionOutcome),
}

/// Run one session over `pool`.
///
/// An empty pool is rejected with [`EmptyPoolError`] before anything is
/// toggled.
pub fn run_session<G, O, F>(
    mode: Mode,
    pool: &CandidatePool,
    gateway: &mut G,
    oracle: &mut O,
    options: &SessionOptions,
    mut on_event: F,
) -> Result<SessionOutcome>
where
    G: ToggleGateway,
    O: Oracle,
    F: FnMut(&SessionEvent<'_>) -> Result<()>,
{
    if pool.is_empty() {
        return Err(EmptyPoolError { mode }.into());
    }
    info!(%mode, units = pool.len(), "session started");
    on_event(&SessionEvent::Started {
        mode,
        pool: pool.as_slice(),
    })?;

    let mut prober = Prober::new(gateway, pool);
    let (verdict, skipped) = match mode {
        Mode::Scan => {
            let report = linear_scan(
                pool.as_slice(),
                &mut prober,
                oracle,
                |event: &ScanEvent<'_>| on_event(&SessionEvent::Scan(*event)),
            )?;
            let verdict = match report.outcome {
                ScanOutcome::Isolated(candidate) => Verdict::Identified(candidate),
                ScanOutcome::Exhausted | ScanOutcome::NothingToTest => Verdict::NotIsolated,
                ScanOutcome::Aborted { .. } => Verdict::Aborted,
            };
            (verdict, report.skipped)
        }
        Mode::Search => {
            let report = bisection_search(
                pool.as_slice(),
                &mut prober,
                oracle,
                |event: &SearchEvent<'_>| on_event(&SessionEvent::Search(*event)),
            )?;
            let verdict = match report.outcome {
                SearchOutcome::Resolved(candidate) => Verdict::Identified(candidate),
                SearchOutcome::Suspended(remaining) => Verdict::Narrowed(remaining),
                SearchOutcome::NoCandidates => Verdict::NotIsolated,
                SearchOutcome::Aborted { .. } => Verdict::Aborted,
            };
            (verdict, Vec::new())
        }
    };

    if verdict != Verdict::Aborted && !prober.state().all_restored() {
        bail!(
            "{mode} finished with units still disabled: {:?}",
            prober.state().disabled()
        );
    }

    if let Verdict::Identified(culprit) = &verdict {
        if options.offer_leave_disabled {
            let answer = oracle.ask(&Question::LeaveDisabled { candidate: culprit })?;
            if answer == Answer::Yes {
                prober.disable_permanently(culprit)?;
                info!(unit = %culprit, "culprit left disabled");
            }
        }
    }

    let outcome = SessionOutcome {
        mode,
        verdict,
        left_disabled: prober.state().disabled(),
        skipped,
    };
    info!(%mode, verdict = ?outcome.verdict, toggles = prober.toggles(), "session finished");
    on_event(&SessionEvent::Finished(&outcome))?;
    Ok(outcome)
}
