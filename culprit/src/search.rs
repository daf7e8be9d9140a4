//! Bisection search over the candidate pool.
//!
//! Each step disables the front half of the remaining pool (the probe group),
//! asks whether the symptom is gone, re-enables the probe group, and keeps the
//! half the answer implicates. The faulty unit stays inside the remaining pool
//! as long as every answer describes the configuration that was live when the
//! question was asked.

use anyhow::{Result, anyhow};
use tracing::{debug, info, warn};

use crate::core::pool::{bisect_split, max_probe_questions};
use crate::core::types::{Answer, Candidate, Question};
use crate::io::gateway::ToggleGateway;
use crate::io::oracle::Oracle;
use crate::probe::Prober;

/// Progress notifications for the render callback.
#[derive(Debug, Clone, Copy)]
pub enum SearchEvent<'a> {
    /// `probe` is disabled, `held` is enabled, and the question is next.
    Probing {
        step: usize,
        probe: &'a [Candidate],
        held: &'a [Candidate],
    },
    /// The answer for `step` narrowed the pool to `pool`.
    Narrowed {
        step: usize,
        answer: Answer,
        pool: &'a [Candidate],
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The pool was empty; nothing was toggled.
    NoCandidates,
    /// Exactly one candidate remains.
    Resolved(Candidate),
    /// The operator stopped early; the pool is the best narrowing so far.
    Suspended(Vec<Candidate>),
    /// Input ended mid-search. Units in `left_disabled` were not re-enabled.
    Aborted {
        pool: Vec<Candidate>,
        left_disabled: Vec<Candidate>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    /// Completed narrowing steps.
    pub steps: usize,
    /// "Is the symptom gone" questions asked.
    pub questions: usize,
    /// Continue/stop questions asked.
    pub control_questions: usize,
}

/// Narrow `pool` down to a single candidate.
///
/// Any toggle failure ends the search with an error after the probe group has
/// been rolled back.
pub fn bisection_search<G, O, F>(
    pool: &[Candidate],
    prober: &mut Prober<'_, G>,
    oracle: &mut O,
    mut on_event: F,
) -> Result<SearchReport>
where
    G: ToggleGateway,
    O: Oracle,
    F: FnMut(&SearchEvent<'_>) -> Result<()>,
{
    let mut report = SearchReport {
        outcome: SearchOutcome::NoCandidates,
        steps: 0,
        questions: 0,
        control_questions: 0,
    };
    if pool.is_empty() {
        warn!("no candidates to search");
        return Ok(report);
    }

    debug!(
        units = pool.len(),
        max_questions = max_probe_questions(pool.len()),
        "search started"
    );

    let mut remaining = pool.to_vec();
    while remaining.len() > 1 {
        let step = report.steps + 1;
        let (probe, held) = bisect_split(&remaining);
        debug!(step, probe = probe.len(), held = held.len(), "probing");

        prober.open(probe)?;
        let rendered = on_event(&SearchEvent::Probing { step, probe, held });
        prober.revert_on_error(rendered)?;
        let answer = oracle.ask(&Question::SymptomGone { probe });
        let answer = prober.revert_on_error(answer)?;
        report.questions += 1;

        if answer == Answer::Abort {
            report.outcome = SearchOutcome::Aborted {
                pool: remaining.clone(),
                left_disabled: prober.abandon(),
            };
            return Ok(report);
        }
        prober.close()?;

        remaining = if answer == Answer::Yes {
            probe.to_vec()
        } else {
            held.to_vec()
        };
        report.steps = step;
        info!(step, ?answer, remaining = remaining.len(), "pool narrowed");
        on_event(&SearchEvent::Narrowed {
            step,
            answer,
            pool: &remaining,
        })?;

        if remaining.len() > 1 {
            let control = oracle.ask(&Question::KeepGoing {
                remaining: remaining.len(),
            })?;
            report.control_questions += 1;
            match control {
                Answer::Yes => {}
                Answer::No => {
                    info!(remaining = remaining.len(), "search suspended");
                    report.outcome = SearchOutcome::Suspended(remaining);
                    return Ok(report);
                }
                Answer::Abort => {
                    report.outcome = SearchOutcome::Aborted {
                        pool: remaining,
                        left_disabled: prober.abandon(),
                    };
                    return Ok(report);
                }
            }
        }
    }

    let culprit = remaining
        .pop()
        .ok_or_else(|| anyhow!("bisection narrowed to an empty pool"))?;
    info!(unit = %culprit, steps = report.steps, "search resolved");
    report.outcome = SearchOutcome::Resolved(culprit);
    Ok(report)
}
