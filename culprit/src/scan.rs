//! Linear scan: disable each candidate on its own and ask.

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::core::types::{Answer, Candidate, Question};
use crate::io::gateway::ToggleGateway;
use crate::io::oracle::Oracle;
use crate::probe::{Prober, ToggleFailure};

/// Progress notifications for the render callback.
#[derive(Debug, Clone, Copy)]
pub enum ScanEvent<'a> {
    /// `current` is disabled and about to be asked about.
    Probing {
        index: usize,
        pool: &'a [Candidate],
        current: &'a Candidate,
    },
    /// `candidate` could not be disabled and was skipped.
    Skipped {
        candidate: &'a Candidate,
        failure: &'a ToggleFailure,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The pool was empty; nothing was toggled.
    NothingToTest,
    /// The symptom went away while this candidate was disabled.
    Isolated(Candidate),
    /// Every candidate was tried and the symptom persisted each time.
    Exhausted,
    /// Input ended while a candidate was disabled; it was not re-enabled.
    Aborted { left_disabled: Vec<Candidate> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub outcome: ScanOutcome,
    /// Candidates that were disabled and asked about.
    pub visited: usize,
    /// Candidates that could not be disabled.
    pub skipped: Vec<Candidate>,
}

/// Visit each candidate in pool order.
///
/// The candidate is re-enabled after every answer, whatever it was. A
/// candidate that cannot be disabled is reported and skipped; a candidate that
/// cannot be re-enabled ends the scan with an error.
pub fn linear_scan<G, O, F>(
    pool: &[Candidate],
    prober: &mut Prober<'_, G>,
    oracle: &mut O,
    mut on_event: F,
) -> Result<ScanReport>
where
    G: ToggleGateway,
    O: Oracle,
    F: FnMut(&ScanEvent<'_>) -> Result<()>,
{
    let mut report = ScanReport {
        outcome: ScanOutcome::Exhausted,
        visited: 0,
        skipped: Vec::new(),
    };
    if pool.is_empty() {
        info!("nothing to test");
        report.outcome = ScanOutcome::NothingToTest;
        return Ok(report);
    }

    for (index, candidate) in pool.iter().enumerate() {
        if let Err(err) = prober.open(std::slice::from_ref(candidate)) {
            let failure = err.downcast::<ToggleFailure>()?;
            warn!(unit = %candidate, "skipping unit that could not be disabled");
            on_event(&ScanEvent::Skipped {
                candidate,
                failure: &failure,
            })?;
            report.skipped.push(candidate.clone());
            continue;
        }
        report.visited += 1;

        let rendered = on_event(&ScanEvent::Probing {
            index,
            pool,
            current: candidate,
        });
        prober.revert_on_error(rendered)?;
        let answer = oracle.ask(&Question::SymptomPersists { candidate });
        let answer = prober.revert_on_error(answer)?;
        debug!(unit = %candidate, ?answer, "scan answer");

        if answer == Answer::Abort {
            let left_disabled = prober.abandon();
            report.outcome = ScanOutcome::Aborted { left_disabled };
            return Ok(report);
        }
        prober.close()?;

        if answer == Answer::No {
            info!(unit = %candidate, visited = report.visited, "unit isolated");
            report.outcome = ScanOutcome::Isolated(candidate.clone());
            return Ok(report);
        }
    }

    info!(visited = report.visited, skipped = report.skipped.len(), "scan exhausted");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        CulpritOracle, Host, HostEvent, MemoryGateway, ScriptedOracle, SharedHost, candidates,
        pool,
    };

    fn scan(host: &SharedHost, ids: &[&str], oracle: &mut impl Oracle) -> Result<ScanReport> {
        let pool = pool(ids);
        let mut gateway = MemoryGateway::new(host.clone());
        let mut prober = Prober::new(&mut gateway, &pool);
        linear_scan(pool.as_slice(), &mut prober, oracle, |_: &ScanEvent<'_>| Ok(()))
    }

    #[test]
    fn persisting_symptom_visits_each_unit_once_and_restores_state() {
        let host = Host::with_units(&["a", "b", "c"]);
        let mut oracle = ScriptedOracle::new(host.clone(), vec![Answer::Yes; 3]);

        let report = scan(&host, &["a", "b", "c"], &mut oracle).expect("scan");
        assert_eq!(report.outcome, ScanOutcome::Exhausted);
        assert_eq!(report.visited, 3);
        assert!(host.borrow().disabled().is_empty());

        let asked = host.borrow().asked();
        assert_eq!(
            asked,
            vec![
                ("symptom_persists", vec!["a".to_string()]),
                ("symptom_persists", vec!["b".to_string()]),
                ("symptom_persists", vec!["c".to_string()]),
            ]
        );
    }

    #[test]
    fn each_unit_is_reenabled_before_the_next_is_disabled() {
        let host = Host::with_units(&["a", "b"]);
        let mut oracle = ScriptedOracle::new(host.clone(), vec![Answer::Yes; 2]);
        scan(&host, &["a", "b"], &mut oracle).expect("scan");

        let asked = |disabled: &str| HostEvent::Asked {
            kind: "symptom_persists",
            disabled: vec![disabled.to_string()],
        };
        assert_eq!(
            host.borrow().log,
            vec![
                HostEvent::Disabled("a".to_string()),
                asked("a"),
                HostEvent::Enabled("a".to_string()),
                HostEvent::Disabled("b".to_string()),
                asked("b"),
                HostEvent::Enabled("b".to_string()),
            ]
        );
    }

    #[test]
    fn stop_after_first_unit_is_deterministic_across_runs() {
        let host = Host::with_units(&["a", "b", "c"]);
        let mut logs = Vec::new();
        for _ in 0..2 {
            host.borrow_mut().log.clear();
            let mut oracle = ScriptedOracle::new(host.clone(), vec![Answer::No]);
            let report = scan(&host, &["a", "b", "c"], &mut oracle).expect("scan");
            assert_eq!(report.outcome, ScanOutcome::Isolated(Candidate::new("a")));
            assert_eq!(report.visited, 1);
            assert!(host.borrow().disabled().is_empty());
            logs.push(host.borrow().log.clone());
        }
        assert_eq!(logs[0], logs[1]);
        assert_eq!(logs[0].len(), 3);
    }

    #[test]
    fn empty_pool_reports_nothing_to_test() {
        let host = Host::with_units(&[]);
        let mut oracle = ScriptedOracle::new(host.clone(), Vec::new());
        let report = scan(&host, &[], &mut oracle).expect("scan");
        assert_eq!(report.outcome, ScanOutcome::NothingToTest);
        assert_eq!(host.borrow().toggles(), 0);
        assert!(host.borrow().questions().is_empty());
    }

    #[test]
    fn single_unit_pool_runs_one_iteration() {
        for (answer, expected) in [
            (Answer::Yes, ScanOutcome::Exhausted),
            (Answer::No, ScanOutcome::Isolated(Candidate::new("solo"))),
        ] {
            let host = Host::with_units(&["solo"]);
            let mut oracle = ScriptedOracle::new(host.clone(), vec![answer]);
            let report = scan(&host, &["solo"], &mut oracle).expect("scan");

            assert_eq!(report.outcome, expected);
            assert_eq!(report.visited, 1);
            assert_eq!(
                host.borrow().log,
                vec![
                    HostEvent::Disabled("solo".to_string()),
                    HostEvent::Asked {
                        kind: "symptom_persists",
                        disabled: vec!["solo".to_string()],
                    },
                    HostEvent::Enabled("solo".to_string()),
                ]
            );
            assert!(host.borrow().disabled().is_empty());
        }
    }

    #[test]
    fn culprit_oracle_isolates_faulty_unit() {
        let host = Host::with_units(&["a", "b", "c", "d", "e"]);
        let mut oracle = CulpritOracle::new(host.clone(), "c");
        let report = scan(&host, &["a", "b", "c", "d", "e"], &mut oracle).expect("scan");
        assert_eq!(report.outcome, ScanOutcome::Isolated(Candidate::new("c")));
        assert_eq!(report.visited, 3);
        assert!(host.borrow().disabled().is_empty());
    }

    #[test]
    fn unit_that_cannot_be_disabled_is_skipped_without_a_question() {
        let host = Host::with_units(&["a", "b", "c"]);
        host.borrow_mut().fail_disable.insert("b".to_string());
        let mut oracle = ScriptedOracle::new(host.clone(), vec![Answer::Yes; 2]);

        let pool = pool(&["a", "b", "c"]);
        let mut gateway = MemoryGateway::new(host.clone());
        let mut prober = Prober::new(&mut gateway, &pool);
        let mut skipped_events = Vec::new();
        let report = linear_scan(pool.as_slice(), &mut prober, &mut oracle, |event| {
            if let ScanEvent::Skipped { candidate, failure } = event {
                skipped_events.push((candidate.id().to_string(), failure.to_string()));
            }
            Ok(())
        })
        .expect("scan");

        assert_eq!(report.outcome, ScanOutcome::Exhausted);
        assert_eq!(report.visited, 2);
        assert_eq!(report.skipped, candidates(&["b"]));
        assert_eq!(host.borrow().questions().len(), 2);
        assert_eq!(skipped_events.len(), 1);
        assert!(skipped_events[0].1.contains("could not disable b"));
    }

    #[test]
    fn abort_leaves_current_unit_disabled() {
        let host = Host::with_units(&["a", "b", "c"]);
        let mut oracle = ScriptedOracle::new(host.clone(), vec![Answer::Yes, Answer::Abort]);
        let report = scan(&host, &["a", "b", "c"], &mut oracle).expect("scan");
        assert_eq!(
            report.outcome,
            ScanOutcome::Aborted {
                left_disabled: candidates(&["b"])
            }
        );
        assert_eq!(host.borrow().disabled(), vec!["b"]);
    }

    #[test]
    fn enable_failure_ends_scan_with_error() {
        let host = Host::with_units(&["a", "b"]);
        host.borrow_mut().fail_enable.insert("a".to_string());
        let mut oracle = ScriptedOracle::new(host.clone(), vec![Answer::Yes; 2]);
        let err = scan(&host, &["a", "b"], &mut oracle).unwrap_err();
        let failure = err.downcast_ref::<ToggleFailure>().expect("toggle failure");
        assert_eq!(failure.left_disabled, candidates(&["a"]));
        assert_eq!(host.borrow().questions().len(), 1);
    }

    #[test]
    fn oracle_error_reenables_current_unit() {
        let host = Host::with_units(&["a", "b"]);
        let mut oracle = ScriptedOracle::new(host.clone(), Vec::new());
        let err = scan(&host, &["a", "b"], &mut oracle).unwrap_err();
        assert!(err.to_string().contains("no answer"));
        assert!(host.borrow().disabled().is_empty());
    }
}
