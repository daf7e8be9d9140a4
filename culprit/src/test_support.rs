//! Test-only helpers: an in-memory host, its gateway, and scripted oracles.
//!
//! The gateway and the oracles share one [`Host`], so every question records
//! which units were actually disabled at the moment it was asked.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};

use crate::core::pool::CandidatePool;
use crate::core::types::{Answer, Candidate, Question};
use crate::io::gateway::ToggleGateway;
use crate::io::oracle::Oracle;

pub type SharedHost = Rc<RefCell<Host>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Disabled(String),
    Enabled(String),
    Asked {
        kind: &'static str,
        disabled: Vec<String>,
    },
}

/// In-memory stand-in for the host environment.
#[derive(Debug, Default)]
pub struct Host {
    pub enabled: BTreeMap<String, bool>,
    pub log: Vec<HostEvent>,
    pub fail_disable: BTreeSet<String>,
    pub fail_enable: BTreeSet<String>,
}

impl Host {
    /// Create a shared host with every unit enabled.
    pub fn with_units(ids: &[&str]) -> SharedHost {
        Rc::new(RefCell::new(Self {
            enabled: ids.iter().map(|id| (id.to_string(), true)).collect(),
            ..Self::default()
        }))
    }

    pub fn disabled(&self) -> Vec<String> {
        self.enabled
            .iter()
            .filter(|(_, enabled)| !**enabled)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled.get(id).copied().unwrap_or(true)
    }

    /// Number of state changes the host performed.
    pub fn toggles(&self) -> usize {
        self.log
            .iter()
            .filter(|event| matches!(event, HostEvent::Disabled(_) | HostEvent::Enabled(_)))
            .count()
    }

    /// Question kinds in the order they were asked.
    pub fn questions(&self) -> Vec<&'static str> {
        self.asked().into_iter().map(|(kind, _)| kind).collect()
    }

    /// Each question with the units that were disabled when it was asked.
    pub fn asked(&self) -> Vec<(&'static str, Vec<String>)> {
        self.log
            .iter()
            .filter_map(|event| match event {
                HostEvent::Asked { kind, disabled } => Some((*kind, disabled.clone())),
                _ => None,
            })
            .collect()
    }

    fn record_question(&mut self, question: &Question<'_>) {
        let disabled = self.disabled();
        self.log.push(HostEvent::Asked {
            kind: question.kind(),
            disabled,
        });
    }
}

pub fn candidates(ids: &[&str]) -> Vec<Candidate> {
    ids.iter().map(|id| Candidate::new(*id)).collect()
}

pub fn pool(ids: &[&str]) -> CandidatePool {
    CandidatePool::new(candidates(ids))
}

/// Gateway over a [`SharedHost`]. Units listed in `fail_disable` or
/// `fail_enable` are rejected.
pub struct MemoryGateway {
    host: SharedHost,
}

impl MemoryGateway {
    pub fn new(host: SharedHost) -> Self {
        Self { host }
    }

    fn set(&mut self, candidate: &Candidate, enabled: bool) -> Result<()> {
        let mut host = self.host.borrow_mut();
        let rejected = if enabled {
            host.fail_enable.contains(candidate.id())
        } else {
            host.fail_disable.contains(candidate.id())
        };
        if rejected {
            return Err(anyhow!("host rejected toggle of {candidate}"));
        }
        let flag = host
            .enabled
            .get_mut(candidate.id())
            .ok_or_else(|| anyhow!("unit not found: {candidate}"))?;
        if *flag == enabled {
            return Ok(());
        }
        *flag = enabled;
        let event = if enabled {
            HostEvent::Enabled(candidate.id().to_string())
        } else {
            HostEvent::Disabled(candidate.id().to_string())
        };
        host.log.push(event);
        Ok(())
    }
}

impl ToggleGateway for MemoryGateway {
    fn disable(&mut self, candidate: &Candidate) -> Result<()> {
        self.set(candidate, false)
    }

    fn enable(&mut self, candidate: &Candidate) -> Result<()> {
        self.set(candidate, true)
    }
}

/// Oracle that replays a fixed list of answers.
pub struct ScriptedOracle {
    host: SharedHost,
    answers: VecDeque<Answer>,
}

impl ScriptedOracle {
    pub fn new(host: SharedHost, answers: Vec<Answer>) -> Self {
        Self {
            host,
            answers: answers.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Oracle for ScriptedOracle {
    fn ask(&mut self, question: &Question<'_>) -> Result<Answer> {
        self.host.borrow_mut().record_question(question);
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow!("scripted oracle has no answer for {}", question.kind()))
    }
}

/// Oracle that knows which unit is faulty and answers from the host's
/// current toggle configuration.
pub struct CulpritOracle {
    host: SharedHost,
    culprit: String,
    pub keep_going: bool,
    pub leave_disabled: bool,
}

impl CulpritOracle {
    pub fn new(host: SharedHost, culprit: &str) -> Self {
        Self {
            host,
            culprit: culprit.to_string(),
            keep_going: true,
            leave_disabled: false,
        }
    }
}

impl Oracle for CulpritOracle {
    fn ask(&mut self, question: &Question<'_>) -> Result<Answer> {
        let mut host = self.host.borrow_mut();
        host.record_question(question);
        let culprit_enabled = host.is_enabled(&self.culprit);
        let yes = match question {
            Question::SymptomPersists { .. } => culprit_enabled,
            Question::SymptomGone { .. } => !culprit_enabled,
            Question::KeepGoing { .. } => self.keep_going,
            Question::LeaveDisabled { .. } => self.leave_disabled,
        };
        Ok(if yes { Answer::Yes } else { Answer::No })
    }
}

/// Create a temporary working directory with a `units/` directory holding
/// one file per name.
pub fn unit_workspace(names: &[&str]) -> Result<tempfile::TempDir> {
    let temp = tempfile::tempdir().context("create tempdir")?;
    let units = temp.path().join("units");
    fs::create_dir_all(&units).with_context(|| format!("create {}", units.display()))?;
    for name in names {
        fs::write(units.join(name), name).with_context(|| format!("write unit {name}"))?;
    }
    Ok(temp)
}
