//! Shared deterministic types for the search core.
//!
//! These types define stable contracts between the algorithms and their
//! collaborators. They carry no host state and compare by value.

use std::fmt;

/// One toggleable unit under suspicion.
///
/// Identity is the opaque identifier supplied by discovery (for the directory
/// host, the entry's file name). Human-readable names are resolved separately
/// by a [`crate::io::render::Namer`] and never take part in comparisons.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Candidate {
    id: String,
}

impl Candidate {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Operator reply to a single question.
///
/// `Abort` is the out-of-band signal raised when the wait for an answer is
/// interrupted. It means "stop now and leave toggles as they are".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Abort,
}

/// A question posed to the oracle.
///
/// Each variant describes the toggle configuration that is live at the moment
/// it is asked, so an oracle can answer about the current state only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question<'a> {
    /// Linear scan: does the symptom persist with `candidate` disabled?
    /// `Yes` continues the scan, `No` isolates the candidate and stops.
    SymptomPersists { candidate: &'a Candidate },
    /// Bisection: is the symptom gone with the probe group disabled?
    SymptomGone { probe: &'a [Candidate] },
    /// Bisection control question asked after each narrowing step.
    KeepGoing { remaining: usize },
    /// Asked once a single culprit is known.
    LeaveDisabled { candidate: &'a Candidate },
}

impl Question<'_> {
    /// Operator-facing prompt text (without the answer hint).
    pub fn prompt(&self) -> String {
        match self {
            Self::SymptomPersists { .. } => "Does the problem still happen?".to_string(),
            Self::SymptomGone { probe } => format!(
                "Is the problem gone with {} unit{} disabled?",
                probe.len(),
                if probe.len() == 1 { "" } else { "s" }
            ),
            Self::KeepGoing { remaining } => {
                format!("{remaining} units remain. Continue narrowing?")
            }
            Self::LeaveDisabled { .. } => "Leave the identified unit disabled?".to_string(),
        }
    }

    /// Short stable label used in logs and test transcripts.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SymptomPersists { .. } => "symptom_persists",
            Self::SymptomGone { .. } => "symptom_gone",
            Self::KeepGoing { .. } => "keep_going",
            Self::LeaveDisabled { .. } => "leave_disabled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_compare_by_identifier() {
        assert_eq!(Candidate::new("a.jar"), Candidate::new(String::from("a.jar")));
        assert_ne!(Candidate::new("a.jar"), Candidate::new("A.jar"));
    }

    #[test]
    fn symptom_gone_prompt_pluralises_group_size() {
        let one = [Candidate::new("a")];
        let two = [Candidate::new("a"), Candidate::new("b")];
        assert!(
            Question::SymptomGone { probe: &one }
                .prompt()
                .contains("1 unit disabled")
        );
        assert!(
            Question::SymptomGone { probe: &two }
                .prompt()
                .contains("2 units disabled")
        );
    }
}
