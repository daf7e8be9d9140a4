//! Operator-facing rendering of session progress.
//!
//! Rendering is plugged into the session as a callback, so screen clearing and
//! name formatting never leak into the search algorithms.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::types::{Answer, Candidate};
use crate::scan::ScanEvent;
use crate::search::SearchEvent;
use crate::session::{SessionEvent, SessionOutcome, Verdict};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Maps a candidate to a human-readable name. Used for display only.
pub trait Namer {
    fn display_name(&self, candidate: &Candidate) -> String;
}

/// Display name is the unit's file name without its last extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStemNamer;

impl Namer for FileStemNamer {
    fn display_name(&self, candidate: &Candidate) -> String {
        Path::new(candidate.id())
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| candidate.id().to_string())
    }
}

pub struct ConsoleRenderer<W, N> {
    out: W,
    namer: N,
    clear_screen: bool,
    disabled_suffix: String,
}

impl<W: Write, N: Namer> ConsoleRenderer<W, N> {
    pub fn new(out: W, namer: N, clear_screen: bool, disabled_suffix: impl Into<String>) -> Self {
        Self {
            out,
            namer,
            clear_screen,
            disabled_suffix: disabled_suffix.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render(&mut self, event: &SessionEvent<'_>) -> Result<()> {
        match event {
            SessionEvent::Started { mode, pool } => {
                writeln!(self.out, "culprit {mode}: {} units under test", pool.len())?;
                writeln!(
                    self.out,
                    "Answering nothing (end of input) or killing the process while a question \
                     is pending leaves the units under test disabled."
                )?;
            }
            SessionEvent::Scan(event) => self.render_scan(event)?,
            SessionEvent::Search(event) => self.render_search(event)?,
            SessionEvent::Finished(outcome) => self.render_outcome(outcome)?,
        }
        self.out.flush().context("flush output")
    }

    fn render_scan(&mut self, event: &ScanEvent<'_>) -> Result<()> {
        match event {
            ScanEvent::Probing {
                index,
                pool,
                current,
            } => {
                self.clear()?;
                writeln!(
                    self.out,
                    "\nUnit {}/{} disabled: {}",
                    index + 1,
                    pool.len(),
                    self.namer.display_name(current)
                )?;
                for candidate in *pool {
                    let marker = if candidate == *current { ">" } else { " " };
                    writeln!(self.out, "  {marker} {}", self.namer.display_name(candidate))?;
                }
            }
            ScanEvent::Skipped { candidate, failure } => {
                writeln!(
                    self.out,
                    "! skipping {}: {failure}",
                    self.namer.display_name(candidate)
                )?;
            }
        }
        Ok(())
    }

    fn render_search(&mut self, event: &SearchEvent<'_>) -> Result<()> {
        match event {
            SearchEvent::Probing { step, probe, held } => {
                self.clear()?;
                writeln!(
                    self.out,
                    "\nStep {step}: {} disabled, {} enabled",
                    probe.len(),
                    held.len()
                )?;
                for candidate in *probe {
                    writeln!(self.out, "  - {}", self.namer.display_name(candidate))?;
                }
                for candidate in *held {
                    writeln!(self.out, "  + {}", self.namer.display_name(candidate))?;
                }
            }
            SearchEvent::Narrowed { step, answer, pool } => {
                let side = if *answer == Answer::Yes {
                    "disabled"
                } else {
                    "enabled"
                };
                writeln!(
                    self.out,
                    "Step {step}: the problem is in the {side} group ({} left)",
                    pool.len()
                )?;
            }
        }
        Ok(())
    }

    fn render_outcome(&mut self, outcome: &SessionOutcome) -> Result<()> {
        writeln!(self.out)?;
        match &outcome.verdict {
            Verdict::Identified(candidate) => writeln!(
                self.out,
                "Culprit: {} ({})",
                self.namer.display_name(candidate),
                candidate.id()
            )?,
            Verdict::Narrowed(pool) => {
                writeln!(self.out, "Stopped with {} candidates left:", pool.len())?;
                for candidate in pool {
                    writeln!(self.out, "  {}", self.namer.display_name(candidate))?;
                }
            }
            Verdict::NotIsolated => writeln!(
                self.out,
                "No single unit isolated; the problem may need several units disabled together."
            )?,
            Verdict::Aborted => writeln!(self.out, "Aborted.")?,
        }
        if !outcome.skipped.is_empty() {
            writeln!(self.out, "Skipped (could not be disabled):")?;
            for candidate in &outcome.skipped {
                writeln!(self.out, "  {}", self.namer.display_name(candidate))?;
            }
        }
        if !outcome.left_disabled.is_empty() {
            writeln!(self.out, "Left disabled:")?;
            for candidate in &outcome.left_disabled {
                writeln!(self.out, "  {}{}", candidate.id(), self.disabled_suffix)?;
            }
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if self.clear_screen {
            write!(self.out, "{CLEAR_SCREEN}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Mode;
    use crate::test_support::candidates;

    fn renderer(clear_screen: bool) -> ConsoleRenderer<Vec<u8>, FileStemNamer> {
        ConsoleRenderer::new(Vec::new(), FileStemNamer, clear_screen, ".disabled")
    }

    fn output(renderer: ConsoleRenderer<Vec<u8>, FileStemNamer>) -> String {
        String::from_utf8(renderer.into_inner()).expect("utf8")
    }

    #[test]
    fn file_stem_namer_drops_last_extension() {
        let namer = FileStemNamer;
        assert_eq!(namer.display_name(&Candidate::new("sodium.jar")), "sodium");
        assert_eq!(namer.display_name(&Candidate::new("pack.tar.gz")), "pack.tar");
        assert_eq!(namer.display_name(&Candidate::new("shaders")), "shaders");
    }

    #[test]
    fn scan_probe_marks_current_unit() {
        let pool = candidates(&["a.jar", "b.jar", "c.jar"]);
        let mut renderer = renderer(false);
        renderer
            .render(&SessionEvent::Scan(ScanEvent::Probing {
                index: 1,
                pool: &pool,
                current: &pool[1],
            }))
            .expect("render");

        let out = output(renderer);
        assert!(out.contains("Unit 2/3 disabled: b"));
        assert!(out.contains("  > b\n"));
        assert!(out.contains("    a\n"));
        assert!(!out.contains(CLEAR_SCREEN));
    }

    #[test]
    fn clear_screen_is_opt_in() {
        let pool = candidates(&["a", "b"]);
        let mut renderer = renderer(true);
        renderer
            .render(&SessionEvent::Search(SearchEvent::Probing {
                step: 1,
                probe: &pool[..1],
                held: &pool[1..],
            }))
            .expect("render");
        let out = output(renderer);
        assert!(out.starts_with(CLEAR_SCREEN));
        assert!(out.contains("  - a\n"));
        assert!(out.contains("  + b\n"));
    }

    #[test]
    fn aborted_outcome_lists_disabled_entries() {
        let outcome = SessionOutcome {
            mode: Mode::Search,
            verdict: Verdict::Aborted,
            left_disabled: candidates(&["a.jar"]),
            skipped: Vec::new(),
        };
        let mut renderer = renderer(false);
        renderer
            .render(&SessionEvent::Finished(&outcome))
            .expect("render");
        let out = output(renderer);
        assert!(out.contains("Aborted."));
        assert!(out.contains("  a.jar.disabled\n"));
    }

    #[test]
    fn identified_outcome_shows_name_and_id() {
        let outcome = SessionOutcome {
            mode: Mode::Scan,
            verdict: Verdict::Identified(Candidate::new("sodium.jar")),
            left_disabled: Vec::new(),
            skipped: Vec::new(),
        };
        let mut renderer = renderer(false);
        renderer
            .render(&SessionEvent::Finished(&outcome))
            .expect("render");
        assert!(output(renderer).contains("Culprit: sodium (sodium.jar)"));
    }
}
