//! Toggle gateway abstraction over the host's units.
//!
//! The [`ToggleGateway`] trait decouples the search algorithms from how a unit
//! is actually switched on or off. [`DirectoryGateway`] renames entries in a
//! unit directory; tests use an in-memory host from `test_support`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

use crate::core::types::Candidate;

/// Applies or reverts one unit's enabled state.
///
/// Both operations are idempotent: disabling an already-disabled unit succeeds
/// without touching anything. A missing unit or a host rejection is an error.
/// Each call mutates exactly one unit.
pub trait ToggleGateway {
    fn disable(&mut self, candidate: &Candidate) -> Result<()>;
    fn enable(&mut self, candidate: &Candidate) -> Result<()>;
}

/// Units are directory entries; a unit is disabled by appending a suffix.
#[derive(Debug, Clone)]
pub struct DirectoryGateway {
    dir: PathBuf,
    suffix: String,
}

impl DirectoryGateway {
    pub fn new(dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.into(),
        }
    }

    fn enabled_path(&self, candidate: &Candidate) -> PathBuf {
        self.dir.join(candidate.id())
    }

    fn disabled_path(&self, candidate: &Candidate) -> PathBuf {
        self.dir.join(format!("{}{}", candidate.id(), self.suffix))
    }

    /// Rename `from` to `to` unless the unit already sits at `to`.
    fn switch(&self, candidate: &Candidate, from: &Path, to: &Path) -> Result<()> {
        let from_exists = from.exists();
        let to_exists = to.exists();
        match (from_exists, to_exists) {
            (false, true) => {
                debug!(unit = %candidate, "already in requested state");
                Ok(())
            }
            (false, false) => Err(anyhow!("unit not found in {}", self.dir.display())),
            (true, true) => Err(anyhow!(
                "conflicting copies {} and {}",
                from.display(),
                to.display()
            )),
            (true, false) => fs::rename(from, to)
                .with_context(|| format!("rename {} -> {}", from.display(), to.display())),
        }
    }
}

impl ToggleGateway for DirectoryGateway {
    #[instrument(skip_all, fields(unit = %candidate))]
    fn disable(&mut self, candidate: &Candidate) -> Result<()> {
        let from = self.enabled_path(candidate);
        let to = self.disabled_path(candidate);
        self.switch(candidate, &from, &to)?;
        debug!("unit disabled");
        Ok(())
    }

    #[instrument(skip_all, fields(unit = %candidate))]
    fn enable(&mut self, candidate: &Candidate) -> Result<()> {
        let from = self.disabled_path(candidate);
        let to = self.enabled_path(candidate);
        self.switch(candidate, &from, &to)?;
        debug!("unit enabled");
        Ok(())
    }
}
