//! Discovery of enabled units in the unit directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::core::pool::CandidatePool;
use crate::core::protection::Protection;
use crate::core::types::Candidate;

/// List enabled, unprotected units under `dir` as an ordered pool.
///
/// Entries ending in `disabled_suffix` are already off and are not candidates.
/// Names are sorted bytewise so repeated runs see the same order. Names that
/// are not valid UTF-8 cannot be toggled by name and are skipped.
pub fn discover_units(
    dir: &Path,
    disabled_suffix: &str,
    protection: &Protection,
) -> Result<CandidatePool> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read unit dir {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read entry in {}", dir.display()))?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                warn!(unit = ?raw, "skipping unit with a non-UTF-8 name");
                continue;
            }
        };
        if name.ends_with(disabled_suffix) {
            debug!(unit = %name, "skipping disabled unit");
            continue;
        }
        if protection.is_protected(&name) {
            debug!(unit = %name, "skipping protected unit");
            continue;
        }
        names.push(name);
    }
    names.sort();

    let pool: CandidatePool = names.into_iter().map(Candidate::new).collect();
    info!(dir = %dir.display(), units = pool.len(), "discovered units");
    Ok(pool)
}
