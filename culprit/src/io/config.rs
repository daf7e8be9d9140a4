//! Configuration stored in `culprit.toml` in the working directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::protection::Protection;

pub const CONFIG_FILE: &str = "culprit.toml";

/// Culprit configuration (TOML).
///
/// This file is intended to be edited by humans. It is optional: missing
/// fields, or a missing file, fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CulpritConfig {
    /// Directory holding the units, relative to the working directory.
    pub units_dir: PathBuf,

    /// Suffix appended to a unit's name while it is disabled.
    pub disabled_suffix: String,

    /// Units that must always stay enabled and never enter the pool.
    pub protected: Vec<String>,

    /// Regular expressions; matching unit names never enter the pool.
    pub protected_patterns: Vec<String>,

    /// Clear the terminal before rendering each probe.
    pub clear_screen: bool,

    /// Ask whether an identified culprit should be left disabled.
    pub offer_leave_disabled: bool,
}

impl Default for CulpritConfig {
    fn default() -> Self {
        Self {
            units_dir: PathBuf::from("units"),
            disabled_suffix: ".disabled".to_string(),
            protected: Vec::new(),
            protected_patterns: Vec::new(),
            clear_screen: false,
            offer_leave_disabled: true,
        }
    }
}

impl CulpritConfig {
    pub fn validate(&self) -> Result<()> {
        if self.units_dir.as_os_str().is_empty() {
            return Err(anyhow!("units_dir must not be empty"));
        }
        if self.disabled_suffix.is_empty() {
            return Err(anyhow!("disabled_suffix must not be empty"));
        }
        if self.disabled_suffix.contains(['/', '\\']) {
            return Err(anyhow!("disabled_suffix must not contain a path separator"));
        }
        self.protection()?;
        Ok(())
    }

    pub fn protection(&self) -> Result<Protection> {
        Protection::new(&self.protected, &self.protected_patterns)
    }

    /// Unit directory resolved against `root`.
    pub fn units_path(&self, root: &Path) -> PathBuf {
        root.join(&self.units_dir)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `CulpritConfig::default()`.
pub fn load_config(path: &Path) -> Result<CulpritConfig> {
    if !path.exists() {
        let cfg = CulpritConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: CulpritConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &CulpritConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
