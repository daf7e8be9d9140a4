//! CLI command implementations.

use std::io;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::core::pool::CandidatePool;
use crate::exit_codes;
use crate::io::config::{CONFIG_FILE, CulpritConfig, load_config, write_config};
use crate::io::discovery::discover_units;
use crate::io::gateway::DirectoryGateway;
use crate::io::oracle::ConsoleOracle;
use crate::io::render::{ConsoleRenderer, FileStemNamer, Namer};
use crate::session::{Mode, SessionEvent, SessionOptions, Verdict, run_session};

/// Discover the pool for `root` using its (optional) config.
fn load_pool(root: &Path) -> Result<(CulpritConfig, CandidatePool)> {
    let cfg = load_config(&root.join(CONFIG_FILE))?;
    let units_dir = cfg.units_path(root);
    let pool = discover_units(&units_dir, &cfg.disabled_suffix, &cfg.protection()?)?;
    debug!(units = pool.len(), "pool loaded");
    Ok((cfg, pool))
}

/// Run a scan or search session against the terminal. Returns the exit code.
pub fn run_mode(root: &Path, mode: Mode) -> Result<i32> {
    let (cfg, pool) = load_pool(root)?;
    let units_dir = cfg.units_path(root);
    let mut gateway = DirectoryGateway::new(&units_dir, cfg.disabled_suffix.clone());
    let mut oracle = ConsoleOracle::new(io::stdin().lock(), io::stdout());
    let mut renderer = ConsoleRenderer::new(
        io::stdout(),
        FileStemNamer,
        cfg.clear_screen,
        cfg.disabled_suffix.clone(),
    );
    let options = SessionOptions {
        offer_leave_disabled: cfg.offer_leave_disabled,
    };

    let outcome = run_session(
        mode,
        &pool,
        &mut gateway,
        &mut oracle,
        &options,
        |event: &SessionEvent<'_>| renderer.render(event),
    )?;

    if outcome.verdict == Verdict::Aborted {
        eprintln!(
            "warning: session aborted; {} unit(s) left disabled in {}",
            outcome.left_disabled.len(),
            units_dir.display()
        );
        for candidate in &outcome.left_disabled {
            eprintln!("  {}{}", candidate.id(), cfg.disabled_suffix);
        }
        return Ok(exit_codes::ABORTED);
    }
    Ok(exit_codes::OK)
}

/// Print the units a session would test, without toggling anything.
pub fn list_units(root: &Path) -> Result<i32> {
    let (cfg, pool) = load_pool(root)?;
    if pool.is_empty() {
        eprintln!(
            "no enabled, unprotected units in {}",
            cfg.units_path(root).display()
        );
        return Ok(exit_codes::OK);
    }
    let namer = FileStemNamer;
    for candidate in pool.iter() {
        println!("{}\t{}", namer.display_name(candidate), candidate.id());
    }
    Ok(exit_codes::OK)
}

/// Write a default `culprit.toml` and create the unit directory.
pub fn init_config(root: &Path, force: bool) -> Result<i32> {
    let path = root.join(CONFIG_FILE);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let cfg = CulpritConfig::default();
    write_config(&path, &cfg)?;
    let units_dir = cfg.units_path(root);
    std::fs::create_dir_all(&units_dir)
        .with_context(|| format!("create {}", units_dir.display()))?;
    info!(path = %path.display(), "config written");
    println!("init: config={} units={}", path.display(), units_dir.display());
    Ok(exit_codes::OK)
}
