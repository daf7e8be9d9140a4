//! Interactive culprit isolation for sets of independently toggleable units.
//!
//! Given a pool of units (plugins, mods, drop-in files) and a symptom only a
//! human can observe, the crate disables subsets of units and asks whether the
//! symptom persists until the responsible unit is found. The architecture
//! enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (pool ordering, the bisection
//!   split, the toggle ledger, protection). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting collaborators behind traits (toggle gateway,
//!   oracle, discovery, rendering, config). Isolated to enable test doubles.
//!
//! Orchestration modules ([`probe`], [`scan`], [`search`], [`session`],
//! [`cli`]) coordinate core logic with I/O to implement CLI commands.

pub mod cli;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod probe;
pub mod scan;
pub mod search;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
