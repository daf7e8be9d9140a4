//! Stable exit codes for culprit CLI commands.

/// Command succeeded (including searches stopped early by the operator).
pub const OK: i32 = 0;
/// Command failed: empty pool after filtering, toggle failure, invalid config
/// or other errors.
pub const FATAL: i32 = 1;
/// Input ended while a question was pending; units may remain disabled.
pub const ABORTED: i32 = 130;
