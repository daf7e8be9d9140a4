//! Deterministic, pure logic shared by the bisection engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod pool;
pub mod protection;
pub mod toggle_state;
pub mod types;
