//! Side-effecting collaborators: host toggles, operator input, discovery,
//! rendering and configuration.

pub mod config;
pub mod discovery;
pub mod gateway;
pub mod oracle;
pub mod render;
