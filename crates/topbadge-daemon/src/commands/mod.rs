//! IPC command handlers.
//!
//! Each submodule implements the commands for one IPC category.

pub mod attestation;
pub mod daemon;
