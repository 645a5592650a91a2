//! # Roster
//!
//! HTTP API and CLI for the Roster enrollment model.
//!
//! The binary in `main.rs` is a thin wrapper around [`cli::execute`]; the
//! router is exposed here so integration tests can drive it directly.

pub mod api;
pub mod cli;
