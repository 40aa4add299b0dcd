// crates/contextstream-hooks/src/lib.rs
// ContextStream hooks - tool invocation gate for AI coding assistants

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod adapter;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod decision;
pub mod error;
pub mod gate;
pub mod hooks;
pub mod index_status;
pub mod store;
pub mod utils;
pub mod workspace;
pub use error::{GateError, Result};
