//! One-shot, read-only prepass over a declarative UI tree.
//!
//! Every reachable node is visited once. Function components run with a hook shim,
//! class components keep their instance, context flows from providers to their
//! subtree, and a component that is not ready yet suspends on a [`Thenable`] and is
//! resumed once it settles.

pub mod benchmark;
pub mod cli;
pub mod config;
pub mod context;
pub mod engine;
pub mod errors;
pub mod hooks;
mod render;
pub mod runtime;
pub mod types;

// Re-export main types
pub use crate::config::PrepassConfig;
pub use crate::context::Context;
pub use crate::engine::{run_prepass, Prepass};
pub use crate::errors::{HookError, Interrupt, PrepassError};
pub use crate::runtime::{active_passes, prepass_env, PrepassEnv};
pub use crate::types::*;
