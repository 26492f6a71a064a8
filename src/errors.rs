//! Error taxonomy for a prepass
//!
//! Components, the inspect callback and opaque resolvers never unwind. They return an
//! [`Interrupt`], which is either a suspension (a pending [`Thenable`], not an error)
//! or a [`PrepassError`].

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::types::Thenable;

/// Error raised while walking a tree
#[derive(Debug, Clone, Error)]
pub enum PrepassError {
    /// Error thrown by user code (component body, visitor, resolver)
    #[error("{0}")]
    Thrown(String),

    /// Misuse of the hook shim
    #[error("hook error: {0}")]
    Hook(#[from] HookError),

    /// Opaque error carried from outside the crate
    #[error("{0}")]
    Other(Arc<anyhow::Error>),
}

impl PrepassError {
    pub fn msg(message: impl fmt::Display) -> Self {
        PrepassError::Thrown(message.to_string())
    }
}

impl From<anyhow::Error> for PrepassError {
    fn from(error: anyhow::Error) -> Self {
        PrepassError::Other(Arc::new(error))
    }
}

/// Misuse of the state-chain primitives
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("hooks can only be called while a component is being evaluated")]
    OutsideRender,

    #[error("hook #{index} was read with a different type than it was created with")]
    TypeMismatch { index: usize },

    #[error("too many re-renders (limit {limit})")]
    TooManyRerenders { limit: usize },
}

/// Non-local exit from a component evaluation
#[derive(Clone)]
pub enum Interrupt {
    /// Not ready yet, retry once the thenable settles
    Suspend(Thenable),
    /// Synchronous error
    Error(PrepassError),
}

impl Interrupt {
    pub fn suspend<F>(future: F) -> Self
    where
        F: std::future::Future<Output = Result<(), PrepassError>> + 'static,
    {
        Interrupt::Suspend(Thenable::new(future))
    }

    pub fn error(message: impl fmt::Display) -> Self {
        Interrupt::Error(PrepassError::msg(message))
    }
}

impl fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupt::Suspend(_) => f.write_str("Suspend(..)"),
            Interrupt::Error(e) => f.debug_tuple("Error").field(e).finish(),
        }
    }
}

impl From<PrepassError> for Interrupt {
    fn from(error: PrepassError) -> Self {
        Interrupt::Error(error)
    }
}

impl From<HookError> for Interrupt {
    fn from(error: HookError) -> Self {
        Interrupt::Error(PrepassError::Hook(error))
    }
}

impl From<Thenable> for Interrupt {
    fn from(thenable: Thenable) -> Self {
        Interrupt::Suspend(thenable)
    }
}
