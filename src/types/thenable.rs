//! Resume conditions

use std::fmt;
use std::future::Future;

use futures::future::{FutureExt, LocalBoxFuture, Shared};

use crate::errors::PrepassError;

/// A pending asynchronous result that a suspended node waits on
///
/// Cloning is cheap and every clone observes the same settlement, so one loader
/// future can gate any number of frames.
#[derive(Clone)]
pub struct Thenable(Shared<LocalBoxFuture<'static, Result<(), PrepassError>>>);

impl Thenable {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<(), PrepassError>> + 'static,
    {
        Thenable(future.boxed_local().shared())
    }

    pub fn resolved() -> Self {
        Self::new(async { Ok(()) })
    }

    pub fn rejected(error: PrepassError) -> Self {
        Self::new(async move { Err(error) })
    }

    /// Wait for the thenable to settle
    pub async fn settle(self) -> Result<(), PrepassError> {
        self.0.await
    }

    pub fn ptr_eq(&self, other: &Thenable) -> bool {
        Shared::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Thenable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.peek() {
            Some(Ok(())) => f.write_str("Thenable(fulfilled)"),
            Some(Err(e)) => write!(f, "Thenable(rejected: {e})"),
            None => f.write_str("Thenable(pending)"),
        }
    }
}
