//! # Traversal Engine
//!
//! Depth-first walk over the element tree that can stop at any node and pick up
//! again later.
//!
//! ## Core Principles
//!
//! 1. **Stack-driven walk**: sibling arrays live on an explicit stack, no recursion
//! 2. **Suspension as data**: a node that cannot finish becomes a [`Frame`](crate::types::Frame) on the queue
//! 3. **Captured scope**: every frame and stack level records its context map and error boundary
//! 4. **One frame at a time**: the driver resumes frames strictly in queue order

pub mod driver;
mod elements;
mod exec_loop;
mod pass;
mod queue;

#[cfg(test)]
mod tests;

pub use driver::{run_prepass, Prepass};
pub(crate) use pass::Pass;
