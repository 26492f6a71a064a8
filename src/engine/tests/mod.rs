//! Engine tests
//!
//! Each file drives whole passes through [`Prepass`](crate::engine::Prepass) and
//! checks what was visited, in which order, and under which context.

mod helpers;

mod context_tests;
mod suspend_tests;
