//! Process-wide pass state
//!
//! The Context Store and the current error boundary are shared by everything that
//! runs during a pass. They live in thread-local storage because a pass is a single
//! cooperative sequence on one thread: only one frame is evaluated at a time, and
//! every frame restores what it captured before it runs.
//!
//! Passes are re-entrant. [`PassGuard`] counts active passes; the first entry
//! installs the [`PrepassEnv`] surface and the last exit tears the shared state down.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::debug;

use crate::context::{Context, ContextId, ContextMap, ContextStore};
use crate::hooks;
use crate::types::ErrorBoundary;

#[derive(Default)]
struct Runtime {
    store: ContextStore,
    boundary: Option<ErrorBoundary>,
}

thread_local! {
    static RUNTIME: RefCell<Runtime> = RefCell::new(Runtime::default());
    static ACTIVE_PASSES: Cell<usize> = const { Cell::new(0) };
}

fn with_runtime<R>(f: impl FnOnce(&mut Runtime) -> R) -> R {
    RUNTIME.with(|rt| f(&mut rt.borrow_mut()))
}

/* ===================== Context Store access ===================== */

pub(crate) fn current_context() -> ContextMap {
    with_runtime(|rt| rt.store.snapshot())
}

pub(crate) fn restore_context(snapshot: ContextMap) {
    // swap out first so the previous map is dropped outside the borrow
    let previous = with_runtime(|rt| {
        let previous = rt.store.fork();
        rt.store.restore(snapshot);
        previous
    });
    drop(previous);
}

pub(crate) fn read_context(id: ContextId) -> Option<Rc<dyn Any>> {
    with_runtime(|rt| rt.store.read(id))
}

pub(crate) fn write_context(id: ContextId, value: Rc<dyn Any>) {
    with_runtime(|rt| rt.store.write(id, value));
}

/// Nearest value for `context` at the current point of the walk
pub fn read_context_value<T: 'static>(context: &Context<T>) -> Rc<T> {
    context.downcast(read_context(context.id()))
}

/* ===================== Error boundary ===================== */

pub(crate) fn current_boundary() -> Option<ErrorBoundary> {
    with_runtime(|rt| rt.boundary.clone())
}

pub(crate) fn set_boundary(boundary: Option<ErrorBoundary>) {
    let previous = with_runtime(|rt| std::mem::replace(&mut rt.boundary, boundary));
    drop(previous);
}

/// Clear context and boundary at the start of a pass
pub(crate) fn reset() {
    let previous = with_runtime(|rt| (rt.store.clear(), rt.boundary.take()));
    drop(previous);
}

/* ===================== Re-entrancy ===================== */

/// Number of passes currently running on this thread
pub fn active_passes() -> usize {
    ACTIVE_PASSES.with(Cell::get)
}

/// Held for the lifetime of one pass, including when its future is dropped early
pub(crate) struct PassGuard {
    _not_send: PhantomData<Rc<()>>,
}

impl PassGuard {
    pub(crate) fn enter() -> Self {
        let active = ACTIVE_PASSES.with(|count| {
            count.set(count.get() + 1);
            count.get()
        });
        if active == 1 {
            debug!("installing prepass env");
        }
        PassGuard {
            _not_send: PhantomData,
        }
    }
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        let remaining = ACTIVE_PASSES.with(|count| {
            let remaining = count.get().saturating_sub(1);
            count.set(remaining);
            remaining
        });
        if remaining == 0 {
            debug!("last pass finished, tearing down prepass env");
            reset();
            hooks::clear_renderer_state();
        }
    }
}

/// Context read/write surface for code running inside a pass but outside the engine
///
/// Opaque-reference resolvers use it to behave like the component they stand in for.
#[derive(Debug, Clone, Copy)]
pub struct PrepassEnv {
    _private: (),
}

/// The env surface, available only while at least one pass is active
pub fn prepass_env() -> Option<PrepassEnv> {
    (active_passes() > 0).then_some(PrepassEnv { _private: () })
}

impl PrepassEnv {
    pub fn read_context_value<T: 'static>(&self, context: &Context<T>) -> Rc<T> {
        read_context_value(context)
    }

    /// Bind a value for the subtree of the node currently being evaluated
    pub fn set_context_value<T: 'static>(&self, context: &Context<T>, value: T) {
        write_context(context.id(), Rc::new(value));
    }
}
