//! Hook shim: Identity, state chain, and the state primitives
//!
//! While a function component (or an opaque-reference resolver) is evaluated, a
//! [`DispatcherGuard`] installs its [`Identity`] as the current one. Each hook call
//! takes the next slot of that identity's state chain, so the chain must be walked
//! in the same order on every evaluation. A suspended component keeps its identity
//! in its frame and gets it back on resume, which is what makes resumption
//! transparent to the component.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::context::Context;
use crate::errors::{HookError, Interrupt};
use crate::runtime;

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/* ===================== Identity ===================== */

/// Ordered, append-only hook slots of one identity
#[derive(Clone, Default)]
pub struct StateChain(Rc<RefCell<Vec<Rc<dyn Any>>>>);

impl StateChain {
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    fn get(&self, index: usize) -> Option<Rc<dyn Any>> {
        self.0.borrow().get(index).cloned()
    }

    fn push(&self, slot: Rc<dyn Any>) {
        self.0.borrow_mut().push(slot);
    }
}

/// Per-mount token owning the head of a state chain
#[derive(Clone)]
pub struct Identity {
    id: u64,
    chain: StateChain,
}

impl Identity {
    pub(crate) fn fresh() -> Self {
        Identity {
            id: NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed),
            chain: StateChain::default(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn chain(&self) -> &StateChain {
        &self.chain
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identity({}, {} hooks)", self.id, self.chain.len())
    }
}

/// Per-pass renderer state
#[derive(Debug, Default)]
pub struct RendererState {
    unique_id: Cell<u64>,
}

impl RendererState {
    fn next_id(&self) -> u64 {
        let id = self.unique_id.get();
        self.unique_id.set(id + 1);
        id
    }
}

/* ===================== Dispatcher ===================== */

#[derive(Default, Clone)]
struct Dispatcher {
    identity: Option<Identity>,
    cursor: usize,
    rendering: bool,
    rerender: bool,
}

thread_local! {
    static DISPATCHER: RefCell<Dispatcher> = RefCell::new(Dispatcher::default());
    static RENDERER: RefCell<Option<Rc<RendererState>>> = const { RefCell::new(None) };
}

pub(crate) fn set_renderer_state(state: Rc<RendererState>) {
    RENDERER.with(|r| *r.borrow_mut() = Some(state));
}

pub(crate) fn clear_renderer_state() {
    RENDERER.with(|r| r.borrow_mut().take());
}

/// Installs an identity for one evaluation and restores the previous dispatcher on drop
pub(crate) struct DispatcherGuard {
    previous: Dispatcher,
}

impl DispatcherGuard {
    pub(crate) fn install(identity: &Identity) -> Self {
        let installed = Dispatcher {
            identity: Some(identity.clone()),
            cursor: 0,
            rendering: true,
            rerender: false,
        };
        let previous = DISPATCHER.with(|d| std::mem::replace(&mut *d.borrow_mut(), installed));
        DispatcherGuard { previous }
    }

    fn restart(&self) {
        DISPATCHER.with(|d| d.borrow_mut().cursor = 0);
    }

    fn take_rerender(&self) -> bool {
        DISPATCHER.with(|d| std::mem::take(&mut d.borrow_mut().rerender))
    }
}

impl Drop for DispatcherGuard {
    fn drop(&mut self) {
        let previous = std::mem::take(&mut self.previous);
        DISPATCHER.with(|d| *d.borrow_mut() = previous);
    }
}

/// Evaluate `render` with `identity` installed, re-running it while it schedules
/// state updates against itself
pub(crate) fn render_with_hooks<T>(
    identity: &Identity,
    rerender_limit: usize,
    mut render: impl FnMut() -> Result<T, Interrupt>,
) -> Result<T, Interrupt> {
    let guard = DispatcherGuard::install(identity);
    let mut rerenders = 0;
    loop {
        let result = render()?;
        if !guard.take_rerender() {
            return Ok(result);
        }
        rerenders += 1;
        if rerenders > rerender_limit {
            return Err(HookError::TooManyRerenders {
                limit: rerender_limit,
            }
            .into());
        }
        guard.restart();
    }
}

/// Take the next slot of the current chain, creating it with `init` on first use
fn next_slot<T: 'static>(init: impl FnOnce() -> T) -> Result<(u64, Rc<T>), HookError> {
    let (identity, index) = DISPATCHER.with(|d| {
        let mut d = d.borrow_mut();
        if !d.rendering {
            return Err(HookError::OutsideRender);
        }
        let identity = d.identity.clone().ok_or(HookError::OutsideRender)?;
        let index = d.cursor;
        d.cursor += 1;
        Ok((identity, index))
    })?;

    let slot = match identity.chain.get(index) {
        Some(existing) => existing
            .downcast::<T>()
            .map_err(|_| HookError::TypeMismatch { index })?,
        None => {
            let slot = Rc::new(init());
            identity.chain.push(slot.clone());
            slot
        }
    };
    Ok((identity.id, slot))
}

fn schedule_rerender(owner: u64) -> bool {
    DISPATCHER.with(|d| {
        let mut d = d.borrow_mut();
        let is_owner = d.rendering && d.identity.as_ref().is_some_and(|i| i.id == owner);
        if is_owner {
            d.rerender = true;
        }
        is_owner
    })
}

/* ===================== Hooks ===================== */

type Reducer<S, A> = Rc<dyn Fn(&S, A) -> S>;

struct ReducerSlot<S, A> {
    state: RefCell<S>,
    reducer: RefCell<Reducer<S, A>>,
}

/// Dispatches actions to a reducer slot
pub struct Dispatch<S, A> {
    slot: Rc<ReducerSlot<S, A>>,
    owner: u64,
}

impl<S, A> Clone for Dispatch<S, A> {
    fn clone(&self) -> Self {
        Dispatch {
            slot: self.slot.clone(),
            owner: self.owner,
        }
    }
}

impl<S: Clone + 'static, A: 'static> Dispatch<S, A> {
    /// Apply `action` if the owning component is being evaluated
    ///
    /// Updates issued after the evaluation returned are dropped: a prepass never
    /// commits, so nothing would observe them.
    pub fn dispatch(&self, action: A) {
        if !schedule_rerender(self.owner) {
            debug!(identity = self.owner, "dropping state update outside of render");
            return;
        }
        let reducer = self.slot.reducer.borrow().clone();
        // no borrow is held while the reducer runs; it may dispatch again
        let current = self.slot.state.borrow().clone();
        let next = reducer(&current, action);
        *self.slot.state.borrow_mut() = next;
    }
}

pub type SetState<T> = Dispatch<T, T>;

impl<T: Clone + 'static> Dispatch<T, T> {
    pub fn set(&self, value: T) {
        self.dispatch(value);
    }
}

pub fn use_reducer<S, A>(
    reducer: impl Fn(&S, A) -> S + 'static,
    init: impl FnOnce() -> S,
) -> Result<(S, Dispatch<S, A>), HookError>
where
    S: Clone + 'static,
    A: 'static,
{
    let reducer: Reducer<S, A> = Rc::new(reducer);
    let (owner, slot) = next_slot(|| ReducerSlot {
        state: RefCell::new(init()),
        reducer: RefCell::new(reducer.clone()),
    })?;
    *slot.reducer.borrow_mut() = reducer;
    let state = slot.state.borrow().clone();
    Ok((state, Dispatch { slot, owner }))
}

pub fn use_state<T: Clone + 'static>(
    init: impl FnOnce() -> T,
) -> Result<(T, SetState<T>), HookError> {
    use_reducer(|_: &T, next: T| next, init)
}

/// Mutable cell that survives re-evaluation and resumption
pub fn use_ref<T: 'static>(init: impl FnOnce() -> T) -> Result<Rc<RefCell<T>>, HookError> {
    let (_, slot) = next_slot(|| RefCell::new(init()))?;
    Ok(slot)
}

pub fn use_memo<T, D>(deps: D, compute: impl FnOnce() -> T) -> Result<T, HookError>
where
    T: Clone + 'static,
    D: PartialEq + 'static,
{
    let (_, slot) = next_slot(|| RefCell::new(None::<(D, T)>))?;
    if let Some((cached_deps, value)) = slot.borrow().as_ref() {
        if *cached_deps == deps {
            return Ok(value.clone());
        }
    }
    let value = compute();
    *slot.borrow_mut() = Some((deps, value.clone()));
    Ok(value)
}

pub fn use_context<T: 'static>(context: &Context<T>) -> Result<Rc<T>, HookError> {
    let rendering = DISPATCHER.with(|d| d.borrow().rendering);
    if !rendering {
        return Err(HookError::OutsideRender);
    }
    Ok(runtime::read_context_value(context))
}

/// Stable id, unique within the pass
pub fn use_id() -> Result<String, HookError> {
    let (_, slot) = next_slot(|| {
        let id = RENDERER.with(|r| r.borrow().as_ref().map(|state| state.next_id()));
        format!(":p{}:", id.unwrap_or_default())
    })?;
    Ok(slot.as_ref().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PrepassError;

    fn render<T>(identity: &Identity, f: impl FnMut() -> Result<T, Interrupt>) -> Result<T, Interrupt> {
        render_with_hooks(identity, 25, f)
    }

    #[test]
    fn test_hooks_outside_render_fail() {
        assert_eq!(use_state(|| 1).err(), Some(HookError::OutsideRender));
        assert_eq!(use_id().err(), Some(HookError::OutsideRender));
    }

    #[test]
    fn test_chain_is_reused_on_second_evaluation() {
        let identity = Identity::fresh();
        let evaluate = || {
            render(&identity, || {
                let counter = use_ref(|| 0)?;
                *counter.borrow_mut() += 1;
                let (label, _) = use_state(|| "first".to_string())?;
                let value = *counter.borrow();
                Ok((value, label))
            })
            .unwrap()
        };

        assert_eq!(evaluate(), (1, "first".to_string()));
        assert_eq!(evaluate(), (2, "first".to_string()));
        assert_eq!(identity.chain().len(), 2);
    }

    #[test]
    fn test_render_phase_update_rerenders() {
        let identity = Identity::fresh();
        let mut evaluations = 0;
        let result = render(&identity, || {
            evaluations += 1;
            let (count, set_count) = use_state(|| 0)?;
            if count < 3 {
                set_count.set(count + 1);
            }
            Ok(count)
        });

        assert_eq!(result.unwrap(), 3);
        assert_eq!(evaluations, 4);
        assert_eq!(identity.chain().len(), 1);
    }

    #[test]
    fn test_unbounded_updates_hit_the_limit() {
        let identity = Identity::fresh();
        let result = render_with_hooks(&identity, 5, || {
            let (count, set_count) = use_state(|| 0)?;
            set_count.set(count + 1);
            Ok(())
        });

        match result {
            Err(Interrupt::Error(PrepassError::Hook(HookError::TooManyRerenders { limit }))) => {
                assert_eq!(limit, 5)
            }
            other => panic!("expected re-render limit error, got {other:?}"),
        }
    }

    #[test]
    fn test_update_after_render_is_dropped() {
        let identity = Identity::fresh();
        let (_, setter) = render(&identity, || Ok(use_state(|| 1)?)).unwrap();
        setter.set(5);

        let (value, _) = render(&identity, || Ok(use_state(|| 1)?)).unwrap();
        assert_eq!(value, 1);
    }

    #[test]
    fn test_reducer_may_dispatch_to_its_own_slot() {
        let identity = Identity::fresh();
        let handle: Rc<RefCell<Option<Dispatch<u32, u32>>>> = Rc::default();

        let result = render(&identity, || {
            let inner = handle.clone();
            let (count, dispatch) = use_reducer(
                move |state: &u32, step: u32| {
                    if step > 1 {
                        if let Some(again) = inner.borrow().as_ref() {
                            again.dispatch(step - 1);
                        }
                    }
                    state + step
                },
                || 0,
            )?;
            *handle.borrow_mut() = Some(dispatch.clone());
            if count == 0 {
                dispatch.dispatch(2);
            }
            Ok(count)
        });

        // the outer update is applied last
        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let identity = Identity::fresh();
        render(&identity, || Ok(use_ref(|| 1u32)?)).unwrap();

        let result = render(&identity, || Ok(use_ref(|| "text")?));
        assert!(matches!(
            result,
            Err(Interrupt::Error(PrepassError::Hook(HookError::TypeMismatch { index: 0 })))
        ));
    }

    #[test]
    fn test_use_memo_recomputes_on_changed_deps() {
        let identity = Identity::fresh();
        let computed = Rc::new(Cell::new(0));
        let run = |dep: u32| {
            let computed = computed.clone();
            render(&identity, move || {
                Ok(use_memo(dep, || {
                    computed.set(computed.get() + 1);
                    dep * 10
                })?)
            })
            .unwrap()
        };

        assert_eq!(run(1), 10);
        assert_eq!(run(1), 10);
        assert_eq!(run(2), 20);
        assert_eq!(computed.get(), 2);
    }

    #[test]
    fn test_nested_guard_restores_outer_identity() {
        let outer = Identity::fresh();
        let inner = Identity::fresh();
        render(&outer, || {
            use_ref(|| 0)?;
            render(&inner, || Ok(use_ref(|| 0)?))?;
            use_ref(|| 0)?;
            Ok(())
        })
        .unwrap();

        assert_eq!(outer.chain().len(), 2);
        assert_eq!(inner.chain().len(), 1);
    }
}
