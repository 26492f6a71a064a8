//! Context Store
//!
//! Providers bind a value to a context for their subtree. The map is persistent:
//! a snapshot is an `Rc` clone, and a write after a snapshot copies the map, so a
//! write is only ever visible to the branch that made it.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::{ElementType, Node, Props, Value};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

/// Type-erased context identity plus its default value
#[derive(Clone)]
pub struct ErasedContext {
    id: ContextId,
    default: Rc<dyn Any>,
}

impl ErasedContext {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn default_value(&self) -> Rc<dyn Any> {
        self.default.clone()
    }
}

impl fmt::Debug for ErasedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Context").field(&self.id).finish()
    }
}

/// A typed context
pub struct Context<T> {
    erased: ErasedContext,
    default: Rc<T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Context<T> {
    fn clone(&self) -> Self {
        Context {
            erased: self.erased.clone(),
            default: self.default.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: 'static> Context<T> {
    pub fn new(default: T) -> Self {
        let default = Rc::new(default);
        let id = ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed));
        Context {
            erased: ErasedContext {
                id,
                default: default.clone(),
            },
            default,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> ContextId {
        self.erased.id
    }

    pub fn erased(&self) -> &ErasedContext {
        &self.erased
    }

    /// Provider element binding `value` for `children`
    pub fn provider(&self, value: T, children: impl Into<Node>) -> Node {
        let props = Props::new()
            .with("value", Value::Any(Rc::new(value)))
            .with_children(children);
        ElementType::Provider(self.erased.clone()).element(props)
    }

    /// Consumer element whose children are rendered from the nearest value
    pub fn consumer(&self, render: impl Fn(&T) -> Node + 'static) -> Node {
        let fallback = self.default.clone();
        let render_prop = move |value: Rc<dyn Any>| match value.downcast::<T>() {
            Ok(value) => render(&value),
            Err(_) => render(&fallback),
        };
        let props = Props::new().with("children", Value::Render(Rc::new(render_prop)));
        ElementType::Consumer(self.erased.clone()).element(props)
    }

    /// Resolve an erased lookup result to this context's type
    pub(crate) fn downcast(&self, value: Option<Rc<dyn Any>>) -> Rc<T> {
        value
            .and_then(|value| value.downcast::<T>().ok())
            .unwrap_or_else(|| self.default.clone())
    }
}

/* ===================== Context maps ===================== */

/// Immutable-per-branch mapping from context identity to value
#[derive(Clone, Default)]
pub struct ContextMap(Rc<HashMap<ContextId, Rc<dyn Any>>>);

impl ContextMap {
    pub fn get(&self, id: ContextId) -> Option<Rc<dyn Any>> {
        self.0.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ptr_eq(&self, other: &ContextMap) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn insert(&mut self, id: ContextId, value: Rc<dyn Any>) {
        Rc::make_mut(&mut self.0).insert(id, value);
    }
}

impl fmt::Debug for ContextMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// The map in effect at the current point of the walk
#[derive(Debug, Default)]
pub struct ContextStore {
    current: ContextMap,
}

impl ContextStore {
    /// A branch of the current map; writes to either side stay separate
    pub fn fork(&self) -> ContextMap {
        self.current.clone()
    }

    pub fn read(&self, id: ContextId) -> Option<Rc<dyn Any>> {
        self.current.get(id)
    }

    pub fn write(&mut self, id: ContextId, value: Rc<dyn Any>) {
        self.current.insert(id, value);
    }

    pub fn snapshot(&self) -> ContextMap {
        self.fork()
    }

    pub fn restore(&mut self, snapshot: ContextMap) {
        self.current = snapshot;
    }

    /// Drop every binding, handing back the map that was in effect
    pub fn clear(&mut self) -> ContextMap {
        std::mem::take(&mut self.current)
    }
}
