//! Component definitions
//!
//! Function components are plain closures over props. Class components are
//! constructed once per mount and keep their own state across resumes.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};

use super::node::{ElementType, Node, Props};
use super::thenable::Thenable;
use crate::errors::{Interrupt, PrepassError};

/// Outcome of evaluating a component body
pub type RenderResult = Result<Node, Interrupt>;

pub type RenderFn = Rc<dyn Fn(&Props) -> RenderResult>;

/* ===================== Function components ===================== */

pub struct FunctionComponent {
    pub name: String,
    pub render: RenderFn,
    pub default_props: Props,
}

impl FunctionComponent {
    pub fn new(name: impl Into<String>, render: impl Fn(&Props) -> RenderResult + 'static) -> Self {
        FunctionComponent {
            name: name.into(),
            render: Rc::new(render),
            default_props: Props::new(),
        }
    }

    pub fn with_defaults(mut self, defaults: Props) -> Self {
        self.default_props = defaults;
        self
    }
}

/// Wrapper that forwards to an inner function component with its own defaults
pub struct ForwardRef {
    pub render: Rc<FunctionComponent>,
    pub default_props: Props,
}

/* ===================== Class components ===================== */

/// A stateful component instance
pub trait Component {
    fn render(&mut self, props: &Props) -> RenderResult;

    fn derive_state_from_props(&mut self, _props: &Props) {}

    fn will_mount(&mut self, _props: &Props) {}

    /// Whether this instance catches errors raised by its descendants
    fn is_error_boundary(&self) -> bool {
        false
    }

    fn did_catch(&mut self, _error: &PrepassError) {}
}

pub type Constructor = Rc<dyn Fn(&Props) -> Box<dyn Component>>;

pub struct ClassComponent {
    pub name: String,
    pub construct: Constructor,
    pub default_props: Props,
}

impl ClassComponent {
    pub fn new(
        name: impl Into<String>,
        construct: impl Fn(&Props) -> Box<dyn Component> + 'static,
    ) -> Self {
        ClassComponent {
            name: name.into(),
            construct: Rc::new(construct),
            default_props: Props::new(),
        }
    }

    pub fn with_defaults(mut self, defaults: Props) -> Self {
        self.default_props = defaults;
        self
    }
}

/// Handle to a mounted class instance, retained across resumes
#[derive(Clone)]
pub struct ComponentInstance {
    name: Rc<str>,
    inner: Rc<RefCell<Box<dyn Component>>>,
}

impl ComponentInstance {
    pub(crate) fn new(name: &str, component: Box<dyn Component>) -> Self {
        ComponentInstance {
            name: name.into(),
            inner: Rc::new(RefCell::new(component)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_error_boundary(&self) -> bool {
        self.inner.borrow().is_error_boundary()
    }

    pub fn ptr_eq(&self, other: &ComponentInstance) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(&mut dyn Component) -> R) -> R {
        let mut component = self.inner.borrow_mut();
        f(component.as_mut())
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentInstance").field(&self.name).finish()
    }
}

/* ===================== Opaque references ===================== */

/// Cross-module reference that cannot be evaluated locally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientReference {
    pub id: String,
}

/* ===================== Deferred components ===================== */

pub type Loader = Box<dyn FnOnce() -> LocalBoxFuture<'static, Result<ElementType, PrepassError>>>;

/// Load state of a deferred component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LazyStatus {
    Pending = 0,
    Fulfilled = 1,
    Rejected = 2,
}

enum LazyMemo {
    Uninitialized(Loader),
    Pending(Thenable),
    Fulfilled(ElementType),
    Rejected(PrepassError),
}

/// Deferred component reference
///
/// The memo lives on the reference itself, so every element pointing at it
/// shares one loader invocation.
#[derive(Clone)]
pub struct LazyComponent(Rc<RefCell<Option<LazyMemo>>>);

impl LazyComponent {
    pub fn new<F, Fut>(loader: F) -> Self
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = Result<ElementType, PrepassError>> + 'static,
    {
        let loader: Loader = Box::new(move || loader().boxed_local());
        LazyComponent(Rc::new(RefCell::new(Some(LazyMemo::Uninitialized(loader)))))
    }

    /// `None` until the loader has been triggered
    pub fn status(&self) -> Option<LazyStatus> {
        match self.0.borrow().as_ref() {
            Some(LazyMemo::Pending(_)) => Some(LazyStatus::Pending),
            Some(LazyMemo::Fulfilled(_)) => Some(LazyStatus::Fulfilled),
            Some(LazyMemo::Rejected(_)) => Some(LazyStatus::Rejected),
            Some(LazyMemo::Uninitialized(_)) | None => None,
        }
    }

    pub fn ptr_eq(&self, other: &LazyComponent) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Read the memo, triggering the loader on first use
    pub(crate) fn resolve(&self) -> LazyResolution {
        let memo = self.0.borrow_mut().take();
        let (memo, resolution) = match memo {
            Some(LazyMemo::Uninitialized(loader)) => {
                let thenable = self.start(loader);
                (
                    LazyMemo::Pending(thenable.clone()),
                    LazyResolution::Waiting(thenable),
                )
            }
            Some(LazyMemo::Pending(thenable)) => (
                LazyMemo::Pending(thenable.clone()),
                LazyResolution::Waiting(thenable),
            ),
            Some(LazyMemo::Fulfilled(ty)) => {
                (LazyMemo::Fulfilled(ty.clone()), LazyResolution::Ready(ty))
            }
            Some(LazyMemo::Rejected(error)) => (
                LazyMemo::Rejected(error.clone()),
                LazyResolution::Failed(error),
            ),
            None => {
                return LazyResolution::Failed(PrepassError::msg(
                    "lazy component was resolved re-entrantly",
                ))
            }
        };
        *self.0.borrow_mut() = Some(memo);
        resolution
    }

    /// Call the loader and wrap its future so settling it updates the memo
    fn start(&self, loader: Loader) -> Thenable {
        let memo = Rc::downgrade(&self.0);
        let load = loader();
        Thenable::new(async move {
            let (settled, outcome) = match load.await {
                Ok(ty) => (LazyMemo::Fulfilled(ty), Ok(())),
                Err(error) => (LazyMemo::Rejected(error.clone()), Err(error)),
            };
            if let Some(memo) = memo.upgrade() {
                *memo.borrow_mut() = Some(settled);
            }
            outcome
        })
    }
}

/// What a mount observes when it reads a deferred component
pub(crate) enum LazyResolution {
    Ready(ElementType),
    Waiting(Thenable),
    Failed(PrepassError),
}

/* ===================== Constructors ===================== */

impl ElementType {
    pub fn function(
        name: impl Into<String>,
        render: impl Fn(&Props) -> RenderResult + 'static,
    ) -> Self {
        ElementType::Function(Rc::new(FunctionComponent::new(name, render)))
    }

    pub fn class(
        name: impl Into<String>,
        construct: impl Fn(&Props) -> Box<dyn Component> + 'static,
    ) -> Self {
        ElementType::Class(Rc::new(ClassComponent::new(name, construct)))
    }

    pub fn forward_ref(render: FunctionComponent, default_props: Props) -> Self {
        ElementType::ForwardRef(Rc::new(ForwardRef {
            render: Rc::new(render),
            default_props,
        }))
    }

    pub fn memo(inner: ElementType) -> Self {
        ElementType::Memo(Rc::new(inner))
    }

    pub fn lazy(component: LazyComponent) -> Self {
        ElementType::Lazy(component)
    }

    pub fn client_reference(id: impl Into<String>) -> Self {
        ElementType::ClientReference(Rc::new(ClientReference { id: id.into() }))
    }
}
