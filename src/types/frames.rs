//! Continuation frames
//!
//! A frame captures exactly what is needed to pick traversal back up: the context
//! map and error boundary in effect when the node was reached, the resume
//! condition, and the kind-specific state.

use std::collections::VecDeque;
use std::rc::Rc;

use super::component::{ClassComponent, ClientReference, ComponentInstance, FunctionComponent, LazyComponent};
use super::node::{Element, Props};
use super::thenable::Thenable;
use super::visitor::ClientVisitor;
use crate::context::ContextMap;
use crate::errors::PrepassError;
use crate::hooks::Identity;
use crate::runtime;

/// Suspended function component with its hook state
#[derive(Clone)]
pub struct HooksFrame {
    pub component: Rc<FunctionComponent>,
    pub props: Props,
    pub identity: Identity,
}

/// Suspended (or recovering) class component
#[derive(Clone)]
pub struct ClassFrame {
    pub component: Rc<ClassComponent>,
    pub instance: ComponentInstance,
    pub props: Props,
    pub error: Option<PrepassError>,
}

/// Deferred component waiting on its loader
#[derive(Clone)]
pub struct LazyFrame {
    pub component: LazyComponent,
    pub props: Props,
}

/// Opaque reference whose resolver suspended
#[derive(Clone)]
pub struct ClientRefFrame {
    pub reference: Rc<ClientReference>,
    pub element: Rc<Element>,
    pub identity: Identity,
    pub resolver: ClientVisitor,
}

/// One level of the traversal stack
///
/// `context` and `boundary` are what every sibling at this level observes.
#[derive(Clone)]
pub struct Level {
    pub siblings: VecDeque<Rc<Element>>,
    pub context: ContextMap,
    pub boundary: Option<ErrorBoundary>,
}

impl Level {
    /// A level whose siblings observe the current context and boundary
    pub(crate) fn capture(siblings: VecDeque<Rc<Element>>) -> Self {
        Level {
            siblings,
            context: runtime::current_context(),
            boundary: runtime::current_boundary(),
        }
    }

    pub(crate) fn restore(&self) {
        runtime::restore_context(self.context.clone());
        runtime::set_boundary(self.boundary.clone());
    }
}

/// Traversal paused to let the scheduler run
pub struct YieldFrame {
    pub stack: Vec<Level>,
}

pub enum FrameKind {
    Hooks(HooksFrame),
    Class(ClassFrame),
    Lazy(LazyFrame),
    ClientRef(ClientRefFrame),
    Yield(YieldFrame),
}

pub struct Frame {
    pub context: ContextMap,
    pub boundary: Option<ErrorBoundary>,
    /// `None` means "next scheduler tick"
    pub thenable: Option<Thenable>,
    pub kind: FrameKind,
}

impl Frame {
    /// Capture the current context and boundary around `kind`
    pub(crate) fn capture(thenable: Option<Thenable>, kind: FrameKind) -> Self {
        Frame {
            context: runtime::current_context(),
            boundary: runtime::current_boundary(),
            thenable,
            kind,
        }
    }

    pub(crate) fn restore(&self) {
        runtime::restore_context(self.context.clone());
        runtime::set_boundary(self.boundary.clone());
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            FrameKind::Hooks(_) => "hooks",
            FrameKind::Class(_) => "class",
            FrameKind::Lazy(_) => "lazy",
            FrameKind::ClientRef(_) => "client-ref",
            FrameKind::Yield(_) => "yield",
        }
    }
}

/* ===================== Error boundaries ===================== */

struct BoundaryState {
    context: ContextMap,
    parent: Option<ErrorBoundary>,
    class: ClassFrame,
}

/// Nearest-enclosing class instance that catches descendant errors
#[derive(Clone)]
pub struct ErrorBoundary(Rc<BoundaryState>);

impl ErrorBoundary {
    pub(crate) fn new(context: ContextMap, parent: Option<ErrorBoundary>, class: ClassFrame) -> Self {
        ErrorBoundary(Rc::new(BoundaryState {
            context,
            parent,
            class,
        }))
    }

    pub fn instance(&self) -> &ComponentInstance {
        &self.0.class.instance
    }

    pub fn parent(&self) -> Option<&ErrorBoundary> {
        self.0.parent.as_ref()
    }

    pub fn ptr_eq(&self, other: &ErrorBoundary) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Frame that re-renders the boundary with `error` attached
    ///
    /// It runs under the boundary's own context and its parent boundary, so an
    /// error raised while recovering escalates instead of looping.
    pub(crate) fn recovery_frame(&self, error: PrepassError) -> Frame {
        Frame {
            context: self.0.context.clone(),
            boundary: self.0.parent.clone(),
            thenable: None,
            kind: FrameKind::Class(ClassFrame {
                error: Some(error),
                ..self.0.class.clone()
            }),
        }
    }
}

impl std::fmt::Debug for ErrorBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ErrorBoundary").field(self.instance()).finish()
    }
}
