//! Caller-supplied inspection callbacks

use std::rc::Rc;

use super::component::ComponentInstance;
use super::node::{Element, Node};
use crate::errors::Interrupt;

/// Called once per renderable node, with the instance for class components
///
/// Returning `Interrupt::Suspend` defers the node's evaluation until the thenable settles.
pub type Visitor = Rc<dyn Fn(&Element, Option<&ComponentInstance>) -> Result<(), Interrupt>>;

/// Resolver for opaque references
///
/// `Ok(Some(node))` replaces the reference; `Ok(None)` falls back to walking every
/// node found in its props.
pub type ClientVisitor = Rc<dyn Fn(&Element) -> Result<Option<Node>, Interrupt>>;

pub(crate) fn noop_visitor() -> Visitor {
    Rc::new(|_, _| Ok(()))
}

pub(crate) fn noop_client_visitor() -> ClientVisitor {
    Rc::new(|_| Ok(None))
}
