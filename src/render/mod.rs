//! Component Dispatcher
//!
//! One mount/update pair per evaluated node kind. A strategy returns the node's
//! children, or `Node::Empty` when the node suspended and a frame was queued.
//! An `Err` is a synchronous error for the traversal to route to a boundary.

pub mod class;
pub mod client_reference;
pub mod function;
pub mod lazy;

use tracing::warn;

use crate::errors::PrepassError;
use crate::runtime;
use crate::types::Node;

/// Children of a mounted or resumed node
pub(crate) type Mounted = Result<Node, PrepassError>;

/// Route an error raised by component code
///
/// Inside a boundary the error is handed back for recovery. Outside one it is
/// reported and the node renders nothing.
pub(crate) fn recover_or_skip(component: &str, error: PrepassError) -> Mounted {
    if runtime::current_boundary().is_some() {
        return Err(error);
    }
    warn!(component, error = %error, "error while pre-rendering component, skipping its subtree");
    Ok(Node::Empty)
}
