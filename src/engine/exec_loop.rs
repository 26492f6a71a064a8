//! Traversal loop
//!
//! The walk is an explicit stack of [`Level`]s instead of native recursion, so a
//! time-slice yield can park the exact walk position in a frame.
//!
//! ## Function Organization
//! 1. visit() - Walk a freshly produced subtree
//! 2. update() - Resume one frame popped by the driver
//! 3. visit_loop() - The walk itself, one sibling per iteration

use std::time::Instant;

use tracing::debug;

use super::elements::visit_element;
use super::pass::Pass;
use crate::errors::PrepassError;
use crate::render::{class, client_reference, function, lazy};
use crate::runtime;
use crate::types::{ErrorBoundary, Frame, FrameKind, Level, Node, YieldFrame};

/// Whether the loop finished the stack or ran out of time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopOutcome {
    Done,
    Yielded,
}

/* ===================== Public API ===================== */

/// Walk `root` under the current context and boundary
pub(crate) fn visit(pass: &mut Pass, root: Node) -> Result<(), PrepassError> {
    let siblings = root.flatten();
    if siblings.is_empty() {
        return Ok(());
    }
    run_slice(pass, vec![Level::capture(siblings)])
}

/// Resume a frame whose resume condition has settled
pub(crate) fn update(pass: &mut Pass, frame: Frame) -> Result<(), PrepassError> {
    frame.restore();

    let children = match frame.kind {
        FrameKind::Yield(parked) => return run_slice(pass, parked.stack),
        FrameKind::Hooks(hooks) => function::update(pass, hooks),
        FrameKind::Class(class) => class::update(pass, class),
        FrameKind::Lazy(lazy) => lazy::update(pass, lazy),
        FrameKind::ClientRef(reference) => client_reference::update(pass, reference),
    };

    match children {
        Ok(children) => visit(pass, children),
        Err(error) => catch(pass, error).map(|_| ()),
    }
}

/* ===================== Walk ===================== */

/// Run the walk for one slice, parking the remainder in a yield frame
fn run_slice(pass: &mut Pass, mut stack: Vec<Level>) -> Result<(), PrepassError> {
    match visit_loop(pass, &mut stack)? {
        LoopOutcome::Done => Ok(()),
        LoopOutcome::Yielded if stack.is_empty() => Ok(()),
        LoopOutcome::Yielded => {
            debug!(depth = stack.len(), "time slice used up, yielding");
            let frame = Frame::capture(None, FrameKind::Yield(YieldFrame { stack }));
            pass.queue.push_front(frame);
            Ok(())
        }
    }
}

/// Walk until the stack is empty or the slice runs out
///
/// Every sibling is visited under the context and boundary recorded on its level,
/// and its children get a new level capturing whatever the visit left behind
/// (a provider's binding, a boundary's own handle).
pub(crate) fn visit_loop(pass: &mut Pass, stack: &mut Vec<Level>) -> Result<LoopOutcome, PrepassError> {
    let start = Instant::now();

    while let Some(level) = stack.last_mut() {
        let Some(element) = level.siblings.pop_front() else {
            stack.pop();
            continue;
        };
        level.restore();

        match visit_element(pass, &element) {
            Ok(children) => {
                let children = children.flatten();
                if !children.is_empty() {
                    stack.push(Level::capture(children));
                }
            }
            Err(error) => {
                let boundary = catch(pass, error)?;
                unwind(stack, &boundary);
            }
        }

        if pass.should_yield(start) {
            return Ok(LoopOutcome::Yielded);
        }
    }

    Ok(LoopOutcome::Done)
}

/* ===================== Error Routing ===================== */

/// Hand `error` to the current boundary, or fail the pass without one
fn catch(pass: &mut Pass, error: PrepassError) -> Result<ErrorBoundary, PrepassError> {
    let Some(boundary) = runtime::current_boundary() else {
        return Err(error);
    };
    debug!(boundary = boundary.instance().name(), error = %error, "error caught by boundary");
    pass.queue.push_front(boundary.recovery_frame(error));
    Ok(boundary)
}

/// Drop the levels walked under `boundary`; it re-renders them on recovery
fn unwind(stack: &mut Vec<Level>, boundary: &ErrorBoundary) {
    while stack
        .last()
        .and_then(|level| level.boundary.as_ref())
        .is_some_and(|inner| inner.ptr_eq(boundary))
    {
        stack.pop();
    }
}
