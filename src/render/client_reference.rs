//! Opaque references
//!
//! A reference cannot be evaluated locally, so the caller's resolver stands in for
//! it. The resolver runs with its own identity installed and may use hooks, read
//! context through [`crate::prepass_env`], or suspend like a function component.

use std::rc::Rc;

use super::{recover_or_skip, Mounted};
use crate::engine::Pass;
use crate::errors::Interrupt;
use crate::hooks::{render_with_hooks, Identity};
use crate::types::{ClientRefFrame, ClientReference, Element, Frame, FrameKind, Node};

pub(crate) fn mount(pass: &mut Pass, reference: &Rc<ClientReference>, element: &Rc<Element>) -> Mounted {
    let frame = ClientRefFrame {
        reference: reference.clone(),
        element: element.clone(),
        identity: Identity::fresh(),
        resolver: pass.client_visitor.clone(),
    };
    render(pass, frame)
}

pub(crate) fn update(pass: &mut Pass, frame: ClientRefFrame) -> Mounted {
    render(pass, frame)
}

fn render(pass: &mut Pass, frame: ClientRefFrame) -> Mounted {
    let result = render_with_hooks(&frame.identity, pass.config.rerender_limit, || {
        (frame.resolver)(&frame.element)
    });

    match result {
        Ok(Some(replacement)) => Ok(replacement),
        // walk whatever nodes were passed in as props
        Ok(None) => Ok(frame.element.props.nodes()),
        Err(Interrupt::Suspend(thenable)) => {
            pass.queue.push(Frame::capture(Some(thenable), FrameKind::ClientRef(frame)));
            Ok(Node::Empty)
        }
        Err(Interrupt::Error(error)) => recover_or_skip(&frame.reference.id, error),
    }
}
