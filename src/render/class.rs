//! Class components
//!
//! The instance is constructed once per mount and carried in its frame, so a
//! resumed render sees whatever state the instance built up before suspending.

use std::rc::Rc;

use super::{recover_or_skip, Mounted};
use crate::engine::Pass;
use crate::errors::Interrupt;
use crate::runtime;
use crate::types::{ClassComponent, ClassFrame, ComponentInstance, Element, ErrorBoundary, Frame, FrameKind, Node};

pub(crate) fn mount(pass: &mut Pass, component: &Rc<ClassComponent>, element: &Element) -> Mounted {
    let props = element.props.merge_defaults(&component.default_props);
    let instance = ComponentInstance::new(&component.name, (component.construct)(&props));
    instance.with_mut(|this| {
        this.derive_state_from_props(&props);
        this.will_mount(&props);
    });

    let frame = ClassFrame {
        component: component.clone(),
        instance,
        props,
        error: None,
    };

    match (pass.visitor)(element, Some(&frame.instance)) {
        Ok(()) => render(pass, frame),
        Err(Interrupt::Suspend(thenable)) => {
            pass.queue.push(Frame::capture(Some(thenable), FrameKind::Class(frame)));
            Ok(Node::Empty)
        }
        Err(Interrupt::Error(error)) => Err(error),
    }
}

/// Resume a suspended instance, or re-render a boundary with a caught error
pub(crate) fn update(pass: &mut Pass, mut frame: ClassFrame) -> Mounted {
    if let Some(error) = frame.error.take() {
        frame.instance.with_mut(|this| this.did_catch(&error));
    }
    render(pass, frame)
}

fn render(pass: &mut Pass, frame: ClassFrame) -> Mounted {
    let result = frame.instance.with_mut(|this| this.render(&frame.props));

    match result {
        Ok(children) => {
            if frame.instance.is_error_boundary() {
                // descendants walked after this point catch into this instance
                let boundary = ErrorBoundary::new(
                    runtime::current_context(),
                    runtime::current_boundary(),
                    frame,
                );
                runtime::set_boundary(Some(boundary));
            }
            Ok(children)
        }
        Err(Interrupt::Suspend(thenable)) => {
            pass.queue.push(Frame::capture(Some(thenable), FrameKind::Class(frame)));
            Ok(Node::Empty)
        }
        Err(Interrupt::Error(error)) => recover_or_skip(&frame.component.name, error),
    }
}
