//! Function components

use std::rc::Rc;

use super::{recover_or_skip, Mounted};
use crate::engine::Pass;
use crate::errors::Interrupt;
use crate::hooks::{render_with_hooks, Identity};
use crate::types::{Element, Frame, FrameKind, FunctionComponent, HooksFrame, Node};

pub(crate) fn mount(pass: &mut Pass, component: &Rc<FunctionComponent>, element: &Element) -> Mounted {
    let frame = HooksFrame {
        component: component.clone(),
        props: element.props.merge_defaults(&component.default_props),
        identity: Identity::fresh(),
    };

    match (pass.visitor)(element, None) {
        Ok(()) => render(pass, frame),
        Err(Interrupt::Suspend(thenable)) => {
            pass.queue.push(Frame::capture(Some(thenable), FrameKind::Hooks(frame)));
            Ok(Node::Empty)
        }
        Err(Interrupt::Error(error)) => Err(error),
    }
}

/// Re-run a suspended component with its original identity
pub(crate) fn update(pass: &mut Pass, frame: HooksFrame) -> Mounted {
    render(pass, frame)
}

fn render(pass: &mut Pass, frame: HooksFrame) -> Mounted {
    let result = render_with_hooks(&frame.identity, pass.config.rerender_limit, || {
        (frame.component.render)(&frame.props)
    });

    match result {
        Ok(children) => Ok(children),
        Err(Interrupt::Suspend(thenable)) => {
            pass.queue.push(Frame::capture(Some(thenable), FrameKind::Hooks(frame)));
            Ok(Node::Empty)
        }
        Err(Interrupt::Error(error)) => recover_or_skip(&frame.component.name, error),
    }
}
