//! Deferred components

use super::{recover_or_skip, Mounted};
use crate::engine::Pass;
use crate::types::component::LazyResolution;
use crate::types::{Frame, FrameKind, LazyComponent, LazyFrame, Node, Props};

pub(crate) fn mount(pass: &mut Pass, component: &LazyComponent, props: &Props) -> Mounted {
    render(
        pass,
        LazyFrame {
            component: component.clone(),
            props: props.clone(),
        },
    )
}

pub(crate) fn update(pass: &mut Pass, frame: LazyFrame) -> Mounted {
    render(pass, frame)
}

/// Element of the loaded type, or a frame waiting on the shared loader
fn render(pass: &mut Pass, frame: LazyFrame) -> Mounted {
    match frame.component.resolve() {
        LazyResolution::Ready(ty) => Ok(ty.element(frame.props)),
        LazyResolution::Waiting(thenable) => {
            pass.queue.push(Frame::capture(Some(thenable), FrameKind::Lazy(frame)));
            Ok(Node::Empty)
        }
        LazyResolution::Failed(error) => recover_or_skip("Lazy", error),
    }
}
