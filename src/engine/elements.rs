//! Per-element classification
//!
//! Structural kinds are flattened here; evaluated kinds go to the component
//! dispatcher in `render`.

use std::any::Any;
use std::rc::Rc;

use super::pass::Pass;
use crate::render::{self, Mounted};
use crate::runtime;
use crate::types::{Element, ElementType, Node, Value};

/// Visit one element and return the children to walk next
pub(crate) fn visit_element(pass: &mut Pass, element: &Rc<Element>) -> Mounted {
    match &element.ty {
        ElementType::Host(_) | ElementType::PassThrough(_) => Ok(element.props.children()),

        ElementType::Provider(context) => {
            let value: Rc<dyn Any> = match element.props.get("value") {
                Some(Value::Any(value)) => value.clone(),
                Some(value) => Rc::new(value.clone()),
                None => context.default_value(),
            };
            runtime::write_context(context.id(), value);
            Ok(element.props.children())
        }

        ElementType::Consumer(context) => match element.props.get("children") {
            Some(Value::Render(render)) => {
                let value = runtime::read_context(context.id())
                    .unwrap_or_else(|| context.default_value());
                Ok(render(value))
            }
            _ => Ok(Node::Empty),
        },

        ElementType::ForwardRef(forward) => {
            let props = element.props.merge_defaults(&forward.default_props);
            Ok(ElementType::Function(forward.render.clone()).element(props))
        }

        ElementType::Memo(inner) => Ok(inner.element(element.props.clone())),

        ElementType::Lazy(component) => render::lazy::mount(pass, component, &element.props),

        ElementType::Function(component) => render::function::mount(pass, component, element),

        ElementType::Class(component) => render::class::mount(pass, component, element),

        ElementType::ClientReference(reference) => {
            render::client_reference::mount(pass, reference, element)
        }

        ElementType::Portal => Ok(Node::Empty),
    }
}
