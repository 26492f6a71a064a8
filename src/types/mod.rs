//! Core data model: tree nodes, components, thenables and continuation frames

pub mod component;
pub mod frames;
pub mod node;
pub mod thenable;
pub mod visitor;

pub use component::{
    ClassComponent, ClientReference, Component, ComponentInstance, ForwardRef, FunctionComponent,
    LazyComponent, LazyStatus, RenderResult,
};
pub use frames::{
    ClassFrame, ClientRefFrame, ErrorBoundary, Frame, FrameKind, HooksFrame, LazyFrame, Level,
    YieldFrame,
};
pub use node::{
    fragment, host, pass_through, portal, Element, ElementType, Node, PassThrough, Props,
    RenderProp, Value,
};
pub use thenable::Thenable;
pub use visitor::{ClientVisitor, Visitor};
