//! Tree description types
//!
//! A tree is made of immutable [`Element`]s shared behind `Rc`. Children live in
//! the `children` prop, so a parent never owns its rendered output.

use std::any::Any;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use super::component::{ClassComponent, ClientReference, ForwardRef, FunctionComponent, LazyComponent};
use crate::context::ErasedContext;

/* ===================== Nodes ===================== */

/// A position in the tree: nothing, text, one element, or a list of nodes
#[derive(Debug, Clone, Default)]
pub enum Node {
    #[default]
    Empty,
    Text(Rc<str>),
    Element(Rc<Element>),
    List(Rc<[Node]>),
}

impl Node {
    pub fn list(nodes: impl IntoIterator<Item = Node>) -> Self {
        Node::List(nodes.into_iter().collect())
    }

    pub fn text(text: impl Into<Rc<str>>) -> Self {
        Node::Text(text.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Node::Empty => true,
            Node::List(nodes) => nodes.iter().all(Node::is_empty),
            Node::Text(_) | Node::Element(_) => false,
        }
    }

    /// Flatten into the sibling array the traversal walks
    ///
    /// Nested lists are spliced in order; empty and text nodes are dropped since
    /// they have nothing to visit.
    pub fn flatten(&self) -> VecDeque<Rc<Element>> {
        let mut out = VecDeque::new();
        self.collect_elements(&mut out);
        out
    }

    fn collect_elements(&self, out: &mut VecDeque<Rc<Element>>) {
        match self {
            Node::Empty | Node::Text(_) => {}
            Node::Element(element) => out.push_back(element.clone()),
            Node::List(nodes) => {
                for node in nodes.iter() {
                    node.collect_elements(out);
                }
            }
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(Rc::new(element))
    }
}

impl From<Vec<Node>> for Node {
    fn from(nodes: Vec<Node>) -> Self {
        Node::List(nodes.into())
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.into())
    }
}

/* ===================== Elements ===================== */

/// One node description: a type plus its properties
#[derive(Debug, Clone)]
pub struct Element {
    pub ty: ElementType,
    pub props: Props,
    pub key: Option<String>,
}

impl Element {
    pub fn new(ty: ElementType, props: Props) -> Self {
        Element {
            ty,
            props,
            key: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn name(&self) -> String {
        self.ty.name()
    }
}

/// Structural wrappers that are walked through without evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassThrough {
    Fragment,
    StrictMode,
    Profiler,
    Suspense,
    ConcurrentMode,
}

/// Kind of an element
///
/// Structural kinds are flattened by the traversal; `Function`, `Class`,
/// `Lazy` and `ClientReference` are handed to the component dispatcher.
#[derive(Clone)]
pub enum ElementType {
    /// Host primitive such as `div`; only its children matter
    Host(Rc<str>),
    PassThrough(PassThrough),
    Provider(ErasedContext),
    Consumer(ErasedContext),
    ForwardRef(Rc<ForwardRef>),
    Memo(Rc<ElementType>),
    Lazy(LazyComponent),
    Function(Rc<FunctionComponent>),
    Class(Rc<ClassComponent>),
    ClientReference(Rc<ClientReference>),
    /// Platform embedding handle, never traversed
    Portal,
}

impl ElementType {
    pub fn host(tag: impl Into<Rc<str>>) -> Self {
        ElementType::Host(tag.into())
    }

    /// Create an element of this type
    pub fn element(&self, props: Props) -> Node {
        Element::new(self.clone(), props).into()
    }

    pub fn name(&self) -> String {
        match self {
            ElementType::Host(tag) => tag.to_string(),
            ElementType::PassThrough(kind) => format!("{kind:?}"),
            ElementType::Provider(_) => "Context.Provider".to_string(),
            ElementType::Consumer(_) => "Context.Consumer".to_string(),
            ElementType::ForwardRef(forward) => format!("ForwardRef({})", forward.render.name),
            ElementType::Memo(inner) => format!("Memo({})", inner.name()),
            ElementType::Lazy(_) => "Lazy".to_string(),
            ElementType::Function(component) => component.name.clone(),
            ElementType::Class(component) => component.name.clone(),
            ElementType::ClientReference(reference) => reference.id.clone(),
            ElementType::Portal => "Portal".to_string(),
        }
    }
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Host element with props
pub fn host(tag: &str, props: Props) -> Node {
    ElementType::host(tag).element(props)
}

pub fn fragment(children: impl Into<Node>) -> Node {
    pass_through(PassThrough::Fragment, children)
}

pub fn pass_through(kind: PassThrough, children: impl Into<Node>) -> Node {
    ElementType::PassThrough(kind).element(Props::new().with_children(children))
}

pub fn portal(children: impl Into<Node>) -> Node {
    ElementType::Portal.element(Props::new().with_children(children))
}

/* ===================== Props ===================== */

/// Render prop invoked with a context value (consumer children)
pub type RenderProp = Rc<dyn Fn(Rc<dyn Any>) -> Node>;

/// Property value
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Value>),
    Node(Node),
    Any(Rc<dyn Any>),
    Render(RenderProp),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn collect_nodes(&self, out: &mut Vec<Node>) {
        match self {
            Value::Node(node) => out.push(node.clone()),
            Value::List(values) => {
                for value in values {
                    value.collect_nodes(out);
                }
            }
            Value::Null
            | Value::Bool(_)
            | Value::Num(_)
            | Value::Str(_)
            | Value::Any(_)
            | Value::Render(_) => {}
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Num(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(values) => f.debug_list().entries(values).finish(),
            Value::Node(node) => node.fmt(f),
            Value::Any(_) => f.write_str("Any(..)"),
            Value::Render(_) => f.write_str("Render(..)"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Num(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(node)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::List(values)
    }
}

/// Immutable property bag, shared between an element and any frame that captured it
#[derive(Clone, Default)]
pub struct Props(Rc<BTreeMap<String, Value>>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: BTreeMap<String, Value>) -> Self {
        Props(Rc::new(map))
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Rc::make_mut(&mut self.0).insert(key.into(), value.into());
        self
    }

    pub fn with_children(self, children: impl Into<Node>) -> Self {
        self.with("children", Value::Node(children.into()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.values()
    }

    /// The `children` prop as a node
    pub fn children(&self) -> Node {
        match self.get("children") {
            Some(Value::Node(node)) => node.clone(),
            Some(Value::List(values)) => {
                let mut nodes = Vec::new();
                for value in values {
                    value.collect_nodes(&mut nodes);
                }
                Node::from(nodes)
            }
            _ => Node::Empty,
        }
    }

    /// Every node found anywhere in the values, in key order
    pub fn nodes(&self) -> Node {
        let mut nodes = Vec::new();
        for value in self.values() {
            value.collect_nodes(&mut nodes);
        }
        Node::from(nodes)
    }

    /// Fill in keys missing from `self` with the component's defaults
    pub fn merge_defaults(&self, defaults: &Props) -> Props {
        if defaults.is_empty() {
            return self.clone();
        }
        let mut merged = self.clone();
        let map = Rc::make_mut(&mut merged.0);
        for (key, value) in defaults.0.iter() {
            map.entry(key.clone()).or_insert_with(|| value.clone());
        }
        merged
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;

    #[test]
    fn test_flatten_splices_nested_lists_and_drops_text() {
        let a = host("a", Props::new());
        let b = host("b", Props::new());
        let c = host("c", Props::new());
        let tree = Node::list(vec![
            a,
            Node::text("hello"),
            Node::list(vec![b, Node::Empty, Node::list(vec![c])]),
        ]);

        let names: Vec<String> = tree.flatten().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merge_defaults_keeps_explicit_values() {
        let props = Props::from_map(btreemap! {
            "size".to_string() => Value::from(2i64),
        });
        let defaults = Props::new().with("size", 1i64).with("color", "red");

        let merged = props.merge_defaults(&defaults);
        assert_eq!(merged.get("size").and_then(Value::as_num), Some(2.0));
        assert_eq!(merged.get("color").and_then(Value::as_str), Some("red"));
        // original props are untouched
        assert!(props.get("color").is_none());
    }

    #[test]
    fn test_props_nodes_collects_from_every_value() {
        let props = Props::new()
            .with("header", host("h1", Props::new()))
            .with("label", "text")
            .with(
                "items",
                vec![Value::from(host("li", Props::new())), Value::Null],
            );

        let names: Vec<String> = props.nodes().flatten().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["h1", "li"]);
    }
}
