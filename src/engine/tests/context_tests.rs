//! Context scoping across siblings, nesting and suspension

use tokio_test::{assert_pending, assert_ready, task};

use super::helpers::*;
use crate::context::Context;
use crate::errors::Interrupt;
use crate::hooks::{use_context, use_ref};
use crate::types::{ElementType, Node, Props};

#[tokio::test]
async fn test_nested_provider_overrides_only_its_subtree() {
    let theme = Context::new("default");
    let log = Log::default();

    let c1_reader = reader(&theme, &log, "c1");
    let inner_theme = theme.clone();
    let c1 = ElementType::function("C1", move |_: &Props| {
        Ok(inner_theme.provider("override", empty(&c1_reader)))
    });
    let c2 = reader(&theme, &log, "c2");
    let outside = reader(&theme, &log, "outside");

    let tree = Node::list(vec![
        theme.provider("outer", vec![empty(&c1), empty(&c2)]),
        empty(&outside),
    ]);

    run(tree).await;

    assert_eq!(log.entries(), vec!["c1=override", "c2=outer", "outside=default"]);
}

#[tokio::test]
async fn test_consumer_renders_nearest_value() {
    let count = Context::new(0u32);
    let log = Log::default();

    let consumer_log = log.clone();
    let consumer = count.consumer(move |value| {
        consumer_log.push(format!("consumer={value}"));
        Node::Empty
    });

    let tree = Node::list(vec![
        count.provider(5, consumer.clone()),
        consumer,
        // a consumer without a render prop renders nothing
        ElementType::Consumer(count.erased().clone()).element(Props::new()),
    ]);

    run(tree).await;

    assert_eq!(log.entries(), vec!["consumer=5", "consumer=0"]);
}

#[test]
fn test_context_survives_suspension_while_siblings_rebind() {
    let theme = Context::new("default");
    let log = Log::default();
    let (thenable, trigger) = deferred();

    let ctx = theme.clone();
    let suspend_log = log.clone();
    let suspender = ElementType::function("Suspender", move |_: &Props| {
        let waited = use_ref(|| false)?;
        if !waited.replace(true) {
            return Err(Interrupt::Suspend(thenable.clone()));
        }
        suspend_log.push(format!("suspender={}", use_context(&ctx)?));
        Ok(Node::Empty)
    });
    let sibling = reader(&theme, &log, "sibling");

    let tree = Node::list(vec![
        theme.provider("a", empty(&suspender)),
        theme.provider("b", empty(&sibling)),
    ]);

    let mut pass = task::spawn(recording_pass(&Log::default()).run(tree));
    assert_pending!(pass.poll());
    assert_eq!(log.entries(), vec!["sibling=b"]);

    trigger.resolve();
    assert!(pass.is_woken());
    assert_ready!(pass.poll()).unwrap();

    assert_eq!(log.entries(), vec!["sibling=b", "suspender=a"]);
}

#[tokio::test]
async fn test_provider_without_value_binds_default() {
    let theme = Context::new("default");
    let log = Log::default();
    let inner = reader(&theme, &log, "inner");

    let tree = theme.provider(
        "outer",
        ElementType::Provider(theme.erased().clone())
            .element(Props::new().with_children(empty(&inner))),
    );
    run(tree).await;

    assert_eq!(log.entries(), vec!["inner=default"]);
}

#[test]
fn test_read_context_value_outside_pass_is_default() {
    let theme = Context::new("default");
    assert_eq!(*crate::runtime::read_context_value(&theme), "default");
}

async fn run(tree: Node) {
    recording_pass(&Log::default()).run(tree).await.unwrap();
}
