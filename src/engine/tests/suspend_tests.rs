//! Suspension and resumption through the continuation queue

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tokio_test::{assert_pending, assert_ready, task};

use super::helpers::*;
use crate::engine::Prepass;
use crate::errors::{Interrupt, PrepassError};
use crate::hooks::{use_id, use_ref, use_state};
use crate::types::{ElementType, Node, Props, Thenable};

/// Component that suspends on `thenable` the first time, then renders `child`
fn suspends_once(name: &str, thenable: Thenable, child: Node) -> ElementType {
    ElementType::function(name, move |_: &Props| {
        let waited = use_ref(|| false)?;
        if !waited.replace(true) {
            return Err(Interrupt::Suspend(thenable.clone()));
        }
        Ok(child.clone())
    })
}

#[test]
fn test_child_is_not_visited_before_parent_resolves() {
    let log = Log::default();
    let (thenable, trigger) = deferred();
    let b = leaf("B");
    let a = suspends_once("A", thenable, empty(&b));

    let mut pass = task::spawn(recording_pass(&log).run(empty(&a)));
    assert_pending!(pass.poll());
    assert_eq!(log.entries(), vec!["A"]);

    // still waiting: polling again does not make progress
    assert_pending!(pass.poll());
    assert_eq!(log.entries(), vec!["A"]);

    trigger.resolve();
    assert_ready!(pass.poll()).unwrap();
    assert_eq!(log.entries(), vec!["A", "B"]);
}

#[test]
fn test_frames_resume_in_queue_order() {
    let log = Log::default();
    let (first, resolve_first) = deferred();
    let (second, resolve_second) = deferred();
    let x = suspends_once("X", first, empty(&leaf("X.child")));
    let y = suspends_once("Y", second, empty(&leaf("Y.child")));

    let mut pass = task::spawn(recording_pass(&log).run(vec![empty(&x), empty(&y)]));
    assert_pending!(pass.poll());

    // Y settles first but X is at the head of the queue
    resolve_second.resolve();
    assert_pending!(pass.poll());
    assert_eq!(log.entries(), vec!["X", "Y"]);

    resolve_first.resolve();
    assert_ready!(pass.poll()).unwrap();
    assert_eq!(log.entries(), vec!["X", "Y", "X.child", "Y.child"]);
}

#[tokio::test]
async fn test_resumed_component_sees_the_same_state_chain() {
    let observed = Rc::new(RefCell::new(Vec::new()));
    let evaluations = Rc::new(Cell::new(0));

    let recorded = observed.clone();
    let count = evaluations.clone();
    let component = ElementType::function("Stateful", move |_: &Props| {
        count.set(count.get() + 1);
        let id = use_id()?;
        let (label, set_label) = use_state(|| "initial".to_string())?;
        if label == "initial" {
            // render-phase update, applied before the suspension
            set_label.set("updated".to_string());
        }
        let renders = use_ref(|| 0)?;
        *renders.borrow_mut() += 1;
        recorded
            .borrow_mut()
            .push((id, label.clone(), *renders.borrow()));

        if *renders.borrow() == 2 {
            return Err(next_tick());
        }
        Ok(Node::Empty)
    });

    Prepass::new(no_yield()).run(empty(&component)).await.unwrap();

    assert_eq!(
        *observed.borrow(),
        vec![
            (":p0:".to_string(), "initial".to_string(), 1),
            (":p0:".to_string(), "updated".to_string(), 2),
            // resumed: same id, same state, ref kept counting
            (":p0:".to_string(), "updated".to_string(), 3),
        ]
    );
    assert_eq!(evaluations.get(), 3);
}

#[test]
fn test_visitor_suspension_defers_render() {
    let log = Log::default();
    let (thenable, trigger) = deferred();

    let renders = Rc::new(Cell::new(0));
    let counted = renders.clone();
    let slow = ElementType::function("Slow", move |_: &Props| {
        counted.set(counted.get() + 1);
        Ok(Node::Empty)
    });

    let visitor_log = log.clone();
    let pass = Prepass::new(no_yield()).visitor(move |element, _| {
        visitor_log.push(element.name());
        if element.name() == "Slow" {
            return Err(Interrupt::Suspend(thenable.clone()));
        }
        Ok(())
    });

    let mut pass = task::spawn(pass.run(empty(&slow)));
    assert_pending!(pass.poll());
    assert_eq!(renders.get(), 0);

    trigger.resolve();
    assert_ready!(pass.poll()).unwrap();
    assert_eq!(renders.get(), 1);
    // resuming renders the component without inspecting it again
    assert_eq!(log.count("Slow"), 1);
}

#[tokio::test]
async fn test_rejected_resume_without_boundary_fails_the_pass() {
    let log = Log::default();
    let failing = suspends_once(
        "Failing",
        Thenable::rejected(PrepassError::msg("fetch failed")),
        empty(&leaf("Never")),
    );

    let result = recording_pass(&log).run(empty(&failing)).await;

    match result {
        Err(PrepassError::Thrown(message)) => assert_eq!(message, "fetch failed"),
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(log.count("Never"), 0);
}

#[tokio::test]
async fn test_class_instance_is_kept_across_resume() {
    use crate::types::{Component, RenderResult};

    struct Loader {
        log: Log,
        attempts: u32,
    }

    impl Component for Loader {
        fn render(&mut self, _props: &Props) -> RenderResult {
            self.attempts += 1;
            self.log.push(format!("attempt {}", self.attempts));
            if self.attempts == 1 {
                return Err(next_tick());
            }
            Ok(Node::Empty)
        }
    }

    let log = Log::default();
    let constructed = Rc::new(Cell::new(0));
    let (component_log, counter) = (log.clone(), constructed.clone());
    let loader = ElementType::class("Loader", move |_: &Props| {
        counter.set(counter.get() + 1);
        Box::new(Loader {
            log: component_log.clone(),
            attempts: 0,
        })
    });

    Prepass::new(no_yield()).run(empty(&loader)).await.unwrap();

    assert_eq!(constructed.get(), 1);
    assert_eq!(log.entries(), vec!["attempt 1", "attempt 2"]);
}
