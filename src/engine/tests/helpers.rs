//! Test helpers for engine tests
//!
//! Small component builders, a shared log, and deferred thenables the test resolves by hand.

use std::cell::RefCell;
use std::rc::Rc;

use tokio::sync::oneshot;

use crate::config::PrepassConfig;
use crate::context::Context;
use crate::engine::Prepass;
use crate::errors::{Interrupt, PrepassError};
use crate::hooks::use_context;
use crate::types::{Component, ElementType, Node, Props, RenderResult, Thenable};

/// Ordered record of what a pass did
#[derive(Clone, Default)]
pub struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| e.as_str() == entry).count()
    }
}

/// Pass that records every visited element name and never time-slices
pub fn recording_pass(log: &Log) -> Prepass {
    let log = log.clone();
    Prepass::new(no_yield()).visitor(move |element, _| {
        log.push(element.name());
        Ok(())
    })
}

pub fn no_yield() -> PrepassConfig {
    PrepassConfig::builder()
        .defaults_only()
        .cooperative_yield(false)
        .build()
        .unwrap()
}

/// Yield after every single step of the walk
pub fn always_yield() -> PrepassConfig {
    PrepassConfig::builder()
        .defaults_only()
        .cooperative_yield(true)
        .yield_after_ms(0)
        .build()
        .unwrap()
}

/// Function component that renders its `children` prop
pub fn passthrough(name: &str) -> ElementType {
    ElementType::function(name, |props: &Props| Ok(props.children()))
}

/// Function component that renders nothing
pub fn leaf(name: &str) -> ElementType {
    ElementType::function(name, |_: &Props| Ok(Node::Empty))
}

pub fn el(ty: &ElementType, children: impl Into<Node>) -> Node {
    ty.element(Props::new().with_children(children))
}

pub fn empty(ty: &ElementType) -> Node {
    ty.element(Props::new())
}

/// Function component logging `<label>=<value>` for the nearest value of `ctx`
pub fn reader(ctx: &Context<&'static str>, log: &Log, label: &'static str) -> ElementType {
    let (ctx, log) = (ctx.clone(), log.clone());
    ElementType::function(label, move |_: &Props| {
        let value = use_context(&ctx)?;
        log.push(format!("{label}={value}"));
        Ok(Node::Empty)
    })
}

/// Error boundary rendering a `Fallback` leaf once it has caught something
struct Boundary {
    name: &'static str,
    log: Log,
    caught: bool,
    fail_fallback: bool,
}

impl Component for Boundary {
    fn render(&mut self, props: &Props) -> RenderResult {
        if !self.caught {
            return Ok(props.children());
        }
        if self.fail_fallback {
            return Err(Interrupt::error(format!("{} fallback broke", self.name)));
        }
        Ok(empty(&leaf(&format!("{}.Fallback", self.name))))
    }

    fn is_error_boundary(&self) -> bool {
        true
    }

    fn did_catch(&mut self, error: &PrepassError) {
        self.caught = true;
        self.log.push(format!("{} caught: {error}", self.name));
    }
}

pub fn boundary(name: &'static str, log: &Log) -> ElementType {
    boundary_with(name, log, false)
}

pub fn boundary_with(name: &'static str, log: &Log, fail_fallback: bool) -> ElementType {
    let log = log.clone();
    ElementType::class(name, move |_: &Props| {
        Box::new(Boundary {
            name,
            log: log.clone(),
            caught: false,
            fail_fallback,
        })
    })
}

/// Handle that settles a [`deferred`] thenable
pub struct Trigger(oneshot::Sender<Result<(), PrepassError>>);

impl Trigger {
    pub fn resolve(self) {
        let _ = self.0.send(Ok(()));
    }

    pub fn reject(self, message: &str) {
        let _ = self.0.send(Err(PrepassError::msg(message)));
    }
}

/// Thenable that stays pending until its trigger fires
pub fn deferred() -> (Thenable, Trigger) {
    let (tx, rx) = oneshot::channel();
    let thenable = Thenable::new(async move {
        rx.await
            .unwrap_or_else(|_| Err(PrepassError::msg("trigger dropped")))
    });
    (thenable, Trigger(tx))
}

/// Suspension that resumes after one scheduler tick
pub fn next_tick() -> Interrupt {
    Interrupt::suspend(async {
        tokio::task::yield_now().await;
        Ok(())
    })
}
