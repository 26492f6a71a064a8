//! Driver
//!
//! Runs the first walk, then drains the continuation queue one frame at a time:
//! wait for the frame's resume condition, restore what it captured, resume it, and
//! walk whatever it produced. The pass ends when the queue is empty.

use std::rc::Rc;

use tracing::debug;

use super::exec_loop::{update, visit};
use super::pass::Pass;
use crate::config::PrepassConfig;
use crate::errors::{Interrupt, PrepassError};
use crate::hooks::{self, RendererState};
use crate::runtime::{self, PassGuard};
use crate::types::visitor::{noop_client_visitor, noop_visitor};
use crate::types::{ClientVisitor, ComponentInstance, Element, FrameKind, Node, Visitor};

/// A configured pass, ready to run over a tree
///
/// ```ignore
/// Prepass::new(PrepassConfig::default())
///     .visitor(|element, _instance| {
///         println!("visited {}", element.name());
///         Ok(())
///     })
///     .run(root)
///     .await?;
/// ```
pub struct Prepass {
    config: PrepassConfig,
    visitor: Option<Visitor>,
    client_visitor: Option<ClientVisitor>,
}

impl Prepass {
    pub fn new(config: PrepassConfig) -> Self {
        Prepass {
            config,
            visitor: None,
            client_visitor: None,
        }
    }

    /// Inspect every evaluated node before it renders
    pub fn visitor(
        mut self,
        visitor: impl Fn(&Element, Option<&ComponentInstance>) -> Result<(), Interrupt> + 'static,
    ) -> Self {
        self.visitor = Some(Rc::new(visitor));
        self
    }

    /// Resolve opaque references
    pub fn client_visitor(
        mut self,
        resolver: impl Fn(&Element) -> Result<Option<Node>, Interrupt> + 'static,
    ) -> Self {
        self.client_visitor = Some(Rc::new(resolver));
        self
    }

    /// Walk every node reachable from `root`, including nodes discovered after resumes
    pub async fn run(self, root: impl Into<Node>) -> Result<(), PrepassError> {
        let _guard = PassGuard::enter();

        let state = Rc::new(RendererState::default());
        runtime::reset();
        hooks::set_renderer_state(state.clone());

        let mut pass = Pass::new(
            self.config,
            self.visitor.unwrap_or_else(noop_visitor),
            self.client_visitor.unwrap_or_else(noop_client_visitor),
        );

        visit(&mut pass, root.into())?;
        flush_frames(&mut pass, &state).await
    }
}

/// Run a pass with default configuration; omitted callbacks are no-ops
pub async fn run_prepass(
    root: impl Into<Node>,
    visitor: Option<Visitor>,
    client_visitor: Option<ClientVisitor>,
) -> Result<(), PrepassError> {
    let pass = Prepass {
        config: PrepassConfig::default(),
        visitor,
        client_visitor,
    };
    pass.run(root).await
}

/// Drain the queue in order until it is empty or an error goes unrecovered
async fn flush_frames(pass: &mut Pass, state: &Rc<RendererState>) -> Result<(), PrepassError> {
    while let Some(frame) = pass.queue.pop() {
        let settled = match (&frame.thenable, &frame.kind) {
            (Some(thenable), _) => thenable.clone().settle().await,
            (None, FrameKind::Yield(_)) if pass.config.cooperative_yield => {
                tokio::task::yield_now().await;
                Ok(())
            }
            (None, _) => Ok(()),
        };

        // another pass may have run while this one was waiting
        hooks::set_renderer_state(state.clone());

        match settled {
            Ok(()) => {
                debug!(kind = frame.kind_name(), remaining = pass.queue.len(), "resuming frame");
                update(pass, frame)?;
            }
            Err(error) => match &frame.boundary {
                Some(boundary) => {
                    debug!(
                        kind = frame.kind_name(),
                        boundary = boundary.instance().name(),
                        error = %error,
                        "resume condition rejected, recovering at boundary"
                    );
                    pass.queue.push_front(boundary.recovery_frame(error));
                }
                None => return Err(error),
            },
        }
    }
    Ok(())
}
