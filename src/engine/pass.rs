//! State owned by one running pass

use std::time::Instant;

use super::queue::Queue;
use crate::config::PrepassConfig;
use crate::types::{ClientVisitor, Visitor};

pub(crate) struct Pass {
    pub(crate) queue: Queue,
    pub(crate) visitor: Visitor,
    pub(crate) client_visitor: ClientVisitor,
    pub(crate) config: PrepassConfig,
}

impl Pass {
    pub(crate) fn new(config: PrepassConfig, visitor: Visitor, client_visitor: ClientVisitor) -> Self {
        Pass {
            queue: Queue::default(),
            visitor,
            client_visitor,
            config,
        }
    }

    /// Whether the slice that began at `start` is used up
    pub(crate) fn should_yield(&self, start: Instant) -> bool {
        self.config.cooperative_yield && start.elapsed() > self.config.yield_after()
    }
}
