//! Continuation queue
//!
//! FIFO for newly suspended nodes. Yield frames and boundary recoveries go to the
//! head because they continue work that is already in progress.

use std::collections::VecDeque;

use tracing::debug;

use crate::types::Frame;

#[derive(Default)]
pub(crate) struct Queue {
    frames: VecDeque<Frame>,
}

impl Queue {
    pub(crate) fn push(&mut self, frame: Frame) {
        debug!(kind = frame.kind_name(), queued = self.frames.len() + 1, "frame queued");
        self.frames.push_back(frame);
    }

    pub(crate) fn push_front(&mut self, frame: Frame) {
        debug!(kind = frame.kind_name(), queued = self.frames.len() + 1, "frame queued at head");
        self.frames.push_front(frame);
    }

    pub(crate) fn pop(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    #[cfg(test)]
    pub(crate) fn kinds(&self) -> Vec<&'static str> {
        self.frames.iter().map(Frame::kind_name).collect()
    }
}
