//! Hand-off between a detection worker and the render consumer.

use std::sync::{Arc, Mutex, PoisonError};

use crate::detector::MarkerDetection;

/// What the worker learned about one frame. `detection` is `None` when that
/// frame had no marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameResult {
    pub frame_idx: usize,
    pub time_ns: i64,
    pub detection: Option<MarkerDetection>,
}

/// Single-slot, last-write-wins mailbox.
///
/// The writer overwrites whatever the reader has not picked up yet, so the
/// reader always sees the most recent frame and never a backlog.
#[derive(Debug, Clone, Default)]
pub struct PoseSlot {
    slot: Arc<Mutex<Option<FrameResult>>>,
}

impl PoseSlot {
    pub fn new() -> PoseSlot {
        PoseSlot::default()
    }

    pub fn publish(&self, result: FrameResult) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(result);
    }

    /// Takes the latest result, leaving the slot empty.
    pub fn take(&self) -> Option<FrameResult> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Reads the latest result without consuming it.
    pub fn peek(&self) -> Option<FrameResult> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
