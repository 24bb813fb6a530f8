use crate::error::{CoreError, Result};
use crate::event::{Event, WorkInstructionEvent, WorkInstructionStatus, WorkQueueStatus};
use crate::processor::{EventProcessor, ProcessorState};
use crate::side_effect::{ScheduleAborted, ScheduleCreated, SideEffect};
use crate::workflow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// WorkInstruction
// ---------------------------------------------------------------------------

/// A stored work instruction: one unit of cargo-handling work that expands
/// into a dependency-chained action sequence when its queue activates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkInstruction {
    pub work_instruction_id: String,
    pub work_queue_id: String,
    pub fetch_che: String,
    pub status: WorkInstructionStatus,
    pub estimated_move_time: Option<DateTime<Utc>>,
}

impl From<&WorkInstructionEvent> for WorkInstruction {
    fn from(event: &WorkInstructionEvent) -> Self {
        Self {
            work_instruction_id: event.work_instruction_id.clone(),
            work_queue_id: event.work_queue_id.clone(),
            fetch_che: event.fetch_che.clone(),
            status: event.status,
            estimated_move_time: event.estimated_move_time,
        }
    }
}

// ---------------------------------------------------------------------------
// WorkQueueProcessor
// ---------------------------------------------------------------------------

/// Complete queue-lifecycle state, cloneable as one value for snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkQueueState {
    /// Queues with a live schedule.
    active_queues: BTreeSet<String>,
    /// Stored instructions per queue, in declaration order. An instruction
    /// id lives in exactly one queue at a time.
    instructions: BTreeMap<String, Vec<WorkInstruction>>,
}

/// Tracks queue activation and stored work instructions, and turns an
/// activation into a generated schedule.
///
/// Activation is idempotent: only the first `Active` message for a queue
/// emits [`ScheduleCreated`]. Deactivation emits [`ScheduleAborted`] but
/// keeps the queue's instructions, so a later reactivation regenerates the
/// takts from everything stored by then.
#[derive(Debug, Default)]
pub struct WorkQueueProcessor {
    state: WorkQueueState,
}

impl WorkQueueProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle_instruction(&mut self, event: &WorkInstructionEvent) -> Vec<SideEffect> {
        // An id matching an existing instruction removes it from whichever
        // queue holds it; declaring under the same queue is an update.
        for list in self.state.instructions.values_mut() {
            list.retain(|wi| wi.work_instruction_id != event.work_instruction_id);
        }

        self.state
            .instructions
            .entry(event.work_queue_id.clone())
            .or_default()
            .push(WorkInstruction::from(event));

        Vec::new()
    }

    fn handle_active(&mut self, work_queue_id: &str) -> Vec<SideEffect> {
        if !self.state.active_queues.insert(work_queue_id.to_string()) {
            // Schedule already exists for this queue.
            return Vec::new();
        }

        let instructions = self
            .state
            .instructions
            .get(work_queue_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let takts = workflow::build_takts(instructions);
        let estimated_move_time = instructions
            .iter()
            .filter_map(|wi| wi.estimated_move_time)
            .min();

        vec![SideEffect::ScheduleCreated(ScheduleCreated {
            work_queue_id: work_queue_id.to_string(),
            takts,
            estimated_move_time,
        })]
    }

    fn handle_inactive(&mut self, work_queue_id: &str) -> Vec<SideEffect> {
        if !self.state.active_queues.remove(work_queue_id) {
            // Nothing to abort; instructions stay stored either way.
            return Vec::new();
        }

        vec![SideEffect::ScheduleAborted(ScheduleAborted {
            work_queue_id: work_queue_id.to_string(),
        })]
    }
}

impl EventProcessor for WorkQueueProcessor {
    fn process(&mut self, event: &Event) -> Vec<SideEffect> {
        match event {
            Event::WorkQueue(message) => match message.status {
                WorkQueueStatus::Active => self.handle_active(&message.work_queue_id),
                WorkQueueStatus::Inactive => self.handle_inactive(&message.work_queue_id),
            },
            Event::WorkInstruction(instruction) => self.handle_instruction(instruction),
            Event::Time(_)
            | Event::SetTimeAlarm(_)
            | Event::ActionCompleted(_)
            | Event::ScheduleCreated(_) => Vec::new(),
        }
    }

    fn name(&self) -> &'static str {
        "WorkQueueProcessor"
    }

    fn capture_state(&self) -> ProcessorState {
        ProcessorState::WorkQueue(self.state.clone())
    }

    fn restore_state(&mut self, state: ProcessorState) -> Result<()> {
        match state {
            ProcessorState::WorkQueue(state) => {
                self.state = state;
                Ok(())
            }
            other => {
                tracing::error!(snapshot_kind = other.kind(), "rejected foreign snapshot");
                Err(CoreError::SnapshotMismatch {
                    processor: self.name(),
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
