use crate::side_effect::ScheduleCreated;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// Closed set of events the engine can process.
///
/// Events are immutable data carriers. Processors handle only the variants
/// they care about and return no side effects for everything else, so adding
/// a variant is a compile-time-checked change in every consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Periodic tick carrying an externally supplied UTC timestamp. All
    /// temporal behavior in the core is driven by these.
    Time(TimeEvent),
    SetTimeAlarm(SetTimeAlarm),
    WorkQueue(WorkQueueMessage),
    WorkInstruction(WorkInstructionEvent),
    ActionCompleted(ActionCompletedEvent),
    /// A created schedule fed back into the engine. This is the dual-typed
    /// side effect: see [`crate::side_effect::SideEffect::as_event`].
    ScheduleCreated(ScheduleCreated),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Time(e) => e.fmt(f),
            Event::SetTimeAlarm(e) => e.fmt(f),
            Event::WorkQueue(e) => e.fmt(f),
            Event::WorkInstruction(e) => e.fmt(f),
            Event::ActionCompleted(e) => e.fmt(f),
            Event::ScheduleCreated(e) => e.fmt(f),
        }
    }
}

// ---------------------------------------------------------------------------
// TimeEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeEvent {
    pub timestamp: DateTime<Utc>,
}

impl TimeEvent {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp }
    }
}

impl fmt::Display for TimeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeEvent[timestamp={}]", self.timestamp)
    }
}

// ---------------------------------------------------------------------------
// SetTimeAlarm
// ---------------------------------------------------------------------------

/// Request to set a named time-based alarm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetTimeAlarm {
    pub alarm_name: String,
    pub trigger_time: DateTime<Utc>,
}

impl fmt::Display for SetTimeAlarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SetTimeAlarm[alarm_name={}, trigger_time={}]",
            self.alarm_name, self.trigger_time
        )
    }
}

// ---------------------------------------------------------------------------
// WorkQueueMessage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkQueueStatus {
    Active,
    Inactive,
}

impl WorkQueueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkQueueStatus::Active => "active",
            WorkQueueStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for WorkQueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status change for a work queue. `Active` triggers schedule creation,
/// `Inactive` aborts it; repeated `Active` messages are idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkQueueMessage {
    pub work_queue_id: String,
    pub status: WorkQueueStatus,
}

impl WorkQueueMessage {
    pub fn new(work_queue_id: impl Into<String>, status: WorkQueueStatus) -> Self {
        Self {
            work_queue_id: work_queue_id.into(),
            status,
        }
    }
}

impl fmt::Display for WorkQueueMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WorkQueueMessage[work_queue_id={}, status={}]",
            self.work_queue_id, self.status
        )
    }
}

// ---------------------------------------------------------------------------
// WorkInstructionEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkInstructionStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// Declaration of a work instruction and the queue it belongs to.
///
/// Instruction ids are unique across all queues: re-declaring an id under a
/// different queue moves the instruction, re-declaring it under the same
/// queue updates it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkInstructionEvent {
    pub work_instruction_id: String,
    pub work_queue_id: String,
    /// Identifier of the CHE (container handling equipment) fetching the
    /// container, e.g. "RTG-01".
    pub fetch_che: String,
    pub status: WorkInstructionStatus,
    pub estimated_move_time: Option<DateTime<Utc>>,
}

impl fmt::Display for WorkInstructionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WorkInstructionEvent[work_instruction_id={}, work_queue_id={}, fetch_che={}]",
            self.work_instruction_id, self.work_queue_id, self.fetch_che
        )
    }
}

// ---------------------------------------------------------------------------
// ActionCompletedEvent
// ---------------------------------------------------------------------------

/// External confirmation that an action finished. Ignored unless the named
/// action is currently active in the named queue's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCompletedEvent {
    pub action_id: Uuid,
    pub work_queue_id: String,
}

impl fmt::Display for ActionCompletedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ActionCompletedEvent[action_id={}, work_queue_id={}]",
            self.action_id, self.work_queue_id
        )
    }
}
