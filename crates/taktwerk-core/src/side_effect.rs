use crate::event::Event;
use crate::takt::Takt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// SideEffect
// ---------------------------------------------------------------------------

/// Closed set of side effects produced by event processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SideEffect {
    AlarmSet(AlarmSet),
    AlarmTriggered(AlarmTriggered),
    ScheduleCreated(ScheduleCreated),
    ScheduleAborted(ScheduleAborted),
    ActionActivated(ActionActivated),
    ActionCompleted(ActionCompleted),
}

impl SideEffect {
    /// Converts this side effect into an event if it is dual-typed.
    ///
    /// Only a created schedule qualifies today; the propagation layer uses
    /// this to decide what to re-inject.
    pub fn as_event(&self) -> Option<Event> {
        match self {
            SideEffect::ScheduleCreated(created) => {
                Some(Event::ScheduleCreated(created.clone()))
            }
            SideEffect::AlarmSet(_)
            | SideEffect::AlarmTriggered(_)
            | SideEffect::ScheduleAborted(_)
            | SideEffect::ActionActivated(_)
            | SideEffect::ActionCompleted(_) => None,
        }
    }
}

impl fmt::Display for SideEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideEffect::AlarmSet(e) => e.fmt(f),
            SideEffect::AlarmTriggered(e) => e.fmt(f),
            SideEffect::ScheduleCreated(e) => e.fmt(f),
            SideEffect::ScheduleAborted(e) => e.fmt(f),
            SideEffect::ActionActivated(e) => e.fmt(f),
            SideEffect::ActionCompleted(e) => e.fmt(f),
        }
    }
}

// ---------------------------------------------------------------------------
// Alarm side effects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmSet {
    pub alarm_name: String,
    pub trigger_time: DateTime<Utc>,
}

impl fmt::Display for AlarmSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AlarmSet[alarm_name={}, trigger_time={}]",
            self.alarm_name, self.trigger_time
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmTriggered {
    pub alarm_name: String,
    pub triggered_at: DateTime<Utc>,
}

impl fmt::Display for AlarmTriggered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AlarmTriggered[alarm_name={}, triggered_at={}]",
            self.alarm_name, self.triggered_at
        )
    }
}

// ---------------------------------------------------------------------------
// Schedule side effects
// ---------------------------------------------------------------------------

/// A schedule was created for a work queue.
///
/// Dual-typed: besides being a side effect of the work-queue processor it is
/// also an [`Event`], which lets the propagation layer hand the generated
/// takts to the schedule runner without any external wiring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleCreated {
    pub work_queue_id: String,
    pub takts: Vec<Takt>,
    /// Earliest estimated move time across the queue's instructions, if any
    /// instruction carried one. The schedule must not start before this.
    pub estimated_move_time: Option<DateTime<Utc>>,
}

impl fmt::Display for ScheduleCreated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScheduleCreated[work_queue_id={}, takts={}, estimated_move_time={:?}]",
            self.work_queue_id,
            self.takts.len(),
            self.estimated_move_time
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleAborted {
    pub work_queue_id: String,
}

impl fmt::Display for ScheduleAborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScheduleAborted[work_queue_id={}]", self.work_queue_id)
    }
}

// ---------------------------------------------------------------------------
// Action side effects
// ---------------------------------------------------------------------------

/// An action became ready to execute, either at schedule start or because
/// the last of its prerequisites completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionActivated {
    pub action_id: Uuid,
    pub work_queue_id: String,
    pub takt_name: String,
    pub action_description: String,
    pub activated_at: DateTime<Utc>,
}

impl fmt::Display for ActionActivated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ActionActivated[action_id={}, work_queue_id={}, takt_name={}, description={}]",
            self.action_id, self.work_queue_id, self.takt_name, self.action_description
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCompleted {
    pub action_id: Uuid,
    pub work_queue_id: String,
    pub takt_name: String,
    pub action_description: String,
    pub completed_at: DateTime<Utc>,
}

impl fmt::Display for ActionCompleted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ActionCompleted[action_id={}, work_queue_id={}, takt_name={}, description={}]",
            self.action_id, self.work_queue_id, self.takt_name, self.action_description
        )
    }
}
