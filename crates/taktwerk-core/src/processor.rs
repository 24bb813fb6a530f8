use crate::error::Result;
use crate::event::Event;
use crate::schedule_runner::ScheduleRunnerState;
use crate::side_effect::SideEffect;
use crate::time_alarm::TimeAlarmState;
use crate::work_queue::WorkQueueState;

// ---------------------------------------------------------------------------
// ProcessorState
// ---------------------------------------------------------------------------

/// A captured processor state, one variant per processor kind.
///
/// Snapshots are plain owned values: capturing clones the processor's state,
/// restoring moves a clone back in, so a stored snapshot is never aliased by
/// live processor structures.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorState {
    WorkQueue(WorkQueueState),
    ScheduleRunner(ScheduleRunnerState),
    TimeAlarm(TimeAlarmState),
}

impl ProcessorState {
    /// Name of the processor kind this snapshot belongs to, for error and
    /// log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessorState::WorkQueue(_) => "WorkQueueProcessor",
            ProcessorState::ScheduleRunner(_) => "ScheduleRunnerProcessor",
            ProcessorState::TimeAlarm(_) => "TimeAlarmProcessor",
        }
    }
}

// ---------------------------------------------------------------------------
// EventProcessor
// ---------------------------------------------------------------------------

/// A processing unit registered with an engine.
///
/// Processors consume events and produce side effects; events a processor
/// does not recognize yield an empty vec, never an error. Processors must
/// not block, sleep, or read a wall clock; all time flows through
/// [`crate::event::TimeEvent`].
pub trait EventProcessor {
    /// Processes one event, returning any resulting side effects.
    fn process(&mut self, event: &Event) -> Vec<SideEffect>;

    /// Processor name used in log lines.
    fn name(&self) -> &'static str;

    /// Captures the current state for later restoration. The returned value
    /// is independent of the processor's internal structures.
    fn capture_state(&self) -> ProcessorState;

    /// Restores a state previously captured from this processor.
    ///
    /// Fails with [`crate::CoreError::SnapshotMismatch`] when handed a
    /// snapshot variant belonging to a different processor kind; silently
    /// corrupting state would be worse than failing.
    fn restore_state(&mut self, state: ProcessorState) -> Result<()>;
}
