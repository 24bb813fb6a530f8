use crate::error::{CoreError, Result};
use crate::event::{ActionCompletedEvent, Event, TimeEvent, WorkQueueStatus};
use crate::processor::{EventProcessor, ProcessorState};
use crate::side_effect::{ActionActivated, ActionCompleted, SideEffect};
use crate::takt::{Action, ActionState, Takt};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ScheduleState
// ---------------------------------------------------------------------------

/// An action under execution: the takt it belongs to, the immutable action
/// value, and its current runtime state.
#[derive(Debug, Clone, PartialEq)]
struct TrackedAction {
    takt_name: String,
    action: Action,
    state: ActionState,
}

/// Execution state for one work queue's schedule.
#[derive(Debug, Clone, PartialEq)]
struct ScheduleState {
    estimated_move_time: Option<DateTime<Utc>>,
    takts: Vec<Takt>,
    /// Tracked actions in takt order, then position within takt. Activation
    /// scans walk this order so simultaneous activations are deterministic.
    actions: Vec<TrackedAction>,
    /// Action id -> index into `actions`.
    index: HashMap<Uuid, usize>,
    started: bool,
}

impl ScheduleState {
    fn new(estimated_move_time: Option<DateTime<Utc>>, takts: Vec<Takt>) -> Self {
        let mut actions = Vec::new();
        let mut index = HashMap::new();

        for takt in &takts {
            for action in &takt.actions {
                index.insert(action.id, actions.len());
                actions.push(TrackedAction {
                    takt_name: takt.name.clone(),
                    action: action.clone(),
                    state: ActionState::Pending,
                });
            }
        }

        Self {
            estimated_move_time,
            takts,
            actions,
            index,
            started: false,
        }
    }

    fn all_completed(&self, ids: &BTreeSet<Uuid>) -> bool {
        ids.iter().all(|id| {
            self.index
                .get(id)
                .is_some_and(|&i| self.actions[i].state == ActionState::Completed)
        })
    }

    /// Indices of pending actions whose whole dependency set is completed,
    /// in tracking order. Dependency-free actions only qualify here before
    /// the schedule starts; afterwards they have already been activated.
    fn activatable(&self, include_dependency_free: bool) -> Vec<usize> {
        self.actions
            .iter()
            .enumerate()
            .filter(|(_, tracked)| tracked.state == ActionState::Pending)
            .filter(|(_, tracked)| {
                if tracked.action.has_no_dependencies() {
                    include_dependency_free
                } else {
                    self.all_completed(&tracked.action.depends_on)
                }
            })
            .map(|(i, _)| i)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ScheduleRunnerProcessor
// ---------------------------------------------------------------------------

/// Complete runner state, cloneable as one value for snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleRunnerState {
    schedules: BTreeMap<String, ScheduleState>,
    /// Estimated move times by instruction id, recorded from declarations
    /// for later lookups; declarations never touch action state.
    instruction_move_times: BTreeMap<String, DateTime<Utc>>,
    /// Timestamp of the latest tick, used to stamp completion-driven side
    /// effects. Time never comes from a wall clock.
    last_tick: Option<DateTime<Utc>>,
}

/// Per-queue dependency scheduler.
///
/// Each tracked action moves `Pending -> Active -> Completed`. A schedule
/// starts on the first tick at or past its estimated move time, activating
/// every dependency-free action at once. A completion notice for an active
/// action completes it and cascade-activates every pending action whose
/// dependencies are now all satisfied; notices for unknown queues, unknown
/// actions, or actions not currently active are ignored.
///
/// Queue deactivation drops the tracked state entirely: in-flight progress
/// does not survive a deactivate/reactivate cycle, the schedule is rebuilt
/// from scratch on reactivation.
#[derive(Debug, Default)]
pub struct ScheduleRunnerProcessor {
    state: ScheduleRunnerState,
}

impl ScheduleRunnerProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the takt/action graph for a queue, replacing any existing
    /// schedule. All actions start out pending; nothing activates until a
    /// tick reaches the estimated move time.
    pub fn initialize_schedule(
        &mut self,
        work_queue_id: impl Into<String>,
        takts: Vec<Takt>,
        estimated_move_time: Option<DateTime<Utc>>,
    ) {
        let work_queue_id = work_queue_id.into();
        tracing::info!(
            work_queue_id = %work_queue_id,
            takts = takts.len(),
            "schedule initialized"
        );
        self.state
            .schedules
            .insert(work_queue_id, ScheduleState::new(estimated_move_time, takts));
    }

    /// The takt graph currently installed for a queue, if it is tracked.
    pub fn takts(&self, work_queue_id: &str) -> Option<&[Takt]> {
        self.state
            .schedules
            .get(work_queue_id)
            .map(|schedule| schedule.takts.as_slice())
    }

    fn activate(
        schedule: &mut ScheduleState,
        work_queue_id: &str,
        indices: &[usize],
        timestamp: DateTime<Utc>,
        out: &mut Vec<SideEffect>,
    ) {
        for &i in indices {
            let tracked = &mut schedule.actions[i];
            tracked.state = ActionState::Active;
            out.push(SideEffect::ActionActivated(ActionActivated {
                action_id: tracked.action.id,
                work_queue_id: work_queue_id.to_string(),
                takt_name: tracked.takt_name.clone(),
                action_description: tracked.action.description.clone(),
                activated_at: timestamp,
            }));
        }
    }

    fn handle_tick(&mut self, tick: &TimeEvent) -> Vec<SideEffect> {
        self.state.last_tick = Some(tick.timestamp);

        let mut side_effects = Vec::new();
        for (work_queue_id, schedule) in &mut self.state.schedules {
            let due = schedule
                .estimated_move_time
                .is_some_and(|t| t <= tick.timestamp);
            if schedule.started || !due {
                continue;
            }

            schedule.started = true;
            let starters = schedule.activatable(true);
            Self::activate(
                schedule,
                work_queue_id,
                &starters,
                tick.timestamp,
                &mut side_effects,
            );
        }

        side_effects
    }

    fn handle_completion(&mut self, event: &ActionCompletedEvent) -> Vec<SideEffect> {
        let Some(schedule) = self.state.schedules.get_mut(&event.work_queue_id) else {
            return Vec::new();
        };
        let Some(&completed_index) = schedule.index.get(&event.action_id) else {
            return Vec::new();
        };
        if schedule.actions[completed_index].state != ActionState::Active {
            // Stale, duplicate, or premature notice.
            return Vec::new();
        }

        // Completions carry no timestamp of their own; stamp them with the
        // latest observed tick. A valid completion implies the schedule
        // started, which implies at least one tick was seen.
        let timestamp = self.state.last_tick.unwrap_or(DateTime::UNIX_EPOCH);

        let mut side_effects = Vec::new();
        {
            let tracked = &mut schedule.actions[completed_index];
            tracked.state = ActionState::Completed;
            side_effects.push(SideEffect::ActionCompleted(ActionCompleted {
                action_id: tracked.action.id,
                work_queue_id: event.work_queue_id.clone(),
                takt_name: tracked.takt_name.clone(),
                action_description: tracked.action.description.clone(),
                completed_at: timestamp,
            }));
        }

        let unlocked = schedule.activatable(false);
        Self::activate(
            schedule,
            &event.work_queue_id,
            &unlocked,
            timestamp,
            &mut side_effects,
        );

        side_effects
    }
}

impl EventProcessor for ScheduleRunnerProcessor {
    fn process(&mut self, event: &Event) -> Vec<SideEffect> {
        match event {
            Event::Time(tick) => self.handle_tick(tick),
            Event::ActionCompleted(completed) => self.handle_completion(completed),
            Event::ScheduleCreated(created) => {
                self.initialize_schedule(
                    created.work_queue_id.clone(),
                    created.takts.clone(),
                    created.estimated_move_time,
                );
                Vec::new()
            }
            Event::WorkQueue(message) if message.status == WorkQueueStatus::Inactive => {
                // Drop the schedule; later completion notices are ignored
                // until the queue is re-initialized.
                self.state.schedules.remove(&message.work_queue_id);
                Vec::new()
            }
            Event::WorkInstruction(instruction) => {
                if let Some(move_time) = instruction.estimated_move_time {
                    self.state
                        .instruction_move_times
                        .insert(instruction.work_instruction_id.clone(), move_time);
                }
                Vec::new()
            }
            Event::WorkQueue(_) | Event::SetTimeAlarm(_) => Vec::new(),
        }
    }

    fn name(&self) -> &'static str {
        "ScheduleRunnerProcessor"
    }

    fn capture_state(&self) -> ProcessorState {
        ProcessorState::ScheduleRunner(self.state.clone())
    }

    fn restore_state(&mut self, state: ProcessorState) -> Result<()> {
        match state {
            ProcessorState::ScheduleRunner(state) => {
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
