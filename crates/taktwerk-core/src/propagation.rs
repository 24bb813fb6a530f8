use crate::engine::Engine;
use crate::error::Result;
use crate::event::Event;
use crate::processor::EventProcessor;
use crate::side_effect::SideEffect;
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// EventPropagatingEngine
// ---------------------------------------------------------------------------

/// Engine wrapper that re-injects side effects which are also events.
///
/// After dispatching an event through the inner engine, every returned side
/// effect that converts via [`SideEffect::as_event`] is queued and processed
/// in turn, until no triggered events remain. Traversal is breadth-first
/// over an explicit FIFO queue: all side effects of one level are collected
/// before any triggered event of that level is dispatched, and a side
/// effect's direct results always precede anything it subsequently triggers.
///
/// There is no cycle detection: a side effect that perpetually re-triggers
/// itself will not terminate. Keeping triggering acyclic is the caller's
/// responsibility.
pub struct EventPropagatingEngine<E> {
    inner: E,
}

impl<E: Engine> EventPropagatingEngine<E> {
    /// Wraps the given engine.
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    /// Consumes the wrapper, returning the inner engine.
    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Engine> Engine for EventPropagatingEngine<E> {
    fn register(&mut self, processor: Box<dyn EventProcessor>) {
        self.inner.register(processor);
    }

    fn process_event(&mut self, event: &Event) -> Vec<SideEffect> {
        let mut all_side_effects = Vec::new();
        let mut queue: VecDeque<Event> = VecDeque::new();
        queue.push_back(event.clone());

        while let Some(current) = queue.pop_front() {
            let side_effects = self.inner.process_event(&current);

            for side_effect in &side_effects {
                if let Some(triggered) = side_effect.as_event() {
                    tracing::info!(%side_effect, "side effect queued as event");
                    queue.push_back(triggered);
                }
            }

            all_side_effects.extend(side_effects);
        }

        all_side_effects
    }

    fn step_back(&mut self) -> Result<bool> {
        self.inner.step_back()
    }

    fn history_size(&self) -> usize {
        self.inner.history_size()
    }

    fn clear_history(&mut self) {
        self.inner.clear_history();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EventProcessingEngine;
    use crate::event::{
        ActionCompletedEvent, TimeEvent, WorkInstructionEvent, WorkInstructionStatus,
        WorkQueueMessage, WorkQueueStatus,
    };
    use crate::schedule_runner::ScheduleRunnerProcessor;
    use crate::work_queue::WorkQueueProcessor;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn propagating_engine() -> EventPropagatingEngine<EventProcessingEngine> {
        let mut engine = EventPropagatingEngine::new(EventProcessingEngine::new());
        engine.register(Box::new(WorkQueueProcessor::new()));
        engine.register(Box::new(ScheduleRunnerProcessor::new()));
        engine
    }

    fn declare(engine: &mut impl Engine, id: &str, queue: &str, move_time: DateTime<Utc>) {
        engine.process_event(&Event::WorkInstruction(WorkInstructionEvent {
            work_instruction_id: id.to_string(),
            work_queue_id: queue.to_string(),
            fetch_che: "RTG-01".to_string(),
            status: WorkInstructionStatus::Pending,
            estimated_move_time: Some(move_time),
        }));
    }

    #[test]
    fn created_schedule_is_re_injected_into_the_runner() {
        let mut engine = propagating_engine();
        declare(&mut engine, "WI-001", "WQ-001", at(10));

        // Activation produces the schedule; propagation feeds it back so the
        // runner is initialized without any external wiring.
        let effects = engine.process_event(&Event::WorkQueue(WorkQueueMessage::new(
            "WQ-001",
            WorkQueueStatus::Active,
        )));
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], SideEffect::ScheduleCreated(_)));

        // The runner now reacts to time on its own.
        let activated = engine.process_event(&Event::Time(TimeEvent::new(at(10))));
        assert_eq!(activated.len(), 1);
        assert!(matches!(activated[0], SideEffect::ActionActivated(_)));
    }

    #[test]
    fn step_back_unwinds_the_re_injected_dispatch_too() {
        let mut engine = propagating_engine();
        declare(&mut engine, "WI-001", "WQ-001", at(10));

        // One external call, two dispatches (queue message + re-injected
        // schedule), so two step-backs fully undo the activation.
        engine.process_event(&Event::WorkQueue(WorkQueueMessage::new(
            "WQ-001",
            WorkQueueStatus::Active,
        )));
        assert!(engine.step_back().unwrap());
        assert!(engine.step_back().unwrap());

        let effects = engine.process_event(&Event::WorkQueue(WorkQueueMessage::new(
            "WQ-001",
            WorkQueueStatus::Active,
        )));
        assert!(matches!(effects[0], SideEffect::ScheduleCreated(_)));
    }

    #[test]
    fn propagation_pushes_one_history_entry_per_dispatched_event() {
        let mut engine = propagating_engine();
        declare(&mut engine, "WI-001", "WQ-001", at(10));
        assert_eq!(engine.history_size(), 1);

        // The activation dispatches two events: the queue message itself and
        // the re-injected created schedule.
        engine.process_event(&Event::WorkQueue(WorkQueueMessage::new(
            "WQ-001",
            WorkQueueStatus::Active,
        )));
        assert_eq!(engine.history_size(), 3);
    }

    #[test]
    fn completion_cascade_flows_through_the_wrapper() {
        let mut engine = propagating_engine();
        declare(&mut engine, "WI-001", "WQ-001", at(10));
        engine.process_event(&Event::WorkQueue(WorkQueueMessage::new(
            "WQ-001",
            WorkQueueStatus::Active,
        )));

        let activated = engine.process_event(&Event::Time(TimeEvent::new(at(10))));
        let first_id = match &activated[0] {
            SideEffect::ActionActivated(a) => a.action_id,
            other => panic!("expected activation, got {other}"),
        };

        let effects = engine.process_event(&Event::ActionCompleted(ActionCompletedEvent {
            action_id: first_id,
            work_queue_id: "WQ-001".to_string(),
        }));
        assert_eq!(effects.len(), 2);
        assert!(matches!(effects[0], SideEffect::ActionCompleted(_)));
        assert!(matches!(effects[1], SideEffect::ActionActivated(_)));
    }
}
