//! End-to-end scenario: a work queue goes active, its schedule is generated
//! and picked up by the runner through event propagation, actions activate
//! and cascade as the chain completes, and deactivation aborts everything.

use chrono::{DateTime, TimeZone, Utc};
use taktwerk_core::event::{
    ActionCompletedEvent, TimeEvent, WorkInstructionEvent, WorkInstructionStatus,
    WorkQueueMessage, WorkQueueStatus,
};
use taktwerk_core::{
    Engine, Event, EventProcessingEngine, EventPropagatingEngine, ScheduleRunnerProcessor,
    SideEffect, WorkQueueProcessor,
};
use uuid::Uuid;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn engine() -> EventPropagatingEngine<EventProcessingEngine> {
    let mut engine = EventPropagatingEngine::new(EventProcessingEngine::new());
    engine.register(Box::new(WorkQueueProcessor::new()));
    engine.register(Box::new(ScheduleRunnerProcessor::new()));
    engine
}

fn activated_id(effect: &SideEffect) -> Uuid {
    match effect {
        SideEffect::ActionActivated(a) => a.action_id,
        other => panic!("expected activation, got {other}"),
    }
}

#[test]
fn full_queue_lifecycle() {
    let mut engine = engine();
    let move_time = at(10);

    // Declare one work instruction with an estimated move time.
    let declared = engine.process_event(&Event::WorkInstruction(WorkInstructionEvent {
        work_instruction_id: "WI-001".to_string(),
        work_queue_id: "WQ-001".to_string(),
        fetch_che: "RTG-01".to_string(),
        status: WorkInstructionStatus::Pending,
        estimated_move_time: Some(move_time),
    }));
    assert!(declared.is_empty());

    // Activate the queue: one created schedule with the full four-takt span
    // for a single instruction. Propagation re-injects it, initializing the
    // runner as part of the same call.
    let activated = engine.process_event(&Event::WorkQueue(WorkQueueMessage::new(
        "WQ-001",
        WorkQueueStatus::Active,
    )));
    assert_eq!(activated.len(), 1);
    let schedule = match &activated[0] {
        SideEffect::ScheduleCreated(created) => created,
        other => panic!("expected created schedule, got {other}"),
    };
    assert_eq!(schedule.takts.len(), 4);
    assert_eq!(schedule.estimated_move_time, Some(move_time));

    // A tick before the move time does nothing.
    assert!(engine
        .process_event(&Event::Time(TimeEvent::new(at(9))))
        .is_empty());

    // The tick at the move time activates the dependency-free chain head.
    let started = engine.process_event(&Event::Time(TimeEvent::new(move_time)));
    assert_eq!(started.len(), 1);
    let first = activated_id(&started[0]);

    // Completing it yields the completion followed by the next activation.
    let cascaded = engine.process_event(&Event::ActionCompleted(ActionCompletedEvent {
        action_id: first,
        work_queue_id: "WQ-001".to_string(),
    }));
    assert_eq!(cascaded.len(), 2);
    assert!(matches!(cascaded[0], SideEffect::ActionCompleted(_)));
    let second = activated_id(&cascaded[1]);
    assert_ne!(second, first);

    // Deactivation aborts the schedule; the runner drops its tracking, so a
    // further completion notice for this queue is ignored.
    let aborted = engine.process_event(&Event::WorkQueue(WorkQueueMessage::new(
        "WQ-001",
        WorkQueueStatus::Inactive,
    )));
    assert_eq!(aborted.len(), 1);
    assert!(matches!(aborted[0], SideEffect::ScheduleAborted(_)));

    let ignored = engine.process_event(&Event::ActionCompleted(ActionCompletedEvent {
        action_id: second,
        work_queue_id: "WQ-001".to_string(),
    }));
    assert!(ignored.is_empty());
}

#[test]
fn relocated_instruction_schedules_only_under_its_new_queue() {
    let mut engine = engine();

    for queue in ["WQ-A", "WQ-B"] {
        engine.process_event(&Event::WorkInstruction(WorkInstructionEvent {
            work_instruction_id: "WI-001".to_string(),
            work_queue_id: queue.to_string(),
            fetch_che: "RTG-01".to_string(),
            status: WorkInstructionStatus::Pending,
            estimated_move_time: None,
        }));
    }

    let a = engine.process_event(&Event::WorkQueue(WorkQueueMessage::new(
        "WQ-A",
        WorkQueueStatus::Active,
    )));
    match &a[0] {
        SideEffect::ScheduleCreated(created) => assert!(created.takts.is_empty()),
        other => panic!("expected created schedule, got {other}"),
    }

    let b = engine.process_event(&Event::WorkQueue(WorkQueueMessage::new(
        "WQ-B",
        WorkQueueStatus::Active,
    )));
    match &b[0] {
        SideEffect::ScheduleCreated(created) => assert_eq!(created.takts.len(), 4),
        other => panic!("expected created schedule, got {other}"),
    }
}
