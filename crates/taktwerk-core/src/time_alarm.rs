use crate::error::{CoreError, Result};
use crate::event::{Event, SetTimeAlarm, TimeEvent};
use crate::processor::{EventProcessor, ProcessorState};
use crate::side_effect::{AlarmSet, AlarmTriggered, SideEffect};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// TimeAlarmProcessor
// ---------------------------------------------------------------------------

/// Pending alarms by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeAlarmState {
    pending: BTreeMap<String, DateTime<Utc>>,
}

/// Fires named alarms once their trigger time has passed.
///
/// Setting an alarm stores it and emits [`AlarmSet`]; a tick at or past the
/// trigger time removes the alarm and emits [`AlarmTriggered`]. Setting an
/// alarm under an existing name replaces its trigger time.
#[derive(Debug, Default)]
pub struct TimeAlarmProcessor {
    state: TimeAlarmState,
}

impl TimeAlarmProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle_set(&mut self, set: &SetTimeAlarm) -> Vec<SideEffect> {
        self.state
            .pending
            .insert(set.alarm_name.clone(), set.trigger_time);
        vec![SideEffect::AlarmSet(AlarmSet {
            alarm_name: set.alarm_name.clone(),
            trigger_time: set.trigger_time,
        })]
    }

    fn handle_tick(&mut self, tick: &TimeEvent) -> Vec<SideEffect> {
        let mut triggered = Vec::new();
        self.state.pending.retain(|name, trigger_time| {
            if *trigger_time > tick.timestamp {
                return true;
            }
            triggered.push(SideEffect::AlarmTriggered(AlarmTriggered {
                alarm_name: name.clone(),
                triggered_at: tick.timestamp,
            }));
            false
        });
        triggered
    }
}

impl EventProcessor for TimeAlarmProcessor {
    fn process(&mut self, event: &Event) -> Vec<SideEffect> {
        match event {
            Event::SetTimeAlarm(set) => self.handle_set(set),
            Event::Time(tick) => self.handle_tick(tick),
            Event::WorkQueue(_)
            | Event::WorkInstruction(_)
            | Event::ActionCompleted(_)
            | Event::ScheduleCreated(_) => Vec::new(),
        }
    }

    fn name(&self) -> &'static str {
        "TimeAlarmProcessor"
    }

    fn capture_state(&self) -> ProcessorState {
        ProcessorState::TimeAlarm(self.state.clone())
    }

    fn restore_state(&mut self, state: ProcessorState) -> Result<()> {
        match state {
            ProcessorState::TimeAlarm(state) => {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn set(name: &str, secs: i64) -> Event {
        Event::SetTimeAlarm(SetTimeAlarm {
            alarm_name: name.to_string(),
            trigger_time: at(secs),
        })
    }

    #[test]
    fn setting_an_alarm_acknowledges_it() {
        let mut processor = TimeAlarmProcessor::new();
        let effects = processor.process(&set("alarm a", 15));
        assert!(matches!(effects[0], SideEffect::AlarmSet(_)));
    }

    #[test]
    fn alarm_fires_once_when_time_passes() {
        let mut processor = TimeAlarmProcessor::new();
        processor.process(&set("alarm a", 15));

        assert!(processor.process(&Event::Time(TimeEvent::new(at(10)))).is_empty());

        let fired = processor.process(&Event::Time(TimeEvent::new(at(20))));
        match &fired[0] {
            SideEffect::AlarmTriggered(t) => {
                assert_eq!(t.alarm_name, "alarm a");
                assert_eq!(t.triggered_at, at(20));
            }
            other => panic!("expected triggered alarm, got {other}"),
        }

        // Fired alarms are gone.
        assert!(processor.process(&Event::Time(TimeEvent::new(at(30)))).is_empty());
    }

    #[test]
    fn multiple_due_alarms_fire_on_one_tick() {
        let mut processor = TimeAlarmProcessor::new();
        processor.process(&set("a", 5));
        processor.process(&set("b", 7));
        processor.process(&set("c", 50));

        let fired = processor.process(&Event::Time(TimeEvent::new(at(10))));
        assert_eq!(fired.len(), 2);
    }

    #[test]
    fn restore_rejects_foreign_snapshot() {
        let mut processor = TimeAlarmProcessor::new();
        let foreign = ProcessorState::WorkQueue(Default::default());
        let err = processor.restore_state(foreign).unwrap_err();
        assert!(matches!(err, CoreError::SnapshotMismatch { .. }));
    }
}
