//! Deterministic, synchronous event-processing core for terminal-operations
//! takt scheduling.
//!
//! Events enter through an [`Engine`], are dispatched to every registered
//! [`EventProcessor`] in registration order, and the produced side effects
//! are aggregated and returned. Side effects that also qualify as events
//! (currently only a created schedule) can be re-injected by wrapping the
//! dispatch engine in an [`EventPropagatingEngine`]. Every dispatch pushes a
//! full snapshot of all processor state onto a history stack, so any number
//! of processed events can be unwound with [`Engine::step_back`].
//!
//! All temporal behavior is driven by timestamps carried inside
//! [`event::TimeEvent`]; nothing in this crate reads a wall clock, waits, or
//! performs I/O.

pub mod engine;
pub mod error;
pub mod event;
pub mod processor;
pub mod propagation;
pub mod schedule_runner;
pub mod side_effect;
pub mod takt;
pub mod time_alarm;
pub mod work_queue;
pub mod workflow;

pub use engine::{Engine, EventProcessingEngine};
pub use error::{CoreError, Result};
pub use event::Event;
pub use processor::{EventProcessor, ProcessorState};
pub use propagation::EventPropagatingEngine;
pub use schedule_runner::ScheduleRunnerProcessor;
pub use side_effect::SideEffect;
pub use time_alarm::TimeAlarmProcessor;
pub use work_queue::WorkQueueProcessor;
