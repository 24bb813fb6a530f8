use crate::error::Result;
use crate::event::Event;
use crate::processor::{EventProcessor, ProcessorState};
use crate::side_effect::SideEffect;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Contract for event-processing engines.
///
/// Implemented by the dispatch engine itself and by wrappers such as
/// [`crate::EventPropagatingEngine`], so callers can layer behavior without
/// caring which concrete engine they hold.
pub trait Engine {
    /// Registers a processor. Dispatch order and side-effect ordering follow
    /// registration order.
    fn register(&mut self, processor: Box<dyn EventProcessor>);

    /// Processes an event through all registered processors and returns the
    /// concatenated side effects, empty if none.
    fn process_event(&mut self, event: &Event) -> Vec<SideEffect>;

    /// Reverts all processors to their state before the last processed
    /// event. Returns `Ok(false)` when there is no history to revert to.
    fn step_back(&mut self) -> Result<bool>;

    /// Number of step-back operations currently available.
    fn history_size(&self) -> usize;

    /// Drops all recorded history without touching current processor state.
    fn clear_history(&mut self);
}

// ---------------------------------------------------------------------------
// EventProcessingEngine
// ---------------------------------------------------------------------------

/// The dispatch engine: routes every event to all registered processors in
/// registration order and aggregates their side effects.
///
/// Before each dispatch the engine captures a snapshot of every processor's
/// state and pushes it onto a history stack, enabling [`Engine::step_back`]
/// to transactionally undo processed events. History lives in memory only.
#[derive(Default)]
pub struct EventProcessingEngine {
    processors: Vec<Box<dyn EventProcessor>>,
    /// One entry per processed event; each entry holds the pre-dispatch
    /// snapshots aligned with `processors` by index.
    history: Vec<Vec<ProcessorState>>,
}

impl EventProcessingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn capture_all(&self) -> Vec<ProcessorState> {
        self.processors.iter().map(|p| p.capture_state()).collect()
    }
}

impl Engine for EventProcessingEngine {
    fn register(&mut self, processor: Box<dyn EventProcessor>) {
        tracing::info!(processor = processor.name(), "registered processor");
        self.processors.push(processor);
    }

    fn process_event(&mut self, event: &Event) -> Vec<SideEffect> {
        tracing::info!(%event, "processing event");

        let snapshot = self.capture_all();
        self.history.push(snapshot);

        let mut side_effects = Vec::new();
        for processor in &mut self.processors {
            side_effects.extend(processor.process(event));
        }

        if side_effects.is_empty() {
            tracing::info!("no side effects produced");
        } else {
            for side_effect in &side_effects {
                tracing::info!(%side_effect, "side effect");
            }
        }

        side_effects
    }

    fn step_back(&mut self) -> Result<bool> {
        let Some(snapshot) = self.history.pop() else {
            tracing::info!("no history to step back to");
            return Ok(false);
        };

        // Processors registered after this snapshot was taken have no entry
        // and keep their current state.
        for (processor, state) in self.processors.iter_mut().zip(snapshot) {
            processor.restore_state(state)?;
        }

        tracing::info!("stepped back to previous state");
        Ok(true)
    }

    fn history_size(&self) -> usize {
        self.history.len()
    }

    fn clear_history(&mut self) {
        self.history.clear();
        tracing::info!("state history cleared");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
