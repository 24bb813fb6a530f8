use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// DeviceType
// ---------------------------------------------------------------------------

/// Types of container handling equipment (CHE) in the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    /// Quay crane: loads and unloads containers at the vessel.
    Qc,
    /// Terminal truck: transports containers between yard and quay.
    Tt,
    /// Rubber-tyred gantry: stacks containers in the yard.
    Rtg,
}

impl DeviceType {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Qc => "QC",
            DeviceType::Tt => "TT",
            DeviceType::Rtg => "RTG",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActionState
// ---------------------------------------------------------------------------

/// Execution state of an action within a running schedule. Transitions are
/// strictly `Pending -> Active -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    /// Waiting for the schedule to start or for dependencies to complete.
    Pending,
    Active,
    Completed,
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// The smallest schedulable unit: one device operation within a takt.
///
/// Actions are immutable values; their runtime state lives in the schedule
/// runner, not here. `depends_on` holds the ids of prerequisite actions in
/// the same generated graph; an empty set means immediately eligible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: Uuid,
    pub device: DeviceType,
    pub description: String,
    pub depends_on: BTreeSet<Uuid>,
}

impl Action {
    /// Creates an action with a fresh identity and no dependencies.
    pub fn new(device: DeviceType, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            device,
            description: description.into(),
            depends_on: BTreeSet::new(),
        }
    }

    pub fn with_depends_on(mut self, depends_on: BTreeSet<Uuid>) -> Self {
        self.depends_on = depends_on;
        self
    }

    pub fn has_no_dependencies(&self) -> bool {
        self.depends_on.is_empty()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.device, self.description)
    }
}

// ---------------------------------------------------------------------------
// Takt
// ---------------------------------------------------------------------------

const STARTING_TAKT_NUMBER: u32 = 100;

/// A named time slot grouping the actions meant to execute together.
///
/// Takts are named sequentially with no gaps: `TAKT100`, `TAKT101`, ... A
/// takt is a grouping view over actions, not an owner; the schedule runner
/// keeps its own per-action runtime state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Takt {
    pub name: String,
    pub actions: Vec<Action>,
}

impl Takt {
    pub fn new(name: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            name: name.into(),
            actions,
        }
    }

    /// Name for the takt at a zero-based index: 0 -> "TAKT100", 1 -> "TAKT101".
    pub fn name_for(index: usize) -> String {
        format!("TAKT{}", STARTING_TAKT_NUMBER + index as u32)
    }
}

impl fmt::Display for Takt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} actions)", self.name, self.actions.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
