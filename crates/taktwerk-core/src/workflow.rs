//! The standard multi-device workflow for moving a container from yard to
//! vessel, and the generator that expands a queue's work instructions into a
//! dependency-linked takt/action graph.

use crate::takt::{Action, DeviceType, Takt};
use crate::work_queue::WorkInstruction;
use std::collections::BTreeSet;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// DeviceActionTemplate
// ---------------------------------------------------------------------------

/// One row of the workflow table: a device action with its takt offset
/// relative to a work instruction's base takt (0 = base takt, negative =
/// earlier takts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceActionTemplate {
    pub device: DeviceType,
    pub description: &'static str,
    pub takt_offset: i32,
    /// True for the last action a device performs within its target takt.
    /// Marks the takt boundaries of the workflow; the table tests keep this
    /// consistent with `takt_offset`.
    pub closes_device_takt: bool,
}

/// The ordered workflow table. Each work instruction expands into this exact
/// sequence of actions, chained so every action depends on the one before
/// it: the RTG lifts the container in the earliest takt, a terminal truck
/// carries it quayward over the two middle takts, and the QC places it on
/// the vessel in the base takt.
pub const ACTION_TEMPLATES: &[DeviceActionTemplate] = &[
    DeviceActionTemplate {
        device: DeviceType::Rtg,
        description: "lift container from yard",
        takt_offset: -3,
        closes_device_takt: false,
    },
    DeviceActionTemplate {
        device: DeviceType::Rtg,
        description: "place container on truck",
        takt_offset: -3,
        closes_device_takt: true,
    },
    DeviceActionTemplate {
        device: DeviceType::Tt,
        description: "drive under RTG",
        takt_offset: -2,
        closes_device_takt: false,
    },
    DeviceActionTemplate {
        device: DeviceType::Tt,
        description: "handover from RTG",
        takt_offset: -2,
        closes_device_takt: true,
    },
    DeviceActionTemplate {
        device: DeviceType::Tt,
        description: "drive under QC",
        takt_offset: -1,
        closes_device_takt: false,
    },
    DeviceActionTemplate {
        device: DeviceType::Tt,
        description: "handover to QC",
        takt_offset: -1,
        closes_device_takt: true,
    },
    DeviceActionTemplate {
        device: DeviceType::Qc,
        description: "container lifted from truck",
        takt_offset: 0,
        closes_device_takt: false,
    },
    DeviceActionTemplate {
        device: DeviceType::Qc,
        description: "container placed on vessel",
        takt_offset: 0,
        closes_device_takt: true,
    },
];

/// The most negative takt offset in the table. Determines how many takts
/// before an instruction's base takt its chain begins.
pub fn min_takt_offset() -> i32 {
    ACTION_TEMPLATES
        .iter()
        .map(|t| t.takt_offset)
        .min()
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Takt generation
// ---------------------------------------------------------------------------

/// Expands a queue's work instructions into an ordered list of takts.
///
/// Instruction `i` gets base takt index `i + adjustment` where `adjustment`
/// shifts the earliest template offset to index 0. Each instruction's
/// actions form a strict chain (every action depends on the previous one in
/// the table order), so successive instructions overlap in shared takts:
/// while the QC works on instruction 0 in its base takt, the truck for
/// instruction 1 and the RTG for instruction 2 are already busy in the same
/// takt.
pub fn build_takts(instructions: &[WorkInstruction]) -> Vec<Takt> {
    if instructions.is_empty() {
        return Vec::new();
    }

    let adjustment = -min_takt_offset();
    let max_base_index = (instructions.len() - 1) as i32 + adjustment;
    let total_takts = (max_base_index + 1) as usize;

    let mut buckets: Vec<Vec<Action>> = vec![Vec::new(); total_takts];

    for (index, _instruction) in instructions.iter().enumerate() {
        let base_index = index as i32 + adjustment;
        let mut previous: Option<Uuid> = None;

        for template in ACTION_TEMPLATES {
            let target_index = (base_index + template.takt_offset) as usize;

            let mut action = Action::new(template.device, template.description);
            if let Some(previous_id) = previous {
                action = action.with_depends_on(BTreeSet::from([previous_id]));
            }
            previous = Some(action.id);
            buckets[target_index].push(action);
        }
    }

    buckets
        .into_iter()
        .enumerate()
        .map(|(index, actions)| Takt::new(Takt::name_for(index), actions))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
