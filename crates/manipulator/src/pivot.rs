//! Pivot resolution for rotate and scale.

use std::collections::HashMap;

use manip_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::target::TargetId;

/// Where rotate/scale operations are centered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PivotMode {
    /// First target's origin
    Origin,
    /// Mean of all target origins
    #[default]
    Median,
    /// Externally placed 3D cursor
    Cursor,
    /// Every target about its own origin
    Individual,
}

/// Shared pivot plus the pivot each target is transformed about.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PivotResult {
    /// Representative pivot, used for frame placement
    pub pivot: Vec3,
    pub per_target: HashMap<TargetId, Vec3>,
}

impl PivotResult {
    /// Pivot for `id`, falling back to the representative pivot
    pub fn for_target(&self, id: TargetId) -> Vec3 {
        self.per_target.get(&id).copied().unwrap_or(self.pivot)
    }
}

/// Resolves pivots from a snapshot of target positions.
#[derive(Clone, Copy, Debug, Default)]
pub struct PivotResolver {
    cursor: Option<Vec3>,
}

impl PivotResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cursor(&mut self, cursor: Option<Vec3>) {
        self.cursor = cursor;
    }

    pub fn cursor(&self) -> Option<Vec3> {
        self.cursor
    }

    /// Resolve pivots for `targets` (id, world position) in the given mode.
    pub fn resolve(&self, targets: &[(TargetId, Vec3)], mode: PivotMode) -> PivotResult {
        let Some(&(_, first)) = targets.first() else {
            return PivotResult::default();
        };

        let shared = |pivot: Vec3| PivotResult {
            pivot,
            per_target: targets.iter().map(|&(id, _)| (id, pivot)).collect(),
        };

        match mode {
            PivotMode::Origin => shared(first),
            PivotMode::Median => shared(median(targets)),
            PivotMode::Cursor => shared(self.cursor.unwrap_or_else(|| median(targets))),
            PivotMode::Individual => PivotResult {
                pivot: first,
                per_target: targets.iter().copied().collect(),
            },
        }
    }
}

fn median(targets: &[(TargetId, Vec3)]) -> Vec3 {
    let sum = targets.iter().fold(Vec3::ZERO, |acc, &(_, p)| acc + p);
    sum / targets.len() as f64
}
