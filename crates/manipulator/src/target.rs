//! Target collaborator: objects whose world transform the manipulator edits.

use std::collections::HashMap;

use manip_math::{Mat4, Transform};

/// Stable identity of a manipulated object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read/write access to world transforms.
pub trait TargetStore {
    /// Current world matrix, or `None` when the pose cannot be resolved
    fn world_matrix(&self, id: TargetId) -> Option<Mat4>;

    /// Write a world matrix. Returns `false` if the target no longer exists.
    fn set_world_matrix(&mut self, id: TargetId, matrix: Mat4) -> bool;
}

/// Simple in-memory target store preserving insertion order.
#[derive(Clone, Debug, Default)]
pub struct SceneTargets {
    matrices: HashMap<TargetId, Mat4>,
    order: Vec<TargetId>,
}

impl SceneTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a target's matrix.
    pub fn insert(&mut self, id: TargetId, matrix: Mat4) {
        if self.matrices.insert(id, matrix).is_none() {
            self.order.push(id);
        }
    }

    pub fn insert_transform(&mut self, id: TargetId, transform: Transform) {
        self.insert(id, transform.to_matrix());
    }

    pub fn remove(&mut self, id: TargetId) -> Option<Mat4> {
        let removed = self.matrices.remove(&id);
        if removed.is_some() {
            self.order.retain(|t| *t != id);
        }
        removed
    }

    pub fn get(&self, id: TargetId) -> Option<&Mat4> {
        self.matrices.get(&id)
    }

    pub fn transform(&self, id: TargetId) -> Option<Transform> {
        self.get(id).map(Transform::from_matrix)
    }

    pub fn contains(&self, id: TargetId) -> bool {
        self.matrices.contains_key(&id)
    }

    /// Ids in insertion order
    pub fn ids(&self) -> &[TargetId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl TargetStore for SceneTargets {
    fn world_matrix(&self, id: TargetId) -> Option<Mat4> {
        self.matrices.get(&id).copied()
    }

    fn set_world_matrix(&mut self, id: TargetId, matrix: Mat4) -> bool {
        match self.matrices.get_mut(&id) {
            Some(slot) => {
                *slot = matrix;
                true
            }
            None => false,
        }
    }
}
