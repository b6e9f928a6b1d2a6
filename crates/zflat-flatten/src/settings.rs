//! Flatten parameters.

use serde::{Deserialize, Serialize};

use crate::error::{FlattenError, Result};

/// Parameters for one flatten operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenSettings {
    /// World Z height every point is moved to, in model units.
    pub target_z: f64,
    /// Also flatten construction lines and points.
    pub flatten_guides: bool,
    /// Skip an instance whose definition cannot be made unique instead of
    /// failing the whole operation.
    pub skip_failed_instances: bool,
    /// Deepest instance nesting the traversal will enter.
    pub max_depth: usize,
    /// Name of the undo entry.
    pub operation_name: String,
}

impl Default for FlattenSettings {
    fn default() -> Self {
        Self {
            target_z: 0.0,
            flatten_guides: true,
            skip_failed_instances: true,
            max_depth: 256,
            operation_name: "Flatten to Z".to_string(),
        }
    }
}

impl FlattenSettings {
    /// Settings targeting `target_z` with every other field at its default.
    pub fn at(target_z: f64) -> Self {
        Self {
            target_z,
            ..Self::default()
        }
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.target_z.is_finite() {
            return Err(FlattenError::InvalidTarget(format!(
                "target_z must be finite, got {}",
                self.target_z
            )));
        }
        if self.max_depth == 0 {
            return Err(FlattenError::InvalidTarget(
                "max_depth must be at least 1".into(),
            ));
        }
        if self.operation_name.trim().is_empty() {
            return Err(FlattenError::InvalidTarget(
                "operation_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}
