//! End-of-operation summary.

use std::fmt;

use zflat_scene::{LengthUnit, SceneError};

use crate::geometry::GeometryStats;
use crate::guides::GuideStats;

/// Something the operation skipped without failing.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// An instance could not be made unique; its subtree was skipped.
    UnshareFailed {
        /// Definition the instance placed.
        definition: String,
        /// Host failure.
        reason: SceneError,
    },
    /// Nesting deeper than the configured limit; the subtree was skipped.
    DepthLimit {
        /// Definition at which descent stopped.
        definition: String,
        /// The configured limit.
        max_depth: usize,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnshareFailed { definition, reason } => {
                write!(f, "skipped '{definition}': could not make it unique ({reason})")
            }
            Warning::DepthLimit {
                definition,
                max_depth,
            } => write!(
                f,
                "skipped '{definition}': nested deeper than {max_depth} levels"
            ),
        }
    }
}

/// What a flatten operation did.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenReport {
    /// Target height, in model units.
    pub target_z: f64,
    /// Model units, for display.
    pub units: LengthUnit,
    /// Distinct vertices examined.
    pub vertices: usize,
    /// Vertices that changed height.
    pub vertices_moved: usize,
    /// Definitions whose immediate geometry was rewritten.
    pub definitions_flattened: usize,
    /// Instances given their own copy of a shared definition.
    pub definitions_unshared: usize,
    /// Arc and circle curves exploded.
    pub curves_exploded: usize,
    /// Construction lines and points moved.
    pub guides_moved: usize,
    /// Vertical construction lines left in place.
    pub guides_skipped_vertical: usize,
    /// Subtrees skipped.
    pub warnings: Vec<Warning>,
}

impl FlattenReport {
    /// Empty report for an operation targeting `target_z`.
    pub fn new(target_z: f64, units: LengthUnit) -> Self {
        Self {
            target_z,
            units,
            vertices: 0,
            vertices_moved: 0,
            definitions_flattened: 0,
            definitions_unshared: 0,
            curves_exploded: 0,
            guides_moved: 0,
            guides_skipped_vertical: 0,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn add_geometry(&mut self, stats: GeometryStats) {
        self.vertices += stats.vertices;
        self.vertices_moved += stats.moved;
        self.curves_exploded += stats.curves_exploded;
    }

    pub(crate) fn add_guides(&mut self, stats: GuideStats) {
        self.guides_moved += stats.moved;
        self.guides_skipped_vertical += stats.skipped_vertical;
    }

    /// True if nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Multi-line, user-facing summary.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Flattened {} vertices to Z = {}",
            self.vertices_moved,
            self.units.format(self.target_z)
        );
        if self.definitions_unshared > 0 {
            out.push_str(&format!(
                "\n{} shared definition(s) made unique",
                self.definitions_unshared
            ));
        }
        if self.curves_exploded > 0 {
            out.push_str(&format!(
                "\n{} arc(s) converted to edges",
                self.curves_exploded
            ));
        }
        if self.guides_moved > 0 {
            out.push_str(&format!("\n{} guide(s) moved", self.guides_moved));
        }
        if self.guides_skipped_vertical > 0 {
            out.push_str(&format!(
                "\n{} vertical guide line(s) left in place",
                self.guides_skipped_vertical
            ));
        }
        for warning in &self.warnings {
            out.push_str(&format!("\nwarning: {warning}"));
        }
        out
    }
}
