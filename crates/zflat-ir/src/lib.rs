#![warn(missing_docs)]

//! Scene document format for zflat.
//!
//! A document is a flat list of named definitions. Geometry inside a
//! definition refers to its own vertices and edges by index; instances
//! refer to other definitions by name. The selection names the entities a
//! flatten run should act on.
//!
//! The format is purely declarative. Building a live scene from it is the
//! job of the consumer.

use serde::{Deserialize, Serialize};

/// Format version written by this crate.
pub const FORMAT_VERSION: &str = "0.1";

/// Column-major 4x4 identity.
pub const IDENTITY: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

fn identity() -> [f64; 16] {
    IDENTITY
}

/// Shape of a curve aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    /// Open circular arc.
    Arc,
    /// Closed circle.
    Circle,
    /// Any other multi-segment curve.
    Polyline,
}

/// Edges of one definition grouped into a curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Curve shape.
    pub kind: CurveKind,
    /// Indices into the definition's `edges`.
    pub edges: Vec<usize>,
}

/// Construction geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Guide {
    /// Infinite construction line.
    Line {
        /// A point on the line.
        anchor: [f64; 3],
        /// Line direction, non-zero.
        direction: [f64; 3],
    },
    /// Construction point.
    Point {
        /// Position.
        position: [f64; 3],
    },
}

/// How an instance shares its definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceKind {
    /// Group.
    #[default]
    Group,
    /// Component.
    Component,
}

/// A placement of another definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Name of the placed definition.
    pub definition: String,
    /// Column-major local-to-parent transform.
    #[serde(default = "identity")]
    pub transform: [f64; 16],
    /// Group or component.
    #[serde(default)]
    pub kind: InstanceKind,
}

/// A named container of geometry and nested instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    /// Unique name within the document.
    pub name: String,
    /// Vertex positions.
    #[serde(default)]
    pub vertices: Vec<[f64; 3]>,
    /// Edges as pairs of vertex indices.
    #[serde(default)]
    pub edges: Vec<[usize; 2]>,
    /// Faces as loops of vertex indices.
    #[serde(default)]
    pub faces: Vec<Vec<usize>>,
    /// Curve aggregations over edges.
    #[serde(default)]
    pub curves: Vec<Curve>,
    /// Construction lines and points.
    #[serde(default)]
    pub guides: Vec<Guide>,
    /// Nested instances.
    #[serde(default)]
    pub instances: Vec<Instance>,
}

impl Definition {
    /// Empty definition called `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Which list of a definition an [`EntityRef`] indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// `edges`.
    Edge,
    /// `faces`.
    Face,
    /// `curves`.
    Curve,
    /// `guides`.
    Guide,
    /// `instances`.
    Instance,
}

/// Reference to one entity: container name, list and index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Name of the containing definition.
    pub definition: String,
    /// List the index points into.
    pub kind: EntityKind,
    /// Position in that list.
    pub index: usize,
}

/// A zflat document, the `.zflat.json` file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format version string (e.g. "0.1").
    pub version: String,
    /// Model length unit suffix (e.g. "mm", "in").
    pub units: String,
    /// Name of the model's root definition.
    pub root: String,
    /// All definitions, root included.
    pub definitions: Vec<Definition>,
    /// Entities a flatten run acts on.
    #[serde(default)]
    pub selection: Vec<EntityRef>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            units: "mm".to_string(),
            root: "Model".to_string(),
            definitions: vec![Definition::named("Model")],
            selection: Vec::new(),
        }
    }
}

impl Document {
    /// Create a document with an empty root definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a definition by name.
    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    /// Mutable lookup by name.
    pub fn definition_mut(&mut self, name: &str) -> Option<&mut Definition> {
        self.definitions.iter_mut().find(|d| d.name == name)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
