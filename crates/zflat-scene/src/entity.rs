//! Entity ids and records stored in the scene arenas.

use zflat_math::{Point3, Transform, Vec3};

slotmap::new_key_type! {
    /// Identifier of a definition (a shared geometry container).
    pub struct DefinitionId;
    /// Identifier of an instance placing a definition into a container.
    pub struct InstanceId;
    /// Identifier of a vertex.
    pub struct VertexId;
    /// Identifier of an edge.
    pub struct EdgeId;
    /// Identifier of a face.
    pub struct FaceId;
    /// Identifier of a curve aggregation.
    pub struct CurveId;
    /// Identifier of a construction line or point.
    pub struct GuideId;
}

/// A selectable entity, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// A straight edge.
    Edge(EdgeId),
    /// A planar face.
    Face(FaceId),
    /// A group or component instance.
    Instance(InstanceId),
    /// An infinite construction line.
    ConstructionLine(GuideId),
    /// A construction point.
    ConstructionPoint(GuideId),
    /// A curve aggregation (arc, circle or polyline).
    Curve(CurveId),
}

/// A vertex owned by exactly one definition.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Position in the owning definition's frame.
    pub point: Point3,
    /// Owning definition.
    pub owner: DefinitionId,
}

/// A straight edge between two vertices of the same definition.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Start vertex.
    pub start: VertexId,
    /// End vertex.
    pub end: VertexId,
    /// Curve this edge is a segment of, if any.
    pub curve: Option<CurveId>,
    /// Owning definition.
    pub owner: DefinitionId,
}

/// A face bounded by an ordered loop of vertices.
#[derive(Debug, Clone)]
pub struct Face {
    /// Outer loop, in order.
    pub vertices: Vec<VertexId>,
    /// Owning definition.
    pub owner: DefinitionId,
}

/// The shape a curve aggregation renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    /// Open circular arc.
    Arc,
    /// Closed full circle.
    Circle,
    /// Free-form polyline curve.
    Polyline,
}

impl CurveKind {
    /// True for curves whose rendering depends on a circular locus.
    pub fn is_circular(self) -> bool {
        matches!(self, CurveKind::Arc | CurveKind::Circle)
    }
}

/// An ordered aggregation of edges drawn as one curve.
#[derive(Debug, Clone)]
pub struct Curve {
    /// Shape kind.
    pub kind: CurveKind,
    /// Segment edges, in order.
    pub edges: Vec<EdgeId>,
    /// Owning definition.
    pub owner: DefinitionId,
}

/// Geometry of a drafting guide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuideKind {
    /// Infinite line through `anchor` along `direction`.
    Line {
        /// A point on the line.
        anchor: Point3,
        /// Line direction (non-zero, not necessarily unit length).
        direction: Vec3,
    },
    /// A single marker point.
    Point {
        /// Marker position.
        position: Point3,
    },
}

impl GuideKind {
    /// Apply an affine transform: points move, directions rotate and scale.
    pub fn transformed(&self, t: &Transform) -> Self {
        match *self {
            GuideKind::Line { anchor, direction } => GuideKind::Line {
                anchor: t.apply_point(&anchor),
                direction: t.apply_vec(&direction),
            },
            GuideKind::Point { position } => GuideKind::Point {
                position: t.apply_point(&position),
            },
        }
    }
}

/// A construction line or point owned by a definition.
#[derive(Debug, Clone)]
pub struct Guide {
    /// Guide geometry in the owner's frame.
    pub kind: GuideKind,
    /// Owning definition.
    pub owner: DefinitionId,
}

/// Whether an instance is a group or a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceKind {
    /// Group instance; normally the only user of its definition.
    #[default]
    Group,
    /// Component instance; may share its definition with siblings.
    Component,
}

/// A placement of a definition inside a parent container.
#[derive(Debug, Clone)]
pub struct Instance {
    /// Placed definition.
    pub definition: DefinitionId,
    /// Local-to-parent transform.
    pub transform: Transform,
    /// Group or component.
    pub kind: InstanceKind,
    /// Container this instance lives in.
    pub owner: DefinitionId,
}

/// A named geometry container.
///
/// The scene root is a definition too; it is never instanced.
#[derive(Debug, Clone, Default)]
pub struct Definition {
    /// Display name.
    pub name: String,
    /// Vertices owned by this definition.
    pub vertices: Vec<VertexId>,
    /// Immediate edges.
    pub edges: Vec<EdgeId>,
    /// Immediate faces.
    pub faces: Vec<FaceId>,
    /// Curve aggregations over `edges`.
    pub curves: Vec<CurveId>,
    /// Construction lines and points.
    pub guides: Vec<GuideId>,
    /// Nested instances.
    pub instances: Vec<InstanceId>,
}
