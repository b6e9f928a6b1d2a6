//! The host seam: the primitives a scene-editing operation may call.
//!
//! Algorithms are written against [`SceneHost`] rather than [`Scene`] so
//! that they can run inside any modeller that exposes these primitives.

use zflat_math::{Point3, Transform, Vec3};

use crate::entity::{
    CurveId, CurveKind, DefinitionId, EdgeId, Entity, FaceId, GuideId, GuideKind, InstanceId,
    VertexId,
};
use crate::error::{Result, SceneError};
use crate::scene::Scene;
use crate::units::LengthUnit;

/// The immediate contents of a definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contents {
    /// Edges.
    pub edges: Vec<EdgeId>,
    /// Faces.
    pub faces: Vec<FaceId>,
    /// Construction lines and points.
    pub guides: Vec<GuideId>,
    /// Nested instances.
    pub instances: Vec<InstanceId>,
}

/// Scene storage and mutation primitives provided by a host modeller.
pub trait SceneHost {
    /// Model units, for user-facing messages.
    fn units(&self) -> LengthUnit;

    /// The root container.
    fn root(&self) -> DefinitionId;

    /// Display name of a definition.
    fn definition_name(&self, def: DefinitionId) -> Result<String>;

    /// Immediate contents of a definition.
    fn contents(&self, def: DefinitionId) -> Result<Contents>;

    /// Definition directly containing `entity`.
    fn owner_of(&self, entity: Entity) -> Result<DefinitionId>;

    /// Endpoints of an edge.
    fn edge_vertices(&self, edge: EdgeId) -> Result<[VertexId; 2]>;

    /// Boundary vertices of a face.
    fn face_vertices(&self, face: FaceId) -> Result<Vec<VertexId>>;

    /// Vertex position in its owner's frame.
    fn vertex_position(&self, vertex: VertexId) -> Result<Point3>;

    /// Curve aggregation an edge belongs to.
    fn edge_curve(&self, edge: EdgeId) -> Result<Option<CurveId>>;

    /// Shape kind of a curve.
    fn curve_kind(&self, curve: CurveId) -> Result<CurveKind>;

    /// Geometry of a construction line or point, in its owner's frame.
    fn guide(&self, guide: GuideId) -> Result<GuideKind>;

    /// Definition placed by an instance.
    fn instance_definition(&self, instance: InstanceId) -> Result<DefinitionId>;

    /// Local-to-parent transform of an instance.
    fn instance_transform(&self, instance: InstanceId) -> Result<Transform>;

    /// Move many vertices of one container in a single mutation.
    fn transform_by_vectors(
        &mut self,
        container: DefinitionId,
        moves: &[(VertexId, Vec3)],
    ) -> Result<()>;

    /// Apply a transform to one construction line or point.
    fn transform_guide(&mut self, guide: GuideId, transform: &Transform) -> Result<()>;

    /// Dissolve a curve aggregation into independent edges.
    fn explode_curve(&mut self, curve: CurveId) -> Result<()>;

    /// Make `instance` the only user of its definition; returns that definition.
    fn make_unique(&mut self, instance: InstanceId) -> Result<DefinitionId>;

    /// Open a named undoable operation.
    fn start_operation(&mut self, name: &str) -> Result<()>;

    /// Commit the open operation.
    fn commit_operation(&mut self) -> Result<()>;

    /// Roll back the open operation.
    fn abort_operation(&mut self) -> Result<()>;
}

impl SceneHost for Scene {
    fn units(&self) -> LengthUnit {
        Scene::units(self)
    }

    fn root(&self) -> DefinitionId {
        Scene::root(self)
    }

    fn definition_name(&self, def: DefinitionId) -> Result<String> {
        self.definition(def)
            .map(|d| d.name.clone())
            .ok_or(SceneError::NotFound { kind: "definition" })
    }

    fn contents(&self, def: DefinitionId) -> Result<Contents> {
        let d = self
            .definition(def)
            .ok_or(SceneError::NotFound { kind: "definition" })?;
        Ok(Contents {
            edges: d.edges.clone(),
            faces: d.faces.clone(),
            guides: d.guides.clone(),
            instances: d.instances.clone(),
        })
    }

    fn owner_of(&self, entity: Entity) -> Result<DefinitionId> {
        Scene::owner_of(self, entity)
    }

    fn edge_vertices(&self, edge: EdgeId) -> Result<[VertexId; 2]> {
        Scene::edge_vertices(self, edge)
    }

    fn face_vertices(&self, face: FaceId) -> Result<Vec<VertexId>> {
        self.face(face)
            .map(|f| f.vertices.clone())
            .ok_or(SceneError::NotFound { kind: "face" })
    }

    fn vertex_position(&self, vertex: VertexId) -> Result<Point3> {
        self.vertex_point(vertex)
    }

    fn edge_curve(&self, edge: EdgeId) -> Result<Option<CurveId>> {
        self.edge(edge)
            .map(|e| e.curve)
            .ok_or(SceneError::NotFound { kind: "edge" })
    }

    fn curve_kind(&self, curve: CurveId) -> Result<CurveKind> {
        self.curve(curve)
            .map(|c| c.kind)
            .ok_or(SceneError::NotFound { kind: "curve" })
    }

    fn guide(&self, guide: GuideId) -> Result<GuideKind> {
        Scene::guide(self, guide)
            .map(|g| g.kind)
            .ok_or(SceneError::NotFound { kind: "guide" })
    }

    fn instance_definition(&self, instance: InstanceId) -> Result<DefinitionId> {
        self.instance(instance)
            .map(|i| i.definition)
            .ok_or(SceneError::NotFound { kind: "instance" })
    }

    fn instance_transform(&self, instance: InstanceId) -> Result<Transform> {
        self.instance(instance)
            .map(|i| i.transform)
            .ok_or(SceneError::NotFound { kind: "instance" })
    }

    fn transform_by_vectors(
        &mut self,
        container: DefinitionId,
        moves: &[(VertexId, Vec3)],
    ) -> Result<()> {
        Scene::transform_by_vectors(self, container, moves)
    }

    fn transform_guide(&mut self, guide: GuideId, transform: &Transform) -> Result<()> {
        Scene::transform_guide(self, guide, transform)
    }

    fn explode_curve(&mut self, curve: CurveId) -> Result<()> {
        Scene::explode_curve(self, curve)
    }

    fn make_unique(&mut self, instance: InstanceId) -> Result<DefinitionId> {
        Scene::make_unique(self, instance)
    }

    fn start_operation(&mut self, name: &str) -> Result<()> {
        Scene::start_operation(self, name)
    }

    fn commit_operation(&mut self) -> Result<()> {
        Scene::commit_operation(self)
    }

    fn abort_operation(&mut self) -> Result<()> {
        Scene::abort_operation(self)
    }
}
