//! Arena-backed scene graph.

use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;
use tracing::debug;
use zflat_math::{Point3, Transform, Vec3};

use crate::entity::{
    Curve, CurveId, CurveKind, Definition, DefinitionId, Edge, EdgeId, Entity, Face, FaceId,
    Guide, GuideId, GuideKind, Instance, InstanceId, InstanceKind, Vertex, VertexId,
};
use crate::error::{Result, SceneError};
use crate::transaction::Journal;
use crate::units::LengthUnit;

/// Everything an operation snapshot has to restore.
#[derive(Debug, Clone)]
pub(crate) struct SceneData {
    units: LengthUnit,
    root: DefinitionId,
    definitions: SlotMap<DefinitionId, Definition>,
    instances: SlotMap<InstanceId, Instance>,
    vertices: SlotMap<VertexId, Vertex>,
    edges: SlotMap<EdgeId, Edge>,
    faces: SlotMap<FaceId, Face>,
    curves: SlotMap<CurveId, Curve>,
    guides: SlotMap<GuideId, Guide>,
}

/// A hierarchical scene: definitions holding geometry and nested instances.
///
/// Every entity is owned by exactly one definition. Definitions are shared
/// by reference: all instances of a definition see the same geometry.
#[derive(Debug, Clone)]
pub struct Scene {
    data: SceneData,
    journal: Journal<SceneData>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(LengthUnit::default())
    }
}

fn not_found(kind: &'static str) -> SceneError {
    SceneError::NotFound { kind }
}

impl Scene {
    /// Create an empty scene with a root container named "Model".
    pub fn new(units: LengthUnit) -> Self {
        let mut definitions = SlotMap::with_key();
        let root = definitions.insert(Definition {
            name: "Model".to_string(),
            ..Default::default()
        });
        Self {
            data: SceneData {
                units,
                root,
                definitions,
                instances: SlotMap::with_key(),
                vertices: SlotMap::with_key(),
                edges: SlotMap::with_key(),
                faces: SlotMap::with_key(),
                curves: SlotMap::with_key(),
                guides: SlotMap::with_key(),
            },
            journal: Journal::new(),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Model units.
    pub fn units(&self) -> LengthUnit {
        self.data.units
    }

    /// The root container.
    pub fn root(&self) -> DefinitionId {
        self.data.root
    }

    /// Look up a definition.
    pub fn definition(&self, id: DefinitionId) -> Option<&Definition> {
        self.data.definitions.get(id)
    }

    /// Look up an instance.
    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.data.instances.get(id)
    }

    /// Look up a vertex.
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.data.vertices.get(id)
    }

    /// Look up an edge.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.data.edges.get(id)
    }

    /// Look up a face.
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.data.faces.get(id)
    }

    /// Look up a curve.
    pub fn curve(&self, id: CurveId) -> Option<&Curve> {
        self.data.curves.get(id)
    }

    /// Look up a guide.
    pub fn guide(&self, id: GuideId) -> Option<&Guide> {
        self.data.guides.get(id)
    }

    /// All definitions, including the root.
    pub fn definitions(&self) -> impl Iterator<Item = (DefinitionId, &Definition)> {
        self.data.definitions.iter()
    }

    /// All instances.
    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.data.instances.iter()
    }

    /// Number of instances placing `def`.
    pub fn reference_count(&self, def: DefinitionId) -> usize {
        self.data
            .instances
            .values()
            .filter(|i| i.definition == def)
            .count()
    }

    /// Definition that directly contains `entity`.
    pub fn owner_of(&self, entity: Entity) -> Result<DefinitionId> {
        let owner = match entity {
            Entity::Edge(id) => self.data.edges.get(id).map(|e| e.owner),
            Entity::Face(id) => self.data.faces.get(id).map(|f| f.owner),
            Entity::Instance(id) => self.data.instances.get(id).map(|i| i.owner),
            Entity::ConstructionLine(id) | Entity::ConstructionPoint(id) => {
                self.data.guides.get(id).map(|g| g.owner)
            }
            Entity::Curve(id) => self.data.curves.get(id).map(|c| c.owner),
        };
        owner.ok_or_else(|| not_found(entity_kind_name(entity)))
    }

    /// The two vertices of an edge.
    pub fn edge_vertices(&self, id: EdgeId) -> Result<[VertexId; 2]> {
        let edge = self.data.edges.get(id).ok_or_else(|| not_found("edge"))?;
        Ok([edge.start, edge.end])
    }

    /// Both endpoint positions of an edge, in the owner's frame.
    pub fn edge_points(&self, id: EdgeId) -> Result<[Point3; 2]> {
        let [a, b] = self.edge_vertices(id)?;
        Ok([self.vertex_point(a)?, self.vertex_point(b)?])
    }

    /// A vertex position in the owner's frame.
    pub fn vertex_point(&self, id: VertexId) -> Result<Point3> {
        self.data
            .vertices
            .get(id)
            .map(|v| v.point)
            .ok_or_else(|| not_found("vertex"))
    }

    /// Every vertex position of a definition, in its own frame.
    pub fn definition_points(&self, def: DefinitionId) -> Result<Vec<Point3>> {
        let d = self.data.definitions.get(def).ok_or_else(|| not_found("definition"))?;
        d.vertices.iter().map(|&v| self.vertex_point(v)).collect()
    }

    fn definition_name(&self, def: DefinitionId) -> String {
        self.data
            .definitions
            .get(def)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| "<deleted>".to_string())
    }

    /// True if `from` contains `target` anywhere below it.
    fn reaches(&self, from: DefinitionId, target: DefinitionId) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(def) = stack.pop() {
            if def == target {
                return true;
            }
            if !seen.insert(def) {
                continue;
            }
            if let Some(d) = self.data.definitions.get(def) {
                stack.extend(
                    d.instances
                        .iter()
                        .filter_map(|i| self.data.instances.get(*i))
                        .map(|i| i.definition),
                );
            }
        }
        false
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Create an empty definition.
    pub fn add_definition(&mut self, name: impl Into<String>) -> DefinitionId {
        self.data.definitions.insert(Definition {
            name: name.into(),
            ..Default::default()
        })
    }

    /// Rename a definition.
    pub fn set_definition_name(
        &mut self,
        def: DefinitionId,
        name: impl Into<String>,
    ) -> Result<()> {
        self.definition_mut(def)?.name = name.into();
        Ok(())
    }

    fn definition_mut(&mut self, def: DefinitionId) -> Result<&mut Definition> {
        self.data
            .definitions
            .get_mut(def)
            .ok_or_else(|| not_found("definition"))
    }

    /// Add a vertex to `def`.
    pub fn add_vertex(&mut self, def: DefinitionId, point: Point3) -> Result<VertexId> {
        if !self.data.definitions.contains_key(def) {
            return Err(not_found("definition"));
        }
        let id = self.data.vertices.insert(Vertex { point, owner: def });
        self.definition_mut(def)?.vertices.push(id);
        Ok(id)
    }

    fn check_vertex(&self, def: DefinitionId, v: VertexId) -> Result<()> {
        let vertex = self.data.vertices.get(v).ok_or_else(|| not_found("vertex"))?;
        if vertex.owner != def {
            return Err(SceneError::WrongContainer {
                kind: "vertex",
                container: self.definition_name(def),
            });
        }
        Ok(())
    }

    /// Add an edge between two distinct vertices of `def`.
    pub fn add_edge(
        &mut self,
        def: DefinitionId,
        start: VertexId,
        end: VertexId,
    ) -> Result<EdgeId> {
        self.check_vertex(def, start)?;
        self.check_vertex(def, end)?;
        if start == end {
            return Err(SceneError::InvalidGeometry(
                "edge endpoints must differ".to_string(),
            ));
        }
        let id = self.data.edges.insert(Edge {
            start,
            end,
            curve: None,
            owner: def,
        });
        self.definition_mut(def)?.edges.push(id);
        Ok(id)
    }

    /// Add a chain of edges through `points`, sharing vertices between segments.
    ///
    /// With `closed`, a final edge joins the last point back to the first.
    pub fn add_polyline(
        &mut self,
        def: DefinitionId,
        points: &[Point3],
        closed: bool,
    ) -> Result<Vec<EdgeId>> {
        let min = if closed { 3 } else { 2 };
        if points.len() < min {
            return Err(SceneError::InvalidGeometry(format!(
                "polyline needs at least {min} points, got {}",
                points.len()
            )));
        }
        let verts = points
            .iter()
            .map(|p| self.add_vertex(def, *p))
            .collect::<Result<Vec<_>>>()?;
        let mut edges = Vec::with_capacity(verts.len());
        for pair in verts.windows(2) {
            edges.push(self.add_edge(def, pair[0], pair[1])?);
        }
        if closed {
            edges.push(self.add_edge(def, verts[verts.len() - 1], verts[0])?);
        }
        Ok(edges)
    }

    /// Add a face over existing vertices of `def`.
    pub fn add_face(&mut self, def: DefinitionId, vertices: &[VertexId]) -> Result<FaceId> {
        if vertices.len() < 3 {
            return Err(SceneError::InvalidGeometry(
                "face needs at least 3 vertices".to_string(),
            ));
        }
        for &v in vertices {
            self.check_vertex(def, v)?;
        }
        let id = self.data.faces.insert(Face {
            vertices: vertices.to_vec(),
            owner: def,
        });
        self.definition_mut(def)?.faces.push(id);
        Ok(id)
    }

    /// Add a face with its boundary edges from a loop of points.
    pub fn add_polygon(&mut self, def: DefinitionId, points: &[Point3]) -> Result<FaceId> {
        let edges = self.add_polyline(def, points, true)?;
        let loop_vertices = edges
            .iter()
            .map(|&e| self.edge_vertices(e).map(|[start, _]| start))
            .collect::<Result<Vec<_>>>()?;
        self.add_face(def, &loop_vertices)
    }

    /// Add a curve aggregation of straight segments through `points`.
    ///
    /// Circles are closed back to their first point.
    pub fn add_curve(
        &mut self,
        def: DefinitionId,
        kind: CurveKind,
        points: &[Point3],
    ) -> Result<CurveId> {
        let edges = self.add_polyline(def, points, kind == CurveKind::Circle)?;
        self.group_curve(def, kind, &edges)
    }

    /// Tag existing edges of `def` as one curve aggregation.
    pub fn group_curve(
        &mut self,
        def: DefinitionId,
        kind: CurveKind,
        edges: &[EdgeId],
    ) -> Result<CurveId> {
        if edges.is_empty() {
            return Err(SceneError::InvalidGeometry(
                "curve needs at least one edge".to_string(),
            ));
        }
        for &e in edges {
            let edge = self.data.edges.get(e).ok_or_else(|| not_found("edge"))?;
            if edge.owner != def {
                return Err(SceneError::WrongContainer {
                    kind: "edge",
                    container: self.definition_name(def),
                });
            }
            if edge.curve.is_some() {
                return Err(SceneError::InvalidGeometry(
                    "edge already belongs to a curve".to_string(),
                ));
            }
        }
        let id = self.data.curves.insert(Curve {
            kind,
            edges: edges.to_vec(),
            owner: def,
        });
        for &e in edges {
            self.data.edges[e].curve = Some(id);
        }
        self.definition_mut(def)?.curves.push(id);
        Ok(id)
    }

    fn add_guide(&mut self, def: DefinitionId, kind: GuideKind) -> Result<GuideId> {
        if !self.data.definitions.contains_key(def) {
            return Err(not_found("definition"));
        }
        let id = self.data.guides.insert(Guide { kind, owner: def });
        self.definition_mut(def)?.guides.push(id);
        Ok(id)
    }

    /// Add an infinite construction line.
    pub fn add_construction_line(
        &mut self,
        def: DefinitionId,
        anchor: Point3,
        direction: Vec3,
    ) -> Result<GuideId> {
        if direction.norm() == 0.0 || !direction.iter().all(|c| c.is_finite()) {
            return Err(SceneError::InvalidGeometry(
                "construction line direction must be a finite non-zero vector".to_string(),
            ));
        }
        self.add_guide(def, GuideKind::Line { anchor, direction })
    }

    /// Add a construction point.
    pub fn add_construction_point(
        &mut self,
        def: DefinitionId,
        position: Point3,
    ) -> Result<GuideId> {
        self.add_guide(def, GuideKind::Point { position })
    }

    /// Place `definition` inside `parent`.
    pub fn add_instance(
        &mut self,
        parent: DefinitionId,
        definition: DefinitionId,
        transform: Transform,
        kind: InstanceKind,
    ) -> Result<InstanceId> {
        if !self.data.definitions.contains_key(parent) {
            return Err(not_found("definition"));
        }
        if !self.data.definitions.contains_key(definition) {
            return Err(not_found("definition"));
        }
        if definition == self.data.root {
            return Err(SceneError::InvalidGeometry(
                "the model root cannot be instanced".to_string(),
            ));
        }
        if self.reaches(definition, parent) {
            return Err(SceneError::Cycle {
                definition: self.definition_name(definition),
                parent: self.definition_name(parent),
            });
        }
        let id = self.data.instances.insert(Instance {
            definition,
            transform,
            kind,
            owner: parent,
        });
        self.definition_mut(parent)?.instances.push(id);
        Ok(id)
    }

    // =========================================================================
    // Mutation primitives
    // =========================================================================

    /// Move vertices of `container` by per-vertex displacements in its frame.
    ///
    /// All moves are validated before any is applied.
    pub fn transform_by_vectors(
        &mut self,
        container: DefinitionId,
        moves: &[(VertexId, Vec3)],
    ) -> Result<()> {
        if !self.data.definitions.contains_key(container) {
            return Err(not_found("definition"));
        }
        for (v, delta) in moves {
            self.check_vertex(container, *v)?;
            if !delta.iter().all(|c| c.is_finite()) {
                return Err(SceneError::InvalidGeometry(
                    "vertex displacement is not finite".to_string(),
                ));
            }
        }
        for (v, delta) in moves {
            self.data.vertices[*v].point += *delta;
        }
        Ok(())
    }

    /// Apply `t` (in the guide owner's frame) to a construction line or point.
    pub fn transform_guide(&mut self, id: GuideId, t: &Transform) -> Result<()> {
        if !t.is_finite() {
            return Err(SceneError::InvalidGeometry(
                "guide transform is not finite".to_string(),
            ));
        }
        let guide = self.data.guides.get_mut(id).ok_or_else(|| not_found("guide"))?;
        guide.kind = guide.kind.transformed(t);
        Ok(())
    }

    /// Dissolve a curve aggregation, leaving its edges as independent segments.
    pub fn explode_curve(&mut self, id: CurveId) -> Result<()> {
        let curve = self.data.curves.remove(id).ok_or_else(|| not_found("curve"))?;
        for e in &curve.edges {
            if let Some(edge) = self.data.edges.get_mut(*e) {
                edge.curve = None;
            }
        }
        if let Some(owner) = self.data.definitions.get_mut(curve.owner) {
            owner.curves.retain(|c| *c != id);
        }
        Ok(())
    }

    /// Make `instance` the only user of its definition.
    ///
    /// A definition already used once is returned unchanged. Otherwise the
    /// immediate geometry is copied into a new definition; nested instances
    /// are copied too and keep pointing at their original definitions.
    pub fn make_unique(&mut self, instance: InstanceId) -> Result<DefinitionId> {
        let source = self
            .data
            .instances
            .get(instance)
            .map(|i| i.definition)
            .ok_or_else(|| not_found("instance"))?;
        if self.reference_count(source) <= 1 {
            return Ok(source);
        }
        let copy = self.copy_definition(source)?;
        self.data.instances[instance].definition = copy;
        debug!(
            from = %self.definition_name(source),
            to = %self.definition_name(copy),
            "made definition unique"
        );
        Ok(copy)
    }

    fn unique_name(&self, base: &str) -> String {
        let taken: HashSet<&str> = self
            .data
            .definitions
            .values()
            .map(|d| d.name.as_str())
            .collect();
        (1..)
            .map(|n| format!("{base}#{n}"))
            .find(|name| !taken.contains(name.as_str()))
            .unwrap_or_else(|| base.to_string())
    }

    fn copy_definition(&mut self, source: DefinitionId) -> Result<DefinitionId> {
        let src = self
            .data
            .definitions
            .get(source)
            .cloned()
            .ok_or_else(|| not_found("definition"))?;
        let name = self.unique_name(&src.name);
        let target = self.data.definitions.insert(Definition {
            name,
            ..Default::default()
        });
        let mut out = Definition::default();

        let mut vertex_map = HashMap::with_capacity(src.vertices.len());
        for &v in &src.vertices {
            let point = self.data.vertices[v].point;
            let nv = self.data.vertices.insert(Vertex {
                point,
                owner: target,
            });
            vertex_map.insert(v, nv);
            out.vertices.push(nv);
        }

        // Curves and edges point at each other: create curves empty, fill after edges.
        let mut curve_map = HashMap::with_capacity(src.curves.len());
        for &c in &src.curves {
            let kind = self.data.curves[c].kind;
            let nc = self.data.curves.insert(Curve {
                kind,
                edges: Vec::new(),
                owner: target,
            });
            curve_map.insert(c, nc);
            out.curves.push(nc);
        }

        let mut edge_map = HashMap::with_capacity(src.edges.len());
        for &e in &src.edges {
            let edge = &self.data.edges[e];
            let copy = Edge {
                start: vertex_map[&edge.start],
                end: vertex_map[&edge.end],
                curve: edge.curve.and_then(|c| curve_map.get(&c).copied()),
                owner: target,
            };
            let ne = self.data.edges.insert(copy);
            edge_map.insert(e, ne);
            out.edges.push(ne);
        }

        for (&old, &new) in &curve_map {
            let edges = self.data.curves[old]
                .edges
                .iter()
                .filter_map(|e| edge_map.get(e).copied())
                .collect();
            self.data.curves[new].edges = edges;
        }

        for &f in &src.faces {
            let vertices = self.data.faces[f]
                .vertices
                .iter()
                .map(|v| vertex_map[v])
                .collect();
            out.faces.push(self.data.faces.insert(Face {
                vertices,
                owner: target,
            }));
        }

        for &g in &src.guides {
            let kind = self.data.guides[g].kind;
            out.guides.push(self.data.guides.insert(Guide {
                kind,
                owner: target,
            }));
        }

        for &i in &src.instances {
            let inst = &self.data.instances[i];
            let copy = Instance {
                owner: target,
                ..inst.clone()
            };
            out.instances.push(self.data.instances.insert(copy));
        }

        let def = self.definition_mut(target)?;
        out.name = std::mem::take(&mut def.name);
        *def = out;
        Ok(target)
    }

    // =========================================================================
    // Operations and undo
    // =========================================================================

    /// Open a named undoable operation.
    pub fn start_operation(&mut self, name: &str) -> Result<()> {
        self.journal.start(name, self.data.clone())
    }

    /// Commit the open operation as one undo entry.
    pub fn commit_operation(&mut self) -> Result<()> {
        self.journal.commit()
    }

    /// Discard every change made since `start_operation`.
    pub fn abort_operation(&mut self) -> Result<()> {
        self.data = self.journal.abort()?;
        Ok(())
    }

    /// Name of the open operation, if any.
    pub fn open_operation(&self) -> Option<&str> {
        self.journal.open_operation()
    }

    /// Names of committed operations, oldest first.
    pub fn undo_history(&self) -> Vec<String> {
        self.journal.names().map(str::to_string).collect()
    }

    /// Revert the most recent committed operation and return its name.
    pub fn undo(&mut self) -> Result<String> {
        if let Some(open) = self.journal.open_operation() {
            return Err(SceneError::OperationOpen(open.to_string()));
        }
        let entry = self.journal.pop().ok_or(SceneError::NothingToUndo)?;
        self.data = entry.before;
        Ok(entry.name)
    }
}

fn entity_kind_name(entity: Entity) -> &'static str {
    match entity {
        Entity::Edge(_) => "edge",
        Entity::Face(_) => "face",
        Entity::Instance(_) => "instance",
        Entity::ConstructionLine(_) => "construction line",
        Entity::ConstructionPoint(_) => "construction point",
        Entity::Curve(_) => "curve",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(scene: &mut Scene, def: DefinitionId, z: f64) -> FaceId {
        scene
            .add_polygon(
                def,
                &[
                    Point3::new(0.0, 0.0, z),
                    Point3::new(1.0, 0.0, z),
                    Point3::new(1.0, 1.0, z),
                    Point3::new(0.0, 1.0, z),
                ],
            )
            .unwrap()
    }

    #[test]
    fn test_polygon_shares_vertices_with_edges() {
        let mut scene = Scene::default();
        let root = scene.root();
        let face = square(&mut scene, root, 2.0);
        let def = scene.definition(root).unwrap();
        assert_eq!(def.vertices.len(), 4);
        assert_eq!(def.edges.len(), 4);
        assert_eq!(scene.face(face).unwrap().vertices.len(), 4);
        for e in &def.edges {
            let [a, _] = scene.edge_vertices(*e).unwrap();
            assert!(scene.face(face).unwrap().vertices.contains(&a));
        }
    }

    #[test]
    fn test_edge_rejects_foreign_vertex() {
        let mut scene = Scene::default();
        let root = scene.root();
        let other = scene.add_definition("Other");
        let a = scene.add_vertex(root, Point3::origin()).unwrap();
        let b = scene.add_vertex(other, Point3::new(1.0, 0.0, 0.0)).unwrap();
        let err = scene.add_edge(root, a, b).unwrap_err();
        assert!(matches!(err, SceneError::WrongContainer { kind: "vertex", .. }));
    }

    #[test]
    fn test_instance_cycle_rejected() {
        let mut scene = Scene::default();
        let a = scene.add_definition("A");
        let b = scene.add_definition("B");
        scene
            .add_instance(a, b, Transform::identity(), InstanceKind::Component)
            .unwrap();
        let err = scene
            .add_instance(b, a, Transform::identity(), InstanceKind::Component)
            .unwrap_err();
        assert!(matches!(err, SceneError::Cycle { .. }));
        assert!(scene
            .add_instance(a, a, Transform::identity(), InstanceKind::Group)
            .is_err());
        let root = scene.root();
        assert!(scene
            .add_instance(a, root, Transform::identity(), InstanceKind::Group)
            .is_err());
    }

    #[test]
    fn test_make_unique_copies_shared_definition() {
        let mut scene = Scene::default();
        let root = scene.root();
        let def = scene.add_definition("Post");
        square(&mut scene, def, 3.0);
        let arc = scene
            .add_curve(
                def,
                CurveKind::Arc,
                &[
                    Point3::new(0.0, 0.0, 1.0),
                    Point3::new(1.0, 1.0, 1.0),
                    Point3::new(2.0, 0.0, 1.0),
                ],
            )
            .unwrap();
        let i1 = scene
            .add_instance(root, def, Transform::identity(), InstanceKind::Component)
            .unwrap();
        let i2 = scene
            .add_instance(root, def, Transform::translation(0.0, 0.0, 5.0), InstanceKind::Component)
            .unwrap();
        assert_eq!(scene.reference_count(def), 2);

        let copy = scene.make_unique(i2).unwrap();
        assert_ne!(copy, def);
        assert_eq!(scene.instance(i1).unwrap().definition, def);
        assert_eq!(scene.instance(i2).unwrap().definition, copy);
        assert_eq!(scene.reference_count(def), 1);
        assert_eq!(scene.reference_count(copy), 1);
        assert_eq!(scene.definition(copy).unwrap().name, "Post#1");

        let src = scene.definition(def).unwrap().clone();
        let dst = scene.definition(copy).unwrap().clone();
        assert_eq!(src.vertices.len(), dst.vertices.len());
        assert_eq!(src.edges.len(), dst.edges.len());
        assert_eq!(dst.curves.len(), 1);
        assert_ne!(dst.curves[0], arc);
        let copied_curve = scene.curve(dst.curves[0]).unwrap();
        assert_eq!(copied_curve.edges.len(), 2);
        for e in &copied_curve.edges {
            assert_eq!(scene.edge(*e).unwrap().curve, Some(dst.curves[0]));
            assert_eq!(scene.edge(*e).unwrap().owner, copy);
        }

        // Already unique: no further copy.
        assert_eq!(scene.make_unique(i2).unwrap(), copy);
    }

    #[test]
    fn test_make_unique_shares_nested_definitions() {
        let mut scene = Scene::default();
        let root = scene.root();
        let inner = scene.add_definition("Inner");
        let outer = scene.add_definition("Outer");
        scene
            .add_instance(outer, inner, Transform::identity(), InstanceKind::Component)
            .unwrap();
        scene
            .add_instance(root, outer, Transform::identity(), InstanceKind::Component)
            .unwrap();
        let second = scene
            .add_instance(root, outer, Transform::identity(), InstanceKind::Component)
            .unwrap();

        let copy = scene.make_unique(second).unwrap();
        let nested = scene.definition(copy).unwrap().instances[0];
        assert_eq!(scene.instance(nested).unwrap().definition, inner);
        assert_eq!(scene.instance(nested).unwrap().owner, copy);
        assert_eq!(scene.reference_count(inner), 2);
    }

    #[test]
    fn test_transform_by_vectors_is_all_or_nothing() {
        let mut scene = Scene::default();
        let root = scene.root();
        let other = scene.add_definition("Other");
        let a = scene.add_vertex(root, Point3::new(0.0, 0.0, 1.0)).unwrap();
        let b = scene.add_vertex(other, Point3::new(0.0, 0.0, 1.0)).unwrap();
        let err = scene
            .transform_by_vectors(root, &[(a, Vec3::new(0.0, 0.0, -1.0)), (b, Vec3::zeros())])
            .unwrap_err();
        assert!(matches!(err, SceneError::WrongContainer { .. }));
        assert_eq!(scene.vertex_point(a).unwrap().z, 1.0);

        scene
            .transform_by_vectors(root, &[(a, Vec3::new(0.0, 0.0, -1.0))])
            .unwrap();
        assert_eq!(scene.vertex_point(a).unwrap().z, 0.0);
    }

    #[test]
    fn test_explode_curve_keeps_edges() {
        let mut scene = Scene::default();
        let root = scene.root();
        let circle = scene
            .add_curve(
                root,
                CurveKind::Circle,
                &[
                    Point3::new(1.0, 0.0, 0.0),
                    Point3::new(0.0, 1.0, 0.0),
                    Point3::new(-1.0, 0.0, 0.0),
                    Point3::new(0.0, -1.0, 0.0),
                ],
            )
            .unwrap();
        assert_eq!(scene.curve(circle).unwrap().edges.len(), 4);
        scene.explode_curve(circle).unwrap();
        assert!(scene.curve(circle).is_none());
        let def = scene.definition(root).unwrap();
        assert!(def.curves.is_empty());
        assert_eq!(def.edges.len(), 4);
        assert!(def.edges.iter().all(|e| scene.edge(*e).unwrap().curve.is_none()));
        assert!(scene.explode_curve(circle).is_err());
    }

    #[test]
    fn test_group_curve_rejects_taken_edges() {
        let mut scene = Scene::default();
        let root = scene.root();
        let other = scene.add_definition("Other");
        let edges = scene
            .add_polyline(
                root,
                &[Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)],
                false,
            )
            .unwrap();
        let arc = scene.group_curve(root, CurveKind::Arc, &edges).unwrap();
        assert_eq!(scene.edge(edges[1]).unwrap().curve, Some(arc));
        assert!(scene.group_curve(root, CurveKind::Arc, &edges[..1]).is_err());
        assert!(scene.group_curve(root, CurveKind::Arc, &[]).is_err());
        let err = scene.group_curve(other, CurveKind::Arc, &edges).unwrap_err();
        assert!(matches!(err, SceneError::WrongContainer { kind: "edge", .. }));
    }

    #[test]
    fn test_transform_guide() {
        let mut scene = Scene::default();
        let root = scene.root();
        let line = scene
            .add_construction_line(root, Point3::new(0.0, 0.0, 4.0), Vec3::new(1.0, 0.0, 1.0))
            .unwrap();
        scene
            .transform_guide(line, &Transform::translation(0.0, 0.0, -4.0))
            .unwrap();
        match scene.guide(line).unwrap().kind {
            GuideKind::Line { anchor, direction } => {
                assert_eq!(anchor.z, 0.0);
                assert_eq!(direction, Vec3::new(1.0, 0.0, 1.0));
            }
            GuideKind::Point { .. } => panic!("expected a line"),
        }
        assert!(scene
            .add_construction_line(root, Point3::origin(), Vec3::zeros())
            .is_err());
    }

    #[test]
    fn test_abort_restores_and_commit_records() {
        let mut scene = Scene::default();
        let root = scene.root();
        let v = scene.add_vertex(root, Point3::new(0.0, 0.0, 9.0)).unwrap();

        scene.start_operation("Flatten").unwrap();
        scene
            .transform_by_vectors(root, &[(v, Vec3::new(0.0, 0.0, -9.0))])
            .unwrap();
        scene.abort_operation().unwrap();
        assert_eq!(scene.vertex_point(v).unwrap().z, 9.0);
        assert!(scene.undo_history().is_empty());

        scene.start_operation("Flatten").unwrap();
        scene
            .transform_by_vectors(root, &[(v, Vec3::new(0.0, 0.0, -9.0))])
            .unwrap();
        assert!(scene.undo().is_err());
        scene.commit_operation().unwrap();
        assert_eq!(scene.undo_history(), vec!["Flatten".to_string()]);
        assert_eq!(scene.vertex_point(v).unwrap().z, 0.0);

        assert_eq!(scene.undo().unwrap(), "Flatten");
        assert_eq!(scene.vertex_point(v).unwrap().z, 9.0);
        assert_eq!(scene.undo(), Err(SceneError::NothingToUndo));
    }

    #[test]
    fn test_owner_of() {
        let mut scene = Scene::default();
        let root = scene.root();
        let def = scene.add_definition("D");
        let inst = scene
            .add_instance(root, def, Transform::identity(), InstanceKind::Group)
            .unwrap();
        let p = scene.add_construction_point(def, Point3::origin()).unwrap();
        assert_eq!(scene.owner_of(Entity::Instance(inst)).unwrap(), root);
        assert_eq!(scene.owner_of(Entity::ConstructionPoint(p)).unwrap(), def);
    }
}
