//! Flattening of edges and faces within one container.

use std::collections::HashSet;

use tracing::debug;
use zflat_math::{Tolerance, Transform, Vec3};
use zflat_scene::{DefinitionId, EdgeId, FaceId, SceneError, SceneHost, VertexId};

use crate::curves::explode_circular_curves;
use crate::error::Result;
use crate::project::project;

/// A flat set of edges and faces, all owned by one container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometrySet {
    /// Edges to flatten.
    pub edges: Vec<EdgeId>,
    /// Faces to flatten.
    pub faces: Vec<FaceId>,
}

impl GeometrySet {
    /// True if there is nothing to flatten.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.faces.is_empty()
    }
}

/// What one geometry pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometryStats {
    /// Distinct vertices examined.
    pub vertices: usize,
    /// Vertices that actually changed height.
    pub moved: usize,
    /// Arc and circle curves exploded first.
    pub curves_exploded: usize,
}

/// Distinct vertices of `set`, in first-seen order.
pub fn unique_vertices<H: SceneHost + ?Sized>(
    host: &H,
    set: &GeometrySet,
) -> Result<Vec<VertexId>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for &edge in &set.edges {
        for v in host.edge_vertices(edge)? {
            if seen.insert(v) {
                out.push(v);
            }
        }
    }
    for &face in &set.faces {
        for v in host.face_vertices(face)? {
            if seen.insert(v) {
                out.push(v);
            }
        }
    }
    Ok(out)
}

/// Edges of `container` with at least one endpoint in `vertices`.
///
/// A curve bounding a selected face has to be exploded even when none of
/// its edges were selected, since its vertices are about to move.
fn edges_touching<H: SceneHost + ?Sized>(
    host: &H,
    container: DefinitionId,
    vertices: &[VertexId],
) -> Result<Vec<EdgeId>> {
    let moving: HashSet<VertexId> = vertices.iter().copied().collect();
    let mut out = Vec::new();
    for edge in host.contents(container)?.edges {
        let [a, b] = host.edge_vertices(edge)?;
        if moving.contains(&a) || moving.contains(&b) {
            out.push(edge);
        }
    }
    Ok(out)
}

/// Move every vertex of `set` to world height `target_z`.
///
/// `to_world` maps the container's frame into world space. Each world
/// displacement is mapped back into the container's frame and all of them
/// are applied in one `transform_by_vectors` call.
pub fn flatten_geometry<H: SceneHost + ?Sized>(
    host: &mut H,
    container: DefinitionId,
    set: &GeometrySet,
    to_world: &Transform,
    target_z: f64,
    tolerance: &Tolerance,
) -> Result<GeometryStats> {
    let vertices = unique_vertices(host, set)?;
    if vertices.is_empty() {
        return Ok(GeometryStats::default());
    }
    let touching = edges_touching(host, container, &vertices)?;
    let curves_exploded = explode_circular_curves(host, &touching)?;
    let mut stats = GeometryStats {
        vertices: vertices.len(),
        moved: 0,
        curves_exploded,
    };

    let to_local = to_world.inverse().ok_or_else(|| {
        SceneError::InvalidGeometry(format!(
            "'{}' is placed with a singular transform",
            host.definition_name(container)
                .unwrap_or_else(|_| "<unknown>".to_string())
        ))
    })?;

    let mut moves: Vec<(VertexId, Vec3)> = Vec::with_capacity(vertices.len());
    for v in vertices {
        let local = host.vertex_position(v)?;
        let world = to_world.apply_point(&local);
        let delta = project(&world, target_z);
        if delta.z == 0.0 {
            continue;
        }
        if !tolerance.is_zero(delta.z) {
            stats.moved += 1;
        }
        moves.push((v, to_local.apply_vec(&delta)));
    }

    if !moves.is_empty() {
        host.transform_by_vectors(container, &moves)?;
    }
    debug!(
        vertices = stats.vertices,
        moved = stats.moved,
        "flattened geometry"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zflat_math::Point3;
    use zflat_scene::{CurveKind, Scene};

    fn world_z(scene: &Scene, v: VertexId, to_world: &Transform) -> f64 {
        to_world.apply_point(&scene.vertex_point(v).unwrap()).z
    }

    #[test]
    fn test_shared_vertex_moved_once() {
        let mut scene = Scene::default();
        let root = scene.root();
        let face = scene
            .add_polygon(
                root,
                &[
                    Point3::new(0.0, 0.0, 3.0),
                    Point3::new(4.0, 0.0, 5.0),
                    Point3::new(4.0, 4.0, 7.0),
                ],
            )
            .unwrap();
        let edges = scene.definition(root).unwrap().edges.clone();
        let set = GeometrySet {
            edges,
            faces: vec![face],
        };
        assert_eq!(unique_vertices(&scene, &set).unwrap().len(), 3);

        let stats = flatten_geometry(
            &mut scene,
            root,
            &set,
            &Transform::identity(),
            1.0,
            &Tolerance::DEFAULT,
        )
        .unwrap();
        assert_eq!(stats.vertices, 3);
        assert_eq!(stats.moved, 3);
        for p in scene.definition_points(root).unwrap() {
            assert!((p.z - 1.0).abs() < 1e-12);
        }
        let xs: Vec<f64> = scene
            .definition_points(root)
            .unwrap()
            .iter()
            .map(|p| p.x)
            .collect();
        assert_eq!(xs, vec![0.0, 4.0, 4.0]);
    }

    #[test]
    fn test_rotated_and_scaled_container() {
        let mut scene = Scene::default();
        let def = scene.add_definition("Tilted");
        let edges = scene
            .add_polyline(
                def,
                &[
                    Point3::new(1.0, 2.0, 3.0),
                    Point3::new(-2.0, 0.5, 6.0),
                    Point3::new(0.0, -1.0, -4.0),
                ],
                false,
            )
            .unwrap();
        let to_world = Transform::translation(10.0, -3.0, 2.0)
            .compose(&Transform::rotation_x(0.7))
            .compose(&Transform::scale(2.0, 1.0, 0.5));
        let before: Vec<Point3> = scene
            .definition_points(def)
            .unwrap()
            .iter()
            .map(|p| to_world.apply_point(p))
            .collect();

        let set = GeometrySet {
            edges,
            faces: Vec::new(),
        };
        flatten_geometry(&mut scene, def, &set, &to_world, -1.5, &Tolerance::DEFAULT).unwrap();

        let verts = scene.definition(def).unwrap().vertices.clone();
        for (v, old) in verts.iter().zip(&before) {
            let now = to_world.apply_point(&scene.vertex_point(*v).unwrap());
            assert!((now.z + 1.5).abs() < 1e-9);
            assert!((now.x - old.x).abs() < 1e-9);
            assert!((now.y - old.y).abs() < 1e-9);
            assert!((world_z(&scene, *v, &to_world) + 1.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_set_is_a_no_op() {
        let mut scene = Scene::default();
        let root = scene.root();
        let stats = flatten_geometry(
            &mut scene,
            root,
            &GeometrySet::default(),
            &Transform::scale(0.0, 0.0, 0.0),
            0.0,
            &Tolerance::DEFAULT,
        )
        .unwrap();
        assert_eq!(stats, GeometryStats::default());
    }

    #[test]
    fn test_singular_transform_is_an_error() {
        let mut scene = Scene::default();
        let root = scene.root();
        let edges = scene
            .add_polyline(
                root,
                &[Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 0.0, 1.0)],
                false,
            )
            .unwrap();
        let set = GeometrySet {
            edges,
            faces: Vec::new(),
        };
        let result = flatten_geometry(
            &mut scene,
            root,
            &set,
            &Transform::scale(1.0, 1.0, 0.0),
            0.0,
            &Tolerance::DEFAULT,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_second_pass_moves_nothing() {
        let mut scene = Scene::default();
        let root = scene.root();
        let edges = scene
            .add_polyline(
                root,
                &[Point3::new(0.0, 0.0, 2.0), Point3::new(1.0, 0.0, 8.0)],
                false,
            )
            .unwrap();
        let set = GeometrySet {
            edges,
            faces: Vec::new(),
        };
        let tol = Tolerance::DEFAULT;
        let id = Transform::identity();
        let first = flatten_geometry(&mut scene, root, &set, &id, 0.0, &tol).unwrap();
        let second = flatten_geometry(&mut scene, root, &set, &id, 0.0, &tol).unwrap();
        assert_eq!(first.moved, 2);
        assert_eq!(second.moved, 0);
        assert_eq!(second.vertices, 2);
    }

    #[test]
    fn test_arcs_touching_face_vertices_exploded() {
        let mut scene = Scene::default();
        let root = scene.root();
        let arc = scene
            .add_curve(
                root,
                CurveKind::Arc,
                &[
                    Point3::new(0.0, 0.0, 1.0),
                    Point3::new(1.0, 1.0, 5.0),
                    Point3::new(2.0, 0.0, 9.0),
                ],
            )
            .unwrap();
        let face_vertices = scene.definition(root).unwrap().vertices.clone();
        let face = scene.add_face(root, &face_vertices).unwrap();
        let far = scene
            .add_curve(
                root,
                CurveKind::Arc,
                &[
                    Point3::new(10.0, 0.0, 0.0),
                    Point3::new(11.0, 1.0, 0.0),
                    Point3::new(12.0, 0.0, 0.0),
                ],
            )
            .unwrap();
        let set = GeometrySet {
            edges: Vec::new(),
            faces: vec![face],
        };

        let tol = Tolerance::DEFAULT;
        let stats = flatten_geometry(&mut scene, root, &set, &Transform::identity(), 0.0, &tol)
            .unwrap();
        assert_eq!(stats.curves_exploded, 1);
        assert_eq!(stats.moved, 3);
        assert!(scene.curve(arc).is_none());
        assert!(scene.curve(far).is_some());
        for v in face_vertices {
            assert_eq!(scene.vertex_point(v).unwrap().z, 0.0);
        }
    }
}
