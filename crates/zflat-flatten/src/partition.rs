//! Selection partitioning.

use std::collections::HashSet;

use zflat_scene::{EdgeId, Entity, FaceId, GuideId, InstanceId};

/// A selection split by how each entity gets flattened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Instances to traverse, starting from the root frame.
    pub instances: Vec<InstanceId>,
    /// Loose edges, flattened in place.
    pub edges: Vec<EdgeId>,
    /// Loose faces, flattened in place.
    pub faces: Vec<FaceId>,
    /// Loose construction lines and points.
    pub guides: Vec<GuideId>,
    /// Entities with nothing to flatten (curve aggregations).
    pub ignored: usize,
}

impl Partition {
    /// True if no entity needs flattening.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
            && self.edges.is_empty()
            && self.faces.is_empty()
            && self.guides.is_empty()
    }
}

/// Split `selection` in one pass, keeping order and dropping repeats.
pub fn partition_selection(selection: &[Entity]) -> Partition {
    let mut seen = HashSet::with_capacity(selection.len());
    let mut out = Partition::default();
    for &entity in selection {
        if !seen.insert(entity) {
            continue;
        }
        match entity {
            Entity::Instance(id) => out.instances.push(id),
            Entity::Edge(id) => out.edges.push(id),
            Entity::Face(id) => out.faces.push(id),
            Entity::ConstructionLine(id) | Entity::ConstructionPoint(id) => out.guides.push(id),
            Entity::Curve(_) => out.ignored += 1,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use zflat_math::{Point3, Transform, Vec3};
    use zflat_scene::{CurveKind, InstanceKind, Scene};

    #[test]
    fn test_partition_by_kind() {
        let mut scene = Scene::default();
        let root = scene.root();
        let def = scene.add_definition("D");
        let inst = scene
            .add_instance(root, def, Transform::identity(), InstanceKind::Group)
            .unwrap();
        let face = scene
            .add_polygon(
                root,
                &[Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            )
            .unwrap();
        let edge = scene.definition(root).unwrap().edges[0];
        let line = scene
            .add_construction_line(root, Point3::origin(), Vec3::x())
            .unwrap();
        let curve = scene
            .add_curve(
                root,
                CurveKind::Arc,
                &[Point3::origin(), Point3::new(1.0, 1.0, 0.0), Point3::new(2.0, 0.0, 0.0)],
            )
            .unwrap();

        let selection = [
            Entity::Edge(edge),
            Entity::Instance(inst),
            Entity::Curve(curve),
            Entity::Face(face),
            Entity::ConstructionLine(line),
            Entity::Edge(edge),
        ];
        let p = partition_selection(&selection);
        assert_eq!(p.instances, vec![inst]);
        assert_eq!(p.edges, vec![edge]);
        assert_eq!(p.faces, vec![face]);
        assert_eq!(p.guides, vec![line]);
        assert_eq!(p.ignored, 1);
        assert!(!p.is_empty());
    }

    #[test]
    fn test_only_ignored_is_empty() {
        let mut scene = Scene::default();
        let root = scene.root();
        let curve = scene
            .add_curve(
                root,
                CurveKind::Polyline,
                &[Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            )
            .unwrap();
        let p = partition_selection(&[Entity::Curve(curve)]);
        assert!(p.is_empty());
        assert!(partition_selection(&[]).is_empty());
    }
}
