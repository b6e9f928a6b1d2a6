//! Walking the instance hierarchy.
//!
//! Each instance is made unique before its definition is touched, so
//! flattening through one placement cannot drag a sibling placed at a
//! different height along with it. The visited set only guards the
//! geometry rewrite: children are always entered, because a definition
//! seen before can still hold instances of definitions that were not.

use std::collections::HashSet;

use tracing::{debug, warn};
use zflat_math::{Tolerance, Transform};
use zflat_scene::{DefinitionId, InstanceId, SceneHost};

use crate::error::{FlattenError, Result};
use crate::geometry::{flatten_geometry, GeometrySet};
use crate::guides::flatten_guides;
use crate::report::{FlattenReport, Warning};
use crate::settings::FlattenSettings;

struct Frame {
    instance: InstanceId,
    parent: Transform,
    depth: usize,
}

/// Depth-first flattener over instance subtrees sharing one visited set.
pub struct Traverser<'s> {
    settings: &'s FlattenSettings,
    tolerance: Tolerance,
    visited: HashSet<DefinitionId>,
}

impl<'s> Traverser<'s> {
    /// Create a traverser for one flatten operation.
    pub fn new(settings: &'s FlattenSettings) -> Self {
        Self {
            settings,
            tolerance: Tolerance::DEFAULT,
            visited: HashSet::new(),
        }
    }

    /// True if the immediate geometry of `def` was already rewritten.
    pub fn is_visited(&self, def: DefinitionId) -> bool {
        self.visited.contains(&def)
    }

    /// Flatten `root` and everything nested under it.
    ///
    /// `parent` maps the frame `root` is placed in to world space.
    pub fn visit<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        root: InstanceId,
        parent: &Transform,
        report: &mut FlattenReport,
    ) -> Result<()> {
        let mut stack = vec![Frame {
            instance: root,
            parent: *parent,
            depth: 1,
        }];

        while let Some(frame) = stack.pop() {
            let shared = host.instance_definition(frame.instance)?;
            if frame.depth > self.settings.max_depth {
                let definition = host.definition_name(shared)?;
                warn!(
                    %definition,
                    max_depth = self.settings.max_depth,
                    "nesting too deep, skipping"
                );
                report.warnings.push(Warning::DepthLimit {
                    definition,
                    max_depth: self.settings.max_depth,
                });
                continue;
            }

            let definition = match host.make_unique(frame.instance) {
                Ok(def) => def,
                Err(reason) => {
                    let name = host.definition_name(shared)?;
                    if !self.settings.skip_failed_instances {
                        return Err(FlattenError::UnshareFailed {
                            definition: name,
                            source: reason,
                        });
                    }
                    warn!(definition = %name, %reason, "could not make instance unique, skipping");
                    report.warnings.push(Warning::UnshareFailed {
                        definition: name,
                        reason,
                    });
                    continue;
                }
            };
            if definition != shared {
                report.definitions_unshared += 1;
            }

            let world = frame.parent.compose(&host.instance_transform(frame.instance)?);
            let contents = host.contents(definition)?;

            if self.visited.insert(definition) {
                let set = GeometrySet {
                    edges: contents.edges,
                    faces: contents.faces,
                };
                let stats = flatten_geometry(
                    host,
                    definition,
                    &set,
                    &world,
                    self.settings.target_z,
                    &self.tolerance,
                )?;
                report.add_geometry(stats);
                report.definitions_flattened += 1;

                if self.settings.flatten_guides {
                    let stats = flatten_guides(
                        host,
                        &contents.guides,
                        &world,
                        self.settings.target_z,
                        &self.tolerance,
                    )?;
                    report.add_guides(stats);
                }
                debug!(depth = frame.depth, "flattened definition");
            }

            // Reversed so children come off the stack in their stored order.
            stack.extend(contents.instances.iter().rev().map(|&child| Frame {
                instance: child,
                parent: world,
                depth: frame.depth + 1,
            }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zflat_math::Point3;
    use zflat_scene::{InstanceKind, LengthUnit, Scene};

    fn segment(scene: &mut Scene, def: DefinitionId, z0: f64, z1: f64) {
        scene
            .add_polyline(
                def,
                &[Point3::new(0.0, 0.0, z0), Point3::new(1.0, 0.0, z1)],
                false,
            )
            .unwrap();
    }

    #[test]
    fn test_nested_world_transforms_compose() {
        let mut scene = Scene::default();
        let root = scene.root();
        let inner = scene.add_definition("Inner");
        let outer = scene.add_definition("Outer");
        segment(&mut scene, inner, 1.0, 2.0);
        segment(&mut scene, outer, 4.0, 4.0);
        scene
            .add_instance(outer, inner, Transform::translation(0.0, 0.0, 10.0), InstanceKind::Group)
            .unwrap();
        let top = scene
            .add_instance(root, outer, Transform::translation(0.0, 0.0, 3.0), InstanceKind::Group)
            .unwrap();

        let settings = FlattenSettings::at(0.0);
        let mut report = FlattenReport::new(0.0, LengthUnit::Millimeter);
        let mut traverser = Traverser::new(&settings);
        traverser
            .visit(&mut scene, top, &Transform::identity(), &mut report)
            .unwrap();

        // Outer sits at +3, inner at +13.
        for p in scene.definition_points(outer).unwrap() {
            assert!((p.z + 3.0).abs() < 1e-12);
        }
        for p in scene.definition_points(inner).unwrap() {
            assert!((p.z + 13.0).abs() < 1e-12);
        }
        assert_eq!(report.definitions_flattened, 2);
        assert!(traverser.is_visited(inner));
        assert!(traverser.is_visited(outer));
    }

    #[test]
    fn test_depth_limit_skips_and_warns() {
        let mut scene = Scene::default();
        let root = scene.root();
        let inner = scene.add_definition("Inner");
        let outer = scene.add_definition("Outer");
        segment(&mut scene, inner, 5.0, 5.0);
        scene
            .add_instance(outer, inner, Transform::identity(), InstanceKind::Group)
            .unwrap();
        let top = scene
            .add_instance(root, outer, Transform::identity(), InstanceKind::Group)
            .unwrap();

        let settings = FlattenSettings {
            max_depth: 1,
            ..FlattenSettings::default()
        };
        let mut report = FlattenReport::new(0.0, LengthUnit::Millimeter);
        Traverser::new(&settings)
            .visit(&mut scene, top, &Transform::identity(), &mut report)
            .unwrap();

        assert_eq!(
            report.warnings,
            vec![Warning::DepthLimit {
                definition: "Inner".into(),
                max_depth: 1
            }]
        );
        for p in scene.definition_points(inner).unwrap() {
            assert_eq!(p.z, 5.0);
        }
    }
}
