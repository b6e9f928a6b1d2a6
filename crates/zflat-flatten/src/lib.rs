#![warn(missing_docs)]

//! Flatten selected scene geometry onto one horizontal plane.
//!
//! Every point of the selection keeps its world X and Y and ends at world
//! `Z = target_z`:
//!
//! - **Instances** are walked recursively. Each one is made unique before
//!   its definition is rewritten, world transforms are composed down the
//!   tree, and a definition's own geometry is rewritten at most once.
//! - **Loose edges and faces** are flattened in the root frame.
//! - **Arcs and circles** are exploded into plain edges first.
//! - **Construction lines** parallel to Z are left alone; other lines have
//!   their anchor moved onto the plane. Construction points always move.
//!
//! The whole run happens inside one host operation, so it is a single undo
//! step, and any host failure rolls everything back.
//!
//! # Example
//!
//! ```
//! use zflat_flatten::{flatten, FlattenSettings};
//! use zflat_math::{Point3, Transform};
//! use zflat_scene::{Entity, InstanceKind, Scene};
//!
//! let mut scene = Scene::default();
//! let root = scene.root();
//! let post = scene.add_definition("Post");
//! scene
//!     .add_polyline(post, &[Point3::new(0.0, 0.0, 3.0), Point3::new(0.0, 0.0, 7.0)], false)
//!     .unwrap();
//! let kind = InstanceKind::Component;
//! let a = scene
//!     .add_instance(root, post, Transform::translation(0.0, 0.0, 2.0), kind)
//!     .unwrap();
//! let b = scene
//!     .add_instance(root, post, Transform::translation(5.0, 0.0, -5.0), kind)
//!     .unwrap();
//!
//! let selection = [Entity::Instance(a), Entity::Instance(b)];
//! let report = flatten(&mut scene, &selection, &FlattenSettings::at(0.0)).unwrap();
//! assert_eq!(report.definitions_unshared, 1);
//! assert_eq!(scene.undo_history(), vec!["Flatten to Z".to_string()]);
//! ```

pub mod curves;
pub mod error;
pub mod geometry;
pub mod guides;
pub mod partition;
pub mod project;
pub mod report;
pub mod settings;
pub mod traverse;

pub use curves::explode_circular_curves;
pub use error::{FlattenError, Result};
pub use geometry::{flatten_geometry, unique_vertices, GeometrySet, GeometryStats};
pub use guides::{classify, flatten_guides, GuideClass, GuideStats};
pub use partition::{partition_selection, Partition};
pub use project::project;
pub use report::{FlattenReport, Warning};
pub use settings::FlattenSettings;
pub use traverse::Traverser;

use tracing::{error, info, warn};
use zflat_math::{Tolerance, Transform};
use zflat_scene::{DefinitionId, Entity, SceneHost};

/// Flatten `selection` onto world height `settings.target_z`.
///
/// Fails with [`FlattenError::EmptySelection`] or
/// [`FlattenError::InvalidTarget`] before touching the host. Any other
/// failure aborts the host operation, leaving the scene as it was.
pub fn flatten<H: SceneHost + ?Sized>(
    host: &mut H,
    selection: &[Entity],
    settings: &FlattenSettings,
) -> Result<FlattenReport> {
    let partition = partition_selection(selection);
    if partition.is_empty() {
        return Err(FlattenError::EmptySelection);
    }
    settings.validate()?;

    host.start_operation(&settings.operation_name)?;
    match run(host, &partition, settings) {
        Ok(report) => {
            host.commit_operation()?;
            info!(
                vertices = report.vertices_moved,
                definitions = report.definitions_flattened,
                warnings = report.warnings.len(),
                "flatten complete"
            );
            Ok(report)
        }
        Err(err) => {
            warn!(%err, "flatten failed, rolling back");
            if let Err(abort_err) = host.abort_operation() {
                error!(%abort_err, "could not roll back flatten");
            }
            Err(err)
        }
    }
}

fn run<H: SceneHost + ?Sized>(
    host: &mut H,
    partition: &Partition,
    settings: &FlattenSettings,
) -> Result<FlattenReport> {
    let mut report = FlattenReport::new(settings.target_z, host.units());
    let root_frame = Transform::identity();
    let tolerance = Tolerance::DEFAULT;

    let mut traverser = Traverser::new(settings);
    for &instance in &partition.instances {
        traverser.visit(host, instance, &root_frame, &mut report)?;
    }

    for (container, set) in loose_geometry_by_owner(host, partition)? {
        if traverser.is_visited(container) {
            continue;
        }
        let stats = flatten_geometry(
            host,
            container,
            &set,
            &root_frame,
            settings.target_z,
            &tolerance,
        )?;
        report.add_geometry(stats);
    }

    if settings.flatten_guides && !partition.guides.is_empty() {
        // Guides in a definition the traverser rewrote have already moved.
        let mut guides = Vec::with_capacity(partition.guides.len());
        for &guide in &partition.guides {
            // Both guide variants resolve through the same owner table.
            let owner = host.owner_of(Entity::ConstructionPoint(guide))?;
            if !traverser.is_visited(owner) {
                guides.push(guide);
            }
        }
        let stats = flatten_guides(
            host,
            &guides,
            &root_frame,
            settings.target_z,
            &tolerance,
        )?;
        report.add_guides(stats);
    }
    Ok(report)
}

/// Group loose edges and faces by owning container, in selection order.
fn loose_geometry_by_owner<H: SceneHost + ?Sized>(
    host: &H,
    partition: &Partition,
) -> Result<Vec<(DefinitionId, GeometrySet)>> {
    let mut groups: Vec<(DefinitionId, GeometrySet)> = Vec::new();
    fn slot(
        groups: &mut Vec<(DefinitionId, GeometrySet)>,
        owner: DefinitionId,
    ) -> &mut GeometrySet {
        let idx = match groups.iter().position(|(d, _)| *d == owner) {
            Some(idx) => idx,
            None => {
                groups.push((owner, GeometrySet::default()));
                groups.len() - 1
            }
        };
        &mut groups[idx].1
    }
    for &edge in &partition.edges {
        let owner = host.owner_of(Entity::Edge(edge))?;
        slot(&mut groups, owner).edges.push(edge);
    }
    for &face in &partition.faces {
        let owner = host.owner_of(Entity::Face(face))?;
        slot(&mut groups, owner).faces.push(face);
    }
    Ok(groups)
}
