//! Construction line and point handling.
//!
//! Guides are not vertex geometry: they are moved as whole entities with a
//! local correction transform. A vertical construction line has no finite
//! footprint on a horizontal plane and is left alone. Every other line has
//! its anchor moved onto the plane while keeping its direction, so a
//! slanted line stays slanted and only passes through the plane.

use tracing::{debug, warn};
use zflat_math::{Point3, Tolerance, Transform};
use zflat_scene::{GuideId, GuideKind, SceneError, SceneHost};

use crate::error::Result;
use crate::project::project;

/// How a guide relates to the vertical axis in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideClass {
    /// Construction point.
    Point,
    /// Line parallel to Z: skipped.
    Vertical,
    /// Line lying in a horizontal plane: translated.
    Horizontal,
    /// Any other line: anchor re-homed, slope kept.
    Slanted,
}

/// Classify a guide given its owner's local-to-world transform.
pub fn classify(guide: &GuideKind, to_world: &Transform, tolerance: &Tolerance) -> GuideClass {
    match guide {
        GuideKind::Point { .. } => GuideClass::Point,
        GuideKind::Line { direction, .. } => {
            let world_dir = to_world.apply_vec(direction);
            if tolerance.is_vertical(&world_dir) {
                GuideClass::Vertical
            } else if tolerance.is_horizontal(&world_dir) {
                GuideClass::Horizontal
            } else {
                GuideClass::Slanted
            }
        }
    }
}

/// What one guide pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuideStats {
    /// Guides moved onto the plane.
    pub moved: usize,
    /// Vertical construction lines left untouched.
    pub skipped_vertical: usize,
}

fn anchor(guide: &GuideKind) -> Point3 {
    match *guide {
        GuideKind::Line { anchor, .. } => anchor,
        GuideKind::Point { position } => position,
    }
}

/// Project construction lines and points onto world height `target_z`.
pub fn flatten_guides<H: SceneHost + ?Sized>(
    host: &mut H,
    guides: &[GuideId],
    to_world: &Transform,
    target_z: f64,
    tolerance: &Tolerance,
) -> Result<GuideStats> {
    let mut stats = GuideStats::default();
    for &id in guides {
        let guide = host.guide(id)?;
        let class = classify(&guide, to_world, tolerance);
        if class == GuideClass::Vertical {
            debug!("skipping vertical construction line");
            stats.skipped_vertical += 1;
            continue;
        }

        let delta = project(&to_world.apply_point(&anchor(&guide)), target_z);
        if delta.z == 0.0 {
            continue;
        }
        let correction = to_world
            .conjugate(&Transform::translation_by(&delta))
            .ok_or_else(|| {
                warn!(?class, "guide owner has a singular transform");
                SceneError::InvalidGeometry("guide is placed with a singular transform".into())
            })?;
        host.transform_guide(id, &correction)?;
        if !tolerance.is_zero(delta.z) {
            stats.moved += 1;
        }
    }
    Ok(stats)
}
