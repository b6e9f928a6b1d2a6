//! Vertical projection onto the target plane.

use zflat_math::{Point3, Vec3};

/// Displacement that moves `point` onto the plane `z = target_z`.
///
/// X and Y are untouched, so the result is always `(0, 0, target_z - z)`.
pub fn project(point: &Point3, target_z: f64) -> Vec3 {
    Vec3::new(0.0, 0.0, target_z - point.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_down_and_up() {
        assert_eq!(project(&Point3::new(3.0, 4.0, 7.0), 0.0), Vec3::new(0.0, 0.0, -7.0));
        assert_eq!(project(&Point3::new(3.0, 4.0, -2.0), 5.0), Vec3::new(0.0, 0.0, 7.0));
    }

    #[test]
    fn test_point_on_plane_needs_no_move() {
        assert_eq!(project(&Point3::new(1.0, 1.0, 2.5), 2.5), Vec3::zeros());
    }
}
