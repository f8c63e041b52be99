//! Math utilities and types
//!
//! Thin aliases over nalgebra plus the handful of spatial helpers the scene
//! and collider code share: a TRS [`Transform`], world-space [`Bounds`], and
//! vector rounding for reporting.

use serde::{Deserialize, Serialize};

pub use nalgebra::{Matrix4, UnitQuaternion, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Create a transform from a position and euler angles in degrees.
    ///
    /// Rotations apply about Z, then X, then Y, matching scene-editor euler angles.
    pub fn from_position_euler_degrees(position: Vec3, euler_degrees: Vec3) -> Self {
        let euler = euler_degrees.map(f32::to_radians);
        let rotation = Quat::from_axis_angle(&Vector3::y_axis(), euler.y)
            * Quat::from_axis_angle(&Vector3::x_axis(), euler.x)
            * Quat::from_axis_angle(&Vector3::z_axis(), euler.z);
        Self::from_position_rotation(position, rotation)
    }

    /// Replace the scale, keeping position and rotation
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * self.scale.component_mul(&point)
    }

    /// Apply rotation and scale (no translation) to a vector
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * self.scale.component_mul(&vector)
    }

    /// Compose a child's local transform onto this (parent) transform.
    ///
    /// Scale is carried component-wise, so a rotated child of a non-uniformly
    /// scaled parent gets a lossy scale, the same approximation hosts report.
    pub fn combine(&self, child: &Transform) -> Transform {
        Transform {
            position: self.transform_point(child.position),
            rotation: self.rotation * child.rotation,
            scale: self.scale.component_mul(&child.scale),
        }
    }
}

/// World-space axis-aligned bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Bounds {
    /// Create bounds from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Bounds that contain nothing: min at +inf, max at -inf.
    ///
    /// Encapsulating any point into empty bounds yields that point.
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::INFINITY),
            max: Vec3::repeat(f32::NEG_INFINITY),
        }
    }

    /// Create bounds centered at a point with given half-extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// True until at least one point has been encapsulated
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow to include a point
    pub fn encapsulate_point(&mut self, point: Vec3) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Grow to include other bounds
    pub fn encapsulate(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }
        self.encapsulate_point(other.min);
        self.encapsulate_point(other.max);
    }

    /// Get the center of the bounds
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-size of the bounds
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if these bounds contain a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if these bounds intersect other bounds
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }
}

/// Round every component of a vector to `decimal_places` digits
pub fn round_vec3(vector: Vec3, decimal_places: u32) -> Vec3 {
    let multiplier = (0..decimal_places).fold(1.0_f32, |acc, _| acc * 10.0);
    vector.map(|component| (component * multiplier).round() / multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_combine_applies_parent_rotation_and_scale() {
        let parent = Transform::from_position_euler_degrees(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 90.0),
        )
        .with_scale(Vec3::new(2.0, 2.0, 2.0));
        let child = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));

        let world = parent.combine(&child);

        assert_relative_eq!(world.position, Vec3::new(1.0, 2.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(world.scale, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_euler_angles_apply_z_then_x_then_y() {
        let transform = Transform::from_position_euler_degrees(Vec3::zeros(), Vec3::new(90.0, 0.0, 90.0));
        // Z turns +x into +y, then X turns +y into +z.
        assert_relative_eq!(transform.transform_vector(Vec3::x()), Vec3::z(), epsilon = 1e-5);

        let yaw_pitch = Transform::from_position_euler_degrees(Vec3::zeros(), Vec3::new(90.0, 90.0, 0.0));
        assert_relative_eq!(yaw_pitch.transform_vector(Vec3::z()), Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(yaw_pitch.transform_vector(Vec3::y()), Vec3::x(), epsilon = 1e-5);
    }

    #[test]
    fn test_matrix_matches_point_transform() {
        let transform = Transform::from_position_euler_degrees(
            Vec3::new(3.0, -1.0, 2.0),
            Vec3::new(30.0, 45.0, 10.0),
        )
        .with_scale(Vec3::new(1.0, 2.0, 0.5));
        let point = Vec3::new(0.5, 1.5, -2.0);

        let via_matrix = transform.to_matrix().transform_point(&point.into()).coords;

        assert_relative_eq!(via_matrix, transform.transform_point(point), epsilon = 1e-5);
    }

    #[test]
    fn test_empty_bounds_encapsulate() {
        let mut bounds = Bounds::empty();
        assert!(bounds.is_empty());

        bounds.encapsulate_point(Vec3::new(1.0, 2.0, 3.0));
        assert!(!bounds.is_empty());
        assert_eq!(bounds.min, bounds.max);

        bounds.encapsulate(&Bounds::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 5.0, 1.0)));
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 5.0, 3.0));

        bounds.encapsulate(&Bounds::empty());
        assert_eq!(bounds.max, Vec3::new(1.0, 5.0, 3.0));
    }

    #[test]
    fn test_round_vec3() {
        let rounded = round_vec3(Vec3::new(1.23456, -0.006, 2.0), 2);
        assert_relative_eq!(rounded, Vec3::new(1.23, -0.01, 2.0), epsilon = 1e-6);
        assert_relative_eq!(round_vec3(Vec3::new(1.6, 0.0, 0.0), 0).x, 2.0);
    }
}
