//! Collider shapes stored in node-local space
//!
//! A [`ColliderShape`] keeps the authored parameters (center, radius, size,
//! axis) in the owning node's local frame and is turned into a world-space
//! [`WorldShape`] only when a query needs it.

use serde::{Deserialize, Serialize};

use super::primitives::{Capsule, OrientedBox, Sphere, WorldShape};
use crate::foundation::math::{Transform, Vec3};

/// Local axis a capsule's height runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Axis {
    /// Local X
    X,
    /// Local Y
    #[default]
    Y,
    /// Local Z
    Z,
}

impl Axis {
    /// Component index: 0, 1 or 2
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Unit vector along the axis
    pub fn unit(self) -> Vec3 {
        let mut unit = Vec3::zeros();
        unit[self.index()] = 1.0;
        unit
    }
}

/// Primitive kind, used to group a node's colliders for queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Capsule collider
    Capsule,
    /// Box collider
    Box,
    /// Sphere collider
    Sphere,
}

/// Collider geometry in the owning node's local space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Capsule of total `height` along `direction`, hemispherical caps included
    Capsule {
        /// Local center
        #[serde(default = "Vec3::zeros")]
        center: Vec3,
        /// Local radius
        radius: f32,
        /// Local total height
        height: f32,
        /// Height axis
        #[serde(default)]
        direction: Axis,
    },
    /// Box of full `size`
    Box {
        /// Local center
        #[serde(default = "Vec3::zeros")]
        center: Vec3,
        /// Local full size
        size: Vec3,
    },
    /// Sphere
    Sphere {
        /// Local center
        #[serde(default = "Vec3::zeros")]
        center: Vec3,
        /// Local radius
        radius: f32,
    },
}

impl ColliderShape {
    /// Capsule centered on the node
    pub fn capsule(radius: f32, height: f32, direction: Axis) -> Self {
        Self::Capsule { center: Vec3::zeros(), radius, height, direction }
    }

    /// Box centered on the node
    pub fn cuboid(size: Vec3) -> Self {
        Self::Box { center: Vec3::zeros(), size }
    }

    /// Sphere centered on the node
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { center: Vec3::zeros(), radius }
    }

    /// Move the local center
    #[must_use]
    pub fn with_center(mut self, new_center: Vec3) -> Self {
        match &mut self {
            Self::Capsule { center, .. } | Self::Box { center, .. } | Self::Sphere { center, .. } => {
                *center = new_center;
            }
        }
        self
    }

    /// Which primitive this is
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Capsule { .. } => PrimitiveKind::Capsule,
            Self::Box { .. } => PrimitiveKind::Box,
            Self::Sphere { .. } => PrimitiveKind::Sphere,
        }
    }

    /// Local center
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Capsule { center, .. } | Self::Box { center, .. } | Self::Sphere { center, .. } => *center,
        }
    }

    /// Resolve the shape against the owner's world transform.
    ///
    /// Scale follows host-engine rules: spheres take the largest absolute
    /// scale component, box size scales per axis, capsules scale height by
    /// their axis and radius by the larger of the other two axes.
    pub fn to_world_space(&self, transform: &Transform) -> WorldShape {
        let scale = transform.scale.abs();
        let world_center = transform.transform_point(self.center());
        match *self {
            Self::Sphere { radius, .. } => WorldShape::Sphere(Sphere::new(world_center, radius * scale.max())),
            Self::Box { size, .. } => WorldShape::Box(OrientedBox::new(
                world_center,
                size.component_mul(&scale) * 0.5,
                transform.rotation,
            )),
            Self::Capsule { radius, height, direction, .. } => {
                let axis = direction.index();
                let radial_scale = (0..3).filter(|&i| i != axis).map(|i| scale[i]).fold(0.0, f32::max);
                let world_radius = radius * radial_scale;
                let world_height = (height * scale[axis]).max(2.0 * world_radius);
                let half_segment = world_height * 0.5 - world_radius;
                let along = transform.rotation * direction.unit() * half_segment;
                WorldShape::Capsule(Capsule::new(world_center + along, world_center - along, world_radius))
            }
        }
    }
}

fn enabled_by_default() -> bool {
    true
}

/// A primitive collider attached to a scene node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    /// Geometry in the owner's local space
    pub shape: ColliderShape,

    /// Triggers report overlap events but do not block
    #[serde(default)]
    pub is_trigger: bool,

    /// Disabled colliders stay attached but are invisible to the backend
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl Collider {
    /// Enabled, solid collider
    pub fn new(shape: ColliderShape) -> Self {
        Self { shape, is_trigger: false, enabled: true }
    }

    /// Mark as a trigger
    #[must_use]
    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Set the enabled flag
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl From<ColliderShape> for Collider {
    fn from(shape: ColliderShape) -> Self {
        Self::new(shape)
    }
}
