//! World-space collision primitives and separation tests
//!
//! Spheres and capsules are handled as "rounded segments" (a core segment
//! swept by a radius; a sphere is a degenerate segment), boxes as oriented
//! boxes. [`separation`] returns a signed distance between any two
//! primitives: positive when apart, zero or negative when overlapping.
//!
//! For box/box pairs the distance is the largest gap over the 15 SAT axes,
//! which is a lower bound on the true distance. That is enough for overlap
//! tests and keeps conservative advancement from tunnelling.

use crate::foundation::math::{Bounds, Quat, Vec3};

const EPSILON: f32 = 1.0e-6;

/// Ternary search steps when locating a segment's closest point to a box
const SEGMENT_BOX_ITERATIONS: usize = 48;

/// World-space sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center in world space
    pub center: Vec3,
    /// Radius
    pub radius: f32,
}

impl Sphere {
    /// Creates a new sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// World-space capsule: the segment `point0..point1` swept by `radius`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    /// First end of the core segment
    pub point0: Vec3,
    /// Second end of the core segment
    pub point1: Vec3,
    /// Radius
    pub radius: f32,
}

impl Capsule {
    /// Creates a new capsule from its core segment and radius
    pub fn new(point0: Vec3, point1: Vec3, radius: f32) -> Self {
        Self { point0, point1, radius }
    }
}

/// World-space oriented box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// Center in world space
    pub center: Vec3,
    /// Half-size along each local axis
    pub half_extents: Vec3,
    /// Orientation of the local axes
    pub rotation: Quat,
}

impl OrientedBox {
    /// Creates a new oriented box
    pub fn new(center: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        Self { center, half_extents, rotation }
    }

    /// Local axes expressed in world space
    pub fn axes(&self) -> [Vec3; 3] {
        [
            self.rotation * Vec3::x(),
            self.rotation * Vec3::y(),
            self.rotation * Vec3::z(),
        ]
    }

    /// World point into box-local coordinates
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse_transform_vector(&(point - self.center))
    }

    /// Box-local point into world coordinates
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.center + self.rotation * local
    }

    /// The eight corners in world space.
    ///
    /// Bottom face first (-y), then top face (+y); each face runs
    /// (+x,+z), (-x,+z), (-x,-z), (+x,-z).
    pub fn corners(&self) -> [Vec3; 8] {
        let h = self.half_extents;
        [
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
        ]
        .map(|local| self.to_world(local))
    }

    /// Closest point on or inside the box to a world point
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let local = self.to_local(point);
        self.to_world(clamp_to_extents(local, self.half_extents))
    }

    /// Signed distance from a world point to the box surface (negative inside)
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        signed_distance_local(self.to_local(point), self.half_extents)
    }
}

fn clamp_to_extents(local: Vec3, half_extents: Vec3) -> Vec3 {
    Vec3::new(
        local.x.clamp(-half_extents.x, half_extents.x),
        local.y.clamp(-half_extents.y, half_extents.y),
        local.z.clamp(-half_extents.z, half_extents.z),
    )
}

fn signed_distance_local(local: Vec3, half_extents: Vec3) -> f32 {
    let outside = local - clamp_to_extents(local, half_extents);
    let outside_distance = outside.magnitude();
    if outside_distance > 0.0 {
        outside_distance
    } else {
        -(half_extents - local.abs()).min()
    }
}

/// Any world-space primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldShape {
    /// Sphere
    Sphere(Sphere),
    /// Capsule
    Capsule(Capsule),
    /// Oriented box
    Box(OrientedBox),
}

impl WorldShape {
    /// Reference point of the shape
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Sphere(sphere) => sphere.center,
            Self::Capsule(capsule) => (capsule.point0 + capsule.point1) * 0.5,
            Self::Box(obb) => obb.center,
        }
    }

    /// The same shape moved by `offset`
    #[must_use]
    pub fn translated(&self, offset: Vec3) -> Self {
        match *self {
            Self::Sphere(sphere) => Self::Sphere(Sphere::new(sphere.center + offset, sphere.radius)),
            Self::Capsule(capsule) => Self::Capsule(Capsule::new(
                capsule.point0 + offset,
                capsule.point1 + offset,
                capsule.radius,
            )),
            Self::Box(obb) => Self::Box(OrientedBox::new(obb.center + offset, obb.half_extents, obb.rotation)),
        }
    }

    /// The same shape grown by `margin` on every side.
    ///
    /// Radii grow for spheres and capsules, half-extents for boxes.
    #[must_use]
    pub fn inflated(&self, margin: f32) -> Self {
        match *self {
            Self::Sphere(sphere) => Self::Sphere(Sphere::new(sphere.center, sphere.radius + margin)),
            Self::Capsule(capsule) => {
                Self::Capsule(Capsule::new(capsule.point0, capsule.point1, capsule.radius + margin))
            }
            Self::Box(obb) => Self::Box(OrientedBox::new(
                obb.center,
                obb.half_extents.add_scalar(margin),
                obb.rotation,
            )),
        }
    }

    /// World-space axis-aligned bounds
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Sphere(sphere) => Bounds::from_center_extents(sphere.center, Vec3::repeat(sphere.radius)),
            Self::Capsule(capsule) => {
                let mut bounds = Bounds::from_center_extents(capsule.point0, Vec3::repeat(capsule.radius));
                bounds.encapsulate(&Bounds::from_center_extents(capsule.point1, Vec3::repeat(capsule.radius)));
                bounds
            }
            Self::Box(obb) => {
                let extents = obb.rotation.to_rotation_matrix().matrix().abs() * obb.half_extents;
                Bounds::from_center_extents(obb.center, extents)
            }
        }
    }
}

/// Signed separation between two shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separation {
    /// Gap between the shapes; zero or negative when they overlap
    pub distance: f32,
    /// Unit direction from the second shape toward the first
    pub normal: Vec3,
    /// Witness point on the second shape's surface
    pub point: Vec3,
}

impl Separation {
    /// True when the shapes touch or overlap
    pub fn is_overlapping(&self) -> bool {
        self.distance <= 0.0
    }
}

/// Two-sided witness used while computing a [`Separation`]
#[derive(Debug, Clone, Copy)]
struct Witness {
    distance: f32,
    normal: Vec3,
    point_a: Vec3,
    point_b: Vec3,
}

impl Witness {
    fn swapped(self) -> Self {
        Self {
            distance: self.distance,
            normal: -self.normal,
            point_a: self.point_b,
            point_b: self.point_a,
        }
    }
}

/// Core segment plus radius for spheres and capsules
#[derive(Debug, Clone, Copy)]
struct RoundedSegment {
    start: Vec3,
    end: Vec3,
    radius: f32,
}

enum Core<'a> {
    Rounded(RoundedSegment),
    Box(&'a OrientedBox),
}

fn core_of(shape: &WorldShape) -> Core<'_> {
    match shape {
        WorldShape::Sphere(sphere) => Core::Rounded(RoundedSegment {
            start: sphere.center,
            end: sphere.center,
            radius: sphere.radius,
        }),
        WorldShape::Capsule(capsule) => Core::Rounded(RoundedSegment {
            start: capsule.point0,
            end: capsule.point1,
            radius: capsule.radius,
        }),
        WorldShape::Box(obb) => Core::Box(obb),
    }
}

/// Signed separation between `a` and `b`
pub fn separation(a: &WorldShape, b: &WorldShape) -> Separation {
    let witness = match (core_of(a), core_of(b)) {
        (Core::Rounded(sa), Core::Rounded(sb)) => rounded_rounded(sa, sb, a.center() - b.center()),
        (Core::Rounded(sa), Core::Box(bb)) => rounded_box(sa, bb),
        (Core::Box(ba), Core::Rounded(sb)) => rounded_box(sb, ba).swapped(),
        (Core::Box(ba), Core::Box(bb)) => box_box(ba, bb),
    };
    Separation {
        distance: witness.distance,
        normal: witness.normal,
        point: witness.point_b,
    }
}

/// Check whether two shapes touch or overlap
pub fn overlaps(a: &WorldShape, b: &WorldShape) -> bool {
    separation(a, b).is_overlapping()
}

fn normalize_or(vector: Vec3, fallback: Vec3) -> Vec3 {
    vector.try_normalize(EPSILON).unwrap_or(fallback)
}

fn rounded_rounded(a: RoundedSegment, b: RoundedSegment, center_offset: Vec3) -> Witness {
    let (on_a, on_b) = closest_points_on_segments(a.start, a.end, b.start, b.end);
    let between = on_a - on_b;
    let normal = normalize_or(between, normalize_or(center_offset, Vec3::y()));
    Witness {
        distance: between.magnitude() - a.radius - b.radius,
        normal,
        point_a: on_a - normal * a.radius,
        point_b: on_b + normal * b.radius,
    }
}

/// Closest points between segments `p1..q1` and `p2..q2`
fn closest_points_on_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.dot(&d1);
    let e = d2.dot(&d2);
    let f = d2.dot(&r);

    let (s, t) = if a <= EPSILON && e <= EPSILON {
        (0.0, 0.0)
    } else if a <= EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            let s = if denom > EPSILON { ((b * f - c * e) / denom).clamp(0.0, 1.0) } else { 0.0 };
            let t = (b * s + f) / e;
            if t < 0.0 {
                ((-c / a).clamp(0.0, 1.0), 0.0)
            } else if t > 1.0 {
                (((b - c) / a).clamp(0.0, 1.0), 1.0)
            } else {
                (s, t)
            }
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}

fn rounded_box(segment: RoundedSegment, obb: &OrientedBox) -> Witness {
    let start = obb.to_local(segment.start);
    let end = obb.to_local(segment.end);
    let h = obb.half_extents;
    let at = |t: f32| start + (end - start) * t;
    let distance_at = |t: f32| signed_distance_local(at(t), h);

    // Signed distance to a convex set is convex along a line.
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    if (end - start).magnitude_squared() > EPSILON {
        for _ in 0..SEGMENT_BOX_ITERATIONS {
            let m1 = lo + (hi - lo) / 3.0;
            let m2 = hi - (hi - lo) / 3.0;
            if distance_at(m1) <= distance_at(m2) {
                hi = m2;
            } else {
                lo = m1;
            }
        }
    }
    let local = at((lo + hi) * 0.5);
    let clamped = clamp_to_extents(local, h);
    let outside = local - clamped;

    let (core_distance, local_normal, local_surface) = if outside.magnitude_squared() > EPSILON * EPSILON {
        (outside.magnitude(), outside.normalize(), clamped)
    } else {
        let depth = h - local.abs();
        let axis = depth.imin();
        let sign = if local[axis] < 0.0 { -1.0 } else { 1.0 };
        let mut normal = Vec3::zeros();
        normal[axis] = sign;
        let mut surface = local;
        surface[axis] = sign * h[axis];
        (-depth[axis], normal, surface)
    };

    let normal = obb.rotation * local_normal;
    let core_point = obb.to_world(local);
    Witness {
        distance: core_distance - segment.radius,
        normal,
        point_a: core_point - normal * segment.radius,
        point_b: obb.to_world(local_surface),
    }
}

fn box_box(a: &OrientedBox, b: &OrientedBox) -> Witness {
    let axes_a = a.axes();
    let axes_b = b.axes();
    let offset = a.center - b.center;

    let mut candidates = Vec::with_capacity(15);
    candidates.extend_from_slice(&axes_a);
    candidates.extend_from_slice(&axes_b);
    for edge_a in &axes_a {
        for edge_b in &axes_b {
            candidates.push(edge_a.cross(edge_b));
        }
    }

    let project = |axes: &[Vec3; 3], half: Vec3, axis: &Vec3| -> f32 {
        (0..3).map(|i| half[i] * axes[i].dot(axis).abs()).sum()
    };

    let mut best_gap = f32::NEG_INFINITY;
    let mut best_normal = normalize_or(offset, Vec3::y());
    for candidate in candidates {
        let Some(axis) = candidate.try_normalize(EPSILON) else {
            continue;
        };
        let along = offset.dot(&axis);
        let gap = along.abs() - project(&axes_a, a.half_extents, &axis) - project(&axes_b, b.half_extents, &axis);
        if gap > best_gap {
            best_gap = gap;
            best_normal = if along < 0.0 { -axis } else { axis };
        }
    }

    Witness {
        distance: best_gap,
        normal: best_normal,
        point_a: a.closest_point(b.center),
        point_b: b.closest_point(a.center),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box(center: Vec3) -> WorldShape {
        WorldShape::Box(OrientedBox::new(center, Vec3::repeat(0.5), Quat::identity()))
    }

    fn sphere(center: Vec3, radius: f32) -> WorldShape {
        WorldShape::Sphere(Sphere::new(center, radius))
    }

    #[test]
    fn test_sphere_sphere_distance() {
        let sep = separation(&sphere(Vec3::zeros(), 1.0), &sphere(Vec3::new(3.0, 0.0, 0.0), 1.0));
        assert_relative_eq!(sep.distance, 1.0, epsilon = 1e-5);
        assert_relative_eq!(sep.normal, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(sep.point, Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_concentric_spheres_overlap() {
        let sep = separation(&sphere(Vec3::zeros(), 1.0), &sphere(Vec3::zeros(), 0.5));
        assert!(sep.is_overlapping());
        assert_relative_eq!(sep.normal.magnitude(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_sphere_box_outside_and_inside() {
        let near = separation(&sphere(Vec3::new(2.0, 0.0, 0.0), 1.0), &unit_box(Vec3::zeros()));
        assert_relative_eq!(near.distance, 0.5, epsilon = 1e-4);
        assert_relative_eq!(near.normal, Vec3::x(), epsilon = 1e-4);

        let inside = separation(&sphere(Vec3::new(0.3, 0.0, 0.0), 0.1), &unit_box(Vec3::zeros()));
        assert_relative_eq!(inside.distance, -0.3, epsilon = 1e-4);
        assert_relative_eq!(inside.normal, Vec3::x(), epsilon = 1e-4);
    }

    #[test]
    fn test_capsule_box_uses_closest_segment_point() {
        // Capsule lying along z above the box, lowest point 0.25 above the top face.
        let capsule = WorldShape::Capsule(Capsule::new(
            Vec3::new(0.0, 1.0, -3.0),
            Vec3::new(0.0, 1.0, 3.0),
            0.25,
        ));
        let sep = separation(&capsule, &unit_box(Vec3::zeros()));
        assert_relative_eq!(sep.distance, 0.25, epsilon = 1e-3);
        assert_relative_eq!(sep.normal, Vec3::y(), epsilon = 1e-3);
    }

    #[test]
    fn test_capsule_capsule_crossing() {
        let a = WorldShape::Capsule(Capsule::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 0.2));
        let b = WorldShape::Capsule(Capsule::new(Vec3::new(0.0, 0.5, -1.0), Vec3::new(0.0, 0.5, 1.0), 0.2));
        assert_relative_eq!(separation(&a, &b).distance, 0.1, epsilon = 1e-5);
        assert!(!overlaps(&a, &b));
        assert!(overlaps(&a.inflated(0.15), &b));
    }

    #[test]
    fn test_box_box_sat() {
        assert!(overlaps(&unit_box(Vec3::zeros()), &unit_box(Vec3::new(0.9, 0.0, 0.0))));
        let apart = separation(&unit_box(Vec3::zeros()), &unit_box(Vec3::new(1.5, 0.0, 0.0)));
        assert_relative_eq!(apart.distance, 0.5, epsilon = 1e-5);
        assert_relative_eq!(apart.normal, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);

        // Rotated 45 degrees about y: corner reaches sqrt(0.5) along x.
        let rotated = WorldShape::Box(OrientedBox::new(
            Vec3::new(1.2, 0.0, 0.0),
            Vec3::repeat(0.5),
            Quat::from_euler_angles(0.0, std::f32::consts::FRAC_PI_4, 0.0),
        ));
        assert!(overlaps(&unit_box(Vec3::zeros()), &rotated));
        assert!(!overlaps(&unit_box(Vec3::new(-0.1, 0.0, 0.0)), &rotated.translated(Vec3::new(0.2, 0.0, 0.0))));
    }

    #[test]
    fn test_box_corners_order() {
        let obb = OrientedBox::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, 2.0, 3.0), Quat::identity());
        let corners = obb.corners();
        assert_relative_eq!(corners[0], Vec3::new(2.0, -1.0, 4.0));
        assert_relative_eq!(corners[2], Vec3::new(0.0, -1.0, -2.0));
        assert_relative_eq!(corners[6], Vec3::new(0.0, 3.0, -2.0));
    }

    #[test]
    fn test_bounds_of_rotated_box() {
        let obb = WorldShape::Box(OrientedBox::new(
            Vec3::zeros(),
            Vec3::new(1.0, 1.0, 1.0),
            Quat::from_euler_angles(0.0, 0.0, std::f32::consts::FRAC_PI_4),
        ));
        let bounds = obb.bounds();
        assert_relative_eq!(bounds.max.x, std::f32::consts::SQRT_2, epsilon = 1e-5);
        assert_relative_eq!(bounds.max.z, 1.0, epsilon = 1e-5);
    }
}
