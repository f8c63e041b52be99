//! Physics backend interface
//!
//! The query layer never touches geometry directly; it asks a
//! [`PhysicsBackend`] for the colliders overlapping a primitive volume, or
//! struck by one swept along a direction. A host engine implements the trait
//! over its own broad phase. [`ListPhysicsWorld`] is the in-crate
//! implementation: a snapshot of the scene's enabled colliders searched
//! linearly, broad phase on bounds, narrow phase on exact separation.

use log::{debug, trace};

use super::collision::primitives::{separation, Capsule, OrientedBox, Sphere, WorldShape};
use super::collision_layers::{Layer, LayerMask, QueryTriggerInteraction};
use crate::config::QuerySettings;
use crate::foundation::math::{Bounds, Vec3};
use crate::scene::{ColliderId, NodeId, SceneTree};

/// One collider struck by a sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Collider that was struck
    pub collider: ColliderId,
    /// Node owning the struck collider
    pub node: NodeId,
    /// Travel along the sweep direction before contact; 0 when overlapping at the start
    pub distance: f32,
    /// Contact point on the struck collider
    pub point: Vec3,
    /// Surface normal of the struck collider at the contact, facing the swept shape
    pub normal: Vec3,
}

/// Primitive overlap and sweep queries against the physics world.
///
/// Disabled colliders are never reported. Results come back in no
/// particular order.
pub trait PhysicsBackend {
    /// Colliders overlapping a sphere
    fn overlap_sphere(
        &self,
        sphere: &Sphere,
        mask: LayerMask,
        triggers: QueryTriggerInteraction,
    ) -> Vec<ColliderId>;

    /// Colliders overlapping a capsule
    fn overlap_capsule(
        &self,
        capsule: &Capsule,
        mask: LayerMask,
        triggers: QueryTriggerInteraction,
    ) -> Vec<ColliderId>;

    /// Colliders overlapping an oriented box
    fn overlap_box(
        &self,
        obb: &OrientedBox,
        mask: LayerMask,
        triggers: QueryTriggerInteraction,
    ) -> Vec<ColliderId>;

    /// Every collider a sphere strikes moving along `direction`
    fn sphere_cast_all(
        &self,
        sphere: &Sphere,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
        triggers: QueryTriggerInteraction,
    ) -> Vec<SweepHit>;

    /// Every collider a capsule strikes moving along `direction`
    fn capsule_cast_all(
        &self,
        capsule: &Capsule,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
        triggers: QueryTriggerInteraction,
    ) -> Vec<SweepHit>;

    /// Every collider an oriented box strikes moving along `direction`
    fn box_cast_all(
        &self,
        obb: &OrientedBox,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
        triggers: QueryTriggerInteraction,
    ) -> Vec<SweepHit>;
}

/// Overlap through whichever backend call matches the shape
pub fn overlap_shape<B: PhysicsBackend + ?Sized>(
    backend: &B,
    shape: &WorldShape,
    mask: LayerMask,
    triggers: QueryTriggerInteraction,
) -> Vec<ColliderId> {
    match shape {
        WorldShape::Sphere(sphere) => backend.overlap_sphere(sphere, mask, triggers),
        WorldShape::Capsule(capsule) => backend.overlap_capsule(capsule, mask, triggers),
        WorldShape::Box(obb) => backend.overlap_box(obb, mask, triggers),
    }
}

/// Sweep through whichever backend call matches the shape
pub fn cast_shape_all<B: PhysicsBackend + ?Sized>(
    backend: &B,
    shape: &WorldShape,
    direction: Vec3,
    max_distance: f32,
    mask: LayerMask,
    triggers: QueryTriggerInteraction,
) -> Vec<SweepHit> {
    match shape {
        WorldShape::Sphere(sphere) => backend.sphere_cast_all(sphere, direction, max_distance, mask, triggers),
        WorldShape::Capsule(capsule) => backend.capsule_cast_all(capsule, direction, max_distance, mask, triggers),
        WorldShape::Box(obb) => backend.box_cast_all(obb, direction, max_distance, mask, triggers),
    }
}

#[derive(Debug, Clone)]
struct WorldEntry {
    collider: ColliderId,
    node: NodeId,
    layer: Layer,
    is_trigger: bool,
    shape: WorldShape,
    bounds: Bounds,
}

#[derive(Debug, Clone, Copy)]
struct Impact {
    distance: f32,
    point: Vec3,
    normal: Vec3,
}

/// Linear-search backend over a snapshot of a [`SceneTree`].
///
/// The snapshot is taken by [`ListPhysicsWorld::capture`]; later scene edits
/// are not seen until the world is captured again.
#[derive(Debug, Clone)]
pub struct ListPhysicsWorld {
    entries: Vec<WorldEntry>,
    queries_hit_triggers: bool,
    max_iterations: u32,
    contact_tolerance: f32,
}

impl ListPhysicsWorld {
    /// Snapshot every enabled collider of `scene` in world space
    pub fn capture(scene: &SceneTree, settings: &QuerySettings) -> Self {
        let entries: Vec<WorldEntry> = scene
            .colliders()
            .filter(|(_, _, collider)| collider.enabled)
            .filter_map(|(id, node, collider)| {
                let transform = scene.world_transform(node)?;
                let shape = collider.shape.to_world_space(&transform);
                Some(WorldEntry {
                    collider: id,
                    node,
                    layer: scene.node(node)?.layer(),
                    is_trigger: collider.is_trigger,
                    bounds: shape.bounds(),
                    shape,
                })
            })
            .collect();

        debug!("Captured physics world with {} enabled colliders", entries.len());
        Self {
            entries,
            queries_hit_triggers: settings.queries_hit_triggers,
            max_iterations: settings.sweep_max_iterations,
            contact_tolerance: settings.contact_tolerance,
        }
    }

    /// Number of colliders in the snapshot
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the snapshot holds no colliders
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn candidates(&self, mask: LayerMask, triggers: QueryTriggerInteraction) -> impl Iterator<Item = &WorldEntry> + '_ {
        let hit_triggers = triggers.hits_triggers(self.queries_hit_triggers);
        self.entries
            .iter()
            .filter(move |entry| mask.contains_layer(entry.layer) && (hit_triggers || !entry.is_trigger))
    }

    fn overlap(&self, shape: &WorldShape, mask: LayerMask, triggers: QueryTriggerInteraction) -> Vec<ColliderId> {
        let query_bounds = shape.bounds();
        let hits: Vec<ColliderId> = self
            .candidates(mask, triggers)
            .filter(|entry| query_bounds.intersects(&entry.bounds))
            .filter(|entry| separation(shape, &entry.shape).is_overlapping())
            .map(|entry| entry.collider)
            .collect();
        trace!("Overlap {:?} -> {} hits", shape, hits.len());
        hits
    }

    /// Conservative advancement: step forward by the current gap until
    /// touching, past `max_distance`, or out of iterations.
    fn time_of_impact(
        &self,
        shape: &WorldShape,
        direction: Vec3,
        max_distance: f32,
        target: &WorldShape,
    ) -> Option<Impact> {
        let mut travelled = 0.0_f32;
        for _ in 0..self.max_iterations {
            let moved = shape.translated(direction * travelled);
            let gap = separation(&moved, target);
            if gap.distance <= self.contact_tolerance {
                let normal = if travelled == 0.0 && gap.distance < 0.0 { -direction } else { gap.normal };
                return Some(Impact { distance: travelled, point: gap.point, normal });
            }
            travelled += gap.distance;
            if travelled > max_distance {
                return None;
            }
        }
        None
    }

    fn cast_all(
        &self,
        shape: &WorldShape,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
        triggers: QueryTriggerInteraction,
    ) -> Vec<SweepHit> {
        let Some(direction) = direction.try_normalize(f32::EPSILON) else {
            debug!("Sweep with zero direction ignored");
            return Vec::new();
        };

        let swept_bounds = max_distance.is_finite().then(|| {
            let mut bounds = shape.bounds();
            bounds.encapsulate(&shape.translated(direction * max_distance).bounds());
            bounds
        });

        let hits: Vec<SweepHit> = self
            .candidates(mask, triggers)
            .filter(|entry| swept_bounds.map_or(true, |bounds| bounds.intersects(&entry.bounds)))
            .filter_map(|entry| {
                self.time_of_impact(shape, direction, max_distance, &entry.shape)
                    .map(|impact| SweepHit {
                        collider: entry.collider,
                        node: entry.node,
                        distance: impact.distance,
                        point: impact.point,
                        normal: impact.normal,
                    })
            })
            .collect();
        trace!("Sweep {:?} along {:?} -> {} hits", shape, direction, hits.len());
        hits
    }
}

impl PhysicsBackend for ListPhysicsWorld {
    fn overlap_sphere(&self, sphere: &Sphere, mask: LayerMask, triggers: QueryTriggerInteraction) -> Vec<ColliderId> {
        self.overlap(&WorldShape::Sphere(*sphere), mask, triggers)
    }

    fn overlap_capsule(
        &self,
        capsule: &Capsule,
        mask: LayerMask,
        triggers: QueryTriggerInteraction,
    ) -> Vec<ColliderId> {
        self.overlap(&WorldShape::Capsule(*capsule), mask, triggers)
    }

    fn overlap_box(&self, obb: &OrientedBox, mask: LayerMask, triggers: QueryTriggerInteraction) -> Vec<ColliderId> {
        self.overlap(&WorldShape::Box(*obb), mask, triggers)
    }

    fn sphere_cast_all(
        &self,
        sphere: &Sphere,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
        triggers: QueryTriggerInteraction,
    ) -> Vec<SweepHit> {
        self.cast_all(&WorldShape::Sphere(*sphere), direction, max_distance, mask, triggers)
    }

    fn capsule_cast_all(
        &self,
        capsule: &Capsule,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
        triggers: QueryTriggerInteraction,
    ) -> Vec<SweepHit> {
        self.cast_all(&WorldShape::Capsule(*capsule), direction, max_distance, mask, triggers)
    }

    fn box_cast_all(
        &self,
        obb: &OrientedBox,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
        triggers: QueryTriggerInteraction,
    ) -> Vec<SweepHit> {
        self.cast_all(&WorldShape::Box(*obb), direction, max_distance, mask, triggers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Transform};
    use crate::physics::collision::{Collider, ColliderShape};
    use approx::assert_relative_eq;

    struct World {
        scene: SceneTree,
        wall: ColliderId,
        trigger: ColliderId,
        hidden: ColliderId,
    }

    fn world() -> World {
        let mut scene = SceneTree::new();
        let wall_node = scene
            .add_node("Wall", None, Transform::from_position(Vec3::new(5.0, 0.0, 0.0)))
            .unwrap();
        scene.set_layer(wall_node, Layer::SIM_OBJ_VISIBLE).unwrap();
        let wall = scene
            .attach_collider(wall_node, ColliderShape::cuboid(Vec3::new(1.0, 4.0, 4.0)).into())
            .unwrap();

        let zone = scene.add_node("Zone", None, Transform::identity()).unwrap();
        scene.set_layer(zone, Layer::SIM_OBJ_VISIBLE).unwrap();
        let trigger = scene
            .attach_collider(zone, Collider::new(ColliderShape::sphere(1.0)).trigger())
            .unwrap();

        let helper = scene.add_node("Helper", None, Transform::identity()).unwrap();
        scene.set_layer(helper, Layer::IGNORE_RAYCAST).unwrap();
        let hidden = scene.attach_collider(helper, ColliderShape::sphere(1.0).into()).unwrap();

        World { scene, wall, trigger, hidden }
    }

    #[test]
    fn test_overlap_respects_mask_and_triggers() {
        let w = world();
        let physics = ListPhysicsWorld::capture(&w.scene, &QuerySettings::default());
        let probe = Sphere::new(Vec3::zeros(), 0.5);

        let everything = physics.overlap_sphere(&probe, LayerMask::EVERYTHING, QueryTriggerInteraction::Collide);
        assert_eq!(everything, vec![w.trigger, w.hidden]);

        let solid = physics.overlap_sphere(&probe, LayerMask::EVERYTHING, QueryTriggerInteraction::Ignore);
        assert_eq!(solid, vec![w.hidden]);

        let visible = physics.overlap_sphere(&probe, LayerMask::DEFAULT_RAYCAST_LAYERS, QueryTriggerInteraction::UseGlobal);
        assert_eq!(visible, vec![w.trigger]);
    }

    #[test]
    fn test_disabled_colliders_are_not_captured() {
        let mut w = world();
        w.scene.set_collider_enabled(w.hidden, false);
        let physics = ListPhysicsWorld::capture(&w.scene, &QuerySettings::default());
        assert_eq!(physics.len(), 2);
        let probe = OrientedBox::new(Vec3::zeros(), Vec3::repeat(0.5), Quat::identity());
        assert!(!physics
            .overlap_box(&probe, LayerMask::EVERYTHING, QueryTriggerInteraction::Ignore)
            .contains(&w.hidden));
    }

    #[test]
    fn test_sphere_cast_distance_and_normal() {
        let w = world();
        let physics = ListPhysicsWorld::capture(&w.scene, &QuerySettings::default());
        let ball = Sphere::new(Vec3::new(0.0, 0.0, 0.0), 0.5);

        let hits = physics.sphere_cast_all(
            &ball,
            Vec3::new(2.0, 0.0, 0.0),
            f32::INFINITY,
            LayerMask::SIM_OBJ_VISIBLE,
            QueryTriggerInteraction::Ignore,
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].collider, w.wall);
        // Wall face at x = 4.5, sphere front at x = 0.5.
        assert_relative_eq!(hits[0].distance, 4.0, epsilon = 1e-3);
        assert_relative_eq!(hits[0].normal, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-3);
    }

    #[test]
    fn test_cast_respects_max_distance() {
        let w = world();
        let physics = ListPhysicsWorld::capture(&w.scene, &QuerySettings::default());
        let ball = Sphere::new(Vec3::zeros(), 0.5);
        let short = physics.sphere_cast_all(
            &ball,
            Vec3::x(),
            3.0,
            LayerMask::SIM_OBJ_VISIBLE,
            QueryTriggerInteraction::Ignore,
        );
        assert!(short.is_empty());
    }

    #[test]
    fn test_initial_overlap_reports_zero_distance() {
        let w = world();
        let physics = ListPhysicsWorld::capture(&w.scene, &QuerySettings::default());
        let capsule = Capsule::new(Vec3::new(0.0, -0.5, 0.0), Vec3::new(0.0, 0.5, 0.0), 0.25);
        let hits = physics.capsule_cast_all(
            &capsule,
            Vec3::z(),
            10.0,
            LayerMask::SIM_OBJ_VISIBLE,
            QueryTriggerInteraction::Collide,
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].collider, w.trigger);
        assert_eq!(hits[0].distance, 0.0);
        assert_relative_eq!(hits[0].normal, -Vec3::z());
    }

    #[test]
    fn test_zero_direction_returns_nothing() {
        let w = world();
        let physics = ListPhysicsWorld::capture(&w.scene, &QuerySettings::default());
        let probe = OrientedBox::new(Vec3::zeros(), Vec3::repeat(0.1), Quat::identity());
        let hits = physics.box_cast_all(&probe, Vec3::zeros(), 1.0, LayerMask::EVERYTHING, QueryTriggerInteraction::Collide);
        assert!(hits.is_empty());
    }
}
