//! Object-level overlap queries
//!
//! "Is anything blocking this object?" and "what is this object touching?"
//! are answered by issuing one backend overlap per primitive of the object's
//! hierarchy, capsules first, then boxes, then spheres, and discarding hits
//! on the object itself and on caller-supplied ignored objects.

use std::collections::HashSet;

use log::trace;

use super::aggregate::{is_bounding_box_marker, resolve_ignored, ColliderAggregate};
use super::backend::{overlap_shape, PhysicsBackend};
use super::collision::WorldShape;
use super::collision_layers::{LayerMask, QueryTriggerInteraction};
use crate::config::QuerySettings;
use crate::scene::{ColliderId, NodeId, SceneTree};

/// Tuning for a single overlap query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapParams<'a> {
    /// Objects whose colliders (and their descendants') are never reported
    pub ignore: &'a [NodeId],
    /// Margin added to every query volume
    pub expand_by: f32,
    /// Also use bounding-box marker colliders as query volumes
    pub use_bounding_box_in_checks: bool,
}

impl Default for OverlapParams<'_> {
    fn default() -> Self {
        Self {
            ignore: &[],
            expand_by: 0.0,
            use_bounding_box_in_checks: false,
        }
    }
}

impl<'a> OverlapParams<'a> {
    /// Ignore these objects as well as the target
    #[must_use]
    pub fn ignoring(mut self, ignore: &'a [NodeId]) -> Self {
        self.ignore = ignore;
        self
    }

    /// Inflate every query volume by `margin`
    #[must_use]
    pub fn expanded_by(mut self, margin: f32) -> Self {
        self.expand_by = margin;
        self
    }

    /// Include bounding-box markers as query volumes
    #[must_use]
    pub fn with_bounding_box(mut self, enabled: bool) -> Self {
        self.use_bounding_box_in_checks = enabled;
        self
    }
}

/// Object-level overlap and sweep queries over a scene and a backend.
///
/// Holds only borrowed state and resolved masks; cheap to build per query
/// batch.
#[derive(Debug)]
pub struct ColliderQueries<'a, B: PhysicsBackend + ?Sized> {
    pub(crate) scene: &'a SceneTree,
    pub(crate) backend: &'a B,
    obstruction_mask: LayerMask,
    contact_mask: LayerMask,
    bounding_box_marker: String,
}

impl<'a, B: PhysicsBackend + ?Sized> ColliderQueries<'a, B> {
    /// Queries with the default layer masks and marker name
    pub fn new(scene: &'a SceneTree, backend: &'a B) -> Self {
        Self::with_settings(scene, backend, &QuerySettings::default())
    }

    /// Queries using masks and marker name from `settings`
    pub fn with_settings(scene: &'a SceneTree, backend: &'a B, settings: &QuerySettings) -> Self {
        Self {
            scene,
            backend,
            obstruction_mask: settings.obstruction_mask(),
            contact_mask: settings.contact_mask(),
            bounding_box_marker: settings.bounding_box_marker.clone(),
        }
    }

    /// Solid primitives of an aggregate as inflated world-space query volumes
    fn query_volumes(&self, aggregate: &ColliderAggregate, params: &OverlapParams<'_>) -> Vec<WorldShape> {
        aggregate
            .iter()
            .filter(|&id| self.scene.collider(id).is_some_and(|collider| !collider.is_trigger))
            .filter(|&id| {
                params.use_bounding_box_in_checks
                    || !is_bounding_box_marker(self.scene, id, &self.bounding_box_marker)
            })
            .filter_map(|id| self.scene.collider_world_shape(id))
            .map(|shape| if params.expand_by == 0.0 { shape } else { shape.inflated(params.expand_by) })
            .collect()
    }

    /// First collider blocking `target`, or `None`.
    ///
    /// Searches the obstruction layers, ignores trigger colliders in the
    /// world, and stops at the first primitive that finds a hit.
    pub fn first_colliding(&self, target: NodeId, params: &OverlapParams<'_>) -> Option<ColliderId> {
        let ignored = resolve_ignored(self.scene, target, params.ignore);
        let aggregate = ColliderAggregate::of(self.scene, target);

        let hit = self.query_volumes(&aggregate, params).into_iter().find_map(|volume| {
            overlap_shape(self.backend, &volume, self.obstruction_mask, QueryTriggerInteraction::Ignore)
                .into_iter()
                .find(|hit| !ignored.contains(hit))
        });
        trace!("first_colliding({:?}) -> {:?}", target, hit);
        hit
    }

    /// Every collider touching `target`, without repeats, in the order found.
    ///
    /// Same volumes as [`Self::first_colliding`] but searches the contact
    /// layers and never stops early.
    pub fn all_colliding(&self, target: NodeId, params: &OverlapParams<'_>) -> Vec<ColliderId> {
        let ignored = resolve_ignored(self.scene, target, params.ignore);
        let aggregate = ColliderAggregate::of(self.scene, target);

        let mut seen = HashSet::new();
        let mut touching = Vec::new();
        for volume in self.query_volumes(&aggregate, params) {
            for hit in overlap_shape(self.backend, &volume, self.contact_mask, QueryTriggerInteraction::Ignore) {
                if !ignored.contains(&hit) && seen.insert(hit) {
                    touching.push(hit);
                }
            }
        }
        trace!("all_colliding({:?}) -> {} colliders", target, touching.len());
        touching
    }

    /// True when anything blocks `target`
    pub fn is_colliding(&self, target: NodeId, params: &OverlapParams<'_>) -> bool {
        self.first_colliding(target, params).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Transform, Vec3};
    use crate::physics::backend::ListPhysicsWorld;
    use crate::physics::collision::{Collider, ColliderShape};
    use crate::physics::collision_layers::Layer;

    fn node(scene: &mut SceneTree, name: &str, x: f32, layer: Layer) -> NodeId {
        let id = scene
            .add_node(name, None, Transform::from_position(Vec3::new(x, 0.0, 0.0)))
            .unwrap();
        scene.set_layer(id, layer).unwrap();
        id
    }

    #[test]
    fn test_target_never_collides_with_itself() {
        let mut scene = SceneTree::new();
        let mug = node(&mut scene, "Mug", 0.0, Layer::SIM_OBJ_VISIBLE);
        scene.attach_collider(mug, ColliderShape::sphere(0.5).into());
        scene.attach_collider(mug, ColliderShape::cuboid(Vec3::repeat(0.8)).into());

        let physics = ListPhysicsWorld::capture(&scene, &QuerySettings::default());
        let queries = ColliderQueries::new(&scene, &physics);
        assert_eq!(queries.first_colliding(mug, &OverlapParams::default()), None);
        assert!(queries.all_colliding(mug, &OverlapParams::default()).is_empty());
    }

    #[test]
    fn test_expand_by_reaches_nearby_object() {
        let mut scene = SceneTree::new();
        let mug = node(&mut scene, "Mug", 0.0, Layer::SIM_OBJ_VISIBLE);
        let plate = node(&mut scene, "Plate", 1.2, Layer::SIM_OBJ_VISIBLE);
        scene.attach_collider(mug, ColliderShape::sphere(0.5).into());
        let plate_collider = scene.attach_collider(plate, ColliderShape::sphere(0.5).into()).unwrap();

        let physics = ListPhysicsWorld::capture(&scene, &QuerySettings::default());
        let queries = ColliderQueries::new(&scene, &physics);
        assert!(!queries.is_colliding(mug, &OverlapParams::default()));
        assert_eq!(
            queries.first_colliding(mug, &OverlapParams::default().expanded_by(0.25)),
            Some(plate_collider)
        );
    }

    #[test]
    fn test_obstruction_and_contact_masks_differ() {
        let mut scene = SceneTree::new();
        let mug = node(&mut scene, "Mug", 0.0, Layer::SIM_OBJ_VISIBLE);
        let floor = node(&mut scene, "Floor", 0.0, Layer::PROCEDURAL0);
        scene.attach_collider(mug, ColliderShape::sphere(0.5).into());
        let floor_collider = scene
            .attach_collider(floor, ColliderShape::cuboid(Vec3::new(10.0, 0.2, 10.0)).into())
            .unwrap();

        let physics = ListPhysicsWorld::capture(&scene, &QuerySettings::default());
        let queries = ColliderQueries::new(&scene, &physics);
        assert_eq!(queries.first_colliding(mug, &OverlapParams::default()), Some(floor_collider));
        assert!(queries.all_colliding(mug, &OverlapParams::default()).is_empty());
    }

    #[test]
    fn test_world_triggers_are_ignored() {
        let mut scene = SceneTree::new();
        let mug = node(&mut scene, "Mug", 0.0, Layer::SIM_OBJ_VISIBLE);
        let zone = node(&mut scene, "Zone", 0.0, Layer::SIM_OBJ_VISIBLE);
        scene.attach_collider(mug, ColliderShape::sphere(0.5).into());
        scene.attach_collider(zone, Collider::new(ColliderShape::sphere(2.0)).trigger());

        let physics = ListPhysicsWorld::capture(&scene, &QuerySettings::default());
        let queries = ColliderQueries::new(&scene, &physics);
        assert!(!queries.is_colliding(mug, &OverlapParams::default()));
    }

    #[test]
    fn test_ignore_list_excludes_hierarchy() {
        let mut scene = SceneTree::new();
        let mug = node(&mut scene, "Mug", 0.0, Layer::SIM_OBJ_VISIBLE);
        let table = node(&mut scene, "Table", 0.0, Layer::SIM_OBJ_VISIBLE);
        let leg = scene.add_node("Leg", Some(table), Transform::identity()).unwrap();
        scene.set_layer(leg, Layer::SIM_OBJ_VISIBLE).unwrap();
        scene.attach_collider(mug, ColliderShape::sphere(0.5).into());
        scene.attach_collider(leg, ColliderShape::sphere(0.5).into());

        let physics = ListPhysicsWorld::capture(&scene, &QuerySettings::default());
        let queries = ColliderQueries::new(&scene, &physics);
        let ignore = [table];
        assert!(queries.is_colliding(mug, &OverlapParams::default()));
        assert!(!queries.is_colliding(mug, &OverlapParams::default().ignoring(&ignore)));
    }

    #[test]
    fn test_missing_target_reports_nothing() {
        let mut scene = SceneTree::new();
        let ghost = node(&mut scene, "Ghost", 0.0, Layer::DEFAULT);
        let physics = ListPhysicsWorld::capture(&scene, &QuerySettings::default());
        let other_scene = SceneTree::new();
        let queries = ColliderQueries::new(&other_scene, &physics);
        assert_eq!(queries.first_colliding(ghost, &OverlapParams::default()), None);
        assert!(queries.all_colliding(ghost, &OverlapParams::default()).is_empty());
    }
}
