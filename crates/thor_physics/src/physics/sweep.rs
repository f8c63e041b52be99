//! Object-level sweep queries
//!
//! "What would this object hit if it moved along a direction?" Every
//! primitive of the object is swept separately; hits on any node of the
//! object's own hierarchy are dropped, everything else is returned as found.

use std::collections::HashSet;

use log::trace;

use super::aggregate::ColliderAggregate;
use super::backend::{cast_shape_all, PhysicsBackend, SweepHit};
use super::collision_layers::{LayerMask, QueryTriggerInteraction};
use super::overlap::ColliderQueries;
use crate::foundation::math::Vec3;
use crate::scene::{NodeId, SceneNode};

/// Tuning for a sweep query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepParams {
    /// Furthest travel considered; unbounded by default
    pub max_distance: f32,
    /// Layers that can be hit
    pub layer_mask: LayerMask,
    /// Whether trigger colliders can be hit
    pub trigger_interaction: QueryTriggerInteraction,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            max_distance: f32::INFINITY,
            layer_mask: LayerMask::DEFAULT_RAYCAST_LAYERS,
            trigger_interaction: QueryTriggerInteraction::UseGlobal,
        }
    }
}

impl SweepParams {
    /// Limit travel to `max_distance`
    #[must_use]
    pub fn within(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Restrict hits to `layer_mask`
    #[must_use]
    pub fn on_layers(mut self, layer_mask: LayerMask) -> Self {
        self.layer_mask = layer_mask;
        self
    }

    /// Override trigger handling
    #[must_use]
    pub fn with_triggers(mut self, trigger_interaction: QueryTriggerInteraction) -> Self {
        self.trigger_interaction = trigger_interaction;
        self
    }
}

impl<B: PhysicsBackend + ?Sized> ColliderQueries<'_, B> {
    /// Every hit from sweeping each primitive of `target` along `direction`.
    ///
    /// Capsules, then boxes, then spheres; hits are concatenated per
    /// primitive, neither sorted nor deduplicated. Hits on nodes of the
    /// target's own hierarchy are dropped, including nodes without colliders.
    pub fn sweep_all(&self, target: NodeId, direction: Vec3, params: &SweepParams) -> Vec<SweepHit> {
        let Some(root) = self.scene.node(target) else {
            trace!("sweep_all on missing node {:?}", target);
            return Vec::new();
        };
        let own_nodes: HashSet<NodeId> = root.descendants().into_iter().collect();

        let hits: Vec<SweepHit> = ColliderAggregate::of(self.scene, target)
            .iter()
            .filter_map(|id| self.scene.collider_world_shape(id))
            .flat_map(|shape| {
                cast_shape_all(
                    self.backend,
                    &shape,
                    direction,
                    params.max_distance,
                    params.layer_mask,
                    params.trigger_interaction,
                )
            })
            .filter(|hit| !own_nodes.contains(&hit.node))
            .collect();
        trace!("sweep_all({:?}, {:?}) -> {} hits", target, direction, hits.len());
        hits
    }
}

/// Order hits nearest first
pub fn sort_by_distance(hits: &mut [SweepHit]) {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}
