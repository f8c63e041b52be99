//! Per-object collider enumeration
//!
//! Objects are hierarchies: a table's legs and top are separate child nodes,
//! each with its own colliders. Every object-level query starts by gathering
//! the primitives of the whole hierarchy, grouped by kind.

use std::collections::HashSet;

use log::debug;

use super::collision::{PrimitiveKind, WorldShape};
use crate::foundation::math::{Bounds, Vec3};
use crate::scene::{ColliderId, NodeId, SceneNode, SceneTree};

/// Every primitive collider of a node and its descendants, grouped by kind.
///
/// Within each group colliders appear in depth-first pre-order of their
/// owning nodes, then in attachment order. Trigger and disabled colliders
/// are included; filtering is up to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColliderAggregate {
    /// Capsule colliders
    pub capsules: Vec<ColliderId>,
    /// Box colliders
    pub boxes: Vec<ColliderId>,
    /// Sphere colliders
    pub spheres: Vec<ColliderId>,
}

impl ColliderAggregate {
    /// Gather the primitives under `node`; empty for a missing node
    pub fn of(scene: &SceneTree, node: NodeId) -> Self {
        let mut aggregate = Self::default();
        let Some(root) = scene.node(node) else {
            debug!("Collider aggregate requested for missing node {:?}", node);
            return aggregate;
        };

        for id in root.primitive_colliders() {
            let Some(collider) = scene.collider(id) else {
                continue;
            };
            match collider.shape.kind() {
                PrimitiveKind::Capsule => aggregate.capsules.push(id),
                PrimitiveKind::Box => aggregate.boxes.push(id),
                PrimitiveKind::Sphere => aggregate.spheres.push(id),
            }
        }
        aggregate
    }

    /// Capsules, then boxes, then spheres
    pub fn iter(&self) -> impl Iterator<Item = ColliderId> + '_ {
        self.capsules
            .iter()
            .chain(&self.boxes)
            .chain(&self.spheres)
            .copied()
    }

    /// Total number of primitives
    pub fn len(&self) -> usize {
        self.capsules.len() + self.boxes.len() + self.spheres.len()
    }

    /// True when the hierarchy has no colliders
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Gather the primitives under `node`
pub fn primitives_of(scene: &SceneTree, node: NodeId) -> ColliderAggregate {
    ColliderAggregate::of(scene, node)
}

/// Colliders an overlap query must not report: everything under `target`
/// plus everything under each node of `extra`.
pub fn resolve_ignored(scene: &SceneTree, target: NodeId, extra: &[NodeId]) -> HashSet<ColliderId> {
    std::iter::once(target)
        .chain(extra.iter().copied())
        .filter_map(|node| scene.node(node))
        .flat_map(|node| node.primitive_colliders())
        .collect()
}

/// True when the collider is a box owned by a node named `marker`
pub(crate) fn is_bounding_box_marker(scene: &SceneTree, collider: ColliderId, marker: &str) -> bool {
    scene
        .collider(collider)
        .is_some_and(|c| c.shape.kind() == PrimitiveKind::Box)
        && scene.collider_name(collider) == Some(marker)
}

/// World AABB of every enabled, solid, non-marker collider under `node`.
///
/// `None` when nothing qualifies.
pub fn object_bounds(scene: &SceneTree, node: NodeId, marker: &str) -> Option<Bounds> {
    let bounds = ColliderAggregate::of(scene, node)
        .iter()
        .filter(|&id| scene.collider(id).is_some_and(|c| c.enabled && !c.is_trigger))
        .filter(|&id| !is_bounding_box_marker(scene, id, marker))
        .filter_map(|id| scene.collider_world_shape(id))
        .fold(Bounds::empty(), |mut acc, shape| {
            acc.encapsulate(&shape.bounds());
            acc
        });
    (!bounds.is_empty()).then_some(bounds)
}

/// World-space corners of a box collider; `None` for other shapes.
///
/// Order: bottom face (+x+z, -x+z, -x-z, +x-z) then the top face in the
/// same winding.
pub fn box_world_corners(scene: &SceneTree, collider: ColliderId) -> Option<[Vec3; 8]> {
    match scene.collider_world_shape(collider)? {
        WorldShape::Box(obb) => Some(obb.corners()),
        _ => None,
    }
}
