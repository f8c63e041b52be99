//! # Thor Physics
//!
//! Collider overlap and sweep queries for simulated interactive environments.
//!
//! Objects in the scene are hierarchies of nodes carrying primitive colliders
//! (capsules, boxes, spheres). This crate answers the questions an embodied
//! agent's action layer keeps asking about them:
//!
//! - **Is this object obstructed?** [`ColliderQueries::first_colliding`]
//! - **What is it touching?** [`ColliderQueries::all_colliding`]
//! - **What would it hit moving this way?** [`ColliderQueries::sweep_all`]
//!
//! plus the supporting pieces: a slotmap-backed [`SceneTree`], named
//! collision layers, a [`PhysicsBackend`] trait with a linear-search
//! reference world, sim-object classification and receptacle containment,
//! and a lexicographic combination generator for placement search.
//!
//! ## Quick Start
//!
//! ```rust
//! use thor_physics::prelude::*;
//!
//! let mut scene = SceneTree::new();
//! let mug = scene.add_node("Mug", None, Transform::identity()).unwrap();
//! let table = scene
//!     .add_node("Table", None, Transform::from_position(Vec3::new(0.0, -0.5, 0.0)))
//!     .unwrap();
//! scene.set_layer(table, Layer::SIM_OBJ_VISIBLE).unwrap();
//! scene.attach_collider(mug, ColliderShape::sphere(0.1).into());
//! scene.attach_collider(table, ColliderShape::cuboid(Vec3::new(2.0, 0.9, 1.0)).into());
//!
//! let physics = ListPhysicsWorld::capture(&scene, &QuerySettings::default());
//! let queries = ColliderQueries::new(&scene, &physics);
//! assert!(queries.is_colliding(mug, &OverlapParams::default()));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod scene;

#[cfg(test)]
mod tests;

pub use config::{Config, ConfigError, ConfigFormat, QuerySettings};
pub use foundation::collections::{combinations, index_combinations, CombinationError, Combinations, IndexCombinations};
pub use physics::{ColliderQueries, ListPhysicsWorld, OverlapParams, PhysicsBackend, SweepHit, SweepParams};
pub use scene::{ColliderId, NodeId, SceneError, SceneNode, SceneTree};

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{Config, QuerySettings},
        foundation::{
            collections::{combinations, index_combinations},
            math::{Bounds, Quat, Transform, Vec3},
        },
        physics::{
            collision::{Axis, Collider, ColliderShape},
            sort_by_distance, ColliderAggregate, ColliderQueries, Layer, LayerMask, ListPhysicsWorld,
            OverlapParams, PhysicsBackend, QueryTriggerInteraction, SweepHit, SweepParams,
        },
        scene::{
            ColliderId, NodeId, Openable, PrimaryProperty, ReceptacleContents, SceneNode, SceneTree,
            SecondaryProperties, SimObjType, SimObject,
        },
    };
}
