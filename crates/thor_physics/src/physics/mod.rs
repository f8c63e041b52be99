//! Physics queries over scene colliders
//!
//! The [`backend`] answers primitive overlap and sweep questions against the
//! world. On top of it sit the object-level queries: [`overlap`] for "what is
//! this object touching or blocked by", [`sweep`] for "what would this object
//! hit if it moved", and [`contact`] for classifying contacts reported by the
//! host's collision callbacks.

pub mod aggregate;
pub mod backend;
pub mod collision;
pub mod collision_layers;
pub mod contact;
pub mod overlap;
pub mod sweep;

pub use aggregate::{box_world_corners, object_bounds, primitives_of, resolve_ignored, ColliderAggregate};
pub use backend::{cast_shape_all, overlap_shape, ListPhysicsWorld, PhysicsBackend, SweepHit};
pub use collision::{Collider, ColliderShape, WorldShape};
pub use collision_layers::{Layer, LayerMask, QueryTriggerInteraction};
pub use contact::{colliding_this_step, is_obstructing_contact, ContactEvent};
pub use overlap::{ColliderQueries, OverlapParams};
pub use sweep::{sort_by_distance, SweepParams};
