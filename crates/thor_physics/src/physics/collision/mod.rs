//! Collider geometry
//!
//! Colliders are authored in the owning node's local space and transformed to
//! world space on demand when a query runs.
//!
//! # Module Organization
//!
//! - [`primitives`] - World-space sphere, capsule and oriented box plus separation tests
//! - [`shape`] - Local-space collider shapes attached to scene nodes
//!
//! # Key Types
//!
//! - [`ColliderShape`] - Local-space shape stored on a node
//! - [`WorldShape`] - Temporary world-space shape for collision testing
//! - [`Separation`] - Signed distance and contact normal between two shapes

pub mod primitives;
pub mod shape;

pub use primitives::{overlaps, separation, Capsule, OrientedBox, Separation, Sphere, WorldShape};
pub use shape::{Axis, Collider, ColliderShape, PrimitiveKind};
