//! Scene management
//!
//! The [`SceneTree`] owns every node, collider and node component. Queries
//! borrow it immutably; building and editing the scene takes `&mut`.

mod scene_graph;
pub mod sim_object;

pub use scene_graph::{
    ColliderId, ComponentRegistries, NodeComponent, NodeId, NodeRef, SceneError, SceneNode, SceneTree,
};
pub use sim_object::{
    contained_objects, contained_unique_ids, is_open, is_openable, ContainedObjects, Openable,
    PrimaryProperty, ReceptacleContents, SecondaryProperties, SimObjType, SimObject,
};
