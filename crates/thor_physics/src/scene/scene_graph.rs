//! Scene hierarchy
//!
//! Nodes live in a slotmap arena keyed by [`NodeId`]; colliders live in a
//! second arena keyed by [`ColliderId`] and remember their owning node.
//! Per-node components are stored in typed registries reached through the
//! [`NodeComponent`] trait, so "does this node have a `SimObject`" is a map
//! lookup, not a type inspection.

use slotmap::{SecondaryMap, SlotMap};

use super::sim_object::{Openable, ReceptacleContents, SimObject};
use crate::foundation::math::Transform;
use crate::physics::collision::{Collider, WorldShape};
use crate::physics::collision_layers::Layer;

slotmap::new_key_type! {
    /// Handle to a node in a [`SceneTree`]
    pub struct NodeId;

    /// Handle to a collider attached to a node
    pub struct ColliderId;
}

/// Scene construction errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Handle does not refer to a live node
    #[error("Unknown node handle: {0:?}")]
    UnknownNode(NodeId),

    /// Description references a parent that was never declared
    #[error("Node '{node}' references unknown parent '{parent}'")]
    UnknownParent {
        /// Node being declared
        node: String,
        /// Missing parent name
        parent: String,
    },

    /// Description uses a layer name that does not exist
    #[error("Unknown layer name: {0}")]
    UnknownLayer(String),

    /// Description declares the same node name twice
    #[error("Duplicate node name: {0}")]
    DuplicateName(String),
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    tag: String,
    layer: Layer,
    local: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    colliders: Vec<ColliderId>,
}

#[derive(Debug, Clone)]
struct AttachedCollider {
    owner: NodeId,
    collider: Collider,
}

/// One registry per component type
#[derive(Debug, Default)]
pub struct ComponentRegistries {
    pub(crate) sim_objects: SecondaryMap<NodeId, SimObject>,
    pub(crate) openables: SecondaryMap<NodeId, Openable>,
    pub(crate) receptacle_contents: SecondaryMap<NodeId, ReceptacleContents>,
}

/// Data that can be attached to a node, one instance per node and type
pub trait NodeComponent: Sized + 'static {
    /// Registry holding this component type
    #[doc(hidden)]
    fn registry(components: &ComponentRegistries) -> &SecondaryMap<NodeId, Self>;

    /// Mutable registry holding this component type
    #[doc(hidden)]
    fn registry_mut(components: &mut ComponentRegistries) -> &mut SecondaryMap<NodeId, Self>;
}

/// Tree of named, tagged, layered nodes carrying colliders and components
#[derive(Debug, Default)]
pub struct SceneTree {
    nodes: SlotMap<NodeId, Node>,
    roots: Vec<NodeId>,
    colliders: SlotMap<ColliderId, AttachedCollider>,
    components: ComponentRegistries,
}

impl SceneTree {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under `parent` (or as a root), untagged on the default layer
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        local: Transform,
    ) -> Result<NodeId, SceneError> {
        if let Some(parent) = parent {
            if !self.nodes.contains_key(parent) {
                return Err(SceneError::UnknownNode(parent));
            }
        }

        let id = self.nodes.insert(Node {
            name: name.into(),
            tag: "Untagged".to_string(),
            layer: Layer::DEFAULT,
            local,
            parent,
            children: Vec::new(),
            colliders: Vec::new(),
        });

        match parent.and_then(|parent| self.nodes.get_mut(parent)) {
            Some(parent_node) => parent_node.children.push(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))
    }

    /// Put a node on a layer
    pub fn set_layer(&mut self, id: NodeId, layer: Layer) -> Result<(), SceneError> {
        self.node_mut(id)?.layer = layer;
        Ok(())
    }

    /// Set a node's tag
    pub fn set_tag(&mut self, id: NodeId, tag: impl Into<String>) -> Result<(), SceneError> {
        self.node_mut(id)?.tag = tag.into();
        Ok(())
    }

    /// Replace a node's transform relative to its parent
    pub fn set_local_transform(&mut self, id: NodeId, local: Transform) -> Result<(), SceneError> {
        self.node_mut(id)?.local = local;
        Ok(())
    }

    /// Borrow a node
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.nodes.contains_key(id).then_some(NodeRef { tree: self, id })
    }

    /// Check whether a handle refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Top-level nodes in insertion order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the scene has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node in depth-first pre-order, roots in insertion order
    pub fn walk(&self) -> Vec<NodeId> {
        self.roots.iter().flat_map(|&root| self.preorder(root)).collect()
    }

    /// First node with the given name in [`SceneTree::walk`] order
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.walk().into_iter().find(|&id| self.nodes[id].name == name)
    }

    fn preorder(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            order.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// Compose local transforms from the root down to `id`
    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.nodes.get(node_id)?;
            chain.push(node.local);
            current = node.parent;
        }
        Some(
            chain
                .iter()
                .rev()
                .fold(Transform::identity(), |world, local| world.combine(local)),
        )
    }

    /// Attach a collider to a node; `None` when the node does not exist
    pub fn attach_collider(&mut self, owner: NodeId, collider: Collider) -> Option<ColliderId> {
        if !self.nodes.contains_key(owner) {
            log::debug!("Cannot attach collider to missing node {:?}", owner);
            return None;
        }
        let id = self.colliders.insert(AttachedCollider { owner, collider });
        self.nodes[owner].colliders.push(id);
        Some(id)
    }

    /// Attach an independent copy of `collider` to a node
    pub fn attach_collider_copy(&mut self, owner: NodeId, collider: &Collider) -> Option<ColliderId> {
        self.attach_collider(owner, collider.clone())
    }

    /// Enable or disable a collider; returns false for a dead handle
    pub fn set_collider_enabled(&mut self, id: ColliderId, enabled: bool) -> bool {
        match self.colliders.get_mut(id) {
            Some(attached) => {
                attached.collider.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Borrow a collider
    pub fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(id).map(|attached| &attached.collider)
    }

    /// Node a collider is attached to
    pub fn collider_owner(&self, id: ColliderId) -> Option<NodeId> {
        self.colliders.get(id).map(|attached| attached.owner)
    }

    /// A collider's identity name: the name of its owning node
    pub fn collider_name(&self, id: ColliderId) -> Option<&str> {
        let owner = self.collider_owner(id)?;
        self.nodes.get(owner).map(|node| node.name.as_str())
    }

    /// Layer of a collider's owning node
    pub fn collider_layer(&self, id: ColliderId) -> Option<Layer> {
        let owner = self.collider_owner(id)?;
        self.nodes.get(owner).map(|node| node.layer)
    }

    /// A collider resolved into world space
    pub fn collider_world_shape(&self, id: ColliderId) -> Option<WorldShape> {
        let attached = self.colliders.get(id)?;
        let transform = self.world_transform(attached.owner)?;
        Some(attached.collider.shape.to_world_space(&transform))
    }

    /// Every attached collider with its owner, in attachment order
    pub fn colliders(&self) -> impl Iterator<Item = (ColliderId, NodeId, &Collider)> + '_ {
        self.colliders
            .iter()
            .map(|(id, attached)| (id, attached.owner, &attached.collider))
    }

    /// Attach a component, returning the one it replaces
    pub fn insert_component<T: NodeComponent>(&mut self, id: NodeId, component: T) -> Option<T> {
        if !self.nodes.contains_key(id) {
            log::debug!("Cannot attach component to missing node {:?}", id);
            return None;
        }
        T::registry_mut(&mut self.components).insert(id, component)
    }

    /// Borrow a node's component of type `T`
    pub fn component<T: NodeComponent>(&self, id: NodeId) -> Option<&T> {
        T::registry(&self.components).get(id)
    }

    /// Mutably borrow a node's component of type `T`
    pub fn component_mut<T: NodeComponent>(&mut self, id: NodeId) -> Option<&mut T> {
        T::registry_mut(&mut self.components).get_mut(id)
    }

    /// Every node carrying a component of type `T`
    pub fn nodes_with<T: NodeComponent>(&self) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        T::registry(&self.components).iter()
    }
}

/// Capabilities the query layer needs from a scene object
pub trait SceneNode {
    /// Handle of this node
    fn id(&self) -> NodeId;

    /// This node and every node below it, depth-first pre-order
    fn descendants(&self) -> Vec<NodeId>;

    /// Component of type `T` on this node
    fn component_of_type<T: NodeComponent>(&self) -> Option<&T>;

    /// Colliders on this node and its descendants, pre-order then attachment order
    fn primitive_colliders(&self) -> Vec<ColliderId>;
}

/// Borrowed view of one live node
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a SceneTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn data(&self) -> &'a Node {
        &self.tree.nodes[self.id]
    }

    /// Node name
    pub fn name(&self) -> &'a str {
        &self.data().name
    }

    /// Node tag
    pub fn tag(&self) -> &'a str {
        &self.data().tag
    }

    /// Node layer
    pub fn layer(&self) -> Layer {
        self.data().layer
    }

    /// Parent node, `None` for roots
    pub fn parent(&self) -> Option<NodeId> {
        self.data().parent
    }

    /// Direct children in insertion order
    pub fn children(&self) -> &'a [NodeId] {
        &self.data().children
    }

    /// Colliders attached directly to this node
    pub fn colliders(&self) -> &'a [ColliderId] {
        &self.data().colliders
    }

    /// Transform relative to the parent
    pub fn local_transform(&self) -> Transform {
        self.data().local
    }

    /// Transform in world space
    pub fn world_transform(&self) -> Transform {
        self.tree.world_transform(self.id).unwrap_or_default()
    }
}

impl SceneNode for NodeRef<'_> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn descendants(&self) -> Vec<NodeId> {
        self.tree.preorder(self.id)
    }

    fn component_of_type<T: NodeComponent>(&self) -> Option<&T> {
        self.tree.component(self.id)
    }

    fn primitive_colliders(&self) -> Vec<ColliderId> {
        self.descendants()
            .into_iter()
            .flat_map(|id| self.tree.nodes[id].colliders.iter().copied())
            .collect()
    }
}
