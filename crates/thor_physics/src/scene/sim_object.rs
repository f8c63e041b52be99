//! Simulated objects
//!
//! A node becomes an interactable object by carrying a [`SimObject`]
//! component. Receptacles expose what they hold through trigger-box nodes,
//! each carrying a [`ContainedObjects`] provider.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

use super::scene_graph::{ComponentRegistries, NodeComponent, NodeId, SceneTree};

/// Object category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum SimObjType {
    #[default]
    Undefined,
    Apple,
    Bowl,
    Bread,
    Cabinet,
    CoffeeMachine,
    CounterTop,
    Cup,
    Drawer,
    Egg,
    Fork,
    Fridge,
    Knife,
    Lettuce,
    Microwave,
    Mug,
    Plate,
    Pot,
    Potato,
    Sink,
    StoveBurner,
    Table,
    Toaster,
    Tomato,
}

/// The one property every object has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrimaryProperty {
    /// Fixed in place
    #[default]
    Static,
    /// Can be pushed but not carried
    Moveable,
    /// Can be picked up by the agent
    CanPickup,
}

bitflags::bitflags! {
    /// Additional capabilities; an object may have any number
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SecondaryProperties: u32 {
        /// Has a door or lid
        const CAN_OPEN = 1 << 0;
        /// Can hold other objects
        const RECEPTACLE = 1 << 1;
        /// Can be switched on and off
        const CAN_TOGGLE = 1 << 2;
        /// Can be sliced
        const CAN_BE_SLICED = 1 << 3;
        /// Can break
        const CAN_BE_BROKEN = 1 << 4;
        /// Can be cooked
        const CAN_BE_COOKED = 1 << 5;
        /// Can get dirty
        const CAN_BE_DIRTY = 1 << 6;
        /// Can be filled with liquid
        const CAN_BE_FILLED = 1 << 7;
        /// Can be used up
        const CAN_BE_USED_UP = 1 << 8;
        /// Receptacle that only accepts particular object types
        const OBJECT_SPECIFIC_RECEPTACLE = 1 << 9;
    }
}

/// Classification and helper-node references of an interactable object
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimObject {
    /// Unique string id, e.g. `Mug|+01.20|+00.90|-00.30`
    pub unique_id: String,
    /// Category
    pub obj_type: SimObjType,
    /// Exactly one primary property
    pub primary_property: PrimaryProperty,
    /// Any number of secondary properties
    pub secondary_properties: SecondaryProperties,
    /// Node carrying the bounding-box marker collider, if authored
    pub bounding_box: Option<NodeId>,
    /// Points raycast against for visibility
    pub visibility_points: Vec<NodeId>,
    /// Trigger-box nodes tracking what the receptacle holds
    pub receptacle_trigger_boxes: Vec<NodeId>,
}

impl SimObject {
    /// Object with no secondary properties or helper nodes
    pub fn new(unique_id: impl Into<String>, obj_type: SimObjType, primary_property: PrimaryProperty) -> Self {
        Self {
            unique_id: unique_id.into(),
            obj_type,
            primary_property,
            ..Default::default()
        }
    }

    /// Add secondary properties
    #[must_use]
    pub fn with_secondary(mut self, properties: SecondaryProperties) -> Self {
        self.secondary_properties |= properties;
        self
    }

    /// True for `CanPickup` objects
    pub fn is_pickupable(&self) -> bool {
        self.primary_property == PrimaryProperty::CanPickup
    }

    /// Check for every flag in `property`
    pub fn has_secondary_property(&self, property: SecondaryProperties) -> bool {
        self.secondary_properties.contains(property)
    }

    /// A receptacle needs the property and at least one trigger box
    pub fn is_receptacle(&self) -> bool {
        self.has_secondary_property(SecondaryProperties::RECEPTACLE) && !self.receptacle_trigger_boxes.is_empty()
    }
}

/// Door/lid state of an openable object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Openable {
    /// Current state
    pub is_open: bool,
}

/// Something that knows which objects are inside a region
pub trait ContainedObjects {
    /// Nodes of the contained objects
    fn currently_contained_objects(&self) -> Vec<NodeId>;

    /// Unique ids of the contained objects
    fn currently_contained_unique_ids(&self) -> Vec<String>;
}

/// Contents tracker for one receptacle trigger box.
///
/// The host fills it from trigger enter/exit events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReceptacleContents {
    objects: Vec<(NodeId, String)>,
}

impl ReceptacleContents {
    /// Empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an object entering; repeated entries are ignored
    pub fn insert(&mut self, node: NodeId, unique_id: impl Into<String>) {
        if !self.objects.iter().any(|(existing, _)| *existing == node) {
            self.objects.push((node, unique_id.into()));
        }
    }

    /// Record an object leaving
    pub fn remove(&mut self, node: NodeId) -> bool {
        let before = self.objects.len();
        self.objects.retain(|(existing, _)| *existing != node);
        self.objects.len() != before
    }

    /// Number of tracked objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when nothing is inside
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ContainedObjects for ReceptacleContents {
    fn currently_contained_objects(&self) -> Vec<NodeId> {
        self.objects.iter().map(|(node, _)| *node).collect()
    }

    fn currently_contained_unique_ids(&self) -> Vec<String> {
        self.objects.iter().map(|(_, id)| id.clone()).collect()
    }
}

impl NodeComponent for SimObject {
    fn registry(components: &ComponentRegistries) -> &SecondaryMap<NodeId, Self> {
        &components.sim_objects
    }

    fn registry_mut(components: &mut ComponentRegistries) -> &mut SecondaryMap<NodeId, Self> {
        &mut components.sim_objects
    }
}

impl NodeComponent for Openable {
    fn registry(components: &ComponentRegistries) -> &SecondaryMap<NodeId, Self> {
        &components.openables
    }

    fn registry_mut(components: &mut ComponentRegistries) -> &mut SecondaryMap<NodeId, Self> {
        &mut components.openables
    }
}

impl NodeComponent for ReceptacleContents {
    fn registry(components: &ComponentRegistries) -> &SecondaryMap<NodeId, Self> {
        &components.receptacle_contents
    }

    fn registry_mut(components: &mut ComponentRegistries) -> &mut SecondaryMap<NodeId, Self> {
        &mut components.receptacle_contents
    }
}

/// True when the node carries an [`Openable`]
pub fn is_openable(scene: &SceneTree, node: NodeId) -> bool {
    scene.component::<Openable>(node).is_some()
}

/// True when the node is openable and currently open
pub fn is_open(scene: &SceneTree, node: NodeId) -> bool {
    scene.component::<Openable>(node).is_some_and(|openable| openable.is_open)
}

/// Union of every trigger box's contents, first-seen order, no repeats
fn collect_contained<T: PartialEq>(
    scene: &SceneTree,
    node: NodeId,
    read: impl Fn(&ReceptacleContents) -> Vec<T>,
) -> Vec<T> {
    let Some(sim_object) = scene.component::<SimObject>(node) else {
        debug!("{:?} is not a sim object, nothing contained", node);
        return Vec::new();
    };
    if !sim_object.has_secondary_property(SecondaryProperties::RECEPTACLE) {
        debug!("{} is not a receptacle", sim_object.unique_id);
        return Vec::new();
    }

    let mut contained = Vec::new();
    for &trigger_box in &sim_object.receptacle_trigger_boxes {
        let Some(contents) = scene.component::<ReceptacleContents>(trigger_box) else {
            debug!("Trigger box {:?} of {} tracks no contents", trigger_box, sim_object.unique_id);
            continue;
        };
        for item in read(contents) {
            if !contained.contains(&item) {
                contained.push(item);
            }
        }
    }
    contained
}

/// Objects inside a receptacle; empty for anything else
pub fn contained_objects(scene: &SceneTree, node: NodeId) -> Vec<NodeId> {
    collect_contained(scene, node, <ReceptacleContents as ContainedObjects>::currently_contained_objects)
}

/// Unique ids of objects inside a receptacle; empty for anything else
pub fn contained_unique_ids(scene: &SceneTree, node: NodeId) -> Vec<String> {
    collect_contained(scene, node, <ReceptacleContents as ContainedObjects>::currently_contained_unique_ids)
}

impl SceneTree {
    /// Check sim-object wiring, returning one message per problem found.
    ///
    /// Reports receptacles without trigger boxes and trigger boxes that do
    /// not track contents.
    pub fn validate_sim_objects(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (node, sim_object) in self.nodes_with::<SimObject>() {
            let name = self.node(node).map_or("<missing>", |n| n.name());
            if sim_object.has_secondary_property(SecondaryProperties::RECEPTACLE) {
                if sim_object.receptacle_trigger_boxes.is_empty() {
                    problems.push(format!("{name} is missing receptacle trigger boxes"));
                }
                for &trigger_box in &sim_object.receptacle_trigger_boxes {
                    if self.component::<ReceptacleContents>(trigger_box).is_none() {
                        problems.push(format!("{name} has a trigger box that tracks no contents"));
                    }
                }
            }
        }
        for problem in &problems {
            warn!("{}", problem);
        }
        problems
    }
}
