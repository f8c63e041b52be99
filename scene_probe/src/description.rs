//! Scene description files
//!
//! A description lists nodes in declaration order (parents before their
//! children), the colliders and sim-object components they carry, and the
//! checks the probe should run once the scene is built. Node references
//! inside components are by name and may point forward.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thor_physics::config::Config;
use thor_physics::foundation::math::{Transform, Vec3};
use thor_physics::physics::{Collider, Layer};
use thor_physics::scene::{
    NodeId, Openable, PrimaryProperty, ReceptacleContents, SceneError, SceneTree, SecondaryProperties, SimObjType,
    SimObject,
};

/// Errors turning a description into a scene
#[derive(thiserror::Error, Debug)]
pub enum DescriptionError {
    /// Scene construction failed
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// A component or check names a node that was never declared
    #[error("Reference to unknown node '{0}'")]
    UnknownNode(String),

    /// Secondary property list did not parse
    #[error("Node '{node}' has invalid secondary properties: {message}")]
    InvalidProperties {
        /// Node carrying the sim object
        node: String,
        /// Parser message
        message: String,
    },

    /// Sweep check without a direction
    #[error("Sweep check on '{0}' needs a direction")]
    MissingDirection(String),
}

/// Whole scene file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    /// Nodes, parents first
    pub nodes: Vec<NodeDescription>,
    /// Checks to run against the built scene
    pub checks: Vec<CheckDescription>,
}

impl Config for SceneDescription {}

/// One scene node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Unique node name
    pub name: String,
    /// Parent name; roots leave this out
    #[serde(default)]
    pub parent: Option<String>,
    /// Local position
    #[serde(default = "Vec3::zeros")]
    pub position: Vec3,
    /// Local rotation as euler angles in degrees, applied about Z, then X, then Y
    #[serde(default = "Vec3::zeros")]
    pub rotation: Vec3,
    /// Local scale
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    /// Layer name, `Default` when absent
    #[serde(default)]
    pub layer: Option<String>,
    /// Tag, `Untagged` when absent
    #[serde(default)]
    pub tag: Option<String>,
    /// Attached colliders in attachment order
    #[serde(default)]
    pub colliders: Vec<Collider>,
    /// Sim-object classification
    #[serde(default)]
    pub sim_object: Option<SimObjectDescription>,
    /// Door/lid state; absent for objects that do not open
    #[serde(default)]
    pub open: Option<bool>,
    /// Names of the objects this trigger box currently holds.
    ///
    /// Present (even empty) only on receptacle trigger boxes.
    #[serde(default)]
    pub contents: Option<Vec<String>>,
}

fn unit_scale() -> Vec3 {
    Vec3::repeat(1.0)
}

/// Sim-object component of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimObjectDescription {
    /// Unique id
    pub unique_id: String,
    /// Category
    #[serde(default)]
    pub obj_type: SimObjType,
    /// Primary property
    #[serde(default)]
    pub primary_property: PrimaryProperty,
    /// Secondary properties as flag names joined by `|`, e.g. `"RECEPTACLE | CAN_OPEN"`
    #[serde(default)]
    pub secondary_properties: String,
    /// Node carrying the bounding-box marker
    #[serde(default)]
    pub bounding_box: Option<String>,
    /// Visibility point nodes
    #[serde(default)]
    pub visibility_points: Vec<String>,
    /// Receptacle trigger-box nodes
    #[serde(default)]
    pub receptacle_trigger_boxes: Vec<String>,
}

/// Which query a check runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckKind {
    /// First obstructing collider
    Obstructed,
    /// Every touching collider
    Touching,
    /// Sweep hits, nearest first
    Sweep,
}

/// One query to run and, optionally, the node names it should report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckDescription {
    /// Query kind
    pub kind: CheckKind,
    /// Object being queried
    pub object: String,
    /// Nodes whose hierarchies are ignored (overlap checks)
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Query volume inflation (overlap checks)
    #[serde(default)]
    pub expand_by: f32,
    /// Include bounding-box markers as query volumes (overlap checks)
    #[serde(default)]
    pub use_bounding_box: bool,
    /// Travel direction (sweep checks)
    #[serde(default)]
    pub direction: Option<Vec3>,
    /// Travel limit (sweep checks)
    #[serde(default)]
    pub max_distance: Option<f32>,
    /// Layers that can be hit (sweep checks); all but `IgnoreRaycast` when absent
    #[serde(default)]
    pub layers: Option<Vec<String>>,
    /// Expected owner names of the reported colliders, in report order
    #[serde(default)]
    pub expect: Option<Vec<String>>,
}

/// A scene built from a description, with its name lookup
#[derive(Debug, Default)]
pub struct BuiltScene {
    /// The scene
    pub tree: SceneTree,
    names: HashMap<String, NodeId>,
}

impl BuiltScene {
    /// Node declared under `name`
    pub fn resolve(&self, name: &str) -> Result<NodeId, DescriptionError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| DescriptionError::UnknownNode(name.to_string()))
    }

    /// Resolve several names, failing on the first unknown one
    pub fn resolve_all(&self, names: &[String]) -> Result<Vec<NodeId>, DescriptionError> {
        names.iter().map(|name| self.resolve(name)).collect()
    }

    /// Name of a node, for reports
    pub fn name_of(&self, node: NodeId) -> &str {
        self.tree.node(node).map_or("<missing>", |n| n.name())
    }
}

impl SceneDescription {
    /// Build the scene.
    ///
    /// Nodes are created in order, so a parent must be declared before its
    /// children. Component references are resolved after every node exists.
    pub fn build(&self) -> Result<BuiltScene, DescriptionError> {
        let mut built = BuiltScene::default();

        for desc in &self.nodes {
            if built.names.contains_key(&desc.name) {
                return Err(SceneError::DuplicateName(desc.name.clone()).into());
            }
            let parent = match &desc.parent {
                Some(parent) => Some(built.names.get(parent).copied().ok_or_else(|| {
                    SceneError::UnknownParent { node: desc.name.clone(), parent: parent.clone() }
                })?),
                None => None,
            };

            let local = Transform::from_position_euler_degrees(desc.position, desc.rotation).with_scale(desc.scale);
            let id = built.tree.add_node(desc.name.as_str(), parent, local)?;
            if let Some(layer_name) = &desc.layer {
                let layer = Layer::from_name(layer_name).ok_or_else(|| SceneError::UnknownLayer(layer_name.clone()))?;
                built.tree.set_layer(id, layer)?;
            }
            if let Some(tag) = &desc.tag {
                built.tree.set_tag(id, tag.as_str())?;
            }
            for collider in &desc.colliders {
                built.tree.attach_collider_copy(id, collider);
            }
            if let Some(is_open) = desc.open {
                built.tree.insert_component(id, Openable { is_open });
            }
            built.names.insert(desc.name.clone(), id);
        }

        for desc in &self.nodes {
            let id = built.resolve(&desc.name)?;
            if let Some(sim) = &desc.sim_object {
                let component = sim.to_component(&desc.name, &built)?;
                built.tree.insert_component(id, component);
            }
        }

        // Contents last: they record the unique ids of the contained objects.
        for desc in &self.nodes {
            let Some(contents) = &desc.contents else { continue };
            let id = built.resolve(&desc.name)?;
            let mut tracker = ReceptacleContents::new();
            for item_name in contents {
                let item = built.resolve(item_name)?;
                let unique_id = built
                    .tree
                    .component::<SimObject>(item)
                    .map_or_else(|| item_name.clone(), |sim| sim.unique_id.clone());
                tracker.insert(item, unique_id);
            }
            built.tree.insert_component(id, tracker);
        }

        Ok(built)
    }
}

impl SimObjectDescription {
    fn to_component(&self, node: &str, built: &BuiltScene) -> Result<SimObject, DescriptionError> {
        let secondary = bitflags::parser::from_str::<SecondaryProperties>(&self.secondary_properties).map_err(|e| {
            DescriptionError::InvalidProperties { node: node.to_string(), message: e.to_string() }
        })?;

        let mut sim_object = SimObject::new(self.unique_id.as_str(), self.obj_type, self.primary_property)
            .with_secondary(secondary);
        sim_object.bounding_box = self.bounding_box.as_deref().map(|name| built.resolve(name)).transpose()?;
        sim_object.visibility_points = built.resolve_all(&self.visibility_points)?;
        sim_object.receptacle_trigger_boxes = built.resolve_all(&self.receptacle_trigger_boxes)?;
        Ok(sim_object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thor_physics::config::ConfigFormat;
    use thor_physics::physics::ColliderShape;
    use thor_physics::scene::{contained_unique_ids, is_open, is_openable};

    const CABINET: &str = r#"
[[nodes]]
name = "Cabinet"
position = [1.0, 0.5, 0.0]
layer = "SimObjVisible"
open = false

[[nodes.colliders]]
shape = { Box = { size = [0.6, 1.0, 0.6] } }

[nodes.sim_object]
unique_id = "Cabinet|1"
obj_type = "Cabinet"
secondary_properties = "CAN_OPEN | RECEPTACLE"
receptacle_trigger_boxes = ["CabinetInside"]

[[nodes]]
name = "CabinetInside"
parent = "Cabinet"
layer = "SimObjInvisible"
tag = "Receptacle"
contents = ["Cup"]

[[nodes.colliders]]
is_trigger = true
shape = { Box = { size = [0.5, 0.9, 0.5] } }

[[nodes]]
name = "Cup"
parent = "Cabinet"
layer = "SimObjVisible"

[[nodes.colliders]]
shape = { Sphere = { radius = 0.05 } }

[nodes.sim_object]
unique_id = "Cup|1"
obj_type = "Cup"
primary_property = "CanPickup"
"#;

    fn parse(text: &str) -> SceneDescription {
        SceneDescription::parse(text, ConfigFormat::Toml).unwrap()
    }

    #[test]
    fn test_build_cabinet() {
        let built = parse(CABINET).build().unwrap();
        let cabinet = built.resolve("Cabinet").unwrap();
        let inside = built.resolve("CabinetInside").unwrap();

        let node = built.tree.node(inside).unwrap();
        assert_eq!(node.parent(), Some(cabinet));
        assert_eq!(node.tag(), "Receptacle");
        assert_eq!(node.layer(), Layer::SIM_OBJ_INVISIBLE);
        assert!(built.tree.collider(node.colliders()[0]).unwrap().is_trigger);

        let sim = built.tree.component::<SimObject>(cabinet).unwrap();
        assert!(sim.is_receptacle());
        assert!(sim.has_secondary_property(SecondaryProperties::CAN_OPEN));
        assert!(is_openable(&built.tree, cabinet));
        assert!(!is_open(&built.tree, cabinet));
        assert_eq!(contained_unique_ids(&built.tree, cabinet), vec!["Cup|1"]);
        assert!(built.tree.validate_sim_objects().is_empty());
    }

    #[test]
    fn test_ron_description() {
        let text = r#"(
            nodes: [
                (name: "Ball", position: (0.0, 2.0, 0.0), colliders: [(shape: Sphere(radius: 0.5))]),
            ],
        )"#;
        let description = SceneDescription::parse(text, ConfigFormat::Ron).unwrap();
        assert_eq!(description.nodes[0].scale, Vec3::repeat(1.0));
        assert_eq!(description.nodes[0].colliders[0].shape, ColliderShape::sphere(0.5));

        let built = description.build().unwrap();
        let ball = built.resolve("Ball").unwrap();
        assert_eq!(built.tree.world_transform(ball).unwrap().position, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_duplicate_name() {
        let text = "[[nodes]]\nname = \"A\"\n[[nodes]]\nname = \"A\"\n";
        assert!(matches!(
            parse(text).build(),
            Err(DescriptionError::Scene(SceneError::DuplicateName(name))) if name == "A"
        ));
    }

    #[test]
    fn test_parent_must_come_first() {
        let text = "[[nodes]]\nname = \"Child\"\nparent = \"Root\"\n[[nodes]]\nname = \"Root\"\n";
        assert!(matches!(
            parse(text).build(),
            Err(DescriptionError::Scene(SceneError::UnknownParent { .. }))
        ));
    }

    #[test]
    fn test_unknown_layer() {
        let text = "[[nodes]]\nname = \"A\"\nlayer = \"Lava\"\n";
        assert!(matches!(
            parse(text).build(),
            Err(DescriptionError::Scene(SceneError::UnknownLayer(name))) if name == "Lava"
        ));
    }

    #[test]
    fn test_bad_secondary_properties() {
        let text = CABINET.replace("CAN_OPEN | RECEPTACLE", "CAN_FLY");
        assert!(matches!(parse(&text).build(), Err(DescriptionError::InvalidProperties { .. })));
    }

    #[test]
    fn test_unknown_trigger_box_reference() {
        let text = CABINET.replace("[\"CabinetInside\"]", "[\"Drawer\"]");
        assert!(matches!(parse(&text).build(), Err(DescriptionError::UnknownNode(name)) if name == "Drawer"));
    }
}
