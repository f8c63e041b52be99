//! Collision layer system for filtering queries
//!
//! Every node sits on one of 32 layers. Queries carry a [`LayerMask`] and only
//! consider colliders whose layer bit is set in it. Layers are also
//! addressable by name so masks can be built from configuration.

use log::warn;
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Set of layers a query considers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LayerMask: u32 {
        /// Untagged scene geometry
        const DEFAULT = 1 << 0;
        /// Transparent effects
        const TRANSPARENT_FX = 1 << 1;
        /// Never hit by default raycasts
        const IGNORE_RAYCAST = 1 << 2;
        /// Water volumes
        const WATER = 1 << 4;
        /// UI geometry
        const UI = 1 << 5;
        /// Simulated objects the agent can see and touch
        const SIM_OBJ_VISIBLE = 1 << 8;
        /// Bookkeeping geometry (bounding boxes, helper volumes)
        const SIM_OBJ_INVISIBLE = 1 << 9;
        /// The agent's body
        const AGENT = 1 << 10;
        /// Procedurally generated geometry, bucket 0
        const PROCEDURAL0 = 1 << 11;
        /// Procedurally generated geometry, bucket 1
        const PROCEDURAL1 = 1 << 12;
        /// Procedurally generated geometry, bucket 2
        const PROCEDURAL2 = 1 << 13;
        /// Procedurally generated geometry, bucket 3
        const PROCEDURAL3 = 1 << 14;
    }
}

/// Layer names and their indices
const LAYER_NAMES: [(&str, u8); 12] = [
    ("Default", 0),
    ("TransparentFX", 1),
    ("Ignore Raycast", 2),
    ("Water", 4),
    ("UI", 5),
    ("SimObjVisible", 8),
    ("SimObjInvisible", 9),
    ("Agent", 10),
    ("Procedural0", 11),
    ("Procedural1", 12),
    ("Procedural2", 13),
    ("Procedural3", 14),
];

impl LayerMask {
    /// Layers that physically block an object: agent, visible objects, procedural geometry
    pub const OBSTRUCTION: Self = Self::from_bits_retain(
        Self::AGENT.bits()
            | Self::SIM_OBJ_VISIBLE.bits()
            | Self::PROCEDURAL0.bits()
            | Self::PROCEDURAL1.bits()
            | Self::PROCEDURAL2.bits()
            | Self::PROCEDURAL3.bits(),
    );

    /// Layers that count as "touching" an object: visible objects and the agent
    pub const CONTACT: Self = Self::from_bits_retain(Self::SIM_OBJ_VISIBLE.bits() | Self::AGENT.bits());

    /// Every layer except `Ignore Raycast`
    pub const DEFAULT_RAYCAST_LAYERS: Self = Self::from_bits_retain(!Self::IGNORE_RAYCAST.bits());

    /// Every one of the 32 layers
    pub const EVERYTHING: Self = Self::from_bits_retain(u32::MAX);

    /// Build a mask from layer names.
    ///
    /// Unknown names are skipped with a warning.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        names.iter().fold(Self::empty(), |mask, name| {
            let name = name.as_ref();
            match Layer::from_name(name) {
                Some(layer) => mask | layer.mask(),
                None => {
                    warn!("Unknown layer name '{}' ignored in mask", name);
                    mask
                }
            }
        })
    }

    /// Build a mask from explicit layers
    pub fn from_layers(layers: &[Layer]) -> Self {
        layers.iter().fold(Self::empty(), |acc, layer| acc | layer.mask())
    }

    /// Check whether a layer participates in this mask
    pub fn contains_layer(self, layer: Layer) -> bool {
        self.intersects(layer.mask())
    }
}

/// One of the 32 collision layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Layer(u8);

impl Layer {
    /// Layer 0
    pub const DEFAULT: Self = Self(0);
    /// Layer 2
    pub const IGNORE_RAYCAST: Self = Self(2);
    /// Layer 8
    pub const SIM_OBJ_VISIBLE: Self = Self(8);
    /// Layer 9
    pub const SIM_OBJ_INVISIBLE: Self = Self(9);
    /// Layer 10
    pub const AGENT: Self = Self(10);
    /// Layer 11
    pub const PROCEDURAL0: Self = Self(11);

    /// Create a layer from its index; `None` for indices past 31
    pub fn new(index: u8) -> Option<Self> {
        (index < 32).then_some(Self(index))
    }

    /// Layer index in `0..32`
    pub fn index(self) -> u8 {
        self.0
    }

    /// Resolve a layer by name
    pub fn from_name(name: &str) -> Option<Self> {
        LAYER_NAMES
            .iter()
            .find(|(layer_name, _)| *layer_name == name)
            .map(|&(_, index)| Self(index))
    }

    /// Name of a built-in layer
    pub fn name(self) -> Option<&'static str> {
        LAYER_NAMES
            .iter()
            .find(|(_, index)| *index == self.0)
            .map(|&(name, _)| name)
    }

    /// Single-bit mask for this layer
    pub fn mask(self) -> LayerMask {
        LayerMask::from_bits_retain(1 << self.0)
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Layer {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index).ok_or_else(|| format!("layer index {index} out of range 0..32"))
    }
}

impl From<Layer> for u8 {
    fn from(layer: Layer) -> Self {
        layer.0
    }
}

/// How a query treats trigger colliders in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryTriggerInteraction {
    /// Follow the backend's global setting
    #[default]
    UseGlobal,
    /// Never report triggers
    Ignore,
    /// Always report triggers
    Collide,
}

impl QueryTriggerInteraction {
    /// Whether triggers are reported, given the backend's global setting
    pub fn hits_triggers(self, queries_hit_triggers: bool) -> bool {
        match self {
            Self::UseGlobal => queries_hit_triggers,
            Self::Ignore => false,
            Self::Collide => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_from_names() {
        let mask = LayerMask::from_names(&[
            "Agent",
            "SimObjVisible",
            "Procedural1",
            "Procedural2",
            "Procedural3",
            "Procedural0",
        ]);
        assert_eq!(mask, LayerMask::OBSTRUCTION);
        assert_eq!(LayerMask::from_names(&["SimObjVisible", "Agent"]), LayerMask::CONTACT);
    }

    #[test]
    fn test_unknown_names_are_skipped() {
        let mask = LayerMask::from_names(&["Agent", "NoSuchLayer"]);
        assert_eq!(mask, LayerMask::AGENT);
    }

    #[test]
    fn test_default_raycast_layers_exclude_ignore_raycast() {
        assert!(!LayerMask::DEFAULT_RAYCAST_LAYERS.contains_layer(Layer::IGNORE_RAYCAST));
        assert!(LayerMask::DEFAULT_RAYCAST_LAYERS.contains_layer(Layer::DEFAULT));
        assert!(LayerMask::DEFAULT_RAYCAST_LAYERS.contains_layer(Layer::new(31).unwrap()));
    }

    #[test]
    fn test_layer_names_round_trip() {
        for (name, index) in LAYER_NAMES {
            let layer = Layer::from_name(name).unwrap();
            assert_eq!(layer.index(), index);
            assert_eq!(layer.name(), Some(name));
        }
        assert!(Layer::new(32).is_none());
    }

    #[test]
    fn test_trigger_interaction() {
        assert!(QueryTriggerInteraction::UseGlobal.hits_triggers(true));
        assert!(!QueryTriggerInteraction::UseGlobal.hits_triggers(false));
        assert!(!QueryTriggerInteraction::Ignore.hits_triggers(true));
        assert!(QueryTriggerInteraction::Collide.hits_triggers(false));
    }
}
