//! Serialized entity trees
//!
//! Blueprints hold one [`EntitySnapshot`], levels hold a list of root
//! snapshots. Asset references are stored by path so a snapshot stays
//! meaningful across sessions, where handles do not.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tether_core::{ColliderShape, ComponentType, TagMask};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSnapshot {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for TransformSnapshot {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Per-type payload carried by a component snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ComponentData {
    #[default]
    None,
    RigidBody {
        mass: f32,
    },
    Collider {
        shape: ColliderShape,
        layer: u8,
    },
    ModelRenderer {
        model: Option<String>,
    },
    Script {
        script: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSnapshot {
    #[serde(rename = "type")]
    pub ty: ComponentType,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub data: ComponentData,
}

impl ComponentSnapshot {
    pub fn new(ty: ComponentType) -> Self {
        Self {
            ty,
            active: true,
            data: ComponentData::None,
        }
    }
}

/// One entity with its components and descendants.
///
/// The transform is stored separately from `components`; every entity
/// carries one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitySnapshot {
    pub name: String,
    pub active: bool,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub tags: TagMask,
    pub transform: TransformSnapshot,
    pub components: Vec<ComponentSnapshot>,
    pub children: Vec<EntitySnapshot>,
}

impl Default for EntitySnapshot {
    fn default() -> Self {
        Self {
            name: String::new(),
            active: true,
            is_static: false,
            tags: 0,
            transform: TransformSnapshot::default(),
            components: Vec::new(),
            children: Vec::new(),
        }
    }
}

impl EntitySnapshot {
    /// Number of entities in this tree, root included.
    pub fn entity_count(&self) -> usize {
        1 + self.children.iter().map(EntitySnapshot::entity_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelData {
    pub entities: Vec<EntitySnapshot>,
}

fn default_true() -> bool {
    true
}
