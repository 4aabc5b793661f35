// component.rs - Closed component type enumeration
//
// Component kinds are fixed at build time. Adding a kind means extending
// `ComponentType`, never registering a type at runtime.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

use crate::handle::Handle;

/// Every component kind the native store knows about.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ComponentType {
    Transform = 0,
    ModelRenderer,
    TerrainRenderer,
    Camera,
    Light,
    Collider,
    RigidBody,
    Collider2D,
    RigidBody2D,
    SpriteRenderer,
    TilemapRenderer,
    NativeScript,
    Script,
}

impl ComponentType {
    pub const ALL: [ComponentType; 13] = [
        ComponentType::Transform,
        ComponentType::ModelRenderer,
        ComponentType::TerrainRenderer,
        ComponentType::Camera,
        ComponentType::Light,
        ComponentType::Collider,
        ComponentType::RigidBody,
        ComponentType::Collider2D,
        ComponentType::RigidBody2D,
        ComponentType::SpriteRenderer,
        ComponentType::TilemapRenderer,
        ComponentType::NativeScript,
        ComponentType::Script,
    ];

    /// Human-readable name, also the key used in snapshots.
    pub const fn name(self) -> &'static str {
        match self {
            ComponentType::Transform => "Transform",
            ComponentType::ModelRenderer => "ModelRenderer",
            ComponentType::TerrainRenderer => "TerrainRenderer",
            ComponentType::Camera => "Camera",
            ComponentType::Light => "Light",
            ComponentType::Collider => "Collider",
            ComponentType::RigidBody => "RigidBody",
            ComponentType::Collider2D => "Collider2D",
            ComponentType::RigidBody2D => "RigidBody2D",
            ComponentType::SpriteRenderer => "SpriteRenderer",
            ComponentType::TilemapRenderer => "TilemapRenderer",
            ComponentType::NativeScript => "NativeScript",
            ComponentType::Script => "Script",
        }
    }

    /// Look a type up by its name.
    pub fn from_name(name: &str) -> Option<ComponentType> {
        NAME_LOOKUP.get(name).copied()
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

static NAME_LOOKUP: Lazy<HashMap<&'static str, ComponentType>> = Lazy::new(|| {
    ComponentType::ALL
        .iter()
        .map(|&ty| (ty.name(), ty))
        .collect()
});

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown component type '{0}'")]
pub struct UnknownComponentType(pub String);

impl FromStr for ComponentType {
    type Err = UnknownComponentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentType::from_name(s).ok_or_else(|| UnknownComponentType(s.to_string()))
    }
}

/// A component is addressed by its per-type handle together with its type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    pub handle: Handle,
    pub ty: ComponentType,
}

impl ComponentKey {
    pub const fn new(handle: Handle, ty: ComponentType) -> Self {
        Self { handle, ty }
    }
}
