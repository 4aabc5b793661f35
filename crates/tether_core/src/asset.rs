//! Asset identity shared across the boundary

use serde::{Deserialize, Serialize};

use crate::handle::Handle;

/// Closed classification of engine content.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AssetType {
    #[default]
    Invalid,
    Blueprint,
    Level,
    Material,
    Mesh,
    Model,
    Shader,
    Texture2D,
    Texture3D,
    Font,
    Tileset,
    Tilemap,
    Script,
}

impl AssetType {
    pub const fn name(self) -> &'static str {
        match self {
            AssetType::Invalid => "Invalid",
            AssetType::Blueprint => "Blueprint",
            AssetType::Level => "Level",
            AssetType::Material => "Material",
            AssetType::Mesh => "Mesh",
            AssetType::Model => "Model",
            AssetType::Shader => "Shader",
            AssetType::Texture2D => "Texture2D",
            AssetType::Texture3D => "Texture3D",
            AssetType::Font => "Font",
            AssetType::Tileset => "Tileset",
            AssetType::Tilemap => "Tilemap",
            AssetType::Script => "Script",
        }
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Asset handle (opaque ID, its own numeric space)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AssetHandle(pub Handle);

impl AssetHandle {
    pub fn handle(&self) -> Handle {
        self.0
    }
}
