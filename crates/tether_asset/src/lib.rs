//! Tether Asset Pipeline
//!
//! Path-keyed asset registry, blueprint/level snapshot formats, and the
//! project manifest that lists compiled script sources.

pub mod error;
pub mod manifest;
pub mod project;
pub mod registry;
pub mod snapshot;

pub use error::AssetError;
pub use manifest::{CompileEntry, ManifestError, ProjectManifest};
pub use project::ScriptProject;
pub use registry::{asset_type_for_path, normalize_path, AssetData, AssetRecord, AssetRegistry};
pub use snapshot::{ComponentData, ComponentSnapshot, EntitySnapshot, LevelData, TransformSnapshot};
