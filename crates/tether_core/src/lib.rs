//! Tether Core
//!
//! The contract between scripts and the native store:
//! - Generational handles and the validity guard
//! - Closed component/asset type enumerations
//! - The internal-call boundary traits
//! - Value types (glam) and frame time

pub mod asset;
pub mod component;
pub mod guard;
pub mod handle;
pub mod input;
pub mod log;
pub mod math;
pub mod native;
pub mod physics;
pub mod time;

pub use glam;

pub use asset::{AssetHandle, AssetType};
pub use component::{ComponentKey, ComponentType, UnknownComponentType};
pub use guard::ValidityGuard;
pub use handle::{Handle, HandleAllocator};
pub use log::Severity;
pub use native::{NativeEngine, TagMask};
pub use physics::{ColliderShape, ForceMode, RayHit};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
