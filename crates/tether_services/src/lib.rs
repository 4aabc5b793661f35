//! Tether Services Layer
//!
//! Platform-facing state the world reads from: input polling and bindings,
//! and engine settings.

pub mod input;
pub mod settings;

pub use input::{InputBind, InputState};
pub use settings::{
    LogSettings, NameLookupOrder, RuntimeSettings, Settings, SettingsError, WorldSettings,
};
