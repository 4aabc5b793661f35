//! Tether Scripting API
//!
//! Typed proxies over handles into the native store. Nothing here caches
//! engine state: every accessor takes the engine explicitly and crosses the
//! boundary on each call.
//!
//! ## Safety model
//!
//! - Every [`Entity`] and [`Component`] wraps a `ValidityGuard`
//! - A dead handle reports an error and resolves to `Handle::SENTINEL`
//! - A component is live only while its owning entity is live
//!
//! ## Lifecycle
//!
//! Behaviours are registered by name in a [`ScriptRegistry`]; the
//! [`ScriptHost`] binds them to `Script` components and drives
//! `on_start`/`on_update` once per frame.

pub mod asset;
pub mod behaviour;
pub mod component;
pub mod entity;
pub mod host;
pub mod input;
pub mod log;
pub mod physics;
pub mod registry;
pub mod views;

pub use asset::{Asset, AssetManager, AssetView, Blueprint, Level, Model, ScriptAsset, Texture2D};
pub use behaviour::{AsAny, Behaviour, ScriptContext};
pub use component::{AnyComponent, Component, ComponentHost, ComponentView};
pub use entity::{Entity, EntityList};
pub use host::{ScriptHost, ScriptInstances};
pub use input::{InputBind, InputManager};
pub use log::Log;
pub use physics::{Physics3D, RaycastHit};
pub use registry::ScriptRegistry;
pub use views::{
    Camera, Collider, Collider2D, Light, ModelRenderer, NativeScript, RigidBody, RigidBody2D,
    Script, SpriteRenderer, TerrainRenderer, TilemapRenderer, Transform,
};
