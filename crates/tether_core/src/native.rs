//! Internal-call boundary
//!
//! Every operation the scripting layer performs crosses into the native
//! store through one of these traits. The store owns all state; callers only
//! hold handles. Implementations must tolerate unknown or stale handles
//! (including [`Handle::SENTINEL`]) by returning `None`, an empty list,
//! `false`, or doing nothing. They must never panic on them.
//!
//! Calls are grouped by target the same way the engine registers them.

use glam::{Quat, Vec2, Vec3};

use crate::asset::{AssetHandle, AssetType};
use crate::component::{ComponentKey, ComponentType};
use crate::handle::Handle;
use crate::input::{Axis, BindId, InputBindType, KeyCode, KeyState, MouseButton};
use crate::log::Severity;
use crate::physics::{ColliderShape, ForceMode, RayHit};

/// Fixed-width tag bit-set.
pub type TagMask = u64;

/// Diagnostic channel. Fire-and-forget.
pub trait LogCalls {
    fn log(&self, severity: Severity, message: &str);
}

pub trait EntityCalls: LogCalls {
    fn create_entity(&mut self, name: &str) -> Handle;
    /// Returns `false` if the entity was not live.
    fn destroy_entity(&mut self, entity: Handle) -> bool;
    fn entity_exists(&self, entity: Handle) -> bool;

    fn entity_name(&self, entity: Handle) -> Option<String>;
    fn set_entity_name(&mut self, entity: Handle, name: &str);
    fn entity_active(&self, entity: Handle) -> bool;
    fn set_entity_active(&mut self, entity: Handle, active: bool);
    fn entity_static(&self, entity: Handle) -> bool;
    fn set_entity_static(&mut self, entity: Handle, value: bool);
    fn entity_temporary(&self, entity: Handle) -> bool;
    fn set_entity_temporary(&mut self, entity: Handle, value: bool);
    fn entity_tags(&self, entity: Handle) -> TagMask;
    fn set_entity_tags(&mut self, entity: Handle, tags: TagMask);

    fn entity_children(&self, entity: Handle) -> Vec<Handle>;
    fn entity_parent(&self, entity: Handle) -> Option<Handle>;
    /// Returns `false` if the change was refused (stale handles, cycles).
    fn set_entity_parent(&mut self, entity: Handle, parent: Option<Handle>) -> bool;

    fn entity_transform(&self, entity: Handle) -> Option<Handle>;
    fn has_component(&self, entity: Handle, ty: ComponentType) -> bool;
    /// `None` when the store refuses the add (e.g. a second singleton).
    fn add_component(&mut self, entity: Handle, ty: ComponentType) -> Option<Handle>;
    fn get_component(&self, entity: Handle, ty: ComponentType) -> Option<Handle>;
    /// Every component of `ty`, in attachment order.
    fn get_components(&self, entity: Handle, ty: ComponentType) -> Vec<Handle>;
    /// Every component of any type, in attachment order.
    fn entity_components(&self, entity: Handle) -> Vec<ComponentKey>;

    fn find_entity_by_name(&self, name: &str) -> Option<Handle>;
    fn find_entities_by_tag(&self, mask: TagMask) -> Vec<Handle>;
    fn all_entities(&self) -> Vec<Handle>;
}

pub trait ComponentCalls: LogCalls {
    fn component_exists(&self, key: ComponentKey) -> bool;
    fn component_owner(&self, key: ComponentKey) -> Option<Handle>;
    fn component_active(&self, key: ComponentKey) -> bool;
    fn set_component_active(&mut self, key: ComponentKey, active: bool);
}

pub trait TransformCalls {
    fn local_position(&self, transform: Handle) -> Option<Vec3>;
    fn set_local_position(&mut self, transform: Handle, position: Vec3);
    fn local_rotation(&self, transform: Handle) -> Option<Quat>;
    fn set_local_rotation(&mut self, transform: Handle, rotation: Quat);
    fn local_scale(&self, transform: Handle) -> Option<Vec3>;
    fn set_local_scale(&mut self, transform: Handle, scale: Vec3);

    fn world_position(&self, transform: Handle) -> Option<Vec3>;
    fn world_rotation(&self, transform: Handle) -> Option<Quat>;
    fn world_scale(&self, transform: Handle) -> Option<Vec3>;

    fn up(&self, transform: Handle) -> Option<Vec3>;
    fn right(&self, transform: Handle) -> Option<Vec3>;
    fn forward(&self, transform: Handle) -> Option<Vec3>;
}

pub trait RigidBodyCalls {
    /// Queued; observable only after the next physics step.
    fn apply_force(&mut self, body: Handle, force: Vec3, mode: ForceMode);
    fn velocity(&self, body: Handle) -> Option<Vec3>;
    fn mass(&self, body: Handle) -> Option<f32>;
    fn set_mass(&mut self, body: Handle, mass: f32);
}

pub trait PhysicsCalls {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, layer_mask: u32) -> Vec<RayHit>;
    fn collider_shape(&self, collider: Handle) -> Option<ColliderShape>;
    fn set_collider_shape(&mut self, collider: Handle, shape: ColliderShape);
    fn collider_layer(&self, collider: Handle) -> Option<u8>;
    fn set_collider_layer(&mut self, collider: Handle, layer: u8);
}

pub trait RendererCalls {
    fn renderer_model(&self, renderer: Handle) -> Option<AssetHandle>;
    fn set_renderer_model(&mut self, renderer: Handle, model: Option<AssetHandle>);
}

pub trait ScriptCalls {
    fn script_asset(&self, script: Handle) -> Option<AssetHandle>;
    fn set_script_asset(&mut self, script: Handle, asset: Option<AssetHandle>);
}

pub trait AssetCalls {
    fn asset_by_path(&self, path: &str) -> Option<AssetHandle>;
    fn asset_exists(&self, asset: AssetHandle) -> bool;
    fn asset_type(&self, asset: AssetHandle) -> AssetType;
    fn asset_path(&self, asset: AssetHandle) -> Option<String>;
    fn asset_file_name(&self, asset: AssetHandle) -> Option<String>;

    fn blueprint_has_entity(&self, blueprint: AssetHandle) -> bool;
    fn blueprint_create_from_entity(&mut self, blueprint: AssetHandle, entity: Handle) -> bool;
    fn blueprint_spawn_entity(&mut self, blueprint: AssetHandle) -> Option<Handle>;

    fn level_create_from_world(&mut self, level: AssetHandle) -> bool;
    fn level_load(&mut self, level: AssetHandle) -> bool;

    fn script_type_name(&self, script: AssetHandle) -> Option<String>;
}

pub trait InputCalls {
    fn is_key_down(&self, key: KeyCode) -> bool;
    fn key_state(&self, key: KeyCode) -> KeyState;
    fn is_mouse_button_down(&self, button: MouseButton) -> bool;
    fn mouse_button_state(&self, button: MouseButton) -> KeyState;
    fn mouse_position(&self) -> Vec2;
    fn mouse_delta(&self) -> Vec2;

    /// Creating a bind whose name already exists returns the existing bind.
    fn create_input_bind(&mut self, name: &str, ty: InputBindType) -> BindId;
    fn find_input_bind(&self, name: &str) -> Option<BindId>;
    fn input_bind_name(&self, bind: BindId) -> Option<String>;
    fn input_bind_type(&self, bind: BindId) -> Option<InputBindType>;
    fn input_bind_axis_value(&self, bind: BindId) -> f32;
    fn input_bind_action_state(&self, bind: BindId) -> bool;
    fn add_keyboard_binding(&mut self, bind: BindId, key: KeyCode, value: f32);
    fn add_axis_binding(&mut self, bind: BindId, axis: Axis, sensitivity: f32);
}

/// The complete internal-call surface.
///
/// Object safe, so script behaviours can hold a `&mut dyn NativeEngine`.
pub trait NativeEngine:
    EntityCalls
    + ComponentCalls
    + TransformCalls
    + RigidBodyCalls
    + PhysicsCalls
    + RendererCalls
    + ScriptCalls
    + AssetCalls
    + InputCalls
{
}

impl<T> NativeEngine for T where
    T: EntityCalls
        + ComponentCalls
        + TransformCalls
        + RigidBodyCalls
        + PhysicsCalls
        + RendererCalls
        + ScriptCalls
        + AssetCalls
        + InputCalls
{
}
