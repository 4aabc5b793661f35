//! Typed component views
//!
//! Each view is a newtype over [`Component`] fixed to one `ComponentType`.
//! Views deref to `Component`, so identity, owner and the active flag are
//! available on all of them.

use glam::{Quat, Vec3};
use tether_core::math::{from_euler_degrees, to_euler_degrees};
use tether_core::native::{AssetCalls, PhysicsCalls, RendererCalls, RigidBodyCalls, ScriptCalls, TransformCalls};
use tether_core::{AssetType, ColliderShape, ComponentKey, ComponentType, ForceMode};

use crate::asset::{Asset, AssetView, Model, ScriptAsset};
use crate::behaviour::Behaviour;
use crate::component::{Component, ComponentHost, ComponentView};
use crate::host::ScriptInstances;

macro_rules! component_view {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq)]
            pub struct $name(Component);

            impl ComponentView for $name {
                const TYPE: ComponentType = ComponentType::$name;

                fn from_component(component: Component) -> Self {
                    debug_assert_eq!(component.ty(), Self::TYPE);
                    Self(component)
                }

                fn component(&self) -> &Component {
                    &self.0
                }
            }

            impl std::ops::Deref for $name {
                type Target = Component;

                fn deref(&self) -> &Component {
                    &self.0
                }
            }
        )*
    };
}

component_view! {
    /// Position, rotation and scale. Every entity has exactly one.
    Transform,
    ModelRenderer,
    TerrainRenderer,
    Camera,
    Light,
    /// Collision volume hit by raycasts.
    Collider,
    RigidBody,
    Collider2D,
    RigidBody2D,
    SpriteRenderer,
    TilemapRenderer,
    NativeScript,
    /// Host for a user behaviour, selected by its script asset.
    Script,
}

impl Transform {
    pub fn local_position(&self, engine: &(impl ComponentHost + TransformCalls + ?Sized)) -> Vec3 {
        engine.local_position(self.resolve(engine)).unwrap_or_default()
    }

    pub fn set_local_position(&self, engine: &mut (impl ComponentHost + TransformCalls + ?Sized), position: Vec3) {
        let handle = self.resolve(&*engine);
        engine.set_local_position(handle, position);
    }

    pub fn local_rotation(&self, engine: &(impl ComponentHost + TransformCalls + ?Sized)) -> Quat {
        engine.local_rotation(self.resolve(engine)).unwrap_or_default()
    }

    pub fn set_local_rotation(&self, engine: &mut (impl ComponentHost + TransformCalls + ?Sized), rotation: Quat) {
        let handle = self.resolve(&*engine);
        engine.set_local_rotation(handle, rotation);
    }

    pub fn local_scale(&self, engine: &(impl ComponentHost + TransformCalls + ?Sized)) -> Vec3 {
        engine.local_scale(self.resolve(engine)).unwrap_or(Vec3::ONE)
    }

    pub fn set_local_scale(&self, engine: &mut (impl ComponentHost + TransformCalls + ?Sized), scale: Vec3) {
        let handle = self.resolve(&*engine);
        engine.set_local_scale(handle, scale);
    }

    /// Local rotation as XYZ Euler angles in degrees.
    pub fn euler_angles(&self, engine: &(impl ComponentHost + TransformCalls + ?Sized)) -> Vec3 {
        to_euler_degrees(self.local_rotation(engine))
    }

    pub fn set_euler_angles(&self, engine: &mut (impl ComponentHost + TransformCalls + ?Sized), angles: Vec3) {
        self.set_local_rotation(engine, from_euler_degrees(angles));
    }

    /// World-space position, derived through the parent chain.
    pub fn position(&self, engine: &(impl ComponentHost + TransformCalls + ?Sized)) -> Vec3 {
        engine.world_position(self.resolve(engine)).unwrap_or_default()
    }

    pub fn rotation(&self, engine: &(impl ComponentHost + TransformCalls + ?Sized)) -> Quat {
        engine.world_rotation(self.resolve(engine)).unwrap_or_default()
    }

    pub fn scale(&self, engine: &(impl ComponentHost + TransformCalls + ?Sized)) -> Vec3 {
        engine.world_scale(self.resolve(engine)).unwrap_or(Vec3::ONE)
    }

    pub fn up(&self, engine: &(impl ComponentHost + TransformCalls + ?Sized)) -> Vec3 {
        engine.up(self.resolve(engine)).unwrap_or(Vec3::Y)
    }

    pub fn right(&self, engine: &(impl ComponentHost + TransformCalls + ?Sized)) -> Vec3 {
        engine.right(self.resolve(engine)).unwrap_or(Vec3::X)
    }

    pub fn forward(&self, engine: &(impl ComponentHost + TransformCalls + ?Sized)) -> Vec3 {
        engine.forward(self.resolve(engine)).unwrap_or(Vec3::NEG_Z)
    }
}

impl RigidBody {
    /// Queue a force. It takes effect on the next physics step.
    pub fn apply_force(
        &self,
        engine: &mut (impl ComponentHost + RigidBodyCalls + ?Sized),
        force: Vec3,
        mode: ForceMode,
    ) {
        let handle = self.resolve(&*engine);
        engine.apply_force(handle, force, mode);
    }

    pub fn velocity(&self, engine: &(impl ComponentHost + RigidBodyCalls + ?Sized)) -> Vec3 {
        engine.velocity(self.resolve(engine)).unwrap_or_default()
    }

    pub fn mass(&self, engine: &(impl ComponentHost + RigidBodyCalls + ?Sized)) -> f32 {
        engine.mass(self.resolve(engine)).unwrap_or_default()
    }

    pub fn set_mass(&self, engine: &mut (impl ComponentHost + RigidBodyCalls + ?Sized), mass: f32) {
        let handle = self.resolve(&*engine);
        engine.set_mass(handle, mass);
    }
}

impl Collider {
    pub fn shape(&self, engine: &(impl ComponentHost + PhysicsCalls + ?Sized)) -> ColliderShape {
        engine.collider_shape(self.resolve(engine)).unwrap_or_default()
    }

    pub fn set_shape(&self, engine: &mut (impl ComponentHost + PhysicsCalls + ?Sized), shape: ColliderShape) {
        let handle = self.resolve(&*engine);
        engine.set_collider_shape(handle, shape);
    }

    /// Layer bit index, 0..=31.
    pub fn layer(&self, engine: &(impl ComponentHost + PhysicsCalls + ?Sized)) -> u8 {
        engine.collider_layer(self.resolve(engine)).unwrap_or_default()
    }

    pub fn set_layer(&self, engine: &mut (impl ComponentHost + PhysicsCalls + ?Sized), layer: u8) {
        let handle = self.resolve(&*engine);
        engine.set_collider_layer(handle, layer);
    }
}

impl ModelRenderer {
    pub fn model(&self, engine: &(impl ComponentHost + RendererCalls + ?Sized)) -> Option<Model> {
        let asset = engine.renderer_model(self.resolve(engine))?;
        Some(Model::from_asset(Asset::new(asset, AssetType::Model)))
    }

    pub fn set_model(
        &self,
        engine: &mut (impl ComponentHost + RendererCalls + AssetCalls + ?Sized),
        model: Option<&Model>,
    ) {
        let handle = self.resolve(&*engine);
        let model = match model {
            Some(model) => match model.resolve(&*engine) {
                asset if asset.0.is_sentinel() => return,
                asset => Some(asset),
            },
            None => None,
        };
        engine.set_renderer_model(handle, model);
    }
}

impl Script {
    pub fn script_asset(&self, engine: &(impl ComponentHost + ScriptCalls + ?Sized)) -> Option<ScriptAsset> {
        let asset = engine.script_asset(self.resolve(engine))?;
        Some(ScriptAsset::from_asset(Asset::new(asset, AssetType::Script)))
    }

    pub fn set_script_asset(
        &self,
        engine: &mut (impl ComponentHost + ScriptCalls + AssetCalls + ?Sized),
        script: Option<&ScriptAsset>,
    ) {
        let handle = self.resolve(&*engine);
        let script = match script {
            Some(script) => match script.resolve(&*engine) {
                asset if asset.0.is_sentinel() => return,
                asset => Some(asset),
            },
            None => None,
        };
        engine.set_script_asset(handle, script);
    }

    /// The behaviour bound to this component, if it is a `T`.
    pub fn get_script_instance<'s, T: Behaviour>(
        &self,
        engine: &(impl ComponentHost + ?Sized),
        scripts: &'s ScriptInstances,
    ) -> Option<&'s T> {
        let handle = self.resolve(engine);
        scripts.get_as::<T>(ComponentKey::new(handle, ComponentType::Script))
    }
}
