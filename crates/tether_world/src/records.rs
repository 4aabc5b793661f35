//! Row types stored in the world's tables

use glam::{Quat, Vec3};
use tether_core::{AssetHandle, ColliderShape, ComponentKey, ComponentType, ForceMode, Handle, TagMask};

#[derive(Debug, Clone)]
pub(crate) struct EntityRecord {
    pub name: String,
    pub active: bool,
    pub is_static: bool,
    pub temporary: bool,
    pub tags: TagMask,
    pub parent: Option<Handle>,
    pub children: Vec<Handle>,
    pub transform: Handle,
    /// Attachment order, Transform first.
    pub components: Vec<ComponentKey>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TransformData {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for TransformData {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BodyData {
    pub mass: f32,
    pub velocity: Vec3,
    /// Forces applied since the last step.
    pub pending: Vec<(Vec3, ForceMode)>,
}

impl Default for BodyData {
    fn default() -> Self {
        Self {
            mass: 1.0,
            velocity: Vec3::ZERO,
            pending: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ColliderData {
    pub shape: ColliderShape,
    pub layer: u8,
}

#[derive(Debug, Clone)]
pub(crate) enum ComponentState {
    Transform(TransformData),
    RigidBody(BodyData),
    Collider(ColliderData),
    ModelRenderer(Option<AssetHandle>),
    Script(Option<AssetHandle>),
    /// Types whose state lives in subsystems this store does not model.
    Marker,
}

impl ComponentState {
    pub fn initial(ty: ComponentType, collider_radius: f32) -> Self {
        match ty {
            ComponentType::Transform => ComponentState::Transform(TransformData::default()),
            ComponentType::RigidBody => ComponentState::RigidBody(BodyData::default()),
            ComponentType::Collider => ComponentState::Collider(ColliderData {
                shape: ColliderShape::Sphere {
                    radius: collider_radius,
                },
                layer: 0,
            }),
            ComponentType::ModelRenderer => ComponentState::ModelRenderer(None),
            ComponentType::Script => ComponentState::Script(None),
            _ => ComponentState::Marker,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ComponentRecord {
    pub owner: Handle,
    pub active: bool,
    pub state: ComponentState,
}

/// Types an entity may hold at most one of.
pub(crate) fn is_singleton(ty: ComponentType) -> bool {
    matches!(
        ty,
        ComponentType::Transform
            | ComponentType::RigidBody
            | ComponentType::RigidBody2D
            | ComponentType::Camera
    )
}
