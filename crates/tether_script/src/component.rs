//! Component proxy and type dispatch
//!
//! A component is addressed by `(handle, type)`. Its validity check asks the
//! store about both the component slot and the owning entity, so destroying
//! an entity invalidates its components through an explicit comparison.

use tether_core::native::{ComponentCalls, EntityCalls};
use tether_core::{ComponentKey, ComponentType, Handle, ValidityGuard};

use crate::entity::Entity;
use crate::views::{
    Camera, Collider, Collider2D, Light, ModelRenderer, NativeScript, RigidBody, RigidBody2D,
    Script, SpriteRenderer, TerrainRenderer, TilemapRenderer, Transform,
};

/// Calls every component proxy needs: its own table plus its owner's
/// liveness.
pub trait ComponentHost: EntityCalls + ComponentCalls {}

impl<T: EntityCalls + ComponentCalls + ?Sized> ComponentHost for T {}

#[derive(Debug, Clone)]
pub struct Component {
    guard: ValidityGuard,
    ty: ComponentType,
    parent: Entity,
}

impl Component {
    pub(crate) fn new(handle: Handle, ty: ComponentType, parent: Entity) -> Self {
        Self {
            guard: ValidityGuard::new(handle),
            ty,
            parent,
        }
    }

    pub fn ty(&self) -> ComponentType {
        self.ty
    }

    /// Owning entity. Fixed for the component's lifetime.
    pub fn parent(&self) -> &Entity {
        &self.parent
    }

    /// Identity within this component type's handle space.
    pub fn id(&self) -> u64 {
        self.guard.id()
    }

    /// Raw address, for keying script instances. Not liveness-checked.
    pub fn key(&self) -> ComponentKey {
        ComponentKey::new(self.guard.raw(), self.ty)
    }

    fn alive(&self, engine: &(impl ComponentHost + ?Sized), handle: Handle) -> bool {
        engine.component_exists(ComponentKey::new(handle, self.ty))
            && engine.entity_exists(self.parent.raw())
    }

    pub fn is_valid(&self, engine: &(impl ComponentHost + ?Sized)) -> bool {
        self.guard.probe(|h| self.alive(engine, h))
    }

    pub(crate) fn resolve(&self, engine: &(impl ComponentHost + ?Sized)) -> Handle {
        self.guard.resolve_with(engine, |h| self.alive(engine, h))
    }

    /// Whether this component takes part in per-frame updates.
    pub fn active(&self, engine: &(impl ComponentHost + ?Sized)) -> bool {
        let handle = self.resolve(engine);
        engine.component_active(ComponentKey::new(handle, self.ty))
    }

    pub fn set_active(&self, engine: &mut (impl ComponentHost + ?Sized), active: bool) {
        let handle = self.resolve(&*engine);
        engine.set_component_active(ComponentKey::new(handle, self.ty), active);
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.id() == other.id()
    }
}

impl Eq for Component {}

/// A strongly typed view over one component type.
pub trait ComponentView: Sized {
    const TYPE: ComponentType;

    /// Wrap a component. Callers guarantee `component.ty() == Self::TYPE`.
    fn from_component(component: Component) -> Self;

    fn component(&self) -> &Component;
}

/// Any typed view, tagged by component type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyComponent {
    Transform(Transform),
    ModelRenderer(ModelRenderer),
    TerrainRenderer(TerrainRenderer),
    Camera(Camera),
    Light(Light),
    Collider(Collider),
    RigidBody(RigidBody),
    Collider2D(Collider2D),
    RigidBody2D(RigidBody2D),
    SpriteRenderer(SpriteRenderer),
    TilemapRenderer(TilemapRenderer),
    NativeScript(NativeScript),
    Script(Script),
}

impl AnyComponent {
    /// Pick the view matching `component.ty()`.
    pub fn from_component(component: Component) -> Self {
        match component.ty() {
            ComponentType::Transform => AnyComponent::Transform(Transform::from_component(component)),
            ComponentType::ModelRenderer => {
                AnyComponent::ModelRenderer(ModelRenderer::from_component(component))
            }
            ComponentType::TerrainRenderer => {
                AnyComponent::TerrainRenderer(TerrainRenderer::from_component(component))
            }
            ComponentType::Camera => AnyComponent::Camera(Camera::from_component(component)),
            ComponentType::Light => AnyComponent::Light(Light::from_component(component)),
            ComponentType::Collider => AnyComponent::Collider(Collider::from_component(component)),
            ComponentType::RigidBody => AnyComponent::RigidBody(RigidBody::from_component(component)),
            ComponentType::Collider2D => AnyComponent::Collider2D(Collider2D::from_component(component)),
            ComponentType::RigidBody2D => {
                AnyComponent::RigidBody2D(RigidBody2D::from_component(component))
            }
            ComponentType::SpriteRenderer => {
                AnyComponent::SpriteRenderer(SpriteRenderer::from_component(component))
            }
            ComponentType::TilemapRenderer => {
                AnyComponent::TilemapRenderer(TilemapRenderer::from_component(component))
            }
            ComponentType::NativeScript => {
                AnyComponent::NativeScript(NativeScript::from_component(component))
            }
            ComponentType::Script => AnyComponent::Script(Script::from_component(component)),
        }
    }

    pub fn component(&self) -> &Component {
        match self {
            AnyComponent::Transform(view) => view.component(),
            AnyComponent::ModelRenderer(view) => view.component(),
            AnyComponent::TerrainRenderer(view) => view.component(),
            AnyComponent::Camera(view) => view.component(),
            AnyComponent::Light(view) => view.component(),
            AnyComponent::Collider(view) => view.component(),
            AnyComponent::RigidBody(view) => view.component(),
            AnyComponent::Collider2D(view) => view.component(),
            AnyComponent::RigidBody2D(view) => view.component(),
            AnyComponent::SpriteRenderer(view) => view.component(),
            AnyComponent::TilemapRenderer(view) => view.component(),
            AnyComponent::NativeScript(view) => view.component(),
            AnyComponent::Script(view) => view.component(),
        }
    }

    pub fn ty(&self) -> ComponentType {
        self.component().ty()
    }

    /// Narrow to a concrete view. `None` on a type mismatch.
    pub fn into_view<T: ComponentView>(self) -> Option<T> {
        if self.ty() != T::TYPE {
            return None;
        }
        let component = self.component().clone();
        Some(T::from_component(component))
    }
}
