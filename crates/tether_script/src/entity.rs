//! Entity proxy and directory

use std::hash::{Hash, Hasher};

use tether_core::native::EntityCalls;
use tether_core::{ComponentKey, ComponentType, Handle, Severity, TagMask, ValidityGuard};

use crate::behaviour::Behaviour;
use crate::component::{AnyComponent, Component, ComponentView};
use crate::host::ScriptInstances;
use crate::views::Transform;

/// A world object. Holds only a guarded handle; every property read or
/// write goes to the engine.
#[derive(Debug, Clone)]
pub struct Entity {
    guard: ValidityGuard,
}

impl Entity {
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            guard: ValidityGuard::new(handle),
        }
    }

    pub fn invalid() -> Self {
        Self {
            guard: ValidityGuard::invalid(),
        }
    }

    /// Stable identity, comparable across proxies of the same entity.
    pub fn id(&self) -> u64 {
        self.guard.id()
    }

    pub(crate) fn raw(&self) -> Handle {
        self.guard.raw()
    }

    /// Check liveness without reporting.
    pub fn is_valid(&self, engine: &(impl EntityCalls + ?Sized)) -> bool {
        self.guard.probe(|h| engine.entity_exists(h))
    }

    pub(crate) fn resolve(&self, engine: &(impl EntityCalls + ?Sized)) -> Handle {
        self.guard.resolve_with(engine, |h| engine.entity_exists(h))
    }

    /// Destroy this entity, its descendants and all their components.
    ///
    /// Destroying an entity that is already gone only logs a warning.
    pub fn destroy(&self, engine: &mut (impl EntityCalls + ?Sized)) {
        if !self.is_valid(&*engine) {
            engine.log(Severity::Warning, "destroy called on an invalid entity");
            return;
        }
        engine.destroy_entity(self.guard.raw());
        self.guard.invalidate();
    }

    pub fn name(&self, engine: &(impl EntityCalls + ?Sized)) -> String {
        engine.entity_name(self.resolve(&*engine)).unwrap_or_default()
    }

    pub fn set_name(&self, engine: &mut (impl EntityCalls + ?Sized), name: &str) {
        let handle = self.resolve(&*engine);
        engine.set_entity_name(handle, name);
    }

    pub fn active(&self, engine: &(impl EntityCalls + ?Sized)) -> bool {
        engine.entity_active(self.resolve(&*engine))
    }

    pub fn set_active(&self, engine: &mut (impl EntityCalls + ?Sized), active: bool) {
        let handle = self.resolve(&*engine);
        engine.set_entity_active(handle, active);
    }

    /// Static entities promise not to move. Not enforced here.
    pub fn is_static(&self, engine: &(impl EntityCalls + ?Sized)) -> bool {
        engine.entity_static(self.resolve(&*engine))
    }

    pub fn set_static(&self, engine: &mut (impl EntityCalls + ?Sized), value: bool) {
        let handle = self.resolve(&*engine);
        engine.set_entity_static(handle, value);
    }

    /// Temporary entities are left out of saved levels and survive level loads.
    pub fn temporary(&self, engine: &(impl EntityCalls + ?Sized)) -> bool {
        engine.entity_temporary(self.resolve(&*engine))
    }

    pub fn set_temporary(&self, engine: &mut (impl EntityCalls + ?Sized), value: bool) {
        let handle = self.resolve(&*engine);
        engine.set_entity_temporary(handle, value);
    }

    pub fn tags(&self, engine: &(impl EntityCalls + ?Sized)) -> TagMask {
        engine.entity_tags(self.resolve(&*engine))
    }

    pub fn set_tags(&self, engine: &mut (impl EntityCalls + ?Sized), tags: TagMask) {
        let handle = self.resolve(&*engine);
        engine.set_entity_tags(handle, tags);
    }

    /// Direct children only.
    pub fn children(&self, engine: &(impl EntityCalls + ?Sized)) -> Vec<Entity> {
        engine
            .entity_children(self.resolve(&*engine))
            .into_iter()
            .map(Entity::from_handle)
            .collect()
    }

    pub fn parent(&self, engine: &(impl EntityCalls + ?Sized)) -> Option<Entity> {
        engine.entity_parent(self.resolve(&*engine)).map(Entity::from_handle)
    }

    /// Re-parent, or detach with `None`. Returns `false` if refused.
    pub fn set_parent(&self, engine: &mut (impl EntityCalls + ?Sized), parent: Option<&Entity>) -> bool {
        let handle = self.resolve(&*engine);
        let parent = parent.map(|p| p.resolve(&*engine));
        engine.set_entity_parent(handle, parent)
    }

    pub fn transform(&self, engine: &(impl EntityCalls + ?Sized)) -> Option<Transform> {
        let transform = engine.entity_transform(self.resolve(&*engine))?;
        Some(Transform::from_component(Component::new(
            transform,
            ComponentType::Transform,
            self.clone(),
        )))
    }

    pub fn has_component<T: ComponentView>(&self, engine: &(impl EntityCalls + ?Sized)) -> bool {
        self.has_component_of(engine, T::TYPE)
    }

    /// `None` if the entity is gone or the store refuses the add.
    pub fn add_component<T: ComponentView>(&self, engine: &mut (impl EntityCalls + ?Sized)) -> Option<T> {
        self.add_component_of(engine, T::TYPE)?.into_view()
    }

    pub fn get_component<T: ComponentView>(&self, engine: &(impl EntityCalls + ?Sized)) -> Option<T> {
        self.get_component_of(engine, T::TYPE)?.into_view()
    }

    /// Every component of type `T`, in attachment order.
    pub fn get_components<T: ComponentView>(&self, engine: &(impl EntityCalls + ?Sized)) -> Vec<T> {
        let handle = self.resolve(&*engine);
        engine
            .get_components(handle, T::TYPE)
            .into_iter()
            .map(|c| T::from_component(Component::new(c, T::TYPE, self.clone())))
            .collect()
    }

    pub fn has_component_of(&self, engine: &(impl EntityCalls + ?Sized), ty: ComponentType) -> bool {
        engine.has_component(self.resolve(&*engine), ty)
    }

    pub fn add_component_of(
        &self,
        engine: &mut (impl EntityCalls + ?Sized),
        ty: ComponentType,
    ) -> Option<AnyComponent> {
        let handle = self.resolve(&*engine);
        let component = engine.add_component(handle, ty)?;
        Some(AnyComponent::from_component(Component::new(component, ty, self.clone())))
    }

    pub fn get_component_of(&self, engine: &(impl EntityCalls + ?Sized), ty: ComponentType) -> Option<AnyComponent> {
        let component = engine.get_component(self.resolve(&*engine), ty)?;
        Some(AnyComponent::from_component(Component::new(component, ty, self.clone())))
    }

    /// Every component of any type, in attachment order.
    pub fn components(&self, engine: &(impl EntityCalls + ?Sized)) -> Vec<AnyComponent> {
        engine
            .entity_components(self.resolve(&*engine))
            .into_iter()
            .map(|key| AnyComponent::from_component(Component::new(key.handle, key.ty, self.clone())))
            .collect()
    }

    /// First script on this entity whose behaviour is a `T`.
    pub fn get_script<'s, T: Behaviour>(
        &self,
        engine: &(impl EntityCalls + ?Sized),
        scripts: &'s ScriptInstances,
    ) -> Option<&'s T> {
        let handle = self.resolve(&*engine);
        engine
            .get_components(handle, ComponentType::Script)
            .into_iter()
            .find_map(|c| scripts.get_as::<T>(ComponentKey::new(c, ComponentType::Script)))
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

/// Entity directory: creation and world-wide queries.
pub struct EntityList;

impl EntityList {
    /// New entity with an empty name.
    pub fn create(engine: &mut (impl EntityCalls + ?Sized)) -> Entity {
        Self::create_named(engine, "")
    }

    pub fn create_named(engine: &mut (impl EntityCalls + ?Sized), name: &str) -> Entity {
        Entity::from_handle(engine.create_entity(name))
    }

    /// First match under the store's tie-break order.
    pub fn find(engine: &(impl EntityCalls + ?Sized), name: &str) -> Option<Entity> {
        engine.find_entity_by_name(name).map(Entity::from_handle)
    }

    /// Every live entity whose tags intersect `mask`.
    pub fn find_by_tag(engine: &(impl EntityCalls + ?Sized), mask: TagMask) -> Vec<Entity> {
        if mask == 0 {
            return Vec::new();
        }
        engine
            .find_entities_by_tag(mask)
            .into_iter()
            .map(Entity::from_handle)
            .collect()
    }

    /// Snapshot of all live entities.
    pub fn all(engine: &(impl EntityCalls + ?Sized)) -> Vec<Entity> {
        engine
            .all_entities()
            .into_iter()
            .map(Entity::from_handle)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::RigidBody;
    use tether_world::World;

    #[test]
    fn test_create_and_destroy() {
        let mut world = World::new();
        let player = EntityList::create_named(&mut world, "Player");
        assert_eq!(player.name(&world), "Player");
        assert!(player.is_valid(&world));

        player.destroy(&mut world);
        assert!(!player.is_valid(&world));
        assert!(!player.active(&world));

        let diagnostics = world.take_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn test_stale_copy_reports_error() {
        let mut world = World::new();
        let entity = EntityList::create(&mut world);
        let copy = entity.clone();

        entity.destroy(&mut world);
        assert_eq!(copy.name(&world), "");
        assert!(copy.transform(&world).is_none());
        assert!(world
            .take_diagnostics()
            .iter()
            .any(|d| d.severity == Severity::Error));
    }

    #[test]
    fn test_double_destroy_warns() {
        let mut world = World::new();
        let entity = EntityList::create(&mut world);
        entity.destroy(&mut world);
        entity.destroy(&mut world);

        let diagnostics = world.take_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn test_stale_proxy_never_aliases_recycled_slot() {
        let mut world = World::new();
        let old = EntityList::create_named(&mut world, "old");
        old.destroy(&mut world);
        let new = EntityList::create_named(&mut world, "new");

        assert_ne!(old, new);
        assert!(!old.is_valid(&world));
        assert_eq!(new.name(&world), "new");
    }

    #[test]
    fn test_properties_round_trip() {
        let mut world = World::new();
        let entity = EntityList::create(&mut world);

        entity.set_name(&mut world, "crate");
        entity.set_active(&mut world, false);
        entity.set_static(&mut world, true);
        entity.set_temporary(&mut world, true);
        entity.set_tags(&mut world, 0b101);

        assert_eq!(entity.name(&world), "crate");
        assert!(!entity.active(&world));
        assert!(entity.is_static(&world));
        assert!(entity.temporary(&world));
        assert_eq!(entity.tags(&world), 0b101);
    }

    #[test]
    fn test_hierarchy() {
        let mut world = World::new();
        let parent = EntityList::create_named(&mut world, "parent");
        let child = EntityList::create_named(&mut world, "child");

        assert!(child.set_parent(&mut world, Some(&parent)));
        assert_eq!(parent.children(&world), vec![child.clone()]);
        assert_eq!(child.parent(&world), Some(parent.clone()));

        // A parent cannot become its own descendant.
        assert!(!parent.set_parent(&mut world, Some(&child)));

        parent.destroy(&mut world);
        assert!(!child.is_valid(&world));
    }

    #[test]
    fn test_component_typing() {
        let mut world = World::new();
        let entity = EntityList::create(&mut world);

        assert!(!entity.has_component::<RigidBody>(&world));
        let body = entity.add_component::<RigidBody>(&mut world).unwrap();
        assert!(entity.has_component::<RigidBody>(&world));
        assert_eq!(entity.get_component::<RigidBody>(&world), Some(body.clone()));
        assert_eq!(body.parent(), &entity);
    }

    #[test]
    fn test_second_transform_refused() {
        let mut world = World::new();
        let entity = EntityList::create(&mut world);
        let transform = entity.transform(&world).unwrap();

        assert!(entity.add_component::<Transform>(&mut world).is_none());
        assert_eq!(entity.get_components::<Transform>(&world), vec![transform.clone()]);
        assert!(transform.is_valid(&world));
    }

    #[test]
    fn test_components_in_attachment_order() {
        let mut world = World::new();
        let entity = EntityList::create(&mut world);
        entity.add_component_of(&mut world, ComponentType::Collider);
        entity.add_component_of(&mut world, ComponentType::Collider);
        entity.add_component_of(&mut world, ComponentType::Camera);

        let types: Vec<ComponentType> = entity.components(&world).iter().map(AnyComponent::ty).collect();
        assert_eq!(
            types,
            vec![
                ComponentType::Transform,
                ComponentType::Collider,
                ComponentType::Collider,
                ComponentType::Camera
            ]
        );
        assert_eq!(entity.get_components::<crate::views::Collider>(&world).len(), 2);
    }

    #[test]
    fn test_destroy_invalidates_components() {
        let mut world = World::new();
        let entity = EntityList::create(&mut world);
        let body = entity.add_component::<RigidBody>(&mut world).unwrap();

        entity.destroy(&mut world);
        assert!(!body.is_valid(&world));
        assert!(!entity.has_component::<RigidBody>(&world));
    }

    #[test]
    fn test_find_by_name() {
        let mut world = World::new();
        let first = EntityList::create_named(&mut world, "twin");
        EntityList::create_named(&mut world, "twin");

        assert_eq!(EntityList::find(&world, "twin"), Some(first));
        assert!(EntityList::find(&world, "nobody").is_none());
    }

    #[test]
    fn test_find_by_tag() {
        let mut world = World::new();
        let a = EntityList::create_named(&mut world, "A");
        let b = EntityList::create_named(&mut world, "B");
        let c = EntityList::create_named(&mut world, "C");
        a.set_tags(&mut world, 0b0001);
        b.set_tags(&mut world, 0b0010);
        c.set_tags(&mut world, 0b0011);

        assert_eq!(EntityList::find_by_tag(&world, 0b0001), vec![a, c.clone()]);
        assert_eq!(EntityList::find_by_tag(&world, 0b0010), vec![b, c]);
        assert!(EntityList::find_by_tag(&world, 0).is_empty());
    }

    #[test]
    fn test_clearing_tags_leaves_query() {
        let mut world = World::new();
        let a = EntityList::create(&mut world);
        a.set_tags(&mut world, 0b0100);
        assert_eq!(EntityList::find_by_tag(&world, 0b0100), vec![a.clone()]);

        a.set_tags(&mut world, 0);
        assert_eq!(a.tags(&world), 0);
        assert!(EntityList::find_by_tag(&world, 0b0100).is_empty());
    }

    #[test]
    fn test_all_is_a_snapshot() {
        let mut world = World::new();
        let a = EntityList::create(&mut world);
        let b = EntityList::create(&mut world);

        let all = EntityList::all(&world);
        a.destroy(&mut world);
        EntityList::create(&mut world);

        assert_eq!(all.len(), 2);
        assert_eq!(all[1], b);
        assert!(!all[0].is_valid(&world));
        assert_eq!(EntityList::all(&world).len(), 2);
    }

    #[test]
    fn test_works_through_dyn_engine() {
        let mut world = World::new();
        let engine: &mut dyn tether_core::NativeEngine = &mut world;
        let entity = EntityList::create_named(engine, "dyn");
        assert_eq!(entity.name(&*engine), "dyn");
        assert!(entity.add_component::<RigidBody>(engine).is_some());
    }
}
