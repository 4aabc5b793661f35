//! Asset-backed state: renderer and script bindings, blueprints, levels

use tether_asset::{AssetData, ComponentData, ComponentSnapshot, EntitySnapshot, LevelData, TransformSnapshot};
use tether_core::native::{
    AssetCalls, ComponentCalls, EntityCalls, LogCalls, PhysicsCalls, RendererCalls, ScriptCalls,
};
use tether_core::{AssetHandle, AssetType, ComponentKey, ComponentType, Handle, Severity};

use crate::records::{ComponentState, TransformData};
use crate::world::World;

impl World {
    fn asset_of_type(&self, asset: AssetHandle, ty: AssetType) -> bool {
        self.assets.get(asset).is_some_and(|record| record.ty == ty)
    }

    fn asset_path_of(&self, asset: Option<AssetHandle>) -> Option<String> {
        asset.and_then(|a| self.assets.get(a)).map(|r| r.path.clone())
    }

    /// Bind an asset reference held by a component, checking its type.
    fn bind_asset(&mut self, key: ComponentKey, asset: Option<AssetHandle>, expected: AssetType) {
        if let Some(asset) = asset {
            if !self.asset_of_type(asset, expected) {
                self.log(
                    Severity::Warning,
                    &format!("asset {} is not a {expected}", asset.0),
                );
                return;
            }
        }
        let Some(record) = self.component_mut(key) else {
            return;
        };
        match &mut record.state {
            ComponentState::ModelRenderer(slot) | ComponentState::Script(slot) => *slot = asset,
            _ => {}
        }
    }

    fn bound_asset(&self, key: ComponentKey) -> Option<AssetHandle> {
        match self.component(key)?.state {
            ComponentState::ModelRenderer(asset) | ComponentState::Script(asset) => asset,
            _ => None,
        }
    }

    /// Serialize an entity subtree.
    pub fn capture(&self, entity: Handle, skip_temporary: bool) -> Option<EntitySnapshot> {
        // Each frame holds a node and its not yet captured children, reversed.
        let mut stack = vec![(
            self.capture_node(entity)?,
            self.captured_children(entity, skip_temporary),
        )];
        loop {
            let next = match stack.last_mut() {
                Some((_, pending)) => pending.pop(),
                None => return None,
            };
            match next {
                Some(child) => {
                    if let Some(node) = self.capture_node(child) {
                        stack.push((node, self.captured_children(child, skip_temporary)));
                    }
                }
                None => {
                    let (node, _) = stack.pop()?;
                    match stack.last_mut() {
                        Some((parent, _)) => parent.children.push(node),
                        None => return Some(node),
                    }
                }
            }
        }
    }

    fn captured_children(&self, entity: Handle, skip_temporary: bool) -> Vec<Handle> {
        self.entity_children(entity)
            .into_iter()
            .rev()
            .filter(|child| !(skip_temporary && self.entity_temporary(*child)))
            .collect()
    }

    /// One entity without its children.
    fn capture_node(&self, entity: Handle) -> Option<EntitySnapshot> {
        let record = self.entities.get(entity)?;
        let transform = self.transform_data(record.transform).copied().unwrap_or_default();

        let components = record
            .components
            .iter()
            .filter(|key| key.ty != ComponentType::Transform)
            .filter_map(|key| {
                let component = self.component(*key)?;
                let data = match &component.state {
                    ComponentState::RigidBody(body) => ComponentData::RigidBody { mass: body.mass },
                    ComponentState::Collider(collider) => ComponentData::Collider {
                        shape: collider.shape,
                        layer: collider.layer,
                    },
                    ComponentState::ModelRenderer(model) => ComponentData::ModelRenderer {
                        model: self.asset_path_of(*model),
                    },
                    ComponentState::Script(script) => ComponentData::Script {
                        script: self.asset_path_of(*script),
                    },
                    ComponentState::Transform(_) | ComponentState::Marker => ComponentData::None,
                };
                Some(ComponentSnapshot {
                    ty: key.ty,
                    active: component.active,
                    data,
                })
            })
            .collect();

        Some(EntitySnapshot {
            name: record.name.clone(),
            active: record.active,
            is_static: record.is_static,
            tags: record.tags,
            transform: TransformSnapshot {
                position: transform.position,
                rotation: transform.rotation,
                scale: transform.scale,
            },
            components,
            children: Vec::new(),
        })
    }

    /// Create entities from a snapshot, parented under `parent`.
    ///
    /// Entities are created parent first, children in stored order.
    pub fn spawn(&mut self, snapshot: &EntitySnapshot, parent: Option<Handle>) -> Handle {
        let root = self.spawn_node(snapshot, parent);
        let mut stack: Vec<(&EntitySnapshot, Handle)> =
            snapshot.children.iter().rev().map(|child| (child, root)).collect();
        while let Some((node, parent)) = stack.pop() {
            let entity = self.spawn_node(node, Some(parent));
            stack.extend(node.children.iter().rev().map(|child| (child, entity)));
        }
        root
    }

    fn spawn_node(&mut self, snapshot: &EntitySnapshot, parent: Option<Handle>) -> Handle {
        let entity = self.create_entity(&snapshot.name);
        self.set_entity_active(entity, snapshot.active);
        self.set_entity_static(entity, snapshot.is_static);
        self.set_entity_tags(entity, snapshot.tags);
        if let Some(transform) = self.entity_transform(entity) {
            if let Some(data) = self.transform_data_mut(transform) {
                *data = TransformData {
                    position: snapshot.transform.position,
                    rotation: snapshot.transform.rotation,
                    scale: snapshot.transform.scale,
                };
            }
        }

        for component in &snapshot.components {
            let Some(handle) = self.add_component(entity, component.ty) else {
                continue;
            };
            let key = ComponentKey::new(handle, component.ty);
            self.set_component_active(key, component.active);
            self.restore_component(key, &component.data);
        }

        if parent.is_some() {
            self.set_entity_parent(entity, parent);
        }
        entity
    }

    fn restore_component(&mut self, key: ComponentKey, data: &ComponentData) {
        match data {
            ComponentData::None => {}
            ComponentData::RigidBody { mass } => {
                if let Some(ComponentState::RigidBody(body)) = self.component_mut(key).map(|r| &mut r.state) {
                    body.mass = *mass;
                }
            }
            ComponentData::Collider { shape, layer } => {
                self.set_collider_shape(key.handle, *shape);
                self.set_collider_layer(key.handle, *layer);
            }
            ComponentData::ModelRenderer { model } => {
                let asset = self.resolve_reference(model.as_deref());
                self.bind_asset(key, asset, AssetType::Model);
            }
            ComponentData::Script { script } => {
                let asset = self.resolve_reference(script.as_deref());
                self.bind_asset(key, asset, AssetType::Script);
            }
        }
    }

    fn resolve_reference(&self, path: Option<&str>) -> Option<AssetHandle> {
        let path = path?;
        let asset = self.assets.lookup(path);
        if asset.is_none() {
            self.log(Severity::Warning, &format!("missing asset '{path}'"));
        }
        asset
    }

    /// Root entities in creation order.
    fn roots(&self) -> Vec<Handle> {
        self.order
            .iter()
            .copied()
            .filter(|h| self.entity_parent(*h).is_none())
            .collect()
    }
}

impl RendererCalls for World {
    fn renderer_model(&self, renderer: Handle) -> Option<AssetHandle> {
        self.bound_asset(ComponentKey::new(renderer, ComponentType::ModelRenderer))
    }

    fn set_renderer_model(&mut self, renderer: Handle, model: Option<AssetHandle>) {
        self.bind_asset(
            ComponentKey::new(renderer, ComponentType::ModelRenderer),
            model,
            AssetType::Model,
        );
    }
}

impl ScriptCalls for World {
    fn script_asset(&self, script: Handle) -> Option<AssetHandle> {
        self.bound_asset(ComponentKey::new(script, ComponentType::Script))
    }

    fn set_script_asset(&mut self, script: Handle, asset: Option<AssetHandle>) {
        self.bind_asset(
            ComponentKey::new(script, ComponentType::Script),
            asset,
            AssetType::Script,
        );
    }
}

impl AssetCalls for World {
    fn asset_by_path(&self, path: &str) -> Option<AssetHandle> {
        self.assets.lookup(path)
    }

    fn asset_exists(&self, asset: AssetHandle) -> bool {
        self.assets.contains(asset)
    }

    fn asset_type(&self, asset: AssetHandle) -> AssetType {
        self.assets.get(asset).map(|r| r.ty).unwrap_or_default()
    }

    fn asset_path(&self, asset: AssetHandle) -> Option<String> {
        self.assets.get(asset).map(|r| r.path.clone())
    }

    fn asset_file_name(&self, asset: AssetHandle) -> Option<String> {
        self.assets.get(asset).map(|r| r.file_name().to_string())
    }

    fn blueprint_has_entity(&self, blueprint: AssetHandle) -> bool {
        self.assets
            .get(blueprint)
            .is_some_and(|r| matches!(r.data, AssetData::Blueprint(Some(_))))
    }

    fn blueprint_create_from_entity(&mut self, blueprint: AssetHandle, entity: Handle) -> bool {
        if !self.asset_of_type(blueprint, AssetType::Blueprint) {
            return false;
        }
        let Some(snapshot) = self.capture(entity, false) else {
            return false;
        };
        if let Some(record) = self.assets.get_mut(blueprint) {
            tracing::debug!(path = %record.path, entities = snapshot.entity_count(), "blueprint captured");
            record.data = AssetData::Blueprint(Some(snapshot));
        }
        true
    }

    fn blueprint_spawn_entity(&mut self, blueprint: AssetHandle) -> Option<Handle> {
        let snapshot = match &self.assets.get(blueprint)?.data {
            AssetData::Blueprint(Some(snapshot)) => snapshot.clone(),
            _ => return None,
        };
        Some(self.spawn(&snapshot, None))
    }

    fn level_create_from_world(&mut self, level: AssetHandle) -> bool {
        if !self.asset_of_type(level, AssetType::Level) {
            return false;
        }
        let entities: Vec<_> = self
            .roots()
            .into_iter()
            .filter(|root| !self.entity_temporary(*root))
            .filter_map(|root| self.capture(root, true))
            .collect();

        if let Some(record) = self.assets.get_mut(level) {
            tracing::info!(path = %record.path, roots = entities.len(), "level captured");
            record.data = AssetData::Level(LevelData { entities });
        }
        true
    }

    fn level_load(&mut self, level: AssetHandle) -> bool {
        let data = match self.assets.get(level).map(|r| &r.data) {
            Some(AssetData::Level(data)) => data.clone(),
            _ => return false,
        };

        // Temporary entities survive; lift them out of trees being torn down.
        let survivors: Vec<_> = self
            .order
            .iter()
            .copied()
            .filter(|h| self.entity_temporary(*h))
            .collect();
        for survivor in survivors {
            let parent_is_temporary = self
                .entity_parent(survivor)
                .is_some_and(|parent| self.entity_temporary(parent));
            if !parent_is_temporary {
                self.set_entity_parent(survivor, None);
            }
        }
        for root in self.roots() {
            if !self.entity_temporary(root) {
                self.destroy_entity(root);
            }
        }

        for snapshot in &data.entities {
            self.spawn(snapshot, None);
        }
        tracing::info!(roots = data.entities.len(), "level loaded");
        true
    }

    fn script_type_name(&self, script: AssetHandle) -> Option<String> {
        match &self.assets.get(script)?.data {
            AssetData::Script { type_name } => Some(type_name.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use tether_core::native::TransformCalls;
    use tether_core::ColliderShape;

    fn world_with_assets() -> World {
        let mut world = World::new();
        let assets = world.assets_mut();
        assets.register("crate.bpt", AssetType::Blueprint, AssetData::Blueprint(None));
        assets.register("one.lvl", AssetType::Level, AssetData::Level(LevelData::default()));
        assets.register("crate.mdl", AssetType::Model, AssetData::Opaque);
        assets.register(
            "spinner.rs",
            AssetType::Script,
            AssetData::Script {
                type_name: "spinner".into(),
            },
        );
        world
    }

    #[test]
    fn test_renderer_rejects_wrong_asset_type() {
        let mut world = world_with_assets();
        let e = world.create_entity("");
        let renderer = world.add_component(e, ComponentType::ModelRenderer).unwrap();
        let model = world.asset_by_path("crate.mdl").unwrap();
        let level = world.asset_by_path("one.lvl").unwrap();

        world.set_renderer_model(renderer, Some(model));
        assert_eq!(world.renderer_model(renderer), Some(model));

        world.set_renderer_model(renderer, Some(level));
        assert_eq!(world.renderer_model(renderer), Some(model));
        assert_eq!(world.diagnostics().len(), 1);
    }

    #[test]
    fn test_blueprint_capture_and_spawn() {
        let mut world = world_with_assets();
        let blueprint = world.asset_by_path("crate.bpt").unwrap();
        assert!(!world.blueprint_has_entity(blueprint));
        assert_eq!(world.blueprint_spawn_entity(blueprint), None);

        let source = world.create_entity("Crate");
        world.set_entity_tags(source, 0b101);
        let t = world.entity_transform(source).unwrap();
        world.set_local_position(t, Vec3::new(1.0, 2.0, 3.0));
        let collider = world.add_component(source, ComponentType::Collider).unwrap();
        world.set_collider_shape(collider, ColliderShape::Sphere { radius: 2.0 });
        let renderer = world.add_component(source, ComponentType::ModelRenderer).unwrap();
        let model = world.asset_by_path("crate.mdl");
        world.set_renderer_model(renderer, model);
        let child = world.create_entity("Lid");
        world.set_entity_parent(child, Some(source));

        assert!(world.blueprint_create_from_entity(blueprint, source));
        assert!(world.blueprint_has_entity(blueprint));

        let copy = world.blueprint_spawn_entity(blueprint).unwrap();
        assert_ne!(copy, source);
        assert_eq!(world.entity_name(copy).as_deref(), Some("Crate"));
        assert_eq!(world.entity_tags(copy), 0b101);
        let ct = world.entity_transform(copy).unwrap();
        assert_eq!(world.local_position(ct), Some(Vec3::new(1.0, 2.0, 3.0)));
        let copied_collider = world.get_component(copy, ComponentType::Collider).unwrap();
        assert_eq!(
            world.collider_shape(copied_collider),
            Some(ColliderShape::Sphere { radius: 2.0 })
        );
        let copied_renderer = world.get_component(copy, ComponentType::ModelRenderer).unwrap();
        assert_eq!(world.renderer_model(copied_renderer), model);

        let children = world.entity_children(copy);
        assert_eq!(children.len(), 1);
        assert_eq!(world.entity_name(children[0]).as_deref(), Some("Lid"));
    }

    #[test]
    fn test_capture_keeps_sibling_order() {
        let mut world = World::new();
        let root = world.create_entity("root");
        for name in ["a", "b", "c"] {
            let child = world.create_entity(name);
            world.set_entity_parent(child, Some(root));
        }

        let snapshot = world.capture(root, false).unwrap();
        let copy = world.spawn(&snapshot, None);
        let names: Vec<_> = world
            .entity_children(copy)
            .into_iter()
            .filter_map(|child| world.entity_name(child))
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_deep_hierarchy_round_trips() {
        let mut world = World::new();
        let root = world.create_entity("0");
        let mut tip = root;
        for depth in 1..2_000 {
            let next = world.create_entity(&depth.to_string());
            world.set_entity_parent(next, Some(tip));
            tip = next;
        }

        let snapshot = world.capture(root, false).unwrap();
        let copy = world.spawn(&snapshot, None);

        let mut depth = 0;
        let mut cursor = copy;
        while let Some(&child) = world.entity_children(cursor).first() {
            cursor = child;
            depth += 1;
        }
        assert_eq!(depth, 1_999);
        assert_eq!(world.entity_name(cursor).as_deref(), Some("1999"));
        assert_eq!(world.entity_count(), 4_000);
    }

    #[test]
    fn test_blueprint_requires_blueprint_asset() {
        let mut world = world_with_assets();
        let level = world.asset_by_path("one.lvl").unwrap();
        let e = world.create_entity("");
        assert!(!world.blueprint_create_from_entity(level, e));
    }

    #[test]
    fn test_level_roundtrip_keeps_temporary_entities() {
        let mut world = world_with_assets();
        let level = world.asset_by_path("one.lvl").unwrap();

        let saved = world.create_entity("Saved");
        let camera = world.create_entity("EditorCamera");
        world.set_entity_temporary(camera, true);
        let held = world.create_entity("HeldItem");
        world.set_entity_temporary(held, true);
        world.set_entity_parent(held, Some(saved));

        assert!(world.level_create_from_world(level));

        world.create_entity("AddedLater");
        assert!(world.level_load(level));

        // The original "Saved" is gone; a fresh copy was spawned.
        assert!(!world.entity_exists(saved));
        assert!(world.entity_exists(camera));
        assert!(world.entity_exists(held));
        assert_eq!(world.entity_parent(held), None);
        assert!(world.find_entity_by_name("AddedLater").is_none());

        let restored = world.find_entity_by_name("Saved").unwrap();
        assert!(world.entity_children(restored).is_empty());
        assert_eq!(world.entity_count(), 3);
    }

    #[test]
    fn test_script_type_name() {
        let world = world_with_assets();
        let script = world.asset_by_path("spinner.rs").unwrap();
        let model = world.asset_by_path("crate.mdl").unwrap();
        assert_eq!(world.script_type_name(script).as_deref(), Some("spinner"));
        assert_eq!(world.script_type_name(model), None);
        assert_eq!(world.asset_file_name(model).as_deref(), Some("crate.mdl"));
        assert_eq!(world.asset_type(script), AssetType::Script);
    }
}
