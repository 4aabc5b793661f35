//! World storage, diagnostics, entity and component calls

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use tether_asset::AssetRegistry;
use tether_core::native::{ComponentCalls, EntityCalls, LogCalls};
use tether_core::{ComponentKey, ComponentType, Handle, Severity, TagMask};
use tether_services::{InputState, NameLookupOrder, WorldSettings};

use crate::records::{is_singleton, ComponentRecord, ComponentState, EntityRecord, TransformData};
use crate::table::Table;

/// A message sent through the script diagnostic channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

pub struct World {
    pub(crate) settings: WorldSettings,
    pub(crate) entities: Table<EntityRecord>,
    /// Live entities in creation order.
    pub(crate) order: Vec<Handle>,
    pub(crate) components: [Table<ComponentRecord>; ComponentType::ALL.len()],
    pub(crate) assets: AssetRegistry,
    pub(crate) input: InputState,
    diagnostics: RefCell<Vec<Diagnostic>>,
    fatal: Cell<bool>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self::with_settings(WorldSettings::default())
    }

    pub fn with_settings(settings: WorldSettings) -> Self {
        Self {
            settings,
            entities: Table::default(),
            order: Vec::new(),
            components: std::array::from_fn(|_| Table::default()),
            assets: AssetRegistry::new(),
            input: InputState::new(),
            diagnostics: RefCell::new(Vec::new()),
            fatal: Cell::new(false),
        }
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn component_count(&self, ty: ComponentType) -> usize {
        self.components[ty.index()].len()
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetRegistry {
        &mut self.assets
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Everything logged through the script channel so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }

    /// Set once a fatal message has been logged. Never cleared.
    pub fn fatal_raised(&self) -> bool {
        self.fatal.get()
    }

    pub(crate) fn table(&self, ty: ComponentType) -> &Table<ComponentRecord> {
        &self.components[ty.index()]
    }

    pub(crate) fn table_mut(&mut self, ty: ComponentType) -> &mut Table<ComponentRecord> {
        &mut self.components[ty.index()]
    }

    /// A component row, provided both it and its owner are live.
    pub(crate) fn component(&self, key: ComponentKey) -> Option<&ComponentRecord> {
        let record = self.table(key.ty).get(key.handle)?;
        self.entities.contains(record.owner).then_some(record)
    }

    pub(crate) fn component_mut(&mut self, key: ComponentKey) -> Option<&mut ComponentRecord> {
        let owner = self.table(key.ty).get(key.handle)?.owner;
        if !self.entities.contains(owner) {
            return None;
        }
        self.table_mut(key.ty).get_mut(key.handle)
    }

    pub(crate) fn transform_data(&self, transform: Handle) -> Option<&TransformData> {
        match &self
            .component(ComponentKey::new(transform, ComponentType::Transform))?
            .state
        {
            ComponentState::Transform(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn transform_data_mut(&mut self, transform: Handle) -> Option<&mut TransformData> {
        match &mut self
            .component_mut(ComponentKey::new(transform, ComponentType::Transform))?
            .state
        {
            ComponentState::Transform(data) => Some(data),
            _ => None,
        }
    }

    /// `entity` and every descendant, parents before children.
    pub(crate) fn subtree(&self, entity: Handle) -> Vec<Handle> {
        let mut out = Vec::new();
        let mut stack = vec![entity];
        while let Some(current) = stack.pop() {
            let Some(record) = self.entities.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(record.children.iter().rev().copied());
        }
        out
    }

    fn is_ancestor(&self, ancestor: Handle, mut entity: Handle) -> bool {
        while let Some(parent) = self.entities.get(entity).and_then(|r| r.parent) {
            if parent == ancestor {
                return true;
            }
            entity = parent;
        }
        false
    }

    fn detach(&mut self, entity: Handle) {
        let Some(parent) = self.entities.get_mut(entity).and_then(|r| r.parent.take()) else {
            return;
        };
        if let Some(parent) = self.entities.get_mut(parent) {
            parent.children.retain(|child| *child != entity);
        }
    }
}

impl LogCalls for World {
    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Verbose => tracing::trace!(target: "script", "{message}"),
            Severity::Info => tracing::info!(target: "script", "{message}"),
            Severity::Warning => tracing::warn!(target: "script", "{message}"),
            Severity::Error => tracing::error!(target: "script", "{message}"),
            Severity::Fatal => {
                tracing::error!(target: "script", fatal = true, "{message}");
                self.fatal.set(true);
            }
        }
        self.diagnostics.borrow_mut().push(Diagnostic {
            severity,
            message: message.to_string(),
        });
    }
}

impl EntityCalls for World {
    fn create_entity(&mut self, name: &str) -> Handle {
        let Some(entity) = self.entities.insert(EntityRecord {
            name: name.to_string(),
            active: true,
            is_static: false,
            temporary: false,
            tags: 0,
            parent: None,
            children: Vec::new(),
            transform: Handle::SENTINEL,
            components: Vec::new(),
        }) else {
            self.log(Severity::Fatal, "entity table exhausted");
            return Handle::SENTINEL;
        };

        let Some(transform) = self.table_mut(ComponentType::Transform).insert(ComponentRecord {
            owner: entity,
            active: true,
            state: ComponentState::Transform(TransformData::default()),
        }) else {
            self.entities.remove(entity);
            self.log(Severity::Fatal, "Transform table exhausted");
            return Handle::SENTINEL;
        };
        if let Some(record) = self.entities.get_mut(entity) {
            record.transform = transform;
            record
                .components
                .push(ComponentKey::new(transform, ComponentType::Transform));
        }

        self.order.push(entity);
        tracing::debug!(%entity, name, "entity created");
        entity
    }

    fn destroy_entity(&mut self, entity: Handle) -> bool {
        if !self.entities.contains(entity) {
            tracing::debug!(%entity, "destroy of dead entity ignored");
            return false;
        }

        self.detach(entity);
        let doomed: HashSet<Handle> = self.subtree(entity).into_iter().collect();
        for handle in &doomed {
            if let Some(record) = self.entities.remove(*handle) {
                for key in record.components {
                    self.table_mut(key.ty).remove(key.handle);
                }
            }
        }
        self.order.retain(|h| !doomed.contains(h));

        tracing::debug!(%entity, count = doomed.len(), "entity destroyed");
        true
    }

    fn entity_exists(&self, entity: Handle) -> bool {
        self.entities.contains(entity)
    }

    fn entity_name(&self, entity: Handle) -> Option<String> {
        self.entities.get(entity).map(|r| r.name.clone())
    }

    fn set_entity_name(&mut self, entity: Handle, name: &str) {
        if let Some(record) = self.entities.get_mut(entity) {
            record.name = name.to_string();
        }
    }

    fn entity_active(&self, entity: Handle) -> bool {
        self.entities.get(entity).is_some_and(|r| r.active)
    }

    fn set_entity_active(&mut self, entity: Handle, active: bool) {
        if let Some(record) = self.entities.get_mut(entity) {
            record.active = active;
        }
    }

    fn entity_static(&self, entity: Handle) -> bool {
        self.entities.get(entity).is_some_and(|r| r.is_static)
    }

    fn set_entity_static(&mut self, entity: Handle, value: bool) {
        if let Some(record) = self.entities.get_mut(entity) {
            record.is_static = value;
        }
    }

    fn entity_temporary(&self, entity: Handle) -> bool {
        self.entities.get(entity).is_some_and(|r| r.temporary)
    }

    fn set_entity_temporary(&mut self, entity: Handle, value: bool) {
        if let Some(record) = self.entities.get_mut(entity) {
            record.temporary = value;
        }
    }

    fn entity_tags(&self, entity: Handle) -> TagMask {
        self.entities.get(entity).map_or(0, |r| r.tags)
    }

    fn set_entity_tags(&mut self, entity: Handle, tags: TagMask) {
        if let Some(record) = self.entities.get_mut(entity) {
            record.tags = tags;
        }
    }

    fn entity_children(&self, entity: Handle) -> Vec<Handle> {
        self.entities
            .get(entity)
            .map(|r| r.children.clone())
            .unwrap_or_default()
    }

    fn entity_parent(&self, entity: Handle) -> Option<Handle> {
        self.entities.get(entity)?.parent
    }

    fn set_entity_parent(&mut self, entity: Handle, parent: Option<Handle>) -> bool {
        if !self.entities.contains(entity) {
            return false;
        }
        if let Some(parent) = parent {
            if !self.entities.contains(parent) {
                return false;
            }
            if parent == entity || self.is_ancestor(entity, parent) {
                self.log(
                    Severity::Warning,
                    &format!("cannot parent {entity} under {parent}: would create a cycle"),
                );
                return false;
            }
        }

        self.detach(entity);
        if let Some(parent) = parent {
            if let Some(record) = self.entities.get_mut(parent) {
                record.children.push(entity);
            }
            if let Some(record) = self.entities.get_mut(entity) {
                record.parent = Some(parent);
            }
        }
        true
    }

    fn entity_transform(&self, entity: Handle) -> Option<Handle> {
        self.entities.get(entity).map(|r| r.transform)
    }

    fn has_component(&self, entity: Handle, ty: ComponentType) -> bool {
        self.get_component(entity, ty).is_some()
    }

    fn add_component(&mut self, entity: Handle, ty: ComponentType) -> Option<Handle> {
        if !self.entities.contains(entity) {
            return None;
        }
        if is_singleton(ty) && self.has_component(entity, ty) {
            self.log(
                Severity::Warning,
                &format!("entity {entity} already has a {ty} component"),
            );
            return None;
        }

        let state = ComponentState::initial(ty, self.settings.default_collider_radius);
        let Some(handle) = self.table_mut(ty).insert(ComponentRecord {
            owner: entity,
            active: true,
            state,
        }) else {
            self.log(Severity::Fatal, &format!("{ty} table exhausted"));
            return None;
        };
        if let Some(record) = self.entities.get_mut(entity) {
            record.components.push(ComponentKey::new(handle, ty));
        }
        tracing::debug!(%entity, component = %handle, %ty, "component added");
        Some(handle)
    }

    fn get_component(&self, entity: Handle, ty: ComponentType) -> Option<Handle> {
        self.get_components(entity, ty).into_iter().next()
    }

    fn get_components(&self, entity: Handle, ty: ComponentType) -> Vec<Handle> {
        let Some(record) = self.entities.get(entity) else {
            return Vec::new();
        };
        record
            .components
            .iter()
            .filter(|key| key.ty == ty && self.table(ty).contains(key.handle))
            .map(|key| key.handle)
            .collect()
    }

    fn entity_components(&self, entity: Handle) -> Vec<ComponentKey> {
        self.entities
            .get(entity)
            .map(|r| r.components.clone())
            .unwrap_or_default()
    }

    fn find_entity_by_name(&self, name: &str) -> Option<Handle> {
        let matches = |h: &&Handle| self.entities.get(**h).is_some_and(|r| r.name == name);
        match self.settings.name_lookup {
            NameLookupOrder::FirstCreated => self.order.iter().find(matches).copied(),
            NameLookupOrder::LastCreated => self.order.iter().rev().find(matches).copied(),
        }
    }

    fn find_entities_by_tag(&self, mask: TagMask) -> Vec<Handle> {
        self.order
            .iter()
            .copied()
            .filter(|h| self.entities.get(*h).is_some_and(|r| r.tags & mask != 0))
            .collect()
    }

    fn all_entities(&self) -> Vec<Handle> {
        self.order.clone()
    }
}

impl ComponentCalls for World {
    fn component_exists(&self, key: ComponentKey) -> bool {
        self.component(key).is_some()
    }

    fn component_owner(&self, key: ComponentKey) -> Option<Handle> {
        self.component(key).map(|r| r.owner)
    }

    fn component_active(&self, key: ComponentKey) -> bool {
        self.component(key).is_some_and(|r| r.active)
    }

    fn set_component_active(&mut self, key: ComponentKey, active: bool) {
        if let Some(record) = self.component_mut(key) {
            record.active = active;
        }
    }
}
