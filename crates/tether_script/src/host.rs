//! Script host
//!
//! Binds a behaviour instance to every `Script` component whose asset names a
//! registered type, and drives the per-frame lifecycle.

use std::collections::{HashMap, HashSet};

use tether_core::{AssetHandle, ComponentKey, ComponentType, Handle, NativeEngine, Severity};

use crate::behaviour::{Behaviour, ScriptContext};
use crate::component::{Component, ComponentView};
use crate::entity::Entity;
use crate::registry::ScriptRegistry;
use crate::views::Script;

/// Live behaviour instances keyed by their script component.
#[derive(Default)]
pub struct ScriptInstances {
    instances: HashMap<ComponentKey, Box<dyn Behaviour>>,
}

impl ScriptInstances {
    pub fn get(&self, key: ComponentKey) -> Option<&dyn Behaviour> {
        self.instances.get(&key).map(|b| &**b)
    }

    /// The instance bound to `key`, if it is a `T`.
    pub fn get_as<T: Behaviour>(&self, key: ComponentKey) -> Option<&T> {
        self.get(key)?.as_any().downcast_ref::<T>()
    }

    pub fn contains(&self, key: ComponentKey) -> bool {
        self.instances.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    fn insert(&mut self, key: ComponentKey, behaviour: Box<dyn Behaviour>) {
        self.instances.insert(key, behaviour);
    }

    fn remove(&mut self, key: ComponentKey) -> Option<Box<dyn Behaviour>> {
        self.instances.remove(&key)
    }
}

pub struct ScriptHost {
    registry: ScriptRegistry,
    instances: ScriptInstances,
    /// Script asset each component was last bound against.
    bindings: HashMap<ComponentKey, Option<AssetHandle>>,
    started: HashSet<ComponentKey>,
}

impl ScriptHost {
    pub fn new(registry: ScriptRegistry) -> Self {
        Self {
            registry,
            instances: ScriptInstances::default(),
            bindings: HashMap::new(),
            started: HashSet::new(),
        }
    }

    pub fn registry(&self) -> &ScriptRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ScriptRegistry {
        &mut self.registry
    }

    pub fn instances(&self) -> &ScriptInstances {
        &self.instances
    }

    /// Run one frame.
    ///
    /// Instances run in entity creation order. `on_start` runs once before
    /// the first `on_update`. Scripts on inactive entities, or inactive
    /// scripts, are skipped but keep their state.
    pub fn update(&mut self, engine: &mut dyn NativeEngine, delta_time: f32) {
        self.prune(&*engine);
        let frame = self.bind(&*engine);

        for (entity, key) in frame {
            // An earlier behaviour this frame may have destroyed it.
            if !engine.component_exists(key) {
                continue;
            }
            if !engine.entity_active(entity) || !engine.component_active(key) {
                continue;
            }
            let Some(mut behaviour) = self.instances.remove(key) else {
                continue;
            };

            let mut ctx = ScriptContext {
                entity: Entity::from_handle(entity),
                script: Script::from_component(Component::new(
                    key.handle,
                    ComponentType::Script,
                    Entity::from_handle(entity),
                )),
                engine: &mut *engine,
                scripts: &self.instances,
            };
            if self.started.insert(key) {
                behaviour.on_start(&mut ctx);
            }
            behaviour.on_update(&mut ctx, delta_time);

            if engine.component_exists(key) {
                self.instances.insert(key, behaviour);
            } else {
                self.forget(key);
            }
        }
    }

    fn forget(&mut self, key: ComponentKey) {
        self.instances.remove(key);
        self.bindings.remove(&key);
        self.started.remove(&key);
    }

    fn prune(&mut self, engine: &dyn NativeEngine) {
        let dead: Vec<ComponentKey> = self
            .bindings
            .keys()
            .filter(|key| !engine.component_exists(**key))
            .copied()
            .collect();
        for key in dead {
            tracing::trace!(script = %key.handle, "dropping behaviour of destroyed script");
            self.forget(key);
        }
    }

    /// Bind new or re-pointed scripts. Returns this frame's run list.
    fn bind(&mut self, engine: &dyn NativeEngine) -> Vec<(Handle, ComponentKey)> {
        let mut frame = Vec::new();
        for entity in engine.all_entities() {
            for script in engine.get_components(entity, ComponentType::Script) {
                let key = ComponentKey::new(script, ComponentType::Script);
                // An unregistered asset unbinds like a cleared one.
                let asset = engine
                    .script_asset(script)
                    .filter(|asset| engine.asset_exists(*asset));
                if self.bindings.get(&key) != Some(&asset) {
                    self.rebind(engine, key, asset);
                }
                if self.instances.contains(key) {
                    frame.push((entity, key));
                }
            }
        }
        frame
    }

    fn rebind(&mut self, engine: &dyn NativeEngine, key: ComponentKey, asset: Option<AssetHandle>) {
        self.instances.remove(key);
        self.started.remove(&key);
        self.bindings.insert(key, asset);

        let Some(type_name) = asset.and_then(|a| engine.script_type_name(a)) else {
            return;
        };
        match self.registry.instantiate(&type_name) {
            Some(behaviour) => {
                tracing::debug!(script = %key.handle, type_name = %type_name, "bound behaviour");
                self.instances.insert(key, behaviour);
            }
            None => engine.log(
                Severity::Warning,
                &format!("no behaviour registered for script type '{type_name}'"),
            ),
        }
    }
}
