//! Behaviour type registry
//!
//! Maps the type name a script asset declares to a factory for the native
//! behaviour implementing it.

use std::any::TypeId;
use std::collections::HashMap;

use crate::behaviour::Behaviour;

type Factory = Box<dyn Fn() -> Box<dyn Behaviour>>;

struct Registration {
    type_id: TypeId,
    factory: Factory,
}

#[derive(Default)]
pub struct ScriptRegistry {
    by_name: HashMap<String, Registration>,
    names: HashMap<TypeId, String>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under `name`, built with `T::default()`.
    pub fn register<T: Behaviour + Default>(&mut self, name: &str) -> &mut Self {
        self.register_with(name, T::default)
    }

    /// Register `T` under `name` with a custom factory.
    ///
    /// A second registration under the same name replaces the first.
    pub fn register_with<T: Behaviour>(&mut self, name: &str, factory: impl Fn() -> T + 'static) -> &mut Self {
        let registration = Registration {
            type_id: TypeId::of::<T>(),
            factory: Box::new(move || -> Box<dyn Behaviour> { Box::new(factory()) }),
        };
        if let Some(previous) = self.by_name.insert(name.to_string(), registration) {
            tracing::warn!(name, "behaviour registered twice, replacing");
            self.names.remove(&previous.type_id);
        }
        self.names.insert(TypeId::of::<T>(), name.to_string());
        self
    }

    pub fn instantiate(&self, name: &str) -> Option<Box<dyn Behaviour>> {
        self.by_name.get(name).map(|r| (r.factory)())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Name `T` was registered under.
    pub fn name_of<T: Behaviour>(&self) -> Option<&str> {
        self.names.get(&TypeId::of::<T>()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Spinner {
        speed: f32,
    }

    impl Behaviour for Spinner {}

    #[derive(Default)]
    struct Idle;

    impl Behaviour for Idle {}

    #[test]
    fn test_register_and_instantiate() {
        let mut registry = ScriptRegistry::new();
        registry.register::<Spinner>("Spinner");

        let instance = registry.instantiate("Spinner").unwrap();
        let spinner = instance.as_ref().as_any().downcast_ref::<Spinner>().unwrap();
        assert_eq!(spinner.speed, 0.0);
        assert!(registry.instantiate("Missing").is_none());
    }

    #[test]
    fn test_custom_factory() {
        let mut registry = ScriptRegistry::new();
        registry.register_with("Fast", || Spinner { speed: 9.0 });

        let instance = registry.instantiate("Fast").unwrap();
        let spinner = instance.as_ref().as_any().downcast_ref::<Spinner>().unwrap();
        assert_eq!(spinner.speed, 9.0);
    }

    #[test]
    fn test_name_of() {
        let mut registry = ScriptRegistry::new();
        registry.register::<Spinner>("Spinner").register::<Idle>("Idle");

        assert_eq!(registry.name_of::<Spinner>(), Some("Spinner"));
        assert_eq!(registry.name_of::<Idle>(), Some("Idle"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_reregister_replaces() {
        let mut registry = ScriptRegistry::new();
        registry.register::<Spinner>("Thing");
        registry.register::<Idle>("Thing");

        assert_eq!(registry.len(), 1);
        assert!(registry.name_of::<Spinner>().is_none());
        let instance = registry.instantiate("Thing").unwrap();
        assert!(instance.as_ref().as_any().is::<Idle>());
    }
}
