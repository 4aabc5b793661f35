//! Asset proxies
//!
//! Assets live in the engine's registry and are looked up by path. A proxy
//! carries the asset's type so a lookup through the wrong view fails
//! instead of aliasing.

use tether_core::native::{AssetCalls, EntityCalls, LogCalls};
use tether_core::{AssetHandle, AssetType, ValidityGuard};

use crate::entity::Entity;

#[derive(Debug, Clone)]
pub struct Asset {
    guard: ValidityGuard,
    ty: AssetType,
}

impl Asset {
    pub(crate) fn new(handle: AssetHandle, ty: AssetType) -> Self {
        Self {
            guard: ValidityGuard::new(handle.0),
            ty,
        }
    }

    pub fn ty(&self) -> AssetType {
        self.ty
    }

    pub fn id(&self) -> u64 {
        self.guard.id()
    }

    /// Raw handle. Not liveness-checked.
    pub fn handle(&self) -> AssetHandle {
        AssetHandle(self.guard.raw())
    }

    pub fn is_valid(&self, engine: &(impl AssetCalls + ?Sized)) -> bool {
        self.guard.probe(|h| engine.asset_exists(AssetHandle(h)))
    }

    pub(crate) fn resolve(&self, engine: &(impl AssetCalls + LogCalls + ?Sized)) -> AssetHandle {
        AssetHandle(
            self.guard
                .resolve_with(engine, |h| engine.asset_exists(AssetHandle(h))),
        )
    }

    /// Registry path, `/`-separated and relative to the asset root.
    pub fn path(&self, engine: &(impl AssetCalls + LogCalls + ?Sized)) -> String {
        engine.asset_path(self.resolve(engine)).unwrap_or_default()
    }

    pub fn file_name(&self, engine: &(impl AssetCalls + LogCalls + ?Sized)) -> String {
        engine.asset_file_name(self.resolve(engine)).unwrap_or_default()
    }
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Asset {}

/// A strongly typed view over one asset type.
pub trait AssetView: Sized {
    const TYPE: AssetType;

    fn from_asset(asset: Asset) -> Self;

    fn asset(&self) -> &Asset;
}

macro_rules! asset_view {
    ($($(#[$meta:meta])* $name:ident => $ty:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq)]
            pub struct $name(Asset);

            impl AssetView for $name {
                const TYPE: AssetType = AssetType::$ty;

                fn from_asset(asset: Asset) -> Self {
                    debug_assert_eq!(asset.ty(), Self::TYPE);
                    Self(asset)
                }

                fn asset(&self) -> &Asset {
                    &self.0
                }
            }

            impl std::ops::Deref for $name {
                type Target = Asset;

                fn deref(&self) -> &Asset {
                    &self.0
                }
            }
        )*
    };
}

asset_view! {
    /// A saved entity tree that can be spawned any number of times.
    Blueprint => Blueprint,
    /// A saved world.
    Level => Level,
    Model => Model,
    Texture2D => Texture2D,
    /// Source of a behaviour; selects the registered type by name.
    ScriptAsset => Script,
}

/// Asset lookup.
pub struct AssetManager;

impl AssetManager {
    /// Look up `path` as a `T`. `None` if missing or of another type.
    pub fn get<T: AssetView>(engine: &(impl AssetCalls + ?Sized), path: &str) -> Option<T> {
        let handle = engine.asset_by_path(path)?;
        let ty = engine.asset_type(handle);
        if ty != T::TYPE {
            tracing::debug!(path, found = %ty, wanted = %T::TYPE, "asset type mismatch");
            return None;
        }
        Some(T::from_asset(Asset::new(handle, ty)))
    }
}

impl Blueprint {
    /// Whether an entity tree has been stored in this blueprint.
    pub fn has_entity(&self, engine: &(impl AssetCalls + LogCalls + ?Sized)) -> bool {
        engine.blueprint_has_entity(self.resolve(engine))
    }

    /// Capture `entity` and its descendants, replacing any previous content.
    pub fn create_from_entity(
        &self,
        engine: &mut (impl AssetCalls + EntityCalls + ?Sized),
        entity: &Entity,
    ) -> bool {
        let blueprint = self.resolve(&*engine);
        let entity = entity.resolve(&*engine);
        engine.blueprint_create_from_entity(blueprint, entity)
    }

    /// Spawn a fresh copy of the stored tree as a root entity.
    pub fn spawn_entity(&self, engine: &mut (impl AssetCalls + LogCalls + ?Sized)) -> Option<Entity> {
        let blueprint = self.resolve(&*engine);
        engine.blueprint_spawn_entity(blueprint).map(Entity::from_handle)
    }
}

impl Level {
    /// Store every non-temporary entity in this level.
    pub fn create_from_world(&self, engine: &mut (impl AssetCalls + LogCalls + ?Sized)) -> bool {
        let level = self.resolve(&*engine);
        engine.level_create_from_world(level)
    }

    /// Replace the world's non-temporary entities with this level's.
    ///
    /// Proxies to replaced entities become invalid.
    pub fn load(&self, engine: &mut (impl AssetCalls + LogCalls + ?Sized)) -> bool {
        let level = self.resolve(&*engine);
        engine.level_load(level)
    }
}

impl ScriptAsset {
    /// Name of the behaviour type this script selects.
    pub fn type_name(&self, engine: &(impl AssetCalls + LogCalls + ?Sized)) -> Option<String> {
        engine.script_type_name(self.resolve(engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityList;
    use crate::views::RigidBody;
    use tether_asset::{AssetData, LevelData};
    use tether_world::World;

    fn world_with_assets() -> World {
        let mut world = World::new();
        let assets = world.assets_mut();
        assets.register("props/crate.bpt", AssetType::Blueprint, AssetData::Blueprint(None));
        assets.register("main.lvl", AssetType::Level, AssetData::Level(LevelData::default()));
        assets.register("crate.png", AssetType::Texture2D, AssetData::Opaque);
        assets.register(
            "spinner.rs",
            AssetType::Script,
            AssetData::Script {
                type_name: "Spinner".to_string(),
            },
        );
        world
    }

    #[test]
    fn test_lookup_checks_type() {
        let world = world_with_assets();

        let texture = AssetManager::get::<Texture2D>(&world, "crate.png").unwrap();
        assert_eq!(texture.path(&world), "crate.png");
        assert!(AssetManager::get::<Model>(&world, "crate.png").is_none());
        assert!(AssetManager::get::<Model>(&world, "missing.mdl").is_none());
    }

    #[test]
    fn test_file_name() {
        let world = world_with_assets();
        let blueprint = AssetManager::get::<Blueprint>(&world, "props/crate.bpt").unwrap();
        assert_eq!(blueprint.file_name(&world), "crate.bpt");
    }

    #[test]
    fn test_script_type_name() {
        let world = world_with_assets();
        let script = AssetManager::get::<ScriptAsset>(&world, "spinner.rs").unwrap();
        assert_eq!(script.type_name(&world).as_deref(), Some("Spinner"));
    }

    #[test]
    fn test_blueprint_capture_and_spawn() {
        let mut world = world_with_assets();
        let blueprint = AssetManager::get::<Blueprint>(&world, "props/crate.bpt").unwrap();
        assert!(!blueprint.has_entity(&world));
        assert!(blueprint.spawn_entity(&mut world).is_none());

        let source = EntityList::create_named(&mut world, "crate");
        source.add_component::<RigidBody>(&mut world);
        let lid = EntityList::create_named(&mut world, "lid");
        lid.set_parent(&mut world, Some(&source));

        assert!(blueprint.create_from_entity(&mut world, &source));
        assert!(blueprint.has_entity(&world));

        let copy = blueprint.spawn_entity(&mut world).unwrap();
        assert_ne!(copy, source);
        assert_eq!(copy.name(&world), "crate");
        assert!(copy.has_component::<RigidBody>(&world));
        assert_eq!(copy.children(&world)[0].name(&world), "lid");
    }

    #[test]
    fn test_level_round_trip() {
        let mut world = world_with_assets();
        let level = AssetManager::get::<Level>(&world, "main.lvl").unwrap();

        let kept = EntityList::create_named(&mut world, "kept");
        let overlay = EntityList::create_named(&mut world, "overlay");
        overlay.set_temporary(&mut world, true);
        assert!(level.create_from_world(&mut world));

        EntityList::create_named(&mut world, "added later");
        assert!(level.load(&mut world));

        assert!(!kept.is_valid(&world));
        assert!(overlay.is_valid(&world));
        let names: Vec<String> = EntityList::all(&world).iter().map(|e| e.name(&world)).collect();
        assert_eq!(names, vec!["overlay".to_string(), "kept".to_string()]);
    }

    #[test]
    fn test_unregistered_asset_is_invalid() {
        let mut world = world_with_assets();
        let texture = AssetManager::get::<Texture2D>(&world, "crate.png").unwrap();
        world.assets_mut().unregister("crate.png");

        assert!(!texture.is_valid(&world));
        assert_eq!(texture.path(&world), "");
    }
}
