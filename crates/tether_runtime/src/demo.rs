//! Demo scene and behaviours

use glam::{Quat, Vec3};
use tether_asset::AssetData;
use tether_core::{AssetType, ForceMode, NativeEngine};
use tether_script::{
    AssetManager, Behaviour, Collider, Entity, EntityList, Log, RigidBody, Script, ScriptAsset,
    ScriptContext, ScriptRegistry,
};
use tether_world::World;

pub const SPINNER: &str = "Spinner";
pub const LAUNCHER: &str = "Launcher";

/// Turns its entity around Y.
pub struct Spinner {
    degrees_per_second: f32,
}

impl Default for Spinner {
    fn default() -> Self {
        Self {
            degrees_per_second: 90.0,
        }
    }
}

impl Behaviour for Spinner {
    fn on_update(&mut self, ctx: &mut ScriptContext<'_>, delta_time: f32) {
        let Some(transform) = ctx.transform() else {
            return;
        };
        let step = Quat::from_rotation_y((self.degrees_per_second * delta_time).to_radians());
        let rotation = transform.local_rotation(&*ctx.engine);
        transform.set_local_rotation(ctx.engine, step * rotation);
    }
}

/// Throws its rigid body upward once, then reports each time it falls
/// back through the launch height.
#[derive(Default)]
pub struct Launcher {
    launches: u32,
    rising: bool,
}

impl Launcher {
    fn launch(&mut self, ctx: &mut ScriptContext<'_>) {
        let Some(body) = ctx.entity.get_component::<RigidBody>(&*ctx.engine) else {
            Log::warning(&*ctx.engine, "launcher needs a rigid body");
            return;
        };
        // Launch speed is absolute, not added to the fall.
        let fall = body.velocity(&*ctx.engine).y;
        body.apply_force(ctx.engine, Vec3::new(0.0, 8.0 - fall, 0.0), ForceMode::VelocityChange);
        self.launches += 1;
        self.rising = true;
    }
}

impl Behaviour for Launcher {
    fn on_start(&mut self, ctx: &mut ScriptContext<'_>) {
        self.launch(ctx);
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>, _delta_time: f32) {
        let Some(transform) = ctx.transform() else {
            return;
        };
        let height = transform.position(&*ctx.engine).y;
        if self.rising && height < 0.0 {
            self.rising = false;
            Log::info(
                &*ctx.engine,
                format!("{} landed after launch {}", ctx.entity.name(&*ctx.engine), self.launches),
            );
            transform.set_local_position(ctx.engine, Vec3::ZERO);
            self.launch(ctx);
        }
    }
}

pub fn registry() -> ScriptRegistry {
    let mut registry = ScriptRegistry::new();
    registry
        .register::<Spinner>(SPINNER)
        .register::<Launcher>(LAUNCHER);
    registry
}

/// Register built-in script assets that a loaded asset directory did not
/// already provide.
pub fn register_assets(world: &mut World) {
    for type_name in [SPINNER, LAUNCHER] {
        let path = format!("scripts/{}.rs", type_name.to_lowercase());
        if world.assets().lookup(&path).is_none() {
            world.assets_mut().register(
                &path,
                AssetType::Script,
                AssetData::Script {
                    type_name: type_name.to_string(),
                },
            );
        }
    }
}

fn attach_script(engine: &mut dyn NativeEngine, entity: &Entity, type_name: &str) -> Option<Script> {
    let path = format!("scripts/{}.rs", type_name.to_lowercase());
    let asset = AssetManager::get::<ScriptAsset>(&*engine, &path)?;
    let script = entity.add_component::<Script>(engine)?;
    script.set_script_asset(engine, Some(&asset));
    Some(script)
}

/// A spinning turntable and a crate that keeps bouncing.
pub fn build_scene(engine: &mut dyn NativeEngine) -> Vec<Entity> {
    let turntable = EntityList::create_named(engine, "Turntable");
    attach_script(engine, &turntable, SPINNER);

    let crate_entity = EntityList::create_named(engine, "Crate");
    crate_entity.add_component::<RigidBody>(engine);
    crate_entity.add_component::<Collider>(engine);
    attach_script(engine, &crate_entity, LAUNCHER);

    vec![turntable, crate_entity]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::Severity;
    use tether_script::ScriptHost;

    fn run(frames: u32) -> (World, ScriptHost, Vec<Entity>) {
        let mut world = World::new();
        register_assets(&mut world);
        let mut host = ScriptHost::new(registry());
        let scene = build_scene(&mut world);
        for _ in 0..frames {
            host.update(&mut world, 1.0 / 60.0);
            world.step(1.0 / 60.0);
        }
        (world, host, scene)
    }

    #[test]
    fn test_scene_binds_both_behaviours() {
        let (world, host, scene) = run(1);
        assert_eq!(host.instances().len(), 2);
        assert!(scene[0].get_script::<Spinner>(&world, host.instances()).is_some());
        assert!(scene[1].get_script::<Launcher>(&world, host.instances()).is_some());
    }

    #[test]
    fn test_turntable_spins() {
        let (world, _host, scene) = run(60);
        let transform = scene[0].transform(&world).unwrap();
        let forward = transform.forward(&world);
        // 90 degrees about Y turns -Z into -X.
        assert!(forward.abs_diff_eq(Vec3::NEG_X, 1e-3));
    }

    #[test]
    fn test_crate_bounces() {
        let (world, host, scene) = run(10);
        let transform = scene[1].transform(&world).unwrap();
        assert!(transform.position(&world).y > 0.0);

        let (world, _host, _scene) = run(240);
        let landings = world
            .take_diagnostics()
            .into_iter()
            .filter(|d| d.severity == Severity::Info && d.message.contains("landed"))
            .count();
        assert!(landings >= 1);
        assert_eq!(host.instances().len(), 2);
    }
}
