//! User behaviours
//!
//! A behaviour is the native-code stand-in for a user script class: it is
//! bound to one `Script` component and receives lifecycle callbacks from the
//! [`ScriptHost`](crate::ScriptHost).

use std::any::Any;

use tether_core::{NativeEngine, Severity};

use crate::entity::Entity;
use crate::host::ScriptInstances;
use crate::views::{Script, Transform};

/// Downcasting support for trait objects.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub trait Behaviour: AsAny {
    /// Called once, on the first frame the behaviour runs.
    fn on_start(&mut self, _ctx: &mut ScriptContext<'_>) {}

    /// Called every frame while the entity and its script are active.
    fn on_update(&mut self, _ctx: &mut ScriptContext<'_>, _delta_time: f32) {}
}

/// What a behaviour sees during a callback.
pub struct ScriptContext<'a> {
    /// The entity owning the script.
    pub entity: Entity,
    /// The script component this behaviour is bound to.
    pub script: Script,
    pub engine: &'a mut dyn NativeEngine,
    /// Every other bound behaviour. The running one is not in here.
    pub scripts: &'a ScriptInstances,
}

impl ScriptContext<'_> {
    pub fn transform(&self) -> Option<Transform> {
        self.entity.transform(&*self.engine)
    }

    pub fn log(&self, severity: Severity, message: &str) {
        self.engine.log(severity, message);
    }
}
