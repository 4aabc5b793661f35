//! Input polling and named binds

use glam::Vec2;
use tether_core::input::{Axis, BindId, InputBindType, KeyCode, KeyState, MouseButton};
use tether_core::native::InputCalls;

/// Device state for the current frame.
pub struct InputManager;

impl InputManager {
    pub fn is_key_down(engine: &(impl InputCalls + ?Sized), key: KeyCode) -> bool {
        engine.is_key_down(key)
    }

    pub fn key_state(engine: &(impl InputCalls + ?Sized), key: KeyCode) -> KeyState {
        engine.key_state(key)
    }

    pub fn is_mouse_button_down(engine: &(impl InputCalls + ?Sized), button: MouseButton) -> bool {
        engine.is_mouse_button_down(button)
    }

    pub fn mouse_button_state(engine: &(impl InputCalls + ?Sized), button: MouseButton) -> KeyState {
        engine.mouse_button_state(button)
    }

    pub fn mouse_position(engine: &(impl InputCalls + ?Sized)) -> Vec2 {
        engine.mouse_position()
    }

    pub fn mouse_delta(engine: &(impl InputCalls + ?Sized)) -> Vec2 {
        engine.mouse_delta()
    }

    /// Create a bind, or return the existing one with this name.
    pub fn create_bind(engine: &mut (impl InputCalls + ?Sized), name: &str, ty: InputBindType) -> InputBind {
        InputBind {
            id: engine.create_input_bind(name, ty),
        }
    }

    pub fn find_bind(engine: &(impl InputCalls + ?Sized), name: &str) -> Option<InputBind> {
        engine.find_input_bind(name).map(|id| InputBind { id })
    }
}

/// A named mapping from keys and axes to one value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct InputBind {
    id: BindId,
}

impl InputBind {
    pub fn id(&self) -> BindId {
        self.id
    }

    pub fn name(&self, engine: &(impl InputCalls + ?Sized)) -> String {
        engine.input_bind_name(self.id).unwrap_or_default()
    }

    pub fn ty(&self, engine: &(impl InputCalls + ?Sized)) -> InputBindType {
        engine.input_bind_type(self.id).unwrap_or_default()
    }

    /// Summed contribution of every binding this frame.
    pub fn axis_value(&self, engine: &(impl InputCalls + ?Sized)) -> f32 {
        engine.input_bind_axis_value(self.id)
    }

    /// Whether any bound key is down.
    pub fn action_state(&self, engine: &(impl InputCalls + ?Sized)) -> bool {
        engine.input_bind_action_state(self.id)
    }

    pub fn add_key(&self, engine: &mut (impl InputCalls + ?Sized), key: KeyCode, value: f32) {
        engine.add_keyboard_binding(self.id, key, value);
    }

    pub fn add_axis(&self, engine: &mut (impl InputCalls + ?Sized), axis: Axis, sensitivity: f32) {
        engine.add_axis_binding(self.id, axis, sensitivity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_world::World;

    #[test]
    fn test_key_polling() {
        let mut world = World::new();
        world.input_mut().press_key(KeyCode::Space);

        assert!(InputManager::is_key_down(&world, KeyCode::Space));
        assert_eq!(InputManager::key_state(&world, KeyCode::Space), KeyState::Pressed);

        world.input_mut().begin_frame();
        assert_eq!(InputManager::key_state(&world, KeyCode::Space), KeyState::Held);
        assert!(!InputManager::is_key_down(&world, KeyCode::W));
    }

    #[test]
    fn test_axis_bind() {
        let mut world = World::new();
        let bind = InputManager::create_bind(&mut world, "MoveX", InputBindType::Axis);
        bind.add_key(&mut world, KeyCode::D, 1.0);
        bind.add_key(&mut world, KeyCode::A, -1.0);

        assert_eq!(bind.name(&world), "MoveX");
        assert_eq!(bind.ty(&world), InputBindType::Axis);
        assert_eq!(bind.axis_value(&world), 0.0);

        world.input_mut().press_key(KeyCode::A);
        assert_eq!(bind.axis_value(&world), -1.0);
    }

    #[test]
    fn test_action_bind_and_lookup() {
        let mut world = World::new();
        let jump = InputManager::create_bind(&mut world, "Jump", InputBindType::Action);
        jump.add_key(&mut world, KeyCode::Space, 1.0);

        assert_eq!(InputManager::find_bind(&world, "Jump"), Some(jump));
        assert_eq!(InputManager::create_bind(&mut world, "Jump", InputBindType::Action), jump);
        assert!(InputManager::find_bind(&world, "Crouch").is_none());

        assert!(!jump.action_state(&world));
        world.input_mut().press_key(KeyCode::Space);
        assert!(jump.action_state(&world));
    }
}
