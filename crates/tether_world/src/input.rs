//! Input calls, served from the services-layer input state

use glam::Vec2;
use tether_core::input::{Axis, BindId, InputBindType, KeyCode, KeyState, MouseButton};
use tether_core::native::InputCalls;

use crate::world::World;

impl InputCalls for World {
    fn is_key_down(&self, key: KeyCode) -> bool {
        self.input.key_state(key).is_down()
    }

    fn key_state(&self, key: KeyCode) -> KeyState {
        self.input.key_state(key)
    }

    fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.input.button_state(button).is_down()
    }

    fn mouse_button_state(&self, button: MouseButton) -> KeyState {
        self.input.button_state(button)
    }

    fn mouse_position(&self) -> Vec2 {
        self.input.mouse_position()
    }

    fn mouse_delta(&self) -> Vec2 {
        self.input.mouse_delta()
    }

    fn create_input_bind(&mut self, name: &str, ty: InputBindType) -> BindId {
        self.input.create_bind(name, ty)
    }

    fn find_input_bind(&self, name: &str) -> Option<BindId> {
        self.input.find_bind(name)
    }

    fn input_bind_name(&self, bind: BindId) -> Option<String> {
        self.input.bind(bind).map(|b| b.name.clone())
    }

    fn input_bind_type(&self, bind: BindId) -> Option<InputBindType> {
        self.input.bind(bind).map(|b| b.ty)
    }

    fn input_bind_axis_value(&self, bind: BindId) -> f32 {
        self.input.axis_value(bind)
    }

    fn input_bind_action_state(&self, bind: BindId) -> bool {
        self.input.action_state(bind)
    }

    fn add_keyboard_binding(&mut self, bind: BindId, key: KeyCode, value: f32) {
        self.input.add_key_binding(bind, key, value);
    }

    fn add_axis_binding(&mut self, bind: BindId, axis: Axis, sensitivity: f32) {
        self.input.add_axis_binding(bind, axis, sensitivity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_reads_fed_input() {
        let mut world = World::new();
        world.input_mut().press_key(KeyCode::Space);
        assert!(world.is_key_down(KeyCode::Space));
        assert_eq!(world.key_state(KeyCode::Space), KeyState::Pressed);

        world.input_mut().begin_frame();
        assert_eq!(world.key_state(KeyCode::Space), KeyState::Held);
    }

    #[test]
    fn test_binds_through_world() {
        let mut world = World::new();
        let fire = world.create_input_bind("Fire", InputBindType::Action);
        world.add_keyboard_binding(fire, KeyCode::F, 1.0);
        assert_eq!(world.find_input_bind("Fire"), Some(fire));
        assert_eq!(world.input_bind_name(fire).as_deref(), Some("Fire"));

        assert!(!world.input_bind_action_state(fire));
        world.input_mut().press_key(KeyCode::F);
        assert!(world.input_bind_action_state(fire));
    }
}
