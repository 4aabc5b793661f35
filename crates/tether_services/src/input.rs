//! Input polling and bindings
//!
//! The platform layer feeds raw key and mouse events in; scripts read the
//! per-frame [`KeyState`] and named bindings back out.

use std::collections::HashMap;

use glam::Vec2;
use tether_core::input::{Axis, BindId, InputBindType, KeyCode, KeyState, MouseButton};

#[derive(Debug, Clone)]
pub struct InputBind {
    pub name: String,
    pub ty: InputBindType,
    keys: Vec<(KeyCode, f32)>,
    axes: Vec<(Axis, f32)>,
}

impl InputBind {
    fn new(name: &str, ty: InputBindType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            keys: Vec::new(),
            axes: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct InputState {
    keys: HashMap<KeyCode, KeyState>,
    buttons: HashMap<MouseButton, KeyState>,
    mouse_position: Vec2,
    mouse_delta: Vec2,
    binds: Vec<InputBind>,
}

/// Pressed becomes Held, Released becomes None.
fn advance(state: &mut KeyState) {
    *state = match *state {
        KeyState::Pressed | KeyState::Held => KeyState::Held,
        KeyState::Released | KeyState::None => KeyState::None,
    };
}

fn press(state: &mut KeyState) {
    if !state.is_down() {
        *state = KeyState::Pressed;
    }
}

fn release(state: &mut KeyState) {
    if state.is_down() {
        *state = KeyState::Released;
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame: age key transitions and clear the mouse delta.
    pub fn begin_frame(&mut self) {
        self.keys.values_mut().for_each(advance);
        self.buttons.values_mut().for_each(advance);
        self.keys.retain(|_, state| *state != KeyState::None);
        self.buttons.retain(|_, state| *state != KeyState::None);
        self.mouse_delta = Vec2::ZERO;
    }

    pub fn press_key(&mut self, key: KeyCode) {
        press(self.keys.entry(key).or_default());
    }

    pub fn release_key(&mut self, key: KeyCode) {
        release(self.keys.entry(key).or_default());
    }

    pub fn press_button(&mut self, button: MouseButton) {
        press(self.buttons.entry(button).or_default());
    }

    pub fn release_button(&mut self, button: MouseButton) {
        release(self.buttons.entry(button).or_default());
    }

    /// Move the cursor, accumulating this frame's delta.
    pub fn move_mouse(&mut self, position: Vec2) {
        self.mouse_delta += position - self.mouse_position;
        self.mouse_position = position;
    }

    pub fn key_state(&self, key: KeyCode) -> KeyState {
        self.keys.get(&key).copied().unwrap_or_default()
    }

    pub fn button_state(&self, button: MouseButton) -> KeyState {
        self.buttons.get(&button).copied().unwrap_or_default()
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Create a named binding, or return the existing one with that name.
    pub fn create_bind(&mut self, name: &str, ty: InputBindType) -> BindId {
        if let Some(id) = self.find_bind(name) {
            return id;
        }
        self.binds.push(InputBind::new(name, ty));
        BindId((self.binds.len() - 1) as u32)
    }

    pub fn find_bind(&self, name: &str) -> Option<BindId> {
        self.binds
            .iter()
            .position(|bind| bind.name == name)
            .map(|index| BindId(index as u32))
    }

    pub fn bind(&self, id: BindId) -> Option<&InputBind> {
        self.binds.get(id.0 as usize)
    }

    pub fn add_key_binding(&mut self, id: BindId, key: KeyCode, value: f32) {
        if let Some(bind) = self.binds.get_mut(id.0 as usize) {
            bind.keys.push((key, value));
        }
    }

    pub fn add_axis_binding(&mut self, id: BindId, axis: Axis, sensitivity: f32) {
        if let Some(bind) = self.binds.get_mut(id.0 as usize) {
            bind.axes.push((axis, sensitivity));
        }
    }

    /// Sum of held key values plus scaled mouse movement.
    pub fn axis_value(&self, id: BindId) -> f32 {
        let Some(bind) = self.bind(id) else {
            return 0.0;
        };

        let keys: f32 = bind
            .keys
            .iter()
            .filter(|(key, _)| self.key_state(*key).is_down())
            .map(|(_, value)| value)
            .sum();
        let axes: f32 = bind
            .axes
            .iter()
            .map(|(axis, sensitivity)| match axis {
                Axis::MouseX => self.mouse_delta.x * sensitivity,
                Axis::MouseY => self.mouse_delta.y * sensitivity,
                Axis::None => 0.0,
            })
            .sum();
        keys + axes
    }

    /// True while any bound key is down.
    pub fn action_state(&self, id: BindId) -> bool {
        self.bind(id)
            .is_some_and(|bind| bind.keys.iter().any(|(key, _)| self.key_state(*key).is_down()))
    }
}
