//! Input polling vocabulary

use serde::{Deserialize, Serialize};

/// Discretized state of a key or mouse button for the current frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KeyState {
    /// Not being pressed
    #[default]
    None,
    /// Went down this frame
    Pressed,
    /// Down for more than one frame
    Held,
    /// Went up this frame
    Released,
}

impl KeyState {
    pub fn is_down(self) -> bool {
        matches!(self, KeyState::Pressed | KeyState::Held)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Axis {
    #[default]
    None,
    MouseX,
    MouseY,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InputBindType {
    #[default]
    Axis,
    Action,
}

/// Keys the engine reports.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    LeftShift,
    RightShift,
    LeftControl,
    RightControl,
    LeftAlt,
    RightAlt,
    Up,
    Down,
    Left,
    Right,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

/// Handle to a named input binding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BindId(pub u32);
