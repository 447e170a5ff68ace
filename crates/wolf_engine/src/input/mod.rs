//! Input management system
//!
//! The scene reads input through the [`InputSource`] trait. [`InputManager`]
//! is the stock implementation: the host feeds it device events and the
//! scene clears its edge state once per simulation tick, so a press or a
//! release is visible for exactly one tick.

use std::collections::HashSet;

use crate::foundation::math::Vec2;

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
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
    Space,
    Enter,
    Escape,
    Up,
    Down,
    Left,
    Right,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

/// Anything that can be held down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Keyboard key
    Key(KeyCode),
    /// Mouse button
    Mouse(MouseButton),
    /// One wheel notch up; only ever down for the tick it happened in
    ScrollUp,
    /// One wheel notch down; only ever down for the tick it happened in
    ScrollDown,
}

impl From<KeyCode> for Button {
    fn from(key: KeyCode) -> Self {
        Self::Key(key)
    }
}

impl From<MouseButton> for Button {
    fn from(button: MouseButton) -> Self {
        Self::Mouse(button)
    }
}

/// Input errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Axis was never defined
    #[error("Axis '{0}' not found")]
    UnknownAxis(String),
}

/// Read side of an input device, as seen by components and systems
pub trait InputSource {
    /// Whether the button is currently held
    fn is_key_down(&self, button: Button) -> bool;

    /// Whether the button went down during the current tick
    fn was_key_pressed(&self, button: Button) -> bool;

    /// Whether the button went up during the current tick
    fn was_key_released(&self, button: Button) -> bool;

    /// Last known pointer position in screen pixels
    fn pointer_position(&self) -> Vec2;

    /// Clear edge-triggered state; called once per simulation tick
    fn reset_frame(&mut self);
}

/// Input source that never reports anything.
///
/// Hooks fired outside a simulation tick (for example attach hooks run by
/// [`World::add_root`](crate::ecs::World::add_root)) see this one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullInput;

impl InputSource for NullInput {
    fn is_key_down(&self, _button: Button) -> bool {
        false
    }

    fn was_key_pressed(&self, _button: Button) -> bool {
        false
    }

    fn was_key_released(&self, _button: Button) -> bool {
        false
    }

    fn pointer_position(&self) -> Vec2 {
        Vec2::zeros()
    }

    fn reset_frame(&mut self) {}
}

/// Named axis built from two groups of buttons
#[derive(Debug, Clone)]
struct Axis {
    name: String,
    positive: Vec<Button>,
    negative: Vec<Button>,
}

/// Input manager
#[derive(Debug, Clone)]
pub struct InputManager {
    held: HashSet<Button>,
    pressed: Vec<Button>,
    released: Vec<Button>,
    pointer: Vec2,
    axes: Vec<Axis>,
}

impl InputManager {
    /// Create an input manager with the `Horizontal` and `Vertical` axes
    pub fn new() -> Self {
        let mut manager = Self {
            held: HashSet::new(),
            pressed: Vec::new(),
            released: Vec::new(),
            pointer: Vec2::zeros(),
            axes: Vec::new(),
        };
        manager.define_axis(
            "Horizontal",
            [KeyCode::Right.into(), KeyCode::D.into()],
            [KeyCode::Left.into(), KeyCode::A.into()],
        );
        manager.define_axis(
            "Vertical",
            [KeyCode::Down.into(), KeyCode::S.into()],
            [KeyCode::Up.into(), KeyCode::W.into()],
        );
        manager
    }

    /// Define or replace a named axis
    pub fn define_axis(
        &mut self,
        name: impl Into<String>,
        positive: impl IntoIterator<Item = Button>,
        negative: impl IntoIterator<Item = Button>,
    ) {
        let axis = Axis {
            name: name.into(),
            positive: positive.into_iter().collect(),
            negative: negative.into_iter().collect(),
        };
        self.axes.retain(|a| a.name != axis.name);
        self.axes.push(axis);
    }

    /// Sum of held positive buttons minus held negative buttons
    pub fn axis(&self, name: &str) -> Result<f32, InputError> {
        let axis = self
            .axes
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| InputError::UnknownAxis(name.to_string()))?;

        let count = |buttons: &[Button]| buttons.iter().filter(|b| self.held.contains(*b)).count();
        Ok(count(&axis.positive) as f32 - count(&axis.negative) as f32)
    }

    /// Handle key input
    pub fn handle_key_input(&mut self, key: KeyCode, pressed: bool) {
        self.handle_button(key.into(), pressed);
    }

    /// Handle mouse button input
    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        self.handle_button(button.into(), pressed);
    }

    /// Handle mouse movement
    pub fn handle_mouse_move(&mut self, x: f32, y: f32) {
        self.pointer = Vec2::new(x, y);
    }

    /// Handle one wheel notch; positive `delta` scrolls down
    pub fn handle_scroll(&mut self, delta: f32) {
        let button = if delta > 0.0 {
            Button::ScrollDown
        } else if delta < 0.0 {
            Button::ScrollUp
        } else {
            return;
        };
        self.pressed.push(button);
        self.held.insert(button);
    }

    fn handle_button(&mut self, button: Button, pressed: bool) {
        if pressed {
            // Key repeat does not produce a second press
            if self.held.insert(button) {
                self.pressed.push(button);
            }
        } else if self.held.remove(&button) {
            self.released.push(button);
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for InputManager {
    fn is_key_down(&self, button: Button) -> bool {
        self.held.contains(&button)
    }

    fn was_key_pressed(&self, button: Button) -> bool {
        self.pressed.contains(&button)
    }

    fn was_key_released(&self, button: Button) -> bool {
        self.released.contains(&button)
    }

    fn pointer_position(&self) -> Vec2 {
        self.pointer
    }

    fn reset_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
        self.held.remove(&Button::ScrollUp);
        self.held.remove(&Button::ScrollDown);
    }
}
