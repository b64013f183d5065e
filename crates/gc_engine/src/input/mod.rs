//! Input management system
//!
//! The OS is reached through an [`InputSource`] that reports raw "is this
//! held right now" samples. [`InputSystem::update`] is called once per
//! frame and folds those samples into per-button [`KeyState`]s:
//!
//! ```text
//! held:      None -> Down -> Stay -> Stay ...   Up -> Down
//! released:  Down -> Up,  Stay -> Up,  Up -> None
//! ```
//!
//! Gameplay code then polls `get_key_down` / `get_key_stay` / `get_key_up`.

mod controller;

use std::collections::HashMap;
use std::hash::Hash;

use crate::events::{Event, EventArg, EventSystem, EventType};
use crate::foundation::math::Vec2;

pub use controller::{ControllerButtons, ControllerInput, ControllerSample, MAX_CONTROLLERS};

/// Per-frame state of a key or button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyState {
    /// Not held, and not released this frame
    #[default]
    None,
    /// Pressed this frame
    Down,
    /// Held for more than one frame
    Stay,
    /// Released this frame
    Up,
}

impl KeyState {
    /// Next state given whether the button is physically held
    pub fn next(self, held: bool) -> Self {
        match (self, held) {
            (Self::None | Self::Up, true) => Self::Down,
            (Self::Down | Self::Stay, true) => Self::Stay,
            (Self::Down | Self::Stay, false) => Self::Up,
            (Self::Up | Self::None, false) => Self::None,
        }
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum KeyCode {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Tab key
    Tab,
    /// Left shift
    LeftShift,
    /// Left control
    LeftControl,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

impl KeyCode {
    /// Every key code, in declaration order
    pub const ALL: [Self; 46] = [
        Self::A, Self::B, Self::C, Self::D, Self::E, Self::F, Self::G, Self::H, Self::I,
        Self::J, Self::K, Self::L, Self::M, Self::N, Self::O, Self::P, Self::Q, Self::R,
        Self::S, Self::T, Self::U, Self::V, Self::W, Self::X, Self::Y, Self::Z,
        Self::Num0, Self::Num1, Self::Num2, Self::Num3, Self::Num4,
        Self::Num5, Self::Num6, Self::Num7, Self::Num8, Self::Num9,
        Self::Space, Self::Enter, Self::Escape, Self::Tab, Self::LeftShift, Self::LeftControl,
        Self::Up, Self::Down, Self::Left, Self::Right,
    ];
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

impl MouseButton {
    /// Every mouse button
    pub const ALL: [Self; 3] = [Self::Left, Self::Right, Self::Middle];
}

/// Raw input samples provided by the platform layer
pub trait InputSource {
    /// Whether `key` is physically held
    fn is_key_down(&self, key: KeyCode) -> bool;

    /// Whether `button` is physically held
    fn is_mouse_button_down(&self, button: MouseButton) -> bool;

    /// Cursor position in window coordinates
    fn mouse_position(&self) -> Vec2 {
        Vec2::zeros()
    }

    /// Raw state of controller `index`, `None` if disconnected
    fn controller(&self, _index: usize) -> Option<ControllerSample> {
        None
    }
}

/// Button state table shared by keyboard, mouse and controllers
#[derive(Debug, Clone)]
pub struct ButtonStates<K> {
    states: HashMap<K, KeyState>,
}

impl<K: Copy + Eq + Hash> ButtonStates<K> {
    /// Create a table with every button in `None`
    pub fn new() -> Self {
        Self { states: HashMap::new() }
    }

    /// Advance `button` given whether it is held; returns the new state
    pub fn advance(&mut self, button: K, held: bool) -> KeyState {
        let state = self.states.entry(button).or_default();
        *state = state.next(held);
        *state
    }

    /// Current state of `button`
    pub fn state(&self, button: K) -> KeyState {
        self.states.get(&button).copied().unwrap_or_default()
    }

    /// Pressed or released this frame, or held
    pub fn is_pressed(&self, button: K) -> bool {
        self.state(button) != KeyState::None
    }

    /// Pressed this frame
    pub fn get_down(&self, button: K) -> bool {
        self.state(button) == KeyState::Down
    }

    /// Held for more than one frame
    pub fn get_stay(&self, button: K) -> bool {
        self.state(button) == KeyState::Stay
    }

    /// Released this frame
    pub fn get_up(&self, button: K) -> bool {
        self.state(button) == KeyState::Up
    }

    /// Reset every button to `None`
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

impl<K: Copy + Eq + Hash> Default for ButtonStates<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Keyboard, mouse and controller state polled by gameplay code
#[derive(Debug, Default)]
pub struct InputSystem {
    keys: ButtonStates<KeyCode>,
    mouse_buttons: ButtonStates<MouseButton>,
    mouse_position: Vec2,
    controllers: [Option<ControllerInput>; MAX_CONTROLLERS],
}

impl InputSystem {
    /// Create an input system with nothing held
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample `source` and advance every button state by one frame
    ///
    /// Keyboard and mouse Down/Up transitions are queued on `events`, as are
    /// controller connections and disconnections.
    pub fn update(&mut self, source: &dyn InputSource, events: &mut EventSystem) {
        let now = events.current_time();

        for key in KeyCode::ALL {
            match self.keys.advance(key, source.is_key_down(key)) {
                KeyState::Down => events.send(
                    Event::new(EventType::KeyPressed, now).with_arg("key", EventArg::Key(key)),
                ),
                KeyState::Up => events.send(
                    Event::new(EventType::KeyReleased, now).with_arg("key", EventArg::Key(key)),
                ),
                KeyState::None | KeyState::Stay => {}
            }
        }

        for button in MouseButton::ALL {
            match self.mouse_buttons.advance(button, source.is_mouse_button_down(button)) {
                KeyState::Down => events.send(
                    Event::new(EventType::MouseButtonPressed, now)
                        .with_arg("button", EventArg::MouseButton(button)),
                ),
                KeyState::Up => events.send(
                    Event::new(EventType::MouseButtonReleased, now)
                        .with_arg("button", EventArg::MouseButton(button)),
                ),
                KeyState::None | KeyState::Stay => {}
            }
        }
        self.mouse_position = source.mouse_position();

        for (index, slot) in self.controllers.iter_mut().enumerate() {
            match (source.controller(index), slot.is_some()) {
                (Some(sample), true) => {
                    if let Some(controller) = slot.as_mut() {
                        controller.update(&sample);
                    }
                }
                (Some(sample), false) => {
                    log::info!("Controller {index} connected");
                    let mut controller = ControllerInput::new(index);
                    controller.update(&sample);
                    *slot = Some(controller);
                    events.send(
                        Event::new(EventType::ControllerConnected, now)
                            .with_arg("controller", EventArg::Controller(index)),
                    );
                }
                (None, true) => {
                    log::info!("Controller {index} disconnected");
                    *slot = None;
                    events.send(
                        Event::new(EventType::ControllerDisconnected, now)
                            .with_arg("controller", EventArg::Controller(index)),
                    );
                }
                (None, false) => {}
            }
        }
    }

    /// Key pressed, held or released this frame
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys.is_pressed(key)
    }

    /// Key pressed this frame
    pub fn get_key_down(&self, key: KeyCode) -> bool {
        self.keys.get_down(key)
    }

    /// Key held for more than one frame
    pub fn get_key_stay(&self, key: KeyCode) -> bool {
        self.keys.get_stay(key)
    }

    /// Key released this frame
    pub fn get_key_up(&self, key: KeyCode) -> bool {
        self.keys.get_up(key)
    }

    /// Raw state of `key`
    pub fn key_state(&self, key: KeyCode) -> KeyState {
        self.keys.state(key)
    }

    /// Mouse button pressed, held or released this frame
    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.is_pressed(button)
    }

    /// Mouse button pressed this frame
    pub fn get_mouse_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons.get_down(button)
    }

    /// Mouse button held for more than one frame
    pub fn get_mouse_button_stay(&self, button: MouseButton) -> bool {
        self.mouse_buttons.get_stay(button)
    }

    /// Mouse button released this frame
    pub fn get_mouse_button_up(&self, button: MouseButton) -> bool {
        self.mouse_buttons.get_up(button)
    }

    /// Cursor position sampled this frame
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Connected controller at `index`
    pub fn controller(&self, index: usize) -> Option<&ControllerInput> {
        self.controllers.get(index)?.as_ref()
    }

    /// Number of connected controllers
    pub fn connected_controllers(&self) -> usize {
        self.controllers.iter().flatten().count()
    }
}

/// In-memory [`InputSource`] driven by code (tests, replays, headless runs)
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    keys: Vec<KeyCode>,
    mouse_buttons: Vec<MouseButton>,
    mouse_position: Vec2,
    controllers: [Option<ControllerSample>; MAX_CONTROLLERS],
}

impl ScriptedInput {
    /// Create a source with nothing held
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `key`
    pub fn press(&mut self, key: KeyCode) {
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
    }

    /// Release `key`
    pub fn release(&mut self, key: KeyCode) {
        self.keys.retain(|held| *held != key);
    }

    /// Hold or release a mouse button
    pub fn set_mouse_button(&mut self, button: MouseButton, held: bool) {
        self.mouse_buttons.retain(|b| *b != button);
        if held {
            self.mouse_buttons.push(button);
        }
    }

    /// Move the cursor
    pub fn set_mouse_position(&mut self, position: Vec2) {
        self.mouse_position = position;
    }

    /// Connect, update or (with `None`) disconnect a controller
    pub fn set_controller(&mut self, index: usize, sample: Option<ControllerSample>) {
        if let Some(slot) = self.controllers.get_mut(index) {
            *slot = sample;
        }
    }
}

impl InputSource for ScriptedInput {
    fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    fn controller(&self, index: usize) -> Option<ControllerSample> {
        self.controllers.get(index).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state_cycle() {
        let mut input = InputSystem::new();
        let mut events = EventSystem::new();
        let mut source = ScriptedInput::new();

        source.press(KeyCode::W);
        input.update(&source, &mut events);
        assert!(input.get_key_down(KeyCode::W));
        assert!(input.is_key_pressed(KeyCode::W));

        input.update(&source, &mut events);
        assert!(input.get_key_stay(KeyCode::W));

        source.release(KeyCode::W);
        input.update(&source, &mut events);
        assert!(input.get_key_up(KeyCode::W));
        assert!(input.is_key_pressed(KeyCode::W));

        input.update(&source, &mut events);
        assert_eq!(input.key_state(KeyCode::W), KeyState::None);
        assert!(!input.is_key_pressed(KeyCode::W));
    }

    #[test]
    fn test_repress_during_up_goes_straight_to_down() {
        assert_eq!(KeyState::Up.next(true), KeyState::Down);
        assert_eq!(KeyState::Down.next(false), KeyState::Up);
    }

    #[test]
    fn test_transitions_queue_events() {
        let mut input = InputSystem::new();
        let mut events = EventSystem::new();
        let mut source = ScriptedInput::new();

        source.press(KeyCode::Space);
        source.set_mouse_button(MouseButton::Left, true);
        input.update(&source, &mut events);
        assert_eq!(
            events.pending_types(),
            vec![EventType::KeyPressed, EventType::MouseButtonPressed]
        );
        events.clear();

        // Held keys do not queue anything
        input.update(&source, &mut events);
        assert!(events.pending_types().is_empty());

        source.release(KeyCode::Space);
        input.update(&source, &mut events);
        assert_eq!(events.pending_types(), vec![EventType::KeyReleased]);
    }

    #[test]
    fn test_mouse_buttons_and_position() {
        let mut input = InputSystem::new();
        let mut events = EventSystem::new();
        let mut source = ScriptedInput::new();

        source.set_mouse_button(MouseButton::Right, true);
        source.set_mouse_position(Vec2::new(10.0, 20.0));
        input.update(&source, &mut events);

        assert!(input.get_mouse_button_down(MouseButton::Right));
        assert!(!input.get_mouse_button_down(MouseButton::Left));
        assert_eq!(input.mouse_position(), Vec2::new(10.0, 20.0));

        input.update(&source, &mut events);
        assert!(input.get_mouse_button_stay(MouseButton::Right));
        source.set_mouse_button(MouseButton::Right, false);
        input.update(&source, &mut events);
        assert!(input.get_mouse_button_up(MouseButton::Right));
        assert!(input.is_mouse_button_pressed(MouseButton::Right));
    }

    #[test]
    fn test_controller_connect_and_disconnect() {
        let mut input = InputSystem::new();
        let mut events = EventSystem::new();
        let mut source = ScriptedInput::new();

        source.set_controller(1, Some(ControllerSample::default()));
        input.update(&source, &mut events);
        assert_eq!(input.connected_controllers(), 1);
        assert!(input.controller(1).is_some());
        assert!(input.controller(0).is_none());

        source.set_controller(1, None);
        input.update(&source, &mut events);
        assert_eq!(input.connected_controllers(), 0);
        assert_eq!(
            events.pending_types(),
            vec![EventType::ControllerConnected, EventType::ControllerDisconnected]
        );
    }
}
