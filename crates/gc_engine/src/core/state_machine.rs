//! Finite state machine for game flow and object behaviour
//!
//! The machine owns its current state. Changing state runs the old state's
//! `exit` before the new state's `enter`; `update` forwards the frame delta
//! to the current state and applies the transition it returns.

/// What a state asks the machine to do after an update
pub enum Transition {
    /// Stay in the current state
    None,
    /// Leave the current state for another
    Switch(Box<dyn State>),
}

/// One state of a [`StateMachine`]
pub trait State {
    /// Name used in logs and by [`StateMachine::current_name`]
    fn name(&self) -> &str;

    /// Called when the machine enters this state
    fn enter(&mut self) {}

    /// Called every frame while this state is current
    fn update(&mut self, _delta_time: f32) -> Transition {
        Transition::None
    }

    /// Called when the machine leaves this state
    fn exit(&mut self) {}
}

/// Holds at most one current [`State`]
#[derive(Default)]
pub struct StateMachine {
    current: Option<Box<dyn State>>,
}

impl StateMachine {
    /// Machine with no current state
    pub fn new() -> Self {
        Self::default()
    }

    /// Machine that has already entered `state`
    pub fn with_state(state: Box<dyn State>) -> Self {
        let mut machine = Self::new();
        machine.change_state(state);
        machine
    }

    /// Exit the current state, if any, then enter `state`
    pub fn change_state(&mut self, mut state: Box<dyn State>) {
        if let Some(mut previous) = self.current.take() {
            log::debug!("State '{}' -> '{}'", previous.name(), state.name());
            previous.exit();
        } else {
            log::debug!("State machine starts in '{}'", state.name());
        }
        state.enter();
        self.current = Some(state);
    }

    /// Forward a frame to the current state; does nothing when empty
    pub fn update(&mut self, delta_time: f32) {
        let Some(state) = self.current.as_mut() else {
            return;
        };
        if let Transition::Switch(next) = state.update(delta_time) {
            self.change_state(next);
        }
    }

    /// Exit the current state and leave the machine empty
    pub fn clear(&mut self) {
        if let Some(mut previous) = self.current.take() {
            log::debug!("State '{}' cleared", previous.name());
            previous.exit();
        }
    }

    /// Name of the current state
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref().map(State::name)
    }

    /// Whether no state is current
    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}
