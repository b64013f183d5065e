//! Gamepad state
//!
//! Raw samples follow the XInput layout: a button bitmask, signed 16-bit
//! stick axes and 8-bit triggers.

use bitflags::bitflags;

use super::ButtonStates;
use crate::foundation::math::Vec2;

/// Maximum number of simultaneously connected controllers
pub const MAX_CONTROLLERS: usize = 4;

/// Raw left stick deadzone (XInput default)
pub const LEFT_THUMB_DEADZONE: i32 = 7849;

/// Raw right stick deadzone (XInput default)
pub const RIGHT_THUMB_DEADZONE: i32 = 8689;

const AXIS_MAX: f32 = 32767.0;
const TRIGGER_MAX: f32 = 255.0;

bitflags! {
    /// Controller buttons, XInput bit layout
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ControllerButtons: u16 {
        /// D-pad up
        const DPAD_UP = 0x0001;
        /// D-pad down
        const DPAD_DOWN = 0x0002;
        /// D-pad left
        const DPAD_LEFT = 0x0004;
        /// D-pad right
        const DPAD_RIGHT = 0x0008;
        /// Start
        const START = 0x0010;
        /// Back
        const BACK = 0x0020;
        /// Left stick click
        const LEFT_THUMB = 0x0040;
        /// Right stick click
        const RIGHT_THUMB = 0x0080;
        /// Left bumper
        const LEFT_SHOULDER = 0x0100;
        /// Right bumper
        const RIGHT_SHOULDER = 0x0200;
        /// A
        const A = 0x1000;
        /// B
        const B = 0x2000;
        /// X
        const X = 0x4000;
        /// Y
        const Y = 0x8000;
    }
}

/// One raw controller sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerSample {
    /// Held buttons
    pub buttons: ControllerButtons,
    /// Left stick (x, y)
    pub left_thumb: (i16, i16),
    /// Right stick (x, y)
    pub right_thumb: (i16, i16),
    /// Left trigger
    pub left_trigger: u8,
    /// Right trigger
    pub right_trigger: u8,
}

/// Per-controller state derived from samples
#[derive(Debug, Clone)]
pub struct ControllerInput {
    index: usize,
    buttons: ButtonStates<ControllerButtons>,
    left_stick: Vec2,
    right_stick: Vec2,
    triggers: Vec2,
}

impl ControllerInput {
    /// Create the state for controller slot `index`
    pub fn new(index: usize) -> Self {
        Self {
            index,
            buttons: ButtonStates::new(),
            left_stick: Vec2::zeros(),
            right_stick: Vec2::zeros(),
            triggers: Vec2::zeros(),
        }
    }

    /// Slot this controller occupies
    pub fn index(&self) -> usize {
        self.index
    }

    /// Fold a new sample into the button states and analog values
    pub fn update(&mut self, sample: &ControllerSample) {
        for button in ControllerButtons::all().iter() {
            self.buttons.advance(button, sample.buttons.contains(button));
        }

        self.left_stick = normalize_stick(sample.left_thumb, LEFT_THUMB_DEADZONE);
        self.right_stick = normalize_stick(sample.right_thumb, RIGHT_THUMB_DEADZONE);
        self.triggers = Vec2::new(
            f32::from(sample.left_trigger) / TRIGGER_MAX,
            f32::from(sample.right_trigger) / TRIGGER_MAX,
        );
    }

    /// Button pressed this frame
    pub fn get_button_down(&self, button: ControllerButtons) -> bool {
        self.buttons.get_down(button)
    }

    /// Button held for more than one frame
    pub fn get_button_stay(&self, button: ControllerButtons) -> bool {
        self.buttons.get_stay(button)
    }

    /// Button released this frame
    pub fn get_button_up(&self, button: ControllerButtons) -> bool {
        self.buttons.get_up(button)
    }

    /// Left stick, each axis in `[-1, 1]` with a quadratic response curve
    pub fn left_stick(&self) -> Vec2 {
        self.left_stick
    }

    /// Right stick, each axis in `[-1, 1]` with a quadratic response curve
    pub fn right_stick(&self) -> Vec2 {
        self.right_stick
    }

    /// Left (x) and right (y) triggers in `[0, 1]`
    pub fn triggers(&self) -> Vec2 {
        self.triggers
    }
}

/// Normalize a raw stick, square each axis (keeping its sign) and apply a
/// Manhattan-distance deadzone on the raw values.
fn normalize_stick((x, y): (i16, i16), deadzone: i32) -> Vec2 {
    let x = x.max(-i16::MAX);
    let y = y.max(-i16::MAX);

    if i32::from(x).abs() + i32::from(y).abs() < deadzone {
        return Vec2::zeros();
    }

    let curve = |raw: i16| {
        let value = f32::from(raw) / AXIS_MAX;
        value * value.abs()
    };
    Vec2::new(curve(x), curve(y))
}
