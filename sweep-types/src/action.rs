//! Keyboard actions and behaviors.
//!
//! Key types:
//! - [`Action`] - Single operations that the keyboard sends or executes
//! - [`KeyAction`] - What a key position does, the cell type of the keymap
//! - [`EncoderAction`] - Rotary encoder actions

use crate::keycode::KeyCode;
use crate::modifier::ModifierCombination;

/// EncoderAction is the action at a encoder position, stored in encoder_map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderAction {
    clockwise: KeyAction,
    counter_clockwise: KeyAction,
}

impl Default for EncoderAction {
    fn default() -> Self {
        Self::new(KeyAction::No, KeyAction::No)
    }
}

impl EncoderAction {
    pub const fn new(clockwise: KeyAction, counter_clockwise: KeyAction) -> Self {
        Self {
            clockwise,
            counter_clockwise,
        }
    }

    pub fn clockwise(&self) -> KeyAction {
        self.clockwise
    }

    pub fn counter_clockwise(&self) -> KeyAction {
        self.counter_clockwise
    }
}

/// A KeyAction is the action at a keyboard position, stored in keymap.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// No action.
    No,
    /// Transparent action, next layer will be checked.
    Transparent,
    /// A single action, triggered when pressed and cancelled when released.
    Single(Action),
    /// Tap emits the first action, hold emits the second one. `LSFT_T(KC_SPC)` is
    /// `TapHold(Key(Space), Modifier(LSHIFT))`.
    TapHold(Action, Action),
    /// Keep the action active until the next key is triggered.
    OneShot(Action),
    /// Tap dance, references a tap dance configuration by index.
    TapDance(u8),
}

/// A single basic action that a keyboard can execute.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Default action, no action.
    No,
    /// A normal key stroke, uses for all keycodes defined in `KeyCode` enum.
    Key(KeyCode),
    /// Modifier Combination, used for one-shot and tap-hold keys.
    Modifier(ModifierCombination),
    /// Key stroke with modifier combination triggered, QMK's `S(KC_4)` or `C(S(G(KC_4)))`.
    KeyWithModifier(KeyCode, ModifierCombination),
    /// Activate a layer while held
    LayerOn(u8),
    /// Deactivate a layer
    LayerOff(u8),
    /// Toggle a layer, QMK's `TG(n)`
    LayerToggle(u8),
    /// Activate a layer and deactivate all other layers, QMK's `TO(n)`
    LayerToggleOnly(u8),
}
