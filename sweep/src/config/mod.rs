//! Compile-time configuration of keyboard behaviors and the indicator LED.

use ::heapless::Vec;
use embassy_time::Duration;
use embedded_hal::digital::{OutputPin, PinState};

use crate::key_override::{KEY_OVERRIDE_MAX_NUM, KeyOverride};
use crate::tap_dance::{DEFAULT_TAPPING_TERM, TAP_DANCE_MAX_NUM, TapDance};

/// Options for configurable action behavior
#[derive(Clone, Debug, Default)]
pub struct BehaviorConfig {
    pub tap_hold: TapHoldConfig,
    pub tap_dance: TapDancesConfig,
    pub key_override: KeyOverridesConfig,
}

/// Configuration for tap-hold keys and the tap/hold decision of tap dances
#[derive(Clone, Copy, Debug)]
pub struct TapHoldConfig {
    /// A key held longer than this is a hold, QMK's `TAPPING_TERM`
    pub tapping_term: Duration,
    /// QMK's `PERMISSIVE_HOLD`: a tap-hold key is a hold as soon as another key is pressed and
    /// released while it is down, and an interrupted tap-hold dance still held resolves to hold.
    ///
    /// Disabled, keys pressed after a tap-hold key wait until it is released (tap) or held past
    /// the tapping term (hold), and an interrupted tap-hold dance resolves to tap.
    pub permissive_hold: bool,
}

impl Default for TapHoldConfig {
    fn default() -> Self {
        Self {
            tapping_term: DEFAULT_TAPPING_TERM,
            permissive_hold: false,
        }
    }
}

/// Config for tap dances, indexed by `KeyAction::TapDance(id)`
#[derive(Clone, Debug, Default)]
pub struct TapDancesConfig {
    pub tap_dances: Vec<TapDance, TAP_DANCE_MAX_NUM>,
}

/// Config for key overrides
#[derive(Clone, Debug, Default)]
pub struct KeyOverridesConfig {
    pub overrides: Vec<KeyOverride, KEY_OVERRIDE_MAX_NUM>,
}

/// Config for the layer indicator LED
pub struct LightConfig<P: OutputPin> {
    pub layer_indicator: Option<P>,
    /// Pin level that turns the LED on
    pub on_state: PinState,
}

impl<P: OutputPin> Default for LightConfig<P> {
    fn default() -> Self {
        Self {
            layer_indicator: None,
            on_state: PinState::Low,
        }
    }
}
