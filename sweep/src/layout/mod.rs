//! The Ferris Sweep keymap: five layers on a `split_3x5_2` layout.
//!
//! The matrix is 4 rows of 10 columns. Rows 0 to 2 hold the finger keys, left half in columns 0 to
//! 4 and right half in columns 5 to 9. The four thumb keys sit in row 3, columns 3 to 6. The other
//! slots of row 3 don't exist on the board and are `No` on every layer.
//!
//! | Layer | Content                                    |
//! |-------|--------------------------------------------|
//! | 0     | Dvorak base layer                          |
//! | 1     | Symbols                                    |
//! | 2     | Numpad                                     |
//! | 3     | Navigation, media and system shortcuts     |
//! | 4     | Mouse and firmware keys                    |

mod hooks;

pub use hooks::SweepHooks;

use embedded_hal::digital::OutputPin;
use heapless::Vec;

use crate::action::{Action, KeyAction};
use crate::config::{BehaviorConfig, KeyOverridesConfig, LightConfig, TapDancesConfig, TapHoldConfig};
use crate::key_override::{KEY_OVERRIDE_MAX_NUM, KeyOverride};
use crate::keyboard::Keyboard;
use crate::keycode::KeyCode;
use crate::keymap::KeyMap;
use crate::light::LayerIndicator;
use crate::modifier::{GUI, ModifierCombination as Mod};
use crate::tap_dance::{TAP_DANCE_MAX_NUM, TapDance};
use crate::{a, k, layer, mt, osl, osm, shifted, td, tg, to, wm};

pub const COL: usize = 10;
pub const ROW: usize = 4;
pub const NUM_LAYER: usize = 5;

/// `;`, or `-` on double tap
pub const SCLN_MINS: u8 = 0;
/// `,`, or `_` on double tap
pub const COMM_UNDS: u8 = 1;
/// `.`, or `!` on double tap
pub const DOT_EXCL: u8 = 2;
/// `.`, or the macOS screenshot chord `Ctrl+Shift+Gui+4` on hold
pub const DOT_SCR: u8 = 3;
/// `^`, or `Home` on double tap
pub const CIRC_HOME: u8 = 4;
/// `$`, or `End` on double tap
pub const DLR_END: u8 = 5;
/// `'`, or `` ` `` on double tap
pub const QUOT_GRV: u8 = 6;

/// Clear every layer, back to the base layer
const BASE: KeyAction = k!(FallBase);
const NO: KeyAction = a!(No);
const TRNS: KeyAction = a!(Transparent);

const SCREENSHOT: Mod = Mod::LCTRL.union(Mod::LSHIFT).union(Mod::LGUI);
/// `S(A(KC_2))`, `€` on macOS
const EURO: Mod = Mod::LSHIFT.union(Mod::LALT);

#[rustfmt::skip]
pub const fn get_default_keymap() -> [[[KeyAction; COL]; ROW]; NUM_LAYER] {
    [
        layer!([
            [td!(SCLN_MINS), td!(COMM_UNDS), td!(DOT_EXCL), k!(P), k!(Y), k!(F), k!(G), k!(C), k!(R), k!(L)],
            [k!(A), k!(O), k!(E), k!(U), k!(I), k!(D), k!(H), k!(T), k!(N), k!(S)],
            [td!(QUOT_GRV), k!(Q), k!(J), k!(K), k!(X), k!(B), k!(M), k!(W), k!(V), k!(Z)],
            [NO, NO, NO, mt!(Space, Mod::LSHIFT), osm!(Mod::LGUI), osm!(Mod::LCTRL), osl!(1), NO, NO, NO]
        ]),
        layer!([
            [k!(Escape), k!(Comma), td!(DOT_SCR), shifted!(Kc2), k!(Equal), k!(Minus), shifted!(Kc5), shifted!(Backslash), shifted!(Kc8), k!(Backspace)],
            [k!(Tab), shifted!(LeftBracket), k!(LeftBracket), shifted!(Kc9), td!(CIRC_HOME), td!(DLR_END), shifted!(Kc0), k!(RightBracket), shifted!(RightBracket), k!(Enter)],
            [k!(Grave), TRNS, shifted!(Kc1), shifted!(Kc7), shifted!(Equal), shifted!(Kc3), shifted!(Slash), k!(Slash), k!(Backslash), to!(3)],
            [NO, NO, NO, to!(0), osm!(Mod::LGUI), osm!(Mod::LALT), to!(2), NO, NO, NO]
        ]),
        layer!([
            [k!(Escape), TRNS, TRNS, BASE, k!(Equal), k!(Minus), k!(Kc1), k!(Kc2), k!(Kc3), k!(Backspace)],
            [k!(Tab), BASE, BASE, BASE, wm!(Kc2, EURO), BASE, k!(Kc4), k!(Kc5), k!(Kc6), k!(Enter)],
            [BASE, BASE, BASE, BASE, shifted!(Kc8), k!(KpSlash), k!(Kc7), k!(Kc8), k!(Kc9), k!(Kc0)],
            [NO, NO, NO, mt!(Space, Mod::LSHIFT), osm!(Mod::LGUI), osm!(Mod::RCTRL), BASE, NO, NO, NO]
        ]),
        layer!([
            [k!(Escape), k!(MediaRewind), k!(MediaFastForward), k!(MediaPlayPause), k!(AudioVolUp), wm!(LeftBracket, Mod::LGUI), wm!(RightBracket, Mod::LGUI), wm!(Tab, Mod::RCTRL.union(Mod::RSHIFT)), wm!(Tab, Mod::LCTRL), k!(Backspace)],
            [k!(Tab), osm!(Mod::LCTRL), osm!(Mod::LALT), osm!(Mod::LSHIFT), k!(AudioVolDown), k!(Left), k!(Down), k!(Up), k!(Right), k!(Enter)],
            [tg!(4), k!(Q), BASE, BASE, wm!(C, Mod::LGUI), wm!(V, Mod::LGUI), k!(PageDown), k!(PageUp), wm!(Z, Mod::RSHIFT.union(Mod::RGUI)), wm!(Z, Mod::LGUI)],
            [NO, NO, NO, k!(Space), osm!(Mod::LGUI), osm!(Mod::RALT), BASE, NO, NO, NO]
        ]),
        layer!([
            [TRNS, TRNS, TRNS, TRNS, TRNS, k!(Bootloader), NO, NO, NO, k!(Backspace)],
            [TRNS, k!(MouseWheelDown), k!(MouseBtn2), k!(MouseBtn1), k!(MouseWheelUp), k!(MouseLeft), k!(MouseDown), k!(MouseUp), k!(MouseRight), k!(Enter)],
            [tg!(4), TRNS, TRNS, TRNS, k!(DebugToggle), NO, NO, NO, NO, TRNS],
            [NO, NO, NO, TRNS, TRNS, TRNS, BASE, NO, NO, NO]
        ]),
    ]
}

/// The keymap table, read only for the lifetime of the firmware
pub static KEYMAP: [[[KeyAction; COL]; ROW]; NUM_LAYER] = get_default_keymap();

const fn key(k: KeyCode) -> Action {
    Action::Key(k)
}

const fn shifted_key(k: KeyCode) -> Action {
    Action::KeyWithModifier(k, Mod::LSHIFT)
}

/// Indexed by the tap dance ids above
pub const TAP_DANCES: [TapDance; 7] = [
    TapDance::double(key(KeyCode::Semicolon), key(KeyCode::Minus)),
    TapDance::double(key(KeyCode::Comma), shifted_key(KeyCode::Minus)),
    TapDance::double(key(KeyCode::Dot), shifted_key(KeyCode::Kc1)),
    TapDance::tap_hold(key(KeyCode::Dot), Action::KeyWithModifier(KeyCode::Kc4, SCREENSHOT)),
    TapDance::double(shifted_key(KeyCode::Kc6), key(KeyCode::Home)),
    TapDance::double(shifted_key(KeyCode::Kc4), key(KeyCode::End)),
    TapDance::double(key(KeyCode::Quote), key(KeyCode::Grave)),
];

pub const KEY_OVERRIDES: [KeyOverride; 2] = [
    // Gui + ` types ~
    KeyOverride::basic(GUI, key(KeyCode::Grave), shifted_key(KeyCode::Grave)),
    // Gui + € types $
    KeyOverride::basic(GUI, Action::KeyWithModifier(KeyCode::Kc2, EURO), shifted_key(KeyCode::Kc4)),
];

#[cfg(feature = "encoder_map")]
pub const NUM_ENCODER: usize = 0;

/// The Ferris Sweep has no encoders
#[cfg(feature = "encoder_map")]
pub static ENCODER_MAP: [[crate::action::EncoderAction; NUM_ENCODER]; NUM_LAYER] = [[]; NUM_LAYER];

const _: () = assert!(TAP_DANCES.len() <= TAP_DANCE_MAX_NUM);
const _: () = assert!(KEY_OVERRIDES.len() <= KEY_OVERRIDE_MAX_NUM);

pub fn get_tap_dances() -> TapDancesConfig {
    TapDancesConfig {
        tap_dances: Vec::from_slice(&TAP_DANCES).unwrap_or_default(),
    }
}

pub fn get_key_overrides() -> KeyOverridesConfig {
    KeyOverridesConfig {
        overrides: Vec::from_slice(&KEY_OVERRIDES).unwrap_or_default(),
    }
}

pub fn behavior_config() -> BehaviorConfig {
    BehaviorConfig {
        tap_hold: TapHoldConfig::default(),
        tap_dance: get_tap_dances(),
        key_override: get_key_overrides(),
    }
}

/// Build the keyboard with this keymap, its hooks and the layer indicator
pub fn new_keyboard<P: OutputPin>(light_config: LightConfig<P>) -> Keyboard<'static, SweepHooks<P>, ROW, COL, NUM_LAYER> {
    #[cfg(feature = "encoder_map")]
    let encoders = Some(&ENCODER_MAP);
    #[cfg(not(feature = "encoder_map"))]
    let encoders = None;

    let hooks = SweepHooks::new(LayerIndicator::from_config(light_config));
    Keyboard::new(KeyMap::new(&KEYMAP, encoders), behavior_config(), hooks)
}
