//! # Sweep
//!
//! Keymap of a Ferris Sweep: five layers, tap dances, key overrides and a layer indicator LED.
//!
//! The host firmware owns matrix scanning and the HID transport. It feeds debounced key changes
//! into [`keyboard::Keyboard`] and sends the returned [`event::KeyboardOutput`]s to the host.
//!
//! ```ignore
//! let mut keyboard = sweep::layout::new_keyboard(LightConfig {
//!     layer_indicator: Some(led_pin),
//!     on_state: PinState::Low,
//! });
//! let outputs = keyboard.process_event(KeyboardEvent::key(0, 3, true, Instant::now()));
//! ```
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
pub(crate) mod fmt;

pub use sweep_types::{action, keycode, modifier};

pub mod config;
pub mod event;
pub mod hooks;
pub mod key_override;
pub mod keyboard;
pub mod keymap;
pub mod layout;
pub mod layout_macro;
pub mod light;
pub mod tap_dance;
