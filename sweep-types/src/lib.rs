//! # Sweep Types
//!
//! Fundamental type definitions shared by the Ferris Sweep keymap.
//!
//! - [`keycode`] - HID usages plus the firmware-only keycodes used by the keymap
//! - [`modifier`] - Packed modifier combinations and QMK style modifier masks
//! - [`action`] - What a key position does: plain keys, layer switches, one-shot, tap-hold and tap dance

#![no_std]

pub mod action;
pub mod keycode;
pub mod modifier;
