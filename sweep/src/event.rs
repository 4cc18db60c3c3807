//! Events going into the keyboard and outputs coming out of it.

use embassy_time::Instant;
use heapless::Vec;
use sweep_types::action::Action;
use sweep_types::modifier::ModifierCombination;

/// Maximum number of outputs produced by a single event or tick
pub const OUTPUT_QUEUE_SIZE: usize = 32;

/// Outputs produced by processing one event
pub type Outputs = Vec<KeyboardOutput, OUTPUT_QUEUE_SIZE>;

/// Physical position of a key in the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

impl KeyPos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// A debounced key state change, stamped with the time it happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardEvent {
    pub pos: KeyPos,
    pub pressed: bool,
    pub time: Instant,
}

impl KeyboardEvent {
    pub const fn key(row: u8, col: u8, pressed: bool, time: Instant) -> Self {
        Self {
            pos: KeyPos::new(row, col),
            pressed,
            time,
        }
    }
}

/// What the host firmware has to do on behalf of the keymap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyboardOutput {
    /// Key down, including the action's own modifiers
    Register(Action),
    /// Key up
    Unregister(Action),
    /// Mask these modifiers out of the report while a key override is active
    Suppress(ModifierCombination),
    /// Stop masking modifiers suppressed by a key override
    Unsuppress(ModifierCombination),
    /// Reboot into the bootloader
    Bootloader,
}

/// Append an output, dropping it with a warning when the queue is full
pub(crate) fn push_output(out: &mut Outputs, output: KeyboardOutput) {
    if out.push(output).is_err() {
        warn!("Output queue is full, dropping {:?}", output);
    }
}

/// Register and immediately unregister an action
pub(crate) fn tap_action(out: &mut Outputs, action: Action) {
    push_output(out, KeyboardOutput::Register(action));
    push_output(out, KeyboardOutput::Unregister(action));
}
