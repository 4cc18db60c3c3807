//! User callbacks into key processing, the equivalent of QMK's `*_user` functions.

use crate::action::KeyAction;
use crate::event::{KeyboardEvent, Outputs, push_output};
use crate::keymap::LayerState;
use crate::modifier::ModifierCombination;
use crate::tap_dance::TapDances;

/// Callbacks of a keymap. Every method has a default that does nothing.
pub trait KeyboardHooks {
    /// Called once, before the first key is processed
    fn keyboard_pre_init(&mut self) {}

    /// Called for every key event after the keymap lookup.
    ///
    /// Returning `false` skips the default processing of the event.
    fn process_record(&mut self, _ctx: &mut HookContext<'_>, _action: KeyAction, _event: KeyboardEvent) -> bool {
        true
    }

    /// Called whenever the one-shot modifiers change, with the new modifiers
    fn oneshot_mods_changed(&mut self, _ctx: &mut HookContext<'_>, _mods: ModifierCombination) {}

    /// Called after the layer state changed. The returned state replaces it.
    fn layer_state_set(&mut self, state: LayerState) -> LayerState {
        state
    }
}

impl KeyboardHooks for () {}

/// What hooks can do to the keyboard while they run
pub struct HookContext<'c> {
    layer_state: LayerState,
    layer_changed: bool,
    tap_dances: &'c TapDances,
    out: &'c mut Outputs,
}

impl<'c> HookContext<'c> {
    pub(crate) fn new(layer_state: LayerState, tap_dances: &'c TapDances, out: &'c mut Outputs) -> Self {
        Self {
            layer_state,
            layer_changed: false,
            tap_dances,
            out,
        }
    }

    /// Deactivate every layer, QMK's `layer_clear`
    pub fn layer_clear(&mut self) {
        self.layer_state.clear();
        self.layer_changed = true;
    }

    pub fn layer_state(&self) -> LayerState {
        self.layer_state
    }

    /// Tap the tap action of a tap-hold dance released before it resolved, see [`TapDances::eager_tap`]
    pub fn eager_tap(&mut self, id: u8) {
        for output in self.tap_dances.eager_tap(id) {
            push_output(self.out, output);
        }
    }

    /// The new layer state, if the hook changed it
    pub(crate) fn changed_layer_state(&self) -> Option<LayerState> {
        self.layer_changed.then_some(self.layer_state)
    }
}
