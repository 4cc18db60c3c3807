use embedded_hal::digital::OutputPin;

use super::DOT_SCR;
use crate::action::{Action, KeyAction};
use crate::event::KeyboardEvent;
use crate::hooks::{HookContext, KeyboardHooks};
use crate::keycode::KeyCode;
use crate::keymap::LayerState;
use crate::light::LayerIndicator;
use crate::modifier::{ALT, ModifierCombination};

/// Callbacks of the Ferris Sweep keymap
pub struct SweepHooks<P: OutputPin> {
    indicator: LayerIndicator<P>,
    /// One shot modifiers at the last change
    last_oneshot_mods: ModifierCombination,
}

impl<P: OutputPin> SweepHooks<P> {
    pub fn new(indicator: LayerIndicator<P>) -> Self {
        Self {
            indicator,
            last_oneshot_mods: ModifierCombination::new(),
        }
    }

    pub fn indicator(&self) -> &LayerIndicator<P> {
        &self.indicator
    }

    /// Give back the indicator pin
    pub fn release(self) -> Option<P> {
        self.indicator.release()
    }
}

impl<P: OutputPin> KeyboardHooks for SweepHooks<P> {
    fn keyboard_pre_init(&mut self) {
        // Off until a layer above the base layer is active
        self.indicator.set_or_log(false);
    }

    fn process_record(&mut self, ctx: &mut HookContext<'_>, action: KeyAction, event: KeyboardEvent) -> bool {
        match action {
            KeyAction::Single(Action::Key(KeyCode::FallBase)) => {
                if event.pressed {
                    ctx.layer_clear();
                }
            }
            // Tapped right after a one shot layer, the release of this key used to type the tap
            // action twice. Typing it on the release avoids that.
            // TODO: revalidate the double `.` without this workaround, then drop it or extend it to every tap-hold dance
            KeyAction::TapDance(DOT_SCR) => {
                if !event.pressed {
                    ctx.eager_tap(DOT_SCR);
                }
            }
            _ => (),
        }
        true
    }

    fn oneshot_mods_changed(&mut self, ctx: &mut HookContext<'_>, mods: ModifierCombination) {
        let alt_changed = mods.intersects(ALT) || self.last_oneshot_mods.intersects(ALT);
        self.last_oneshot_mods = mods;
        // Back to the base layer after a one shot Alt
        if alt_changed {
            ctx.layer_clear();
        }
    }

    fn layer_state_set(&mut self, state: LayerState) -> LayerState {
        self.indicator.set_or_log(state.highest() > 0);
        state
    }
}
