use crate::action::Action;
use crate::event::{KeyboardOutput, Outputs, push_output};
use crate::hooks::KeyboardHooks;
use crate::keyboard::Keyboard;
use crate::modifier::ModifierCombination;

/// State machine for one shot keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OneShotState<T> {
    /// First one shot key press
    Initial(T),
    /// One shot key was released before any other key, normal one shot behavior
    Single(T),
    /// Another key was pressed before one shot key was released, treat as a normal modifier/layer
    Held(T),
    /// One shot inactive
    #[default]
    None,
}

impl<T> OneShotState<T> {
    /// Get the current one shot value if any
    pub fn value(&self) -> Option<&T> {
        match self {
            OneShotState::Initial(v) | OneShotState::Single(v) | OneShotState::Held(v) => Some(v),
            OneShotState::None => None,
        }
    }
}

impl<'a, H: KeyboardHooks, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>
    Keyboard<'a, H, ROW, COL, NUM_LAYER, NUM_ENCODER>
{
    /// Current one shot modifiers, empty when no one shot modifier is active
    pub fn oneshot_mods(&self) -> ModifierCombination {
        self.osm_state.value().copied().unwrap_or_default()
    }

    pub(crate) fn process_action_osm(&mut self, new_modifiers: ModifierCombination, pressed: bool, out: &mut Outputs) {
        if pressed {
            let before = self.oneshot_mods();
            // Add new modifier combination to existing one shot or init if none
            self.osm_state = match self.osm_state {
                OneShotState::None => OneShotState::Initial(new_modifiers),
                OneShotState::Initial(cur_modifiers) => OneShotState::Initial(cur_modifiers | new_modifiers),
                OneShotState::Single(cur_modifiers) => OneShotState::Single(cur_modifiers | new_modifiers),
                OneShotState::Held(cur_modifiers) => OneShotState::Held(cur_modifiers | new_modifiers),
            };

            self.update_osl(pressed);

            if self.oneshot_mods() != before {
                push_output(out, KeyboardOutput::Register(Action::Modifier(new_modifiers)));
                self.notify_oneshot_mods(out);
            }
        } else {
            match self.osm_state {
                OneShotState::Initial(cur_modifiers) | OneShotState::Single(cur_modifiers) => {
                    // Wait for the next key
                    self.osm_state = OneShotState::Single(cur_modifiers);
                }
                OneShotState::Held(cur_modifiers) => {
                    // Used as a normal modifier, released together with its key
                    if cur_modifiers & new_modifiers == new_modifiers {
                        self.clear_osm(out);
                    }
                }
                OneShotState::None => (),
            }
        }
    }

    pub(crate) fn process_action_osl(&mut self, layer_num: u8, pressed: bool) {
        if pressed {
            // Deactivate old layer if any
            if let Some(&l) = self.osl_state.value() {
                self.keymap.deactivate_layer(l);
            }

            // Update layer of one shot
            self.osl_state = match self.osl_state {
                OneShotState::None | OneShotState::Initial(_) => OneShotState::Initial(layer_num),
                OneShotState::Single(_) => OneShotState::Single(layer_num),
                OneShotState::Held(_) => OneShotState::Held(layer_num),
            };

            // Activate new layer
            self.keymap.activate_layer(layer_num);
        } else {
            match self.osl_state {
                OneShotState::Initial(l) | OneShotState::Single(l) => {
                    self.osl_state = OneShotState::Single(l);
                }
                OneShotState::Held(l) => {
                    self.osl_state = OneShotState::None;
                    self.keymap.deactivate_layer(l);
                }
                OneShotState::None => (),
            }
        }
    }

    /// Advance the one shot modifier after another key is pressed or released
    pub(crate) fn update_osm(&mut self, pressed: bool, out: &mut Outputs) {
        match self.osm_state {
            OneShotState::Initial(m) => self.osm_state = OneShotState::Held(m),
            OneShotState::Single(_) => {
                if !pressed {
                    self.clear_osm(out);
                }
            }
            _ => (),
        }
    }

    /// Advance the one shot layer after another key is pressed or released
    pub(crate) fn update_osl(&mut self, pressed: bool) {
        match self.osl_state {
            OneShotState::Initial(l) => self.osl_state = OneShotState::Held(l),
            OneShotState::Single(layer_num) => {
                if !pressed {
                    self.keymap.deactivate_layer(layer_num);
                    self.osl_state = OneShotState::None;
                }
            }
            _ => (),
        }
    }

    /// Forget the one shot layer after another layer change, which already turned it off
    pub(crate) fn clear_osl(&mut self) {
        if let Some(&l) = self.osl_state.value() {
            debug!("One shot layer {} dropped by a layer change", l);
            self.osl_state = OneShotState::None;
        }
    }

    fn clear_osm(&mut self, out: &mut Outputs) {
        if let Some(&m) = self.osm_state.value() {
            self.osm_state = OneShotState::None;
            push_output(out, KeyboardOutput::Unregister(Action::Modifier(m)));
            self.notify_oneshot_mods(out);
        }
    }

    fn notify_oneshot_mods(&mut self, out: &mut Outputs) {
        let mods = self.oneshot_mods();
        debug!("One shot modifiers changed: {:?}", mods);
        self.run_hook(out, |hooks, ctx| hooks.oneshot_mods_changed(ctx, mods));
    }
}
