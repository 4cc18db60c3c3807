use crate::action::Action;
use crate::modifier::ModifierCombination;

// Max number of key overrides
pub const KEY_OVERRIDE_MAX_NUM: usize = 8;

/// Replace a key when some modifiers are active, QMK's `key_override_t`.
///
/// While the replacement is held, the trigger modifiers are masked out of the report, so
/// `Gui + \`` types a bare `~` instead of `Gui + ~`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyOverride {
    /// Every modifier kind in this mask has to be active, on either side
    pub trigger_mods: ModifierCombination,
    pub trigger: Action,
    pub replacement: Action,
    /// Masked out of the report while the replacement is held
    pub suppressed_mods: ModifierCombination,
}

impl KeyOverride {
    /// QMK's `ko_make_basic`: the trigger modifiers are suppressed
    pub const fn basic(trigger_mods: ModifierCombination, trigger: Action, replacement: Action) -> Self {
        Self {
            trigger_mods,
            trigger,
            replacement,
            suppressed_mods: trigger_mods,
        }
    }

    pub fn matches(&self, action: Action, active_mods: ModifierCombination) -> bool {
        action == self.trigger && active_mods.has_kinds_of(self.trigger_mods)
    }
}

/// First override that matches a key press
pub(crate) fn find_override(
    overrides: &[KeyOverride],
    action: Action,
    active_mods: ModifierCombination,
) -> Option<KeyOverride> {
    overrides.iter().find(|o| o.matches(action, active_mods)).copied()
}
