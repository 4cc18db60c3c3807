//! Modifier combinations.

use core::ops::{BitAnd, BitOr, BitOrAssign};

use bitfield_struct::bitfield;

/// To represent all combinations of modifiers, at least 5 bits are needed.
/// 1 bit for Left/Right, 4 bits for modifier type. Represented in LSB format.
///
/// | bit4 | bit3 | bit2 | bit1 | bit0 |
/// | --- | --- | --- | --- | --- |
/// | L/R | GUI | ALT |SHIFT| CTRL|
#[bitfield(u8, order = Lsb, defmt = cfg(feature = "defmt"))]
#[derive(Eq, PartialEq)]
pub struct ModifierCombination {
    #[bits(1)]
    pub ctrl: bool,
    #[bits(1)]
    pub shift: bool,
    #[bits(1)]
    pub alt: bool,
    #[bits(1)]
    pub gui: bool,
    #[bits(1)]
    pub right: bool,
    #[bits(3)]
    _reserved: u8,
}

/// Mask of the four modifier kinds, without the side bit
const KIND_MASK: u8 = 0b0000_1111;

/// Either Ctrl, like QMK's `MOD_MASK_CTRL`
pub const CTRL: ModifierCombination = ModifierCombination::new().with_ctrl(true);
/// Either Shift
pub const SHIFT: ModifierCombination = ModifierCombination::new().with_shift(true);
/// Either Alt
pub const ALT: ModifierCombination = ModifierCombination::new().with_alt(true);
/// Either Gui
pub const GUI: ModifierCombination = ModifierCombination::new().with_gui(true);

impl ModifierCombination {
    pub const LCTRL: Self = Self::new().with_ctrl(true);
    pub const LSHIFT: Self = Self::new().with_shift(true);
    pub const LALT: Self = Self::new().with_alt(true);
    pub const LGUI: Self = Self::new().with_gui(true);
    pub const RCTRL: Self = Self::new().with_ctrl(true).with_right(true);
    pub const RSHIFT: Self = Self::new().with_shift(true).with_right(true);
    pub const RALT: Self = Self::new().with_alt(true).with_right(true);
    pub const RGUI: Self = Self::new().with_gui(true).with_right(true);

    /// Combine two combinations in a const context, `a | b`
    pub const fn union(self, other: Self) -> Self {
        Self::from_bits(self.into_bits() | other.into_bits())
    }

    pub const fn is_empty(self) -> bool {
        self.into_bits() & KIND_MASK == 0
    }

    /// Every modifier kind in `mask` is active, on either side.
    ///
    /// This is how QMK evaluates `MOD_MASK_*` triggers: `MOD_MASK_GUI` matches left or right Gui.
    pub const fn has_kinds_of(self, mask: Self) -> bool {
        let kinds = mask.into_bits() & KIND_MASK;
        kinds != 0 && self.into_bits() & kinds == kinds
    }

    /// Any modifier kind in `mask` is active
    pub const fn intersects(self, mask: Self) -> bool {
        self.into_bits() & mask.into_bits() & KIND_MASK != 0
    }
}

impl BitOr for ModifierCombination {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for ModifierCombination {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl BitAnd for ModifierCombination {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.into_bits() & rhs.into_bits())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_gui_mask_matches_either_side() {
        assert!(ModifierCombination::LGUI.has_kinds_of(GUI));
        assert!(ModifierCombination::RGUI.has_kinds_of(GUI));
        assert!((ModifierCombination::LGUI | ModifierCombination::LSHIFT).has_kinds_of(GUI));
        assert!(!ModifierCombination::LALT.has_kinds_of(GUI));
        assert!(!ModifierCombination::new().has_kinds_of(ModifierCombination::new()));
    }

    #[test]
    fn test_combination_bits() {
        let rcs = ModifierCombination::RCTRL | ModifierCombination::RSHIFT;
        assert!(rcs.ctrl() && rcs.shift() && rcs.right());
        assert!(!rcs.alt());
        assert!(rcs.intersects(SHIFT));
        assert_eq!(rcs & SHIFT, SHIFT);
        assert!((rcs & CTRL).ctrl());
        assert!(ModifierCombination::new().with_right(true).is_empty());
    }
}
