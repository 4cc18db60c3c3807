use crate::action::{EncoderAction, KeyAction};
use crate::event::KeyPos;

/// Maximum number of layers a [`LayerState`] can hold
pub const MAX_LAYER_NUM: usize = 32;

/// Bit of a layer in the state, layers past 31 have none
const fn layer_bit(layer: u8) -> u32 {
    if (layer as usize) < MAX_LAYER_NUM { 1 << layer } else { 0 }
}

/// Stack of active layers, one bit per layer.
///
/// Layer 0 is the base layer: it is always looked up, whether its bit is set or not.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerState(u32);

impl LayerState {
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_active(self, layer: u8) -> bool {
        self.0 & layer_bit(layer) != 0
    }

    /// Highest active layer, QMK's `get_highest_layer`. An empty stack is layer 0.
    pub const fn highest(self) -> u8 {
        if self.0 == 0 {
            0
        } else {
            (31 - self.0.leading_zeros()) as u8
        }
    }

    pub fn activate(&mut self, layer: u8) {
        self.0 |= layer_bit(layer);
    }

    pub fn deactivate(&mut self, layer: u8) {
        self.0 &= !(layer_bit(layer));
    }

    pub fn toggle(&mut self, layer: u8) {
        self.0 ^= layer_bit(layer);
    }

    /// Activate `layer` and deactivate every other layer, QMK's `layer_move`
    pub fn move_to(&mut self, layer: u8) {
        self.0 = layer_bit(layer);
    }

    /// Back to the base layer, QMK's `layer_clear`
    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

/// Keymap represents the stack of layers.
///
/// The conception of Keymap is borrowed from qmk: <https://docs.qmk.fm/#/keymap>.
///
/// The layer table is read only and lives as long as the firmware. Only the layer state and the
/// layer cache change at runtime.
pub struct KeyMap<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize = 0> {
    /// Layers
    layers: &'a [[[KeyAction; COL]; ROW]; NUM_LAYER],
    /// Rotary encoders, each rotary encoder is represented as (Clockwise, CounterClockwise)
    encoders: Option<&'a [[EncoderAction; NUM_ENCODER]; NUM_LAYER]>,
    /// Current state of each layer
    layer_state: LayerState,
    /// Set by every layer mutation, taken by the keyboard to notify the layer state hook
    layer_state_dirty: bool,
    /// Layer cache
    layer_cache: [[u8; COL]; ROW],
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>
    KeyMap<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>
{
    pub fn new(
        action_map: &'a [[[KeyAction; COL]; ROW]; NUM_LAYER],
        encoder_map: Option<&'a [[EncoderAction; NUM_ENCODER]; NUM_LAYER]>,
    ) -> Self {
        const { assert!(NUM_LAYER <= MAX_LAYER_NUM, "Too many layers") };
        KeyMap {
            layers: action_map,
            encoders: encoder_map,
            layer_state: LayerState::default(),
            layer_state_dirty: false,
            layer_cache: [[0; COL]; ROW],
        }
    }

    /// Fetch the action in keymap, with layer cache.
    ///
    /// A press resolves the action on the highest active layer that isn't transparent and caches
    /// that layer, the release reads the same layer even if the layer state changed in between.
    pub(crate) fn get_action_with_layer_cache(&mut self, pos: KeyPos, pressed: bool) -> KeyAction {
        let row = pos.row as usize;
        let col = pos.col as usize;
        if row >= ROW || col >= COL {
            warn!("Key position {:?} is out of the {}x{} matrix", pos, ROW, COL);
            return KeyAction::No;
        }

        if !pressed {
            // Releasing a pressed key, use cached layer and restore the cache
            let layer = self.pop_layer_from_cache(row, col);
            return self.layers[layer as usize][row][col];
        }

        // Iterate from higher layer to lower layer, the base layer is always checked
        for (layer_idx, layer) in self.layers.iter().enumerate().rev() {
            if layer_idx == 0 || self.layer_state.is_active(layer_idx as u8) {
                let action = layer[row][col];
                if action == KeyAction::Transparent {
                    continue;
                }

                // Found a valid action in the layer, cache it
                self.layer_cache[row][col] = layer_idx as u8;
                return action;
            }
        }

        KeyAction::No
    }

    /// Fetch the encoder action on the highest active layer
    pub fn get_encoder_action(&self, id: usize, clockwise: bool) -> KeyAction {
        let layer = self.get_activated_layer() as usize;
        let encoder = self
            .encoders
            .and_then(|encoders| encoders.get(layer))
            .and_then(|encoders| encoders.get(id));
        match encoder {
            Some(encoder) if clockwise => encoder.clockwise(),
            Some(encoder) => encoder.counter_clockwise(),
            None => KeyAction::No,
        }
    }

    pub fn get_activated_layer(&self) -> u8 {
        self.layer_state.highest()
    }

    pub fn layer_state(&self) -> LayerState {
        self.layer_state
    }

    /// Replace the layer state without marking it dirty, used to store what the layer hook returns
    pub(crate) fn set_layer_state(&mut self, state: LayerState) {
        self.layer_state = state;
    }

    /// Replace the layer state with one changed by a hook
    pub(crate) fn replace_layer_state(&mut self, state: LayerState) {
        self.layer_state = state;
        self.layer_state_dirty = true;
    }

    /// Whether the layer state changed since the last call
    pub(crate) fn take_layer_state_dirty(&mut self) -> bool {
        core::mem::take(&mut self.layer_state_dirty)
    }

    fn pop_layer_from_cache(&mut self, row: usize, col: usize) -> u8 {
        let layer = self.layer_cache[row][col];
        self.layer_cache[row][col] = 0;

        layer
    }

    fn check_layer(layer_num: u8) -> bool {
        if layer_num as usize >= NUM_LAYER {
            warn!(
                "Not a valid layer {}, keyboard supports only {} layers",
                layer_num, NUM_LAYER
            );
            return false;
        }
        true
    }

    /// Activate given layer
    pub(crate) fn activate_layer(&mut self, layer_num: u8) {
        if Self::check_layer(layer_num) {
            self.layer_state.activate(layer_num);
            self.layer_state_dirty = true;
        }
    }

    /// Deactivate given layer
    pub(crate) fn deactivate_layer(&mut self, layer_num: u8) {
        if Self::check_layer(layer_num) {
            self.layer_state.deactivate(layer_num);
            self.layer_state_dirty = true;
        }
    }

    /// Toggle given layer
    pub(crate) fn toggle_layer(&mut self, layer_num: u8) {
        if Self::check_layer(layer_num) {
            self.layer_state.toggle(layer_num);
            self.layer_state_dirty = true;
        }
    }

    /// Activate given layer only
    pub(crate) fn move_to_layer(&mut self, layer_num: u8) {
        if Self::check_layer(layer_num) {
            self.layer_state.move_to(layer_num);
            self.layer_state_dirty = true;
        }
    }

}
