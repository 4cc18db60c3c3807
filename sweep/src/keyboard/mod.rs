//! Key processing: keymap lookup, tap dances, tap-hold keys, one shot keys and key overrides.
//!
//! [`Keyboard`] is driven by the host firmware. Every debounced key change goes through
//! [`Keyboard::process_event`], and [`Keyboard::tick`] has to be called once
//! [`Keyboard::next_timeout`] has passed. Both return the outputs to send to the host.

pub mod oneshot;

use embassy_time::Instant;
use heapless::Vec;

use crate::action::{Action, KeyAction};
use crate::config::BehaviorConfig;
use crate::event::{KeyPos, KeyboardEvent, KeyboardOutput, Outputs, push_output};
use crate::hooks::{HookContext, KeyboardHooks};
use crate::key_override::find_override;
use crate::keycode::KeyCode;
use crate::keymap::{KeyMap, LayerState};
use crate::modifier::ModifierCombination;
use crate::tap_dance::{TapDanceEvent, TapDances};
use oneshot::OneShotState;

/// Maximum number of keys registered at the same time
pub const HELD_KEY_MAX_NUM: usize = 16;

/// Maximum number of tap-hold keys held at the same time
pub const TAP_HOLD_MAX_NUM: usize = 8;

/// Maximum number of key events held back while a tap-hold key is undecided
pub const BUFFERED_EVENT_MAX_NUM: usize = 8;

/// A registered key, released by the release of the same position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct HeldKey {
    pos: KeyPos,
    action: Action,
    /// Modifiers masked out by the key override that produced `action`
    suppressed: Option<ModifierCombination>,
}

/// A held tap-hold key, QMK's mod-tap
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct TapHoldKey {
    pos: KeyPos,
    tap: Action,
    hold: Action,
    pressed_at: Instant,
    /// The registered action, once the key is resolved
    decided: Option<Action>,
}

pub struct Keyboard<
    'a,
    H: KeyboardHooks,
    const ROW: usize,
    const COL: usize,
    const NUM_LAYER: usize,
    const NUM_ENCODER: usize = 0,
> {
    /// Keymap
    pub(crate) keymap: KeyMap<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>,

    /// User callbacks
    hooks: H,

    /// Options for configurable action behavior
    behavior: BehaviorConfig,

    /// Tap dance resolver
    tap_dances: TapDances,

    /// Registered keys
    held_keys: Vec<HeldKey, HELD_KEY_MAX_NUM>,

    /// Held tap-hold keys
    tap_holds: Vec<TapHoldKey, TAP_HOLD_MAX_NUM>,

    /// Key events pressed or released after an undecided tap-hold key, replayed once it is decided
    buffered_events: Vec<KeyboardEvent, BUFFERED_EVENT_MAX_NUM>,

    /// One shot layer state
    pub(crate) osl_state: OneShotState<u8>,

    /// One shot modifier state
    pub(crate) osm_state: OneShotState<ModifierCombination>,

    /// Log every output, toggled by `KeyCode::DebugToggle`
    verbose: bool,
}

impl<'a, H: KeyboardHooks, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>
    Keyboard<'a, H, ROW, COL, NUM_LAYER, NUM_ENCODER>
{
    pub fn new(keymap: KeyMap<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>, behavior: BehaviorConfig, mut hooks: H) -> Self {
        hooks.keyboard_pre_init();
        let tap_dances = TapDances::new(&behavior.tap_dance, &behavior.tap_hold);
        Keyboard {
            keymap,
            hooks,
            behavior,
            tap_dances,
            held_keys: Vec::new(),
            tap_holds: Vec::new(),
            buffered_events: Vec::new(),
            osl_state: OneShotState::default(),
            osm_state: OneShotState::default(),
            verbose: false,
        }
    }

    pub fn keymap(&self) -> &KeyMap<'a, ROW, COL, NUM_LAYER, NUM_ENCODER> {
        &self.keymap
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn into_hooks(self) -> H {
        self.hooks
    }

    pub fn tap_dances(&self) -> &TapDances {
        &self.tap_dances
    }

    pub fn layer_state(&self) -> LayerState {
        self.keymap.layer_state()
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Process a debounced key change
    pub fn process_event(&mut self, event: KeyboardEvent) -> Outputs {
        let mut out = Outputs::new();
        self.dispatch_event(event, &mut out);
        self.update_layer_state();
        self.log_outputs(&out);
        out
    }

    /// Resolve the keys whose tapping term has passed
    pub fn tick(&mut self, now: Instant) -> Outputs {
        let mut out = Outputs::new();
        self.process_timeouts(now, &mut out);
        self.settle_oneshot(&mut out, 0);
        self.replay_buffered_events(&mut out);
        self.update_layer_state();
        self.log_outputs(&out);
        out
    }

    /// When [`Keyboard::tick`] has to be called next. Keys resolve once this instant has passed.
    pub fn next_timeout(&self) -> Option<Instant> {
        let tapping_term = self.behavior.tap_hold.tapping_term;
        let tap_hold = self
            .tap_holds
            .iter()
            .filter(|k| k.decided.is_none())
            .map(|k| k.pressed_at + tapping_term)
            .min();
        match (self.tap_dances.next_timeout(), tap_hold) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Modifiers currently active: held modifier keys, held tap-hold modifiers and one shot modifiers
    pub fn active_modifiers(&self) -> ModifierCombination {
        let held = self
            .held_keys
            .iter()
            .map(|k| k.action)
            .chain(self.tap_holds.iter().filter_map(|k| k.decided))
            .fold(ModifierCombination::new(), |mods, action| match action {
                Action::Modifier(m) => mods | m,
                Action::Key(k) => mods | k.to_modifier(),
                _ => mods,
            });
        held | self.oneshot_mods()
    }

    /// Process an event, or hold it back while a tap-hold key is undecided
    fn dispatch_event(&mut self, event: KeyboardEvent, out: &mut Outputs) {
        let start = out.len();
        self.process_timeouts(event.time, out);
        self.settle_oneshot(out, start);
        self.replay_buffered_events(out);

        if let Some(pending) = self.undecided_tap_hold()
            && pending.pos != event.pos
        {
            self.buffer_event(pending, event, out);
            return;
        }

        self.process_key_event(event, out);
        // A tap-hold key released within the tapping term is a tap, the keys after it follow
        self.replay_buffered_events(out);
    }

    fn process_key_event(&mut self, event: KeyboardEvent, out: &mut Outputs) {
        let action = self.keymap.get_action_with_layer_cache(event.pos, event.pressed);
        if self.verbose {
            info!("Key event: {:?}, action: {:?}", event, action);
        } else {
            debug!("Key event: {:?}, action: {:?}", event, action);
        }

        let start = out.len();
        if event.pressed {
            self.interrupt(action, event, out);
        }
        // Keys released by interrupted tap dances end the one shot keys first
        self.settle_oneshot(out, start);

        let start = out.len();
        if self.run_hook(out, |hooks, ctx| hooks.process_record(ctx, action, event)) {
            self.process_key_action(action, event, out);
        }

        if !matches!(action, KeyAction::OneShot(_)) {
            if event.pressed {
                self.update_osm(true, out);
                self.update_osl(true);
            } else {
                self.settle_oneshot(out, start);
            }
        }
    }

    /// The tap-hold key still waiting for its tap or hold decision
    fn undecided_tap_hold(&self) -> Option<TapHoldKey> {
        self.tap_holds.iter().find(|k| k.decided.is_none()).copied()
    }

    /// Hold back an event until `pending` is decided.
    ///
    /// With permissive hold, a key pressed and released while `pending` is down decides it as hold.
    fn buffer_event(&mut self, pending: TapHoldKey, event: KeyboardEvent, out: &mut Outputs) {
        let tapped = !event.pressed && self.buffered_events.iter().any(|e| e.pressed && e.pos == event.pos);
        if self.buffered_events.push(event).is_err() {
            warn!("Too many buffered key events, tap-hold key {:?} resolves to hold", pending.pos);
            self.decide_tap_hold(pending.pos, pending.hold, out);
            self.replay_buffered_events(out);
            self.dispatch_event(event, out);
            return;
        }

        if tapped && self.behavior.tap_hold.permissive_hold {
            debug!(
                "Key {:?} tapped inside tap-hold key {:?}, registering {:?}",
                event.pos, pending.pos, pending.hold
            );
            self.decide_tap_hold(pending.pos, pending.hold, out);
            self.replay_buffered_events(out);
        }
    }

    fn decide_tap_hold(&mut self, pos: KeyPos, action: Action, out: &mut Outputs) {
        if let Some(key) = self.tap_holds.iter_mut().find(|k| k.pos == pos) {
            push_output(out, KeyboardOutput::Register(action));
            key.decided = Some(action);
        }
    }

    /// Process the held back events in order, once no tap-hold key is undecided
    fn replay_buffered_events(&mut self, out: &mut Outputs) {
        if self.buffered_events.is_empty() || self.undecided_tap_hold().is_some() {
            return;
        }
        let events = core::mem::take(&mut self.buffered_events);
        for event in events {
            self.dispatch_event(event, out);
        }
    }

    fn process_key_action(&mut self, action: KeyAction, event: KeyboardEvent, out: &mut Outputs) {
        match action {
            KeyAction::No | KeyAction::Transparent => (),
            KeyAction::Single(a) => self.process_action(a, event, out),
            KeyAction::TapHold(tap, hold) => self.process_action_tap_hold(tap, hold, event, out),
            KeyAction::OneShot(Action::Modifier(m)) => self.process_action_osm(m, event.pressed, out),
            KeyAction::OneShot(Action::LayerOn(l)) => self.process_action_osl(l, event.pressed),
            KeyAction::OneShot(a) => warn!("Unsupported one shot action: {:?}", a),
            KeyAction::TapDance(id) => {
                let td_event = if event.pressed {
                    TapDanceEvent::KeyDown(id, event.time)
                } else {
                    TapDanceEvent::KeyUp(id, event.time)
                };
                let outputs = self.tap_dances.process(td_event);
                extend_outputs(out, outputs);
            }
        }
    }

    fn process_action(&mut self, action: Action, event: KeyboardEvent, out: &mut Outputs) {
        match action {
            Action::No => (),
            Action::Key(k) if k.is_firmware_key() => {
                if event.pressed {
                    self.process_firmware_key(k, out);
                }
            }
            Action::Key(_) | Action::KeyWithModifier(_, _) | Action::Modifier(_) => {
                if event.pressed {
                    self.register_key(event.pos, action, out);
                } else {
                    self.unregister_key(event.pos, out);
                }
            }
            Action::LayerOn(layer_num) => {
                // Change layer state only when the key's state is changed
                if event.pressed {
                    self.keymap.activate_layer(layer_num);
                } else {
                    self.keymap.deactivate_layer(layer_num);
                }
            }
            Action::LayerOff(layer_num) => {
                if event.pressed {
                    self.keymap.deactivate_layer(layer_num);
                }
            }
            Action::LayerToggle(layer_num) => {
                if event.pressed {
                    self.keymap.toggle_layer(layer_num);
                }
            }
            Action::LayerToggleOnly(layer_num) => {
                if event.pressed {
                    self.keymap.move_to_layer(layer_num);
                    self.clear_osl();
                }
            }
        }
    }

    fn process_firmware_key(&mut self, key: KeyCode, out: &mut Outputs) {
        match key {
            KeyCode::Bootloader => {
                info!("Entering bootloader");
                push_output(out, KeyboardOutput::Bootloader);
            }
            KeyCode::DebugToggle => {
                self.verbose = !self.verbose;
                info!("Verbose output: {}", self.verbose);
            }
            // Handled by the keymap hooks
            _ => (),
        }
    }

    /// Register a key, replaced by a key override if one matches the active modifiers
    fn register_key(&mut self, pos: KeyPos, action: Action, out: &mut Outputs) {
        let mut key = HeldKey {
            pos,
            action,
            suppressed: None,
        };
        if !matches!(action, Action::Modifier(_))
            && let Some(ko) = find_override(&self.behavior.key_override.overrides, action, self.active_modifiers())
        {
            debug!("Key override: {:?} -> {:?}", action, ko.replacement);
            push_output(out, KeyboardOutput::Suppress(ko.suppressed_mods));
            key.action = ko.replacement;
            key.suppressed = Some(ko.suppressed_mods);
        }

        push_output(out, KeyboardOutput::Register(key.action));
        if self.held_keys.push(key).is_err() {
            warn!("Too many keys held, {:?} won't be tracked", key.action);
        }
    }

    fn unregister_key(&mut self, pos: KeyPos, out: &mut Outputs) {
        if let Some(idx) = self.held_keys.iter().position(|k| k.pos == pos) {
            let key = self.held_keys.swap_remove(idx);
            push_output(out, KeyboardOutput::Unregister(key.action));
            if let Some(mods) = key.suppressed {
                push_output(out, KeyboardOutput::Unsuppress(mods));
            }
        }
    }

    fn process_action_tap_hold(&mut self, tap: Action, hold: Action, event: KeyboardEvent, out: &mut Outputs) {
        if event.pressed {
            let key = TapHoldKey {
                pos: event.pos,
                tap,
                hold,
                pressed_at: event.time,
                decided: None,
            };
            if self.tap_holds.push(key).is_err() {
                warn!("Too many tap-hold keys held, ignoring {:?}", event.pos);
            }
            return;
        }

        let Some(idx) = self.tap_holds.iter().position(|k| k.pos == event.pos) else {
            return;
        };
        let key = self.tap_holds.swap_remove(idx);
        match key.decided {
            Some(action) => push_output(out, KeyboardOutput::Unregister(action)),
            None => {
                // Released within the tapping term
                push_output(out, KeyboardOutput::Register(key.tap));
                push_output(out, KeyboardOutput::Unregister(key.tap));
            }
        }
    }

    /// A key press resolves every pending tap dance, except the pressed one
    fn interrupt(&mut self, action: KeyAction, event: KeyboardEvent, out: &mut Outputs) {
        let pressed_dance = match action {
            KeyAction::TapDance(id) => Some(id),
            _ => None,
        };
        let outputs = self.tap_dances.process(TapDanceEvent::Interrupt(pressed_dance, event.time));
        extend_outputs(out, outputs);
    }

    fn process_timeouts(&mut self, now: Instant, out: &mut Outputs) {
        let outputs = self.tap_dances.process(TapDanceEvent::Tick(now));
        extend_outputs(out, outputs);

        let tapping_term = self.behavior.tap_hold.tapping_term;
        for key in self.tap_holds.iter_mut() {
            if key.decided.is_none() && now.saturating_duration_since(key.pressed_at) > tapping_term {
                debug!("Tap-hold key {:?} held, registering {:?}", key.pos, key.hold);
                push_output(out, KeyboardOutput::Register(key.hold));
                key.decided = Some(key.hold);
            }
        }
    }

    /// A released key consumes the one shot keys waiting for it.
    ///
    /// Released modifiers only end the one shot layer. One shot modifiers are applied to the key
    /// a tap dance resolves to, so a tap dance ends them when its action is released.
    fn settle_oneshot(&mut self, out: &mut Outputs, start: usize) {
        let mut key_released = false;
        let mut modifier_released = false;
        for output in &out[start..] {
            match output {
                KeyboardOutput::Unregister(Action::Modifier(_)) => modifier_released = true,
                KeyboardOutput::Unregister(_) => key_released = true,
                _ => (),
            }
        }
        if key_released {
            self.update_osm(false, out);
        }
        if key_released || modifier_released {
            self.update_osl(false);
        }
    }

    /// Run a hook, then apply the layer changes it made
    fn run_hook<R>(&mut self, out: &mut Outputs, f: impl FnOnce(&mut H, &mut HookContext<'_>) -> R) -> R {
        let mut ctx = HookContext::new(self.keymap.layer_state(), &self.tap_dances, out);
        let result = f(&mut self.hooks, &mut ctx);
        if let Some(state) = ctx.changed_layer_state() {
            self.keymap.replace_layer_state(state);
            self.clear_osl();
        }
        result
    }

    /// Notify the layer state hook if any layer changed
    fn update_layer_state(&mut self) {
        if self.keymap.take_layer_state_dirty() {
            let state = self.hooks.layer_state_set(self.keymap.layer_state());
            self.keymap.set_layer_state(state);
            debug!("Layer state: {:?}, highest layer: {}", state, state.highest());
        }
    }

    fn log_outputs(&self, out: &Outputs) {
        if self.verbose {
            for output in out {
                info!("Output: {:?}", output);
            }
        }
    }
}

fn extend_outputs(out: &mut Outputs, outputs: Outputs) {
    for output in outputs {
        push_output(out, output);
    }
}
