//! Tap dance resolver.
//!
//! Each tap dance id owns one [`TapDanceEntry`] in a fixed-size table. The keyboard turns key
//! events into [`TapDanceEvent`]s, and [`TapDances::process`] returns the key activations to send.
//! Nothing else mutates the entries.

use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::action::Action;
use crate::config::{TapDancesConfig, TapHoldConfig};
use crate::event::{KeyboardOutput, Outputs, push_output, tap_action};

/// Maximum number of tap dances
pub const TAP_DANCE_MAX_NUM: usize = 8;

/// QMK's default `TAPPING_TERM`
pub const DEFAULT_TAPPING_TERM: Duration = Duration::from_millis(200);

/// What a tap dance emits
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapDanceKind {
    /// One tap emits `single`, two taps emit `double`, QMK's `ACTION_TAP_DANCE_DOUBLE`
    Double { single: Action, double: Action },
    /// A tap emits `tap`, holding the key past the tapping term emits `hold`
    TapHold { tap: Action, hold: Action },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TapDance {
    pub kind: TapDanceKind,
    pub tapping_term: Duration,
}

impl TapDance {
    pub const fn double(single: Action, double: Action) -> Self {
        Self {
            kind: TapDanceKind::Double { single, double },
            tapping_term: DEFAULT_TAPPING_TERM,
        }
    }

    pub const fn tap_hold(tap: Action, hold: Action) -> Self {
        Self {
            kind: TapDanceKind::TapHold { tap, hold },
            tapping_term: DEFAULT_TAPPING_TERM,
        }
    }

    pub const fn with_tapping_term(mut self, tapping_term: Duration) -> Self {
        self.tapping_term = tapping_term;
        self
    }
}

/// Runtime state of a tap dance, what QMK passes to the tap dance callbacks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TapDanceState {
    /// Number of taps in the current gesture
    pub count: u8,
    /// The key is physically held
    pub pressed: bool,
    /// Another key was pressed before the gesture finished
    pub interrupted: bool,
    /// The gesture is resolved, waiting for the release to reset
    pub finished: bool,
    /// When the last tap started
    pub last_tap: Instant,
}

impl Default for TapDanceState {
    fn default() -> Self {
        Self {
            count: 0,
            pressed: false,
            interrupted: false,
            finished: false,
            last_tap: Instant::from_ticks(0),
        }
    }
}

impl TapDanceState {
    /// Taps were counted but the gesture isn't resolved yet
    pub fn is_pending(&self) -> bool {
        self.count > 0 && !self.finished
    }
}

/// Hold when the key is still down after exactly one tap, unless another key interrupted it.
/// With `permissive_hold`, an interrupted key still resolves to hold.
fn resolves_to_hold(count: u8, pressed: bool, interrupted: bool, permissive_hold: bool) -> bool {
    count == 1 && pressed && (permissive_hold || !interrupted)
}

/// A tap dance with its state and the action it currently holds down
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TapDanceEntry {
    pub dance: TapDance,
    pub state: TapDanceState,
    /// Registered by the resolver and not yet unregistered
    pub held: Option<Action>,
}

impl TapDanceEntry {
    pub fn new(dance: TapDance) -> Self {
        Self {
            dance,
            state: TapDanceState::default(),
            held: None,
        }
    }

    fn register(&mut self, action: Action, out: &mut Outputs) {
        push_output(out, KeyboardOutput::Register(action));
        self.held = Some(action);
    }

    /// Called on every press, after the tap is counted
    fn on_each_tap(&mut self, out: &mut Outputs) {
        if let TapDanceKind::Double { double, .. } = self.dance.kind
            && self.state.count == 2
        {
            self.register(double, out);
            self.state.finished = true;
        }
    }

    /// Resolve the gesture, at most once per gesture
    fn finish(&mut self, permissive_hold: bool, out: &mut Outputs) {
        if self.state.finished {
            return;
        }
        self.state.finished = true;
        let state = self.state;
        match self.dance.kind {
            TapDanceKind::Double { single, double } => match state.count {
                1 => self.register(single, out),
                2 => self.register(double, out),
                _ => {}
            },
            TapDanceKind::TapHold { tap, hold } => {
                if !state.pressed {
                    return;
                }
                if resolves_to_hold(state.count, state.pressed, state.interrupted, permissive_hold) {
                    self.register(hold, out);
                } else {
                    self.register(tap, out);
                }
            }
        }
    }

    /// End the gesture, unless the key is still held
    fn reset(&mut self, out: &mut Outputs) {
        if self.state.pressed {
            return;
        }
        if let Some(held) = self.held.take() {
            push_output(out, KeyboardOutput::Unregister(held));
        }
        self.state = TapDanceState::default();
    }

    fn finish_and_reset(&mut self, permissive_hold: bool, out: &mut Outputs) {
        self.finish(permissive_hold, out);
        if !self.state.pressed {
            self.reset(out);
        }
    }
}

/// Input of the tap dance resolver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapDanceEvent {
    /// A tap dance key is pressed
    KeyDown(u8, Instant),
    /// A tap dance key is released
    KeyUp(u8, Instant),
    /// Another key is pressed. Carries the id of that key's tap dance, if it is one, which is not
    /// interrupted by its own press.
    Interrupt(Option<u8>, Instant),
    /// Time passes
    Tick(Instant),
}

/// All tap dances of the keymap, indexed by id
pub struct TapDances {
    entries: Vec<TapDanceEntry, TAP_DANCE_MAX_NUM>,
    permissive_hold: bool,
}

impl TapDances {
    pub fn new(config: &TapDancesConfig, tap_hold: &TapHoldConfig) -> Self {
        Self {
            entries: config.tap_dances.iter().copied().map(TapDanceEntry::new).collect(),
            permissive_hold: tap_hold.permissive_hold,
        }
    }

    pub fn get(&self, id: u8) -> Option<&TapDanceEntry> {
        self.entries.get(id as usize)
    }

    /// Whether any tap dance is waiting for more taps or the tapping term
    pub fn has_pending(&self) -> bool {
        self.entries.iter().any(|e| e.state.is_pending())
    }

    /// Feed one event into the resolver
    pub fn process(&mut self, event: TapDanceEvent) -> Outputs {
        let mut out = Outputs::new();
        let permissive_hold = self.permissive_hold;
        match event {
            TapDanceEvent::KeyDown(id, time) => {
                let Some(entry) = self.entry_mut(id) else {
                    return out;
                };
                entry.state.count = entry.state.count.saturating_add(1);
                entry.state.pressed = true;
                entry.state.last_tap = time;
                entry.on_each_tap(&mut out);
                debug!("Tap dance {} tapped, state: {:?}", id, entry.state);
            }
            TapDanceEvent::KeyUp(id, _time) => {
                let Some(entry) = self.entry_mut(id) else {
                    return out;
                };
                entry.state.pressed = false;
                if entry.state.finished {
                    entry.reset(&mut out);
                }
            }
            TapDanceEvent::Interrupt(pressed, _time) => {
                for (id, entry) in self.entries.iter_mut().enumerate() {
                    if Some(id as u8) != pressed && entry.state.is_pending() {
                        debug!("Tap dance {} interrupted", id);
                        entry.state.interrupted = true;
                        entry.finish_and_reset(permissive_hold, &mut out);
                    }
                }
            }
            TapDanceEvent::Tick(now) => {
                for entry in self.entries.iter_mut() {
                    if entry.state.is_pending()
                        && now.saturating_duration_since(entry.state.last_tap) > entry.dance.tapping_term
                    {
                        entry.finish_and_reset(permissive_hold, &mut out);
                    }
                }
            }
        }
        out
    }

    /// Tap the tap action of a tap-hold dance that is released before it resolved.
    ///
    /// Call it on the release, before the release reaches [`TapDances::process`]. Double tap
    /// dances emit nothing here.
    pub fn eager_tap(&self, id: u8) -> Outputs {
        let mut out = Outputs::new();
        if let Some(entry) = self.get(id)
            && let TapDanceKind::TapHold { tap, .. } = entry.dance.kind
            && entry.state.count > 0
            && !entry.state.finished
        {
            debug!("Tap dance {} released before resolving, tapping {:?}", id, tap);
            tap_action(&mut out, tap);
        }
        out
    }

    /// When the next pending tap dance times out, `None` if nothing is pending
    pub fn next_timeout(&self) -> Option<Instant> {
        self.entries
            .iter()
            .filter(|e| e.state.is_pending())
            .map(|e| e.state.last_tap + e.dance.tapping_term)
            .min()
    }

    fn entry_mut(&mut self, id: u8) -> Option<&mut TapDanceEntry> {
        let entry = self.entries.get_mut(id as usize);
        if entry.is_none() {
            warn!("Tap dance {} is not configured", id);
        }
        entry
    }
}
