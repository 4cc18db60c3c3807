pub mod test_macro;

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embassy_time::{Duration, Instant};
use embedded_hal::digital::{ErrorType, OutputPin, PinState};
use log::debug;
use sweep::config::LightConfig;
use sweep::event::{KeyboardEvent, KeyboardOutput};
use sweep::hooks::KeyboardHooks;
use sweep::keyboard::Keyboard;
use sweep::layout::{self, COL, NUM_LAYER, ROW, SweepHooks};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

#[derive(Debug, Clone)]
pub struct TestKeyPress {
    pub row: u8,
    pub col: u8,
    pub pressed: bool,
    pub delay: u64, // Delay before this key event in milliseconds
}

/// Output pin that records every level written to it, `true` is high
#[derive(Clone, Default)]
pub struct TestPin {
    levels: Rc<RefCell<Vec<bool>>>,
}

impl TestPin {
    pub fn levels(&self) -> Vec<bool> {
        self.levels.borrow().clone()
    }

    pub fn last_level(&self) -> Option<bool> {
        self.levels.borrow().last().copied()
    }
}

impl ErrorType for TestPin {
    type Error = Infallible;
}

impl OutputPin for TestPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(true);
        Ok(())
    }
}

pub type SweepKeyboard = Keyboard<'static, SweepHooks<TestPin>, ROW, COL, NUM_LAYER>;

/// The Ferris Sweep keymap with an active-low indicator on a recording pin
pub fn create_sweep_keyboard() -> (SweepKeyboard, TestPin) {
    let pin = TestPin::default();
    let keyboard = layout::new_keyboard(LightConfig {
        layer_indicator: Some(pin.clone()),
        on_state: PinState::Low,
    });
    (keyboard, pin)
}

/// Simulated time, starting at 0ms.
///
/// Timeouts are ticked as the host firmware would: 1ms after the deadline returned by
/// `Keyboard::next_timeout`, before any later key event.
#[derive(Debug, Default)]
pub struct TestClock {
    pub now: u64,
}

impl TestClock {
    /// Feed a key sequence, returning every output in order
    pub fn run<H: KeyboardHooks, const ROW: usize, const COL: usize, const NUM_LAYER: usize>(
        &mut self,
        keyboard: &mut Keyboard<'_, H, ROW, COL, NUM_LAYER>,
        key_sequence: &[TestKeyPress],
    ) -> Vec<KeyboardOutput> {
        let mut outputs = Vec::new();
        for key in key_sequence {
            outputs.extend(self.wait(keyboard, key.delay));
            let event = KeyboardEvent::key(key.row, key.col, key.pressed, Instant::from_millis(self.now));
            let out = keyboard.process_event(event);
            debug!("{:?} -> {:?}", event, out);
            outputs.extend(out);
        }
        outputs
    }

    /// Let `ms` milliseconds pass, ticking every timeout in between
    pub fn wait<H: KeyboardHooks, const ROW: usize, const COL: usize, const NUM_LAYER: usize>(
        &mut self,
        keyboard: &mut Keyboard<'_, H, ROW, COL, NUM_LAYER>,
        ms: u64,
    ) -> Vec<KeyboardOutput> {
        let end = Instant::from_millis(self.now + ms);
        let mut outputs = Vec::new();
        while let Some(deadline) = keyboard.next_timeout()
            && deadline < end
        {
            let at = (deadline + Duration::from_millis(1)).min(end);
            outputs.extend(keyboard.tick(at));
        }
        self.now += ms;
        outputs
    }
}

/// Run a key sequence on a fresh clock, then let every pending key resolve
pub fn run_key_sequence_test<H: KeyboardHooks, const ROW: usize, const COL: usize, const NUM_LAYER: usize>(
    keyboard: &mut Keyboard<'_, H, ROW, COL, NUM_LAYER>,
    key_sequence: &[TestKeyPress],
    expected_outputs: &[KeyboardOutput],
) {
    let mut clock = TestClock::default();
    let mut outputs = clock.run(keyboard, key_sequence);
    outputs.extend(clock.wait(keyboard, 1000));
    assert_eq!(outputs, expected_outputs);
}

/// Every registered action is unregistered exactly once
pub fn assert_balanced(outputs: &[KeyboardOutput]) {
    let mut held = Vec::new();
    for output in outputs {
        match output {
            KeyboardOutput::Register(action) => held.push(*action),
            KeyboardOutput::Unregister(action) => {
                let idx = held
                    .iter()
                    .position(|a| a == action)
                    .unwrap_or_else(|| panic!("{:?} unregistered but not registered", action));
                held.remove(idx);
            }
            _ => (),
        }
    }
    assert!(held.is_empty(), "stuck keys: {:?}", held);
}
