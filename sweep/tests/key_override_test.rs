pub mod common;

use sweep::action::Action;
use sweep::event::KeyboardOutput;
use sweep::keycode::KeyCode;
use sweep::modifier::{GUI, ModifierCombination};

use crate::common::{TestClock, create_sweep_keyboard};

const LGUI: Action = Action::Modifier(ModifierCombination::LGUI);
const LSHIFT: Action = Action::Modifier(ModifierCombination::LSHIFT);
const EURO: Action = Action::KeyWithModifier(
    KeyCode::Kc2,
    ModifierCombination::LSHIFT.union(ModifierCombination::LALT),
);

#[test]
fn test_one_shot_gui_grave_is_tilde() {
    key_sequence_test! {
        keyboard: create_sweep_keyboard().0,
        sequence: [
            [3, 4, true, 10],
            [3, 4, false, 20],
            [3, 6, true, 20],
            [3, 6, false, 20],
            // Grave on the symbol layer
            [2, 0, true, 20],
            [2, 0, false, 20],
        ],
        expected_outputs: [
            press!(LGUI),
            KeyboardOutput::Suppress(GUI),
            press!(skc!(Grave)),
            release!(skc!(Grave)),
            KeyboardOutput::Unsuppress(GUI),
            release!(LGUI),
        ]
    };
}

#[test]
fn test_held_gui_grave_is_tilde() {
    key_sequence_test! {
        keyboard: create_sweep_keyboard().0,
        sequence: [
            [3, 4, true, 10],
            [3, 6, true, 20],
            [3, 6, false, 20],
            [2, 0, true, 20],
            [2, 0, false, 20],
            [3, 4, false, 20],
        ],
        expected_outputs: [
            press!(LGUI),
            KeyboardOutput::Suppress(GUI),
            press!(skc!(Grave)),
            release!(skc!(Grave)),
            KeyboardOutput::Unsuppress(GUI),
            release!(LGUI),
        ]
    };
}

#[test]
fn test_grave_without_gui() {
    key_sequence_test! {
        keyboard: create_sweep_keyboard().0,
        sequence: [
            [3, 6, true, 10],
            [3, 6, false, 20],
            [2, 0, true, 20],
            [2, 0, false, 20],
        ],
        expected_outputs: [
            press!(kc!(Grave)),
            release!(kc!(Grave)),
        ]
    };
}

#[test]
fn test_shift_doesnt_trigger_override() {
    let (mut keyboard, _) = create_sweep_keyboard();
    let mut clock = TestClock::default();
    let sequence = key_sequence![
        // Shift held on the space key
        [3, 3, true, 10],
        [3, 6, true, 300],
        [3, 6, false, 20],
        [2, 0, true, 20],
        [2, 0, false, 20],
        [3, 3, false, 20],
    ];
    let outputs = clock.run(&mut keyboard, &sequence);
    assert_eq!(
        outputs,
        [press!(LSHIFT), press!(kc!(Grave)), release!(kc!(Grave)), release!(LSHIFT)]
    );
}

#[test]
fn test_gui_euro_is_dollar() {
    key_sequence_test! {
        keyboard: create_sweep_keyboard().0,
        sequence: [
            [3, 4, true, 10],
            [3, 4, false, 20],
            // One shot layer, then TO(2)
            [3, 6, true, 20],
            [3, 6, false, 20],
            [3, 6, true, 20],
            [3, 6, false, 20],
            // Euro on the numpad layer
            [1, 4, true, 20],
            [1, 4, false, 20],
        ],
        expected_outputs: [
            press!(LGUI),
            KeyboardOutput::Suppress(GUI),
            press!(skc!(Kc4)),
            release!(skc!(Kc4)),
            KeyboardOutput::Unsuppress(GUI),
            release!(LGUI),
        ]
    };
}

#[test]
fn test_euro_without_gui() {
    let (mut keyboard, _) = create_sweep_keyboard();
    let mut clock = TestClock::default();
    let sequence = key_sequence![
        [3, 6, true, 10],
        [3, 6, false, 20],
        [3, 6, true, 20],
        [3, 6, false, 20],
        [1, 4, true, 20],
    ];
    assert_eq!(clock.run(&mut keyboard, &sequence), [press!(EURO)]);
    assert_eq!(keyboard.layer_state().highest(), 2);
    assert_eq!(
        clock.run(&mut keyboard, &key_sequence![[1, 4, false, 20]]),
        [release!(EURO)]
    );
}

#[test]
fn test_override_released_after_gui() {
    let (mut keyboard, _) = create_sweep_keyboard();
    let mut clock = TestClock::default();
    let sequence = key_sequence![
        [3, 4, true, 10],
        [3, 6, true, 20],
        [3, 6, false, 20],
        [2, 0, true, 20],
        // Gui released first, the override stays until its key is released
        [3, 4, false, 20],
    ];
    assert_eq!(
        clock.run(&mut keyboard, &sequence),
        [press!(LGUI), KeyboardOutput::Suppress(GUI), press!(skc!(Grave)), release!(LGUI)]
    );
    assert_eq!(
        clock.run(&mut keyboard, &key_sequence![[2, 0, false, 20]]),
        [release!(skc!(Grave)), KeyboardOutput::Unsuppress(GUI)]
    );
}
