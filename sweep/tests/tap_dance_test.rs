pub mod common;

use sweep::action::Action;
use sweep::event::KeyboardOutput;
use sweep::keycode::KeyCode;
use sweep::modifier::ModifierCombination;

use crate::common::{TestClock, assert_balanced, create_sweep_keyboard, run_key_sequence_test};

const SCREENSHOT: Action = Action::KeyWithModifier(
    KeyCode::Kc4,
    ModifierCombination::LCTRL
        .union(ModifierCombination::LSHIFT)
        .union(ModifierCombination::LGUI),
);

/// Double tap dances on the base layer: position, single tap and double tap actions
const BASE_DANCES: [((u8, u8), Action, Action); 4] = [
    ((0, 0), kc!(Semicolon), kc!(Minus)),
    ((0, 1), kc!(Comma), skc!(Minus)),
    ((0, 2), kc!(Dot), skc!(Kc1)),
    ((2, 0), kc!(Quote), kc!(Grave)),
];

/// Double tap dances on the symbol layer, reached with the one shot layer key
const SYMBOL_DANCES: [((u8, u8), Action, Action); 2] = [
    ((1, 4), skc!(Kc6), kc!(Home)),
    ((1, 5), skc!(Kc4), kc!(End)),
];

#[test]
fn test_semicolon_single_tap() {
    key_sequence_test! {
        keyboard: create_sweep_keyboard().0,
        sequence: [
            [0, 0, true, 10],
            [0, 0, false, 50],
        ],
        expected_outputs: [
            press!(kc!(Semicolon)),
            release!(kc!(Semicolon)),
        ]
    };
}

#[test]
fn test_semicolon_double_tap() {
    key_sequence_test! {
        keyboard: create_sweep_keyboard().0,
        sequence: [
            [0, 0, true, 10],
            [0, 0, false, 50],
            [0, 0, true, 50],
            [0, 0, false, 50],
        ],
        expected_outputs: [
            press!(kc!(Minus)),
            release!(kc!(Minus)),
        ]
    };
}

#[test]
fn test_base_layer_double_dances() {
    for ((row, col), single, double) in BASE_DANCES {
        let sequence = key_sequence![[row, col, true, 10], [row, col, false, 40]];
        run_key_sequence_test(&mut create_sweep_keyboard().0, &sequence, &[press!(single), release!(single)]);

        let sequence = key_sequence![
            [row, col, true, 10],
            [row, col, false, 40],
            [row, col, true, 40],
            [row, col, false, 40],
        ];
        run_key_sequence_test(&mut create_sweep_keyboard().0, &sequence, &[press!(double), release!(double)]);
    }
}

#[test]
fn test_symbol_layer_double_dances() {
    for ((row, col), single, double) in SYMBOL_DANCES {
        let (mut keyboard, _) = create_sweep_keyboard();
        let sequence = key_sequence![
            [3, 6, true, 10],
            [3, 6, false, 20],
            [row, col, true, 20],
            [row, col, false, 40],
        ];
        run_key_sequence_test(&mut keyboard, &sequence, &[press!(single), release!(single)]);
        // The resolved tap consumed the one shot layer
        assert_eq!(keyboard.layer_state().highest(), 0);

        let (mut keyboard, _) = create_sweep_keyboard();
        let sequence = key_sequence![
            [3, 6, true, 10],
            [3, 6, false, 20],
            [row, col, true, 20],
            [row, col, false, 40],
            [row, col, true, 40],
            [row, col, false, 40],
        ];
        run_key_sequence_test(&mut keyboard, &sequence, &[press!(double), release!(double)]);
        assert_eq!(keyboard.layer_state().highest(), 0);
    }
}

#[test]
fn test_taps_outside_tapping_term_are_two_singles() {
    // The second press comes 201ms after the first one
    key_sequence_test! {
        keyboard: create_sweep_keyboard().0,
        sequence: [
            [0, 1, true, 10],
            [0, 1, false, 50],
            [0, 1, true, 151],
            [0, 1, false, 50],
        ],
        expected_outputs: [
            press!(kc!(Comma)),
            release!(kc!(Comma)),
            press!(kc!(Comma)),
            release!(kc!(Comma)),
        ]
    };
}

#[test]
fn test_second_tap_on_tapping_term_is_double() {
    key_sequence_test! {
        keyboard: create_sweep_keyboard().0,
        sequence: [
            [0, 1, true, 10],
            [0, 1, false, 50],
            [0, 1, true, 150],
            [0, 1, false, 50],
        ],
        expected_outputs: [
            press!(skc!(Minus)),
            release!(skc!(Minus)),
        ]
    };
}

#[test]
fn test_double_dance_interrupted_after_one_tap() {
    key_sequence_test! {
        keyboard: create_sweep_keyboard().0,
        sequence: [
            [0, 2, true, 10],
            [0, 2, false, 30],
            [1, 0, true, 20],
            [1, 0, false, 30],
        ],
        expected_outputs: [
            press!(kc!(Dot)),
            release!(kc!(Dot)),
            press!(kc!(A)),
            release!(kc!(A)),
        ]
    };
}

#[test]
fn test_double_dance_held_after_double_tap() {
    let (mut keyboard, _) = create_sweep_keyboard();
    let mut clock = TestClock::default();
    let sequence = key_sequence![[2, 0, true, 10], [2, 0, false, 30], [2, 0, true, 30]];
    assert_eq!(clock.run(&mut keyboard, &sequence), [press!(kc!(Grave))]);
    // Held past the tapping term, nothing more happens until the release
    assert!(clock.wait(&mut keyboard, 500).is_empty());
    let sequence = key_sequence![[2, 0, false, 0]];
    assert_eq!(clock.run(&mut keyboard, &sequence), [release!(kc!(Grave))]);
}

#[test]
fn test_screenshot_dance_hold() {
    let (mut keyboard, _) = create_sweep_keyboard();
    let sequence = key_sequence![
        [3, 6, true, 10],
        [3, 6, false, 20],
        [0, 2, true, 20],
        [0, 2, false, 250],
    ];
    run_key_sequence_test(&mut keyboard, &sequence, &[press!(SCREENSHOT), release!(SCREENSHOT)]);
    assert_eq!(keyboard.layer_state().highest(), 0);
}

#[test]
fn test_screenshot_chord_registered_on_resolution() {
    let (mut keyboard, _) = create_sweep_keyboard();
    let mut clock = TestClock::default();
    let sequence = key_sequence![[3, 6, true, 10], [3, 6, false, 20], [0, 2, true, 20]];
    assert!(clock.run(&mut keyboard, &sequence).is_empty());
    assert!(clock.wait(&mut keyboard, 200).is_empty());
    assert_eq!(clock.wait(&mut keyboard, 1), [press!(SCREENSHOT)]);
    assert!(clock.wait(&mut keyboard, 49).is_empty());

    let sequence = key_sequence![[0, 2, false, 0]];
    assert_eq!(clock.run(&mut keyboard, &sequence), [release!(SCREENSHOT)]);
}

#[test]
fn test_screenshot_dance_quick_tap() {
    let (mut keyboard, _) = create_sweep_keyboard();
    let mut clock = TestClock::default();
    let sequence = key_sequence![[3, 6, true, 10], [3, 6, false, 20], [0, 2, true, 20]];
    clock.run(&mut keyboard, &sequence);
    // The dot is typed on the release, before the tapping term ends
    let sequence = key_sequence![[0, 2, false, 50]];
    assert_eq!(
        clock.run(&mut keyboard, &sequence),
        [press!(kc!(Dot)), release!(kc!(Dot))]
    );
    assert!(clock.wait(&mut keyboard, 1000).is_empty());
    assert_eq!(keyboard.layer_state().highest(), 0);
}

#[test]
fn test_screenshot_dance_interrupted() {
    key_sequence_test! {
        keyboard: create_sweep_keyboard().0,
        sequence: [
            [3, 6, true, 10],
            [3, 6, false, 20],
            [0, 2, true, 20],
            // Escape on the symbol layer
            [0, 0, true, 50],
            [0, 2, false, 20],
            [0, 0, false, 20],
        ],
        expected_outputs: [
            press!(kc!(Dot)),
            press!(kc!(Escape)),
            release!(kc!(Dot)),
            release!(kc!(Escape)),
        ]
    };
}

#[test]
fn test_tap_dances_never_leave_stuck_keys() {
    let (mut keyboard, _) = create_sweep_keyboard();
    let mut clock = TestClock::default();
    let sequence = key_sequence![
        // Rolling over two dances
        [0, 0, true, 10],
        [0, 1, true, 30],
        [0, 0, false, 30],
        [0, 1, false, 30],
        // Triple tap
        [0, 2, true, 30],
        [0, 2, false, 30],
        [0, 2, true, 30],
        [0, 2, false, 30],
        [0, 2, true, 30],
        [0, 2, false, 30],
        // Held single tap
        [2, 0, true, 300],
        [1, 3, true, 300],
        [1, 3, false, 20],
        [2, 0, false, 20],
        // Screenshot key held, tapped, and interrupted
        [3, 6, true, 30],
        [3, 6, false, 30],
        [0, 2, true, 30],
        [0, 2, false, 300],
        [3, 6, true, 30],
        [3, 6, false, 30],
        [0, 2, true, 30],
        [0, 2, false, 30],
        [3, 6, true, 300],
        [3, 6, false, 30],
        [0, 2, true, 30],
        [0, 0, true, 30],
        [0, 0, false, 30],
        [0, 2, false, 30],
    ];
    let mut outputs = clock.run(&mut keyboard, &sequence);
    outputs.extend(clock.wait(&mut keyboard, 1000));

    assert_balanced(&outputs);
    assert!(!keyboard.tap_dances().has_pending());
    assert_eq!(keyboard.next_timeout(), None);
    for output in &outputs {
        assert!(!matches!(output, KeyboardOutput::Suppress(_) | KeyboardOutput::Bootloader));
    }
}
