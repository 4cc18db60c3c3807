extern crate sweep;

#[macro_export]
macro_rules! key_sequence_test {
    (keyboard: $keyboard:expr, sequence: [$([$row:expr, $col:expr, $pressed:expr, $delay:expr]),* $(,)?], expected_outputs: [$($output:expr),* $(,)?]) => {
        let mut keyboard = $keyboard;
        let sequence = $crate::key_sequence![$([$row, $col, $pressed, $delay]),*];
        let expected_outputs: Vec<sweep::event::KeyboardOutput> = vec![$($output),*];

        $crate::common::run_key_sequence_test(&mut keyboard, &sequence, &expected_outputs);
    };
}

// a rust macro to create a key sequence to simulate key presses
#[macro_export]
macro_rules! key_sequence {
    ($([$row:expr, $col:expr, $pressed:expr, $delay:expr]),* $(,)?) => {
        vec![
            $(
                $crate::common::TestKeyPress {
                    row: $row,
                    col: $col,
                    pressed: $pressed,
                    delay: $delay,
                },
            )*
        ]
    };
}

// a rust macro to map a keycode name to an `Action::Key`
#[macro_export]
macro_rules! kc {
    ($key: ident) => {
        sweep::action::Action::Key(sweep::keycode::KeyCode::$key)
    };
}

// a rust macro to map a keycode name to its shifted `Action::KeyWithModifier`
#[macro_export]
macro_rules! skc {
    ($key: ident) => {
        sweep::action::Action::KeyWithModifier(
            sweep::keycode::KeyCode::$key,
            sweep::modifier::ModifierCombination::LSHIFT,
        )
    };
}

#[macro_export]
macro_rules! press {
    ($action: expr) => {
        sweep::event::KeyboardOutput::Register($action)
    };
}

#[macro_export]
macro_rules! release {
    ($action: expr) => {
        sweep::event::KeyboardOutput::Unregister($action)
    };
}
