use minifb::{Key, KeyRepeat, Window};

/// Control inputs recognized alongside the keypad.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    /// Window closed or Escape.
    Quit,
    /// Space.
    TogglePause,
    /// Equals: reload the machine from the same rom.
    Restart,
}

/// Fixed keypad layout; CHIP-8 keys on the left, host keys on the right:
///
/// ```text
/// 1 2 3 C     1 2 3 4
/// 4 5 6 D     Q W E R
/// 7 8 9 E     A S D F
/// A 0 B F     Z X C V
/// ```
#[rustfmt::skip]
pub const KEYPAD: [(Key, u8); 16] = [
    (Key::Key1, 0x1), (Key::Key2, 0x2), (Key::Key3, 0x3), (Key::Key4, 0xC),
    (Key::Q, 0x4),    (Key::W, 0x5),    (Key::E, 0x6),    (Key::R, 0xD),
    (Key::A, 0x7),    (Key::S, 0x8),    (Key::D, 0x9),    (Key::F, 0xE),
    (Key::Z, 0xA),    (Key::X, 0x0),    (Key::C, 0xB),    (Key::V, 0xF),
];

/// Snapshot the held state of the 16 keypad keys.
pub fn read_keypad(window: &Window) -> [bool; 16] {
    let mut keys = [false; 16];
    for &(host, pad) in &KEYPAD {
        if window.is_key_down(host) {
            keys[pad as usize] = true;
        }
    }
    keys
}

/// Report at most one control event per frame; quit wins.
pub fn poll_control(window: &Window) -> Option<ControlEvent> {
    if !window.is_open() || window.is_key_down(Key::Escape) {
        return Some(ControlEvent::Quit);
    }
    if window.is_key_pressed(Key::Space, KeyRepeat::No) {
        return Some(ControlEvent::TogglePause);
    }
    if window.is_key_pressed(Key::Equal, KeyRepeat::No) {
        return Some(ControlEvent::Restart);
    }
    None
}
