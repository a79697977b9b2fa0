//! USB HID keyboard usage ids for every key the layer grids and macro
//! sequences refer to, plus the ASCII lookup used to type literal text.
//!
//! Replaces the vendored constants module the previous firmware pulled its
//! codes from; only the usages this keyboard actually emits are defined.

/// A keyboard usage id from the HID usage tables (page 0x07).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum KeyCode {
    #[default]
    No = 0x00,
    A = 0x04,
    B = 0x05,
    C = 0x06,
    D = 0x07,
    E = 0x08,
    F = 0x09,
    G = 0x0a,
    H = 0x0b,
    I = 0x0c,
    J = 0x0d,
    K = 0x0e,
    L = 0x0f,
    M = 0x10,
    N = 0x11,
    O = 0x12,
    P = 0x13,
    Q = 0x14,
    R = 0x15,
    S = 0x16,
    T = 0x17,
    U = 0x18,
    V = 0x19,
    W = 0x1a,
    X = 0x1b,
    Y = 0x1c,
    Z = 0x1d,
    Kc1 = 0x1e,
    Kc2 = 0x1f,
    Kc3 = 0x20,
    Kc4 = 0x21,
    Kc5 = 0x22,
    Kc6 = 0x23,
    Kc7 = 0x24,
    Kc8 = 0x25,
    Kc9 = 0x26,
    Kc0 = 0x27,
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2a,
    Tab = 0x2b,
    Space = 0x2c,
    Minus = 0x2d,
    Equal = 0x2e,
    LeftBracket = 0x2f,
    RightBracket = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Grave = 0x35,
    Comma = 0x36,
    Dot = 0x37,
    Slash = 0x38,
    CapsLock = 0x39,
    F1 = 0x3a,
    F2 = 0x3b,
    F3 = 0x3c,
    F4 = 0x3d,
    F5 = 0x3e,
    F6 = 0x3f,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4a,
    PageUp = 0x4b,
    Delete = 0x4c,
    End = 0x4d,
    PageDown = 0x4e,
    Right = 0x4f,
    Left = 0x50,
    Down = 0x51,
    Up = 0x52,
    NumLock = 0x53,
    KpSlash = 0x54,
    KpAsterisk = 0x55,
    KpMinus = 0x56,
    KpPlus = 0x57,
    KpEnter = 0x58,
    Kp1 = 0x59,
    Kp2 = 0x5a,
    Kp3 = 0x5b,
    Kp4 = 0x5c,
    Kp5 = 0x5d,
    Kp6 = 0x5e,
    Kp7 = 0x5f,
    Kp8 = 0x60,
    Kp9 = 0x61,
    Kp0 = 0x62,
    KpDot = 0x63,
    Application = 0x65,
    Select = 0x77,
    Clear = 0x9c,
    LCtrl = 0xe0,
    LShift = 0xe1,
    LAlt = 0xe2,
    LGui = 0xe3,
    RCtrl = 0xe4,
    RShift = 0xe5,
    RAlt = 0xe6,
    RGui = 0xe7,
}

use crate::host::Modifiers;
use KeyCode::*;

/// Maps a modifier [KeyCode] to the equivalent flag bit for the USB HID
/// modifier byte, or returns 0 for any non-modifier [KeyCode].
pub const fn modifier_bit(code: KeyCode) -> u8 {
    match code {
        LCtrl => 0x01,
        LShift => 0x02,
        LAlt => 0x04,
        LGui => 0x08,
        RCtrl => 0x10,
        RShift => 0x20,
        RAlt => 0x40,
        RGui => 0x80,
        _ => 0,
    }
}

/// Keystroke producing one printable ASCII byte on a US-layout host, or
/// `None` for anything this keyboard never types as literal text.
///
/// This is the collaborator half of the "emit literal text" primitive: the
/// firmware renders `Step::Text` through it, one report pair per byte.
pub const fn ascii_key(byte: u8) -> Option<(Modifiers, KeyCode)> {
    let plain = Modifiers::NONE;
    let shifted = Modifiers::LSHIFT;
    Some(match byte {
        b'a'..=b'z' => (plain, letter(byte - b'a')),
        b'A'..=b'Z' => (shifted, letter(byte - b'A')),
        b'1'..=b'9' => (plain, digit(byte - b'0')),
        b'0' => (plain, Kc0),
        b' ' => (plain, Space),
        b'\n' => (plain, Enter),
        b'\t' => (plain, Tab),
        b'-' => (plain, Minus),
        b'=' => (plain, Equal),
        b'[' => (plain, LeftBracket),
        b']' => (plain, RightBracket),
        b'\\' => (plain, Backslash),
        b';' => (plain, Semicolon),
        b'\'' => (plain, Quote),
        b'`' => (plain, Grave),
        b',' => (plain, Comma),
        b'.' => (plain, Dot),
        b'/' => (plain, Slash),
        b'!' => (shifted, Kc1),
        b'@' => (shifted, Kc2),
        b'#' => (shifted, Kc3),
        b'$' => (shifted, Kc4),
        b'%' => (shifted, Kc5),
        b'^' => (shifted, Kc6),
        b'&' => (shifted, Kc7),
        b'*' => (shifted, Kc8),
        b'(' => (shifted, Kc9),
        b')' => (shifted, Kc0),
        b'_' => (shifted, Minus),
        b'+' => (shifted, Equal),
        b'{' => (shifted, LeftBracket),
        b'}' => (shifted, RightBracket),
        b'|' => (shifted, Backslash),
        b':' => (shifted, Semicolon),
        b'"' => (shifted, Quote),
        b'~' => (shifted, Grave),
        b'<' => (shifted, Comma),
        b'>' => (shifted, Dot),
        b'?' => (shifted, Slash),
        _ => return None,
    })
}

const fn letter(index: u8) -> KeyCode {
    const LETTERS: [KeyCode; 26] = [
        A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    ];
    LETTERS[index as usize]
}

const fn digit(value: u8) -> KeyCode {
    const DIGITS: [KeyCode; 10] = [Kc0, Kc1, Kc2, Kc3, Kc4, Kc5, Kc6, Kc7, Kc8, Kc9];
    DIGITS[value as usize]
}

/// [KeyCode] for one uppercase hex digit, used when a unicode entry method
/// types the code point as individual keystrokes.
pub const fn hex_digit_key(digit: u8) -> KeyCode {
    match digit {
        0 => Kc0,
        1 => Kc1,
        2 => Kc2,
        3 => Kc3,
        4 => Kc4,
        5 => Kc5,
        6 => Kc6,
        7 => Kc7,
        8 => Kc8,
        9 => Kc9,
        0xa => A,
        0xb => B,
        0xc => C,
        0xd => D,
        0xe => E,
        _ => F,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_bits_cover_all_eight_modifiers() {
        let mods = [LCtrl, LShift, LAlt, LGui, RCtrl, RShift, RAlt, RGui];
        let mut seen = 0u8;
        for m in mods {
            let bit = modifier_bit(m);
            assert_eq!(bit.count_ones(), 1);
            seen |= bit;
        }
        assert_eq!(seen, 0xff);
    }

    #[test]
    fn non_modifiers_have_no_bit() {
        assert_eq!(modifier_bit(A), 0);
        assert_eq!(modifier_bit(Enter), 0);
        assert_eq!(modifier_bit(No), 0);
    }

    #[test]
    fn ascii_lookup_matches_us_layout() {
        assert_eq!(ascii_key(b'a'), Some((Modifiers::NONE, A)));
        assert_eq!(ascii_key(b'Z'), Some((Modifiers::LSHIFT, Z)));
        assert_eq!(ascii_key(b'"'), Some((Modifiers::LSHIFT, Quote)));
        assert_eq!(ascii_key(b'{'), Some((Modifiers::LSHIFT, LeftBracket)));
        assert_eq!(ascii_key(b'0'), Some((Modifiers::NONE, Kc0)));
        assert_eq!(ascii_key(0x07), None);
    }

    #[test]
    fn hex_digits_map_to_number_row_and_letters() {
        assert_eq!(hex_digit_key(0), Kc0);
        assert_eq!(hex_digit_key(9), Kc9);
        assert_eq!(hex_digit_key(0xa), A);
        assert_eq!(hex_digit_key(0xf), F);
    }
}
