//! Unicode code-point table and the "insert character by code" emission.
//!
//! The host is assumed to provide a modal code-point entry feature; which
//! one is selected by [Method] (keys on the function layer switch it at
//! runtime). The default is the Emacs `C-x 8 RET` convention the original
//! board was built around.

use crate::host::{send_steps, shift_pressed, Host, ModGuard, Modifiers, Step};
use crate::keycode::{hex_digit_key, KeyCode};

/// Symbolic ids for the code points placed directly on the layer grids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Name {
    AtSymbol,
    Gbp,
    Jpy,
    Euro,
    PlusMinus,
    QuotationMark,
    TildeOperator,
    SingleRightPointingAngleQuotationMark,
    SingleLeftPointingAngleQuotationMark,
    Backtick,
    DquoteOpen,
    DquoteClose,
    Prime,
    Pipe,
}

impl Name {
    pub const fn codepoint(self) -> u32 {
        match self {
            Name::AtSymbol => 0x0040,
            Name::Gbp => 0x00A3,
            Name::Jpy => 0x00A5,
            Name::Euro => 0x20AC,
            Name::PlusMinus => 0x00B1,
            Name::QuotationMark => 0x0022,
            Name::TildeOperator => 0x223C,
            Name::SingleRightPointingAngleQuotationMark => 0x203A,
            Name::SingleLeftPointingAngleQuotationMark => 0x2039,
            Name::Backtick => 0x2018,
            Name::DquoteOpen => 0x201C,
            Name::DquoteClose => 0x201D,
            Name::Prime => 0x2019,
            Name::Pipe => 0x2502,
        }
    }
}

/// Host-side code-point entry convention. Each one is a fixed three-phase
/// sequence: trigger the entry mode, type the hex digits, confirm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    /// Emacs `C-x 8 RET <hex> RET`.
    #[default]
    Emacs,
    /// IBus `ctrl+shift+u <hex> enter`.
    Linux,
    /// WinCompose: compose key, `u`, hex, enter.
    WinCompose,
    /// macOS "Unicode Hex Input": option held for each hex keystroke.
    MacOs,
}

impl Method {
    pub const fn cycle(self) -> Method {
        match self {
            Method::Emacs => Method::Linux,
            Method::Linux => Method::WinCompose,
            Method::WinCompose => Method::MacOs,
            Method::MacOs => Method::Emacs,
        }
    }
}

/// Formats a code point as uppercase hex, at least four digits wide, into
/// the caller's buffer. The buffer fits the widest possible value.
pub fn hex(codepoint: u32, buf: &mut [u8; 8]) -> &str {
    let mut digits = 0;
    let mut rest = codepoint;
    while rest != 0 {
        digits += 1;
        rest >>= 4;
    }
    if digits < 4 {
        digits = 4;
    }
    for i in 0..digits {
        let nibble = ((codepoint >> (4 * (digits - 1 - i))) & 0xf) as u8;
        buf[i] = if nibble < 10 { b'0' + nibble } else { b'A' + nibble - 10 };
    }
    // Buffer bytes are written above from the ASCII ranges only.
    core::str::from_utf8(&buf[..digits]).unwrap_or("")
}

const EMACS_TRIGGER: &[Step] = &[
    Step::Tap(Modifiers::LCTRL, KeyCode::X),
    Step::Tap(Modifiers::NONE, KeyCode::Kc8),
    Step::Tap(Modifiers::NONE, KeyCode::Enter),
];

const LINUX_TRIGGER: &[Step] = &[Step::Tap(
    Modifiers::LCTRL.with(Modifiers::LSHIFT),
    KeyCode::U,
)];

const WINCOMPOSE_TRIGGER: &[Step] = &[
    Step::Tap(Modifiers::NONE, KeyCode::RAlt),
    Step::Tap(Modifiers::NONE, KeyCode::U),
];

/// Inserts one code point on the host, with the modifier guard held around
/// the whole sequence so user-held modifiers cannot corrupt it.
pub fn insert(host: &mut impl Host, method: Method, codepoint: u32) {
    let mut guard = ModGuard::clear(host);
    let mut buf = [0u8; 8];
    let digits = hex(codepoint, &mut buf);
    match method {
        Method::Emacs => {
            send_steps(&mut *guard, EMACS_TRIGGER);
            guard.send_text(digits);
            guard.tap(Modifiers::NONE, KeyCode::Enter);
        }
        Method::Linux => {
            send_steps(&mut *guard, LINUX_TRIGGER);
            guard.send_text(digits);
            guard.tap(Modifiers::NONE, KeyCode::Enter);
        }
        Method::WinCompose => {
            send_steps(&mut *guard, WINCOMPOSE_TRIGGER);
            guard.send_text(digits);
            guard.tap(Modifiers::NONE, KeyCode::Enter);
        }
        Method::MacOs => {
            // Option per keystroke; the host treats it as held throughout.
            for byte in digits.bytes() {
                let nibble = if byte.is_ascii_digit() { byte - b'0' } else { byte - b'A' + 10 };
                guard.tap(Modifiers::LALT, hex_digit_key(nibble));
            }
        }
    }
}

/// Shift-pair variant: picks the code point from a single shift snapshot
/// taken before the guard touches the modifier state.
pub fn insert_pair(host: &mut impl Host, method: Method, plain: u32, shifted: u32) {
    let codepoint = if shift_pressed(host) { shifted } else { plain };
    insert(host, method, codepoint);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::{MockHost, Sent};
    use crate::keycode::KeyCode::*;

    #[test]
    fn table_preserves_exact_codepoints() {
        assert_eq!(Name::Euro.codepoint(), 0x20AC);
        assert_eq!(Name::AtSymbol.codepoint(), 0x0040);
        assert_eq!(Name::Pipe.codepoint(), 0x2502);
        assert_eq!(Name::DquoteOpen.codepoint(), 0x201C);
        assert_eq!(Name::Prime.codepoint(), 0x2019);
    }

    #[test]
    fn hex_pads_to_four_digits_and_grows_past_them() {
        let mut buf = [0u8; 8];
        assert_eq!(hex(0x40, &mut buf), "0040");
        let mut buf = [0u8; 8];
        assert_eq!(hex(0x20AC, &mut buf), "20AC");
        let mut buf = [0u8; 8];
        assert_eq!(hex(0x1F000, &mut buf), "1F000");
        // The buffer holds even the widest representable value.
        let mut buf = [0u8; 8];
        assert_eq!(hex(0xFFFF_FFFF, &mut buf), "FFFFFFFF");
    }

    #[test]
    fn emacs_insert_sends_trigger_hex_confirm() {
        let mut host = MockHost::default();
        insert(&mut host, Method::Emacs, Name::Euro.codepoint());
        assert_eq!(
            host.sent,
            vec![
                Sent::Tap(Modifiers::LCTRL, X),
                Sent::Tap(Modifiers::NONE, Kc8),
                Sent::Tap(Modifiers::NONE, Enter),
                Sent::Text("20AC".to_string()),
                Sent::Tap(Modifiers::NONE, Enter),
            ]
        );
    }

    #[test]
    fn insert_is_guarded_against_held_modifiers() {
        let mut host = MockHost::with_mods(Modifiers::LSHIFT | Modifiers::LCTRL);
        insert(&mut host, Method::Emacs, 0x2200);
        // Nothing in the sequence picked up the held modifiers...
        assert_eq!(host.sent[0], Sent::Tap(Modifiers::LCTRL, X));
        assert_eq!(host.sent[1], Sent::Tap(Modifiers::NONE, Kc8));
        // ...and they are back once the insert returns.
        assert_eq!(host.mods(), Modifiers::LSHIFT | Modifiers::LCTRL);
    }

    #[test]
    fn pair_selects_on_shift_snapshot() {
        let mut host = MockHost::default();
        insert_pair(&mut host, Method::Emacs, 0x03B8, 0x0398);
        assert_eq!(host.text(), "03B8");

        let mut host = MockHost::with_mods(Modifiers::RSHIFT);
        insert_pair(&mut host, Method::Emacs, 0x03B8, 0x0398);
        assert_eq!(host.text(), "0398");
        assert_eq!(host.mods(), Modifiers::RSHIFT);
    }

    #[test]
    fn linux_method_uses_ibus_sequence() {
        let mut host = MockHost::default();
        insert(&mut host, Method::Linux, 0x00B1);
        assert_eq!(
            host.sent,
            vec![
                Sent::Tap(Modifiers::LCTRL | Modifiers::LSHIFT, U),
                Sent::Text("00B1".to_string()),
                Sent::Tap(Modifiers::NONE, Enter),
            ]
        );
    }

    #[test]
    fn macos_method_holds_option_per_digit() {
        let mut host = MockHost::default();
        insert(&mut host, Method::MacOs, 0x20AC);
        assert_eq!(
            host.sent,
            vec![
                Sent::Tap(Modifiers::LALT, Kc2),
                Sent::Tap(Modifiers::LALT, Kc0),
                Sent::Tap(Modifiers::LALT, A),
                Sent::Tap(Modifiers::LALT, C),
            ]
        );
    }

    #[test]
    fn cycle_visits_every_method_and_wraps() {
        let mut m = Method::Emacs;
        let mut seen = Vec::new();
        for _ in 0..4 {
            m = m.cycle();
            seen.push(m);
        }
        assert_eq!(
            seen,
            vec![Method::Linux, Method::WinCompose, Method::MacOs, Method::Emacs]
        );
    }
}
