//! The outbound side of the keyboard: the [Host] trait through which macro
//! sequences reach the computer, and the [ModGuard] that keeps injected
//! keystrokes from being corrupted by modifiers the user is still holding.

use crate::keycode::KeyCode;

/// Bitset over the eight HID modifier flags (left/right ctrl, shift, alt,
/// gui), in USB report byte order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const LCTRL: Modifiers = Modifiers(0x01);
    pub const LSHIFT: Modifiers = Modifiers(0x02);
    pub const LALT: Modifiers = Modifiers(0x04);
    pub const LGUI: Modifiers = Modifiers(0x08);
    pub const RCTRL: Modifiers = Modifiers(0x10);
    pub const RSHIFT: Modifiers = Modifiers(0x20);
    pub const RALT: Modifiers = Modifiers(0x40);
    pub const RGUI: Modifiers = Modifiers(0x80);

    /// Either shift key.
    pub const SHIFT_MASK: Modifiers = Modifiers(0x02 | 0x20);
    /// Either ctrl key.
    pub const CTRL_MASK: Modifiers = Modifiers(0x01 | 0x10);

    pub const fn with(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    pub const fn intersects(self, mask: Modifiers) -> bool {
        self.0 & mask.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl core::ops::BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Modifiers) -> Modifiers {
        self.with(rhs)
    }
}

/// One primitive of an emitted output sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Press the given modifiers, tap the key, release again.
    Tap(Modifiers, KeyCode),
    /// Type a literal string through the host's text primitive.
    Text(&'static str),
}

/// What the dispatch layer needs from the machinery that actually talks to
/// the computer. The implementation owns the live modifier state; taps are
/// sent with whatever modifiers are active at the time, which is exactly why
/// [ModGuard] exists.
pub trait Host {
    fn mods(&self) -> Modifiers;
    fn set_mods(&mut self, mods: Modifiers);
    /// Tap `key` with `mods` held for the duration of the tap, on top of the
    /// currently active modifiers.
    fn tap(&mut self, mods: Modifiers, key: KeyCode);
    fn send_text(&mut self, text: &str);
}

/// True iff either shift bit is currently active on the host. Dual-purpose
/// keys snapshot this once, before any modifier mutation, to pick a branch.
pub fn shift_pressed(host: &impl Host) -> bool {
    host.mods().intersects(Modifiers::SHIFT_MASK)
}

/// Clears the active modifiers for the duration of a scope and restores the
/// exact prior value when the guard drops, on every exit path.
///
/// Each guard carries its own saved value, so a guarded action that runs
/// another guarded action restores correctly where a single shared save slot
/// would have been clobbered.
pub struct ModGuard<'a, H: Host> {
    host: &'a mut H,
    saved: Modifiers,
}

impl<'a, H: Host> ModGuard<'a, H> {
    pub fn clear(host: &'a mut H) -> Self {
        let saved = host.mods();
        host.set_mods(Modifiers::NONE);
        ModGuard { host, saved }
    }
}

impl<H: Host> core::ops::Deref for ModGuard<'_, H> {
    type Target = H;
    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: Host> core::ops::DerefMut for ModGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: Host> Drop for ModGuard<'_, H> {
    fn drop(&mut self) {
        self.host.set_mods(self.saved);
    }
}

/// Sends a step sequence, one step at a time, in order.
pub fn send_steps(host: &mut impl Host, steps: &[Step]) {
    for step in steps {
        match *step {
            Step::Tap(mods, key) => host.tap(mods, key),
            Step::Text(text) => host.send_text(text),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records everything a dispatch emits, for asserting exact sequences.
    #[derive(Debug, PartialEq, Eq, Clone)]
    pub enum Sent {
        Tap(Modifiers, KeyCode),
        Text(String),
    }

    #[derive(Default)]
    pub struct MockHost {
        pub mods: Modifiers,
        pub sent: Vec<Sent>,
    }

    impl MockHost {
        pub fn with_mods(mods: Modifiers) -> Self {
            MockHost { mods, sent: Vec::new() }
        }

        /// The literal text sent so far, concatenated.
        pub fn text(&self) -> String {
            self.sent
                .iter()
                .filter_map(|s| match s {
                    Sent::Text(t) => Some(t.as_str()),
                    Sent::Tap(..) => None,
                })
                .collect()
        }
    }

    impl Host for MockHost {
        fn mods(&self) -> Modifiers {
            self.mods
        }

        fn set_mods(&mut self, mods: Modifiers) {
            self.mods = mods;
        }

        fn tap(&mut self, mods: Modifiers, key: KeyCode) {
            // Live modifiers bleed into the tap, as on a real host.
            self.sent.push(Sent::Tap(self.mods.with(mods), key));
        }

        fn send_text(&mut self, text: &str) {
            self.sent.push(Sent::Text(text.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{MockHost, Sent};
    use super::*;
    use crate::keycode::KeyCode::*;

    #[test]
    fn guard_round_trip_is_a_no_op() {
        let mut host = MockHost::with_mods(Modifiers::LSHIFT | Modifiers::RCTRL);
        let before = host.mods();
        {
            let _guard = ModGuard::clear(&mut host);
        }
        assert_eq!(host.mods(), before);
    }

    #[test]
    fn guard_clears_for_the_scope_and_restores_after() {
        let mut host = MockHost::with_mods(Modifiers::LSHIFT);
        {
            let mut guard = ModGuard::clear(&mut host);
            assert_eq!(guard.mods(), Modifiers::NONE);
            guard.tap(Modifiers::LCTRL, X);
        }
        // The tap went out unshifted, and shift is back afterwards.
        assert_eq!(host.sent, vec![Sent::Tap(Modifiers::LCTRL, X)]);
        assert_eq!(host.mods(), Modifiers::LSHIFT);
    }

    #[test]
    fn nested_guards_restore_in_order() {
        let mut host = MockHost::with_mods(Modifiers::LALT);
        {
            let mut outer = ModGuard::clear(&mut host);
            outer.set_mods(Modifiers::LSHIFT);
            {
                let inner = ModGuard::clear(&mut *outer);
                assert_eq!(inner.mods(), Modifiers::NONE);
            }
            // Inner guard restored the state the outer scope had set up.
            assert_eq!(outer.mods(), Modifiers::LSHIFT);
        }
        assert_eq!(host.mods(), Modifiers::LALT);
    }

    #[test]
    fn shift_predicate_sees_either_shift() {
        assert!(shift_pressed(&MockHost::with_mods(Modifiers::LSHIFT)));
        assert!(shift_pressed(&MockHost::with_mods(Modifiers::RSHIFT)));
        assert!(!shift_pressed(&MockHost::with_mods(Modifiers::LCTRL)));
        assert!(!shift_pressed(&MockHost::default()));
    }

    #[test]
    fn steps_are_sent_in_order() {
        let mut host = MockHost::default();
        send_steps(
            &mut host,
            &[
                Step::Tap(Modifiers::LALT, X),
                Step::Text("vterm"),
                Step::Tap(Modifiers::NONE, Enter),
            ],
        );
        assert_eq!(
            host.sent,
            vec![
                Sent::Tap(Modifiers::LALT, X),
                Sent::Text("vterm".to_string()),
                Sent::Tap(Modifiers::NONE, Enter),
            ]
        );
    }
}
