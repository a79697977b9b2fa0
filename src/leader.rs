//! Leader sequences: short keystroke combos entered after the leader key,
//! matched against a fixed registry of editor macros.
//!
//! This only collects and compares; the timeout window and the maximum
//! sequence length are [crate::scan]'s policy.

use crate::host::{send_steps, Host, Modifiers, Step};
use crate::keycode::KeyCode;
use Step::Tap;

const NONE: Modifiers = Modifiers::NONE;
const CTRL: Modifiers = Modifiers::LCTRL;
const SHIFT: Modifiers = Modifiers::LSHIFT;

/// Longest registered pattern.
pub const MAX_SEQUENCE: usize = 2;

/// Registered sequences, in match order, with the output each produces.
const SEQUENCES: &[(&[KeyCode], &[Step])] = &[
    // slash :: find
    (&[KeyCode::Slash], &[Tap(CTRL, KeyCode::F)]),
    // copy word
    (
        &[KeyCode::W, KeyCode::C],
        &[
            Tap(CTRL, KeyCode::Left),
            Tap(CTRL.with(SHIFT), KeyCode::Right),
            Tap(CTRL, KeyCode::C),
        ],
    ),
    // copy line
    (
        &[KeyCode::L, KeyCode::C],
        &[
            Tap(NONE, KeyCode::Home),
            Tap(SHIFT, KeyCode::End),
            Tap(CTRL, KeyCode::C),
        ],
    ),
    // copy all
    (
        &[KeyCode::A, KeyCode::C],
        &[Tap(CTRL, KeyCode::A), Tap(CTRL, KeyCode::C)],
    ),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Idle,
    Collecting,
}

/// Collects keys after the leader trigger and fires the first registered
/// sequence that matches exactly.
#[derive(Default)]
pub struct Leader {
    state: State,
    pending: [KeyCode; MAX_SEQUENCE],
    len: usize,
}

impl Leader {
    pub fn new() -> Self {
        Leader::default()
    }

    pub fn is_collecting(&self) -> bool {
        self.state == State::Collecting
    }

    /// Leader key pressed: start a fresh collection window.
    pub fn begin(&mut self) {
        self.state = State::Collecting;
        self.len = 0;
    }

    /// Offers a keystroke to the pending sequence. Returns `true` when the
    /// key was swallowed (a window is open), `false` when the matcher is
    /// idle and the key should be processed normally.
    pub fn collect(&mut self, key: KeyCode) -> bool {
        if self.state != State::Collecting {
            return false;
        }
        if self.len < MAX_SEQUENCE {
            self.pending[self.len] = key;
            self.len += 1;
        }
        true
    }

    /// Compares the pending sequence against the registry, once. On the
    /// first exact match the pattern's output is emitted and the matcher
    /// returns to idle; otherwise it keeps collecting. Returns `true` iff
    /// something was dispatched.
    pub fn scan(&mut self, host: &mut impl Host) -> bool {
        if self.state != State::Collecting || self.len == 0 {
            return false;
        }
        let pending = &self.pending[..self.len];
        for (pattern, output) in SEQUENCES {
            if *pattern == pending {
                send_steps(host, output);
                self.state = State::Idle;
                self.len = 0;
                return true;
            }
        }
        false
    }

    /// Timeout or cancellation: back to idle with no output.
    pub fn abort(&mut self) {
        self.state = State::Idle;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::{MockHost, Sent};
    use crate::keycode::KeyCode::*;

    #[test]
    fn new_matcher_starts_idle_with_an_empty_sequence() {
        let leader = Leader::new();
        assert!(!leader.is_collecting());
        assert_eq!(leader.pending, [KeyCode::No; MAX_SEQUENCE]);
        assert_eq!(leader.len, 0);
    }

    #[test]
    fn idle_matcher_swallows_nothing() {
        let mut leader = Leader::new();
        assert!(!leader.collect(W));
        let mut host = MockHost::default();
        assert!(!leader.scan(&mut host));
        assert!(host.sent.is_empty());
    }

    #[test]
    fn slash_fires_find() {
        let mut leader = Leader::new();
        leader.begin();
        assert!(leader.collect(Slash));
        let mut host = MockHost::default();
        assert!(leader.scan(&mut host));
        assert_eq!(host.sent, vec![Sent::Tap(Modifiers::LCTRL, F)]);
        assert!(!leader.is_collecting());
    }

    #[test]
    fn w_then_c_fires_copy_word() {
        let mut leader = Leader::new();
        leader.begin();
        leader.collect(W);
        let mut host = MockHost::default();
        // One key in: no single-key pattern starts with W, keep collecting.
        assert!(!leader.scan(&mut host));
        assert!(host.sent.is_empty());
        leader.collect(C);
        assert!(leader.scan(&mut host));
        assert_eq!(
            host.sent,
            vec![
                Sent::Tap(Modifiers::LCTRL, Left),
                Sent::Tap(Modifiers::LCTRL | Modifiers::LSHIFT, Right),
                Sent::Tap(Modifiers::LCTRL, C),
            ]
        );
    }

    #[test]
    fn copy_line_and_copy_all_match_their_registrations() {
        for (first, expected_first) in [
            (L, Sent::Tap(Modifiers::NONE, Home)),
            (A, Sent::Tap(Modifiers::LCTRL, A)),
        ] {
            let mut leader = Leader::new();
            leader.begin();
            leader.collect(first);
            leader.collect(C);
            let mut host = MockHost::default();
            assert!(leader.scan(&mut host));
            assert_eq!(host.sent[0], expected_first);
            assert_eq!(host.sent.last(), Some(&Sent::Tap(Modifiers::LCTRL, C)));
        }
    }

    #[test]
    fn unmatched_sequence_times_out_to_idle_with_no_output() {
        let mut leader = Leader::new();
        leader.begin();
        leader.collect(W);
        leader.collect(X);
        let mut host = MockHost::default();
        assert!(!leader.scan(&mut host));
        leader.abort();
        assert!(!leader.is_collecting());
        assert!(host.sent.is_empty());
        // And the next window starts clean.
        leader.begin();
        leader.collect(Slash);
        assert!(leader.scan(&mut host));
    }

    #[test]
    fn overlong_input_cannot_grow_past_the_limit() {
        let mut leader = Leader::new();
        leader.begin();
        for _ in 0..5 {
            assert!(leader.collect(W));
        }
        let mut host = MockHost::default();
        assert!(!leader.scan(&mut host));
    }
}
