//! Key scanning, debouncing, layer selection and event dispatch. Takes a
//! raw matrix snapshot each tick (the binary owns the GPIO strobing), uses
//! definitions from [crate::keymap], and produces the HID reports to be
//! sent out by [crate::usb]: one live report for the held keys, plus a
//! queue of injected reports from macro and unicode output.

use crate::host::{Host, Modifiers};
use crate::keycode::{ascii_key, modifier_bit, KeyCode};
use crate::keymap::{
    logical_position, resolve, Key, LayerId, MATRIX_ROWS,
};
use crate::leader::Leader;
use crate::macros::{Dispatcher, KeyEvent};
use crate::unicode;
use usbd_hid::descriptor::KeyboardReport;

/// One electrical matrix snapshot: a bit per column, one word per row.
pub type MatrixSnapshot = [u16; MATRIX_ROWS];

/// Used to uniquely identify each physical key which can be pressed,
/// in logical grid coordinates.
type ScanCode = (u8, u8);

const HELD_KEYS_LIMIT: usize = 16;
const DEFAULT_DEBOUNCE_COUNT: u8 = 5;

/// New presses a single tick can dispatch. Humans do not land more.
const NEW_PRESS_LIMIT: usize = 8;

/// Scans between a leader trigger and giving up on the sequence.
/// At roughly 5ms a tick this is the usual 300ms window.
const LEADER_TIMEOUT_SCANS: u16 = 60;

/// Injected keystrokes buffered as (modifier byte, keycode) report pairs.
/// Deep enough for the longest macro (a guarded unicode insert).
const QUEUE_LIMIT: usize = 64;

/// A [Host] that renders taps and literal text into queued HID reports:
/// a press report followed by a release report per keystroke, each
/// carrying whatever modifier state is active at the time.
pub struct ReportQueue {
    mods: Modifiers,
    entries: [(u8, u8); QUEUE_LIMIT],
    head: usize,
    len: usize,
}

impl Default for ReportQueue {
    fn default() -> Self {
        ReportQueue {
            mods: Modifiers::NONE,
            entries: [(0, 0); QUEUE_LIMIT],
            head: 0,
            len: 0,
        }
    }
}

impl ReportQueue {
    fn push(&mut self, modifier: u8, keycode: u8) {
        if self.len == QUEUE_LIMIT {
            // Full queue drops the keystroke rather than corrupting it.
            return;
        }
        self.entries[(self.head + self.len) % QUEUE_LIMIT] = (modifier, keycode);
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<KeyboardReport> {
        if self.len == 0 {
            return None;
        }
        let (modifier, keycode) = self.entries[self.head];
        self.head = (self.head + 1) % QUEUE_LIMIT;
        self.len -= 1;
        Some(KeyboardReport {
            modifier,
            reserved: 0,
            leds: 0,
            keycodes: [keycode, 0, 0, 0, 0, 0],
        })
    }
}

impl Host for ReportQueue {
    fn mods(&self) -> Modifiers {
        self.mods
    }

    fn set_mods(&mut self, mods: Modifiers) {
        self.mods = mods;
    }

    fn tap(&mut self, mods: Modifiers, key: KeyCode) {
        let active = self.mods.with(mods);
        self.push(active.0, key as u8);
        self.push(self.mods.0, 0);
    }

    fn send_text(&mut self, text: &str) {
        for byte in text.bytes() {
            if let Some((mods, key)) = ascii_key(byte) {
                self.tap(mods, key);
            }
        }
    }
}

/// Per-tick scanner state: debounced held keys, the macro dispatcher, the
/// leader matcher and the injected-report queue.
pub struct Scanner {
    held_keys: HeldKeys,
    dispatcher: Dispatcher,
    leader: Leader,
    leader_ticks: u16,
    queue: ReportQueue,
    reset_pending: bool,
}

impl Default for Scanner {
    fn default() -> Self {
        Scanner::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Scanner {
            held_keys: Default::default(),
            dispatcher: Dispatcher::new(),
            leader: Leader::new(),
            leader_ticks: 0,
            queue: Default::default(),
            reset_pending: false,
        }
    }

    /// The momentary layer currently held, from last tick's key state.
    fn active_layer(&self) -> LayerId {
        let mut layer = LayerId::Base;
        for key in self.held_keys.iter_pressed() {
            if let Key::Momentary(id) = key {
                // Fn wins over the symbol layers when both are held.
                if layer == LayerId::Base || *id == LayerId::Fn {
                    layer = *id;
                }
            }
        }
        layer
    }

    /// Runs one scan tick over the given matrix snapshot. Returns the live
    /// report for the debounced held keys; injected output is queued and
    /// drained through [Scanner::next_queued].
    pub fn scan(&mut self, snapshot: &MatrixSnapshot) -> KeyboardReport {
        let layer = self.active_layer();

        self.held_keys.decrement_holds();

        let mut new_presses = [((0u8, 0u8), Key::None); NEW_PRESS_LIMIT];
        let mut new_press_count = 0;
        for (row_idx, row) in snapshot.iter().enumerate() {
            let mut bits = *row;
            while bits != 0 {
                let column_idx = bits.trailing_zeros() as u8;
                bits &= bits - 1;
                let code = logical_position(row_idx as u8, column_idx);
                let mapping = resolve(layer, code.0 as usize, code.1 as usize);
                if self.held_keys.record_pressed(code, mapping)
                    && new_press_count < NEW_PRESS_LIMIT
                {
                    new_presses[new_press_count] = (code, mapping);
                    new_press_count += 1;
                }
            }
        }

        // Dispatch sees the physical modifier state, so shift-pair keys and
        // the modifier guard act on what the user is really holding.
        self.queue.set_mods(Modifiers(self.held_modifier_byte()));

        for &(code, mapping) in &new_presses[..new_press_count] {
            self.on_press(code, mapping);
        }

        if self.leader.is_collecting() {
            if self.leader.scan(&mut self.queue) {
                self.leader_ticks = 0;
            } else {
                self.leader_ticks += 1;
                if self.leader_ticks >= LEADER_TIMEOUT_SCANS {
                    self.leader.abort();
                }
            }
        }

        self.live_report()
    }

    fn on_press(&mut self, code: ScanCode, mapping: Key) {
        match mapping {
            Key::Leader => {
                self.leader.begin();
                self.leader_ticks = 0;
            }
            Key::K(keycode) | Key::Shifted(keycode)
                if self.leader.is_collecting() && modifier_bit(keycode) == 0 =>
            {
                self.leader.collect(keycode);
                self.held_keys.suppress(code);
            }
            Key::Custom(custom) => {
                self.dispatcher.process(
                    &mut self.queue,
                    KeyEvent { key: custom, pressed: true },
                );
            }
            Key::Unicode(name) => {
                unicode::insert(&mut self.queue, self.dispatcher.method(), name.codepoint());
            }
            Key::UnicodeMode(method) => {
                self.dispatcher.set_method(method);
            }
            Key::UnicodeModeCycle => {
                self.dispatcher.cycle_method();
            }
            Key::Reset => {
                self.reset_pending = true;
            }
            Key::K(_) | Key::Shifted(_) | Key::Momentary(_) | Key::None | Key::Transparent => {}
        }
    }

    /// Modifier byte over every held key, including shifted aliases.
    fn held_modifier_byte(&self) -> u8 {
        let mut modifier = 0;
        for key in self.held_keys.iter_pressed() {
            match key {
                Key::K(code) => modifier |= modifier_bit(*code),
                Key::Shifted(_) => modifier |= Modifiers::LSHIFT.0,
                _ => {}
            }
        }
        modifier
    }

    fn live_report(&self) -> KeyboardReport {
        let mut report = KeyboardReport::default();
        let mut report_next_keycode_idx = 0;
        for key in self.held_keys.iter_pressed() {
            match key {
                Key::K(code) => {
                    let bit = modifier_bit(*code);
                    report.modifier |= bit;
                    if bit == 0 && report_next_keycode_idx < 6 {
                        report.keycodes[report_next_keycode_idx] = *code as u8;
                        report_next_keycode_idx += 1;
                    }
                }
                Key::Shifted(code) => {
                    report.modifier |= Modifiers::LSHIFT.0;
                    if report_next_keycode_idx < 6 {
                        report.keycodes[report_next_keycode_idx] = *code as u8;
                        report_next_keycode_idx += 1;
                    }
                }
                _ => {}
            }
        }
        report
    }

    /// Drains one injected report, oldest first.
    pub fn next_queued(&mut self) -> Option<KeyboardReport> {
        self.queue.pop()
    }

    /// True once when the bootloader-reset key has been pressed.
    pub fn take_reset(&mut self) -> bool {
        core::mem::take(&mut self.reset_pending)
    }
}

/// An array for tracking the currently-held keys.
/// Invariant: Always consists of active [KeyHold]s in order of when they
/// were pressed, followed by only inactive [KeyHold]s (those whose
/// [KeyHold::debounce_count] has reached 0).
#[derive(Default)]
struct HeldKeys([KeyHold; HELD_KEYS_LIMIT]);

#[derive(Default)]
struct KeyHold {
    debounce_count: u8,
    in_scancode: ScanCode,
    mapping: Key,
}

impl HeldKeys {
    /// Refreshes the hold for `code`, inserting it with `mapping` if it was
    /// not already held. Returns `true` on a fresh press.
    fn record_pressed(&mut self, code: ScanCode, mapping: Key) -> bool {
        for maybe_key in &mut self.0 {
            if maybe_key.debounce_count > 0 {
                if maybe_key.in_scancode == code {
                    maybe_key.debounce_count = DEFAULT_DEBOUNCE_COUNT;
                    return false;
                }
            } else {
                *maybe_key = KeyHold {
                    in_scancode: code,
                    mapping,
                    debounce_count: DEFAULT_DEBOUNCE_COUNT,
                };
                return true;
            }
        }
        false
    }

    /// Blanks the mapping for `code` while keeping the hold alive, for keys
    /// swallowed by the leader matcher: they stop typing but do not count
    /// as a fresh press while still physically down.
    fn suppress(&mut self, code: ScanCode) {
        for key in &mut self.0 {
            if key.debounce_count == 0 {
                return;
            }
            if key.in_scancode == code {
                key.mapping = Key::None;
                return;
            }
        }
    }

    fn iter_pressed(&self) -> impl Iterator<Item = &Key> {
        self.0
            .iter()
            .take_while(|key_hold| key_hold.debounce_count > 0)
            .map(|key_hold| &key_hold.mapping)
    }

    fn decrement_holds(&mut self) {
        'each_position: for key_idx in 0..HELD_KEYS_LIMIT {
            'each_rotation: loop {
                let key = &mut self.0[key_idx];
                if key.debounce_count > 0 {
                    key.debounce_count -= 1;
                    if key.debounce_count == 0 {
                        self.0[key_idx..].rotate_left(1);
                            // move to end of array to preserve invariant.
                            // now next key has taken its place at current index, so look again:
                        continue 'each_rotation;
                    } else {
                        continue 'each_position;
                    }
                } else {
                    break 'each_position;
                }
            }
        }
    }
}
