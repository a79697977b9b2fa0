//! Custom keycodes and the dispatch table mapping each one to its fixed
//! output action, chiefly Emacs command sequences and unicode insertions.
//!
//! [crate::scan] feeds press events in here; everything below is a pure
//! keycode -> action lookup plus the branch rules for dual-purpose keys.

use crate::host::{send_steps, Host, ModGuard, Modifiers, Step};
use crate::keycode::KeyCode;
use crate::unicode::{self, Method};
use Step::{Tap, Text};

const NONE: Modifiers = Modifiers::NONE;
const CTRL: Modifiers = Modifiers::LCTRL;
const SHIFT: Modifiers = Modifiers::LSHIFT;
const ALT: Modifiers = Modifiers::LALT;
// Combined chords as named consts: the table's slice literals must be
// promotable to 'static, which rules out const-fn calls inline.
const CTRL_SHIFT: Modifiers = CTRL.with(SHIFT);
const CTRL_ALT: Modifiers = CTRL.with(ALT);
const ALT_SHIFT: Modifiers = ALT.with(SHIFT);

/// Application-defined key identities beyond the standard HID set, resolved
/// entirely by [Dispatcher::process].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CustomKey {
    // daughter board row 1
    Help,
    Macro,
    Terminal,
    Quote,
    Overstrike,
    ClearInput,
    ClearScreen,
    HoldOutput,
    StopInput,
    Abort,
    Break,
    Resume,
    Call,

    // daughter board row 2
    Local,
    Network,
    System,
    Refresh,
    Buffer,
    Square,
    Circle,
    Triangle,
    Diamond,
    Repeat,
    Transmit,
    Status,
    Suspend,

    // daughter board row 3
    Close,
    Open,
    Complete,

    // main board row 1
    Find,
    Write,
    DoubleQuotePlusMinus,
    LBraceLChevron,
    RBraceRChevron,

    // main board row 2
    Mark,
    Undo,
    LeftParenLeftBracket,
    RightParenRightBracket,

    // main board row 3
    Select,
    Debug,
    SemiColonBackTick,
    Line,
    Page,

    // main board row 4
    Tty,
    Lock,

    // main board row 5
    Eof,
    SevenBit,
    CircleSm,

    // hand / numeral / edit cluster
    HandRight,
    HandLeft,
    HandUp,
    HandDown,
    RomanNumeralI,
    RomanNumeralII,
    RomanNumeralIII,
    RomanNumeralIV,
    Paste,
    Cut,

    // APL layer
    AplLogicalAnd,
    AplLogicalOr,
    AplIntersect,
    AplUnion,
    AplSubsetOf,
    AplSupersetOf,
    AplForall,
    AplLemniscate,
    AplThereExists,
    AplPartialDifferential,
    AplUpTack,
    AplDownTack,
    AplRightTack,
    AplLeftTack,
    AplUpwardsArrow,
    AplDownwardsArrow,
    AplLeftwardsArrow,
    AplRightwardsArrow,
    AplLeftRightArrow,
    AplLeftFloor,
    AplLeftCeiling,
    AplNotEqualTo,
    AplAsymptoticallyEqualTo,
    AplNotAsymptoticallyEqualTo,
    AplLessThanOrEqual,
    AplGreaterThanOrEqual,

    // symbol layer row 0
    ContourIntegral,
    CopticLcDei,
    DoubleDagger,
    Nabla,
    Cent,
    Degree,
    AplQuad,
    Division,
    Multiplication,
    Pilcrow,
    LargeCircle,
    HorizontalBar,
    ApproximatelyEqualTo,
    DoubleVerticalLine,
    SquareImageOf,
    SquareOriginalOf,

    // symbol layer rows 1-3 (Greek, mostly shift-paired lower/upper)
    GreekTheta,
    GreekOmega,
    GreekEpsilon,
    GreekRho,
    GreekTau,
    GreekPsi,
    GreekUpsilon,
    GreekIota,
    GreekOmicron,
    GreekPi,
    MathLeftWhiteSquareBracket,
    MathRightWhiteSquareBracket,
    GreekAlpha,
    GreekSigma,
    GreekDelta,
    GreekPhi,
    GreekGamma,
    GreekEta,
    GreekYot,
    GreekKappa,
    GreekLamda,
    TwoDotLeader,
    Bullet,
    GreekZeta,
    GreekXi,
    GreekChi,
    GreekFinalSigma,
    GreekBeta,
    GreekNu,
    GreekMu,
    MuchLessThan,
    MuchGreaterThan,
    Integral,
}

/// One key-press event as delivered by the scanning layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: CustomKey,
    pub pressed: bool,
}

/// The fixed output a custom key produces, as data.
#[derive(Clone, Copy, Debug)]
pub enum Action {
    /// Fixed step sequence.
    Seq(&'static [Step]),
    /// Fixed literal string.
    Text(&'static str),
    /// Dual-purpose key: plain sequence unshifted, alternate sequence when
    /// either shift is held. The shifted branch runs under the modifier
    /// guard so the held shift cannot corrupt it.
    ShiftPair {
        plain: &'static [Step],
        shifted: &'static [Step],
    },
    /// Like [Action::ShiftPair] with an additional ctrl branch that takes
    /// priority over shift when both are held. Both modified branches are
    /// guarded.
    CtrlPair {
        ctrl: &'static [Step],
        shifted: &'static [Step],
        plain: &'static [Step],
    },
    /// Insert one code point through the active unicode entry method.
    Unicode(u32),
    /// Lower/upper code-point pair selected by the shift snapshot.
    UnicodePair { plain: u32, shifted: u32 },
    /// Deliberate no-op that still claims the key, suppressing its default
    /// behaviour.
    Nothing,
}

/// The flat dispatch table. Sequences reproduce the Emacs/editor command
/// bindings of the original board byte for byte.
pub const fn action(key: CustomKey) -> Action {
    use CustomKey::*;
    use KeyCode::*;
    match key {
        // daughter board row 1
        Help => Action::Seq(&[Tap(NONE, F1)]),
        Macro => Action::Text("[MACRO] key"),
        Terminal => Action::Seq(&[Tap(ALT, X), Text("vterm"), Tap(NONE, Enter)]),
        // wraps selected (editable) text in quotation marks
        CustomKey::Quote => Action::Seq(&[
            Tap(CTRL, X),
            Tap(NONE, KeyCode::Quote),
            Tap(CTRL, V),
            Tap(NONE, KeyCode::Quote),
        ]),
        Overstrike => Action::Seq(&[Tap(NONE, Insert)]),
        // terminal: clears from the cursor to the start of the command
        ClearInput => Action::Seq(&[Tap(CTRL, U)]),
        ClearScreen => Action::Seq(&[Tap(CTRL, L)]),
        HoldOutput => Action::Seq(&[Tap(NONE, ScrollLock)]),
        StopInput => Action::Seq(&[Tap(CTRL, G)]),
        Abort => Action::Seq(&[Tap(CTRL, G)]),
        Break => Action::Seq(&[Tap(NONE, Pause)]),
        Resume => Action::Seq(&[Tap(NONE, Pause)]),
        // M-x
        Call => Action::Seq(&[Tap(ALT, X)]),

        // daughter board row 2
        // M-: eval-expression
        Local => Action::Seq(&[Tap(ALT_SHIFT, Semicolon)]),
        Network => Action::Text("[NETWORK] key"),
        // M-! shell-command
        System => Action::Seq(&[Tap(ALT_SHIFT, Kc1)]),
        Refresh => Action::Seq(&[Tap(CTRL, R)]),
        // C-x C-b buffer list
        Buffer => Action::Seq(&[Tap(CTRL, X), Tap(CTRL, KeyCode::B)]),
        Square => Action::Text("SQUARE."),
        Circle => Action::Seq(&[Tap(ALT, X)]),
        // jump to mark: local mark ring plain, global mark ring shifted
        Triangle => Action::ShiftPair {
            plain: &[Tap(CTRL, U), Tap(CTRL, Space)],
            shifted: &[Tap(CTRL, U), Tap(CTRL_SHIFT, Kc2)],
        },
        Diamond => Action::Text("[DIAMOND] key"),
        // C-x z repeat
        Repeat => Action::Seq(&[Tap(CTRL, X), Tap(NONE, Z)]),
        Transmit => Action::Text("[TRANSMIT] key"),
        Status => Action::Text("[STATUS] key"),
        Suspend => Action::Seq(&[Tap(CTRL, Z)]),

        // daughter board row 3
        // C-x k kill buffer
        Close => Action::Seq(&[Tap(CTRL, X), Tap(NONE, K)]),
        // find-file plain, recent files shifted, project open with ctrl
        Open => Action::CtrlPair {
            ctrl: &[Tap(NONE, F5)],
            shifted: &[Tap(CTRL, X), Tap(CTRL, R)],
            plain: &[Tap(CTRL, X), Tap(CTRL, KeyCode::F)],
        },
        Complete => Action::Text("[COMPLETE] key"),

        // main board row 1
        // isearch forward plain, backward shifted
        Find => Action::ShiftPair {
            plain: &[Tap(CTRL, S)],
            shifted: &[Tap(CTRL, R)],
        },
        // C-x C-s save
        Write => Action::Seq(&[Tap(CTRL, X), Tap(CTRL, S)]),
        DoubleQuotePlusMinus => Action::ShiftPair {
            plain: &[Text("\"")],
            shifted: &[Tap(CTRL, X), Tap(NONE, Kc8), Tap(NONE, KpPlus)],
        },
        LBraceLChevron => Action::ShiftPair {
            plain: &[Text("{")],
            shifted: &[Text("<")],
        },
        RBraceRChevron => Action::ShiftPair {
            plain: &[Text("}")],
            shifted: &[Text(">")],
        },

        // main board row 2
        Mark => Action::Seq(&[Tap(CTRL, Space)]),
        Undo => Action::ShiftPair {
            plain: &[Tap(CTRL_SHIFT, Minus)],
            shifted: &[Tap(ALT_SHIFT, Minus)],
        },
        LeftParenLeftBracket => Action::ShiftPair {
            plain: &[Text("(")],
            shifted: &[Tap(NONE, LeftBracket)],
        },
        RightParenRightBracket => Action::ShiftPair {
            plain: &[Text(")")],
            shifted: &[Tap(NONE, RightBracket)],
        },

        // main board row 3
        CustomKey::Select => Action::Text("[SELECT] key"),
        Debug => Action::Text("[DEBUG] key"),
        SemiColonBackTick => Action::ShiftPair {
            plain: &[Text(";")],
            shifted: &[Text("`")],
        },
        // suppresses the key entirely rather than passing it through
        Line => Action::Nothing,
        Page => Action::ShiftPair {
            plain: &[Tap(NONE, PageDown)],
            shifted: &[Tap(NONE, PageUp)],
        },

        // main board row 4
        Tty => Action::Text("[TTY] key"),
        Lock => Action::Text("[LOCK] key"),

        // main board row 5
        Eof => Action::Seq(&[Tap(CTRL, End)]),
        SevenBit => Action::Seq(&[Tap(CTRL, Enter)]),
        CircleSm => Action::Seq(&[Tap(ALT, X)]),

        HandLeft => Action::Seq(&[Tap(CTRL_ALT, KeyCode::F)]),
        HandRight => Action::Seq(&[Tap(CTRL_ALT, KeyCode::B)]),
        HandUp => Action::Seq(&[Tap(CTRL_ALT, U)]),
        HandDown => Action::Seq(&[Tap(CTRL_ALT, KeyCode::D)]),
        RomanNumeralI => Action::Text("I"),
        RomanNumeralII => Action::Text("2"),
        RomanNumeralIII => Action::Text("III"),
        RomanNumeralIV => Action::Text("IV"),
        // emacs yank / kill
        Paste => Action::Seq(&[Tap(CTRL, Y)]),
        Cut => Action::ShiftPair {
            plain: &[Tap(CTRL, W)],
            shifted: &[Tap(ALT, W)],
        },

        // APL layer
        AplLogicalAnd => Action::Unicode(0x22C0),
        AplLogicalOr => Action::Unicode(0x22C1),
        AplIntersect => Action::Unicode(0x22C2),
        AplUnion => Action::Unicode(0x22C3),
        AplSubsetOf => Action::Unicode(0x2282),
        AplSupersetOf => Action::Unicode(0x2283),
        AplForall => Action::Unicode(0x2200),
        AplLemniscate => Action::Unicode(0x221E),
        AplThereExists => Action::Unicode(0x2203),
        AplPartialDifferential => Action::Unicode(0x2202),
        AplUpTack => Action::Unicode(0x22A5),
        AplDownTack => Action::Unicode(0x22A4),
        AplRightTack => Action::Unicode(0x22A2),
        AplLeftTack => Action::Unicode(0x22A3),
        AplUpwardsArrow => Action::Unicode(0x2191),
        AplDownwardsArrow => Action::Unicode(0x2193),
        AplLeftwardsArrow => Action::Unicode(0x2190),
        AplRightwardsArrow => Action::Unicode(0x2192),
        AplLeftRightArrow => Action::Unicode(0x2194),
        AplLeftFloor => Action::Unicode(0x230A),
        AplLeftCeiling => Action::Unicode(0x2308),
        AplNotEqualTo => Action::Unicode(0x2260),
        AplAsymptoticallyEqualTo => Action::Unicode(0x2243),
        AplNotAsymptoticallyEqualTo => Action::Unicode(0x2261),
        AplLessThanOrEqual => Action::Unicode(0x2264),
        AplGreaterThanOrEqual => Action::Unicode(0x2265),

        // symbol layer row 0
        ContourIntegral => Action::Unicode(0x222E),
        CopticLcDei => Action::Unicode(0x03EF),
        DoubleDagger => Action::Unicode(0x2021),
        Nabla => Action::Unicode(0x2207),
        Cent => Action::Unicode(0x00A2),
        Degree => Action::Unicode(0x00B0),
        AplQuad => Action::Unicode(0x2395),
        Division => Action::Unicode(0x00F7),
        Multiplication => Action::Unicode(0x00D7),
        Pilcrow => Action::Unicode(0x00B6),
        LargeCircle => Action::Unicode(0x25EF),
        HorizontalBar => Action::Unicode(0x2015),
        ApproximatelyEqualTo => Action::Unicode(0x2248),
        DoubleVerticalLine => Action::Unicode(0x2016),
        SquareImageOf => Action::Unicode(0x228F),
        SquareOriginalOf => Action::Unicode(0x2290),

        // symbol layer row 1
        GreekTheta => Action::UnicodePair { plain: 0x03B8, shifted: 0x0398 },
        GreekOmega => Action::UnicodePair { plain: 0x03C9, shifted: 0x03A9 },
        GreekEpsilon => Action::UnicodePair { plain: 0x03B5, shifted: 0x0395 },
        GreekRho => Action::UnicodePair { plain: 0x03C1, shifted: 0x03A1 },
        GreekTau => Action::UnicodePair { plain: 0x03C4, shifted: 0x03A4 },
        GreekPsi => Action::UnicodePair { plain: 0x03C8, shifted: 0x03A8 },
        GreekUpsilon => Action::UnicodePair { plain: 0x03C5, shifted: 0x03A5 },
        GreekIota => Action::UnicodePair { plain: 0x03B9, shifted: 0x0399 },
        GreekOmicron => Action::UnicodePair { plain: 0x03BF, shifted: 0x039F },
        GreekPi => Action::UnicodePair { plain: 0x03C0, shifted: 0x03A0 },
        MathLeftWhiteSquareBracket => Action::Unicode(0x27E6),
        MathRightWhiteSquareBracket => Action::Unicode(0x27E7),

        // symbol layer row 2
        GreekAlpha => Action::UnicodePair { plain: 0x03B1, shifted: 0x0391 },
        GreekSigma => Action::UnicodePair { plain: 0x03C3, shifted: 0x03A3 },
        GreekDelta => Action::UnicodePair { plain: 0x03B4, shifted: 0x0394 },
        GreekPhi => Action::UnicodePair { plain: 0x03C6, shifted: 0x03A6 },
        GreekGamma => Action::UnicodePair { plain: 0x03B3, shifted: 0x0393 },
        GreekEta => Action::UnicodePair { plain: 0x03B7, shifted: 0x0397 },
        GreekYot => Action::UnicodePair { plain: 0x03F3, shifted: 0x037F },
        GreekKappa => Action::UnicodePair { plain: 0x03BA, shifted: 0x039A },
        GreekLamda => Action::UnicodePair { plain: 0x03BB, shifted: 0x039B },
        TwoDotLeader => Action::Unicode(0x2025),
        Bullet => Action::Unicode(0x2022),

        // symbol layer row 3
        GreekZeta => Action::UnicodePair { plain: 0x03B6, shifted: 0x0396 },
        GreekXi => Action::UnicodePair { plain: 0x03BE, shifted: 0x039E },
        GreekChi => Action::UnicodePair { plain: 0x03C7, shifted: 0x03A7 },
        GreekFinalSigma => Action::Unicode(0x03C2),
        GreekBeta => Action::UnicodePair { plain: 0x03B2, shifted: 0x0392 },
        GreekNu => Action::UnicodePair { plain: 0x03BD, shifted: 0x039D },
        GreekMu => Action::UnicodePair { plain: 0x03BC, shifted: 0x039C },
        MuchLessThan => Action::Unicode(0x226A),
        MuchGreaterThan => Action::Unicode(0x226B),
        Integral => Action::Unicode(0x222B),
    }
}

/// Resolves custom key events to emitted output. Holds the one piece of
/// dispatch state there is: the active unicode entry [Method].
#[derive(Default)]
pub struct Dispatcher {
    method: Method,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher::default()
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    pub fn cycle_method(&mut self) {
        self.method = self.method.cycle();
    }

    /// Resolves one event. Returns `true` when default key processing
    /// should continue (release events), `false` when the key was claimed
    /// and its action fully replaces default behaviour.
    pub fn process(&mut self, host: &mut impl Host, event: KeyEvent) -> bool {
        if !event.pressed {
            return true;
        }
        self.run(host, action(event.key));
        false
    }

    fn run(&mut self, host: &mut impl Host, action: Action) {
        match action {
            Action::Seq(steps) => send_steps(host, steps),
            Action::Text(text) => host.send_text(text),
            Action::ShiftPair { plain, shifted } => {
                // One shift snapshot, taken before anything mutates mods.
                if host.mods().intersects(Modifiers::SHIFT_MASK) {
                    let mut guard = ModGuard::clear(host);
                    send_steps(&mut *guard, shifted);
                } else {
                    send_steps(host, plain);
                }
            }
            Action::CtrlPair { ctrl, shifted, plain } => {
                let mods = host.mods();
                if mods.intersects(Modifiers::CTRL_MASK) {
                    let mut guard = ModGuard::clear(host);
                    send_steps(&mut *guard, ctrl);
                } else if mods.intersects(Modifiers::SHIFT_MASK) {
                    let mut guard = ModGuard::clear(host);
                    send_steps(&mut *guard, shifted);
                } else {
                    send_steps(host, plain);
                }
            }
            Action::Unicode(codepoint) => unicode::insert(host, self.method, codepoint),
            Action::UnicodePair { plain, shifted } => {
                unicode::insert_pair(host, self.method, plain, shifted)
            }
            Action::Nothing => {}
        }
    }
}

/// USB LED state callback. The board has no lock-state LEDs; the contract
/// is to accept the report and do nothing.
pub fn led_state_changed(_usb_led: u8) {}
