//! Defines what each grid position does on each layer: plain HID keys,
//! shifted aliases, custom macro keys, unicode-map cells, momentary layer
//! switches and the leader trigger.
//!
//! Intimately related to [crate::scan], which uses these definitions to
//! interpret physical key presses. Grid order follows the board's logical
//! layout row by row; short rows are padded with [Key::None].

use crate::keycode::KeyCode;
use crate::keycode::KeyCode::*;
use crate::macros::CustomKey;
use crate::macros::CustomKey::*;
use crate::unicode::{Method, Name};

/// The selectable keycode mappings. Base is always active; the others are
/// momentary, held through their [Key::Momentary] cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerId {
    Base,
    Apl,
    Greek,
    Fn,
}

/// What one grid cell does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Key {
    /// Plain HID keycode.
    K(KeyCode),
    /// HID keycode with left shift held while it is pressed.
    Shifted(KeyCode),
    /// Custom macro key, resolved by [crate::macros::Dispatcher].
    Custom(CustomKey),
    /// Code point from the unicode map, inserted via the active method.
    Unicode(Name),
    /// Layer active while this cell is held.
    Momentary(LayerId),
    /// Leader sequence trigger.
    Leader,
    /// Selects a unicode entry method.
    UnicodeMode(Method),
    /// Cycles through the unicode entry methods.
    UnicodeModeCycle,
    /// Reboot to the bootloader.
    Reset,
    /// Dead cell (padding, or a deliberately disabled position).
    #[default]
    None,
    /// Falls through to the base layer.
    Transparent,
}

/// How many rows the logical grid has.
pub const ROWS: usize = 8;
/// Widest row of the logical grid.
pub const COLUMNS: usize = 27;

pub type Row = [Key; COLUMNS];
pub type Layer = [Row; ROWS];

// Brevity defines for the grid literals.
const FT: Key = Key::Transparent;
const XX: Key = Key::None;

const fn k(code: KeyCode) -> Key {
    Key::K(code)
}

const fn s(code: KeyCode) -> Key {
    Key::Shifted(code)
}

const fn c(key: CustomKey) -> Key {
    Key::Custom(key)
}

const fn x(name: Name) -> Key {
    Key::Unicode(name)
}

const fn mo(layer: LayerId) -> Key {
    Key::Momentary(layer)
}

/// Pads a row literal out to the full grid width.
const fn pad<const N: usize>(row: [Key; N]) -> Row {
    assert!(N <= COLUMNS);
    let mut out = [XX; COLUMNS];
    let mut i = 0;
    while i < N {
        out[i] = row[i];
        i += 1;
    }
    out
}

/// Base layer: the Lisp-machine style POS keys across the top, function
/// columns at the sides, typewriter block and keypad.
pub const LAYER_BASE: Layer = [
    pad([
        c(Help), c(Macro), c(Terminal), c(CustomKey::Quote), c(Overstrike), c(ClearInput),
        c(ClearScreen), c(HoldOutput), c(StopInput), c(Abort), c(Break), c(Resume), c(Call),
        k(NumLock),
    ]),
    pad([
        c(Local), c(Network), c(System), c(Refresh), c(Buffer), c(Square), c(Circle),
        c(Triangle), c(Diamond), c(Repeat), c(Transmit), c(Status), c(Suspend), k(CapsLock),
    ]),
    pad([
        k(F1), k(F2), c(Close), c(Open), k(Escape), s(Slash), s(Kc1),
        c(LeftParenLeftBracket), c(RightParenRightBracket), c(HandLeft), c(HandRight),
        c(RomanNumeralI), c(RomanNumeralII), c(RomanNumeralIII), c(RomanNumeralIV),
        s(Minus), s(Comma), s(Dot), x(Name::Pipe), s(LeftBracket), s(RightBracket),
        c(Complete), s(Kc6), s(Kc5), s(Kc3), s(Kc4),
    ]),
    pad([
        k(F3), k(F4), c(Find), c(Write), Key::Leader, c(DoubleQuotePlusMinus), k(Grave),
        k(Kc1), k(Kc2), k(Kc3), k(Kc4), k(Kc5), k(Kc6), k(Kc7), k(Kc8), k(Kc9), k(Kc0),
        k(Minus), k(Equal), k(Backslash), c(LBraceLChevron), c(RBraceRChevron), c(Undo),
        s(Grave), k(Slash), k(KpAsterisk), k(KpMinus),
    ]),
    pad([
        k(F5), k(F6), c(Mark), c(Undo), c(Paste), c(Cut), k(Tab),
        k(Q), k(W), k(E), k(R), k(T), k(Y), k(U), k(I), k(O), k(P),
        k(LeftBracket), k(RightBracket), k(Backspace), k(Clear), k(Home),
        k(Kp7), k(Kp8), k(Kp9), k(KpPlus),
    ]),
    pad([
        k(F7), k(F8), k(KeyCode::Select), c(Debug), mo(LayerId::Fn), XX, mo(LayerId::Apl),
        k(A), k(S), k(D), k(F), k(G), k(H), k(J), k(K), k(L),
        k(Semicolon), k(KeyCode::Quote), k(Enter), c(Line), c(Page),
        k(Kp4), k(Kp5), k(Kp6), s(Kc7),
    ]),
    pad([
        k(F9), k(F10), c(Tty), c(Lock), k(Home), k(End), mo(LayerId::Greek),
        k(LShift), k(Z), k(X), k(C), k(V), k(B), k(N), k(M), k(Comma), k(Dot), k(Slash),
        k(RShift), mo(LayerId::Greek), k(Up), k(End),
        k(Kp1), k(Kp2), k(Kp3), k(Equal),
    ]),
    pad([
        k(F11), k(F12), k(Home), c(Eof), c(HandUp), c(HandDown), c(SevenBit),
        k(RCtrl), k(LAlt), k(LGui), k(LCtrl), k(Space), c(CircleSm), k(Space),
        k(LCtrl), k(Application), k(RCtrl), k(RAlt), k(Left), k(Down), k(Right),
        k(Delete), k(Kp0), k(KpDot), k(Enter),
    ]),
];

/// APL symbol layer (Space Cadet style), over the typewriter block.
pub const LAYER_APL: Layer = [
    pad([FT; 14]),
    pad([FT; 14]),
    pad([FT; 26]),
    pad([FT; 27]),
    pad([
        FT, FT, FT, FT, FT, FT, FT,
        c(AplLogicalAnd), c(AplLogicalOr), c(AplIntersect), c(AplUnion), c(AplSubsetOf),
        c(AplSupersetOf), c(AplForall), c(AplLemniscate), c(AplThereExists),
        c(AplPartialDifferential),
        FT, FT, FT, FT, FT, FT, FT, FT, FT,
    ]),
    pad([
        FT, FT, FT, FT, FT, FT, FT,
        c(AplUpTack), c(AplDownTack), c(AplRightTack), c(AplLeftTack), c(AplUpwardsArrow),
        c(AplDownwardsArrow), c(AplLeftwardsArrow), c(AplRightwardsArrow),
        c(AplLeftRightArrow), FT,
        FT, FT, FT, FT, FT, FT, FT, FT,
    ]),
    pad([
        FT, FT, FT, FT, FT, FT, FT, FT,
        c(AplLeftFloor), c(AplLeftCeiling), c(AplNotEqualTo), c(AplAsymptoticallyEqualTo),
        c(AplNotAsymptoticallyEqualTo), c(AplLessThanOrEqual), c(AplGreaterThanOrEqual),
        FT, FT,
        FT, FT, FT, FT, FT, FT, FT, FT, FT,
    ]),
    pad([FT; 25]),
];

/// Greek and mathematical symbol layer; letters are lower/upper pairs
/// selected by shift.
pub const LAYER_GREEK: Layer = [
    pad([FT; 14]),
    pad([FT; 14]),
    pad([FT; 26]),
    pad([
        FT, FT, FT, FT, FT, c(ContourIntegral), FT,
        c(CopticLcDei), c(DoubleDagger), c(Nabla), c(Cent), c(Degree), c(AplQuad),
        c(Division), c(Multiplication), c(Pilcrow), c(LargeCircle), c(HorizontalBar),
        c(ApproximatelyEqualTo), c(DoubleVerticalLine), c(SquareImageOf),
        c(SquareOriginalOf),
        FT, FT, FT, FT, FT,
    ]),
    pad([
        FT, FT, FT, FT, FT, FT, FT,
        c(GreekTheta), c(GreekOmega), c(GreekEpsilon), c(GreekRho), c(GreekTau),
        c(GreekPsi), c(GreekUpsilon), c(GreekIota), c(GreekOmicron), c(GreekPi),
        c(MathLeftWhiteSquareBracket), c(MathRightWhiteSquareBracket),
        FT, FT, FT, FT, FT, FT, FT,
    ]),
    pad([
        FT, FT, FT, FT, FT, FT, FT,
        c(GreekAlpha), c(GreekSigma), c(GreekDelta), c(GreekPhi), c(GreekGamma),
        c(GreekEta), c(GreekYot), c(GreekKappa), c(GreekLamda),
        c(TwoDotLeader), c(Bullet),
        FT, FT, FT, FT, FT, FT, FT,
    ]),
    pad([
        FT, FT, FT, FT, FT, FT, FT, FT,
        c(GreekZeta), c(GreekXi), c(GreekChi), c(GreekFinalSigma), c(GreekBeta),
        c(GreekNu), c(GreekMu), c(MuchLessThan), c(MuchGreaterThan), c(Integral),
        FT, FT, FT, FT, FT, FT, FT, FT,
    ]),
    pad([FT; 25]),
];

/// Function layer: reset, and the unicode entry method selectors.
pub const LAYER_FN: Layer = [
    pad([FT, FT, FT, FT, FT, FT, FT, FT, FT, FT, FT, FT, FT, Key::Reset]),
    pad([FT; 14]),
    pad([FT; 26]),
    pad([FT; 27]),
    pad([
        FT, FT, FT, FT, FT, FT, FT, FT, Key::UnicodeMode(Method::WinCompose),
        FT, FT, FT, FT, FT, FT, FT, FT, FT, FT, FT, FT, FT, FT, FT, FT, FT,
    ]),
    pad([
        FT, FT, FT, FT, FT, Key::UnicodeModeCycle, FT, FT, FT, FT, FT, FT, FT, FT, FT,
        Key::UnicodeMode(Method::Linux),
        FT, FT, FT, FT, FT, FT, FT, FT, FT,
    ]),
    pad([
        FT, FT, FT, c(Lock), FT, FT, FT, FT, FT, FT, Key::UnicodeMode(Method::WinCompose),
        FT, FT, FT, Key::UnicodeMode(Method::MacOs),
        FT, FT, FT, FT, FT, FT, FT, FT, FT, FT, FT,
    ]),
    pad([FT; 25]),
];

pub const fn layer(id: LayerId) -> &'static Layer {
    match id {
        LayerId::Base => &LAYER_BASE,
        LayerId::Apl => &LAYER_APL,
        LayerId::Greek => &LAYER_GREEK,
        LayerId::Fn => &LAYER_FN,
    }
}

/// Looks up a position on the given layer, resolving transparent cells
/// down to the base layer.
pub const fn resolve(id: LayerId, row: usize, col: usize) -> Key {
    match layer(id)[row][col] {
        Key::Transparent => LAYER_BASE[row][col],
        key => key,
    }
}

/// How many electrical rows the matrix is wired with.
pub const MATRIX_ROWS: usize = 14;
/// How many electrical columns the matrix is wired with.
pub const MATRIX_COLS: usize = 14;

/// Maps an electrical matrix position to its logical grid position: the two
/// short daughter-board rows each occupy one electrical row, every other
/// logical row is split across a pair of them.
pub const fn logical_position(row: u8, col: u8) -> (u8, u8) {
    if row < 2 {
        (row, col)
    } else {
        (2 + (row - 2) / 2, ((row - 2) % 2) * (MATRIX_COLS as u8) + col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daughter_board_rows_hold_the_pos_keys() {
        assert_eq!(LAYER_BASE[0][0], Key::Custom(Help));
        assert_eq!(LAYER_BASE[0][12], Key::Custom(Call));
        assert_eq!(LAYER_BASE[0][13], Key::K(NumLock));
        assert_eq!(LAYER_BASE[1][7], Key::Custom(Triangle));
        assert_eq!(LAYER_BASE[1][13], Key::K(CapsLock));
        // Short rows are padded with dead cells.
        for col in 14..COLUMNS {
            assert_eq!(LAYER_BASE[0][col], Key::None);
            assert_eq!(LAYER_BASE[1][col], Key::None);
        }
    }

    #[test]
    fn base_special_cells_sit_where_the_board_puts_them() {
        assert_eq!(LAYER_BASE[2][18], Key::Unicode(Name::Pipe));
        assert_eq!(LAYER_BASE[3][4], Key::Leader);
        assert_eq!(LAYER_BASE[3][5], Key::Custom(DoubleQuotePlusMinus));
        assert_eq!(LAYER_BASE[5][4], Key::Momentary(LayerId::Fn));
        assert_eq!(LAYER_BASE[5][5], Key::None);
        assert_eq!(LAYER_BASE[5][6], Key::Momentary(LayerId::Apl));
        assert_eq!(LAYER_BASE[6][6], Key::Momentary(LayerId::Greek));
        assert_eq!(LAYER_BASE[6][19], Key::Momentary(LayerId::Greek));
        assert_eq!(LAYER_BASE[2][5], Key::Shifted(Slash));
        assert_eq!(LAYER_BASE[7][12], Key::Custom(CircleSm));
    }

    #[test]
    fn typewriter_block_is_plain_qwerty() {
        let qwerty = [Q, W, E, R, T, Y, U, I, O, P];
        for (i, code) in qwerty.into_iter().enumerate() {
            assert_eq!(LAYER_BASE[4][7 + i], Key::K(code));
        }
        let home = [A, S, D, F, G, H, J, K, L];
        for (i, code) in home.into_iter().enumerate() {
            assert_eq!(LAYER_BASE[5][7 + i], Key::K(code));
        }
    }

    #[test]
    fn apl_symbols_sit_over_the_letter_rows() {
        assert_eq!(LAYER_APL[4][7], Key::Custom(AplLogicalAnd));
        assert_eq!(LAYER_APL[4][16], Key::Custom(AplPartialDifferential));
        assert_eq!(LAYER_APL[5][7], Key::Custom(AplUpTack));
        assert_eq!(LAYER_APL[5][15], Key::Custom(AplLeftRightArrow));
        assert_eq!(LAYER_APL[6][8], Key::Custom(AplLeftFloor));
        assert_eq!(LAYER_APL[6][14], Key::Custom(AplGreaterThanOrEqual));
        assert_eq!(LAYER_APL[4][6], Key::Transparent);
    }

    #[test]
    fn greek_letters_sit_over_the_letter_rows() {
        assert_eq!(LAYER_GREEK[3][5], Key::Custom(ContourIntegral));
        assert_eq!(LAYER_GREEK[3][7], Key::Custom(CopticLcDei));
        assert_eq!(LAYER_GREEK[3][22], Key::Transparent);
        assert_eq!(LAYER_GREEK[4][7], Key::Custom(GreekTheta));
        assert_eq!(LAYER_GREEK[4][17], Key::Custom(MathLeftWhiteSquareBracket));
        assert_eq!(LAYER_GREEK[5][7], Key::Custom(GreekAlpha));
        assert_eq!(LAYER_GREEK[5][17], Key::Custom(Bullet));
        assert_eq!(LAYER_GREEK[6][8], Key::Custom(GreekZeta));
        assert_eq!(LAYER_GREEK[6][17], Key::Custom(Integral));
    }

    #[test]
    fn fn_layer_carries_reset_and_method_selectors() {
        assert_eq!(LAYER_FN[0][13], Key::Reset);
        assert_eq!(LAYER_FN[5][5], Key::UnicodeModeCycle);
        assert_eq!(LAYER_FN[5][15], Key::UnicodeMode(Method::Linux));
        assert_eq!(LAYER_FN[4][8], Key::UnicodeMode(Method::WinCompose));
        assert_eq!(LAYER_FN[6][10], Key::UnicodeMode(Method::WinCompose));
        assert_eq!(LAYER_FN[6][14], Key::UnicodeMode(Method::MacOs));
        assert_eq!(LAYER_FN[6][3], Key::Custom(Lock));
    }

    #[test]
    fn transparent_cells_resolve_to_base() {
        assert_eq!(resolve(LayerId::Apl, 0, 0), Key::Custom(Help));
        assert_eq!(resolve(LayerId::Apl, 4, 7), Key::Custom(AplLogicalAnd));
        assert_eq!(resolve(LayerId::Greek, 4, 8), Key::Custom(GreekOmega));
        assert_eq!(resolve(LayerId::Fn, 7, 11), Key::K(Space));
        assert_eq!(resolve(LayerId::Base, 3, 4), Key::Leader);
    }

    #[test]
    fn electrical_positions_map_onto_the_logical_grid() {
        assert_eq!(logical_position(0, 5), (0, 5));
        assert_eq!(logical_position(1, 13), (1, 13));
        // Row pairs: electrical rows 2 and 3 are both logical row 2.
        assert_eq!(logical_position(2, 0), (2, 0));
        assert_eq!(logical_position(3, 0), (2, 14));
        assert_eq!(logical_position(3, 12), (2, 26));
        assert_eq!(logical_position(12, 4), (7, 4));
        assert_eq!(logical_position(13, 10), (7, 24));
    }
}
