//! Border character sets and box-drawing rune merging.
//!
//! Each light box-drawing rune encodes a 4-bit edge mask (up, right,
//! down, left). Writing one box rune over another stores the rune whose
//! mask is the union of the two, so adjacent bordered containers form
//! proper junctions without the caller placing them by hand.

/// A border character set: four corners plus the horizontal and
/// vertical edge runes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Border {
    /// Top-left corner.
    pub top_left: char,
    /// Top-right corner.
    pub top_right: char,
    /// Bottom-left corner.
    pub bottom_left: char,
    /// Bottom-right corner.
    pub bottom_right: char,
    /// Horizontal edge.
    pub horizontal: char,
    /// Vertical edge.
    pub vertical: char,
}

impl Border {
    /// Light single-line border. Participates in junction merging.
    pub const SINGLE: Border = Border {
        top_left: '\u{250c}',
        top_right: '\u{2510}',
        bottom_left: '\u{2514}',
        bottom_right: '\u{2518}',
        horizontal: '\u{2500}',
        vertical: '\u{2502}',
    };

    /// Double-line border.
    pub const DOUBLE: Border = Border {
        top_left: '\u{2554}',
        top_right: '\u{2557}',
        bottom_left: '\u{255a}',
        bottom_right: '\u{255d}',
        horizontal: '\u{2550}',
        vertical: '\u{2551}',
    };

    /// Rounded-corner border.
    pub const ROUNDED: Border = Border {
        top_left: '\u{256d}',
        top_right: '\u{256e}',
        bottom_left: '\u{2570}',
        bottom_right: '\u{256f}',
        horizontal: '\u{2500}',
        vertical: '\u{2502}',
    };

    /// Heavy-line border.
    pub const HEAVY: Border = Border {
        top_left: '\u{250f}',
        top_right: '\u{2513}',
        bottom_left: '\u{2517}',
        bottom_right: '\u{251b}',
        horizontal: '\u{2501}',
        vertical: '\u{2503}',
    };
}

const UP: u8 = 1;
const RIGHT: u8 = 2;
const DOWN: u8 = 4;
const LEFT: u8 = 8;

/// Edge mask for a light box-drawing rune, or `None` for any other rune.
pub(crate) fn rune_mask(ch: char) -> Option<u8> {
    match ch {
        '\u{2500}' => Some(LEFT | RIGHT),        // ─
        '\u{2502}' => Some(UP | DOWN),           // │
        '\u{250c}' => Some(DOWN | RIGHT),        // ┌
        '\u{2510}' => Some(DOWN | LEFT),         // ┐
        '\u{2514}' => Some(UP | RIGHT),          // └
        '\u{2518}' => Some(UP | LEFT),           // ┘
        '\u{251c}' => Some(UP | DOWN | RIGHT),   // ├
        '\u{2524}' => Some(UP | DOWN | LEFT),    // ┤
        '\u{252c}' => Some(DOWN | LEFT | RIGHT), // ┬
        '\u{2534}' => Some(UP | LEFT | RIGHT),   // ┴
        '\u{253c}' => Some(UP | DOWN | LEFT | RIGHT), // ┼
        '\u{2574}' => Some(LEFT),                // ╴
        '\u{2575}' => Some(UP),                  // ╵
        '\u{2576}' => Some(RIGHT),               // ╶
        '\u{2577}' => Some(DOWN),                // ╷
        _ => None,
    }
}

/// Rune for an edge mask. Index 0 maps to a space (no edges).
const MASK_RUNES: [char; 16] = [
    ' ',        // 0000
    '\u{2575}', // up
    '\u{2576}', // right
    '\u{2514}', // up|right
    '\u{2577}', // down
    '\u{2502}', // up|down
    '\u{250c}', // down|right
    '\u{251c}', // up|down|right
    '\u{2574}', // left
    '\u{2518}', // up|left
    '\u{2500}', // left|right
    '\u{2534}', // up|left|right
    '\u{2510}', // down|left
    '\u{2524}', // up|down|left
    '\u{252c}', // down|left|right
    '\u{253c}', // all
];

/// Merge two runes: if both are light box-drawing runes, return the rune
/// whose edge mask is the union of theirs; otherwise the new rune wins.
pub fn merge_runes(existing: char, new: char) -> char {
    match (rune_mask(existing), rune_mask(new)) {
        (Some(a), Some(b)) => MASK_RUNES[usize::from(a | b)],
        _ => new,
    }
}
