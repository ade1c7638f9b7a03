//! Cell style: colors, text attributes, case transform, alignment, margins.

use crate::color::Color;

/// Text attribute flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Attributes(u8);

impl Attributes {
    /// No attributes.
    pub const NONE: Self = Self(0);
    /// Bold / increased intensity.
    pub const BOLD: Self = Self(1);
    /// Dim / faint.
    pub const DIM: Self = Self(2);
    /// Italic.
    pub const ITALIC: Self = Self(4);
    /// Underline.
    pub const UNDERLINE: Self = Self(8);
    /// Blink.
    pub const BLINK: Self = Self(16);
    /// Inverse video.
    pub const INVERSE: Self = Self(32);
    /// Strikethrough.
    pub const STRIKETHROUGH: Self = Self(64);

    /// Check if this set contains all flags of `other`.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0 && other.0 != 0
    }

    /// Combine two attribute sets.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Flags set in `self` but not in `other`.
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Returns true if no flags are set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Attributes {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Case transform applied to text content at paint time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Case {
    /// Uppercase every rune.
    Upper,
    /// Lowercase every rune.
    Lower,
    /// Uppercase the first rune of each word.
    Capitalize,
}

/// Horizontal alignment of text within its node width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Align {
    /// Align to the left edge.
    #[default]
    Left,
    /// Center within the available width.
    Center,
    /// Align to the right edge.
    Right,
}

/// Per-side margins, in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Margin {
    /// Top margin.
    pub top: u16,
    /// Right margin.
    pub right: u16,
    /// Bottom margin.
    pub bottom: u16,
    /// Left margin.
    pub left: u16,
}

/// Style attributes for a cell or node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Style {
    /// Foreground color.
    pub fg: Color,
    /// Text background color.
    pub bg: Color,
    /// Container fill color (painted behind container interiors).
    pub fill: Color,
    /// Text attribute flags.
    pub attrs: Attributes,
    /// Optional case transform.
    pub case: Option<Case>,
    /// Horizontal alignment.
    pub align: Align,
    /// Per-side margins.
    pub margin: Margin,
}

impl Style {
    /// The default style as a const.
    pub const DEFAULT: Style = Style {
        fg: Color::Default,
        bg: Color::Default,
        fill: Color::Default,
        attrs: Attributes::NONE,
        case: None,
        align: Align::Left,
        margin: Margin {
            top: 0,
            right: 0,
            bottom: 0,
            left: 0,
        },
    };

    /// Create an empty style with no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the foreground color.
    #[must_use]
    pub fn fg(mut self, color: Color) -> Self {
        self.fg = color;
        self
    }

    /// Set the text background color.
    #[must_use]
    pub fn bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    /// Set the container fill color.
    #[must_use]
    pub fn fill(mut self, color: Color) -> Self {
        self.fill = color;
        self
    }

    /// Set bold.
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.attrs = self.attrs.union(Attributes::BOLD);
        self
    }

    /// Set dim.
    #[must_use]
    pub fn dim(mut self) -> Self {
        self.attrs = self.attrs.union(Attributes::DIM);
        self
    }

    /// Set italic.
    #[must_use]
    pub fn italic(mut self) -> Self {
        self.attrs = self.attrs.union(Attributes::ITALIC);
        self
    }

    /// Set underline.
    #[must_use]
    pub fn underline(mut self) -> Self {
        self.attrs = self.attrs.union(Attributes::UNDERLINE);
        self
    }

    /// Set blink.
    #[must_use]
    pub fn blink(mut self) -> Self {
        self.attrs = self.attrs.union(Attributes::BLINK);
        self
    }

    /// Set inverse video.
    #[must_use]
    pub fn inverse(mut self) -> Self {
        self.attrs = self.attrs.union(Attributes::INVERSE);
        self
    }

    /// Set strikethrough.
    #[must_use]
    pub fn strikethrough(mut self) -> Self {
        self.attrs = self.attrs.union(Attributes::STRIKETHROUGH);
        self
    }

    /// Set the case transform.
    #[must_use]
    pub fn case(mut self, case: Case) -> Self {
        self.case = Some(case);
        self
    }

    /// Set the horizontal alignment.
    #[must_use]
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Set all four margins at once.
    #[must_use]
    pub fn margin(mut self, top: u16, right: u16, bottom: u16, left: u16) -> Self {
        self.margin = Margin {
            top,
            right,
            bottom,
            left,
        };
        self
    }

    /// Returns true if no attributes are set.
    pub fn is_empty(&self) -> bool {
        *self == Self::DEFAULT
    }

    /// Returns true if the style affects terminal output (colors or attrs).
    ///
    /// Layout-only fields (case, align, margins) do not count.
    pub fn is_plain(&self) -> bool {
        self.fg.is_default() && self.bg.is_default() && self.attrs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_pattern() {
        let s = Style::new().fg(Color::RED).bold().italic();
        assert_eq!(s.fg, Color::RED);
        assert!(s.attrs.contains(Attributes::BOLD));
        assert!(s.attrs.contains(Attributes::ITALIC));
        assert!(!s.attrs.contains(Attributes::UNDERLINE));
    }

    #[test]
    fn default_is_empty() {
        assert!(Style::new().is_empty());
    }

    #[test]
    fn non_empty_style() {
        assert!(!Style::new().bold().is_empty());
    }

    #[test]
    fn structural_equality() {
        let a = Style::new().fg(Color::RED).margin(1, 0, 0, 2);
        let b = Style::new().fg(Color::RED).margin(1, 0, 0, 2);
        assert_eq!(a, b);
        assert_ne!(a, Style::new().fg(Color::RED));
    }

    #[test]
    fn attribute_difference() {
        let on = Attributes::BOLD | Attributes::DIM;
        let next = Attributes::DIM;
        let turned_off = on.difference(next);
        assert!(turned_off.contains(Attributes::BOLD));
        assert!(!turned_off.contains(Attributes::DIM));
    }

    #[test]
    fn plain_ignores_layout_fields() {
        let s = Style::new().align(Align::Center).margin(1, 1, 1, 1);
        assert!(s.is_plain());
        assert!(!s.is_empty());
        assert!(!Style::new().fg(Color::RED).is_plain());
    }

    #[test]
    fn case_transform_is_stored() {
        let s = Style::new().case(Case::Upper);
        assert_eq!(s.case, Some(Case::Upper));
    }
}
