// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! One cell of the emulated screen.

/// A terminal color: the default (inherit-from-theme) color, an indexed palette
/// entry (0-15 standard/bright, 16-255 216-color cube + greyscale ramp), or a direct
/// 24-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

/// SGR attribute bits carried by a [`Glyph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attrs {
    pub bold: bool,
    pub faint: bool,
    pub italic: bool,
    pub underline: bool,
    pub blink: bool,
    pub reverse: bool,
    pub invisible: bool,
    pub strike: bool,
    /// This glyph occupies two display columns; the cell to its right holds the
    /// paired continuation cell.
    pub wide: bool,
    /// This row wrapped from the previous one (autowrap deferred the newline).
    pub wrap: bool,
}

/// One cell of the screen grid: a codepoint plus its rendering attributes.
///
/// A wide glyph (`attrs.wide == true`) is always immediately followed, within the
/// same row, by a `continuation` cell. The continuation cell is never independently
/// addressable as the cursor position — invariant enforced by [`super::Screen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attrs,
    /// True for the filler cell trailing a wide glyph.
    pub continuation: bool,
}

impl Default for Glyph {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::Default,
            bg: Color::Default,
            attrs: Attrs::default(),
            continuation: false,
        }
    }
}

impl Glyph {
    /// The filler cell placed immediately after a wide glyph's leading cell.
    #[must_use]
    pub fn continuation_of(leading: &Glyph) -> Self {
        Self {
            ch: '\0',
            fg: leading.fg,
            bg: leading.bg,
            attrs: leading.attrs,
            continuation: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_glyph_is_space_with_default_colors() {
        let glyph = Glyph::default();
        assert_eq!(glyph.ch, ' ');
        assert_eq!(glyph.fg, Color::Default);
        assert_eq!(glyph.bg, Color::Default);
        assert!(!glyph.continuation);
    }

    #[test]
    fn continuation_cell_inherits_colors_but_not_char() {
        let leading = Glyph {
            ch: '\u{4e2d}',
            fg: Color::Indexed(3),
            bg: Color::Rgb(1, 2, 3),
            attrs: Attrs { wide: true, ..Attrs::default() },
            continuation: false,
        };
        let trailer = Glyph::continuation_of(&leading);
        assert!(trailer.continuation);
        assert_eq!(trailer.fg, leading.fg);
        assert_eq!(trailer.bg, leading.bg);
        assert_ne!(trailer.ch, leading.ch);
    }
}
