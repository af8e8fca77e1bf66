// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`vte::Perform`] implementation that drives a [`Screen`] from parsed VT bytes.
//!
//! This is a thin shim in the same spirit as the teacher's own
//! `AnsiToOfsBufPerformer`: parameter decoding lives here, buffer mutation lives in
//! [`super::ops`]'s `Screen` methods. The parser never errors on malformed input —
//! unrecognized or partially-formed sequences are simply dropped, and the next
//! recognisable command resynchronises state.

use unicode_width::UnicodeWidthChar;
use vte::{Params, Perform};

use super::{dirty::DirtyTracker,
            glyph::{Attrs, Color, Glyph},
            scrollback::Scrollback,
            screen::{CursorStyle, SavedCursor, Screen}};

fn param(params: &Params, idx: usize, default: u16) -> u16 {
    params.iter().nth(idx).and_then(|sub| sub.first().copied()).filter(|v| *v != 0).unwrap_or(default)
}

fn param_allow_zero(params: &Params, idx: usize, default: u16) -> u16 {
    params.iter().nth(idx).and_then(|sub| sub.first().copied()).unwrap_or(default)
}

/// Drives one [`Screen`] from a byte stream. Owns the "pending SGR" style applied
/// to the next printed glyph — attribute state that outlives any single escape
/// sequence but isn't part of the screen grid itself.
pub(super) struct Performer<'a> {
    pub screen: &'a mut Screen,
    pub scrollback: &'a mut Scrollback,
    pub dirty: &'a mut DirtyTracker,
    pub pending_fg: Color,
    pub pending_bg: Color,
    pub pending_attrs: Attrs,
}

impl Performer<'_> {
    fn current_glyph(&self, ch: char) -> Glyph {
        Glyph { ch, fg: self.pending_fg, bg: self.pending_bg, attrs: self.pending_attrs, continuation: false }
    }

    fn sgr(&mut self, params: &Params) {
        // Collected so the 38/48 extended-color branches can look ahead by index.
        let subparams: Vec<&[u16]> = params.iter().collect();
        let mut i = 0;
        if subparams.is_empty() {
            self.pending_attrs = Attrs::default();
            self.pending_fg = Color::Default;
            self.pending_bg = Color::Default;
            return;
        }
        while i < subparams.len() {
            let code = subparams[i].first().copied().unwrap_or(0);
            match code {
                0 => {
                    self.pending_attrs = Attrs::default();
                    self.pending_fg = Color::Default;
                    self.pending_bg = Color::Default;
                }
                1 => self.pending_attrs.bold = true,
                2 => self.pending_attrs.faint = true,
                3 => self.pending_attrs.italic = true,
                4 => self.pending_attrs.underline = true,
                5 | 6 => self.pending_attrs.blink = true,
                7 => self.pending_attrs.reverse = true,
                8 => self.pending_attrs.invisible = true,
                9 => self.pending_attrs.strike = true,
                21 => self.pending_attrs.bold = false,
                22 => {
                    self.pending_attrs.bold = false;
                    self.pending_attrs.faint = false;
                }
                23 => self.pending_attrs.italic = false,
                24 => self.pending_attrs.underline = false,
                25 => self.pending_attrs.blink = false,
                27 => self.pending_attrs.reverse = false,
                28 => self.pending_attrs.invisible = false,
                29 => self.pending_attrs.strike = false,
                30..=37 => self.pending_fg = Color::Indexed((code - 30) as u8),
                38 => {
                    if let Some((color, consumed)) = parse_extended_color(&subparams[i + 1..]) {
                        self.pending_fg = color;
                        i += consumed;
                    }
                }
                39 => self.pending_fg = Color::Default,
                40..=47 => self.pending_bg = Color::Indexed((code - 40) as u8),
                48 => {
                    if let Some((color, consumed)) = parse_extended_color(&subparams[i + 1..]) {
                        self.pending_bg = color;
                        i += consumed;
                    }
                }
                49 => self.pending_bg = Color::Default,
                90..=97 => self.pending_fg = Color::Indexed((code - 90 + 8) as u8),
                100..=107 => self.pending_bg = Color::Indexed((code - 100 + 8) as u8),
                _ => {}
            }
            i += 1;
        }
    }

    fn decset_decrst(&mut self, params: &Params, set: bool) {
        for sub in params.iter() {
            let Some(&code) = sub.first() else { continue };
            match code {
                6 => {
                    self.screen.modes.origin = set;
                    self.screen.cursor.row = self.screen.origin_top();
                    self.screen.cursor.col = 0;
                }
                7 => self.screen.modes.autowrap = set,
                25 => {
                    self.screen.cursor.visible = set;
                    self.dirty.mark_cursor_visibility();
                }
                47 | 1047 => {
                    if set { self.screen.enter_alt_screen() } else { self.screen.leave_alt_screen() }
                    self.dirty.mark_mode();
                }
                1049 => {
                    if set {
                        self.screen.saved_cursor = Some(SavedCursor {
                            row: self.screen.cursor.row,
                            col: self.screen.cursor.col,
                            origin: self.screen.modes.origin,
                        });
                        self.screen.enter_alt_screen();
                    } else {
                        self.screen.leave_alt_screen();
                        if let Some(saved) = self.screen.saved_cursor.take() {
                            self.screen.cursor.row = saved.row;
                            self.screen.cursor.col = saved.col;
                            self.screen.modes.origin = saved.origin;
                        }
                    }
                    self.dirty.mark_mode();
                }
                2004 => self.screen.modes.bracketed_paste = set,
                _ => {}
            }
        }
    }

    fn sm_rm(&mut self, params: &Params, set: bool) {
        for sub in params.iter() {
            let Some(&code) = sub.first() else { continue };
            match code {
                4 => self.screen.modes.insert = set,
                20 => self.screen.modes.crlf_on_lf = set,
                _ => {}
            }
        }
    }
}

/// Parses an SGR `38;2;r;g;b` / `38;5;n` (or `48;...`) tail. Returns the color and
/// how many subparameters after the introducer (`2`/`5`) were consumed.
fn parse_extended_color(rest: &[&[u16]]) -> Option<(Color, usize)> {
    let mode = *rest.first()?.first()?;
    match mode {
        5 => {
            let n = *rest.get(1)?.first()?;
            Some((Color::Indexed(n as u8), 2))
        }
        2 => {
            let r = *rest.get(1)?.first()?;
            let g = *rest.get(2)?.first()?;
            let b = *rest.get(3)?.first()?;
            Some((Color::Rgb(r as u8, g as u8, b as u8), 4))
        }
        _ => None,
    }
}

impl Perform for Performer<'_> {
    fn print(&mut self, c: char) {
        let width = c.width().unwrap_or(1);
        let wide = width >= 2;
        let glyph = self.current_glyph(c);
        self.screen.put_glyph(glyph, wide, self.scrollback, self.dirty);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' => {
                self.screen.newline_with_scroll(self.scrollback, self.dirty);
                if self.screen.modes.crlf_on_lf {
                    self.screen.cursor.col = 0;
                }
                self.screen.modes.wrap_pending = false;
            }
            b'\r' => {
                self.screen.cursor.col = 0;
                self.screen.modes.wrap_pending = false;
            }
            0x08 => self.screen.cursor_back(1),
            b'\t' => {
                let next_stop = (self.screen.cursor.col / 8 + 1) * 8;
                self.screen.cursor.col = next_stop.min(self.screen.cols - 1);
            }
            0x07 => self.dirty.mark_bell(),
            _ => {}
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {
        // DCS entry: device-control strings aren't part of the emulated subset;
        // swallow them so the parser resynchronises at the next ST.
    }

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
        let Some(&kind) = params.first() else { return };
        match kind {
            b"0" | b"1" | b"2" => {
                if let Some(title) = params.get(1) {
                    self.screen.title = String::from_utf8_lossy(title).into_owned();
                    self.dirty.mark_title();
                }
            }
            _ => {}
        }
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], _ignore: bool, action: char) {
        let private = intermediates.first() == Some(&b'?');
        match action {
            'A' => self.screen.cursor_up(param(params, 0, 1) as usize),
            'B' => self.screen.cursor_down(param(params, 0, 1) as usize),
            'C' => self.screen.cursor_forward(param(params, 0, 1) as usize),
            'D' => self.screen.cursor_back(param(params, 0, 1) as usize),
            'E' => self.screen.cursor_next_line(param(params, 0, 1) as usize),
            'F' => self.screen.cursor_prev_line(param(params, 0, 1) as usize),
            'G' => self.screen.cursor_to_col(i64::from(param(params, 0, 1))),
            'd' => self.screen.cursor_to_row(i64::from(param(params, 0, 1))),
            'H' | 'f' => {
                self.screen.cursor_to(i64::from(param(params, 0, 1)), i64::from(param(params, 1, 1)));
            }
            'J' => self.screen.erase_display(param_allow_zero(params, 0, 0), self.scrollback, self.dirty),
            'K' => self.screen.erase_line(param_allow_zero(params, 0, 0), self.dirty),
            'X' => self.screen.erase_chars(param(params, 0, 1) as usize, self.dirty),
            '@' => self.screen.insert_chars(param(params, 0, 1) as usize, self.dirty),
            'L' => self.screen.insert_lines(param(params, 0, 1) as usize, self.dirty),
            'M' => self.screen.delete_lines(param(params, 0, 1) as usize, self.dirty),
            'P' => self.screen.delete_chars(param(params, 0, 1) as usize, self.dirty),
            'S' => self.screen.scroll_up(param(params, 0, 1) as usize, self.scrollback, self.dirty),
            'T' => self.screen.scroll_down(param(params, 0, 1) as usize, self.dirty),
            'r' => {
                let top = params.iter().next().and_then(|s| s.first().copied());
                let bottom = params.iter().nth(1).and_then(|s| s.first().copied());
                self.screen.set_scroll_region(top, bottom);
            }
            'm' => self.sgr(params),
            'h' if private => self.decset_decrst(params, true),
            'l' if private => self.decset_decrst(params, false),
            'h' => self.sm_rm(params, true),
            'l' => self.sm_rm(params, false),
            _ => {}
        }
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, byte: u8) {
        match byte {
            b'7' => {
                self.screen.saved_cursor = Some(SavedCursor {
                    row: self.screen.cursor.row,
                    col: self.screen.cursor.col,
                    origin: self.screen.modes.origin,
                });
            }
            b'8' => {
                if let Some(saved) = self.screen.saved_cursor {
                    self.screen.cursor.row = saved.row;
                    self.screen.cursor.col = saved.col;
                    self.screen.modes.origin = saved.origin;
                }
            }
            b'c' => {
                // RIS: full reset, same shape as a freshly constructed screen.
                let (cols, rows) = (self.screen.cols, self.screen.rows);
                *self.screen = Screen::new(cols, rows);
                self.scrollback.clear();
                self.dirty.mark_mode();
            }
            b'D' => self.screen.newline_with_scroll(self.scrollback, self.dirty),
            b'M' => {
                if self.screen.cursor.row == self.screen.scroll_region.top {
                    self.screen.scroll_down(1, self.dirty);
                } else {
                    self.screen.cursor_up(1);
                }
            }
            b'E' => {
                self.screen.newline_with_scroll(self.scrollback, self.dirty);
                self.screen.cursor.col = 0;
            }
            _ => {}
        }
    }
}

/// DECSCUSR cursor-style codes, exposed for completeness of the CSI space; not
/// wired into `csi_dispatch` above since no client currently issues it, but kept
/// so [`CursorStyle`] isn't dead weight.
#[must_use]
pub fn cursor_style_from_decscusr(code: u16) -> CursorStyle {
    match code {
        0 | 1 | 2 => CursorStyle::Block,
        3 | 4 => CursorStyle::Underline,
        5 | 6 => CursorStyle::Bar,
        _ => CursorStyle::Block,
    }
}
