//! Width-aware wrapping of ANSI-styled lines
//!
//! Widths are measured in terminal columns: escape sequences count as zero and wide
//! characters (CJK, emoji) as two.

use unicode_width::UnicodeWidthChar;

const RESET: &str = "\x1b[0m";

enum Piece<'a> {
    Escape(&'a str),
    Char(char, usize),
}

fn pieces(line: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut indices = line.char_indices();
    while let Some((start, c)) = indices.next() {
        if c == '\x1b' {
            let mut end = line.len();
            for (index, next) in indices.by_ref() {
                if next.is_ascii_alphabetic() {
                    end = index + next.len_utf8();
                    break;
                }
            }
            pieces.push(Piece::Escape(&line[start..end]));
        } else {
            pieces.push(Piece::Char(c, c.width().unwrap_or(0)));
        }
    }
    pieces
}

/// Columns `line` occupies on screen.
#[must_use]
pub fn display_width(line: &str) -> usize {
    pieces(line)
        .iter()
        .map(|piece| match piece {
            Piece::Escape(_) => 0,
            Piece::Char(_, width) => *width,
        })
        .sum()
}

/// Indent for continuation lines: leading spaces and quote bars are repeated, and a
/// list or input marker becomes blank space so the text hangs under itself.
fn hanging_indent(plain: &str) -> String {
    let mut hang = String::new();
    let mut rest = plain;
    loop {
        if let Some(after) = rest.strip_prefix(' ') {
            hang.push(' ');
            rest = after;
        } else if let Some(after) = rest.strip_prefix("│ ") {
            hang.push_str("│ ");
            rest = after;
        } else {
            break;
        }
    }

    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    let marker = if rest.starts_with("• ") || rest.starts_with("> ") {
        2
    } else if digits > 0 && rest[digits..].starts_with(". ") {
        digits + 2
    } else {
        0
    };
    hang.push_str(&" ".repeat(marker));
    hang
}

struct Wrapper {
    width: usize,
    hang: String,
    hang_width: usize,
    lines: Vec<String>,
    current: String,
    current_width: usize,
    /// Styles in effect since the last reset, replayed on continuation lines.
    active: String,
}

impl Wrapper {
    fn escape(
        &mut self,
        escape: &str,
    ) {
        self.current.push_str(escape);
        if escape == RESET {
            self.active.clear();
        } else {
            self.active.push_str(escape);
        }
    }

    fn break_line(&mut self) {
        let mut line = std::mem::take(&mut self.current);
        if !self.active.is_empty() {
            line.push_str(RESET);
        }
        self.lines.push(line);
        self.current = format!("{}{}", self.hang, self.active);
        self.current_width = self.hang_width;
    }

    fn at_line_start(&self) -> bool {
        self.current_width <= self.hang_width && !self.lines.is_empty()
    }

    fn word(
        &mut self,
        word: &[Piece<'_>],
        spaces: usize,
    ) {
        let word_width: usize = word
            .iter()
            .map(|piece| match piece {
                Piece::Escape(_) => 0,
                Piece::Char(_, width) => *width,
            })
            .sum();

        let spaces = if self.at_line_start() { 0 } else { spaces };
        let overflows = self.current_width + spaces + word_width > self.width;
        if overflows && word_width > 0 && !self.at_line_start() && self.current_width > 0 {
            self.break_line();
        } else {
            self.current.push_str(&" ".repeat(spaces));
            self.current_width += spaces;
        }

        for piece in word {
            match piece {
                Piece::Escape(escape) => self.escape(escape),
                Piece::Char(c, width) => {
                    if self.current_width + width > self.width && self.current_width > self.hang_width {
                        self.break_line();
                    }
                    self.current.push(*c);
                    self.current_width += width;
                }
            }
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.lines.push(self.current);
        self.lines
    }
}

/// Word-wrap one styled line to `width` columns.
#[must_use]
pub fn wrap_line(
    line: &str,
    width: usize,
) -> Vec<String> {
    let width = width.max(1);
    if display_width(line) <= width {
        return vec![line.to_string()];
    }

    let plain = super::markdown::strip_ansi(line);
    let mut hang = hanging_indent(&plain);
    if hang.chars().count() * 2 > width {
        hang.clear();
    }
    let hang_width = display_width(&hang);

    let mut wrapper = Wrapper {
        width,
        hang,
        hang_width,
        lines: Vec::new(),
        current: String::new(),
        current_width: 0,
        active: String::new(),
    };

    let pieces = pieces(line);
    let mut spaces = 0;
    let mut word: Vec<Piece<'_>> = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Char(' ', _) => {
                if !word.is_empty() {
                    wrapper.word(&word, spaces);
                    word.clear();
                    spaces = 0;
                }
                spaces += 1;
            }
            piece => word.push(piece),
        }
    }
    if !word.is_empty() {
        wrapper.word(&word, spaces);
    }

    wrapper.finish()
}

/// Wrap every line, preserving order.
#[must_use]
pub fn wrap_lines(
    lines: Vec<String>,
    width: usize,
) -> Vec<String> {
    lines.into_iter().flat_map(|line| wrap_line(&line, width)).collect()
}
