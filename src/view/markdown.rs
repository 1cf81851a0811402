//! Markdown to ANSI-styled terminal lines
//!
//! GitHub-flavored extensions (tables, strikethrough, task lists) are enabled. The
//! output is one string per logical line; [`super::wrap`] fits them to the screen.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

const BOLD: &str = "\x1b[1m";
const NO_BOLD: &str = "\x1b[22m";
const ITALIC: &str = "\x1b[3m";
const NO_ITALIC: &str = "\x1b[23m";
const STRIKE: &str = "\x1b[9m";
const NO_STRIKE: &str = "\x1b[29m";
const UNDERLINE: &str = "\x1b[4m";
const NO_UNDERLINE: &str = "\x1b[24m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

#[derive(Default)]
struct Writer {
    lines: Vec<String>,
    current: String,
    /// `None` for bullet lists, `Some(next number)` for ordered lists.
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    in_code_block: bool,
    table_row: Option<Vec<String>>,
    table_cell: String,
}

impl Writer {
    fn prefix(&self) -> String {
        "│ ".repeat(self.quote_depth)
    }

    fn push_str(
        &mut self,
        text: &str,
    ) {
        if self.table_row.is_some() {
            self.table_cell.push_str(text);
        } else {
            if self.current.is_empty() {
                let prefix = self.prefix();
                self.current.push_str(&prefix);
            }
            self.current.push_str(text);
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            let line = std::mem::take(&mut self.current);
            self.lines.push(line);
        }
    }

    fn blank(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|line| !line.is_empty()) {
            self.lines.push(String::new());
        }
    }

    fn code_text(
        &mut self,
        text: &str,
    ) {
        for line in text.lines() {
            let prefixed = format!("{}    {DIM}{line}{RESET}", self.prefix());
            self.lines.push(prefixed);
        }
    }

    fn start(
        &mut self,
        tag: &Tag<'_>,
    ) {
        match tag {
            Tag::Heading { .. } => {
                self.blank();
                self.push_str(BOLD);
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.blank();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        let prefix = self.prefix();
                        self.lines.push(format!("{prefix}  {DIM}{lang}{RESET}"));
                    }
                }
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.blank();
                } else {
                    self.flush();
                }
                self.lists.push(*start);
            }
            Tag::Item => {
                self.flush();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{number}. ");
                        *number += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.push_str(&format!("{indent}{marker}"));
            }
            Tag::TableHead | Tag::TableRow => self.table_row = Some(Vec::new()),
            Tag::TableCell => self.table_cell.clear(),
            Tag::Emphasis => self.push_str(ITALIC),
            Tag::Strong => self.push_str(BOLD),
            Tag::Strikethrough => self.push_str(STRIKE),
            Tag::Link { .. } => self.push_str(UNDERLINE),
            Tag::Image { .. } => self.push_str("[image: "),
            _ => {}
        }
    }

    fn end(
        &mut self,
        tag: Tag<'_>,
    ) {
        match tag {
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    self.blank();
                } else {
                    self.flush();
                }
            }
            Tag::Heading { .. } => {
                self.push_str(NO_BOLD);
                self.blank();
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            Tag::CodeBlock(_) => {
                self.in_code_block = false;
                self.blank();
            }
            Tag::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Tag::Item => self.flush(),
            Tag::TableCell => {
                let cell = std::mem::take(&mut self.table_cell);
                if let Some(row) = self.table_row.as_mut() {
                    row.push(cell.trim().to_string());
                }
            }
            Tag::TableHead => {
                if let Some(row) = self.table_row.take() {
                    let rule = row
                        .iter()
                        .map(|cell| "─".repeat(cell.chars().count().max(3)))
                        .collect::<Vec<_>>()
                        .join("─┼─");
                    let prefix = self.prefix();
                    self.lines.push(format!("{prefix}{BOLD}{}{NO_BOLD}", row.join(" │ ")));
                    self.lines.push(format!("{prefix}{rule}"));
                }
            }
            Tag::TableRow => {
                if let Some(row) = self.table_row.take() {
                    let prefix = self.prefix();
                    self.lines.push(format!("{prefix}{}", row.join(" │ ")));
                }
            }
            Tag::Table(_) => self.blank(),
            Tag::Emphasis => self.push_str(NO_ITALIC),
            Tag::Strong => self.push_str(NO_BOLD),
            Tag::Strikethrough => self.push_str(NO_STRIKE),
            Tag::Link { dest_url, .. } => {
                self.push_str(NO_UNDERLINE);
                self.push_str(&format!(" {DIM}({dest_url}){RESET}"));
            }
            Tag::Image { dest_url, .. } => self.push_str(&format!("] {DIM}({dest_url}){RESET}")),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        while self.lines.last().is_some_and(String::is_empty) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Render Markdown source into terminal lines.
#[must_use]
pub fn render_markdown(source: &str) -> Vec<String> {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut writer = Writer::default();
    // End events carry less information than their Start, so keep the open tags.
    let mut open: Vec<Tag<'_>> = Vec::new();

    for event in Parser::new_ext(source, options) {
        match event {
            Event::Start(tag) => {
                writer.start(&tag);
                open.push(tag);
            }
            Event::End(_) => {
                if let Some(tag) = open.pop() {
                    writer.end(tag);
                }
            }
            Event::Text(text) => {
                if writer.in_code_block {
                    writer.code_text(&text);
                } else {
                    writer.push_str(&text);
                }
            }
            Event::Code(code) => writer.push_str(&format!("{CYAN}{code}{RESET}")),
            Event::Html(html) | Event::InlineHtml(html) => writer.push_str(html.trim_end()),
            Event::SoftBreak => writer.push_str(" "),
            Event::HardBreak => writer.flush(),
            Event::Rule => {
                writer.blank();
                writer.lines.push("────────".to_string());
                writer.lines.push(String::new());
            }
            Event::TaskListMarker(checked) => writer.push_str(if checked { "[x] " } else { "[ ] " }),
            _ => {}
        }
    }

    writer.finish()
}

/// Strip ANSI escape sequences, leaving the visible text.
#[must_use]
pub fn strip_ansi(line: &str) -> String {
    let mut plain = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            plain.push(c);
        }
    }
    plain
}
