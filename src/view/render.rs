//! Turns a [`ChatView`] into terminal lines

use crate::chat::{ChatMode, ChatRole};

use super::markdown::render_markdown;
use super::models::{AVAILABLE_MODELS, find_model};
use super::state::ChatView;
use super::wrap::{display_width, wrap_lines};

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const REVERSE: &str = "\x1b[7m";
const RESET: &str = "\x1b[0m";

pub const TITLE: &str = "MSS AI ASSISTANT";
pub const TAGLINE: &str = "Powered by GPT-4o";
pub const GREETING: &str = "How can I help you today?";
pub const THINKING: &str = "Thinking...";
pub const KEY_HINTS: &str = "Enter send · Shift+Enter newline · Tab mode · ^O model · ^L clear · ^C quit";
pub const SHORT_KEY_HINTS: &str = "Enter send · Tab mode · ^C quit";

/// A rendered screen, one entry per terminal row. The body scrolls; header and footer
/// stay pinned.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub header: Vec<String>,
    pub body: Vec<String>,
    pub footer: Vec<String>,
}

impl Frame {
    /// Lines that fit in `height` rows, keeping the newest body lines in view.
    #[must_use]
    pub fn visible_lines(
        &self,
        height: usize,
    ) -> Vec<&str> {
        let room = height.saturating_sub(self.header.len() + self.footer.len());
        let skip = self.body.len().saturating_sub(room);

        self.header
            .iter()
            .chain(self.body.iter().skip(skip))
            .chain(self.footer.iter())
            .map(String::as_str)
            .take(height)
            .collect()
    }
}

fn centered(
    text: &str,
    width: usize,
) -> String {
    let pad = width.saturating_sub(display_width(text)) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

fn rule(width: usize) -> String {
    format!("{DIM}{}{RESET}", "─".repeat(width))
}

fn header(
    view: &ChatView,
    width: usize,
) -> Vec<String> {
    let title = format!("{BOLD}{TITLE}{RESET}");
    let mut lines = match width.checked_sub(TITLE.len() + TAGLINE.len()) {
        Some(gap) if gap >= 2 => vec![format!("{title}{}{DIM}{TAGLINE}{RESET}", " ".repeat(gap))],
        _ => vec![title],
    };

    let model_name = find_model(view.selected_model()).map_or(view.selected_model(), |model| model.name);
    lines.push(format!("{BOLD}MSSGPT{RESET}  {model_name} ▾"));

    if view.show_model_dropdown() {
        lines.push(format!("  {DIM}Models{RESET}"));
        for (index, model) in AVAILABLE_MODELS.iter().enumerate() {
            let cursor = if index == view.dropdown_cursor() { "›" } else { " " };
            let check = if model.id == view.selected_model() { " ✓" } else { "" };
            lines.push(format!(
                "  {cursor} {BOLD}{}{RESET}{check}  {DIM}{}{RESET}",
                model.name, model.description
            ));
        }
        lines.push(format!("    {DIM}More models ›{RESET}"));
    }

    lines.push(rule(width));
    lines
}

fn body(
    view: &ChatView,
    width: usize,
) -> Vec<String> {
    let mut lines = Vec::new();

    if view.messages().is_empty() {
        lines.push(String::new());
        lines.push(centered(&format!("{BOLD}{GREETING}{RESET}"), width));
    }

    for message in view.messages() {
        let label = match message.role {
            ChatRole::User => "You",
            ChatRole::Assistant => "ChatGPT",
        };
        lines.push(format!("{BOLD}{label}{RESET}"));

        if message.is_image() {
            lines.push(format!("  🎨 Generated image: {}", message.content));
        } else {
            lines.extend(render_markdown(&message.content).into_iter().map(|line| format!("  {line}")));
        }
        lines.push(String::new());
    }

    if view.is_loading() {
        lines.push(format!("{BOLD}ChatGPT{RESET}"));
        lines.push(format!("  {DIM}{THINKING}{RESET}"));
    }

    lines
}

fn footer(
    view: &ChatView,
    width: usize,
) -> Vec<String> {
    let mut lines = vec![rule(width)];

    let tab = |label: &str, active: bool| {
        if active {
            format!("{REVERSE} {label} {RESET}")
        } else {
            format!(" {label} ")
        }
    };
    lines.push(format!(
        "{}  {}",
        tab("Chat", view.mode() == ChatMode::Chat),
        tab("Generate Image", view.mode() == ChatMode::Image)
    ));

    let rows = view.input_rows(width.saturating_sub(2));
    let input: Vec<String> = if view.input().is_empty() {
        vec![format!("> {DIM}{}{RESET}", view.placeholder())]
    } else {
        let style = if view.is_loading() { DIM } else { "" };
        view.input()
            .split('\n')
            .enumerate()
            .map(|(index, line)| {
                let marker = if index == 0 { "> " } else { "  " };
                format!("{marker}{style}{line}{RESET}")
            })
            .collect()
    };
    // Keep the end of a long input visible, then pad to the box height.
    let mut input = wrap_lines(input, width);
    if input.len() > rows {
        input.drain(..input.len() - rows);
    }
    input.resize(rows, String::new());
    lines.extend(input);

    lines.push(centered(&format!("{DIM}{}{RESET}", view.disclaimer()), width));
    let hints = if display_width(KEY_HINTS) <= width { KEY_HINTS } else { SHORT_KEY_HINTS };
    lines.push(centered(&format!("{DIM}{hints}{RESET}"), width));
    lines
}

/// Render the whole screen for a terminal `width` columns wide.
#[must_use]
pub fn render(
    view: &ChatView,
    width: u16,
) -> Frame {
    let width = usize::from(width.max(1));
    Frame {
        header: wrap_lines(header(view, width), width),
        body: wrap_lines(body(view, width), width),
        footer: wrap_lines(footer(view, width), width),
    }
}
