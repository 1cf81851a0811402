//! Interactive terminal front end for the chat view
//!
//! Raw-mode event loop over crossterm's async event stream. Relay requests run on a
//! spawned task and report back over a channel, so the screen keeps redrawing (and
//! shows "Thinking...") while a request is in flight.

use std::io::{self, Write};
use std::sync::Arc;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::style::Print;
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{execute, queue};
use futures::StreamExt;
use tokio::sync::mpsc;

use super::client::{HttpRelayClient, RelayReply, RelayTransport, TransportError};
use super::render::render;
use super::state::{ChatView, KeyInput, KeyOutcome};

/// What a key press means to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Input(KeyInput),
    ToggleMode,
    Clear,
    ToggleModelDropdown,
    DropdownUp,
    DropdownDown,
    DropdownConfirm,
    CloseDropdown,
    Quit,
}

/// Map a key event to an action. Dropdown navigation takes over the arrow, Enter and
/// Esc keys while the dropdown is open.
#[must_use]
pub fn map_key(
    key: &KeyEvent,
    dropdown_open: bool,
) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c' | 'd') if ctrl => Some(Action::Quit),
        KeyCode::Char('l') if ctrl => Some(Action::Clear),
        KeyCode::Char('o') if ctrl => Some(Action::ToggleModelDropdown),
        KeyCode::Up if dropdown_open => Some(Action::DropdownUp),
        KeyCode::Down if dropdown_open => Some(Action::DropdownDown),
        KeyCode::Enter if dropdown_open => Some(Action::DropdownConfirm),
        KeyCode::Esc if dropdown_open => Some(Action::CloseDropdown),
        // Alt+Enter covers terminals that cannot report Shift+Enter
        KeyCode::Enter if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
            Some(Action::Input(KeyInput::ShiftEnter))
        }
        KeyCode::Enter => Some(Action::Input(KeyInput::Enter)),
        KeyCode::Tab | KeyCode::BackTab => Some(Action::ToggleMode),
        KeyCode::Backspace => Some(Action::Input(KeyInput::Backspace)),
        KeyCode::Char(c) if !ctrl => Some(Action::Input(KeyInput::Char(c))),
        _ => None,
    }
}

/// Restores the terminal when dropped, including on early return.
struct TerminalGuard {
    enhanced_keys: bool,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, Hide)?;

        let enhanced_keys = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced_keys {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )?;
        } else {
            tracing::debug!("Keyboard enhancement unsupported; use Alt+Enter for newlines");
        }

        Ok(Self { enhanced_keys })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        if self.enhanced_keys {
            let _ = execute!(out, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(out, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn draw(
    out: &mut impl Write,
    view: &ChatView,
) -> io::Result<()> {
    let (width, height) = terminal::size()?;
    let frame = render(view, width);

    queue!(out, Clear(ClearType::All))?;
    for (row, line) in frame.visible_lines(usize::from(height)).into_iter().enumerate() {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(out, MoveTo(0, row), Print(line), Print("\x1b[0m"))?;
    }
    out.flush()
}

/// Apply one action. Returns `false` when the loop should stop.
fn apply(
    view: &mut ChatView,
    action: Action,
    transport: &Arc<dyn RelayTransport>,
    replies: &mpsc::UnboundedSender<Result<RelayReply, TransportError>>,
) -> bool {
    match action {
        Action::Quit => return false,
        Action::Input(input) => {
            if let KeyOutcome::Submit(payload) = view.handle_key(input) {
                tracing::debug!("Submitting {} message(s) in {} mode", payload.messages.len(), payload.mode);
                let transport = Arc::clone(transport);
                let replies = replies.clone();
                tokio::spawn(async move {
                    let outcome = transport.send(&payload).await;
                    let _ = replies.send(outcome);
                });
            }
        }
        Action::ToggleMode => view.toggle_mode(),
        Action::Clear => view.clear(),
        Action::ToggleModelDropdown => view.toggle_model_dropdown(),
        Action::DropdownUp => view.move_dropdown_cursor(-1),
        Action::DropdownDown => view.move_dropdown_cursor(1),
        Action::DropdownConfirm => view.confirm_dropdown(),
        Action::CloseDropdown => view.close_model_dropdown(),
    }
    true
}

/// Run the interactive chat view against the relay at `relay_url`.
///
/// # Errors
///
/// Returns an error if the terminal cannot be configured or drawn to.
pub async fn run(relay_url: &str) -> io::Result<()> {
    let transport: Arc<dyn RelayTransport> = Arc::new(HttpRelayClient::new(relay_url));
    let (replies, mut outcomes) = mpsc::unbounded_channel();
    let mut view = ChatView::new();

    let _guard = TerminalGuard::enter()?;
    let mut out = io::stdout();
    let mut events = EventStream::new();

    draw(&mut out, &view)?;

    loop {
        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    let Some(action) = map_key(&key, view.show_model_dropdown()) else {
                        continue;
                    };
                    if !apply(&mut view, action, &transport, &replies) {
                        break;
                    }
                }
                Some(Ok(Event::Resize(_, _))) => {}
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e),
                None => break,
            },
            Some(outcome) = outcomes.recv() => view.finish_submit(outcome),
        }

        draw(&mut out, &view)?;
    }

    Ok(())
}
