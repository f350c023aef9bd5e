use std::time::Duration;
use tracing::trace;

use crate::domain::{ColumnsError, Message};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};

/// Turns terminal events into [`Message`]s for the model.
pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(event_poll_time: u64) -> Self {
        Self { event_poll_time }
    }

    pub fn handle_event(&self) -> Result<Option<Message>, ColumnsError> {
        if !event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(None);
        }
        let message = match event::read()? {
            // crossterm also emits key release and repeat events on Windows.
            Event::Key(key) if key.kind == KeyEventKind::Press => Self::handle_key(key),
            Event::Resize(width, height) => Some(Message::Resize(width as usize, height as usize)),
            _ => None,
        };
        Ok(message)
    }

    pub fn handle_key(key: KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::Enter => Some(Message::Enter),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::MoveLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::MoveRight),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Char(' ') => Some(Message::ToggleColumn),
            KeyCode::Char('a') => Some(Message::ShowAllColumns),
            KeyCode::Char('c') => Some(Message::CompactView),
            KeyCode::Char('v') => Some(Message::QuickToggle),
            KeyCode::Char('r') => Some(Message::ResetColumns),
            KeyCode::Char('<') => Some(Message::MoveColumnLeft),
            KeyCode::Char('>') => Some(Message::MoveColumnRight),
            KeyCode::Char('m') => Some(Message::StartDrag),
            KeyCode::Char('s') => Some(Message::Settings),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
