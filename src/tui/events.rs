use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::Duration;

/// Terminal input relevant to the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// Terminal was resized; the next draw picks up the new size
    Resize,
}

/// Polls crossterm with a bounded wait so the loop can keep draining sync messages
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Next input event, or `None` when the tick elapsed without one
    pub fn next(&mut self) -> std::io::Result<Option<InputEvent>> {
        if !event::poll(self.tick_rate)? {
            return Ok(None);
        }
        match event::read()? {
            // Only Press events, ignoring Release and Repeat
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(InputEvent::Key(key))),
            Event::Resize(_, _) => Ok(Some(InputEvent::Resize)),
            _ => Ok(None),
        }
    }
}
