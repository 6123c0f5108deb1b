use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

pub fn poll(tick_rate: Duration) -> Result<AppEvent> {
    if !event::poll(tick_rate)? {
        return Ok(AppEvent::Tick);
    }
    match event::read()? {
        Event::Key(key) if key.kind != KeyEventKind::Release => Ok(AppEvent::Key(key)),
        Event::Resize(..) => Ok(AppEvent::Resize),
        _ => Ok(AppEvent::Tick),
    }
}
