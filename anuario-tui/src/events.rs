//! Event types for the TUI event loop.

use crate::sync::SyncUpdate;
use crate::tasks::TaskEvent;
use crossterm::event::KeyEvent;

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    Resize { width: u16, height: u16 },
    Sync(SyncUpdate),
    Task(Box<TaskEvent>),
}
