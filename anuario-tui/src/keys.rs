//! Keybinding definitions for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextView,
    PrevView,
    SwitchView(usize),
    MoveUp,
    MoveDown,
    PrevPage,
    NextPage,
    FirstPage,
    LastPage,
    Select,
    NewItem,
    EditItem,
    DeleteItem,
    ToggleFavorite,
    FavoritesOnly,
    CycleHouse,
    CycleStatus,
    ClearFilters,
    EditNameFilter,
    EditPatronusFilter,
    UploadImage,
    OpenHelp,
    Refresh,
    PushSync,
    ToggleSession,
    Save,
    Confirm,
    Cancel,
}

/// Keys accepted while a text field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInput {
    Char(char),
    Backspace,
    Clear,
    Submit,
    Cancel,
}

pub fn map_key(event: KeyEvent) -> Option<Action> {
    let KeyEvent { code, modifiers, .. } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Cancel),
            KeyCode::Char('r') => Some(Action::Refresh),
            KeyCode::Char('s') => Some(Action::Save),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::OpenHelp),
        KeyCode::Char('/') => Some(Action::EditNameFilter),
        KeyCode::Char('p') => Some(Action::EditPatronusFilter),
        KeyCode::Char('u') => Some(Action::CycleHouse),
        KeyCode::Char('s') => Some(Action::CycleStatus),
        KeyCode::Char('v') => Some(Action::FavoritesOnly),
        KeyCode::Char('c') => Some(Action::ClearFilters),
        KeyCode::Char('f') => Some(Action::ToggleFavorite),
        KeyCode::Char('i') => Some(Action::UploadImage),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::Char('P') => Some(Action::PushSync),
        KeyCode::Char('L') => Some(Action::ToggleSession),
        KeyCode::Char('n') => Some(Action::NewItem),
        KeyCode::Char('e') => Some(Action::EditItem),
        KeyCode::Char('d') => Some(Action::DeleteItem),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Tab => Some(Action::NextView),
        KeyCode::BackTab => Some(Action::PrevView),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::PrevPage),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::NextPage),
        KeyCode::Home | KeyCode::Char('g') => Some(Action::FirstPage),
        KeyCode::End | KeyCode::Char('G') => Some(Action::LastPage),
        KeyCode::Char(' ') => Some(Action::Select),
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let idx = match c {
                '1' => 0,
                '2' => 1,
                '3' => 2,
                '4' => 3,
                _ => return None,
            };
            Some(Action::SwitchView(idx))
        }
        _ => None,
    }
}

pub fn map_text_input(event: KeyEvent) -> Option<TextInput> {
    let KeyEvent { code, modifiers, .. } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(TextInput::Cancel),
            KeyCode::Char('u') => Some(TextInput::Clear),
            _ => None,
        };
    }

    match code {
        KeyCode::Enter => Some(TextInput::Submit),
        KeyCode::Esc => Some(TextInput::Cancel),
        KeyCode::Backspace => Some(TextInput::Backspace),
        KeyCode::Char(c) => Some(TextInput::Char(c)),
        _ => None,
    }
}
