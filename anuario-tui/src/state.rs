//! Application state and view state definitions.
//!
//! Only the UI loop touches [`App`]. Key actions that need the network are
//! returned as [`Command`]s for the loop to run on the task runner; their
//! results come back as events and are applied here.

use crate::config::TuiConfig;
use crate::keys::{Action, TextInput};
use crate::nav::View;
use crate::notifications::{Notification, NotificationLevel};
use crate::persistence::PersistedState;
use crate::session::Session;
use crate::sync::{SyncOutcome, SyncUpdate};
use crate::tasks::{TaskEvent, TaskKind, TaskOutcome};
use crate::theme::HogwartsTheme;
use anuario_core::{
    Catalog, Character, CharacterPayload, HouseFilter, HouseOptions, PageMode, STATUS_ALIVE,
    STATUS_DECEASED,
};
use std::path::PathBuf;

const MAX_NOTIFICATIONS: usize = 50;

/// Network work requested by a key action or a finished task.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    Sync { page_mode: PageMode },
    PushSync,
    Refetch,
    CancelSync,
    Save {
        id: Option<String>,
        draft: Character,
        payload: CharacterPayload,
    },
    Delete { id: String },
    ToggleFavorite { id: String, desired: bool },
    UploadImage { id: String, path: PathBuf },
    Login { username: String, password: String },
    Logout,
}

/// Connection state shown in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Loading,
    Pulling,
    Images { current: u64, total: u64 },
    Online,
    Offline,
    Failed(String),
}

impl SyncStatus {
    pub fn label(&self) -> String {
        match self {
            SyncStatus::Idle => "Idle".to_string(),
            SyncStatus::Loading => "Loading...".to_string(),
            SyncStatus::Pulling => "Syncing...".to_string(),
            SyncStatus::Images { current, total } => format!("Images {}/{}", current, total),
            SyncStatus::Online => "Online".to_string(),
            SyncStatus::Offline => "Offline mode".to_string(),
            SyncStatus::Failed(_) => "Error loading data".to_string(),
        }
    }
}

/// Where the text typed into the prompt goes on submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTarget {
    NameFilter,
    PatronusFilter,
    ImagePath,
    EditorField(EditorField),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub target: PromptTarget,
    pub title: String,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Name,
    House,
    Status,
    Born,
    Died,
    Species,
    Gender,
    Patronus,
    Nationality,
    EyeColor,
    HairColor,
    SkinColor,
    Height,
    Weight,
    Boggart,
    Animagus,
    Alias,
    Titles,
    Jobs,
    Romances,
    Family,
    Wand,
    Image,
}

impl EditorField {
    pub const ALL: [EditorField; 23] = [
        EditorField::Name,
        EditorField::House,
        EditorField::Status,
        EditorField::Born,
        EditorField::Died,
        EditorField::Species,
        EditorField::Gender,
        EditorField::Patronus,
        EditorField::Nationality,
        EditorField::EyeColor,
        EditorField::HairColor,
        EditorField::SkinColor,
        EditorField::Height,
        EditorField::Weight,
        EditorField::Boggart,
        EditorField::Animagus,
        EditorField::Alias,
        EditorField::Titles,
        EditorField::Jobs,
        EditorField::Romances,
        EditorField::Family,
        EditorField::Wand,
        EditorField::Image,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EditorField::Name => "Name",
            EditorField::House => "House",
            EditorField::Status => "Status",
            EditorField::Born => "Born",
            EditorField::Died => "Died",
            EditorField::Species => "Species",
            EditorField::Gender => "Gender",
            EditorField::Patronus => "Patronus",
            EditorField::Nationality => "Nationality",
            EditorField::EyeColor => "Eye color",
            EditorField::HairColor => "Hair color",
            EditorField::SkinColor => "Skin color",
            EditorField::Height => "Height",
            EditorField::Weight => "Weight",
            EditorField::Boggart => "Boggart",
            EditorField::Animagus => "Animagus",
            EditorField::Alias => "Aliases",
            EditorField::Titles => "Titles",
            EditorField::Jobs => "Jobs",
            EditorField::Romances => "Romances",
            EditorField::Family => "Family",
            EditorField::Wand => "Wand",
            EditorField::Image => "Image URL",
        }
    }

    /// Status is toggled rather than typed.
    pub fn is_toggle(&self) -> bool {
        matches!(self, EditorField::Status)
    }

    pub fn value<'a>(&self, character: &'a Character) -> &'a str {
        match self {
            EditorField::Name => &character.name,
            EditorField::House => &character.house,
            EditorField::Status => &character.status,
            EditorField::Born => &character.born,
            EditorField::Died => &character.died,
            EditorField::Species => &character.species,
            EditorField::Gender => &character.gender,
            EditorField::Patronus => &character.patronus,
            EditorField::Nationality => &character.nationality,
            EditorField::EyeColor => &character.eye_color,
            EditorField::HairColor => &character.hair_color,
            EditorField::SkinColor => &character.skin_color,
            EditorField::Height => &character.height,
            EditorField::Weight => &character.weight,
            EditorField::Boggart => &character.boggart,
            EditorField::Animagus => &character.animagus,
            EditorField::Alias => &character.alias,
            EditorField::Titles => &character.titles,
            EditorField::Jobs => &character.jobs,
            EditorField::Romances => &character.romances,
            EditorField::Family => &character.family,
            EditorField::Wand => &character.wand,
            EditorField::Image => &character.image,
        }
    }

    pub fn set(&self, character: &mut Character, value: String) {
        let slot = match self {
            EditorField::Status => {
                character.status = value;
                return;
            }
            EditorField::Died => {
                character.died = value;
                if !character.died.trim().is_empty() {
                    character.status = STATUS_DECEASED.to_string();
                }
                return;
            }
            EditorField::Name => &mut character.name,
            EditorField::House => &mut character.house,
            EditorField::Born => &mut character.born,
            EditorField::Species => &mut character.species,
            EditorField::Gender => &mut character.gender,
            EditorField::Patronus => &mut character.patronus,
            EditorField::Nationality => &mut character.nationality,
            EditorField::EyeColor => &mut character.eye_color,
            EditorField::HairColor => &mut character.hair_color,
            EditorField::SkinColor => &mut character.skin_color,
            EditorField::Height => &mut character.height,
            EditorField::Weight => &mut character.weight,
            EditorField::Boggart => &mut character.boggart,
            EditorField::Animagus => &mut character.animagus,
            EditorField::Alias => &mut character.alias,
            EditorField::Titles => &mut character.titles,
            EditorField::Jobs => &mut character.jobs,
            EditorField::Romances => &mut character.romances,
            EditorField::Family => &mut character.family,
            EditorField::Wand => &mut character.wand,
            EditorField::Image => &mut character.image,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditorState {
    /// `None` while creating a new record.
    pub target_id: Option<String>,
    pub draft: Character,
    pub field: usize,
    pub saving: bool,
}

impl EditorState {
    pub fn for_new() -> Self {
        let draft = Character {
            status: STATUS_ALIVE.to_string(),
            ..Character::default()
        };
        Self {
            draft,
            ..Self::default()
        }
    }

    pub fn for_existing(character: &Character) -> Self {
        Self {
            target_id: Some(character.id.clone()),
            draft: character.clone(),
            ..Self::default()
        }
    }

    pub fn current_field(&self) -> EditorField {
        EditorField::ALL[self.field.min(EditorField::ALL.len() - 1)]
    }

    pub fn is_new(&self) -> bool {
        self.target_id.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigViewState {
    pub content: String,
    pub validation_errors: Vec<String>,
}

pub struct App {
    pub config: TuiConfig,
    pub theme: HogwartsTheme,
    pub session: Session,
    pub active_view: View,

    pub catalog: Catalog,
    pub house_options: HouseOptions,
    /// Row within the visible page.
    pub selected: usize,
    pub detail_id: Option<String>,
    pub editor: EditorState,
    pub config_view: ConfigViewState,

    pub notifications: Vec<Notification>,
    pub prompt: Option<Prompt>,
    pub modal: Option<Modal>,
    pub pending_delete: Option<String>,

    pub sync_status: SyncStatus,
    pub sync_in_flight: bool,
    restored_page: Option<usize>,
}

impl App {
    pub fn new(config: TuiConfig) -> Self {
        let config_view = ConfigViewState {
            content: redacted_config(&config),
            validation_errors: config
                .validate()
                .err()
                .map(|err| vec![err.to_string()])
                .unwrap_or_default(),
        };
        Self {
            config,
            theme: HogwartsTheme::hogwarts(),
            session: Session::anonymous(),
            active_view: View::Catalog,
            catalog: Catalog::new(),
            house_options: HouseOptions::default(),
            selected: 0,
            detail_id: None,
            editor: EditorState::for_new(),
            config_view,
            notifications: Vec::new(),
            prompt: None,
            modal: None,
            pending_delete: None,
            sync_status: SyncStatus::Idle,
            sync_in_flight: false,
            restored_page: None,
        }
    }

    pub fn restore(&mut self, state: PersistedState) {
        self.active_view = match state.active_view {
            View::Editor => View::Catalog,
            view => view,
        };
        self.catalog.set_criteria(state.criteria, PageMode::Reset);
        self.restored_page = Some(state.page);
    }

    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            active_view: self.active_view,
            criteria: self.catalog.criteria().clone(),
            page: self.catalog.current_page(),
        }
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
        if self.notifications.len() > MAX_NOTIFICATIONS {
            let excess = self.notifications.len() - MAX_NOTIFICATIONS;
            self.notifications.drain(..excess);
        }
    }

    pub fn selected_character(&self) -> Option<&Character> {
        self.catalog.visible().get(self.selected).copied()
    }

    pub fn detail_character(&self) -> Option<&Character> {
        match &self.detail_id {
            Some(id) => self.catalog.get(id),
            None => self.selected_character(),
        }
    }

    /// Start a sync unless one is already running.
    pub fn request_sync(&mut self, page_mode: PageMode) -> Option<Command> {
        if self.sync_in_flight {
            self.notify(NotificationLevel::Warning, "Sync already in progress");
            return None;
        }
        self.sync_in_flight = true;
        self.sync_status = SyncStatus::Loading;
        Some(Command::Sync { page_mode })
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    pub fn handle_action(&mut self, action: Action) -> Option<Command> {
        if self.modal.is_some() {
            if matches!(action, Action::Confirm | Action::Cancel) {
                self.modal = None;
            }
            return matches!(action, Action::Quit).then_some(Command::Quit);
        }
        if let Some(id) = self.pending_delete.take() {
            return match action {
                Action::Confirm => Some(Command::Delete { id }),
                _ => {
                    self.notify(NotificationLevel::Info, "Delete cancelled");
                    None
                }
            };
        }

        match action {
            Action::Quit => return Some(Command::Quit),
            Action::NextView => self.active_view = self.active_view.next(),
            Action::PrevView => self.active_view = self.active_view.previous(),
            Action::SwitchView(index) => {
                if let Some(view) = View::from_index(index) {
                    self.active_view = view;
                }
            }
            Action::OpenHelp => {
                self.modal = Some(Modal {
                    title: "Keybindings".to_string(),
                    message: HELP_TEXT.to_string(),
                })
            }
            Action::Refresh => return self.request_sync(PageMode::Reset),
            Action::PushSync => {
                if self.sync_in_flight {
                    self.notify(NotificationLevel::Warning, "Sync already in progress");
                    return None;
                }
                self.sync_in_flight = true;
                self.sync_status = SyncStatus::Pulling;
                return Some(Command::PushSync);
            }
            Action::ToggleSession => return self.toggle_session(),
            _ => {
                return match self.active_view {
                    View::Catalog => self.handle_catalog_action(action),
                    View::Detail => self.handle_detail_action(action),
                    View::Editor => self.handle_editor_action(action),
                    View::ConfigViewer => None,
                }
            }
        }
        None
    }

    fn handle_catalog_action(&mut self, action: Action) -> Option<Command> {
        match action {
            // Esc only cancels background sync from the list; other views use it as back.
            Action::Cancel if self.sync_in_flight => return Some(Command::CancelSync),
            Action::MoveDown => self.select_next(),
            Action::MoveUp => self.select_previous(),
            Action::NextPage => {
                self.catalog.next_page();
                self.selected = 0;
            }
            Action::PrevPage => {
                self.catalog.previous_page();
                self.selected = 0;
            }
            Action::FirstPage => {
                self.catalog.goto_page(0);
                self.selected = 0;
            }
            Action::LastPage => {
                self.catalog.goto_page(self.catalog.page_count() - 1);
                self.selected = 0;
            }
            Action::Confirm | Action::Select => {
                if let Some(id) = self.selected_character().map(|c| c.id.clone()) {
                    self.detail_id = Some(id);
                    self.active_view = View::Detail;
                }
            }
            Action::EditNameFilter => {
                let input = self.catalog.criteria().text.clone();
                self.open_prompt(PromptTarget::NameFilter, "Search name", input);
            }
            Action::EditPatronusFilter => {
                let input = self.catalog.criteria().patronus.clone();
                self.open_prompt(PromptTarget::PatronusFilter, "Patronus", input);
            }
            Action::CycleHouse => {
                let options = self.house_options.filters();
                let current = options
                    .iter()
                    .position(|f| *f == self.catalog.criteria().house)
                    .unwrap_or(0);
                let next = options[(current + 1) % options.len()].clone();
                self.catalog.criteria_mut().house = next;
                self.reapply_filters();
            }
            Action::CycleStatus => {
                let next = self.catalog.criteria().status.next();
                self.catalog.criteria_mut().status = next;
                self.reapply_filters();
            }
            Action::FavoritesOnly => {
                let criteria = self.catalog.criteria_mut();
                criteria.favorites_only = !criteria.favorites_only;
                self.reapply_filters();
            }
            Action::ClearFilters => {
                self.catalog.criteria_mut().clear();
                self.reapply_filters();
            }
            _ => {
                let target = self.selected_character().cloned();
                return self.handle_record_action(action, target);
            }
        }
        None
    }

    fn handle_detail_action(&mut self, action: Action) -> Option<Command> {
        match action {
            Action::Cancel => {
                self.active_view = View::Catalog;
                None
            }
            _ => {
                let target = self.detail_character().cloned();
                self.handle_record_action(action, target)
            }
        }
    }

    /// Actions on a single record, shared by the catalog and detail views.
    fn handle_record_action(&mut self, action: Action, target: Option<Character>) -> Option<Command> {
        match action {
            Action::NewItem => {
                self.editor = EditorState::for_new();
                self.active_view = View::Editor;
                None
            }
            Action::EditItem => {
                let character = target?;
                self.editor = EditorState::for_existing(&character);
                self.active_view = View::Editor;
                None
            }
            Action::DeleteItem => {
                let character = target?;
                if !self.require_login("delete") {
                    return None;
                }
                self.notify(
                    NotificationLevel::Warning,
                    format!("Delete {}? Enter to confirm, any other key cancels", character.name),
                );
                self.pending_delete = Some(character.id);
                None
            }
            Action::ToggleFavorite => {
                let character = target?;
                Some(Command::ToggleFavorite {
                    desired: !character.favorite,
                    id: character.id,
                })
            }
            Action::UploadImage => {
                let character = target?;
                if !self.require_login("upload an image") {
                    return None;
                }
                self.detail_id = Some(character.id);
                self.open_prompt(PromptTarget::ImagePath, "Image file path", String::new());
                None
            }
            _ => None,
        }
    }

    fn handle_editor_action(&mut self, action: Action) -> Option<Command> {
        match action {
            Action::MoveDown => {
                self.editor.field = (self.editor.field + 1).min(EditorField::ALL.len() - 1);
            }
            Action::MoveUp => {
                self.editor.field = self.editor.field.saturating_sub(1);
            }
            Action::Confirm | Action::Select => {
                let field = self.editor.current_field();
                if field.is_toggle() {
                    let next = if self.editor.draft.is_deceased() {
                        STATUS_ALIVE
                    } else {
                        STATUS_DECEASED
                    };
                    field.set(&mut self.editor.draft, next.to_string());
                } else {
                    let input = field.value(&self.editor.draft).to_string();
                    self.open_prompt(PromptTarget::EditorField(field), field.label(), input);
                }
            }
            Action::Save => return self.save_editor(),
            Action::Cancel => {
                self.active_view = if self.editor.is_new() {
                    View::Catalog
                } else {
                    View::Detail
                };
            }
            _ => {}
        }
        None
    }

    fn save_editor(&mut self) -> Option<Command> {
        if self.editor.saving {
            return None;
        }
        if !self.require_login("save") {
            return None;
        }
        match CharacterPayload::from_character(&self.editor.draft) {
            Ok(payload) => {
                self.editor.saving = true;
                // The local copy must match what the backend stores.
                let mut draft = self.editor.draft.clone();
                draft.name = payload.name.clone();
                draft.died = payload.died.clone();
                draft.image = payload.image.clone();
                Some(Command::Save {
                    id: self.editor.target_id.clone(),
                    draft,
                    payload,
                })
            }
            Err(err) => {
                self.notify(NotificationLevel::Error, err.to_string());
                None
            }
        }
    }

    fn toggle_session(&mut self) -> Option<Command> {
        if self.session.is_logged_in() {
            return Some(Command::Logout);
        }
        match (&self.config.auth.username, &self.config.auth.password) {
            (Some(username), Some(password)) => Some(Command::Login {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => {
                self.notify(NotificationLevel::Warning, "No credentials configured in [auth]");
                None
            }
        }
    }

    fn require_login(&mut self, what: &str) -> bool {
        if self.session.is_logged_in() {
            return true;
        }
        self.notify(NotificationLevel::Warning, format!("Log in to {}", what));
        false
    }

    // ------------------------------------------------------------------------
    // Prompt
    // ------------------------------------------------------------------------

    fn open_prompt(&mut self, target: PromptTarget, title: &str, input: String) {
        self.prompt = Some(Prompt {
            target,
            title: title.to_string(),
            input,
        });
    }

    pub fn handle_text_input(&mut self, input: TextInput) -> Option<Command> {
        let mut prompt = self.prompt.take()?;
        match input {
            TextInput::Char(c) => prompt.input.push(c),
            TextInput::Backspace => {
                prompt.input.pop();
            }
            TextInput::Clear => prompt.input.clear(),
            TextInput::Cancel => return None,
            TextInput::Submit => return self.submit_prompt(prompt),
        }
        if matches!(prompt.target, PromptTarget::NameFilter | PromptTarget::PatronusFilter) {
            self.apply_prompt_filter(&prompt);
        }
        self.prompt = Some(prompt);
        None
    }

    fn apply_prompt_filter(&mut self, prompt: &Prompt) {
        let criteria = self.catalog.criteria_mut();
        match prompt.target {
            PromptTarget::NameFilter => criteria.text = prompt.input.clone(),
            PromptTarget::PatronusFilter => criteria.patronus = prompt.input.clone(),
            _ => return,
        }
        self.reapply_filters();
    }

    fn submit_prompt(&mut self, prompt: Prompt) -> Option<Command> {
        match prompt.target {
            PromptTarget::NameFilter | PromptTarget::PatronusFilter => {
                self.apply_prompt_filter(&prompt);
                None
            }
            PromptTarget::EditorField(field) => {
                field.set(&mut self.editor.draft, prompt.input);
                None
            }
            PromptTarget::ImagePath => {
                let path = prompt.input.trim();
                if path.is_empty() {
                    return None;
                }
                let id = self.detail_id.clone()?;
                Some(Command::UploadImage {
                    id,
                    path: PathBuf::from(path),
                })
            }
        }
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    pub fn select_next(&mut self) {
        let visible = self.catalog.visible_range().len();
        if visible > 0 {
            self.selected = (self.selected + 1).min(visible - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let visible = self.catalog.visible_range().len();
        self.selected = self.selected.min(visible.saturating_sub(1));
    }

    fn reapply_filters(&mut self) {
        self.catalog.apply_filters(PageMode::Reset);
        self.selected = 0;
    }

    fn replace_records(&mut self, characters: Vec<Character>, page_mode: PageMode) {
        self.catalog.replace_all(characters, page_mode);
        self.refresh_house_options();
        if let Some(page) = self.restored_page.take() {
            self.catalog.goto_page(page);
        }
        self.clamp_selection();
    }

    /// Recompute the selector entries; a house filter that no longer exists
    /// falls back to any house.
    fn refresh_house_options(&mut self) {
        self.house_options = self.catalog.house_options();
        if !self.house_options.contains(&self.catalog.criteria().house) {
            tracing::debug!(house = self.catalog.criteria().house.label(), "House filter no longer available");
            self.catalog.criteria_mut().house = HouseFilter::Any;
            self.catalog.apply_filters(PageMode::Preserve);
        }
    }

    // ------------------------------------------------------------------------
    // Events from background work
    // ------------------------------------------------------------------------

    pub fn apply_sync_update(&mut self, update: SyncUpdate) {
        match update {
            SyncUpdate::LocalLoaded {
                characters,
                page_mode,
            } => {
                self.replace_records(characters, page_mode);
                self.sync_status = SyncStatus::Pulling;
            }
            SyncUpdate::ImageProgress { current, total } => {
                self.sync_status = SyncStatus::Images { current, total };
            }
        }
    }

    pub fn apply_task_event(&mut self, event: TaskEvent) -> Option<Command> {
        let TaskEvent { kind, outcome, .. } = event;
        if matches!(kind, TaskKind::Sync | TaskKind::Push) {
            self.sync_in_flight = false;
        }
        if kind == TaskKind::Save {
            self.editor.saving = false;
        }

        match outcome {
            TaskOutcome::Synced(outcome) => self.apply_sync_outcome(outcome),
            TaskOutcome::Refreshed(characters) => {
                self.replace_records(characters, PageMode::Preserve);
            }
            TaskOutcome::Saved { character, created } => {
                if character.id.is_empty() {
                    self.notify(NotificationLevel::Success, "Character saved");
                    self.active_view = View::Catalog;
                    return Some(Command::Refetch);
                }
                let id = character.id.clone();
                let message = if created { "Character created" } else { "Character updated" };
                self.catalog.upsert(character);
                self.refresh_house_options();
                self.clamp_selection();
                self.detail_id = Some(id);
                self.active_view = View::Detail;
                self.notify(NotificationLevel::Success, message);
            }
            TaskOutcome::Deleted { id } => {
                self.catalog.remove(&id);
                self.refresh_house_options();
                if self.detail_id.as_deref() == Some(id.as_str()) {
                    self.detail_id = None;
                }
                self.clamp_selection();
                self.active_view = View::Catalog;
                self.notify(NotificationLevel::Success, "Character deleted");
            }
            TaskOutcome::FavoriteSet { id, favorite } => {
                self.catalog.set_favorite(&id, favorite);
                self.clamp_selection();
            }
            TaskOutcome::ImageUploaded { .. } => {
                self.notify(NotificationLevel::Success, "Image uploaded");
                return Some(Command::Refetch);
            }
            TaskOutcome::LoggedIn(session) => {
                let who = session.username().unwrap_or("user").to_string();
                self.session = session;
                self.notify(NotificationLevel::Success, format!("Logged in as {}", who));
            }
            TaskOutcome::LoggedOut => {
                self.session.clear();
                self.notify(NotificationLevel::Info, "Logged out");
            }
            TaskOutcome::Pushed => {
                self.sync_status = SyncStatus::Online;
                self.notify(NotificationLevel::Success, "Push and pull finished");
                return Some(Command::Refetch);
            }
            TaskOutcome::Failed(message) => {
                if kind == TaskKind::Push {
                    self.sync_status = SyncStatus::Offline;
                }
                self.notify(NotificationLevel::Error, format!("{} failed: {}", kind.label(), message));
            }
            TaskOutcome::Cancelled => {
                let message = match kind {
                    TaskKind::Sync => "Sync cancelled",
                    TaskKind::Push => "Push cancelled",
                    _ => return None,
                };
                self.sync_status = SyncStatus::Idle;
                self.notify(NotificationLevel::Info, message);
            }
        }
        None
    }

    fn apply_sync_outcome(&mut self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Completed {
                characters,
                page_mode,
            } => {
                self.replace_records(characters, page_mode);
                self.sync_status = SyncStatus::Online;
                self.notify(
                    NotificationLevel::Success,
                    format!("Synced {} characters", self.catalog.master().len()),
                );
            }
            SyncOutcome::Offline => {
                self.sync_status = SyncStatus::Offline;
                self.notify(NotificationLevel::Warning, "Offline mode");
            }
            SyncOutcome::Failed(message) => {
                self.notify(NotificationLevel::Error, format!("Error loading data: {}", message));
                self.sync_status = SyncStatus::Failed(message);
            }
            SyncOutcome::Cancelled => {
                self.sync_status = SyncStatus::Idle;
                self.notify(NotificationLevel::Info, "Sync cancelled");
            }
        }
    }
}

const HELP_TEXT: &str = "j/k move | h/l page | Enter open | / name | p patronus | u house | \
s status | v favorites only | c clear | f favorite | n new | e edit | d delete | \
i upload image | r sync | P push | Esc back, or cancel sync from the list | \
L login/logout | Tab switch view | q quit";

fn redacted_config(config: &TuiConfig) -> String {
    let mut shown = config.clone();
    if shown.auth.password.is_some() {
        shown.auth.password = Some("********".to_string());
    }
    format!("{:#?}", shown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TuiConfig {
        TuiConfig::from_toml(
            r#"
api_base_url = "http://localhost:8000"
request_timeout_ms = 10000
list_timeout_ms = 120000
refresh_interval_ms = 250
persistence_path = "tmp/state.json"
log_path = "tmp/anuario.log"
log_filter = "info"

[sync]
poll_interval_ms = 1000
max_missed_status = 5
sync_on_startup = true

[tasks]
max_concurrent = 4

[auth]
username = "harry"
password = "alohomora"

[theme]
name = "hogwarts"
"#,
        )
        .unwrap()
    }

    fn character(id: &str, name: &str, house: &str) -> Character {
        Character {
            id: id.to_string(),
            name: name.to_string(),
            house: house.to_string(),
            status: STATUS_ALIVE.to_string(),
            ..Character::default()
        }
    }

    fn task(kind: TaskKind, outcome: TaskOutcome) -> TaskEvent {
        TaskEvent { id: 1, kind, outcome }
    }

    fn logged_in_app() -> App {
        let mut app = App::new(test_config());
        app.session = Session::new("token", Some("harry".to_string()));
        app
    }

    #[test]
    fn test_second_sync_refused_while_in_flight() {
        let mut app = App::new(test_config());
        assert!(matches!(app.handle_action(Action::Refresh), Some(Command::Sync { .. })));
        assert!(app.handle_action(Action::Refresh).is_none());
        assert!(app.handle_action(Action::PushSync).is_none());

        app.apply_task_event(task(TaskKind::Sync, TaskOutcome::Synced(SyncOutcome::Offline)));
        assert!(!app.sync_in_flight);
        assert_eq!(app.sync_status, SyncStatus::Offline);
        assert!(app.handle_action(Action::Refresh).is_some());
    }

    #[test]
    fn test_local_load_then_offline_keeps_records() {
        let mut app = App::new(test_config());
        app.request_sync(PageMode::Reset);
        app.apply_sync_update(SyncUpdate::LocalLoaded {
            characters: vec![character("1", "Harry Potter", "Gryffindor")],
            page_mode: PageMode::Reset,
        });
        app.apply_task_event(task(TaskKind::Sync, TaskOutcome::Synced(SyncOutcome::Offline)));

        assert_eq!(app.catalog.master().len(), 1);
        assert_eq!(app.sync_status.label(), "Offline mode");
        assert_eq!(
            app.house_options.named,
            vec!["Gryffindor".to_string()]
        );
    }

    #[test]
    fn test_vanished_house_filter_falls_back_to_any() {
        let mut app = App::new(test_config());
        app.apply_sync_update(SyncUpdate::LocalLoaded {
            characters: vec![character("1", "Draco", "Slytherin")],
            page_mode: PageMode::Reset,
        });
        app.handle_action(Action::CycleHouse);
        assert_eq!(app.catalog.criteria().house, HouseFilter::Named("Slytherin".to_string()));

        app.apply_sync_update(SyncUpdate::LocalLoaded {
            characters: vec![character("2", "Luna", "Ravenclaw")],
            page_mode: PageMode::Preserve,
        });
        assert_eq!(app.catalog.criteria().house, HouseFilter::Any);
        assert_eq!(app.catalog.filtered_len(), 1);
    }

    #[test]
    fn test_restored_page_applied_after_first_load() {
        let mut app = App::new(test_config());
        app.restore(PersistedState {
            active_view: View::Editor,
            criteria: Default::default(),
            page: 1,
        });
        assert_eq!(app.active_view, View::Catalog);

        let records = (0..30)
            .map(|i| character(&i.to_string(), &format!("Wizard {}", i), "Hufflepuff"))
            .collect();
        app.apply_sync_update(SyncUpdate::LocalLoaded {
            characters: records,
            page_mode: PageMode::Reset,
        });
        assert_eq!(app.catalog.current_page(), 1);
        assert_eq!(app.persisted_state().page, 1);
    }

    #[test]
    fn test_save_requires_login_and_name() {
        let mut app = App::new(test_config());
        app.active_view = View::Editor;
        app.editor = EditorState::for_new();
        assert!(app.handle_action(Action::Save).is_none());
        assert!(app.notifications.last().unwrap().message.contains("Log in"));

        app.session = Session::new("token", None);
        assert!(app.handle_action(Action::Save).is_none());
        assert_eq!(app.notifications.last().unwrap().level, NotificationLevel::Error);

        EditorField::Name.set(&mut app.editor.draft, "Neville Longbottom".to_string());
        match app.handle_action(Action::Save) {
            Some(Command::Save { id, payload, .. }) => {
                assert!(id.is_none());
                assert_eq!(payload.name, "Neville Longbottom");
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(app.handle_action(Action::Save).is_none());
    }

    #[test]
    fn test_saved_record_is_upserted_and_shown() {
        let mut app = logged_in_app();
        app.editor.saving = true;
        let saved = character("7", "Neville Longbottom", "Gryffindor");
        let follow_up = app.apply_task_event(task(
            TaskKind::Save,
            TaskOutcome::Saved {
                character: saved,
                created: true,
            },
        ));
        assert!(follow_up.is_none());
        assert!(!app.editor.saving);
        assert_eq!(app.active_view, View::Detail);
        assert_eq!(app.detail_character().map(|c| c.name.as_str()), Some("Neville Longbottom"));
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let mut app = logged_in_app();
        app.apply_sync_update(SyncUpdate::LocalLoaded {
            characters: vec![character("1", "Peter Pettigrew", "Gryffindor")],
            page_mode: PageMode::Reset,
        });
        assert!(app.handle_action(Action::DeleteItem).is_none());
        assert!(app.handle_action(Action::MoveDown).is_none());
        assert!(app.pending_delete.is_none());

        app.handle_action(Action::DeleteItem);
        assert_eq!(
            app.handle_action(Action::Confirm),
            Some(Command::Delete { id: "1".to_string() })
        );
        app.apply_task_event(task(TaskKind::Delete, TaskOutcome::Deleted { id: "1".to_string() }));
        assert!(app.catalog.master().is_empty());
    }

    #[test]
    fn test_favorite_toggle_does_not_need_login() {
        let mut app = App::new(test_config());
        app.apply_sync_update(SyncUpdate::LocalLoaded {
            characters: vec![character("1", "Hermione Granger", "Gryffindor")],
            page_mode: PageMode::Reset,
        });
        assert_eq!(
            app.handle_action(Action::ToggleFavorite),
            Some(Command::ToggleFavorite {
                id: "1".to_string(),
                desired: true
            })
        );
        app.apply_task_event(task(
            TaskKind::Favorite,
            TaskOutcome::FavoriteSet {
                id: "1".to_string(),
                favorite: true,
            },
        ));
        assert!(app.catalog.get("1").unwrap().favorite);
    }

    #[test]
    fn test_name_prompt_filters_as_you_type() {
        let mut app = App::new(test_config());
        app.apply_sync_update(SyncUpdate::LocalLoaded {
            characters: vec![
                character("1", "Harry Potter", "Gryffindor"),
                character("2", "Lily Potter", "Gryffindor"),
                character("3", "Severus Snape", "Slytherin"),
            ],
            page_mode: PageMode::Reset,
        });
        app.handle_action(Action::EditNameFilter);
        for c in "POTTER".chars() {
            app.handle_text_input(TextInput::Char(c));
        }
        assert_eq!(app.catalog.filtered_len(), 2);
        app.handle_text_input(TextInput::Submit);
        assert!(app.prompt.is_none());
        assert_eq!(app.catalog.criteria().text, "POTTER");
    }

    #[test]
    fn test_editor_status_toggle_and_died_field() {
        let mut app = logged_in_app();
        app.active_view = View::Editor;
        app.editor = EditorState::for_new();
        app.editor.field = EditorField::ALL
            .iter()
            .position(|f| *f == EditorField::Status)
            .unwrap();
        app.handle_action(Action::Confirm);
        assert_eq!(app.editor.draft.status, STATUS_DECEASED);

        EditorField::Died.set(&mut app.editor.draft, "1981".to_string());
        assert!(app.editor.draft.is_deceased());
    }

    #[test]
    fn test_login_uses_configured_credentials() {
        let mut app = App::new(test_config());
        assert_eq!(
            app.handle_action(Action::ToggleSession),
            Some(Command::Login {
                username: "harry".to_string(),
                password: "alohomora".to_string()
            })
        );
        assert!(!app.config_view.content.contains("alohomora"));
    }

    #[test]
    fn test_escape_goes_back_while_sync_runs() {
        let mut app = logged_in_app();
        assert!(app.request_sync(PageMode::Reset).is_some());
        app.apply_sync_update(SyncUpdate::LocalLoaded {
            characters: vec![character("1", "Luna Lovegood", "Ravenclaw")],
            page_mode: PageMode::Reset,
        });

        assert!(app.handle_action(Action::Select).is_none());
        assert_eq!(app.active_view, View::Detail);
        assert!(app.handle_action(Action::EditItem).is_none());
        assert_eq!(app.active_view, View::Editor);

        assert!(app.handle_action(Action::Cancel).is_none());
        assert_eq!(app.active_view, View::Detail);
        assert!(app.handle_action(Action::Cancel).is_none());
        assert_eq!(app.active_view, View::Catalog);

        assert_eq!(app.handle_action(Action::Cancel), Some(Command::CancelSync));
    }

    #[test]
    fn test_escape_cancels_running_push_from_catalog() {
        let mut app = logged_in_app();
        assert_eq!(app.handle_action(Action::PushSync), Some(Command::PushSync));
        assert_eq!(app.handle_action(Action::Cancel), Some(Command::CancelSync));

        assert!(app
            .apply_task_event(task(TaskKind::Push, TaskOutcome::Cancelled))
            .is_none());
        assert_eq!(app.sync_status, SyncStatus::Idle);
        assert_eq!(app.notifications.last().unwrap().message, "Push cancelled");
        assert!(app.handle_action(Action::Cancel).is_none());
        assert!(matches!(app.handle_action(Action::Refresh), Some(Command::Sync { .. })));
    }

    #[test]
    fn test_saved_draft_carries_normalised_fields() {
        let mut app = logged_in_app();
        app.active_view = View::Editor;
        app.editor = EditorState::for_new();
        EditorField::Name.set(&mut app.editor.draft, "  Cedric Diggory ".to_string());
        app.editor.draft.status = STATUS_DECEASED.to_string();

        let Some(Command::Save { draft, payload, .. }) = app.handle_action(Action::Save) else {
            panic!("expected a save command");
        };
        assert_eq!(draft.name, "Cedric Diggory");
        assert_eq!(draft.died, anuario_core::payload::UNKNOWN_DEATH);
        assert_eq!(draft.image, anuario_core::PLACEHOLDER_IMAGE);
        assert_eq!(draft.died, payload.died);
        assert_eq!(draft.image, payload.image);
        assert!(draft.is_deceased());
    }
}
