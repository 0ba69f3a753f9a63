//! Anuario TUI entry point.

use anuario_core::PageMode;
use anuario_tui::api_client::{ApiClientError, RestClient};
use anuario_tui::config::TuiConfig;
use anuario_tui::error::TuiError;
use anuario_tui::events::TuiEvent;
use anuario_tui::keys::{map_key, map_text_input};
use anuario_tui::logging;
use anuario_tui::notifications::NotificationLevel;
use anuario_tui::persistence;
use anuario_tui::state::{App, Command};
use anuario_tui::sync::{run_sync, SyncOptions};
use anuario_tui::tasks::{TaskHandle, TaskKind, TaskOutcome, TaskRunner};
use anuario_tui::views::render_view;
use crossterm::{
    event::{self, Event as CrosstermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    logging::init(&config)?;
    let api = Arc::new(RestClient::new(&config)?);
    let mut app = App::new(config);
    match persistence::load(&app.config.persistence_path) {
        Ok(Some(state)) => app.restore(state),
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(error = %err, "Ignoring unreadable UI state");
            app.notify(NotificationLevel::Warning, format!("Saved state ignored: {}", err));
        }
    }

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard {};

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    let runner = TaskRunner::new(app.config.tasks.max_concurrent, event_tx.clone());
    let mut dispatcher = Dispatcher {
        api,
        runner: runner.clone(),
        sync_task: None,
    };

    spawn_input_reader(event_tx.clone());
    initialize_app(&mut app, &mut dispatcher);

    let tick_rate = Duration::from_millis(app.config.refresh_interval_ms);
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {
                let _ = event_tx.try_send(TuiEvent::Tick);
            }
            Some(event) = event_rx.recv() => {
                if handle_event(&mut app, &mut dispatcher, event) {
                    break;
                }
            }
        }
    }

    runner.shutdown();
    if let Err(err) = persistence::save(&app.config.persistence_path, &app.persisted_state()) {
        tracing::error!(error = %err, "Failed to save UI state");
    }
    tracing::info!("Exiting");

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let sent = match evt {
                    CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                        sender.blocking_send(TuiEvent::Input(key))
                    }
                    CrosstermEvent::Resize(width, height) => {
                        sender.blocking_send(TuiEvent::Resize { width, height })
                    }
                    _ => Ok(()),
                };
                if sent.is_err() {
                    break;
                }
            }
        }
    });
}

/// Log in with configured credentials, then run the startup sync.
fn initialize_app(app: &mut App, dispatcher: &mut Dispatcher) {
    if let (Some(username), Some(password)) =
        (app.config.auth.username.clone(), app.config.auth.password.clone())
    {
        dispatcher.dispatch(app, Command::Login { username, password });
    }
    if app.config.sync.sync_on_startup {
        if let Some(command) = app.request_sync(PageMode::Reset) {
            dispatcher.dispatch(app, command);
        }
    }
}

fn handle_event(app: &mut App, dispatcher: &mut Dispatcher, event: TuiEvent) -> bool {
    let command = match event {
        TuiEvent::Input(key) => {
            if app.prompt.is_some() {
                map_text_input(key).and_then(|input| app.handle_text_input(input))
            } else {
                map_key(key).and_then(|action| app.handle_action(action))
            }
        }
        TuiEvent::Sync(update) => {
            app.apply_sync_update(update);
            None
        }
        TuiEvent::Task(event) => {
            if matches!(event.kind, TaskKind::Sync | TaskKind::Push)
                && dispatcher.sync_task.as_ref().map(TaskHandle::id) == Some(event.id)
            {
                dispatcher.sync_task = None;
            }
            app.apply_task_event(*event)
        }
        TuiEvent::Resize { .. } | TuiEvent::Tick => None,
    };

    match command {
        Some(command) => dispatcher.dispatch(app, command),
        None => false,
    }
}

/// Runs [`Command`]s on the task runner.
struct Dispatcher {
    api: Arc<RestClient>,
    runner: TaskRunner,
    /// Running sync or push, the target of `CancelSync`.
    sync_task: Option<TaskHandle>,
}

impl Dispatcher {
    /// Returns true when the app should quit.
    fn dispatch(&mut self, app: &App, command: Command) -> bool {
        let api = Arc::clone(&self.api);
        let session = app.session.clone();

        match command {
            Command::Quit => return true,
            Command::CancelSync => {
                if let Some(handle) = &self.sync_task {
                    handle.cancel();
                }
            }
            Command::Sync { page_mode } => {
                let options = SyncOptions::from_config(&app.config, page_mode);
                let events = self.runner.events();
                let handle = self.runner.spawn(TaskKind::Sync, move |token| async move {
                    let outcome = run_sync(api.as_ref(), &session, &options, &events, &token).await;
                    TaskOutcome::Synced(outcome)
                });
                self.sync_task = Some(handle);
            }
            Command::PushSync => {
                let handle = self.runner.spawn(TaskKind::Push, move |_| async move {
                    match api.full_sync(&session).await {
                        Ok(()) => TaskOutcome::Pushed,
                        Err(err) => TaskOutcome::Failed(err.to_string()),
                    }
                });
                self.sync_task = Some(handle);
            }
            Command::Refetch => {
                self.runner.spawn(TaskKind::Refresh, move |_| async move {
                    match api.fetch_characters(&session).await {
                        Ok(characters) => TaskOutcome::Refreshed(characters),
                        Err(ApiClientError::Status { status, .. }) => {
                            tracing::warn!(status, "Character list unavailable");
                            TaskOutcome::Refreshed(Vec::new())
                        }
                        Err(err) => TaskOutcome::Failed(err.to_string()),
                    }
                });
            }
            Command::Save { id, mut draft, payload } => {
                self.runner.spawn(TaskKind::Save, move |_| async move {
                    let result = match id {
                        Some(id) => api
                            .update_character(&session, &id, &payload)
                            .await
                            .map(|()| false),
                        None => api.create_character(&session, &payload).await.map(|new_id| {
                            draft.id = new_id.unwrap_or_default();
                            true
                        }),
                    };
                    match result {
                        Ok(created) => TaskOutcome::Saved {
                            character: draft,
                            created,
                        },
                        Err(err) => TaskOutcome::Failed(err.to_string()),
                    }
                });
            }
            Command::Delete { id } => {
                self.runner.spawn(TaskKind::Delete, move |_| async move {
                    match api.delete_character(&session, &id).await {
                        Ok(()) => TaskOutcome::Deleted { id },
                        Err(err) => TaskOutcome::Failed(err.to_string()),
                    }
                });
            }
            Command::ToggleFavorite { id, desired } => {
                self.runner.spawn(TaskKind::Favorite, move |_| async move {
                    match api.toggle_favorite(&session, &id, Some(desired)).await {
                        Ok(reported) => TaskOutcome::FavoriteSet {
                            id,
                            favorite: reported.unwrap_or(desired),
                        },
                        Err(err) => TaskOutcome::Failed(err.to_string()),
                    }
                });
            }
            Command::UploadImage { id, path } => {
                self.runner.spawn(TaskKind::Upload, move |_| async move {
                    match api.upload_image_file(&session, &id, &path).await {
                        Ok(()) => TaskOutcome::ImageUploaded { id },
                        Err(err) => TaskOutcome::Failed(err.to_string()),
                    }
                });
            }
            Command::Login { username, password } => {
                self.runner.spawn(TaskKind::Login, move |_| async move {
                    match api.login(&username, &password).await {
                        Ok(session) => TaskOutcome::LoggedIn(session),
                        Err(err) => TaskOutcome::Failed(err.to_string()),
                    }
                });
            }
            Command::Logout => {
                self.runner.spawn(TaskKind::Logout, move |_| async move {
                    if let Err(err) = api.logout(&session).await {
                        tracing::warn!(error = %err, "Logout request failed, clearing session anyway");
                    }
                    TaskOutcome::LoggedOut
                });
            }
        }
        false
    }
}
