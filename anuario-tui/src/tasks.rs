//! Bounded background task runner.
//!
//! Network work runs off the UI loop. At most `max_concurrent` tasks hold a
//! permit at once; every task gets a child of the runner's cancellation
//! token and reports back through the UI event channel.

use crate::events::TuiEvent;
use crate::session::Session;
use crate::sync::SyncOutcome;
use anuario_core::Character;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub type TaskId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Sync,
    Refresh,
    Save,
    Delete,
    Favorite,
    Upload,
    Login,
    Logout,
    Push,
}

impl TaskKind {
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Sync => "sync",
            TaskKind::Refresh => "refresh",
            TaskKind::Save => "save",
            TaskKind::Delete => "delete",
            TaskKind::Favorite => "favorite",
            TaskKind::Upload => "upload",
            TaskKind::Login => "login",
            TaskKind::Logout => "logout",
            TaskKind::Push => "push",
        }
    }
}

/// Result of one background task, applied by the UI loop.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Synced(SyncOutcome),
    Refreshed(Vec<Character>),
    /// The record as saved, carrying the backend id after a create.
    Saved { character: Character, created: bool },
    Deleted { id: String },
    FavoriteSet { id: String, favorite: bool },
    ImageUploaded { id: String },
    LoggedIn(Session),
    LoggedOut,
    Pushed,
    Failed(String),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskEvent {
    pub id: TaskId,
    pub kind: TaskKind,
    pub outcome: TaskOutcome,
}

#[derive(Debug)]
pub struct TaskHandle {
    id: TaskId,
    kind: TaskKind,
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the task to report. Its event has been sent (or the
    /// channel was closed) once this returns.
    pub async fn join(self) {
        if let Err(err) = self.join.await {
            tracing::error!(task = self.id, kind = self.kind.label(), error = %err, "Task panicked");
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskRunner {
    permits: Arc<Semaphore>,
    root: CancellationToken,
    events: mpsc::Sender<TuiEvent>,
    next_id: Arc<AtomicU64>,
}

impl TaskRunner {
    pub fn new(max_concurrent: usize, events: mpsc::Sender<TuiEvent>) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            root: CancellationToken::new(),
            events,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Sender for tasks that stream intermediate updates.
    pub fn events(&self) -> mpsc::Sender<TuiEvent> {
        self.events.clone()
    }

    /// Spawn `work` once a permit is free. The closure receives the task's
    /// own token; the runner also races the future against it, so work
    /// that never checks the token still stops at its next await.
    pub fn spawn<F, Fut>(&self, kind: TaskKind, work: F) -> TaskHandle
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = TaskOutcome> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = self.root.child_token();
        let task_token = token.clone();
        let permits = Arc::clone(&self.permits);
        let events = self.events.clone();

        let join = tokio::spawn(async move {
            let permit = tokio::select! {
                biased;
                _ = task_token.cancelled() => None,
                permit = permits.acquire_owned() => permit.ok(),
            };

            let outcome = match permit {
                None => TaskOutcome::Cancelled,
                Some(_permit) => {
                    tracing::debug!(task = id, kind = kind.label(), "Task started");
                    let fut = work(task_token.clone());
                    tokio::select! {
                        biased;
                        _ = task_token.cancelled() => TaskOutcome::Cancelled,
                        outcome = fut => outcome,
                    }
                }
            };

            match &outcome {
                TaskOutcome::Failed(message) => {
                    tracing::warn!(task = id, kind = kind.label(), error = %message, "Task failed")
                }
                TaskOutcome::Cancelled => {
                    tracing::debug!(task = id, kind = kind.label(), "Task cancelled")
                }
                _ => tracing::debug!(task = id, kind = kind.label(), "Task finished"),
            }

            let _ = events
                .send(TuiEvent::Task(Box::new(TaskEvent { id, kind, outcome })))
                .await;
        });

        TaskHandle {
            id,
            kind,
            token,
            join,
        }
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Cancel every running and queued task.
    pub fn shutdown(&self) {
        tracing::info!("Cancelling background tasks");
        self.root.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }
}
