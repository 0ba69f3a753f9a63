//! Scripted in-memory catalog source for sync tests.

use anuario_core::Character;
use anuario_tui::api_client::{ApiClientError, CatalogSource, ImageSyncStatus};
use anuario_tui::session::Session;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays queued responses in order. An exhausted list queue yields an
/// empty list; an exhausted status queue yields no status.
#[derive(Default)]
pub struct ScriptedSource {
    lists: Mutex<VecDeque<Result<Vec<Character>, ApiClientError>>>,
    pull: Mutex<Option<ApiClientError>>,
    statuses: Mutex<VecDeque<Result<ImageSyncStatus, ApiClientError>>>,
    calls: Mutex<Vec<&'static str>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(self, characters: Vec<Character>) -> Self {
        self.push_list(Ok(characters));
        self
    }

    pub fn with_list_error(self, err: ApiClientError) -> Self {
        self.push_list(Err(err));
        self
    }

    pub fn with_pull_error(self, err: ApiClientError) -> Self {
        *self.pull.lock().unwrap() = Some(err);
        self
    }

    pub fn with_status(self, status: ImageSyncStatus) -> Self {
        self.statuses.lock().unwrap().push_back(Ok(status));
        self
    }

    pub fn with_missing_status(self, count: usize) -> Self {
        {
            let mut statuses = self.statuses.lock().unwrap();
            for _ in 0..count {
                statuses.push_back(Err(ApiClientError::InvalidResponse("no status".to_string())));
            }
        }
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    fn push_list(&self, result: Result<Vec<Character>, ApiClientError>) {
        self.lists.lock().unwrap().push_back(result);
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    async fn fetch_characters(&self, _session: &Session) -> Result<Vec<Character>, ApiClientError> {
        self.record("fetch");
        self.lists
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn trigger_pull(&self, _session: &Session) -> Result<(), ApiClientError> {
        self.record("pull");
        match self.pull.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn image_sync_status(&self, _session: &Session) -> Result<ImageSyncStatus, ApiClientError> {
        self.record("status");
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiClientError::InvalidResponse("no status".to_string())))
    }
}

pub fn character(id: &str, name: &str, house: &str) -> Character {
    Character {
        id: id.to_string(),
        name: name.to_string(),
        house: house.to_string(),
        status: "Vivo".to_string(),
        ..Character::default()
    }
}

pub fn running(current: u64, total: u64) -> ImageSyncStatus {
    ImageSyncStatus {
        running: true,
        current,
        total,
        errors: 0,
    }
}

pub fn idle(total: u64) -> ImageSyncStatus {
    ImageSyncStatus {
        running: false,
        current: total,
        total,
        errors: 0,
    }
}
