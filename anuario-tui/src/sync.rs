//! Catalog synchronization flow.
//!
//! One sync runs four steps: load the backend's local data, ask it to pull
//! from upstream, poll the background image cache until it settles, then
//! fetch the refreshed list. Intermediate results are streamed to the UI as
//! [`SyncUpdate`]s; the final result is the returned [`SyncOutcome`].

use crate::api_client::{ApiClientError, CatalogSource};
use crate::config::TuiConfig;
use crate::events::TuiEvent;
use crate::session::Session;
use anuario_core::{Character, PageMode};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub poll_interval: Duration,
    /// Consecutive missing statuses before the poll loop stops waiting.
    pub max_missed_status: u32,
    /// How the catalog page is treated when the lists are replaced.
    pub page_mode: PageMode,
}

impl SyncOptions {
    pub fn from_config(config: &TuiConfig, page_mode: PageMode) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            max_missed_status: config.sync.max_missed_status,
            page_mode,
        }
    }
}

/// Progress streamed while a sync is running.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncUpdate {
    LocalLoaded {
        characters: Vec<Character>,
        page_mode: PageMode,
    },
    ImageProgress {
        current: u64,
        total: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Pull succeeded and the refreshed list was fetched.
    Completed {
        characters: Vec<Character>,
        page_mode: PageMode,
    },
    /// The backend could not pull; the local data stays in place.
    Offline,
    /// Loading the list failed.
    Failed(String),
    Cancelled,
}

pub async fn run_sync<S>(
    source: &S,
    session: &Session,
    options: &SyncOptions,
    events: &mpsc::Sender<TuiEvent>,
    cancel: &CancellationToken,
) -> SyncOutcome
where
    S: CatalogSource + ?Sized,
{
    tracing::info!("Sync started");

    // 1. Local data, rendered immediately.
    let local = match until_cancelled(cancel, fetch_or_empty(source, session)).await {
        None => return SyncOutcome::Cancelled,
        Some(Ok(characters)) => characters,
        Some(Err(err)) => {
            tracing::error!(error = %err, "Local load failed");
            return SyncOutcome::Failed(err.to_string());
        }
    };
    tracing::info!(count = local.len(), "Local data loaded");
    let _ = events
        .send(TuiEvent::Sync(SyncUpdate::LocalLoaded {
            characters: local,
            page_mode: options.page_mode,
        }))
        .await;

    // 2. Upstream pull.
    match until_cancelled(cancel, source.trigger_pull(session)).await {
        None => return SyncOutcome::Cancelled,
        Some(Ok(())) => {}
        Some(Err(err)) => {
            tracing::warn!(error = %err, "Pull failed, staying offline");
            return SyncOutcome::Offline;
        }
    }

    // 3. Wait for the image cache.
    if !poll_image_sync(source, session, options, events, cancel).await {
        return SyncOutcome::Cancelled;
    }

    // 4. Final refetch.
    match until_cancelled(cancel, fetch_or_empty(source, session)).await {
        None => SyncOutcome::Cancelled,
        Some(Ok(characters)) => {
            tracing::info!(count = characters.len(), "Sync completed");
            SyncOutcome::Completed {
                characters,
                page_mode: options.page_mode,
            }
        }
        Some(Err(err)) => {
            tracing::error!(error = %err, "Refetch after pull failed");
            SyncOutcome::Failed(err.to_string())
        }
    }
}

/// Poll until the backend reports the image sync idle, or until too many
/// consecutive polls return no status. Returns false when cancelled.
async fn poll_image_sync<S>(
    source: &S,
    session: &Session,
    options: &SyncOptions,
    events: &mpsc::Sender<TuiEvent>,
    cancel: &CancellationToken,
) -> bool
where
    S: CatalogSource + ?Sized,
{
    let mut missed = 0u32;
    loop {
        let Some(status) = until_cancelled(cancel, source.image_sync_status(session)).await else {
            return false;
        };

        match status {
            Ok(status) => {
                missed = 0;
                let _ = events
                    .send(TuiEvent::Sync(SyncUpdate::ImageProgress {
                        current: status.current,
                        total: status.total,
                    }))
                    .await;
                if !status.running {
                    tracing::debug!(total = status.total, errors = status.errors, "Image sync idle");
                    return true;
                }
            }
            Err(err) => {
                missed += 1;
                tracing::debug!(missed, error = %err, "No image sync status");
                if missed >= options.max_missed_status {
                    tracing::warn!(missed, "Giving up on image sync status");
                    return true;
                }
            }
        }

        if until_cancelled(cancel, tokio::time::sleep(options.poll_interval))
            .await
            .is_none()
        {
            return false;
        }
    }
}

/// A non-success list response degrades to an empty list; transport and
/// decode failures are returned.
async fn fetch_or_empty<S>(source: &S, session: &Session) -> Result<Vec<Character>, ApiClientError>
where
    S: CatalogSource + ?Sized,
{
    match source.fetch_characters(session).await {
        Err(ApiClientError::Status { status, body }) => {
            tracing::warn!(status, body = %body, "Character list unavailable");
            Ok(Vec::new())
        }
        other => other,
    }
}

async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = fut => Some(output),
    }
}
