//! Cron job refreshing the artwork cache and persisted content hashes.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use apalis::prelude::*;
use cron::Schedule;

use crate::application::artworks::ArtworkService;
use crate::application::error::AppError;

/// Marker struct for the cron-triggered refresh.
/// Must implement `From<chrono::DateTime<chrono::Utc>>` for apalis-cron
/// compatibility.
#[derive(Default, Debug, Clone)]
pub struct RefreshCacheJob;

impl From<chrono::DateTime<chrono::Utc>> for RefreshCacheJob {
    fn from(_: chrono::DateTime<chrono::Utc>) -> Self {
        Self
    }
}

/// Context for the refresh worker. The busy flag makes overlapping ticks
/// skip rather than queue: a slow pass over a large catalog must not stack
/// a second pass behind it.
#[derive(Clone)]
pub struct RefreshContext {
    artworks: Arc<ArtworkService>,
    busy: Arc<AtomicBool>,
}

impl RefreshContext {
    pub fn new(artworks: Arc<ArtworkService>) -> Self {
        Self {
            artworks,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Claim the tick. Returns false when a previous tick is still running.
    pub fn try_begin(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn finish(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }

    pub fn artworks(&self) -> &Arc<ArtworkService> {
        &self.artworks
    }
}

/// Process one scheduled tick. A failed pass logs and lets the schedule
/// continue; it never takes the worker down.
pub async fn process_refresh_job(
    _job: RefreshCacheJob,
    ctx: Data<RefreshContext>,
) -> Result<(), apalis::prelude::Error> {
    if !ctx.try_begin() {
        tracing::debug!("previous refresh still running; skipping this tick");
        return Ok(());
    }

    let result = ctx.artworks().refresh().await;
    ctx.finish();

    match result {
        Ok(summary) => {
            tracing::info!(
                artworks = summary.artworks,
                updated_hashes = summary.updated_hashes,
                "artwork cache refreshed"
            );
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                "artwork cache refresh failed; reads fall through to the store until the next tick"
            );
        }
    }
    Ok(())
}

/// Parse the configured cron expression for the refresh cadence.
pub fn refresh_schedule(expression: &str) -> Result<Schedule, AppError> {
    Schedule::from_str(expression).map_err(|err| {
        AppError::unexpected(format!("invalid refresh cron `{expression}`: {err}"))
    })
}
