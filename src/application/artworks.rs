//! Artwork query service: the single entry point for catalog reads.
//!
//! Every read follows the same shape: validate, build the cache key, try
//! the cache, fall back to the store, populate best-effort, return. Cache
//! trouble degrades to direct store reads; store trouble surfaces to the
//! caller. The refresh path (driven by the cron worker) is the only writer
//! of the `content_hash` column.

use std::sync::Arc;

use metrics::{counter, histogram};
use tracing::{debug, info, warn};

use crate::application::error::AppError;
use crate::application::repos::{ArtworksRepo, RepoError};
use crate::cache::{ArtworkCache, CacheConfig, CachedValue, keys};
use crate::domain::entities::ArtworkRecord;
use crate::domain::hash::content_hash;

/// Outcome of one refresh pass, for logging and the one-shot CLI command.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshSummary {
    /// Artworks loaded from the store.
    pub artworks: usize,
    /// Rows whose persisted hash was rewritten.
    pub updated_hashes: usize,
}

pub struct ArtworkService {
    repo: Arc<dyn ArtworksRepo>,
    cache: Arc<dyn ArtworkCache>,
    config: CacheConfig,
}

impl ArtworkService {
    pub fn new(
        repo: Arc<dyn ArtworksRepo>,
        cache: Arc<dyn ArtworkCache>,
        config: CacheConfig,
    ) -> Self {
        Self {
            repo,
            cache,
            config,
        }
    }

    // ========================================================================
    // Single-artwork reads
    // ========================================================================

    pub async fn artwork_by_id(&self, id: i64) -> Result<Option<ArtworkRecord>, AppError> {
        if id <= 0 {
            return Err(AppError::validation("artwork id must be positive"));
        }

        let key = keys::artwork(id);
        if let Some(CachedValue::Artwork(artwork)) = self.cache_get(&key) {
            return Ok(Some(artwork));
        }

        let Some(mut artwork) = self.repo.find_by_id(id).await? else {
            return Ok(None);
        };
        artwork.content_hash = Some(content_hash(&artwork));
        self.cache_set(&key, CachedValue::Artwork(artwork.clone()));
        Ok(Some(artwork))
    }

    pub async fn artwork_by_title(&self, title: &str) -> Result<Option<ArtworkRecord>, AppError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("title must not be empty"));
        }

        let folded = keys::fold(trimmed);

        // Fast path: the title → id side index points at the per-id entry.
        if let Some(id) = self.title_index_get(&folded) {
            if let Some(artwork) = self.artwork_by_id(id).await? {
                return Ok(Some(artwork));
            }
            // Index pointed at a row that no longer resolves; fall through
            // to the store so the entry gets rebuilt or forgotten.
        }

        let key = keys::artwork_title(trimmed);
        if let Some(CachedValue::Artwork(artwork)) = self.cache_get(&key) {
            return Ok(Some(artwork));
        }

        let Some(mut artwork) = self.repo.find_by_title(trimmed).await? else {
            return Ok(None);
        };
        artwork.content_hash = Some(content_hash(&artwork));
        self.cache_set(&key, CachedValue::Artwork(artwork.clone()));
        self.cache_set(
            &keys::artwork(artwork.id),
            CachedValue::Artwork(artwork.clone()),
        );
        self.title_index_put(&folded, artwork.id);
        Ok(Some(artwork))
    }

    // ========================================================================
    // List reads
    // ========================================================================

    pub async fn all_artworks(&self) -> Result<Vec<ArtworkRecord>, AppError> {
        self.cached_list(keys::artworks_all(), || self.repo.find_all())
            .await
    }

    pub async fn featured_artworks(&self) -> Result<Vec<ArtworkRecord>, AppError> {
        self.cached_list(keys::artworks_featured(), || self.repo.find_featured())
            .await
    }

    pub async fn artworks_for_sale(&self) -> Result<Vec<ArtworkRecord>, AppError> {
        self.cached_list(keys::artworks_for_sale(), || self.repo.find_for_sale())
            .await
    }

    pub async fn artworks_by_medium(&self, medium: &str) -> Result<Vec<ArtworkRecord>, AppError> {
        let trimmed = medium.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("medium must not be empty"));
        }
        self.cached_list(keys::artworks_by_medium(trimmed), || {
            self.repo.find_by_medium(trimmed)
        })
        .await
    }

    pub async fn artworks_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<ArtworkRecord>, AppError> {
        let trimmed = category.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("category must not be empty"));
        }
        self.cached_list(keys::artworks_by_category(trimmed), || {
            self.repo.find_by_category(trimmed)
        })
        .await
    }

    pub async fn search_artworks(&self, term: &str) -> Result<Vec<ArtworkRecord>, AppError> {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("search term must not be empty"));
        }
        self.cached_list(keys::artworks_search(trimmed), || self.repo.search(trimmed))
            .await
    }

    // ========================================================================
    // Distinct-value listings (uncached store passthrough)
    // ========================================================================

    pub async fn categories(&self) -> Result<Vec<String>, AppError> {
        Ok(self.repo.list_categories().await?)
    }

    pub async fn mediums(&self) -> Result<Vec<String>, AppError> {
        Ok(self.repo.list_mediums().await?)
    }

    pub async fn dimensions(&self) -> Result<Vec<String>, AppError> {
        Ok(self.repo.list_dimensions().await?)
    }

    pub async fn years(&self) -> Result<Vec<i32>, AppError> {
        Ok(self.repo.list_years().await?)
    }

    // ========================================================================
    // Eviction and scheduled refresh
    // ========================================================================

    /// Drop every artwork- and product-namespaced entry. Deliberately blunt:
    /// used by the admin action and at the top of each refresh tick.
    pub fn evict_all_caches(&self) -> Result<(), AppError> {
        self.cache.delete_prefix(keys::ARTWORK_PREFIX)?;
        self.cache.delete_prefix(keys::ARTWORK_LIST_PREFIX)?;
        self.cache.delete_prefix(keys::PRODUCT_PREFIX)?;
        info!("evicted all artwork caches");
        Ok(())
    }

    /// One refresh pass: evict, reload, recompute hashes, write back the
    /// ones that changed, repopulate per-id entries and the title index.
    ///
    /// A failure partway through leaves at worst an evicted cache, which
    /// reads fall through transparently; the caller (the cron worker) logs
    /// and waits for the next tick.
    pub async fn refresh(&self) -> Result<RefreshSummary, AppError> {
        let started = std::time::Instant::now();
        self.evict_all_caches()?;

        let artworks = self.repo.find_all().await?;
        let mut summary = RefreshSummary {
            artworks: artworks.len(),
            ..RefreshSummary::default()
        };

        for mut artwork in artworks {
            let fresh = content_hash(&artwork);
            let stale = artwork.hash_is_sentinel()
                || artwork.content_hash.as_deref() != Some(fresh.as_str());
            if stale {
                match self.repo.update_hash(artwork.id, &fresh).await {
                    Ok(()) => {
                        artwork.content_hash = Some(fresh);
                        summary.updated_hashes += 1;
                    }
                    Err(RepoError::NotFound) => {
                        // Row deleted between find_all and the write; it has
                        // nothing left to cache.
                        warn!(artwork_id = artwork.id, "artwork vanished mid-refresh; skipping");
                        continue;
                    }
                    Err(err) => return Err(err.into()),
                }
            }

            self.cache_set(
                &keys::artwork(artwork.id),
                CachedValue::Artwork(artwork.clone()),
            );
            self.title_index_put(&keys::fold(&artwork.title), artwork.id);
        }

        counter!("atelier_refresh_total").increment(1);
        counter!("atelier_refresh_hash_updates_total").increment(summary.updated_hashes as u64);
        histogram!("atelier_refresh_duration_ms")
            .record(started.elapsed().as_secs_f64() * 1000.0);

        Ok(summary)
    }

    // ========================================================================
    // Cache plumbing (soft failures only)
    // ========================================================================

    fn cache_get(&self, key: &str) -> Option<CachedValue> {
        if !self.config.enabled {
            return None;
        }
        match self.cache.get(key) {
            Ok(hit) => hit,
            Err(err) => {
                warn!(key, error = %err, "cache read failed; falling through to store");
                None
            }
        }
    }

    fn cache_set(&self, key: &str, value: CachedValue) {
        if !self.config.enabled {
            return;
        }
        if let Err(err) = self.cache.set(key, value, self.config.ttl()) {
            warn!(key, error = %err, "cache populate failed; serving from store only");
        }
    }

    fn title_index_get(&self, folded_title: &str) -> Option<i64> {
        if !self.config.enabled {
            return None;
        }
        match self.cache.hash_get(keys::TITLE_INDEX, folded_title) {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "title index read failed; falling through");
                None
            }
        }
    }

    fn title_index_put(&self, folded_title: &str, id: i64) {
        if !self.config.enabled {
            return;
        }
        if let Err(err) = self.cache.hash_put(keys::TITLE_INDEX, folded_title, id) {
            warn!(error = %err, "title index populate failed");
        }
    }

    async fn cached_list<'a, F, Fut>(
        &'a self,
        key: String,
        load: F,
    ) -> Result<Vec<ArtworkRecord>, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<ArtworkRecord>, crate::application::repos::RepoError>>
            + 'a,
    {
        if let Some(CachedValue::Artworks(artworks)) = self.cache_get(&key) {
            debug!(key, count = artworks.len(), "list served from cache");
            return Ok(artworks);
        }

        let artworks = load().await?;
        self.cache_set(&key, CachedValue::Artworks(artworks.clone()));
        Ok(artworks)
    }
}
