//! Product service: sellable items tied to artworks.
//!
//! Reads of the per-artwork product list go through the cache; everything
//! else is a store passthrough. Admin writes evict the owning artwork's
//! product entry so the next read is fresh.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::error::AppError;
use crate::application::repos::{ArtworksRepo, NewProductParams, ProductsRepo, RepoError, UpdateProductParams};
use crate::cache::{ArtworkCache, CacheConfig, CachedValue, keys};
use crate::domain::entities::ProductRecord;

pub struct ProductService {
    repo: Arc<dyn ProductsRepo>,
    artworks: Arc<dyn ArtworksRepo>,
    cache: Arc<dyn ArtworkCache>,
    config: CacheConfig,
}

impl ProductService {
    pub fn new(
        repo: Arc<dyn ProductsRepo>,
        artworks: Arc<dyn ArtworksRepo>,
        cache: Arc<dyn ArtworkCache>,
        config: CacheConfig,
    ) -> Self {
        Self {
            repo,
            artworks,
            cache,
            config,
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Available products for an artwork, display order ascending.
    pub async fn products_for_artwork(
        &self,
        artwork_id: i64,
    ) -> Result<Vec<ProductRecord>, AppError> {
        if artwork_id <= 0 {
            return Err(AppError::validation("artwork id must be positive"));
        }

        let key = keys::products_for_artwork(artwork_id);
        if self.config.enabled {
            match self.cache.get(&key) {
                Ok(Some(CachedValue::Products(products))) => return Ok(products),
                Ok(_) => {}
                Err(err) => {
                    warn!(key, error = %err, "cache read failed; falling through to store");
                }
            }
        }

        let products = self.repo.list_for_artwork(artwork_id, true).await?;
        if self.config.enabled {
            if let Err(err) = self.cache.set(
                &key,
                CachedValue::Products(products.clone()),
                self.config.ttl(),
            ) {
                warn!(key, error = %err, "cache populate failed");
            }
        }
        Ok(products)
    }

    pub async fn product_by_id(&self, id: i64) -> Result<Option<ProductRecord>, AppError> {
        if id <= 0 {
            return Err(AppError::validation("product id must be positive"));
        }
        Ok(self.repo.find_by_id(id).await?)
    }

    pub async fn products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<ProductRecord>, AppError> {
        let trimmed = category.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("category must not be empty"));
        }
        Ok(self.repo.list_by_category(trimmed).await?)
    }

    pub async fn product_categories(&self) -> Result<Vec<String>, AppError> {
        Ok(self.repo.list_categories().await?)
    }

    // ========================================================================
    // Admin writes
    // ========================================================================

    pub async fn add_product(&self, params: NewProductParams) -> Result<ProductRecord, AppError> {
        if params.artwork_id <= 0 {
            return Err(AppError::validation("artwork id must be positive"));
        }
        if params.description.trim().is_empty() {
            return Err(AppError::validation("product description must not be empty"));
        }
        if params.product_url.trim().is_empty() {
            return Err(AppError::validation("product url must not be empty"));
        }

        // The FK would catch this too, but a clean not-found beats a
        // constraint violation surfacing as a 409.
        if self.artworks.find_by_id(params.artwork_id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        let product = self.repo.insert(params).await?;
        info!(product_id = product.id, artwork_id = product.artwork_id, "product added");
        self.evict_product_list(product.artwork_id);
        Ok(product)
    }

    pub async fn update_product(
        &self,
        params: UpdateProductParams,
    ) -> Result<ProductRecord, AppError> {
        if params.id <= 0 {
            return Err(AppError::validation("product id must be positive"));
        }
        let product = self.repo.update(params).await?;
        info!(product_id = product.id, "product updated");
        self.evict_product_list(product.artwork_id);
        Ok(product)
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), AppError> {
        if id <= 0 {
            return Err(AppError::validation("product id must be positive"));
        }
        let Some(product) = self.repo.find_by_id(id).await? else {
            return Err(AppError::Repo(RepoError::NotFound));
        };
        self.repo.delete(id).await?;
        info!(product_id = id, artwork_id = product.artwork_id, "product deleted");
        self.evict_product_list(product.artwork_id);
        Ok(())
    }

    pub async fn toggle_availability(&self, id: i64) -> Result<ProductRecord, AppError> {
        if id <= 0 {
            return Err(AppError::validation("product id must be positive"));
        }
        let Some(product) = self.repo.find_by_id(id).await? else {
            return Err(AppError::Repo(RepoError::NotFound));
        };
        let product = self.repo.set_availability(id, !product.available).await?;
        info!(product_id = id, available = product.available, "product availability toggled");
        self.evict_product_list(product.artwork_id);
        Ok(product)
    }

    fn evict_product_list(&self, artwork_id: i64) {
        if !self.config.enabled {
            return;
        }
        let key = keys::products_for_artwork(artwork_id);
        if let Err(err) = self.cache.delete(&key) {
            warn!(key, error = %err, "product cache eviction failed");
        }
    }
}
