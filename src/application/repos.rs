//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{ArtworkRecord, ProductRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Read surface over the artwork store, plus the single autonomous write
/// this crate performs: persisting a recomputed content hash.
#[async_trait]
pub trait ArtworksRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<ArtworkRecord>, RepoError>;

    /// Case-insensitive exact title match.
    async fn find_by_title(&self, title: &str) -> Result<Option<ArtworkRecord>, RepoError>;

    async fn find_all(&self) -> Result<Vec<ArtworkRecord>, RepoError>;

    async fn find_by_medium(&self, medium: &str) -> Result<Vec<ArtworkRecord>, RepoError>;

    async fn find_by_category(&self, category: &str) -> Result<Vec<ArtworkRecord>, RepoError>;

    async fn find_featured(&self) -> Result<Vec<ArtworkRecord>, RepoError>;

    async fn find_for_sale(&self) -> Result<Vec<ArtworkRecord>, RepoError>;

    /// Substring match over title, description, and categories.
    async fn search(&self, term: &str) -> Result<Vec<ArtworkRecord>, RepoError>;

    /// Persist a freshly computed content hash. `NotFound` when the row is
    /// gone (e.g. deleted between `find_all` and the write).
    async fn update_hash(&self, id: i64, hash: &str) -> Result<(), RepoError>;

    async fn list_categories(&self) -> Result<Vec<String>, RepoError>;

    async fn list_mediums(&self) -> Result<Vec<String>, RepoError>;

    async fn list_dimensions(&self) -> Result<Vec<String>, RepoError>;

    async fn list_years(&self) -> Result<Vec<i32>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct NewProductParams {
    pub artwork_id: i64,
    pub description: String,
    pub category: String,
    pub product_url: String,
    pub price: Option<f64>,
    pub available: bool,
    pub display_order: i32,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateProductParams {
    pub id: i64,
    pub description: String,
    pub category: String,
    pub product_url: String,
    pub price: Option<f64>,
    pub available: bool,
    pub display_order: i32,
    pub image_url: Option<String>,
}

#[async_trait]
pub trait ProductsRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<ProductRecord>, RepoError>;

    /// Products for one artwork, display order ascending. When
    /// `only_available` is set, unavailable products are filtered out.
    async fn list_for_artwork(
        &self,
        artwork_id: i64,
        only_available: bool,
    ) -> Result<Vec<ProductRecord>, RepoError>;

    /// Available products in a category, ordered by owning artwork title.
    async fn list_by_category(&self, category: &str) -> Result<Vec<ProductRecord>, RepoError>;

    async fn list_categories(&self) -> Result<Vec<String>, RepoError>;

    async fn insert(&self, params: NewProductParams) -> Result<ProductRecord, RepoError>;

    async fn update(&self, params: UpdateProductParams) -> Result<ProductRecord, RepoError>;

    async fn delete(&self, id: i64) -> Result<(), RepoError>;

    async fn set_availability(&self, id: i64, available: bool)
    -> Result<ProductRecord, RepoError>;
}
