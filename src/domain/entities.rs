//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::{Date, OffsetDateTime};

/// An artwork in the catalog.
///
/// `content_hash` is derived data: a digest over the displayable fields,
/// maintained by the refresh worker for staleness detection. It is never
/// authoritative and an empty value means "always considered stale".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtworkRecord {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub dimensions: Option<String>,
    pub small_image_url: Option<String>,
    pub small_image_width: Option<i32>,
    pub small_image_height: Option<i32>,
    pub medium_image_url: Option<String>,
    pub medium_image_width: Option<i32>,
    pub medium_image_height: Option<i32>,
    pub large_image_url: Option<String>,
    pub large_image_width: Option<i32>,
    pub large_image_height: Option<i32>,
    pub print_url: Option<String>,
    pub produced_on: Option<Date>,
    pub original_price: Option<f64>,
    pub for_sale: bool,
    pub location: Option<String>,
    /// Free text, e.g. "Acrylic".
    pub medium: Option<String>,
    /// Comma-delimited tag list. Order-insignificant; no normalization.
    pub categories: Option<String>,
    pub featured: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub content_hash: Option<String>,
}

impl ArtworkRecord {
    /// Whether the persisted hash should be treated as stale regardless of
    /// the freshly computed digest.
    pub fn hash_is_sentinel(&self) -> bool {
        self.content_hash.as_deref().is_none_or(str::is_empty)
    }
}

/// A sellable product tied to an artwork (print size, merchandise, the
/// original itself). Deleting the artwork deletes its products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub id: i64,
    pub artwork_id: i64,
    pub description: String,
    pub category: String,
    pub product_url: String,
    pub price: Option<f64>,
    pub available: bool,
    /// Ascending sort key; lower values display first.
    pub display_order: i32,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
