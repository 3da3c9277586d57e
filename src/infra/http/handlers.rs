//! Route handlers. Thin by design: parse, delegate to a service, wrap
//! the result. All policy lives in the application layer.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::application::repos::{NewProductParams, UpdateProductParams};
use crate::domain::entities::{ArtworkRecord, ProductRecord};

use super::error::ApiError;
use super::state::ApiState;

// ============================================================================
// Artworks
// ============================================================================

pub async fn list_artworks(
    State(state): State<ApiState>,
) -> Result<Json<Vec<ArtworkRecord>>, ApiError> {
    Ok(Json(state.artworks.all_artworks().await?))
}

pub async fn list_featured(
    State(state): State<ApiState>,
) -> Result<Json<Vec<ArtworkRecord>>, ApiError> {
    Ok(Json(state.artworks.featured_artworks().await?))
}

pub async fn list_for_sale(
    State(state): State<ApiState>,
) -> Result<Json<Vec<ArtworkRecord>>, ApiError> {
    Ok(Json(state.artworks.artworks_for_sale().await?))
}

pub async fn list_by_medium(
    State(state): State<ApiState>,
    Path(medium): Path<String>,
) -> Result<Json<Vec<ArtworkRecord>>, ApiError> {
    Ok(Json(state.artworks.artworks_by_medium(&medium).await?))
}

pub async fn list_by_category(
    State(state): State<ApiState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<ArtworkRecord>>, ApiError> {
    Ok(Json(state.artworks.artworks_by_category(&category).await?))
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
}

pub async fn search_artworks(
    State(state): State<ApiState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ArtworkRecord>>, ApiError> {
    Ok(Json(state.artworks.search_artworks(&params.q).await?))
}

pub async fn get_artwork(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<ArtworkRecord>, ApiError> {
    state
        .artworks
        .artwork_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("artwork not found"))
}

pub async fn get_artwork_by_title(
    State(state): State<ApiState>,
    Path(title): Path<String>,
) -> Result<Json<ArtworkRecord>, ApiError> {
    state
        .artworks
        .artwork_by_title(&title)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("artwork not found"))
}

pub async fn list_artwork_products(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ProductRecord>>, ApiError> {
    Ok(Json(state.products.products_for_artwork(id).await?))
}

// ============================================================================
// Meta listings
// ============================================================================

pub async fn list_categories(
    State(state): State<ApiState>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.artworks.categories().await?))
}

pub async fn list_mediums(State(state): State<ApiState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.artworks.mediums().await?))
}

pub async fn list_dimensions(
    State(state): State<ApiState>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.artworks.dimensions().await?))
}

pub async fn list_years(State(state): State<ApiState>) -> Result<Json<Vec<i32>>, ApiError> {
    Ok(Json(state.artworks.years().await?))
}

// ============================================================================
// Products
// ============================================================================

pub async fn get_product(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductRecord>, ApiError> {
    state
        .products
        .product_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("product not found"))
}

pub async fn list_products_by_category(
    State(state): State<ApiState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<ProductRecord>>, ApiError> {
    Ok(Json(state.products.products_by_category(&category).await?))
}

pub async fn list_product_categories(
    State(state): State<ApiState>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.products.product_categories().await?))
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub description: String,
    pub category: String,
    pub product_url: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_available() -> bool {
    true
}

pub async fn create_product(
    State(state): State<ApiState>,
    Path(artwork_id): Path<i64>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductRecord>), ApiError> {
    let product = state
        .products
        .add_product(NewProductParams {
            artwork_id,
            description: req.description,
            category: req.category,
            product_url: req.product_url,
            price: req.price,
            available: req.available,
            display_order: req.display_order,
            image_url: req.image_url,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub description: String,
    pub category: String,
    pub product_url: String,
    #[serde(default)]
    pub price: Option<f64>,
    pub available: bool,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub image_url: Option<String>,
}

pub async fn update_product(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductRecord>, ApiError> {
    let product = state
        .products
        .update_product(UpdateProductParams {
            id,
            description: req.description,
            category: req.category,
            product_url: req.product_url,
            price: req.price,
            available: req.available,
            display_order: req.display_order,
            image_url: req.image_url,
        })
        .await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.products.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_product_availability(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductRecord>, ApiError> {
    Ok(Json(state.products.toggle_availability(id).await?))
}

// ============================================================================
// Admin and health
// ============================================================================

#[derive(Serialize)]
pub struct EvictResponse {
    pub evicted: bool,
}

pub async fn evict_caches(State(state): State<ApiState>) -> Result<Json<EvictResponse>, ApiError> {
    state.artworks.evict_all_caches()?;
    Ok(Json(EvictResponse { evicted: true }))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn healthz(State(state): State<ApiState>) -> Result<Json<HealthResponse>, ApiError> {
    if let Err(err) = state.repositories.health_check().await {
        error!(error = %err, "health check failed");
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            super::error::codes::DB_TIMEOUT,
            "database unreachable",
            None,
        ));
    }
    Ok(Json(HealthResponse { status: "ok" }))
}
