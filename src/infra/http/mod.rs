//! HTTP surface: versioned JSON API plus a health endpoint.

pub mod error;
pub mod handlers;
pub mod state;

use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use tracing::info;

use state::ApiState;

pub fn build_router(state: ApiState) -> Router {
    let artworks = Router::new()
        .route("/", get(handlers::list_artworks))
        .route("/featured", get(handlers::list_featured))
        .route("/for-sale", get(handlers::list_for_sale))
        .route("/search", get(handlers::search_artworks))
        .route("/medium/{medium}", get(handlers::list_by_medium))
        .route("/category/{category}", get(handlers::list_by_category))
        .route("/title/{title}", get(handlers::get_artwork_by_title))
        .route("/{id}", get(handlers::get_artwork))
        .route(
            "/{id}/products",
            get(handlers::list_artwork_products).post(handlers::create_product),
        );

    let products = Router::new()
        .route(
            "/category/{category}",
            get(handlers::list_products_by_category),
        )
        .route(
            "/{id}",
            get(handlers::get_product)
                .patch(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route(
            "/{id}/availability",
            post(handlers::toggle_product_availability),
        );

    let meta = Router::new()
        .route("/categories", get(handlers::list_categories))
        .route("/mediums", get(handlers::list_mediums))
        .route("/dimensions", get(handlers::list_dimensions))
        .route("/years", get(handlers::list_years))
        .route(
            "/product-categories",
            get(handlers::list_product_categories),
        );

    let admin = Router::new().route("/cache/evict", post(handlers::evict_caches));

    Router::new()
        .nest("/api/v1/artworks", artworks)
        .nest("/api/v1/products", products)
        .nest("/api/v1/meta", meta)
        .nest("/api/v1/admin", admin)
        .route("/healthz", get(handlers::healthz))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = std::time::Instant::now();
    let response = next.run(request).await;
    info!(
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}
