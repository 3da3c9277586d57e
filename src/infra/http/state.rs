use std::sync::Arc;

use crate::application::artworks::ArtworkService;
use crate::application::products::ProductService;
use crate::infra::db::PostgresRepositories;

#[derive(Clone)]
pub struct ApiState {
    pub artworks: Arc<ArtworkService>,
    pub products: Arc<ProductService>,
    pub repositories: PostgresRepositories,
}

impl ApiState {
    pub fn new(
        artworks: Arc<ArtworkService>,
        products: Arc<ProductService>,
        repositories: PostgresRepositories,
    ) -> Self {
        Self {
            artworks,
            products,
            repositories,
        }
    }
}
