//! Shared fakes and fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use time::macros::{date, datetime};

use atelier::application::repos::{
    ArtworksRepo, NewProductParams, ProductsRepo, RepoError, UpdateProductParams,
};
use atelier::cache::{ArtworkCache, CacheError, CachedValue};
use atelier::domain::entities::{ArtworkRecord, ProductRecord};

pub fn sample_artwork(id: i64, title: &str) -> ArtworkRecord {
    ArtworkRecord {
        id,
        title: title.to_string(),
        description: None,
        dimensions: None,
        small_image_url: None,
        small_image_width: None,
        small_image_height: None,
        medium_image_url: None,
        medium_image_width: None,
        medium_image_height: None,
        large_image_url: None,
        large_image_width: None,
        large_image_height: None,
        print_url: None,
        produced_on: None,
        original_price: None,
        for_sale: false,
        location: None,
        medium: None,
        categories: None,
        featured: false,
        created_at: datetime!(2024-01-01 00:00 UTC),
        updated_at: datetime!(2024-01-01 00:00 UTC),
        content_hash: None,
    }
}

/// A fully-populated catalog entry used across scenarios.
pub fn christmas_animals() -> ArtworkRecord {
    ArtworkRecord {
        description: Some("A winter scene of forest animals.".to_string()),
        dimensions: Some("24x36".to_string()),
        small_image_url: Some("https://img.example/67-s.jpg".to_string()),
        small_image_width: Some(300),
        small_image_height: Some(450),
        medium_image_url: Some("https://img.example/67-m.jpg".to_string()),
        medium_image_width: Some(600),
        medium_image_height: Some(900),
        large_image_url: Some("https://img.example/67-l.jpg".to_string()),
        large_image_width: Some(1200),
        large_image_height: Some(1800),
        print_url: Some("https://shop.example/prints/67".to_string()),
        produced_on: Some(date!(2023 - 11 - 20)),
        original_price: Some(950.0),
        for_sale: true,
        location: Some("Studio".to_string()),
        medium: Some("Acrylic".to_string()),
        categories: Some("holiday, animals".to_string()),
        featured: true,
        ..sample_artwork(67, "The Christmas Animals")
    }
}

pub fn sample_product(id: i64, artwork_id: i64, display_order: i32) -> ProductRecord {
    ProductRecord {
        id,
        artwork_id,
        description: format!("Print #{id}"),
        category: "prints".to_string(),
        product_url: format!("https://shop.example/products/{id}"),
        price: Some(45.0),
        available: true,
        display_order,
        image_url: None,
        created_at: datetime!(2024-01-01 00:00 UTC),
        updated_at: datetime!(2024-01-01 00:00 UTC),
    }
}

/// In-memory artworks store that counts reads and records hash writes.
#[derive(Default)]
pub struct CountingArtworksRepo {
    pub data: Mutex<Vec<ArtworkRecord>>,
    pub find_by_id_calls: AtomicUsize,
    pub find_by_title_calls: AtomicUsize,
    pub find_all_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub hash_writes: Mutex<Vec<(i64, String)>>,
    pub fail_reads: std::sync::atomic::AtomicBool,
    /// Ids whose hash write reports the row as already gone, simulating a
    /// delete racing the refresh pass.
    pub missing_on_hash_write: Mutex<Vec<i64>>,
}

impl CountingArtworksRepo {
    pub fn with_artworks(artworks: Vec<ArtworkRecord>) -> Self {
        Self {
            data: Mutex::new(artworks),
            ..Self::default()
        }
    }

    pub fn replace(&self, artworks: Vec<ArtworkRecord>) {
        *self.data.lock().unwrap() = artworks;
    }

    pub fn hash_writes(&self) -> Vec<(i64, String)> {
        self.hash_writes.lock().unwrap().clone()
    }

    fn snapshot(&self) -> Result<Vec<ArtworkRecord>, RepoError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepoError::Persistence("injected failure".to_string()));
        }
        Ok(self.data.lock().unwrap().clone())
    }
}

#[async_trait]
impl ArtworksRepo for CountingArtworksRepo {
    async fn find_by_id(&self, id: i64) -> Result<Option<ArtworkRecord>, RepoError> {
        self.find_by_id_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot()?.into_iter().find(|a| a.id == id))
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<ArtworkRecord>, RepoError> {
        self.find_by_title_calls.fetch_add(1, Ordering::SeqCst);
        let folded = title.trim().to_lowercase();
        Ok(self
            .snapshot()?
            .into_iter()
            .find(|a| a.title.to_lowercase() == folded))
    }

    async fn find_all(&self) -> Result<Vec<ArtworkRecord>, RepoError> {
        self.find_all_calls.fetch_add(1, Ordering::SeqCst);
        self.snapshot()
    }

    async fn find_by_medium(&self, medium: &str) -> Result<Vec<ArtworkRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let folded = medium.trim().to_lowercase();
        Ok(self
            .snapshot()?
            .into_iter()
            .filter(|a| {
                a.medium
                    .as_deref()
                    .is_some_and(|m| m.to_lowercase() == folded)
            })
            .collect())
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<ArtworkRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let folded = category.trim().to_lowercase();
        Ok(self
            .snapshot()?
            .into_iter()
            .filter(|a| {
                a.categories.as_deref().is_some_and(|tags| {
                    tags.split(',').any(|tag| tag.trim().to_lowercase() == folded)
                })
            })
            .collect())
    }

    async fn find_featured(&self) -> Result<Vec<ArtworkRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot()?.into_iter().filter(|a| a.featured).collect())
    }

    async fn find_for_sale(&self) -> Result<Vec<ArtworkRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot()?.into_iter().filter(|a| a.for_sale).collect())
    }

    async fn search(&self, term: &str) -> Result<Vec<ArtworkRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let folded = term.trim().to_lowercase();
        Ok(self
            .snapshot()?
            .into_iter()
            .filter(|a| {
                a.title.to_lowercase().contains(&folded)
                    || a.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&folded))
                    || a.categories
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&folded))
            })
            .collect())
    }

    async fn update_hash(&self, id: i64, hash: &str) -> Result<(), RepoError> {
        if self.missing_on_hash_write.lock().unwrap().contains(&id) {
            return Err(RepoError::NotFound);
        }
        let mut data = self.data.lock().unwrap();
        let Some(artwork) = data.iter_mut().find(|a| a.id == id) else {
            return Err(RepoError::NotFound);
        };
        artwork.content_hash = Some(hash.to_string());
        self.hash_writes
            .lock()
            .unwrap()
            .push((id, hash.to_string()));
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<String>, RepoError> {
        let mut categories: Vec<String> = self
            .snapshot()?
            .iter()
            .filter_map(|a| a.categories.as_deref())
            .flat_map(|tags| tags.split(','))
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn list_mediums(&self) -> Result<Vec<String>, RepoError> {
        let mut mediums: Vec<String> = self
            .snapshot()?
            .iter()
            .filter_map(|a| a.medium.clone())
            .collect();
        mediums.sort();
        mediums.dedup();
        Ok(mediums)
    }

    async fn list_dimensions(&self) -> Result<Vec<String>, RepoError> {
        let mut dimensions: Vec<String> = self
            .snapshot()?
            .iter()
            .filter_map(|a| a.dimensions.clone())
            .collect();
        dimensions.sort();
        dimensions.dedup();
        Ok(dimensions)
    }

    async fn list_years(&self) -> Result<Vec<i32>, RepoError> {
        let mut years: Vec<i32> = self
            .snapshot()?
            .iter()
            .filter_map(|a| a.produced_on.map(|d| d.year()))
            .collect();
        years.sort_unstable();
        years.dedup();
        Ok(years)
    }
}

/// In-memory products store counting per-artwork list reads.
#[derive(Default)]
pub struct CountingProductsRepo {
    pub data: Mutex<Vec<ProductRecord>>,
    pub list_for_artwork_calls: AtomicUsize,
    pub next_id: AtomicUsize,
}

impl CountingProductsRepo {
    pub fn with_products(products: Vec<ProductRecord>) -> Self {
        let next = products.iter().map(|p| p.id).max().unwrap_or(0) as usize + 1;
        Self {
            data: Mutex::new(products),
            list_for_artwork_calls: AtomicUsize::new(0),
            next_id: AtomicUsize::new(next),
        }
    }
}

#[async_trait]
impl ProductsRepo for CountingProductsRepo {
    async fn find_by_id(&self, id: i64) -> Result<Option<ProductRecord>, RepoError> {
        Ok(self.data.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn list_for_artwork(
        &self,
        artwork_id: i64,
        only_available: bool,
    ) -> Result<Vec<ProductRecord>, RepoError> {
        self.list_for_artwork_calls.fetch_add(1, Ordering::SeqCst);
        let mut products: Vec<ProductRecord> = self
            .data
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.artwork_id == artwork_id && (!only_available || p.available))
            .cloned()
            .collect();
        products.sort_by_key(|p| (p.display_order, p.id));
        Ok(products)
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<ProductRecord>, RepoError> {
        let folded = category.trim().to_lowercase();
        Ok(self
            .data
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.available && p.category.to_lowercase() == folded)
            .cloned()
            .collect())
    }

    async fn list_categories(&self) -> Result<Vec<String>, RepoError> {
        let mut categories: Vec<String> = self
            .data
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn insert(&self, params: NewProductParams) -> Result<ProductRecord, RepoError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
        let product = ProductRecord {
            id,
            artwork_id: params.artwork_id,
            description: params.description,
            category: params.category,
            product_url: params.product_url,
            price: params.price,
            available: params.available,
            display_order: params.display_order,
            image_url: params.image_url,
            created_at: datetime!(2024-01-01 00:00 UTC),
            updated_at: datetime!(2024-01-01 00:00 UTC),
        };
        self.data.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn update(&self, params: UpdateProductParams) -> Result<ProductRecord, RepoError> {
        let mut data = self.data.lock().unwrap();
        let Some(product) = data.iter_mut().find(|p| p.id == params.id) else {
            return Err(RepoError::NotFound);
        };
        product.description = params.description;
        product.category = params.category;
        product.product_url = params.product_url;
        product.price = params.price;
        product.available = params.available;
        product.display_order = params.display_order;
        product.image_url = params.image_url;
        Ok(product.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut data = self.data.lock().unwrap();
        let before = data.len();
        data.retain(|p| p.id != id);
        if data.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn set_availability(
        &self,
        id: i64,
        available: bool,
    ) -> Result<ProductRecord, RepoError> {
        let mut data = self.data.lock().unwrap();
        let Some(product) = data.iter_mut().find(|p| p.id == id) else {
            return Err(RepoError::NotFound);
        };
        product.available = available;
        Ok(product.clone())
    }
}

/// A cache whose every operation fails, for degradation tests.
pub struct FailingCache;

impl ArtworkCache for FailingCache {
    fn get(&self, _key: &str) -> Result<Option<CachedValue>, CacheError> {
        Err(CacheError::Unavailable("backend down".to_string()))
    }

    fn set(
        &self,
        _key: &str,
        _value: CachedValue,
        _ttl: std::time::Duration,
    ) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("backend down".to_string()))
    }

    fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("backend down".to_string()))
    }

    fn delete_prefix(&self, _prefix: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("backend down".to_string()))
    }

    fn hash_get(&self, _map: &str, _field: &str) -> Result<Option<i64>, CacheError> {
        Err(CacheError::Unavailable("backend down".to_string()))
    }

    fn hash_put(&self, _map: &str, _field: &str, _value: i64) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("backend down".to_string()))
    }

    fn clear(&self) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("backend down".to_string()))
    }
}
