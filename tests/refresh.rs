//! Scheduled refresh semantics: hash reconciliation, write suppression,
//! out-of-band edit detection, and the overlap guard.

mod support;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use atelier::application::artworks::ArtworkService;
use atelier::application::jobs::RefreshContext;
use atelier::cache::{CacheConfig, MemoryCache};
use atelier::domain::hash::content_hash;

use support::{CountingArtworksRepo, christmas_animals, sample_artwork};

fn service(repo: Arc<CountingArtworksRepo>) -> Arc<ArtworkService> {
    let config = CacheConfig::default();
    let cache = Arc::new(MemoryCache::new(&config));
    Arc::new(ArtworkService::new(repo, cache, config))
}

#[tokio::test]
async fn first_refresh_writes_hashes_for_unhashed_rows() {
    let repo = Arc::new(CountingArtworksRepo::with_artworks(vec![
        christmas_animals(),
        sample_artwork(68, "Quiet Harbor"),
    ]));
    let service = service(repo.clone());

    let summary = service.refresh().await.unwrap();
    assert_eq!(summary.artworks, 2);
    assert_eq!(summary.updated_hashes, 2);

    let writes = repo.hash_writes();
    assert_eq!(writes.len(), 2);
    for (_, hash) in &writes {
        assert_eq!(hash.len(), 64);
    }
}

#[tokio::test]
async fn refresh_with_fresh_hashes_writes_nothing() {
    let mut artwork = christmas_animals();
    artwork.content_hash = Some(content_hash(&artwork));
    let repo = Arc::new(CountingArtworksRepo::with_artworks(vec![artwork]));
    let service = service(repo.clone());

    let summary = service.refresh().await.unwrap();
    assert_eq!(summary.artworks, 1);
    assert_eq!(summary.updated_hashes, 0);
    assert!(repo.hash_writes().is_empty());
}

#[tokio::test]
async fn empty_persisted_hash_is_treated_as_always_stale() {
    let mut artwork = christmas_animals();
    artwork.content_hash = Some(String::new());
    let repo = Arc::new(CountingArtworksRepo::with_artworks(vec![artwork]));
    let service = service(repo.clone());

    let summary = service.refresh().await.unwrap();
    assert_eq!(summary.updated_hashes, 1);
}

#[tokio::test]
async fn out_of_band_edit_is_detected_and_reconciled() {
    let mut artwork = christmas_animals();
    artwork.content_hash = Some(content_hash(&artwork));
    let repo = Arc::new(CountingArtworksRepo::with_artworks(vec![artwork.clone()]));
    let service = service(repo.clone());

    // Prime the cache and settle the hash.
    let summary = service.refresh().await.unwrap();
    assert_eq!(summary.updated_hashes, 0);

    // Edit the row behind the service's back. The stale hash rides along.
    let mut edited = artwork;
    edited.description = Some("Repainted sky, same animals.".to_string());
    repo.replace(vec![edited.clone()]);

    // Until the next pass, reads serve the cached pre-edit snapshot
    // without touching the store.
    let stale = service.artwork_by_id(67).await.unwrap().unwrap();
    assert_eq!(
        stale.description.as_deref(),
        Some("A winter scene of forest animals.")
    );
    assert_eq!(repo.find_by_id_calls.load(Ordering::SeqCst), 0);

    // The refresh reconciles both the cache and the stored hash.
    let summary = service.refresh().await.unwrap();
    assert_eq!(summary.updated_hashes, 1);

    let served = service.artwork_by_id(67).await.unwrap().unwrap();
    assert_eq!(
        served.description.as_deref(),
        Some("Repainted sky, same animals.")
    );
    assert_eq!(served.content_hash, Some(content_hash(&edited)));
}

#[tokio::test]
async fn row_deleted_mid_pass_is_skipped_not_fatal() {
    let repo = Arc::new(CountingArtworksRepo::with_artworks(vec![
        christmas_animals(),
        sample_artwork(68, "Quiet Harbor"),
    ]));
    repo.missing_on_hash_write.lock().unwrap().push(67);
    let service = service(repo.clone());

    // The pass survives the vanished row and still hashes the other one.
    let summary = service.refresh().await.unwrap();
    assert_eq!(summary.artworks, 2);
    assert_eq!(summary.updated_hashes, 1);

    // The surviving row was cached by the pass; the vanished one was not,
    // so a read of it falls through to the store.
    assert!(service.artwork_by_id(68).await.unwrap().is_some());
    assert_eq!(repo.find_by_id_calls.load(Ordering::SeqCst), 0);
    service.artwork_by_id(67).await.unwrap();
    assert_eq!(repo.find_by_id_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn refresh_repopulates_id_entries_and_title_index() {
    let repo = Arc::new(CountingArtworksRepo::with_artworks(vec![
        christmas_animals(),
    ]));
    let service = service(repo.clone());

    service.refresh().await.unwrap();

    // Both lookups hit entries the refresh pass populated.
    assert!(service.artwork_by_id(67).await.unwrap().is_some());
    assert!(
        service
            .artwork_by_title("THE CHRISTMAS ANIMALS")
            .await
            .unwrap()
            .is_some()
    );
    assert_eq!(repo.find_by_id_calls.load(Ordering::SeqCst), 0);
    assert_eq!(repo.find_by_title_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_refresh_leaves_reads_working() {
    let repo = Arc::new(CountingArtworksRepo::with_artworks(vec![
        christmas_animals(),
    ]));
    let service = service(repo.clone());

    repo.fail_reads.store(true, Ordering::SeqCst);
    assert!(service.refresh().await.is_err());

    // The pass evicted before failing; reads fall through to the store.
    repo.fail_reads.store(false, Ordering::SeqCst);
    assert!(service.artwork_by_id(67).await.unwrap().is_some());
}

#[tokio::test]
async fn overlap_guard_admits_one_pass_at_a_time() {
    let repo = Arc::new(CountingArtworksRepo::default());
    let ctx = RefreshContext::new(service(repo));

    assert!(ctx.try_begin());
    assert!(!ctx.try_begin());

    ctx.finish();
    assert!(ctx.try_begin());
    ctx.finish();
}
