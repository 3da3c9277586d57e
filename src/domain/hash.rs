//! Content hashing for staleness detection.
//!
//! The digest covers an artwork's displayable fields only. It tells the
//! refresh worker whether a cached snapshot still matches the store; it is
//! not a security or integrity mechanism.

use sha2::{Digest, Sha256};

use crate::domain::entities::ArtworkRecord;

/// Field separator inside the digest input. Keeps adjacent fields from
/// running together ("ab" + "c" vs "a" + "bc").
const FIELD_SEP: u8 = 0x1f;

/// Marker for an absent optional field, distinct from an empty string.
const ABSENT: &[u8] = &[0x00];

/// Compute the lowercase hex SHA-256 digest of an artwork's tracked fields.
///
/// Pure over the tracked fields: title, description, dimensions, the three
/// image URLs, print URL, production date, price, for-sale flag, location,
/// medium, categories, featured flag. Identity, timestamps, and the stored
/// hash do not participate.
pub fn content_hash(artwork: &ArtworkRecord) -> String {
    let mut hasher = Sha256::new();

    feed(&mut hasher, Some(artwork.title.as_str()));
    feed(&mut hasher, artwork.description.as_deref());
    feed(&mut hasher, artwork.dimensions.as_deref());
    feed(&mut hasher, artwork.small_image_url.as_deref());
    feed(&mut hasher, artwork.medium_image_url.as_deref());
    feed(&mut hasher, artwork.large_image_url.as_deref());
    feed(&mut hasher, artwork.print_url.as_deref());
    feed_owned(&mut hasher, artwork.produced_on.map(|d| d.to_string()));
    feed_owned(&mut hasher, artwork.original_price.map(|p| p.to_string()));
    feed_owned(&mut hasher, Some(artwork.for_sale.to_string()));
    feed(&mut hasher, artwork.location.as_deref());
    feed(&mut hasher, artwork.medium.as_deref());
    feed(&mut hasher, artwork.categories.as_deref());
    feed_owned(&mut hasher, Some(artwork.featured.to_string()));

    hex::encode(hasher.finalize())
}

fn feed(hasher: &mut Sha256, field: Option<&str>) {
    match field {
        Some(value) => hasher.update(value.as_bytes()),
        None => hasher.update(ABSENT),
    }
    hasher.update([FIELD_SEP]);
}

fn feed_owned(hasher: &mut Sha256, field: Option<String>) {
    feed(hasher, field.as_deref());
}
