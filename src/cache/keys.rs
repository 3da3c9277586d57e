//! Cache key construction.
//!
//! Keys are plain namespaced strings so that cache contents stay legible in
//! logs and debugging sessions: `artwork:<id>` for single snapshots,
//! `artworks:*` for list results, `products:artwork:<id>` for product lists.
//! Title and medium segments are case-folded so lookups are
//! case-insensitive.

/// Prefix for single-artwork entries and the title index.
pub const ARTWORK_PREFIX: &str = "artwork:";
/// Prefix for artwork list entries.
pub const ARTWORK_LIST_PREFIX: &str = "artworks:";
/// Prefix for per-artwork product lists.
pub const PRODUCT_PREFIX: &str = "products:";

/// Hash map holding the title → artwork-id side index.
pub const TITLE_INDEX: &str = "artwork:titles";

/// Case-fold a user-supplied lookup segment for key construction.
pub fn fold(segment: &str) -> String {
    segment.trim().to_lowercase()
}

pub fn artwork(id: i64) -> String {
    format!("artwork:{id}")
}

pub fn artwork_title(title: &str) -> String {
    format!("artwork:title:{}", fold(title))
}

pub fn artworks_all() -> String {
    "artworks:all".to_string()
}

pub fn artworks_featured() -> String {
    "artworks:featured".to_string()
}

pub fn artworks_for_sale() -> String {
    "artworks:for-sale".to_string()
}

pub fn artworks_by_medium(medium: &str) -> String {
    format!("artworks:medium:{}", fold(medium))
}

pub fn artworks_by_category(category: &str) -> String {
    format!("artworks:category:{}", fold(category))
}

pub fn artworks_search(term: &str) -> String {
    format!("artworks:search:{}", fold(term))
}

pub fn products_for_artwork(artwork_id: i64) -> String {
    format!("products:artwork:{artwork_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folding_makes_lookups_case_insensitive() {
        assert_eq!(artwork_title("The Christmas Animals"), artwork_title("the christmas animals"));
        assert_eq!(artworks_by_medium("Acrylic"), artworks_by_medium("acrylic"));
        assert_eq!(artworks_by_medium(" Acrylic "), "artworks:medium:acrylic");
    }

    #[test]
    fn keys_live_under_their_namespaces() {
        assert!(artwork(67).starts_with(ARTWORK_PREFIX));
        assert!(artwork_title("x").starts_with(ARTWORK_PREFIX));
        assert!(TITLE_INDEX.starts_with(ARTWORK_PREFIX));
        assert!(artworks_featured().starts_with(ARTWORK_LIST_PREFIX));
        assert!(artworks_search("tree").starts_with(ARTWORK_LIST_PREFIX));
        assert!(products_for_artwork(67).starts_with(PRODUCT_PREFIX));
    }

    #[test]
    fn single_and_list_namespaces_are_distinct() {
        // "artwork:" entries must not be swept by an "artworks:" prefix
        // delete and vice versa; the list prefix is not a prefix of the
        // singular one.
        assert!(!artwork(1).starts_with(ARTWORK_LIST_PREFIX));
    }
}
