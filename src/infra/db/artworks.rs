use async_trait::async_trait;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

use crate::application::repos::{ArtworksRepo, RepoError};
use crate::domain::entities::ArtworkRecord;

use super::{PostgresRepositories, map_sqlx_error};

const ARTWORK_COLUMNS: &str = "id, title, description, dimensions, \
    small_image_url, small_image_width, small_image_height, \
    medium_image_url, medium_image_width, medium_image_height, \
    large_image_url, large_image_width, large_image_height, \
    print_url, produced_on, original_price, for_sale, location, medium, \
    categories, featured, created_at, updated_at, content_hash";

#[derive(FromRow)]
struct ArtworkRow {
    id: i64,
    title: String,
    description: Option<String>,
    dimensions: Option<String>,
    small_image_url: Option<String>,
    small_image_width: Option<i32>,
    small_image_height: Option<i32>,
    medium_image_url: Option<String>,
    medium_image_width: Option<i32>,
    medium_image_height: Option<i32>,
    large_image_url: Option<String>,
    large_image_width: Option<i32>,
    large_image_height: Option<i32>,
    print_url: Option<String>,
    produced_on: Option<Date>,
    original_price: Option<f64>,
    for_sale: bool,
    location: Option<String>,
    medium: Option<String>,
    categories: Option<String>,
    featured: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    content_hash: Option<String>,
}

impl From<ArtworkRow> for ArtworkRecord {
    fn from(row: ArtworkRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            dimensions: row.dimensions,
            small_image_url: row.small_image_url,
            small_image_width: row.small_image_width,
            small_image_height: row.small_image_height,
            medium_image_url: row.medium_image_url,
            medium_image_width: row.medium_image_width,
            medium_image_height: row.medium_image_height,
            large_image_url: row.large_image_url,
            large_image_width: row.large_image_width,
            large_image_height: row.large_image_height,
            print_url: row.print_url,
            produced_on: row.produced_on,
            original_price: row.original_price,
            for_sale: row.for_sale,
            location: row.location,
            medium: row.medium,
            categories: row.categories,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
            content_hash: row.content_hash,
        }
    }
}

impl PostgresRepositories {
    async fn fetch_artworks(&self, sql: &str) -> Result<Vec<ArtworkRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ArtworkRow>(sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(ArtworkRecord::from).collect())
    }

    async fn fetch_artworks_with<'q>(
        &self,
        sql: &'q str,
        bind: &'q str,
    ) -> Result<Vec<ArtworkRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ArtworkRow>(sql)
            .bind(bind)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(ArtworkRecord::from).collect())
    }
}

#[async_trait]
impl ArtworksRepo for PostgresRepositories {
    async fn find_by_id(&self, id: i64) -> Result<Option<ArtworkRecord>, RepoError> {
        let sql = format!("SELECT {ARTWORK_COLUMNS} FROM artworks WHERE id = $1");
        let row = sqlx::query_as::<_, ArtworkRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(ArtworkRecord::from))
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<ArtworkRecord>, RepoError> {
        let sql = format!(
            "SELECT {ARTWORK_COLUMNS} FROM artworks WHERE lower(title) = lower($1) LIMIT 1"
        );
        let row = sqlx::query_as::<_, ArtworkRow>(&sql)
            .bind(title)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(ArtworkRecord::from))
    }

    async fn find_all(&self) -> Result<Vec<ArtworkRecord>, RepoError> {
        let sql = format!("SELECT {ARTWORK_COLUMNS} FROM artworks ORDER BY title");
        self.fetch_artworks(&sql).await
    }

    async fn find_by_medium(&self, medium: &str) -> Result<Vec<ArtworkRecord>, RepoError> {
        let sql = format!(
            "SELECT {ARTWORK_COLUMNS} FROM artworks \
             WHERE lower(medium) = lower($1) ORDER BY title"
        );
        self.fetch_artworks_with(&sql, medium).await
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<ArtworkRecord>, RepoError> {
        // Categories are a comma-delimited text column; match whole tags,
        // not substrings.
        let sql = format!(
            "SELECT {ARTWORK_COLUMNS} FROM artworks \
             WHERE categories IS NOT NULL AND EXISTS ( \
                 SELECT 1 FROM unnest(string_to_array(categories, ',')) AS tag \
                 WHERE lower(btrim(tag)) = lower(btrim($1)) \
             ) ORDER BY title"
        );
        self.fetch_artworks_with(&sql, category).await
    }

    async fn find_featured(&self) -> Result<Vec<ArtworkRecord>, RepoError> {
        let sql = format!("SELECT {ARTWORK_COLUMNS} FROM artworks WHERE featured ORDER BY title");
        self.fetch_artworks(&sql).await
    }

    async fn find_for_sale(&self) -> Result<Vec<ArtworkRecord>, RepoError> {
        let sql = format!("SELECT {ARTWORK_COLUMNS} FROM artworks WHERE for_sale ORDER BY title");
        self.fetch_artworks(&sql).await
    }

    async fn search(&self, term: &str) -> Result<Vec<ArtworkRecord>, RepoError> {
        let sql = format!(
            "SELECT {ARTWORK_COLUMNS} FROM artworks \
             WHERE title ILIKE $1 OR description ILIKE $1 OR categories ILIKE $1 \
             ORDER BY title"
        );
        let pattern = format!("%{}%", term.replace('%', "\\%").replace('_', "\\_"));
        let rows = sqlx::query_as::<_, ArtworkRow>(&sql)
            .bind(pattern)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(ArtworkRecord::from).collect())
    }

    async fn update_hash(&self, id: i64, hash: &str) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE artworks SET content_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(hash)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<String>, RepoError> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT btrim(tag) FROM artworks, \
             unnest(string_to_array(categories, ',')) AS tag \
             WHERE categories IS NOT NULL AND btrim(tag) <> '' \
             ORDER BY 1",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_mediums(&self) -> Result<Vec<String>, RepoError> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT medium FROM artworks \
             WHERE medium IS NOT NULL AND medium <> '' ORDER BY 1",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_dimensions(&self) -> Result<Vec<String>, RepoError> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT dimensions FROM artworks \
             WHERE dimensions IS NOT NULL AND dimensions <> '' ORDER BY 1",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_years(&self) -> Result<Vec<i32>, RepoError> {
        sqlx::query_scalar::<_, i32>(
            "SELECT DISTINCT CAST(EXTRACT(YEAR FROM produced_on) AS INT) FROM artworks \
             WHERE produced_on IS NOT NULL ORDER BY 1",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
