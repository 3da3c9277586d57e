use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::application::repos::{NewProductParams, ProductsRepo, RepoError, UpdateProductParams};
use crate::domain::entities::ProductRecord;

use super::{PostgresRepositories, map_sqlx_error};

const PRODUCT_COLUMNS: &str = "id, artwork_id, description, category, product_url, \
    price, available, display_order, image_url, created_at, updated_at";

#[derive(FromRow)]
struct ProductRow {
    id: i64,
    artwork_id: i64,
    description: String,
    category: String,
    product_url: String,
    price: Option<f64>,
    available: bool,
    display_order: i32,
    image_url: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            artwork_id: row.artwork_id,
            description: row.description,
            category: row.category,
            product_url: row.product_url,
            price: row.price,
            available: row.available,
            display_order: row.display_order,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ProductsRepo for PostgresRepositories {
    async fn find_by_id(&self, id: i64) -> Result<Option<ProductRecord>, RepoError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM artwork_products WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(ProductRecord::from))
    }

    async fn list_for_artwork(
        &self,
        artwork_id: i64,
        only_available: bool,
    ) -> Result<Vec<ProductRecord>, RepoError> {
        let availability = if only_available { " AND available" } else { "" };
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM artwork_products \
             WHERE artwork_id = $1{availability} \
             ORDER BY display_order, id"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(artwork_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(ProductRecord::from).collect())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<ProductRecord>, RepoError> {
        let sql = format!(
            "SELECT p.id, p.artwork_id, p.description, p.category, p.product_url, \
             p.price, p.available, p.display_order, p.image_url, p.created_at, p.updated_at \
             FROM artwork_products p \
             INNER JOIN artworks a ON a.id = p.artwork_id \
             WHERE lower(p.category) = lower($1) AND p.available \
             ORDER BY a.title, p.display_order"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(category)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(ProductRecord::from).collect())
    }

    async fn list_categories(&self) -> Result<Vec<String>, RepoError> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM artwork_products ORDER BY 1",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn insert(&self, params: NewProductParams) -> Result<ProductRecord, RepoError> {
        let sql = format!(
            "INSERT INTO artwork_products \
             (artwork_id, description, category, product_url, price, available, \
              display_order, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(params.artwork_id)
            .bind(&params.description)
            .bind(&params.category)
            .bind(&params.product_url)
            .bind(params.price)
            .bind(params.available)
            .bind(params.display_order)
            .bind(&params.image_url)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(ProductRecord::from(row))
    }

    async fn update(&self, params: UpdateProductParams) -> Result<ProductRecord, RepoError> {
        let sql = format!(
            "UPDATE artwork_products SET \
             description = $2, category = $3, product_url = $4, price = $5, \
             available = $6, display_order = $7, image_url = $8 \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(params.id)
            .bind(&params.description)
            .bind(&params.category)
            .bind(&params.product_url)
            .bind(params.price)
            .bind(params.available)
            .bind(params.display_order)
            .bind(&params.image_url)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        row.map(ProductRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM artwork_products WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn set_availability(
        &self,
        id: i64,
        available: bool,
    ) -> Result<ProductRecord, RepoError> {
        let sql = format!(
            "UPDATE artwork_products SET available = $2 WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(available)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        row.map(ProductRecord::from).ok_or(RepoError::NotFound)
    }
}
