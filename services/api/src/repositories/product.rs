//! Product repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{NewProduct, Product, ProductChanges, ProductFilter, ProductSort};

const PRODUCT_COLUMNS: &str = "id, user_id, url, price, name, categories, favorited, created_at";

/// Shared WHERE clause for listing and counting. `$2`..`$5` are the
/// optional filters; a NULL bind disables the corresponding predicate.
/// The category match is jsonb "contains any of" (OR semantics).
const PRODUCT_FILTER_SQL: &str = r#"
    user_id = $1
    AND ($2::float8 IS NULL OR price >= $2)
    AND ($3::float8 IS NULL OR price <= $3)
    AND ($4::text[] IS NULL OR categories ?| $4)
    AND (NOT $5 OR favorited)
"#;

/// Product repository
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new product for a user. New products start unfavorited.
    pub async fn create(&self, owner: Uuid, new_product: &NewProduct) -> Result<Product> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (user_id, url, price, name, categories)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PRODUCT_COLUMNS}
            "#,
        ))
        .bind(owner)
        .bind(&new_product.url)
        .bind(new_product.price)
        .bind(&new_product.name)
        .bind(Json(&new_product.categories))
        .fetch_one(&self.pool)
        .await?;

        Ok(product_from_row(&row))
    }

    /// Fetch a page of an owner's products matching the filter, in the
    /// requested sort order.
    pub async fn list(
        &self,
        owner: Uuid,
        filter: &ProductFilter,
        sort: ProductSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE {PRODUCT_FILTER_SQL} \
             ORDER BY {} LIMIT $6 OFFSET $7",
            sort.order_by()
        );

        let rows = sqlx::query(&sql)
            .bind(owner)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.categories.as_deref())
            .bind(filter.favorited_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(product_from_row).collect())
    }

    /// Count an owner's products matching the filter, for page-count
    /// computation.
    pub async fn count(&self, owner: Uuid, filter: &ProductFilter) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM products WHERE {PRODUCT_FILTER_SQL}");

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(owner)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.categories.as_deref())
            .bind(filter.favorited_only)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Fetch a single product by ID, scoped to its owner. Another user's
    /// product is indistinguishable from a missing one.
    pub async fn find_by_id(&self, owner: Uuid, product_id: Uuid) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE user_id = $1 AND id = $2",
        ))
        .bind(owner)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(product_from_row))
    }

    /// Update a subset of a product's fields; `None` keeps the current
    /// value.
    pub async fn update(
        &self,
        product_id: Uuid,
        changes: &ProductChanges,
    ) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE products
            SET url = COALESCE($2, url),
                price = COALESCE($3, price),
                name = COALESCE($4, name),
                categories = COALESCE($5, categories)
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#,
        ))
        .bind(product_id)
        .bind(&changes.url)
        .bind(changes.price)
        .bind(&changes.name)
        .bind(changes.categories.as_ref().map(Json))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(product_from_row))
    }

    /// Toggle the favorited status of a product.
    pub async fn toggle_favorited(&self, product_id: Uuid) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE products
            SET favorited = NOT favorited
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#,
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(product_from_row))
    }

    /// Delete a product by ID.
    pub async fn delete(&self, product_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All of an owner's favorited products, newest first. Used by profile
    /// views.
    pub async fn favorited_products(&self, owner: Uuid) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE user_id = $1 AND favorited ORDER BY created_at DESC",
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(product_from_row).collect())
    }
}

fn product_from_row(row: &PgRow) -> Product {
    let Json(categories): Json<Vec<String>> = row.get("categories");
    Product {
        id: row.get("id"),
        user_id: row.get("user_id"),
        url: row.get("url"),
        price: row.get("price"),
        name: row.get("name"),
        categories,
        favorited: row.get("favorited"),
        created_at: row.get("created_at"),
    }
}
