//! Product bookmark routes

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::jwt::Claims;
use crate::models::product::ProductQuery;
use crate::models::{NewProduct, ProductChanges, ProductFilter, ProductSort, ProductView};
use crate::state::AppState;
use crate::validation::{validate_categories, validate_price};

/// Request for saving a new product
#[derive(Deserialize)]
pub struct SubmitProductRequest {
    pub url: String,
    pub price: Option<f64>,
    #[serde(rename = "productName")]
    pub product_name: Option<String>,
    #[serde(default)]
    pub category: Vec<String>,
}

/// Request for editing a product; omitted fields keep their value.
#[derive(Deserialize)]
pub struct EditProductRequest {
    pub id: Uuid,
    pub url: Option<String>,
    pub price: Option<f64>,
    #[serde(rename = "productName")]
    pub product_name: Option<String>,
    pub category: Option<Vec<String>>,
}

/// Request naming a single product
#[derive(Deserialize)]
pub struct ProductIdRequest {
    pub id: Uuid,
}

/// List the authenticated user's products with filtering, sorting, and
/// pagination.
pub async fn list_products(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .rate_limiter
        .is_allowed("product-list", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let offset = i64::from(page - 1) * i64::from(limit);

    let sort = ProductSort::from_params(query.sort_by.as_deref(), query.extra_sort_by.as_deref());
    let filter = ProductFilter {
        min_price: query.min_price,
        max_price: query.max_price,
        categories: query.category_tags(),
        // The favorites view narrows to favorited products, not just
        // sorts them first.
        favorited_only: sort == ProductSort::FavoritedFirst,
    };

    let total = state
        .product_repository
        .count(claims.sub, &filter)
        .await
        .map_err(ApiError::internal)?;

    let products = state
        .product_repository
        .list(claims.sub, &filter, sort, i64::from(limit), offset)
        .await
        .map_err(ApiError::internal)?;

    let products: Vec<ProductView> = products.into_iter().map(Into::into).collect();

    Ok(Json(json!({
        "message": "User products fetched successfully",
        "products": products,
        "page": page,
        "totalPages": total_pages(total, i64::from(limit)),
    })))
}

/// Save a new product bookmark.
pub async fn submit_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .rate_limiter
        .is_allowed("product-mutate", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    if payload.url.trim().is_empty() {
        return Err(ApiError::Validation("URL is required".to_string()));
    }
    let price = validate_price(payload.price).map_err(ApiError::Validation)?;
    validate_categories(&payload.category).map_err(ApiError::Validation)?;

    state
        .product_repository
        .create(
            claims.sub,
            &NewProduct {
                url: payload.url,
                price,
                name: payload.product_name,
                categories: payload.category,
            },
        )
        .await
        .map_err(ApiError::internal)?;

    info!("User {} saved a product", claims.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "save": true,
            "message": "Product added",
        })),
    ))
}

/// Edit a product the authenticated user owns.
pub async fn edit_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<EditProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .rate_limiter
        .is_allowed("product-mutate", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    if let Some(price) = payload.price {
        validate_price(Some(price)).map_err(ApiError::Validation)?;
    }
    if let Some(category) = &payload.category {
        validate_categories(category).map_err(ApiError::Validation)?;
    }

    // Ownership check: the scoped lookup only sees the user's own rows.
    state
        .product_repository
        .find_by_id(claims.sub, payload.id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    let updated = state
        .product_repository
        .update(
            payload.id,
            &ProductChanges {
                url: payload.url,
                price: payload.price,
                name: payload.product_name,
                categories: payload.category,
            },
        )
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    info!("User {} edited product {}", claims.username, payload.id);

    Ok(Json(json!({"product": ProductView::from(updated)})))
}

/// Toggle a product's favorited flag.
pub async fn favorite_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ProductIdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .rate_limiter
        .is_allowed("product-mutate", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    state
        .product_repository
        .find_by_id(claims.sub, payload.id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    let updated = state
        .product_repository
        .toggle_favorited(payload.id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(Json(json!({"favorited": updated.favorited})))
}

/// Delete a product the authenticated user owns.
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ProductIdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .rate_limiter
        .is_allowed("product-mutate", &claims.sub.to_string())
        .await
    {
        return Err(ApiError::RateLimited);
    }

    state
        .product_repository
        .find_by_id(claims.sub, payload.id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    state
        .product_repository
        .delete(payload.id)
        .await
        .map_err(ApiError::internal)?;

    info!("User {} deleted product {}", claims.username, payload.id);

    Ok(Json(json!({"message": "Product deleted"})))
}

/// Ceiling division of the match count into pages.
fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 10), 10);
    }
}
