//! Product models for bookmarked items

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub price: f64,
    pub name: Option<String>,
    pub categories: Vec<String>,
    pub favorited: bool,
    pub created_at: DateTime<Utc>,
}

/// The JSON shape products take in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(rename = "productId")]
    pub product_id: Uuid,
    pub url: String,
    pub price: f64,
    #[serde(rename = "productName")]
    pub product_name: Option<String>,
    pub category: Vec<String>,
    pub favorited: bool,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            product_id: product.id,
            url: product.url,
            price: product.price,
            product_name: product.name,
            category: product.categories,
            favorited: product.favorited,
        }
    }
}

/// New product creation payload
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub url: String,
    pub price: f64,
    pub name: Option<String>,
    pub categories: Vec<String>,
}

/// Partial update of a product; `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub url: Option<String>,
    pub price: Option<f64>,
    pub name: Option<String>,
    pub categories: Option<Vec<String>>,
}

/// Filters applied to product listing and counting.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// A product matches when its category set intersects this one (OR).
    pub categories: Option<Vec<String>>,
    pub favorited_only: bool,
}

/// Query parameters for product listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "extraSortBy")]
    pub extra_sort_by: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<f64>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<f64>,
    /// Comma-separated category tags.
    #[serde(rename = "categoryFilter")]
    pub category_filter: Option<String>,
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Split the raw `categoryFilter` parameter into trimmed tags.
    pub fn category_tags(&self) -> Option<Vec<String>> {
        let raw = self.category_filter.as_deref()?;
        let tags: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
        if tags.is_empty() { None } else { Some(tags) }
    }
}

/// Sort orders supported by the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    Newest,
    FavoritedFirst,
    PriceAsc,
    PriceDesc,
    CategoryAsc,
    CategoryDesc,
}

impl ProductSort {
    /// Resolve the `sortBy`/`extraSortBy` query parameters to a sort order.
    /// Unknown values fall back to newest-first.
    pub fn from_params(sort_by: Option<&str>, extra_sort_by: Option<&str>) -> Self {
        let descending = matches!(extra_sort_by, Some("descending"));
        match sort_by {
            Some("favorited") => Self::FavoritedFirst,
            Some("price") if descending => Self::PriceDesc,
            Some("price") => Self::PriceAsc,
            Some("category") if descending => Self::CategoryDesc,
            Some("category") => Self::CategoryAsc,
            _ => Self::Newest,
        }
    }

    /// The ORDER BY clause for this sort. Values are fixed strings, never
    /// user input, so they are safe to splice into a query.
    pub fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "created_at DESC",
            Self::FavoritedFirst => "favorited DESC, created_at DESC",
            Self::PriceAsc => "price ASC",
            Self::PriceDesc => "price DESC",
            Self::CategoryAsc => "categories ASC",
            Self::CategoryDesc => "categories DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_defaults_to_newest() {
        assert_eq!(ProductSort::from_params(None, None), ProductSort::Newest);
        assert_eq!(
            ProductSort::from_params(Some("bogus"), Some("descending")),
            ProductSort::Newest
        );
    }

    #[test]
    fn sort_direction_applies_to_price_and_category() {
        assert_eq!(
            ProductSort::from_params(Some("price"), Some("descending")),
            ProductSort::PriceDesc
        );
        assert_eq!(
            ProductSort::from_params(Some("price"), Some("ascending")),
            ProductSort::PriceAsc
        );
        assert_eq!(
            ProductSort::from_params(Some("price"), None),
            ProductSort::PriceAsc
        );
        assert_eq!(
            ProductSort::from_params(Some("category"), Some("descending")),
            ProductSort::CategoryDesc
        );
    }

    #[test]
    fn favorited_sort_ignores_direction() {
        assert_eq!(
            ProductSort::from_params(Some("favorited"), Some("descending")),
            ProductSort::FavoritedFirst
        );
    }

    #[test]
    fn category_tags_are_split_and_trimmed() {
        let query = ProductQuery {
            category_filter: Some("Gadgets, Electronics ,".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.category_tags(),
            Some(vec!["Gadgets".to_string(), "Electronics".to_string()])
        );
    }

    #[test]
    fn empty_category_filter_means_no_filter() {
        let query = ProductQuery {
            category_filter: Some("  , ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.category_tags(), None);
        assert_eq!(ProductQuery::default().category_tags(), None);
    }

    #[test]
    fn product_view_uses_the_wire_field_names() {
        let product = Product {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            url: "http://example.com/widget".to_string(),
            price: 9.99,
            name: Some("Widget".to_string()),
            categories: vec!["Gadgets".to_string()],
            favorited: true,
            created_at: Utc::now(),
        };
        let view = ProductView::from(product.clone());
        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(json["productId"], serde_json::json!(product.id));
        assert_eq!(json["productName"], serde_json::json!("Widget"));
        assert_eq!(json["category"], serde_json::json!(["Gadgets"]));
        assert_eq!(json["favorited"], serde_json::json!(true));
    }
}
