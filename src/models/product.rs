use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{normalize_list, validate_non_negative, CURRENCY_RE};

/// Catalogue entry owned by a supplier.
///
/// `in_stock` is not stored; it is always `stock > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    #[schema(value_type = f64, example = 120.5)]
    pub price: Decimal,
    pub currency: String,
    pub unit: String,
    pub min_order_quantity: i32,
    pub stock: i32,
    pub in_stock: bool,
    pub features: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored product row
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: Decimal,
    pub currency: String,
    pub unit: String,
    pub min_order_quantity: i32,
    pub stock: i32,
    pub features: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            in_stock: row.stock > 0,
            id: row.id,
            supplier_id: row.supplier_id,
            name: row.name,
            description: row.description,
            category: row.category,
            price: row.price,
            currency: row.currency,
            unit: row.unit,
            min_order_quantity: row.min_order_quantity,
            stock: row.stock,
            features: row.features,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 2, max = 200, message = "Product name must be between 2 and 200 characters"))]
    pub name: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(length(min = 2, max = 100, message = "Category is required"))]
    pub category: String,

    #[validate(custom(function = "validate_non_negative"))]
    #[schema(value_type = f64)]
    pub price: Decimal,

    #[serde(default = "default_currency")]
    #[validate(regex(path = *CURRENCY_RE, message = "Currency must be a 3-letter code"))]
    pub currency: String,

    #[validate(length(min = 1, max = 50, message = "Unit is required"))]
    pub unit: String,

    #[serde(default = "default_min_order")]
    #[validate(range(min = 1, message = "Minimum order quantity must be at least 1"))]
    pub min_order_quantity: i32,

    #[serde(default)]
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,

    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateProductRequest {
    /// Trim text fields and clean list fields. Runs before validation.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.category = self.category.trim().to_string();
        self.unit = self.unit.trim().to_string();
        self.features = normalize_list(&self.features);
        self.tags = normalize_list(&self.tags);
        self
    }
}

/// Partial product edit; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProductRequest {
    #[validate(length(min = 2, max = 200))]
    pub name: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(length(min = 2, max = 100))]
    pub category: Option<String>,

    #[validate(custom(function = "validate_non_negative"))]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,

    #[validate(regex(path = *CURRENCY_RE, message = "Currency must be a 3-letter code"))]
    pub currency: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub unit: Option<String>,

    #[validate(range(min = 1))]
    pub min_order_quantity: Option<i32>,

    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,

    pub features: Option<Vec<String>>,

    pub tags: Option<Vec<String>>,
}

impl UpdateProductRequest {
    pub fn normalized(mut self) -> Self {
        let trim = |value: Option<String>| value.map(|v| v.trim().to_string());
        self.name = trim(self.name);
        self.category = trim(self.category);
        self.unit = trim(self.unit);
        self
    }

    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            product.description = Some(description.clone());
        }
        if let Some(category) = &self.category {
            product.category = category.trim().to_string();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(currency) = &self.currency {
            product.currency = currency.clone();
        }
        if let Some(unit) = &self.unit {
            product.unit = unit.trim().to_string();
        }
        if let Some(moq) = self.min_order_quantity {
            product.min_order_quantity = moq;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(features) = &self.features {
            product.features = normalize_list(features);
        }
        if let Some(tags) = &self.tags {
            product.tags = normalize_list(tags);
        }
        product.in_stock = product.stock > 0;
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub in_stock: Option<bool>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if !product.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(supplier_id) = self.supplier_id {
            if product.supplier_id != supplier_id {
                return false;
            }
        }
        if let Some(in_stock) = self.in_stock {
            if product.in_stock != in_stock {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = product.name.to_lowercase().contains(&needle)
                || product
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
                || product.tags.iter().any(|t| t.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// Summary shown on the supplier dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total: usize,
    pub in_stock: usize,
    pub out_of_stock: usize,
    #[schema(value_type = f64)]
    pub inventory_value: Decimal,
}

impl ProductStats {
    pub fn from_products(products: &[Product]) -> Self {
        products.iter().fold(Self::default(), |mut stats, p| {
            stats.total += 1;
            if p.in_stock {
                stats.in_stock += 1;
            } else {
                stats.out_of_stock += 1;
            }
            let line_value = p.price.saturating_mul(Decimal::from(p.stock.max(0)));
            stats.inventory_value = stats.inventory_value.saturating_add(line_value);
            stats
        })
    }
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_min_order() -> i32 {
    1
}
