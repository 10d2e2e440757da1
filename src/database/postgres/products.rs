use async_trait::async_trait;
use uuid::Uuid;

use super::{search_term, PgStore};
use crate::database::repository::{PagedResult, Pagination, ProductRepository, StoreResult};
use crate::models::{CreateProductRequest, Product, ProductFilter, ProductRow};

const PRODUCT_COLUMNS: &str = "id, supplier_id, name, description, category, price, currency, \
     unit, min_order_quantity, stock, features, tags, created_at, updated_at";

const PRODUCT_FILTER: &str = "($1::text IS NULL OR LOWER(category) = LOWER($1)) \
     AND ($2::uuid IS NULL OR supplier_id = $2) \
     AND ($3::bool IS NULL OR (stock > 0) = $3) \
     AND ($4::text IS NULL OR name ILIKE '%' || $4 || '%' \
          OR description ILIKE '%' || $4 || '%' \
          OR EXISTS (SELECT 1 FROM unnest(tags) t WHERE t ILIKE '%' || $4 || '%'))";

#[async_trait]
impl ProductRepository for PgStore {
    async fn insert_product(
        &self,
        supplier_id: Uuid,
        product: &CreateProductRequest,
    ) -> StoreResult<Product> {
        let sql = format!(
            "INSERT INTO products (id, supplier_id, name, description, category, price, currency, \
                 unit, min_order_quantity, stock, features, tags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(supplier_id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(&product.category)
            .bind(product.price)
            .bind(&product.currency)
            .bind(&product.unit)
            .bind(product.min_order_quantity)
            .bind(product.stock)
            .bind(&product.features)
            .bind(&product.tags)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn update_product(&self, product: &Product) -> StoreResult<Product> {
        let sql = format!(
            "UPDATE products SET name = $2, description = $3, category = $4, price = $5, \
                 currency = $6, unit = $7, min_order_quantity = $8, stock = $9, \
                 features = $10, tags = $11, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(&product.category)
            .bind(product.price)
            .bind(&product.currency)
            .bind(&product.unit)
            .bind(product.min_order_quantity)
            .bind(product.stock)
            .bind(&product.features)
            .bind(&product.tags)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        pagination: &Pagination,
    ) -> StoreResult<PagedResult<Product>> {
        let search = search_term(filter.search.as_deref());

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE {PRODUCT_FILTER} \
             ORDER BY created_at DESC LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&filter.category)
            .bind(filter.supplier_id)
            .bind(filter.in_stock)
            .bind(&search)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM products WHERE {PRODUCT_FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(&filter.category)
            .bind(filter.supplier_id)
            .bind(filter.in_stock)
            .bind(&search)
            .fetch_one(&self.pool)
            .await?;

        let items = rows.into_iter().map(Product::from).collect();
        Ok(PagedResult::new(items, total, pagination))
    }

    async fn products_by_supplier(&self, supplier_id: Uuid) -> StoreResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE supplier_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(supplier_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn count_products(&self) -> StoreResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?)
    }
}
