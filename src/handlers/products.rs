//! Product catalogue.

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::extractors::{pagination, ApiJson, ApiQuery, ValidatedUuid};
use super::response::{Created, Success};
use super::rfqs::DeletedData;
use crate::app_state::AppState;
use crate::auth::AuthenticatedUser;
use crate::database::repository::PageInfo;
use crate::error::Result;
use crate::models::{
    CreateProductRequest, Product, ProductFilter, ProductStats, UpdateProductRequest,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub in_stock: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductListData {
    pub products: Vec<Product>,
    pub pagination: PageInfo,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductData {
    pub product: Product,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MyProductsData {
    pub products: Vec<Product>,
    pub stats: ProductStats,
}

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "products",
    params(ProductListQuery),
    responses((status = 200, description = "Page of products", body = ProductListData))
)]
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> Result<Success<ProductListData>> {
    let filter = ProductFilter {
        category: query.category,
        search: query.search,
        supplier_id: query.supplier_id,
        in_stock: query.in_stock,
    };
    let page = state
        .product_service
        .list(&filter, &pagination(query.page, query.per_page))
        .await?;
    let (products, pagination) = page.into_parts();
    Ok(Success(ProductListData {
        products,
        pagination,
    }))
}

/// Own catalogue for the signed-in supplier. Also served at `/api/suppliers/products`.
#[utoipa::path(
    get,
    path = "/api/products/my-products",
    tag = "products",
    responses((status = 200, description = "Supplier's products with stats", body = MyProductsData)),
    security(("bearer_auth" = []))
)]
pub async fn my_products(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> Result<Success<MyProductsData>> {
    let (products, stats) = state.product_service.my_products(&claims).await?;
    Ok(Success(MyProductsData { products, stats }))
}

#[utoipa::path(
    post,
    path = "/api/products/create",
    tag = "products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product listed", body = ProductData),
        (status = 403, description = "Only suppliers list products"),
        (status = 404, description = "Supplier profile missing")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_product(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<CreateProductRequest>,
) -> Result<Created<ProductData>> {
    let product = state.product_service.create(&claims, request).await?;
    Ok(Created(ProductData { product }))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ProductData),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Success<ProductData>> {
    let id = ValidatedUuid::parse(&id)?;
    let product = state.product_service.get(id).await?;
    Ok(Success(ProductData { product }))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductData),
        (status = 403, description = "Not the owner")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_product(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateProductRequest>,
) -> Result<Success<ProductData>> {
    let id = ValidatedUuid::parse(&id)?;
    let product = state.product_service.update(&claims, id, request).await?;
    Ok(Success(ProductData { product }))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product removed", body = DeletedData),
        (status = 403, description = "Not the owner")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_product(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Success<DeletedData>> {
    let id = ValidatedUuid::parse(&id)?;
    let id = state.product_service.delete(&claims, id).await?;
    Ok(Success(DeletedData { id }))
}
