use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fusion_domain::pagination::PageRequest;

use crate::error::ShopError;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::guard::CurrentUser;
use crate::handlers::{ProductResponse, ReviewResponse};
use crate::state::AppState;
use crate::usecase::product::{
    AddFavoriteUseCase, CreateProductInput, CreateProductUseCase, CreateReviewInput,
    CreateReviewUseCase, DeleteProductUseCase, GetProductUseCase, ListProductsUseCase,
    RemoveFavoriteUseCase, RemoveReviewUseCase, UpdateProductInput, UpdateProductUseCase,
};

// ── GET /products ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ListProductsQuery {
    pub page: Option<u32>,
    #[serde(rename = "per-page")]
    pub per_page: Option<u32>,
    pub category: Option<String>,
}

pub async fn list_products(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListProductsQuery>,
) -> Result<Json<Vec<ProductResponse>>, ShopError> {
    let defaults = PageRequest::default();
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(defaults.per_page),
        page: query.page.unwrap_or(defaults.page),
    };
    let usecase = ListProductsUseCase {
        products: state.product_repo(),
    };
    let products = usecase.execute(page, query.category).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

// ── GET /products/{id} ───────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ProductDetailResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub reviews: Vec<ReviewResponse>,
}

pub async fn get_product(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ProductDetailResponse>, ShopError> {
    let usecase = GetProductUseCase {
        products: state.product_repo(),
    };
    let detail = usecase.execute(id).await?;
    Ok(Json(ProductDetailResponse {
        product: detail.product.into(),
        reviews: detail.reviews.into_iter().map(Into::into).collect(),
    }))
}

// ── POST /products ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub image: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

pub async fn create_product(
    current: CurrentUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ShopError> {
    let usecase = CreateProductUseCase {
        products: state.product_repo(),
    };
    let product = usecase
        .execute(
            current.id(),
            CreateProductInput {
                name: body.name,
                description: body.description,
                price: body.price,
                stock: body.stock,
                image: body.image,
                categories: body.categories,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

// ── PUT /products/{id} ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub image: Option<String>,
    pub categories: Option<Vec<String>>,
}

pub async fn update_product(
    current: CurrentUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<UpdateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ShopError> {
    let usecase = UpdateProductUseCase {
        products: state.product_repo(),
    };
    let product = usecase
        .execute(
            id,
            current.id(),
            UpdateProductInput {
                name: body.name,
                description: body.description,
                price: body.price,
                stock: body.stock,
                image: body.image,
                categories: body.categories,
            },
        )
        .await?;
    Ok((StatusCode::ACCEPTED, Json(product.into())))
}

// ── DELETE /products/{id} ────────────────────────────────────────────────────

pub async fn delete_product(
    current: CurrentUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ShopError> {
    let usecase = DeleteProductUseCase {
        products: state.product_repo(),
    };
    usecase.execute(id, current.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST|DELETE /products/{id}/reviews ───────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i16,
    #[serde(default)]
    pub comment: String,
}

pub async fn create_review(
    current: CurrentUser,
    State(state): State<AppState>,
    PathParam(product_id): PathParam<Uuid>,
    JsonBody(body): JsonBody<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ShopError> {
    let usecase = CreateReviewUseCase {
        products: state.product_repo(),
        reviews: state.review_repo(),
    };
    let review = usecase
        .execute(
            product_id,
            current.id(),
            CreateReviewInput {
                rating: body.rating,
                comment: body.comment,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

pub async fn remove_review(
    current: CurrentUser,
    State(state): State<AppState>,
    PathParam(product_id): PathParam<Uuid>,
) -> Result<StatusCode, ShopError> {
    let usecase = RemoveReviewUseCase {
        reviews: state.review_repo(),
    };
    usecase.execute(product_id, current.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST|DELETE /products/{id}/favorites ─────────────────────────────────────

pub async fn add_favorite(
    current: CurrentUser,
    State(state): State<AppState>,
    PathParam(product_id): PathParam<Uuid>,
) -> Result<StatusCode, ShopError> {
    let usecase = AddFavoriteUseCase {
        products: state.product_repo(),
        favorites: state.favorite_repo(),
    };
    usecase.execute(product_id, current.id()).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_favorite(
    current: CurrentUser,
    State(state): State<AppState>,
    PathParam(product_id): PathParam<Uuid>,
) -> Result<StatusCode, ShopError> {
    let usecase = RemoveFavoriteUseCase {
        favorites: state.favorite_repo(),
    };
    usecase.execute(product_id, current.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}
