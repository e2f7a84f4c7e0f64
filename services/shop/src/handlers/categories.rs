use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use fusion_domain::permission::Permission;

use crate::error::ShopError;
use crate::extract::{JsonBody, PathParam};
use crate::guard::CurrentUser;
use crate::handlers::CategoryResponse;
use crate::state::AppState;
use crate::usecase::category::{
    CreateCategoryInput, CreateCategoryUseCase, DeleteCategoryUseCase, ListCategoriesUseCase,
};

/// Holders of any of these may change the category list.
pub const CATALOG_ADMINS: &[Permission] = &[Permission::Admin, Permission::ManageCatalog];

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ShopError> {
    let usecase = ListCategoriesUseCase {
        categories: state.category_repo(),
    };
    let categories = usecase.execute().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

pub async fn create_category(
    current: CurrentUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ShopError> {
    current.require_any(CATALOG_ADMINS)?;
    let usecase = CreateCategoryUseCase {
        categories: state.category_repo(),
    };
    let category = usecase
        .execute(CreateCategoryInput {
            name: body.name,
            description: body.description,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

pub async fn delete_category(
    current: CurrentUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ShopError> {
    current.require_any(CATALOG_ADMINS)?;
    let usecase = DeleteCategoryUseCase {
        categories: state.category_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
