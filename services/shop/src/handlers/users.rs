use axum::Json;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::User;
use crate::error::ShopError;
use crate::extract::{JsonBody, PathParam};
use crate::guard::CurrentUser;
use crate::handlers::ProductResponse;
use crate::state::AppState;
use crate::usecase::user::{
    DeleteUserUseCase, GetUserUseCase, ListFavoritesUseCase, UpdateProfileInput,
    UpdateProfileUseCase, UploadAvatarInput, UploadAvatarUseCase,
};

/// Multipart field carrying the avatar image.
const AVATAR_FIELD: &str = "avatar";

#[derive(Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub is_email_verified: bool,
    #[serde(serialize_with = "fusion_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for MeResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            avatar: u.avatar,
            phone: u.phone,
            is_email_verified: u.is_email_verified,
            created_at: u.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct PublicUserResponse {
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
}

// ── GET /users/me ────────────────────────────────────────────────────────────

pub async fn get_me(current: CurrentUser) -> Json<MeResponse> {
    Json(current.user.into())
}

// ── GET /users/{id} ──────────────────────────────────────────────────────────

pub async fn get_user(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<PublicUserResponse>, ShopError> {
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(id).await?;
    Ok(Json(PublicUserResponse {
        id: user.id,
        username: user.username,
        avatar: user.avatar,
    }))
}

// ── PATCH /users/me ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub username: Option<String>,
    pub phone: Option<String>,
}

pub async fn update_me(
    current: CurrentUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UpdateMeRequest>,
) -> Result<Json<MeResponse>, ShopError> {
    let usecase = UpdateProfileUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(
            current.id(),
            UpdateProfileInput {
                username: body.username,
                phone: body.phone,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

// ── PUT /users/me/avatar ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AvatarResponse {
    pub avatar: String,
}

pub async fn upload_avatar(
    current: CurrentUser,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<AvatarResponse>), ShopError> {
    let mut multipart = multipart?;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ShopError::AvatarTooLarge
            } else {
                e.into()
            }
        })?;
        upload = Some(UploadAvatarInput {
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }
    let input = upload.ok_or(ShopError::MissingData)?;

    let usecase = UploadAvatarUseCase {
        users: state.user_repo(),
        blobs: state.blobs.clone(),
        max_bytes: state.max_avatar_bytes,
    };
    let avatar = usecase.execute(&current.user, input).await?;
    Ok((StatusCode::ACCEPTED, Json(AvatarResponse { avatar })))
}

// ── DELETE /users/me ─────────────────────────────────────────────────────────

pub async fn delete_me(
    current: CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ShopError> {
    let usecase = DeleteUserUseCase {
        users: state.user_repo(),
    };
    usecase.execute(current.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /users/me/favorites ──────────────────────────────────────────────────

pub async fn list_favorites(
    current: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, ShopError> {
    let usecase = ListFavoritesUseCase {
        favorites: state.favorite_repo(),
    };
    let products = usecase.execute(current.id()).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}
