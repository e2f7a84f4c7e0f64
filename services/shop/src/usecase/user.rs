use uuid::Uuid;

use crate::domain::repository::{BlobStore, FavoriteRepository, UserRepository};
use crate::domain::types::{Product, ProfilePatch, User, normalize_phone, validate_username};
use crate::error::ShopError;

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, id: Uuid) -> Result<User, ShopError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(ShopError::UserNotFound)
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileInput {
    pub username: Option<String>,
    pub phone: Option<String>,
}

pub struct UpdateProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateProfileUseCase<U> {
    pub async fn execute(&self, user_id: Uuid, input: UpdateProfileInput) -> Result<User, ShopError> {
        if input.username.is_none() && input.phone.is_none() {
            return Err(ShopError::MissingData);
        }

        let username = match input.username {
            Some(raw) => {
                let username = raw.trim().to_owned();
                if !validate_username(&username) {
                    return Err(ShopError::InvalidField("username"));
                }
                if let Some(holder) = self.users.find_by_username(&username).await? {
                    if holder.id != user_id {
                        return Err(ShopError::UsernameTaken);
                    }
                }
                Some(username)
            }
            None => None,
        };
        let phone = match input.phone {
            Some(raw) => Some(normalize_phone(&raw).ok_or(ShopError::InvalidField("phone"))?),
            None => None,
        };

        let user = self
            .users
            .update_profile(user_id, &ProfilePatch { username, phone })
            .await?;
        tracing::info!(%user_id, "profile updated");
        Ok(user)
    }
}

// ── UploadAvatar ─────────────────────────────────────────────────────────────

pub struct UploadAvatarInput {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub struct UploadAvatarUseCase<U: UserRepository, B: BlobStore> {
    pub users: U,
    pub blobs: B,
    pub max_bytes: usize,
}

/// File extension for an accepted avatar content type.
fn avatar_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

impl<U: UserRepository, B: BlobStore> UploadAvatarUseCase<U, B> {
    /// Store the image, point the user at it and drop the previous one.
    /// Returns the public URL of the new avatar.
    pub async fn execute(&self, user: &User, input: UploadAvatarInput) -> Result<String, ShopError> {
        if input.bytes.is_empty() {
            return Err(ShopError::MissingData);
        }
        if input.bytes.len() > self.max_bytes {
            return Err(ShopError::AvatarTooLarge);
        }
        let ext = input
            .content_type
            .as_deref()
            .and_then(avatar_extension)
            .ok_or(ShopError::InvalidField("avatar"))?;

        let key = format!("avatars/{}-{}.{ext}", user.id, Uuid::now_v7());
        let url = self.blobs.put(&key, &input.bytes).await?;
        if let Err(e) = self.users.set_avatar(user.id, &url).await {
            if let Err(cleanup) = self.blobs.remove(&key).await {
                tracing::warn!(
                    user_id = %user.id,
                    error = %cleanup,
                    "failed to remove orphaned avatar"
                );
            }
            return Err(e);
        }

        if let Some(old_key) = user
            .avatar
            .as_deref()
            .and_then(|old| self.blobs.key_from_url(old))
        {
            if let Err(e) = self.blobs.remove(old_key).await {
                tracing::warn!(user_id = %user.id, error = %e, "failed to remove previous avatar");
            }
        }

        tracing::info!(user_id = %user.id, %url, "avatar uploaded");
        Ok(url)
    }
}

// ── DeleteUser ───────────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> DeleteUserUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<(), ShopError> {
        if !self.users.delete(user_id).await? {
            return Err(ShopError::UserNotFound);
        }
        tracing::info!(%user_id, "user deleted");
        Ok(())
    }
}

// ── ListFavorites ────────────────────────────────────────────────────────────

pub struct ListFavoritesUseCase<F: FavoriteRepository> {
    pub favorites: F,
}

impl<F: FavoriteRepository> ListFavoritesUseCase<F> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<Product>, ShopError> {
        self.favorites.list_products(user_id).await
    }
}
