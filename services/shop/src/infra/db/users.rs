use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, ModelTrait, QueryFilter, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use fusion_domain::permission::PermissionSet;
use fusion_domain::verification::VerificationKind;
use fusion_shop_schema::{permissions, users, verifications};

use crate::domain::repository::UserRepository;
use crate::domain::types::{ProfilePatch, User, Verification};
use crate::error::ShopError;
use crate::infra::db::{from_tx, is_unique_violation};

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ShopError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ShopError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ShopError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        Ok(model.map(user_from_model))
    }

    async fn permissions(&self, user_id: Uuid) -> Result<PermissionSet, ShopError> {
        let Some(user) = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .context("find user for permissions")?
        else {
            return Ok(PermissionSet::new());
        };
        let rows = user
            .find_related(permissions::Entity)
            .all(&self.db)
            .await
            .context("load user permissions")?;
        Ok(PermissionSet::from_names(rows.iter().map(|p| p.name.as_str())))
    }

    async fn create_with_verification(
        &self,
        user: &User,
        verification: &Verification,
    ) -> Result<(), ShopError> {
        let user = user.clone();
        let verification = verification.clone();
        self.db
            .transaction::<_, (), ShopError>(|txn| {
                Box::pin(async move {
                    insert_user(txn, &user).await.map_err(|e| {
                        if is_unique_violation(&e) {
                            ShopError::UserAlreadyExists
                        } else {
                            ShopError::Internal(anyhow::Error::new(e).context("insert user"))
                        }
                    })?;
                    insert_verification(txn, &verification)
                        .await
                        .context("insert email verification")?;
                    Ok(())
                })
            })
            .await
            .map_err(|e| from_tx(e, "create user with verification"))
    }

    async fn replace_unverified(
        &self,
        user_id: Uuid,
        username: &str,
        password_hash: &str,
        verification: &Verification,
    ) -> Result<(), ShopError> {
        let username = username.to_owned();
        let password_hash = password_hash.to_owned();
        let verification = verification.clone();
        self.db
            .transaction::<_, (), ShopError>(|txn| {
                Box::pin(async move {
                    let updated = users::Entity::update_many()
                        .col_expr(users::Column::Username, Expr::value(username))
                        .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
                        .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(users::Column::Id.eq(user_id))
                        .filter(users::Column::IsEmailVerified.eq(false))
                        .exec(txn)
                        .await
                        .map_err(|e| {
                            if is_unique_violation(&e) {
                                ShopError::UsernameTaken
                            } else {
                                ShopError::Internal(
                                    anyhow::Error::new(e).context("overwrite unverified user"),
                                )
                            }
                        })?;
                    // Verified (or deleted) since the caller looked it up.
                    if updated.rows_affected == 0 {
                        return Err(ShopError::UserAlreadyExists);
                    }

                    verifications::Entity::delete_many()
                        .filter(verifications::Column::UserId.eq(user_id))
                        .filter(
                            verifications::Column::Kind
                                .eq(VerificationKind::EmailVerify.as_str()),
                        )
                        .exec(txn)
                        .await
                        .context("drop stale email verifications")?;
                    insert_verification(txn, &verification)
                        .await
                        .context("insert email verification")?;
                    Ok(())
                })
            })
            .await
            .map_err(|e| from_tx(e, "replace unverified user"))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<User, ShopError> {
        let mut model = users::ActiveModel {
            id: Set(user_id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(username) = &patch.username {
            model.username = Set(username.clone());
        }
        if let Some(phone) = &patch.phone {
            model.phone = Set(Some(phone.clone()));
        }
        match model.update(&self.db).await {
            Ok(updated) => Ok(user_from_model(updated)),
            Err(DbErr::RecordNotUpdated) => Err(ShopError::UserNotFound),
            Err(e) if is_unique_violation(&e) => Err(ShopError::UsernameTaken),
            Err(e) => Err(anyhow::Error::new(e).context("update user profile").into()),
        }
    }

    async fn set_avatar(&self, user_id: Uuid, avatar: &str) -> Result<(), ShopError> {
        users::ActiveModel {
            id: Set(user_id),
            avatar: Set(Some(avatar.to_owned())),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set user avatar")?;
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<bool, ShopError> {
        let result = users::Entity::delete_by_id(user_id)
            .exec(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected > 0)
    }
}

async fn insert_user<C: ConnectionTrait>(db: &C, user: &User) -> Result<(), DbErr> {
    users::ActiveModel {
        id: Set(user.id),
        email: Set(user.email.clone()),
        username: Set(user.username.clone()),
        password_hash: Set(user.password_hash.clone()),
        is_email_verified: Set(user.is_email_verified),
        avatar: Set(user.avatar.clone()),
        phone: Set(user.phone.clone()),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    }
    .insert(db)
    .await?;
    Ok(())
}

pub(super) async fn insert_verification<C: ConnectionTrait>(
    db: &C,
    verification: &Verification,
) -> Result<(), DbErr> {
    verifications::ActiveModel {
        id: Set(verification.id),
        kind: Set(verification.kind.as_str().to_owned()),
        token: Set(verification.token.clone()),
        user_id: Set(verification.user_id),
        expires_at: Set(verification.expires_at),
        created_at: Set(verification.created_at),
    }
    .insert(db)
    .await?;
    Ok(())
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        username: model.username,
        password_hash: model.password_hash,
        is_email_verified: model.is_email_verified,
        avatar: model.avatar,
        phone: model.phone,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
