use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use uuid::Uuid;

use fusion_shop_schema::sessions;

use crate::domain::repository::SessionRepository;
use crate::domain::types::Session;
use crate::error::ShopError;

#[derive(Clone)]
pub struct DbSessionRepository {
    pub db: DatabaseConnection,
}

impl SessionRepository for DbSessionRepository {
    async fn create(&self, session: &Session) -> Result<(), ShopError> {
        sessions::ActiveModel {
            id: Set(session.id),
            user_id: Set(session.user_id),
            token: Set(session.token.clone()),
            user_agent: Set(session.user_agent.clone()),
            is_active: Set(session.is_active),
            issued_at: Set(session.issued_at),
            expires_at: Set(session.expires_at),
        }
        .insert(&self.db)
        .await
        .context("create session")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, ShopError> {
        let model = sessions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find session by id")?;
        Ok(model.map(session_from_model))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, ShopError> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::Id.eq(id))
            .filter(sessions::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("delete session")?;
        Ok(result.rows_affected > 0)
    }
}

fn session_from_model(model: sessions::Model) -> Session {
    Session {
        id: model.id,
        user_id: model.user_id,
        token: model.token,
        user_agent: model.user_agent,
        is_active: model.is_active,
        issued_at: model.issued_at,
        expires_at: model.expires_at,
    }
}
