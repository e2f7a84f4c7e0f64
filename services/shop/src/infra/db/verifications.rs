use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QuerySelect, TransactionTrait,
};

use fusion_domain::verification::VerificationKind;
use fusion_shop_schema::{users, verifications};

use crate::domain::repository::VerificationRepository;
use crate::domain::types::{ConsumeOutcome, Verification, VerificationEffect};
use crate::error::ShopError;
use crate::infra::db::{from_tx, users::insert_verification};

#[derive(Clone)]
pub struct DbVerificationRepository {
    pub db: DatabaseConnection,
}

impl VerificationRepository for DbVerificationRepository {
    async fn create(&self, verification: &Verification) -> Result<(), ShopError> {
        insert_verification(&self.db, verification)
            .await
            .context("create verification")?;
        Ok(())
    }

    async fn consume(
        &self,
        token: &str,
        kind: VerificationKind,
        effect: &VerificationEffect,
    ) -> Result<ConsumeOutcome, ShopError> {
        let token = token.to_owned();
        let effect = effect.clone();
        self.db
            .transaction::<_, ConsumeOutcome, ShopError>(|txn| {
                Box::pin(async move {
                    let Some(row) = verifications::Entity::find()
                        .filter(verifications::Column::Token.eq(token))
                        .filter(verifications::Column::Kind.eq(kind.as_str()))
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .context("lock verification")?
                    else {
                        return Ok(ConsumeOutcome::NotFound);
                    };

                    let now = Utc::now();
                    if row.expires_at <= now {
                        return Ok(ConsumeOutcome::Expired);
                    }

                    let mut owner = users::ActiveModel {
                        id: Set(row.user_id),
                        updated_at: Set(now),
                        ..Default::default()
                    };
                    match effect {
                        VerificationEffect::MarkEmailVerified => {
                            owner.is_email_verified = Set(true);
                        }
                        VerificationEffect::SetPasswordHash(hash) => {
                            owner.password_hash = Set(hash);
                        }
                    }
                    owner
                        .update(txn)
                        .await
                        .context("apply verification effect")?;

                    let user_id = row.user_id;
                    row.delete(txn).await.context("delete verification")?;
                    Ok(ConsumeOutcome::Consumed { user_id })
                })
            })
            .await
            .map_err(|e| from_tx(e, "consume verification"))
    }
}
