use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbCartRepository, DbCategoryRepository, DbFavoriteRepository, DbOrderRepository,
    DbProductRepository, DbReviewRepository, DbSessionRepository, DbUserRepository,
    DbVerificationRepository,
};
use crate::infra::mail::MailTransport;
use crate::infra::storage::LocalBlobStore;
use crate::usecase::auth::TokenSettings;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub tokens: TokenSettings,
    pub mailer: MailTransport,
    pub blobs: LocalBlobStore,
    pub verification_ttl_secs: i64,
    pub max_avatar_bytes: usize,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn session_repo(&self) -> DbSessionRepository {
        DbSessionRepository {
            db: self.db.clone(),
        }
    }

    pub fn verification_repo(&self) -> DbVerificationRepository {
        DbVerificationRepository {
            db: self.db.clone(),
        }
    }

    pub fn product_repo(&self) -> DbProductRepository {
        DbProductRepository {
            db: self.db.clone(),
        }
    }

    pub fn category_repo(&self) -> DbCategoryRepository {
        DbCategoryRepository {
            db: self.db.clone(),
        }
    }

    pub fn review_repo(&self) -> DbReviewRepository {
        DbReviewRepository {
            db: self.db.clone(),
        }
    }

    pub fn favorite_repo(&self) -> DbFavoriteRepository {
        DbFavoriteRepository {
            db: self.db.clone(),
        }
    }

    pub fn cart_repo(&self) -> DbCartRepository {
        DbCartRepository {
            db: self.db.clone(),
        }
    }

    pub fn order_repo(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.db.clone(),
        }
    }
}
