//! sea-orm implementations of the repository traits.

use anyhow::anyhow;
use sea_orm::{DbErr, SqlErr, TransactionError};

use crate::error::ShopError;

mod cart;
mod catalog;
mod orders;
mod sessions;
mod users;
mod verifications;

pub use cart::DbCartRepository;
pub use catalog::{
    DbCategoryRepository, DbFavoriteRepository, DbProductRepository, DbReviewRepository,
};
pub use orders::DbOrderRepository;
pub use sessions::DbSessionRepository;
pub use users::DbUserRepository;
pub use verifications::DbVerificationRepository;

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Collapse a transaction failure into the error raised inside it.
pub(crate) fn from_tx(err: TransactionError<ShopError>, what: &'static str) -> ShopError {
    match err {
        TransactionError::Connection(e) => ShopError::Internal(anyhow!(e).context(what)),
        TransactionError::Transaction(e) => e,
    }
}
