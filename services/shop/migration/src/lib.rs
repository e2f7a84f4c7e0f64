pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_permissions;
mod m20260301_000003_create_sessions;
mod m20260301_000004_create_verifications;
mod m20260301_000005_create_catalog;
mod m20260301_000006_create_reviews_and_favorites;
mod m20260301_000007_create_carts;
mod m20260301_000008_create_orders;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_permissions::Migration),
            Box::new(m20260301_000003_create_sessions::Migration),
            Box::new(m20260301_000004_create_verifications::Migration),
            Box::new(m20260301_000005_create_catalog::Migration),
            Box::new(m20260301_000006_create_reviews_and_favorites::Migration),
            Box::new(m20260301_000007_create_carts::Migration),
            Box::new(m20260301_000008_create_orders::Migration),
        ]
    }
}
