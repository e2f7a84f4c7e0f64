use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(fusion_shop_migration::Migrator).await;
}
