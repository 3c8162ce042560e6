use sea_orm_migration::prelude::*;

use zerogate_portal_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
