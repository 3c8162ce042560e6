use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TotpDevices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TotpDevices::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    // One device per user; a second enrollment attempt fails on insert.
                    .col(
                        ColumnDef::new(TotpDevices::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TotpDevices::Name).string_len(64).not_null())
                    .col(ColumnDef::new(TotpDevices::Key).string_len(80).not_null())
                    .col(
                        ColumnDef::new(TotpDevices::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TotpDevices::Table, TotpDevices::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TotpDevices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TotpDevices {
    Table,
    Id,
    UserId,
    Name,
    Key,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
