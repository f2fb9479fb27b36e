use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserTimezones::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserTimezones::UserId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserTimezones::Timezone).text().null())
                    .col(
                        ColumnDef::new(UserTimezones::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserTimezones::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserTimezones {
    Table,
    UserId,
    Timezone,
    UpdatedAt,
}
