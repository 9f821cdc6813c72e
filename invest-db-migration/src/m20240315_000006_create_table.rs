use invest_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240315_000006_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(withdrawal::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(withdrawal::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(withdrawal::Column::OwnerAccount)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(withdrawal::Column::Amount)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(withdrawal::Column::BankDestination)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(withdrawal::Column::Status)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(withdrawal::Column::Notes).string())
                    .col(
                        ColumnDef::new(withdrawal::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(withdrawal::Column::ProcessedAt).big_integer())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_withdrawal_owner_status")
                    .table(withdrawal::Entity)
                    .col(withdrawal::Column::OwnerAccount)
                    .col(withdrawal::Column::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(withdrawal::Entity).to_owned())
            .await
    }
}
