use invest_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240315_000004_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(earning::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(earning::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(earning::Column::InvestmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(earning::Column::OwnerAccount)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(earning::Column::Amount).decimal().not_null())
                    .col(
                        ColumnDef::new(earning::Column::PayoutDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(earning::Column::Status).string().not_null())
                    .col(ColumnDef::new(earning::Column::PaidAt).big_integer())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_earning_investment")
                    .table(earning::Entity)
                    .col(earning::Column::InvestmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_earning_owner_status")
                    .table(earning::Entity)
                    .col(earning::Column::OwnerAccount)
                    .col(earning::Column::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(earning::Entity).to_owned())
            .await
    }
}
