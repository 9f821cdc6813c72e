use invest_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240315_000005_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(commission_record::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(commission_record::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(commission_record::Column::AncestorAccount)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(commission_record::Column::DescendantAccount)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(commission_record::Column::InvestmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(commission_record::Column::Level)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(commission_record::Column::BaseAmount)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(commission_record::Column::CommissionAmount)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(commission_record::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Guards the fan-out against duplicate payout of the same level
        manager
            .create_index(
                Index::create()
                    .name("uq_commission_record_fanout")
                    .table(commission_record::Entity)
                    .col(commission_record::Column::AncestorAccount)
                    .col(commission_record::Column::DescendantAccount)
                    .col(commission_record::Column::InvestmentId)
                    .col(commission_record::Column::Level)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_commission_record_ancestor")
                    .table(commission_record::Entity)
                    .col(commission_record::Column::AncestorAccount)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(commission_record::Entity).to_owned())
            .await
    }
}
