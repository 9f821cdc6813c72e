use invest_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240315_000003_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(investment::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(investment::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(investment::Column::OwnerAccount)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(investment::Column::Amount)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(investment::Column::Status)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(investment::Column::ProofReference).string())
                    .col(ColumnDef::new(investment::Column::DecisionNotes).string())
                    .col(
                        ColumnDef::new(investment::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(investment::Column::StartDate).big_integer())
                    .col(ColumnDef::new(investment::Column::EndDate).big_integer())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_investment_owner")
                    .table(investment::Entity)
                    .col(investment::Column::OwnerAccount)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(investment::Entity).to_owned())
            .await
    }
}
