use invest_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240315_000002_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(referral_edge::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(referral_edge::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(referral_edge::Column::AncestorAccount)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(referral_edge::Column::DescendantAccount)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(referral_edge::Column::Level)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(referral_edge::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One ancestor per (descendant, level), a single upward chain per account
        manager
            .create_index(
                Index::create()
                    .name("uq_referral_edge_descendant_level")
                    .table(referral_edge::Entity)
                    .col(referral_edge::Column::DescendantAccount)
                    .col(referral_edge::Column::Level)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_referral_edge_ancestor")
                    .table(referral_edge::Entity)
                    .col(referral_edge::Column::AncestorAccount)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(referral_edge::Entity).to_owned())
            .await
    }
}
