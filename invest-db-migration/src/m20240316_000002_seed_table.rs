use invest_db_entity::db::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DbBackend, Statement};
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240316_000002_seed_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(withdrawal_settings::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(withdrawal_settings::Column::Id)
                            .small_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(withdrawal_settings::Column::MinAmount)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(withdrawal_settings::Column::MaxAmount)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(withdrawal_settings::Column::FeePercent)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(withdrawal_settings::Column::MinBalanceRequired)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(withdrawal_settings::Column::ProcessingSlaHours)
                            .integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        let conn = manager.get_connection();
        let seed_statement = Statement::from_string(DbBackend::Postgres, SEED_SETTINGS.to_string());
        match conn.execute(seed_statement).await {
            Ok(_) => Ok(()),
            Err(error) => Err(error),
        }
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(withdrawal_settings::Entity).to_owned())
            .await
    }
}

const SEED_SETTINGS: &str = r#"INSERT INTO public.withdrawal_settings
    (id, min_amount, max_amount, fee_percent, min_balance_required, processing_sla_hours)
    VALUES (1, 1000, 100000, 0, 0, 72)
    ON CONFLICT (id) DO NOTHING;"#;
