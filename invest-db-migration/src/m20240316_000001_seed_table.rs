use invest_db_entity::db::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DbBackend, Statement};
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240316_000001_seed_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(commission_rate::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(commission_rate::Column::Level)
                            .small_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(commission_rate::Column::RatePercent)
                            .decimal()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        let conn = manager.get_connection();
        let seed_statement = Statement::from_string(DbBackend::Postgres, SEED_RATES.to_string());
        match conn.execute(seed_statement).await {
            Ok(_) => Ok(()),
            Err(error) => Err(error),
        }
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(commission_rate::Entity).to_owned())
            .await
    }
}

const SEED_RATES: &str = r#"INSERT INTO public.commission_rate (level, rate_percent) VALUES
    (1, 10), (2, 8), (3, 6), (4, 4),
    (5, 2), (6, 2), (7, 2), (8, 2), (9, 2), (10, 2)
    ON CONFLICT (level) DO NOTHING;"#;
