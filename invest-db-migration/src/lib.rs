pub use sea_orm_migration::prelude::*;

mod m20240315_000001_create_table;
mod m20240315_000002_create_table;
mod m20240315_000003_create_table;
mod m20240315_000004_create_table;
mod m20240315_000005_create_table;
mod m20240315_000006_create_table;
mod m20240316_000001_seed_table;
mod m20240316_000002_seed_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240315_000001_create_table::Migration),
            Box::new(m20240315_000002_create_table::Migration),
            Box::new(m20240315_000003_create_table::Migration),
            Box::new(m20240315_000004_create_table::Migration),
            Box::new(m20240315_000005_create_table::Migration),
            Box::new(m20240315_000006_create_table::Migration),
            Box::new(m20240316_000001_seed_table::Migration),
            Box::new(m20240316_000002_seed_table::Migration),
        ]
    }
}
