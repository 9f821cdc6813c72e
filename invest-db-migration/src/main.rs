use figment::{
    providers::{Format, Toml},
    Figment,
};
use invest_db_migration::Migrator;
use sea_orm_migration::cli;
use serde::Deserialize;

#[derive(Deserialize)]
struct MigrationConfig {
    database_url: String,
}

#[tokio::main]
async fn main() {
    if std::env::var("DATABASE_URL").is_err() {
        match Figment::new()
            .merge(Toml::file("App.toml"))
            .extract::<MigrationConfig>()
        {
            Ok(config) => std::env::set_var("DATABASE_URL", &config.database_url),
            Err(error) => {
                eprintln!("No DATABASE_URL and no App.toml: {}", error);
            }
        }
    }
    cli::run_cli(Migrator).await;
}
