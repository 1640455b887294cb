use std::net::SocketAddr;

use migration::{Migrator, MigratorTrait};
use settings::Database;
use tracing_subscriber::EnvFilter;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "potion_shop={level},server={level},engine={level}",
            level = settings.app.level
        )))
        .init();

    let Some(server) = settings.server else {
        tracing::warn!("no server settings found, nothing to run");
        return Ok(());
    };

    let db = parse_database(&server.database).await?;
    let engine = engine::Engine::builder()
        .database(db)
        .config(settings.shop)
        .build()
        .await?;
    if let Some(tx) = engine.open_shop().await? {
        tracing::info!(%tx, "opening balance written");
    }

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr: SocketAddr = format!("{}:{}", bind, server.port).parse()?;
    server::run(server::ServerState::new(engine, server.api_key), addr).await;

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
