use engine::BootstrapOutcome;
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "kasir={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let timezone: chrono_tz::Tz = settings
        .app
        .timezone
        .parse()
        .map_err(|err| format!("invalid timezone {:?}: {err}", settings.app.timezone))?;

    let db = parse_database(&settings.server.database).await?;
    let engine = engine::Engine::builder()
        .database(db)
        .timezone(timezone)
        .build()
        .await?;

    let admin = settings
        .bootstrap
        .map(settings::Bootstrap::default_admin)
        .unwrap_or_default();
    match engine.ensure_default_admin(admin).await? {
        BootstrapOutcome::Created(user) => {
            tracing::warn!(username = %user.username, "created default admin, change its password");
        }
        BootstrapOutcome::AlreadyExists => {}
    }

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    tracing::info!(%timezone, "business time zone");
    server::run(engine, &addr).await?;

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
