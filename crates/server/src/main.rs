use db::DBService;
use server::{AppState, config::Config};
use services::services::{storage::StorageService, sweep::BillingSweepService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let db = DBService::new(&config.database_url).await?;
    let storage = StorageService::new(&config.upload_dir).await?;

    BillingSweepService::spawn(db.clone());

    let state = AppState::new(db, storage);
    let app = server::app(state, config.cors_origin.as_deref())?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
