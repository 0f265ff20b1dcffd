use axum::{Router, http::HeaderValue};
use db::DBService;
use services::services::storage::StorageService;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    db: DBService,
    storage: StorageService,
}

impl AppState {
    pub fn new(db: DBService, storage: StorageService) -> Self {
        Self { db, storage }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn storage(&self) -> &StorageService {
        &self.storage
    }
}

/// Assemble the application router.
///
/// With no `cors_origin` the API answers any origin, matching the default of
/// the SPA dev setup; in production the origin comes from the environment.
pub fn app(state: AppState, cors_origin: Option<&str>) -> Result<Router, anyhow::Error> {
    let api = Router::new()
        .merge(routes::health::router())
        .merge(routes::clients::router())
        .merge(routes::companies::router())
        .merge(routes::documents::router())
        .merge(routes::folders::router())
        .merge(routes::invoices::router())
        .merge(routes::payments::router())
        .merge(routes::quotes::router())
        .merge(routes::revenues::router())
        .merge(routes::tasks::router());

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    Ok(Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
