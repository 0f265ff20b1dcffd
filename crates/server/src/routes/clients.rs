//! Routes for client records.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    client::{Client, CreateClient, UpdateClient},
    invoice::Invoice,
    quote::Quote,
    task::Task,
};
use utils::{response::ApiResponse, validation};

use crate::{AppState, error::ApiError, extract::Json};

fn validate(name: &str, email: &str) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    validation::require(&mut errors, "name", name);
    validation::require_email(&mut errors, "email", email);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

pub async fn get_clients(
    State(app): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Client>>>, ApiError> {
    let clients = Client::find_all(&app.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(clients)))
}

pub async fn get_client(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    let client = Client::find_by_id(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("client"))?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

pub async fn create_client(
    State(app): State<AppState>,
    Json(payload): Json<CreateClient>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Client>>), ApiError> {
    validate(&payload.name, &payload.email)?;
    let client = Client::create(&app.db().pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(client)),
    ))
}

pub async fn update_client(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateClient>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    validate(&payload.name, &payload.email)?;
    let client = Client::update(&app.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("client"))?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

pub async fn delete_client(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Client::delete(&app.db().pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("client"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// Invoices belonging to a client, for the client detail view.
pub async fn get_client_invoices(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<Invoice>>>, ApiError> {
    Client::find_by_id(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("client"))?;
    let invoices = Invoice::find_by_client_id(&app.db().pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(invoices)))
}

pub async fn get_client_quotes(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<Quote>>>, ApiError> {
    Client::find_by_id(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("client"))?;
    let quotes = Quote::find_by_client_id(&app.db().pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(quotes)))
}

pub async fn get_client_tasks(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<Task>>>, ApiError> {
    Client::find_by_id(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("client"))?;
    let tasks = Task::find_by_client_id(&app.db().pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/clients",
        Router::new()
            .route("/", get(get_clients).post(create_client))
            .route(
                "/{id}",
                get(get_client).put(update_client).delete(delete_client),
            )
            .route("/{id}/invoices", get(get_client_invoices))
            .route("/{id}/quotes", get(get_client_quotes))
            .route("/{id}/tasks", get(get_client_tasks)),
    )
}
