//! Routes for tasks.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    client::Client,
    task::{CreateTask, Task, UpdateTask},
};
use utils::{response::ApiResponse, validation};

use crate::{AppState, error::ApiError, extract::Json};

async fn validate(app: &AppState, title: &str, client_id: Option<i64>) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    validation::require(&mut errors, "title", title);
    if let Some(client_id) = client_id
        && Client::find_by_id(&app.db().pool, client_id)
            .await?
            .is_none()
    {
        errors.push("client not found".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

pub async fn get_tasks(
    State(app): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Task>>>, ApiError> {
    let tasks = Task::find_all(&app.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn get_task(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task = Task::find_by_id(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("task"))?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn create_task(
    State(app): State<AppState>,
    Json(payload): Json<CreateTask>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Task>>), ApiError> {
    validate(&app, &payload.title, payload.client_id).await?;
    let task = Task::create(&app.db().pool, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(task))))
}

pub async fn update_task(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    validate(&app, &payload.title, payload.client_id).await?;
    let task = Task::update(&app.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("task"))?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn delete_task(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Task::delete(&app.db().pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("task"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/tasks",
        Router::new()
            .route("/", get(get_tasks).post(create_task))
            .route("/{id}", get(get_task).put(update_task).delete(delete_task)),
    )
}
