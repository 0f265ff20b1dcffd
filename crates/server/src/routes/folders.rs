//! Routes for document folders.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    document::Document,
    folder::{CreateFolder, Folder},
};
use utils::{response::ApiResponse, validation};

use crate::{AppState, error::ApiError, extract::Json};

pub async fn get_folders(
    State(app): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Folder>>>, ApiError> {
    let folders = Folder::find_all(&app.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(folders)))
}

pub async fn create_folder(
    State(app): State<AppState>,
    Json(payload): Json<CreateFolder>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Folder>>), ApiError> {
    let mut errors = Vec::new();
    validation::require(&mut errors, "name", &payload.name);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let folder = Folder::create(&app.db().pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(folder)),
    ))
}

/// Documents grouped under a folder.
pub async fn get_folder_documents(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<Document>>>, ApiError> {
    Folder::find_by_id(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("folder"))?;
    let documents = Document::find_by_folder_id(&app.db().pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(documents)))
}

pub async fn delete_folder(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Folder::delete(&app.db().pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("folder"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/folders",
        Router::new()
            .route("/", get(get_folders).post(create_folder))
            .route("/{id}", axum::routing::delete(delete_folder))
            .route("/{id}/documents", get(get_folder_documents)),
    )
}
