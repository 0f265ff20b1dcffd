//! Routes for uploaded documents.

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::get,
};
use db::models::{
    document::{CreateDocument, Document},
    folder::Folder,
};
use services::services::storage::sanitize_file_name;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// Maximum size accepted for an upload request (10 MiB).
const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub async fn get_documents(
    State(app): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Document>>>, ApiError> {
    let documents = Document::find_all(&app.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(documents)))
}

pub async fn get_document(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Document>>, ApiError> {
    let document = Document::find_by_id(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("document"))?;
    Ok(ResponseJson(ApiResponse::success(document)))
}

/// Multipart upload: any number of `file` fields, plus an optional
/// `folder_id` text field applying to all of them.
pub async fn upload_documents(
    State(app): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Vec<Document>>>), ApiError> {
    let mut folder_id: Option<i64> = None;
    let mut files: Vec<(String, Option<String>, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("multipart read error: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("folder_id") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("multipart read error: {e}")))?;
                folder_id = Some(raw.trim().parse::<i64>().map_err(|_| {
                    ApiError::Validation(vec!["folder_id must be an integer".to_string()])
                })?);
            }
            _ => {
                let file_name = sanitize_file_name(field.file_name().unwrap_or("document"));
                let declared_mime = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("failed to read upload body: {e}")))?;
                files.push((file_name, declared_mime, bytes.to_vec()));
            }
        }
    }

    if files.is_empty() {
        return Err(ApiError::Validation(vec!["file is required".to_string()]));
    }

    if let Some(folder_id) = folder_id {
        Folder::find_by_id(&app.db().pool, folder_id)
            .await?
            .ok_or(ApiError::NotFound("folder"))?;
    }

    let mut documents = Vec::with_capacity(files.len());
    for (file_name, declared_mime, bytes) in files {
        let mime_type = declared_mime.unwrap_or_else(|| {
            mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .to_string()
        });
        let stored = app.storage().store(&file_name, &bytes).await?;
        let document = Document::create(
            &app.db().pool,
            &CreateDocument {
                folder_id,
                file_name,
                stored_name: stored.stored_name,
                mime_type,
                size_bytes: stored.size_bytes,
            },
        )
        .await?;
        documents.push(document);
    }

    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(documents)),
    ))
}

pub async fn download_document(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let document = Document::find_by_id(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("document"))?;
    let bytes = app.storage().read(&document.stored_name).await?;

    Ok((
        [
            (header::CONTENT_TYPE, document.mime_type.clone()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

pub async fn delete_document(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let document = Document::find_by_id(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("document"))?;

    Document::delete(&app.db().pool, id).await?;
    if let Err(e) = app.storage().remove(&document.stored_name).await {
        // The row is gone; a leftover file only wastes disk.
        tracing::warn!(
            stored_name = %document.stored_name,
            error = %e,
            "failed to remove stored file"
        );
    }

    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/documents",
        Router::new()
            .route(
                "/",
                get(get_documents)
                    .post(upload_documents)
                    .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
            )
            .route("/{id}", get(get_document).delete(delete_document))
            .route("/{id}/download", get(download_document)),
    )
}
