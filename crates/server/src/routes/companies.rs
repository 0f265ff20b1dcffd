//! Routes for the company profile.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::company::{Company, CreateCompany, UpdateCompany};
use utils::{response::ApiResponse, validation};

use crate::{AppState, error::ApiError, extract::Json};

fn validate(name: &str, email: Option<&str>) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    validation::require(&mut errors, "name", name);
    validation::optional_email(&mut errors, "email", email);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

pub async fn get_companies(
    State(app): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Company>>>, ApiError> {
    let companies = Company::find_all(&app.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(companies)))
}

pub async fn get_company(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Company>>, ApiError> {
    let company = Company::find_by_id(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("company"))?;
    Ok(ResponseJson(ApiResponse::success(company)))
}

pub async fn create_company(
    State(app): State<AppState>,
    Json(payload): Json<CreateCompany>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Company>>), ApiError> {
    validate(&payload.name, payload.email.as_deref())?;
    let company = Company::create(&app.db().pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(company)),
    ))
}

pub async fn update_company(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCompany>,
) -> Result<ResponseJson<ApiResponse<Company>>, ApiError> {
    validate(&payload.name, payload.email.as_deref())?;
    let company = Company::update(&app.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("company"))?;
    Ok(ResponseJson(ApiResponse::success(company)))
}

pub async fn delete_company(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Company::delete(&app.db().pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("company"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/companies",
        Router::new()
            .route("/", get(get_companies).post(create_company))
            .route(
                "/{id}",
                get(get_company).put(update_company).delete(delete_company),
            ),
    )
}
