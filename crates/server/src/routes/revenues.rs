//! Routes for revenue records.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use chrono::{Datelike, Utc};
use db::models::revenue::{CreateRevenue, MonthlyRevenue, Revenue, UpdateRevenue};
use serde::Deserialize;
use utils::{response::ApiResponse, validation};

use crate::{AppState, error::ApiError, extract::Json};

fn validate(payload: &CreateRevenue) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    validation::require(&mut errors, "label", &payload.label);
    validation::require_positive(&mut errors, "amount", payload.amount);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

pub async fn get_revenues(
    State(app): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Revenue>>>, ApiError> {
    let revenues = Revenue::find_all(&app.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(revenues)))
}

pub async fn get_revenue(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Revenue>>, ApiError> {
    let revenue = Revenue::find_by_id(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("revenue"))?;
    Ok(ResponseJson(ApiResponse::success(revenue)))
}

pub async fn create_revenue(
    State(app): State<AppState>,
    Json(payload): Json<CreateRevenue>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Revenue>>), ApiError> {
    validate(&payload)?;
    let revenue = Revenue::create(&app.db().pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(revenue)),
    ))
}

pub async fn update_revenue(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRevenue>,
) -> Result<ResponseJson<ApiResponse<Revenue>>, ApiError> {
    validate(&payload)?;
    let revenue = Revenue::update(&app.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("revenue"))?;
    Ok(ResponseJson(ApiResponse::success(revenue)))
}

pub async fn delete_revenue(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Revenue::delete(&app.db().pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("revenue"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    year: Option<i32>,
}

/// Per-month totals for a year (current year when unspecified).
pub async fn get_revenue_summary(
    State(app): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<MonthlyRevenue>>>, ApiError> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let summary = Revenue::monthly_summary(&app.db().pool, year).await?;
    Ok(ResponseJson(ApiResponse::success(summary)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/revenues",
        Router::new()
            .route("/", get(get_revenues).post(create_revenue))
            .route("/summary", get(get_revenue_summary))
            .route(
                "/{id}",
                get(get_revenue).put(update_revenue).delete(delete_revenue),
            ),
    )
}
