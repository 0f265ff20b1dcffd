//! Routes for payments.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    invoice::Invoice,
    payment::{CreatePayment, Payment},
};
use utils::{response::ApiResponse, validation};

use crate::{AppState, error::ApiError, extract::Json};

async fn validate(app: &AppState, payload: &CreatePayment) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    validation::require_positive(&mut errors, "amount", payload.amount);
    if let Some(invoice_id) = payload.invoice_id
        && Invoice::find_by_id(&app.db().pool, invoice_id)
            .await?
            .is_none()
    {
        errors.push("invoice not found".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

pub async fn get_payments(
    State(app): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Payment>>>, ApiError> {
    let payments = Payment::find_all(&app.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(payments)))
}

pub async fn get_payment(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Payment>>, ApiError> {
    let payment = Payment::find_by_id(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("payment"))?;
    Ok(ResponseJson(ApiResponse::success(payment)))
}

pub async fn create_payment(
    State(app): State<AppState>,
    Json(payload): Json<CreatePayment>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Payment>>), ApiError> {
    validate(&app, &payload).await?;
    let payment = Payment::create(&app.db().pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(payment)),
    ))
}

pub async fn update_payment(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CreatePayment>,
) -> Result<ResponseJson<ApiResponse<Payment>>, ApiError> {
    validate(&app, &payload).await?;
    let payment = Payment::update(&app.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("payment"))?;
    Ok(ResponseJson(ApiResponse::success(payment)))
}

pub async fn delete_payment(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Payment::delete(&app.db().pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("payment"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/payments",
        Router::new()
            .route("/", get(get_payments).post(create_payment))
            .route(
                "/{id}",
                get(get_payment).put(update_payment).delete(delete_payment),
            ),
    )
}
