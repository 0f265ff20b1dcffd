//! Routes for quotes, including conversion into invoices.

use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::{get, post},
};
use db::models::{
    client::Client,
    company::Company,
    invoice::InvoiceWithItems,
    quote::{CreateQuote, Quote, QuoteWithItems, UpdateQuote},
};
use services::services::pdf;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, extract::Json, routes::invoices::validate_billing};

pub async fn get_quotes(
    State(app): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Quote>>>, ApiError> {
    let quotes = Quote::find_all(&app.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(quotes)))
}

pub async fn get_quote(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<QuoteWithItems>>, ApiError> {
    let quote = Quote::find_with_items(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("quote"))?;
    Ok(ResponseJson(ApiResponse::success(quote)))
}

pub async fn create_quote(
    State(app): State<AppState>,
    Json(payload): Json<CreateQuote>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<QuoteWithItems>>), ApiError> {
    validate_billing(
        &app,
        payload.client_id,
        payload.issue_date,
        "valid_until",
        payload.valid_until,
        &payload.items,
    )
    .await?;
    let quote = Quote::create(&app.db().pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(quote)),
    ))
}

pub async fn update_quote(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuote>,
) -> Result<ResponseJson<ApiResponse<QuoteWithItems>>, ApiError> {
    validate_billing(
        &app,
        payload.client_id,
        payload.issue_date,
        "valid_until",
        payload.valid_until,
        &payload.items,
    )
    .await?;
    let quote = Quote::update(&app.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("quote"))?;
    Ok(ResponseJson(ApiResponse::success(quote)))
}

pub async fn delete_quote(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Quote::delete(&app.db().pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("quote"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// Turn an accepted quote into a draft invoice carrying its items.
pub async fn convert_quote(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<InvoiceWithItems>>), ApiError> {
    let invoice = Quote::convert_to_invoice(&app.db().pool, id).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(invoice)),
    ))
}

/// Render the quote as a downloadable PDF.
pub async fn get_quote_pdf(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let quote = Quote::find_with_items(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("quote"))?;
    let client = Client::find_by_id(&app.db().pool, quote.client_id)
        .await?
        .ok_or(ApiError::NotFound("client"))?;
    let company = Company::find_profile(&app.db().pool).await?;

    let bytes = pdf::render_quote(company.as_ref(), &client, &quote);
    let file_name = format!("quote-{}.pdf", quote.number);

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/quotes",
        Router::new()
            .route("/", get(get_quotes).post(create_quote))
            .route(
                "/{id}",
                get(get_quote).put(update_quote).delete(delete_quote),
            )
            .route("/{id}/convert", post(convert_quote))
            .route("/{id}/pdf", get(get_quote_pdf)),
    )
}
