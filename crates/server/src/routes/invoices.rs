//! Routes for invoices and their line items.

use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::get,
};
use chrono::NaiveDate;
use db::models::{
    client::Client,
    company::Company,
    invoice::{CreateInvoice, CreateLineItem, Invoice, InvoiceWithItems, UpdateInvoice},
    payment::Payment,
};
use services::services::pdf;
use utils::{response::ApiResponse, validation};

use crate::{AppState, error::ApiError, extract::Json};

/// Validation shared by invoice and quote payloads: the referenced client
/// must exist, dates must be ordered, and every line item must be sane.
pub(crate) async fn validate_billing(
    app: &AppState,
    client_id: i64,
    issue_date: NaiveDate,
    end_field: &str,
    end_date: NaiveDate,
    items: &[CreateLineItem],
) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if Client::find_by_id(&app.db().pool, client_id).await?.is_none() {
        errors.push("client not found".to_string());
    }
    validation::require_date_order(&mut errors, "issue_date", issue_date, end_field, end_date);
    for (i, item) in items.iter().enumerate() {
        validation::require(&mut errors, &format!("items[{i}].description"), &item.description);
        validation::require_positive(&mut errors, &format!("items[{i}].quantity"), item.quantity);
        if !item.unit_price.is_finite() || item.unit_price < 0.0 {
            errors.push(format!("items[{i}].unit_price cannot be negative"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

pub async fn get_invoices(
    State(app): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Invoice>>>, ApiError> {
    let invoices = Invoice::find_all(&app.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(invoices)))
}

pub async fn get_invoice(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<InvoiceWithItems>>, ApiError> {
    let invoice = Invoice::find_with_items(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("invoice"))?;
    Ok(ResponseJson(ApiResponse::success(invoice)))
}

pub async fn create_invoice(
    State(app): State<AppState>,
    Json(payload): Json<CreateInvoice>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<InvoiceWithItems>>), ApiError> {
    validate_billing(
        &app,
        payload.client_id,
        payload.issue_date,
        "due_date",
        payload.due_date,
        &payload.items,
    )
    .await?;
    let invoice = Invoice::create(&app.db().pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(invoice)),
    ))
}

pub async fn update_invoice(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateInvoice>,
) -> Result<ResponseJson<ApiResponse<InvoiceWithItems>>, ApiError> {
    validate_billing(
        &app,
        payload.client_id,
        payload.issue_date,
        "due_date",
        payload.due_date,
        &payload.items,
    )
    .await?;
    let invoice = Invoice::update(&app.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("invoice"))?;
    Ok(ResponseJson(ApiResponse::success(invoice)))
}

pub async fn delete_invoice(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Invoice::delete(&app.db().pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("invoice"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn get_invoice_payments(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<Payment>>>, ApiError> {
    Invoice::find_by_id(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("invoice"))?;
    let payments = Payment::find_by_invoice_id(&app.db().pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(payments)))
}

/// Render the invoice as a downloadable PDF.
pub async fn get_invoice_pdf(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let invoice = Invoice::find_with_items(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("invoice"))?;
    let client = Client::find_by_id(&app.db().pool, invoice.client_id)
        .await?
        .ok_or(ApiError::NotFound("client"))?;
    let company = Company::find_profile(&app.db().pool).await?;

    let bytes = pdf::render_invoice(company.as_ref(), &client, &invoice);
    let file_name = format!("invoice-{}.pdf", invoice.number);

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
        "/invoices",
        Router::new()
            .route("/", get(get_invoices).post(create_invoice))
            .route(
                "/{id}",
                get(get_invoice).put(update_invoice).delete(delete_invoice),
            )
            .route("/{id}/payments", get(get_invoice_payments))
            .route("/{id}/pdf", get(get_invoice_pdf)),
    )
}
