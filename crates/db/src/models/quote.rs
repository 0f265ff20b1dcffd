use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use ts_rs::TS;

use super::invoice::{
    CreateLineItem, Invoice, InvoiceItem, InvoiceStatus, InvoiceWithItems, compute_totals,
    round_cents,
};

#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default)]
#[sqlx(type_name = "quote_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Declined,
    Expired,
    Converted,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Quote {
    pub id: i64,
    pub client_id: i64,
    pub number: String,
    pub status: QuoteStatus,
    pub issue_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub tax_rate: f64,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub converted_invoice_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct QuoteItem {
    pub id: i64,
    pub quote_id: i64,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct QuoteWithItems {
    #[serde(flatten)]
    #[ts(flatten)]
    pub quote: Quote,
    pub items: Vec<QuoteItem>,
}

impl std::ops::Deref for QuoteWithItems {
    type Target = Quote;
    fn deref(&self) -> &Self::Target {
        &self.quote
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateQuote {
    pub client_id: i64,
    /// Generated (`QUO-<year>-<seq>`) when absent.
    pub number: Option<String>,
    pub status: Option<QuoteStatus>,
    pub issue_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub tax_rate: Option<f64>,
    pub notes: Option<String>,
    pub items: Vec<CreateLineItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateQuote {
    pub client_id: i64,
    pub number: Option<String>,
    pub status: QuoteStatus,
    pub issue_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub tax_rate: Option<f64>,
    pub notes: Option<String>,
    /// Replaces the existing line items.
    pub items: Vec<CreateLineItem>,
}

impl Quote {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, client_id, number, status, issue_date, valid_until, tax_rate, subtotal, tax_amount, total, converted_invoice_id, notes, created_at, updated_at
               FROM quotes
               ORDER BY issue_date DESC, id DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_client_id(
        pool: &SqlitePool,
        client_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, client_id, number, status, issue_date, valid_until, tax_rate, subtotal, tax_amount, total, converted_invoice_id, notes, created_at, updated_at
               FROM quotes
               WHERE client_id = $1
               ORDER BY issue_date DESC, id DESC"#,
        )
        .bind(client_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, client_id, number, status, issue_date, valid_until, tax_rate, subtotal, tax_amount, total, converted_invoice_id, notes, created_at, updated_at
               FROM quotes
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_with_items(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<QuoteWithItems>, sqlx::Error> {
        let Some(quote) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let items = QuoteItem::find_by_quote_id(pool, id).await?;
        Ok(Some(QuoteWithItems { quote, items }))
    }

    pub async fn next_number<'e, E>(executor: E) -> Result<String, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let seq: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) + 1 FROM quotes")
            .fetch_one(executor)
            .await?;
        Ok(format!("QUO-{}-{:04}", Utc::now().format("%Y"), seq))
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateQuote,
    ) -> Result<QuoteWithItems, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let number = match data.number.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => Self::next_number(&mut *tx).await?,
        };
        let status = data.status.clone().unwrap_or_default();
        let tax_rate = data.tax_rate.unwrap_or(0.0);
        let totals = compute_totals(&data.items, tax_rate);

        let quote = sqlx::query_as::<_, Self>(
            r#"INSERT INTO quotes (client_id, number, status, issue_date, valid_until, tax_rate, subtotal, tax_amount, total, notes)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING id, client_id, number, status, issue_date, valid_until, tax_rate, subtotal, tax_amount, total, converted_invoice_id, notes, created_at, updated_at"#,
        )
        .bind(data.client_id)
        .bind(&number)
        .bind(&status)
        .bind(data.issue_date)
        .bind(data.valid_until)
        .bind(tax_rate)
        .bind(totals.subtotal)
        .bind(totals.tax_amount)
        .bind(totals.total)
        .bind(&data.notes)
        .fetch_one(&mut *tx)
        .await?;

        let items = QuoteItem::insert_all(&mut tx, quote.id, &data.items).await?;

        tx.commit().await?;
        Ok(QuoteWithItems { quote, items })
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateQuote,
    ) -> Result<Option<QuoteWithItems>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let tax_rate = data.tax_rate.unwrap_or(0.0);
        let totals = compute_totals(&data.items, tax_rate);

        let quote = sqlx::query_as::<_, Self>(
            r#"UPDATE quotes
               SET client_id = $2, number = COALESCE($3, number), status = $4, issue_date = $5,
                   valid_until = $6, tax_rate = $7, subtotal = $8, tax_amount = $9, total = $10,
                   notes = $11, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING id, client_id, number, status, issue_date, valid_until, tax_rate, subtotal, tax_amount, total, converted_invoice_id, notes, created_at, updated_at"#,
        )
        .bind(id)
        .bind(data.client_id)
        .bind(data.number.as_deref().map(str::trim).filter(|n| !n.is_empty()))
        .bind(&data.status)
        .bind(data.issue_date)
        .bind(data.valid_until)
        .bind(tax_rate)
        .bind(totals.subtotal)
        .bind(totals.tax_amount)
        .bind(totals.total)
        .bind(&data.notes)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(quote) = quote else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM quote_items WHERE quote_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let items = QuoteItem::insert_all(&mut tx, id, &data.items).await?;

        tx.commit().await?;
        Ok(Some(QuoteWithItems { quote, items }))
    }

    /// Create an invoice from the quote and mark the quote converted.
    pub async fn convert_to_invoice(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<InvoiceWithItems, ConversionError> {
        let with_items = Self::find_with_items(pool, id)
            .await?
            .ok_or(ConversionError::NotFound)?;
        if with_items.status == QuoteStatus::Converted {
            return Err(ConversionError::AlreadyConverted);
        }

        let mut tx = pool.begin().await?;

        let number = Invoice::next_number(&mut *tx).await?;
        let issue_date = Utc::now().date_naive();
        let due_date = issue_date + Duration::days(30);

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"INSERT INTO invoices (client_id, number, status, issue_date, due_date, tax_rate, subtotal, tax_amount, total, notes)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING id, client_id, number, status, issue_date, due_date, tax_rate, subtotal, tax_amount, total, amount_paid, notes, created_at, updated_at"#,
        )
        .bind(with_items.client_id)
        .bind(&number)
        .bind(InvoiceStatus::Draft)
        .bind(issue_date)
        .bind(due_date)
        .bind(with_items.tax_rate)
        .bind(with_items.subtotal)
        .bind(with_items.tax_amount)
        .bind(with_items.total)
        .bind(&with_items.notes)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(with_items.items.len());
        for item in &with_items.items {
            let row = sqlx::query_as::<_, InvoiceItem>(
                r#"INSERT INTO invoice_items (invoice_id, description, quantity, unit_price, amount, sort_order)
                   VALUES ($1, $2, $3, $4, $5, $6)
                   RETURNING id, invoice_id, description, quantity, unit_price, amount, sort_order"#,
            )
            .bind(invoice.id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.amount)
            .bind(item.sort_order)
            .fetch_one(&mut *tx)
            .await?;
            items.push(row);
        }

        sqlx::query(
            r#"UPDATE quotes
               SET status = 'converted', converted_invoice_id = $2, updated_at = datetime('now', 'subsec')
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(invoice.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(InvoiceWithItems { invoice, items })
    }

    /// Flag sent quotes past their validity date. Returns the number updated.
    pub async fn mark_expired(pool: &SqlitePool, today: NaiveDate) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE quotes
               SET status = 'expired', updated_at = datetime('now', 'subsec')
               WHERE status = 'sent' AND valid_until < $1"#,
        )
        .bind(today)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("quote not found")]
    NotFound,
    #[error("quote has already been converted")]
    AlreadyConverted,
}

impl QuoteItem {
    pub async fn find_by_quote_id(
        pool: &SqlitePool,
        quote_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, quote_id, description, quantity, unit_price, amount, sort_order
               FROM quote_items
               WHERE quote_id = $1
               ORDER BY sort_order ASC, id ASC"#,
        )
        .bind(quote_id)
        .fetch_all(pool)
        .await
    }

    async fn insert_all(
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        quote_id: i64,
        items: &[CreateLineItem],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut inserted = Vec::with_capacity(items.len());
        for (sort_order, item) in items.iter().enumerate() {
            let row = sqlx::query_as::<_, Self>(
                r#"INSERT INTO quote_items (quote_id, description, quantity, unit_price, amount, sort_order)
                   VALUES ($1, $2, $3, $4, $5, $6)
                   RETURNING id, quote_id, description, quantity, unit_price, amount, sort_order"#,
            )
            .bind(quote_id)
            .bind(item.description.trim())
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(round_cents(item.quantity * item.unit_price))
            .bind(sort_order as i64)
            .fetch_one(&mut **tx)
            .await?;
            inserted.push(row);
        }
        Ok(inserted)
    }
}
