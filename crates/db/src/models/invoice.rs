use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default)]
#[sqlx(type_name = "invoice_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Invoice {
    pub id: i64,
    pub client_id: i64,
    pub number: String,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub tax_rate: f64,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub amount_paid: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct InvoiceWithItems {
    #[serde(flatten)]
    #[ts(flatten)]
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

impl std::ops::Deref for InvoiceWithItems {
    type Target = Invoice;
    fn deref(&self) -> &Self::Target {
        &self.invoice
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateLineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateInvoice {
    pub client_id: i64,
    /// Generated (`INV-<year>-<seq>`) when absent.
    pub number: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub tax_rate: Option<f64>,
    pub notes: Option<String>,
    pub items: Vec<CreateLineItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateInvoice {
    pub client_id: i64,
    pub number: Option<String>,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub tax_rate: Option<f64>,
    pub notes: Option<String>,
    /// Replaces the existing line items.
    pub items: Vec<CreateLineItem>,
}

/// Totals derived from line items, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total: f64,
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn compute_totals(items: &[CreateLineItem], tax_rate: f64) -> Totals {
    let subtotal = round_cents(
        items
            .iter()
            .map(|item| item.quantity * item.unit_price)
            .sum(),
    );
    let tax_amount = round_cents(subtotal * tax_rate / 100.0);
    Totals {
        subtotal,
        tax_amount,
        total: round_cents(subtotal + tax_amount),
    }
}

impl Invoice {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, client_id, number, status, issue_date, due_date, tax_rate, subtotal, tax_amount, total, amount_paid, notes, created_at, updated_at
               FROM invoices
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
            r#"SELECT id, client_id, number, status, issue_date, due_date, tax_rate, subtotal, tax_amount, total, amount_paid, notes, created_at, updated_at
               FROM invoices
               WHERE client_id = $1
               ORDER BY issue_date DESC, id DESC"#,
        )
        .bind(client_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, client_id, number, status, issue_date, due_date, tax_rate, subtotal, tax_amount, total, amount_paid, notes, created_at, updated_at
               FROM invoices
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_with_items(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<InvoiceWithItems>, sqlx::Error> {
        let Some(invoice) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let items = InvoiceItem::find_by_invoice_id(pool, id).await?;
        Ok(Some(InvoiceWithItems { invoice, items }))
    }

    /// Next document number in the `INV-<year>-<seq>` sequence.
    pub async fn next_number<'e, E>(executor: E) -> Result<String, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let seq: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) + 1 FROM invoices")
            .fetch_one(executor)
            .await?;
        Ok(format!("INV-{}-{:04}", Utc::now().format("%Y"), seq))
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateInvoice,
    ) -> Result<InvoiceWithItems, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let number = match data.number.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => Self::next_number(&mut *tx).await?,
        };
        let status = data.status.clone().unwrap_or_default();
        let tax_rate = data.tax_rate.unwrap_or(0.0);
        let totals = compute_totals(&data.items, tax_rate);

        let invoice = sqlx::query_as::<_, Self>(
            r#"INSERT INTO invoices (client_id, number, status, issue_date, due_date, tax_rate, subtotal, tax_amount, total, notes)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING id, client_id, number, status, issue_date, due_date, tax_rate, subtotal, tax_amount, total, amount_paid, notes, created_at, updated_at"#,
        )
        .bind(data.client_id)
        .bind(&number)
        .bind(&status)
        .bind(data.issue_date)
        .bind(data.due_date)
        .bind(tax_rate)
        .bind(totals.subtotal)
        .bind(totals.tax_amount)
        .bind(totals.total)
        .bind(&data.notes)
        .fetch_one(&mut *tx)
        .await?;

        let items = InvoiceItem::insert_all(&mut tx, invoice.id, &data.items).await?;

        tx.commit().await?;
        Ok(InvoiceWithItems { invoice, items })
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateInvoice,
    ) -> Result<Option<InvoiceWithItems>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let tax_rate = data.tax_rate.unwrap_or(0.0);
        let totals = compute_totals(&data.items, tax_rate);

        let invoice = sqlx::query_as::<_, Self>(
            r#"UPDATE invoices
               SET client_id = $2, number = COALESCE($3, number), status = $4, issue_date = $5,
                   due_date = $6, tax_rate = $7, subtotal = $8, tax_amount = $9, total = $10,
                   notes = $11, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING id, client_id, number, status, issue_date, due_date, tax_rate, subtotal, tax_amount, total, amount_paid, notes, created_at, updated_at"#,
        )
        .bind(id)
        .bind(data.client_id)
        .bind(data.number.as_deref().map(str::trim).filter(|n| !n.is_empty()))
        .bind(&data.status)
        .bind(data.issue_date)
        .bind(data.due_date)
        .bind(tax_rate)
        .bind(totals.subtotal)
        .bind(totals.tax_amount)
        .bind(totals.total)
        .bind(&data.notes)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(invoice) = invoice else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let items = InvoiceItem::insert_all(&mut tx, id, &data.items).await?;

        tx.commit().await?;
        Ok(Some(InvoiceWithItems { invoice, items }))
    }

    /// Record a payment against the invoice, flipping it to `paid` once fully
    /// covered. Runs on the caller's executor so it can join a transaction.
    pub async fn apply_payment<'e, E>(executor: E, id: i64, amount: f64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"UPDATE invoices
               SET amount_paid = amount_paid + $2,
                   status = CASE WHEN amount_paid + $2 >= total THEN 'paid' ELSE status END,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(amount)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Undo a previously applied payment (payment deletion).
    pub async fn revert_payment<'e, E>(
        executor: E,
        id: i64,
        amount: f64,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"UPDATE invoices
               SET amount_paid = MAX(amount_paid - $2, 0),
                   status = CASE WHEN status = 'paid' AND amount_paid - $2 < total THEN 'sent' ELSE status END,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(amount)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Flag sent invoices past their due date. Returns the number updated.
    pub async fn mark_overdue(pool: &SqlitePool, today: NaiveDate) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE invoices
               SET status = 'overdue', updated_at = datetime('now', 'subsec')
               WHERE status = 'sent' AND due_date < $1"#,
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
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

impl InvoiceItem {
    pub async fn find_by_invoice_id(
        pool: &SqlitePool,
        invoice_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, invoice_id, description, quantity, unit_price, amount, sort_order
               FROM invoice_items
               WHERE invoice_id = $1
               ORDER BY sort_order ASC, id ASC"#,
        )
        .bind(invoice_id)
        .fetch_all(pool)
        .await
    }

    async fn insert_all(
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        invoice_id: i64,
        items: &[CreateLineItem],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut inserted = Vec::with_capacity(items.len());
        for (sort_order, item) in items.iter().enumerate() {
            let row = sqlx::query_as::<_, Self>(
                r#"INSERT INTO invoice_items (invoice_id, description, quantity, unit_price, amount, sort_order)
                   VALUES ($1, $2, $3, $4, $5, $6)
                   RETURNING id, invoice_id, description, quantity, unit_price, amount, sort_order"#,
            )
            .bind(invoice_id)
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

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: f64, unit_price: f64) -> CreateLineItem {
        CreateLineItem {
            description: "work".to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_totals_no_tax() {
        let totals = compute_totals(&[item(2.0, 100.0), item(1.5, 80.0)], 0.0);
        assert_eq!(totals.subtotal, 320.0);
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.total, 320.0);
    }

    #[test]
    fn test_totals_with_tax() {
        let totals = compute_totals(&[item(1.0, 1000.0)], 20.0);
        assert_eq!(totals.subtotal, 1000.0);
        assert_eq!(totals.tax_amount, 200.0);
        assert_eq!(totals.total, 1200.0);
    }

    #[test]
    fn test_totals_rounding() {
        // 3 * 33.333 = 99.999 -> 100.00 at cent precision
        let totals = compute_totals(&[item(3.0, 33.333)], 0.0);
        assert_eq!(totals.subtotal, 100.0);
    }

    #[test]
    fn test_totals_empty_items() {
        let totals = compute_totals(&[], 20.0);
        assert_eq!(totals.total, 0.0);
    }
}
