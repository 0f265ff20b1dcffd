use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use super::invoice::Invoice;

#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default)]
#[sqlx(type_name = "payment_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Transfer,
    Card,
    Cash,
    Check,
    Other,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Payment {
    pub id: i64,
    pub invoice_id: Option<i64>,
    pub client_id: Option<i64>,
    pub amount: f64,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub paid_at: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreatePayment {
    pub invoice_id: Option<i64>,
    pub client_id: Option<i64>,
    pub amount: f64,
    pub method: Option<PaymentMethod>,
    pub reference: Option<String>,
    pub paid_at: NaiveDate,
    pub notes: Option<String>,
}

impl Payment {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, invoice_id, client_id, amount, method, reference, paid_at, notes, created_at
               FROM payments
               ORDER BY paid_at DESC, id DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, invoice_id, client_id, amount, method, reference, paid_at, notes, created_at
               FROM payments
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_invoice_id(
        pool: &SqlitePool,
        invoice_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, invoice_id, client_id, amount, method, reference, paid_at, notes, created_at
               FROM payments
               WHERE invoice_id = $1
               ORDER BY paid_at DESC, id DESC"#,
        )
        .bind(invoice_id)
        .fetch_all(pool)
        .await
    }

    /// Insert the payment and, when it targets an invoice, apply it to the
    /// invoice balance in the same transaction.
    pub async fn create(pool: &SqlitePool, data: &CreatePayment) -> Result<Self, sqlx::Error> {
        let method = data.method.clone().unwrap_or_default();
        let mut tx = pool.begin().await?;

        let payment = sqlx::query_as::<_, Self>(
            r#"INSERT INTO payments (invoice_id, client_id, amount, method, reference, paid_at, notes)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, invoice_id, client_id, amount, method, reference, paid_at, notes, created_at"#,
        )
        .bind(data.invoice_id)
        .bind(data.client_id)
        .bind(data.amount)
        .bind(&method)
        .bind(&data.reference)
        .bind(data.paid_at)
        .bind(&data.notes)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(invoice_id) = payment.invoice_id {
            Invoice::apply_payment(&mut *tx, invoice_id, payment.amount).await?;
        }

        tx.commit().await?;
        Ok(payment)
    }

    /// Rewrite the payment, moving its applied amount from the old linked
    /// invoice (if any) to the new one.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &CreatePayment,
    ) -> Result<Option<Self>, sqlx::Error> {
        let method = data.method.clone().unwrap_or_default();
        let mut tx = pool.begin().await?;

        let Some(existing) = sqlx::query_as::<_, Self>(
            r#"SELECT id, invoice_id, client_id, amount, method, reference, paid_at, notes, created_at
               FROM payments
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        if let Some(invoice_id) = existing.invoice_id {
            Invoice::revert_payment(&mut *tx, invoice_id, existing.amount).await?;
        }

        let payment = sqlx::query_as::<_, Self>(
            r#"UPDATE payments
               SET invoice_id = $2, client_id = $3, amount = $4, method = $5, reference = $6,
                   paid_at = $7, notes = $8
               WHERE id = $1
               RETURNING id, invoice_id, client_id, amount, method, reference, paid_at, notes, created_at"#,
        )
        .bind(id)
        .bind(data.invoice_id)
        .bind(data.client_id)
        .bind(data.amount)
        .bind(&method)
        .bind(&data.reference)
        .bind(data.paid_at)
        .bind(&data.notes)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(invoice_id) = payment.invoice_id {
            Invoice::apply_payment(&mut *tx, invoice_id, payment.amount).await?;
        }

        tx.commit().await?;
        Ok(Some(payment))
    }

    /// Delete the payment, reversing its effect on the linked invoice.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(payment) = sqlx::query_as::<_, Self>(
            r#"SELECT id, invoice_id, client_id, amount, method, reference, paid_at, notes, created_at
               FROM payments
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(0);
        };

        if let Some(invoice_id) = payment.invoice_id {
            Invoice::revert_payment(&mut *tx, invoice_id, payment.amount).await?;
        }

        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
