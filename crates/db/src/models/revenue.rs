use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;

/// A standalone income record, independent of invoicing.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Revenue {
    pub id: i64,
    pub label: String,
    pub amount: f64,
    pub source: Option<String>,
    pub received_at: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateRevenue {
    pub label: String,
    pub amount: f64,
    pub source: Option<String>,
    pub received_at: NaiveDate,
    pub notes: Option<String>,
}

pub type UpdateRevenue = CreateRevenue;

/// One row of the per-month summary for a year.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct MonthlyRevenue {
    pub month: i64,
    pub total: f64,
}

impl Revenue {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, label, amount, source, received_at, notes, created_at
               FROM revenues
               ORDER BY received_at DESC, id DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, label, amount, source, received_at, notes, created_at
               FROM revenues
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateRevenue) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO revenues (label, amount, source, received_at, notes)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, label, amount, source, received_at, notes, created_at"#,
        )
        .bind(data.label.trim())
        .bind(data.amount)
        .bind(&data.source)
        .bind(data.received_at)
        .bind(&data.notes)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateRevenue,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE revenues
               SET label = $2, amount = $3, source = $4, received_at = $5, notes = $6
               WHERE id = $1
               RETURNING id, label, amount, source, received_at, notes, created_at"#,
        )
        .bind(id)
        .bind(data.label.trim())
        .bind(data.amount)
        .bind(&data.source)
        .bind(data.received_at)
        .bind(&data.notes)
        .fetch_optional(pool)
        .await
    }

    /// Totals grouped by month for the given year. Months without income are
    /// absent from the result.
    pub async fn monthly_summary(
        pool: &SqlitePool,
        year: i32,
    ) -> Result<Vec<MonthlyRevenue>, sqlx::Error> {
        sqlx::query_as::<_, MonthlyRevenue>(
            r#"SELECT CAST(strftime('%m', received_at) AS INTEGER) AS month,
                      COALESCE(SUM(amount), 0.0) AS total
               FROM revenues
               WHERE strftime('%Y', received_at) = printf('%04d', $1)
               GROUP BY month
               ORDER BY month ASC"#,
        )
        .bind(year)
        .fetch_all(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM revenues WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
