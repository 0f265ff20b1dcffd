use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateClient {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateClient {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
}

impl Client {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, name, email, phone, address, city, postal_code, notes, created_at, updated_at
               FROM clients
               ORDER BY name COLLATE NOCASE ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, name, email, phone, address, city, postal_code, notes, created_at, updated_at
               FROM clients
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateClient) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO clients (name, email, phone, address, city, postal_code, notes)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, name, email, phone, address, city, postal_code, notes, created_at, updated_at"#,
        )
        .bind(data.name.trim())
        .bind(data.email.trim())
        .bind(&data.phone)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.postal_code)
        .bind(&data.notes)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateClient,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE clients
               SET name = $2, email = $3, phone = $4, address = $5, city = $6,
                   postal_code = $7, notes = $8, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING id, name, email, phone, address, city, postal_code, notes, created_at, updated_at"#,
        )
        .bind(id)
        .bind(data.name.trim())
        .bind(data.email.trim())
        .bind(&data.phone)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.postal_code)
        .bind(&data.notes)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
