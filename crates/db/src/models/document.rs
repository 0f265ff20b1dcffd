use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;

/// Metadata for an uploaded file. The bytes live on disk under the uploads
/// directory, keyed by `stored_name`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Document {
    pub id: i64,
    pub folder_id: Option<i64>,
    pub file_name: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub folder_id: Option<i64>,
    pub file_name: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
}

impl Document {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, folder_id, file_name, stored_name, mime_type, size_bytes, created_at
               FROM documents
               ORDER BY created_at DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_folder_id(
        pool: &SqlitePool,
        folder_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, folder_id, file_name, stored_name, mime_type, size_bytes, created_at
               FROM documents
               WHERE folder_id = $1
               ORDER BY created_at DESC"#,
        )
        .bind(folder_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, folder_id, file_name, stored_name, mime_type, size_bytes, created_at
               FROM documents
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateDocument) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO documents (folder_id, file_name, stored_name, mime_type, size_bytes)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, folder_id, file_name, stored_name, mime_type, size_bytes, created_at"#,
        )
        .bind(data.folder_id)
        .bind(&data.file_name)
        .bind(&data.stored_name)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .fetch_one(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
