use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;

/// The business profile printed on invoices and quotes.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub iban: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCompany {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub iban: Option<String>,
    pub website: Option<String>,
}

pub type UpdateCompany = CreateCompany;

impl Company {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, name, email, phone, address, city, postal_code, siret, vat_number, iban, website, created_at, updated_at
               FROM companies
               ORDER BY id ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, name, email, phone, address, city, postal_code, siret, vat_number, iban, website, created_at, updated_at
               FROM companies
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// The profile used on rendered documents. The application keeps a single
    /// company row in practice; the oldest one wins if several exist.
    pub async fn find_profile(pool: &SqlitePool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, name, email, phone, address, city, postal_code, siret, vat_number, iban, website, created_at, updated_at
               FROM companies
               ORDER BY id ASC
               LIMIT 1"#,
        )
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateCompany) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO companies (name, email, phone, address, city, postal_code, siret, vat_number, iban, website)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING id, name, email, phone, address, city, postal_code, siret, vat_number, iban, website, created_at, updated_at"#,
        )
        .bind(data.name.trim())
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.postal_code)
        .bind(&data.siret)
        .bind(&data.vat_number)
        .bind(&data.iban)
        .bind(&data.website)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateCompany,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE companies
               SET name = $2, email = $3, phone = $4, address = $5, city = $6, postal_code = $7,
                   siret = $8, vat_number = $9, iban = $10, website = $11,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING id, name, email, phone, address, city, postal_code, siret, vat_number, iban, website, created_at, updated_at"#,
        )
        .bind(id)
        .bind(data.name.trim())
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.postal_code)
        .bind(&data.siret)
        .bind(&data.vat_number)
        .bind(&data.iban)
        .bind(&data.website)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
