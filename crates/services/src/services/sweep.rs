//! Background sweep flagging overdue invoices and expired quotes.

use std::time::Duration;

use chrono::Utc;
use db::{
    DBService,
    models::{invoice::Invoice, quote::Quote},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::time::interval;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SweepOutcome {
    pub overdue_invoices: u64,
    pub expired_quotes: u64,
}

/// Periodically flags billing documents whose dates have lapsed.
pub struct BillingSweepService {
    db: DBService,
    poll_interval: Duration,
}

impl BillingSweepService {
    /// Spawn the background sweep loop.
    pub fn spawn(db: DBService) -> tokio::task::JoinHandle<()> {
        let service = Self {
            db,
            poll_interval: Duration::from_secs(3600), // due/valid-until dates are day-granular
        };
        tokio::spawn(async move {
            service.start().await;
        })
    }

    async fn start(&self) {
        info!(
            "Starting billing sweep service with interval {:?}",
            self.poll_interval
        );

        let mut interval = interval(self.poll_interval);

        loop {
            interval.tick().await;
            match Self::sweep(&self.db.pool).await {
                Ok(outcome) if outcome != SweepOutcome::default() => {
                    info!(
                        overdue_invoices = outcome.overdue_invoices,
                        expired_quotes = outcome.expired_quotes,
                        "Billing sweep flagged lapsed documents"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    error!("Error running billing sweep: {}", e);
                }
            }
        }
    }

    /// Run one pass against today's date. Exposed separately so callers and
    /// tests can sweep without the loop.
    pub async fn sweep(pool: &SqlitePool) -> Result<SweepOutcome, SweepError> {
        let today = Utc::now().date_naive();
        let overdue_invoices = Invoice::mark_overdue(pool, today).await?;
        let expired_quotes = Quote::mark_expired(pool, today).await?;
        Ok(SweepOutcome {
            overdue_invoices,
            expired_quotes,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, Utc};
    use db::models::{
        client::{Client, CreateClient},
        invoice::{CreateInvoice, Invoice, InvoiceStatus},
    };

    use super::*;

    #[tokio::test]
    async fn test_sweep_flags_past_due_sent_invoices() {
        let db = DBService::new_in_memory().await.unwrap();
        let client = Client::create(
            &db.pool,
            &CreateClient {
                name: "Acme".to_string(),
                email: "acme@example.com".to_string(),
                phone: None,
                address: None,
                city: None,
                postal_code: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        let today = Utc::now().date_naive();
        let invoice = Invoice::create(
            &db.pool,
            &CreateInvoice {
                client_id: client.id,
                number: None,
                status: Some(InvoiceStatus::Sent),
                issue_date: today - ChronoDuration::days(60),
                due_date: today - ChronoDuration::days(30),
                tax_rate: None,
                notes: None,
                items: vec![],
            },
        )
        .await
        .unwrap();

        let outcome = BillingSweepService::sweep(&db.pool).await.unwrap();
        assert_eq!(outcome.overdue_invoices, 1);
        assert_eq!(outcome.expired_quotes, 0);

        let flagged = Invoice::find_by_id(&db.pool, invoice.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(flagged.status, InvoiceStatus::Overdue);

        // idempotent: a second pass has nothing left to flag
        let outcome = BillingSweepService::sweep(&db.pool).await.unwrap();
        assert_eq!(outcome, SweepOutcome::default());
    }
}
