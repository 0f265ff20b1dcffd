use chrono::NaiveDate;
use db::DBService;
use db::models::{
    client::{Client, CreateClient, UpdateClient},
    folder::{CreateFolder, Folder},
    invoice::{CreateInvoice, CreateLineItem, Invoice, InvoiceStatus},
    payment::{CreatePayment, Payment, PaymentMethod},
    quote::{ConversionError, CreateQuote, Quote, QuoteStatus},
    revenue::{CreateRevenue, Revenue},
    task::{CreateTask, Task, TaskStatus, UpdateTask},
};

async fn setup() -> DBService {
    DBService::new_in_memory()
        .await
        .expect("in-memory database")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_client() -> CreateClient {
    CreateClient {
        name: "Acme Studio".to_string(),
        email: "contact@acme.example".to_string(),
        phone: Some("+33 6 00 00 00 00".to_string()),
        address: None,
        city: Some("Lyon".to_string()),
        postal_code: None,
        notes: None,
    }
}

fn sample_invoice(client_id: i64, items: Vec<CreateLineItem>) -> CreateInvoice {
    CreateInvoice {
        client_id,
        number: None,
        status: None,
        issue_date: date(2025, 6, 1),
        due_date: date(2025, 7, 1),
        tax_rate: Some(20.0),
        notes: None,
        items,
    }
}

fn line(description: &str, quantity: f64, unit_price: f64) -> CreateLineItem {
    CreateLineItem {
        description: description.to_string(),
        quantity,
        unit_price,
    }
}

#[tokio::test]
async fn test_client_crud_roundtrip() {
    let db = setup().await;

    let created = Client::create(&db.pool, &sample_client()).await.unwrap();
    assert_eq!(created.name, "Acme Studio");
    assert!(created.id > 0);

    let fetched = Client::find_by_id(&db.pool, created.id)
        .await
        .unwrap()
        .expect("client exists");
    assert_eq!(fetched.email, "contact@acme.example");

    let updated = Client::update(
        &db.pool,
        created.id,
        &UpdateClient {
            name: "Acme Studio SARL".to_string(),
            email: "billing@acme.example".to_string(),
            phone: None,
            address: None,
            city: None,
            postal_code: None,
            notes: Some("renamed".to_string()),
        },
    )
    .await
    .unwrap()
    .expect("client exists");
    assert_eq!(updated.name, "Acme Studio SARL");
    assert_eq!(updated.phone, None);

    let deleted = Client::delete(&db.pool, created.id).await.unwrap();
    assert_eq!(deleted, 1);
    assert!(
        Client::find_by_id(&db.pool, created.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_update_missing_client_returns_none() {
    let db = setup().await;
    let result = Client::update(
        &db.pool,
        9999,
        &UpdateClient {
            name: "Nobody".to_string(),
            email: "n@example.com".to_string(),
            phone: None,
            address: None,
            city: None,
            postal_code: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_invoice_create_computes_totals_and_number() {
    let db = setup().await;
    let client = Client::create(&db.pool, &sample_client()).await.unwrap();

    let invoice = Invoice::create(
        &db.pool,
        &sample_invoice(
            client.id,
            vec![line("Design", 2.0, 400.0), line("Development", 5.0, 500.0)],
        ),
    )
    .await
    .unwrap();

    assert_eq!(invoice.subtotal, 3300.0);
    assert_eq!(invoice.tax_amount, 660.0);
    assert_eq!(invoice.total, 3960.0);
    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert!(invoice.number.starts_with("INV-"));
    assert_eq!(invoice.items.len(), 2);
    assert_eq!(invoice.items[0].amount, 800.0);
    assert_eq!(invoice.items[1].sort_order, 1);
}

#[tokio::test]
async fn test_invoice_update_replaces_items() {
    let db = setup().await;
    let client = Client::create(&db.pool, &sample_client()).await.unwrap();
    let invoice = Invoice::create(
        &db.pool,
        &sample_invoice(client.id, vec![line("Design", 1.0, 100.0)]),
    )
    .await
    .unwrap();

    let updated = Invoice::update(
        &db.pool,
        invoice.id,
        &db::models::invoice::UpdateInvoice {
            client_id: client.id,
            number: None,
            status: InvoiceStatus::Sent,
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            tax_rate: Some(0.0),
            notes: None,
            items: vec![line("Workshop", 3.0, 250.0)],
        },
    )
    .await
    .unwrap()
    .expect("invoice exists");

    assert_eq!(updated.status, InvoiceStatus::Sent);
    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.subtotal, 750.0);
    assert_eq!(updated.total, 750.0);
    // number survives a None in the update payload
    assert_eq!(updated.number, invoice.number);
}

#[tokio::test]
async fn test_payment_application_marks_invoice_paid() {
    let db = setup().await;
    let client = Client::create(&db.pool, &sample_client()).await.unwrap();
    let mut data = sample_invoice(client.id, vec![line("Dev", 1.0, 1000.0)]);
    data.status = Some(InvoiceStatus::Sent);
    data.tax_rate = None;
    let invoice = Invoice::create(&db.pool, &data).await.unwrap();

    let payment = Payment::create(
        &db.pool,
        &CreatePayment {
            invoice_id: Some(invoice.id),
            client_id: Some(client.id),
            amount: 400.0,
            method: Some(PaymentMethod::Card),
            reference: None,
            paid_at: date(2025, 6, 15),
            notes: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(payment.method, PaymentMethod::Card);

    let partial = Invoice::find_by_id(&db.pool, invoice.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(partial.amount_paid, 400.0);
    assert_eq!(partial.status, InvoiceStatus::Sent);

    Payment::create(
        &db.pool,
        &CreatePayment {
            invoice_id: Some(invoice.id),
            client_id: Some(client.id),
            amount: 600.0,
            method: None,
            reference: Some("wire-42".to_string()),
            paid_at: date(2025, 6, 20),
            notes: None,
        },
    )
    .await
    .unwrap();

    let settled = Invoice::find_by_id(&db.pool, invoice.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settled.amount_paid, 1000.0);
    assert_eq!(settled.status, InvoiceStatus::Paid);

    let listed = Payment::find_by_invoice_id(&db.pool, invoice.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn test_payment_deletion_reverts_invoice_balance() {
    let db = setup().await;
    let client = Client::create(&db.pool, &sample_client()).await.unwrap();
    let mut data = sample_invoice(client.id, vec![line("Dev", 1.0, 500.0)]);
    data.status = Some(InvoiceStatus::Sent);
    data.tax_rate = None;
    let invoice = Invoice::create(&db.pool, &data).await.unwrap();

    let payment = Payment::create(
        &db.pool,
        &CreatePayment {
            invoice_id: Some(invoice.id),
            client_id: None,
            amount: 500.0,
            method: None,
            reference: None,
            paid_at: date(2025, 6, 15),
            notes: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(
        Invoice::find_by_id(&db.pool, invoice.id)
            .await
            .unwrap()
            .unwrap()
            .status,
        InvoiceStatus::Paid
    );

    let deleted = Payment::delete(&db.pool, payment.id).await.unwrap();
    assert_eq!(deleted, 1);

    let reverted = Invoice::find_by_id(&db.pool, invoice.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reverted.amount_paid, 0.0);
    assert_eq!(reverted.status, InvoiceStatus::Sent);
}

#[tokio::test]
async fn test_quote_conversion_creates_invoice() {
    let db = setup().await;
    let client = Client::create(&db.pool, &sample_client()).await.unwrap();

    let quote = Quote::create(
        &db.pool,
        &CreateQuote {
            client_id: client.id,
            number: Some("QUO-CUSTOM-1".to_string()),
            status: Some(QuoteStatus::Accepted),
            issue_date: date(2025, 5, 1),
            valid_until: date(2025, 6, 1),
            tax_rate: Some(20.0),
            notes: Some("Initial scope".to_string()),
            items: vec![line("Audit", 1.0, 1500.0)],
        },
    )
    .await
    .unwrap();
    assert_eq!(quote.number, "QUO-CUSTOM-1");

    let invoice = Quote::convert_to_invoice(&db.pool, quote.id).await.unwrap();
    assert_eq!(invoice.client_id, client.id);
    assert_eq!(invoice.total, quote.total);
    assert_eq!(invoice.items.len(), 1);
    assert_eq!(invoice.items[0].description, "Audit");

    let converted = Quote::find_by_id(&db.pool, quote.id).await.unwrap().unwrap();
    assert_eq!(converted.status, QuoteStatus::Converted);
    assert_eq!(converted.converted_invoice_id, Some(invoice.id));

    // a second conversion is rejected
    let err = Quote::convert_to_invoice(&db.pool, quote.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ConversionError::AlreadyConverted));
}

#[tokio::test]
async fn test_convert_missing_quote() {
    let db = setup().await;
    let err = Quote::convert_to_invoice(&db.pool, 77).await.unwrap_err();
    assert!(matches!(err, ConversionError::NotFound));
}

#[tokio::test]
async fn test_mark_overdue_and_expired() {
    let db = setup().await;
    let client = Client::create(&db.pool, &sample_client()).await.unwrap();

    let mut sent = sample_invoice(client.id, vec![line("Dev", 1.0, 100.0)]);
    sent.status = Some(InvoiceStatus::Sent);
    sent.due_date = date(2025, 1, 31);
    let overdue_candidate = Invoice::create(&db.pool, &sent).await.unwrap();

    let mut draft = sample_invoice(client.id, vec![line("Dev", 1.0, 100.0)]);
    draft.due_date = date(2025, 1, 31);
    let draft_invoice = Invoice::create(&db.pool, &draft).await.unwrap();

    let changed = Invoice::mark_overdue(&db.pool, date(2025, 3, 1)).await.unwrap();
    assert_eq!(changed, 1);

    assert_eq!(
        Invoice::find_by_id(&db.pool, overdue_candidate.id)
            .await
            .unwrap()
            .unwrap()
            .status,
        InvoiceStatus::Overdue
    );
    // drafts are left alone
    assert_eq!(
        Invoice::find_by_id(&db.pool, draft_invoice.id)
            .await
            .unwrap()
            .unwrap()
            .status,
        InvoiceStatus::Draft
    );

    let quote = Quote::create(
        &db.pool,
        &CreateQuote {
            client_id: client.id,
            number: None,
            status: Some(QuoteStatus::Sent),
            issue_date: date(2025, 1, 1),
            valid_until: date(2025, 1, 31),
            tax_rate: None,
            notes: None,
            items: vec![],
        },
    )
    .await
    .unwrap();

    let expired = Quote::mark_expired(&db.pool, date(2025, 3, 1)).await.unwrap();
    assert_eq!(expired, 1);
    assert_eq!(
        Quote::find_by_id(&db.pool, quote.id).await.unwrap().unwrap().status,
        QuoteStatus::Expired
    );
}

#[tokio::test]
async fn test_task_lifecycle() {
    let db = setup().await;
    let client = Client::create(&db.pool, &sample_client()).await.unwrap();

    let task = Task::create(
        &db.pool,
        &CreateTask {
            client_id: Some(client.id),
            title: "Send contract".to_string(),
            description: None,
            status: None,
            due_date: Some(date(2025, 6, 10)),
        },
    )
    .await
    .unwrap();
    assert_eq!(task.status, TaskStatus::Todo);

    let done = Task::update(
        &db.pool,
        task.id,
        &UpdateTask {
            client_id: Some(client.id),
            title: "Send contract".to_string(),
            description: Some("signed".to_string()),
            status: TaskStatus::Done,
            due_date: None,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(done.status, TaskStatus::Done);
    assert_eq!(done.due_date, None);

    let by_client = Task::find_by_client_id(&db.pool, client.id).await.unwrap();
    assert_eq!(by_client.len(), 1);
}

#[tokio::test]
async fn test_revenue_monthly_summary() {
    let db = setup().await;

    for (label, amount, when) in [
        ("Retainer", 1200.0, date(2025, 1, 15)),
        ("Workshop", 800.0, date(2025, 1, 28)),
        ("Consulting", 500.0, date(2025, 3, 2)),
        ("Old contract", 999.0, date(2024, 12, 31)),
    ] {
        Revenue::create(
            &db.pool,
            &CreateRevenue {
                label: label.to_string(),
                amount,
                source: None,
                received_at: when,
                notes: None,
            },
        )
        .await
        .unwrap();
    }

    let summary = Revenue::monthly_summary(&db.pool, 2025).await.unwrap();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].month, 1);
    assert_eq!(summary[0].total, 2000.0);
    assert_eq!(summary[1].month, 3);
    assert_eq!(summary[1].total, 500.0);
}

#[tokio::test]
async fn test_folder_deletion_detaches_documents() {
    let db = setup().await;

    let folder = Folder::create(
        &db.pool,
        &CreateFolder {
            name: "Contracts".to_string(),
        },
    )
    .await
    .unwrap();

    let document = db::models::document::Document::create(
        &db.pool,
        &db::models::document::CreateDocument {
            folder_id: Some(folder.id),
            file_name: "contract.pdf".to_string(),
            stored_name: "abc123.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size_bytes: 1024,
        },
    )
    .await
    .unwrap();

    let in_folder = db::models::document::Document::find_by_folder_id(&db.pool, folder.id)
        .await
        .unwrap();
    assert_eq!(in_folder.len(), 1);

    Folder::delete(&db.pool, folder.id).await.unwrap();

    let detached = db::models::document::Document::find_by_id(&db.pool, document.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detached.folder_id, None);
}
