pub mod clients;
pub mod companies;
pub mod documents;
pub mod folders;
pub mod health;
pub mod invoices;
pub mod payments;
pub mod quotes;
pub mod revenues;
pub mod tasks;
