pub mod client;
pub mod company;
pub mod document;
pub mod folder;
pub mod invoice;
pub mod payment;
pub mod quote;
pub mod revenue;
pub mod task;
