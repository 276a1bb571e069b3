pub mod auth;
pub mod invoices;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reports;
pub mod sales;
pub mod users;
pub mod vouchers;
