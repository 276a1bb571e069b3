pub mod auth_service;
pub mod cash_service;
pub mod invoice_service;
pub mod mapping;
pub mod order_service;
pub mod payment_service;
pub mod product_service;
pub mod report_service;
pub mod sale_service;
pub mod sequence;
pub mod user_service;
pub mod voucher_service;
