//! Typed client for the back-office API, with the sale and cash-drawer
//! logic the front desk runs on top of it.

pub mod backend;
pub mod cash;
pub mod error;
pub mod http;
pub mod sale;
pub mod scheduler;

pub use backend::PosBackend;
pub use cash::{CashAggregator, CashPhase};
pub use error::{ClientError, ClientResult};
pub use http::ApiClient;
pub use sale::SaleSession;
pub use scheduler::{RefreshScheduler, Refreshed};

#[cfg(test)]
pub(crate) mod fake;
