//! Business rules shared by the REST service and the client.
//!
//! Nothing in here touches the network or the database, so every rule can be
//! exercised directly from unit tests.

pub mod cash;
pub mod money;
pub mod numbering;
pub mod status;
pub mod validation;

use thiserror::Error;

pub use cash::{CashSnapshot, Period, VoucherTotals};
pub use money::{Amount, line_total};
pub use status::{OrderStatus, Role, VoucherStatus, VoucherType, merge_printed};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Input rejected before any side effect.
    #[error("{0}")]
    Invalid(String),

    /// The target is already in a terminal state.
    #[error("{0}")]
    Conflict(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
