use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{DomainError, DomainResult};

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|value| value.as_str() == s)
                    .ok_or_else(|| {
                        DomainError::Invalid(format!(
                            concat!("Valeur inconnue pour ", stringify!($name), ": {}"),
                            s
                        ))
                    })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Caissier,
    Facturier,
    GestionnaireBon,
}

string_enum!(Role {
    Admin => "admin",
    Caissier => "caissier",
    Facturier => "facturier",
    GestionnaireBon => "gestionnaire_bon",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

string_enum!(OrderStatus {
    Pending => "pending",
    Paid => "paid",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// A payment can only be recorded against a pending order.
    pub fn ensure_payable(self) -> DomainResult<()> {
        match self {
            OrderStatus::Pending => Ok(()),
            OrderStatus::Paid => Err(DomainError::Conflict("Facture déjà payée".into())),
            OrderStatus::Cancelled => Err(DomainError::Conflict("Facture annulée".into())),
        }
    }

    /// Pending is the only non-terminal state.
    pub fn transition(self, to: OrderStatus) -> DomainResult<OrderStatus> {
        if to == OrderStatus::Pending {
            return Err(DomainError::Invalid(
                "Une facture ne peut pas revenir en attente".into(),
            ));
        }
        self.ensure_payable()?;
        Ok(to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VoucherType {
    Expense,
    Output,
    Entry,
}

string_enum!(VoucherType {
    Expense => "expense",
    Output => "output",
    Entry => "entry",
});

impl VoucherType {
    /// Prefix of the voucher number, e.g. `DEP-20240514-001`.
    pub fn number_prefix(self) -> &'static str {
        match self {
            VoucherType::Expense => "DEP",
            VoucherType::Output => "SOR",
            VoucherType::Entry => "ENT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VoucherStatus {
    Pending,
    Processed,
    Rejected,
}

string_enum!(VoucherStatus {
    Pending => "pending",
    Processed => "processed",
    Rejected => "rejected",
});

impl VoucherStatus {
    pub fn ensure_processable(self) -> DomainResult<()> {
        match self {
            VoucherStatus::Pending => Ok(()),
            VoucherStatus::Processed => Err(DomainError::Conflict("Bon déjà traité".into())),
            VoucherStatus::Rejected => Err(DomainError::Conflict("Bon rejeté".into())),
        }
    }

    pub fn transition(self, to: VoucherStatus) -> DomainResult<VoucherStatus> {
        if to == VoucherStatus::Pending {
            return Err(DomainError::Invalid(
                "Un bon ne peut pas revenir en attente".into(),
            ));
        }
        self.ensure_processable()?;
        Ok(to)
    }
}

/// The printed flag only ever moves from false to true.
pub fn merge_printed(current: bool, requested: bool) -> bool {
    current || requested
}
