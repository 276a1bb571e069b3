use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DbBackend, Statement};

use crate::{
    domain::numbering::{daily_prefix, document_number},
    error::{AppError, AppResult},
};

/// Tables whose rows carry a daily sequential number.
#[derive(Debug, Clone, Copy)]
pub enum NumberedDocument {
    Invoice,
    Voucher,
}

impl NumberedDocument {
    fn table_and_column(self) -> (&'static str, &'static str) {
        match self {
            NumberedDocument::Invoice => ("orders", "invoice_number"),
            NumberedDocument::Voucher => ("vouchers", "voucher_number"),
        }
    }
}

/// Next number for `prefix` on `date`.
///
/// Must run inside the transaction that inserts the row: a transaction-scoped
/// advisory lock keyed on the daily prefix serializes concurrent callers until
/// commit, and the unique index backs it up.
pub async fn next_document_number<C>(
    conn: &C,
    document: NumberedDocument,
    prefix: &str,
    date: NaiveDate,
) -> AppResult<String>
where
    C: ConnectionTrait,
{
    let (table, column) = document.table_and_column();
    let day_prefix = daily_prefix(prefix, date);

    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock(hashtext($1))",
        [day_prefix.clone().into()],
    ))
    .await?;

    let row = conn
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!("SELECT COUNT(*)::BIGINT AS issued FROM {table} WHERE {column} LIKE $1"),
            [format!("{day_prefix}%").into()],
        ))
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("count query returned no row")))?;
    let issued: i64 = row.try_get("", "issued")?;

    let sequence = u32::try_from(issued + 1)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("document sequence overflow")))?;
    Ok(document_number(prefix, date, sequence))
}
