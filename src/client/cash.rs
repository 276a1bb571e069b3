//! Cash drawer view state.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::{
    client::{ClientResult, PosBackend},
    domain::{CashSnapshot, Period},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashPhase {
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Holds the drawer balance for the selected period.
///
/// A failed fetch moves to [`CashPhase::Error`] but the last loaded snapshot
/// stays readable.
pub struct CashAggregator<B> {
    backend: B,
    period: Period,
    date: Option<NaiveDate>,
    phase: CashPhase,
    snapshot: Option<CashSnapshot>,
    last_error: Option<String>,
}

impl<B: PosBackend> CashAggregator<B> {
    pub fn new(backend: B, period: Period) -> Self {
        Self {
            backend,
            period,
            date: None,
            phase: CashPhase::Idle,
            snapshot: None,
            last_error: None,
        }
    }

    pub fn phase(&self) -> CashPhase {
        self.phase
    }

    pub fn snapshot(&self) -> Option<&CashSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn selection(&self) -> (Period, Option<NaiveDate>) {
        (self.period, self.date)
    }

    /// Changes the period or date and fetches it.
    pub async fn select(
        &mut self,
        period: Period,
        date: Option<NaiveDate>,
    ) -> ClientResult<&CashSnapshot> {
        self.period = period;
        self.date = date;
        self.refresh().await
    }

    pub async fn refresh(&mut self) -> ClientResult<&CashSnapshot> {
        self.begin();
        match self.backend.cash_drawer(self.period, self.date).await {
            Ok(snapshot) => {
                self.accept(snapshot);
                self.loaded()
            }
            Err(err) => {
                self.reject(err.to_string());
                Err(err)
            }
        }
    }

    /// Applies a result fetched elsewhere, e.g. by a [`super::RefreshScheduler`].
    pub fn apply(&mut self, result: Result<CashSnapshot, String>) {
        self.begin();
        match result {
            Ok(snapshot) => self.accept(snapshot),
            Err(message) => self.reject(message),
        }
    }

    fn begin(&mut self) {
        self.phase = CashPhase::Loading;
    }

    fn accept(&mut self, snapshot: CashSnapshot) {
        let snapshot = snapshot.reconciled();
        debug!(
            period = snapshot.period.as_str(),
            date = %snapshot.date,
            total_cash = snapshot.total_cash,
            "cash snapshot loaded"
        );
        self.snapshot = Some(snapshot);
        self.last_error = None;
        self.phase = CashPhase::Loaded;
    }

    fn reject(&mut self, message: String) {
        warn!(period = self.period.as_str(), error = %message, "cash snapshot failed");
        self.last_error = Some(message);
        self.phase = CashPhase::Error;
    }

    fn loaded(&self) -> ClientResult<&CashSnapshot> {
        self.snapshot
            .as_ref()
            .ok_or_else(|| super::ClientError::Decode("aucun solde chargé".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, fake::FakeBackend};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn snapshot(payments_in: i64, vouchers_out: i64) -> CashSnapshot {
        CashSnapshot {
            period: Period::Day,
            date: day(14),
            payments_in,
            vouchers_in: 0,
            vouchers_out,
            total_cash: 0,
            previous_day_cash: 0,
        }
    }

    #[tokio::test]
    async fn loaded_snapshot_is_reconciled() {
        let backend = FakeBackend::default();
        backend.push_snapshot(Ok(snapshot(2_000_000, 500_000)));
        let mut cash = CashAggregator::new(backend, Period::Day);
        assert_eq!(cash.phase(), CashPhase::Idle);

        let loaded = cash.select(Period::Day, Some(day(14))).await.unwrap();
        assert_eq!(loaded.total_cash, 1_500_000);
        assert_eq!(cash.phase(), CashPhase::Loaded);
        assert_eq!(cash.selection(), (Period::Day, Some(day(14))));
    }

    #[tokio::test]
    async fn failure_keeps_last_snapshot() {
        let backend = FakeBackend::default();
        backend.push_snapshot(Ok(snapshot(1_000_000, 0)));
        backend.push_snapshot(Err(ClientError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        }));
        let mut cash = CashAggregator::new(backend, Period::Day);

        cash.refresh().await.unwrap();
        assert!(cash.refresh().await.is_err());

        assert_eq!(cash.phase(), CashPhase::Error);
        assert_eq!(cash.last_error(), Some("Internal Server Error"));
        assert_eq!(cash.snapshot().map(|s| s.total_cash), Some(1_000_000));
    }

    #[tokio::test]
    async fn applied_results_follow_the_same_rules() {
        let mut cash = CashAggregator::new(FakeBackend::default(), Period::Week);
        cash.apply(Err("Erreur réseau".into()));
        assert_eq!(cash.phase(), CashPhase::Error);
        assert!(cash.snapshot().is_none());

        cash.apply(Ok(snapshot(300_000, 100_000)));
        assert_eq!(cash.phase(), CashPhase::Loaded);
        assert_eq!(cash.last_error(), None);
        assert_eq!(cash.snapshot().map(|s| s.total_cash), Some(200_000));
    }
}
