//! Shared polling.
//!
//! Each resource key gets exactly one polling task. Views that subscribe to
//! a key already being polled join the existing `watch` channel instead of
//! starting their own timer.

use std::{
    collections::HashMap,
    future::Future,
    hash::Hash,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::client::ClientResult;

/// Latest outcome for a key; `None` until the first fetch completes.
pub type Refreshed<T> = Option<Result<T, String>>;

struct Poller<T> {
    sender: Arc<watch::Sender<Refreshed<T>>>,
    handle: JoinHandle<()>,
}

pub struct RefreshScheduler<K, T> {
    interval: Duration,
    pollers: Mutex<HashMap<K, Poller<T>>>,
    shutdown: watch::Sender<bool>,
}

impl<K, T> RefreshScheduler<K, T>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new(interval: Duration) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            interval,
            pollers: Mutex::new(HashMap::new()),
            shutdown,
        }
    }

    /// Subscribes to `key`, starting its poller with `fetch` if none is running.
    ///
    /// The first fetch runs immediately, then once per interval. A poller
    /// stops by itself once every receiver for its key is dropped.
    pub fn subscribe<F, Fut>(&self, key: K, fetch: F) -> watch::Receiver<Refreshed<T>>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let mut pollers = self.pollers.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(poller) = pollers.get(&key) {
            if !poller.handle.is_finished() {
                debug!(?key, "joining running poller");
                return poller.sender.subscribe();
            }
        }

        let (sender, receiver) = watch::channel(None);
        let sender = Arc::new(sender);
        let handle = tokio::spawn(poll(
            key.clone(),
            self.interval,
            fetch,
            Arc::clone(&sender),
            self.shutdown.subscribe(),
        ));
        pollers.insert(key, Poller { sender, handle });
        receiver
    }

    /// Number of pollers still running.
    pub fn active(&self) -> usize {
        let pollers = self.pollers.lock().unwrap_or_else(|e| e.into_inner());
        pollers.values().filter(|p| !p.handle.is_finished()).count()
    }

    /// Stops every poller and waits for them to exit.
    pub async fn shutdown(self) {
        self.shutdown.send_replace(true);
        let pollers = self.pollers.into_inner().unwrap_or_else(|e| e.into_inner());
        for (key, poller) in pollers {
            if let Err(err) = poller.handle.await {
                warn!(?key, error = %err, "poller ended abnormally");
            }
        }
    }
}

async fn poll<K, T, F, Fut>(
    key: K,
    interval: Duration,
    fetch: F,
    sender: Arc<watch::Sender<Refreshed<T>>>,
    mut shutdown: watch::Receiver<bool>,
) where
    K: std::fmt::Debug,
    F: Fn() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = sender.closed() => break,
            _ = ticker.tick() => {
                let outcome = fetch().await.map_err(|err| err.to_string());
                if let Err(message) = &outcome {
                    warn!(?key, error = %message, "refresh failed");
                }
                sender.send_replace(Some(outcome));
            }
        }
    }
    debug!(?key, "poller stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::client::ClientError;

    fn counter(
        calls: &Arc<AtomicUsize>,
    ) -> impl Fn() -> std::future::Ready<ClientResult<usize>> + Send + Sync + 'static {
        let calls = Arc::clone(calls);
        move || std::future::ready(Ok(calls.fetch_add(1, Ordering::SeqCst) + 1))
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_of_one_key_share_a_single_fetch() {
        let scheduler = RefreshScheduler::new(Duration::from_secs(30));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut dashboard = scheduler.subscribe("cash:day", counter(&calls));
        let mut drawer = scheduler.subscribe("cash:day", counter(&calls));
        assert_eq!(scheduler.active(), 1);

        dashboard.changed().await.unwrap();
        drawer.changed().await.unwrap();
        assert_eq!(*dashboard.borrow_and_update(), Some(Ok(1)));
        assert_eq!(*drawer.borrow_and_update(), Some(Ok(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        dashboard.changed().await.unwrap();
        assert_eq!(*dashboard.borrow_and_update(), Some(Ok(2)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_keys_poll_independently() {
        let scheduler = RefreshScheduler::new(Duration::from_secs(2));
        let day_calls = Arc::new(AtomicUsize::new(0));
        let month_calls = Arc::new(AtomicUsize::new(0));

        let mut day = scheduler.subscribe("cash:day", counter(&day_calls));
        let mut month = scheduler.subscribe("cash:month", counter(&month_calls));
        day.changed().await.unwrap();
        month.changed().await.unwrap();

        assert_eq!(scheduler.active(), 2);
        assert_eq!(day_calls.load(Ordering::SeqCst), 1);
        assert_eq!(month_calls.load(Ordering::SeqCst), 1);
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_published_as_messages() {
        let scheduler: RefreshScheduler<&str, usize> =
            RefreshScheduler::new(Duration::from_secs(5));
        let mut rx = scheduler.subscribe("bilan", || async {
            Err(ClientError::Api {
                status: 403,
                message: "Accès refusé".into(),
            })
        });

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Some(Err("Accès refusé".to_string())));
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_every_receiver_stops_the_poller() {
        let scheduler = RefreshScheduler::new(Duration::from_secs(3));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut rx = scheduler.subscribe("invoices", counter(&calls));
        rx.changed().await.unwrap();
        drop(rx);
        time::sleep(Duration::from_secs(10)).await;

        assert_eq!(scheduler.active(), 0);
        let mut rx = scheduler.subscribe("invoices", counter(&calls));
        rx.changed().await.unwrap();
        assert_eq!(scheduler.active(), 1);
        scheduler.shutdown().await;
    }
}
