//! Background balance polling.
//!
//! [`BalanceMonitor::start`] spawns a tokio task that fetches the account
//! once per interval and pushes a [`MonitorEvent`] into an unbounded channel.
//! Fetch errors are reported and polling continues. The task ends when the
//! [`MonitorHandle`] is cancelled or dropped, or when the receiver goes away.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use lumen_core::amount::Amount;
use lumen_core::traits::LedgerClient;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// One report from the polling task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    Balance {
        at: DateTime<Utc>,
        account: String,
        native: Amount,
    },
    Error {
        at: DateTime<Utc>,
        message: String,
    },
}

/// Starts polling tasks against a ledger.
#[derive(Clone)]
pub struct BalanceMonitor {
    ledger: Arc<dyn LedgerClient>,
}

impl BalanceMonitor {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Poll `account_id` every `interval`, first tick one interval from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        &self,
        account_id: String,
        interval: Duration,
    ) -> (MonitorHandle, mpsc::UnboundedReceiver<MonitorEvent>) {
        let interval = interval.max(MIN_INTERVAL);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (signal_tx, signal_rx) = watch::channel(false);
        let cancelled = Arc::new(AtomicBool::new(false));

        debug!(account = %account_id, ?interval, "starting balance monitor");
        let task = tokio::spawn(poll(
            self.ledger.clone(),
            account_id,
            interval,
            cancelled.clone(),
            signal_rx,
            events_tx,
        ));

        let handle = MonitorHandle {
            interval,
            cancelled,
            signal: signal_tx,
            task: Some(task),
        };
        (handle, events_rx)
    }
}

async fn poll(
    ledger: Arc<dyn LedgerClient>,
    account_id: String,
    interval: Duration,
    cancelled: Arc<AtomicBool>,
    mut signal: watch::Receiver<bool>,
    events: mpsc::UnboundedSender<MonitorEvent>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = signal.changed() => break,
            _ = ticker.tick() => {}
        }
        if cancelled.load(Ordering::SeqCst) {
            break;
        }

        let event = match ledger.load_account(&account_id).await {
            Ok(snapshot) => MonitorEvent::Balance {
                at: Utc::now(),
                account: account_id.clone(),
                native: snapshot.native_balance(),
            },
            Err(e) => {
                warn!(account = %account_id, "balance poll failed: {e}");
                MonitorEvent::Error {
                    at: Utc::now(),
                    message: e.to_string(),
                }
            }
        };
        if events.send(event).is_err() {
            break;
        }
    }
    debug!(account = %account_id, "balance monitor stopped");
}

/// Control handle for a running monitor. Dropping it cancels the task.
pub struct MonitorHandle {
    interval: Duration,
    cancelled: Arc<AtomicBool>,
    signal: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Effective polling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Stop scheduling ticks. Returns `false` if already cancelled.
    ///
    /// A fetch already in flight still completes and may deliver one last event.
    pub fn cancel(&self) -> bool {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.signal.send_replace(true);
        true
    }

    /// Cancel and wait for the polling task to exit.
    pub async fn stopped(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("balance monitor task ended abnormally: {e}");
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::error::LedgerError;
    use lumen_core::testing::MockLedger;

    const ACCOUNT_1: &str = "GCFIRY65OQE7DFP5KLNS2PF2LVZMUZYJX4OZIEQ36N2IQANUB5XVYOJR";

    fn ledger() -> Arc<MockLedger> {
        Arc::new(MockLedger::new().with_account(ACCOUNT_1, "42.5"))
    }

    #[tokio::test]
    async fn reports_native_balance_each_tick() {
        let ledger = ledger();
        let monitor = BalanceMonitor::new(ledger.clone());
        let (handle, mut rx) = monitor.start(ACCOUNT_1.into(), Duration::from_millis(10));

        for _ in 0..2 {
            match rx.recv().await.unwrap() {
                MonitorEvent::Balance {
                    account, native, ..
                } => {
                    assert_eq!(account, ACCOUNT_1);
                    assert_eq!(native.to_string(), "42.5000000");
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        handle.stopped().await;
        assert!(ledger.load_calls() >= 2);
    }

    #[tokio::test]
    async fn errors_do_not_stop_polling() {
        let ledger = ledger();
        ledger.fail_loads(Some(LedgerError::Transport("timed out".into())));
        let (handle, mut rx) =
            BalanceMonitor::new(ledger.clone()).start(ACCOUNT_1.into(), Duration::from_millis(5));

        for _ in 0..3 {
            assert!(matches!(
                rx.recv().await.unwrap(),
                MonitorEvent::Error { .. }
            ));
        }
        ledger.fail_loads(None);
        loop {
            if let MonitorEvent::Balance { .. } = rx.recv().await.unwrap() {
                break;
            }
        }
        handle.stopped().await;
    }

    #[tokio::test]
    async fn no_fetch_after_cancel() {
        let ledger = ledger();
        let (handle, mut rx) =
            BalanceMonitor::new(ledger.clone()).start(ACCOUNT_1.into(), Duration::from_millis(5));
        rx.recv().await.unwrap();

        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert!(handle.is_cancelled());
        handle.stopped().await;

        let calls = ledger.load_calls();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ledger.load_calls(), calls);
    }

    #[tokio::test]
    async fn first_tick_waits_one_interval() {
        let ledger = ledger();
        let (handle, _rx) =
            BalanceMonitor::new(ledger.clone()).start(ACCOUNT_1.into(), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(ledger.load_calls(), 0);
        handle.stopped().await;
    }

    #[tokio::test]
    async fn dropping_handle_ends_stream() {
        let ledger = ledger();
        let (handle, mut rx) =
            BalanceMonitor::new(ledger).start(ACCOUNT_1.into(), Duration::from_millis(5));
        drop(handle);
        // Channel closes once the task exits; at most one in-flight event precedes it.
        let mut seen = 0;
        while rx.recv().await.is_some() {
            seen += 1;
        }
        assert!(seen <= 1);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(async {
            let (handle, _rx) =
                BalanceMonitor::new(ledger()).start(ACCOUNT_1.into(), Duration::ZERO);
            assert_eq!(handle.interval(), MIN_INTERVAL);
            handle.stopped().await;
        });
    }
}
