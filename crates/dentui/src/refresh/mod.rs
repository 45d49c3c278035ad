//! Background refresh: the periodic timer and timeline fetch workers.
//!
//! The timer is a single worker thread holding at most one deadline.
//! Scheduling replaces the deadline, cancelling clears it, and a cancel
//! that arrives after the deadline fired is simply ignored. When the
//! deadline passes the worker sends `AppEvent::RefreshDue`; whether a
//! fetch actually starts is the main loop's decision (it skips while the
//! editor is open).
//!
//! Fetches run on short-lived threads and report back with
//! `AppEvent::RefreshComplete`; all tab mutation stays on the main thread.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::api::{Api, ApiResult, Notice};
use crate::events::AppEvent;
use crate::tabs::TabId;
use crate::timeline::ViewKind;

#[derive(Debug)]
pub(crate) enum TimerSignal {
    Schedule(Duration),
    Cancel,
    Shutdown,
}

pub struct RefreshScheduler {
    signal_tx: Sender<TimerSignal>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn spawn(event_tx: Sender<AppEvent>) -> Self {
        let (signal_tx, signal_rx) = mpsc::channel();
        let handle = std::thread::spawn(move || run_timer(signal_rx, event_tx));
        Self {
            signal_tx,
            handle: Some(handle),
        }
    }

    /// Arm the timer, replacing any pending deadline.
    pub fn schedule(&self, after: Duration) {
        debug!(secs = after.as_secs(), "refresh scheduled");
        self.send(TimerSignal::Schedule(after));
    }

    pub fn cancel(&self) {
        debug!("refresh cancelled");
        self.send(TimerSignal::Cancel);
    }

    pub fn shutdown(&mut self) {
        self.send(TimerSignal::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("refresh timer thread panicked");
            }
        }
    }

    fn send(&self, signal: TimerSignal) {
        if self.signal_tx.send(signal).is_err() {
            warn!("refresh timer is gone");
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_timer(signal_rx: Receiver<TimerSignal>, event_tx: Sender<AppEvent>) {
    let mut deadline: Option<Instant> = None;
    loop {
        let signal = match deadline {
            None => match signal_rx.recv() {
                Ok(signal) => signal,
                Err(_) => break,
            },
            Some(at) => {
                let wait = at.saturating_duration_since(Instant::now());
                match signal_rx.recv_timeout(wait) {
                    Ok(signal) => signal,
                    Err(RecvTimeoutError::Timeout) => {
                        deadline = None;
                        if event_tx.send(AppEvent::RefreshDue).is_err() {
                            break;
                        }
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        };

        match signal {
            TimerSignal::Schedule(after) => deadline = Some(Instant::now() + after),
            TimerSignal::Cancel => deadline = None,
            TimerSignal::Shutdown => break,
        }
    }
}

/// One tab's fetch.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub tab_id: TabId,
    pub kind: ViewKind,
    pub page: u32,
    pub count: u32,
}

#[derive(Debug)]
pub struct FetchResult {
    pub tab_id: TabId,
    /// Page the notices belong to; results for a page the tab has since
    /// left are dropped.
    pub page: u32,
    pub result: ApiResult<Vec<Notice>>,
}

pub fn fetch_all(api: &dyn Api, requests: Vec<FetchRequest>) -> Vec<FetchResult> {
    requests
        .into_iter()
        .map(|request| {
            let result = api.timeline(&request.kind, request.page, request.count);
            if let Err(err) = &result {
                warn!(tab = request.tab_id, %err, "timeline fetch failed");
            }
            FetchResult {
                tab_id: request.tab_id,
                page: request.page,
                result,
            }
        })
        .collect()
}

/// Fetch on a worker thread and report back through the event channel.
pub fn spawn_fetch(
    api: Arc<dyn Api>,
    requests: Vec<FetchRequest>,
    scheduled: bool,
    event_tx: Sender<AppEvent>,
) {
    std::thread::spawn(move || {
        let results = fetch_all(api.as_ref(), requests);
        let _ = event_tx.send(AppEvent::RefreshComplete { results, scheduled });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;

    const WAIT: Duration = Duration::from_secs(2);

    #[test]
    fn timer_fires_once_per_schedule() {
        let (event_tx, event_rx) = mpsc::channel();
        let scheduler = RefreshScheduler::spawn(event_tx);
        scheduler.schedule(Duration::from_millis(10));
        assert!(matches!(
            event_rx.recv_timeout(WAIT),
            Ok(AppEvent::RefreshDue)
        ));
        assert!(event_rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn cancel_clears_pending_deadline() {
        let (event_tx, event_rx) = mpsc::channel();
        let scheduler = RefreshScheduler::spawn(event_tx);
        scheduler.schedule(Duration::from_millis(50));
        scheduler.cancel();
        assert!(event_rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn cancel_after_firing_is_harmless() {
        let (event_tx, event_rx) = mpsc::channel();
        let scheduler = RefreshScheduler::spawn(event_tx);
        scheduler.schedule(Duration::from_millis(5));
        assert!(event_rx.recv_timeout(WAIT).is_ok());
        scheduler.cancel();
        scheduler.schedule(Duration::from_millis(5));
        assert!(matches!(
            event_rx.recv_timeout(WAIT),
            Ok(AppEvent::RefreshDue)
        ));
    }

    #[test]
    fn rescheduling_replaces_the_deadline() {
        let (event_tx, event_rx) = mpsc::channel();
        let scheduler = RefreshScheduler::spawn(event_tx);
        scheduler.schedule(Duration::from_secs(60));
        scheduler.schedule(Duration::from_millis(10));
        assert!(matches!(
            event_rx.recv_timeout(WAIT),
            Ok(AppEvent::RefreshDue)
        ));
        assert!(event_rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn fetch_all_keeps_tab_and_page() {
        let api = FakeApi::new().with_timeline(
            &ViewKind::Home,
            vec![Notice::fixture(2, "a", "two"), Notice::fixture(1, "a", "one")],
        );
        let results = fetch_all(
            &api,
            vec![
                FetchRequest {
                    tab_id: 3,
                    kind: ViewKind::Home,
                    page: 1,
                    count: 25,
                },
                FetchRequest {
                    tab_id: 4,
                    kind: ViewKind::Public,
                    page: 2,
                    count: 25,
                },
            ],
        );
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].tab_id, 3);
        assert_eq!(results[0].result.as_ref().map(Vec::len), Ok(2));
        assert_eq!(results[1].page, 2);
        assert_eq!(api.calls(), vec!["timeline Home 1", "timeline Public 2"]);
    }

    #[test]
    fn spawned_fetch_reports_completion() {
        let (event_tx, event_rx) = mpsc::channel();
        let api: Arc<dyn Api> = Arc::new(FakeApi::new());
        spawn_fetch(
            api,
            vec![FetchRequest {
                tab_id: 1,
                kind: ViewKind::Mentions,
                page: 1,
                count: 10,
            }],
            true,
            event_tx,
        );
        match event_rx.recv_timeout(WAIT) {
            Ok(AppEvent::RefreshComplete { results, scheduled }) => {
                assert!(scheduled);
                assert_eq!(results.len(), 1);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
