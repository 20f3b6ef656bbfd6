// ── Statistics aggregator ──
//
// Fans out the seven stat queries per refresh cycle, tolerates
// individual failures, and joins completions at an explicit barrier.
// A strictly-increasing cycle number guards against out-of-order
// completions across overlapping cycles: only the current cycle may
// touch the snapshot. "Last cycle wins" is explicitly wrong; "current
// cycle only" is the rule.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use linkseal_api::{ApiError, SecureLinkClient};

use crate::model::{StatKind, StatPayload, StatsSnapshot};

/// Cycle bookkeeping, guarded by one mutex so the staleness check and
/// the snapshot write are atomic with respect to newer cycles starting.
struct CycleState {
    /// Sequence number of the cycle allowed to write. Strictly increasing.
    current: u64,
    /// Completion barrier: queries of the current cycle not yet settled.
    remaining: usize,
    /// At least one query of the current cycle failed.
    partial: bool,
    /// Disposed aggregators accept no cycle as current, ever again.
    disposed: bool,
}

struct Inner {
    client: SecureLinkClient,
    top_limit: u32,
    state: Mutex<CycleState>,
    snapshot: watch::Sender<StatsSnapshot>,
    cancel: CancellationToken,
    poller: Mutex<Option<JoinHandle<()>>>,
}

/// Owns one long-lived [`StatsSnapshot`], refreshed by fan-out cycles.
///
/// Cheaply cloneable; all clones share the same snapshot and cycle
/// sequence. Observe the snapshot through [`subscribe`](Self::subscribe)
/// or read it point-in-time with [`snapshot`](Self::snapshot).
#[derive(Clone)]
pub struct StatsAggregator {
    inner: Arc<Inner>,
}

impl StatsAggregator {
    pub fn new(client: SecureLinkClient, top_limit: u32) -> Self {
        let (snapshot, _) = watch::channel(StatsSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                client,
                top_limit,
                state: Mutex::new(CycleState {
                    current: 0,
                    remaining: 0,
                    partial: false,
                    disposed: false,
                }),
                snapshot,
                cancel: CancellationToken::new(),
                poller: Mutex::new(None),
            }),
        }
    }

    /// Current snapshot, cloned at the moment of the call.
    pub fn snapshot(&self) -> StatsSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<StatsSnapshot> {
        self.inner.snapshot.subscribe()
    }

    // ── Refresh cycle ────────────────────────────────────────────────

    /// Run one refresh cycle: stamp a new sequence number, fan out all
    /// seven queries concurrently, and settle each as it completes.
    ///
    /// The future resolves once every query of this cycle has settled
    /// (succeeded, failed, or been dropped as stale). Starting a newer
    /// cycle while this one is in flight makes this cycle's remaining
    /// completions inert: they write nothing, decrement nothing, and
    /// leave `is_loading` / `updated_at` to the newer cycle.
    pub async fn refresh(&self, show_loading: bool) {
        let cycle = {
            let mut state = self.lock_state();
            if state.disposed {
                return;
            }
            state.current += 1;
            state.remaining = StatKind::ALL.len();
            state.partial = false;
            state.current
        };

        debug!(cycle, show_loading, "starting stats refresh cycle");
        if show_loading {
            self.inner.snapshot.send_modify(|s| s.is_loading = true);
        }

        futures_util::join!(
            self.run_query(cycle, StatKind::LinkCounts),
            self.run_query(cycle, StatKind::AccessSummary),
            self.run_query(cycle, StatKind::HourlyAccess),
            self.run_query(cycle, StatKind::DailyAccess),
            self.run_query(cycle, StatKind::FailureBreakdown),
            self.run_query(cycle, StatKind::TopLinks),
            self.run_query(cycle, StatKind::SecurityExceptions),
        );
    }

    async fn run_query(&self, cycle: u64, kind: StatKind) {
        let result = self.fetch(kind).await;
        self.settle(cycle, kind, result);
    }

    async fn fetch(&self, kind: StatKind) -> Result<StatPayload, ApiError> {
        let client = &self.inner.client;
        match kind {
            StatKind::LinkCounts => client.link_counts().await.map(StatPayload::LinkCounts),
            StatKind::AccessSummary => {
                client.access_summary().await.map(StatPayload::AccessSummary)
            }
            StatKind::HourlyAccess => client.access_hourly().await.map(StatPayload::HourlyAccess),
            StatKind::DailyAccess => client.access_daily().await.map(StatPayload::DailyAccess),
            StatKind::FailureBreakdown => client
                .access_failures()
                .await
                .map(StatPayload::FailureBreakdown),
            StatKind::TopLinks => client
                .top_links(self.inner.top_limit)
                .await
                .map(StatPayload::TopLinks),
            StatKind::SecurityExceptions => client
                .security_exceptions(self.inner.top_limit)
                .await
                .map(StatPayload::SecurityExceptions),
        }
    }

    /// Apply one query completion -- or drop it if its cycle is stale.
    fn settle(&self, cycle: u64, kind: StatKind, result: Result<StatPayload, ApiError>) {
        let mut state = self.lock_state();

        if state.disposed || state.current != cycle {
            debug!(cycle, kind = kind.as_str(), "dropping stale stat completion");
            return;
        }

        match result {
            Ok(payload) => {
                self.inner.snapshot.send_modify(|s| {
                    if kind == StatKind::LinkCounts {
                        s.online = Some(true);
                    }
                    s.apply(payload);
                });
            }
            Err(err) => {
                warn!(
                    cycle,
                    kind = kind.as_str(),
                    error = %err,
                    "stat query failed; keeping previous value"
                );
                state.partial = true;
                if kind == StatKind::LinkCounts {
                    self.inner.snapshot.send_modify(|s| s.online = Some(false));
                }
            }
        }

        state.remaining -= 1;
        if state.remaining == 0 {
            let partial = state.partial;
            self.inner.snapshot.send_modify(|s| {
                s.partial_failure = partial;
                s.updated_at = Some(Utc::now());
                s.is_loading = false;
            });
            debug!(cycle, partial, "stats refresh cycle settled");
        }
    }

    // ── Polling lifecycle ────────────────────────────────────────────

    /// Start the recurring poller: an immediate `refresh(true)`, then
    /// `refresh(false)` every `interval` until [`dispose`](Self::dispose).
    pub fn start(&self, interval: Duration) {
        let agg = self.clone();
        let cancel = self.inner.cancel.clone();
        let handle = tokio::spawn(poll_task(agg, interval, cancel));
        *self.lock_poller() = Some(handle);
    }

    /// Stop the poller and make every in-flight completion inert.
    ///
    /// In-flight requests from the final cycle may still finish, but
    /// disposal means no cycle is ever current again, so their results
    /// are dropped by the staleness guard.
    pub fn dispose(&self) {
        {
            let mut state = self.lock_state();
            state.disposed = true;
        }
        self.inner.cancel.cancel();
        if let Some(handle) = self.lock_poller().take() {
            handle.abort();
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CycleState> {
        self.inner.state.lock().expect("cycle state lock poisoned")
    }

    fn lock_poller(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner.poller.lock().expect("poller lock poisoned")
    }
}

async fn poll_task(agg: StatsAggregator, interval: Duration, cancel: CancellationToken) {
    agg.refresh(true).await;

    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => agg.refresh(false).await,
        }
    }
}
