use crate::api::RequestApi;
use crate::cache::SessionCache;
use crate::error::ApiError;
use crate::mapper::map_requests;
use crate::state::UiStateStore;
use crate::types::RequestKind;
use hl_events::{AppEvent, EventBus, EventSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Applied { seq: u64 },
    /// A newer poll was applied first; this response was dropped.
    Stale { seq: u64 },
    Failed { seq: u64, error: ApiError },
}

/// Re-fetches the sent requests of one kind and folds them into a
/// [`UiStateStore`].
///
/// Polls run on a fixed interval while visible, immediately on start, and on
/// `Focus`, `VisibilityChanged { visible: true }` and matching
/// `RequestsUpdated` events. Every trigger spawns its own fetch; fetches
/// still in flight when the poller stops are aborted.
pub struct StatusPoller<A: ?Sized> {
    api: Arc<A>,
    kind: RequestKind,
    store: UiStateStore,
    bus: EventBus,
    cache: Option<SessionCache>,
    interval: Duration,
}

impl<A: ?Sized> Clone for StatusPoller<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            kind: self.kind,
            store: self.store.clone(),
            bus: self.bus.clone(),
            cache: self.cache.clone(),
            interval: self.interval,
        }
    }
}

impl<A> StatusPoller<A>
where
    A: RequestApi + ?Sized + 'static,
{
    pub fn new(api: Arc<A>, kind: RequestKind, store: UiStateStore, bus: EventBus) -> Self {
        Self {
            api,
            kind,
            store,
            bus,
            cache: None,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Mirrors every applied poll into `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: SessionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn store(&self) -> &UiStateStore {
        &self.store
    }

    pub async fn poll_once(&self) -> PollOutcome {
        let ticket = self.store.begin_poll();
        let seq = ticket.seq();
        let records = match self.api.list_sent(self.kind).await {
            Ok(records) => records,
            Err(error) => {
                warn!(kind = %self.kind, seq, %error, "poll failed, keeping previous states");
                return PollOutcome::Failed { seq, error };
            }
        };

        if !self.store.apply_poll(ticket, map_requests(&records)) {
            debug!(kind = %self.kind, seq, "discarding stale poll response");
            return PollOutcome::Stale { seq };
        }

        if let Some(cache) = &self.cache {
            if let Err(err) = cache.set_sent_mirror(self.kind, &records) {
                warn!(kind = %self.kind, %err, "failed to mirror sent requests");
            }
        }
        debug!(kind = %self.kind, seq, records = records.len(), "poll applied");
        self.bus.emit(
            EventSource::Poller,
            AppEvent::StatesRefreshed {
                topic: self.kind.topic(),
                poll_seq: seq,
            },
        );
        PollOutcome::Applied { seq }
    }

    /// Seeds the store from the cached mirror. Returns whether anything was
    /// restored.
    pub fn restore_from_mirror(&self) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };
        match cache.sent_mirror(self.kind) {
            Ok(Some(records)) => self.store.seed(map_requests(&records)),
            Ok(None) => false,
            Err(err) => {
                warn!(kind = %self.kind, %err, "ignoring unreadable sent-request mirror");
                false
            }
        }
    }

    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let topic = self.kind.topic();
        let mut events = self.bus.subscribe();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut visible = true;
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    if visible {
                        self.start_poll(&mut in_flight);
                    }
                }
                received = events.recv() => match received {
                    Ok(record) => {
                        if let AppEvent::VisibilityChanged { visible: now_visible } = record.body {
                            visible = now_visible;
                        }
                        if record.body.triggers_refresh(topic) {
                            self.start_poll(&mut in_flight);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(kind = %self.kind, skipped, "event stream lagged, refreshing");
                        self.start_poll(&mut in_flight);
                    }
                    Err(RecvError::Closed) => break,
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(err) = joined {
                        warn!(kind = %self.kind, %err, "poll task ended abnormally");
                    }
                }
            }
        }
        let aborted = in_flight.len();
        in_flight.shutdown().await;
        debug!(kind = %self.kind, aborted, "poller stopped");
    }

    pub fn spawn(self) -> PollerHandle {
        let (stop, shutdown) = oneshot::channel();
        let task = tokio::spawn(self.run(shutdown));
        PollerHandle {
            stop: Some(stop),
            task,
        }
    }

    fn start_poll(&self, in_flight: &mut JoinSet<PollOutcome>) {
        let poller = self.clone();
        in_flight.spawn(async move { poller.poll_once().await });
    }
}

pub struct PollerHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = self.task.await;
    }
}
