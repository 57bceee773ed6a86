use chrono::Utc;
use log::{info, warn};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use super::{CollectorError, CollectorMode, CollectorSettings, CollectorStatus, CycleOutcome};
use crate::feed::{FeedClient, FetchError};
use crate::store::Store;

#[derive(Debug, Default)]
struct Shared {
    status: CollectorStatus,
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Periodic feed poller and the store's only writer.
pub struct Collector {
    feed: Arc<dyn FeedClient>,
    store: Arc<Store>,
    settings: CollectorSettings,
    shared: Arc<StdMutex<Shared>>,
    worker: Option<WorkerHandle>,
}

impl Collector {
    pub fn new(feed: Arc<dyn FeedClient>, store: Arc<Store>, settings: CollectorSettings) -> Self {
        Self {
            feed,
            store,
            settings,
            shared: Arc::new(StdMutex::new(Shared::default())),
            worker: None,
        }
    }

    pub fn status(&self) -> CollectorStatus {
        lock(&self.shared).status.clone()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn start(&mut self) -> Result<(), CollectorError> {
        if self.worker.is_some() {
            return Err(CollectorError::AlreadyRunning);
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        lock(&self.shared).status.running = true;

        let join = tokio::spawn(run_collector_loop(
            self.shared.clone(),
            self.feed.clone(),
            self.store.clone(),
            self.settings,
            stop_rx,
        ));

        self.worker = Some(WorkerHandle { stop_tx, join });
        info!(
            "Collector started (interval {:?}, fetch timeout {:?})",
            self.settings.interval, self.settings.fetch_timeout
        );
        Ok(())
    }

    /// Ask the loop to exit and wait for it. An insert in progress completes first.
    pub async fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            if let Err(e) = worker.join.await {
                warn!("Collector task ended abnormally: {}", e);
            }
            info!("Collector stopped");
        }
        let mut locked = lock(&self.shared);
        locked.status.running = false;
        locked.status.mode = CollectorMode::Idle;
    }
}

fn lock(shared: &StdMutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_collector_loop(
    shared: Arc<StdMutex<Shared>>,
    feed: Arc<dyn FeedClient>,
    store: Arc<Store>,
    settings: CollectorSettings,
    mut stop_rx: oneshot::Receiver<()>,
) {
    loop {
        lock(&shared).status.mode = CollectorMode::Fetching;

        let outcome = run_cycle(feed.as_ref(), &store, settings.fetch_timeout, &mut stop_rx).await;
        record_outcome(&shared, &outcome);

        if outcome == CycleOutcome::Abandoned {
            break;
        }

        let should_stop = tokio::select! {
            _ = sleep(settings.interval) => false,
            _ = &mut stop_rx => true,
        };
        if should_stop {
            break;
        }
    }

    let mut locked = lock(&shared);
    locked.status.mode = CollectorMode::Idle;
    locked.status.running = false;
}

/// One fetch-normalize-insert cycle. Failures are logged and reported, never
/// retried. The fetch is abandoned if `stop_rx` fires (or its sender is
/// dropped) first; once the insert has started it always runs to completion.
pub async fn run_cycle(
    feed: &dyn FeedClient,
    store: &Arc<Store>,
    fetch_timeout: Duration,
    stop_rx: &mut oneshot::Receiver<()>,
) -> CycleOutcome {
    let fetched = tokio::select! {
        result = fetch_bounded(feed, fetch_timeout) => result,
        _ = stop_rx => return CycleOutcome::Abandoned,
    };

    let sample = match fetched {
        Ok(sample) => sample,
        Err(e) => {
            warn!("Skipping cycle, fetch failed: {}", e);
            return CycleOutcome::FetchFailed(e.to_string());
        }
    };

    let record = sample.into_record(Utc::now());
    let store = store.clone();
    let inserted = tokio::task::spawn_blocking(move || {
        let id = store.insert(&record)?;
        Ok::<_, crate::store::StorageError>((id, record))
    })
    .await;

    match inserted {
        Ok(Ok((id, record))) => {
            info!(
                "{} | lat={:.4} lon={:.4} alt={:.2}",
                crate::telemetry::format_ts_utc(record.observed_at),
                record.latitude,
                record.longitude,
                record.altitude
            );
            CycleOutcome::Inserted(id)
        }
        Ok(Err(e)) => {
            warn!("Skipping cycle, insert failed: {}", e);
            CycleOutcome::StoreFailed(e.to_string())
        }
        Err(e) => {
            warn!("Skipping cycle, insert task failed: {}", e);
            CycleOutcome::StoreFailed(e.to_string())
        }
    }
}

async fn fetch_bounded(
    feed: &dyn FeedClient,
    fetch_timeout: Duration,
) -> Result<crate::feed::FeedSample, FetchError> {
    match timeout(fetch_timeout, feed.fetch()).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(fetch_timeout)),
    }
}

fn record_outcome(shared: &StdMutex<Shared>, outcome: &CycleOutcome) {
    let mut locked = lock(shared);
    let status = &mut locked.status;
    status.mode = CollectorMode::Idle;

    match outcome {
        CycleOutcome::Inserted(id) => {
            status.cycles += 1;
            status.inserted += 1;
            status.last_sequence_id = Some(*id);
            status.last_success = Some(Utc::now());
        }
        CycleOutcome::FetchFailed(e) => {
            status.cycles += 1;
            status.fetch_failures += 1;
            status.last_error = Some(e.clone());
        }
        CycleOutcome::StoreFailed(e) => {
            status.cycles += 1;
            status.store_failures += 1;
            status.last_error = Some(e.clone());
        }
        CycleOutcome::Abandoned => {}
    }
}
