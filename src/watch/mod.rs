//! Background refresh of answer batches.
//!
//! A [`Poller`] owns one repeating timer task per watched question. Each
//! tick re-fetches the batch and, on success only, hands it to the
//! update callback; failed refreshes are logged and swallowed so a
//! missed beat never clears previously delivered data. Cancellation is
//! cooperative: an in-flight fetch is not aborted, but its result is
//! discarded once the poller has been stopped.

use crate::api::{AnswersClient, ApiError};
use crate::models::Answer;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

/// Fetch seam for the poll loop, so timer semantics are testable with a
/// scripted fetcher and a paused clock.
#[async_trait]
pub trait AnswerFetcher: Send + Sync + 'static {
    async fn fetch_answers(&self, question_id: &str) -> Result<Vec<Answer>, ApiError>;
}

#[async_trait]
impl AnswerFetcher for AnswersClient {
    async fn fetch_answers(&self, question_id: &str) -> Result<Vec<Answer>, ApiError> {
        AnswersClient::fetch_answers(self, question_id).await
    }
}

/// Cancellation handle for one spawned poll task.
///
/// Dropping the handle also cancels the task.
pub struct PollHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Request cancellation. Idempotent: stopping twice, or stopping an
    /// already finished task, is a no-op.
    pub fn stop(&self) {
        let _ = self.cancel.send(true);
    }

    /// Whether the poll task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn a repeating poll task for one question.
///
/// The first refresh lands one full interval after start; the caller's
/// initial fetch covers time zero.
pub fn spawn_poll<F, U>(
    fetcher: Arc<F>,
    question_id: &str,
    interval: Duration,
    mut on_update: U,
) -> PollHandle
where
    F: AnswerFetcher,
    U: FnMut(Vec<Answer>) + Send + 'static,
{
    let (cancel_tx, mut cancel_rx) = watch::channel(false);
    let probe = cancel_rx.clone();
    let question_id = question_id.to_string();

    let task = tokio::spawn(async move {
        let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let fetched = fetcher.fetch_answers(&question_id).await;

                    // The fetch may have outlived a stop request; a late
                    // result must not reach the callback.
                    if cancelled(&probe) {
                        break;
                    }

                    match fetched {
                        Ok(answers) => on_update(answers),
                        Err(e) => debug!("poll refresh for {} failed: {}", question_id, e),
                    }
                }
                changed = cancel_rx.changed() => {
                    if changed.is_err() || *cancel_rx.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("poll task for {} stopped", question_id);
    });

    PollHandle {
        cancel: cancel_tx,
        task,
    }
}

fn cancelled(rx: &watch::Receiver<bool>) -> bool {
    *rx.borrow() || rx.has_changed().is_err()
}

/// One polling subscription, e.g. one open dashboard view.
///
/// `start` replaces any running task, so a poller never accumulates
/// duplicate timers no matter how often it is restarted.
pub struct Poller<F: AnswerFetcher> {
    fetcher: Arc<F>,
    interval: Duration,
    handle: Option<PollHandle>,
}

impl<F: AnswerFetcher> Poller<F> {
    pub fn new(fetcher: Arc<F>, interval: Duration) -> Self {
        Self {
            fetcher,
            interval,
            handle: None,
        }
    }

    /// Begin polling the question, cancelling any previous task first.
    pub fn start<U>(&mut self, question_id: &str, on_update: U)
    where
        U: FnMut(Vec<Answer>) + Send + 'static,
    {
        self.stop();
        self.handle = Some(spawn_poll(
            Arc::clone(&self.fetcher),
            question_id,
            self.interval,
            on_update,
        ));
    }

    /// Cancel the running task, if any. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }

    /// Whether a poll task is currently active.
    #[allow(dead_code)] // State probe for subscription owners
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }
}

impl<F: AnswerFetcher> Drop for Poller<F> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    const INTERVAL: Duration = Duration::from_secs(10);

    /// Fetcher that fails its first `fail_first` calls, then succeeds,
    /// optionally sleeping inside each fetch.
    struct ScriptedFetcher {
        calls: AtomicUsize,
        fail_first: usize,
        delay: Option<Duration>,
    }

    impl ScriptedFetcher {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first: 0,
                delay: None,
            }
        }

        fn failing_first(n: usize) -> Self {
            Self {
                fail_first: n,
                ..Self::ok()
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::ok()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnswerFetcher for ScriptedFetcher {
        async fn fetch_answers(&self, question_id: &str) -> Result<Vec<Answer>, ApiError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                time::sleep(delay).await;
            }
            if call < self.fail_first {
                return Err(ApiError::Status {
                    status: 500,
                    message: "server error".to_string(),
                });
            }
            Ok(vec![Answer {
                answer_id: call as i64,
                question_id: question_id.to_string(),
                answer_text: "polled".to_string(),
                category: "A".to_string(),
                answer_keywords: None,
                create_user_name: None,
                create_user_department: None,
                created_at: "2025-05-01T09:30:00".to_string(),
            }])
        }
    }

    /// Let spawned tasks run between clock manipulations.
    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    fn collector() -> (
        mpsc::UnboundedSender<Vec<Answer>>,
        mpsc::UnboundedReceiver<Vec<Answer>>,
    ) {
        mpsc::unbounded_channel()
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_update_per_tick() {
        let fetcher = Arc::new(ScriptedFetcher::ok());
        let (tx, mut rx) = collector();

        let mut poller = Poller::new(Arc::clone(&fetcher), INTERVAL);
        poller.start("q-1", move |answers| {
            let _ = tx.send(answers);
        });

        // Nothing fires before the first interval elapses.
        settle().await;
        assert!(rx.try_recv().is_err());
        assert_eq!(fetcher.call_count(), 0);

        time::advance(INTERVAL).await;
        settle().await;

        assert_eq!(fetcher.call_count(), 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_tick_is_swallowed_and_polling_continues() {
        let fetcher = Arc::new(ScriptedFetcher::failing_first(1));
        let (tx, mut rx) = collector();

        let mut poller = Poller::new(Arc::clone(&fetcher), INTERVAL);
        poller.start("q-1", move |answers| {
            let _ = tx.send(answers);
        });
        settle().await;

        time::advance(INTERVAL).await;
        settle().await;

        // First tick failed: fetched, but no update delivered.
        assert_eq!(fetcher.call_count(), 1);
        assert!(rx.try_recv().is_err());

        time::advance(INTERVAL).await;
        settle().await;

        // Second tick succeeded.
        assert_eq!(fetcher.call_count(), 2);
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_keeps_exactly_one_timer() {
        let fetcher = Arc::new(ScriptedFetcher::ok());
        let (tx, mut rx) = collector();
        let tx2 = tx.clone();

        let mut poller = Poller::new(Arc::clone(&fetcher), INTERVAL);
        poller.start("q-1", move |answers| {
            let _ = tx.send(answers);
        });
        poller.start("q-1", move |answers| {
            let _ = tx2.send(answers);
        });
        settle().await;

        time::advance(INTERVAL).await;
        settle().await;

        // One fetch and one delivery per tick, not one per start() call.
        assert_eq!(fetcher.call_count(), 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());

        time::advance(INTERVAL).await;
        settle().await;

        assert_eq!(fetcher.call_count(), 2);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let fetcher = Arc::new(ScriptedFetcher::ok());
        let (tx, mut rx) = collector();

        let handle = spawn_poll(Arc::clone(&fetcher), "q-1", INTERVAL, move |answers| {
            let _ = tx.send(answers);
        });

        handle.stop();
        handle.stop();
        settle().await;
        assert!(handle.is_finished());

        // A stopped task never fetches again.
        time::advance(INTERVAL).await;
        settle().await;
        assert_eq!(fetcher.call_count(), 0);
        assert!(rx.try_recv().is_err());

        let mut poller = Poller::new(fetcher, INTERVAL);
        poller.stop();
        poller.stop();
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_fetch_discarded_after_stop() {
        let fetcher = Arc::new(ScriptedFetcher::slow(Duration::from_secs(5)));
        let (tx, mut rx) = collector();

        let handle = spawn_poll(Arc::clone(&fetcher), "q-1", INTERVAL, move |answers| {
            let _ = tx.send(answers);
        });
        settle().await;

        // Enter the first fetch, which sleeps 5s inside.
        time::advance(INTERVAL).await;
        settle().await;
        assert_eq!(fetcher.call_count(), 1);

        // Stop while the fetch is in flight, then let it complete.
        handle.stop();
        time::advance(Duration::from_secs(5)).await;
        settle().await;

        // The late result was discarded and the task exited.
        assert!(rx.try_recv().is_err());
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_poller_cancels_task() {
        let fetcher = Arc::new(ScriptedFetcher::ok());
        let (tx, mut rx) = collector();

        let mut poller = Poller::new(Arc::clone(&fetcher), INTERVAL);
        poller.start("q-1", move |answers| {
            let _ = tx.send(answers);
        });
        drop(poller);
        settle().await;

        time::advance(INTERVAL).await;
        settle().await;

        assert_eq!(fetcher.call_count(), 0);
        assert!(rx.try_recv().is_err());
    }
}
