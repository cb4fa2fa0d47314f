//! Fixed-interval background refresh.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use udhaar_client::{ClientError, LendingBackend};

/// Re-fetches a value on a timer and publishes the latest one.
///
/// The first fetch happens immediately. Failures keep the last published
/// value; an expired session stops the loop. Dropping the poller aborts the
/// task.
pub struct Poller<T> {
    rx: watch::Receiver<Option<T>>,
    handle: JoinHandle<()>,
}

impl<T> Poller<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn spawn<F, Fut>(every: Duration, mut fetch: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(None);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match fetch().await {
                    Ok(value) => {
                        tx.send_if_modified(|current| {
                            if current.as_ref() == Some(&value) {
                                return false;
                            }
                            *current = Some(value);
                            true
                        });
                    }
                    Err(ClientError::AuthExpired) => {
                        tracing::debug!("poll stopped: session expired");
                        break;
                    }
                    Err(e) => tracing::debug!("poll failed: {e}"),
                }
            }
        });
        Self { rx, handle }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.rx.clone()
    }

    /// The most recent value, `None` before the first successful fetch.
    pub fn latest(&self) -> Option<T> {
        self.rx.borrow().clone()
    }
}

impl Poller<u64> {
    /// Poll the signed-in user's unread notification count.
    pub fn unread_notifications(backend: Arc<dyn LendingBackend>, every: Duration) -> Self {
        Self::spawn(every, move || {
            let backend = Arc::clone(&backend);
            async move { Ok::<_, ClientError>(backend.unread_count().await?.into_data()?.count) }
        })
    }

    /// Poll the number of users waiting for verification review.
    pub fn pending_verifications(backend: Arc<dyn LendingBackend>, every: Duration) -> Self {
        Self::spawn(every, move || {
            let backend = Arc::clone(&backend);
            async move {
                let count = backend.pending_verifications_count().await?.into_data()?;
                Ok::<_, ClientError>(count.count)
            }
        })
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use udhaar_client::{FixtureBackend, Latency};
    use udhaar_nullables::{NullClock, NullStorage};
    use udhaar_types::NotificationId;

    fn backend() -> Arc<dyn LendingBackend> {
        Arc::new(
            FixtureBackend::new(
                Arc::new(NullStorage::new()),
                Arc::new(NullClock::new(1_750_000_000)),
            )
            .with_latency(Latency::none()),
        )
    }

    async fn next(rx: &mut watch::Receiver<Option<u64>>) -> Option<u64> {
        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .expect("poll should publish")
            .expect("poller alive");
        *rx.borrow_and_update()
    }

    #[tokio::test]
    async fn publishes_unread_count_and_follows_changes() {
        let backend = backend();
        let poller = Poller::unread_notifications(backend.clone(), Duration::from_millis(10));
        let mut rx = poller.subscribe();
        assert_eq!(next(&mut rx).await, Some(3));

        backend
            .mark_notification_read(&NotificationId::new("notif-005"))
            .await
            .unwrap();
        assert_eq!(next(&mut rx).await, Some(2));
        assert_eq!(poller.latest(), Some(2));
    }

    #[tokio::test]
    async fn expired_session_stops_polling() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let poller: Poller<u64> = Poller::spawn(Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(ClientError::AuthExpired) }
        });
        let mut rx = poller.subscribe();
        let closed = tokio::time::timeout(Duration::from_secs(2), rx.changed()).await;
        assert!(matches!(closed, Ok(Err(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(poller.latest(), None);
    }

    #[tokio::test]
    async fn dropping_aborts_the_task() {
        let poller = Poller::unread_notifications(backend(), Duration::from_millis(5));
        let mut rx = poller.subscribe();
        drop(poller);
        let closed = tokio::time::timeout(Duration::from_secs(2), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok());
    }
}
