//! Cancellable fixed-interval task.
//!
//! The first tick fires one full period after [`AutoSync::spawn`], then every
//! period after that. Missed ticks are skipped rather than bunched. A tick
//! already running when [`AutoSync::stop`] is called completes first.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Handle to a running periodic task. Dropping it also stops the task.
#[derive(Debug)]
pub struct AutoSync {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    period: Duration,
}

impl AutoSync {
    /// Run `on_tick` every `period` on the current tokio runtime.
    pub fn spawn<F, Fut>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => on_tick().await,
                }
            }
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Signal the task and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "auto-sync task ended abnormally");
            }
        }
    }
}

impl Drop for AutoSync {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::time::advance;

    use super::*;

    fn counting(period: Duration) -> (AutoSync, Arc<AtomicUsize>) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let auto = AutoSync::spawn(period, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (auto, ticks)
    }

    /// Let spawned tasks observe the advanced clock.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn first_tick_waits_one_period() {
        let (auto, ticks) = counting(Duration::from_secs(60));
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0, "no tick at startup");

        advance(Duration::from_secs(59)).await;
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        auto.stop().await;
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn ticks_repeat_every_period() {
        let (auto, ticks) = counting(Duration::from_secs(60));
        for _ in 0..3 {
            advance(Duration::from_secs(60)).await;
            settle().await;
        }
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        auto.stop().await;
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn stop_prevents_further_ticks() {
        let (auto, ticks) = counting(Duration::from_secs(60));
        advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        auto.stop().await;
        advance(Duration::from_secs(600)).await;
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1, "stopped task must not tick");
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn dropping_handle_stops_task() {
        let (auto, ticks) = counting(Duration::from_secs(1));
        drop(auto);
        settle().await;
        advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }
}
