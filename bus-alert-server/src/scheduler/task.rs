//! Cancellable recurring task.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Handle to a running poll loop.
///
/// Dropping the handle cancels the loop, as does [`PollHandle::cancel`].
#[derive(Debug)]
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop the loop. An in-flight tick is abandoned at its next await point.
    pub fn cancel(self) {
        self.task.abort();
    }

    /// Whether the loop has exited, either by cancellation or by the tick
    /// callback breaking out.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a loop that awaits `on_tick` every `period`.
///
/// The first tick fires one full period after spawning. A tick that overruns
/// the period delays the next one rather than queueing a burst, and ticks
/// never overlap. The loop exits when `on_tick` returns `Break`.
pub fn spawn_poll_loop<F, Fut>(period: Duration, mut on_tick: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ControlFlow<()>> + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if on_tick().await.is_break() {
                break;
            }
        }
    });

    PollHandle { task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_loop(period: Duration, stop_after: usize) -> (PollHandle, Arc<AtomicUsize>) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let handle = spawn_poll_loop(period, move || {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n >= stop_after {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        });
        (handle, ticks)
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let (_handle, ticks) = counting_loop(Duration::from_secs(60), usize::MAX);

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticking() {
        let (handle, ticks) = counting_loop(Duration::from_secs(30), usize::MAX);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        handle.cancel();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn break_ends_the_loop() {
        let (handle, ticks) = counting_loop(Duration::from_secs(30), 2);

        tokio::time::sleep(Duration::from_secs(200)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert!(handle.is_finished());
    }
}
