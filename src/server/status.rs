//! Status notifications
//!
//! Broadcasts `(running, message)` transitions to every registered observer.
//! Each observer owns a queue drained on its own thread, so a slow observer
//! never holds up a transition and always sees events in publish order.

use log::{error, info};
use std::sync::{Mutex, PoisonError};
use std::thread;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A single lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub running: bool,
    /// Free text for display; not a machine-readable contract.
    pub message: String,
}

/// Receives status transitions.
pub trait StatusObserver: Send + 'static {
    fn on_status_change(&self, event: &StatusEvent);
}

impl<F> StatusObserver for F
where
    F: Fn(&StatusEvent) + Send + 'static,
{
    fn on_status_change(&self, event: &StatusEvent) {
        self(event)
    }
}

/// Fan-out of status events, in registration order.
#[derive(Default)]
pub struct StatusBroadcaster {
    subscribers: Mutex<Vec<UnboundedSender<StatusEvent>>>,
}

impl StatusBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a queue and hands back its receiving end.
    pub fn subscribe(&self) -> UnboundedReceiver<StatusEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Registers `observer`, delivering to it from a dedicated thread.
    pub fn add_observer<O: StatusObserver>(&self, observer: O) {
        let mut rx = self.subscribe();
        let spawned = thread::Builder::new()
            .name("status-observer".into())
            .spawn(move || {
                while let Some(event) = rx.blocking_recv() {
                    observer.on_status_change(&event);
                }
            });

        if let Err(e) = spawned {
            error!("Failed to spawn status observer thread: {}", e);
        }
    }

    /// Queues the event for every live subscriber. Never blocks on delivery.
    pub fn publish(&self, running: bool, message: impl Into<String>) {
        let event = StatusEvent {
            running,
            message: message.into(),
        };
        info!("Status: running={} ({})", event.running, event.message);

        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Dropped receivers unsubscribe themselves.
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc as std_mpsc;
    use std::time::Duration;

    #[test]
    fn test_every_subscriber_sees_every_event_in_order() {
        let status = StatusBroadcaster::new();
        let mut first = status.subscribe();
        let mut second = status.subscribe();

        status.publish(true, "up");
        status.publish(false, "down");

        for rx in [&mut first, &mut second] {
            assert_eq!(rx.try_recv().unwrap(), StatusEvent { running: true, message: "up".into() });
            assert_eq!(rx.try_recv().unwrap(), StatusEvent { running: false, message: "down".into() });
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let status = StatusBroadcaster::new();
        let keep = status.subscribe();
        drop(status.subscribe());
        assert_eq!(status.subscriber_count(), 2);

        status.publish(true, "up");
        assert_eq!(status.subscriber_count(), 1);
        drop(keep);
    }

    #[test]
    fn test_slow_observer_does_not_block_others() {
        let status = StatusBroadcaster::new();
        let (slow_tx, slow_rx) = std_mpsc::channel();
        let (fast_tx, fast_rx) = std_mpsc::channel();

        status.add_observer(move |event: &StatusEvent| {
            std::thread::sleep(Duration::from_millis(50));
            let _ = slow_tx.send(event.message.clone());
        });
        status.add_observer(move |event: &StatusEvent| {
            let _ = fast_tx.send(event.message.clone());
        });

        for i in 0..5 {
            status.publish(i % 2 == 0, format!("event {i}"));
        }

        // The fast observer finishes well before the slow one could.
        let fast: Vec<String> = (0..5)
            .map(|_| fast_rx.recv_timeout(Duration::from_millis(200)).unwrap())
            .collect();
        let slow: Vec<String> = (0..5)
            .map(|_| slow_rx.recv_timeout(Duration::from_secs(2)).unwrap())
            .collect();

        let expected: Vec<String> = (0..5).map(|i| format!("event {i}")).collect();
        assert_eq!(fast, expected);
        assert_eq!(slow, expected);
    }
}
