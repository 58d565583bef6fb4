// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Named crossbeam channels exporting their queue length to prometheus,
//! and bounded joining of worker threads.

use std::sync::Arc;

use prometheus::{Counter, Gauge};
use receiver::DagReceiver;
use sender::DagSender;
use tracing::error;

pub mod join;
pub mod receiver;
pub mod sender;

pub use join::join_with_timeout;

/// Queue length gauge and receive counter of one channel.
#[derive(Clone, Debug)]
pub(crate) struct ChannelMetrics {
    pub(crate) actual_len: Gauge,
    pub(crate) received: Counter,
    /// false when another channel already owns these metric names
    pub(crate) registered: bool,
}

impl ChannelMetrics {
    fn new(name: &str) -> Option<Self> {
        // this can be inc() when sending msg or set() on receive
        let actual_len = match Gauge::new(
            format!("{}_channel_actual_size", name),
            "Actual length of channel",
        ) {
            Ok(gauge) => gauge,
            Err(e) => {
                error!("Failed to create actual_len gauge for {} : {}", name, e);
                return None;
            }
        };
        let received = match Counter::new(
            format!("{}_channel_total_receive", name),
            "Total received messages",
        ) {
            Ok(counter) => counter,
            Err(e) => {
                error!("Failed to create received counter for {} : {}", name, e);
                return None;
            }
        };

        // error here if metrics already registered (ex: a worker restarted in tests)
        let mut registered = true;
        if let Err(e) = prometheus::register(Box::new(actual_len.clone())) {
            error!("Failed to register actual_len gauge for {} : {}", name, e);
            registered = false;
        }
        if registered {
            if let Err(e) = prometheus::register(Box::new(received.clone())) {
                error!("Failed to register received counter for {} : {}", name, e);
                let _ = prometheus::unregister(Box::new(actual_len.clone()));
                registered = false;
            }
        }
        Some(ChannelMetrics {
            actual_len,
            received,
            registered,
        })
    }

    pub(crate) fn unregister(&self) {
        if self.registered {
            let _ = prometheus::unregister(Box::new(self.actual_len.clone()));
            let _ = prometheus::unregister(Box::new(self.received.clone()));
        }
    }
}

/// Factory for named channels.
#[derive(Clone)]
pub struct DagChannel {}

impl DagChannel {
    /// Bounded channel when `capacity` is set, unbounded otherwise.
    #[allow(clippy::new_ret_no_self)]
    pub fn new<T>(name: String, capacity: Option<usize>) -> (DagSender<T>, DagReceiver<T>) {
        let (s, r) = if let Some(capacity) = capacity {
            crossbeam::channel::bounded::<T>(capacity)
        } else {
            crossbeam::channel::unbounded::<T>()
        };

        let metrics = ChannelMetrics::new(&name);

        let sender = DagSender {
            sender: s,
            name: name.clone(),
            metrics: metrics.clone(),
        };

        let receiver = DagReceiver {
            receiver: r,
            name,
            metrics,
            ref_counter: Arc::new(()),
        };

        (sender, receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_gauge_follows_queue() {
        let (tx, rx) = DagChannel::new::<u32>("test_gauge_follows_queue".to_string(), Some(4));
        tx.send(1).unwrap();
        tx.send(2).unwrap();
        assert_eq!(tx.queue_len_metric(), Some(2.0));
        assert_eq!(rx.recv().unwrap(), 1);
        assert_eq!(tx.queue_len_metric(), Some(1.0));
    }

    #[test]
    #[serial]
    fn test_bounded_try_send_full() {
        let (tx, _rx) = DagChannel::new::<u32>("test_bounded_try_send_full".to_string(), Some(1));
        tx.try_send(1).unwrap();
        assert!(tx.try_send(2).is_err());
    }

    #[test]
    #[serial]
    fn test_same_name_twice_still_works() {
        let (tx1, rx1) = DagChannel::new::<u32>("test_same_name_twice".to_string(), None);
        let (tx2, rx2) = DagChannel::new::<u32>("test_same_name_twice".to_string(), None);
        tx1.send(1).unwrap();
        tx2.send(2).unwrap();
        assert_eq!(rx1.recv().unwrap(), 1);
        assert_eq!(rx2.recv().unwrap(), 2);
    }
}
