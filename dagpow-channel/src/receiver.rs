// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
    time::{Duration, Instant},
};

use crossbeam::channel::{Receiver, RecvError, RecvTimeoutError, TryRecvError};

use crate::ChannelMetrics;

/// Receiving half of a [`crate::DagChannel`].
#[derive(Clone)]
pub struct DagReceiver<T> {
    pub(crate) receiver: Receiver<T>,
    pub(crate) name: String,
    pub(crate) metrics: Option<ChannelMetrics>,
    /// reference counter to know how many receiver are cloned
    pub(crate) ref_counter: Arc<()>,
}

impl<T> Drop for DagReceiver<T> {
    fn drop(&mut self) {
        if Arc::strong_count(&self.ref_counter) == 1 {
            // this is the last ref so we can unregister metrics
            if let Some(metrics) = &self.metrics {
                metrics.unregister();
            }
        }
    }
}

impl<T> DagReceiver<T> {
    fn on_received(&self) {
        if let Some(metrics) = &self.metrics {
            // use the len of the channel instead of dec() because
            // messages may also be taken through the Deref'd receiver in select!
            metrics.actual_len.set(self.receiver.len() as f64);
            metrics.received.inc();
        }
    }

    /// attempt to receive a message from the channel
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        let msg = self.receiver.try_recv()?;
        self.on_received();
        Ok(msg)
    }

    /// Block until a message arrives or every sender is dropped.
    pub fn recv(&self) -> Result<T, RecvError> {
        let msg = self.receiver.recv()?;
        self.on_received();
        Ok(msg)
    }

    /// Block for at most `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        let msg = self.receiver.recv_timeout(timeout)?;
        self.on_received();
        Ok(msg)
    }

    /// Block until `deadline`.
    pub fn recv_deadline(&self, deadline: Instant) -> Result<T, RecvTimeoutError> {
        let msg = self.receiver.recv_deadline(deadline)?;
        self.on_received();
        Ok(msg)
    }

    /// Refresh the gauge after a message was taken through `select!`.
    pub fn update_metrics(&self) {
        self.on_received();
    }

    /// Name given at creation.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Deref for DagReceiver<T> {
    type Target = Receiver<T>;

    fn deref(&self) -> &Self::Target {
        &self.receiver
    }
}

impl<T> DerefMut for DagReceiver<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.receiver
    }
}
