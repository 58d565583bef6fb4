// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::{
    ops::Deref,
    time::{Duration, Instant},
};

use crossbeam::channel::{SendError, SendTimeoutError, Sender, TrySendError};

use crate::ChannelMetrics;

/// Sending half of a [`crate::DagChannel`].
#[derive(Clone, Debug)]
pub struct DagSender<T> {
    pub(crate) sender: Sender<T>,
    pub(crate) name: String,
    pub(crate) metrics: Option<ChannelMetrics>,
}

impl<T> DagSender<T> {
    fn on_sent(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.actual_len.inc();
        }
    }

    /// Send a message to the channel
    pub fn send(&self, msg: T) -> Result<(), SendError<T>> {
        self.sender.send(msg)?;
        self.on_sent();
        Ok(())
    }

    /// Send, waiting at most `duration` for room in a bounded channel.
    pub fn send_timeout(&self, msg: T, duration: Duration) -> Result<(), SendTimeoutError<T>> {
        self.sender.send_timeout(msg, duration)?;
        self.on_sent();
        Ok(())
    }

    /// Send, waiting until `deadline` for room in a bounded channel.
    pub fn send_deadline(&self, msg: T, deadline: Instant) -> Result<(), SendTimeoutError<T>> {
        self.sender.send_deadline(msg, deadline)?;
        self.on_sent();
        Ok(())
    }

    /// Send without blocking. Fails when the channel is full or disconnected.
    pub fn try_send(&self, msg: T) -> Result<(), TrySendError<T>> {
        self.sender.try_send(msg)?;
        self.on_sent();
        Ok(())
    }

    /// Name given at creation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value of the queue length gauge.
    pub fn queue_len_metric(&self) -> Option<f64> {
        self.metrics.as_ref().map(|metrics| metrics.actual_len.get())
    }
}

impl<T> Deref for DagSender<T> {
    type Target = Sender<T>;

    fn deref(&self) -> &Self::Target {
        &self.sender
    }
}
