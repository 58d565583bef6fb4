// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::{sync::Arc, thread::JoinHandle, time::Duration};

use crossbeam::channel::{bounded, select, tick, Sender};
use dagpow_channel::sender::DagSender;
use dagpow_time::DagTime;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::event::ProducerEvent;

/// Handle arming the single cycle deadline.
#[derive(Clone, Default)]
pub(crate) struct CycleTimer {
    deadline: Arc<Mutex<Option<DagTime>>>,
}

impl CycleTimer {
    /// Replace the armed deadline.
    pub(crate) fn set_deadline(&self, deadline: DagTime) {
        *self.deadline.lock() = Some(deadline);
    }

    /// Take the deadline if `now` reached it. A taken deadline never fires again.
    fn take_due(&self, now: DagTime) -> Option<DagTime> {
        let mut deadline = self.deadline.lock();
        match *deadline {
            Some(at) if now >= at => deadline.take(),
            _ => None,
        }
    }

    /// Spawn the polling thread. Dropping the returned sender stops it.
    pub(crate) fn spawn(
        &self,
        poll_interval: Duration,
        events: DagSender<ProducerEvent>,
    ) -> (Sender<()>, JoinHandle<()>) {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let timer = self.clone();
        let handle = std::thread::Builder::new()
            .name("mining-timer".into())
            .spawn(move || {
                let ticker = tick(poll_interval);
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            let now = match DagTime::now() {
                                Ok(now) => now,
                                Err(err) => {
                                    warn!("mining timer could not read the clock: {}", err);
                                    continue;
                                }
                            };
                            if let Some(deadline) = timer.take_due(now) {
                                debug!("cycle deadline {} reached", deadline);
                                if events.send(ProducerEvent::Timeout { deadline }).is_err() {
                                    break;
                                }
                            }
                        }
                    }
                }
            })
            .expect("could not spawn mining timer thread");
        (stop_tx, handle)
    }
}
