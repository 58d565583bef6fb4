// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::thread::JoinHandle;

use crossbeam::channel::{bounded, select, Sender};
use dagpow_channel::{receiver::DagReceiver, sender::DagSender, DagChannel};
use dagpow_models::Block;
use dagpow_sync_exports::{ActivePeers, SyncMessage};
use tracing::{debug, warn};

/// Queue of sealed blocks waiting to be sent to every peer.
pub(crate) struct Broadcaster {
    queue: DagSender<Block>,
}

impl Broadcaster {
    /// Spawn the sending thread. Dropping the returned sender stops it.
    pub(crate) fn spawn(
        queue_size: usize,
        ttl: u8,
        peers: Box<dyn ActivePeers>,
    ) -> (Self, Sender<()>, JoinHandle<()>) {
        let (queue, receiver) = DagChannel::new("mining_broadcast".to_string(), Some(queue_size));
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = std::thread::Builder::new()
            .name("mining-broadcast".into())
            .spawn(move || run(receiver, stop_rx, ttl, peers))
            .expect("could not spawn mining broadcast thread");
        (Broadcaster { queue }, stop_tx, handle)
    }

    /// Queue `block` without blocking. A full queue drops it.
    pub(crate) fn broadcast(&self, block: Block) {
        let id = block.id();
        if let Err(err) = self.queue.try_send(block) {
            warn!("could not queue block {} for broadcast: {}", id, err);
        }
    }
}

fn run(
    receiver: DagReceiver<Block>,
    stop_rx: crossbeam::channel::Receiver<()>,
    ttl: u8,
    peers: Box<dyn ActivePeers>,
) {
    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(receiver) -> msg => {
                receiver.update_metrics();
                let Ok(block) = msg else { break };
                let raw_block = block.raw().as_bytes().to_vec();
                for peer in peers.active_peers() {
                    let message = SyncMessage::NewBlock {
                        raw_block: raw_block.clone(),
                        ttl,
                    };
                    if let Err(err) = peers.send_to_peer(&peer, message) {
                        debug!("could not send block {} to {}: {}", block.id(), peer, err);
                    }
                }
            }
        }
    }
}
