// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::time::Duration;

use dagpow_models::{
    config::{FULL_SYNC_SPAN, RAW_BLOCK_SIZE},
    test_exports::make_block,
    RangeDigest, SyncState,
};
use dagpow_sync_exports::{test_exports::test_peer, SyncConfig, SyncEvent, SyncMessage};
use dagpow_time::DagTime;
use serial_test::serial;

use super::tools::{drain, eager_config, new_block_message, sync_test, wait_until, TestNetwork};

const WAIT: Duration = Duration::from_secs(2);

/// Wait for the root sums request of the first cycle and return its nonce.
fn expect_root_request(rx: &crossbeam::channel::Receiver<SyncMessage>, span: DagTime) -> u64 {
    match rx.recv_timeout(WAIT).unwrap() {
        SyncMessage::SumsRequest {
            start_time,
            end_time,
            nonce,
        } => {
            assert_eq!(start_time, DagTime::ZERO);
            assert_eq!(end_time, span);
            nonce
        }
        other => panic!("unexpected message {:?}", other),
    }
}

#[test]
#[serial]
fn test_digest_diff_requests_only_differing_subrange() {
    let net = TestNetwork::new();
    let peer = test_peer(1);
    let rx = net.peers.create_fake_connection(peer);
    let step = FULL_SYNC_SPAN.to_ticks() >> 4;
    // both sides know this block
    let shared = make_block(DagTime::from_ticks(step * 2 + 5), None, 1);
    net.store.insert(shared.clone());

    sync_test(eager_config(), net.channels(), net.status.clone(), |controller, _events| {
        let nonce = expect_root_request(&rx, FULL_SYNC_SPAN);

        let mut remote = RangeDigest::default();
        remote.add_block(2, shared.raw().sum(), RAW_BLOCK_SIZE as u64);
        remote.add_block(5, 0xdead_beef, RAW_BLOCK_SIZE as u64);
        controller.on_message(
            peer,
            SyncMessage::SumsReply {
                end_time: FULL_SYNC_SPAN,
                nonce,
                digest: remote,
            },
        );

        let sent = drain(&rx);
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            SyncMessage::SumsRequest {
                start_time,
                end_time,
                ..
            } => {
                assert_eq!(*start_time, DagTime::from_ticks(5 * step));
                assert_eq!(*end_time, DagTime::from_ticks(6 * step));
            }
            other => panic!("unexpected message {:?}", other),
        }
    });
}

#[test]
#[serial]
fn test_small_subrange_fetched_as_blocks() {
    let net = TestNetwork::new();
    let peer = test_peer(1);
    let rx = net.peers.create_fake_connection(peer);
    let span = DagTime::from_ticks(1 << 24);
    let cfg = SyncConfig {
        full_sync_span: span,
        ..eager_config()
    };
    let missing = make_block(DagTime::from_ticks((3 << 20) + 1), None, 9);

    sync_test(cfg, net.channels(), net.status.clone(), |controller, _events| {
        let nonce = expect_root_request(&rx, span);
        let mut remote = RangeDigest::default();
        remote.add_block(3, missing.raw().sum(), RAW_BLOCK_SIZE as u64);
        controller.on_message(
            peer,
            SyncMessage::SumsReply {
                end_time: span,
                nonce,
                digest: remote,
            },
        );

        let sent = drain(&rx);
        assert_eq!(sent.len(), 1);
        let SyncMessage::BlocksRequest {
            start_time,
            end_time,
            nonce,
        } = sent[0].clone()
        else {
            panic!("expected a blocks request, got {:?}", sent[0]);
        };
        assert_eq!(start_time, DagTime::from_ticks(3 << 20));
        assert_eq!(end_time, DagTime::from_ticks(4 << 20));

        controller.on_message(peer, new_block_message(&missing, 1));
        controller.on_message(
            peer,
            SyncMessage::BlocksReply {
                ack: true,
                end_time,
                nonce,
            },
        );
    });
    assert_eq!(net.chain.imported(), vec![missing.id()]);
    assert!(net.peers.dropped().is_empty());
}

#[test]
#[serial]
fn test_mismatched_reply_ignored() {
    let net = TestNetwork::new();
    let (a, b) = (test_peer(1), test_peer(2));
    let rx_a = net.peers.create_fake_connection(a);
    let rx_b = net.peers.create_fake_connection(b);

    sync_test(eager_config(), net.channels(), net.status.clone(), |controller, _events| {
        let nonce = expect_root_request(&rx_a, FULL_SYNC_SPAN);
        expect_root_request(&rx_b, FULL_SYNC_SPAN);

        let mut remote = RangeDigest::default();
        remote.add_block(0, 1, RAW_BLOCK_SIZE as u64);
        // wrong end time
        controller.on_message(
            a,
            SyncMessage::SumsReply {
                end_time: DagTime::from_ticks(1 << 20),
                nonce,
                digest: remote.clone(),
            },
        );
        // right nonce, wrong peer
        controller.on_message(
            b,
            SyncMessage::SumsReply {
                end_time: FULL_SYNC_SPAN,
                nonce,
                digest: remote.clone(),
            },
        );
        assert!(drain(&rx_a).is_empty());
        assert!(drain(&rx_b).is_empty());

        // the original request is still answerable
        controller.on_message(
            a,
            SyncMessage::SumsReply {
                end_time: FULL_SYNC_SPAN,
                nonce,
                digest: remote,
            },
        );
        assert_eq!(drain(&rx_a).len(), 1);
    });
    assert!(net.peers.dropped().is_empty());
}

#[test]
#[serial]
fn test_request_timeout_drops_peer() {
    let net = TestNetwork::new();
    let peer = test_peer(1);
    let rx = net.peers.create_fake_connection(peer);
    let cfg = SyncConfig {
        request_timeout: Duration::from_millis(20),
        sync_interval: Duration::from_millis(50),
        ..eager_config()
    };

    sync_test(cfg, net.channels(), net.status.clone(), |_controller, _events| {
        expect_root_request(&rx, FULL_SYNC_SPAN);
        assert!(wait_until(WAIT, || net.peers.dropped() == vec![peer]));
    });
}

#[test]
#[serial]
fn test_lone_node_forced_sync_done() {
    let net = TestNetwork::new();
    let rx = net.peers.create_fake_connection(test_peer(1));
    let cfg = SyncConfig {
        sync_done_wait: Duration::ZERO,
        ..eager_config()
    };

    sync_test(cfg, net.channels(), net.status.clone(), |controller, events| {
        assert_eq!(events.recv_timeout(WAIT).unwrap(), SyncEvent::SyncDone);
        assert_eq!(controller.sync_state(), SyncState::Done);
        // a synced node does not start range sync cycles
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    });
}

#[test]
#[serial]
fn test_digest_reply_ignored_once_synced() {
    let net = TestNetwork::new();
    let peer = test_peer(1);
    let rx = net.peers.create_fake_connection(peer);

    sync_test(eager_config(), net.channels(), net.status.clone(), |controller, _events| {
        let nonce = expect_root_request(&rx, FULL_SYNC_SPAN);
        net.status.mark_done();
        let mut remote = RangeDigest::default();
        remote.add_block(7, 1, RAW_BLOCK_SIZE as u64);
        controller.on_message(
            peer,
            SyncMessage::SumsReply {
                end_time: FULL_SYNC_SPAN,
                nonce,
                digest: remote,
            },
        );
        assert!(drain(&rx).is_empty());
    });
}

#[test]
#[serial]
fn test_timely_reply_after_sync_done_keeps_peer() {
    let net = TestNetwork::new();
    let peer = test_peer(1);
    let rx = net.peers.create_fake_connection(peer);
    let cfg = SyncConfig {
        request_timeout: Duration::from_millis(300),
        sync_interval: Duration::from_millis(200),
        ..eager_config()
    };

    sync_test(cfg, net.channels(), net.status.clone(), |controller, _events| {
        let nonce = expect_root_request(&rx, FULL_SYNC_SPAN);
        net.status.mark_done();
        controller.on_message(
            peer,
            SyncMessage::SumsReply {
                end_time: FULL_SYNC_SPAN,
                nonce,
                digest: RangeDigest::default(),
            },
        );
        // well past the request deadline
        std::thread::sleep(Duration::from_millis(800));
        assert!(net.peers.dropped().is_empty());
        assert!(drain(&rx).is_empty());
    });
}
