// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::{sync::Arc, time::Duration};

use dagpow_models::{
    test_exports::{make_block, make_chain},
    BlockWrapper, Difficulty, ImportOutcome, SyncState, SyncStatus,
};
use dagpow_sync_exports::{
    test_exports::{test_peer, FakePeers, MemoryBlockStore},
    MockChain, SyncChannels, SyncError, SyncEvent, SyncMessage,
};
use dagpow_time::DagTime;
use serial_test::serial;

use super::tools::{drain, new_block_message, quiet_config, sync_test, TestNetwork};

#[test]
#[serial]
fn test_cascade_resolves_reverse_order() {
    let net = TestNetwork::new();
    let peer = test_peer(1);
    let peer_rx = net.peers.create_fake_connection(peer);
    let blocks = make_chain(DagTime::from_ticks(0x1_0000), 3, 1);
    let (b1, b2, b3) = (blocks[0].clone(), blocks[1].clone(), blocks[2].clone());

    sync_test(quiet_config(), net.channels(), net.status.clone(), |controller, _events| {
        let outcome = controller
            .validate_and_add(BlockWrapper::from_peer(b3.clone(), 5, peer))
            .unwrap();
        assert_eq!(outcome, ImportOutcome::NoParent(b2.id()));
        let outcome = controller
            .validate_and_add(BlockWrapper::from_peer(b2.clone(), 5, peer))
            .unwrap();
        assert_eq!(outcome, ImportOutcome::NoParent(b1.id()));
        assert_eq!(controller.pending_count(), 2);
        assert_eq!(
            drain(&peer_rx),
            vec![
                SyncMessage::BlockRequest { hash: b2.id() },
                SyncMessage::BlockRequest { hash: b1.id() },
            ]
        );

        let outcome = controller
            .validate_and_add(BlockWrapper::from_peer(b1.clone(), 5, peer))
            .unwrap();
        assert_eq!(outcome, ImportOutcome::ImportedBest);
        assert_eq!(controller.pending_count(), 0);
    });
    assert_eq!(net.chain.imported(), vec![b1.id(), b2.id(), b3.id()]);
}

#[test]
#[serial]
fn test_duplicate_orphan_single_request() {
    let net = TestNetwork::new();
    let peer = test_peer(1);
    let peer_rx = net.peers.create_fake_connection(peer);
    let blocks = make_chain(DagTime::from_ticks(0x1_0000), 2, 7);

    sync_test(quiet_config(), net.channels(), net.status.clone(), |controller, _events| {
        for _ in 0..2 {
            let outcome = controller
                .validate_and_add(BlockWrapper::from_peer(blocks[1].clone(), 5, peer))
                .unwrap();
            assert_eq!(outcome, ImportOutcome::NoParent(blocks[0].id()));
        }
        assert_eq!(controller.pending_count(), 1);
        assert_eq!(
            drain(&peer_rx),
            vec![SyncMessage::BlockRequest {
                hash: blocks[0].id()
            }]
        );
    });
}

#[test]
#[serial]
fn test_missing_parent_asked_to_all_without_origin() {
    let net = TestNetwork::new();
    let rx_a = net.peers.create_fake_connection(test_peer(1));
    let rx_b = net.peers.create_fake_connection(test_peer(2));
    let blocks = make_chain(DagTime::from_ticks(0x1_0000), 2, 3);

    sync_test(quiet_config(), net.channels(), net.status.clone(), |controller, _events| {
        controller
            .validate_and_add(BlockWrapper::local(blocks[1].clone(), 5))
            .unwrap();
        let expected = vec![SyncMessage::BlockRequest {
            hash: blocks[0].id(),
        }];
        assert_eq!(drain(&rx_a), expected);
        assert_eq!(drain(&rx_b), expected);
    });
}

#[test]
#[serial]
fn test_relay_decrements_ttl_and_skips_origin() {
    let net = TestNetwork::new();
    let (a, b) = (test_peer(1), test_peer(2));
    let rx_a = net.peers.create_fake_connection(a);
    let rx_b = net.peers.create_fake_connection(b);
    let root = make_block(DagTime::from_ticks(0x1_0000), None, 1);
    let child = make_block(DagTime::from_ticks(0x2_0000), Some(root.id()), 2);
    let last_hop = make_block(DagTime::from_ticks(0x3_0000), Some(child.id()), 3);

    sync_test(quiet_config(), net.channels(), net.status.clone(), |controller, _events| {
        // first import reaches the best peer difficulty
        controller
            .validate_and_add(BlockWrapper::local(root.clone(), 5))
            .unwrap();
        assert_eq!(controller.sync_state(), SyncState::Done);
        assert!(drain(&rx_a).is_empty());
        assert!(drain(&rx_b).is_empty());

        controller.on_message(a, new_block_message(&child, 5));
        assert!(drain(&rx_a).is_empty());
        assert_eq!(drain(&rx_b), vec![new_block_message(&child, 4)]);

        controller.on_message(a, new_block_message(&last_hop, 1));
        assert!(drain(&rx_a).is_empty());
        assert!(drain(&rx_b).is_empty());
    });
    assert_eq!(net.chain.imported().len(), 3);
}

#[test]
#[serial]
fn test_no_relay_while_syncing() {
    let net = TestNetwork::new();
    net.chain.set_peer_best_difficulty(Difficulty(10));
    let (a, b) = (test_peer(1), test_peer(2));
    let _rx_a = net.peers.create_fake_connection(a);
    let rx_b = net.peers.create_fake_connection(b);
    let root = make_block(DagTime::from_ticks(0x1_0000), None, 1);

    sync_test(quiet_config(), net.channels(), net.status.clone(), |controller, _events| {
        controller.on_message(a, new_block_message(&root, 5));
        assert_eq!(controller.sync_state(), SyncState::Syncing);
        assert!(drain(&rx_b).is_empty());
    });
}

#[test]
#[serial]
fn test_sync_done_is_one_shot() {
    let net = TestNetwork::new();
    net.chain.set_peer_best_difficulty(Difficulty(2));
    let blocks = make_chain(DagTime::from_ticks(0x1_0000), 3, 11);

    sync_test(quiet_config(), net.channels(), net.status.clone(), |controller, events| {
        controller
            .validate_and_add(BlockWrapper::local(blocks[0].clone(), 5))
            .unwrap();
        assert_eq!(controller.sync_state(), SyncState::Syncing);
        assert!(events.try_recv().is_err());

        controller
            .validate_and_add(BlockWrapper::local(blocks[1].clone(), 5))
            .unwrap();
        assert_eq!(controller.sync_state(), SyncState::Done);
        assert_eq!(
            events.recv_timeout(Duration::from_secs(1)).unwrap(),
            SyncEvent::SyncDone
        );

        net.chain.set_peer_best_difficulty(Difficulty(100));
        controller
            .validate_and_add(BlockWrapper::local(blocks[2].clone(), 5))
            .unwrap();
        assert_eq!(controller.sync_state(), SyncState::Done);
        assert!(events.try_recv().is_err());
    });
}

#[test]
#[serial]
fn test_invalid_and_known_blocks() {
    let net = TestNetwork::new();
    let invalid = make_block(DagTime::from_ticks(0x1_0000), None, 1);
    let known = make_block(DagTime::from_ticks(0x2_0000), None, 2);
    net.chain.mark_invalid(invalid.id());
    net.chain.add_known(known.id());

    sync_test(quiet_config(), net.channels(), net.status.clone(), |controller, _events| {
        let outcome = controller
            .validate_and_add(BlockWrapper::from_peer(invalid.clone(), 5, test_peer(1)))
            .unwrap();
        assert_eq!(outcome, ImportOutcome::Invalid);
        let outcome = controller
            .validate_and_add(BlockWrapper::local(known.clone(), 5))
            .unwrap();
        assert_eq!(outcome, ImportOutcome::Exist);
        assert_eq!(controller.pending_count(), 0);
    });
    assert!(net.chain.imported().is_empty());
    assert!(net.peers.dropped().is_empty());
}

#[test]
#[serial]
fn test_malformed_block_drops_peer() {
    let net = TestNetwork::new();
    let peer = test_peer(1);
    let _rx = net.peers.create_fake_connection(peer);

    sync_test(quiet_config(), net.channels(), net.status.clone(), |controller, _events| {
        controller.on_message(
            peer,
            SyncMessage::NewBlock {
                raw_block: vec![0u8; 100],
                ttl: 3,
            },
        );
    });
    assert_eq!(net.peers.dropped(), vec![peer]);
    assert!(net.chain.imported().is_empty());
}

#[test]
#[serial]
fn test_chain_error_propagates() {
    let mut chain = MockChain::new();
    chain
        .expect_try_connect()
        .times(1)
        .returning(|_| Err(SyncError::ChainError("storage offline".into())));
    let channels = SyncChannels {
        chain: Box::new(chain),
        store: Box::new(MemoryBlockStore::new()),
        peers: Box::new(FakePeers::new()),
    };
    let block = make_block(DagTime::from_ticks(0x1_0000), None, 1);

    sync_test(
        quiet_config(),
        channels,
        Arc::new(SyncStatus::new()),
        |controller, _events| {
            let result = controller.validate_and_add(BlockWrapper::local(block, 5));
            assert!(matches!(result, Err(SyncError::ChainError(_))));
            assert_eq!(controller.sync_state(), SyncState::Syncing);
        },
    );
}
