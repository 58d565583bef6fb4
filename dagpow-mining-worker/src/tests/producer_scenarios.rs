// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::time::Duration;

use dagpow_hash::hash::Hash;
use dagpow_mining_exports::{
    test_exports::RecordingNotifier, MiningChannels, MiningError, MockBlockTemplateProvider,
    ProducerState,
};
use dagpow_models::{
    config::{FIELD_SIZE, MINER_ADDRESS_SIZE},
    Block, ChannelId, Difficulty, RawBlock, Share, SyncStatus,
};
use dagpow_sync_exports::{
    test_exports::{test_peer, FakePeers},
    MockSyncController, SyncMessage,
};
use serial_test::serial;

use super::tools::{test_config, wait_until, TestMiningEnv};

const WAIT: Duration = Duration::from_secs(5);

/// Nonces scoring below `bound` on `template`, best first.
fn better_nonces(mut template: RawBlock, bound: Hash, count: usize) -> Vec<([u8; FIELD_SIZE], Hash)> {
    let mut found = Vec::new();
    for seed in 0u64..1_000_000 {
        let mut nonce = [0u8; FIELD_SIZE];
        nonce[..8].copy_from_slice(&seed.to_le_bytes());
        template.set_nonce(&nonce);
        let hash = template.hash();
        if hash < bound {
            found.push((nonce, hash));
            if found.len() == count {
                break;
            }
        }
    }
    found.sort_by_key(|(_, hash)| *hash);
    found
}

#[test]
#[serial]
fn test_best_share_sealed_at_deadline() {
    let mut env = TestMiningEnv::new().synced();
    let peer = test_peer(1);
    let peer_rx = env.peers.create_fake_connection(peer);
    let cfg = test_config();
    let ttl = cfg.block_ttl;
    let (mut manager, controller) = env.producer(cfg);

    controller.start().unwrap();
    assert_eq!(controller.state(), ProducerState::Running);
    let first_task = env.tasks.recv_timeout(WAIT).unwrap();
    assert_eq!(first_task.task_index, 0);

    let initial_best = controller.get_stats().best_hash.unwrap();
    let template = env.template.last_template().unwrap();
    let nonces = better_nonces(template, initial_best, 3);
    assert_eq!(nonces.len(), 3);
    // the best nonce arrives second
    for (channel, (nonce, _)) in [nonces[1], nonces[0], nonces[2]].iter().enumerate() {
        controller.receive_share(
            ChannelId(channel as u64),
            Share {
                nonce: *nonce,
                task_index: 0,
            },
        );
    }
    assert!(wait_until(WAIT, || {
        controller.get_stats().best_hash == Some(nonces[0].1)
    }));

    let (raw_block, sent_ttl) = match peer_rx.recv_timeout(WAIT).unwrap() {
        SyncMessage::NewBlock { raw_block, ttl } => (raw_block, ttl),
        other => panic!("unexpected message {:?}", other),
    };
    let sealed = Block::from_bytes(&raw_block).unwrap();
    assert_eq!(sealed.raw().nonce(), nonces[0].0);
    assert_eq!(*sealed.hash(), nonces[0].1);
    assert_eq!(sent_ttl, ttl);
    assert_eq!(env.admitted.recv_timeout(WAIT).unwrap(), sealed.id());

    let awards = env.awards.records();
    assert_eq!(awards.len(), 1);
    assert_eq!(awards[0].nonce, nonces[0].0);
    assert_eq!(awards[0].midstate, *first_task.midstate());
    assert_eq!(awards[0].block_hash, nonces[0].1);

    let next_task = env.tasks.recv_timeout(WAIT).unwrap();
    assert_eq!(next_task.task_index, 1);
    assert!(next_task.task_time > first_task.task_time);

    let stats = controller.get_stats();
    assert_eq!(stats.blocks_produced, 1);
    assert_eq!(stats.task_index, Some(1));
    assert_eq!(stats.channels.values().map(|c| c.accepted).sum::<u64>(), 3);
    manager.stop();
}

#[test]
#[serial]
fn test_stale_share_counted() {
    let mut env = TestMiningEnv::new().synced();
    let (mut manager, controller) = env.producer(test_config());
    controller.start().unwrap();
    env.tasks.recv_timeout(WAIT).unwrap();
    let before = controller.get_stats().best_hash;

    controller.receive_share(
        ChannelId(4),
        Share {
            nonce: [0u8; FIELD_SIZE],
            task_index: 99,
        },
    );
    assert!(wait_until(WAIT, || {
        controller
            .get_stats()
            .channels
            .get(&ChannelId(4))
            .map_or(false, |c| c.stale == 1)
    }));
    let stats = controller.get_stats();
    assert_eq!(stats.channels[&ChannelId(4)].accepted, 0);
    assert_eq!(stats.best_hash, before);
    manager.stop();
}

#[test]
#[serial]
fn test_new_pretop_restarts_cycle_once() {
    let mut env = TestMiningEnv::new().synced();
    let (mut manager, controller) = env.producer(test_config());
    controller.start().unwrap();
    assert_eq!(env.tasks.recv_timeout(WAIT).unwrap().task_index, 0);

    let tip = Hash::compute_from(b"competing tip");
    controller.receive_new_pretop(tip);
    assert_eq!(env.tasks.recv_timeout(WAIT).unwrap().task_index, 1);
    assert_eq!(env.template.created(), 2);

    // same tip again
    controller.receive_new_pretop(tip);
    assert!(env.tasks.recv_timeout(Duration::from_millis(100)).is_err());
    assert!(env.awards.records().is_empty());
    manager.stop();
}

#[test]
#[serial]
fn test_start_twice_rejected() {
    let mut env = TestMiningEnv::new().synced();
    let (mut manager, controller) = env.producer(test_config());
    assert_eq!(controller.state(), ProducerState::Stopped);
    controller.start().unwrap();
    assert!(matches!(
        controller.start(),
        Err(MiningError::InvalidState(ProducerState::Running))
    ));
    assert_eq!(env.template.created(), 1);
    manager.stop();
    assert_eq!(controller.state(), ProducerState::Stopped);
}

#[test]
#[serial]
fn test_restart_continues_task_indexes() {
    let mut env = TestMiningEnv::new().synced();
    let (mut manager, controller) = env.producer(test_config());
    controller.start().unwrap();
    assert_eq!(env.tasks.recv_timeout(WAIT).unwrap().task_index, 0);
    manager.stop();

    // nothing is accepted while stopped
    controller.receive_share(
        ChannelId(1),
        Share {
            nonce: [1u8; FIELD_SIZE],
            task_index: 0,
        },
    );
    controller.start().unwrap();
    assert_eq!(env.tasks.recv_timeout(WAIT).unwrap().task_index, 1);
    assert!(controller.get_stats().channels.is_empty());
    manager.stop();
}

#[test]
#[serial]
fn test_syncing_producer_drops_shares_then_runs() {
    let mut env = TestMiningEnv::new();
    let (mut manager, controller) = env.producer(test_config());
    controller.start().unwrap();
    assert_eq!(controller.state(), ProducerState::Syncing);
    assert_eq!(env.tasks.recv_timeout(WAIT).unwrap().task_index, 0);

    controller.receive_share(
        ChannelId(1),
        Share {
            nonce: [7u8; FIELD_SIZE],
            task_index: 0,
        },
    );
    controller.receive_new_pretop(Hash::compute_from(b"tip"));
    std::thread::sleep(Duration::from_millis(50));
    assert!(controller.get_stats().channels.is_empty());
    assert_eq!(env.template.created(), 1);

    env.status.mark_done();
    // the first deadline switches to sealing without sealing
    assert_eq!(env.tasks.recv_timeout(WAIT).unwrap().task_index, 1);
    assert_eq!(controller.state(), ProducerState::Running);
    assert!(env.awards.records().is_empty());
    assert!(env.admitted.try_recv().is_err());
    manager.stop();
}

#[test]
#[serial]
fn test_network_difficulty_keeps_maximum() {
    let mut env = TestMiningEnv::new().synced();
    let (mut manager, controller) = env.producer(test_config());
    // ignored while stopped
    controller.receive_new_diff(Difficulty(50));
    controller.start().unwrap();
    controller.receive_new_diff(Difficulty(10));
    controller.receive_new_diff(Difficulty(5));
    assert!(wait_until(WAIT, || {
        controller.get_stats().network_difficulty == Difficulty(10)
    }));
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(controller.get_stats().network_difficulty, Difficulty(10));
    manager.stop();
}

#[test]
#[serial]
fn test_template_failure_keeps_producer_stopped() {
    let mut template = MockBlockTemplateProvider::new();
    template
        .expect_create_block()
        .returning(|_| Err(MiningError::TemplateError("no tips".into())));
    template.expect_miner_address().returning(|| [0u8; MINER_ADDRESS_SIZE]);
    let (notifier, tasks) = RecordingNotifier::new();
    let channels = MiningChannels {
        template: Box::new(template),
        notifier: Box::new(notifier),
        award: Box::new(dagpow_mining_exports::test_exports::RecordingAwards::new()),
        sync: Box::new(MockSyncController::new()),
        peers: Box::new(FakePeers::new()),
    };
    let (mut manager, controller) = crate::start_mining_worker(
        test_config(),
        channels,
        std::sync::Arc::new(SyncStatus::new()),
    );
    assert!(matches!(
        controller.start(),
        Err(MiningError::TemplateError(_))
    ));
    assert_eq!(controller.state(), ProducerState::Stopped);
    assert!(tasks.try_recv().is_err());
    manager.stop();
}
