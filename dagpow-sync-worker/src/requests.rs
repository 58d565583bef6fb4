// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::{collections::HashMap, time::Instant};

use dagpow_models::PeerId;
use dagpow_time::DagTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestKind {
    Sums,
    Blocks,
}

#[derive(Debug, Clone)]
pub(crate) struct OutstandingRequest {
    pub(crate) peer: PeerId,
    pub(crate) kind: RequestKind,
    pub(crate) start: DagTime,
    pub(crate) end: DagTime,
    pub(crate) deadline: Instant,
}

/// Sums and blocks requests waiting for their reply, by nonce.
#[derive(Default)]
pub(crate) struct OutstandingRequests(HashMap<u64, OutstandingRequest>);

impl OutstandingRequests {
    pub(crate) fn contains(&self, nonce: u64) -> bool {
        self.0.contains_key(&nonce)
    }

    pub(crate) fn insert(&mut self, nonce: u64, request: OutstandingRequest) {
        self.0.insert(nonce, request);
    }

    /// Remove the request answered by a reply, if the reply matches it.
    ///
    /// A reply matches when it comes from the asked peer, with the same kind
    /// and end time. Anything else leaves the table untouched.
    pub(crate) fn take_matching(
        &mut self,
        nonce: u64,
        peer: &PeerId,
        end: DagTime,
        kind: RequestKind,
    ) -> Option<OutstandingRequest> {
        let matches = self
            .0
            .get(&nonce)
            .map(|req| req.peer == *peer && req.end == end && req.kind == kind)
            .unwrap_or(false);
        if matches {
            self.0.remove(&nonce)
        } else {
            None
        }
    }

    /// Remove and return the requests whose deadline passed.
    pub(crate) fn expired(&mut self, now: Instant) -> Vec<OutstandingRequest> {
        let nonces: Vec<u64> = self
            .0
            .iter()
            .filter(|(_, req)| req.deadline <= now)
            .map(|(nonce, _)| *nonce)
            .collect();
        nonces
            .into_iter()
            .filter_map(|nonce| self.0.remove(&nonce))
            .collect()
    }

    /// Forget every request sent to `peer`.
    pub(crate) fn remove_peer(&mut self, peer: &PeerId) {
        self.0.retain(|_, req| req.peer != *peer);
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}
