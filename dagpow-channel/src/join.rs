// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::{
    thread::JoinHandle,
    time::{Duration, Instant},
};

use tracing::{error, warn};

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Join `handle` if the thread finishes within `timeout`.
///
/// Returns `None` when the thread is still running at the deadline (it is
/// left detached) or when it panicked.
pub fn join_with_timeout<T>(handle: JoinHandle<T>, timeout: Duration) -> Option<T> {
    let name = handle
        .thread()
        .name()
        .unwrap_or("<unnamed>")
        .to_string();
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            warn!("thread {} did not stop within {:?}, detaching it", name, timeout);
            return None;
        }
        std::thread::sleep(JOIN_POLL_INTERVAL);
    }
    match handle.join() {
        Ok(value) => Some(value),
        Err(_) => {
            error!("thread {} panicked", name);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::bounded;

    #[test]
    fn test_join_finished_thread() {
        let handle = std::thread::Builder::new()
            .name("quick".into())
            .spawn(|| 7)
            .unwrap();
        assert_eq!(join_with_timeout(handle, Duration::from_secs(1)), Some(7));
    }

    #[test]
    fn test_join_gives_up_on_stuck_thread() {
        let (release_tx, release_rx) = bounded::<()>(0);
        let handle = std::thread::Builder::new()
            .name("stuck".into())
            .spawn(move || {
                let _ = release_rx.recv();
            })
            .unwrap();
        let started = Instant::now();
        assert_eq!(join_with_timeout(handle, Duration::from_millis(50)), None);
        assert!(started.elapsed() < Duration::from_secs(1));
        drop(release_tx);
    }
}
