// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Machine readable trace events.

#[doc(hidden)]
pub use serde_json as __serde_json;
#[doc(hidden)]
pub use tracing as __tracing;

/// `dagpow_trace!("event.name", { "key": value })` emits a trace line
/// `dagpow_trace:<event>:<json>`.
#[macro_export]
macro_rules! dagpow_trace {
    ($evt:expr, $params:tt) => {
        $crate::__tracing::trace!(
            "dagpow_trace:{}:{}",
            $evt,
            $crate::__serde_json::json!($params)
        );
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_trace_expands_without_subscriber() {
        let hash = "abc";
        dagpow_trace!("sync.import", { "hash": hash, "ttl": 3 });
    }
}
