//! Nonce / timestamp generation
//!
//! Venues that take a client nonce expect wall-clock epoch milliseconds.
//! The generator never hands out the same value twice within a process,
//! even when two requests are built inside the same millisecond.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Last nonce handed out by `next_nonce_ms`
static LAST_NONCE_MS: AtomicU64 = AtomicU64::new(0);

/// Current wall-clock time in milliseconds
pub fn current_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Current wall-clock time in seconds
pub fn current_time_secs() -> u64 {
    current_time_ms() / 1000
}

/// Fresh millisecond nonce, strictly greater than every previous one.
pub fn next_nonce_ms() -> u64 {
    let now = current_time_ms();
    let mut last = LAST_NONCE_MS.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(last + 1);
        match LAST_NONCE_MS.compare_exchange_weak(
            last,
            candidate,
            Ordering::SeqCst,
            Ordering::Relaxed,
        ) {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_time_ms() {
        assert!(current_time_ms() > 1_700_000_000_000);
        assert!(current_time_secs() > 1_700_000_000);
    }

    #[test]
    fn test_nonces_strictly_increase() {
        let mut previous = next_nonce_ms();
        for _ in 0..1_000 {
            let next = next_nonce_ms();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_nonce_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..250).map(|_| next_nonce_ms()).collect::<Vec<_>>()))
            .collect();
        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }
}
