// tests/unit_backoff_test.rs

use peridot::BackoffConfig;
use peridot::core::connection::backoff::Backoff;
use std::time::Duration;

fn config(base_ms: u64, factor: u32, max_ms: u64, max_attempts: Option<u32>) -> BackoffConfig {
    BackoffConfig {
        base_ms,
        factor,
        max_ms,
        max_attempts,
    }
}

#[test]
fn test_delays_grow_exponentially_up_to_the_cap() {
    let mut backoff = Backoff::new(config(10, 2, 100, None));
    // Attempt n: min(10 * 2^n, 100) plus jitter in [0, 10).
    let expected_floor = [10u64, 20, 40, 80, 100, 100];
    for floor in expected_floor {
        let delay = backoff.next_delay().expect("unbounded attempts");
        assert!(delay >= Duration::from_millis(floor), "delay {delay:?} below {floor}ms");
        assert!(
            delay < Duration::from_millis(floor + 10),
            "delay {delay:?} exceeds jitter window above {floor}ms"
        );
    }
}

#[test]
fn test_max_attempts_exhausts() {
    let mut backoff = Backoff::new(config(5, 2, 50, Some(3)));
    assert!(backoff.next_delay().is_some());
    assert!(backoff.next_delay().is_some());
    assert!(backoff.next_delay().is_some());
    assert!(backoff.next_delay().is_none());
    assert_eq!(backoff.attempts_made(), 3);
}

#[test]
fn test_reset_restarts_the_schedule() {
    let mut backoff = Backoff::new(config(10, 2, 1000, None));
    backoff.next_delay();
    backoff.next_delay();
    backoff.reset();
    let delay = backoff.next_delay().unwrap();
    assert!(delay < Duration::from_millis(20));
}

#[test]
fn test_large_attempt_counts_do_not_overflow() {
    let mut backoff = Backoff::new(config(1000, 2, 30_000, None));
    let mut last = Duration::ZERO;
    for _ in 0..80 {
        last = backoff.next_delay().unwrap();
    }
    assert!(last <= Duration::from_millis(30_000 + 1000));
}
