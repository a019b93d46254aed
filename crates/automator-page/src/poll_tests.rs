use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::clock::ManualClock;

fn spec(interval_ms: u64, timeout_ms: u64) -> PollSpec {
    PollSpec::new(
        Duration::from_millis(interval_ms),
        Duration::from_millis(timeout_ms),
    )
}

#[tokio::test]
async fn test_returns_immediately_when_predicate_holds() {
    let clock = ManualClock::new();
    let result: Result<u32, PollError<String>> =
        poll_until(&clock, spec(500, 10_000), None, || async { Ok(Some(7)) }).await;

    assert_eq!(result.unwrap(), 7);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_polls_on_fixed_cadence() {
    let clock = ManualClock::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    let result: Result<&str, PollError<String>> = poll_until(&clock, spec(2000, 300_000), None, || {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok(if n == 3 { Some("ready") } else { None }) }
    })
    .await;

    assert_eq!(result.unwrap(), "ready");
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(2000); 3]);
}

#[tokio::test]
async fn test_timeout_is_distinct_from_probe_error() {
    let clock = ManualClock::new();
    let result: Result<(), PollError<String>> =
        poll_until(&clock, spec(500, 10_000), None, || async { Ok(None) }).await;

    match result {
        Err(PollError::Timeout(limit)) => assert_eq!(limit, Duration::from_secs(10)),
        other => panic!("expected timeout, got {:?}", other),
    }
    assert_eq!(clock.now(), Duration::from_secs(10));
}

#[tokio::test]
async fn test_probe_error_stops_the_wait() {
    let clock = ManualClock::new();
    let result: Result<(), PollError<String>> = poll_until(&clock, spec(500, 10_000), None, || async {
        Err("detached".to_string())
    })
    .await;

    assert!(matches!(result, Err(PollError::Probe(ref e)) if e == "detached"));
}

#[tokio::test]
async fn test_last_sleep_is_clamped_to_deadline() {
    let clock = ManualClock::new();
    let _: Result<(), PollError<String>> =
        poll_until(&clock, spec(2000, 3000), None, || async { Ok(None) }).await;

    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_millis(2000), Duration::from_millis(1000)]
    );
}

#[tokio::test]
async fn test_cancelled_token_ends_wait() {
    let clock = ManualClock::new();
    let token = CancellationToken::new();
    token.cancel();

    let result: Result<(), PollError<String>> =
        poll_until(&clock, spec(500, 10_000), Some(&token), || async { Ok(None) }).await;

    assert!(matches!(result, Err(PollError::Cancelled)));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_interrupts_sleep() {
    let clock = crate::clock::TokioClock::new();
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let result: Result<(), PollError<String>> =
        poll_until(&clock, spec(60_000, 300_000), Some(&token), || async { Ok(None) }).await;

    assert!(matches!(result, Err(PollError::Cancelled)));
    assert!(clock.now() < Duration::from_secs(60));
}
