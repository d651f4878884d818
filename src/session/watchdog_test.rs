use super::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
    let hits = Arc::new(AtomicUsize::new(0));
    let hook = {
        let hits = hits.clone();
        move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }
    };
    (hits, hook)
}

#[tokio::test(start_paused = true)]
async fn fires_once_after_delay() {
    let (hits, hook) = counter();
    let mut dog = Watchdog::new();
    dog.arm(Duration::from_secs(30), hook);

    tokio::time::advance(Duration::from_secs(29)).await;
    settle().await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(dog.is_armed());

    tokio::time::advance(Duration::from_secs(1)).await;
    settle().await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!dog.is_armed());
}

#[tokio::test(start_paused = true)]
async fn zero_delay_fires_on_next_turn() {
    let (hits, hook) = counter();
    let mut dog = Watchdog::new();
    dog.arm(Duration::ZERO, hook);
    settle().await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_prevents_fire() {
    let (hits, hook) = counter();
    let mut dog = Watchdog::new();
    dog.arm(Duration::from_secs(5), hook);
    assert!(dog.cancel());

    tokio::time::advance(Duration::from_secs(10)).await;
    settle().await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(!dog.is_armed());
}

#[tokio::test(start_paused = true)]
async fn cancel_when_idle_reports_nothing_pending() {
    let mut dog = Watchdog::new();
    assert!(!dog.cancel());
}

#[tokio::test(start_paused = true)]
async fn rearm_replaces_previous_timer() {
    let (first_hits, first) = counter();
    let (second_hits, second) = counter();
    let mut dog = Watchdog::new();
    dog.arm(Duration::from_secs(10), first);
    dog.arm(Duration::from_secs(20), second);

    tokio::time::advance(Duration::from_secs(15)).await;
    settle().await;
    assert_eq!(first_hits.load(Ordering::SeqCst), 0);
    assert_eq!(second_hits.load(Ordering::SeqCst), 0);

    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(first_hits.load(Ordering::SeqCst), 0);
    assert_eq!(second_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn deadline_tracks_armed_delay() {
    let start = Instant::now();
    let mut dog = Watchdog::new();
    assert_eq!(dog.deadline(), None);
    dog.arm(Duration::from_secs(42), || {});
    assert_eq!(dog.deadline(), Some(start + Duration::from_secs(42)));
}

#[tokio::test(start_paused = true)]
async fn drop_cancels_pending_timer() {
    let (hits, hook) = counter();
    {
        let mut dog = Watchdog::new();
        dog.arm(Duration::from_secs(1), hook);
    }
    tokio::time::advance(Duration::from_secs(2)).await;
    settle().await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
