use historing::efficient_clock::{get_timestamp, Clock, TickClock, TICKS_PER_UNIT};
use historing::{HistoRing, HIST_NOVAL};
use std::thread;
use std::time::Duration;

#[test]
fn test_timestamp_monotonicity() {
    let mut prev = get_timestamp();
    for _ in 0..1000 {
        let current = get_timestamp();
        assert!(current >= prev, "Timestamps should be monotonically increasing");
        prev = current;
    }
}

#[test]
fn test_tick_clock_starts_near_zero() {
    let mut clock = TickClock::new();
    let first = clock.now();
    // Creation and the first read are far closer than a million units apart
    assert!(first < 1_000_000, "Fresh clock should start near zero, got {}", first);
}

#[test]
fn test_tick_clock_advances() {
    let mut clock = TickClock::new();
    let first = clock.now();
    thread::sleep(Duration::from_millis(5));
    let second = clock.now();
    assert!(clock.elapsed_ticks() >= TICKS_PER_UNIT, "5ms should span at least one unit");
    assert!(second > first, "Tick clock should advance across a sleep");
}

#[test]
fn test_high_frequency_ticks() {
    let mut clock = TickClock::new();
    let mut stamps = Vec::with_capacity(10000);
    for _ in 0..10000 {
        stamps.push(clock.now());
    }
    for window in stamps.windows(2) {
        assert!(window[1] >= window[0], "Ticks should be monotonic under high frequency");
    }
}

#[test]
fn test_ring_with_tick_clock() {
    let mut ring = HistoRing::new();
    ring.init_with_clock(32, TickClock::new()).unwrap();
    for _ in 0..20 {
        ring.record("f", "m", HIST_NOVAL);
        thread::sleep(Duration::from_micros(50));
    }
    let stamps: Vec<u32> = ring.iter().map(|item| item.timestamp).collect();
    assert_eq!(stamps.len(), 21);
    for window in stamps.windows(2) {
        assert!(window[1] >= window[0], "Recorded ticks should follow call order");
    }
}

#[test]
fn test_clock_per_thread() {
    let handle = thread::spawn(|| {
        let mut clock = TickClock::new();
        (0..100).map(|_| clock.now()).collect::<Vec<_>>()
    });
    let mut clock = TickClock::new();
    let main: Vec<u32> = (0..100).map(|_| clock.now()).collect();
    let spawned = handle.join().unwrap();

    for stamps in [main, spawned] {
        for window in stamps.windows(2) {
            assert!(window[1] >= window[0], "Each thread's ticks should be monotonic");
        }
    }
}
