use historing::{hist, histx, HistoRing, InitError, LineCollector, Message, HIST_NOVAL};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

fn drain_lines(ring: &mut HistoRing<'_>) -> (usize, Vec<String>) {
    let mut collector = LineCollector::new();
    let drained = ring.drain(Some(&mut collector));
    (drained, collector.lines())
}

fn serial_ring(capacity: usize) -> HistoRing<'static> {
    let mut ring = HistoRing::new();
    ring.init(capacity, None).unwrap();
    ring
}

#[test]
fn test_init() {
    let mut ring = HistoRing::new();
    assert!(ring.init(1024, None).is_ok());
    assert!(ring.is_initialized());
    assert_eq!(ring.capacity(), 1024);
    assert_eq!(ring.len(), 1, "Init should leave its bookkeeping record");
}

#[test]
fn test_init_fails() {
    let mut ring = HistoRing::new();
    assert_eq!(ring.init(0, None), Err(InitError::InvalidCapacity));
    assert!(!ring.is_initialized());
    assert_eq!(ring.drain(None), 0);
}

#[test]
fn test_print() {
    let mut ring = serial_ring(1024);
    let (first, lines) = drain_lines(&mut ring);
    assert_eq!(first, 1, "Only the init message should be held");
    assert_eq!(lines, vec!["0 init() history ring initialized"]);

    let (second, lines) = drain_lines(&mut ring);
    assert_eq!(second, 0, "Drain should have emptied the ring");
    assert!(lines.is_empty());
}

#[test]
fn test_add_full() {
    let mut ring = serial_ring(1024);
    hist!(ring, "first message");
    let (_, lines) = drain_lines(&mut ring);
    assert_eq!(lines[1], "1 test_add_full() first message");
}

#[test]
fn test_add_full_data() {
    let mut ring = serial_ring(1024);
    ring.record("test_add_full_data", "data message", 0xabcd);
    let (_, lines) = drain_lines(&mut ring);
    assert_eq!(lines[1], "1 test_add_full_data() data message 0xabcd");
}

#[test]
fn test_add_macros() {
    let mut ring = serial_ring(1024);
    hist!(ring, "message");
    histx!(ring, "data message", 0x12345678);
    hist!(ring, "another message");
    histx!(ring, "another data message", 0x7f);

    let (drained, lines) = drain_lines(&mut ring);
    assert_eq!(drained, 5);
    assert_eq!(
        lines,
        vec![
            "0 init() history ring initialized",
            "1 test_add_macros() message",
            "2 test_add_macros() data message 0x12345678",
            "3 test_add_macros() another message",
            "4 test_add_macros() another data message 0x7f",
        ]
    );
}

#[test]
fn test_histx_keeps_full_data_word() {
    let mut ring = serial_ring(8);
    let status: u32 = 0xdead_0001;
    let flags = 0x8000_0000u32;
    histx!(ring, "status", status);
    histx!(ring, "flags", flags);
    histx!(ring, "literal", 0x7f);

    let (_, lines) = drain_lines(&mut ring);
    assert_eq!(
        lines[1..],
        [
            "1 test_histx_keeps_full_data_word() status 0xdead0001",
            "2 test_histx_keeps_full_data_word() flags 0x80000000",
            "3 test_histx_keeps_full_data_word() literal 0x7f",
        ]
    );
}

#[test]
fn test_overwrite_order() {
    let mut ring = serial_ring(3);
    ring.clear();
    for msg in ["A", "B", "C", "D"] {
        ring.record("f", msg, HIST_NOVAL);
    }
    let messages: Vec<&str> = ring.iter().map(|item| item.message.text()).collect();
    assert_eq!(messages, vec!["B", "C", "D"]);

    let (drained, lines) = drain_lines(&mut ring);
    assert_eq!(drained, 3);
    assert_eq!(lines, vec!["2 f() B", "3 f() C", "4 f() D"]);
}

#[test]
fn test_capacity_invariant() {
    for capacity in 1..=6 {
        for extra in 0..10 {
            let mut ring = serial_ring(capacity);
            ring.clear();
            let total = capacity + extra;
            for i in 0..total {
                ring.record("f", "m", i as u32);
                assert!(ring.len() <= capacity, "Count exceeded capacity");
            }
            assert_eq!(ring.len(), capacity);

            let mut collector = LineCollector::new();
            assert_eq!(ring.print(&mut collector), capacity);
            let data: Vec<String> = collector
                .lines()
                .iter()
                .map(|l| l.rsplit(' ').next().unwrap().to_string())
                .collect();
            let expected: Vec<String> = (extra..total).map(|i| format!("0x{:x}", i)).collect();
            assert_eq!(data, expected, "capacity {} extra {}", capacity, extra);
        }
    }
}

#[test]
fn test_sentinel_omitted() {
    let mut ring = serial_ring(4);
    ring.clear();
    ring.record("f", "none", HIST_NOVAL);
    ring.record("f", "zero", 0);
    ring.record("f", "max", u32::MAX);
    let (_, lines) = drain_lines(&mut ring);
    assert_eq!(lines, vec!["1 f() none", "2 f() zero 0x0", "3 f() max 0xffffffff"]);
}

#[test]
fn test_serial_monotonic_across_eviction() {
    let mut ring = serial_ring(2);
    for _ in 0..9 {
        ring.record("f", "m", HIST_NOVAL);
    }
    let stamps: Vec<u32> = ring.iter().map(|item| item.timestamp).collect();
    assert_eq!(stamps, vec![8, 9]);
}

#[test]
fn test_clock_used_when_installed() {
    let ticks = Arc::new(AtomicU32::new(1000));
    let source = ticks.clone();
    let mut ring = HistoRing::new();
    ring.init_with_clock(4, move || source.fetch_add(10, Ordering::SeqCst))
        .unwrap();
    ring.record("f", "m", HIST_NOVAL);

    let stamps: Vec<u32> = ring.iter().map(|item| item.timestamp).collect();
    assert_eq!(stamps, vec![1000, 1010]);
    assert_eq!(ticks.load(Ordering::SeqCst), 1020);
}

#[test]
fn test_fixed_clock() {
    fn my_timestamp() -> u32 {
        123456789
    }
    let mut ring = HistoRing::new();
    ring.init(8, Some(Box::new(my_timestamp))).unwrap();
    ring.record("main", "tick", 7);
    let (_, lines) = drain_lines(&mut ring);
    assert_eq!(
        lines,
        vec!["123456789 init() history ring initialized", "123456789 main() tick 0x7"]
    );
}

#[test]
fn test_reinit_resets_history() {
    let mut ring = HistoRing::new();
    ring.init_with_clock(4, || 55).unwrap();
    for _ in 0..3 {
        ring.record("old", "stale", HIST_NOVAL);
    }
    ring.init(6, None).unwrap();
    assert_eq!(ring.capacity(), 6);
    assert!(!ring.has_clock(), "Re-init should drop the previous clock");

    let (drained, lines) = drain_lines(&mut ring);
    assert_eq!(drained, 1);
    assert_eq!(lines, vec!["0 init() history ring initialized"]);
}

#[test]
fn test_record_after_teardown() {
    let mut ring = serial_ring(4);
    ring.teardown();
    ring.teardown();
    ring.record("f", "lost", 1);
    assert_eq!(ring.len(), 0);
    assert_eq!(ring.capacity(), 0);
    assert_eq!(ring.drain(None), 0);
}

#[test]
fn test_drain_without_sink_clears() {
    let mut ring = serial_ring(8);
    ring.record("f", "a", HIST_NOVAL);
    ring.record("f", "b", HIST_NOVAL);
    assert_eq!(ring.drain(None), 3);
    assert!(ring.is_empty());

    // Ring stays usable and keeps counting
    ring.record("f", "c", HIST_NOVAL);
    let (_, lines) = drain_lines(&mut ring);
    assert_eq!(lines, vec!["3 f() c"]);
}

#[test]
fn test_far_and_ram_messages_render_alike() {
    let mut ring = serial_ring(4);
    ring.clear();
    ring.record("f", Message::Ram("same text"), HIST_NOVAL);
    ring.record("f", Message::Far("same text"), HIST_NOVAL);
    let (_, lines) = drain_lines(&mut ring);
    assert_eq!(lines, vec!["1 f() same text", "2 f() same text"]);
}

#[test]
fn test_borrowed_origin_and_message() {
    let origin = String::from("dynamic_origin");
    let message = format!("built at {}", 3);
    let mut ring = HistoRing::new();
    ring.init(2, None).unwrap();
    ring.record(&origin, message.as_str(), HIST_NOVAL);
    let (_, lines) = drain_lines(&mut ring);
    assert_eq!(lines[1], "1 dynamic_origin() built at 3");
}

#[test]
fn test_capacity_one() {
    let mut ring = serial_ring(1);
    assert!(ring.is_full());
    ring.record("f", "only", 9);
    let (drained, lines) = drain_lines(&mut ring);
    assert_eq!(drained, 1);
    assert_eq!(lines, vec!["1 f() only 0x9"]);
}

#[test]
fn test_closure_origin() {
    let mut ring = serial_ring(4);
    ring.clear();
    let record = |r: &mut HistoRing<'static>| hist!(r, "from closure");
    record(&mut ring);
    let (_, lines) = drain_lines(&mut ring);
    assert_eq!(lines, vec!["1 test_closure_origin() from closure"]);
}
