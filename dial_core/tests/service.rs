//! Decoder service: worker lifecycle, real-time timers and concurrent access.

use dial_core::train::number_edges;
use dial_core::{DecoderState, DialService, DialTiming, DialedNumber};
use dial_traits::clock::MonotonicClock;
use dial_traits::{Edge, EdgeEvent};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Short timeouts keep real-time tests fast; phases stay nominal.
fn fast_timing() -> DialTiming {
    DialTiming {
        inter_digit_ms: 150,
        max_inter_digit_ms: 400,
        ..DialTiming::default()
    }
}

fn wait_for_number(svc: &DialService, within: Duration) -> Option<DialedNumber> {
    let deadline = Instant::now() + within;
    while Instant::now() < deadline {
        if let Some(n) = svc.try_take_number() {
            return Some(n);
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    None
}

#[test]
fn service_thread_exits_on_drop() {
    let svc = DialService::start(DialTiming::default()).expect("start");
    std::thread::sleep(Duration::from_millis(20));
    let t0 = Instant::now();
    drop(svc);
    // Worker parks for at most one idle tick.
    assert!(t0.elapsed() < Duration::from_secs(2));
}

#[test]
fn multiple_services_dont_leak_threads() {
    for _ in 0..10 {
        let svc = DialService::builder()
            .with_timing(fast_timing())
            .with_clock(MonotonicClock::new())
            .build()
            .expect("build");
        let _ = svc.try_take_number();
        drop(svc);
    }
}

#[test]
fn pre_stamped_number_decodes_after_max_timeout() {
    let timing = fast_timing();
    let svc = DialService::start(timing).expect("start");
    let number: DialedNumber = "8675309".parse().unwrap();
    let tx = svc.sender();
    let start = svc.now_ms();
    // Gap between the two timeouts; timestamps run ahead of the wall clock,
    // the worker fires timers from edge time until it catches up.
    for ev in number_edges(&number, &timing, 250, start) {
        assert!(tx.send_at(ev));
    }
    let got = wait_for_number(&svc, Duration::from_secs(30)).expect("decoded number");
    assert_eq!(got, number);
    assert_eq!(svc.try_take_number(), None, "drain is one-shot");
    assert_eq!(svc.dropped_edges(), 0);
}

#[test]
fn real_time_pulses_decode() {
    // Wide windows (breaks 31..=91 ms) absorb scheduler overshoot on sleeps.
    let timing = DialTiming {
        tolerance_ms: 30,
        ..fast_timing()
    };
    let svc = DialService::start(timing).expect("start");
    let tx = svc.sender();
    // Two pulses stamped on arrival; sleeps sit at the short end of each window.
    tx.send(Edge::Falling);
    std::thread::sleep(Duration::from_millis(45));
    tx.send(Edge::Rising);
    std::thread::sleep(Duration::from_millis(30));
    tx.send(Edge::Falling);
    std::thread::sleep(Duration::from_millis(45));
    tx.send(Edge::Rising);

    let snap = svc.snapshot().expect("snapshot");
    assert!(!snap.ready);
    assert_eq!(snap.pulses, 2);

    let got = wait_for_number(&svc, Duration::from_secs(3)).expect("decoded number");
    assert_eq!(got.compact(), "2");
    assert_eq!(svc.dropped_edges(), 0);
}

#[test]
fn snapshot_reports_progress() {
    let svc = DialService::start(DialTiming::default()).expect("start");
    let tx = svc.sender();
    let t = svc.now_ms();
    tx.send_at(EdgeEvent::new(Edge::Falling, t));
    tx.send_at(EdgeEvent::new(Edge::Rising, t + 61));
    let snap = svc.snapshot().expect("snapshot");
    assert_eq!(snap.state, DecoderState::Make);
    assert_eq!(snap.pulses, 1);
    assert!(snap.pending.is_empty());
    assert!(!snap.ready);
}

#[test]
fn full_queue_drops_edges_without_blocking() {
    let svc = DialService::builder()
        .with_timing(DialTiming::default())
        .with_queue_depth(4)
        .build()
        .expect("build");
    let tx = svc.sender();
    let t0 = Instant::now();
    let mut sent = 0u64;
    for i in 0..10_000u64 {
        if tx.send_at(EdgeEvent::new(Edge::from_level(i % 2 == 0), i)) {
            sent += 1;
        }
    }
    assert!(t0.elapsed() < Duration::from_secs(5));
    assert_eq!(sent + svc.dropped_edges(), 10_000);
}

#[test]
fn concurrent_edges_and_drains_keep_digits_valid() {
    let timing = fast_timing();
    let svc = Arc::new(DialService::start(timing).expect("start"));
    let stop = Arc::new(AtomicBool::new(false));

    let producers: Vec<_> = (0..4)
        .map(|k| {
            let tx = svc.sender();
            let stop = stop.clone();
            std::thread::spawn(move || {
                let mut i = 0u64;
                while !stop.load(Ordering::Relaxed) {
                    tx.send(Edge::from_level((i + k) % 2 == 0));
                    i += 1;
                    if i % 64 == 0 {
                        std::thread::sleep(Duration::from_millis(1));
                    }
                }
            })
        })
        .collect();

    let poller = {
        let svc = svc.clone();
        let stop = stop.clone();
        std::thread::spawn(move || {
            let mut numbers = Vec::new();
            while !stop.load(Ordering::Relaxed) {
                if let Some(n) = svc.try_take_number() {
                    numbers.push(n);
                }
                let _ = svc.snapshot();
            }
            numbers
        })
    };

    std::thread::sleep(Duration::from_millis(500));
    stop.store(true, Ordering::Relaxed);
    for p in producers {
        p.join().expect("producer");
    }
    let numbers = poller.join().expect("poller");
    for n in numbers {
        assert!(!n.is_empty());
        assert!(n.digits().iter().all(|d| d.value() <= 9));
    }
    let snap = svc.snapshot().expect("snapshot");
    assert!(snap.pulses <= 10);
}
