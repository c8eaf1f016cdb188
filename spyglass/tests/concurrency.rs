//! Producer and waiter on different threads.

use std::{
    sync::{
        Arc, Barrier,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use spyglass::RecordingObserver;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[test]
fn delayed_producer_releases_timed_wait_early() {
    init_tracing();
    let observer = RecordingObserver::new();
    let producer = observer.clone();

    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        producer.on_value("ready");
    });

    let start = Instant::now();
    observer.await_value_timeout(Duration::from_secs(1));
    assert!(start.elapsed() < Duration::from_secs(1));
    observer.assert_has_value().unwrap();
    assert_eq!(observer.value().unwrap(), "ready");
    handle.join().unwrap();
}

#[test]
fn await_next_value_never_returns_on_existing_value_under_load() {
    init_tracing();
    const ROUNDS: usize = 200;

    let observer = RecordingObserver::new();
    observer.on_value(0usize);

    let stop = Arc::new(AtomicBool::new(false));
    let producer = {
        let observer = observer.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            let mut next = 1usize;
            while !stop.load(Ordering::Relaxed) {
                observer.on_value(next);
                next += 1;
                if next % 7 == 0 {
                    thread::yield_now();
                } else {
                    thread::sleep(Duration::from_micros(50));
                }
            }
        })
    };

    for _ in 0..ROUNDS {
        let before = observer.history_len();
        let start = Instant::now();
        observer.await_next_value_timeout(Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(5), "lost wakeup");
        assert!(observer.history_len() > before);
    }

    stop.store(true, Ordering::Relaxed);
    producer.join().unwrap();

    let history = observer.value_history();
    assert!(history.windows(2).all(|w| w[1] == w[0] + 1));
}

#[test]
fn concurrent_next_value_waiters_are_all_released() {
    init_tracing();
    let observer = RecordingObserver::new();
    observer.on_value(0);

    let barrier = Arc::new(Barrier::new(4));
    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let observer = observer.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let start = Instant::now();
                observer.await_next_value_timeout(Duration::from_secs(2));
                start.elapsed()
            })
        })
        .collect();

    barrier.wait();
    thread::sleep(Duration::from_millis(100));
    observer.on_value(1);

    for waiter in waiters {
        let waited = waiter.join().unwrap();
        assert!(waited < Duration::from_secs(2));
    }
    observer.assert_history_size(2).unwrap();
}

#[test]
fn map_during_production_sees_every_value_exactly_once() {
    init_tracing();
    const COUNT: u32 = 2_000;

    let parent = RecordingObserver::new();
    let producer = {
        let parent = parent.clone();
        thread::spawn(move || {
            for v in 0..COUNT {
                parent.on_value(v);
            }
        })
    };

    thread::sleep(Duration::from_micros(200));
    let child = parent.map(|v: &u32| u64::from(*v) * 2);
    producer.join().unwrap();

    let expected: Vec<u64> = parent
        .value_history()
        .iter()
        .map(|v| u64::from(*v) * 2)
        .collect();
    assert_eq!(child.value_history(), expected);
    child.assert_history_size(COUNT as usize).unwrap();
}

#[test]
fn readers_racing_producer_see_monotonic_history() {
    init_tracing();
    let observer = RecordingObserver::new();
    let producer = {
        let observer = observer.clone();
        thread::spawn(move || {
            for v in 0..5_000u32 {
                observer.on_value(v);
            }
        })
    };

    let mut last_len = 0;
    while last_len < 5_000 {
        let history = observer.value_history();
        assert!(history.len() >= last_len);
        assert!(history.iter().enumerate().all(|(i, v)| *v as usize == i));
        last_len = history.len();
    }
    producer.join().unwrap();
}

#[test]
fn blocking_await_value_wakes_from_other_thread() {
    let observer = RecordingObserver::new();
    let producer = observer.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        producer.on_value(Some(3));
    });

    observer.await_value().assert_value(&Some(3)).unwrap();
    handle.join().unwrap();
}
