//! Integration tests for observables and signals across tasks and threads.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use formstate_signals::{Observable, Signal};

fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, Arc<dyn Fn(&T) + Send + Sync>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, Arc::new(move |v: &T| sink.lock().unwrap().push(v.clone())))
}

#[test]
fn test_late_receiver_sees_current_value_first() {
    let progress = Observable::new(false);
    progress.set(true);

    let (seen, callback) = recorder::<bool>();
    progress.connect("spinner", callback);
    progress.set(false);

    assert_eq!(*seen.lock().unwrap(), vec![true, false]);
}

#[test]
fn test_receivers_called_in_connection_order() {
    let value = Observable::new(0_i32);
    let order = Arc::new(Mutex::new(Vec::new()));

    for name in ["first", "second", "third"] {
        let order = order.clone();
        value.connect(
            name,
            Arc::new(move |v: &i32| order.lock().unwrap().push((name, *v))),
        );
    }
    order.lock().unwrap().clear();

    value.set(7);
    assert_eq!(
        *order.lock().unwrap(),
        vec![("first", 7), ("second", 7), ("third", 7)]
    );
}

#[test]
fn test_unchanged_value_not_renotified() {
    let filled = Observable::new(false);
    let (seen, callback) = recorder::<bool>();
    filled.connect("submit", callback);

    assert!(!filled.set_if_changed(false));
    assert!(filled.set_if_changed(true));
    assert!(!filled.set_if_changed(true));

    assert_eq!(*seen.lock().unwrap(), vec![false, true]);
}

#[test]
fn test_disconnected_receiver_stops_receiving() {
    let value = Observable::new(String::from("a"));
    let (seen, callback) = recorder::<String>();
    value.connect("label", callback);
    value.set("b".into());

    assert!(value.disconnect("label"));
    assert!(!value.disconnect("label"));
    value.set("c".into());

    assert_eq!(*seen.lock().unwrap(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(value.receiver_count(), 0);
}

#[test]
fn test_signal_does_not_replay() {
    let signal: Signal<u32> = Signal::new();
    assert_eq!(signal.send(&1), 0);

    let (seen, callback) = recorder::<u32>();
    signal.connect("log", callback);
    assert_eq!(signal.send(&2), 1);

    assert_eq!(*seen.lock().unwrap(), vec![2]);
}

#[tokio::test(start_paused = true)]
async fn test_async_subscriber_observes_updates_from_task() {
    let value = Arc::new(Observable::new(0_u64));
    let mut rx = value.subscribe();
    assert_eq!(*rx.borrow_and_update(), 0);

    let writer = value.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        writer.set(42);
    });

    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), 42);
}

#[test]
fn test_concurrent_writers_from_threads() {
    let counter = Arc::new(Observable::new(0_usize));
    let (seen, callback) = recorder::<usize>();
    counter.connect("count", callback);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let counter = counter.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    counter.update(|n| *n += 1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(counter.get(), 100);
    // One replay on connect plus one notification per update.
    assert_eq!(seen.lock().unwrap().len(), 101);
}

#[test]
fn test_concurrent_writers_deliver_every_value_in_order() {
    const THREADS: usize = 4;
    const WRITES: usize = 5_000;

    let counter = Arc::new(Observable::new(0_usize));
    let (seen, callback) = recorder::<usize>();
    counter.connect("sequence", callback);

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let counter = counter.clone();
            std::thread::spawn(move || {
                for _ in 0..WRITES {
                    counter.update(|n| *n += 1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let expected: Vec<usize> = (0..=THREADS * WRITES).collect();
    assert_eq!(*seen.lock().unwrap(), expected);
}

#[test]
fn test_concurrent_set_if_changed_never_repeats_a_value() {
    let flag = Arc::new(Observable::new(false));
    let (seen, callback) = recorder::<bool>();
    flag.connect("toggle", callback);

    let handles: Vec<_> = [true, false]
        .into_iter()
        .map(|value| {
            let flag = flag.clone();
            std::thread::spawn(move || {
                for _ in 0..2_000 {
                    flag.set_if_changed(value);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let seen = seen.lock().unwrap();
    assert!(seen.windows(2).all(|pair| pair[0] != pair[1]));
    assert_eq!(seen.last().copied(), Some(flag.get()));
}
