//! Event stream: ordering, buffering, teardown and late callbacks.

use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::json;
use reward_ads::{AdError, AdEvent, Reward};

use crate::support::Harness;

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn events_arrive_in_engine_order() {
    let h = Harness::new();
    h.init(1);
    let events = h.ads().subscribe(1).unwrap();
    h.load(1);

    let engine = h.engine(1);
    engine.fire_loaded();
    h.ok("showRewardAd", json!({ "id": 1 }));
    engine.fire_opened();
    engine.fire_impression();
    engine.fire_clicked();
    engine.fire_completed();
    engine.fire_rewarded("coins", 5);
    engine.fire_left_app();
    engine.fire_closed();

    let names: Vec<&str> = events.drain().iter().map(AdEvent::name).collect();
    assert_eq!(
        names,
        vec![
            "loaded",
            "opened",
            "impression",
            "clicked",
            "completed",
            "rewarded",
            "left_app",
            "closed",
        ]
    );
}

#[test]
fn events_before_subscribe_are_buffered() {
    let h = Harness::new();
    h.init(1);
    h.load(1);
    h.engine(1).fire_load_failed(3, "no fill");

    let events = h.ads().subscribe(1).unwrap();
    assert_eq!(
        events.try_recv(),
        Some(AdEvent::LoadFailed {
            code: 3,
            reason: "no fill".into()
        })
    );
}

#[test]
fn load_failure_only_surfaces_as_event() {
    let h = Harness::new();
    h.init(1);
    let events = h.ads().subscribe(1).unwrap();

    // The command succeeds; the failure comes later on the stream.
    h.load(1);
    h.engine(1).fire_load_failed(2, "network");
    assert_eq!(events.try_recv().map(|e| e.name()), Some("load_failed"));
    assert_eq!(h.is_loaded(1), json!(false));
}

#[test]
fn show_failure_surfaces_as_event() {
    let h = Harness::new();
    h.init(1);
    let events = h.ads().subscribe(1).unwrap();
    h.ok("showRewardAd", json!({ "id": 1 }));
    h.engine(1).fire_show_failed(1, "not loaded");
    assert_eq!(events.try_recv().map(|e| e.name()), Some("show_failed"));
}

#[test]
fn subscribe_requires_init() {
    let h = Harness::new();
    assert!(matches!(
        h.ads().subscribe(9),
        Err(AdError::NotFound { id: 9, .. })
    ));
}

#[test]
fn nothing_is_delivered_after_destroy() {
    let h = Harness::new();
    h.init(1);
    let events = h.ads().subscribe(1).unwrap();
    h.load(1);
    let engine = h.engine(1);

    h.ok("destroyAd", json!({ "id": 1, "adType": "Reward" }));

    // The network answers late, from another thread.
    let late = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        engine.fire_loaded();
        engine.fire_rewarded("coins", 1);
    });
    late.join().unwrap();

    assert_eq!(events.recv_timeout(Duration::from_millis(50)), None);
}

#[test]
fn late_callback_after_destroy_does_not_leak_into_new_instance() {
    let h = Harness::new();
    h.init(1);
    h.load(1);
    let old_engine = h.engine(1);
    h.ok("destroyAd", json!({ "id": 1, "adType": "Reward" }));

    h.init(1);
    let events = h.ads().subscribe(1).unwrap();
    old_engine.fire_loaded();

    assert_eq!(events.try_recv(), None);
    assert_eq!(h.is_loaded(1), json!(false));
}

/// A closure sink forwarding into a test channel.
fn forwarding_sink() -> (impl Fn(&AdEvent) + Send + Sync, mpsc::Receiver<AdEvent>) {
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    (
        move |event: &AdEvent| {
            let _ = tx.lock().unwrap().send(event.clone());
        },
        rx,
    )
}

#[test]
fn attached_sink_receives_pushes() {
    let h = Harness::new();
    h.init(1);
    let (sink, seen) = forwarding_sink();
    h.ads().attach(1, sink).unwrap();

    h.load(1);
    h.engine(1).fire_loaded();
    h.engine(1).fire_clicked();
    assert_eq!(seen.recv_timeout(WAIT), Ok(AdEvent::Loaded));
    assert_eq!(seen.recv_timeout(WAIT), Ok(AdEvent::Clicked));
}

#[test]
fn attached_sink_can_read_the_reward() {
    let h = Harness::new();
    let engine = h.loaded(1);
    h.ok("showRewardAd", json!({ "id": 1 }));

    let ads = Arc::clone(h.dispatcher.ads());
    let (tx, rewards) = mpsc::channel();
    let tx = Mutex::new(tx);
    h.ads()
        .attach(1, move |event: &AdEvent| {
            if let AdEvent::Rewarded { .. } = event {
                let _ = tx.lock().unwrap().send(ads.reward(1));
            }
        })
        .unwrap();

    thread::spawn(move || engine.fire_rewarded("coins", 20))
        .join()
        .unwrap();

    let reward = rewards.recv_timeout(WAIT).expect("sink never answered");
    assert_eq!(reward, Ok(Reward::new("coins", 20)));
}

#[test]
fn slow_sink_does_not_stall_other_ids() {
    let h = Harness::new();
    h.init(1);
    h.init(2);
    h.ads()
        .attach(2, |_: &AdEvent| thread::sleep(Duration::from_millis(800)))
        .unwrap();
    h.load(2);

    let started = Instant::now();
    h.engine(2).fire_loaded();
    h.engine(2).fire_clicked();
    h.ok("destroyAd", json!({ "id": 1, "adType": "Reward" }));
    assert!(
        started.elapsed() < Duration::from_millis(400),
        "took {:?}",
        started.elapsed()
    );
}

#[test]
fn detached_ad_can_be_attached_again() {
    let h = Harness::new();
    h.init(1);
    assert!(h.ads().detach(1).unwrap());

    let (sink, seen) = forwarding_sink();
    h.ads().attach(1, sink).unwrap();
    h.load(1);
    h.engine(1).fire_loaded();
    assert_eq!(seen.recv_timeout(WAIT), Ok(AdEvent::Loaded));

    h.ads().detach(1).unwrap();
    let events = h.ads().subscribe(1).unwrap();
    h.engine(1).fire_impression();
    assert_eq!(events.try_recv(), Some(AdEvent::Impression));
}

#[test]
fn detach_stops_delivery_but_keeps_the_ad() {
    let h = Harness::new();
    h.init(1);
    let events = h.ads().subscribe(1).unwrap();
    assert!(h.ads().detach(1).unwrap());
    assert!(!h.ads().detach(1).unwrap());

    h.load(1);
    h.engine(1).fire_loaded();
    assert_eq!(events.try_recv(), None);
    assert_eq!(h.is_loaded(1), json!(true));
}
