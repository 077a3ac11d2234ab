//! Lifecycle transitions driven through the command surface.

use serde_json::json;
use reward_ads::{EngineCall, LifecycleState};

use crate::support::Harness;

#[test]
fn full_lifecycle() {
    let h = Harness::new();
    h.init(1);
    assert_eq!(h.ads().state(1).unwrap(), LifecycleState::Created);

    h.load(1);
    assert_eq!(h.ads().state(1).unwrap(), LifecycleState::Loading);

    let engine = h.engine(1);
    engine.fire_loaded();
    assert_eq!(h.ads().state(1).unwrap(), LifecycleState::Loaded);

    h.ok("showRewardAd", json!({ "id": 1 }));
    assert_eq!(h.ads().state(1).unwrap(), LifecycleState::Shown);

    h.ok("pauseAd", json!({ "id": 1, "adType": "Reward" }));
    assert_eq!(h.ads().state(1).unwrap(), LifecycleState::Paused);

    h.ok("resumeAd", json!({ "id": 1, "adType": "Reward" }));
    assert_eq!(h.ads().state(1).unwrap(), LifecycleState::Resumed);

    h.ok("destroyAd", json!({ "id": 1, "adType": "Reward" }));
    assert!(h.ads().state(1).is_err());

    assert_eq!(
        &engine.calls()[1..],
        &[
            EngineCall::Show,
            EngineCall::Pause,
            EngineCall::Resume,
            EngineCall::Destroy
        ]
    );
}

#[test]
fn pause_before_show_is_tolerated() {
    let h = Harness::new();
    h.init(1);
    assert_eq!(h.ok("pauseAd", json!({ "id": 1, "adType": "Reward" })), json!(true));
    assert_eq!(h.ok("resumeAd", json!({ "id": 1, "adType": "Reward" })), json!(true));
    assert!(h.engine(1).calls().is_empty());
    assert_eq!(h.ads().state(1).unwrap(), LifecycleState::Created);
}

#[test]
fn shown_ad_is_no_longer_loaded() {
    let h = Harness::new();
    h.loaded(1);
    assert_eq!(h.is_loaded(1), json!(true));
    h.ok("showRewardAd", json!({ "id": 1 }));
    assert_eq!(h.is_loaded(1), json!(false));
}

#[test]
fn reinit_destroys_previous_engine() {
    let h = Harness::new();
    h.loaded(1);
    h.init(1);

    let engines = h.factory.engines(1);
    assert_eq!(engines.len(), 2);
    assert!(engines[0].is_destroyed());
    assert_eq!(h.ads().state(1).unwrap(), LifecycleState::Created);
}

#[test]
fn shutdown_clears_the_registry() {
    let h = Harness::new();
    h.init(1);
    h.init(2);
    h.ads().shutdown().unwrap();

    assert!(h.ads().registry().is_empty());
    assert!(h.engine(1).is_destroyed());
    assert!(h.engine(2).is_destroyed());
    assert_eq!(
        h.err("showRewardAd", json!({ "id": 1 })),
        reward_ads::ErrorCode::NotFound
    );
}
