//! Command surface: argument validation, lookups and per-method results.

use serde_json::json;
use reward_ads::{EngineCall, ErrorCode, MethodResponse, RewardAdsConfig, ReinitPolicy};

use crate::support::{Harness, SLOT};

#[test]
fn unknown_ids_are_not_found_for_every_command() {
    let h = Harness::new();
    let id = 404;

    let calls = [
        ("loadRewardAd", json!({ "id": id, "adSlotId": SLOT, "adParam": {} })),
        ("loadRewardAd", json!({ "id": id })),
        ("showRewardAd", json!({ "id": id })),
        ("getRewardAdReward", json!({ "id": id })),
        ("isAdLoaded", json!({ "id": id, "adType": "Reward" })),
        ("isAdLoaded", json!({ "id": id })),
        ("pauseAd", json!({ "id": id, "adType": "Reward" })),
        ("resumeAd", json!({ "id": id, "adType": "Reward" })),
        ("destroyAd", json!({ "id": id, "adType": "Reward" })),
    ];
    for (method, args) in calls {
        assert_eq!(h.err(method, args), ErrorCode::NotFound, "{}", method);
    }
}

#[test]
fn not_found_message_names_the_id() {
    let h = Harness::new();
    match h.call("showRewardAd", json!({ "id": 12 })) {
        MethodResponse::Error { code, message, .. } => {
            assert_eq!(code, ErrorCode::NotFound);
            assert!(message.contains("Ad id : 12"), "{}", message);
            assert!(message.contains("showRewardAd"), "{}", message);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn missing_id_is_null_param() {
    let h = Harness::new();
    assert_eq!(h.err("initRewardAd", json!({})), ErrorCode::NullParam);
    assert_eq!(h.err("initRewardAd", json!({ "id": null })), ErrorCode::NullParam);
    assert_eq!(h.err("showRewardAd", json!({})), ErrorCode::NullParam);
    assert_eq!(h.err("destroyAd", json!({ "adType": "Reward" })), ErrorCode::NullParam);
}

#[test]
fn non_integer_id_is_invalid_param() {
    let h = Harness::new();
    assert_eq!(h.err("initRewardAd", json!({ "id": "one" })), ErrorCode::InvalidParam);
    assert_eq!(h.err("initRewardAd", json!({ "id": 1.5 })), ErrorCode::InvalidParam);
}

#[test]
fn init_returns_null() {
    let h = Harness::new();
    assert_eq!(h.ok("initRewardAd", json!({ "id": 1 })), json!(null));
    assert!(h.factory.engine(1).is_some());
}

#[test]
fn init_reports_engine_allocation_failure() {
    let h = Harness::new();
    h.factory.set_unavailable(Some("no activity"));
    assert_eq!(h.err("initRewardAd", json!({ "id": 1 })), ErrorCode::EngineUnavailable);
    assert_eq!(h.err("showRewardAd", json!({ "id": 1 })), ErrorCode::NotFound);
}

#[test]
fn empty_slot_id_is_null_param() {
    let h = Harness::new();
    h.init(1);
    assert_eq!(
        h.err("loadRewardAd", json!({ "id": 1, "adSlotId": "", "adParam": {} })),
        ErrorCode::NullParam
    );
    assert_eq!(
        h.err("loadRewardAd", json!({ "id": 1, "adParam": {} })),
        ErrorCode::NullParam
    );
    assert_eq!(h.engine(1).load_count(), 0);
}

#[test]
fn missing_ad_param_is_null_param() {
    let h = Harness::new();
    h.init(1);
    assert_eq!(
        h.err("loadRewardAd", json!({ "id": 1, "adSlotId": SLOT })),
        ErrorCode::NullParam
    );
    assert_eq!(
        h.err("loadRewardAd", json!({ "id": 1, "adSlotId": SLOT, "adParam": null })),
        ErrorCode::NullParam
    );
    assert_eq!(
        h.err("loadRewardAd", json!({ "id": 1, "adSlotId": SLOT, "adParam": "x" })),
        ErrorCode::InvalidParam
    );
}

#[test]
fn load_returns_true_and_forwards_params() {
    let h = Harness::new();
    h.init(1);
    let value = h.ok(
        "loadRewardAd",
        json!({
            "id": 1,
            "adSlotId": SLOT,
            "adParam": { "gender": 0, "adContentClassification": "W" },
            "userId": "user-9",
            "data": "extra",
            "rewardVerifyConfig": { "customData": "abc" },
        }),
    );
    assert_eq!(value, json!(true));

    match &h.engine(1).calls()[0] {
        EngineCall::Load { slot_id, params } => {
            assert_eq!(slot_id, SLOT);
            assert_eq!(params["adContentClassification"], json!("W"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn second_load_is_short_circuited() {
    let h = Harness::new();
    h.init(1);
    h.load(1);
    h.load(1);
    assert_eq!(h.engine(1).load_count(), 1);

    // Still short-circuited once loaded.
    h.engine(1).fire_loaded();
    h.load(1);
    assert_eq!(h.engine(1).load_count(), 1);
}

#[test]
fn load_after_failure_retries() {
    let h = Harness::new();
    h.init(1);
    h.load(1);
    h.engine(1).fire_load_failed(3, "no fill");
    h.load(1);
    assert_eq!(h.engine(1).load_count(), 2);
}

#[test]
fn show_returns_true_eagerly() {
    let h = Harness::new();
    h.init(1);
    // Not loaded: still accepted; the engine reports the failure as an event.
    assert_eq!(h.ok("showRewardAd", json!({ "id": 1 })), json!(true));
    assert_eq!(h.engine(1).calls(), vec![EngineCall::Show]);
}

#[test]
fn get_reward_before_any_reward_is_explicit() {
    let h = Harness::new();
    h.loaded(1);
    assert_eq!(h.err("getRewardAdReward", json!({ "id": 1 })), ErrorCode::NoReward);
}

#[test]
fn get_reward_returns_name_and_amount() {
    let h = Harness::new();
    let engine = h.loaded(1);
    h.ok("showRewardAd", json!({ "id": 1 }));
    engine.fire_rewarded("coins", 50);

    assert_eq!(
        h.ok("getRewardAdReward", json!({ "id": 1 })),
        json!({ "name": "coins", "amount": 50 })
    );
}

#[test]
fn is_ad_loaded_follows_load_events() {
    let h = Harness::new();
    h.init(1);
    assert_eq!(h.is_loaded(1), json!(false));
    h.load(1);
    assert_eq!(h.is_loaded(1), json!(false));
    h.engine(1).fire_loaded();
    assert_eq!(h.is_loaded(1), json!(true));
}

#[test]
fn ad_type_must_be_reward() {
    let h = Harness::new();
    h.init(1);
    for method in ["isAdLoaded", "pauseAd", "resumeAd", "destroyAd"] {
        assert_eq!(
            h.err(method, json!({ "id": 1, "adType": "Banner" })),
            ErrorCode::InvalidParam,
            "{}",
            method
        );
        assert_eq!(
            h.err(method, json!({ "id": 1, "adType": "reward" })),
            ErrorCode::InvalidParam,
            "{}",
            method
        );
        assert_eq!(h.err(method, json!({ "id": 1 })), ErrorCode::NullParam, "{}", method);
    }
    // The mismatched destroy did not tear anything down.
    assert_eq!(h.is_loaded(1), json!(false));
}

#[test]
fn unknown_method_is_not_implemented() {
    let h = Harness::new();
    assert_eq!(h.call("loadBannerAd", json!({ "id": 1 })), MethodResponse::NotImplemented);
}

#[test]
fn direct_dispatch_of_unknown_method_has_its_own_code() {
    let h = Harness::new();
    let err = h.dispatcher.dispatch("loadBannerAd", json!({})).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotImplemented);
    assert_eq!(err.status_code(), 501);
}

#[test]
fn destroy_then_get_reward_is_not_found() {
    let h = Harness::new();
    h.init(1);
    assert_eq!(h.ok("destroyAd", json!({ "id": 1, "adType": "Reward" })), json!(true));
    assert_eq!(h.err("getRewardAdReward", json!({ "id": 1 })), ErrorCode::NotFound);
    assert!(h.engine(1).is_destroyed());
}

#[test]
fn destroy_twice_is_not_found() {
    let h = Harness::new();
    h.init(1);
    h.ok("destroyAd", json!({ "id": 1, "adType": "Reward" }));
    assert_eq!(
        h.err("destroyAd", json!({ "id": 1, "adType": "Reward" })),
        ErrorCode::NotFound
    );
}

#[test]
fn reinit_after_destroy_starts_fresh() {
    let h = Harness::new();
    h.loaded(1);
    h.ok("destroyAd", json!({ "id": 1, "adType": "Reward" }));
    h.init(1);
    assert_eq!(h.is_loaded(1), json!(false));
    assert_eq!(h.factory.engines(1).len(), 2);
}

#[test]
fn duplicate_init_rejected_under_reject_policy() {
    let h = Harness::with_config(RewardAdsConfig::new().with_reinit_policy(ReinitPolicy::Reject));
    h.init(1);
    assert_eq!(h.err("initRewardAd", json!({ "id": 1 })), ErrorCode::DuplicateId);
}
