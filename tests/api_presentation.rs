mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::*;
use flaskcore::api::FlaskInfo;
use flaskcore::kernel::FlaskCategory;
use flaskcore::presentation::{present, FlaskGauge};

#[test]
fn test_null_actor_neutral_values() {
    let h = harness(tagged_config());
    let api = h.runtime.api();

    api.modify_cooldown(None, 0, 5.0, true);
    assert_eq!(api.next_cooldown(None, 0), 0.0);
    assert_eq!(api.max_slots(None, 0), 0);
    assert_eq!(api.current_slots(None, 0), 0);
    assert_eq!(api.regen_multiplier(None, 0), 0.0);
    assert_eq!(api.cooldown_fraction(None, 0), 1.0);
    assert!(api.consume_slot(None, 0));
    assert_eq!(api.classify_item(None), FlaskInfo::NOT_A_FLASK);
    assert!(h.runtime.cache().is_empty(), "null calls never create entries");
}

#[test]
fn test_unknown_category_index_is_neutral() {
    let h = harness(tagged_config());
    let api = h.runtime.api();
    let player = FakeActor::player(1);

    assert_eq!(api.max_slots(Some(&player), 4), 0);
    assert_eq!(api.max_slots(Some(&player), -1), 0);
    assert_eq!(api.cooldown_fraction(Some(&player), 17), 1.0);
    assert!(api.consume_slot(Some(&player), 9));
    assert_eq!(api.play_glow(4), 0);
    assert!(h.runtime.cache().is_empty());
}

#[test]
fn test_queries_on_unseen_actor_do_not_create_entries() {
    let h = harness(tagged_config());
    let api = h.runtime.api();
    let stranger = FakeActor::npc(0x0100_00AA);

    assert_eq!(api.next_cooldown(Some(&stranger), 0), 0.0);
    assert_eq!(api.current_slots(Some(&stranger), 0), 2, "every slot is free");
    assert_eq!(api.cooldown_fraction(Some(&stranger), 0), 1.0);
    assert_eq!(api.max_slots(Some(&stranger), 3), 5);
    assert!(h.runtime.cache().is_empty(), "polling leaves the cache alone");
}

#[test]
fn test_api_queries_follow_slot_state() {
    let mut config = tagged_config();
    config.category_mut(FlaskCategory::Health).anti_spam = false;
    config.category_mut(FlaskCategory::Health).regen_modifier = Some(REGEN_TAG);
    let h = harness(config);
    let api = h.runtime.api();
    let player = FakeActor::player(1).with_effect(REGEN_TAG, 25.0);

    assert_eq!(api.max_slots(Some(&player), 0), 2);
    assert_eq!(api.current_slots(Some(&player), 0), 2);
    assert_eq!(api.regen_multiplier(Some(&player), 0), 125.0, "raw percent, not divided");

    assert!(api.consume_slot(Some(&player), 0));
    assert!(api.consume_slot(Some(&player), 0));
    assert!(!api.consume_slot(Some(&player), 0), "both slots are busy");
    assert_eq!(api.current_slots(Some(&player), 0), 0);

    // Soonest slot: shorten one, then lengthen it back past its duration
    api.modify_cooldown(Some(&player), 0, -12.0, false);
    assert_eq!(api.next_cooldown(Some(&player), 0), 18.0);
    assert!((api.cooldown_fraction(Some(&player), 0) - 0.4).abs() < 1e-6);

    api.modify_cooldown(Some(&player), 0, 100.0, false);
    assert_eq!(api.next_cooldown(Some(&player), 0), 30.0, "capped at the slot's duration");

    api.modify_cooldown(Some(&player), 0, -45.0, true);
    assert_eq!(api.next_cooldown(Some(&player), 0), 0.0);
    assert_eq!(api.current_slots(Some(&player), 0), 2, "floored at zero means ready");
}

#[test]
fn test_classify_item_info() {
    let mut config = tagged_config();
    config.exclusivity.tag = Some(EXCLUSIVE_TAG);
    config.category_mut(FlaskCategory::Magick).enabled = false;
    let h = harness(config);
    let api = h.runtime.api();

    assert_eq!(api.classify_item(Some(&FakeItem::food())), FlaskInfo::NOT_A_FLASK);
    assert_eq!(api.classify_item(Some(&FakeItem::health())), FlaskInfo { category: 0, uses_slot: true });
    assert_eq!(
        api.classify_item(Some(&FakeItem::tagged(&[MAGICK_TAG]))),
        FlaskInfo { category: 2, uses_slot: false }
    );
    assert_eq!(
        api.classify_item(Some(&FakeItem::tagged(&[EXCLUSIVE_TAG]))),
        FlaskInfo { category: 3, uses_slot: false }
    );
    assert_eq!(api.classify_item(Some(&FakeItem::tagged(&[]))), FlaskInfo { category: 3, uses_slot: true });
}

#[test]
fn test_presentation_glow_is_delivered_once() {
    let mut config = tagged_config();
    config.category_mut(FlaskCategory::Health).cap_base = 0;
    let h = harness(config.clone());
    let player = FakeActor::player(1);

    assert!(!h.runtime.hooks().on_drink(Some(&player), Some(&FakeItem::health())));

    let first = present(h.runtime.cache(), &player, &config);
    let second = present(h.runtime.cache(), &player, &config);

    assert!(first[FlaskCategory::Health.index()].force_glow);
    assert!(!second[FlaskCategory::Health.index()].force_glow, "the flag clears on read");
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!((a.percent, a.count, a.max_slots), (b.percent, b.count, b.max_slots));
    }
}

#[test]
fn test_available_plus_occupied_matches_limit() {
    let mut config = tagged_config();
    config.category_mut(FlaskCategory::Stamina).anti_spam = false;
    config.category_mut(FlaskCategory::Stamina).cap_modifier = Some(CAP_TAG);
    let h = harness(config.clone());
    let player = FakeActor::player(1).with_effect(CAP_TAG, 100.0);

    for _ in 0..70 {
        h.runtime.api().consume_slot(Some(&player), 1);
        h.runtime.hooks().on_player_update(Some(&player), 0.4);
    }

    let gauge = present(h.runtime.cache(), &player, &config)[1];
    assert_eq!(gauge.max_slots, 64, "capacity is clamped to the array");
    let occupied = h
        .runtime
        .cache()
        .inspect(1, |s| s.slots(FlaskCategory::Stamina).occupied(gauge.max_slots))
        .unwrap();
    assert_eq!(gauge.count + occupied, gauge.max_slots);
}

#[test]
fn test_player_update_pushes_widget_frames_and_glow() {
    let mut config = tagged_config();
    config.category_mut(FlaskCategory::Health).cap_base = 0;
    let h = harness(config);
    let hooks = h.runtime.hooks();
    let player = FakeActor::player(1);

    let glows = Arc::new(AtomicUsize::new(0));
    let seen = glows.clone();
    h.runtime.api().register_glow_listener(
        7,
        Arc::new(move |category: FlaskCategory| {
            assert_eq!(category, FlaskCategory::Health);
            seen.fetch_add(1, Ordering::SeqCst);
        }),
    );

    hooks.on_drink(Some(&player), Some(&FakeItem::health()));
    let frame = hooks.on_player_update(Some(&player), 0.016).expect("primary actor gets a frame");
    hooks.on_player_update(Some(&player), 0.016);

    assert_eq!(glows.load(Ordering::SeqCst), 1, "one rejection, one glow");
    assert!(frame[0].force_glow);

    let payloads = h.widget.payloads.lock().unwrap();
    assert_eq!(payloads.len(), 8, "one payload per category per frame");
    let decoded: FlaskGauge = serde_json::from_str(&payloads[0]).unwrap();
    assert_eq!(decoded, frame[0]);

    let raw: serde_json::Value = serde_json::from_str(&payloads[3]).unwrap();
    assert_eq!(raw["typeIndex"], 3);
    assert_eq!(raw["max_slots"], 5);
    assert_eq!(raw["count"], 5);
    assert_eq!(raw["percent"], 1.0);
    assert_eq!(raw["forceGlow"], false);
}

#[test]
fn test_non_primary_player_gets_no_frame() {
    let h = harness(tagged_config());
    let mut follower = FakeActor::player(2);
    follower.primary = false;

    assert!(h.runtime.hooks().on_player_update(Some(&follower), 0.016).is_none());
    assert!(h.widget.payloads.lock().unwrap().is_empty());
    assert!(h.runtime.cache().contains(2), "it still regenerates");
}

#[test]
fn test_play_glow_and_listener_registry() {
    let h = harness(tagged_config());
    let api = h.runtime.api();
    let calls = Arc::new(AtomicUsize::new(0));

    for plugin in [1, 2] {
        let calls = calls.clone();
        api.register_glow_listener(plugin, Arc::new(move |_: FlaskCategory| {
            calls.fetch_add(1, Ordering::SeqCst);
        }));
    }
    // Re-registering replaces the previous callback
    let replaced = calls.clone();
    api.register_glow_listener(2, Arc::new(move |_: FlaskCategory| {
        replaced.fetch_add(10, Ordering::SeqCst);
    }));

    assert_eq!(api.play_glow(2), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 11);

    assert!(api.unregister_glow_listener(1));
    assert!(!api.unregister_glow_listener(1));
    assert_eq!(api.play_glow(0), 1);
}
