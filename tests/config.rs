mod common;

use common::*;
use flaskcore::config::{CategorySettings, ConfigStore, FileConfig, FlaskConfig};
use flaskcore::host::{parse_form_reference, LoadOrderResolver, SoundId, TagId, TagResolver};
use flaskcore::kernel::FlaskCategory;

const PLUGINS: [&str; 3] = ["Skyrim.esm", "Update.esm", "TrueFlasks.esp"];

#[test]
fn test_missing_keys_take_defaults() {
    let file = FileConfig::parse("").unwrap();
    let config = file.resolve(&LoadOrderResolver::default());

    assert_eq!(config, FlaskConfig::default());
    let other = config.category(FlaskCategory::Other);
    assert_eq!(other.cap_base, 5);
    assert_eq!(other.cooldown_base, 180.0);
    assert!(!other.anti_spam);
    assert_eq!(other.notify, "I can't drink any more potions.");
    assert_eq!(config.category(FlaskCategory::Stamina).notify, "I can't drink any more Flasks of Vigor.");
}

#[test]
fn test_partial_sections_override_per_key() {
    let text = r#"
        [general]
        keep_item_tag = "0x900~TrueFlasks.esp"

        [health]
        cap_base = 4
        cooldown_base = 12.5
        tag = "0x800~TrueFlasks.esp"
        cap_modifier_tag = "0x801~Missing.esp"
        fail_audio = true
        fail_sound = "0x3C7~Skyrim.esm"

        [other]
        exclusive_tag = "0x802~TrueFlasks.esp"
        revert_exclusive = true
        anti_spam = true
        anti_spam_delay = 0.5
    "#;
    let config = FileConfig::parse(text).unwrap().resolve(&LoadOrderResolver::new(PLUGINS));

    let health = config.category(FlaskCategory::Health);
    assert_eq!(health.cap_base, 4);
    assert_eq!(health.cooldown_base, 12.5);
    assert_eq!(health.regen_mult_base, 100.0, "unset keys keep defaults");
    assert_eq!(health.tag, Some(TagId(0x0200_0800)));
    assert_eq!(health.cap_modifier, None, "unresolved references become absent");
    assert_eq!(health.fail_sound, Some(SoundId(0x0000_03C7)));

    let other = config.category(FlaskCategory::Other);
    assert!(other.anti_spam);
    assert_eq!(other.anti_spam_delay(), Some(0.5));
    assert_eq!(config.exclusivity.tag, Some(TagId(0x0200_0802)));
    assert!(config.exclusivity.revert);
    assert_eq!(config.keep_item_tag, Some(TagId(0x0200_0900)));
}

#[test]
fn test_fail_sound_requires_fail_audio() {
    let text = r#"
        [magick]
        fail_sound = "0x3C7~Skyrim.esm"
    "#;
    let config = FileConfig::parse(text).unwrap().resolve(&LoadOrderResolver::new(PLUGINS));
    assert_eq!(config.category(FlaskCategory::Magick).fail_sound, None);
}

#[test]
fn test_capacity_above_ceiling_is_clamped() {
    let config = FileConfig::parse("[stamina]\ncap_base = 500\n")
        .unwrap()
        .resolve(&LoadOrderResolver::default());
    assert_eq!(config.category(FlaskCategory::Stamina).cap_base, 64);
}

#[test]
fn test_malformed_file_is_an_error() {
    assert!(FileConfig::parse("[health]\ncap_base = \"two\"\n").is_err());
}

#[test]
fn test_missing_file_is_generated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("TrueFlasks.toml");

    let generated = FileConfig::load_or_create(&path).unwrap();
    assert!(path.exists(), "defaults are written to disk");

    let reread = FileConfig::load_or_create(&path).unwrap();
    assert_eq!(reread, generated);
    assert_eq!(reread.health.cap_base, Some(2));
    assert_eq!(reread.other.revert_exclusive, Some(false));
    assert_eq!(reread.health.tag, None, "references are left for the user to fill in");

    let resolved = reread.resolve(&LoadOrderResolver::new(PLUGINS));
    assert_eq!(resolved, FlaskConfig::default());
}

#[test]
fn test_store_reload_swaps_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("TrueFlasks.toml");
    std::fs::write(&path, "[health]\ncap_base = 3\ntag = \"0x800~TrueFlasks.esp\"\n").unwrap();

    let store = ConfigStore::default();
    let before = store.snapshot();
    let after = store.reload(&path, &LoadOrderResolver::new(PLUGINS)).unwrap();

    assert_eq!(before.category(FlaskCategory::Health).cap_base, 2, "old snapshots are untouched");
    assert_eq!(after.category(FlaskCategory::Health).cap_base, 3);
    assert_eq!(store.snapshot().category(FlaskCategory::Health).tag, Some(HEALTH_TAG));

    std::fs::write(&path, "not toml at all [").unwrap();
    assert!(store.reload(&path, &LoadOrderResolver::new(PLUGINS)).is_err());
    assert_eq!(store.snapshot().category(FlaskCategory::Health).cap_base, 3, "failed reload keeps the last good config");
}

#[test]
fn test_reload_reaches_running_hooks() {
    let h = harness(FlaskConfig::default());
    let player = FakeActor::player(1);
    assert!(h.runtime.hooks().on_drink(Some(&player), Some(&FakeItem::health())));
    assert_eq!(
        h.runtime.cache().inspect(1, |s| s.slots(FlaskCategory::Other).occupied(5)),
        Some(1),
        "without a health tag the potion counts as other"
    );

    h.runtime.config().replace(tagged_config());
    assert!(h.runtime.hooks().on_drink(Some(&player), Some(&FakeItem::health())));
    assert_eq!(h.runtime.cache().inspect(1, |s| s.slots(FlaskCategory::Health).occupied(2)), Some(1));
}

#[test]
fn test_form_references() {
    assert_eq!(parse_form_reference("0x800~Mod.esp"), Some((0x800, "Mod.esp")));
    assert_eq!(parse_form_reference(" 0X1a2b ~ Other.esm "), Some((0x1A2B, "Other.esm")));
    assert_eq!(parse_form_reference("800~"), None);
    assert_eq!(parse_form_reference("nonsense"), None);

    let resolver = LoadOrderResolver::new(PLUGINS);
    assert_eq!(resolver.resolve_tag("0xFF000800~trueflasks.ESP"), Some(TagId(0x0200_0800)));
    assert_eq!(resolver.resolve_tag("0x800~Absent.esp"), None);
}

#[test]
fn test_settings_switches() {
    let mut settings = CategorySettings::defaults_for(FlaskCategory::Health);
    assert!(settings.applies_to(true));
    assert!(!settings.applies_to(false));

    settings.npc = true;
    settings.enabled = false;
    assert!(!settings.applies_to(false));

    settings.anti_spam = false;
    assert_eq!(settings.anti_spam_delay(), None);
}
