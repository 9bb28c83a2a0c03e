use std::path::Path;

use wave_brawler::config::*;
use wave_brawler::error::ConfigError;

#[test]
fn defaults_are_valid() {
    assert!(GameConfig::default().validate().is_ok());
    assert!(GameConfig::testing().validate().is_ok());
}

#[test]
fn default_values() {
    let c = GameConfig::default();
    assert_eq!(c.world.ground_level, 500.0);
    assert_eq!(c.hero.max_health, 200);
    assert_eq!(c.enemies.max_on_screen, 30);
    assert_eq!(c.enemies.kill_quota, 5);
    assert_eq!(c.combat.resolution_interval_ms, 50);
    assert_eq!(c.combat.max_simultaneous_attacks, 3);
    assert_eq!(c.performance.target_fps, 60.0);
}

#[test]
fn testing_preset_is_small_and_slow() {
    let c = GameConfig::testing();
    assert_eq!(c.enemies.max_on_screen, 5);
    assert_eq!(c.enemies.spawn_interval_ms, 10_000);
}

// ── Tiers ─────────────────────────────────────────────────────────────────────

#[test]
fn tiers_cap_enemies_and_frame_rate() {
    let high = GameConfig::for_tier(PerformanceTier::High);
    assert_eq!(high, GameConfig::default());

    let medium = GameConfig::for_tier(PerformanceTier::Medium);
    assert_eq!(medium.enemies.max_on_screen, 20);
    assert_eq!(medium.performance.target_fps, 45.0);

    let low = GameConfig::for_tier(PerformanceTier::Low);
    assert_eq!(low.enemies.max_on_screen, 10);
    assert_eq!(low.performance.target_fps, 30.0);
}

#[test]
fn tier_never_raises_limits() {
    let c = GameConfig::testing().with_tier(PerformanceTier::Low);
    assert_eq!(c.enemies.max_on_screen, 5);
}

// ── JSON ──────────────────────────────────────────────────────────────────────

#[test]
fn partial_json_keeps_other_defaults() {
    let c = GameConfig::from_json_str(r#"{ "enemies": { "max_on_screen": 12 } }"#).unwrap();
    assert_eq!(c.enemies.max_on_screen, 12);
    assert_eq!(c.enemies.kill_quota, 5);
    assert_eq!(c.hero, HeroConfig::default());
}

#[test]
fn empty_object_is_default() {
    assert_eq!(GameConfig::from_json_str("{}").unwrap(), GameConfig::default());
}

#[test]
fn serialized_config_reads_back() {
    let mut c = GameConfig::default();
    c.hero.attack = 40;
    c.combat.auto_aim = false;
    let json = serde_json::to_string(&c).unwrap();
    assert_eq!(GameConfig::from_json_str(&json).unwrap(), c);
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = GameConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn out_of_range_values_are_rejected() {
    let cases = [
        (r#"{ "enemies": { "max_on_screen": 0 } }"#, "enemies.max_on_screen"),
        (r#"{ "hero": { "min_x": 700.0 } }"#, "hero.min_x"),
        (r#"{ "combat": { "targeting_radius": 500.0 } }"#, "combat.targeting_radius"),
        (r#"{ "combat": { "auto_aim_steer": 1.5 } }"#, "combat.auto_aim_steer"),
        (r#"{ "performance": { "history_len": 0 } }"#, "performance.history_len"),
        (
            r#"{ "enemies": { "min_spawn_interval_ms": 9000 } }"#,
            "enemies.min_spawn_interval_ms",
        ),
    ];
    for (json, expected) in cases {
        match GameConfig::from_json_str(json) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
            other => panic!("{json}: expected invalid {expected}, got {other:?}"),
        }
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let err = GameConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("here.json"));
}
