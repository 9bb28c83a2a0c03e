/// Tunable game parameters, loadable from JSON.
///
/// Every section defaults field by field, so a config file only needs the
/// values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ── Sections ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub ground_level: f32,
    /// px/s²
    pub gravity: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig { width: 800.0, height: 600.0, ground_level: 500.0, gravity: 1200.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    pub start_x: f32,
    pub min_x: f32,
    pub max_x: f32,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: f32,
    pub jump_speed: f32,
    pub max_jumps: u32,
    pub attack_range: f32,
    pub attack_cooldown_ms: u64,
    pub coyote_time_ms: u64,
    pub jump_buffer_ms: u64,
    pub dodge_cooldown_ms: u64,
    pub dodge_distance: f32,
    pub dodge_duration_ms: u64,
    pub knockback_speed: f32,
    pub knockback_ms: u64,
    pub experience_to_level: u32,
}

impl Default for HeroConfig {
    fn default() -> Self {
        HeroConfig {
            start_x: 200.0,
            min_x: 150.0,
            max_x: 600.0,
            max_health: 200,
            attack: 25,
            defense: 10,
            speed: 300.0,
            jump_speed: 600.0,
            max_jumps: 2,
            attack_range: 100.0,
            attack_cooldown_ms: 800,
            coyote_time_ms: 150,
            jump_buffer_ms: 150,
            dodge_cooldown_ms: 1000,
            dodge_distance: 150.0,
            dodge_duration_ms: 300,
            knockback_speed: 100.0,
            knockback_ms: 300,
            experience_to_level: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub spawn_x: f32,
    pub base_health: f64,
    pub base_damage: f64,
    pub base_speed: f64,
    pub base_experience: f64,
    pub spawn_interval_ms: u64,
    pub min_spawn_interval_ms: u64,
    pub max_on_screen: usize,
    pub wave_duration_ms: u64,
    /// Kills per wave; the last one on every tenth wave is a boss.
    pub kill_quota: u32,
    pub initial_pool: usize,
    /// How far past the left edge an enemy may walk before it is removed.
    pub despawn_margin: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        EnemyConfig {
            spawn_x: 850.0,
            base_health: 100.0,
            base_damage: 10.0,
            base_speed: 50.0,
            base_experience: 20.0,
            spawn_interval_ms: 7000,
            min_spawn_interval_ms: 1000,
            max_on_screen: 30,
            wave_duration_ms: 30_000,
            kill_quota: 5,
            initial_pool: 20,
            despawn_margin: 50.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub resolution_interval_ms: u64,
    pub max_simultaneous_attacks: usize,
    pub shot_cooldown_ms: u64,
    pub targeting_radius: f32,
    pub min_targeting_radius: f32,
    pub max_targeting_radius: f32,
    pub targeting_radius_step: f32,
    pub auto_aim: bool,
    pub auto_aim_radius: f32,
    pub auto_aim_steer: f32,
    pub shot_travel_ms: u64,
    pub shot_travel_fast_ms: u64,
    pub max_shots_in_flight: usize,
    pub auto_fire_range: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        CombatConfig {
            resolution_interval_ms: 50,
            max_simultaneous_attacks: 3,
            shot_cooldown_ms: 500,
            targeting_radius: 50.0,
            min_targeting_radius: 10.0,
            max_targeting_radius: 150.0,
            targeting_radius_step: 10.0,
            auto_aim: true,
            auto_aim_radius: 150.0,
            auto_aim_steer: 0.2,
            shot_travel_ms: 200,
            shot_travel_fast_ms: 100,
            max_shots_in_flight: 20,
            auto_fire_range: 400.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub target_fps: f32,
    pub measurement_interval_ms: u64,
    pub history_len: usize,
    /// Fraction of the original enemy ceiling kept under heavy load.
    pub enemy_reduction: f32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        PerformanceConfig {
            target_fps: 60.0,
            measurement_interval_ms: 1000,
            history_len: 10,
            enemy_reduction: 0.6,
        }
    }
}

// ── Root ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PerformanceTier {
    High,
    Medium,
    Low,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub hero: HeroConfig,
    pub enemies: EnemyConfig,
    pub combat: CombatConfig,
    pub performance: PerformanceConfig,
}

impl GameConfig {
    /// Defaults adjusted for the machine's performance tier.
    pub fn for_tier(tier: PerformanceTier) -> Self {
        GameConfig::default().with_tier(tier)
    }

    /// Caps the enemy ceiling and frame-rate target for `tier`. Never raises
    /// either value.
    pub fn with_tier(mut self, tier: PerformanceTier) -> Self {
        let (max_enemies, fps) = match tier {
            PerformanceTier::High => return self,
            PerformanceTier::Medium => (20, 45.0),
            PerformanceTier::Low => (10, 30.0),
        };
        self.enemies.max_on_screen = self.enemies.max_on_screen.min(max_enemies);
        self.performance.target_fps = self.performance.target_fps.min(fps);
        self
    }

    /// Small, slow waves for deterministic test runs.
    pub fn testing() -> Self {
        let mut config = GameConfig::default();
        config.enemies.max_on_screen = 5;
        config.enemies.spawn_interval_ms = 10_000;
        config
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid { field, reason: reason.into() }
        }

        if self.world.ground_level <= 0.0 || self.world.ground_level > self.world.height {
            return Err(invalid("world.ground_level", "must lie inside the world height"));
        }
        if self.hero.min_x >= self.hero.max_x {
            return Err(invalid("hero.min_x", "must be below hero.max_x"));
        }
        if self.hero.max_health == 0 {
            return Err(invalid("hero.max_health", "must be positive"));
        }
        if self.hero.max_jumps == 0 {
            return Err(invalid("hero.max_jumps", "must be at least 1"));
        }
        if self.enemies.max_on_screen == 0 {
            return Err(invalid("enemies.max_on_screen", "must be at least 1"));
        }
        if self.enemies.kill_quota == 0 {
            return Err(invalid("enemies.kill_quota", "must be at least 1"));
        }
        if self.enemies.min_spawn_interval_ms == 0
            || self.enemies.min_spawn_interval_ms > self.enemies.spawn_interval_ms
        {
            return Err(invalid(
                "enemies.min_spawn_interval_ms",
                "must be positive and not above enemies.spawn_interval_ms",
            ));
        }
        if self.enemies.wave_duration_ms == 0 {
            return Err(invalid("enemies.wave_duration_ms", "must be positive"));
        }
        if self.combat.resolution_interval_ms == 0 {
            return Err(invalid("combat.resolution_interval_ms", "must be positive"));
        }
        if self.combat.max_simultaneous_attacks == 0 {
            return Err(invalid("combat.max_simultaneous_attacks", "must be at least 1"));
        }
        let c = &self.combat;
        if c.min_targeting_radius > c.max_targeting_radius
            || c.targeting_radius < c.min_targeting_radius
            || c.targeting_radius > c.max_targeting_radius
        {
            return Err(invalid(
                "combat.targeting_radius",
                format!("must lie in {}..={}", c.min_targeting_radius, c.max_targeting_radius),
            ));
        }
        if !(0.0..=1.0).contains(&c.auto_aim_steer) {
            return Err(invalid("combat.auto_aim_steer", "must lie in 0..=1"));
        }
        if self.performance.target_fps <= 0.0 {
            return Err(invalid("performance.target_fps", "must be positive"));
        }
        if self.performance.history_len == 0 {
            return Err(invalid("performance.history_len", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.performance.enemy_reduction) {
            return Err(invalid("performance.enemy_reduction", "must lie in 0..=1"));
        }
        Ok(())
    }
}
