/// Enemy director: wave progression, spawn cadence and the enemy pool.
///
/// The director is the only code that adds enemies to or removes them from
/// the pool. Every time-based decision is a timestamp comparison inside
/// `update`, so calling it twice with the same `now` changes nothing.

use std::collections::VecDeque;

use log::{debug, info};
use rand::Rng;

use crate::config::{EnemyConfig, GameConfig};
use crate::effects::{Effect, Effects};
use crate::enemy::{Arena, DeathReport, Enemy, EnemySpawn};
use crate::entities::{EnemyKind, Vec2};
use crate::events::GameEvent;
use crate::pool::{Pool, SlotId};
use crate::stats::{
    normalized_type_weights, sample_kind, scaled_stat, DAMAGE_GROWTH, EXPERIENCE_GROWTH,
    HEALTH_GROWTH, SPEED_GROWTH,
};

// ── Wave curve ───────────────────────────────────────────────────────────────

const DIFFICULTY_STEP: f64 = 0.15;
const MAX_BURST: u32 = 10;
const MAX_WAVE_BONUS: u32 = 5;
const INTERVAL_SHRINK_PER_WAVE: f64 = 0.05;
const MAX_INTERVAL_SHRINK: f64 = 0.7;
const BASE_STAGGER_MS: u64 = 200;
const STAGGER_STEP_MS: u64 = 15;
const MIN_STAGGER_MS: u64 = 50;
const SWEEP_INTERVAL_MS: u64 = 1000;
const BOSS_WAVE_PERIOD: u32 = 10;
/// Enemies stand on the ground line, centred half a body above it.
const SPAWN_ROW_OFFSET: f32 = 25.0;

#[derive(Clone, Debug, PartialEq)]
pub struct WaveState {
    pub wave_number: u32,
    /// Informational; stat growth comes from the per-stat curves.
    pub difficulty: f64,
    pub wave_start_time: u64,
    pub wave_duration_ms: u64,
    pub spawn_interval_ms: u64,
    pub spawn_burst_count: u32,
    pub enemies_killed_this_wave: u32,
    pub kill_quota: u32,
    /// The quota-closing boss of this wave has been placed.
    pub boss_spawned: bool,
    pub enemy_health: u32,
    pub enemy_damage: u32,
    pub enemy_speed: u32,
    pub enemy_experience: u32,
}

impl WaveState {
    fn first(config: &EnemyConfig) -> Self {
        let mut wave = WaveState {
            wave_number: 1,
            difficulty: 1.0,
            wave_start_time: 0,
            wave_duration_ms: config.wave_duration_ms,
            spawn_interval_ms: config.spawn_interval_ms,
            spawn_burst_count: 1,
            enemies_killed_this_wave: 0,
            kill_quota: config.kill_quota,
            boss_spawned: false,
            enemy_health: 0,
            enemy_damage: 0,
            enemy_speed: 0,
            enemy_experience: 0,
        };
        wave.configure(config);
        wave
    }

    /// Recomputes every wave-derived value from `wave_number`.
    fn configure(&mut self, config: &EnemyConfig) {
        let w = self.wave_number;
        self.difficulty = 1.0 + f64::from(w - 1) * DIFFICULTY_STEP;
        self.enemy_health = scaled_stat(config.base_health, 1.0, w, HEALTH_GROWTH);
        self.enemy_damage = scaled_stat(config.base_damage, 1.0, w, DAMAGE_GROWTH);
        self.enemy_speed = scaled_stat(config.base_speed, 1.0, w, SPEED_GROWTH);
        self.enemy_experience = scaled_stat(config.base_experience, 1.0, w, EXPERIENCE_GROWTH);
        self.spawn_burst_count = MAX_BURST.min(1 + w / 2);
        let shrink = MAX_INTERVAL_SHRINK.min(INTERVAL_SHRINK_PER_WAVE * f64::from(w));
        let interval = (config.spawn_interval_ms as f64 * (1.0 - shrink)).round() as u64;
        self.spawn_interval_ms = interval.max(config.min_spawn_interval_ms);
    }

    pub fn stagger_ms(&self) -> u64 {
        let step = u64::from(self.wave_number - 1) * STAGGER_STEP_MS;
        BASE_STAGGER_MS.saturating_sub(step).max(MIN_STAGGER_MS)
    }

    pub fn burst_bonus(&self) -> u32 {
        MAX_WAVE_BONUS.min((self.wave_number - 1) / 2)
    }

    /// The next kill closes the quota on a boss wave.
    pub fn boss_due(&self) -> bool {
        self.wave_number % BOSS_WAVE_PERIOD == 0
            && !self.boss_spawned
            && self.enemies_killed_this_wave + 1 == self.kill_quota
    }
}

// ── Director ─────────────────────────────────────────────────────────────────

pub struct EnemyDirector {
    config: EnemyConfig,
    arena: Arena,
    spawn_y: f32,
    wave: WaveState,
    enemies: Pool<Enemy>,
    /// Times at which already-scheduled burst members should appear.
    pending: VecDeque<u64>,
    started: bool,
    next_burst_at: u64,
    last_sweep_at: u64,
    max_enemies_on_screen: usize,
    total_killed: u32,
    kind_counts: [u32; 6],
}

impl EnemyDirector {
    pub fn new(config: &GameConfig) -> Self {
        let enemies_cfg = config.enemies.clone();
        EnemyDirector {
            arena: Arena::from(config),
            spawn_y: config.world.ground_level - SPAWN_ROW_OFFSET,
            wave: WaveState::first(&enemies_cfg),
            enemies: Pool::new(enemies_cfg.initial_pool, enemies_cfg.max_on_screen),
            pending: VecDeque::new(),
            started: false,
            next_burst_at: 0,
            last_sweep_at: 0,
            max_enemies_on_screen: enemies_cfg.max_on_screen,
            total_killed: 0,
            kind_counts: [0; 6],
            config: enemies_cfg,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Begins wave 1. Later calls do nothing.
    pub fn start(&mut self, now: u64, fx: &mut Effects, events: &mut Vec<GameEvent>) {
        if self.started {
            return;
        }
        self.started = true;
        self.wave = WaveState::first(&self.config);
        self.wave.wave_start_time = now;
        self.next_burst_at = now + self.wave.spawn_interval_ms;
        self.last_sweep_at = now;
        self.announce_wave(fx, events);
        self.spawn_enemy_burst(now);
    }

    pub fn update(
        &mut self,
        now: u64,
        rng: &mut impl Rng,
        fx: &mut Effects,
        events: &mut Vec<GameEvent>,
    ) {
        if !self.started {
            self.start(now, fx, events);
        }

        if now.saturating_sub(self.wave.wave_start_time) >= self.wave.wave_duration_ms {
            self.wave.wave_start_time = now;
            self.start_new_wave(now, fx, events);
        }

        if now >= self.next_burst_at {
            self.next_burst_at = now + self.wave.spawn_interval_ms;
            self.spawn_enemy_burst(now);
        }

        while self.pending.front().is_some_and(|&at| at <= now) {
            self.pending.pop_front();
            self.spawn_enemy(now, rng, events);
        }

        if now.saturating_sub(self.last_sweep_at) >= SWEEP_INTERVAL_MS {
            self.last_sweep_at = now;
            self.sweep_dead();
        }
    }

    /// Advances exactly one wave. Returns the new wave number.
    pub fn start_new_wave(
        &mut self,
        now: u64,
        fx: &mut Effects,
        events: &mut Vec<GameEvent>,
    ) -> u32 {
        self.started = true;
        self.wave.wave_number += 1;
        self.wave.enemies_killed_this_wave = 0;
        self.wave.boss_spawned = false;
        self.wave.wave_start_time = now;
        self.wave.configure(&self.config);
        self.next_burst_at = now + self.wave.spawn_interval_ms;
        self.announce_wave(fx, events);
        self.spawn_enemy_burst(now);
        self.wave.wave_number
    }

    fn announce_wave(&mut self, fx: &mut Effects, events: &mut Vec<GameEvent>) {
        let w = &self.wave;
        info!(
            target: "game_state",
            "wave {} begins: difficulty {:.2}, burst {}, interval {}ms, hp {} dmg {}",
            w.wave_number, w.difficulty, w.spawn_burst_count, w.spawn_interval_ms,
            w.enemy_health, w.enemy_damage
        );
        events.push(GameEvent::WaveChanged { wave: w.wave_number });
        fx.show(
            Vec2::new(self.arena.width / 2.0, self.arena.height / 3.0),
            Effect::WaveBanner { wave: w.wave_number },
        );
    }

    // ── Spawning ─────────────────────────────────────────────────────────────

    /// Schedules one burst, capped by the remaining room under the ceiling.
    /// Returns how many spawns were scheduled.
    pub fn spawn_enemy_burst(&mut self, now: u64) -> usize {
        let requested = (self.wave.spawn_burst_count + self.wave.burst_bonus()) as usize;
        let occupied = self.enemies.active_count() + self.pending.len();
        let room = self.max_enemies_on_screen.saturating_sub(occupied);
        let count = requested.min(room);
        let stagger = self.wave.stagger_ms();
        let start = self.pending.back().copied().unwrap_or(now).max(now);
        for i in 0..count as u64 {
            self.pending.push_back(start + i * stagger);
        }
        debug!(
            target: "enemy_spawn",
            "burst: requested {}, scheduled {}, stagger {}ms",
            requested, count, stagger
        );
        count
    }

    /// Spawns one enemy now. `None` when the ceiling is reached.
    pub fn spawn_enemy(
        &mut self,
        now: u64,
        rng: &mut impl Rng,
        events: &mut Vec<GameEvent>,
    ) -> Option<SlotId> {
        if self.enemies.active_count() >= self.max_enemies_on_screen {
            debug!(target: "enemy_spawn", "ceiling of {} reached", self.max_enemies_on_screen);
            return None;
        }
        let id = self.enemies.acquire()?;
        let kind = self.choose_kind(rng);
        let spawn = self.spawn_params(kind, now);
        let enemy = self.enemies.get_mut(id)?;
        enemy.reset(spawn);

        self.kind_counts[kind.index()] += 1;
        events.push(GameEvent::EnemySpawned { kind });
        info!(
            target: "enemy_spawn",
            "{} spawned on wave {} (hp {}, atk {}), {} active",
            kind.definition().name,
            self.wave.wave_number,
            spawn.health,
            spawn.attack,
            self.enemies.active_count()
        );
        Some(id)
    }

    fn choose_kind(&mut self, rng: &mut impl Rng) -> EnemyKind {
        if self.wave.boss_due() {
            self.wave.boss_spawned = true;
            return EnemyKind::Boss;
        }
        let weights = normalized_type_weights(self.wave.wave_number);
        sample_kind(&weights, rng.gen::<f64>())
    }

    /// Stats for one enemy of `kind` on the current wave.
    pub fn spawn_params(&self, kind: EnemyKind, now: u64) -> EnemySpawn {
        let def = kind.definition();
        let w = self.wave.wave_number;
        let c = &self.config;
        EnemySpawn {
            kind,
            pos: Vec2::new(c.spawn_x, self.spawn_y + def.y_offset),
            health: scaled_stat(c.base_health, def.health_multiplier, w, HEALTH_GROWTH),
            attack: scaled_stat(c.base_damage, def.damage_multiplier, w, DAMAGE_GROWTH),
            speed: scaled_stat(c.base_speed, def.speed_multiplier, w, SPEED_GROWTH) as f32,
            experience: scaled_stat(
                c.base_experience,
                def.experience_multiplier,
                w,
                EXPERIENCE_GROWTH,
            ),
            now,
        }
    }

    // ── Deaths ───────────────────────────────────────────────────────────────

    pub fn enemy_killed(&mut self, report: &DeathReport) {
        self.total_killed += 1;
        self.wave.enemies_killed_this_wave += 1;
        debug!(
            target: "game_state",
            "{:?} down ({:?}); {} this wave, {} total",
            report.kind, report.cause, self.wave.enemies_killed_this_wave, self.total_killed
        );
        self.sweep_dead();
    }

    /// Returns dead enemies' slots to the pool.
    pub fn sweep_dead(&mut self) -> usize {
        self.enemies.release_where(Enemy::is_dead)
    }

    pub fn update_enemies(
        &mut self,
        now: u64,
        dt: f32,
        target: Option<Vec2>,
        fx: &mut Effects,
    ) -> Vec<DeathReport> {
        let arena = self.arena;
        let mut deaths = Vec::new();
        for (_, enemy) in self.enemies.iter_active_mut() {
            if let Some(report) = enemy.update(now, dt, target, &arena, fx) {
                deaths.push(report);
            }
        }
        deaths
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// Nearest live enemy to the right of `x`, else the nearest on either side.
    pub fn find_closest_enemy(&self, x: f32) -> Option<SlotId> {
        let live = || self.live_enemies();
        let ahead = live()
            .filter(|(_, e)| e.pos.x >= x)
            .min_by(|(_, a), (_, b)| (a.pos.x - x).total_cmp(&(b.pos.x - x)));
        ahead
            .or_else(|| {
                live().min_by(|(_, a), (_, b)| (a.pos.x - x).abs().total_cmp(&(b.pos.x - x).abs()))
            })
            .map(|(id, _)| id)
    }

    /// Nearest live enemy within `radius` of `point`.
    pub fn nearest_within(&self, point: Vec2, radius: f32) -> Option<SlotId> {
        self.live_enemies()
            .map(|(id, e)| (id, e.pos.distance(point)))
            .filter(|&(_, d)| d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    pub fn live_enemies(&self) -> impl Iterator<Item = (SlotId, &Enemy)> + '_ {
        self.enemies.iter_active().filter(|(_, e)| !e.is_dead())
    }

    pub fn live_enemies_mut(&mut self) -> impl Iterator<Item = (SlotId, &mut Enemy)> + '_ {
        self.enemies.iter_active_mut().filter(|(_, e)| !e.is_dead())
    }

    pub fn enemy(&self, id: SlotId) -> Option<&Enemy> {
        self.enemies.get(id)
    }

    pub fn enemy_mut(&mut self, id: SlotId) -> Option<&mut Enemy> {
        self.enemies.get_mut(id)
    }

    /// Pool slots in use, including dead enemies not yet swept.
    pub fn active_count(&self) -> usize {
        self.enemies.active_count()
    }

    pub fn live_count(&self) -> usize {
        self.live_enemies().count()
    }

    pub fn pool_capacity(&self) -> usize {
        self.enemies.capacity()
    }

    pub fn pending_spawns(&self) -> usize {
        self.pending.len()
    }

    pub fn wave(&self) -> &WaveState {
        &self.wave
    }

    pub fn wave_number(&self) -> u32 {
        self.wave.wave_number
    }

    pub fn total_killed(&self) -> u32 {
        self.total_killed
    }

    /// How many enemies of `kind` have spawned this session.
    pub fn kind_count(&self, kind: EnemyKind) -> u32 {
        self.kind_counts[kind.index()]
    }

    pub fn max_enemies_on_screen(&self) -> usize {
        self.max_enemies_on_screen
    }

    /// Changes the ceiling. When lowered below the live count, the enemies
    /// furthest from the fight (rightmost) are culled without a death report,
    /// and scheduled spawns that no longer fit are dropped.
    pub fn set_max_enemies_on_screen(&mut self, max: usize) {
        if max != self.max_enemies_on_screen {
            info!(target: "performance", "enemy ceiling {} -> {}", self.max_enemies_on_screen, max);
        }
        self.max_enemies_on_screen = max;
        self.enemies.set_max_size(max);

        self.sweep_dead();
        let surplus = self.enemies.active_count().saturating_sub(max);
        if surplus > 0 {
            let mut by_distance: Vec<(SlotId, f32)> =
                self.enemies.iter_active().map(|(id, e)| (id, e.pos.x)).collect();
            by_distance.sort_by(|a, b| b.1.total_cmp(&a.1));
            for (id, _) in by_distance.into_iter().take(surplus) {
                self.enemies.release(id);
            }
            debug!(target: "performance", "culled {} enemies", surplus);
        }
        let room = max.saturating_sub(self.enemies.active_count());
        self.pending.truncate(room);
    }
}
