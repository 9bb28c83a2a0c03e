/// Enemy actor: movement AI, cooldown-gated attacks, special abilities and
/// an idempotent death sequence.
///
/// An `Enemy` lives inside a director-owned pool slot. `reset` brings a
/// recycled slot back to life in place; `die` parks it until the next sweep.
/// Timed ability effects are tracked by an explicit `AbilityPhase` that only
/// `update` advances, so nothing outlives the enemy that started it.

use log::{debug, info};

use crate::config::GameConfig;
use crate::effects::{Effect, Effects};
use crate::entities::{EnemyKind, Projectile, Rect, Vec2};
use crate::stats::actual_damage;

// ── Tuning ───────────────────────────────────────────────────────────────────

const BODY_SIZE: f32 = 40.0;

const MELEE_RANGE: f32 = 60.0;
const MELEE_STOP_DISTANCE: f32 = 50.0;
const MELEE_COOLDOWN_MS: u64 = 1000;

const RANGED_RANGE: f32 = 300.0;
const RANGED_MIN_DISTANCE: f32 = 100.0;
const RANGED_COOLDOWN_MS: u64 = 2000;
const RANGED_APPROACH_FACTOR: f32 = 0.7;
const PROJECTILE_SPEED: f32 = 250.0;
const SHOT_COOLDOWN_MS: u64 = 2000;

const VERTICAL_CHASE_THRESHOLD: f32 = 20.0;
const VERTICAL_CHASE_FACTOR: f32 = 0.5;

const ABILITY_CHECK_MS: u64 = 2000;
const ABILITY_COOLDOWN_MS: u64 = 5000;

const BULWARK_DEFENSE: u32 = 20;
const BULWARK_MS: u64 = 2000;
const SHOCKWAVE_RADIUS: f32 = 100.0;
const FRENZY_MS: u64 = 1500;
const VOLLEY_SHOTS: u8 = 3;
const VOLLEY_SPACING_MS: u64 = 300;
const VOLLEY_SPREAD: f32 = 0.2;
const VOLLEY_SPEED_FACTOR: f32 = 1.3;
const VOLLEY_DAMAGE_FACTOR: f64 = 0.8;
const TELEPORT_DISTANCE: f32 = 100.0;

/// Projectiles this far outside the world are dropped.
const PROJECTILE_MARGIN: f32 = 50.0;

// ── Types ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyState {
    Spawning,
    Alive,
    Dead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbilityPhase {
    Idle,
    /// Boss defense boost.
    Bulwark { until: u64 },
    /// Berserker speed boost.
    Frenzy { until: u64 },
    /// Ranged burst in progress.
    Volley { fired: u8, next_at: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathCause {
    Slain,
    WanderedOff,
}

/// Handed out exactly once per death.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeathReport {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub experience: u32,
    pub cause: DeathCause,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyHit {
    pub dealt: u32,
    pub death: Option<DeathReport>,
}

/// Everything `reset` needs to bring a slot back to life.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub health: u32,
    pub attack: u32,
    pub speed: f32,
    pub experience: u32,
    pub now: u64,
}

/// World extents an enemy needs for despawning itself and its projectiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub despawn_margin: f32,
}

impl From<&GameConfig> for Arena {
    fn from(config: &GameConfig) -> Self {
        Arena {
            width: config.world.width,
            height: config.world.height,
            despawn_margin: config.enemies.despawn_margin,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub state: EnemyState,
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: u32,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: f32,
    pub experience_value: u32,
    pub attack_range: f32,
    pub attack_cooldown_ms: u64,
    pub projectile_speed: f32,
    pub is_ranged: bool,
    pub horizontal_only: bool,
    pub facing_left: bool,
    pub projectiles: Vec<Projectile>,
    pub ability: AbilityPhase,
    base_defense: u32,
    base_speed: f32,
    last_attack_at: Option<u64>,
    last_shot_at: Option<u64>,
    last_ability_at: Option<u64>,
    next_ability_check_at: u64,
}

impl Default for Enemy {
    /// An empty, dead slot.
    fn default() -> Self {
        Enemy {
            kind: EnemyKind::Standard,
            state: EnemyState::Dead,
            pos: Vec2::default(),
            vel: Vec2::default(),
            health: 0,
            max_health: 0,
            attack: 0,
            defense: 0,
            speed: 0.0,
            experience_value: 0,
            attack_range: MELEE_RANGE,
            attack_cooldown_ms: MELEE_COOLDOWN_MS,
            projectile_speed: PROJECTILE_SPEED,
            is_ranged: false,
            horizontal_only: false,
            facing_left: true,
            projectiles: Vec::new(),
            ability: AbilityPhase::Idle,
            base_defense: 0,
            base_speed: 0.0,
            last_attack_at: None,
            last_shot_at: None,
            last_ability_at: None,
            next_ability_check_at: 0,
        }
    }
}

impl Enemy {
    pub fn spawned(spawn: EnemySpawn) -> Self {
        let mut enemy = Enemy::default();
        enemy.reset(spawn);
        enemy
    }

    /// Reinitializes the slot in place for a fresh enemy.
    pub fn reset(&mut self, spawn: EnemySpawn) {
        let def = spawn.kind.definition();
        let health = spawn.health.max(1);
        self.projectiles.clear();
        *self = Enemy {
            kind: spawn.kind,
            state: EnemyState::Spawning,
            pos: spawn.pos,
            health,
            max_health: health,
            attack: spawn.attack,
            defense: def.defense,
            speed: spawn.speed,
            experience_value: spawn.experience,
            attack_range: if def.ranged { RANGED_RANGE } else { MELEE_RANGE },
            attack_cooldown_ms: if def.ranged { RANGED_COOLDOWN_MS } else { MELEE_COOLDOWN_MS },
            is_ranged: def.ranged,
            horizontal_only: def.horizontal_only,
            base_defense: def.defense,
            base_speed: spawn.speed,
            next_ability_check_at: spawn.now + ABILITY_CHECK_MS,
            projectiles: std::mem::take(&mut self.projectiles),
            ..Enemy::default()
        };
        debug!(
            target: "enemy_spawn",
            "{} reset at ({:.0}, {:.0}) hp={} atk={} spd={:.0}",
            def.name, self.pos.x, self.pos.y, self.health, self.attack, self.speed
        );
    }

    pub fn is_dead(&self) -> bool {
        self.state == EnemyState::Dead
    }

    pub fn hitbox(&self) -> Rect {
        let size = BODY_SIZE * self.kind.definition().scale;
        Rect::new(self.pos, size, size)
    }

    // ── Per-tick update ──────────────────────────────────────────────────────

    /// Advances AI, abilities and projectiles by one tick.
    ///
    /// `target` is the hero's position while the hero is alive. Returns a
    /// death report if the enemy walked off the left edge this tick.
    pub fn update(
        &mut self,
        now: u64,
        dt: f32,
        target: Option<Vec2>,
        arena: &Arena,
        fx: &mut Effects,
    ) -> Option<DeathReport> {
        if self.is_dead() {
            return None;
        }
        if self.state == EnemyState::Spawning {
            self.state = EnemyState::Alive;
        }

        self.update_projectiles(now, dt, arena);

        if self.pos.x < -arena.despawn_margin {
            info!(target: "enemy_spawn", "{:?} wandered off screen", self.kind);
            return self.die(DeathCause::WanderedOff);
        }

        if now >= self.next_ability_check_at {
            self.next_ability_check_at = now + ABILITY_CHECK_MS;
            self.try_special_ability(now, target, fx);
        }
        self.advance_ability(now, target);

        match target {
            Some(hero) => self.steer_toward(now, hero),
            None => self.vel = Vec2::new(-self.speed, 0.0),
        }

        self.pos.x += self.vel.x * dt;
        self.pos.y += self.vel.y * dt;
        None
    }

    fn steer_toward(&mut self, now: u64, hero: Vec2) {
        let dx = hero.x - self.pos.x;
        let dy = hero.y - self.pos.y;
        let distance = self.pos.distance(hero);
        let direction = if dx > 0.0 {
            1.0
        } else if dx < 0.0 {
            -1.0
        } else {
            0.0
        };
        if direction != 0.0 {
            self.facing_left = direction < 0.0;
        }
        let chase_y = if !self.horizontal_only && dy.abs() > VERTICAL_CHASE_THRESHOLD {
            dy.signum() * self.speed * VERTICAL_CHASE_FACTOR
        } else {
            0.0
        };

        if self.is_ranged {
            if distance <= self.attack_range && distance >= RANGED_MIN_DISTANCE {
                self.vel = Vec2::default();
                self.shoot_projectile(now, hero);
            } else if distance < RANGED_MIN_DISTANCE {
                self.vel = Vec2::new(-direction * self.speed, -chase_y);
            } else {
                self.vel = Vec2::new(direction * self.speed * RANGED_APPROACH_FACTOR, chase_y);
            }
            return;
        }

        let vx = if dx.abs() < MELEE_STOP_DISTANCE { 0.0 } else { direction * self.speed };
        self.vel = Vec2::new(vx, chase_y);
    }

    fn update_projectiles(&mut self, now: u64, dt: f32, arena: &Arena) {
        let (w, h) = (arena.width, arena.height);
        self.projectiles.retain_mut(|p| {
            p.pos.x += p.vel.x * dt;
            p.pos.y += p.vel.y * dt;
            !p.is_expired(now)
                && p.pos.x >= -PROJECTILE_MARGIN
                && p.pos.x <= w + PROJECTILE_MARGIN
                && p.pos.y >= -PROJECTILE_MARGIN
                && p.pos.y <= h + PROJECTILE_MARGIN
        });
    }

    // ── Ranged fire ──────────────────────────────────────────────────────────

    /// Fires one projectile at `target` if this is a ranged enemy off cooldown.
    pub fn shoot_projectile(&mut self, now: u64, target: Vec2) -> bool {
        if self.is_dead() || !self.is_ranged {
            return false;
        }
        if let Some(last) = self.last_shot_at {
            if now < last + SHOT_COOLDOWN_MS {
                return false;
            }
        }
        self.last_shot_at = Some(now);
        let dir = Vec2::new(target.x - self.pos.x, target.y - self.pos.y).normalized();
        self.spawn_projectile(now, dir, self.projectile_speed, self.attack);
        true
    }

    fn spawn_projectile(&mut self, now: u64, dir: Vec2, speed: f32, damage: u32) {
        self.projectiles.push(Projectile {
            pos: self.pos,
            vel: Vec2::new(dir.x * speed, dir.y * speed),
            damage,
            created_at: now,
            lifespan_ms: Projectile::LIFESPAN_MS,
        });
    }

    // ── Abilities ────────────────────────────────────────────────────────────

    fn try_special_ability(&mut self, now: u64, target: Option<Vec2>, fx: &mut Effects) -> bool {
        if let Some(last) = self.last_ability_at {
            if now < last + ABILITY_COOLDOWN_MS {
                return false;
            }
        }
        if self.ability != AbilityPhase::Idle {
            return false;
        }

        let used = match self.kind {
            EnemyKind::Boss => {
                self.defense = self.base_defense + BULWARK_DEFENSE;
                self.ability = AbilityPhase::Bulwark { until: now + BULWARK_MS };
                fx.show(self.pos, Effect::Shockwave { radius: SHOCKWAVE_RADIUS });
                fx.show(self.pos, Effect::Callout("Shield!"));
                true
            }
            EnemyKind::Berserker => {
                self.speed = self.base_speed * 2.0;
                self.ability = AbilityPhase::Frenzy { until: now + FRENZY_MS };
                fx.show(self.pos, Effect::Callout("Berserk!"));
                true
            }
            EnemyKind::Ranged if target.is_some() => {
                self.ability = AbilityPhase::Volley { fired: 0, next_at: now };
                fx.show(self.pos, Effect::Callout("Volley!"));
                true
            }
            EnemyKind::Tank if self.health < self.max_health => {
                let amount = (self.max_health / 10).max(1);
                let healed = self.heal(amount);
                fx.show(self.pos, Effect::Heal { amount: healed });
                true
            }
            EnemyKind::Minion => {
                let dir = if self.facing_left { -1.0 } else { 1.0 };
                self.pos.x += dir * TELEPORT_DISTANCE;
                fx.show(self.pos, Effect::Spark);
                true
            }
            _ => false,
        };

        if used {
            self.last_ability_at = Some(now);
            debug!(target: "enemy_spawn", "{:?} used its ability", self.kind);
        }
        used
    }

    fn advance_ability(&mut self, now: u64, target: Option<Vec2>) {
        match self.ability {
            AbilityPhase::Idle => {}
            AbilityPhase::Bulwark { until } => {
                if now >= until {
                    self.defense = self.base_defense;
                    self.ability = AbilityPhase::Idle;
                }
            }
            AbilityPhase::Frenzy { until } => {
                if now >= until {
                    self.speed = self.base_speed;
                    self.ability = AbilityPhase::Idle;
                }
            }
            AbilityPhase::Volley { mut fired, mut next_at } => {
                let Some(hero) = target else {
                    self.ability = AbilityPhase::Idle;
                    return;
                };
                let aim = Vec2::new(hero.x - self.pos.x, hero.y - self.pos.y).normalized();
                let damage = ((self.attack as f64) * VOLLEY_DAMAGE_FACTOR).floor() as u32;
                let speed = self.projectile_speed * VOLLEY_SPEED_FACTOR;
                while fired < VOLLEY_SHOTS && now >= next_at {
                    let spread = (f32::from(fired) - 1.0) * VOLLEY_SPREAD;
                    let dir = Vec2::new(aim.x, aim.y + spread).normalized();
                    self.spawn_projectile(now, dir, speed, damage.max(1));
                    fired += 1;
                    next_at += VOLLEY_SPACING_MS;
                }
                self.ability = if fired >= VOLLEY_SHOTS {
                    AbilityPhase::Idle
                } else {
                    AbilityPhase::Volley { fired, next_at }
                };
            }
        }
    }

    // ── Melee ────────────────────────────────────────────────────────────────

    pub fn can_attack(&self, now: u64) -> bool {
        if self.is_dead() {
            return false;
        }
        match self.last_attack_at {
            Some(last) => now >= last + self.attack_cooldown_ms,
            None => true,
        }
    }

    /// Starts the attack cooldown and returns the damage to deal, if ready.
    pub fn perform_attack(&mut self, now: u64) -> Option<u32> {
        if !self.can_attack(now) {
            return None;
        }
        self.last_attack_at = Some(now);
        debug!(target: "enemy_damage", "{:?} attacks for {}", self.kind, self.attack);
        Some(self.attack)
    }

    // ── Health ───────────────────────────────────────────────────────────────

    /// `None` when already dead. Otherwise the damage actually dealt, and the
    /// death report if this hit was fatal.
    pub fn take_damage(&mut self, amount: u32) -> Option<EnemyHit> {
        if self.is_dead() {
            return None;
        }
        let dealt = actual_damage(amount, self.defense);
        self.health = self.health.saturating_sub(dealt);
        debug!(
            target: "enemy_damage",
            "{:?} takes {} ({} after defense), hp={}",
            self.kind, amount, dealt, self.health
        );
        let death = if self.health == 0 { self.die(DeathCause::Slain) } else { None };
        Some(EnemyHit { dealt, death })
    }

    /// Returns the health actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.is_dead() {
            return 0;
        }
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }

    /// Idempotent. Cancels projectiles and any running ability; the report is
    /// only produced by the first call.
    pub fn die(&mut self, cause: DeathCause) -> Option<DeathReport> {
        if self.is_dead() {
            return None;
        }
        self.state = EnemyState::Dead;
        self.vel = Vec2::default();
        self.projectiles.clear();
        self.ability = AbilityPhase::Idle;
        self.defense = self.base_defense;
        self.speed = self.base_speed;
        info!(target: "enemy_damage", "{:?} died ({:?})", self.kind, cause);
        Some(DeathReport {
            kind: self.kind,
            pos: self.pos,
            experience: self.experience_value,
            cause,
        })
    }
}
