/// Combat resolution between the hero and the enemy pool.
///
/// Enemy melee damage is applied only here, in a throttled pass that caps
/// how many enemies may land a hit at once. The resolver also owns the
/// player's aim point and the player shots that are still in flight.

use std::collections::HashMap;

use log::{debug, info};

use crate::config::CombatConfig;
use crate::director::EnemyDirector;
use crate::effects::{Effect, Effects};
use crate::enemy::DeathReport;
use crate::entities::Vec2;
use crate::events::GameEvent;
use crate::hero::{Hero, HeroHit};
use crate::pool::{Pool, SlotId};

// ── Proximity tuning ─────────────────────────────────────────────────────────

const COARSE_RANGE: f32 = 80.0;
const CLOSE_RANGE: f32 = 60.0;
const HITBOX_SCALE: f32 = 2.0 / 3.0;
const LAST_HIT_TTL_MS: u64 = 5000;
/// Auto-aim stops steering once this close to the target.
const AIM_SNAP_DISTANCE: f32 = 5.0;
/// Resting aim point ahead of the hero when nothing is targeted.
const AIM_LEAD: f32 = 150.0;

/// A shot fired by the hero that lands after a short travel time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerShot {
    pub target: Option<SlotId>,
    pub damage: u32,
    pub from: Vec2,
    pub to: Vec2,
    pub lands_at: u64,
}

/// What one resolution pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    pub melee_attacks: usize,
    pub projectile_hits: usize,
    pub damage_taken: u32,
    pub dodged: usize,
}

pub struct CombatResolver {
    config: CombatConfig,
    last_pass_at: Option<u64>,
    /// Enemy slot -> time of its last landed melee attack.
    last_hits: HashMap<SlotId, u64>,
    aim: Vec2,
    auto_aim: bool,
    targeting_radius: f32,
    last_shot_at: Option<u64>,
    shots: Pool<PlayerShot>,
    performance_mode: bool,
}

impl CombatResolver {
    pub fn new(config: &CombatConfig) -> Self {
        CombatResolver {
            last_pass_at: None,
            last_hits: HashMap::new(),
            aim: Vec2::default(),
            auto_aim: config.auto_aim,
            targeting_radius: config.targeting_radius,
            last_shot_at: None,
            shots: Pool::new(config.max_shots_in_flight, config.max_shots_in_flight),
            performance_mode: false,
            config: config.clone(),
        }
    }

    // ── Enemy -> hero ────────────────────────────────────────────────────────

    /// Runs one pass if the cadence allows; `None` when throttled.
    pub fn resolve(
        &mut self,
        now: u64,
        hero: &mut Hero,
        director: &mut EnemyDirector,
        fx: &mut Effects,
        events: &mut Vec<GameEvent>,
    ) -> Option<PassReport> {
        if let Some(last) = self.last_pass_at {
            if now.saturating_sub(last) < self.config.resolution_interval_ms {
                return None;
            }
        }
        self.last_pass_at = Some(now);

        let mut report = PassReport::default();
        if hero.dead {
            self.last_hits.clear();
            return Some(report);
        }

        let in_range = self.enemies_in_range(hero, director);
        self.last_hits.retain(|id, at| {
            now.saturating_sub(*at) < LAST_HIT_TTL_MS && in_range.contains(id)
        });

        for id in in_range {
            if report.melee_attacks >= self.config.max_simultaneous_attacks || hero.dead {
                break;
            }
            let Some(enemy) = director.enemy_mut(id) else { continue };
            if let Some(&at) = self.last_hits.get(&id) {
                if now.saturating_sub(at) < enemy.attack_cooldown_ms {
                    continue;
                }
            }
            let Some(damage) = enemy.perform_attack(now) else { continue };
            let source_x = enemy.pos.x;
            self.last_hits.insert(id, now);
            report.melee_attacks += 1;
            Self::apply_hit(hero, damage, source_x, now, fx, events, &mut report);
        }

        for (_, enemy) in director.live_enemies_mut() {
            if hero.dead {
                break;
            }
            let hero_box = hero.hitbox();
            let mut landed = Vec::new();
            enemy.projectiles.retain(|p| {
                if p.hitbox().intersects(&hero_box) {
                    landed.push((p.damage, p.pos.x));
                    false
                } else {
                    true
                }
            });
            for (damage, source_x) in landed {
                report.projectile_hits += 1;
                Self::apply_hit(hero, damage, source_x, now, fx, events, &mut report);
            }
        }

        if report.melee_attacks > 0 || report.projectile_hits > 0 {
            debug!(
                target: "combat",
                "pass: {} melee, {} projectile hits, {} damage",
                report.melee_attacks, report.projectile_hits, report.damage_taken
            );
        }
        Some(report)
    }

    /// Live enemies close enough to strike the hero, nearest first.
    pub fn enemies_in_range(&self, hero: &Hero, director: &EnemyDirector) -> Vec<SlotId> {
        let hero_box = hero.hitbox().scaled(HITBOX_SCALE);
        let mut hits: Vec<(SlotId, f32)> = director
            .live_enemies()
            .filter_map(|(id, enemy)| {
                let dx = (enemy.pos.x - hero.pos.x).abs();
                let dy = (enemy.pos.y - hero.pos.y).abs();
                if dx >= COARSE_RANGE || dy >= COARSE_RANGE {
                    return None;
                }
                let overlap = hero_box.intersects(&enemy.hitbox().scaled(HITBOX_SCALE));
                let close = dx < CLOSE_RANGE && dy < CLOSE_RANGE;
                (overlap || close).then(|| (id, enemy.pos.distance(hero.pos)))
            })
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.into_iter().map(|(id, _)| id).collect()
    }

    fn apply_hit(
        hero: &mut Hero,
        damage: u32,
        source_x: f32,
        now: u64,
        fx: &mut Effects,
        events: &mut Vec<GameEvent>,
        report: &mut PassReport,
    ) {
        match hero.take_damage(damage, source_x, now, fx) {
            HeroHit::Hit { dealt } | HeroHit::Killed { dealt } => {
                report.damage_taken += dealt;
                events.push(GameEvent::HeroDamaged { amount: dealt, health: hero.health });
            }
            HeroHit::Dodged => {
                report.dodged += 1;
                events.push(GameEvent::HeroDodged);
            }
            HeroHit::Ignored => {}
        }
    }

    // ── Aim ──────────────────────────────────────────────────────────────────

    /// Moves the aim point. A pointer sets it directly; otherwise auto-aim
    /// eases it toward the nearest enemy, or back ahead of the hero.
    pub fn update_aim(&mut self, hero: &Hero, director: &EnemyDirector, pointer: Option<Vec2>) {
        if let Some(p) = pointer {
            self.aim = p;
        }
        let target = if self.auto_aim {
            director
                .nearest_within(self.aim, self.config.auto_aim_radius)
                .and_then(|id| director.enemy(id))
                .map(|e| e.pos)
        } else {
            None
        };
        let goal = match (target, pointer) {
            (Some(t), _) => t,
            (None, Some(p)) => p,
            (None, None) => {
                let lead = if hero.facing_left { -AIM_LEAD } else { AIM_LEAD };
                Vec2::new(hero.pos.x + lead, hero.pos.y)
            }
        };
        let dist = self.aim.distance(goal);
        if dist > AIM_SNAP_DISTANCE {
            let k = self.config.auto_aim_steer;
            self.aim.x += (goal.x - self.aim.x) * k;
            self.aim.y += (goal.y - self.aim.y) * k;
        }
    }

    pub fn aim(&self) -> Vec2 {
        self.aim
    }

    pub fn set_aim(&mut self, aim: Vec2) {
        self.aim = aim;
    }

    pub fn auto_aim(&self) -> bool {
        self.auto_aim
    }

    pub fn toggle_auto_aim(&mut self) -> bool {
        self.auto_aim = !self.auto_aim;
        info!(target: "player_attack", "auto-aim {}", if self.auto_aim { "on" } else { "off" });
        self.auto_aim
    }

    pub fn targeting_radius(&self) -> f32 {
        self.targeting_radius
    }

    /// Steps the manual targeting radius by `steps`, clamped to the
    /// configured range. Returns the new radius.
    pub fn adjust_targeting_radius(&mut self, steps: i32) -> f32 {
        let c = &self.config;
        self.targeting_radius = (self.targeting_radius + steps as f32 * c.targeting_radius_step)
            .clamp(c.min_targeting_radius, c.max_targeting_radius);
        self.targeting_radius
    }

    // ── Hero -> enemy ────────────────────────────────────────────────────────

    /// Fires at the nearest enemy around the aim point. The search radius is
    /// the auto-aim radius with auto-aim on, the targeting radius otherwise.
    pub fn player_shoot(
        &mut self,
        now: u64,
        hero: &mut Hero,
        director: &EnemyDirector,
        fx: &mut Effects,
    ) -> Option<SlotId> {
        let radius = if self.auto_aim { self.config.auto_aim_radius } else { self.targeting_radius };
        let target = director.nearest_within(self.aim, radius)?;
        self.fire_at(now, hero, director, target, fx)
    }

    /// Auto-battle fire: nearest enemy within `auto_fire_range` of the hero.
    pub fn auto_fire(
        &mut self,
        now: u64,
        hero: &mut Hero,
        director: &EnemyDirector,
        fx: &mut Effects,
    ) -> Option<SlotId> {
        let target = director.nearest_within(hero.pos, self.config.auto_fire_range)?;
        self.fire_at(now, hero, director, target, fx)
    }

    fn fire_at(
        &mut self,
        now: u64,
        hero: &mut Hero,
        director: &EnemyDirector,
        target: SlotId,
        fx: &mut Effects,
    ) -> Option<SlotId> {
        if hero.dead {
            return None;
        }
        if let Some(last) = self.last_shot_at {
            if now.saturating_sub(last) < self.config.shot_cooldown_ms {
                return None;
            }
        }
        let to = director.enemy(target)?.pos;
        if !hero.try_attack(now) {
            return None;
        }
        self.last_shot_at = Some(now);

        let travel = if self.performance_mode {
            self.config.shot_travel_fast_ms
        } else {
            self.config.shot_travel_ms
        };
        let id = self.shots.acquire_or_recycle()?;
        if let Some(shot) = self.shots.get_mut(id) {
            *shot = PlayerShot {
                target: Some(target),
                damage: hero.attack,
                from: hero.pos,
                to,
                lands_at: now + travel,
            };
        }
        hero.facing_left = to.x < hero.pos.x;
        fx.show(hero.pos, Effect::ShotTrail { to });
        debug!(target: "player_attack", "{:?} shot at ({:.0}, {:.0})", hero.weapon, to.x, to.y);
        Some(target)
    }

    /// Applies every shot that has landed. Returns the deaths it caused.
    pub fn advance_shots(
        &mut self,
        now: u64,
        director: &mut EnemyDirector,
        fx: &mut Effects,
    ) -> Vec<DeathReport> {
        let landed: Vec<(SlotId, PlayerShot)> = self
            .shots
            .iter_active()
            .filter(|(_, s)| s.lands_at <= now)
            .map(|(id, s)| (id, s.clone()))
            .collect();

        let mut deaths = Vec::new();
        for (id, shot) in landed {
            self.shots.release(id);
            let Some(target) = shot.target else { continue };
            let Some(enemy) = director.enemy_mut(target) else { continue };
            let Some(hit) = enemy.take_damage(shot.damage) else { continue };
            fx.show(enemy.pos, Effect::DamageNumber { amount: hit.dealt, on_hero: false });
            if let Some(report) = hit.death {
                fx.show(report.pos, Effect::EnemyDeath { kind: report.kind });
                deaths.push(report);
            }
        }
        deaths
    }

    pub fn shots_in_flight(&self) -> usize {
        self.shots.active_count()
    }

    pub fn shots(&self) -> impl Iterator<Item = &PlayerShot> + '_ {
        self.shots.iter_active().map(|(_, s)| s)
    }

    pub fn performance_mode(&self) -> bool {
        self.performance_mode
    }

    pub fn set_performance_mode(&mut self, enabled: bool) {
        self.performance_mode = enabled;
    }
}
