/// The player-controlled hero.

use log::{debug, info};

use crate::config::{HeroConfig, WorldConfig};
use crate::effects::{Effect, Effects};
use crate::entities::{Rect, Vec2, Weapon};
use crate::input::{Action, ActionInput};
use crate::stats::actual_damage;

const BODY_WIDTH: f32 = 40.0;
const BODY_HEIGHT: f32 = 50.0;

/// Result of one `take_damage` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeroHit {
    /// Already dead; nothing changed.
    Ignored,
    /// Inside the dodge invincibility window.
    Dodged,
    Hit { dealt: u32 },
    Killed { dealt: u32 },
}

#[derive(Clone, Debug)]
pub struct Hero {
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: u32,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: f32,
    pub jump_speed: f32,
    pub level: u32,
    pub experience: u32,
    pub experience_to_next_level: u32,
    pub grounded: bool,
    pub jump_count: u32,
    pub max_jumps: u32,
    pub facing_left: bool,
    pub weapon: Weapon,
    pub dead: bool,
    ground_y: f32,
    gravity: f32,
    coyote_until: Option<u64>,
    jump_buffered_until: Option<u64>,
    last_dodge_at: Option<u64>,
    dodging_until: u64,
    invincible_until: u64,
    knockback_until: u64,
    last_attack_at: Option<u64>,
    tuning: HeroConfig,
}

impl Hero {
    pub fn new(tuning: &HeroConfig, world: &WorldConfig) -> Self {
        let ground_y = world.ground_level - 25.0;
        Hero {
            pos: Vec2::new(tuning.start_x, ground_y),
            vel: Vec2::default(),
            health: tuning.max_health,
            max_health: tuning.max_health,
            attack: tuning.attack,
            defense: tuning.defense,
            speed: tuning.speed,
            jump_speed: tuning.jump_speed,
            level: 1,
            experience: 0,
            experience_to_next_level: tuning.experience_to_level,
            grounded: true,
            jump_count: 0,
            max_jumps: tuning.max_jumps,
            facing_left: false,
            weapon: Weapon::Sword,
            dead: false,
            ground_y,
            gravity: world.gravity,
            coyote_until: None,
            jump_buffered_until: None,
            last_dodge_at: None,
            dodging_until: 0,
            invincible_until: 0,
            knockback_until: 0,
            last_attack_at: None,
            tuning: tuning.clone(),
        }
    }

    pub fn hitbox(&self) -> Rect {
        Rect::new(self.pos, BODY_WIDTH, BODY_HEIGHT)
    }

    pub fn attack_range(&self) -> f32 {
        self.tuning.attack_range
    }

    pub fn is_dodging(&self, now: u64) -> bool {
        now < self.dodging_until
    }

    pub fn is_invincible(&self, now: u64) -> bool {
        now < self.invincible_until
    }

    fn in_knockback(&self, now: u64) -> bool {
        now < self.knockback_until
    }

    // ── Control ──────────────────────────────────────────────────────────────

    /// Applies one tick of player input.
    pub fn control(&mut self, now: u64, input: &dyn ActionInput) {
        if self.dead {
            return;
        }
        let left = input.is_active(Action::MoveLeft);
        let right = input.is_active(Action::MoveRight);
        let dir = match (left, right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        self.set_move(dir, now);

        if input.just_pressed(Action::Jump) {
            self.jump(now);
        }
        if input.just_pressed(Action::Dodge) {
            self.dodge(now);
        }
    }

    /// Sets horizontal intent (-1, 0 or 1). Ignored while dodging or
    /// knocked back.
    pub fn set_move(&mut self, dir: f32, now: u64) {
        if self.dead || self.is_dodging(now) || self.in_knockback(now) {
            return;
        }
        self.vel.x = dir * self.speed;
        if dir < 0.0 {
            self.facing_left = true;
        } else if dir > 0.0 {
            self.facing_left = false;
        }
    }

    /// Walks toward `target_x`, stopping once inside attack range.
    pub fn move_toward(&mut self, target_x: f32, now: u64) {
        let dx = target_x - self.pos.x;
        let dir = if dx.abs() <= self.tuning.attack_range { 0.0 } else { dx.signum() };
        self.set_move(dir, now);
        if dir == 0.0 && dx != 0.0 {
            self.facing_left = dx < 0.0;
        }
    }

    /// Jumps if a charge is available; otherwise buffers the request so it
    /// fires on landing.
    pub fn jump(&mut self, now: u64) -> bool {
        if self.dead {
            return false;
        }
        let in_coyote = self.coyote_until.is_some_and(|until| now <= until);
        let can_jump = self.jump_count < self.max_jumps
            && (self.grounded || in_coyote || self.jump_count > 0);
        if !can_jump {
            self.jump_buffered_until = Some(now + self.tuning.jump_buffer_ms);
            debug!(target: "player_attack", "jump buffered");
            return false;
        }
        self.vel.y = -self.jump_speed;
        self.grounded = false;
        self.coyote_until = None;
        self.jump_buffered_until = None;
        self.jump_count += 1;
        true
    }

    /// Leaves the ground without jumping (walking off a ledge), which opens
    /// the coyote window.
    pub fn leave_ground(&mut self, now: u64) {
        if self.grounded {
            self.grounded = false;
            self.coyote_until = Some(now + self.tuning.coyote_time_ms);
        }
    }

    fn land(&mut self, now: u64) {
        self.grounded = true;
        self.jump_count = 0;
        self.vel.y = 0.0;
        self.pos.y = self.ground_y;
        self.coyote_until = None;
        if let Some(until) = self.jump_buffered_until.take() {
            if now <= until {
                self.jump(now);
            }
        }
    }

    pub fn dodge(&mut self, now: u64) -> bool {
        if self.dead || self.is_dodging(now) {
            return false;
        }
        if let Some(last) = self.last_dodge_at {
            if now < last + self.tuning.dodge_cooldown_ms {
                return false;
            }
        }
        let dir = if self.facing_left { -1.0 } else { 1.0 };
        let duration_s = self.tuning.dodge_duration_ms.max(1) as f32 / 1000.0;
        self.vel.x = dir * self.tuning.dodge_distance / duration_s;
        self.last_dodge_at = Some(now);
        self.dodging_until = now + self.tuning.dodge_duration_ms;
        self.invincible_until = now + self.tuning.dodge_duration_ms;
        debug!(target: "player_attack", "dodge started");
        true
    }

    /// Starts the attack cooldown if ready.
    pub fn try_attack(&mut self, now: u64) -> bool {
        if self.dead {
            return false;
        }
        if let Some(last) = self.last_attack_at {
            if now < last + self.tuning.attack_cooldown_ms {
                return false;
            }
        }
        self.last_attack_at = Some(now);
        true
    }

    pub fn cycle_weapon(&mut self) -> Weapon {
        self.weapon = self.weapon.next();
        self.weapon
    }

    // ── Physics ──────────────────────────────────────────────────────────────

    pub fn update(&mut self, now: u64, dt: f32) {
        if self.dead {
            return;
        }
        if self.dodging_until != 0 && now >= self.dodging_until {
            self.dodging_until = 0;
            self.vel.x = 0.0;
        }
        if !self.grounded {
            self.vel.y += self.gravity * dt;
        }
        self.pos.x = (self.pos.x + self.vel.x * dt).clamp(self.tuning.min_x, self.tuning.max_x);
        self.pos.y += self.vel.y * dt;
        if !self.grounded && self.pos.y >= self.ground_y {
            self.land(now);
        }
    }

    // ── Damage, experience, death ────────────────────────────────────────────

    pub fn take_damage(&mut self, amount: u32, source_x: f32, now: u64, fx: &mut Effects) -> HeroHit {
        if self.dead {
            return HeroHit::Ignored;
        }
        if self.is_invincible(now) {
            fx.show(self.pos, Effect::Dodged);
            debug!(target: "player_damage", "attack of {} dodged", amount);
            return HeroHit::Dodged;
        }

        let dealt = actual_damage(amount, self.defense);
        self.health = self.health.saturating_sub(dealt);
        let away = if source_x > self.pos.x { -1.0 } else { 1.0 };
        self.vel.x = away * self.tuning.knockback_speed;
        self.knockback_until = now + self.tuning.knockback_ms;
        fx.show(self.pos, Effect::DamageNumber { amount: dealt, on_hero: true });
        info!(
            target: "player_damage",
            "hero takes {} ({} after defense), hp={}/{}",
            amount, dealt, self.health, self.max_health
        );

        if self.health == 0 {
            self.die();
            HeroHit::Killed { dealt }
        } else {
            HeroHit::Hit { dealt }
        }
    }

    /// Returns the number of levels gained.
    pub fn add_experience(&mut self, amount: u32) -> u32 {
        if self.dead {
            return 0;
        }
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while self.experience >= self.experience_to_next_level && self.experience_to_next_level > 0 {
            self.level_up();
            gained += 1;
        }
        gained
    }

    pub fn level_up(&mut self) {
        if self.dead {
            return;
        }
        self.level += 1;
        self.experience = self.experience.saturating_sub(self.experience_to_next_level);
        let next = u64::from(self.experience_to_next_level) * 3 / 2;
        self.experience_to_next_level = u32::try_from(next).unwrap_or(u32::MAX);

        self.max_health += 20;
        self.health = self.max_health;
        self.attack += 5;
        self.defense += 2;
        if self.level % 3 == 0 {
            self.jump_speed += 50.0;
            self.speed += 20.0;
        }
        if self.level % 5 == 0 {
            self.max_jumps += 1;
        }
        info!(target: "game_state", "hero reached level {}", self.level);
    }

    /// Idempotent. Returns `true` only on the first call.
    pub fn die(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.dead = true;
        self.health = 0;
        self.vel = Vec2::default();
        info!(target: "game_state", "hero died at level {}", self.level);
        true
    }
}
