/// One play session: the hero, the director, the resolver and the governor,
/// owned together and advanced in a fixed order by `tick`.
///
/// Tick order:
/// 1. input toggles (auto mode, performance mode, auto-aim, radius, weapon)
/// 2. hero control and physics
/// 3. director (wave timer, burst timer, staggered spawns, sweep)
/// 4. enemy updates
/// 5. combat (aim, player shots, landed shots, throttled enemy pass)
/// 6. death bookkeeping (experience, kill counters, score)
/// 7. governor sampling

use log::info;
use rand::Rng;

use crate::combat::CombatResolver;
use crate::config::GameConfig;
use crate::director::EnemyDirector;
use crate::effects::{Effect, EffectSink, Effects};
use crate::enemy::{DeathCause, DeathReport};
use crate::entities::GameStatus;
use crate::events::GameEvent;
use crate::governor::PerformanceGovernor;
use crate::hero::Hero;
use crate::input::{Action, ActionInput};

/// Longest step the physics will integrate in one tick.
const MAX_DT: f32 = 0.1;

pub struct GameSession {
    pub config: GameConfig,
    pub hero: Hero,
    pub director: EnemyDirector,
    pub combat: CombatResolver,
    pub governor: PerformanceGovernor,
    pub status: GameStatus,
    pub auto_mode: bool,
    pub score: u32,
    events: Vec<GameEvent>,
    last_tick_at: Option<u64>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        let hero = Hero::new(&config.hero, &config.world);
        let director = EnemyDirector::new(&config);
        let combat = CombatResolver::new(&config.combat);
        let governor = PerformanceGovernor::new(&config.performance, config.enemies.max_on_screen);
        info!(target: "game_state", "session created");
        GameSession {
            hero,
            director,
            combat,
            governor,
            status: GameStatus::Playing,
            auto_mode: false,
            score: 0,
            events: Vec::new(),
            last_tick_at: None,
            config,
        }
    }

    /// Events raised by the most recent tick.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn tick(
        &mut self,
        now: u64,
        input: &dyn ActionInput,
        rng: &mut impl Rng,
        sink: &mut dyn EffectSink,
    ) {
        self.events.clear();
        let dt = match self.last_tick_at {
            Some(last) => (now.saturating_sub(last) as f32 / 1000.0).min(MAX_DT),
            None => 0.0,
        };
        self.last_tick_at = Some(now);
        if self.status == GameStatus::GameOver {
            return;
        }

        let mut fx = Effects::new(sink, self.governor.effect_density());

        self.apply_toggles(input);

        // ── Hero ─────────────────────────────────────────────────────────────
        if self.auto_mode {
            if let Some(x) = self
                .director
                .find_closest_enemy(self.hero.pos.x)
                .and_then(|id| self.director.enemy(id))
                .map(|e| e.pos.x)
            {
                self.hero.move_toward(x, now);
            } else {
                self.hero.set_move(0.0, now);
            }
            if input.just_pressed(Action::Jump) {
                self.hero.jump(now);
            }
            if input.just_pressed(Action::Dodge) {
                self.hero.dodge(now);
            }
        } else {
            self.hero.control(now, input);
        }
        self.hero.update(now, dt);

        // ── Enemies ──────────────────────────────────────────────────────────
        self.director.update(now, rng, &mut fx, &mut self.events);
        let target = (!self.hero.dead).then_some(self.hero.pos);
        let mut deaths = self.director.update_enemies(now, dt, target, &mut fx);

        // ── Combat ───────────────────────────────────────────────────────────
        self.combat.set_performance_mode(self.governor.performance_mode());
        self.combat.update_aim(&self.hero, &self.director, input.pointer());
        if input.is_active(Action::Attack) {
            self.combat.player_shoot(now, &mut self.hero, &self.director, &mut fx);
        }
        if self.auto_mode {
            self.combat.auto_fire(now, &mut self.hero, &self.director, &mut fx);
        }
        deaths.extend(self.combat.advance_shots(now, &mut self.director, &mut fx));
        self.combat.resolve(now, &mut self.hero, &mut self.director, &mut fx, &mut self.events);

        for report in deaths {
            self.record_death(&report, &mut fx);
        }

        if self.hero.dead {
            self.status = GameStatus::GameOver;
            self.events.push(GameEvent::HeroDied);
            info!(
                target: "game_state",
                "game over on wave {} with score {}",
                self.director.wave_number(),
                self.score
            );
        }

        self.governor.record_frame(now, &mut self.director, &mut self.events);
    }

    fn apply_toggles(&mut self, input: &dyn ActionInput) {
        if input.just_pressed(Action::ToggleAutoMode) {
            self.auto_mode = !self.auto_mode;
            info!(target: "game_state", "auto mode {}", if self.auto_mode { "on" } else { "off" });
            self.events.push(GameEvent::AutoModeChanged { enabled: self.auto_mode });
        }
        if input.just_pressed(Action::TogglePerformanceMode) {
            self.governor.toggle_performance_mode(&mut self.events);
        }
        if input.just_pressed(Action::ToggleAutoAim) {
            let enabled = self.combat.toggle_auto_aim();
            self.events.push(GameEvent::AutoAimChanged { enabled });
        }
        let radius_steps = i32::from(input.just_pressed(Action::RadiusUp))
            - i32::from(input.just_pressed(Action::RadiusDown));
        if radius_steps != 0 {
            let radius = self.combat.adjust_targeting_radius(radius_steps);
            self.events.push(GameEvent::TargetingRadiusChanged { radius });
        }
        if input.just_pressed(Action::CycleWeapon) {
            let weapon = self.hero.cycle_weapon();
            self.events.push(GameEvent::WeaponChanged { weapon });
        }
    }

    /// Routes one death report: experience to a living hero, the kill to the
    /// director, points to the score.
    fn record_death(&mut self, report: &DeathReport, fx: &mut Effects) {
        let gained = self.hero.add_experience(report.experience);
        if gained > 0 {
            let level = self.hero.level;
            fx.show(self.hero.pos, Effect::LevelUp { level });
            self.events.push(GameEvent::LevelUp { level });
        }
        self.director.enemy_killed(report);
        if report.cause == DeathCause::Slain {
            self.score += report.experience;
        }
        self.events.push(GameEvent::EnemyKilled {
            kind: report.kind,
            experience: report.experience,
            cause: report.cause,
        });
    }
}
