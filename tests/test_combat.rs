use wave_brawler::combat::*;
use wave_brawler::config::GameConfig;
use wave_brawler::director::EnemyDirector;
use wave_brawler::effects::*;
use wave_brawler::entities::*;
use wave_brawler::events::GameEvent;
use wave_brawler::hero::Hero;
use wave_brawler::pool::SlotId;

use rand::rngs::StdRng;
use rand::SeedableRng;

struct Fixture {
    config: GameConfig,
    hero: Hero,
    director: EnemyDirector,
    combat: CombatResolver,
    rng: StdRng,
    events: Vec<GameEvent>,
}

impl Fixture {
    fn new() -> Self {
        let mut config = GameConfig::default();
        config.enemies.spawn_interval_ms = 1_000_000;
        config.enemies.wave_duration_ms = 1_000_000_000;
        Fixture {
            hero: Hero::new(&config.hero, &config.world),
            director: EnemyDirector::new(&config),
            combat: CombatResolver::new(&config.combat),
            rng: StdRng::seed_from_u64(42),
            events: Vec::new(),
            config,
        }
    }

    /// Spawns an enemy and pins it at `(x, y)` with fixed melee stats.
    fn place(&mut self, x: f32, y: f32, attack: u32) -> SlotId {
        let id = self.director.spawn_enemy(0, &mut self.rng, &mut self.events).unwrap();
        let enemy = self.director.enemy_mut(id).unwrap();
        enemy.pos = Vec2::new(x, y);
        enemy.attack = attack;
        enemy.attack_cooldown_ms = 1000;
        enemy.defense = 0;
        enemy.health = 100;
        enemy.max_health = 100;
        id
    }

    fn resolve(&mut self, now: u64) -> Option<PassReport> {
        let mut sink = NullEffects;
        let mut fx = Effects::new(&mut sink, EffectDensity::Full);
        self.combat.resolve(now, &mut self.hero, &mut self.director, &mut fx, &mut self.events)
    }

    fn shoot(&mut self, now: u64) -> Option<SlotId> {
        let mut sink = NullEffects;
        let mut fx = Effects::new(&mut sink, EffectDensity::Full);
        self.combat.player_shoot(now, &mut self.hero, &self.director, &mut fx)
    }

    fn advance(&mut self, now: u64) -> Vec<wave_brawler::enemy::DeathReport> {
        let mut sink = NullEffects;
        let mut fx = Effects::new(&mut sink, EffectDensity::Full);
        self.combat.advance_shots(now, &mut self.director, &mut fx)
    }
}

// ── Enemy melee pass ──────────────────────────────────────────────────────────

#[test]
fn simultaneous_attacks_are_capped() {
    let mut a = Fixture::new();
    let (x, y) = (a.hero.pos.x, a.hero.pos.y);
    for i in 0..5 {
        a.place(x + i as f32 * 5.0, y, 30);
    }
    let report = a.resolve(0).unwrap();
    assert_eq!(report.melee_attacks, 3);
    assert_eq!(report.damage_taken, 60);
    assert_eq!(a.hero.health, 140);
    let hits = a
        .events
        .iter()
        .filter(|e| matches!(e, GameEvent::HeroDamaged { .. }))
        .count();
    assert_eq!(hits, 3);
}

#[test]
fn passes_are_throttled() {
    let mut a = Fixture::new();
    let (x, y) = (a.hero.pos.x, a.hero.pos.y);
    for _ in 0..5 {
        a.place(x, y, 30);
    }
    assert!(a.resolve(0).is_some());
    assert!(a.resolve(10).is_none());
    assert!(a.resolve(49).is_none());
    // the two enemies left out of the first pass get their turn
    assert_eq!(a.resolve(50).unwrap().melee_attacks, 2);
}

#[test]
fn each_enemy_waits_for_its_cooldown() {
    let mut a = Fixture::new();
    let (x, y) = (a.hero.pos.x, a.hero.pos.y);
    a.place(x + 20.0, y, 30);
    assert_eq!(a.resolve(0).unwrap().melee_attacks, 1);
    assert_eq!(a.resolve(500).unwrap().melee_attacks, 0);
    assert_eq!(a.resolve(1000).unwrap().melee_attacks, 1);
}

#[test]
fn distant_enemies_do_not_strike() {
    let mut a = Fixture::new();
    let (x, y) = (a.hero.pos.x, a.hero.pos.y);
    a.place(x + 70.0, y, 30);
    a.place(x + 200.0, y, 30);
    assert!(a.combat.enemies_in_range(&a.hero, &a.director).is_empty());
    assert_eq!(a.resolve(0).unwrap().melee_attacks, 0);
    assert_eq!(a.hero.health, 200);
}

#[test]
fn in_range_is_sorted_nearest_first() {
    let mut a = Fixture::new();
    let (x, y) = (a.hero.pos.x, a.hero.pos.y);
    let far = a.place(x + 50.0, y, 30);
    let near = a.place(x + 10.0, y, 30);
    assert_eq!(a.combat.enemies_in_range(&a.hero, &a.director), vec![near, far]);
}

#[test]
fn dodging_hero_takes_nothing() {
    let mut a = Fixture::new();
    let (x, y) = (a.hero.pos.x, a.hero.pos.y);
    a.place(x, y, 30);
    a.hero.dodge(0);
    let report = a.resolve(0).unwrap();
    assert_eq!(report.dodged, 1);
    assert_eq!(report.damage_taken, 0);
    assert_eq!(a.hero.health, 200);
    assert!(a.events.contains(&GameEvent::HeroDodged));
}

#[test]
fn dead_hero_is_left_alone() {
    let mut a = Fixture::new();
    let (x, y) = (a.hero.pos.x, a.hero.pos.y);
    a.place(x, y, 30);
    a.hero.die();
    assert_eq!(a.resolve(0), Some(PassReport::default()));
}

#[test]
fn projectiles_hit_the_hero() {
    let mut a = Fixture::new();
    let hero_pos = a.hero.pos;
    let id = a.place(700.0, hero_pos.y, 30);
    a.director.enemy_mut(id).unwrap().projectiles.push(Projectile {
        pos: hero_pos,
        vel: Vec2::default(),
        damage: 22,
        created_at: 0,
        lifespan_ms: Projectile::LIFESPAN_MS,
    });
    let report = a.resolve(0).unwrap();
    assert_eq!(report.projectile_hits, 1);
    assert_eq!(report.damage_taken, 12);
    assert!(a.director.enemy(id).unwrap().projectiles.is_empty());
}

// ── Player shots ──────────────────────────────────────────────────────────────

#[test]
fn shot_lands_after_travel_time() {
    let mut a = Fixture::new();
    let id = a.place(400.0, 475.0, 10);
    a.combat.set_aim(Vec2::new(400.0, 475.0));
    assert_eq!(a.shoot(0), Some(id));
    assert_eq!(a.combat.shots_in_flight(), 1);

    assert!(a.advance(100).is_empty());
    assert_eq!(a.director.enemy(id).unwrap().health, 100);
    a.advance(200);
    assert_eq!(a.director.enemy(id).unwrap().health, 75);
    assert_eq!(a.combat.shots_in_flight(), 0);
}

#[test]
fn killing_shot_reports_death_once() {
    let mut a = Fixture::new();
    let id = a.place(400.0, 475.0, 10);
    a.director.enemy_mut(id).unwrap().health = 10;
    a.combat.set_aim(Vec2::new(400.0, 475.0));
    a.shoot(0);
    let deaths = a.advance(200);
    assert_eq!(deaths.len(), 1);
    assert!(a.director.enemy(id).unwrap().is_dead());
    assert!(a.advance(300).is_empty());
}

#[test]
fn nothing_to_shoot_keeps_cooldown_ready() {
    let mut a = Fixture::new();
    a.combat.set_aim(Vec2::new(400.0, 475.0));
    assert!(a.shoot(0).is_none());
    assert_eq!(a.combat.shots_in_flight(), 0);
    assert!(a.hero.try_attack(0));
}

#[test]
fn shots_respect_both_cooldowns() {
    let mut a = Fixture::new();
    a.place(400.0, 475.0, 10);
    a.combat.set_aim(Vec2::new(400.0, 475.0));
    assert!(a.shoot(0).is_some());
    assert!(a.shoot(300).is_none()); // shot cooldown
    assert!(a.shoot(600).is_none()); // hero attack cooldown
    assert!(a.shoot(800).is_some());
}

#[test]
fn manual_radius_applies_without_auto_aim() {
    let mut a = Fixture::new();
    a.place(400.0, 475.0, 10);
    a.combat.toggle_auto_aim();
    a.combat.set_aim(Vec2::new(330.0, 475.0)); // 70px off, default radius 50
    assert!(a.shoot(0).is_none());
    a.combat.adjust_targeting_radius(3); // 80
    assert!(a.shoot(0).is_some());
}

#[test]
fn stale_target_is_not_hit() {
    let mut a = Fixture::new();
    let id = a.place(400.0, 475.0, 10);
    a.combat.set_aim(Vec2::new(400.0, 475.0));
    a.shoot(0);

    let report = a.director.enemy_mut(id).unwrap().die(wave_brawler::enemy::DeathCause::Slain);
    a.director.enemy_killed(&report.unwrap());
    let fresh = a.place(400.0, 475.0, 10);
    assert_eq!(fresh.index, id.index);

    assert!(a.advance(200).is_empty());
    assert_eq!(a.director.enemy(fresh).unwrap().health, 100);
}

#[test]
fn performance_mode_shortens_travel() {
    let mut a = Fixture::new();
    let id = a.place(400.0, 475.0, 10);
    a.combat.set_performance_mode(true);
    a.combat.set_aim(Vec2::new(400.0, 475.0));
    a.shoot(0);
    assert_eq!(a.combat.shots().next().unwrap().lands_at, 100);
    a.advance(100);
    assert_eq!(a.director.enemy(id).unwrap().health, 75);
}

#[test]
fn auto_fire_targets_nearest_to_hero() {
    let mut a = Fixture::new();
    let near = a.place(400.0, 475.0, 10);
    a.place(550.0, 475.0, 10);
    let mut sink = NullEffects;
    let mut fx = Effects::new(&mut sink, EffectDensity::Full);
    assert_eq!(a.combat.auto_fire(0, &mut a.hero, &a.director, &mut fx), Some(near));
}

#[test]
fn auto_fire_ignores_far_enemies() {
    let mut a = Fixture::new();
    a.place(700.0, 475.0, 10);
    let mut sink = NullEffects;
    let mut fx = Effects::new(&mut sink, EffectDensity::Full);
    assert!(a.combat.auto_fire(0, &mut a.hero, &a.director, &mut fx).is_none());
}

// ── Aim ───────────────────────────────────────────────────────────────────────

#[test]
fn auto_aim_eases_toward_target() {
    let mut a = Fixture::new();
    a.place(400.0, 475.0, 10);
    a.combat.set_aim(Vec2::new(300.0, 475.0));
    a.combat.update_aim(&a.hero, &a.director, None);
    assert!((a.combat.aim().x - 320.0).abs() < 1e-3);
}

#[test]
fn aim_rests_ahead_of_hero() {
    let mut a = Fixture::new();
    a.combat.set_aim(Vec2::new(350.0, 475.0));
    a.combat.update_aim(&a.hero, &a.director, None);
    assert_eq!(a.combat.aim(), Vec2::new(350.0, 475.0)); // already there
}

#[test]
fn pointer_overrides_aim_when_auto_aim_off() {
    let mut a = Fixture::new();
    a.combat.toggle_auto_aim();
    let p = Vec2::new(500.0, 300.0);
    a.combat.update_aim(&a.hero, &a.director, Some(p));
    assert_eq!(a.combat.aim(), p);
}

#[test]
fn targeting_radius_is_clamped() {
    let mut a = Fixture::new();
    assert_eq!(a.combat.targeting_radius(), 50.0);
    assert_eq!(a.combat.adjust_targeting_radius(20), 150.0);
    assert_eq!(a.combat.adjust_targeting_radius(-100), 10.0);
    assert_eq!(a.config.combat.min_targeting_radius, 10.0);
}
