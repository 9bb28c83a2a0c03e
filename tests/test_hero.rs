use wave_brawler::config::{HeroConfig, WorldConfig};
use wave_brawler::effects::*;
use wave_brawler::entities::*;
use wave_brawler::hero::*;
use wave_brawler::input::{Action, ActionState};

fn make_hero() -> Hero {
    Hero::new(&HeroConfig::default(), &WorldConfig::default())
}

fn hit(hero: &mut Hero, amount: u32, source_x: f32, now: u64) -> HeroHit {
    let mut sink = NullEffects;
    let mut fx = Effects::new(&mut sink, EffectDensity::Full);
    hero.take_damage(amount, source_x, now, &mut fx)
}

// ── Construction ──────────────────────────────────────────────────────────────

#[test]
fn starts_on_the_ground_at_full_health() {
    let hero = make_hero();
    assert_eq!(hero.pos, Vec2::new(200.0, 475.0)); // ground 500 - half height
    assert_eq!(hero.health, 200);
    assert_eq!(hero.level, 1);
    assert_eq!(hero.experience_to_next_level, 100);
    assert!(hero.grounded);
    assert_eq!(hero.weapon, Weapon::Sword);
}

// ── Damage ────────────────────────────────────────────────────────────────────

#[test]
fn defense_reduces_damage() {
    let mut hero = make_hero();
    assert_eq!(hit(&mut hero, 25, 300.0, 0), HeroHit::Hit { dealt: 15 });
    assert_eq!(hero.health, 185);
}

#[test]
fn weak_hits_still_deal_one() {
    let mut hero = make_hero();
    assert_eq!(hit(&mut hero, 5, 300.0, 0), HeroHit::Hit { dealt: 1 });
    assert_eq!(hero.health, 199);
}

#[test]
fn overkill_clamps_to_zero_and_kills() {
    let mut hero = make_hero();
    assert_eq!(hit(&mut hero, 1000, 300.0, 0), HeroHit::Killed { dealt: 990 });
    assert_eq!(hero.health, 0);
    assert!(hero.dead);
    assert_eq!(hit(&mut hero, 10, 300.0, 500), HeroHit::Ignored);
}

#[test]
fn knockback_pushes_away_from_source() {
    let mut hero = make_hero();
    hit(&mut hero, 20, 300.0, 0);
    assert_eq!(hero.vel.x, -100.0);

    hero.set_move(1.0, 100); // locked out
    assert_eq!(hero.vel.x, -100.0);
    hero.set_move(1.0, 300);
    assert_eq!(hero.vel.x, 300.0);

    let mut other = make_hero();
    hit(&mut other, 20, 100.0, 0);
    assert_eq!(other.vel.x, 100.0);
}

#[test]
fn die_is_idempotent() {
    let mut hero = make_hero();
    assert!(hero.die());
    assert!(!hero.die());
    assert_eq!(hero.health, 0);
}

// ── Dodge ─────────────────────────────────────────────────────────────────────

#[test]
fn dodge_grants_invincibility_window() {
    let mut hero = make_hero();
    assert!(hero.dodge(0));
    assert_eq!(hit(&mut hero, 50, 300.0, 100), HeroHit::Dodged);
    assert_eq!(hero.health, 200);
    assert_eq!(hit(&mut hero, 50, 300.0, 300), HeroHit::Hit { dealt: 40 });
}

#[test]
fn dodge_has_cooldown() {
    let mut hero = make_hero();
    assert!(hero.dodge(0));
    assert!(!hero.dodge(500));
    assert!(hero.dodge(1000));
}

#[test]
fn dodge_overrides_directional_input() {
    let mut hero = make_hero();
    hero.dodge(0);
    let dash = hero.vel.x;
    assert!((dash - 500.0).abs() < 0.01); // 150px over 0.3s, facing right
    hero.set_move(-1.0, 100);
    assert_eq!(hero.vel.x, dash);
    assert!(hero.is_dodging(100));
    assert!(!hero.is_dodging(300));
}

#[test]
fn dodge_ends_in_update() {
    let mut hero = make_hero();
    hero.dodge(0);
    hero.update(300, 0.0);
    assert_eq!(hero.vel.x, 0.0);
}

// ── Jumping ───────────────────────────────────────────────────────────────────

#[test]
fn double_jump_then_buffer() {
    let mut hero = make_hero();
    assert!(hero.jump(0));
    assert_eq!(hero.vel.y, -600.0);
    assert_eq!(hero.jump_count, 1);
    assert!(hero.jump(50));
    assert_eq!(hero.jump_count, 2);
    assert!(!hero.jump(60));
}

#[test]
fn coyote_time_allows_late_jump() {
    let mut hero = make_hero();
    hero.leave_ground(0);
    assert!(hero.jump(100));

    let mut late = make_hero();
    late.leave_ground(0);
    assert!(!late.jump(200));
}

#[test]
fn buffered_jump_fires_on_landing() {
    let mut hero = make_hero();
    hero.jump(0);
    hero.jump(10);
    hero.pos.y = 470.0;
    hero.vel.y = 300.0;
    assert!(!hero.jump(1000)); // buffered until 1150

    hero.update(1050, 0.05);
    assert!(!hero.grounded);
    assert_eq!(hero.jump_count, 1);
    assert_eq!(hero.vel.y, -600.0);
}

#[test]
fn stale_buffer_is_dropped_on_landing() {
    let mut hero = make_hero();
    hero.jump(0);
    hero.jump(10);
    hero.pos.y = 470.0;
    hero.vel.y = 300.0;
    hero.jump(1000);

    hero.update(1200, 0.05);
    assert!(hero.grounded);
    assert_eq!(hero.jump_count, 0);
    assert_eq!(hero.pos.y, 475.0);
}

#[test]
fn gravity_brings_hero_back_down() {
    let mut hero = make_hero();
    hero.jump(0);
    let mut now = 0;
    for _ in 0..40 {
        now += 33;
        hero.update(now, 0.033);
    }
    assert!(hero.grounded);
    assert_eq!(hero.pos.y, 475.0);
    assert_eq!(hero.jump_count, 0);
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[test]
fn horizontal_position_is_clamped() {
    let mut hero = make_hero();
    hero.set_move(1.0, 0);
    hero.update(0, 10.0);
    assert_eq!(hero.pos.x, 600.0);
    hero.set_move(-1.0, 0);
    hero.update(0, 10.0);
    assert_eq!(hero.pos.x, 150.0);
    assert!(hero.facing_left);
}

#[test]
fn move_toward_stops_inside_attack_range() {
    let mut hero = make_hero();
    hero.move_toward(500.0, 0);
    assert_eq!(hero.vel.x, 300.0);
    hero.move_toward(260.0, 0);
    assert_eq!(hero.vel.x, 0.0);
    hero.move_toward(150.0, 0);
    assert_eq!(hero.vel.x, 0.0);
    assert!(hero.facing_left);
}

#[test]
fn control_reads_held_and_pressed_actions() {
    let mut hero = make_hero();
    let mut input = ActionState::new();
    input.press(Action::MoveLeft);
    input.press(Action::Jump);
    hero.control(0, &input);
    assert_eq!(hero.vel.x, -300.0);
    assert_eq!(hero.jump_count, 1);

    input.end_tick();
    hero.control(10, &input); // jump still held, not pressed again
    assert_eq!(hero.jump_count, 1);
}

#[test]
fn attack_cooldown() {
    let mut hero = make_hero();
    assert!(hero.try_attack(0));
    assert!(!hero.try_attack(799));
    assert!(hero.try_attack(800));
}

#[test]
fn cycle_weapon_wraps() {
    let mut hero = make_hero();
    assert_eq!(hero.cycle_weapon(), Weapon::Axe);
    hero.cycle_weapon();
    hero.cycle_weapon();
    assert_eq!(hero.cycle_weapon(), Weapon::Sword);
}

// ── Experience ────────────────────────────────────────────────────────────────

#[test]
fn experience_cascades_through_levels() {
    let mut hero = make_hero();
    assert_eq!(hero.add_experience(300), 2);
    assert_eq!(hero.level, 3);
    assert_eq!(hero.experience, 50);
    assert_eq!(hero.experience_to_next_level, 225);
}

#[test]
fn huge_experience_grants_saturate_instead_of_overflowing() {
    let mut hero = make_hero();
    hero.add_experience(u32::MAX);
    let level = hero.level;
    assert!(level > 1);
    assert!(hero.experience < hero.experience_to_next_level);

    hero.add_experience(u32::MAX);
    assert!(hero.level > level);
    assert!(hero.experience_to_next_level > 0);
    assert!(hero.experience <= hero.experience_to_next_level);
}

#[test]
fn level_up_improves_stats() {
    let mut hero = make_hero();
    hit(&mut hero, 50, 300.0, 0);
    hero.level_up();
    assert_eq!(hero.max_health, 220);
    assert_eq!(hero.health, 220);
    assert_eq!(hero.attack, 30);
    assert_eq!(hero.defense, 12);

    hero.level_up(); // level 3
    assert_eq!(hero.speed, 320.0);
    assert_eq!(hero.jump_speed, 650.0);
}

#[test]
fn fifth_level_adds_a_jump() {
    let mut hero = make_hero();
    for _ in 0..4 {
        hero.level_up();
    }
    assert_eq!(hero.level, 5);
    assert_eq!(hero.max_jumps, 3);
}

#[test]
fn dead_hero_gains_nothing() {
    let mut hero = make_hero();
    hero.die();
    assert_eq!(hero.add_experience(500), 0);
    assert_eq!(hero.experience, 0);
    assert_eq!(hero.level, 1);
}
