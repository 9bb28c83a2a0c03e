use wave_brawler::effects::*;
use wave_brawler::entities::{EnemyKind, Vec2};
use wave_brawler::error::EffectError;
use wave_brawler::input::*;

struct BrokenBackend;

impl EffectSink for BrokenBackend {
    fn show(&mut self, _at: Vec2, _effect: &Effect) -> Result<(), EffectError> {
        Err(EffectError::Unavailable)
    }
}

fn sample() -> Vec<Effect> {
    vec![
        Effect::WaveBanner { wave: 2 },
        Effect::DamageNumber { amount: 5, on_hero: false },
        Effect::EnemyDeath { kind: EnemyKind::Tank },
        Effect::Spark,
        Effect::ShotTrail { to: Vec2::new(1.0, 1.0) },
    ]
}

fn shown_with(density: EffectDensity) -> Vec<Effect> {
    let mut shown: Vec<(Vec2, Effect)> = Vec::new();
    {
        let mut fx = Effects::new(&mut shown, density);
        for effect in sample() {
            fx.show(Vec2::default(), effect);
        }
    }
    shown.into_iter().map(|(_, e)| e).collect()
}

// ── Density ───────────────────────────────────────────────────────────────────

#[test]
fn full_density_passes_everything() {
    assert_eq!(shown_with(EffectDensity::Full), sample());
}

#[test]
fn reduced_density_drops_cosmetics() {
    let shown = shown_with(EffectDensity::Reduced);
    assert_eq!(shown.len(), 3);
    assert!(!shown.contains(&Effect::Spark));
}

#[test]
fn minimal_density_keeps_essentials() {
    assert_eq!(shown_with(EffectDensity::Minimal), vec![Effect::WaveBanner { wave: 2 }]);
}

#[test]
fn priorities() {
    assert_eq!(Effect::LevelUp { level: 2 }.priority(), EffectPriority::Essential);
    assert_eq!(Effect::Callout("Berserk!").priority(), EffectPriority::Feedback);
    assert_eq!(Effect::Shockwave { radius: 100.0 }.priority(), EffectPriority::Cosmetic);
}

// ── Backend failures ──────────────────────────────────────────────────────────

#[test]
fn failing_backend_is_contained() {
    let mut backend = BrokenBackend;
    let mut fx = Effects::new(&mut backend, EffectDensity::Full);
    fx.show(Vec2::default(), Effect::Dodged);
    fx.show(Vec2::default(), Effect::Spark);
    assert_eq!(fx.failures(), 2);
}

#[test]
fn filtered_effects_never_reach_a_failing_backend() {
    let mut backend = BrokenBackend;
    let mut fx = Effects::new(&mut backend, EffectDensity::Minimal);
    fx.show(Vec2::default(), Effect::Spark);
    assert_eq!(fx.failures(), 0);
    assert_eq!(fx.density(), EffectDensity::Minimal);
}

// ── Input edges ───────────────────────────────────────────────────────────────

#[test]
fn press_sets_edge_once() {
    let mut input = ActionState::new();
    input.press(Action::Jump);
    assert!(input.is_active(Action::Jump));
    assert!(input.just_pressed(Action::Jump));

    input.end_tick();
    input.press(Action::Jump); // repeat while held
    assert!(input.is_active(Action::Jump));
    assert!(!input.just_pressed(Action::Jump));
}

#[test]
fn release_and_clear() {
    let mut input = ActionState::new();
    input.press(Action::MoveLeft);
    input.press(Action::Attack);
    input.release(Action::MoveLeft);
    assert!(!input.is_active(Action::MoveLeft));
    assert!(input.is_active(Action::Attack));
    input.clear();
    assert!(!input.is_active(Action::Attack));
    assert!(!input.just_pressed(Action::Attack));
}

#[test]
fn pointer_defaults_to_none() {
    let mut input = ActionState::new();
    assert_eq!(input.pointer(), None);
    input.set_pointer(Some(Vec2::new(3.0, 4.0)));
    assert_eq!(input.pointer(), Some(Vec2::new(3.0, 4.0)));
}
