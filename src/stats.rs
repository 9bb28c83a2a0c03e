/// Stat scaling and type-weight math. Pure functions only.

use crate::entities::EnemyKind;

// ── Growth curves ────────────────────────────────────────────────────────────

pub const HEALTH_GROWTH: f64 = 1.15;
pub const DAMAGE_GROWTH: f64 = 1.10;
pub const SPEED_GROWTH: f64 = 1.05;
pub const EXPERIENCE_GROWTH: f64 = 1.10;

/// Per-wave shift applied to base spawn weights (scaled per kind).
pub const WAVE_WEIGHT_BONUS: f64 = 0.03;

/// `floor(base * multiplier * growth^(wave - 1))`. Wave 0 is treated as wave 1.
pub fn scaled_stat(base: f64, type_multiplier: f64, wave: u32, growth: f64) -> u32 {
    let exponent = wave.max(1) - 1;
    let value = base * type_multiplier * growth.powi(exponent as i32);
    if value.is_finite() && value > 0.0 {
        value.floor().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Damage after defense, never below 1.
pub fn actual_damage(amount: u32, defense: u32) -> u32 {
    amount.saturating_sub(defense).max(1)
}

// ── Type weights ─────────────────────────────────────────────────────────────

/// Spawn weights for `wave`, indexed by `EnemyKind::index`, summing to 1.0.
pub fn normalized_type_weights(wave: u32) -> [f64; 6] {
    let bonus = f64::from(wave.max(1) - 1) * WAVE_WEIGHT_BONUS;
    let mut weights = [0.0; 6];
    for kind in EnemyKind::ALL {
        let def = kind.definition();
        weights[kind.index()] = (def.spawn_weight + bonus * def.wave_weight_factor).max(0.0);
    }

    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        for w in weights.iter_mut() {
            *w /= total;
        }
    } else {
        weights[EnemyKind::Standard.index()] = 1.0;
    }
    weights
}

/// Pick a kind from `weights` with a roll in `[0, 1)`.
///
/// Kinds are scanned in `EnemyKind::SPAWN_ORDER` with a strict `<`, so a roll
/// landing exactly on a boundary belongs to the next kind. Rounding at the top
/// end falls back to the last kind with a non-zero weight.
pub fn sample_kind(weights: &[f64; 6], roll: f64) -> EnemyKind {
    let mut cumulative = 0.0;
    let mut fallback = EnemyKind::Standard;
    for kind in EnemyKind::SPAWN_ORDER {
        let w = weights[kind.index()];
        if w <= 0.0 {
            continue;
        }
        fallback = kind;
        cumulative += w;
        if roll < cumulative {
            return kind;
        }
    }
    fallback
}
