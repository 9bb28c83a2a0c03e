/// Visual feedback requested by the simulation.
///
/// The simulation never talks to a renderer directly. It hands `Effect`
/// values to an `EffectSink` through `Effects`, which filters them by the
/// current density and swallows backend failures after logging them. State
/// changes are always committed before an effect is requested, so a failing
/// backend can never leave gameplay half-applied.

use log::warn;

use crate::entities::{EnemyKind, Vec2};
use crate::error::EffectError;

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    WaveBanner { wave: u32 },
    DamageNumber { amount: u32, on_hero: bool },
    Dodged,
    Heal { amount: u32 },
    LevelUp { level: u32 },
    EnemyDeath { kind: EnemyKind },
    /// Short ability callout such as "Berserk!".
    Callout(&'static str),
    Shockwave { radius: f32 },
    ShotTrail { to: Vec2 },
    Spark,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EffectPriority {
    Essential,
    Feedback,
    Cosmetic,
}

impl Effect {
    pub fn priority(&self) -> EffectPriority {
        match self {
            Effect::WaveBanner { .. } | Effect::LevelUp { .. } => EffectPriority::Essential,
            Effect::DamageNumber { .. }
            | Effect::Dodged
            | Effect::Heal { .. }
            | Effect::EnemyDeath { .. }
            | Effect::Callout(_) => EffectPriority::Feedback,
            Effect::Shockwave { .. } | Effect::ShotTrail { .. } | Effect::Spark => {
                EffectPriority::Cosmetic
            }
        }
    }
}

/// How much visual feedback is allowed through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EffectDensity {
    #[default]
    Full,
    /// Drops cosmetic particles.
    Reduced,
    /// Essential notices only.
    Minimal,
}

impl EffectDensity {
    pub fn allows(self, priority: EffectPriority) -> bool {
        match self {
            EffectDensity::Full => true,
            EffectDensity::Reduced => priority <= EffectPriority::Feedback,
            EffectDensity::Minimal => priority == EffectPriority::Essential,
        }
    }
}

// ── Backend contract ─────────────────────────────────────────────────────────

pub trait EffectSink {
    fn show(&mut self, at: Vec2, effect: &Effect) -> Result<(), EffectError>;
}

/// Discards everything. Used when no renderer is attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEffects;

impl EffectSink for NullEffects {
    fn show(&mut self, _at: Vec2, _effect: &Effect) -> Result<(), EffectError> {
        Ok(())
    }
}

/// Records every effect in order.
impl EffectSink for Vec<(Vec2, Effect)> {
    fn show(&mut self, at: Vec2, effect: &Effect) -> Result<(), EffectError> {
        self.push((at, effect.clone()));
        Ok(())
    }
}

// ── Safe facade ──────────────────────────────────────────────────────────────

pub struct Effects<'a> {
    sink: &'a mut dyn EffectSink,
    density: EffectDensity,
    failures: u32,
}

impl<'a> Effects<'a> {
    pub fn new(sink: &'a mut dyn EffectSink, density: EffectDensity) -> Self {
        Effects { sink, density, failures: 0 }
    }

    pub fn show(&mut self, at: Vec2, effect: Effect) {
        if !self.density.allows(effect.priority()) {
            return;
        }
        if let Err(err) = self.sink.show(at, &effect) {
            self.failures += 1;
            warn!(target: "effects", "dropping {:?}: {}", effect, err);
        }
    }

    pub fn density(&self) -> EffectDensity {
        self.density
    }

    /// Backend failures swallowed so far.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}
