/// Game events raised during a tick, drained by whoever drives the session.

use crate::enemy::DeathCause;
use crate::entities::{EnemyKind, Weapon};

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    WaveChanged { wave: u32 },
    EnemySpawned { kind: EnemyKind },
    EnemyKilled { kind: EnemyKind, experience: u32, cause: DeathCause },
    HeroDamaged { amount: u32, health: u32 },
    HeroDodged,
    LevelUp { level: u32 },
    HeroDied,
    PerformanceModeChanged { enabled: bool },
    AutoModeChanged { enabled: bool },
    AutoAimChanged { enabled: bool },
    TargetingRadiusChanged { radius: f32 },
    WeaponChanged { weapon: Weapon },
}
