/// Shared game entity types: plain data with small geometric helpers.
///
/// Stateful actors (`Enemy`, `Hero`) live in their own modules; everything
/// here is cheap to copy and carries no behaviour beyond simple math.

// ── Geometry ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero-length input.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len <= f32::EPSILON {
            Vec2::default()
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }
}

/// Axis-aligned box described by its centre and full size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(center: Vec2, width: f32, height: f32) -> Self {
        Rect { center, width, height }
    }

    pub fn scaled(self, factor: f32) -> Rect {
        Rect::new(self.center, self.width * factor, self.height * factor)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        (self.center.x - other.center.x).abs() * 2.0 < self.width + other.width
            && (self.center.y - other.center.y).abs() * 2.0 < self.height + other.height
    }
}

// ── Enemy types ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Minion,
    Standard,
    Tank,
    Berserker,
    Ranged,
    Boss,
}

/// Static per-kind record. Multipliers apply on top of the wave's base stats.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyTypeDefinition {
    pub name: &'static str,
    pub health_multiplier: f64,
    pub damage_multiplier: f64,
    pub speed_multiplier: f64,
    pub experience_multiplier: f64,
    /// Base spawn weight at wave 1.
    pub spawn_weight: f64,
    /// Multiplier applied to the per-wave weight bonus (negative shrinks).
    pub wave_weight_factor: f64,
    pub defense: u32,
    /// Vertical offset from the standard spawn row (positive = lower).
    pub y_offset: f32,
    pub horizontal_only: bool,
    pub ranged: bool,
    /// Cosmetic size factor; also scales the hitbox.
    pub scale: f32,
}

const MINION: EnemyTypeDefinition = EnemyTypeDefinition {
    name: "Spiderling",
    health_multiplier: 0.6,
    damage_multiplier: 0.7,
    speed_multiplier: 1.5,
    experience_multiplier: 0.5,
    spawn_weight: 0.40,
    wave_weight_factor: -0.5,
    defense: 5,
    y_offset: 10.0,
    horizontal_only: false,
    ranged: false,
    scale: 0.6,
};

const STANDARD: EnemyTypeDefinition = EnemyTypeDefinition {
    name: "Goblin",
    health_multiplier: 1.0,
    damage_multiplier: 1.0,
    speed_multiplier: 1.0,
    experience_multiplier: 1.0,
    spawn_weight: 0.25,
    wave_weight_factor: -0.3,
    defense: 5,
    y_offset: 0.0,
    horizontal_only: false,
    ranged: false,
    scale: 0.8,
};

const TANK: EnemyTypeDefinition = EnemyTypeDefinition {
    name: "Orc",
    health_multiplier: 2.0,
    damage_multiplier: 0.8,
    speed_multiplier: 0.6,
    experience_multiplier: 1.5,
    spawn_weight: 0.20,
    wave_weight_factor: 0.5,
    defense: 15,
    y_offset: 0.0,
    horizontal_only: true,
    ranged: false,
    scale: 1.0,
};

const BERSERKER: EnemyTypeDefinition = EnemyTypeDefinition {
    name: "Berserker",
    health_multiplier: 0.8,
    damage_multiplier: 1.7,
    speed_multiplier: 1.3,
    experience_multiplier: 1.3,
    spawn_weight: 0.10,
    wave_weight_factor: 0.7,
    defense: 5,
    y_offset: 0.0,
    horizontal_only: false,
    ranged: false,
    scale: 0.85,
};

const RANGED: EnemyTypeDefinition = EnemyTypeDefinition {
    name: "Archer",
    health_multiplier: 0.7,
    damage_multiplier: 1.2,
    speed_multiplier: 0.9,
    experience_multiplier: 1.2,
    spawn_weight: 0.15,
    wave_weight_factor: 0.6,
    defense: 5,
    y_offset: 0.0,
    horizontal_only: false,
    ranged: true,
    scale: 0.75,
};

const BOSS: EnemyTypeDefinition = EnemyTypeDefinition {
    name: "Boss",
    health_multiplier: 4.0,
    damage_multiplier: 2.0,
    speed_multiplier: 0.7,
    experience_multiplier: 3.0,
    spawn_weight: 0.05,
    wave_weight_factor: 1.0,
    defense: 25,
    y_offset: -20.0,
    horizontal_only: true,
    ranged: false,
    scale: 1.2,
};

impl EnemyKind {
    pub const ALL: [EnemyKind; 6] = [
        EnemyKind::Minion,
        EnemyKind::Standard,
        EnemyKind::Tank,
        EnemyKind::Berserker,
        EnemyKind::Ranged,
        EnemyKind::Boss,
    ];

    /// Order in which cumulative weights are scanned when rolling a kind.
    pub const SPAWN_ORDER: [EnemyKind; 6] = [
        EnemyKind::Boss,
        EnemyKind::Berserker,
        EnemyKind::Ranged,
        EnemyKind::Tank,
        EnemyKind::Standard,
        EnemyKind::Minion,
    ];

    pub fn definition(self) -> &'static EnemyTypeDefinition {
        match self {
            EnemyKind::Minion => &MINION,
            EnemyKind::Standard => &STANDARD,
            EnemyKind::Tank => &TANK,
            EnemyKind::Berserker => &BERSERKER,
            EnemyKind::Ranged => &RANGED,
            EnemyKind::Boss => &BOSS,
        }
    }

    pub fn index(self) -> usize {
        match self {
            EnemyKind::Minion => 0,
            EnemyKind::Standard => 1,
            EnemyKind::Tank => 2,
            EnemyKind::Berserker => 3,
            EnemyKind::Ranged => 4,
            EnemyKind::Boss => 5,
        }
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

/// An enemy-owned projectile. Expires after `lifespan_ms` or off-world.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: u32,
    pub created_at: u64,
    pub lifespan_ms: u64,
}

impl Projectile {
    pub const LIFESPAN_MS: u64 = 3000;
    pub const SIZE: f32 = 10.0;

    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.created_at) >= self.lifespan_ms
    }

    pub fn hitbox(&self) -> Rect {
        Rect::new(self.pos, Self::SIZE, Self::SIZE)
    }
}

// ── Cosmetic weapon ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weapon {
    Sword,
    Axe,
    Staff,
    Bow,
}

impl Weapon {
    pub fn next(self) -> Weapon {
        match self {
            Weapon::Sword => Weapon::Axe,
            Weapon::Axe => Weapon::Staff,
            Weapon::Staff => Weapon::Bow,
            Weapon::Bow => Weapon::Sword,
        }
    }
}

// ── Session status ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
}
