/// Rendering layer: all terminal I/O lives here.
///
/// The simulation works in world pixels (800×600 by default); this module
/// maps them onto whatever terminal grid is available. No game logic is
/// performed here. `TerminalEffects` is the effect backend: it turns effect
/// requests into short-lived floating labels.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use wave_brawler::effects::{Effect, EffectSink};
use wave_brawler::enemy::Enemy;
use wave_brawler::entities::{EnemyKind, GameStatus, Vec2, Weapon};
use wave_brawler::error::EffectError;
use wave_brawler::session::GameSession;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_GROUND: Color = Color::DarkGreen;
const C_HUD_WAVE: Color = Color::Cyan;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_LEVEL: Color = Color::Green;
const C_HERO: Color = Color::White;
const C_HERO_DODGE: Color = Color::DarkGrey;
const C_PROJECTILE: Color = Color::Magenta;
const C_SHOT: Color = Color::Cyan;
const C_AIM: Color = Color::DarkYellow;
const C_HINT: Color = Color::DarkGrey;
const C_MODE_ON: Color = Color::Yellow;

/// Frames a floating label stays on screen (≈1 s at 30 FPS).
const LABEL_FRAMES: u32 = 30;
/// Labels kept at once; older ones are dropped first.
const MAX_LABELS: usize = 24;

// ── Effect backend ────────────────────────────────────────────────────────────

struct Label {
    at: Vec2,
    text: String,
    color: Color,
    frames: u32,
}

#[derive(Default)]
pub struct TerminalEffects {
    labels: Vec<Label>,
}

impl TerminalEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ages every label by one frame and drops expired ones.
    pub fn age(&mut self) {
        for label in &mut self.labels {
            label.frames = label.frames.saturating_sub(1);
            label.at.y -= 2.0;
        }
        self.labels.retain(|l| l.frames > 0);
    }
}

impl EffectSink for TerminalEffects {
    fn show(&mut self, at: Vec2, effect: &Effect) -> Result<(), EffectError> {
        let (text, color) = match effect {
            Effect::WaveBanner { wave } => (format!("== WAVE {} ==", wave), Color::Cyan),
            Effect::DamageNumber { amount, on_hero: true } => (format!("-{}", amount), Color::Red),
            Effect::DamageNumber { amount, on_hero: false } => {
                (format!("{}", amount), Color::Yellow)
            }
            Effect::Dodged => ("dodge".to_string(), Color::Grey),
            Effect::Heal { amount } => (format!("+{}", amount), Color::Green),
            Effect::LevelUp { level } => (format!("LEVEL {}!", level), Color::Green),
            Effect::EnemyDeath { .. } => ("x".to_string(), Color::DarkRed),
            Effect::Callout(text) => (text.to_string(), Color::Magenta),
            Effect::Shockwave { .. } => ("~~~~".to_string(), Color::DarkYellow),
            // Shot trails are drawn from the resolver's in-flight shots.
            Effect::ShotTrail { .. } => return Ok(()),
            Effect::Spark => ("*".to_string(), Color::White),
        };
        if self.labels.len() >= MAX_LABELS {
            self.labels.remove(0);
        }
        self.labels.push(Label { at, text, color, frames: LABEL_FRAMES });
        Ok(())
    }
}

// ── World → terminal mapping ─────────────────────────────────────────────────

struct Viewport {
    width: u16,
    height: u16,
    world_w: f32,
    world_h: f32,
}

impl Viewport {
    /// Play area spans rows 2..height-3 and columns 1..width-2.
    fn to_cell(&self, p: Vec2) -> Option<(u16, u16)> {
        if p.x < 0.0 || p.y < 0.0 || p.x >= self.world_w || p.y >= self.world_h {
            return None;
        }
        let cols = self.width.saturating_sub(2) as f32;
        let rows = self.height.saturating_sub(5) as f32;
        let col = 1 + (p.x / self.world_w * cols) as u16;
        let row = 2 + (p.y / self.world_h * rows) as u16;
        Some((col.min(self.width.saturating_sub(2)), row.min(self.height.saturating_sub(3))))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    session: &GameSession,
    effects: &TerminalEffects,
    now: u64,
) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let view = Viewport {
        width,
        height,
        world_w: session.config.world.width,
        world_h: session.config.world.height,
    };

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, &view)?;
    draw_ground(out, session, &view)?;
    draw_hud(out, session, width)?;

    for (_, enemy) in session.director.live_enemies() {
        draw_enemy(out, enemy, &view)?;
    }
    for shot in session.combat.shots() {
        if let Some((col, row)) = view.to_cell(shot.to) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(C_SHOT))?;
            out.queue(Print("✦"))?;
        }
    }
    draw_aim(out, session, &view)?;
    draw_hero(out, session, &view, now)?;
    draw_labels(out, effects, &view)?;
    draw_controls_hint(out, height)?;

    if session.status == GameStatus::GameOver {
        draw_game_over(out, session, width, height)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Frame ─────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.width as usize;
    let h = view.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

fn draw_ground<W: Write>(out: &mut W, session: &GameSession, view: &Viewport) -> std::io::Result<()> {
    let ground = Vec2::new(0.0, session.config.world.ground_level);
    if let Some((_, row)) = view.to_cell(ground) {
        out.queue(cursor::MoveTo(1, row))?;
        out.queue(style::SetForegroundColor(C_GROUND))?;
        out.queue(Print("▔".repeat(view.width.saturating_sub(2) as usize)))?;
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, session: &GameSession, width: u16) -> std::io::Result<()> {
    let hero = &session.hero;

    // Wave and score, left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_WAVE))?;
    out.queue(Print(format!("Wave {:>2}  ", session.director.wave_number())))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>6}  ", session.score)))?;

    // Health bar
    let filled = if hero.max_health == 0 {
        0
    } else {
        (hero.health as usize * 10 + hero.max_health as usize - 1) / hero.max_health as usize
    };
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(format!(
        "HP [{}{}] {}/{}  ",
        "█".repeat(filled),
        "░".repeat(10usize.saturating_sub(filled)),
        hero.health,
        hero.max_health
    )))?;

    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    out.queue(Print(format!(
        "Lv {} ({}/{})",
        hero.level, hero.experience, hero.experience_to_next_level
    )))?;

    // Modes, right
    let mut tags = Vec::new();
    if session.auto_mode {
        tags.push("AUTO".to_string());
    }
    if session.governor.performance_mode() {
        tags.push("PERF".to_string());
    }
    if session.combat.auto_aim() {
        tags.push("AIM".to_string());
    } else {
        tags.push(format!("R{:.0}", session.combat.targeting_radius()));
    }
    tags.push(weapon_name(hero.weapon).to_string());
    let right = format!(
        "[{}] {} foes ",
        tags.join("|"),
        session.director.live_count()
    );
    let rx = width.saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_MODE_ON))?;
    out.queue(Print(&right))?;

    Ok(())
}

fn weapon_name(weapon: Weapon) -> &'static str {
    match weapon {
        Weapon::Sword => "Sword",
        Weapon::Axe => "Axe",
        Weapon::Staff => "Staff",
        Weapon::Bow => "Bow",
    }
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_hero<W: Write>(
    out: &mut W,
    session: &GameSession,
    view: &Viewport,
    now: u64,
) -> std::io::Result<()> {
    let hero = &session.hero;
    let Some((col, row)) = view.to_cell(hero.pos) else { return Ok(()) };
    let dodging = hero.is_invincible(now);
    out.queue(style::SetForegroundColor(if dodging { C_HERO_DODGE } else { C_HERO }))?;

    // Two-row sprite:
    //   o      ← head
    //  /█\     ← body
    out.queue(cursor::MoveTo(col, row.saturating_sub(1)))?;
    out.queue(Print(if hero.dead { "x" } else { "o" }))?;
    out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row))?;
    out.queue(Print(if hero.facing_left { "<█\\" } else { "/█>" }))?;
    Ok(())
}

fn enemy_glyph(kind: EnemyKind) -> (&'static str, Color) {
    match kind {
        EnemyKind::Minion => ("ж", Color::Green),
        EnemyKind::Standard => ("g", Color::White),
        EnemyKind::Tank => ("Ø", Color::DarkYellow),
        EnemyKind::Berserker => ("B", Color::Red),
        EnemyKind::Ranged => ("Ψ", Color::Blue),
        EnemyKind::Boss => ("◆", Color::Yellow),
    }
}

fn draw_enemy<W: Write>(out: &mut W, enemy: &Enemy, view: &Viewport) -> std::io::Result<()> {
    for p in &enemy.projectiles {
        if let Some((col, row)) = view.to_cell(p.pos) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(C_PROJECTILE))?;
            out.queue(Print("•"))?;
        }
    }

    let Some((col, row)) = view.to_cell(enemy.pos) else { return Ok(()) };
    let (glyph, color) = enemy_glyph(enemy.kind);
    out.queue(style::SetForegroundColor(color))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print(glyph))?;

    // Health pip above the body: full, hurt, critical
    let pip = match enemy.health * 3 / enemy.max_health.max(1) {
        3 | 2 => "▪",
        1 => "▫",
        _ => "·",
    };
    out.queue(cursor::MoveTo(col, row.saturating_sub(1).max(2)))?;
    out.queue(Print(pip))?;
    Ok(())
}

fn draw_aim<W: Write>(out: &mut W, session: &GameSession, view: &Viewport) -> std::io::Result<()> {
    if let Some((col, row)) = view.to_cell(session.combat.aim()) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_AIM))?;
        out.queue(Print("+"))?;
    }
    Ok(())
}

fn draw_labels<W: Write>(out: &mut W, effects: &TerminalEffects, view: &Viewport) -> std::io::Result<()> {
    for label in &effects.labels {
        if let Some((col, row)) = view.to_cell(label.at) {
            let half = label.text.chars().count() as u16 / 2;
            out.queue(cursor::MoveTo(col.saturating_sub(half).max(1), row))?;
            out.queue(style::SetForegroundColor(label.color))?;
            out.queue(Print(&label.text))?;
        }
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "A D: Move  W: Jump  SPACE: Dodge  E: Shoot  Q: Weapon  T: Auto  P: Perf  F: Aim  +/-: Radius  ESC: Quit",
    ))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(
    out: &mut W,
    session: &GameSession,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let score_line = format!("Final Score: {:>6}", session.score);
    let wave_line = format!(
        "Wave {}  ·  Level {}  ·  {} kills",
        session.director.wave_number(),
        session.hero.level,
        session.director.total_killed()
    );

    let lines: &[(&str, Color)] = &[
        ("╔════════════════════╗", Color::Red),
        ("║    GAME  OVER      ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
    ];

    let cx = width / 2;
    let total_rows = lines.len() + 3;
    let start_row = (height / 2).saturating_sub(total_rows as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    let mut row = start_row + lines.len() as u16;
    for (text, color) in [(&score_line, Color::Yellow), (&wave_line, Color::DarkGrey)] {
        let col = cx.saturating_sub(text.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(text))?;
        row += 1;
    }

    let hint = "R - Back to Menu  ESC - Quit";
    let col = cx.saturating_sub(hint.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(hint))?;

    Ok(())
}
