/// Adaptive performance control.
///
/// Counts ticks over fixed measurement windows, keeps a short history of the
/// resulting rates and maps the history to an optimization level. The only
/// simulation state it writes is the director's enemy ceiling; everything
/// else it exposes (effect density, performance mode) is read by the session.

use std::collections::VecDeque;

use log::{info, warn};

use crate::config::PerformanceConfig;
use crate::director::EnemyDirector;
use crate::effects::EffectDensity;
use crate::events::GameEvent;

const FULL_SPEED_RATIO: f32 = 0.95;
const MIN_STABILITY: f32 = 0.9;
const LIGHT_LOAD_RATIO: f32 = 0.8;
const HEAVY_LOAD_RATIO: f32 = 0.5;

pub const MAX_LEVEL: u8 = 3;

pub struct PerformanceGovernor {
    config: PerformanceConfig,
    history: VecDeque<f32>,
    window_start: Option<u64>,
    frames: u32,
    level: u8,
    performance_mode: bool,
    original_ceiling: usize,
}

impl PerformanceGovernor {
    /// `original_ceiling` is the enemy ceiling restored when load drops.
    pub fn new(config: &PerformanceConfig, original_ceiling: usize) -> Self {
        PerformanceGovernor {
            config: config.clone(),
            history: VecDeque::with_capacity(config.history_len),
            window_start: None,
            frames: 0,
            level: 0,
            performance_mode: false,
            original_ceiling,
        }
    }

    /// Counts one tick. When a measurement window closes, records its rate
    /// and re-evaluates the level. Returns the new level if it changed.
    pub fn record_frame(
        &mut self,
        now: u64,
        director: &mut EnemyDirector,
        events: &mut Vec<GameEvent>,
    ) -> Option<u8> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        let elapsed = now.saturating_sub(start);
        if elapsed < self.config.measurement_interval_ms {
            return None;
        }
        let fps = self.frames as f32 * 1000.0 / elapsed as f32;
        self.window_start = Some(now);
        self.frames = 0;
        self.observe_fps(fps, director, events)
    }

    /// Records one measured rate directly.
    pub fn observe_fps(
        &mut self,
        fps: f32,
        director: &mut EnemyDirector,
        events: &mut Vec<GameEvent>,
    ) -> Option<u8> {
        if self.history.len() >= self.config.history_len {
            self.history.pop_front();
        }
        self.history.push_back(fps);

        let level = self.evaluate();
        if level == self.level {
            return None;
        }
        if level > self.level {
            warn!(
                target: "performance",
                "average {:.1} fps (stability {:.2}), optimization level {} -> {}",
                self.average_fps(), self.stability(), self.level, level
            );
        } else {
            info!(target: "performance", "optimization level {} -> {}", self.level, level);
        }
        self.level = level;
        self.apply(director, events);
        Some(level)
    }

    pub fn average_fps(&self) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().sum::<f32>() / self.history.len() as f32
    }

    /// `1 - min(1, stddev / mean)`; 0 with no data.
    pub fn stability(&self) -> f32 {
        let avg = self.average_fps();
        if avg <= 0.0 {
            return 0.0;
        }
        let variance = self.history.iter().map(|f| (f - avg).powi(2)).sum::<f32>()
            / self.history.len() as f32;
        1.0 - (variance.sqrt() / avg).min(1.0)
    }

    fn evaluate(&self) -> u8 {
        let avg = self.average_fps();
        let target = self.config.target_fps;
        if avg >= target * FULL_SPEED_RATIO && self.stability() > MIN_STABILITY {
            0
        } else if avg >= target * LIGHT_LOAD_RATIO {
            1
        } else if avg >= target * HEAVY_LOAD_RATIO {
            2
        } else {
            MAX_LEVEL
        }
    }

    fn apply(&mut self, director: &mut EnemyDirector, events: &mut Vec<GameEvent>) {
        let ceiling = if self.level >= MAX_LEVEL {
            (self.original_ceiling as f32 * self.config.enemy_reduction).floor() as usize
        } else {
            self.original_ceiling
        };
        director.set_max_enemies_on_screen(ceiling.max(1));

        match self.level {
            0 => self.set_performance_mode(false, events),
            1 => {}
            _ => self.set_performance_mode(true, events),
        }
    }

    /// Switches performance mode; emits an event only on change.
    pub fn set_performance_mode(&mut self, enabled: bool, events: &mut Vec<GameEvent>) {
        if self.performance_mode == enabled {
            return;
        }
        self.performance_mode = enabled;
        info!(target: "performance", "performance mode {}", if enabled { "on" } else { "off" });
        events.push(GameEvent::PerformanceModeChanged { enabled });
    }

    pub fn toggle_performance_mode(&mut self, events: &mut Vec<GameEvent>) -> bool {
        let enabled = !self.performance_mode;
        self.set_performance_mode(enabled, events);
        enabled
    }

    pub fn performance_mode(&self) -> bool {
        self.performance_mode
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn effect_density(&self) -> EffectDensity {
        match self.level {
            0 if !self.performance_mode => EffectDensity::Full,
            0 | 1 => EffectDensity::Reduced,
            _ => EffectDensity::Minimal,
        }
    }

    pub fn original_ceiling(&self) -> usize {
        self.original_ceiling
    }

    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }
}
