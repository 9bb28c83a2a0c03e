mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use log::{error, info};
use rand::thread_rng;

use wave_brawler::config::{GameConfig, PerformanceTier};
use wave_brawler::entities::GameStatus;
use wave_brawler::input::{Action, ActionState};
use wave_brawler::session::GameSession;

use display::TerminalEffects;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

// ── Simultaneous-input model ──────────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

/// Keys bound to each logical action.
fn bindings(action: Action) -> &'static [KeyCode] {
    match action {
        Action::MoveLeft => &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')],
        Action::MoveRight => &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')],
        Action::Jump => &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')],
        Action::Dodge => &[KeyCode::Char(' ')],
        Action::Attack => &[KeyCode::Char('e'), KeyCode::Char('E'), KeyCode::Enter],
        Action::CycleWeapon => &[KeyCode::Char('q'), KeyCode::Char('Q')],
        Action::ToggleAutoMode => &[KeyCode::Char('t'), KeyCode::Char('T')],
        Action::TogglePerformanceMode => &[KeyCode::Char('p'), KeyCode::Char('P')],
        Action::ToggleAutoAim => &[KeyCode::Char('f'), KeyCode::Char('F')],
        Action::RadiusUp => &[KeyCode::Char('+'), KeyCode::Char('=')],
        Action::RadiusDown => &[KeyCode::Char('-'), KeyCode::Char('_')],
    }
}

const ACTIONS: [Action; 11] = [
    Action::MoveLeft,
    Action::MoveRight,
    Action::Jump,
    Action::Dodge,
    Action::Attack,
    Action::CycleWeapon,
    Action::ToggleAutoMode,
    Action::TogglePerformanceMode,
    Action::ToggleAutoAim,
    Action::RadiusUp,
    Action::RadiusDown,
];

/// Rebuilds the logical action state from the key hold map. Edges come from
/// `ActionState`: an action is "just pressed" on the first frame it is held.
fn sync_actions(actions: &mut ActionState, key_frame: &HashMap<KeyCode, u64>, frame: u64) {
    actions.end_tick();
    for action in ACTIONS {
        if bindings(action).iter().any(|k| is_held(key_frame, k, frame)) {
            actions.press(action);
        } else {
            actions.release(action);
        }
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

fn log_path() -> PathBuf {
    std::env::temp_dir().join("wave_brawler.log")
}

/// Logs go to a file: the alternate screen owns the terminal.
fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Ok(file) = File::create(log_path()) {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    let _ = builder.try_init();
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start { auto_mode: bool, tier: PerformanceTier },
    Quit,
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "⚔  WAVE  BRAWLER  ⚔";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select mode:"))?;

    let options: &[(&str, &str, Color, &str)] = &[
        ("1", "Normal     ", Color::Green, "you fight, waves escalate"),
        ("2", "Auto-battle", Color::Yellow, "the hero fights on its own"),
        ("3", "Low-spec   ", Color::Red, "fewer enemies, lighter effects"),
    ];

    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(14), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<12}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" : {}", desc)))?;
    }

    // Enemy legend
    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy + 3))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Enemies:"))?;

    let legend: &[(&str, Color, &str)] = &[
        ("ж", Color::Green, " Spiderling  fast, fragile"),
        ("g", Color::White, " Goblin      the rank and file"),
        ("Ø", Color::DarkYellow, " Orc         slow, heals itself"),
        ("B", Color::Red, " Berserker   hits hard, frenzies"),
        ("Ψ", Color::Blue, " Archer      shoots from range"),
        ("◆", Color::Yellow, " Boss        every tenth wave"),
    ];
    for (i, (sym, color, desc)) in legend.iter().enumerate() {
        let row = cy + 4 + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(14), row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(sym))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(*desc))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy + 11))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print(format!("Log: {}", log_path().display())))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        let event = match rx.recv() {
            Ok(event) => event,
            // Input thread gone; nothing can answer the menu.
            Err(_) => return Ok(MenuResult::Quit),
        };
        if let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = event {
            match code {
                KeyCode::Char('1') => {
                    return Ok(MenuResult::Start { auto_mode: false, tier: PerformanceTier::High })
                }
                KeyCode::Char('2') => {
                    return Ok(MenuResult::Start { auto_mode: true, tier: PerformanceTier::High })
                }
                KeyCode::Char('3') => {
                    return Ok(MenuResult::Start { auto_mode: false, tier: PerformanceTier::Low })
                }
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → back to menu.
///
/// Input model: a `key_frame` map records the frame number of the last
/// press/repeat event for every key. Each frame the keys still "fresh"
/// (within `HOLD_WINDOW` frames) are folded into an `ActionState`, so several
/// actions can be held at once. On keyboard-enhancement terminals keys are
/// dropped on release; elsewhere they expire after `HOLD_WINDOW` frames of
/// silence, which is shorter than the OS repeat interval.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut GameSession,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<bool> {
    let mut rng = thread_rng();
    let mut effects = TerminalEffects::new();
    let mut actions = ActionState::new();

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let started = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Esc => return Ok(true),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if session.status == GameStatus::GameOver =>
                        {
                            return Ok(false);
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        sync_actions(&mut actions, &key_frame, frame);

        let now = started.elapsed().as_millis() as u64;
        session.tick(now, &actions, &mut rng, &mut effects);
        effects.age();

        display::render(out, session, &effects, now)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    init_logging();

    // Optional JSON config as the first argument; checked before the
    // terminal switches to raw mode so errors stay readable.
    let base_config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(Path::new(&path)).map_err(|err| {
            error!(target: "game_state", "config rejected: {}", err);
            std::io::Error::new(std::io::ErrorKind::InvalidData, err)
        })?,
        None => GameConfig::default(),
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, &base_config);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    base_config: &GameConfig,
) -> std::io::Result<()> {
    loop {
        match show_menu(out, rx)? {
            MenuResult::Quit => break,
            MenuResult::Start { auto_mode, tier } => {
                let mut config = base_config.clone().with_tier(tier);
                // The terminal loop never runs faster than FRAME.
                let frame_fps = 1000.0 / FRAME.as_millis() as f32;
                config.performance.target_fps = config.performance.target_fps.min(frame_fps);

                let mut session = GameSession::new(config);
                session.auto_mode = auto_mode;
                info!(target: "game_state", "starting ({:?}, auto mode {})", tier, auto_mode);

                let quit = game_loop(out, &mut session, rx)?;
                info!(
                    target: "game_state",
                    "session ended on wave {} with score {}",
                    session.director.wave_number(),
                    session.score
                );
                if quit {
                    break;
                }
                // Otherwise loop back to the menu
            }
        }
    }
    Ok(())
}
