use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::Backend;
use crate::config;
use crate::ui;

use super::startup::Wiring;

/// Upper bound on how long to wait for input, so decoder wakeups are picked
/// up promptly even while nothing is ticking.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Everything a key press can ask for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    PlayPause,
    Next,
    Previous,
    Replay,
    ScrubForward,
    ScrubBack,
    VolumeUp,
    VolumeDown,
    Quit,
}

pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char(' ') | KeyCode::Char('p') => Some(Command::PlayPause),
        KeyCode::Char('l') | KeyCode::Char('n') => Some(Command::Next),
        KeyCode::Char('h') | KeyCode::Char('b') => Some(Command::Previous),
        KeyCode::Char('r') => Some(Command::Replay),
        KeyCode::Char('L') | KeyCode::Right => Some(Command::ScrubForward),
        KeyCode::Char('H') | KeyCode::Left => Some(Command::ScrubBack),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => Some(Command::VolumeUp),
        KeyCode::Char('-') | KeyCode::Down => Some(Command::VolumeDown),
        _ => None,
    }
}

/// Run `cmd` against the app. Returns `true` when the loop should exit.
/// Failures end up in the status line rather than tearing the UI down.
pub fn apply<B: Backend>(cmd: Command, app: &mut App<B>) -> bool {
    let result = match cmd {
        Command::Quit => return true,
        Command::PlayPause => app.toggle_play(),
        Command::Next => app.next(),
        Command::Previous => app.previous(),
        Command::Replay => app.replay(),
        Command::ScrubForward => app.scrub_forward(),
        Command::ScrubBack => app.scrub_back(),
        Command::VolumeUp => {
            app.volume_up();
            Ok(())
        }
        Command::VolumeDown => {
            app.volume_down();
            Ok(())
        }
    };

    if let Err(e) = result {
        app.report(&e);
    }
    false
}

fn poll_timeout(deadline: Option<Instant>, now: Instant) -> Duration {
    deadline.map_or(IDLE_POLL, |d| d.saturating_duration_since(now).min(IDLE_POLL))
}

/// Main terminal event loop: delivers decoder wakeups and ticks, redraws, and
/// handles input. Returns `Ok(())` when the user quits.
pub fn run<B: Backend>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    wiring: &mut Wiring<B>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(wakeup) = wiring.wakeups.try_recv() {
            wiring.app.player.handle_wakeup(wakeup);
        }
        wiring.app.player.poll(Instant::now());
        while let Ok(ev) = wiring.events.try_recv() {
            wiring.app.on_event(ev);
        }

        terminal.draw(|f| ui::draw(f, &wiring.app, &settings.ui, &settings.controls))?;

        let timeout = poll_timeout(wiring.app.player.next_deadline(), Instant::now());
        if !event::poll(timeout)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(cmd) = command_for(key) {
                tracing::debug!(?cmd, "key command");
                if apply(cmd, &mut wiring.app) {
                    wiring.app.player.stop();
                    return Ok(());
                }
            }
        }
    }
}
