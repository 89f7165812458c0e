// tui/events.rs - Crossterm event loop and terminal management

use super::app::{Action, App};
use super::ui::{self, Theme};
use crate::config::ResolvedConfig;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;

/// Run the interactive TUI on the configured manifest.
pub fn run_tui(config: &ResolvedConfig) -> Result<()> {
    // Nothing to recover into if the initial load fails
    let mut app = App::open(config.manifest.clone())
        .with_context(|| format!("cannot open {}", config.manifest.display()))?;
    let theme = Theme::from_accent(&config.accent);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Event loop
    let result = run_event_loop(&mut terminal, &mut app, &theme);

    // Restore terminal
    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    log::info!("session ended");
    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    theme: &Theme,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app, theme))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(action) = classify(key, app.is_editing()) {
                app.apply(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Map a key press to an action for the current mode.
pub fn classify(key: KeyEvent, editing: bool) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('u') if editing => Some(Action::ClearField),
            _ => None,
        };
    }

    if editing {
        return match key.code {
            KeyCode::Tab | KeyCode::Down => Some(Action::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(Action::PrevField),
            KeyCode::Enter => Some(Action::Activate),
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::PrevItem),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::NextItem),
        KeyCode::Enter | KeyCode::Char('e') => Some(Action::Activate),
        KeyCode::Char('r') => Some(Action::Reload),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_browsing_keys() {
        assert_eq!(classify(press(KeyCode::Char('j')), false), Some(Action::NextItem));
        assert_eq!(classify(press(KeyCode::Up), false), Some(Action::PrevItem));
        assert_eq!(classify(press(KeyCode::Enter), false), Some(Action::Activate));
        assert_eq!(classify(press(KeyCode::Char('r')), false), Some(Action::Reload));
        assert_eq!(classify(press(KeyCode::Char('q')), false), Some(Action::Quit));
        assert_eq!(classify(press(KeyCode::Char('x')), false), None);
    }

    #[test]
    fn test_editing_keys() {
        assert_eq!(classify(press(KeyCode::Tab), true), Some(Action::NextField));
        assert_eq!(classify(press(KeyCode::BackTab), true), Some(Action::PrevField));
        assert_eq!(classify(press(KeyCode::Enter), true), Some(Action::Activate));
        assert_eq!(classify(press(KeyCode::Esc), true), Some(Action::Cancel));
        // Letters are text while editing
        assert_eq!(classify(press(KeyCode::Char('q')), true), Some(Action::Input('q')));
        assert_eq!(classify(press(KeyCode::Char('j')), true), Some(Action::Input('j')));
    }

    #[test]
    fn test_control_keys() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(classify(ctrl_c, true), Some(Action::Quit));
        assert_eq!(classify(ctrl_c, false), Some(Action::Quit));
        assert_eq!(classify(ctrl_u, true), Some(Action::ClearField));
        assert_eq!(classify(ctrl_u, false), None);
    }
}
