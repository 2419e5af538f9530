use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ipgeo_view::{Effect, Key};

use crate::app::App;

pub const fn to_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Esc,
        _ => Key::Other,
    }
}

/// Handles one key press and returns the effects the dashboard asked for.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    if app.alert.take().is_some() {
        return Vec::new();
    }

    if app.show_help {
        app.show_help = false;
        return Vec::new();
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return Vec::new();
        }
        KeyCode::Char('q') if !app.dashboard.search_focused() => {
            app.running = false;
            return Vec::new();
        }
        KeyCode::F(1) => {
            app.show_help = true;
            return Vec::new();
        }
        _ => {}
    }

    let Some(command) = app.dashboard.command_for_key(to_key(key.code)) else {
        return Vec::new();
    };
    log::debug!("{command:?}");
    let now = app.now();
    app.dashboard.handle(command, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::source::RecordSource;
    use ipgeo_view::{IpRecord, QueriedAddress, RefreshPolicy};

    fn app() -> App {
        let record = IpRecord {
            ipv4: Some("1.2.3.4".to_string()),
            ..IpRecord::default()
        };
        App::new(record, RefreshPolicy::default(), RecordSource::Missing, "")
    }

    fn press(app: &mut App, code: KeyCode) -> Vec<Effect> {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn q_quits_outside_search_input() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        assert_eq!(app.dashboard.search_text(), "q");

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn any_key_dismisses_alert() {
        let mut app = app();
        app.show_alert("Please enter an IP address");

        assert!(press(&mut app, KeyCode::Char('c')).is_empty());
        assert!(app.alert.is_none());
    }

    #[test]
    fn typed_search_becomes_lookup() {
        let mut app = app();
        press(&mut app, KeyCode::Char('s'));
        for ch in "8.8.4.4".chars() {
            press(&mut app, KeyCode::Char(ch));
        }

        let effects = press(&mut app, KeyCode::Enter);

        assert_eq!(
            effects,
            vec![Effect::Lookup(QueriedAddress::parse("8.8.4.4").unwrap())]
        );
    }

    #[test]
    fn help_toggles_with_f1() {
        let mut app = app();
        press(&mut app, KeyCode::F(1));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.show_help);
    }

    #[test]
    fn copy_key_requests_clipboard() {
        let mut app = app();
        assert_eq!(
            press(&mut app, KeyCode::Char('c')),
            vec![Effect::Copy("1.2.3.4".to_string())]
        );
    }
}
