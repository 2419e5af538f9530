use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use ipgeo_view::dashboard::COPY_FAILED_ALERT;
use ipgeo_view::{Dashboard, Effect, Key, RefreshPolicy};
use ratzilla::event::KeyCode;
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen_futures::spawn_local;

mod animation;
mod api;
mod dom;
mod logger;
mod render;

use animation::CardReveal;

pub struct WebApp {
    pub dashboard: Dashboard,
    pub show_help: bool,
    pub reveal: CardReveal,
}

type Shared = Rc<RefCell<WebApp>>;

fn main() -> io::Result<()> {
    logger::init();

    let record = dom::initial_record();
    let app: Shared = Rc::new(RefCell::new(WebApp {
        dashboard: Dashboard::new(record, RefreshPolicy::default()),
        show_help: false,
        reveal: CardReveal::default(),
    }));

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let app = app.clone();
        move |event| {
            let effects = handle_key(&mut app.borrow_mut(), event.code, dom::now());
            perform(&app, effects);
        }
    });

    terminal.draw_web(move |f| {
        let now = dom::now();
        let effects = app.borrow_mut().dashboard.tick(now);
        perform(&app, effects);

        let mut state = app.borrow_mut();
        let revision = state.dashboard.revision();
        state.reveal.sync(revision, now);
        render::render_dashboard(&state, now, f);
    });

    Ok(())
}

fn handle_key(app: &mut WebApp, code: KeyCode, now: Duration) -> Vec<Effect> {
    if app.show_help {
        app.show_help = false;
        return Vec::new();
    }

    let key = match code {
        KeyCode::F(1) => {
            app.show_help = true;
            return Vec::new();
        }
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Esc,
        _ => Key::Other,
    };

    app.dashboard
        .command_for_key(key)
        .map(|command| app.dashboard.handle(command, now))
        .unwrap_or_default()
}

/// Carries out dashboard effects. Fetches and clipboard writes run as local
/// tasks that report back into the shared state; nothing holds a borrow
/// across an effect.
fn perform(app: &Shared, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::Lookup(address) => {
                let app = app.clone();
                spawn_local(async move {
                    let result = api::lookup(&address).await;
                    let follow_up = app
                        .borrow_mut()
                        .dashboard
                        .on_lookup_finished(&address, result);
                    perform(&app, follow_up);
                });
            }
            Effect::ClearCache => {
                let app = app.clone();
                spawn_local(async move {
                    let result = api::clear_cache().await;
                    app.borrow_mut()
                        .dashboard
                        .on_clear_cache_finished(result, dom::now());
                });
            }
            Effect::Copy(text) => {
                let app = app.clone();
                spawn_local(async move {
                    let result = dom::copy_text(text.clone()).await;
                    let follow_up = app
                        .borrow_mut()
                        .dashboard
                        .on_copy_finished(result, dom::now());
                    perform(&app, with_manual_copy(follow_up, &text));
                });
            }
            Effect::Reload { cycle } => {
                if let Err(error) = dom::reload() {
                    app.borrow_mut()
                        .dashboard
                        .on_reload_finished(cycle, Err(error));
                }
            }
            Effect::Alert(message) => dom::alert(&message),
        }
    }
}

/// The manual path for a failed copy: show the address so it can be
/// selected by hand.
fn with_manual_copy(effects: Vec<Effect>, text: &str) -> Vec<Effect> {
    effects
        .into_iter()
        .map(|effect| match effect {
            Effect::Alert(message) if message == COPY_FAILED_ALERT => {
                Effect::Alert(format!("{message}\n\nSelect it manually: {text}"))
            }
            other => other,
        })
        .collect()
}
