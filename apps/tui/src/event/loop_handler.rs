use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ipgeo_view::dashboard::COPY_FAILED_ALERT;
use ipgeo_view::projection::{MAP_UNAVAILABLE_DETAIL, MAP_UNAVAILABLE_TITLE};
use ipgeo_view::{Effect, IpRecord, MapView, Projection, QueriedAddress, ViewError, ViewMode};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::collections::VecDeque;
use std::io::Stdout;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::app::{clipboard, handle_input, App, AppActions, RecordSource};
use crate::ui;

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Results of work spawned off the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    LookupFinished {
        address: QueriedAddress,
        result: Result<IpRecord, ViewError>,
    },
    ClearCacheFinished(Result<(), ViewError>),
    ReloadFinished {
        cycle: u64,
        result: Result<IpRecord, ViewError>,
    },
}

/// Carries out dashboard effects. Network and file work is spawned and
/// reports back through the channel; clipboard and alerts happen inline.
pub struct EffectRunner {
    actions: AppActions,
    tx: UnboundedSender<AppEvent>,
}

impl EffectRunner {
    pub const fn new(actions: AppActions, tx: UnboundedSender<AppEvent>) -> Self {
        Self { actions, tx }
    }

    pub fn run(&self, app: &mut App, effects: Vec<Effect>) {
        let mut queue = VecDeque::from(effects);

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Lookup(address) => self.spawn_lookup(address),
                Effect::ClearCache => self.spawn_clear_cache(),
                Effect::Reload { cycle } => self.spawn_reload(cycle, app.source.clone()),
                Effect::Copy(text) => {
                    let result = clipboard::copy_text(&text);
                    if let Ok(route) = &result {
                        log::debug!("Copied {text} via {route:?}");
                    }
                    let now = app.now();
                    let follow_up = app.dashboard.on_copy_finished(result.map(|_| ()), now);
                    queue.extend(follow_up.into_iter().map(|effect| match effect {
                        Effect::Alert(message) if message == COPY_FAILED_ALERT => {
                            Effect::Alert(format!("{message}\n\nSelect it manually: {text}"))
                        }
                        other => other,
                    }));
                }
                Effect::Alert(message) => app.show_alert(message),
            }
        }
    }

    fn spawn_lookup(&self, address: QueriedAddress) {
        let actions = self.actions.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = actions.lookup(&address).await;
            if tx.send(AppEvent::LookupFinished { address, result }).is_err() {
                log::debug!("Dashboard closed before lookup finished");
            }
        });
    }

    fn spawn_clear_cache(&self) {
        let actions = self.actions.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = actions.clear_cache().await;
            if tx.send(AppEvent::ClearCacheFinished(result)).is_err() {
                log::debug!("Dashboard closed before cache clear finished");
            }
        });
    }

    fn spawn_reload(&self, cycle: u64, source: RecordSource) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.load().await.map_err(ViewError::from);
            if tx.send(AppEvent::ReloadFinished { cycle, result }).is_err() {
                log::debug!("Dashboard closed before reload finished");
            }
        });
    }
}

/// Feeds one async result back into the dashboard.
pub fn apply_event(app: &mut App, event: AppEvent) -> Vec<Effect> {
    let now = app.now();
    match event {
        AppEvent::LookupFinished { address, result } => {
            app.dashboard.on_lookup_finished(&address, result)
        }
        AppEvent::ClearCacheFinished(result) => {
            app.dashboard.on_clear_cache_finished(result, now);
            Vec::new()
        }
        AppEvent::ReloadFinished { cycle, result } => {
            let failure = result.as_ref().err().map(ToString::to_string);
            app.dashboard.on_reload_finished(cycle, result);
            match failure {
                None => app.mark_reloaded(),
                Some(error) => app.status_message = format!("Error: refresh failed: {error}"),
            }
            Vec::new()
        }
    }
}

/// Drains finished work, then advances the dashboard timers.
pub fn pump(app: &mut App, runner: &EffectRunner, rx: &mut UnboundedReceiver<AppEvent>) {
    while let Ok(event) = rx.try_recv() {
        let effects = apply_event(app, event);
        runner.run(app, effects);
    }

    let now = app.now();
    let effects = app.dashboard.tick(now);
    runner.run(app, effects);
}

/// Print the current record and exit
pub fn run_headless(app: &App, json: bool) -> Result<()> {
    if json {
        let report = HeadlessReport {
            source: app.source.describe(),
            api_base: &app.api_base,
            loaded_at: app.loaded_at.to_rfc3339(),
            mode: app.dashboard.controller().mode(),
            badge: app.dashboard.mode_badge(),
            projection: app.dashboard.projection(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", headless_text(app));
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct HeadlessReport<'a> {
    source: String,
    api_base: &'a str,
    loaded_at: String,
    mode: ViewMode,
    badge: &'static str,
    projection: Projection,
}

fn headless_text(app: &App) -> String {
    let mut out = format!(
        "\nIP Geolocation\n==============\n{} (source: {})\n\n",
        app.dashboard.mode_badge(),
        app.source.describe()
    );

    match app.dashboard.projection() {
        Projection::Error { message } => out.push_str(&format!("Error: {message}\n")),
        Projection::Details { fields, map } => {
            for (field, value) in fields {
                out.push_str(&format!("{}: {value}\n", field.label()));
            }
            out.push('\n');
            out.push_str(&match map {
                MapView::Present(marker) => format!(
                    "Map: {} at {:.4}, {:.4} (zoom {}, {} m radius)\n",
                    marker.title,
                    marker.latitude,
                    marker.longitude,
                    marker.zoom,
                    marker.radius_meters
                ),
                MapView::Unavailable => {
                    format!("{MAP_UNAVAILABLE_TITLE}: {MAP_UNAVAILABLE_DETAIL}\n")
                }
            });
        }
    }

    out
}

/// Run the main application event loop
pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    actions: AppActions,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let runner = EffectRunner::new(actions, tx);

    loop {
        app.update();
        pump(app, &runner, &mut rx);

        terminal
            .draw(|f| ui::ui(app, f))
            .map_err(|e| eyre!("Terminal draw error: {e}"))?;

        if matches!(event::poll(EVENT_POLL_TIMEOUT), Ok(true)) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    let effects = handle_input(app, key);
                    runner.run(app, effects);
                }
                // Resize is picked up by the next draw.
                Ok(_) | Err(_) => {}
            }
        }

        if !app.running {
            break;
        }

        // Let spawned lookups make progress on a current-thread runtime.
        tokio::task::yield_now().await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::actions::tests::serve_once;
    use ipgeo_view::{Command, RefreshPolicy};

    fn located() -> IpRecord {
        IpRecord {
            ipv4: Some("1.2.3.4".to_string()),
            city: Some("Porto".to_string()),
            latitude: Some(41.15),
            longitude: Some(-8.61),
            ..IpRecord::default()
        }
    }

    fn app_with(record: IpRecord, source: RecordSource, api_base: &str) -> App {
        App::new(record, RefreshPolicy::default(), source, api_base)
    }

    fn runner(api_base: &str) -> (EffectRunner, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            EffectRunner::new(AppActions::new(api_base, Duration::from_secs(5)), tx),
            rx,
        )
    }

    #[tokio::test]
    async fn search_flows_through_spawned_lookup() -> Result<()> {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"ipv4": "8.8.8.8", "latitude": 37.4, "longitude": -122.1}"#,
        )
        .await?;
        let mut app = app_with(located(), RecordSource::Missing, &base);
        let (runner, mut rx) = runner(&base);

        app.dashboard.handle(Command::FocusSearch, app.now());
        for ch in "8.8.8.8".chars() {
            app.dashboard.handle(Command::Input(ch), app.now());
        }
        let effects = app.dashboard.handle(Command::SubmitSearch, app.now());
        runner.run(&mut app, effects);

        let event = rx.recv().await.ok_or_else(|| eyre!("channel closed"))?;
        server.await?;
        let effects = apply_event(&mut app, event);
        runner.run(&mut app, effects);

        assert!(app.alert.is_none());
        assert_eq!(app.dashboard.controller().mode(), ViewMode::Search);
        assert_eq!(
            app.dashboard.controller().current().ipv4.as_deref(),
            Some("8.8.8.8")
        );
        Ok(())
    }

    #[tokio::test]
    async fn lookup_error_raises_alert() -> Result<()> {
        let (base, server) =
            serve_once("400 Bad Request", r#"{"error": "Private IP address"}"#).await?;
        let mut app = app_with(located(), RecordSource::Missing, &base);
        let (runner, mut rx) = runner(&base);

        app.dashboard.handle(Command::FocusSearch, app.now());
        for ch in "10.1.1.1".chars() {
            app.dashboard.handle(Command::Input(ch), app.now());
        }
        let effects = app.dashboard.handle(Command::SubmitSearch, app.now());
        runner.run(&mut app, effects);

        let event = rx.recv().await.ok_or_else(|| eyre!("channel closed"))?;
        server.await?;
        let effects = apply_event(&mut app, event);
        runner.run(&mut app, effects);

        assert_eq!(
            app.alert.as_deref(),
            Some("Failed to lookup IP address: Private IP address")
        );
        assert!(app.dashboard.controller().shows_original());
        Ok(())
    }

    #[tokio::test]
    async fn reload_rereads_inline_source() -> Result<()> {
        let source = RecordSource::Inline(r#"{"ipv4": "5.5.5.5"}"#.to_string());
        let mut app = app_with(located(), source, "");
        let (runner, mut rx) = runner("");

        runner.run(&mut app, vec![Effect::Reload { cycle: 1 }]);
        let event = rx.recv().await.ok_or_else(|| eyre!("channel closed"))?;
        apply_event(&mut app, event);

        assert_eq!(
            app.dashboard.controller().original().ipv4.as_deref(),
            Some("5.5.5.5")
        );
        assert!(app.status_message.starts_with("Loaded from stdin"));
        Ok(())
    }

    #[tokio::test]
    async fn failed_reload_reports_in_status() -> Result<()> {
        let source = RecordSource::Inline("{broken".to_string());
        let mut app = app_with(located(), source, "");
        let (runner, mut rx) = runner("");

        runner.run(&mut app, vec![Effect::Reload { cycle: 1 }]);
        let event = rx.recv().await.ok_or_else(|| eyre!("channel closed"))?;
        apply_event(&mut app, event);

        assert!(app.status_message.starts_with("Error: refresh failed"));
        assert_eq!(
            app.dashboard.controller().current().ipv4.as_deref(),
            Some("1.2.3.4")
        );
        Ok(())
    }

    #[tokio::test]
    async fn alert_effect_sets_prompt() {
        let mut app = app_with(located(), RecordSource::Missing, "");
        let (runner, _rx) = runner("");

        runner.run(&mut app, vec![Effect::Alert("Please enter an IP address".to_string())]);

        assert_eq!(app.alert.as_deref(), Some("Please enter an IP address"));
    }

    #[test]
    fn headless_text_lists_fields_and_map() {
        let app = app_with(located(), RecordSource::Missing, "");
        let text = headless_text(&app);

        assert!(text.starts_with("\nIP Geolocation\n==============\nViewing Your IP (source: none)\n\n"));
        assert!(text.contains("IPv4 Address: 1.2.3.4"));
        assert!(text.contains("City: Porto"));
        assert!(text.contains("ISP Provider: Unknown"));
        assert!(text.contains("Map: Your Location at 41.1500, -8.6100 (zoom 13, 1000 m radius)"));
    }

    #[test]
    fn headless_text_shows_only_error() {
        let app = app_with(
            IpRecord::from_error("No IP data supplied"),
            RecordSource::Missing,
            "",
        );
        let text = headless_text(&app);

        assert!(text.contains("Error: No IP data supplied"));
        assert!(!text.contains("IPv4 Address"));
        assert!(!text.contains("Map"));
    }

    #[test]
    fn headless_text_without_coordinates() {
        let record = IpRecord {
            ipv4: Some("1.2.3.4".to_string()),
            ..IpRecord::default()
        };
        let app = app_with(record, RecordSource::Missing, "");

        assert!(headless_text(&app)
            .contains("Map Not Available: Location coordinates could not be determined"));
    }
}
