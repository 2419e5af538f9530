use chrono::{DateTime, Local};
use ipgeo_view::projection::{card_delay, Field, CARD_FADE};
use ipgeo_view::controls::Tone;
use ipgeo_view::{Dashboard, IpRecord, RefreshPolicy};
use ratatui::style::Color;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tachyonfx::{fx, Effect as FxEffect, Interpolation};
use throbber_widgets_tui::ThrobberState;

use crate::app::source::RecordSource;

pub struct App {
    pub running: bool,
    pub dashboard: Dashboard,
    /// Blocking prompt; any key dismisses it.
    pub alert: Option<String>,
    pub show_help: bool,
    pub status_message: String,
    pub source: RecordSource,
    pub api_base: String,
    pub loaded_at: DateTime<Local>,
    pub throbber: ThrobberState,
    /// One entrance effect per detail row, in `Field::ALL` order.
    pub card_fx: Mutex<Vec<FxEffect>>,
    pub last_tick: Duration,
    fx_revision: Option<u64>,
    last_frame: Instant,
    started: Instant,
}

impl App {
    pub fn new(
        record: IpRecord,
        policy: RefreshPolicy,
        source: RecordSource,
        api_base: impl Into<String>,
    ) -> Self {
        let now = Instant::now();
        let mut app = Self {
            running: true,
            dashboard: Dashboard::new(record, policy),
            alert: None,
            show_help: false,
            status_message: String::new(),
            source,
            api_base: api_base.into(),
            loaded_at: Local::now(),
            throbber: ThrobberState::default(),
            card_fx: Mutex::new(Vec::new()),
            last_tick: Duration::ZERO,
            fx_revision: None,
            last_frame: now,
            started: now,
        };
        app.set_loaded_status();
        app
    }

    /// Monotonic clock handed to the dashboard.
    pub fn now(&self) -> Duration {
        self.started.elapsed()
    }

    /// Advances frame timing, the busy spinner and the card animations.
    pub fn update(&mut self) {
        self.last_tick = self.last_frame.elapsed();
        self.last_frame = Instant::now();

        if self.is_busy() {
            self.throbber.calc_next();
        }

        let revision = self.dashboard.revision();
        if self.fx_revision != Some(revision) {
            self.fx_revision = Some(revision);
            self.restart_card_fx();
        }
    }

    pub fn is_busy(&self) -> bool {
        let controls = self.dashboard.controls();
        [controls.refresh, controls.search, controls.clear_cache]
            .iter()
            .any(|control| control.tone == Tone::Busy)
    }

    pub fn show_alert(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("Alert: {message}");
        self.alert = Some(message);
    }

    /// Called after a refresh swapped in a new record.
    pub fn mark_reloaded(&mut self) {
        self.loaded_at = Local::now();
        self.set_loaded_status();
    }

    fn set_loaded_status(&mut self) {
        self.status_message = format!(
            "Loaded from {} at {}",
            self.source.describe(),
            self.loaded_at.format("%H:%M:%S")
        );
    }

    fn restart_card_fx(&self) {
        let effects = (0..Field::ALL.len()).map(card_entrance).collect();
        if let Ok(mut card_fx) = self.card_fx.lock() {
            *card_fx = effects;
        }
    }
}

fn card_entrance(index: usize) -> FxEffect {
    let delay = u32::try_from(card_delay(index).as_millis()).unwrap_or(u32::MAX);
    let fade = u32::try_from(CARD_FADE.as_millis()).unwrap_or(u32::MAX);
    fx::prolong_start(
        delay,
        fx::fade_from_fg(Color::Black, (fade, Interpolation::QuadOut)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let record = IpRecord {
            ipv4: Some("1.2.3.4".to_string()),
            ..IpRecord::default()
        };
        App::new(
            record,
            RefreshPolicy::default(),
            RecordSource::Missing,
            "http://127.0.0.1:5000",
        )
    }

    #[test]
    fn first_update_starts_card_animation() {
        let mut app = app();
        assert!(app.card_fx.lock().unwrap().is_empty());

        app.update();

        assert_eq!(app.card_fx.lock().unwrap().len(), Field::ALL.len());
    }

    #[test]
    fn status_names_the_source() {
        let app = app();
        assert!(app.status_message.starts_with("Loaded from none at "));
    }

    #[test]
    fn idle_dashboard_is_not_busy() {
        let app = app();
        assert!(!app.is_busy());
    }
}
