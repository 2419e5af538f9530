//! Event wiring shared by every front end.
//!
//! A front end converts its key events into [`Key`]s, feeds the resulting
//! [`Command`]s to [`Dashboard::handle`], calls [`Dashboard::tick`] whenever
//! [`Dashboard::next_deadline`] passes, and performs the returned
//! [`Effect`]s. Results of those effects come back through the `on_*`
//! methods.

use std::time::Duration;

use serde::Serialize;

use crate::address::{AddressFamily, QueriedAddress};
use crate::controller::{ViewController, ViewMode};
use crate::controls::{
    back_control, clear_cache_control, copy_control, refresh_control, search_control,
    ButtonState, Controls, Tone,
};
use crate::error::ViewError;
use crate::projection::{project, Projection};
use crate::record::IpRecord;
use crate::refresh::{Completion, Debouncer, RefreshCycle, RefreshPolicy, RefreshTick};

pub const EMPTY_QUERY_ALERT: &str = "Please enter an IP address";
pub const INVALID_QUERY_ALERT: &str = "Please enter a valid IP address";
pub const REFRESH_PENDING_ALERT: &str = "A refresh is in progress, try again once it completes";
pub const COPY_FAILED_ALERT: &str = "Failed to copy IP address";

/// Platform-neutral key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Esc,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Debounced; rapid repeats collapse into one refresh.
    RequestRefresh,
    Copy,
    ClearCache,
    FocusSearch,
    Input(char),
    DeleteBackward,
    LeaveInput,
    SubmitSearch,
    BackToSelf,
}

/// Side effects the front end must carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// `POST /api/lookup`; report through [`Dashboard::on_lookup_finished`].
    Lookup(QueriedAddress),
    /// `POST /api/clear-cache`; report through [`Dashboard::on_clear_cache_finished`].
    ClearCache,
    /// Put the text on the clipboard; report through [`Dashboard::on_copy_finished`].
    Copy(String),
    /// Reload the out-of-band record; report through
    /// [`Dashboard::on_reload_finished`] with the same `cycle`.
    Reload { cycle: u64 },
    /// Blocking prompt.
    Alert(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHeader {
    pub address: String,
    pub family: AddressFamily,
    pub private: bool,
}

#[derive(Debug, Clone, Default)]
struct SearchInput {
    text: String,
    focused: bool,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    controller: ViewController,
    policy: RefreshPolicy,
    debounce: Debouncer,
    refresh: Option<RefreshCycle>,
    cycles: u64,
    search: SearchInput,
    lookup: Option<QueriedAddress>,
    copy: ButtonState,
    clear_cache: ButtonState,
    revision: u64,
}

impl Dashboard {
    pub fn new(original: IpRecord, policy: RefreshPolicy) -> Self {
        Self {
            controller: ViewController::load(original),
            policy,
            debounce: Debouncer::new(policy.debounce),
            refresh: None,
            cycles: 0,
            search: SearchInput::default(),
            lookup: None,
            copy: ButtonState::Ready,
            clear_cache: ButtonState::Ready,
            revision: 0,
        }
    }

    pub const fn controller(&self) -> &ViewController {
        &self.controller
    }

    pub fn projection(&self) -> Projection {
        project(self.controller.current(), self.controller.mode())
    }

    /// Bumped whenever the displayed record changes.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn mode_badge(&self) -> &'static str {
        self.controller.mode().badge()
    }

    pub fn search_text(&self) -> &str {
        &self.search.text
    }

    pub const fn search_focused(&self) -> bool {
        self.search.focused
    }

    pub const fn is_searching(&self) -> bool {
        self.lookup.is_some()
    }

    pub fn search_header(&self) -> Option<SearchHeader> {
        if self.controller.mode() != ViewMode::Search {
            return None;
        }
        self.controller
            .searched_address()
            .map(|address| SearchHeader {
                address: address.as_str().to_string(),
                family: address.family(),
                private: address.is_private(),
            })
    }

    pub fn controls(&self) -> Controls {
        Controls {
            refresh: refresh_control(self.controller.is_refreshing()),
            search: search_control(self.is_searching()),
            copy: copy_control(self.copy),
            clear_cache: clear_cache_control(self.clear_cache),
            back: (self.controller.mode() == ViewMode::Search).then(back_control),
        }
    }

    /// Earliest instant at which [`tick`](Self::tick) has something to do.
    pub fn next_deadline(&self) -> Option<Duration> {
        [
            self.debounce.deadline(),
            self.refresh.as_ref().and_then(RefreshCycle::next_deadline),
            self.copy.deadline(),
            self.clear_cache.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn command_for_key(&self, key: Key) -> Option<Command> {
        if self.search.focused {
            return match key {
                Key::Char(ch) => Some(Command::Input(ch)),
                Key::Backspace => Some(Command::DeleteBackward),
                Key::Enter => Some(Command::SubmitSearch),
                Key::Esc => Some(Command::LeaveInput),
                Key::Other => None,
            };
        }

        match key {
            Key::Char('r') => Some(Command::RequestRefresh),
            Key::Char('c') => Some(Command::Copy),
            Key::Char('x') => Some(Command::ClearCache),
            Key::Char('/' | 's') => Some(Command::FocusSearch),
            Key::Char('b') => Some(Command::BackToSelf),
            Key::Esc if self.controller.mode() == ViewMode::Search => Some(Command::BackToSelf),
            Key::Enter if !self.search.text.trim().is_empty() => Some(Command::SubmitSearch),
            _ => None,
        }
    }

    pub fn handle(&mut self, command: Command, now: Duration) -> Vec<Effect> {
        match command {
            Command::RequestRefresh => {
                self.debounce.trigger(now);
                Vec::new()
            }
            Command::Copy => self
                .controller
                .current()
                .copy_target()
                .map(|ip| vec![Effect::Copy(ip.to_string())])
                .unwrap_or_default(),
            Command::ClearCache => {
                if !self.clear_cache.is_ready() {
                    return Vec::new();
                }
                self.clear_cache = ButtonState::Busy;
                vec![Effect::ClearCache]
            }
            Command::FocusSearch => {
                self.search.focused = true;
                Vec::new()
            }
            Command::Input(ch) => {
                if self.search.focused && !ch.is_control() {
                    self.search.text.push(ch);
                }
                Vec::new()
            }
            Command::DeleteBackward => {
                if self.search.focused {
                    self.search.text.pop();
                }
                Vec::new()
            }
            Command::LeaveInput => {
                self.search.focused = false;
                Vec::new()
            }
            Command::SubmitSearch => self.submit_search(),
            Command::BackToSelf => {
                self.back_to_self();
                Vec::new()
            }
        }
    }

    /// Advances timers: the refresh debounce, the refresh cycle and the
    /// button feedback holds.
    pub fn tick(&mut self, now: Duration) -> Vec<Effect> {
        let mut effects = Vec::new();

        if self.debounce.poll(now) {
            self.start_refresh(now);
        }

        let (cycle, tick) = self
            .refresh
            .as_mut()
            .map_or((0, RefreshTick::default()), |cycle| (cycle.id(), cycle.poll(now)));
        if tick.reload {
            log::debug!("Reloading IP data for refresh cycle {cycle}");
            effects.push(Effect::Reload { cycle });
        }
        if let Some(completion) = tick.completed {
            self.complete_refresh(completion);
        }

        self.copy.expire(now);
        self.clear_cache.expire(now);

        effects
    }

    pub fn on_lookup_finished(
        &mut self,
        address: &QueriedAddress,
        result: Result<IpRecord, ViewError>,
    ) -> Vec<Effect> {
        if self.lookup.as_ref() != Some(address) {
            log::debug!("Ignoring stale lookup result for {address}");
            return Vec::new();
        }
        self.lookup = None;

        let outcome = result
            .and_then(|record| self.controller.apply_search_result(record, address.as_str()));

        match outcome {
            Ok(()) => {
                self.revision += 1;
                Vec::new()
            }
            // The refresh is about to replace the whole view.
            Err(ViewError::RefreshPending) => {
                log::info!("Discarding lookup for {address}: a refresh is in progress");
                Vec::new()
            }
            Err(error) => {
                log::error!("Search error: {error}");
                vec![Effect::Alert(format!(
                    "Failed to lookup IP address: {error}"
                ))]
            }
        }
    }

    pub fn on_clear_cache_finished(&mut self, result: Result<(), ViewError>, now: Duration) {
        self.clear_cache = match result {
            Ok(()) => ButtonState::flash(Tone::Success, now),
            Err(error) => {
                log::error!("Failed to clear cache: {error}");
                ButtonState::flash(Tone::Failure, now)
            }
        };
    }

    pub fn on_copy_finished(&mut self, result: Result<(), ViewError>, now: Duration) -> Vec<Effect> {
        match result {
            Ok(()) => {
                self.copy = ButtonState::flash(Tone::Success, now);
                Vec::new()
            }
            Err(error) => {
                log::error!("Copy failed: {error}");
                vec![Effect::Alert(COPY_FAILED_ALERT.to_string())]
            }
        }
    }

    /// A successful reload starts a fresh view, exactly like a page load.
    ///
    /// Only the reload issued by the running cycle completes it. A late
    /// result from an earlier cycle still replaces the record, but the
    /// running cycle keeps its own dwell, reload and timeout.
    pub fn on_reload_finished(&mut self, cycle: u64, result: Result<IpRecord, ViewError>) {
        let owns_cycle = self
            .refresh
            .as_ref()
            .is_some_and(|running| running.id() == cycle && running.reload_issued());
        if !owns_cycle {
            log::debug!("Reload from refresh cycle {cycle} arrived outside its cycle");
        }

        match result {
            Ok(record) => {
                if owns_cycle {
                    self.finish_refresh(Completion::Reloaded);
                }
                self.controller = ViewController::load(record);
                if self.refresh.is_some() {
                    // The guard belongs to the running cycle, not to the record.
                    if let Err(error) = self.controller.begin_refresh() {
                        log::warn!("Could not carry the refresh guard over: {error}");
                    }
                }
                self.search = SearchInput::default();
                self.lookup = None;
                self.revision += 1;
            }
            Err(error) => {
                log::error!("Refresh failed: {error}");
                if owns_cycle {
                    self.finish_refresh(Completion::Failed);
                }
            }
        }
    }

    fn submit_search(&mut self) -> Vec<Effect> {
        if self.lookup.is_some() {
            return Vec::new();
        }

        let input = self.search.text.trim();
        if input.is_empty() {
            return vec![Effect::Alert(EMPTY_QUERY_ALERT.to_string())];
        }

        match self.controller.validate_query(input) {
            Ok(address) => {
                self.search.focused = false;
                self.lookup = Some(address.clone());
                vec![Effect::Lookup(address)]
            }
            Err(ViewError::RefreshPending) => vec![Effect::Alert(REFRESH_PENDING_ALERT.to_string())],
            Err(_) => vec![Effect::Alert(INVALID_QUERY_ALERT.to_string())],
        }
    }

    fn back_to_self(&mut self) {
        let changed = self.controller.mode() == ViewMode::Search;
        self.controller.return_to_self();
        self.search = SearchInput::default();
        if changed {
            self.revision += 1;
        }
    }

    fn start_refresh(&mut self, now: Duration) {
        match self.controller.begin_refresh() {
            Ok(()) => {
                self.cycles += 1;
                self.refresh = Some(RefreshCycle::start(self.cycles, self.policy, now));
            }
            Err(error) => log::info!("Ignoring refresh request: {error}"),
        }
    }

    fn finish_refresh(&mut self, outcome: Completion) {
        let completed = self
            .refresh
            .as_mut()
            .and_then(|cycle| cycle.finish(outcome));
        if let Some(completion) = completed {
            self.complete_refresh(completion);
        }
    }

    fn complete_refresh(&mut self, completion: Completion) {
        if completion == Completion::TimedOut {
            log::warn!("Refresh timeout reached, forcing completion");
        }
        self.refresh = None;
        self.controller.end_refresh();
    }
}
