//! Labels and enablement of the dashboard buttons.

use std::time::Duration;

/// How long a success or failure label stays up before reverting.
pub const FEEDBACK_HOLD: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Normal,
    Busy,
    Success,
    Failure,
}

/// Transient state of a button that reports the outcome of its action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Ready,
    Busy,
    Flash {
        tone: Tone,
        until: Duration,
    },
}

impl ButtonState {
    pub fn flash(tone: Tone, now: Duration) -> Self {
        Self::Flash {
            tone,
            until: now + FEEDBACK_HOLD,
        }
    }

    /// Reverts a flash whose hold has elapsed. Returns true if it reverted.
    pub fn expire(&mut self, now: Duration) -> bool {
        match *self {
            Self::Flash { until, .. } if now >= until => {
                *self = Self::Ready;
                true
            }
            _ => false,
        }
    }

    pub const fn deadline(&self) -> Option<Duration> {
        match self {
            Self::Flash { until, .. } => Some(*until),
            _ => None,
        }
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// What a single button should look like right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ControlView {
    pub label: &'static str,
    pub enabled: bool,
    pub tone: Tone,
}

impl ControlView {
    const fn ready(label: &'static str) -> Self {
        Self {
            label,
            enabled: true,
            tone: Tone::Normal,
        }
    }

    const fn busy(label: &'static str) -> Self {
        Self {
            label,
            enabled: false,
            tone: Tone::Busy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Controls {
    pub refresh: ControlView,
    pub search: ControlView,
    pub copy: ControlView,
    pub clear_cache: ControlView,
    /// Only offered while viewing search results.
    pub back: Option<ControlView>,
}

pub const fn refresh_control(refreshing: bool) -> ControlView {
    if refreshing {
        ControlView::busy("Refreshing...")
    } else {
        ControlView::ready("Refresh Data")
    }
}

pub const fn search_control(searching: bool) -> ControlView {
    if searching {
        ControlView::busy("Searching...")
    } else {
        ControlView::ready("Search")
    }
}

pub const fn copy_control(state: ButtonState) -> ControlView {
    match state {
        ButtonState::Flash { tone, .. } => ControlView {
            label: "Copied!",
            enabled: true,
            tone,
        },
        ButtonState::Ready | ButtonState::Busy => ControlView::ready("Copy IP"),
    }
}

/// The clear-cache button stays disabled until its outcome label reverts.
pub const fn clear_cache_control(state: ButtonState) -> ControlView {
    match state {
        ButtonState::Ready => ControlView::ready("Clear Cache"),
        ButtonState::Busy => ControlView::busy("Clearing..."),
        ButtonState::Flash {
            tone: Tone::Failure,
            ..
        } => ControlView {
            label: "Failed",
            enabled: false,
            tone: Tone::Failure,
        },
        ButtonState::Flash { tone, .. } => ControlView {
            label: "Cleared!",
            enabled: false,
            tone,
        },
    }
}

pub const fn back_control() -> ControlView {
    ControlView::ready("Back to My IP")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_reverts_after_hold() {
        let now = Duration::from_secs(3);
        let mut state = ButtonState::flash(Tone::Success, now);

        assert_eq!(state.deadline(), Some(Duration::from_secs(5)));
        assert!(!state.expire(Duration::from_millis(4_999)));
        assert!(state.expire(Duration::from_secs(5)));
        assert!(state.is_ready());
        assert!(!state.expire(Duration::from_secs(9)));
    }

    #[test]
    fn busy_is_not_expired_by_time() {
        let mut state = ButtonState::Busy;
        assert!(!state.expire(Duration::from_secs(60)));
        assert_eq!(state.deadline(), None);
    }

    #[test]
    fn clear_cache_labels_follow_state() {
        let now = Duration::ZERO;

        assert_eq!(clear_cache_control(ButtonState::Ready).label, "Clear Cache");

        let busy = clear_cache_control(ButtonState::Busy);
        assert_eq!(busy.label, "Clearing...");
        assert!(!busy.enabled);

        let cleared = clear_cache_control(ButtonState::flash(Tone::Success, now));
        assert_eq!(cleared.label, "Cleared!");
        assert!(!cleared.enabled);

        let failed = clear_cache_control(ButtonState::flash(Tone::Failure, now));
        assert_eq!(failed.label, "Failed");
        assert_eq!(failed.tone, Tone::Failure);
    }

    #[test]
    fn refresh_and_search_disable_while_busy() {
        assert_eq!(refresh_control(false).label, "Refresh Data");
        assert!(!refresh_control(true).enabled);
        assert_eq!(refresh_control(true).label, "Refreshing...");
        assert_eq!(search_control(true).label, "Searching...");
        assert!(search_control(false).enabled);
    }

    #[test]
    fn copy_shows_confirmation() {
        let copied = copy_control(ButtonState::flash(Tone::Success, Duration::ZERO));
        assert_eq!(copied.label, "Copied!");
        assert_eq!(copy_control(ButtonState::Ready).label, "Copy IP");
    }
}
