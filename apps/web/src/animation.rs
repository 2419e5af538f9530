use std::time::Duration;

use ipgeo_view::projection::{card_delay, CARD_FADE};

/// How far a detail row has faded in. The DOM backend redraws whole cells,
/// so the fade is rendered in three steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealStep {
    Hidden,
    Dim,
    Shown,
}

const DIM_FROM: f64 = 0.35;
const SHOWN_FROM: f64 = 0.8;

/// Staggered entrance of the detail rows, restarted on every new projection.
#[derive(Clone, Copy, Debug, Default)]
pub struct CardReveal {
    revision: Option<u64>,
    started: Duration,
}

impl CardReveal {
    /// Restarts the reveal when `revision` differs from the one last seen.
    pub fn sync(&mut self, revision: u64, now: Duration) -> bool {
        if self.revision == Some(revision) {
            return false;
        }
        self.revision = Some(revision);
        self.started = now;
        true
    }

    pub fn step(&self, index: usize, now: Duration) -> RevealStep {
        reveal_step(reveal_progress(now.saturating_sub(self.started), index))
    }
}

/// Fraction of row `index`'s fade completed `elapsed` after the reveal began.
pub fn reveal_progress(elapsed: Duration, index: usize) -> f64 {
    let delay = card_delay(index);
    let Some(into_fade) = elapsed.checked_sub(delay) else {
        return 0.0;
    };
    (into_fade.as_secs_f64() / CARD_FADE.as_secs_f64()).clamp(0.0, 1.0)
}

pub fn reveal_step(progress: f64) -> RevealStep {
    if progress >= SHOWN_FROM {
        RevealStep::Shown
    } else if progress >= DIM_FROM {
        RevealStep::Dim
    } else {
        RevealStep::Hidden
    }
}
