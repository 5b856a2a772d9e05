//! Unlock mini-game: pull the ribbon, then tap the heart.
//!
//! Pure state with no timers of its own. The caller feeds drag offsets,
//! taps and elapsed time; the letter is revealed whether or not the
//! target was reached.

use std::time::Duration;

/// Rules for one unlock round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockRules {
    /// Taps needed for a successful unlock.
    pub tap_threshold: u32,
    /// Time allowed for tapping.
    pub time_limit: Duration,
    /// Drag distance past which the ribbon counts as pulled.
    pub ribbon_pull_distance: u32,
}

impl Default for UnlockRules {
    fn default() -> Self {
        Self {
            tap_threshold: 30,
            time_limit: Duration::from_secs(5),
            ribbon_pull_distance: 100,
        }
    }
}

/// The ribbon wrapped around a sealed letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ribbon {
    offset: u32,
    pull_distance: u32,
    pulled: bool,
}

impl Ribbon {
    #[must_use]
    pub const fn new(pull_distance: u32) -> Self {
        Self {
            offset: 0,
            pull_distance,
            pulled: false,
        }
    }

    /// Apply a drag to vertical offset `offset` (negative clamps to 0).
    ///
    /// Returns true exactly once: on the drag that pulls the ribbon.
    pub fn drag(&mut self, offset: i64) -> bool {
        if self.pulled {
            return false;
        }
        self.offset = u32::try_from(offset.max(0)).unwrap_or(u32::MAX);
        if self.offset > self.pull_distance {
            self.pulled = true;
            return true;
        }
        false
    }

    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    #[must_use]
    pub const fn is_pulled(&self) -> bool {
        self.pulled
    }
}

/// Result of a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockOutcome {
    pub taps: u32,
    pub success: bool,
}

/// Tap-the-heart round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartGame {
    rules: UnlockRules,
    taps: u32,
    time_left: Duration,
}

impl HeartGame {
    #[must_use]
    pub const fn new(rules: UnlockRules) -> Self {
        Self {
            rules,
            taps: 0,
            time_left: rules.time_limit,
        }
    }

    /// Register one tap. Ignored once the round is over.
    ///
    /// Returns whether the tap counted.
    pub fn tap(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        self.taps += 1;
        true
    }

    /// Advance the clock by `elapsed`, saturating at zero.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.taps >= self.rules.tap_threshold {
            return;
        }
        self.time_left = self.time_left.saturating_sub(elapsed);
    }

    #[must_use]
    pub const fn taps(&self) -> u32 {
        self.taps
    }

    #[must_use]
    pub const fn time_left(&self) -> Duration {
        self.time_left
    }

    /// Progress toward the threshold, capped at 100.
    #[must_use]
    pub fn fill_percentage(&self) -> f64 {
        let threshold = f64::from(self.rules.tap_threshold.max(1));
        (f64::from(self.taps) / threshold * 100.0).min(100.0)
    }

    /// Time ran out or the threshold was reached.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.time_left.is_zero() || self.taps >= self.rules.tap_threshold
    }

    /// Outcome, once complete.
    #[must_use]
    pub fn outcome(&self) -> Option<UnlockOutcome> {
        self.is_complete().then(|| UnlockOutcome {
            taps: self.taps,
            success: self.taps >= self.rules.tap_threshold,
        })
    }
}
