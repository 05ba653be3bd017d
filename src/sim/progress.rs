/// Progress and rating: the data a host persists and shows between attempts.
///
/// Nothing here touches storage or the simulation. The host feeds
/// `LevelCompleted` into `Progress::record_completion` and wall-clock seconds
/// into `LevelTimer::tick_second`.

use serde::{Deserialize, Serialize};

use crate::config::TimerConfig;

// ══════════════════════════════════════════════════════════════
// Unlock frontier
// ══════════════════════════════════════════════════════════════

/// Highest level the player may select. Level 1 is always open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default = "default_highest")]
    pub highest_unlocked: u32,
}

fn default_highest() -> u32 {
    1
}

impl Default for Progress {
    fn default() -> Self {
        Progress { highest_unlocked: default_highest() }
    }
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp a stored value into `1..=total`, e.g. after the pack shrank.
    pub fn clamped(self, total: u32) -> Self {
        Progress { highest_unlocked: self.highest_unlocked.clamp(1, total.max(1)) }
    }

    pub fn is_unlocked(&self, id: u32) -> bool {
        id >= 1 && id <= self.highest_unlocked
    }

    /// Advance the frontier after completing `id`.
    /// Replaying an earlier level unlocks nothing, and the last level has no
    /// successor. Returns the newly unlocked id.
    pub fn record_completion(&mut self, id: u32, total: u32) -> Option<u32> {
        if id >= self.highest_unlocked && id < total {
            self.highest_unlocked = id + 1;
            log::info!("level {} unlocked", self.highest_unlocked);
            Some(self.highest_unlocked)
        } else {
            None
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Level timer
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    Untimed,
    Running { remaining: u32 },
    /// Reported exactly once, on the tick that reaches zero.
    Expired,
    /// Already at zero.
    OutOfTime,
}

/// Countdown for one attempt. Early levels run without a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTimer {
    remaining: Option<u32>,
    three_star_above: u32,
    two_star_above: u32,
}

impl LevelTimer {
    pub fn for_level(id: u32, cfg: &TimerConfig) -> Self {
        let remaining = (id > cfg.untimed_through).then_some(cfg.level_seconds);
        LevelTimer {
            remaining,
            three_star_above: cfg.three_star_above,
            two_star_above: cfg.two_star_above,
        }
    }

    pub fn is_timed(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == Some(0)
    }

    /// One second of play time has passed.
    pub fn tick_second(&mut self) -> TimerTick {
        match self.remaining.as_mut() {
            None => TimerTick::Untimed,
            Some(0) => TimerTick::OutOfTime,
            Some(r) => {
                *r -= 1;
                if *r == 0 {
                    log::debug!("level timer expired");
                    TimerTick::Expired
                } else {
                    TimerTick::Running { remaining: *r }
                }
            }
        }
    }

    /// Apply `seconds` of elapsed play at once. Returns the last tick.
    pub fn advance(&mut self, seconds: u32) -> TimerTick {
        let mut last = self.status();
        for _ in 0..seconds {
            last = self.tick_second();
            if !matches!(last, TimerTick::Running { .. }) {
                break;
            }
        }
        last
    }

    /// Current state without consuming a second.
    pub fn status(&self) -> TimerTick {
        match self.remaining {
            None => TimerTick::Untimed,
            Some(0) => TimerTick::OutOfTime,
            Some(remaining) => TimerTick::Running { remaining },
        }
    }

    /// Rating for a completion at the current remaining time.
    pub fn stars(&self) -> u8 {
        match self.remaining {
            None => 3,
            Some(r) if r > self.three_star_above => 3,
            Some(r) if r > self.two_star_above => 2,
            Some(_) => 1,
        }
    }

    /// `MM:SS`, or `--:--` without a clock.
    pub fn display(&self) -> String {
        match self.remaining {
            None => "--:--".to_string(),
            Some(r) => format!("{:02}:{:02}", r / 60, r % 60),
        }
    }
}
