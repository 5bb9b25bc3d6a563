//! Temporal status of a walk, derived from stored timestamps only.
//!
//! A walk counts as `Active` from one leeway before its scheduled start until
//! one leeway after its end, where the end is the explicit
//! `estimated_end_time` if present, else `date + duration + buffer`. The
//! result depends on `now`; do not cache it across calls.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::config::RotationConfig;
use crate::domain::walk::Walk;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkStatus {
    Pending,
    Active,
    Past,
}

/// Leeway and buffer used by [`walk_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockWindow {
    pub leeway: Duration,
    pub buffer: Duration,
}

impl ClockWindow {
    pub fn from_config(config: &RotationConfig) -> Self {
        Self {
            leeway: Duration::minutes(config.leeway_minutes),
            buffer: Duration::minutes(config.buffer_minutes),
        }
    }
}

impl Default for ClockWindow {
    fn default() -> Self {
        Self {
            leeway: Duration::hours(1),
            buffer: Duration::minutes(60),
        }
    }
}

/// End of the walk before leeway is applied.
pub fn walk_end(walk: &Walk, window: &ClockWindow) -> OffsetDateTime {
    walk.estimated_end_time.unwrap_or_else(|| {
        walk.date + Duration::minutes(i64::from(walk.duration_minutes)) + window.buffer
    })
}

/// Classify the walk at `now`. An explicit `forced_status` wins.
pub fn walk_status(walk: &Walk, now: OffsetDateTime, window: &ClockWindow) -> WalkStatus {
    if let Some(forced) = walk.forced_status {
        return forced;
    }

    let opens = walk.date - window.leeway;
    let closes = walk_end(walk, window) + window.leeway;

    if now >= opens && now <= closes {
        WalkStatus::Active
    } else if now < opens {
        WalkStatus::Pending
    } else {
        WalkStatus::Past
    }
}
