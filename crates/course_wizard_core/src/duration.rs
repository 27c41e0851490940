//! crates/course_wizard_core/src/duration.rs
//!
//! Converts stage work-hours into the totals shown on the preview step.

use crate::domain::Stage;
use serde::Serialize;
use std::fmt;

/// Hours in one working day.
pub const WORKING_HOURS_PER_DAY: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DurationSummary {
    pub total_hours: u32,
    pub working_days: u32,
}

impl DurationSummary {
    pub fn from_hours(total_hours: u32) -> Self {
        Self {
            total_hours,
            working_days: total_hours.div_ceil(WORKING_HOURS_PER_DAY),
        }
    }
}

impl fmt::Display for DurationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} working hours ({} working days)",
            self.total_hours, self.working_days
        )
    }
}

/// Sums the duration of `stages`.
pub fn compute_duration(stages: &[Stage]) -> DurationSummary {
    let total = stages
        .iter()
        .fold(0u32, |acc, stage| acc.saturating_add(stage.duration));
    DurationSummary::from_hours(total)
}
