use serde::Serialize;

use crate::record::RenameRecord;

pub const WORK_NAME_REQUIRED: &str = "work name must not be empty";
pub const RESOLUTION_REQUIRED: &str = "resolution must be selected";
pub const SEASON_REQUIRED: &str = "season is required";
pub const SEASON_RANGE: &str = "season must be a number greater than 0";
pub const START_EPISODE_REQUIRED: &str = "start episode is required";
pub const START_EPISODE_RANGE: &str = "start episode must be a number greater than 0";
pub const WORK_YEAR_RANGE: &str = "work year must be a number between 1900 and 2100";

const YEAR_RANGE: std::ops::RangeInclusive<u32> = 1900..=2100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Check a record before composing a name from it. Every rule runs, so the
/// report lists all violations in a fixed order.
pub fn validate(record: &RenameRecord) -> ValidationReport {
    let mut errors = Vec::new();

    if record.work_name.trim().is_empty() {
        errors.push(WORK_NAME_REQUIRED.to_string());
    }

    if record.resolution.trim().is_empty() {
        errors.push(RESOLUTION_REQUIRED.to_string());
    }

    match record.season {
        None => errors.push(SEASON_REQUIRED.to_string()),
        Some(0) => errors.push(SEASON_RANGE.to_string()),
        Some(_) => {}
    }

    match record.start_episode {
        None => errors.push(START_EPISODE_REQUIRED.to_string()),
        Some(0) => errors.push(START_EPISODE_RANGE.to_string()),
        Some(_) => {}
    }

    // Year 0 reads as "no year", as it does when composing.
    if let Some(year) = record.work_year.filter(|y| *y != 0) {
        if !YEAR_RANGE.contains(&year) {
            errors.push(WORK_YEAR_RANGE.to_string());
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}
