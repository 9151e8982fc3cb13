use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::*;

const EVERY: &str = "@every";

/// When update cycles run.
///
/// Accepts
/// - standard 5-field cron (`*/15 * * * *`), seconds are pinned to zero,
/// - 6 and 7-field cron with seconds (and years),
/// - the descriptors `@yearly`, `@monthly`, `@weekly`, `@daily` and `@hourly`,
/// - `@every <duration>` with a Go style duration such as `90s` or `1h30m`.
#[derive(Clone, Debug)]
pub enum Recurrence {
    Cron(Box<cron::Schedule>),
    Every(Duration),
}

impl Recurrence {
    /// First occurrence strictly after `after`.
    pub fn next_after(&self, after: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Cron(schedule) => schedule.after(after).next(),
            Self::Every(interval) => chrono::Duration::from_std(*interval)
                .ok()
                .and_then(|interval| after.checked_add_signed(interval)),
        }
    }

    /// How long to wait from `now` until the next occurrence.
    ///
    /// `None` when the schedule has no further occurrences.
    pub fn until_next(&self, now: &DateTime<Utc>) -> Option<Duration> {
        let next = self.next_after(now)?;
        Some((next - *now).to_std().unwrap_or_default())
    }
}

impl FromStr for Recurrence {
    type Err = RecurrenceError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(RecurrenceError::Empty);
        }

        if let Some(interval) = spec.strip_prefix(EVERY) {
            return parse_go_duration(interval)
                .map(Self::Every)
                .map_err(|reason| RecurrenceError::Every {
                    spec: spec.to_string(),
                    reason,
                });
        }

        let cron_error = |reason: String| RecurrenceError::Cron {
            spec: spec.to_string(),
            reason,
        };
        let expr = normalize_cron_expr(spec).map_err(cron_error)?;
        cron::Schedule::from_str(&expr)
            .map(|schedule| Self::Cron(Box::new(schedule)))
            .map_err(|err| cron_error(err.to_string()))
    }
}

/// Parses a positive Go style duration (`300ms`, `1h30m`, ...).
pub fn parse_go_duration(text: &str) -> Result<Duration, String> {
    let nanos = go_parse_duration::parse_duration(text.trim()).map_err(|err| format!("{err:?}"))?;
    u64::try_from(nanos)
        .ok()
        .filter(|nanos| *nanos > 0)
        .map(Duration::from_nanos)
        .ok_or_else(|| format!("{text:?} is not a positive duration"))
}

// The cron crate wants a seconds field in front of the standard five, and
// numbers the days of the week 1 (Sunday) to 7 where standard cron uses 0 to 6.
fn normalize_cron_expr(expr: &str) -> Result<String, String> {
    let fields = expr.split_whitespace().collect::<Vec<_>>();
    match fields.as_slice() {
        [minute, hour, day, month, weekday] => {
            let weekday = shift_day_of_week(weekday)?;
            Ok(format!("0 {minute} {hour} {day} {month} {weekday}"))
        }
        _ => Ok(expr.to_string()),
    }
}

const SUNDAY: u32 = 0;
const SATURDAY: u32 = 6;

/// Rewrites a standard cron day-of-week field (0 or 7 is Sunday) into the
/// cron crate's numbering. Day names are passed through untouched.
fn shift_day_of_week(field: &str) -> Result<String, String> {
    if matches!(field, "*" | "?") {
        return Ok(field.to_string());
    }

    let mut names = Vec::new();
    let mut days = BTreeSet::new();
    for item in field.split(',') {
        if item.chars().any(|c| c.is_ascii_alphabetic()) {
            names.push(item.to_string());
        } else {
            days.extend(expand_day_item(item)?);
        }
    }

    let shifted = days.into_iter().map(|day| (day + 1).to_string());
    Ok(names.into_iter().chain(shifted).collect::<Vec<_>>().join(","))
}

fn expand_day_item(item: &str) -> Result<Vec<u32>, String> {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, Some(parse_day_number(step)?)),
        None => (item, None),
    };
    if step == Some(0) {
        return Err(format!("day of week step must be positive in {item:?}"));
    }

    let (first, last) = match (range, range.split_once('-')) {
        ("*", _) => (SUNDAY, SATURDAY),
        (_, Some((first, last))) => (parse_day_number(first)?, parse_day_number(last)?),
        (day, None) if step.is_some() => (parse_day_number(day)?, SATURDAY),
        (day, None) => {
            let day = parse_day_number(day)?;
            (day, day)
        }
    };
    if first > 7 || last > 7 || first > last {
        return Err(format!("day of week out of range in {item:?}"));
    }

    let step = step.map_or(1, |step| step as usize);
    Ok((first..=last).step_by(step).map(|day| day % 7).collect())
}

fn parse_day_number(text: &str) -> Result<u32, String> {
    text.parse()
        .map_err(|_| format!("{text:?} is not a day of the week"))
}
