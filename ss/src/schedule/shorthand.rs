//! Descriptor shorthand parser
//!
//! Format: `kind-days-time-weeks-m|o[-label]`
//!
//! - kind: `le` lecture, `di` discussion, `la` lab, `hw` homework
//! - days: weekday digits, 0 = Sunday (`135` = Mon/Wed/Fri)
//! - time: `HHMMHHMM` for meetings, `HHMM` due time for homework; `2400` = 23:59
//! - weeks: week digits 0-9, or `all` / `odd`
//! - `m` mandatory, `o` optional
//! - label: optional title label, defaults to the kind's name; may contain `-`
//!
//! Example: `le-135-10001050-all-m`, `hw-5-1159-odd-o-Problem Set`

use std::collections::BTreeSet;

use chrono::NaiveTime;
use tracing::debug;

use super::ScheduleError;
use super::expander::Descriptor;
use super::rule::{MAX_WEEKDAY, WeekSpec};
use crate::domain::WorkKind;

/// Parse one shorthand token into a descriptor (no parent attached)
pub fn parse_descriptor(token: &str) -> Result<Descriptor, ScheduleError> {
    debug!(%token, "parse_descriptor: called");
    let fields: Vec<&str> = token.trim().splitn(6, '-').collect();
    if fields.len() < 5 {
        return Err(ScheduleError::shorthand(
            token,
            format!("expected 5 or 6 '-' separated fields, got {}", fields.len()),
        ));
    }

    let kind: WorkKind = fields[0].parse().map_err(|e: String| ScheduleError::shorthand(token, e))?;
    let weekdays = parse_weekdays(fields[1]).map_err(|e| ScheduleError::shorthand(token, e))?;
    let (start_time, end_time) = parse_times(kind, fields[2]).map_err(|e| ScheduleError::shorthand(token, e))?;
    let weeks = fields[3]
        .parse::<WeekSpec>()
        .map_err(|e| ScheduleError::shorthand(token, e))?
        .expand();
    let mandatory = match fields[4] {
        "m" | "M" => true,
        "o" | "O" => false,
        other => {
            return Err(ScheduleError::shorthand(
                token,
                format!("attendance must be 'm' or 'o', got '{}'", other),
            ));
        }
    };
    let label = fields
        .get(5)
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .unwrap_or(kind.display_name())
        .to_string();

    Ok(Descriptor {
        kind,
        weekdays,
        weeks,
        start_time: Some(start_time),
        end_time,
        mandatory,
        label: Some(label),
        parent: None,
    })
}

/// Parse weekday digits, e.g. `135`
pub fn parse_weekdays(s: &str) -> Result<BTreeSet<u8>, String> {
    if s.is_empty() {
        return Err("weekday set is empty".to_string());
    }
    s.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if d <= u32::from(MAX_WEEKDAY) => Ok(d as u8),
            _ => Err(format!("'{}' is not a weekday digit 0-6", c)),
        })
        .collect()
}

/// Parse `HHMM`; `2400` is read as 23:59
pub fn parse_time(s: &str) -> Result<NaiveTime, String> {
    if s.len() != 4 || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("time '{}' must be four digits HHMM", s));
    }
    if s == "2400" {
        return NaiveTime::from_hms_opt(23, 59, 0).ok_or_else(|| "invalid time".to_string());
    }
    let hours: u32 = s[..2].parse().map_err(|_| format!("invalid hours in '{}'", s))?;
    let minutes: u32 = s[2..].parse().map_err(|_| format!("invalid minutes in '{}'", s))?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(|| format!("time '{}' is out of range", s))
}

fn parse_times(kind: WorkKind, s: &str) -> Result<(NaiveTime, Option<NaiveTime>), String> {
    if kind.is_meeting() {
        let (Some(start), Some(end)) = (s.get(..4), s.get(4..)) else {
            return Err(format!("{} time must be HHMMHHMM, got '{}'", kind, s));
        };
        if end.len() != 4 {
            return Err(format!("{} time must be HHMMHHMM, got '{}'", kind, s));
        }
        Ok((parse_time(start)?, Some(parse_time(end)?)))
    } else {
        Ok((parse_time(s)?, None))
    }
}
