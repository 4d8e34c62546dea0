//! Minimal opening-hours evaluator, covering the subset the engine
//! actually needs: day-range plus time-range expressions like
//! `"Mo-Fr 06:00-22:00"`. Not a general `opening_hours` tag parser — the
//! full grammar has no crate in this stack (`opening_hours` wasn't found
//! in any example repo's dependency list), so this implements just
//! enough to evaluate elevator availability against a timestamp, built on
//! `chrono` the way the rest of the engine already depends on it.

use chrono::{DateTime, Datelike, Timelike, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Weekday {
    Mo,
    Tu,
    We,
    Th,
    Fr,
    Sa,
    Su,
}

impl Weekday {
    fn from_abbrev(s: &str) -> Option<Self> {
        Some(match s {
            "Mo" => Weekday::Mo,
            "Tu" => Weekday::Tu,
            "We" => Weekday::We,
            "Th" => Weekday::Th,
            "Fr" => Weekday::Fr,
            "Sa" => Weekday::Sa,
            "Su" => Weekday::Su,
            _ => return None,
        })
    }

    fn from_chrono(d: chrono::Weekday) -> Self {
        match d {
            chrono::Weekday::Mon => Weekday::Mo,
            chrono::Weekday::Tue => Weekday::Tu,
            chrono::Weekday::Wed => Weekday::We,
            chrono::Weekday::Thu => Weekday::Th,
            chrono::Weekday::Fri => Weekday::Fr,
            chrono::Weekday::Sat => Weekday::Sa,
            chrono::Weekday::Sun => Weekday::Su,
        }
    }
}

struct Rule {
    days: (Weekday, Weekday),
    start_min: u32,
    end_min: u32,
}

fn parse_time(s: &str) -> Option<u32> {
    let (h, m) = s.split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    Some(h * 60 + m)
}

fn parse_rule(expr: &str) -> Option<Rule> {
    let mut parts = expr.split_whitespace();
    let day_part = parts.next()?;
    let time_part = parts.next()?;

    let (d1, d2) = match day_part.split_once('-') {
        Some((a, b)) => (Weekday::from_abbrev(a)?, Weekday::from_abbrev(b)?),
        None => {
            let d = Weekday::from_abbrev(day_part)?;
            (d, d)
        }
    };

    let (t1, t2) = time_part.split_once('-')?;
    let start_min = parse_time(t1)?;
    let end_min = parse_time(t2)?;

    Some(Rule {
        days: (d1, d2),
        start_min,
        end_min,
    })
}

fn day_in_range(day: Weekday, start: Weekday, end: Weekday) -> bool {
    if start as u8 <= end as u8 {
        day as u8 >= start as u8 && day as u8 <= end as u8
    } else {
        // wraps across the week boundary, e.g. Fr-Mo
        day as u8 >= start as u8 || day as u8 <= end as u8
    }
}

/// Evaluate whether `expr` permits access at `timestamp` (seconds since
/// epoch, UTC). Unparseable expressions are treated as always-open rather
/// than rejected — a malformed `opening_hours` tag on an otherwise-usable
/// elevator path shouldn't make the whole network unreachable.
pub fn is_open(expr: &str, timestamp: f64) -> bool {
    let dt: DateTime<Utc> = match DateTime::from_timestamp(timestamp as i64, 0) {
        Some(dt) => dt,
        None => return true,
    };
    let day = Weekday::from_chrono(dt.weekday());
    let minute_of_day = dt.hour() * 60 + dt.minute();

    let mut any_rule_parsed = false;
    for segment in expr.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if let Some(rule) = parse_rule(segment) {
            any_rule_parsed = true;
            if day_in_range(day, rule.days.0, rule.days.1)
                && minute_of_day >= rule.start_min
                && minute_of_day < rule.end_min
            {
                return true;
            }
        }
    }

    !any_rule_parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> f64 {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap().timestamp() as f64
    }

    #[test]
    fn open_weekday_morning() {
        // 2026-07-27 is a Monday
        let t = ts(2026, 7, 27, 8, 0);
        assert!(is_open("Mo-Fr 06:00-22:00", t));
    }

    #[test]
    fn closed_saturday() {
        // 2026-08-01 is a Saturday
        let t = ts(2026, 8, 1, 10, 0);
        assert!(!is_open("Mo-Fr 06:00-22:00", t));
    }

    #[test]
    fn closed_before_opening() {
        let t = ts(2026, 7, 27, 5, 0);
        assert!(!is_open("Mo-Fr 06:00-22:00", t));
    }

    #[test]
    fn unparseable_defaults_open() {
        let t = ts(2026, 7, 27, 5, 0);
        assert!(is_open("garbled nonsense", t));
    }
}
