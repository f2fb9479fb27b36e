use std::sync::LazyLock;

use chrono::{Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use regex::{Captures, Regex};

use super::ParsedTime;

/// Turns free text into a point in time, relative to a reference instant.
pub trait TimeParser: Send + Sync {
    /// Returns `None` when the text holds no usable time.
    fn parse(&self, text: &str, now: NaiveDateTime) -> Option<ParsedTime>;
}

static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?P<digits>\d{1,4})(?::(?P<minute>\d{2}))?\s*(?P<meridiem>[ap])\.?m\.?\b")
        .expect("clock pattern is valid")
});

static ZONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?P<name>utc|gmt|z)\b)?(?:\s*(?P<sign>[+-])(?P<hours>\d{1,2})(?::?(?P<minutes>\d{2}))?\b)?",
    )
    .expect("zone pattern is valid")
});

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<year>\d{4})-(?P<month>\d{1,2})-(?P<day>\d{1,2})\b")
        .expect("iso date pattern is valid")
});

static SLASH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<month>\d{1,2})/(?P<day>\d{1,2})(?:/(?P<year>\d{4}|\d{2}))?\b")
        .expect("slash date pattern is valid")
});

static DAY_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?P<word>today|tonight|tomorrow|tmrw|yesterday)\b")
        .expect("day word pattern is valid")
});

static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?P<next>next\s+)?(?P<day>monday|tuesday|tues|tue|wednesday|thursday|thurs|thur|thu|friday|fri|saturday|sunday)\b",
    )
    .expect("weekday pattern is valid")
});

/// Understands a clock time with an am/pm marker, optionally accompanied by a
/// day (`tomorrow`, `friday`, `2024-03-10`, `3/10`) and an offset (`utc`, `z`, `+05:30`).
#[derive(Debug, Default, Clone, Copy)]
pub struct ClockTimeParser;

impl TimeParser for ClockTimeParser {
    fn parse(&self, text: &str, now: NaiveDateTime) -> Option<ParsedTime> {
        let (time, rest) = CLOCK
            .captures_iter(text)
            .find_map(|caps| Some((clock_time(&caps)?, &text[caps.get(0)?.end()..])))?;
        let date = find_date(text, now.date()).unwrap_or(now.date());
        let naive = date.and_time(time);

        match zone_offset(rest) {
            Some(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .map(ParsedTime::Aware),
            None => Some(ParsedTime::Naive(naive)),
        }
    }
}

fn clock_time(caps: &Captures<'_>) -> Option<NaiveTime> {
    let digits = &caps["digits"];
    let (hour, minute) = match (digits.len(), caps.name("minute")) {
        (1 | 2, Some(minute)) => (digits.parse::<u32>().ok()?, minute.as_str().parse().ok()?),
        (1 | 2, None) => (digits.parse().ok()?, 0),
        // `921pm` style, hour and minute glued together
        (3 | 4, None) => {
            let value = digits.parse::<u32>().ok()?;
            (value / 100, value % 100)
        }
        _ => return None,
    };
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }
    let hour = match caps["meridiem"].to_ascii_lowercase().as_str() {
        "a" => hour % 12,
        _ => hour % 12 + 12,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn find_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE.captures(text) {
        return NaiveDate::from_ymd_opt(
            caps["year"].parse().ok()?,
            caps["month"].parse().ok()?,
            caps["day"].parse().ok()?,
        );
    }
    if let Some(caps) = SLASH_DATE.captures(text) {
        let year = match caps.name("year") {
            Some(year) if year.as_str().len() == 2 => 2000 + year.as_str().parse::<i32>().ok()?,
            Some(year) => year.as_str().parse().ok()?,
            None => today.year(),
        };
        return NaiveDate::from_ymd_opt(year, caps["month"].parse().ok()?, caps["day"].parse().ok()?);
    }
    if let Some(caps) = DAY_WORD.captures(text) {
        return match caps["word"].to_ascii_lowercase().as_str() {
            "tomorrow" | "tmrw" => today.checked_add_days(Days::new(1)),
            "yesterday" => today.checked_sub_days(Days::new(1)),
            _ => Some(today),
        };
    }
    if let Some(caps) = WEEKDAY.captures(text) {
        let target = caps["day"][..3].parse::<Weekday>().ok()?;
        let mut ahead = (7 + target.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
        if ahead == 0 && caps.name("next").is_some() {
            ahead = 7;
        }
        return today.checked_add_days(Days::new(ahead.into()));
    }
    None
}

/// A bare signed number only counts as an offset in the `+HH:MM`/`+HHMM` form,
/// so `3pm-5` or `7pm +1 guest` stay in the author's zone.
fn zone_offset(rest: &str) -> Option<FixedOffset> {
    let caps = ZONE.captures(rest)?;
    let Some(sign) = caps.name("sign") else {
        return caps.name("name").and_then(|_| FixedOffset::east_opt(0));
    };
    let named = caps.name("name").is_some_and(|name| !name.as_str().eq_ignore_ascii_case("z"));
    if !named && (caps["hours"].len() != 2 || caps.name("minutes").is_none()) {
        return None;
    }
    let hours: i32 = caps["hours"].parse().ok()?;
    let minutes: i32 = caps
        .name("minutes")
        .map_or(Some(0), |m| m.as_str().parse().ok())?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    let seconds = hours * 3600 + minutes * 60;
    FixedOffset::east_opt(if sign.as_str() == "-" { -seconds } else { seconds })
}
