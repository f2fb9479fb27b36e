use chrono::{DateTime, LocalResult, NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use snafu::{OptionExt, Snafu};

use super::ParsedTime;

#[derive(Debug, Snafu)]
pub enum LocalizeError {
    #[snafu(display("`{zone}` is not a recognised timezone"))]
    UnknownZone { zone: String },
    #[snafu(display("{naive} does not exist in {zone}"))]
    Nonexistent { naive: NaiveDateTime, zone: Tz },
}

/// Places a parsed time in the named zone.
///
/// Naive times get the zone attached, aware times are converted. A naive time
/// repeated by a DST fall-back resolves to the later (standard time) instant; one
/// skipped by a spring-forward uses the offset in effect just before the gap.
pub fn localize(parsed: ParsedTime, zone: &str) -> Result<DateTime<Tz>, LocalizeError> {
    let tz = zone.parse::<Tz>().ok().context(UnknownZoneSnafu { zone })?;
    match parsed {
        ParsedTime::Aware(dt) => Ok(dt.with_timezone(&tz)),
        ParsedTime::Naive(naive) => match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Ok(dt),
            LocalResult::Ambiguous(_, standard) => Ok(standard),
            LocalResult::None => tz
                .from_local_datetime(&(naive - TimeDelta::hours(1)))
                .single()
                .map(|dt| dt + TimeDelta::hours(1))
                .context(NonexistentSnafu { naive, zone: tz }),
        },
    }
}
