//! Finding, parsing and rendering clock times mentioned in chat messages.

mod localize;
mod parser;
mod render;

pub use localize::{LocalizeError, localize};
pub use parser::{ClockTimeParser, TimeParser};
pub use render::{TimestampStyle, long_reply_description, long_reply_title, short_reply};

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use regex::Regex;

/// Loose match for a clock time such as `9pm`, `9:21 PM`, `921pm` or `9 p.m.`.
static CLOCK_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{1,4}(?::\d{2})?\s*(a\.?m\.?|p\.?m\.?)\b")
        .expect("clock time pattern is valid")
});

/// Cheap check run on every message before the parser is invoked.
///
/// This is only a heuristic and may match things the parser later rejects.
pub fn is_time_candidate(text: &str) -> bool {
    CLOCK_TIME.is_match(text)
}

/// A point in time found in a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTime {
    /// Wall-clock time with no zone attached.
    Naive(NaiveDateTime),
    /// Time that carried an explicit offset in the message.
    Aware(DateTime<FixedOffset>),
}
