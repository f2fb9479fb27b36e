use std::fmt;

use itertools::Itertools;

/// Discord's `<t:UNIX:STYLE>` display styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampStyle {
    FullDateTime,
    ShortDateTime,
    LongDate,
    ShortDate,
    LongTime,
    ShortTime,
    Relative,
}

impl TimestampStyle {
    pub const ALL: [TimestampStyle; 7] = [
        Self::FullDateTime,
        Self::ShortDateTime,
        Self::LongDate,
        Self::ShortDate,
        Self::LongTime,
        Self::ShortTime,
        Self::Relative,
    ];

    pub fn code(self) -> char {
        match self {
            Self::FullDateTime => 'F',
            Self::ShortDateTime => 'f',
            Self::LongDate => 'D',
            Self::ShortDate => 'd',
            Self::LongTime => 'T',
            Self::ShortTime => 't',
            Self::Relative => 'R',
        }
    }

    pub fn markup(self, unix: i64) -> String {
        format!("<t:{unix}:{}>", self.code())
    }
}

impl fmt::Display for TimestampStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FullDateTime => "full date and time",
            Self::ShortDateTime => "short date and time",
            Self::LongDate => "long date",
            Self::ShortDate => "short date",
            Self::LongTime => "long time",
            Self::ShortTime => "short time",
            Self::Relative => "relative",
        })
    }
}

/// `<t:U:F> (<t:U:R>)`
pub fn short_reply(unix: i64) -> String {
    format!(
        "{} ({})",
        TimestampStyle::FullDateTime.markup(unix),
        TimestampStyle::Relative.markup(unix)
    )
}

pub fn long_reply_title(unix: i64) -> String {
    format!("Timestamps for {}", TimestampStyle::FullDateTime.markup(unix))
}

/// One line per style, the raw markup in a code span followed by its rendering.
pub fn long_reply_description(unix: i64) -> String {
    TimestampStyle::ALL
        .iter()
        .map(|style| {
            let markup = style.markup(unix);
            format!("`{markup}`: {markup}")
        })
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_reply_has_full_and_relative() {
        assert_eq!(
            short_reply(1_704_160_800),
            "<t:1704160800:F> (<t:1704160800:R>)"
        );
    }

    #[test]
    fn long_reply_lists_every_style() {
        let description = long_reply_description(42);
        assert_eq!(
            description,
            "`<t:42:F>`: <t:42:F>\n\
             `<t:42:f>`: <t:42:f>\n\
             `<t:42:D>`: <t:42:D>\n\
             `<t:42:d>`: <t:42:d>\n\
             `<t:42:T>`: <t:42:T>\n\
             `<t:42:t>`: <t:42:t>\n\
             `<t:42:R>`: <t:42:R>"
        );
        assert_eq!(long_reply_title(42), "Timestamps for <t:42:F>");
    }

    #[test]
    fn negative_timestamps_render() {
        assert_eq!(TimestampStyle::ShortDate.markup(-60), "<t:-60:d>");
    }
}
