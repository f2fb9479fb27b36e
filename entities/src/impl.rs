use crate::user_timezones::Model as UserTimezone;

impl UserTimezone {
    /// The stored zone name, ignoring empty strings left behind by manual edits.
    pub fn zone(&self) -> Option<&str> {
        self.timezone.as_deref().filter(|tz| !tz.is_empty())
    }
}
