pub mod user_timezones;

mod r#impl;
