pub mod timezone;

pub(crate) use timezone::TimezoneService;
