mod time_reply;

pub use time_reply::TimeReplyHandler;
