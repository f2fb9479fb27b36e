//! The per-message wait loop that answers marker reactions with timestamps.

use std::{collections::HashSet, time::Duration};

use serenity::{
    all::{ReactionType, UserId},
    async_trait,
};
use snafu::{ResultExt, Snafu};
use tracing::{debug, error, info, warn};

use crate::{
    database::BotDatabase,
    error::BotError,
    services::TimezoneService,
    timestamp::{self, LocalizeError, ParsedTime},
};

pub const CLOCK_EMOJI: &str = "🕒";
pub const PAGE_EMOJI: &str = "📄";

/// The two markers attached to a message with a recognised time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionKind {
    /// Short reply: full date-time plus relative time.
    Clock,
    /// Long reply: every display style.
    Page,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 2] = [Self::Clock, Self::Page];

    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Clock => CLOCK_EMOJI,
            Self::Page => PAGE_EMOJI,
        }
    }

    pub fn from_reaction(emoji: &ReactionType) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| emoji.unicode_eq(kind.emoji()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    Waiting,
    ShortServed,
    LongServed,
    BothServed,
}

/// How a prompt's wait loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    TimedOut,
    NoTimezoneTerminated,
    Errored,
}

/// What went wrong, as far as the channel gets to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptFailure {
    InvalidTimezone,
    NonexistentTime,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptReply {
    Short(i64),
    Long(i64),
    MissingTimezone,
    Failure(PromptFailure),
}

#[derive(Debug, Snafu)]
pub enum PromptError {
    #[snafu(display("failed to look up the author's timezone"))]
    Lookup { source: BotError },
    #[snafu(display("failed to place the time in the author's timezone"))]
    Localize { source: LocalizeError },
    #[snafu(display("failed to send a reply"))]
    Reply { source: BotError },
}

impl PromptError {
    pub fn failure(&self) -> PromptFailure {
        match self {
            Self::Localize {
                source: LocalizeError::UnknownZone { .. },
            } => PromptFailure::InvalidTimezone,
            Self::Localize {
                source: LocalizeError::Nonexistent { .. },
            } => PromptFailure::NonexistentTime,
            Self::Lookup { .. } | Self::Reply { .. } => PromptFailure::Internal,
        }
    }
}

/// Where marker reactions for one message come from.
#[async_trait]
pub trait ReactionSource: Send {
    /// Waits at most `idle` for the next marker reaction; `None` once that elapses.
    async fn next_reaction(&mut self, idle: Duration) -> Option<ReactionKind>;
}

#[async_trait]
pub trait PromptReplier: Send + Sync {
    async fn reply(&self, reply: PromptReply) -> Result<(), BotError>;
}

enum Step {
    Continue,
    NoTimezone,
}

/// A message waiting for its markers to be clicked.
#[derive(Debug)]
pub struct PendingPrompt {
    when: ParsedTime,
    served: HashSet<ReactionKind>,
}

impl PendingPrompt {
    pub fn new(when: ParsedTime) -> Self {
        Self {
            when,
            served: HashSet::with_capacity(ReactionKind::ALL.len()),
        }
    }

    pub fn state(&self) -> PromptState {
        match (
            self.served.contains(&ReactionKind::Clock),
            self.served.contains(&ReactionKind::Page),
        ) {
            (false, false) => PromptState::Waiting,
            (true, false) => PromptState::ShortServed,
            (false, true) => PromptState::LongServed,
            (true, true) => PromptState::BothServed,
        }
    }

    /// Answers reactions until the idle window passes without one, the author
    /// turns out to have no timezone, or something fails.
    ///
    /// The idle window restarts after every reaction.
    pub async fn run<S, R>(
        mut self,
        author: UserId,
        db: &BotDatabase,
        source: &mut S,
        replier: &R,
        idle: Duration,
    ) -> PromptOutcome
    where
        S: ReactionSource,
        R: PromptReplier,
    {
        loop {
            let Some(kind) = source.next_reaction(idle).await else {
                debug!(state = ?self.state(), "Timestamp prompt timed out");
                return PromptOutcome::TimedOut;
            };
            match self.handle(kind, author, db, replier).await {
                Ok(Step::Continue) => {}
                Ok(Step::NoTimezone) => {
                    info!(%author, "Timestamp prompt ended, author has no timezone");
                    return PromptOutcome::NoTimezoneTerminated;
                }
                Err(e) => {
                    error!("Error handling timestamp reaction: {e}: {e:?}");
                    if let Err(why) = replier.reply(PromptReply::Failure(e.failure())).await {
                        warn!("Error sending failure notice: {why:?}");
                    }
                    return PromptOutcome::Errored;
                }
            }
        }
    }

    async fn handle<R: PromptReplier>(
        &mut self,
        kind: ReactionKind,
        author: UserId,
        db: &BotDatabase,
        replier: &R,
    ) -> Result<Step, PromptError> {
        // always the author's zone, whoever clicked
        let Some(zone) = db.timezone().get(author).await.context(LookupSnafu)? else {
            replier
                .reply(PromptReply::MissingTimezone)
                .await
                .context(ReplySnafu)?;
            return Ok(Step::NoTimezone);
        };
        let unix = timestamp::localize(self.when, &zone)
            .context(LocalizeSnafu)?
            .timestamp();

        if self.served.contains(&kind) {
            return Ok(Step::Continue);
        }
        let reply = match kind {
            ReactionKind::Clock => PromptReply::Short(unix),
            ReactionKind::Page => PromptReply::Long(unix),
        };
        replier.reply(reply).await.context(ReplySnafu)?;
        self.served.insert(kind);
        Ok(Step::Continue)
    }
}
