use std::{sync::Arc, time::Duration};

use chrono::Utc;
use serenity::all::*;
use tracing::{debug, warn};

use crate::{
    config::SharedCfg,
    database::BotDatabase,
    error::BotError,
    prompt::{PendingPrompt, PromptFailure, PromptReplier, PromptReply, ReactionKind, ReactionSource},
    timestamp::{
        self, ClockTimeParser, ParsedTime, TimeParser, long_reply_description, long_reply_title,
        short_reply,
    },
};

pub struct TimeReplyHandler {
    db: Arc<BotDatabase>,
    cfg: SharedCfg,
    parser: Box<dyn TimeParser>,
}

impl TimeReplyHandler {
    pub fn new(db: Arc<BotDatabase>, cfg: SharedCfg) -> Self {
        Self::with_parser(db, cfg, ClockTimeParser)
    }

    pub fn with_parser(
        db: Arc<BotDatabase>,
        cfg: SharedCfg,
        parser: impl TimeParser + 'static,
    ) -> Self {
        Self {
            db,
            cfg,
            parser: Box::new(parser),
        }
    }

    /// Finds the time a message talks about, if any.
    pub fn detect(&self, text: &str) -> Option<ParsedTime> {
        if !timestamp::is_time_candidate(text) {
            return None;
        }
        let now = Utc::now()
            .with_timezone(&self.cfg.load().timezone)
            .naive_local();
        self.parser.parse(text, now)
    }
}

#[async_trait]
impl EventHandler for TimeReplyHandler {
    // Every event gets its own task, so waiting here only holds up this message.
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(when) = self.detect(&msg.content) else {
            return;
        };
        debug!(message = %msg.id, ?when, "Found a time in message");

        for kind in ReactionKind::ALL {
            let emoji = ReactionType::Unicode(kind.emoji().to_owned());
            if let Err(why) = msg.react(&ctx.http, emoji).await {
                warn!("Error adding {} reaction to {}: {why:?}", kind.emoji(), msg.id);
                return;
            }
        }

        let (idle, prefix, timezone_list_url) = {
            let cfg = self.cfg.load();
            (
                cfg.reaction_timeout,
                cfg.prefix.to_owned(),
                cfg.timezone_list_url.to_owned(),
            )
        };
        let mut source = CollectorSource {
            shard: ctx.shard.to_owned(),
            cache: ctx.cache.to_owned(),
            own_id: ctx.cache.current_user().id,
            message_id: msg.id,
        };
        let replier = MessageReplier {
            http: ctx.http.to_owned(),
            channel_id: msg.channel_id,
            message_id: msg.id,
            author: msg.author.id,
            prefix,
            timezone_list_url,
        };
        let outcome = PendingPrompt::new(when)
            .run(msg.author.id, &self.db, &mut source, &replier, idle)
            .await;
        debug!(message = %msg.id, ?outcome, "Timestamp prompt finished");
    }
}

/// Marker reactions on one message, as seen by the gateway.
struct CollectorSource {
    shard: ShardMessenger,
    cache: Arc<Cache>,
    own_id: UserId,
    message_id: MessageId,
}

#[async_trait]
impl ReactionSource for CollectorSource {
    async fn next_reaction(&mut self, idle: Duration) -> Option<ReactionKind> {
        let (cache, own_id) = (self.cache.to_owned(), self.own_id);
        let reaction = ReactionCollector::new(&self.shard)
            .message_id(self.message_id)
            .timeout(idle)
            .filter(move |reaction| {
                ReactionKind::from_reaction(&reaction.emoji).is_some()
                    && !is_bot_reaction(reaction, own_id, |id| {
                        cache.user(id).is_some_and(|user| user.bot)
                    })
            })
            .await?;
        ReactionKind::from_reaction(&reaction.emoji)
    }
}

/// Guild reactions carry the member; DM reactions only carry an id, so
/// `known_bot` looks the user up instead. Reactions without a user count as bots.
fn is_bot_reaction(
    reaction: &Reaction,
    own_id: UserId,
    known_bot: impl Fn(UserId) -> bool,
) -> bool {
    if let Some(member) = &reaction.member {
        return member.user.bot;
    }
    reaction
        .user_id
        .is_none_or(|id| id == own_id || known_bot(id))
}

struct MessageReplier {
    http: Arc<Http>,
    channel_id: ChannelId,
    message_id: MessageId,
    author: UserId,
    prefix: String,
    timezone_list_url: String,
}

impl MessageReplier {
    fn build(&self, reply: PromptReply) -> CreateMessage {
        let quiet = CreateAllowedMentions::new().replied_user(false);
        let message = CreateMessage::new().reference_message((self.channel_id, self.message_id));
        match reply {
            PromptReply::Short(unix) => message.content(short_reply(unix)).allowed_mentions(quiet),
            PromptReply::Long(unix) => message
                .embed(
                    CreateEmbed::new()
                        .title(long_reply_title(unix))
                        .description(long_reply_description(unix))
                        .color(0xFF0000),
                )
                .allowed_mentions(quiet),
            PromptReply::MissingTimezone => message.content(missing_timezone_text(
                self.author,
                &self.prefix,
                &self.timezone_list_url,
            )),
            PromptReply::Failure(failure) => message.content(failure_text(failure, &self.prefix)),
        }
    }
}

#[async_trait]
impl PromptReplier for MessageReplier {
    async fn reply(&self, reply: PromptReply) -> Result<(), BotError> {
        self.channel_id
            .send_message(&self.http, self.build(reply))
            .await?;
        Ok(())
    }
}

fn missing_timezone_text(author: UserId, prefix: &str, timezone_list_url: &str) -> String {
    format!(
        "{} needs to set their timezone using `{prefix}timezoneset <timezone>`. \
         List of valid timezones: {timezone_list_url}",
        author.mention()
    )
}

fn failure_text(failure: PromptFailure, prefix: &str) -> String {
    match failure {
        PromptFailure::InvalidTimezone => format!(
            "ERROR: the saved timezone is not valid. Set it again with `{prefix}timezoneset <timezone>`."
        ),
        PromptFailure::NonexistentTime => {
            "ERROR: that time does not exist in the saved timezone.".to_owned()
        }
        PromptFailure::Internal => "ERROR: something went wrong while converting this time.".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{NaiveDateTime, Timelike};
    use serde_json::{Value, json};

    use super::*;
    use crate::config::BotCfg;

    fn own_id() -> UserId {
        UserId::new(1)
    }

    #[derive(Clone, Default)]
    struct CountingParser(Arc<AtomicUsize>);

    impl TimeParser for CountingParser {
        fn parse(&self, text: &str, now: NaiveDateTime) -> Option<ParsedTime> {
            self.0.fetch_add(1, Ordering::SeqCst);
            ClockTimeParser.parse(text, now)
        }
    }

    async fn handler(parser: impl TimeParser + 'static) -> TimeReplyHandler {
        let db = BotDatabase::new_memory().await.unwrap();
        TimeReplyHandler::with_parser(Arc::new(db), BotCfg::default().shared(), parser)
    }

    #[tokio::test]
    async fn parser_is_skipped_without_a_clock_time() {
        let parser = CountingParser::default();
        let handler = handler(parser.clone()).await;
        assert_eq!(handler.detect("call room 921 later"), None);
        assert_eq!(handler.detect("nothing to see"), None);
        assert_eq!(parser.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn clock_times_are_detected() {
        let parser = CountingParser::default();
        let handler = handler(parser.clone()).await;
        let Some(ParsedTime::Naive(when)) = handler.detect("raid at 9:21 PM") else {
            panic!("expected a naive time");
        };
        assert_eq!((when.hour(), when.minute()), (21, 21));
        assert_eq!(parser.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn prefilter_hits_can_still_be_rejected() {
        let handler = handler(ClockTimeParser).await;
        assert_eq!(handler.detect("13pm"), None);
    }

    #[test]
    fn missing_timezone_mentions_author() {
        let text = missing_timezone_text(UserId::new(42), "!", "https://example.com/tz");
        assert_eq!(
            text,
            "<@42> needs to set their timezone using `!timezoneset <timezone>`. \
             List of valid timezones: https://example.com/tz"
        );
    }

    #[test]
    fn failure_notices_do_not_leak_details() {
        let invalid = failure_text(PromptFailure::InvalidTimezone, "?");
        assert!(invalid.starts_with("ERROR:"));
        assert!(invalid.contains("`?timezoneset <timezone>`"));
        for failure in [PromptFailure::NonexistentTime, PromptFailure::Internal] {
            let text = failure_text(failure, "!");
            assert!(text.starts_with("ERROR:"));
            assert!(!text.contains("banana"));
        }
    }

    fn dm_reaction(user_id: Option<u64>) -> Reaction {
        serde_json::from_value(json!({
            "channel_id": "10",
            "message_id": "20",
            "user_id": user_id.map(|id| id.to_string()),
            "emoji": { "id": null, "name": "🕒" },
            "burst": false,
            "type": 0,
        }))
        .unwrap()
    }

    fn guild_reaction(user_id: u64, bot: bool) -> Reaction {
        serde_json::from_value(json!({
            "channel_id": "10",
            "message_id": "20",
            "guild_id": "40",
            "user_id": user_id.to_string(),
            "emoji": { "id": null, "name": "📄" },
            "burst": false,
            "type": 0,
            "member": {
                "guild_id": "40",
                "user": {
                    "id": user_id.to_string(),
                    "username": "someone",
                    "discriminator": "0001",
                    "global_name": null,
                    "avatar": null,
                    "bot": bot,
                },
                "roles": [],
                "joined_at": "2024-01-01T00:00:00Z",
                "deaf": false,
                "mute": false,
                "flags": 0,
                "pending": false,
            },
        }))
        .unwrap()
    }

    #[test]
    fn guild_reactions_use_the_member() {
        // the member wins over the user lookup
        assert!(is_bot_reaction(&guild_reaction(50, true), own_id(), |_| false));
        assert!(!is_bot_reaction(&guild_reaction(51, false), own_id(), |_| true));
    }

    #[test]
    fn own_reactions_are_ignored() {
        assert!(is_bot_reaction(&dm_reaction(Some(own_id().get())), own_id(), |_| false));
    }

    #[test]
    fn dm_reactions_use_the_lookup() {
        assert!(!is_bot_reaction(&dm_reaction(Some(30)), own_id(), |_| false));
        assert!(is_bot_reaction(&dm_reaction(Some(30)), own_id(), |id| id == UserId::new(30)));
        assert!(is_bot_reaction(&dm_reaction(None), own_id(), |_| false));
    }

    fn replier() -> MessageReplier {
        MessageReplier {
            http: Arc::new(Http::new("")),
            channel_id: ChannelId::new(10),
            message_id: MessageId::new(20),
            author: UserId::new(30),
            prefix: "!".to_owned(),
            timezone_list_url: "https://example.com/tz".to_owned(),
        }
    }

    fn body(reply: PromptReply) -> Value {
        serde_json::to_value(replier().build(reply)).unwrap()
    }

    fn pings_replied_user(body: &Value) -> bool {
        body.get("allowed_mentions")
            .and_then(|mentions| mentions.get("replied_user"))
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    #[test]
    fn short_reply_is_quiet() {
        let body = body(PromptReply::Short(1_704_160_800));
        assert_eq!(body["content"], "<t:1704160800:F> (<t:1704160800:R>)");
        assert!(!pings_replied_user(&body));
        assert!(!body["message_reference"].is_null());
    }

    #[test]
    fn long_reply_is_a_quiet_red_embed() {
        let body = body(PromptReply::Long(1_704_160_800));
        assert!(!pings_replied_user(&body));
        let embed = &body["embeds"][0];
        assert_eq!(embed["color"], 0xFF0000);
        assert_eq!(embed["title"], "Timestamps for <t:1704160800:F>");
        assert_eq!(
            embed["description"].as_str().map(|d| d.lines().count()),
            Some(7)
        );
    }

    #[test]
    fn missing_timezone_reply_pings_the_author() {
        let body = body(PromptReply::MissingTimezone);
        assert!(pings_replied_user(&body));
        assert!(body["content"].as_str().unwrap().starts_with("<@30> needs"));
    }
}
