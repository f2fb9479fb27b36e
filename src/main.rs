use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use clap::Parser;
use serenity::{Client, all::GatewayIntents};
use time_reply::{
    Args,
    commands::{Data, framework},
    config::BotCfg,
    database::BotDatabase,
    error::BotError,
    handlers::TimeReplyHandler,
};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter,
    fmt::{format::Writer, time::FormatTime},
};

/// Log timestamps in the configured reference timezone.
struct ZonedTime(Tz);

impl FormatTime for ZonedTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = Utc::now().with_timezone(&self.0);
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S%.3f %Z"))
    }
}

#[tokio::main]
async fn main() -> Result<(), BotError> {
    let args = Args::parse();
    let cfg = BotCfg::read(&args.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(true)
        .with_timer(ZonedTime(cfg.timezone))
        .init();

    let db = BotDatabase::new(&args.db).await?;
    db.migrate().await?;
    let db = Arc::new(db);
    let cfg = cfg.shared();

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGE_REACTIONS;

    let token = cfg.load().token.to_owned();
    let mut client = Client::builder(&token, intents)
        .event_handler(TimeReplyHandler::new(db.to_owned(), cfg.to_owned()))
        .framework(framework(Data { db, cfg }))
        .await?;

    info!("Starting client");
    // Shards reconnect on their own with exponential backoff.
    if let Err(why) = client.start().await {
        error!("Client error: {why:?}");
    }
    Ok(())
}
