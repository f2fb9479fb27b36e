use const_format::formatcp;
use itertools::Itertools;
use poise::{CreateReply, command};
use serenity::all::CreateEmbed;

use super::super::Context;
use crate::{
    error::BotError,
    prompt::{CLOCK_EMOJI, PAGE_EMOJI},
    timestamp::TimestampStyle,
};

const HOW_IT_WORKS: &str = formatcp!(
    "Mention a time like `9pm`, `tomorrow 7:30am` or `friday 6pm utc` and I react with \
{} and {}.\n\
{} replies with the time in everyone's own timezone, {} lists every timestamp style.\n\
The time is read in the timezone of whoever wrote the message.",
    CLOCK_EMOJI,
    PAGE_EMOJI,
    CLOCK_EMOJI,
    PAGE_EMOJI
);

fn commands_field(prefix: &str) -> String {
    format!(
        "`{prefix}timezoneset <timezone>` save your timezone\n\
         `{prefix}timezone` show your saved timezone\n\
         `{prefix}timezoneclear` forget your timezone"
    )
}

fn styles_field() -> String {
    TimestampStyle::ALL
        .iter()
        .map(|style| format!("`{}` {style}", style.code()))
        .join("\n")
}

#[command(prefix_command, slash_command)]
/// Explain how timestamp replies work
pub async fn help(ctx: Context<'_>) -> Result<(), BotError> {
    let (prefix, list_url) = {
        let cfg = ctx.data().cfg.load();
        (cfg.prefix.to_owned(), cfg.timezone_list_url.to_owned())
    };
    let embed = CreateEmbed::new()
        .title("🕒 Timestamp replies")
        .description(HOW_IT_WORKS)
        .color(0x7289DA)
        .field("Commands", commands_field(&prefix), false)
        .field("Timezones", list_url, false)
        .field("Styles", styles_field(), false)
        .timestamp(chrono::Utc::now());

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}
