use poise::command;
use serenity::all::AutocompleteChoice;
use tracing::info;

use super::Context;
use crate::{error::BotError, services::TimezoneService};

/// Stored by `timezonetestbad`, so the failure path can be tried on demand.
pub const BROKEN_TIMEZONE: &str = "banana/timehole";

const MAX_CHOICES: usize = 25;

pub async fn timezone_choices<'a>(
    _ctx: Context<'_>,
    partial: &'a str,
) -> impl Iterator<Item = AutocompleteChoice> + 'a {
    let partial = partial.to_lowercase();
    chrono_tz::TZ_VARIANTS
        .iter()
        .map(|tz| tz.name())
        .filter(move |name| name.to_lowercase().contains(&partial))
        .take(MAX_CHOICES)
        .map(|name| AutocompleteChoice::new(name, name))
}

#[command(prefix_command, slash_command)]
/// Set your timezone, for example `America/New_York`.
pub async fn timezoneset(
    ctx: Context<'_>,
    #[description = "IANA timezone name"]
    #[autocomplete = "timezone_choices"]
    timezone: Option<String>,
) -> Result<(), BotError> {
    let list_url = ctx.data().cfg.load().timezone_list_url.to_owned();
    let Some(timezone) = timezone else {
        ctx.say(format!(
            "Please provide a location timezone (e.g. `America/New_York`). \
             List of valid timezones: {list_url}"
        ))
        .await?;
        return Ok(());
    };
    match ctx.data().db.timezone().set(ctx.author().id, &timezone).await {
        Ok(()) => {
            info!("{} set their timezone to {timezone}", ctx.author().id);
            ctx.say(format!("Your timezone has been set to `{timezone}`."))
                .await?;
        }
        Err(BotError::InvalidTimezone { zone }) => {
            ctx.say(format!(
                "`{zone}` is not a valid timezone. Use a location timezone such as \
                 `Europe/London`. List of valid timezones: {list_url}"
            ))
            .await?;
        }
        Err(why) => return Err(why),
    }
    Ok(())
}

#[command(prefix_command, slash_command)]
/// Show the timezone you have saved.
pub async fn timezone(ctx: Context<'_>) -> Result<(), BotError> {
    let reply = match ctx.data().db.timezone().get(ctx.author().id).await? {
        Some(zone) => format!("Your timezone is `{zone}`."),
        None => format!(
            "You have not set a timezone yet. Use `{}timezoneset <timezone>` to set one.",
            ctx.data().cfg.load().prefix
        ),
    };
    ctx.say(reply).await?;
    Ok(())
}

#[command(prefix_command, slash_command)]
/// Forget your saved timezone.
pub async fn timezoneclear(ctx: Context<'_>) -> Result<(), BotError> {
    ctx.data().db.timezone().clear(ctx.author().id).await?;
    info!("{} cleared their timezone", ctx.author().id);
    ctx.say("Your timezone has been cleared.").await?;
    Ok(())
}

#[command(prefix_command, owners_only, hide_in_help)]
/// Save a timezone that does not exist, to try the error replies.
pub async fn timezonetestbad(ctx: Context<'_>) -> Result<(), BotError> {
    ctx.data()
        .db
        .timezone()
        .force(ctx.author().id, BROKEN_TIMEZONE)
        .await?;
    ctx.say(format!("Your timezone has been set to `{BROKEN_TIMEZONE}`."))
        .await?;
    Ok(())
}
