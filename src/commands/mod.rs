mod preferences;
mod utils;

use std::sync::Arc;

use poise::command;
use tracing::{error, info};

use crate::{
    config::{BotCfg, SharedCfg},
    database::BotDatabase,
    error::BotError,
};
use preferences::*;
use utils::*;

pub type Context<'a> = poise::Context<'a, Data, BotError>;

pub struct Data {
    pub db: Arc<BotDatabase>,
    pub cfg: SharedCfg,
}

async fn on_error(error: poise::FrameworkError<'_, Data, BotError>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {}", ctx.command().name, error);
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e)
            }
        }
    }
}

#[command(prefix_command, owners_only, hide_in_help)]
/// Registers or unregisters slash commands.
async fn register(ctx: Context<'_>) -> Result<(), BotError> {
    Ok(poise::builtins::register_application_commands_buttons(ctx).await?)
}

fn option(cfg: &BotCfg) -> poise::FrameworkOptions<Data, BotError> {
    poise::FrameworkOptions {
        commands: vec![
            timezoneset(),
            timezone(),
            timezoneclear(),
            timezonetestbad(),
            help(),
            register(),
        ],
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(cfg.prefix.to_owned()),
            ..Default::default()
        },
        owners: cfg.extra_owners.to_owned(),
        on_error: |error| {
            Box::pin(async {
                on_error(error).await;
            })
        },
        pre_command: |ctx| {
            Box::pin(async move {
                info!(
                    "Invoke Command: {} by {}",
                    ctx.command().name,
                    ctx.author().id
                )
            })
        },
        ..Default::default()
    }
}

pub fn framework(data: Data) -> poise::Framework<Data, BotError> {
    let options = option(&data.cfg.load());
    poise::Framework::builder()
        .setup(move |_, _, _| {
            Box::pin(async move {
                info!("Framework has been set up!");
                Ok(data)
            })
        })
        .options(options)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_config() {
        let cfg = BotCfg {
            prefix: "?".to_owned(),
            extra_owners: [serenity::all::UserId::new(7)].into(),
            ..Default::default()
        };
        let options = option(&cfg);
        assert_eq!(options.prefix_options.prefix.as_deref(), Some("?"));
        assert!(options.owners.contains(&serenity::all::UserId::new(7)));

        let names: Vec<_> = options.commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "timezoneset",
                "timezone",
                "timezoneclear",
                "timezonetestbad",
                "help",
                "register"
            ]
        );
    }

    #[test]
    fn test_command_is_hidden_and_restricted() {
        let command = timezonetestbad();
        assert!(command.owners_only);
        assert!(command.hide_in_help);
    }
}
