use std::{collections::HashSet, path::Path, sync::Arc, time::Duration};

use arc_swap::ArcSwap;
use chrono_tz::Tz;
use figment::{
    Figment,
    providers::{Env, Format, Json},
};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, DurationSeconds, serde_as};
use serenity::all::UserId;
use snafu::ResultExt;

use crate::error::BotError;

pub type SharedCfg = Arc<ArcSwap<BotCfg>>;

/// How long a prompt waits for the next reaction before giving up.
pub const DEFAULT_REACTION_TIMEOUT: Duration = Duration::from_secs(600);
pub const DEFAULT_TIMEZONE_LIST_URL: &str = "https://pastebin.com/raw/1jtNpJiU";

#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BotCfg {
    pub token: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_reaction_timeout")]
    pub reaction_timeout: Duration,
    /// Reference clock for parsing messages and for log timestamps.
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    #[serde(default = "default_timezone_list_url")]
    pub timezone_list_url: String,
    #[serde(default)]
    pub extra_owners: HashSet<UserId>,
}

fn default_prefix() -> String {
    "!".to_owned()
}

fn default_reaction_timeout() -> Duration {
    DEFAULT_REACTION_TIMEOUT
}

fn default_timezone() -> Tz {
    Tz::UTC
}

fn default_timezone_list_url() -> String {
    DEFAULT_TIMEZONE_LIST_URL.to_owned()
}

impl Default for BotCfg {
    fn default() -> Self {
        Self {
            token: String::new(),
            prefix: default_prefix(),
            reaction_timeout: DEFAULT_REACTION_TIMEOUT,
            timezone: default_timezone(),
            timezone_list_url: default_timezone_list_url(),
            extra_owners: HashSet::new(),
        }
    }
}

/// `REACTION_TIMEOUT` to `reactionTimeout`.
fn env_key(key: &str) -> String {
    let mut words = key.split('_').filter(|word| !word.is_empty());
    let mut out = words.next().unwrap_or_default().to_ascii_lowercase();
    for word in words {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(&chars.as_str().to_ascii_lowercase());
        }
    }
    out
}

impl BotCfg {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, BotError> {
        Figment::new()
            .merge(Json::file(path))
            .merge(
                Env::prefixed("TIME_REPLY_")
                    .lowercase(false)
                    .map(|key| env_key(key.as_str()).into()),
            )
            .extract_lossy()
            .whatever_context("Failed to read bot configuration")
    }

    pub fn shared(self) -> SharedCfg {
        Arc::new(ArcSwap::from_pointee(self))
    }
}
