use chrono_tz::Tz;
use entities::user_timezones::*;
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use serenity::all::UserId;

use crate::{database::BotDatabase, error::BotError};

pub type TimezoneRecord = Model;

pub(crate) trait TimezoneService {
    /// Store a validated IANA zone name for the user
    async fn set(&self, user_id: UserId, zone: &str) -> Result<(), BotError>;

    /// Store a zone name without validating it
    async fn force(&self, user_id: UserId, zone: &str) -> Result<(), BotError>;

    /// Get the user's zone name, if any
    async fn get(&self, user_id: UserId) -> Result<Option<String>, BotError>;

    /// Forget the user's zone name
    async fn clear(&self, user_id: UserId) -> Result<(), BotError>;
}

pub struct DbTimezone<'a>(&'a BotDatabase);

impl BotDatabase {
    pub fn timezone(&self) -> DbTimezone<'_> {
        DbTimezone(self)
    }
}

impl DbTimezone<'_> {
    async fn upsert(&self, user_id: UserId, zone: Option<String>) -> Result<(), BotError> {
        let record = ActiveModel {
            user_id: Set(user_id.get() as i64),
            timezone: Set(zone),
            updated_at: Set(chrono::Utc::now()),
        };
        Entity::insert(record)
            .on_conflict(
                OnConflict::column(Column::UserId)
                    .update_columns([Column::Timezone, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(self.0.inner())
            .await?;
        Ok(())
    }

    pub async fn record(&self, user_id: UserId) -> Result<Option<TimezoneRecord>, BotError> {
        Ok(Entity::find_by_id(user_id.get() as i64)
            .one(self.0.inner())
            .await?)
    }
}

impl TimezoneService for DbTimezone<'_> {
    async fn set(&self, user_id: UserId, zone: &str) -> Result<(), BotError> {
        if zone.parse::<Tz>().is_err() {
            return Err(BotError::InvalidTimezone {
                zone: zone.to_owned(),
            });
        }
        self.upsert(user_id, Some(zone.to_owned())).await
    }

    async fn force(&self, user_id: UserId, zone: &str) -> Result<(), BotError> {
        self.upsert(user_id, Some(zone.to_owned())).await
    }

    async fn get(&self, user_id: UserId) -> Result<Option<String>, BotError> {
        Ok(self
            .record(user_id)
            .await?
            .and_then(|record| record.zone().map(str::to_owned)))
    }

    async fn clear(&self, user_id: UserId) -> Result<(), BotError> {
        self.upsert(user_id, None).await
    }
}
