//! Batch delivery policy of a receiving service.
//!
//! A batch flushes `number_per_day` times a day, starting at
//! `initial_batch` (local `HH:MM`) in the service's time zone. The day must
//! divide evenly into the batches.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta, Timelike};
use chrono_tz::{America, Pacific, Tz};
use serde::{Deserialize, Serialize};

use crate::error::{HubError, Result, SchemaError};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// US time zones used by receiving services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsTimeZone {
    Arizona,
    Central,
    Chamorro,
    Eastern,
    EastIndiana,
    Hawaii,
    IndianaStarke,
    Michigan,
    Mountain,
    Pacific,
    Samoa,
    Alaska,
    Aleutian,
}

impl UsTimeZone {
    /// The legacy zone id, e.g. `US/Arizona`.
    pub fn zone_id(&self) -> &'static str {
        match self {
            UsTimeZone::Arizona => "US/Arizona",
            UsTimeZone::Central => "US/Central",
            UsTimeZone::Chamorro => "Pacific/Guam",
            UsTimeZone::Eastern => "US/Eastern",
            UsTimeZone::EastIndiana => "US/East-Indiana",
            UsTimeZone::Hawaii => "US/Hawaii",
            UsTimeZone::IndianaStarke => "US/Indiana-Starke",
            UsTimeZone::Michigan => "US/Michigan",
            UsTimeZone::Mountain => "US/Mountain",
            UsTimeZone::Pacific => "US/Pacific",
            UsTimeZone::Samoa => "US/Samoa",
            UsTimeZone::Alaska => "US/Alaska",
            UsTimeZone::Aleutian => "US/Aleutian",
        }
    }

    /// The canonical IANA zone behind the legacy id.
    pub fn tz(&self) -> Tz {
        match self {
            UsTimeZone::Arizona => America::Phoenix,
            UsTimeZone::Central => America::Chicago,
            UsTimeZone::Chamorro => Pacific::Guam,
            UsTimeZone::Eastern => America::New_York,
            UsTimeZone::EastIndiana => America::Indiana::Indianapolis,
            UsTimeZone::Hawaii => Pacific::Honolulu,
            UsTimeZone::IndianaStarke => America::Indiana::Knox,
            UsTimeZone::Michigan => America::Detroit,
            UsTimeZone::Mountain => America::Denver,
            UsTimeZone::Pacific => America::Los_Angeles,
            UsTimeZone::Samoa => Pacific::Pago_Pago,
            UsTimeZone::Alaska => America::Anchorage,
            UsTimeZone::Aleutian => America::Adak,
        }
    }
}

impl fmt::Display for UsTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.zone_id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchOperation {
    #[default]
    None,
    Merge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub operation: BatchOperation,
    pub number_per_day: u32,
    /// Local time of day of the first batch, `HH:MM`.
    pub initial_batch: String,
    pub time_zone: UsTimeZone,
}

impl Batch {
    pub fn new(
        operation: BatchOperation,
        number_per_day: u32,
        initial_batch: impl Into<String>,
        time_zone: UsTimeZone,
    ) -> Self {
        Self {
            operation,
            number_per_day,
            initial_batch: initial_batch.into(),
            time_zone,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Explain why this policy is unusable, if it is.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.number_per_day == 0 || MINUTES_PER_DAY % self.number_per_day != 0 {
            return Err(format!(
                "numberPerDay {} does not divide a day evenly",
                self.number_per_day
            ));
        }
        if self.initial_time().is_none() {
            return Err(format!(
                "initial batch time '{}' is not a valid HH:MM time",
                self.initial_batch
            ));
        }
        Ok(())
    }

    pub fn period_minutes(&self) -> Option<u32> {
        if self.number_per_day == 0 || MINUTES_PER_DAY % self.number_per_day != 0 {
            return None;
        }
        Some(MINUTES_PER_DAY / self.number_per_day)
    }

    pub fn initial_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.initial_batch.trim(), "%H:%M").ok()
    }

    /// The next scheduled batch strictly after the minute of `now`.
    pub fn next_batch_time(&self, now: DateTime<FixedOffset>) -> Result<DateTime<FixedOffset>> {
        self.next_batch_time_with_spacing(now, 0)
    }

    /// Like [`Batch::next_batch_time`], but never sooner than
    /// `min_spacing_minutes` after the minute of `now`.
    ///
    /// The result carries the service time zone's local offset.
    pub fn next_batch_time_with_spacing(
        &self,
        now: DateTime<FixedOffset>,
        min_spacing_minutes: u32,
    ) -> Result<DateTime<FixedOffset>> {
        let (period, initial) = match (self.period_minutes(), self.initial_time()) {
            (Some(period), Some(initial)) => (period, initial),
            _ => {
                let reason = self.validate().err().unwrap_or_default();
                return Err(SchemaError::ImproperBatch { reason }.into());
            }
        };

        let local = now.with_timezone(&self.time_zone.tz());
        let truncated = local
            .with_second(0)
            .and_then(|time| time.with_nanosecond(0))
            .ok_or_else(|| HubError::internal(format!("cannot truncate batch reference {now}")))?;
        let reference = truncated + TimeDelta::minutes(i64::from(min_spacing_minutes));

        let minute_of_day = i64::from(reference.hour() * 60 + reference.minute());
        let initial_minute = i64::from(initial.hour() * 60 + initial.minute());
        let period = i64::from(period);
        let since_tick = (minute_of_day - initial_minute).rem_euclid(period);

        let next = reference + TimeDelta::minutes(period - since_tick);
        Ok(next.fixed_offset())
    }
}
