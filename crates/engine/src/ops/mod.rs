use std::sync::Arc;

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;

use crate::{Clock, EngineError, ResultEngine, SystemClock};

mod accounts;
mod catalog;
mod reports;
mod transactions;

pub use accounts::BootstrapOutcome;

/// Longest DST gap searched when a local time does not exist.
const MAX_GAP_MINUTES: u32 = 24 * 60;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Business time zone used to cut calendar days.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// The inclusive UTC window `[00:00:00.000, 23:59:59.999]` of `date` in
    /// the business time zone.
    pub fn day_window(&self, date: NaiveDate) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
        let start = date
            .and_hms_milli_opt(0, 0, 0, 0)
            .ok_or_else(|| EngineError::validation("invalid date"))?;
        let end = date
            .and_hms_milli_opt(23, 59, 59, 999)
            .ok_or_else(|| EngineError::validation("invalid date"))?;
        Ok((
            self.localize(start, true)?,
            self.localize(end, false)?,
        ))
    }

    /// Resolves a local wall time to UTC. Inside a DST overlap `earliest`
    /// picks the first or last instant. Inside a DST gap the start of a
    /// window moves to the first instant after the gap and the end to the
    /// millisecond before it.
    fn localize(&self, naive: NaiveDateTime, earliest: bool) -> ResultEngine<DateTime<Utc>> {
        let local = match self.timezone.from_local_datetime(&naive) {
            LocalResult::Single(at) => at,
            LocalResult::Ambiguous(first, last) => {
                if earliest {
                    first
                } else {
                    last
                }
            }
            LocalResult::None => {
                let after_gap = self.gap_end(naive)?;
                if earliest {
                    return Ok(after_gap);
                }
                return after_gap
                    .checked_sub_signed(TimeDelta::milliseconds(1))
                    .ok_or_else(|| EngineError::validation("date out of range"));
            }
        };
        Ok(local.with_timezone(&Utc))
    }

    /// First instant that exists after the DST gap containing `naive`.
    /// Transitions fall on whole minutes.
    fn gap_end(&self, naive: NaiveDateTime) -> ResultEngine<DateTime<Utc>> {
        let mut probe = naive
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .ok_or_else(|| EngineError::validation("invalid date"))?;
        for _ in 0..MAX_GAP_MINUTES {
            probe = probe
                .checked_add_signed(TimeDelta::minutes(1))
                .ok_or_else(|| EngineError::validation("date out of range"))?;
            match self.timezone.from_local_datetime(&probe) {
                LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => {
                    return Ok(at.with_timezone(&Utc));
                }
                LocalResult::None => {}
            }
        }
        Err(EngineError::Validation(format!(
            "{naive} does not exist in {}",
            self.timezone
        )))
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            clock: Arc::new(SystemClock),
            timezone: chrono_tz::UTC,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Replace the clock used to stamp new records.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> EngineBuilder {
        self.clock = clock;
        self
    }

    /// Business time zone for day-based reports. Defaults to UTC.
    pub fn timezone(mut self, timezone: Tz) -> EngineBuilder {
        self.timezone = timezone;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            clock: self.clock,
            timezone: self.timezone,
        })
    }
}
