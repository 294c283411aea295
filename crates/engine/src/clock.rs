//! Server clock used to stamp records.
//!
//! Transaction timestamps are never taken from client input. The engine asks
//! its [`Clock`] at commit time and truncates the value to millisecond
//! precision, so a calendar-day window ending at `23:59:59.999` covers every
//! stored instant of that day.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};

pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock of the host.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub(crate) fn stamp(clock: &dyn Clock) -> DateTime<Utc> {
    clock.now().trunc_subsecs(3)
}
