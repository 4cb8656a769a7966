//! Send suspension driven by ADM's `Retry-After` header
//!
//! State transitions:
//! - Clear → Suspended: a response carries a parseable `Retry-After`
//! - Suspended → Clear: the first gate check at or after the deadline
//!
//! Clones share the same underlying state, so one `SuspensionState` can gate
//! every client sending on behalf of the same ADM credentials.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use crate::errors::ADMError;

#[derive(Debug, Clone, Default)]
pub struct SuspensionState {
    until: Arc<RwLock<Option<DateTime<Utc>>>>,
}

impl SuspensionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current deadline, if any
    pub fn suspended_until(&self) -> Option<DateTime<Utc>> {
        *self.until.read()
    }

    pub fn suspend_until(&self, until: DateTime<Utc>) {
        info!("ADM sends suspended until {}", until);
        *self.until.write() = Some(until);
    }

    pub fn clear(&self) {
        *self.until.write() = None;
    }

    /// Gate a send attempt at `now`
    ///
    /// Returns `ADMError::Suspended` while the deadline is in the future and
    /// leaves the state alone. Once `now` has reached the deadline the state
    /// is cleared and the send may proceed.
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), ADMError> {
        let mut until = self.until.write();

        match *until {
            Some(deadline) if now < deadline => Err(ADMError::Suspended(deadline)),
            Some(deadline) => {
                info!("ADM suspension until {} elapsed, resuming sends", deadline);
                *until = None;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Apply a `Retry-After` header value received at `now`
    ///
    /// A missing header leaves the state untouched, and so does a value that
    /// is neither delta-seconds nor an HTTP-date.
    pub fn apply_retry_after(
        &self,
        header: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, ADMError> {
        let Some(value) = header else {
            return Ok(None);
        };

        let until = parse_retry_after(value, now)?;
        self.suspend_until(until);
        Ok(Some(until))
    }
}

/// RFC 1123 HTTP-date, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Parse a `Retry-After` value as delta-seconds or an RFC 1123 HTTP-date
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ADMError> {
    let value = value.trim();

    if let Ok(seconds) = value.parse::<u32>() {
        return Ok(now + Duration::seconds(i64::from(seconds)));
    }

    NaiveDateTime::parse_from_str(value, HTTP_DATE_FORMAT)
        .map(|date| date.and_utc())
        .map_err(|e| ADMError::InvalidRetryAfter(format!("{:?}: {}", value, e)))
}
