//! Error types for `vigil-engine`.
//!
//! The engine produces exactly one hard, caller-visible failure: an invalid
//! date range. Upstream read failures are absorbed into degraded results and
//! unresolvable references fall back to documented defaults; neither is an
//! error here.

use chrono::NaiveDate;
use thiserror::Error;

use crate::aggregate::MAX_RANGE_DAYS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
  #[error(
    "date range {start} to {end} spans {days} days; the maximum is {MAX_RANGE_DAYS}"
  )]
  RangeTooLong {
    start: NaiveDate,
    end:   NaiveDate,
    days:  i64,
  },

  #[error("date range start {start} is after end {end}")]
  RangeInverted { start: NaiveDate, end: NaiveDate },
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
