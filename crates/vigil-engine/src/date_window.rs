//! Date windowing for cross-midnight shifts.
//!
//! A night-shift visit logged after midnight belongs to the previous
//! calendar day's plan. The resolver must run strictly after shift
//! classification — the rollback depends on the classified shift, not on
//! the raw timestamp alone.

use chrono::{NaiveDate, NaiveTime, Timelike};
use vigil_core::Shift;

/// The time-of-day below which a night-shift event rolls back to the
/// previous calendar day (06:30).
const ROLLBACK_CUTOFF_MINUTES: u32 = 6 * 60 + 30;

/// Map a classified event to the calendar date of the plan it belongs to.
///
/// Night shift before 06:30 → previous calendar day; everything else keeps
/// the event's own date. Events with no usable time-of-day (classified via
/// the code/token chain) keep their own date — there is no basis for a
/// rollback.
pub fn resolve_effective_date(
  event_date: NaiveDate,
  shift: Shift,
  time: Option<NaiveTime>,
) -> NaiveDate {
  let Some(time) = time else {
    return event_date;
  };
  let minute = time.hour() * 60 + time.minute();
  if shift == Shift::Night && minute < ROLLBACK_CUTOFF_MINUTES {
    event_date.pred_opt().unwrap_or(event_date)
  } else {
    event_date
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn t(h: u32, m: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
  }

  #[test]
  fn night_before_dawn_rolls_back() {
    // 02:15 night-shift event belongs to the previous day's plan bucket.
    assert_eq!(
      resolve_effective_date(d(2026, 2, 13), Shift::Night, t(2, 15)),
      d(2026, 2, 12)
    );
  }

  #[test]
  fn night_before_midnight_stays() {
    assert_eq!(
      resolve_effective_date(d(2026, 2, 12), Shift::Night, t(23, 0)),
      d(2026, 2, 12)
    );
  }

  #[test]
  fn rollback_cutoff_is_exclusive_at_0630() {
    assert_eq!(
      resolve_effective_date(d(2026, 2, 13), Shift::Night, t(6, 29)),
      d(2026, 2, 12)
    );
    assert_eq!(
      resolve_effective_date(d(2026, 2, 13), Shift::Night, t(6, 30)),
      d(2026, 2, 13)
    );
  }

  #[test]
  fn non_night_shifts_never_roll_back() {
    assert_eq!(
      resolve_effective_date(d(2026, 2, 13), Shift::Morning, t(2, 15)),
      d(2026, 2, 13)
    );
    assert_eq!(
      resolve_effective_date(d(2026, 2, 13), Shift::Evening, t(2, 15)),
      d(2026, 2, 13)
    );
  }

  #[test]
  fn missing_time_keeps_own_date() {
    assert_eq!(
      resolve_effective_date(d(2026, 2, 13), Shift::Night, None),
      d(2026, 2, 13)
    );
  }

  #[test]
  fn month_boundary_rolls_into_previous_month() {
    assert_eq!(
      resolve_effective_date(d(2026, 3, 1), Shift::Night, t(0, 45)),
      d(2026, 2, 28)
    );
  }
}
