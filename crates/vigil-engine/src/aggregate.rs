//! Range aggregation — the matcher folded across a multi-day window.
//!
//! The fold itself is pure: the orchestrating engine runs the matcher once
//! per calendar day and feeds each day's result through a
//! [`RangeAccumulator`]. A route filter, when present, is applied to each
//! day's lists *after* matching, so cross-route visits still surface as
//! missed/unplanned in the per-day computation and are only excluded from
//! the filtered aggregate view.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use vigil_core::{
  Route, Shift,
  compliance::{
    DailyStat, DayComplianceResult, InspectorTally, MissedSiteCount,
    RangeReport, RangeSummary, ShiftTally, UpstreamStatus,
  },
};

use crate::error::{EngineError, Result};
use crate::matcher::compliance_rate;

/// Hard cap on any range query, inclusive of both endpoints. Bounds
/// worst-case read volume and CPU work; there is no other internal timeout.
pub const MAX_RANGE_DAYS: i64 = 31;

/// How many missed-site rows a range report retains.
const MOST_MISSED_LIMIT: usize = 10;

/// Validate a range before any per-day work. Returns the inclusive day
/// count; the one hard failure this engine produces.
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<i64> {
  if start > end {
    return Err(EngineError::RangeInverted { start, end });
  }
  let days = (end - start).num_days() + 1;
  if days > MAX_RANGE_DAYS {
    return Err(EngineError::RangeTooLong { start, end, days });
  }
  Ok(days)
}

/// The inclusive run of dates in a validated range.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
  start.iter_days().take_while(|d| *d <= end).collect()
}

/// Restrict a day's result lists to one route, recomputing the summary.
/// The plans list is filtered too so the report stays self-consistent.
pub fn filter_day_by_route(
  day: &DayComplianceResult,
  route: Route,
) -> DayComplianceResult {
  let plans: Vec<_> = day
    .plans
    .iter()
    .filter(|p| p.route == route)
    .cloned()
    .collect();
  let visited: Vec<_> = day
    .visited
    .iter()
    .filter(|v| v.route == route)
    .cloned()
    .collect();
  let missed: Vec<_> = day
    .missed
    .iter()
    .filter(|m| m.route == route)
    .cloned()
    .collect();
  let unplanned: Vec<_> = day
    .unplanned
    .iter()
    .filter(|u| u.route == Some(route))
    .cloned()
    .collect();

  let summary = vigil_core::compliance::DaySummary {
    total_planned:   plans.len(),
    total_visited:   visited.len(),
    total_missed:    missed.len(),
    total_unplanned: unplanned.len(),
    compliance_rate: compliance_rate(plans.len(), visited.len()),
  };

  DayComplianceResult {
    date: day.date,
    plans,
    visited,
    missed,
    unplanned,
    summary,
  }
}

// ─── Accumulator ─────────────────────────────────────────────────────────────

/// Folds per-day matcher output into the range-level statistics.
#[derive(Debug, Default)]
pub struct RangeAccumulator {
  daily:          Vec<DailyStat>,
  per_shift:      BTreeMap<Shift, ShiftTally>,
  per_inspector:  BTreeMap<String, InspectorTally>,
  /// Distinct `(inspector, date, shift)` triples seen so far.
  worked:         HashSet<(String, NaiveDate, Shift)>,
  missed_by_site: HashMap<String, usize>,
  totals:         RangeSummary,
}

impl RangeAccumulator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Fold one day, optionally restricted to a route first.
  pub fn fold_day(
    &mut self,
    day: &DayComplianceResult,
    route_filter: Option<Route>,
  ) {
    let filtered;
    let day = match route_filter {
      Some(route) => {
        filtered = filter_day_by_route(day, route);
        &filtered
      }
      None => day,
    };

    self.daily.push(DailyStat {
      date:            day.date,
      total_planned:   day.summary.total_planned,
      total_visited:   day.summary.total_visited,
      total_missed:    day.summary.total_missed,
      total_unplanned: day.summary.total_unplanned,
      compliance_rate: day.summary.compliance_rate,
    });

    self.totals.total_planned += day.summary.total_planned;
    self.totals.total_visited += day.summary.total_visited;
    self.totals.total_missed += day.summary.total_missed;
    self.totals.total_unplanned += day.summary.total_unplanned;

    for plan in &day.plans {
      self.per_shift.entry(plan.shift).or_default().planned += 1;
    }
    for entry in &day.visited {
      self.per_shift.entry(entry.shift).or_default().visited += 1;
      let tally = self
        .per_inspector
        .entry(entry.inspector_name.clone())
        .or_default();
      tally.visited += 1;
      self.note_worked(&entry.inspector_name, day.date, entry.shift);
    }
    for entry in &day.missed {
      self.per_shift.entry(entry.shift).or_default().missed += 1;
      *self
        .missed_by_site
        .entry(entry.site_name.clone())
        .or_default() += 1;
    }
    for entry in &day.unplanned {
      self
        .per_inspector
        .entry(entry.inspector_name.clone())
        .or_default()
        .unplanned += 1;
      self.note_worked(&entry.inspector_name, day.date, entry.shift);
    }
  }

  fn note_worked(&mut self, inspector: &str, date: NaiveDate, shift: Shift) {
    if self.worked.insert((inspector.to_owned(), date, shift))
      && let Some(tally) = self.per_inspector.get_mut(inspector)
    {
      tally.shifts_worked += 1;
    }
  }

  pub fn finish(
    mut self,
    start_date: NaiveDate,
    end_date: NaiveDate,
    route_filter: Option<Route>,
    upstream: UpstreamStatus,
  ) -> RangeReport {
    self.totals.compliance_rate =
      compliance_rate(self.totals.total_planned, self.totals.total_visited);

    let mut most_missed: Vec<MissedSiteCount> = self
      .missed_by_site
      .into_iter()
      .map(|(site_name, count)| MissedSiteCount { site_name, count })
      .collect();
    most_missed.sort_by(|a, b| {
      b.count.cmp(&a.count).then_with(|| a.site_name.cmp(&b.site_name))
    });
    most_missed.truncate(MOST_MISSED_LIMIT);

    RangeReport {
      start_date,
      end_date,
      route_filter,
      daily_stats: self.daily,
      per_shift: self.per_shift,
      per_inspector: self.per_inspector,
      most_missed_sites: most_missed,
      summary: self.totals,
      upstream,
    }
  }
}
