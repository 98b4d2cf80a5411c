//! Inspector route reconstruction.
//!
//! An enriched per-inspector timeline built on the day matcher's output —
//! not a separate matching algorithm. The matcher's visited and unplanned
//! entries are filtered to one inspector, then re-joined against the raw
//! log to recover display-only fields (guard name, GPS string) the matcher
//! does not carry. Missed plans are attributed to the inspector only for
//! shifts the inspector empirically worked in the range.

use std::collections::BTreeSet;

use vigil_core::{
  Shift,
  compliance::{
    DayComplianceResult, MissedPlanEntry, RouteLogEntry, RouteSummary,
    VisitOutcome,
  },
  visit::RawEventRow,
};

/// The timestamp-prefix length used by the fallback join: `YYYY-MM-DD HH:MM`.
const TS_PREFIX_LEN: usize = 16;

fn same_inspector(a: &str, b: &str) -> bool {
  a.trim().eq_ignore_ascii_case(b.trim())
}

/// Re-join one timeline entry against the raw log: exact on
/// `(timestamp, site name)`, falling back to timestamp-prefix alone (first
/// candidate) when e.g. the site name casing differs.
fn find_raw<'a>(
  raw: &'a [RawEventRow],
  timestamp: &str,
  site_name: &str,
) -> Option<&'a RawEventRow> {
  raw
    .iter()
    .find(|row| {
      row.timestamp == timestamp && row.site_name_text.trim() == site_name
    })
    .or_else(|| {
      let prefix = ts_prefix(timestamp);
      raw.iter().find(|row| ts_prefix(&row.timestamp) == prefix)
    })
}

fn ts_prefix(timestamp: &str) -> &str {
  timestamp.get(..TS_PREFIX_LEN).unwrap_or(timestamp)
}

/// Build the timeline from per-day matcher results plus the raw rows those
/// days were computed from. Days must be supplied in ascending date order.
pub fn reconstruct_days(
  inspector_name: &str,
  days: &[DayComplianceResult],
  raw_rows: &[RawEventRow],
) -> (Vec<RouteLogEntry>, Vec<MissedPlanEntry>, RouteSummary) {
  let mut logs = Vec::new();
  let mut worked: BTreeSet<Shift> = BTreeSet::new();

  for day in days {
    for entry in &day.visited {
      if !same_inspector(&entry.inspector_name, inspector_name) {
        continue;
      }
      worked.insert(entry.shift);
      logs.push(enrich(
        day,
        &entry.site_id,
        &entry.site_name,
        entry.shift,
        Some(entry.route),
        VisitOutcome::Visited,
        &entry.visited_at,
        entry.score,
        raw_rows,
      ));
    }
    for entry in &day.unplanned {
      if !same_inspector(&entry.inspector_name, inspector_name) {
        continue;
      }
      worked.insert(entry.shift);
      logs.push(enrich(
        day,
        &entry.site_id,
        &entry.site_name,
        entry.shift,
        entry.route,
        VisitOutcome::Unplanned,
        &entry.visited_at,
        entry.score,
        raw_rows,
      ));
    }
  }

  // A missed plan is only this inspector's if its shift is one they
  // actually worked; a shift they never reported in is not shown as theirs.
  let missed_plans: Vec<MissedPlanEntry> = days
    .iter()
    .flat_map(|day| day.missed.iter().map(move |m| (day.date, m)))
    .filter(|(_, m)| worked.contains(&m.shift))
    .map(|(date, m)| MissedPlanEntry {
      date,
      site_id: m.site_id.clone(),
      site_name: m.site_name.clone(),
      shift: m.shift,
      route: m.route,
    })
    .collect();

  let summary = RouteSummary {
    days:          days.len(),
    visited:       logs
      .iter()
      .filter(|l| l.outcome == VisitOutcome::Visited)
      .count(),
    unplanned:     logs
      .iter()
      .filter(|l| l.outcome == VisitOutcome::Unplanned)
      .count(),
    missed:        missed_plans.len(),
    shifts_worked: worked.into_iter().collect(),
  };

  (logs, missed_plans, summary)
}

#[allow(clippy::too_many_arguments)]
fn enrich(
  day: &DayComplianceResult,
  site_id: &str,
  site_name: &str,
  shift: Shift,
  route: Option<vigil_core::Route>,
  outcome: VisitOutcome,
  visited_at: &str,
  score: Option<f64>,
  raw_rows: &[RawEventRow],
) -> RouteLogEntry {
  let raw = find_raw(raw_rows, visited_at, site_name);
  RouteLogEntry {
    date: day.date,
    site_id: site_id.to_owned(),
    site_name: site_name.to_owned(),
    shift,
    route,
    outcome,
    visited_at: visited_at.to_owned(),
    guard_name: raw.map(|r| r.guard_name.trim().to_owned()).unwrap_or_default(),
    gps_text: raw
      .and_then(|r| r.gps_text.clone())
      .unwrap_or_default(),
    score,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;
  use uuid::Uuid;
  use vigil_core::{
    Route,
    compliance::{DaySummary, MissedEntry, UnplannedEntry, VisitedEntry},
  };

  fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, day).unwrap()
  }

  fn raw(timestamp: &str, site: &str, guard: &str, gps: &str) -> RawEventRow {
    RawEventRow {
      timestamp: timestamp.into(),
      inspector_name: "Siri".into(),
      route_text: "A".into(),
      site_name_text: site.into(),
      guard_name: guard.into(),
      shift_code: "1".into(),
      score: None,
      gps_text: Some(gps.into()),
    }
  }

  fn visited(inspector: &str, site: &str, shift: Shift, at: &str) -> VisitedEntry {
    VisitedEntry {
      plan_id:        Uuid::new_v4(),
      site_id:        site.into(),
      site_name:      site.into(),
      shift,
      route:          Route::A,
      inspector_name: inspector.into(),
      visited_at:     at.into(),
      score:          Some(4.0),
    }
  }

  fn unplanned(inspector: &str, site: &str, shift: Shift, at: &str) -> UnplannedEntry {
    UnplannedEntry {
      site_id:        site.into(),
      site_name:      site.into(),
      shift,
      route:          Some(Route::A),
      inspector_name: inspector.into(),
      visited_at:     at.into(),
      score:          None,
    }
  }

  fn missed(site: &str, shift: Shift) -> MissedEntry {
    MissedEntry {
      plan_id:          Uuid::new_v4(),
      site_id:          site.into(),
      site_name:        site.into(),
      shift,
      route:            Route::A,
      multi_shift_site: false,
    }
  }

  fn day(
    date: NaiveDate,
    visited: Vec<VisitedEntry>,
    missed: Vec<MissedEntry>,
    unplanned: Vec<UnplannedEntry>,
  ) -> DayComplianceResult {
    DayComplianceResult {
      date,
      plans: Vec::new(),
      visited,
      missed,
      unplanned,
      summary: DaySummary::default(),
    }
  }

  #[test]
  fn filters_to_inspector_case_insensitively() {
    let days = vec![day(
      d(1),
      vec![
        visited("Siri", "Gate", Shift::Morning, "2026-02-01 07:00:00"),
        visited("Anong", "Yard", Shift::Morning, "2026-02-01 07:30:00"),
      ],
      vec![],
      vec![],
    )];
    let (logs, _, summary) = reconstruct_days(" siri ", &days, &[]);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].site_name, "Gate");
    assert_eq!(summary.visited, 1);
  }

  #[test]
  fn exact_join_recovers_display_fields() {
    let rows = vec![raw("2026-02-01 07:00:00", "Gate", "Somsak", "13.75,100.50")];
    let days = vec![day(
      d(1),
      vec![visited("Siri", "Gate", Shift::Morning, "2026-02-01 07:00:00")],
      vec![],
      vec![],
    )];
    let (logs, _, _) = reconstruct_days("Siri", &days, &rows);
    assert_eq!(logs[0].guard_name, "Somsak");
    assert_eq!(logs[0].gps_text, "13.75,100.50");
  }

  #[test]
  fn casing_mismatch_falls_back_to_timestamp_prefix() {
    // The raw row spells the site differently; the exact join fails and
    // the prefix join accepts the first candidate.
    let rows = vec![raw("2026-02-01 07:00:12", "GATE", "Somsak", "gps")];
    let days = vec![day(
      d(1),
      vec![visited("Siri", "Gate", Shift::Morning, "2026-02-01 07:00:45")],
      vec![],
      vec![],
    )];
    let (logs, _, _) = reconstruct_days("Siri", &days, &rows);
    assert_eq!(logs[0].guard_name, "Somsak");
  }

  #[test]
  fn no_join_candidate_leaves_fields_empty() {
    let days = vec![day(
      d(1),
      vec![visited("Siri", "Gate", Shift::Morning, "2026-02-01 07:00:00")],
      vec![],
      vec![],
    )];
    let (logs, _, _) = reconstruct_days("Siri", &days, &[]);
    assert_eq!(logs[0].guard_name, "");
    assert_eq!(logs[0].gps_text, "");
  }

  #[test]
  fn missed_plans_gated_by_empirically_worked_shifts() {
    let days = vec![day(
      d(1),
      vec![visited("Siri", "Gate", Shift::Morning, "2026-02-01 07:00:00")],
      vec![missed("Yard", Shift::Morning), missed("Dock", Shift::Night)],
      vec![],
    )];
    let (_, missed_plans, summary) = reconstruct_days("Siri", &days, &[]);
    // Siri worked morning only; the night miss is not theirs.
    assert_eq!(missed_plans.len(), 1);
    assert_eq!(missed_plans[0].site_name, "Yard");
    assert_eq!(summary.shifts_worked, vec![Shift::Morning]);
  }

  #[test]
  fn unplanned_entries_extend_worked_shifts() {
    let days = vec![day(
      d(1),
      vec![],
      vec![missed("Dock", Shift::Night)],
      vec![unplanned("Siri", "Gate", Shift::Night, "2026-02-01 23:00:00")],
    )];
    let (logs, missed_plans, _) = reconstruct_days("Siri", &days, &[]);
    assert_eq!(logs[0].outcome, VisitOutcome::Unplanned);
    assert_eq!(missed_plans.len(), 1);
  }
}
