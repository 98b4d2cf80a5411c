//! The compliance matcher — one day's reconciliation.
//!
//! Deterministic, two-pass, greedy. Visits are matched in an explicit,
//! stable order: ascending parsed timestamp (unparsed last), then raw
//! timestamp text, then input position. Plans are matched in their given
//! list order. Earliest visit wins when several could satisfy the same
//! plan shape; the ordering is part of the contract, not an accident.
//!
//! There is no partial credit: a visit at the right site but the wrong
//! shift or route never satisfies a plan. It is reported unplanned and the
//! site's plan stays missed. Compliance credit requires the full
//! `(site, shift, route)` triple.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use vigil_core::{
  Route, Shift,
  compliance::{
    DayComplianceResult, DaySummary, MissedEntry, UnplannedEntry, VisitedEntry,
  },
  plan::PlannedAssignment,
};

use crate::{normalize::NormalizedVisit, sites::same_site};

/// Stable total order for visit matching.
fn visit_order(a: &NormalizedVisit, b: &NormalizedVisit) -> Ordering {
  match (a.timestamp, b.timestamp) {
    (Some(x), Some(y)) => x.cmp(&y),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
  .then_with(|| a.timestamp_raw.cmp(&b.timestamp_raw))
  .then_with(|| a.raw_index.cmp(&b.raw_index))
}

/// `round(100 × visited / planned)`, with a no-plans day pinned to 0 — "no
/// data", never "100% compliant".
pub fn compliance_rate(planned: usize, visited: usize) -> u32 {
  if planned == 0 {
    return 0;
  }
  (100.0 * visited as f64 / planned as f64).round() as u32
}

/// Reconcile one day. `visits` must already be normalised and bucketed to
/// this date by the caller (read with a ±1-day buffer, retained where the
/// effective date equals `date`).
pub fn match_day(
  date: NaiveDate,
  plans: Vec<PlannedAssignment>,
  mut visits: Vec<NormalizedVisit>,
) -> DayComplianceResult {
  visits.sort_by(visit_order);

  // Sites with more than one shift planned at the same (name, route) get a
  // display-only disambiguation flag. Never affects matching.
  let multi_shift = multi_shift_sites(&plans);

  let mut visit_claimed = vec![false; visits.len()];
  let mut plan_claimed = vec![false; plans.len()];
  let mut visited = Vec::new();

  // Pass 1 — exact matches. Each plan claims at most one visit; each visit
  // satisfies at most one plan.
  for (plan_idx, plan) in plans.iter().enumerate() {
    let claim = visits.iter().enumerate().find(|(visit_idx, visit)| {
      !visit_claimed[*visit_idx]
        && visit.shift == plan.shift
        && visit.route == Some(plan.route)
        && same_site(&plan.site_id, &plan.site_name, &visit.site_id, &visit.site_name)
    });
    if let Some((visit_idx, visit)) = claim {
      visit_claimed[visit_idx] = true;
      plan_claimed[plan_idx] = true;
      visited.push(VisitedEntry {
        plan_id:        plan.plan_id,
        site_id:        plan.site_id.clone(),
        site_name:      plan.site_name.clone(),
        shift:          plan.shift,
        route:          plan.route,
        inspector_name: visit.inspector_name.clone(),
        visited_at:     visit.timestamp_raw.clone(),
        score:          visit.score,
      });
    }
  }

  // Pass 2 — every unclaimed plan is missed.
  let missed: Vec<MissedEntry> = plans
    .iter()
    .zip(&plan_claimed)
    .filter(|(_, claimed)| !**claimed)
    .map(|(plan, _)| MissedEntry {
      plan_id:          plan.plan_id,
      site_id:          plan.site_id.clone(),
      site_name:        plan.site_name.clone(),
      shift:            plan.shift,
      route:            plan.route,
      multi_shift_site: multi_shift
        .contains(&(plan.site_name.trim().to_lowercase(), plan.route)),
    })
    .collect();

  // Unclaimed visits with a resolvable site are unplanned; the rest cannot
  // be displayed and are dropped.
  let mut unplanned = Vec::new();
  for (visit, claimed) in visits.iter().zip(&visit_claimed) {
    if *claimed {
      continue;
    }
    if visit.site_name.trim().is_empty() {
      tracing::debug!(
        timestamp = %visit.timestamp_raw,
        inspector = %visit.inspector_name,
        "dropping unplanned visit with no resolvable site"
      );
      continue;
    }
    unplanned.push(UnplannedEntry {
      site_id:        visit.site_id.clone(),
      site_name:      visit.site_name.clone(),
      shift:          visit.shift,
      route:          visit.route,
      inspector_name: visit.inspector_name.clone(),
      visited_at:     visit.timestamp_raw.clone(),
      score:          visit.score,
    });
  }

  let summary = DaySummary {
    total_planned:   plans.len(),
    total_visited:   visited.len(),
    total_missed:    missed.len(),
    total_unplanned: unplanned.len(),
    compliance_rate: compliance_rate(plans.len(), visited.len()),
  };

  DayComplianceResult { date, plans, visited, missed, unplanned, summary }
}

/// `(site name, route)` pairs with more than one distinct planned shift.
fn multi_shift_sites(plans: &[PlannedAssignment]) -> HashSet<(String, Route)> {
  let mut shifts_at: HashMap<(String, Route), HashSet<Shift>> = HashMap::new();
  for plan in plans {
    shifts_at
      .entry((plan.site_name.trim().to_lowercase(), plan.route))
      .or_default()
      .insert(plan.shift);
  }
  shifts_at
    .into_iter()
    .filter(|(_, shifts)| shifts.len() > 1)
    .map(|(key, _)| key)
    .collect()
}
