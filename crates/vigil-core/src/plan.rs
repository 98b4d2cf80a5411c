//! Planned patrol assignments.
//!
//! A plan is an intended visit: one site, one shift, one route, one calendar
//! date. Plans are created in bulk ahead of time, may be cloned onto other
//! dates, and are deleted individually, in batch, or by a `(date, shift,
//! route)` filter. Whether a plan was honoured is never stored — it is
//! recomputed from the visit log on every compliance query.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shift::{Route, Shift};

// ─── Plan ────────────────────────────────────────────────────────────────────

/// An intended patrol visit, created ahead of time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedAssignment {
  pub plan_id:    Uuid,
  pub date:       NaiveDate,
  pub shift:      Shift,
  pub route:      Route,
  pub site_id:    String,
  pub site_name:  String,
  pub created_by: String,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at: DateTime<Utc>,
}

impl PlannedAssignment {
  /// The composite key plans are deduplicated on at insert time.
  pub fn key(&self) -> PlanKey {
    PlanKey {
      date:    self.date,
      shift:   self.shift,
      route:   self.route,
      site_id: self.site_id.clone(),
    }
  }
}

/// `(date, shift, route, site_id)` — unique among active plans. Enforced by
/// dedup-before-write against a fresh read, not by a database constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanKey {
  pub date:    NaiveDate,
  pub shift:   Shift,
  pub route:   Route,
  pub site_id: String,
}

// ─── Write-side inputs and outcomes ──────────────────────────────────────────

/// Result of a bulk insert or clone: how many rows were written and how many
/// were dropped as duplicates of the store's current state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkInsertOutcome {
  pub added:   usize,
  pub skipped: usize,
}

/// Filter for [`crate::store::OpsStore::delete_plans_by_filter`]. The date is
/// mandatory; shift and route narrow the deletion when present.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlanFilter {
  pub date:  NaiveDate,
  pub shift: Option<Shift>,
  pub route: Option<Route>,
}

impl PlanFilter {
  pub fn matches(&self, plan: &PlannedAssignment) -> bool {
    plan.date == self.date
      && self.shift.is_none_or(|s| plan.shift == s)
      && self.route.is_none_or(|r| plan.route == r)
  }
}
