//! [`ComplianceEngine`] — the query surface over any [`OpsStore`].
//!
//! Every query is synchronous request/response and stateless: the plan
//! store, visit log, and registries are re-read fresh on each call, and
//! nothing computed here is ever written back. Upstream read failures are
//! absorbed into degraded results (logged, flagged via
//! [`UpstreamStatus`], never raised); the only hard failure is an invalid
//! date range.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use vigil_core::{
  Route,
  compliance::{
    DayComplianceOutcome, DayComplianceResult, InspectorRouteReport,
    RangeReport, UpstreamStatus,
  },
  store::OpsStore,
  visit::RawEventRow,
};

use crate::{
  aggregate::{RangeAccumulator, days_in_range, validate_range},
  classify::ShiftClassifier,
  error::Result,
  matcher::match_day,
  normalize::{NormalizedVisit, Normalizer},
  reconstruct::reconstruct_days,
  sites::SiteDirectory,
};

pub struct ComplianceEngine<S> {
  store: Arc<S>,
}

impl<S> Clone for ComplianceEngine<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store) }
  }
}

impl<S: OpsStore> ComplianceEngine<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// The backing store, for callers that also mutate plans.
  pub fn store(&self) -> &Arc<S> {
    &self.store
  }

  /// Build the resolver and classifier from a fresh registry read. A
  /// registry failure degrades to pass-through resolution and default
  /// classification — unresolvable references are never fatal.
  async fn context(&self) -> (SiteDirectory, ShiftClassifier) {
    let sites = match self.store.list_sites().await {
      Ok(records) => SiteDirectory::from_records(&records),
      Err(e) => {
        tracing::warn!(error = %e, "site registry read failed; resolving pass-through");
        SiteDirectory::empty()
      }
    };
    let classifier = match self.store.list_inspectors().await {
      Ok(roster) => ShiftClassifier::from_roster(&roster),
      Err(e) => {
        tracing::warn!(error = %e, "inspector roster read failed; no declared shifts");
        ShiftClassifier::empty()
      }
    };
    (sites, classifier)
  }

  /// Raw events for `from..=to` plus the ±1-day buffer that captures
  /// cross-midnight night-shift spillover.
  async fn read_buffered(
    &self,
    from: NaiveDate,
    to: NaiveDate,
    upstream: &mut UpstreamStatus,
  ) -> Vec<RawEventRow> {
    let lo = from.pred_opt().unwrap_or(from);
    let hi = to.succ_opt().unwrap_or(to);
    match self.store.read_events(lo, hi).await {
      Ok(rows) => rows,
      Err(e) => {
        tracing::warn!(error = %e, "visit log read failed");
        upstream.visits_ok = false;
        Vec::new()
      }
    }
  }

  /// One day's reconciliation. A failed plan-store or visit-log read
  /// yields the all-zero result with the failure flagged on `upstream`.
  pub async fn day_compliance(&self, date: NaiveDate) -> DayComplianceOutcome {
    let (sites, classifier) = self.context().await;
    let mut upstream = UpstreamStatus::ok();

    let plans = match self.store.list_plans(date).await {
      Ok(plans) => plans,
      Err(e) => {
        tracing::warn!(error = %e, %date, "plan store read failed");
        upstream.plans_ok = false;
        Vec::new()
      }
    };
    let rows = self.read_buffered(date, date, &mut upstream).await;

    if upstream.is_degraded() {
      return DayComplianceOutcome {
        result: DayComplianceResult::empty(date),
        upstream,
      };
    }

    let normalizer = Normalizer { sites: &sites, classifier: &classifier };
    let visits = bucket(normalizer.normalize_all(&rows), date);

    DayComplianceOutcome { result: match_day(date, plans, visits), upstream }
  }

  /// Multi-day aggregate. Validates the range before any store read.
  pub async fn range_compliance(
    &self,
    start: NaiveDate,
    end: NaiveDate,
    route_filter: Option<Route>,
  ) -> Result<RangeReport> {
    validate_range(start, end)?;

    let (sites, classifier) = self.context().await;
    let mut upstream = UpstreamStatus::ok();
    let rows = self.read_buffered(start, end, &mut upstream).await;

    let normalizer = Normalizer { sites: &sites, classifier: &classifier };
    let mut buckets = bucket_all(normalizer.normalize_all(&rows));

    let mut acc = RangeAccumulator::new();
    for date in days_in_range(start, end) {
      let day = self
        .one_day(date, &mut buckets, &mut upstream)
        .await;
      acc.fold_day(&day, route_filter);
    }

    Ok(acc.finish(start, end, route_filter, upstream))
  }

  /// Per-inspector enriched timeline. Reuses the day matcher; the raw rows
  /// stay around for the display-field re-join.
  pub async fn inspector_route(
    &self,
    inspector_name: &str,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<InspectorRouteReport> {
    validate_range(start, end)?;

    let (sites, classifier) = self.context().await;
    let mut upstream = UpstreamStatus::ok();
    let rows = self.read_buffered(start, end, &mut upstream).await;

    let normalizer = Normalizer { sites: &sites, classifier: &classifier };
    let mut buckets = bucket_all(normalizer.normalize_all(&rows));

    let mut days = Vec::new();
    for date in days_in_range(start, end) {
      days.push(self.one_day(date, &mut buckets, &mut upstream).await);
    }

    let (logs, missed_plans, summary) =
      reconstruct_days(inspector_name, &days, &rows);

    Ok(InspectorRouteReport {
      inspector_name: inspector_name.trim().to_owned(),
      start_date: start,
      end_date: end,
      logs,
      missed_plans,
      summary,
      upstream,
    })
  }

  /// Match one day inside a range walk, honouring the degraded-read rule:
  /// a day whose plan read fails (or whose visits were never readable)
  /// contributes the all-zero result.
  async fn one_day(
    &self,
    date: NaiveDate,
    buckets: &mut HashMap<NaiveDate, Vec<NormalizedVisit>>,
    upstream: &mut UpstreamStatus,
  ) -> DayComplianceResult {
    if !upstream.visits_ok {
      return DayComplianceResult::empty(date);
    }
    match self.store.list_plans(date).await {
      Ok(plans) => {
        let visits = buckets.remove(&date).unwrap_or_default();
        match_day(date, plans, visits)
      }
      Err(e) => {
        tracing::warn!(error = %e, %date, "plan store read failed");
        upstream.plans_ok = false;
        DayComplianceResult::empty(date)
      }
    }
  }
}

/// Visits whose effective date equals `date`.
fn bucket(visits: Vec<NormalizedVisit>, date: NaiveDate) -> Vec<NormalizedVisit> {
  visits
    .into_iter()
    .filter(|v| v.effective_date == Some(date))
    .collect()
}

/// All visits grouped by effective date. Rows with no recoverable date are
/// dropped here — they cannot be attributed to any day.
fn bucket_all(
  visits: Vec<NormalizedVisit>,
) -> HashMap<NaiveDate, Vec<NormalizedVisit>> {
  let mut buckets: HashMap<NaiveDate, Vec<NormalizedVisit>> = HashMap::new();
  for visit in visits {
    match visit.effective_date {
      Some(date) => buckets.entry(date).or_default().push(visit),
      None => tracing::debug!(
        timestamp = %visit.timestamp_raw,
        "dropping visit with no recoverable date"
      ),
    }
  }
  buckets
}
