//! The `OpsStore` trait — the engine's view of the operations backend.
//!
//! The trait is implemented by storage backends (e.g. `vigil-store-sqlite`).
//! Higher layers (`vigil-engine`, `vigil-api`) depend on this abstraction,
//! not on any concrete backend. It covers the four upstream interfaces the
//! engine consumes: the plan store, the visit log, the site registry, and
//! the inspector roster.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  plan::{BulkInsertOutcome, PlanFilter, PlannedAssignment},
  registry::{InspectorRecord, SiteRecord},
  shift::{Route, Shift},
  visit::RawEventRow,
};

/// Abstraction over the Vigil operations backend.
///
/// Plan writes follow read-then-write dedup with no transactional isolation:
/// concurrent writers can race and both insert what should have been one
/// deduplicated entry. Last write wins; callers must not rely on atomicity.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait OpsStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Plans ─────────────────────────────────────────────────────────────

  /// All plans for one date, in stable matching order:
  /// `(shift, route, site_name, plan_id)`.
  fn list_plans(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<PlannedAssignment>, Self::Error>> + Send + '_;

  /// Insert one plan per site for `(date, shift, route)`, deduplicated by
  /// `(date, shift, route, site_id)` against the store's current state.
  fn bulk_insert_plans(
    &self,
    date: NaiveDate,
    shift: Shift,
    route: Route,
    sites: Vec<(String, String)>, // (site_id, site_name)
    created_by: String,
  ) -> impl Future<Output = Result<BulkInsertOutcome, Self::Error>> + Send + '_;

  /// Copy every plan on `from_date` onto each target date, deduplicated the
  /// same way as a bulk insert.
  fn clone_plans(
    &self,
    from_date: NaiveDate,
    to_dates: Vec<NaiveDate>,
    created_by: String,
  ) -> impl Future<Output = Result<BulkInsertOutcome, Self::Error>> + Send + '_;

  /// Delete one plan. Returns `false` if no such plan existed.
  fn delete_plan(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete a batch of plans by ID. Returns the number actually deleted.
  fn delete_plans(
    &self,
    ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Delete every plan matching the filter. Returns the number deleted.
  fn delete_plans_by_filter(
    &self,
    filter: PlanFilter,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Visit log ─────────────────────────────────────────────────────────

  /// All raw events whose own calendar date falls in `from..=to`. The
  /// engine always requests a ±1-day buffer around its target window to
  /// capture cross-midnight night-shift spillover.
  fn read_events(
    &self,
    from: NaiveDate,
    to: NaiveDate,
  ) -> impl Future<Output = Result<Vec<RawEventRow>, Self::Error>> + Send + '_;

  // ── Registries ────────────────────────────────────────────────────────

  fn list_sites(
    &self,
  ) -> impl Future<Output = Result<Vec<SiteRecord>, Self::Error>> + Send + '_;

  fn list_inspectors(
    &self,
  ) -> impl Future<Output = Result<Vec<InspectorRecord>, Self::Error>> + Send + '_;
}
