//! Handlers for `/compliance` endpoints.
//!
//! Read-only: every response is recomputed from the stores on each request.
//! Upstream read failures surface as a zero result with a degraded
//! `upstream` status, never as an HTTP error; an invalid range is a 400.

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use vigil_core::{
  Route,
  compliance::{DayComplianceOutcome, RangeReport},
  store::OpsStore,
};
use vigil_engine::ComplianceEngine;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct DayParams {
  pub date: NaiveDate,
}

/// `GET /compliance/day?date=<YYYY-MM-DD>`
pub async fn day<S: OpsStore>(
  State(engine): State<ComplianceEngine<S>>,
  Query(params): Query<DayParams>,
) -> Json<DayComplianceOutcome> {
  Json(engine.day_compliance(params.date).await)
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
  pub from:  NaiveDate,
  pub to:    NaiveDate,
  pub route: Option<Route>,
}

/// `GET /compliance/range?from=<date>&to=<date>[&route=A|B]`
pub async fn range<S: OpsStore>(
  State(engine): State<ComplianceEngine<S>>,
  Query(params): Query<RangeParams>,
) -> Result<Json<RangeReport>, ApiError> {
  let report = engine
    .range_compliance(params.from, params.to, params.route)
    .await?;
  Ok(Json(report))
}
