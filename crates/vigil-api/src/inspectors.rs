//! Handlers for `/inspectors` endpoints.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use vigil_core::{compliance::InspectorRouteReport, store::OpsStore};
use vigil_engine::ComplianceEngine;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RouteParams {
  pub from: NaiveDate,
  pub to:   NaiveDate,
}

/// `GET /inspectors/:name/route?from=<date>&to=<date>`
///
/// The name is matched against the visit log case-insensitively; a name
/// that never appears simply yields an empty timeline.
pub async fn route<S: OpsStore>(
  State(engine): State<ComplianceEngine<S>>,
  Path(name): Path<String>,
  Query(params): Query<RouteParams>,
) -> Result<Json<InspectorRouteReport>, ApiError> {
  let report = engine
    .inspector_route(&name, params.from, params.to)
    .await?;
  Ok(Json(report))
}
