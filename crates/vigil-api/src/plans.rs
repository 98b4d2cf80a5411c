//! Handlers for `/plans` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/plans?date=` | Plans for one date, in matching order |
//! | `POST`   | `/plans` | Bulk insert; duplicates skipped, not errors |
//! | `DELETE` | `/plans?date=[&shift=][&route=]` | Filtered clear |
//! | `POST`   | `/plans/clone` | Copy one date's plans onto others |
//! | `POST`   | `/plans/delete` | Batch delete by ID |
//! | `DELETE` | `/plans/:id` | 204 or 404 |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vigil_core::{
  Route, Shift,
  plan::{BulkInsertOutcome, PlanFilter, PlannedAssignment},
  store::OpsStore,
};
use vigil_engine::ComplianceEngine;

use crate::error::ApiError;

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> ApiError {
  ApiError::Store(Box::new(e))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub date: NaiveDate,
}

/// `GET /plans?date=<YYYY-MM-DD>`
pub async fn list<S: OpsStore>(
  State(engine): State<ComplianceEngine<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<PlannedAssignment>>, ApiError> {
  let plans = engine
    .store()
    .list_plans(params.date)
    .await
    .map_err(store_err)?;
  Ok(Json(plans))
}

// ─── Bulk insert ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub date:       NaiveDate,
  pub shift:      Shift,
  pub route:      Route,
  pub site_ids:   Vec<String>,
  #[serde(default)]
  pub created_by: Option<String>,
}

/// `POST /plans` — body: `{"date":…,"shift":…,"route":…,"site_ids":[…]}`
///
/// Site display names are looked up from the registry; an unregistered ID is
/// planned under its own name rather than rejected.
pub async fn create<S: OpsStore>(
  State(engine): State<ComplianceEngine<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let registry = engine.store().list_sites().await.map_err(store_err)?;

  let sites: Vec<(String, String)> = body
    .site_ids
    .into_iter()
    .map(|id| {
      let name = registry
        .iter()
        .find(|s| s.site_id == id)
        .map(|s| s.name_en.clone())
        .unwrap_or_else(|| id.clone());
      (id, name)
    })
    .collect();

  let outcome = engine
    .store()
    .bulk_insert_plans(
      body.date,
      body.shift,
      body.route,
      sites,
      body.created_by.unwrap_or_else(|| "api".to_owned()),
    )
    .await
    .map_err(store_err)?;

  Ok((StatusCode::CREATED, Json(outcome)))
}

// ─── Clone ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CloneBody {
  pub from_date:  NaiveDate,
  pub to_dates:   Vec<NaiveDate>,
  #[serde(default)]
  pub created_by: Option<String>,
}

/// `POST /plans/clone` — body: `{"from_date":…,"to_dates":[…]}`
pub async fn clone_onto<S: OpsStore>(
  State(engine): State<ComplianceEngine<S>>,
  Json(body): Json<CloneBody>,
) -> Result<Json<BulkInsertOutcome>, ApiError> {
  let outcome = engine
    .store()
    .clone_plans(
      body.from_date,
      body.to_dates,
      body.created_by.unwrap_or_else(|| "api".to_owned()),
    )
    .await
    .map_err(store_err)?;
  Ok(Json(outcome))
}

// ─── Deletes ──────────────────────────────────────────────────────────────────

/// `DELETE /plans/:id`
pub async fn delete_one<S: OpsStore>(
  State(engine): State<ComplianceEngine<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  if engine.store().delete_plan(id).await.map_err(store_err)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("plan {id} not found")))
  }
}

#[derive(Debug, Deserialize)]
pub struct DeleteBatchBody {
  pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
  pub deleted: usize,
}

/// `POST /plans/delete` — body: `{"ids":[…]}`
pub async fn delete_batch<S: OpsStore>(
  State(engine): State<ComplianceEngine<S>>,
  Json(body): Json<DeleteBatchBody>,
) -> Result<Json<DeletedResponse>, ApiError> {
  let deleted = engine
    .store()
    .delete_plans(body.ids)
    .await
    .map_err(store_err)?;
  Ok(Json(DeletedResponse { deleted }))
}

#[derive(Debug, Deserialize)]
pub struct ClearParams {
  pub date:  NaiveDate,
  pub shift: Option<Shift>,
  pub route: Option<Route>,
}

/// `DELETE /plans?date=<date>[&shift=…][&route=…]`
pub async fn clear<S: OpsStore>(
  State(engine): State<ComplianceEngine<S>>,
  Query(params): Query<ClearParams>,
) -> Result<Json<DeletedResponse>, ApiError> {
  let deleted = engine
    .store()
    .delete_plans_by_filter(PlanFilter {
      date:  params.date,
      shift: params.shift,
      route: params.route,
    })
    .await
    .map_err(store_err)?;
  Ok(Json(DeletedResponse { deleted }))
}
