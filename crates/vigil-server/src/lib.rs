//! HTTP server for Vigil.
//!
//! Mounts the JSON API from `vigil-api` under `/api`, backed by the SQLite
//! operations store and the compliance engine. Auth, TLS, and reverse-proxy
//! concerns belong in front of this process.

use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use vigil_core::store::OpsStore;
use vigil_engine::ComplianceEngine;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// `VIGIL_*` environment.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: std::path::PathBuf,
}

fn default_host() -> String {
  "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
  8630
}

fn default_store_path() -> std::path::PathBuf {
  std::path::PathBuf::from("vigil.db")
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `engine`.
pub fn router<S>(engine: ComplianceEngine<S>) -> Router
where
  S: OpsStore + 'static,
{
  Router::new()
    .nest("/api", vigil_api::api_router(engine))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use vigil_core::{Route, registry::SiteRecord, visit::RawEventRow};
  use vigil_store_sqlite::SqliteStore;

  async fn app() -> (Router, SqliteStore) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let engine = ComplianceEngine::new(Arc::new(store.clone()));
    (router(engine), store)
  }

  async fn seed_site(store: &SqliteStore) {
    store
      .upsert_site(SiteRecord {
        site_id: "S-01".into(),
        code:    "GATE1".into(),
        name_en: "North Gate".into(),
        name_th: "ประตูเหนือ".into(),
        route:   Some(Route::A),
      })
      .await
      .unwrap();
  }

  async fn seed_event(store: &SqliteStore, timestamp: &str, site: &str) {
    store
      .append_event(RawEventRow {
        timestamp: timestamp.into(),
        inspector_name: "Siri".into(),
        route_text: "A".into(),
        site_name_text: site.into(),
        guard_name: "Somsak".into(),
        shift_code: "1".into(),
        score: Some(4.0),
        gps_text: Some("13.75,100.50".into()),
      })
      .await
      .unwrap();
  }

  async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let resp = app
      .clone()
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  // ── Plan CRUD ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn plan_crud_over_http() {
    let (app, store) = app().await;
    seed_site(&store).await;

    // Bulk insert: the registered site gets its display name, the unknown
    // one is planned under its own ID.
    let (status, body) = request(
      &app,
      "POST",
      "/api/plans",
      Some(json!({
        "date": "2026-02-12",
        "shift": "morning",
        "route": "A",
        "site_ids": ["S-01", "S-99"],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["added"], 2);
    assert_eq!(body["skipped"], 0);

    let (status, body) =
      request(&app, "GET", "/api/plans?date=2026-02-12", None).await;
    assert_eq!(status, StatusCode::OK);
    let plans = body.as_array().unwrap();
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0]["site_name"], "North Gate");
    assert_eq!(plans[1]["site_name"], "S-99");

    // Delete one, then confirm 404 on repeat.
    let id = plans[0]["plan_id"].as_str().unwrap().to_owned();
    let (status, _) =
      request(&app, "DELETE", &format!("/api/plans/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) =
      request(&app, "DELETE", &format!("/api/plans/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Filtered clear removes the rest.
    let (status, body) = request(
      &app,
      "DELETE",
      "/api/plans?date=2026-02-12&shift=morning",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 1);
  }

  #[tokio::test]
  async fn clone_and_batch_delete_over_http() {
    let (app, _store) = app().await;

    request(
      &app,
      "POST",
      "/api/plans",
      Some(json!({
        "date": "2026-02-12",
        "shift": "night",
        "route": "B",
        "site_ids": ["S-01"],
      })),
    )
    .await;

    let (status, body) = request(
      &app,
      "POST",
      "/api/plans/clone",
      Some(json!({
        "from_date": "2026-02-12",
        "to_dates": ["2026-02-13", "2026-02-14"],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], 2);

    let (_, plans) =
      request(&app, "GET", "/api/plans?date=2026-02-13", None).await;
    let ids: Vec<Value> =
      plans.as_array().unwrap().iter().map(|p| p["plan_id"].clone()).collect();
    let (status, body) =
      request(&app, "POST", "/api/plans/delete", Some(json!({ "ids": ids })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 1);
  }

  // ── Compliance queries ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn day_compliance_end_to_end() {
    let (app, store) = app().await;
    seed_site(&store).await;
    seed_event(&store, "2026-02-12 07:00:00", "north gate").await;

    request(
      &app,
      "POST",
      "/api/plans",
      Some(json!({
        "date": "2026-02-12",
        "shift": "morning",
        "route": "A",
        "site_ids": ["S-01"],
      })),
    )
    .await;

    let (status, body) =
      request(&app, "GET", "/api/compliance/day?date=2026-02-12", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["summary"]["total_visited"], 1);
    assert_eq!(body["result"]["summary"]["compliance_rate"], 100);
    assert_eq!(body["result"]["visited"][0]["inspector_name"], "Siri");
    assert_eq!(body["upstream"]["plans_ok"], true);
    assert_eq!(body["upstream"]["visits_ok"], true);
  }

  #[tokio::test]
  async fn range_compliance_end_to_end_and_cap() {
    let (app, store) = app().await;
    seed_site(&store).await;
    seed_event(&store, "2026-02-12 07:00:00", "S-01").await;

    request(
      &app,
      "POST",
      "/api/plans",
      Some(json!({
        "date": "2026-02-12",
        "shift": "morning",
        "route": "A",
        "site_ids": ["S-01"],
      })),
    )
    .await;
    request(
      &app,
      "POST",
      "/api/plans",
      Some(json!({
        "date": "2026-02-13",
        "shift": "morning",
        "route": "A",
        "site_ids": ["S-01"],
      })),
    )
    .await;

    let (status, body) = request(
      &app,
      "GET",
      "/api/compliance/range?from=2026-02-12&to=2026-02-13",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["total_planned"], 2);
    assert_eq!(body["summary"]["total_visited"], 1);
    assert_eq!(body["summary"]["compliance_rate"], 50);
    assert_eq!(body["most_missed_sites"][0]["site_name"], "North Gate");

    // 2026-02-01 ..= 2026-03-04 is 32 days.
    let (status, body) = request(
      &app,
      "GET",
      "/api/compliance/range?from=2026-02-01&to=2026-03-04",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("32"));
  }

  #[tokio::test]
  async fn inspector_route_end_to_end() {
    let (app, store) = app().await;
    seed_site(&store).await;
    seed_event(&store, "2026-02-12 07:00:00", "GATE1").await;

    request(
      &app,
      "POST",
      "/api/plans",
      Some(json!({
        "date": "2026-02-12",
        "shift": "morning",
        "route": "A",
        "site_ids": ["S-01"],
      })),
    )
    .await;

    let (status, body) = request(
      &app,
      "GET",
      "/api/inspectors/siri/route?from=2026-02-12&to=2026-02-12",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logs"].as_array().unwrap().len(), 1);
    assert_eq!(body["logs"][0]["outcome"], "visited");
    assert_eq!(body["logs"][0]["guard_name"], "Somsak");
    assert_eq!(body["logs"][0]["gps_text"], "13.75,100.50");
    assert_eq!(body["summary"]["shifts_worked"][0], "morning");
  }
}
