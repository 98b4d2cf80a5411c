//! JSON REST API for Vigil.
//!
//! Exposes an axum [`Router`] backed by any [`vigil_core::store::OpsStore`],
//! with compliance queries served by [`vigil_engine::ComplianceEngine`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", vigil_api::api_router(engine.clone()))
//! ```

pub mod compliance;
pub mod error;
pub mod inspectors;
pub mod plans;

use axum::{
  Router,
  routing::{delete, get, post},
};
use vigil_core::store::OpsStore;
use vigil_engine::ComplianceEngine;

pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(engine: ComplianceEngine<S>) -> Router<()>
where
  S: OpsStore + 'static,
{
  Router::new()
    // Plans
    .route(
      "/plans",
      get(plans::list::<S>)
        .post(plans::create::<S>)
        .delete(plans::clear::<S>),
    )
    .route("/plans/clone", post(plans::clone_onto::<S>))
    .route("/plans/delete", post(plans::delete_batch::<S>))
    .route("/plans/{id}", delete(plans::delete_one::<S>))
    // Compliance
    .route("/compliance/day", get(compliance::day::<S>))
    .route("/compliance/range", get(compliance::range::<S>))
    // Inspectors
    .route("/inspectors/{name}/route", get(inspectors::route::<S>))
    .with_state(engine)
}
