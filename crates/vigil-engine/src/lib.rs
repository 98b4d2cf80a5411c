//! The Vigil patrol-compliance engine.
//!
//! Reconciles planned patrol assignments (site × shift × route × date)
//! against observed visit events from the field log: who visited where they
//! were supposed to, despite messy, multi-language, cross-midnight input.
//!
//! The crate is pure logic over `vigil-core` types. Leaves first:
//!
//! - [`sites`] — normalises heterogeneous site references to canonical IDs.
//! - [`classify`] — assigns a timestamped event to one of three shift
//!   windows under ambiguity.
//! - [`date_window`] — maps a classified event to the calendar date of the
//!   plan it belongs to (night shifts cross midnight).
//! - [`normalize`] — the schema-normalisation adapter: raw log rows become
//!   typed, classified, date-bucketed visits once, outside the matcher.
//! - [`matcher`] — partitions one day's plans and visits into
//!   visited / missed / unplanned.
//! - [`aggregate`] — folds the matcher across a multi-day window.
//! - [`reconstruct`] — per-inspector enriched timeline on top of the
//!   matcher's day-level output.
//! - [`engine`] — the orchestrating query surface over any
//!   [`vigil_core::store::OpsStore`].
//!
//! Every query is stateless: stores are re-read fresh on every call and no
//! computed result is ever persisted.

pub mod aggregate;
pub mod classify;
pub mod date_window;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod reconstruct;
pub mod sites;

pub use engine::ComplianceEngine;
pub use error::{EngineError, Result};
