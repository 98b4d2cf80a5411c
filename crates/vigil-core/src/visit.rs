//! Raw visit events as read from the field log.
//!
//! Events are externally produced and immutable; the engine only reads them.
//! Every column arrives as the text the field app wrote — timestamps are not
//! parsed here, site and route references are not resolved here. The
//! normalization adapter in `vigil-engine` interprets them once, outside the
//! matching algorithm.

use serde::{Deserialize, Serialize};

/// One row of the visit log, verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEventRow {
  /// Timestamp text as logged. Usually `YYYY-MM-DD HH:MM:SS` or RFC 3339,
  /// but malformed values occur and must not be fatal.
  pub timestamp:      String,
  pub inspector_name: String,
  /// Raw route reference, e.g. `"A"` or `"Route B"`.
  pub route_text:     String,
  /// Raw site reference: an ID, a short code, or a display name in either
  /// language.
  pub site_name_text: String,
  pub guard_name:     String,
  /// Raw shift reference: a numeric code, a shift name, or noise.
  pub shift_code:     String,
  pub score:          Option<f64>,
  /// GPS display string, when the log carries one. Display-only.
  pub gps_text:       Option<String>,
}
