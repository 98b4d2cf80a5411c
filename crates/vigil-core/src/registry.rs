//! Registry rows: the site directory and the inspector roster.
//!
//! Both are reference data maintained outside this engine. The site registry
//! feeds the identity resolver; the inspector roster supplies declared home
//! shifts for the classifier's overlap-zone and last-resort fallbacks.

use serde::{Deserialize, Serialize};

use crate::shift::{Route, Shift};

/// A site as registered: canonical ID, short code, and a display name in
/// each language the operation uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRecord {
  pub site_id: String,
  pub code:    String,
  pub name_en: String,
  pub name_th: String,
  pub route:   Option<Route>,
}

/// An inspector and their declared home shift, if any. Inspectors with an
/// unparseable declared-shift code are treated as having no declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorRecord {
  pub name:           String,
  pub declared_shift: Option<Shift>,
}
