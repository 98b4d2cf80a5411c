//! Error types for `vigil-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown shift: {0:?}")]
  UnknownShift(String),

  #[error("unknown route: {0:?}")]
  UnknownRoute(String),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
