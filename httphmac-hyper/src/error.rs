use httphmac::prelude::HmacAuthError;
use thiserror::Error;

/// Result type for http hmac authentication for hyper
pub type HyperHmacResult<T> = std::result::Result<T, HyperHmacError>;

/// Error type for http hmac authentication for hyper
#[derive(Error, Debug)]
pub enum HyperHmacError {
  /// Failed to build a header value, e.g., non-visible characters in a configured default
  #[error("Failed to parse header value: {0}")]
  InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

  /// Inherited from HmacAuthError
  #[error("HmacAuthError: {0}")]
  HmacAuthError(#[from] HmacAuthError),
}

impl HyperHmacError {
  /// Returns the protocol level error if any, to classify rejections (e.g., `KeyNotFound` -> 401)
  pub fn as_auth_error(&self) -> Option<&HmacAuthError> {
    match self {
      HyperHmacError::HmacAuthError(e) => Some(e),
      _ => None,
    }
  }
}
