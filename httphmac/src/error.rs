use thiserror::Error;

/// Result type for http hmac authentication
pub type HmacAuthResult<T> = std::result::Result<T, HmacAuthError>;

/// Error type for http hmac authentication
#[derive(Error, Debug)]
pub enum HmacAuthError {
  #[error("Base64 decode error: {0}")]
  Base64DecodeError(#[from] base64::DecodeError),

  /* ----- Authorization header errors ----- */
  /// Identity or signature is missing from the authorization header
  #[error("Key not found: {0}")]
  KeyNotFound(String),
  /// Authorization header does not follow the expected grammar
  #[error("Malformed request: {0}")]
  MalformedRequest(String),

  /* ----- Canonicalization errors ----- */
  /// Request cannot be canonicalized for digest computation
  #[error("Invalid request: {0}")]
  InvalidRequest(String),
  /// Invalid digest version tag
  #[error("Invalid digest version: {0}")]
  InvalidDigestVersion(String),

  /* ----- Verification errors ----- */
  /// Recomputed digest does not match the asserted one
  #[error("Invalid signature: {0}")]
  InvalidSignature(String),
}
