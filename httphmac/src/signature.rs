use crate::{
  error::{HmacAuthError, HmacAuthResult},
  trace::*,
};
use regex::Regex;
use std::sync::LazyLock;

static BASE64_SIGNATURE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/]+={0,2}$").expect("base64 signature pattern is a valid regex"));

/* ---------------------------------------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq)]
/// What the caller asserted in its `Authorization` header, before any cryptographic check.
/// The id is used by the caller to look up the secret key that verifies the signature.
pub struct Signature {
  id: String,
  signature: String,
  timestamp: u64,
}

impl Signature {
  /// Validate the asserted values syntactically.
  /// - `KeyNotFound` if the id or the signature is empty
  /// - `MalformedRequest` if the signature is not shaped as base64
  pub fn try_new(id: &str, signature: &str, timestamp: u64) -> HmacAuthResult<Self> {
    if id.is_empty() {
      return Err(HmacAuthError::KeyNotFound("Authorization header requires an id.".to_string()));
    }
    if signature.is_empty() {
      return Err(HmacAuthError::KeyNotFound(
        "Authorization header requires a signature.".to_string(),
      ));
    }
    if !BASE64_SIGNATURE.is_match(signature) {
      error!("Rejected non-base64 signature asserted by id {}", id);
      return Err(HmacAuthError::MalformedRequest(
        "Invalid signature in authorization header".to_string(),
      ));
    }
    Ok(Self {
      id: id.to_string(),
      signature: signature.to_string(),
      timestamp,
    })
  }

  pub fn id(&self) -> &str {
    &self.id
  }
  pub fn signature(&self) -> &str {
    &self.signature
  }
  /// Signing time in seconds since the unix epoch
  pub fn timestamp(&self) -> u64 {
    self.timestamp
  }
}
