use crate::{
  authorization_header::AuthorizationHeader,
  crypto::{sha256_base64, SecretKey},
  error::{HmacAuthError, HmacAuthResult},
  request_parts::RequestParts,
  signature_base::SignatureBase,
};

/* ---------------------------------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Digest strategy, selecting the canonicalization rules of the signed message.
/// A signer is bound to one version, while a verifier must follow the version declared by the authorization header.
pub enum DigestVersion {
  /// Legacy `Acquia <id>:<signature>` scheme
  V1,
  /// `acquia-http-hmac` scheme, version 2.0
  #[default]
  V2,
}

impl DigestVersion {
  pub fn as_str(&self) -> &'static str {
    match self {
      DigestVersion::V1 => "1.0",
      DigestVersion::V2 => "2.0",
    }
  }

  /// Build the canonical message of the request for this version
  pub fn signature_base(
    &self,
    parts: &RequestParts,
    authorization: &AuthorizationHeader,
  ) -> HmacAuthResult<SignatureBase> {
    SignatureBase::try_new(*self, parts, authorization)
  }

  /// Compute `base64(HMAC-SHA256(key, canonical message))`
  pub fn get(
    &self,
    parts: &RequestParts,
    authorization: &AuthorizationHeader,
    key: &SecretKey,
  ) -> HmacAuthResult<String> {
    self.signature_base(parts, authorization)?.sign(key)
  }

  /// Compute `base64(SHA-256(body))`
  pub fn hashed_body(&self, body: &[u8]) -> String {
    sha256_base64(body)
  }
}

impl std::fmt::Display for DigestVersion {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for DigestVersion {
  type Err = HmacAuthError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "1" | "1.0" => Ok(Self::V1),
      "2" | "2.0" => Ok(Self::V2),
      _ => Err(HmacAuthError::InvalidDigestVersion(s.to_string())),
    }
  }
}
