use crate::{
  authorization_header::AuthorizationHeader,
  crypto::SecretKey,
  digest::DigestVersion,
  error::{HmacAuthError, HmacAuthResult},
  request_parts::RequestParts,
  trace::*,
  util::normalize_query,
  CONTENT_SHA256_HEADER, CONTENT_TYPE_HEADER, TIMESTAMP_HEADER,
};
use base64::{engine::general_purpose, Engine as _};

/// Signature base, i.e., the canonical message actually fed into HMAC.
///
/// v2 layout, lines joined by `\n`:
/// ```text
/// METHOD
/// host[:port]
/// path
/// normalized query
/// id=..&nonce=..&realm=..&version=2.0
/// name:value            (one per signed header)
/// x-authorization-timestamp
/// content-type          (non-empty body only)
/// x-authorization-content-sha256 (non-empty body only)
/// ```
///
/// v1 layout: method, body hash, content type, timestamp, signed headers block, path with query.
#[derive(Debug, Clone)]
pub struct SignatureBase {
  version: DigestVersion,
  lines: Vec<String>,
}

impl SignatureBase {
  /// Creates a new signature base from request parts and the authorization parameters.
  /// Fails with `InvalidRequest` if a header the canonical message needs is missing.
  pub(crate) fn try_new(
    version: DigestVersion,
    parts: &RequestParts,
    authorization: &AuthorizationHeader,
  ) -> HmacAuthResult<Self> {
    let lines = match version {
      DigestVersion::V1 => build_v1_lines(parts, authorization)?,
      DigestVersion::V2 => build_v2_lines(parts, authorization)?,
    };
    debug!("Built v{} signature base of {} lines for {} {}", version, lines.len(), parts.method, parts.path);
    Ok(Self { version, lines })
  }

  pub fn version(&self) -> DigestVersion {
    self.version
  }

  /// Returns the signature base string as bytes to be signed
  pub fn as_bytes(&self) -> Vec<u8> {
    self.to_string().into_bytes()
  }

  /// Sign the signature base and return the base64 encoded mac
  pub fn sign(&self, key: &SecretKey) -> HmacAuthResult<String> {
    let mac = key.sign(&self.as_bytes())?;
    Ok(general_purpose::STANDARD.encode(mac))
  }

  /// Verify the base64 encoded mac against the signature base in constant time
  pub fn verify(&self, key: &SecretKey, signature: &str) -> HmacAuthResult<()> {
    let expected = general_purpose::STANDARD
      .decode(signature)
      .map_err(|e| HmacAuthError::MalformedRequest(format!("Signature is not base64: {e}")))?;
    key.verify(&self.as_bytes(), &expected)
  }
}

impl std::fmt::Display for SignatureBase {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.lines.join("\n"))
  }
}

/* ---------------------------------------------------------------- */
fn required_header<'a>(parts: &'a RequestParts, name: &str) -> HmacAuthResult<&'a str> {
  parts
    .header(name)
    .ok_or_else(|| HmacAuthError::InvalidRequest(format!("Missing `{name}` header")))
}

/// Body hash is only part of the message when the body is non-empty
fn body_hash(parts: &RequestParts) -> HmacAuthResult<Option<&str>> {
  if !parts.has_body() {
    return Ok(None);
  }
  required_header(parts, CONTENT_SHA256_HEADER).map(Some)
}

fn signed_header_lines(
  parts: &RequestParts,
  authorization: &AuthorizationHeader,
  separator: &str,
) -> HmacAuthResult<Vec<String>> {
  authorization
    .signed_headers()
    .iter()
    .map(|name| {
      let value = required_header(parts, name)?;
      Ok(format!("{}{}{}", name.to_ascii_lowercase(), separator, value.trim()))
    })
    .collect()
}

fn build_v2_lines(parts: &RequestParts, authorization: &AuthorizationHeader) -> HmacAuthResult<Vec<String>> {
  let timestamp = required_header(parts, TIMESTAMP_HEADER)?;
  let body_hash = body_hash(parts)?;

  let mut lines = vec![
    parts.method.to_ascii_uppercase(),
    parts.host.to_ascii_lowercase(),
    parts.path.clone(),
    normalize_query(parts.query.as_deref().unwrap_or("")),
    authorization.signature_params(),
  ];
  lines.extend(signed_header_lines(parts, authorization, ":")?);
  lines.push(timestamp.to_string());
  if let Some(body_hash) = body_hash {
    lines.push(parts.header(CONTENT_TYPE_HEADER).unwrap_or_default().to_string());
    lines.push(body_hash.to_string());
  }
  Ok(lines)
}

fn build_v1_lines(parts: &RequestParts, authorization: &AuthorizationHeader) -> HmacAuthResult<Vec<String>> {
  let timestamp = required_header(parts, TIMESTAMP_HEADER)?;
  let body_hash = body_hash(parts)?;

  Ok(vec![
    parts.method.to_ascii_uppercase(),
    body_hash.unwrap_or_default().to_string(),
    parts.header(CONTENT_TYPE_HEADER).unwrap_or_default().to_string(),
    timestamp.to_string(),
    signed_header_lines(parts, authorization, ": ")?.join("\n"),
    parts.resource(),
  ])
}
