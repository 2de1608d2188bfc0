use crate::error::{HyperHmacError, HyperHmacResult};
use crate::trace::*;
use bytes::Bytes;
use http::{header::HOST, HeaderMap, HeaderValue, Request};
use httphmac::prelude::{
  AuthorizationHeader, DigestVersion, HmacAuthError, RequestParts, SecretKey, Signature, AUTHORIZATION_HEADER,
  CONTENT_SHA256_HEADER, CONTENT_TYPE_HEADER, TIMESTAMP_HEADER,
};
use std::{
  sync::OnceLock,
  time::{SystemTime, UNIX_EPOCH},
};

/// Content type set on outgoing requests that do not carry one
pub const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/* --------------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq)]
/// Per-call inputs of the signing pipeline
pub struct SigningContext {
  /// signing time in epoch seconds
  pub timestamp: u64,
  /// single-use nonce, only carried by v2 headers
  pub nonce: String,
}

impl SigningContext {
  pub fn new(timestamp: u64, nonce: &str) -> Self {
    Self {
      timestamp,
      nonce: nonce.to_string(),
    }
  }

  /// Fresh context with the current time and a random UUIDv4 nonce
  pub fn now() -> Self {
    Self::new(unix_now(), &uuid::Uuid::new_v4().to_string())
  }
}

/* --------------------------------------- */
#[derive(Debug)]
/// Signs outgoing requests and reads the signature asserted by incoming ones.
///
/// The signer caches its timestamp on first read, so one instance reused for several requests
/// stamps them all with the same time. Use [`RequestSigner::sign_with_context`] with a fresh
/// [`SigningContext`], or one signer per request, when that matters.
pub struct RequestSigner {
  id: String,
  realm: String,
  digest_version: DigestVersion,
  default_content_type: String,
  signed_headers: Vec<String>,
  timestamp: OnceLock<u64>,
}

impl RequestSigner {
  /// Create a new v2 signer for the given identity and realm
  pub fn new(id: &str, realm: &str) -> Self {
    Self {
      id: id.to_string(),
      realm: realm.to_string(),
      digest_version: DigestVersion::default(),
      default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
      signed_headers: vec![],
      timestamp: OnceLock::new(),
    }
  }

  pub fn set_digest_version(&mut self, digest_version: DigestVersion) -> &mut Self {
    self.digest_version = digest_version;
    self
  }

  pub fn set_default_content_type(&mut self, content_type: &str) -> &mut Self {
    self.default_content_type = content_type.to_string();
    self
  }

  /// Set additional headers covered by the signature. v1 verifiers must be configured with the same list.
  pub fn set_signed_headers(&mut self, names: &[&str]) -> HyperHmacResult<&mut Self> {
    // validated the same way as headers received on the wire
    AuthorizationHeader::try_new(self.digest_version, &self.id)?.set_signed_headers(names)?;
    self.signed_headers = names.iter().map(|v| v.to_string()).collect();
    Ok(self)
  }

  /// Pin the timestamp used by [`RequestSigner::sign`] and as fallback by [`RequestSigner::signature`]
  pub fn set_timestamp(&mut self, timestamp: u64) -> &mut Self {
    self.timestamp = OnceLock::from(timestamp);
    self
  }

  /// Current UTC epoch seconds, computed on first read and then reused by this instance
  pub fn timestamp(&self) -> u64 {
    *self.timestamp.get_or_init(unix_now)
  }

  pub fn id(&self) -> &str {
    &self.id
  }
  pub fn realm(&self) -> &str {
    &self.realm
  }
  pub fn digest_version(&self) -> DigestVersion {
    self.digest_version
  }
  pub fn default_content_type(&self) -> &str {
    &self.default_content_type
  }

  /// Context made of the signer's timestamp and a fresh nonce
  pub fn context(&self) -> SigningContext {
    SigningContext {
      timestamp: self.timestamp(),
      ..SigningContext::now()
    }
  }

  /* --------------------------------------- */
  /// Sign the request with the signer's context, see [`RequestSigner::sign_with_context`]
  pub fn sign<B>(&self, req: Request<B>, secret_key: &SecretKey) -> HyperHmacResult<Request<B>>
  where
    B: AsRef<[u8]>,
  {
    self.sign_with_context(req, secret_key, &self.context())
  }

  /// Return a signed copy of the request.
  /// Timestamp, content type and body hash headers are added only if absent, the body hash only for a non-empty body.
  /// Then the digest over the augmented request is written into the `Authorization` header.
  pub fn sign_with_context<B>(
    &self,
    req: Request<B>,
    secret_key: &SecretKey,
    context: &SigningContext,
  ) -> HyperHmacResult<Request<B>>
  where
    B: AsRef<[u8]>,
  {
    let (mut parts, body) = req.into_parts();
    if !parts.headers.contains_key(TIMESTAMP_HEADER) {
      parts.headers.insert(TIMESTAMP_HEADER, HeaderValue::from(context.timestamp));
    }
    if !parts.headers.contains_key(CONTENT_TYPE_HEADER) {
      parts
        .headers
        .insert(CONTENT_TYPE_HEADER, HeaderValue::from_str(&self.default_content_type)?);
    }
    if !parts.headers.contains_key(CONTENT_SHA256_HEADER) {
      let hashed_body = self.hash_body(body.as_ref());
      if !hashed_body.is_empty() {
        parts.headers.insert(CONTENT_SHA256_HEADER, HeaderValue::from_str(&hashed_body)?);
      }
    }
    let mut req = Request::from_parts(parts, body);

    let authorization = self.authorization(&req, secret_key, context)?;
    req
      .headers_mut()
      .insert(AUTHORIZATION_HEADER, HeaderValue::from_str(&authorization)?);
    debug!("Signed {} {} as {}", req.method(), req.uri().path(), self.id);
    Ok(req)
  }

  /// Compute the signature for the request, then serialize the `Authorization` header value
  pub fn authorization<B>(
    &self,
    req: &Request<B>,
    secret_key: &SecretKey,
    context: &SigningContext,
  ) -> HyperHmacResult<String>
  where
    B: AsRef<[u8]>,
  {
    let mut authorization = self.authorization_template(context)?;
    let signature = self.compute_signature(req, &authorization, secret_key)?;
    authorization.set_signature(&signature);
    Ok(authorization.to_string())
  }

  /// Compute the digest of the request for the given authorization parameters, using their version
  pub fn compute_signature<B>(
    &self,
    req: &Request<B>,
    authorization: &AuthorizationHeader,
    secret_key: &SecretKey,
  ) -> HyperHmacResult<String>
  where
    B: AsRef<[u8]>,
  {
    let parts = request_parts(req, authorization)?;
    Ok(authorization.version().get(&parts, authorization, secret_key)?)
  }

  /* --------------------------------------- */
  /// Extract the identity and signature asserted by the `Authorization` header, paired with the request timestamp.
  /// Only the shape is checked here; use [`RequestSigner::verify`] once the key of the identity is known.
  pub fn signature<B>(&self, req: &Request<B>) -> HyperHmacResult<Signature> {
    let (_, signature) = self.received(req)?;
    Ok(signature)
  }

  /// Recompute the digest of a received request with the parameters and version of its own `Authorization` header
  pub fn digest<B>(&self, req: &Request<B>, secret_key: &SecretKey) -> HyperHmacResult<String>
  where
    B: AsRef<[u8]>,
  {
    let authorization = self.received_authorization(req)?;
    self.compute_signature(req, &authorization, secret_key)
  }

  /// Verify a received request: the body must match its declared hash and the recomputed digest must match
  /// the asserted signature. Returns the asserted signature on success.
  pub fn verify<B>(&self, req: &Request<B>, secret_key: &SecretKey) -> HyperHmacResult<Signature>
  where
    B: AsRef<[u8]>,
  {
    let (authorization, signature) = self.received(req)?;

    let body = req.body().as_ref();
    if !body.is_empty() {
      let declared = header_str(req.headers(), CONTENT_SHA256_HEADER)?
        .ok_or_else(|| HmacAuthError::InvalidRequest(format!("Missing `{CONTENT_SHA256_HEADER}` header")))?;
      if declared != self.hash_body(body) {
        warn!("Body hash mismatch for request signed by {}", signature.id());
        return Err(HmacAuthError::InvalidSignature("Body does not match its declared hash".to_string()).into());
      }
    }

    let parts = request_parts(req, &authorization)?;
    let signature_base = authorization.version().signature_base(&parts, &authorization)?;
    signature_base.verify(secret_key, signature.signature()).inspect_err(|_| {
      warn!("Invalid v{} signature for id {}", authorization.version(), signature.id());
    })?;
    debug!("Verified v{} signature for id {}", authorization.version(), signature.id());
    Ok(signature)
  }

  /* --------------------------------------- */
  /// `""` for an empty body, otherwise `base64(SHA-256(body))`
  pub fn hashed_body<B>(&self, req: &Request<B>) -> String
  where
    B: AsRef<[u8]>,
  {
    self.hash_body(req.body().as_ref())
  }

  /// Content type header line, `""` if absent
  pub fn content_type<B>(&self, req: &Request<B>) -> String {
    req
      .headers()
      .get_all(CONTENT_TYPE_HEADER)
      .iter()
      .filter_map(|v| v.to_str().ok())
      .collect::<Vec<_>>()
      .join(", ")
  }

  fn hash_body(&self, body: &[u8]) -> String {
    if body.is_empty() {
      String::new()
    } else {
      self.digest_version.hashed_body(body)
    }
  }

  fn authorization_template(&self, context: &SigningContext) -> HyperHmacResult<AuthorizationHeader> {
    let signed_headers = self.signed_headers.iter().map(|v| v.as_str()).collect::<Vec<_>>();
    let mut authorization = AuthorizationHeader::try_new(self.digest_version, &self.id)?;
    authorization
      .set_realm(&self.realm)
      .set_nonce(&context.nonce)
      .set_signed_headers(&signed_headers)?;
    Ok(authorization)
  }

  /// Parse the received `Authorization` header.
  /// v1 headers do not list their signed headers, so the signer's are used.
  fn received_authorization<B>(&self, req: &Request<B>) -> HyperHmacResult<AuthorizationHeader> {
    let value = header_str(req.headers(), AUTHORIZATION_HEADER)?
      .ok_or_else(|| HmacAuthError::KeyNotFound("Missing authorization header".to_string()))?;
    let mut authorization = AuthorizationHeader::try_from(value)?;
    if authorization.version() == DigestVersion::V1 {
      let signed_headers = self.signed_headers.iter().map(|v| v.as_str()).collect::<Vec<_>>();
      authorization.set_signed_headers(&signed_headers)?;
    }
    Ok(authorization)
  }

  fn received<B>(&self, req: &Request<B>) -> HyperHmacResult<(AuthorizationHeader, Signature)> {
    let authorization = self.received_authorization(req)?;
    let timestamp = match header_str(req.headers(), TIMESTAMP_HEADER)? {
      Some(v) => v
        .trim()
        .parse::<u64>()
        .map_err(|_| HmacAuthError::MalformedRequest(format!("Invalid `{TIMESTAMP_HEADER}` header: {v}")))?,
      None => self.timestamp(),
    };
    let signature = Signature::try_new(authorization.id(), authorization.signature(), timestamp)?;
    Ok((authorization, signature))
  }
}

/* --------------------------------------- */
/// Current UTC epoch seconds
fn unix_now() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_secs())
    .unwrap_or_default()
}

/// Read a header as a visible ascii string; non-visible values are malformed input
pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> HyperHmacResult<Option<&'a str>> {
  headers
    .get(name)
    .map(|v| v.to_str())
    .transpose()
    .map_err(|e| HyperHmacError::from(HmacAuthError::MalformedRequest(format!("Invalid `{name}` header: {e}"))))
}

/// Build the transport independent view of the request read by the digest strategies.
/// Headers with non-visible values are left out, unless the canonical message of the authorization reads them.
pub(crate) fn request_parts<B>(req: &Request<B>, authorization: &AuthorizationHeader) -> HyperHmacResult<RequestParts>
where
  B: AsRef<[u8]>,
{
  let uri = req.uri();
  let host = match uri.host() {
    Some(host) => match uri.port_u16() {
      Some(port) if !is_default_port(uri.scheme_str(), port) => format!("{host}:{port}"),
      _ => host.to_string(),
    },
    None => header_str(req.headers(), HOST.as_str())?.unwrap_or_default().to_string(),
  };

  let mut parts = RequestParts::new(req.method().as_str(), &host, uri.path());
  if let Some(query) = uri.query() {
    parts.set_query(query);
  }
  for name in req.headers().keys() {
    let values = req
      .headers()
      .get_all(name)
      .iter()
      .map(|v| v.to_str())
      .collect::<Result<Vec<_>, _>>();
    match values {
      Ok(values) => {
        parts.set_header(name.as_str(), &values.join(", "));
      }
      Err(e) if is_signed_header(name.as_str(), authorization) => {
        return Err(HmacAuthError::MalformedRequest(format!("Invalid `{name}` header: {e}")).into());
      }
      Err(_) => debug!("Skip non-visible header: {}", name),
    }
  }
  parts.set_body(Bytes::copy_from_slice(req.body().as_ref()));
  Ok(parts)
}

/// `http://host:80` and `https://host:443` name the same origin as `host`
fn is_default_port(scheme: Option<&str>, port: u16) -> bool {
  matches!((scheme, port), (Some("http"), 80) | (Some("https"), 443))
}

/// Header read by the canonical message, either a protocol header or one listed in the authorization
fn is_signed_header(name: &str, authorization: &AuthorizationHeader) -> bool {
  [TIMESTAMP_HEADER, CONTENT_TYPE_HEADER, CONTENT_SHA256_HEADER].contains(&name)
    || authorization.signed_headers().iter().any(|v| v.eq_ignore_ascii_case(name))
}

/* --------------------------------------- */
#[cfg(test)]
#[path = "request_signer_tests.rs"]
mod tests;
