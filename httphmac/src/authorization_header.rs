use crate::{
  digest::DigestVersion,
  error::{HmacAuthError, HmacAuthResult},
  trace::*,
  util::{has_unique_elements, rfc3986_decode, rfc3986_encode},
};
use sfv::{ListEntry, Parser};

/// Authorization scheme of digest version 2
pub const V2_SCHEME: &str = "acquia-http-hmac";
/// Authorization scheme of digest version 1
pub const V1_SCHEME: &str = "Acquia";

/* ---------------------------------------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq)]
/// Value of the `Authorization` header.
///
/// Wire formats:
/// - v2: `acquia-http-hmac realm="<realm>",id="<id>",nonce="<nonce>",version="2.0",headers="<h1;h2>",signature="<sig>"`
///   where realm is RFC 3986 percent-encoded.
/// - v1: `Acquia <id>:<sig>`
pub struct AuthorizationHeader {
  version: DigestVersion,
  realm: String,
  id: String,
  nonce: String,
  signed_headers: Vec<String>,
  signature: String,
}

impl AuthorizationHeader {
  /// Create a new authorization header without signature.
  /// The id must be printable ascii without leading or trailing spaces so that the serialized header parses back.
  pub fn try_new(version: DigestVersion, id: &str) -> HmacAuthResult<Self> {
    if !is_valid_id(id) {
      return Err(HmacAuthError::InvalidRequest(format!("Invalid id for authorization header: {id:?}")));
    }
    Ok(Self::with_id(version, id))
  }

  /// Unchecked constructor for values read from the wire
  fn with_id(version: DigestVersion, id: &str) -> Self {
    Self {
      version,
      realm: String::new(),
      id: id.to_string(),
      nonce: String::new(),
      signed_headers: vec![],
      signature: String::new(),
    }
  }

  /// Set realm
  pub fn set_realm(&mut self, realm: &str) -> &mut Self {
    self.realm = realm.to_string();
    self
  }

  /// Set nonce
  pub fn set_nonce(&mut self, nonce: &str) -> &mut Self {
    self.nonce = nonce.to_string();
    self
  }

  /// Set names of the additional headers covered by the signature
  pub fn set_signed_headers(&mut self, names: &[&str]) -> HmacAuthResult<&mut Self> {
    if let Some(invalid) = names.iter().find(|name| !is_valid_header_name(name)) {
      return Err(HmacAuthError::InvalidRequest(format!("Invalid signed header name: {invalid:?}")));
    }
    if !has_unique_elements(names.iter().map(|name| name.to_ascii_lowercase())) {
      return Err(HmacAuthError::InvalidRequest("Duplicate signed header names".to_string()));
    }
    self.signed_headers = names.iter().map(|name| name.to_string()).collect();
    Ok(self)
  }

  /// Set the base64 signature
  pub fn set_signature(&mut self, signature: &str) -> &mut Self {
    self.signature = signature.to_string();
    self
  }

  pub fn version(&self) -> DigestVersion {
    self.version
  }
  pub fn realm(&self) -> &str {
    &self.realm
  }
  pub fn id(&self) -> &str {
    &self.id
  }
  pub fn nonce(&self) -> &str {
    &self.nonce
  }
  pub fn signed_headers(&self) -> &[String] {
    &self.signed_headers
  }
  pub fn signature(&self) -> &str {
    &self.signature
  }

  /// Authorization parameters line of the v2 signature base, sorted by name
  pub(crate) fn signature_params(&self) -> String {
    format!(
      "id={}&nonce={}&realm={}&version={}",
      rfc3986_encode(&self.id),
      rfc3986_encode(&self.nonce),
      rfc3986_encode(&self.realm),
      self.version
    )
  }
}

impl std::fmt::Display for AuthorizationHeader {
  /// Serialize into the exact wire value of the `Authorization` header
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self.version {
      DigestVersion::V1 => write!(f, "{} {}:{}", V1_SCHEME, self.id, self.signature),
      DigestVersion::V2 => write!(
        f,
        "{} realm=\"{}\",id=\"{}\",nonce=\"{}\",version=\"{}\",headers=\"{}\",signature=\"{}\"",
        V2_SCHEME,
        rfc3986_encode(&self.realm),
        escape_quoted(&self.id),
        escape_quoted(&self.nonce),
        self.version,
        escape_quoted(&self.signed_headers.join(";")),
        escape_quoted(&self.signature)
      ),
    }
  }
}

impl TryFrom<&str> for AuthorizationHeader {
  type Error = HmacAuthError;

  /// Parse the `Authorization` header value.
  /// Missing id or signature are left empty and reported later as `KeyNotFound`.
  fn try_from(value: &str) -> HmacAuthResult<Self> {
    let Some((scheme, params)) = value.trim().split_once(' ') else {
      return Err(HmacAuthError::MalformedRequest(format!(
        "Authorization header has no scheme delimiter: {value}"
      )));
    };
    if scheme.eq_ignore_ascii_case(V2_SCHEME) {
      parse_v2_params(params.trim())
    } else if scheme.eq_ignore_ascii_case(V1_SCHEME) {
      parse_v1_params(params.trim())
    } else {
      Err(HmacAuthError::MalformedRequest(format!("Unsupported authorization scheme: {scheme}")))
    }
  }
}

impl std::str::FromStr for AuthorizationHeader {
  type Err = HmacAuthError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::try_from(s)
  }
}

/* ---------------------------------------------------------------- */
fn parse_v1_params(params: &str) -> HmacAuthResult<AuthorizationHeader> {
  // base64 never contains `:`, so the last one delimits the signature
  let Some((id, signature)) = params.rsplit_once(':') else {
    return Err(HmacAuthError::MalformedRequest(
      "Authorization header requires `<id>:<signature>`".to_string(),
    ));
  };
  let mut header = AuthorizationHeader::with_id(DigestVersion::V1, id);
  header.set_signature(signature);
  Ok(header)
}

fn parse_v2_params(params: &str) -> HmacAuthResult<AuthorizationHeader> {
  let dictionary = Parser::parse_dictionary(params.as_bytes())
    .map_err(|e| HmacAuthError::MalformedRequest(format!("Failed to parse authorization parameters: {e}")))?;

  let mut version = None;
  let mut header = AuthorizationHeader::with_id(DigestVersion::V2, "");
  let mut signed_headers = String::new();
  for (key, entry) in dictionary.iter() {
    let value = match entry {
      ListEntry::Item(item) => item.bare_item.as_str().ok_or_else(|| {
        HmacAuthError::MalformedRequest(format!("Authorization parameter `{key}` must be a quoted string"))
      })?,
      ListEntry::InnerList(_) => {
        return Err(HmacAuthError::MalformedRequest(format!(
          "Authorization parameter `{key}` must not be a list"
        )))
      }
    };
    match key.as_str() {
      "realm" => header.realm = rfc3986_decode(value),
      "id" => header.id = value.to_string(),
      "nonce" => header.nonce = value.to_string(),
      "version" => version = Some(value.to_string()),
      "headers" => signed_headers = value.to_string(),
      "signature" => header.signature = value.to_string(),
      _ => warn!("Ignore unknown authorization parameter: {}", key),
    }
  }

  match version.as_deref().map(str::parse::<DigestVersion>) {
    Some(Ok(DigestVersion::V2)) => {}
    Some(_) => {
      return Err(HmacAuthError::MalformedRequest(format!(
        "Unsupported version for {V2_SCHEME}: {}",
        version.unwrap_or_default()
      )))
    }
    None => return Err(HmacAuthError::MalformedRequest("Authorization header requires a version".to_string())),
  }

  let names = signed_headers.split(';').filter(|v| !v.is_empty()).collect::<Vec<_>>();
  header
    .set_signed_headers(&names)
    .map_err(|e| HmacAuthError::MalformedRequest(e.to_string()))?;
  Ok(header)
}

/// Printable ascii (space included) without surrounding spaces, i.e., what both schemes carry unchanged
fn is_valid_id(id: &str) -> bool {
  id.bytes().all(|b| (0x20..=0x7e).contains(&b)) && id.trim() == id
}

/// Token characters of RFC 9110 field names
fn is_valid_header_name(name: &str) -> bool {
  !name.is_empty()
    && name
      .bytes()
      .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

/// Escape a value for an RFC 8941 quoted string
fn escape_quoted(value: &str) -> String {
  value.replace('\\', "\\\\").replace('"', "\\\"")
}
