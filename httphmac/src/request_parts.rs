use bytes::Bytes;
use indexmap::IndexMap;

/* ---------------------------------------------------------------- */
#[derive(Debug, Clone, Default)]
/// Transport-independent view of an http request, holding exactly what the digest strategies read.
/// Header names are stored lower-cased so that lookups are case-insensitive.
pub struct RequestParts {
  /// request method, e.g., `GET`
  pub method: String,
  /// host with explicit port if any, e.g., `example.com:8443`
  pub host: String,
  /// request path, `/` if empty
  pub path: String,
  /// raw query string without the leading `?`
  pub query: Option<String>,
  /// header fields, multiple values already joined by `, `
  pub headers: IndexMap<String, String>,
  /// request body
  pub body: Bytes,
}

impl RequestParts {
  /// Create new request parts with method, host and path
  pub fn new(method: &str, host: &str, path: &str) -> Self {
    Self {
      method: method.to_ascii_uppercase(),
      host: host.to_string(),
      path: if path.is_empty() { "/".to_string() } else { path.to_string() },
      ..Default::default()
    }
  }

  /// Set raw query string
  pub fn set_query(&mut self, query: &str) -> &mut Self {
    self.query = Some(query.trim_start_matches('?').to_string());
    self
  }

  /// Set a header field, replacing any previous value of the same name
  pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
    self.headers.insert(name.to_ascii_lowercase(), value.to_string());
    self
  }

  /// Set body bytes
  pub fn set_body(&mut self, body: impl Into<Bytes>) -> &mut Self {
    self.body = body.into();
    self
  }

  /// Get a header field value by case-insensitive name
  pub fn header(&self, name: &str) -> Option<&str> {
    self.headers.get(&name.to_ascii_lowercase()).map(|v| v.as_str())
  }

  /// Check if the body is non-empty
  pub fn has_body(&self) -> bool {
    !self.body.is_empty()
  }

  /// Path followed by the raw query if present
  pub fn resource(&self) -> String {
    match &self.query {
      Some(q) if !q.is_empty() => format!("{}?{}", self.path, q),
      _ => self.path.clone(),
    }
  }
}
