use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left untouched by RFC 3986 encoding: `A-Z a-z 0-9 - _ . ~`
const RFC3986_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Check duplicate elements in a vector
pub(crate) fn has_unique_elements<T>(iter: T) -> bool
where
  T: IntoIterator,
  T::Item: Eq + std::hash::Hash,
{
  let mut uniq = rustc_hash::FxHashSet::default();
  iter.into_iter().all(move |x| uniq.insert(x))
}

/// Percent-encode every byte except RFC 3986 unreserved characters (space becomes `%20`)
pub(crate) fn rfc3986_encode(value: &str) -> String {
  utf8_percent_encode(value, RFC3986_ENCODE_SET).to_string()
}

/// Inverse of [`rfc3986_encode`], lossy on invalid utf-8
pub(crate) fn rfc3986_decode(value: &str) -> String {
  percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// Normalize a raw query string: decode pairs, stable-sort by key, re-encode per RFC 3986.
/// Duplicate keys are all kept in their original relative order.
pub(crate) fn normalize_query(query: &str) -> String {
  let mut pairs = form_urlencoded::parse(query.as_bytes()).collect::<Vec<_>>();
  pairs.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
  pairs
    .iter()
    .map(|(k, v)| format!("{}={}", rfc3986_encode(k), rfc3986_encode(v)))
    .collect::<Vec<_>>()
    .join("&")
}
