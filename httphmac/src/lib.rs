//! # httphmac
//!
//! Transport-independent core of HMAC-SHA256 authentication of http requests, compatible with the
//! `acquia-http-hmac` 2.0 protocol and its legacy 1.0 `Acquia` predecessor.
//!
//! The crate builds the canonical message of a request, computes its digest with the versioned strategy,
//! and encodes/decodes the `Authorization` header. Http message handling lives in `httphmac-hyper`.

mod authorization_header;
mod crypto;
mod digest;
mod error;
mod request_parts;
mod signature;
mod signature_base;
mod trace;
mod util;

/// Header carrying the signing time in epoch seconds
pub const TIMESTAMP_HEADER: &str = "x-authorization-timestamp";
/// Header carrying `base64(SHA-256(body))`, present only for non-empty bodies
pub const CONTENT_SHA256_HEADER: &str = "x-authorization-content-sha256";
/// Content type header
pub const CONTENT_TYPE_HEADER: &str = "content-type";
/// Authorization header
pub const AUTHORIZATION_HEADER: &str = "authorization";
/// Header carrying the server's signature of a response
pub const SERVER_AUTHORIZATION_HEADER: &str = "x-server-authorization-hmac-sha256";

pub mod prelude {
  pub use crate::{
    authorization_header::{AuthorizationHeader, V1_SCHEME, V2_SCHEME},
    crypto::{sha256_base64, SecretKey},
    digest::DigestVersion,
    error::{HmacAuthError, HmacAuthResult},
    request_parts::RequestParts,
    signature::Signature,
    signature_base::SignatureBase,
    AUTHORIZATION_HEADER, CONTENT_SHA256_HEADER, CONTENT_TYPE_HEADER, SERVER_AUTHORIZATION_HEADER, TIMESTAMP_HEADER,
  };
}

/* ----------------------------------------------------------------- */
