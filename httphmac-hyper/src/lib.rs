//! # httphmac-hyper
//!
//! `httphmac-hyper` is a crate that provides a convenient API for `Hyper` users to authenticate http requests with
//! HMAC-SHA256, following the `acquia-http-hmac` protocol.
//! [`RequestSigner`] signs outgoing `http::Request`s and verifies incoming ones, and [`ResponseSignature`] lets a server
//! sign its response to an authenticated request.
//!
//! ## In-memory bodies
//!
//! Signing hashes the body, so the signer works on requests whose body is already in memory (`B: AsRef<[u8]>`,
//! e.g., `Bytes`, `Vec<u8>` or `String`). Streaming bodies are buffered with [`RequestBodyExt::into_buffered`] and
//! [`ResponseBodyExt::into_buffered`].
//!
//! ## Blocking API
//!
//! When the `blocking` feature is enabled (on by default), `into_buffered_sync` wrappers are provided.
//! They use `futures::executor::block_on` internally and are intended **exclusively for non-async contexts**.
//!
//! ## Timestamps
//!
//! A [`RequestSigner`] caches its timestamp on first read. For a signer shared between requests or threads,
//! pass a fresh [`SigningContext`] to [`RequestSigner::sign_with_context`] on every call.

mod error;
mod hyper_body;
mod request_signer;
mod response_signature;
mod trace;

pub use error::{HyperHmacError, HyperHmacResult};
pub use httphmac::prelude;
pub use hyper_body::{BufferedBody, RequestBodyExt, ResponseBodyExt};
pub use request_signer::{RequestSigner, SigningContext, DEFAULT_CONTENT_TYPE};
pub use response_signature::ResponseSignature;

/* ----------------------------------------------------------------- */
#[cfg(test)]
mod tests {
  use super::{prelude::*, *};
  use bytes::Bytes;
  use http::{Request, Response};
  use http_body_util::Full;

  const SECRET_KEY: &str = "W5PeGMxSItNerkNFqQMfYiJvH14WzVJMy54CPoTAYoI=";
  const ID: &str = "efdde334-fe7b-11e4-a322-1697f925ec7b";
  const REALM: &str = "Pipet service";

  async fn build_request() -> Request<Bytes> {
    let body = Full::new(&b"{\"method\":\"hi.bob\",\"params\":[\"5\",\"4\",\"8\"]}"[..]);
    let req = Request::builder()
      .method("POST")
      .uri("https://example.acquiapipet.net/v1.0/task")
      .header("content-type", "application/json")
      .body(body)
      .unwrap();
    req.into_buffered().await.unwrap()
  }

  #[tokio::test]
  async fn test_sign_verify_request() {
    // client side
    let secret_key = SecretKey::from_base64(SECRET_KEY).unwrap();
    let signer = RequestSigner::new(ID, REALM);
    let req = signer.sign(build_request().await, &secret_key).unwrap();
    let authorization = req.headers().get("authorization").unwrap().to_str().unwrap();
    assert!(authorization.starts_with(r##"acquia-http-hmac realm="Pipet%20service",id="efdde334"##));

    // server side: read the asserted identity, look up its key, then verify
    let verifier = RequestSigner::new("server", REALM);
    let asserted = verifier.signature(&req).unwrap();
    assert_eq!(asserted.id(), ID);
    assert_eq!(asserted.timestamp(), signer.timestamp());

    let looked_up = SecretKey::from_base64(SECRET_KEY).unwrap();
    let verified = verifier.verify(&req, &looked_up).unwrap();
    assert_eq!(verified, asserted);
    assert_eq!(verifier.digest(&req, &looked_up).unwrap(), asserted.signature());

    let wrong_key = SecretKey::from_bytes(b"not the key");
    assert!(verifier.verify(&req, &wrong_key).is_err());
  }

  #[tokio::test]
  async fn test_sign_verify_response() {
    let secret_key = SecretKey::from_base64(SECRET_KEY).unwrap();
    let signer = RequestSigner::new(ID, REALM);
    let req = signer.sign(build_request().await, &secret_key).unwrap();

    let res = Response::builder()
      .status(200)
      .body(Full::new(&b"{\"id\": 133, \"status\": \"done\"}"[..]))
      .unwrap();
    let mut res = res.into_buffered().await.unwrap();
    res.set_server_signature(&req, &secret_key).unwrap();
    assert!(res.headers().contains_key(SERVER_AUTHORIZATION_HEADER));
    assert!(res.verify_server_signature(&req, &secret_key).is_ok());
  }

  #[cfg(feature = "blocking")]
  #[test]
  fn test_sign_verify_request_sync() {
    let body = Full::new(&b"{\"hello\": \"world\"}"[..]);
    let req = Request::builder()
      .method("PUT")
      .uri("https://example.com/resource")
      .body(body)
      .unwrap()
      .into_buffered_sync()
      .unwrap();

    let secret_key = SecretKey::from_bytes(b"01234567890123456789012345678901");
    let signer = RequestSigner::new("client", "realm");
    let req = signer.sign(req, &secret_key).unwrap();
    assert!(signer.verify(&req, &secret_key).is_ok());
  }
}
