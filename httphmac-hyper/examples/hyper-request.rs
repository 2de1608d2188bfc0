use http::{Request, Response};
use http_body_util::Full;
use httphmac_hyper::{prelude::*, *};

const SECRET_KEY: &str = "W5PeGMxSItNerkNFqQMfYiJvH14WzVJMy54CPoTAYoI=";
const ID: &str = "efdde334-fe7b-11e4-a322-1697f925ec7b";
const REALM: &str = "Pipet service";

/// Request with a streaming body as built by a hyper client
fn build_request() -> Request<Full<&'static [u8]>> {
  let body = Full::new(&b"{\"method\":\"hi.bob\",\"params\":[\"5\",\"4\",\"8\"]}"[..]);
  Request::builder()
    .method("POST")
    .uri("https://example.acquiapipet.net/v1.0/task?limit=10")
    .header("content-type", "application/json")
    .header("x-custom-signer1", "custom-1")
    .body(body)
    .unwrap()
}

/// Sender function that signs a request with the v2 digest and a custom header
async fn sender(req: Request<Full<&'static [u8]>>) -> Request<bytes::Bytes> {
  println!("Signing with acquia-http-hmac 2.0");
  let secret_key = SecretKey::from_base64(SECRET_KEY).unwrap();
  let mut signer = RequestSigner::new(ID, REALM);
  signer.set_signed_headers(&["X-Custom-Signer1"]).unwrap();

  let req = req.into_buffered().await.unwrap();
  signer.sign_with_context(req, &secret_key, &SigningContext::now()).unwrap()
}

/// Receiver function that verifies the request and signs its response
async fn receiver(req: &Request<bytes::Bytes>) -> HyperHmacResult<Response<&'static str>> {
  let verifier = RequestSigner::new("server", REALM);
  let asserted = verifier.signature(req)?;
  println!("Request asserts id {} at {}", asserted.id(), asserted.timestamp());

  // the key would be looked up by the asserted id
  let secret_key = SecretKey::from_base64(SECRET_KEY)?;
  verifier.verify(req, &secret_key)?;
  println!("Request signature is verified");

  let mut res = Response::new(r#"{"id": 133, "status": "done"}"#);
  res.set_server_signature(req, &secret_key)?;
  Ok(res)
}

#[tokio::main]
async fn main() {
  let req = sender(build_request()).await;
  println!("Request header signed:\n{:#?}", req.headers());

  let res = receiver(&req).await.unwrap();
  println!("Response header signed:\n{:#?}", res.headers());

  let secret_key = SecretKey::from_base64(SECRET_KEY).unwrap();
  assert!(res.verify_server_signature(&req, &secret_key).is_ok());
  println!("Response signature is verified");
}
