use crate::{
  error::HyperHmacResult,
  request_signer::header_str,
  trace::*,
};
use base64::{engine::general_purpose, Engine as _};
use http::{HeaderValue, Request, Response};
use httphmac::prelude::{
  AuthorizationHeader, HmacAuthError, SecretKey, AUTHORIZATION_HEADER, SERVER_AUTHORIZATION_HEADER, TIMESTAMP_HEADER,
};

/* --------------------------------------- */
/// A trait about the server signature of a response to an authenticated request.
///
/// `x-server-authorization-hmac-sha256 = base64(HMAC-SHA256(key, nonce + "\n" + timestamp + "\n" + body))`
/// where nonce and timestamp are those of the request. Only v2 requests carry a nonce.
pub trait ResponseSignature {
  /// Set the server signature header
  fn set_server_signature<R>(&mut self, req: &Request<R>, secret_key: &SecretKey) -> HyperHmacResult<()>;

  /// Verify the server signature header against the request it answers
  fn verify_server_signature<R>(&self, req: &Request<R>, secret_key: &SecretKey) -> HyperHmacResult<()>;
}

impl<B> ResponseSignature for Response<B>
where
  B: AsRef<[u8]>,
{
  fn set_server_signature<R>(&mut self, req: &Request<R>, secret_key: &SecretKey) -> HyperHmacResult<()> {
    let signature_base = response_signature_base(req, self.body().as_ref())?;
    let signature = general_purpose::STANDARD.encode(secret_key.sign(&signature_base)?);
    self
      .headers_mut()
      .insert(SERVER_AUTHORIZATION_HEADER, HeaderValue::from_str(&signature)?);
    Ok(())
  }

  fn verify_server_signature<R>(&self, req: &Request<R>, secret_key: &SecretKey) -> HyperHmacResult<()> {
    let signature = header_str(self.headers(), SERVER_AUTHORIZATION_HEADER)?
      .ok_or_else(|| HmacAuthError::KeyNotFound(format!("Missing `{SERVER_AUTHORIZATION_HEADER}` header")))?;
    let signature = general_purpose::STANDARD
      .decode(signature.trim())
      .map_err(|e| HmacAuthError::MalformedRequest(format!("Server signature is not base64: {e}")))?;
    let signature_base = response_signature_base(req, self.body().as_ref())?;
    secret_key.verify(&signature_base, &signature).inspect_err(|_| {
      warn!("Invalid server signature for response {}", self.status());
    })?;
    Ok(())
  }
}

/* --------------------------------------- */
fn response_signature_base<R>(req: &Request<R>, body: &[u8]) -> HyperHmacResult<Vec<u8>> {
  let authorization = header_str(req.headers(), AUTHORIZATION_HEADER)?
    .ok_or_else(|| HmacAuthError::InvalidRequest("Response signature requires a signed request".to_string()))?;
  let authorization = AuthorizationHeader::try_from(authorization)?;
  if authorization.nonce().is_empty() {
    return Err(
      HmacAuthError::InvalidRequest(format!(
        "Response signature requires a request nonce, absent in v{}",
        authorization.version()
      ))
      .into(),
    );
  }
  let timestamp = header_str(req.headers(), TIMESTAMP_HEADER)?
    .ok_or_else(|| HmacAuthError::InvalidRequest(format!("Missing `{TIMESTAMP_HEADER}` header")))?;

  let mut signature_base = format!("{}\n{}\n", authorization.nonce(), timestamp.trim()).into_bytes();
  signature_base.extend_from_slice(body);
  Ok(signature_base)
}

/* --------------------------------------- */
