use crate::error::{HmacAuthError, HmacAuthResult};
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<sha2::Sha256>;

/* -------------------------------- */
/// Secret key shared between a client identity and the server.
/// The signer never stores it; it is handed over per call.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
  /// Create a new secret key from raw bytes
  pub fn from_bytes(key: &[u8]) -> Self {
    SecretKey(key.to_vec())
  }

  /// Create a new secret key from base64 encoded string, the form in which acquia-http-hmac keys are distributed
  pub fn from_base64(key: &str) -> HmacAuthResult<Self> {
    let key = general_purpose::STANDARD.decode(key)?;
    Ok(SecretKey(key))
  }

  /// Compute HMAC-SHA256 over the data
  pub fn sign(&self, data: &[u8]) -> HmacAuthResult<Vec<u8>> {
    let mut mac = self.mac()?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
  }

  /// Verify the mac in constant time
  pub fn verify(&self, data: &[u8], expected_mac: &[u8]) -> HmacAuthResult<()> {
    let mut mac = self.mac()?;
    mac.update(data);
    mac
      .verify_slice(expected_mac)
      .map_err(|_| HmacAuthError::InvalidSignature("Invalid mac".to_string()))
  }

  /// Short fingerprint of the key, safe to log
  pub fn fingerprint(&self) -> String {
    let mut hasher = <Sha256 as Digest>::new();
    hasher.update(&self.0);
    let hash = hasher.finalize();
    general_purpose::URL_SAFE_NO_PAD.encode(&hash[..8])
  }

  fn mac(&self) -> HmacAuthResult<HmacSha256> {
    HmacSha256::new_from_slice(&self.0).map_err(|e| HmacAuthError::InvalidRequest(format!("Invalid secret key: {e}")))
  }
}

impl std::fmt::Debug for SecretKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("SecretKey").field(&self.fingerprint()).finish()
  }
}
