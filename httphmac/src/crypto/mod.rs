mod symmetric;

use base64::{engine::general_purpose, Engine as _};
use sha2::{Digest, Sha256};

pub use symmetric::SecretKey;

/// Returns `base64(SHA-256(data))` with the standard padded alphabet
pub fn sha256_base64(data: &[u8]) -> String {
  let mut hasher = <Sha256 as Digest>::new();
  hasher.update(data);
  general_purpose::STANDARD.encode(hasher.finalize())
}
