use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

use super::SessionData;
use crate::{AuthError, SecretString};

const NONCE_LEN: usize = 12;

/// Turns session state into an opaque cookie value and back.
///
/// `open` must reject any value it did not produce itself with the same key.
pub trait SessionCodec: Send + Sync {
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the session cannot be sealed.
    fn seal(&self, session: &SessionData) -> Result<String, AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError::SessionExpired` for values that are malformed,
    /// tampered with or sealed under another key.
    fn open(&self, value: &str) -> Result<SessionData, AuthError>;
}

/// AES-256-GCM over the JSON form of the session.
///
/// The key is the SHA-256 digest of the configured secret. The cookie value is
/// `base64url(nonce || ciphertext || tag)`; the GCM tag authenticates the
/// payload, so a modified cookie fails to open.
#[derive(Clone)]
pub struct AesGcmCodec {
    key: [u8; 32],
}

impl AesGcmCodec {
    pub fn new(secret: &SecretString) -> Self {
        Self {
            key: Sha256::digest(secret.expose_secret().as_bytes()).into(),
        }
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key))
    }
}

impl std::fmt::Debug for AesGcmCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AesGcmCodec([REDACTED])")
    }
}

impl SessionCodec for AesGcmCodec {
    fn seal(&self, session: &SessionData) -> Result<String, AuthError> {
        let plaintext = serde_json::to_vec(session)
            .map_err(|e| AuthError::Internal(format!("session encode: {e}")))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher()
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_slice())
            .map_err(|e| AuthError::Internal(format!("session encrypt: {e}")))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(combined))
    }

    fn open(&self, value: &str) -> Result<SessionData, AuthError> {
        let combined = URL_SAFE_NO_PAD
            .decode(value)
            .map_err(|_| AuthError::SessionExpired)?;

        if combined.len() <= NONCE_LEN {
            return Err(AuthError::SessionExpired);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let plaintext = self
            .cipher()
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| AuthError::SessionExpired)?;

        serde_json::from_slice(&plaintext).map_err(|_| AuthError::SessionExpired)
    }
}
