//! Verifying key decoding and the process-wide key cache.

use crate::errors::KeyError;
use base64::Engine;
use jsonwebtoken::DecodingKey;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::spki::{ObjectIdentifier, SubjectPublicKeyInfoRef};
use p256::pkcs8::DecodePublicKey;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// `id-ecPublicKey` (RFC 5480).
const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
/// `secp256r1` / `prime256v1`.
const P256_CURVE_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");

const PEM_PUBLIC_KEY_TAG: &str = "PUBLIC KEY";

/// An immutable P-256 public key used to verify tickets.
#[derive(Clone)]
pub struct VerifyingKey {
    public: p256::PublicKey,
    decoding: DecodingKey,
    fingerprint: String,
}

impl VerifyingKey {
    /// Decodes a PEM `PUBLIC KEY` block or raw SubjectPublicKeyInfo DER.
    ///
    /// # Errors
    ///
    /// - [`KeyError::Malformed`] if the bytes are not valid PEM or DER
    /// - [`KeyError::WrongType`] if the PEM label is not `PUBLIC KEY`, or the
    ///   key is not an elliptic-curve key on P-256
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let der = if looks_like_pem(bytes) {
            let block = pem::parse(bytes)
                .map_err(|e| KeyError::Malformed(format!("PEM decode failed: {}", e)))?;
            if block.tag() != PEM_PUBLIC_KEY_TAG {
                return Err(KeyError::WrongType(format!(
                    "expected a {} block, found {}",
                    PEM_PUBLIC_KEY_TAG,
                    block.tag()
                )));
            }
            block.into_contents()
        } else {
            bytes.to_vec()
        };

        let spki = SubjectPublicKeyInfoRef::try_from(der.as_slice())
            .map_err(|e| KeyError::Malformed(format!("invalid SubjectPublicKeyInfo: {}", e)))?;
        if spki.algorithm.oid != EC_PUBLIC_KEY_OID {
            return Err(KeyError::WrongType(format!(
                "algorithm {} is not an elliptic-curve public key",
                spki.algorithm.oid
            )));
        }
        let curve = spki
            .algorithm
            .parameters_oid()
            .map_err(|_| KeyError::WrongType("missing named curve".to_string()))?;
        if curve != P256_CURVE_OID {
            return Err(KeyError::WrongType(format!("curve {} is not P-256", curve)));
        }

        let public = p256::PublicKey::from_public_key_der(&der)
            .map_err(|e| KeyError::Malformed(format!("invalid P-256 point: {}", e)))?;
        let point = public.to_encoded_point(false);
        let decoding = DecodingKey::from_ec_der(point.as_bytes());
        let fingerprint =
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(Sha256::digest(&der));

        Ok(Self {
            public,
            decoding,
            fingerprint,
        })
    }

    /// Base64url (no padding) SHA-256 of the SubjectPublicKeyInfo DER.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// The decoded P-256 public key.
    pub fn public_key(&self) -> &p256::PublicKey {
        &self.public
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyingKey")
            .field("alg", &"ES256")
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

fn looks_like_pem(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(b"-----BEGIN")
}

/// Where key material comes from.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// An operator-provisioned file (PEM or DER).
    File(PathBuf),
    /// Key bytes held in memory.
    Bytes(Vec<u8>),
}

/// Loads the verifying key once and serves it from memory afterwards.
///
/// Safe to share across threads. Concurrent first callers may each decode
/// the key, but only the first stored value is ever handed out until an
/// explicit [`KeyProvider::refresh`].
#[derive(Debug)]
pub struct KeyProvider {
    source: KeySource,
    cached: RwLock<Option<Arc<VerifyingKey>>>,
}

impl KeyProvider {
    /// Creates a provider over an explicit source.
    pub fn new(source: KeySource) -> Self {
        Self {
            source,
            cached: RwLock::new(None),
        }
    }

    /// Creates a provider reading the key file at `path` on first use.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::new(KeySource::File(path.as_ref().to_path_buf()))
    }

    /// Creates a provider over in-memory PEM or DER bytes.
    pub fn from_pem(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(KeySource::Bytes(bytes.into()))
    }

    /// Returns the cached key, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] if the key cannot be read or decoded. Failures are
    /// not cached; the next call retries the load.
    pub fn get_verifying_key(&self) -> Result<Arc<VerifyingKey>, KeyError> {
        if let Some(key) = self.cached.read().as_ref() {
            tracing::debug!(fingerprint = key.fingerprint(), "verifying key cache hit");
            return Ok(Arc::clone(key));
        }

        let loaded = Arc::new(self.load()?);
        let mut slot = self.cached.write();
        let key = slot.get_or_insert_with(|| {
            tracing::info!(fingerprint = loaded.fingerprint(), "verifying key loaded");
            Arc::clone(&loaded)
        });
        Ok(Arc::clone(key))
    }

    /// Reloads the key from its source and replaces the cached value.
    ///
    /// On failure the previously cached key stays in place.
    pub fn refresh(&self) -> Result<Arc<VerifyingKey>, KeyError> {
        let loaded = Arc::new(self.load()?);
        let previous = self.cached.write().replace(Arc::clone(&loaded));
        tracing::warn!(
            fingerprint = loaded.fingerprint(),
            previous = ?previous.as_ref().map(|k| k.fingerprint().to_string()),
            "verifying key refreshed"
        );
        Ok(loaded)
    }

    /// Whether a key is currently cached.
    pub fn is_loaded(&self) -> bool {
        self.cached.read().is_some()
    }

    fn load(&self) -> Result<VerifyingKey, KeyError> {
        match &self.source {
            KeySource::File(path) => {
                let bytes = std::fs::read(path).map_err(|source| KeyError::Unavailable {
                    path: path.clone(),
                    source,
                })?;
                VerifyingKey::from_bytes(&bytes)
            }
            KeySource::Bytes(bytes) => VerifyingKey::from_bytes(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P256_PUBLIC: &[u8] = include_bytes!("../../../testdata/keys/p256_public.pem");
    const P256_PUBLIC_DER: &[u8] = include_bytes!("../../../testdata/keys/p256_public.der");
    const P384_PUBLIC: &[u8] = include_bytes!("../../../testdata/keys/p384_public.pem");
    const RSA_PUBLIC: &[u8] = include_bytes!("../../../testdata/keys/rsa_public.pem");
    const P256_PRIVATE: &[u8] = include_bytes!("../../../testdata/keys/p256_private.pem");

    #[test]
    fn decodes_pem_and_der_to_same_key() {
        let from_pem = VerifyingKey::from_bytes(P256_PUBLIC).unwrap();
        let from_der = VerifyingKey::from_bytes(P256_PUBLIC_DER).unwrap();
        assert_eq!(from_pem.fingerprint(), from_der.fingerprint());
        assert_eq!(from_pem.public_key(), from_der.public_key());
    }

    #[test]
    fn rejects_other_curves_and_families() {
        assert!(matches!(
            VerifyingKey::from_bytes(P384_PUBLIC),
            Err(KeyError::WrongType(_))
        ));
        assert!(matches!(
            VerifyingKey::from_bytes(RSA_PUBLIC),
            Err(KeyError::WrongType(_))
        ));
    }

    #[test]
    fn rejects_private_key_block() {
        let err = VerifyingKey::from_bytes(P256_PRIVATE).unwrap_err();
        assert!(matches!(err, KeyError::WrongType(ref msg) if msg.contains("PRIVATE KEY")));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            VerifyingKey::from_bytes(b"-----BEGIN PUBLIC KEY-----\n!!!\n-----END PUBLIC KEY-----\n"),
            Err(KeyError::Malformed(_))
        ));
        assert!(matches!(
            VerifyingKey::from_bytes(b"not a key"),
            Err(KeyError::Malformed(_))
        ));
    }

    #[test]
    fn provider_caches_first_load() {
        let provider = KeyProvider::from_pem(P256_PUBLIC);
        assert!(!provider.is_loaded());
        let first = provider.get_verifying_key().unwrap();
        let second = provider.get_verifying_key().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(provider.is_loaded());
    }

    #[test]
    fn debug_does_not_dump_key_material() {
        let key = VerifyingKey::from_bytes(P256_PUBLIC).unwrap();
        let debug = format!("{:?}", key);
        assert!(debug.contains("ES256"));
        assert!(debug.contains(key.fingerprint()));
    }
}
