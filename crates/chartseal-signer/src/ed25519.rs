//! Ed25519 signing backend.

use crate::envelope::Envelope;
use crate::{Signer, SignerError};
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use std::fmt;
use tracing::debug;

const ALGORITHM: &str = "ed25519";

/// Signs with a raw 32-byte Ed25519 key and verifies against a public key.
///
/// Either half may be missing: a verify-only signer has no secret, a
/// sign-only signer derives its public key from the secret.
pub struct Ed25519Signer {
    signing_key: Option<SigningKey>,
    verifying_key: Option<VerifyingKey>,
}

impl Ed25519Signer {
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(secret);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key: Some(signing_key),
            verifying_key: Some(verifying_key),
        }
    }

    pub fn from_public_bytes(public: &[u8; 32]) -> Result<Self, String> {
        let verifying_key = VerifyingKey::from_bytes(public).map_err(|err| err.to_string())?;
        Ok(Self {
            signing_key: None,
            verifying_key: Some(verifying_key),
        })
    }

    pub(crate) fn unconfigured() -> Self {
        Self {
            signing_key: None,
            verifying_key: None,
        }
    }

    pub fn public_key_bytes(&self) -> Option<[u8; 32]> {
        self.verifying_key.as_ref().map(VerifyingKey::to_bytes)
    }

    /// Short key hint written into envelopes: the first 8 bytes of the public key.
    pub fn key_id(&self) -> Option<String> {
        self.verifying_key.as_ref().map(key_id)
    }
}

fn key_id(key: &VerifyingKey) -> String {
    hex::encode(&key.as_bytes()[..8])
}

impl fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("key_id", &self.key_id())
            .field("can_sign", &self.signing_key.is_some())
            .finish()
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        let signing_key = self
            .signing_key
            .as_ref()
            .ok_or(SignerError::MissingKey("private"))?;
        let text = std::str::from_utf8(message).map_err(|_| SignerError::NotText)?;

        let signature = signing_key.sign(message);
        let envelope = Envelope {
            algorithm: ALGORITHM.to_string(),
            key_id: key_id(&signing_key.verifying_key()),
            text: text.to_string(),
            signature: signature.to_bytes().to_vec(),
        };
        debug!(key_id = %envelope.key_id, bytes = message.len(), "signed message");
        Ok(envelope.armor().into_bytes())
    }

    fn verify(&self, signed_message: &[u8]) -> Result<(), SignerError> {
        let verifying_key = self
            .verifying_key
            .as_ref()
            .ok_or(SignerError::MissingKey("public"))?;
        let armored = std::str::from_utf8(signed_message).map_err(|_| SignerError::NotText)?;
        let envelope = Envelope::parse(armored)?;

        if envelope.algorithm != ALGORITHM {
            return Err(SignerError::UnsupportedAlgorithm(envelope.algorithm));
        }
        let expected = key_id(verifying_key);
        if envelope.key_id != expected {
            return Err(SignerError::WrongKey {
                expected,
                found: envelope.key_id,
            });
        }

        let signature = Signature::from_slice(&envelope.signature).map_err(|_| {
            SignerError::Envelope(format!(
                "expected a 64-byte signature, got {} bytes",
                envelope.signature.len()
            ))
        })?;
        verifying_key
            .verify(envelope.text.as_bytes(), &signature)
            .map_err(|_| SignerError::BadSignature)?;
        debug!(key_id = %expected, "signature verified");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_signer() -> Ed25519Signer {
        Ed25519Signer::from_secret_bytes(&[42u8; 32])
    }

    #[test]
    fn test_sign_and_verify_succeeds() {
        let signer = test_signer();
        let signed = signer.sign(b"name: demo\n...\nfiles:\n").unwrap();
        assert!(signer.verify(&signed).is_ok());
    }

    #[test]
    fn test_envelope_embeds_text_verbatim() {
        let signer = test_signer();
        let text = "name: demo\n - - item\n...";
        let signed = signer.sign(text.as_bytes()).unwrap();
        let envelope = Envelope::parse(std::str::from_utf8(&signed).unwrap()).unwrap();
        assert_eq!(envelope.text, text);
        assert_eq!(envelope.key_id, signer.key_id().unwrap());
    }

    #[test]
    fn test_verify_with_wrong_public_key_fails() {
        let signed = test_signer().sign(b"payload").unwrap();
        let other = Ed25519Signer::from_secret_bytes(&[1u8; 32]);
        assert!(matches!(
            other.verify(&signed),
            Err(SignerError::WrongKey { .. })
        ));
    }

    #[test]
    fn test_verify_modified_text_fails() {
        let signer = test_signer();
        let signed = String::from_utf8(signer.sign(b"version: 1.0.0").unwrap()).unwrap();
        let tampered = signed.replace("version: 1.0.0", "version: 6.6.6");
        assert!(matches!(
            signer.verify(tampered.as_bytes()),
            Err(SignerError::BadSignature)
        ));
    }

    #[test]
    fn test_verify_after_crlf_conversion() {
        let signer = test_signer();
        let signed = String::from_utf8(signer.sign(b"name: demo\n...\nfiles:").unwrap()).unwrap();
        let crlf = signed.replace('\n', "\r\n");
        assert!(signer.verify(crlf.as_bytes()).is_ok());
    }

    #[test]
    fn test_verify_only_signer() {
        let signer = test_signer();
        let signed = signer.sign(b"payload").unwrap();
        let public = signer.public_key_bytes().unwrap();
        let verifier = Ed25519Signer::from_public_bytes(&public).unwrap();
        assert!(verifier.verify(&signed).is_ok());
        assert!(matches!(
            verifier.sign(b"payload"),
            Err(SignerError::MissingKey("private"))
        ));
    }

    #[test]
    fn test_unconfigured_signer_cannot_verify() {
        let signed = test_signer().sign(b"payload").unwrap();
        assert!(matches!(
            Ed25519Signer::unconfigured().verify(&signed),
            Err(SignerError::MissingKey("public"))
        ));
    }

    #[test]
    fn test_non_utf8_message_is_rejected() {
        assert!(matches!(
            test_signer().sign(&[0xff, 0xfe]),
            Err(SignerError::NotText)
        ));
    }

    #[test]
    fn test_garbage_envelope_is_rejected() {
        assert!(matches!(
            test_signer().verify(b"not signed at all"),
            Err(SignerError::Envelope(_))
        ));
    }
}
