//! OpenPGP cleartext signing backend.
//!
//! Produces the `-----BEGIN PGP SIGNED MESSAGE-----` armor that Helm and
//! GnuPG read, and verifies such documents against an armored public key.

use crate::{Signer, SignerError};
use pgp::types::SecretKeyTrait;
use pgp::cleartext::CleartextSignedMessage;
use pgp::{SignedPublicKey, SignedSecretKey};
use std::fmt;
use tracing::debug;

/// Signs with an OpenPGP secret key and verifies against a public key.
///
/// When no public key is configured, verification falls back to the
/// public half of the secret key.
pub struct PgpSigner {
    secret_key: Option<SignedSecretKey>,
    passphrase: String,
    public_key: Option<SignedPublicKey>,
}

impl PgpSigner {
    pub fn new(
        secret_key: Option<SignedSecretKey>,
        passphrase: impl Into<String>,
        public_key: Option<SignedPublicKey>,
    ) -> Self {
        Self {
            secret_key,
            passphrase: passphrase.into(),
            public_key,
        }
    }

    fn verify_message(&self, message: &CleartextSignedMessage) -> Result<(), SignerError> {
        if let Some(public) = &self.public_key {
            if message.verify(public).is_ok() {
                return Ok(());
            }
            if public
                .public_subkeys
                .iter()
                .any(|subkey| message.verify(subkey).is_ok())
            {
                return Ok(());
            }
            debug!(
                subkeys = public.public_subkeys.len(),
                "no key or subkey matched the signature"
            );
            return Err(SignerError::NoMatchingKey);
        }

        let secret = self
            .secret_key
            .as_ref()
            .ok_or(SignerError::MissingKey("public"))?;
        message
            .verify(&secret.public_key())
            .map(|_| ())
            .map_err(|_| SignerError::NoMatchingKey)
    }
}

impl fmt::Debug for PgpSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgpSigner")
            .field("can_sign", &self.secret_key.is_some())
            .field("has_public_key", &self.public_key.is_some())
            .finish_non_exhaustive()
    }
}

impl Signer for PgpSigner {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        let secret = self
            .secret_key
            .as_ref()
            .ok_or(SignerError::MissingKey("private"))?;
        let text = std::str::from_utf8(message).map_err(|_| SignerError::NotText)?;

        let mut rng = rand::thread_rng();
        let passphrase = self.passphrase.clone();
        let signed = CleartextSignedMessage::sign(&mut rng, text, secret, || passphrase)
            .map_err(SignerError::Pgp)?;
        let armored = signed
            .to_armored_string(None.into())
            .map_err(SignerError::Pgp)?;

        debug!(bytes = armored.len(), "signed cleartext message");
        Ok(armored.into_bytes())
    }

    fn verify(&self, signed_message: &[u8]) -> Result<(), SignerError> {
        let armored = std::str::from_utf8(signed_message).map_err(|_| SignerError::NotText)?;
        let (message, _headers) = CleartextSignedMessage::from_string(armored)
            .map_err(|err| SignerError::Envelope(err.to_string()))?;
        self.verify_message(&message)
    }
}
