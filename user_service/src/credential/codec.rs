use std::num::NonZeroU32;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use subtle::ConstantTimeEq;

use super::errors::CredentialError;
use crate::config::CredentialConfig;

/// Scheme tag at the start of every digest this codec produces
pub const DIGEST_SCHEME: &str = "pbkdf2-sha256";

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Turns plaintext secrets into digests of the form
/// `pbkdf2-sha256$<iterations>$<salt>$<derived key>` and checks secrets against them.
///
/// Salt and work factor travel inside the digest, so raising the configured iteration
/// count only affects new digests; old ones keep verifying.
#[derive(Clone, Debug)]
pub struct CredentialCodec {
    iterations: NonZeroU32,
    rng: SystemRandom,
}

impl CredentialCodec {
    pub fn new(config: CredentialConfig) -> Result<Self, CredentialError> {
        let iterations = NonZeroU32::new(config.iterations).ok_or_else(|| {
            CredentialError::Config("PBKDF2 iteration count must be non-zero".to_string())
        })?;

        Ok(Self {
            iterations,
            rng: SystemRandom::new(),
        })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations.get()
    }

    /// Digest a secret with a fresh random salt
    pub fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let mut salt = [0u8; SALT_LEN];
        self.rng
            .fill(&mut salt)
            .map_err(|_| CredentialError::Crypto("Failed to generate salt".to_string()))?;

        let mut derived = [0u8; KEY_LEN];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            self.iterations,
            &salt,
            plaintext.as_bytes(),
            &mut derived,
        );

        Ok(format!(
            "{}${}${}${}",
            DIGEST_SCHEME,
            self.iterations,
            URL_SAFE_NO_PAD.encode(salt),
            URL_SAFE_NO_PAD.encode(derived)
        ))
    }

    /// Check a secret against a stored digest
    ///
    /// Malformed or foreign digests simply fail to verify.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let Some(parsed) = ParsedDigest::parse(digest) else {
            tracing::debug!("Refusing to verify against a malformed digest");
            return false;
        };

        let mut derived = vec![0u8; parsed.key.len()];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            parsed.iterations,
            &parsed.salt,
            plaintext.as_bytes(),
            &mut derived,
        );

        derived.as_slice().ct_eq(parsed.key.as_slice()).into()
    }
}

struct ParsedDigest {
    iterations: NonZeroU32,
    salt: Vec<u8>,
    key: Vec<u8>,
}

impl ParsedDigest {
    fn parse(digest: &str) -> Option<Self> {
        let mut parts = digest.split('$');
        let (scheme, iterations, salt, key) =
            (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || scheme != DIGEST_SCHEME {
            return None;
        }

        let iterations = NonZeroU32::new(iterations.parse::<u32>().ok()?)?;
        let salt = URL_SAFE_NO_PAD.decode(salt).ok()?;
        let key = URL_SAFE_NO_PAD.decode(key).ok()?;
        if salt.is_empty() || key.is_empty() {
            return None;
        }

        Some(Self {
            iterations,
            salt,
            key,
        })
    }
}
