//! Algorithm-polymorphic token signer.
//!
//! [`Signer`] is a closed set of variants dispatched with exhaustive
//! matches. Every variant verifies only tokens whose header names its own
//! algorithm, so an HS256 token never validates against an RSA or ECDSA
//! verifier and vice versa.

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode};

use idaas_core::config::{JwtAlgorithm, KeyMaterialConfig};
use idaas_core::error::{AppError, ErrorKind};
use idaas_core::result::AppResult;

use super::claims::{TokenClaims, UserClaims};
use super::error::JwtError;

/// Clock skew tolerated when checking `exp` and `nbf`, in seconds. Zero:
/// a token is accepted only inside `[nbf, exp]`.
pub const LEEWAY_SECONDS: u64 = 0;

/// Signs and verifies tokens with one algorithm and one set of keys.
pub enum Signer {
    /// HMAC-SHA256 over a shared secret.
    Hs256(SharedSecretKeys),
    /// RSA-SHA256 over a PEM key pair.
    Rs256(KeyPairKeys),
    /// ECDSA P-256 over a PEM key pair.
    Es256(KeyPairKeys),
}

/// Shared secret that both signs and verifies.
pub struct SharedSecretKeys {
    secret: Vec<u8>,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Asymmetric keys. The private half is optional so a verify-only signer
/// can be handed to parties that must never sign.
pub struct KeyPairKeys {
    public_pem: String,
    private_pem: Option<String>,
    encoding: Option<EncodingKey>,
    decoding: DecodingKey,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("algorithm", &self.algorithm())
            .field("can_sign", &self.can_sign())
            .finish()
    }
}

fn key_error(message: impl Into<String>, err: jsonwebtoken::errors::Error) -> AppError {
    AppError::with_source(ErrorKind::Configuration, message, err)
}

impl KeyPairKeys {
    fn load(
        private_pem: Option<&str>,
        public_pem: &str,
        encoding_from: fn(&[u8]) -> jsonwebtoken::errors::Result<EncodingKey>,
        decoding_from: fn(&[u8]) -> jsonwebtoken::errors::Result<DecodingKey>,
    ) -> AppResult<Self> {
        let decoding = decoding_from(public_pem.as_bytes())
            .map_err(|e| key_error("Invalid public key", e))?;
        let encoding = private_pem
            .map(|pem| encoding_from(pem.as_bytes()))
            .transpose()
            .map_err(|e| key_error("Invalid private key", e))?;

        Ok(Self {
            public_pem: public_pem.to_string(),
            private_pem: private_pem.map(str::to_string),
            encoding,
            decoding,
        })
    }
}

impl Signer {
    /// HS256 signer over `secret`.
    pub fn hs256(secret: impl AsRef<[u8]>) -> AppResult<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(AppError::configuration("HS256 secret must not be empty"));
        }
        Ok(Self::Hs256(SharedSecretKeys {
            secret: secret.to_vec(),
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }))
    }

    /// RS256 signer. Without a private key it can only verify.
    pub fn rs256(private_pem: Option<&str>, public_pem: &str) -> AppResult<Self> {
        KeyPairKeys::load(
            private_pem,
            public_pem,
            EncodingKey::from_rsa_pem,
            DecodingKey::from_rsa_pem,
        )
        .map(Self::Rs256)
    }

    /// ES256 signer. Without a private key it can only verify.
    pub fn es256(private_pem: Option<&str>, public_pem: &str) -> AppResult<Self> {
        KeyPairKeys::load(
            private_pem,
            public_pem,
            EncodingKey::from_ec_pem,
            DecodingKey::from_ec_pem,
        )
        .map(Self::Es256)
    }

    /// Build a signer from configuration and prove its keys belong together.
    pub fn from_config(algorithm: JwtAlgorithm, keys: &KeyMaterialConfig) -> AppResult<Self> {
        let signer = match algorithm {
            JwtAlgorithm::Hs256 => {
                let secret = keys
                    .secret()
                    .ok_or_else(|| AppError::configuration("HS256 requires a secret"))?;
                Self::hs256(secret)?
            }
            JwtAlgorithm::Rs256 | JwtAlgorithm::Es256 => {
                let private_pem = keys.private_key_pem()?;
                let public_pem = keys.public_key_pem()?.ok_or_else(|| {
                    AppError::configuration(format!("{algorithm} requires a public key"))
                })?;
                if algorithm == JwtAlgorithm::Rs256 {
                    Self::rs256(private_pem.as_deref(), &public_pem)?
                } else {
                    Self::es256(private_pem.as_deref(), &public_pem)?
                }
            }
        };

        if signer.can_sign() {
            signer.self_check()?;
        }
        Ok(signer)
    }

    /// The configured algorithm.
    pub fn algorithm(&self) -> JwtAlgorithm {
        match self {
            Self::Hs256(_) => JwtAlgorithm::Hs256,
            Self::Rs256(_) => JwtAlgorithm::Rs256,
            Self::Es256(_) => JwtAlgorithm::Es256,
        }
    }

    fn jwt_algorithm(&self) -> Algorithm {
        match self {
            Self::Hs256(_) => Algorithm::HS256,
            Self::Rs256(_) => Algorithm::RS256,
            Self::Es256(_) => Algorithm::ES256,
        }
    }

    /// Key material needed to verify: the shared secret for HS256, the PEM
    /// public key otherwise.
    pub fn public_key(&self) -> &[u8] {
        match self {
            Self::Hs256(keys) => &keys.secret,
            Self::Rs256(keys) | Self::Es256(keys) => keys.public_pem.as_bytes(),
        }
    }

    /// Signing key material, when this signer holds it.
    pub fn private_key(&self) -> Option<&[u8]> {
        match self {
            Self::Hs256(keys) => Some(&keys.secret),
            Self::Rs256(keys) | Self::Es256(keys) => {
                keys.private_pem.as_deref().map(str::as_bytes)
            }
        }
    }

    /// Whether [`Signer::sign`] can succeed.
    pub fn can_sign(&self) -> bool {
        self.encoding_key().is_some()
    }

    /// A copy holding only the public key. `None` for HS256, where the
    /// verification key is also the signing key.
    pub fn verifier(&self) -> AppResult<Option<Self>> {
        match self {
            Self::Hs256(_) => Ok(None),
            Self::Rs256(keys) => Self::rs256(None, &keys.public_pem).map(Some),
            Self::Es256(keys) => Self::es256(None, &keys.public_pem).map(Some),
        }
    }

    fn encoding_key(&self) -> Option<&EncodingKey> {
        match self {
            Self::Hs256(keys) => Some(&keys.encoding),
            Self::Rs256(keys) | Self::Es256(keys) => keys.encoding.as_ref(),
        }
    }

    fn decoding_key(&self) -> &DecodingKey {
        match self {
            Self::Hs256(keys) => &keys.decoding,
            Self::Rs256(keys) | Self::Es256(keys) => &keys.decoding,
        }
    }

    /// Sign `claims` into a compact token.
    pub fn sign<C: TokenClaims>(&self, claims: &C) -> Result<String, JwtError> {
        let key = self
            .encoding_key()
            .ok_or_else(|| JwtError::SigningFailure("signer holds no private key".to_string()))?;
        encode(&Header::new(self.jwt_algorithm()), claims, key)
            .map_err(|e| JwtError::SigningFailure(e.to_string()))
    }

    /// Verify `token` and return its claims.
    pub fn parse<C: TokenClaims>(&self, token: &str) -> Result<C, JwtError> {
        let header = decode_header(token).map_err(|e| JwtError::MalformedToken(e.to_string()))?;
        if header.alg != self.jwt_algorithm() {
            return Err(JwtError::SignatureMismatch);
        }

        let mut validation = Validation::new(self.jwt_algorithm());
        validation.leeway = LEEWAY_SECONDS;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);
        C::configure_validation(&mut validation);

        decode::<C>(token, self.decoding_key(), &validation)
            .map(|data| data.claims)
            .map_err(JwtError::from)
    }

    fn self_check(&self) -> AppResult<()> {
        let sample = UserClaims::new("self-check", "self-check", "self-check", Utc::now(), Duration::seconds(60));
        let token = self.sign(&sample)?;
        self.parse::<UserClaims>(&token)
            .map(|_| ())
            .map_err(|_| AppError::configuration("Private and public keys do not match"))
    }
}
