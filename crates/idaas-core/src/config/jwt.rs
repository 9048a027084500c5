//! Signing algorithm and key material configuration.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, ErrorKind};
use crate::result::AppResult;

/// Minimum secret length enforced in production.
pub const MIN_SECRET_LEN: usize = 32;

/// The signing algorithm used for both user and service tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum JwtAlgorithm {
    /// HMAC with SHA-256 over a shared secret.
    #[default]
    Hs256,
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    Rs256,
    /// ECDSA over P-256 with SHA-256.
    Es256,
}

impl JwtAlgorithm {
    /// Whether this algorithm signs with a key pair.
    pub fn is_asymmetric(self) -> bool {
        match self {
            Self::Hs256 => false,
            Self::Rs256 | Self::Es256 => true,
        }
    }
}

impl fmt::Display for JwtAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hs256 => write!(f, "HS256"),
            Self::Rs256 => write!(f, "RS256"),
            Self::Es256 => write!(f, "ES256"),
        }
    }
}

/// Key material for one signer. Which fields are required depends on the
/// configured [`JwtAlgorithm`].
#[derive(Clone, Default, Deserialize)]
pub struct KeyMaterialConfig {
    /// Shared secret for HS256.
    #[serde(default)]
    pub secret: Option<String>,
    /// PEM private key, inline or as a file path.
    #[serde(default)]
    pub private_key: Option<String>,
    /// PEM public key, inline or as a file path.
    #[serde(default)]
    pub public_key: Option<String>,
}

impl fmt::Debug for KeyMaterialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("KeyMaterialConfig")
            .field("secret", &redact(&self.secret))
            .field("private_key", &redact(&self.private_key))
            .field("public_key", &self.public_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl KeyMaterialConfig {
    /// The shared secret, if configured and non-empty.
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|s| !s.is_empty())
    }

    /// Resolve the private key to PEM content.
    pub fn private_key_pem(&self) -> AppResult<Option<String>> {
        self.private_key
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(load_pem_key)
            .transpose()
    }

    /// Resolve the public key to PEM content.
    pub fn public_key_pem(&self) -> AppResult<Option<String>> {
        self.public_key
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(load_pem_key)
            .transpose()
    }
}

/// Signing configuration for both principal kinds.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct JwtConfig {
    /// Algorithm shared by the user and service signers.
    #[serde(default)]
    pub algorithm: JwtAlgorithm,
    /// Key material for end-user tokens.
    #[serde(default)]
    pub user: KeyMaterialConfig,
    /// Key material for internal-service tokens.
    #[serde(default)]
    pub service: KeyMaterialConfig,
}

impl JwtConfig {
    /// Check that the configured algorithm has the key material it needs.
    ///
    /// Short secrets are fatal when `production` is true and only logged
    /// otherwise.
    pub fn validate(&self, production: bool) -> AppResult<()> {
        for (name, keys) in [("user", &self.user), ("service", &self.service)] {
            match self.algorithm {
                JwtAlgorithm::Hs256 => {
                    let secret = keys.secret().ok_or_else(|| {
                        AppError::configuration(format!(
                            "jwt.{name}.secret is required for HS256"
                        ))
                    })?;
                    if secret.len() < MIN_SECRET_LEN {
                        if production {
                            return Err(AppError::configuration(format!(
                                "jwt.{name}.secret must be at least {MIN_SECRET_LEN} characters in production"
                            )));
                        }
                        tracing::warn!(
                            signer = name,
                            min_length = MIN_SECRET_LEN,
                            "JWT secret is shorter than recommended"
                        );
                    }
                }
                JwtAlgorithm::Rs256 | JwtAlgorithm::Es256 => {
                    if keys.private_key.is_none() || keys.public_key.is_none() {
                        return Err(AppError::configuration(format!(
                            "jwt.{name}.private_key and jwt.{name}.public_key are required for {}",
                            self.algorithm
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Load a PEM key given either the PEM content itself or a path to a file
/// holding it.
pub fn load_pem_key(value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.starts_with("-----BEGIN") {
        return Ok(trimmed.to_string());
    }

    let path = Path::new(trimmed);
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::with_source(
            ErrorKind::Configuration,
            format!("Failed to read PEM key file {}", path.display()),
            e,
        )
    })?;

    if !content.trim_start().starts_with("-----BEGIN") {
        return Err(AppError::configuration(format!(
            "File {} does not contain a PEM key",
            path.display()
        )));
    }
    Ok(content)
}
