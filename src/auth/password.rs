use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::{error, warn};

use crate::config::PasswordConfig;

#[derive(Debug, Error)]
pub enum HashingError {
    #[error("argon2 hash_password error: {0}")]
    Hash(String),
    #[error("hashing worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Salted Argon2id hashing with tunable cost.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash of a throwaway secret under the same params, verified against
    /// when the account does not exist.
    placeholder: Arc<str>,
}

impl PasswordHasher {
    pub fn new(cfg: &PasswordConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {e}"))?;
        let mut hasher = Self {
            params,
            placeholder: Arc::from(""),
        };
        let secret: [u8; 16] = rand::random();
        let placeholder = hasher
            .hash(&format!("{secret:02x?}"))
            .map_err(|e| anyhow::anyhow!("placeholder hash: {e}"))?;
        hasher.placeholder = Arc::from(placeholder);
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, plain: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                HashingError::Hash(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// Never fails: a mismatch or an unreadable stored hash both yield `false`.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };
        // Cost params are read from the PHC string, so older hashes keep verifying.
        self.argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    /// Runs `hash` on the blocking pool.
    pub async fn hash_blocking(&self, plain: String) -> Result<String, HashingError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain)).await?
    }

    /// Verifies `plain` against the placeholder hash and discards the outcome.
    pub async fn verify_unknown_blocking(&self, plain: String) {
        let hasher = self.clone();
        let placeholder = self.placeholder.to_string();
        let outcome = tokio::task::spawn_blocking(move || hasher.verify(&plain, &placeholder)).await;
        if let Err(e) = outcome {
            warn!(error = %e, "placeholder verify worker failed");
        }
    }

    /// Runs `verify` on the blocking pool.
    pub async fn verify_blocking(&self, plain: String, hash: String) -> Result<bool, HashingError> {
        let hasher = self.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash)).await?)
    }
}

#[cfg(test)]
pub(crate) fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::new(&PasswordConfig {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
    .expect("test argon2 params")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = cheap_hasher();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash(password).expect("hashing should succeed");
        assert!(hasher.verify(password, &hash));
        assert!(!hash.contains(password));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = cheap_hasher();
        let hash = hasher.hash("correct-horse-battery-staple").unwrap();
        assert!(!hasher.verify("wrong-password", &hash));
    }

    #[test]
    fn verify_returns_false_on_malformed_hash() {
        assert!(!cheap_hasher().verify("anything", "not-a-valid-hash"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = cheap_hasher();
        let a = hasher.hash("pw123").unwrap();
        let b = hasher.hash("pw123").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
    }

    #[test]
    fn rejects_impossible_params() {
        let cfg = PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(PasswordHasher::new(&cfg).is_err());
    }

    #[test]
    fn placeholder_uses_configured_cost() {
        let hasher = cheap_hasher();
        let parsed = PasswordHash::new(&hasher.placeholder).expect("valid PHC string");
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        let params = Params::try_from(&parsed).unwrap();
        assert_eq!(params.m_cost(), 64);
        assert_eq!(params.t_cost(), 1);
        assert_eq!(params.p_cost(), 1);
        assert!(!hasher.verify("", &hasher.placeholder));
    }

    #[tokio::test]
    async fn unknown_user_verify_completes() {
        cheap_hasher().verify_unknown_blocking("guess".into()).await;
    }

    #[tokio::test]
    async fn blocking_variants_agree() {
        let hasher = cheap_hasher();
        let hash = hasher.hash_blocking("pw123".into()).await.unwrap();
        assert!(hasher.verify_blocking("pw123".into(), hash.clone()).await.unwrap());
        assert!(!hasher.verify_blocking("nope".into(), hash).await.unwrap());
    }
}
