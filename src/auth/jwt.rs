use std::sync::Arc;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, state::AppState};

/// Tokens live exactly this long after issuance.
pub const TOKEN_TTL: Duration = Duration::hours(24);

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Sign(jsonwebtoken::errors::Error),
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("token carries no usable user_id claim")]
    BadSubject,
}

/// Wire form of the token payload.
///
/// `user_id` stays an untyped JSON value on the way in so a token minted by
/// another issuer (float ids, strings, missing claim) is rejected by
/// [`coerce_user_id`] instead of failing somewhere downstream.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub user_id: Value,
    #[serde(default)]
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Who the bearer of a verified token is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
}

/// Turns the raw `user_id` claim into a row id.
///
/// Integers pass through. Floats are accepted only when they are whole and
/// inside the i64 range, since some JWT libraries encode every number as f64.
/// Anything else (strings, null, bools, fractions) is rejected.
pub fn coerce_user_id(raw: &Value) -> Option<i64> {
    let Value::Number(n) = raw else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    inner: Arc<KeysInner>,
}

struct KeysInner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            inner: Arc::new(KeysInner {
                encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
                decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
                issuer: cfg.issuer.clone(),
                audience: cfg.audience.clone(),
            }),
        }
    }

    pub fn issue(&self, user_id: i64, email: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, email, OffsetDateTime::now_utc())
    }

    pub(crate) fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        issued_at: OffsetDateTime,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            user_id: Value::from(user_id),
            email: email.to_string(),
            iat: issued_at.unix_timestamp(),
            exp: (issued_at + TOKEN_TTL).unix_timestamp(),
            iss: self.inner.issuer.clone(),
            aud: self.inner.audience.clone(),
        };
        let token =
            encode(&Header::default(), &claims, &self.inner.encoding).map_err(TokenError::Sign)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.inner.audience));
        validation.set_issuer(std::slice::from_ref(&self.inner.issuer));
        let data = decode::<Claims>(token, &self.inner.decoding, &validation)
            .map_err(TokenError::Invalid)?;

        let user_id = coerce_user_id(&data.claims.user_id).ok_or(TokenError::BadSubject)?;
        debug!(user_id, "jwt verified");
        Ok(Identity {
            user_id,
            email: data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
        })
    }

    fn raw_token(secret: &str, claims: Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn base_claims() -> Value {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        json!({
            "email": "a@x.com",
            "iat": now,
            "exp": now + 3600,
            "iss": "test-issuer",
            "aud": "test-aud",
        })
    }

    #[test]
    fn issue_and_verify_recovers_identity() {
        let keys = make_keys("dev-secret");
        let token = keys.issue(42, "alice@x.com").expect("sign");
        let who = keys.verify(&token).expect("verify");
        assert_eq!(
            who,
            Identity {
                user_id: 42,
                email: "alice@x.com".into()
            }
        );
    }

    #[test]
    fn expiry_is_issued_at_plus_24h() {
        let keys = make_keys("dev-secret");

        let fresh = OffsetDateTime::now_utc() - Duration::hours(23);
        assert!(keys.verify(&keys.issue_at(1, "a@x.com", fresh).unwrap()).is_ok());

        let stale = OffsetDateTime::now_utc() - Duration::hours(24) - Duration::seconds(5);
        let err = keys
            .verify(&keys.issue_at(1, "a@x.com", stale).unwrap())
            .unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn verify_rejects_other_secret() {
        let token = make_keys("one").issue(7, "a@x.com").unwrap();
        assert!(make_keys("two").verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_tampered_and_garbage_tokens() {
        let keys = make_keys("dev-secret");
        let forged = raw_token("attacker", json!({ "user_id": 1 }));
        let token = keys.issue(7, "a@x.com").unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged.split('.').nth(1).unwrap();
        assert!(keys.verify(&parts.join(".")).is_err());
        assert!(keys.verify("not.a.jwt").is_err());
        assert!(keys.verify("").is_err());
    }

    #[test]
    fn verify_rejects_missing_or_non_numeric_user_id() {
        let keys = make_keys("dev-secret");

        let missing = raw_token("dev-secret", base_claims());
        assert!(matches!(keys.verify(&missing), Err(TokenError::BadSubject)));

        let mut as_string = base_claims();
        as_string["user_id"] = json!("42");
        let token = raw_token("dev-secret", as_string);
        assert!(matches!(keys.verify(&token), Err(TokenError::BadSubject)));
    }

    #[test]
    fn verify_accepts_whole_float_user_id() {
        let keys = make_keys("dev-secret");
        let mut claims = base_claims();
        claims["user_id"] = json!(42.0);
        let who = keys.verify(&raw_token("dev-secret", claims)).unwrap();
        assert_eq!(who.user_id, 42);
    }

    #[test]
    fn coercion_rules() {
        assert_eq!(coerce_user_id(&json!(5)), Some(5));
        assert_eq!(coerce_user_id(&json!(-3)), Some(-3));
        assert_eq!(coerce_user_id(&json!(9.0)), Some(9));
        assert_eq!(coerce_user_id(&json!(9.5)), None);
        assert_eq!(coerce_user_id(&json!(1e300)), None);
        assert_eq!(coerce_user_id(&json!("9")), None);
        assert_eq!(coerce_user_id(&json!(true)), None);
        assert_eq!(coerce_user_id(&Value::Null), None);
    }
}
