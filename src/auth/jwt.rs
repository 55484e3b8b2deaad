use anyhow::Context;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{auth::claims::Claims, config::JwtConfig, error::AuthError, users::repo_types::User};

/// Signing and verification keys plus the claims every token must carry.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    audience: String,
    ttl: TimeDuration,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: TimeDuration::seconds(cfg.ttl_minutes.saturating_mul(60)),
        }
    }

    pub fn issue(&self, user: &User) -> anyhow::Result<String> {
        self.issue_at(user, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, user: &User, issued_at: OffsetDateTime) -> anyhow::Result<String> {
        let exp = issued_at
            .checked_add(self.ttl)
            .context("token expiry is out of range")?;
        let claims = Claims {
            user_id: user.id,
            role: user.role,
            iat: issued_at.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(user_id = user.id, role = %user.role, "jwt signed");
        Ok(token)
    }

    /// `None` or a blank token is [`AuthError::MissingToken`]; anything that
    /// fails signature, expiry, issuer or audience checks is
    /// [`AuthError::InvalidToken`].
    pub fn verify(&self, token: Option<&str>) -> Result<Claims, AuthError> {
        let token = match token.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::MissingToken),
        };

        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AuthError::InvalidToken
        })?;
        debug!(user_id = data.claims.user_id, role = %data.claims.role, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::users::{repo::fixture, repo_types::Role};

    pub(crate) fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".into(),
            algorithm: Algorithm::HS256,
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 60,
        }
    }

    fn keys() -> JwtKeys {
        JwtKeys::new(&test_config())
    }

    #[test]
    fn issued_token_verifies_with_embedded_identity() {
        let keys = keys();
        for id in [1, 2] {
            let user = fixture::user(id);
            let token = keys.issue(&user).expect("sign");
            let claims = keys.verify(Some(&token)).expect("verify");
            assert_eq!(claims.user_id, user.id);
            assert_eq!(claims.role, user.role);
            assert_eq!(claims.iss, "test-issuer");
            assert_eq!(claims.aud, "test-aud");
            assert_eq!(claims.exp - claims.iat, 60 * 60);
        }
    }

    #[test]
    fn payload_uses_user_id_key() {
        let keys = keys();
        let token = keys.issue(&fixture::user(1)).unwrap();
        let claims = keys.verify(Some(&token)).unwrap();
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn missing_or_blank_token() {
        let keys = keys();
        assert_eq!(keys.verify(None).unwrap_err(), AuthError::MissingToken);
        assert_eq!(keys.verify(Some("")).unwrap_err(), AuthError::MissingToken);
        assert_eq!(keys.verify(Some("   ")).unwrap_err(), AuthError::MissingToken);
    }

    #[test]
    fn malformed_token_is_invalid() {
        let keys = keys();
        assert_eq!(keys.verify(Some("not.a.jwt")).unwrap_err(), AuthError::InvalidToken);
        assert_eq!(keys.verify(Some("garbage")).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn any_altered_signature_byte_is_rejected() {
        let keys = keys();
        let token = keys.issue(&fixture::user(1)).unwrap();
        let sig_start = token.rfind('.').unwrap() + 1;

        for i in sig_start..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert_eq!(
                keys.verify(Some(&tampered)).unwrap_err(),
                AuthError::InvalidToken,
                "byte {i} altered"
            );
        }
    }

    #[test]
    fn role_cannot_be_forged_without_the_secret() {
        let mut other = test_config();
        other.secret = "another-secret-that-is-long-enough-too".into();
        let forger = JwtKeys::new(&other);
        let mut user = fixture::user(2);
        user.role = Role::Admin;
        let forged = forger.issue(&user).unwrap();
        assert_eq!(keys().verify(Some(&forged)).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = keys();
        let issued_at = OffsetDateTime::now_utc() - TimeDuration::minutes(61);
        let token = keys.issue_at(&fixture::user(1), issued_at).unwrap();
        assert_eq!(keys.verify(Some(&token)).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn token_near_end_of_lifetime_is_still_valid() {
        let keys = keys();
        let issued_at = OffsetDateTime::now_utc() - TimeDuration::minutes(59);
        let token = keys.issue_at(&fixture::user(1), issued_at).unwrap();
        assert!(keys.verify(Some(&token)).is_ok());
    }

    #[test]
    fn oversized_ttl_fails_to_issue_instead_of_panicking() {
        let mut cfg = test_config();
        cfg.ttl_minutes = 1_000_000_000_000;
        let err = JwtKeys::new(&cfg).issue(&fixture::user(1)).unwrap_err();
        assert!(err.to_string().contains("out of range"));

        cfg.ttl_minutes = i64::MAX;
        assert!(JwtKeys::new(&cfg).issue(&fixture::user(1)).is_err());
    }

    #[test]
    fn wrong_audience_or_algorithm_is_rejected() {
        let mut cfg = test_config();
        cfg.audience = "someone-else".into();
        let token = JwtKeys::new(&cfg).issue(&fixture::user(1)).unwrap();
        assert_eq!(keys().verify(Some(&token)).unwrap_err(), AuthError::InvalidToken);

        let mut cfg = test_config();
        cfg.algorithm = Algorithm::HS512;
        let token = JwtKeys::new(&cfg).issue(&fixture::user(1)).unwrap();
        assert_eq!(keys().verify(Some(&token)).unwrap_err(), AuthError::InvalidToken);
    }
}
