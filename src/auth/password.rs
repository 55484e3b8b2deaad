use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Fails if `hash` is not a PHC string argon2 can verify against.
pub fn check_hash(hash: &str) -> anyhow::Result<()> {
    PasswordHash::new(hash)
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!("malformed password hash: {e}"))
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Same as [`verify_password`], on the blocking pool.
pub async fn verify_password_blocking(plain: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("senha123").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("senha123", &hash).expect("verify should succeed"));
        assert!(!verify_password("senha456", &hash).expect("verify should not error"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("senha123").unwrap();
        let b = hash_password("senha123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(check_hash("senha123").is_err());
        assert!(verify_password("anything", "not-a-valid-hash").is_err());
    }

    #[tokio::test]
    async fn blocking_variant_agrees() {
        let hash = hash_password("correct-horse").unwrap();
        assert!(verify_password_blocking("correct-horse".into(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password_blocking("wrong".into(), hash).await.unwrap());
    }
}
