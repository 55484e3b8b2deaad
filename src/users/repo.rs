use std::{collections::HashSet, path::Path};

use anyhow::Context;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::auth::password::{check_hash, hash_password, verify_password_blocking};
use crate::users::repo_types::{User, UserSeed};

/// Read-only lookup from credentials to identity.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Exact username match followed by a password hash check.
    async fn find_by_credentials(&self, username: &str, password: &str)
        -> anyhow::Result<Option<User>>;

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;

    /// Every user, in directory order.
    async fn list_all(&self) -> anyhow::Result<Vec<User>>;
}

/// Directory held in memory, filled once at startup.
#[derive(Debug, Clone)]
pub struct InMemoryDirectory {
    users: Vec<User>,
}

impl InMemoryDirectory {
    pub fn new(users: Vec<User>) -> anyhow::Result<Self> {
        {
            let mut ids = HashSet::new();
            let mut names = HashSet::new();
            for u in &users {
                anyhow::ensure!(ids.insert(u.id), "duplicate user id {}", u.id);
                anyhow::ensure!(
                    names.insert(u.username.as_str()),
                    "duplicate username {:?}",
                    u.username
                );
                check_hash(&u.password_hash)
                    .with_context(|| format!("user {:?}", u.username))?;
            }
        }
        Ok(Self { users })
    }

    pub fn from_seeds(seeds: Vec<UserSeed>) -> anyhow::Result<Self> {
        let mut users = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let password_hash = match (seed.password_hash, seed.password) {
                (Some(hash), _) => hash,
                (None, Some(plain)) => {
                    warn!(username = %seed.username, "plaintext password in credential file; hashing at load");
                    hash_password(&plain)?
                }
                (None, None) => {
                    anyhow::bail!("user {:?} has neither password nor password_hash", seed.username)
                }
            };
            users.push(User {
                id: seed.id,
                username: seed.username,
                password_hash,
                role: seed.role,
            });
        }
        Self::new(users)
    }

    /// Loads a JSON array of [`UserSeed`] from `path`.
    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read credential file {}", path.display()))?;
        let seeds: Vec<UserSeed> = serde_json::from_str(&raw)
            .with_context(|| format!("parse credential file {}", path.display()))?;
        let dir = tokio::task::spawn_blocking(move || Self::from_seeds(seeds)).await??;
        if dir.is_empty() {
            warn!(file = %path.display(), "credential file holds no users; every login will fail");
        }
        info!(users = dir.len(), file = %path.display(), "user directory loaded");
        Ok(dir)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> anyhow::Result<Option<User>> {
        let Some(user) = self.users.iter().find(|u| u.username == username) else {
            // same argon2 cost on a miss as on a hit
            if let Some(decoy) = self.users.first() {
                verify_password_blocking(password.to_owned(), decoy.password_hash.clone()).await?;
            }
            return Ok(None);
        };
        let ok = verify_password_blocking(password.to_owned(), user.password_hash.clone()).await?;
        Ok(ok.then(|| user.clone()))
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.users.clone())
    }
}
