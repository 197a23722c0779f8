use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{ChatError, ChatResult};

/// Salted Argon2id hashing. Only the PHC string ever reaches the database.
#[derive(Clone)]
pub struct Credentials {
    argon2: Argon2<'static>,
    decoy: Arc<str>,
}

impl Credentials {
    /// Default Argon2id cost.
    pub fn new() -> ChatResult<Self> {
        Self::from_argon2(Argon2::default())
    }

    /// Custom cost parameters (memory in KiB, iterations, lanes).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> ChatResult<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| ChatError::Internal(anyhow::anyhow!("bad argon2 params: {e}")))?;
        Self::from_argon2(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    fn from_argon2(argon2: Argon2<'static>) -> ChatResult<Self> {
        // a hash of a password nobody knows
        let secret = SaltString::generate(&mut OsRng);
        let decoy = hash_with(&argon2, secret.as_str())?;
        Ok(Self { argon2, decoy: decoy.into() })
    }

    /// Stand-in hash to verify against when there is no user, so a missing
    /// account costs the same work as a wrong password.
    pub fn decoy(&self) -> &str {
        &self.decoy
    }

    pub fn hash(&self, password: &str) -> ChatResult<String> {
        hash_with(&self.argon2, password)
    }

    /// False for a wrong password and for an unreadable hash alike.
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(password_hash) else {
            return false;
        };
        self.argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> ChatResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ChatError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?
        .to_string())
}
