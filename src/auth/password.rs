use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

lazy_static! {
    // default Argon2id parameters; hashes embed them, so changing these only affects new hashes
    static ref HASHER: Argon2<'static> = Argon2::default();
}

fn argon_err(context: &'static str, e: password_hash::Error) -> anyhow::Error {
    error!(error = %e, context, "argon2 failure");
    anyhow::anyhow!("{context}: {e}")
}

/// Salted Argon2id hash in PHC string form.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    HASHER
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| argon_err("hash password", e))
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| argon_err("parse stored hash", e))?;
    match HASHER.verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(argon_err("verify password", e)),
    }
}
