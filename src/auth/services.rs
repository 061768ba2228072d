use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        password::{hash_password, verify_password},
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    error::AppError,
};

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates an account. The password is hashed before it reaches the store.
pub async fn register(users: &dyn UserStore, req: RegisterRequest) -> Result<User, AppError> {
    let email = normalize_email(&req.email);
    let name = req.name.trim().to_string();

    if name.is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::DuplicateIdentity);
    }

    let password_hash = hash_password(&req.password)?;
    let location = req
        .location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());

    // a concurrent registration can still win the race; the store reports it as a conflict
    let user = users
        .insert(NewUser {
            name,
            email,
            password_hash,
            role: req.user_type,
            location,
        })
        .await?;

    info!(user_id = %user.id, role = user.role.as_str(), "user registered");
    Ok(user)
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(users: &dyn UserStore, req: LoginRequest) -> Result<User, AppError> {
    let email = normalize_email(&req.email);

    let Some(user) = users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{repo::MemoryUserStore, repo_types::Role};

    fn register_req(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Asha".into(),
            email: email.into(),
            password: "tomatoes-2024".into(),
            user_type: Role::Farmer,
            location: Some(" Pune ".into()),
        }
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("asha@example.com"));
        assert!(!is_valid_email("asha@example"));
        assert!(!is_valid_email("as ha@example.com"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test]
    async fn second_registration_with_same_email_fails() {
        let users = MemoryUserStore::new();
        let first = register(&users, register_req("asha@example.com")).await.unwrap();
        assert_eq!(first.location.as_deref(), Some("Pune"));
        assert_ne!(first.password_hash, "tomatoes-2024");

        let err = register(&users, register_req("  ASHA@example.com ")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn registration_validates_input() {
        let users = MemoryUserStore::new();

        let mut req = register_req("asha@example.com");
        req.name = "  ".into();
        assert!(matches!(register(&users, req).await, Err(AppError::Validation(_))));

        let mut req = register_req("not-an-email");
        req.name = "Asha".into();
        assert!(matches!(register(&users, req).await, Err(AppError::Validation(_))));

        let mut req = register_req("asha@example.com");
        req.password = "short".into();
        assert!(matches!(register(&users, req).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn login_checks_password() {
        let users = MemoryUserStore::new();
        let created = register(&users, register_req("asha@example.com")).await.unwrap();

        let ok = login(
            &users,
            LoginRequest { email: "Asha@Example.com".into(), password: "tomatoes-2024".into() },
        )
        .await
        .unwrap();
        assert_eq!(ok.id, created.id);

        let bad = login(
            &users,
            LoginRequest { email: "asha@example.com".into(), password: "wrong-pass".into() },
        )
        .await;
        assert!(matches!(bad, Err(AppError::InvalidCredentials)));

        let unknown = login(
            &users,
            LoginRequest { email: "ghost@example.com".into(), password: "whatever1".into() },
        )
        .await;
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
    }
}
