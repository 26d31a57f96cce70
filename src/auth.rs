//! Registration, login, and password hashing.
//!
//! There is no server-side session: the authenticated user is returned to
//! the caller and subsequent operations take the acting user explicitly.

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewUser, Role, User};
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Le nom d'utilisateur est requis")]
    MissingUsername,

    #[error("Le mot de passe est requis")]
    MissingPassword,

    #[error("Nom d'utilisateur ou mot de passe incorrect")]
    InvalidCredentials,

    #[error("Ce compte est désactivé")]
    AccountDisabled,

    #[error("Nom d'utilisateur déjà utilisé")]
    UsernameTaken,

    #[error("Adresse email déjà utilisée")]
    EmailTaken,

    #[error("password hashing failed")]
    Hash(#[from] argon2::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Supporter
}

pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    if plain.is_empty() {
        return Err(AuthError::MissingPassword);
    }
    let salt = Uuid::new_v4().simple().to_string();
    let hash = argon2::hash_encoded(plain.as_bytes(), salt.as_bytes(), &argon2::Config::default())?;
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> bool {
    argon2::verify_encoded(hash, plain.as_bytes()).unwrap_or(false)
}

pub async fn register<S: Store>(store: &S, registration: Registration) -> Result<User, AuthError> {
    let username = registration.username.trim();
    if username.is_empty() {
        return Err(AuthError::MissingUsername);
    }

    if store.find_user_by_username(username).await?.is_some() {
        tracing::warn!(username, "registration with existing username");
        return Err(AuthError::UsernameTaken);
    }
    if store.find_user_by_email(&registration.email).await?.is_some() {
        tracing::warn!(email = %registration.email, "registration with existing email");
        return Err(AuthError::EmailTaken);
    }

    let password_hash = hash_password(&registration.password)?;
    let user = store
        .create_user(NewUser {
            username: username.to_string(),
            email: registration.email,
            password_hash,
            first_name: registration.first_name,
            last_name: registration.last_name,
            phone: registration.phone,
            role: registration.role,
        })
        .await?;

    tracing::info!(username = %user.username, "new user registered");
    Ok(user)
}

pub async fn login<S: Store>(store: &S, username: &str, password: &str) -> Result<User, AuthError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AuthError::MissingUsername);
    }
    if password.is_empty() {
        return Err(AuthError::MissingPassword);
    }

    let user = match store.find_user_by_username(username).await? {
        Some(user) => user,
        None => {
            tracing::warn!(username, "login with unknown username");
            return Err(AuthError::InvalidCredentials);
        }
    };

    if !user.is_active {
        tracing::warn!(username, "login on disabled account");
        return Err(AuthError::AccountDisabled);
    }

    if !verify_password(password, &user.password_hash) {
        tracing::warn!(username, "login with wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    tracing::info!(username, "user logged in");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(verify_password("s3cret!", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_password_is_rejected() {
        assert!(matches!(hash_password(""), Err(AuthError::MissingPassword)));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-an-encoded-hash"));
    }
}
