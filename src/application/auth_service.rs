use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{LoginRequest, RegisterRequest, User, UserProfile};
use crate::infrastructure::security::{hash_password, issue_token, verify_password};
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 6;

/// Token plus the identity payload it embeds, so callers can show
/// display data without a second round trip.
#[derive(Debug, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

pub struct AuthService<R: UserRepository> {
    user_repository: Arc<R>,
    jwt_secret: String,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(user_repository: Arc<R>, jwt_secret: String) -> Self {
        Self {
            user_repository,
            jwt_secret,
        }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthSession> {
        validate_registration(&req)?;

        if self
            .user_repository
            .find_user_by_email(&req.email)
            .await?
            .is_some()
        {
            warn!(email = %req.email, "Registration rejected, email already taken");
            return Err(DomainError::Conflict("User already exists".to_string()).into());
        }

        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal("Failed to hash password".to_string())
        })?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            email: req.email,
            password_hash,
        };

        debug!(user_id = %user.id, "Saving new user");
        self.user_repository.save_user(user.clone()).await?;

        info!(user_id = %user.id, email = %user.email, "User registered");
        self.open_session(&user)
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<AuthSession> {
        validate_login(&req)?;

        let user = self
            .user_repository
            .find_user_by_email(&req.email)
            .await?
            .ok_or_else(|| {
                warn!(email = %req.email, "Login for unknown email");
                DomainError::Unauthorized("Invalid credentials".to_string())
            })?;

        let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal("Failed to verify password".to_string())
        })?;

        if !is_valid {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(DomainError::Unauthorized("Invalid credentials".to_string()).into());
        }

        info!(user_id = %user.id, email = %user.email, "Login successful");
        self.open_session(&user)
    }

    fn open_session(&self, user: &User) -> Result<AuthSession> {
        let token = issue_token(&user.id, &user.name, &self.jwt_secret).map_err(|e| {
            error!(error = %e, "Failed to sign token");
            DomainError::Internal("Failed to sign token".to_string())
        })?;

        Ok(AuthSession {
            token,
            user: UserProfile::from(user),
        })
    }
}

fn validate_registration(req: &RegisterRequest) -> Result<(), DomainError> {
    if req.name.trim().is_empty() {
        return Err(DomainError::Validation("Please enter your name".to_string()));
    }
    if !is_valid_email(&req.email) {
        return Err(DomainError::Validation(
            "Please enter a valid email".to_string(),
        ));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(
            "Please enter a password with 6 or more characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_login(req: &LoginRequest) -> Result<(), DomainError> {
    if !is_valid_email(&req.email) {
        return Err(DomainError::Validation(
            "Please enter a valid email".to_string(),
        ));
    }
    if req.password.is_empty() {
        return Err(DomainError::Validation("Password is required".to_string()));
    }
    Ok(())
}

/// Shallow shape check: one `@` with a non-empty local part and a domain
/// containing a dot. Deliverability is out of scope.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if domain.contains('@') {
        return false;
    }
    domain
        .split_once('.')
        .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty())
}
