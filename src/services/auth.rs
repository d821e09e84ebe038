//! Authentication service: credential checks and session tokens

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{LoginForm, RegisterForm, SessionClaims, User},
    repository::Repository,
};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Check credentials and return a session token
    pub async fn login(&self, form: &LoginForm) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(form.username.trim())
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !self.verify_password(&user, &form.password)? {
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        tracing::info!(user_id = %user.id, "User logged in");
        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Create an account and return a session token for it
    pub async fn register(&self, form: &RegisterForm) -> AppResult<(String, User)> {
        let form = RegisterForm {
            username: form.username.trim().to_string(),
            password: form.password.clone(),
        };
        form.validate()?;

        let hash = self.hash_password(&form.password)?;
        let user = self.repository.users.create(&form.username, &hash).await?;

        tracing::info!(user_id = %user.id, "User registered");
        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Verify a session token
    pub fn verify(&self, token: &str) -> AppResult<SessionClaims> {
        Ok(SessionClaims::from_token(token, &self.config.session_secret)?)
    }

    /// Resolve a session token to a user that still exists
    pub async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self.verify(token)?;
        self.repository
            .users
            .get_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Authentication("Session user no longer exists".to_string()))
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    pub fn secure_cookie(&self) -> bool {
        self.config.secure_cookie
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        SessionClaims::for_user(user, self.config.session_hours)
            .create_token(&self.config.session_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }
}
