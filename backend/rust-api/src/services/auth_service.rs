use anyhow::Context;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use mongodb::bson::doc;
use mongodb::{Collection, Database};

use crate::errors::AppError;
use crate::middlewares::auth::JwtService;
use crate::models::user::{AuthResponse, LoginRequest, SignupRequest, User, UserProfile};

const USERS_COLLECTION: &str = "users";

pub struct AuthService {
    mongo: Database,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(mongo: Database, jwt_service: JwtService) -> Self {
        Self { mongo, jwt_service }
    }

    fn users(&self) -> Collection<User> {
        self.mongo.collection(USERS_COLLECTION)
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        Ok(hash(password, DEFAULT_COST).context("Failed to hash password")?)
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        Ok(verify(password, hash).context("Failed to verify password")?)
    }

    /// Create an account and issue the token pair.
    pub async fn signup(&self, req: SignupRequest) -> Result<AuthResponse, AppError> {
        let existing = self.users().find_one(doc! { "email": &req.email }).await?;
        if existing.is_some() {
            return Err(AppError::validation("User already exists"));
        }

        let password_hash = self.hash_password(&req.password)?;
        let user = User {
            id: None, // MongoDB will generate
            name: req.name.unwrap_or_default(),
            email: req.email,
            password_hash,
            created_at: Utc::now(),
        };

        let insert_result = self.users().insert_one(&user).await?;
        let user_id = insert_result
            .inserted_id
            .as_object_id()
            .context("Failed to get inserted user ID")?;

        tracing::info!(user_id = %user_id.to_hex(), email = %user.email, "User registered");

        let mut user = user;
        user.id = Some(user_id);
        self.issue_tokens(user)
    }

    /// Login with email and password. Unknown email and wrong password are
    /// reported distinctly (404 / 401).
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AppError> {
        let user = self
            .users()
            .find_one(doc! { "email": &req.email })
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !self.verify_password(&req.password, &user.password_hash)? {
            tracing::warn!(email = %user.email, "Failed login attempt: invalid password");
            return Err(AppError::Unauthorized("Invalid credentials"));
        }

        tracing::info!(email = %user.email, "Successful login");

        self.issue_tokens(user)
    }

    fn issue_tokens(&self, user: User) -> Result<AuthResponse, AppError> {
        let user_id = user
            .id
            .map(|id| id.to_hex())
            .context("User ID not found")?;

        let access_token = self
            .jwt_service
            .issue_access_token(&user_id)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
        let refresh_token = self
            .jwt_service
            .issue_refresh_token(&user_id)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            user: UserProfile::from(user),
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bcrypt_round_trip() {
        let hashed = hash("Sup3r-secret", DEFAULT_COST).unwrap();
        assert!(verify("Sup3r-secret", &hashed).unwrap());
        assert!(!verify("wrong-password", &hashed).unwrap());
    }
}
