use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::bson_datetime_as_chrono;

/// User model stored in the MongoDB "users" collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(rename = "createdAt", with = "bson_datetime_as_chrono")]
    pub created_at: DateTime<Utc>,
}

/// User profile returned to the client (without sensitive data)
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: user.email,
            name: user.name,
        }
    }
}

/// Request to create an account
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Request to login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Response after successful signup or login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_request_validates_email_and_password() {
        let bad_email = SignupRequest {
            name: Some("Ada".into()),
            email: "not-an-email".into(),
            password: "longenough1".into(),
        };
        assert!(bad_email.validate().is_err());

        let short_password = SignupRequest {
            name: Some("Ada".into()),
            email: "ada@example.com".into(),
            password: "short".into(),
        };
        assert!(short_password.validate().is_err());

        let ok = SignupRequest {
            name: None,
            email: "ada@example.com".into(),
            password: "longenough1".into(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn auth_response_uses_camel_case_token_names() {
        let response = AuthResponse {
            access_token: "a".into(),
            refresh_token: "r".into(),
            user: UserProfile {
                id: "1".into(),
                email: "ada@example.com".into(),
                name: "Ada".into(),
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
        assert_eq!(json["user"]["email"], "ada@example.com");
    }
}
