use serde::{Deserialize, Serialize};

use crate::auth::services::{is_valid_email, normalize_email};
use crate::error::AppError;
use crate::store::Role;

/// Request body for registration. Every field is required; presence is
/// checked by hand so the error can name what is missing.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub user_type: Option<String>,
    pub contact_number: Option<String>,
    pub location: Option<String>,
    pub name: Option<String>,
}

/// A validated registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub user_type: Role,
    pub contact_number: String,
    pub location: String,
    pub name: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, AppError> {
        let missing = [
            ("email", self.email.is_none()),
            ("password", self.password.is_none()),
            ("user_type", self.user_type.is_none()),
            ("contact_number", self.contact_number.is_none()),
            ("location", self.location.is_none()),
            ("name", self.name.is_none()),
        ];
        let (
            Some(email),
            Some(password),
            Some(user_type),
            Some(contact_number),
            Some(location),
            Some(name),
        ) = (
            self.email,
            self.password,
            self.user_type,
            self.contact_number,
            self.location,
            self.name,
        )
        else {
            return Err(AppError::missing_fields(&missing));
        };

        let email = normalize_email(&email);
        if !is_valid_email(&email) {
            return Err(AppError::Validation("Invalid email".into()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("Password must not be empty".into()));
        }
        let user_type = user_type.parse::<Role>().map_err(AppError::Validation)?;

        Ok(Registration {
            email,
            password,
            user_type,
            contact_number,
            location,
            name,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns the normalized email and the password.
    pub fn validate(self) -> Result<(String, String), AppError> {
        let missing = [
            ("email", self.email.is_none()),
            ("password", self.password.is_none()),
        ];
        match (self.email, self.password) {
            (Some(email), Some(password)) => Ok((normalize_email(&email), password)),
            _ => Err(AppError::missing_fields(&missing)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user_type: Role,
}
