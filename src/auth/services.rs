use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, warn};

use crate::auth::dto::Registration;
use crate::auth::password::{hash_password, verify_against_dummy, verify_password};
use crate::error::AppError;
use crate::store::{NewUser, Store, StoreError, User};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const EMAIL_TAKEN: &str = "User with this email already exists";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates the account. The unique index backs up the pre-check.
pub async fn register_user(store: &dyn Store, reg: Registration) -> Result<User, AppError> {
    if store.find_user_by_email(&reg.email).await?.is_some() {
        warn!(email = %reg.email, "email already registered");
        return Err(AppError::Conflict(EMAIL_TAKEN.into()));
    }

    let password_hash = hash_password(&reg.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        AppError::Internal(format!("Registration failed: {e}"))
    })?;

    let new_user = NewUser {
        email: reg.email,
        password_hash,
        user_type: reg.user_type,
        contact_number: reg.contact_number,
        location: reg.location,
        name: reg.name,
    };
    match store.insert_user(new_user).await {
        Ok(user) => Ok(user),
        Err(StoreError::Duplicate(_)) => Err(AppError::Conflict(EMAIL_TAKEN.into())),
        Err(e) => {
            error!(error = %e, "create user failed");
            Err(AppError::Internal(format!("Registration failed: {e}")))
        }
    }
}

/// Unknown email and wrong password fail identically.
pub async fn authenticate(store: &dyn Store, email: &str, password: &str) -> Result<User, AppError> {
    let Some(user) = store.find_user_by_email(email).await? else {
        verify_against_dummy(password);
        warn!(%email, "login unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    let ok = verify_password(password, &user.password_hash).map_err(|e| {
        error!(error = %e, user_id = %user.id, "verify_password failed");
        AppError::Internal(e.to_string())
    })?;
    if !ok {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }
    Ok(user)
}
