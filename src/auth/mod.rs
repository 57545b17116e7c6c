pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::UserResponse;

pub use extractors::CurrentUser;
pub use middleware::AuthGate;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

/// Payload for a login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Payload for a registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom = "validate_password_strength")]
    pub password: String,
}

/// Response after a successful login: the bearer token plus the
/// authenticated user.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Emails are compared and stored in trimmed, lowercased form so that
/// uniqueness and login lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Names are stored trimmed, so a value that trims to nothing is as bad
/// as an empty one.
fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("not_blank"))
    } else {
        Ok(())
    }
}

/// At least 8 characters with an uppercase letter, a lowercase letter, a
/// digit and a symbol.
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= 8;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric());

    if long_enough && has_upper && has_lower && has_digit && has_symbol {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            email: "ann@example.com".to_string(),
            password: "Passw0rd!".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = LoginRequest {
            email: "annexample.com".to_string(),
            password: "Passw0rd!".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let short_password = LoginRequest {
            email: "ann@example.com".to_string(),
            password: "Pw0!".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            password: "Passw0rd!".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_name = RegisterRequest {
            name: "".to_string(),
            email: "ann@example.com".to_string(),
            password: "Passw0rd!".to_string(),
        };
        assert!(empty_name.validate().is_err());

        // Long enough for the length rule, but trims to nothing.
        let blank_name = RegisterRequest {
            name: "   ".to_string(),
            email: "ann@example.com".to_string(),
            password: "Passw0rd!".to_string(),
        };
        assert!(blank_name.validate().is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("Passw0rd!").is_ok());
        // missing symbol
        assert!(validate_password_strength("Passw0rdd").is_err());
        // missing digit
        assert!(validate_password_strength("Password!").is_err());
        // missing uppercase
        assert!(validate_password_strength("passw0rd!").is_err());
        // missing lowercase
        assert!(validate_password_strength("PASSW0RD!").is_err());
        // too short
        assert!(validate_password_strength("Pw0!").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ann@Example.COM "), "ann@example.com");
        assert_eq!(normalize_email("ann@example.com"), "ann@example.com");
    }
}
