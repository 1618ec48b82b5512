/// Registration input validators
///
/// Pure checks run in a fixed order, short-circuiting on the first failure:
/// presence -> full name -> email -> mobile number -> password strength ->
/// password match. Uniqueness needs the repository and is checked by the
/// session manager.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_LOCAL_PART_LENGTH: usize = 64;
const MAX_NAME_LENGTH: usize = 256;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 72; // bcrypt ignores bytes past 72

/// Symbols accepted (and one required) by the password policy
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&#";

lazy_static! {
    // local@domain.tld, no whitespace, tld of two or more characters
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").unwrap();
    static ref MOBILE_REGEX: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
}

/// Registration payload as received; every field may be absent
#[derive(Debug, Default, Clone)]
pub struct RegistrationInput<'a> {
    pub full_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub mobile_number: Option<&'a str>,
    pub password: Option<&'a str>,
    pub confirm_password: Option<&'a str>,
}

/// Registration data that passed every stateless check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub full_name: String,
    pub email: String,
    pub mobile_number: String,
    pub password: String,
}

pub fn validate_registration(input: &RegistrationInput<'_>) -> Result<ValidRegistration, ValidationError> {
    let (full_name, email, mobile_number, password, confirm_password) = match (
        present(input.full_name),
        present(input.email),
        present(input.mobile_number),
        present(input.password),
        present(input.confirm_password),
    ) {
        (Some(n), Some(e), Some(m), Some(p), Some(c)) => (n, e, m, p, c),
        _ => return Err(ValidationError::MissingFields),
    };

    let full_name = is_valid_name(full_name)?;
    let email = is_valid_email(email)?;
    let mobile_number = is_valid_mobile_number(mobile_number)?;
    is_strong_password(password)?;
    passwords_match(password, confirm_password)?;

    Ok(ValidRegistration {
        full_name,
        email,
        mobile_number,
        password: password.to_string(),
    })
}

/// Treats absent and blank values the same way
pub fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Returns the trimmed, lowercased address
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidEmail);
    }

    if let Some(at_pos) = trimmed.find('@') {
        if at_pos > MAX_LOCAL_PART_LENGTH {
            return Err(ValidationError::InvalidEmail);
        }
    }

    Ok(trimmed.to_lowercase())
}

pub fn is_valid_mobile_number(mobile_number: &str) -> Result<String, ValidationError> {
    let trimmed = mobile_number.trim();
    if !MOBILE_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidMobileNumber);
    }
    Ok(trimmed.to_string())
}

pub fn is_valid_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("fullName".to_string()));
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("fullName".to_string(), MAX_NAME_LENGTH));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent("fullName".to_string()));
    }

    Ok(trimmed.to_string())
}

/// At least 8 characters drawn only from ASCII letters, digits and
/// `PASSWORD_SYMBOLS`, with one of each class.
pub fn is_strong_password(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_LENGTH));
    }

    let is_symbol = |c: char| PASSWORD_SYMBOLS.contains(c);

    let long_enough = password.chars().count() >= MIN_PASSWORD_LENGTH;
    let allowed_only = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || is_symbol(c));
    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(is_symbol);

    if long_enough && allowed_only && has_lowercase && has_uppercase && has_digit && has_symbol {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword)
    }
}

pub fn passwords_match(password: &str, confirm_password: &str) -> Result<(), ValidationError> {
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> RegistrationInput<'static> {
        RegistrationInput {
            full_name: Some("Ann"),
            email: Some("ann@x.com"),
            mobile_number: Some("1234567890"),
            password: Some("Abcd1234!"),
            confirm_password: Some("Abcd1234!"),
        }
    }

    #[test]
    fn test_valid_registration() {
        let valid = validate_registration(&ann()).unwrap();
        assert_eq!(valid.full_name, "Ann");
        assert_eq!(valid.email, "ann@x.com");
        assert_eq!(valid.mobile_number, "1234567890");
    }

    #[test]
    fn test_missing_fields() {
        let mut input = ann();
        input.confirm_password = None;
        assert_eq!(validate_registration(&input), Err(ValidationError::MissingFields));

        let mut input = ann();
        input.full_name = Some("   ");
        assert_eq!(validate_registration(&input), Err(ValidationError::MissingFields));
    }

    #[test]
    fn test_checks_short_circuit_in_order() {
        // bad email and bad phone: email is reported
        let mut input = ann();
        input.email = Some("not-an-email");
        input.mobile_number = Some("123");
        assert_eq!(validate_registration(&input), Err(ValidationError::InvalidEmail));

        // bad phone and weak password: phone is reported
        let mut input = ann();
        input.mobile_number = Some("123");
        input.password = Some("weak");
        assert_eq!(validate_registration(&input), Err(ValidationError::InvalidMobileNumber));

        // weak password and mismatch: strength is reported
        let mut input = ann();
        input.password = Some("weak");
        assert_eq!(validate_registration(&input), Err(ValidationError::WeakPassword));

        let mut input = ann();
        input.confirm_password = Some("Abcd1234?");
        assert_eq!(validate_registration(&input), Err(ValidationError::PasswordMismatch));
    }

    #[test]
    fn test_valid_email() {
        assert_eq!(is_valid_email("user@example.com").unwrap(), "user@example.com");
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_email_is_normalized() {
        assert_eq!(is_valid_email("  Ann@X.Com ").unwrap(), "ann@x.com");
    }

    #[test]
    fn test_invalid_email_format() {
        for email in ["invalid", "user@", "@example.com", "user@@example.com", "user@example.c", "us er@example.com"] {
            assert!(is_valid_email(email).is_err(), "accepted {}", email);
        }
    }

    #[test]
    fn test_email_length_limits() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(is_valid_email(&too_long).is_err());

        let long_local = format!("{}@example.com", "a".repeat(65));
        assert!(is_valid_email(&long_local).is_err());
    }

    #[test]
    fn test_mobile_number() {
        assert!(is_valid_mobile_number("1234567890").is_ok());
        assert!(is_valid_mobile_number("123456789").is_err());
        assert!(is_valid_mobile_number("12345678901").is_err());
        assert!(is_valid_mobile_number("12345abcde").is_err());
        assert!(is_valid_mobile_number("+123456789").is_err());
        assert!(is_valid_mobile_number("١٢٣٤٥٦٧٨٩٠").is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(is_strong_password("Abcd1234!").is_ok());
        assert!(is_strong_password("xY9#xY9#").is_ok());

        let rejected = [
            ("Abc123!", "too short"),
            ("abcd1234!", "no uppercase"),
            ("ABCD1234!", "no lowercase"),
            ("Abcdefgh!", "no digit"),
            ("Abcd12345", "no symbol"),
            ("Abcd1234!^", "symbol outside the allowed set"),
            ("Abcd 1234!", "whitespace"),
        ];
        for (password, reason) in rejected {
            assert_eq!(
                is_strong_password(password),
                Err(ValidationError::WeakPassword),
                "{}",
                reason
            );
        }

        let too_long = format!("Aa1!{}", "a".repeat(MAX_PASSWORD_LENGTH));
        assert!(is_strong_password(&too_long).is_err());
    }

    #[test]
    fn test_valid_name() {
        assert!(is_valid_name("John Doe").is_ok());
        assert!(is_valid_name("Jean-Pierre").is_ok());
        assert!(is_valid_name("O'Brien").is_ok());
        assert!(is_valid_name("Castro Concannon").is_ok());
    }

    #[test]
    fn test_invalid_name() {
        assert!(is_valid_name("").is_err());
        assert!(is_valid_name(&"a".repeat(257)).is_err());
        assert!(is_valid_name("Name\0with\0null").is_err());
    }
}
