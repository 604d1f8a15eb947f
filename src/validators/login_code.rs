use super::ValidationError;

pub const LOGIN_CODE_MAX_LENGTH: usize = 20;

/// Login codes are short ASCII alphanumeric identifiers such as `S0001`.
pub fn validate_login_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() {
        return Err(ValidationError::LoginCodeEmpty);
    }

    if code.len() > LOGIN_CODE_MAX_LENGTH {
        return Err(ValidationError::LoginCodeTooLong(LOGIN_CODE_MAX_LENGTH));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::LoginCodeInvalidFormat);
    }

    Ok(())
}
