mod email;
mod login_code;
mod name;
mod password;

pub use email::validate_email;
pub use login_code::{validate_login_code, LOGIN_CODE_MAX_LENGTH};
pub use name::{validate_department, validate_name, DEPARTMENT_MAX_LENGTH, NAME_MAX_LENGTH};
pub use password::{PasswordPolicy, PasswordValidation, MIN_PASSWORD_LENGTH};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    EmailEmpty,
    EmailTooLong,
    EmailInvalidFormat,
    PasswordTooShort(usize),
    PasswordMissingUppercase,
    PasswordMissingLowercase,
    PasswordMissingDigit,
    PasswordMissingSpecial,
    NameEmpty,
    NameTooLong(usize),
    DepartmentEmpty,
    DepartmentTooLong(usize),
    LoginCodeEmpty,
    LoginCodeTooLong(usize),
    LoginCodeInvalidFormat,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailEmpty => write!(f, "Email is required"),
            Self::EmailTooLong => write!(f, "Email is too long (max 254 characters)"),
            Self::EmailInvalidFormat => write!(f, "Invalid email format"),
            Self::PasswordTooShort(min) => {
                write!(f, "Password must be at least {min} characters")
            }
            Self::PasswordMissingUppercase => {
                write!(f, "Password must contain an uppercase letter (A-Z)")
            }
            Self::PasswordMissingLowercase => {
                write!(f, "Password must contain a lowercase letter (a-z)")
            }
            Self::PasswordMissingDigit => write!(f, "Password must contain a digit (0-9)"),
            Self::PasswordMissingSpecial => write!(
                f,
                "Password must contain a special character (!@#$%^&* etc.)"
            ),
            Self::NameEmpty => write!(f, "Name is required"),
            Self::NameTooLong(max) => write!(f, "Name is too long (max {max} characters)"),
            Self::DepartmentEmpty => write!(f, "Department is required"),
            Self::DepartmentTooLong(max) => {
                write!(f, "Department is too long (max {max} characters)")
            }
            Self::LoginCodeEmpty => write!(f, "Login code is required"),
            Self::LoginCodeTooLong(max) => {
                write!(f, "Login code is too long (max {max} characters)")
            }
            Self::LoginCodeInvalidFormat => {
                write!(f, "Login code may only contain letters and digits")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
