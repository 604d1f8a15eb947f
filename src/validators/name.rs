use super::ValidationError;

pub const NAME_MAX_LENGTH: usize = 100;
pub const DEPARTMENT_MAX_LENGTH: usize = 50;

/// Display name of a sales representative.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::NameEmpty);
    }

    if trimmed.chars().count() > NAME_MAX_LENGTH {
        return Err(ValidationError::NameTooLong(NAME_MAX_LENGTH));
    }

    Ok(())
}

pub fn validate_department(department: &str) -> Result<(), ValidationError> {
    let trimmed = department.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::DepartmentEmpty);
    }

    if trimmed.chars().count() > DEPARTMENT_MAX_LENGTH {
        return Err(ValidationError::DepartmentTooLong(DEPARTMENT_MAX_LENGTH));
    }

    Ok(())
}
