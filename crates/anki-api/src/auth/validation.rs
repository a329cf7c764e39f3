use crate::error::ApiError;
use validator::ValidateEmail;

/// Validate email format using the validator crate
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::Validation("Email cannot be empty".to_string()));
    }

    if !email.validate_email() {
        return Err(ApiError::Validation("Invalid email format".to_string()));
    }

    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if password.chars().count() > 128 {
        return Err(ApiError::Validation(
            "Password must be at most 128 characters long".to_string(),
        ));
    }

    let has_letter = password.chars().any(char::is_alphabetic);
    let has_number = password.chars().any(char::is_numeric);

    if !has_letter || !has_number {
        return Err(ApiError::Validation(
            "Password must contain at least one letter and one number".to_string(),
        ));
    }

    Ok(())
}

/// Validate username
///
/// Letters, digits and `@ . + - _`, up to 150 characters.
pub fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::Validation("Username cannot be empty".to_string()));
    }

    let len = username.chars().count();
    if len < 3 {
        return Err(ApiError::Validation(
            "Username must be at least 3 characters long".to_string(),
        ));
    }

    if len > 150 {
        return Err(ApiError::Validation(
            "Username must be at most 150 characters long".to_string(),
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(ApiError::Validation(
            "Username can only contain letters, numbers and @/./+/-/_ characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate a name field (first or last name)
pub fn validate_person_name(name: &str) -> Result<(), ApiError> {
    if name.chars().count() > 150 {
        return Err(ApiError::Validation(
            "Name must be at most 150 characters long".to_string(),
        ));
    }

    if name.chars().any(|c| c.is_control() || matches!(c, '<' | '>')) {
        return Err(ApiError::Validation(
            "Name contains invalid characters".to_string(),
        ));
    }

    Ok(())
}

/// Error message of a failed validation, for attaching to a form field.
pub fn message_of(result: Result<(), ApiError>) -> Option<String> {
    result.err().map(|e| e.user_message())
}
