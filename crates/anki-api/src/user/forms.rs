use anki_db::repositories::user as user_repo;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{
    auth::validation::{
        message_of, validate_email, validate_password, validate_person_name, validate_username,
    },
    error::{ApiError, FormErrors},
};

const REQUIRED: &str = "This field is required.";
const PASSWORD_MISMATCH: &str = "Passwords do not match.";
const EMAIL_TAKEN: &str = "A user with that email already exists.";

/// Check a new password pair, attaching errors to the second field on mismatch.
fn check_new_password(
    errors: &mut FormErrors,
    field1: &str,
    password1: &str,
    field2: &str,
    password2: &str,
) {
    if password1.is_empty() {
        errors.add(field1, REQUIRED);
    } else if let Some(msg) = message_of(validate_password(password1)) {
        errors.add(field1, msg);
    }

    if password2.is_empty() {
        errors.add(field2, REQUIRED);
    } else if password1 != password2 {
        errors.add(field2, PASSWORD_MISMATCH);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// What a rejected login form echoes back; never the password.
#[derive(Debug, Serialize)]
pub struct LoginEcho<'a> {
    pub username: &'a str,
    pub next: Option<&'a str>,
}

impl LoginForm {
    pub fn echo(&self) -> LoginEcho<'_> {
        LoginEcho {
            username: &self.username,
            next: self.next.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
}

#[derive(Debug, Serialize)]
pub struct SignupEcho<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
}

#[derive(Debug, Clone)]
pub struct CleanSignup {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub password: String,
}

impl SignupForm {
    pub fn echo(&self) -> SignupEcho<'_> {
        SignupEcho {
            username: &self.username,
            email: &self.email,
            first_name: &self.first_name,
        }
    }

    /// Field checks that need no database.
    pub fn check_fields(&self, errors: &mut FormErrors) {
        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if let Some(msg) = message_of(validate_username(username)) {
            errors.add("username", msg);
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.add("email", REQUIRED);
        } else if let Some(msg) = message_of(validate_email(email)) {
            errors.add("email", msg);
        }

        if let Some(msg) = message_of(validate_person_name(&self.first_name)) {
            errors.add("first_name", msg);
        }

        check_new_password(errors, "password", &self.password, "password2", &self.password2);
    }

    pub async fn clean(&self, pool: &PgPool) -> Result<CleanSignup, ApiError> {
        let mut errors = FormErrors::new();
        self.check_fields(&mut errors);

        let username = self.username.trim();
        let email = self.email.trim();

        if !errors.has("username") && user_repo::username_taken(pool, username).await? {
            errors.add("username", "A user with that username already exists.");
        }
        if !errors.has("email") && user_repo::email_taken(pool, email, None).await? {
            errors.add("email", EMAIL_TAKEN);
        }

        errors.finish(&self.echo())?;

        Ok(CleanSignup {
            username: username.to_string(),
            email: email.to_string(),
            first_name: self.first_name.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl ProfileForm {
    pub fn check_fields(&self, errors: &mut FormErrors) {
        if let Some(msg) = message_of(validate_person_name(&self.first_name)) {
            errors.add("first_name", msg);
        }
        if let Some(msg) = message_of(validate_person_name(&self.last_name)) {
            errors.add("last_name", msg);
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.add("email", REQUIRED);
        } else if let Some(msg) = message_of(validate_email(email)) {
            errors.add("email", msg);
        }
    }

    /// Validate for `user_id`; the user's own address does not count as taken.
    pub async fn clean(&self, pool: &PgPool, user_id: i32) -> Result<Self, ApiError> {
        let mut errors = FormErrors::new();
        self.check_fields(&mut errors);

        let email = self.email.trim();
        if !errors.has("email") && user_repo::email_taken(pool, email, Some(user_id)).await? {
            errors.add("email", EMAIL_TAKEN);
        }

        errors.finish(self)?;

        Ok(Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: email.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordChangeForm {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password1: String,
    #[serde(default)]
    pub new_password2: String,
}

impl PasswordChangeForm {
    /// Checks everything except the old password, which needs the stored hash.
    pub fn check_fields(&self, errors: &mut FormErrors) {
        if self.old_password.is_empty() {
            errors.add("old_password", REQUIRED);
        }
        check_new_password(
            errors,
            "new_password1",
            &self.new_password1,
            "new_password2",
            &self.new_password2,
        );
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasswordResetForm {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordResetConfirmForm {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password1: String,
    #[serde(default)]
    pub new_password2: String,
}

impl PasswordResetConfirmForm {
    pub fn check_fields(&self, errors: &mut FormErrors) {
        if self.token.trim().is_empty() {
            errors.add("token", REQUIRED);
        }
        check_new_password(
            errors,
            "new_password1",
            &self.new_password1,
            "new_password2",
            &self.new_password2,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupForm {
        SignupForm {
            username: "reader".to_string(),
            email: "reader@example.com".to_string(),
            first_name: "Ann".to_string(),
            password: "password123".to_string(),
            password2: "password123".to_string(),
        }
    }

    #[test]
    fn test_valid_signup_has_no_errors() {
        let mut errors = FormErrors::new();
        signup().check_fields(&mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_password_mismatch_is_attached_to_password2() {
        let form = SignupForm {
            password2: "password124".to_string(),
            ..signup()
        };
        let mut errors = FormErrors::new();
        form.check_fields(&mut errors);

        assert!(errors.has("password2"));
        assert!(!errors.has("password"));
    }

    #[test]
    fn test_weak_password_and_bad_username() {
        let form = SignupForm {
            username: "no spaces allowed".to_string(),
            password: "short".to_string(),
            password2: "short".to_string(),
            ..signup()
        };
        let mut errors = FormErrors::new();
        form.check_fields(&mut errors);

        assert!(errors.has("username"));
        assert!(errors.has("password"));
    }

    #[test]
    fn test_signup_echo_has_no_passwords() {
        let form = signup();
        let echo = serde_json::to_value(form.echo()).unwrap();

        assert_eq!(echo["username"], "reader");
        assert!(echo.get("password").is_none());
        assert!(echo.get("password2").is_none());
    }

    #[test]
    fn test_profile_requires_valid_email() {
        let form = ProfileForm {
            first_name: "Ann".to_string(),
            last_name: String::new(),
            email: "not-an-email".to_string(),
        };
        let mut errors = FormErrors::new();
        form.check_fields(&mut errors);

        assert!(errors.has("email"));
        assert!(!errors.has("last_name"));
    }

    #[test]
    fn test_password_change_requires_old_password() {
        let form = PasswordChangeForm {
            old_password: String::new(),
            new_password1: "newpassword1".to_string(),
            new_password2: "newpassword1".to_string(),
        };
        let mut errors = FormErrors::new();
        form.check_fields(&mut errors);

        assert!(errors.has("old_password"));
        assert!(!errors.has("new_password2"));
    }
}
