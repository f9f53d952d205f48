//! Sign-in, sign-up and password-reset forms.
//!
//! There is no account database: these only presence-check their input.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::error::ValidationError;
use crate::models::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            role,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        present("email", &self.email)?;
        present("password", &self.password)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm: String,
}

/// Accepted sign-up. The user still has to log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
}

impl RegisterForm {
    pub fn submit(&self) -> Result<Registration, ValidationError> {
        if self.password != self.confirm {
            return Err(ValidationError::PasswordMismatch);
        }
        present("email", &self.email)?;
        present("password", &self.password)?;

        info!("Registered {}", self.email.trim());
        Ok(Registration {
            email: self.email.trim().to_string(),
        })
    }
}

/// Simulated password-reset call with a fixed delay
#[derive(Debug, Clone)]
pub struct PasswordReset {
    delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetReceipt {
    pub email: String,
    pub sent_at: DateTime<Utc>,
}

impl PasswordReset {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.reset_delay())
    }

    pub async fn request(&self, email: &str) -> Result<ResetReceipt, ValidationError> {
        present("email", email)?;

        info!("Sending password reset link to {}", email.trim());
        tokio::time::sleep(self.delay).await;

        Ok(ResetReceipt {
            email: email.trim().to_string(),
            sent_at: Utc::now(),
        })
    }
}

fn present(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_email_and_password() {
        assert!(LoginForm::new("t@x.com", "123", Role::Tenant).validate().is_ok());
        assert_eq!(
            LoginForm::new("", "123", Role::Tenant).validate(),
            Err(ValidationError::MissingField("email"))
        );
        assert_eq!(
            LoginForm::new("t@x.com", " ", Role::Owner).validate(),
            Err(ValidationError::MissingField("password"))
        );
    }

    #[test]
    fn register_checks_confirmation_first() {
        let form = RegisterForm {
            email: String::new(),
            password: "a".to_string(),
            confirm: "b".to_string(),
        };
        assert_eq!(form.submit(), Err(ValidationError::PasswordMismatch));

        let form = RegisterForm {
            email: " new@x.com ".to_string(),
            password: "pw".to_string(),
            confirm: "pw".to_string(),
        };
        assert_eq!(form.submit().unwrap().email, "new@x.com");
    }

    #[tokio::test(start_paused = true)]
    async fn reset_waits_the_configured_delay() {
        let reset = PasswordReset::from_config(&Config::default());
        let started = tokio::time::Instant::now();

        let receipt = reset.request("t@x.com").await.unwrap();

        assert_eq!(receipt.email, "t@x.com");
        assert!(started.elapsed() >= Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_without_email_returns_immediately() {
        let reset = PasswordReset::new(Duration::from_secs(60));
        let started = tokio::time::Instant::now();

        assert!(reset.request("").await.is_err());
        assert!(started.elapsed() < Duration::from_secs(60));
    }
}
