//! Password policy for new and reset passwords.

use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;

/// Minimum-length policy applied on registration, creation and reset.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl PasswordPolicy {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Rejects passwords shorter than the minimum, counted in characters.
    pub fn validate(&self, password: &str) -> AppResult<()> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_length() {
        let policy = PasswordPolicy::new(&AuthConfig::default());
        assert!(policy.validate("12345").is_err());
        assert!(policy.validate("123456").is_ok());
        // Multi-byte characters count once.
        assert!(policy.validate("ééééé").is_err());
    }
}
