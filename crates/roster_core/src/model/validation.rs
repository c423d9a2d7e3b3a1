//! Field validation shared by roster models.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyUsername,
    NegativeAge(i32),
    EmptyTeamName,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::NegativeAge(age) => write!(f, "age must be >= 0, got {age}"),
            Self::EmptyTeamName => write!(f, "team name must not be empty"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    Ok(())
}

pub(crate) fn validate_age(age: i32) -> Result<(), ValidationError> {
    if age < 0 {
        return Err(ValidationError::NegativeAge(age));
    }
    Ok(())
}
