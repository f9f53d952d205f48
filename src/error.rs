use thiserror::Error;

/// Form input rejected before anything was submitted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all required fields ({0} is missing)")]
    MissingField(&'static str),

    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Errors surfaced by the application controller
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no user is logged in")]
    NotLoggedIn,

    #[error("only tenants can like listings")]
    NotATenant,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
