use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField { field: &'static str },
    InvalidPhoneFormat { input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "{field} is required"),
            Self::InvalidPhoneFormat { input } => {
                write!(
                    f,
                    "invalid phone number format: {input} (10-12 digits required)"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Batch rejected before any provider call because of its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSizeError {
    Empty,
    TooLarge { max: usize, actual: usize },
}

impl fmt::Display for BatchSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "batch must contain at least one item"),
            Self::TooLarge { max, actual } => {
                write!(f, "too many items in batch: {actual} (max {max})")
            }
        }
    }
}

impl std::error::Error for BatchSizeError {}
