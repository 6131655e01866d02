use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("{0}")]
    Validation(String),
    #[error("{field} must be a valid {expected}: {value:?}")]
    InvalidNumber {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ModelError {
    pub fn required(field: &str) -> Self {
        Self::Validation(format!("{field} is required"))
    }
}

pub(crate) fn require(field: &str, value: &str) -> Result<String, ModelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelError::required(field));
    }
    Ok(trimmed.to_string())
}
