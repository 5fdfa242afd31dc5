//! Error types for field callbacks

/// Error raised by a field's read, create or update callback
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("failed to read field {field}: {source}")]
    Read {
        field: String,
        #[source]
        source: Box<FieldError>,
    },

    #[error("field update not allowed: {0}")]
    UpdateNotAllowed(String),

    #[error("invalid {0}")]
    InvalidAttributes(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("type mismatch for {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("cannot decode {field}: {message}")]
    Decode { field: String, message: String },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("{0}")]
    Custom(String),
}

impl FieldError {
    /// Wraps an error raised while copying a remote value into local state
    pub fn read(field: impl Into<String>, source: FieldError) -> Self {
        FieldError::Read {
            field: field.into(),
            source: Box::new(source),
        }
    }

    pub fn update_not_allowed(field: impl Into<String>) -> Self {
        FieldError::UpdateNotAllowed(field.into())
    }

    pub fn invalid(what: impl Into<String>) -> Self {
        FieldError::InvalidAttributes(what.into())
    }
}

/// Result type alias for field callbacks
pub type Result<T> = std::result::Result<T, FieldError>;

impl From<String> for FieldError {
    fn from(s: String) -> Self {
        FieldError::Custom(s)
    }
}

impl From<&str> for FieldError {
    fn from(s: &str) -> Self {
        FieldError::Custom(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_names_field_and_cause() {
        let err = FieldError::read(
            "image_id",
            FieldError::TypeMismatch {
                field: "image_id".to_string(),
                expected: "string".to_string(),
                actual: "number".to_string(),
            },
        );

        assert_eq!(
            err.to_string(),
            "failed to read field image_id: type mismatch for image_id: expected string, got number"
        );
    }

    #[test]
    fn invalid_attributes_message() {
        let err = FieldError::invalid("tag attributes: key missing");
        assert_eq!(err.to_string(), "invalid tag attributes: key missing");
    }
}
