//! Error types for the form engine.
//!
//! Only document-level failures abort a run. Field-scoped conditions
//! (unresolved geometry, fallback classification, skipped fills) are
//! recorded in the run's output instead of raised through this type.

/// Result type alias for form engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading, classifying, or filling a form.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Document could not be opened or carries no usable form fields
    #[error("Document unreadable: {path}: {reason}")]
    DocumentUnreadable {
        /// Path or description of the input document
        path: String,
        /// Reason the document was rejected
        reason: String,
    },

    /// A field named in a fill or read request does not exist in the document
    #[error("Field not found in document: {0}")]
    FieldMissing(String),

    /// A choice value does not appear in the field's option list
    #[error("Option '{value}' is not valid for field '{field}'")]
    InvalidOption {
        /// Fully qualified field name
        field: String,
        /// The rejected option value
        value: String,
    },

    /// Malformed caller input (values map, lookup table, configuration)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the PDF object layer
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_unreadable_error() {
        let err = Error::DocumentUnreadable {
            path: "form.pdf".to_string(),
            reason: "no AcroForm dictionary".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("form.pdf"));
        assert!(msg.contains("no AcroForm dictionary"));
    }

    #[test]
    fn test_field_missing_error() {
        let err = Error::FieldMissing("form1[0].Section13[0].TextField1[0]".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Field not found"));
        assert!(msg.contains("TextField1[0]"));
    }

    #[test]
    fn test_invalid_option_error() {
        let err = Error::InvalidOption {
            field: "School6_State[0]".to_string(),
            value: "ZZ".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("School6_State[0]"));
        assert!(msg.contains("'ZZ'"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
