//! Types d'erreurs pour pmomedia

/// Problème détecté sur une entrée de `mediaList`
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntryError {
    #[error("entry is not a JSON object")]
    NotAnObject,

    #[error("entry has neither `videoUrl` nor `imageUrl`")]
    MissingMediaUrl,

    #[error("entry has both `videoUrl` and `imageUrl`")]
    AmbiguousMediaUrl,

    #[error("`{0}` must not be empty")]
    EmptyUrl(&'static str),

    #[error("`{field}` has wrong type: expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("`{field}` must be a finite number >= {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        value: f64,
        min: f64,
    },

    #[error("`{field}` must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Erreurs de validation d'une configuration JSON
///
/// Toutes les variantes sont destinées à être montrées à l'utilisateur :
/// elles indiquent le champ (et l'index de l'entrée) qui pose problème.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid JSON at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Media configuration must be a JSON object")]
    NotAnObject,

    #[error("Missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Field `{field}` has wrong type: expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Invalid media entry #{index}: {reason}")]
    InvalidEntry {
        index: usize,
        #[source]
        reason: EntryError,
    },
}

impl ValidationError {
    pub(crate) fn entry(index: usize, reason: EntryError) -> Self {
        ValidationError::InvalidEntry { index, reason }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Syntax {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// Type Result spécialisé pour la validation
pub type Result<T> = std::result::Result<T, ValidationError>;
