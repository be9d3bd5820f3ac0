use std::fmt;

/// Error types for plan parsing and classification
#[derive(Debug)]
pub enum PlanError {
    /// JSON plan document could not be parsed
    MalformedJson(String),

    /// Text input contains none of the phrases a plan run prints
    UnrecognizedText,

    /// A resource was found without any recognizable action
    AmbiguousAction { resource: String },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::MalformedJson(msg) => {
                write!(f, "Malformed JSON plan: {}", msg)
            }
            PlanError::UnrecognizedText => {
                write!(
                    f,
                    "Input does not look like plan output: no action banner, outputs banner, \
                     'No changes.' notice or 'Plan:' summary found"
                )
            }
            PlanError::AmbiguousAction { resource } => {
                write!(f, "No recognizable action for resource '{}'", resource)
            }
        }
    }
}

impl std::error::Error for PlanError {}

impl From<serde_json::Error> for PlanError {
    fn from(err: serde_json::Error) -> Self {
        PlanError::MalformedJson(err.to_string())
    }
}

/// Result type for plan operations
pub type PlanResult<T> = Result<T, PlanError>;
