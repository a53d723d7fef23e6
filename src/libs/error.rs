use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The input path does not exist or cannot be read
    InputNotFound {
        /// Path as given on the command line
        path: String,
        /// Underlying I/O message
        reason: String,
    },
    /// A line that is not `id id score`
    MalformedRecord {
        /// The line number (1-based)
        line: usize,
        /// The offending line, verbatim
        content: String,
        /// What was wrong with it
        reason: String,
    },
    /// The output destination cannot be created or written
    OutputWrite {
        path: String,
        reason: String,
    },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::InputNotFound { path, reason } => {
                write!(f, "Input not found: {}: {}", path, reason)
            }
            FilterError::MalformedRecord {
                line,
                content,
                reason,
            } => {
                write!(
                    f,
                    "Malformed record at line {}: {}\nLine: \"{}\"",
                    line, reason, content
                )
            }
            FilterError::OutputWrite { path, reason } => {
                write!(f, "Cannot write output {}: {}", path, reason)
            }
        }
    }
}

impl std::error::Error for FilterError {}
