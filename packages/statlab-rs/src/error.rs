use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatlabError {
    #[error("Invalid value for {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Please upload a data file before running the analysis")]
    MissingDataset,

    #[error("Unsupported file '{name}' (type: {}). Supported: .csv, .xlsx, .xls", media_type.as_deref().unwrap_or("unknown"))]
    FileType {
        name: String,
        media_type: Option<String>,
    },

    #[error("An analysis request is already in flight")]
    RequestInFlight,

    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("Failed to reach analysis service: {0}")]
    Transport(String),

    #[error("Malformed analysis response: field '{field}' {reason}")]
    Adapter { field: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Where in the workflow an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    /// Raised at the point of user action; never becomes a `Failed` state.
    Input,
    /// Raised after submission; always becomes a `Failed` state.
    Analysis,
}

impl StatlabError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        StatlabError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn adapter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        StatlabError::Adapter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn stage(&self) -> ErrorStage {
        match self {
            StatlabError::Validation { .. }
            | StatlabError::MissingDataset
            | StatlabError::FileType { .. }
            | StatlabError::RequestInFlight
            | StatlabError::IoError(_) => ErrorStage::Input,
            StatlabError::Service { .. }
            | StatlabError::Transport(_)
            | StatlabError::Adapter { .. } => ErrorStage::Analysis,
        }
    }
}

pub type Result<T> = std::result::Result<T, StatlabError>;
