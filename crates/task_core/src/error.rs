use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("not_found - {0}")]
    NotFound(String),
    #[error("blocked - task '{name}' has unmet dependencies: {}", .unmet.join(", "))]
    Blocked { name: String, unmet: Vec<String> },
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("io_error - {0}")]
    Io(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found<M: Into<String>>(message: M) -> Self {
        Self::NotFound(message.into())
    }

    pub fn blocked<N: Into<String>>(name: N, unmet: Vec<String>) -> Self {
        Self::Blocked {
            name: name.into(),
            unmet,
        }
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Blocked { .. } => "blocked",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput(message)
            | Self::NotFound(message)
            | Self::InvalidData(message)
            | Self::Io(message) => message.clone(),
            Self::Blocked { name, unmet } => {
                format!("task '{}' has unmet dependencies: {}", name, unmet.join(", "))
            }
        }
    }

    /// Dependency names still missing from the completed set, for `Blocked` errors.
    pub fn unmet(&self) -> &[String] {
        match self {
            Self::Blocked { unmet, .. } => unmet,
            _ => &[],
        }
    }

    /// Storage failures abort the operation that hit them; everything else is a caller error.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::InvalidData(_) | Self::Io(_))
    }
}
