use std::fmt::{Display, Formatter};

pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptErrorCategory {
    ConfigurationError,
    FileSystemError,
    InternalError,
}

impl OptErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::ConfigurationError => 2,
            Self::FileSystemError => 3,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigurationError => "ConfigurationError",
            Self::FileSystemError => "FileSystemError",
            Self::InternalError => "InternalError",
        }
    }
}

impl Display for OptErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Error shared by every job kind.
///
/// `placeholder` is a stable dotted identifier (`CONFIG.MISSING_VARIABLE`,
/// `IO.JOB_DIRECTORY`, ...) that tests and the CLI match on; `message` is
/// free text for humans.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{category} [{placeholder}] {message}")]
pub struct OptError {
    category: OptErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl OptError {
    pub fn new(
        category: OptErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn configuration(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(OptErrorCategory::ConfigurationError, placeholder, message)
    }

    pub fn file_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(OptErrorCategory::FileSystemError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(OptErrorCategory::InternalError, placeholder, message)
    }

    /// A variable the solver cannot run without was never staged.
    pub fn missing_variable(name: &str) -> Self {
        Self::configuration(
            "CONFIG.MISSING_VARIABLE",
            format!("required input variable '{name}' is not set"),
        )
    }

    pub const fn category(&self) -> OptErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }
}
