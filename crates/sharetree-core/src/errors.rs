use thiserror::Error;

/// Result type alias using ShareTreeError
pub type Result<T> = std::result::Result<T, ShareTreeError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Reconciliation itself is total and never produces an error. The kinds
/// below cover the surfaces around it: configuration loading and parsing.
/// Each kind maps to a stable error code usable for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidInput,
    /// Configuration document parsed but violates a structural rule
    InvalidConfig,
    /// Configuration document is not valid JSON/TOML
    Serialization,

    // Integration/IO
    Io,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// operation context and a message for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the file path the error relates to
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the file path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for sharetree operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShareTreeError {
    /// Configuration text could not be parsed in the given format
    #[error("Failed to parse {format} configuration: {message}")]
    ConfigParse {
        format: &'static str,
        message: String,
    },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {message}")]
    ConfigRead { path: String, message: String },

    /// Configuration file extension is not one of the supported formats
    #[error("Unsupported configuration format for {path}: expected .json or .toml")]
    UnsupportedConfigFormat { path: String },

    /// Configuration names an identity field that cannot be matched
    #[error("Empty identity field name at {location}")]
    EmptyIdentityField { location: String },
}

impl From<ShareTreeError> for ExError {
    fn from(err: ShareTreeError) -> Self {
        let message = err.to_string();
        match err {
            ShareTreeError::ConfigParse { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            ShareTreeError::ConfigRead { path, .. } => ExError::new(ExErrorKind::Io)
                .with_path(path)
                .with_message(message),
            ShareTreeError::UnsupportedConfigFormat { path } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_path(path)
                    .with_message(message)
            }
            ShareTreeError::EmptyIdentityField { .. } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to ShareTreeError
impl From<serde_json::Error> for ShareTreeError {
    fn from(err: serde_json::Error) -> Self {
        ShareTreeError::ConfigParse {
            format: "JSON",
            message: err.to_string(),
        }
    }
}

/// Conversion from toml::de::Error to ShareTreeError
impl From<toml::de::Error> for ShareTreeError {
    fn from(err: toml::de::Error) -> Self {
        ShareTreeError::ConfigParse {
            format: "TOML",
            message: err.to_string(),
        }
    }
}
