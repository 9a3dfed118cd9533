use thiserror::Error;

/// File-system error code the device reports when a file is opened from
/// outside the application's data directory.
pub const WRONG_LOCATION_CODE: &str = "0709";

/// Error reported by the host file system.
///
/// Device errors are free-form strings; when they carry a four-digit code in
/// parentheses (`"... (0709)"`) it is extracted into [`FsError::code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FsError {
    message: String,
    code: Option<String>,
}

impl FsError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let code = extract_fs_error_code(&message).map(str::to_owned);
        Self { message, code }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let message = format!("{} ({code})", message.into());
        Self {
            message,
            code: Some(code),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn is_wrong_location(&self) -> bool {
        self.code() == Some(WRONG_LOCATION_CODE)
    }
}

/// Returns the last parenthesized four-digit code in a device error string.
pub fn extract_fs_error_code(message: &str) -> Option<&str> {
    message
        .rmatch_indices('(')
        .filter_map(|(start, _)| {
            let rest = &message[start + 1..];
            let end = rest.find(')')?;
            let inner = &rest[..end];
            (inner.len() == 4 && inner.bytes().all(|b| b.is_ascii_digit())).then_some(inner)
        })
        .next()
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: FsError,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: FsError,
    },
    #[error("{path} is truncated: {len} bytes")]
    Truncated { path: String, len: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}
