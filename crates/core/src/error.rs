use thiserror::Error;

/// Errors raised while assembling the process at startup.
///
/// Every variant is fatal: the binary reports it and exits before the
/// scheduler starts.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential not found: {0}")]
    CredentialMissing(String),

    #[error("Credential file {0} is empty")]
    CredentialEmpty(String),

    #[error("Invalid duration for {key}: {value:?}")]
    InvalidDuration { key: String, value: String },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}
