use std::path::PathBuf;

pub type ProvisionResult<T> = Result<T, ProvisionError>;

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    #[error("invalid mode '{0}': expected 'dev' or 'live'")]
    InvalidMode(String),

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error(
        "existing deployment detected ({}); refusing to overwrite",
        display_paths(.0)
    )]
    ExistingDeployment(Vec<PathBuf>),

    #[error("DNS lookup failed: {0}")]
    DnsLookup(String),

    #[error(
        "DNS mismatch for {domain}: expected {expected} (this server), \
         got {actual}"
    )]
    DnsMismatch {
        domain: String,
        expected: String,
        actual: String,
    },

    #[error("prerequisite installation failed: {0}")]
    PrerequisiteInstall(String),

    #[error("container start failed: {0}")]
    ContainerStart(String),

    #[error("proxy configuration error: {0}")]
    ProxyConfig(String),

    #[error("certificate issuance failed: {0}")]
    CertificateIssuance(String),

    #[error("command failed: {command}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ProvisionError {
    /// Short description of a runner failure, used when wrapping it
    /// into a phase error.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::CommandFailed {
                command, stderr, ..
            } if !stderr.is_empty() => format!("{command}: {stderr}"),
            other => other.to_string(),
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
