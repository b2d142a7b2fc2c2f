use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ProvisionError, ProvisionResult};
use crate::secret;
use crate::validate;

/// Database topology of the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Bundled Postgres container next to n8n.
    Dev,
    /// n8n only, connecting to an externally managed database.
    Live,
}

impl Mode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Live => "live",
        }
    }
}

impl FromStr for Mode {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Self::Dev),
            "live" => Ok(Self::Live),
            other => Err(ProvisionError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated operator input. Built once from the command line and
/// never mutated afterwards.
///
/// # Example
///
/// ```
/// use n8n_provision::config::{DeploymentConfig, Mode};
///
/// let config = DeploymentConfig::new("n8n.example.com", "ops@example.com", "dev")?;
///
/// assert_eq!(config.mode(), Mode::Dev);
/// assert!(config.db_password().is_some());
/// # Ok::<(), n8n_provision::error::ProvisionError>(())
/// ```
#[derive(Clone)]
pub struct DeploymentConfig {
    domain: String,
    email: String,
    mode: Mode,
    db_password: Option<String>,
}

impl DeploymentConfig {
    /// Validate the raw inputs. In dev mode a fresh database
    /// password is generated here.
    pub fn new(domain: &str, email: &str, mode: &str) -> ProvisionResult<Self> {
        validate::validate_domain(domain)?;
        validate::validate_email(email)?;
        let mode = validate::validate_mode(mode)?;

        let db_password = match mode {
            Mode::Dev => Some(secret::generate_password()),
            Mode::Live => None,
        };

        Ok(Self {
            domain: domain.to_string(),
            email: email.to_string(),
            mode,
            db_password,
        })
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn db_password(&self) -> Option<&str> {
        self.db_password.as_deref()
    }

    /// Public base URL the application registers for webhooks.
    #[must_use]
    pub fn webhook_url(&self) -> String {
        format!("https://{}/", self.domain)
    }
}

impl fmt::Debug for DeploymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentConfig")
            .field("domain", &self.domain)
            .field("email", &self.email)
            .field("mode", &self.mode)
            .field(
                "db_password",
                &self.db_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Deployment constants. Defaults target a stock Ubuntu host with
/// Nginx from apt.
#[derive(Debug, Clone)]
pub struct Settings {
    pub work_dir: PathBuf,
    pub compose_file: String,
    pub env_file: String,
    pub app_port: u16,
    pub app_image: String,
    pub db_image: String,
    pub db_name: String,
    pub db_user: String,
    pub db_healthcheck_retries: u64,
    pub db_healthcheck_interval: Duration,
    pub sites_available: PathBuf,
    pub sites_enabled: PathBuf,
    pub os_release: PathBuf,
    pub public_ip_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            compose_file: "docker-compose.yml".to_string(),
            env_file: ".env".to_string(),
            app_port: 5678,
            app_image: "docker.n8n.io/n8nio/n8n".to_string(),
            db_image: "postgres:16".to_string(),
            db_name: "n8n".to_string(),
            db_user: "n8n".to_string(),
            db_healthcheck_retries: 10,
            db_healthcheck_interval: Duration::from_secs(5),
            sites_available: PathBuf::from("/etc/nginx/sites-available"),
            sites_enabled: PathBuf::from("/etc/nginx/sites-enabled"),
            os_release: PathBuf::from("/etc/os-release"),
            public_ip_url: "https://api.ipify.org?format=json".to_string(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn work_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.work_dir = dir.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub const fn app_port(mut self, port: u16) -> Self {
        self.app_port = port;
        self
    }

    #[must_use]
    pub fn app_image(mut self, image: &str) -> Self {
        self.app_image = image.to_string();
        self
    }

    #[must_use]
    pub fn db_image(mut self, image: &str) -> Self {
        self.db_image = image.to_string();
        self
    }

    #[must_use]
    pub fn nginx_dirs(mut self, available: impl AsRef<Path>, enabled: impl AsRef<Path>) -> Self {
        self.sites_available = available.as_ref().to_path_buf();
        self.sites_enabled = enabled.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub fn os_release(mut self, path: impl AsRef<Path>) -> Self {
        self.os_release = path.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub fn public_ip_url(mut self, url: &str) -> Self {
        self.public_ip_url = url.to_string();
        self
    }

    /// Absolute location of the deployment descriptor.
    #[must_use]
    pub fn compose_path(&self) -> PathBuf {
        self.work_dir.join(&self.compose_file)
    }

    /// Absolute location of the secret/config file.
    #[must_use]
    pub fn env_path(&self) -> PathBuf {
        self.work_dir.join(&self.env_file)
    }
}
