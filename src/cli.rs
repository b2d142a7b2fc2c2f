use std::path::PathBuf;

use clap::Parser;

use crate::config::{DeploymentConfig, Settings};
use crate::error::ProvisionResult;

/// Provision n8n behind Nginx with a Let's Encrypt certificate.
#[derive(Debug, Parser)]
#[command(name = "n8n-provision", version, about)]
pub struct Cli {
    /// Public domain name, e.g. n8n.example.com
    #[arg(long)]
    pub domain: String,

    /// Contact email for Let's Encrypt
    #[arg(long)]
    pub email: String,

    /// dev (bundled Postgres) or live (external database)
    #[arg(long, default_value = "dev")]
    pub mode: String,

    /// Directory holding docker-compose.yml and .env
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Local port n8n listens on
    #[arg(long, default_value_t = 5678)]
    pub app_port: u16,

    /// Preview generated files without executing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Validate the arguments into the values threaded through the
    /// pipeline.
    pub fn into_parts(self) -> ProvisionResult<(DeploymentConfig, Settings)> {
        let config = DeploymentConfig::new(&self.domain, &self.email, &self.mode)?;
        let settings = Settings::new().work_dir(&self.dir).app_port(self.app_port);
        Ok((config, settings))
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;
    use crate::config::Mode;

    #[test]
    fn equals_syntax() {
        let cli = Cli::try_parse_from([
            "n8n-provision",
            "--domain=dev.example.com",
            "--email=a@b.com",
            "--mode=live",
        ])
        .unwrap();

        assert_eq!(cli.domain, "dev.example.com");
        assert_eq!(cli.email, "a@b.com");
        assert_eq!(cli.mode, "live");
        assert!(!cli.dry_run);
    }

    #[test]
    fn mode_defaults_to_dev() {
        let cli =
            Cli::try_parse_from(["n8n-provision", "--domain=x.io", "--email=a@b.com"]).unwrap();
        let (config, settings) = cli.into_parts().unwrap();

        assert_eq!(config.mode(), Mode::Dev);
        assert_eq!(settings.app_port, 5678);
        assert_eq!(settings.work_dir, PathBuf::from("."));
    }

    #[test]
    fn unknown_flag_rejected() {
        let err = Cli::try_parse_from([
            "n8n-provision",
            "--domain=x.io",
            "--email=a@b.com",
            "--force",
        ])
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn help_is_not_an_error() {
        let err = Cli::try_parse_from(["n8n-provision", "--help"]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(!err.use_stderr());
    }

    #[test]
    fn invalid_mode_surfaces_from_validation() {
        let cli = Cli::try_parse_from([
            "n8n-provision",
            "--domain=x.io",
            "--email=a@b.com",
            "--mode=prod",
        ])
        .unwrap();

        let err = cli.into_parts().unwrap_err();
        assert!(err.to_string().contains("invalid mode 'prod'"));
    }
}
