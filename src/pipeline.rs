use std::path::PathBuf;

use crate::cmd::{CommandRunner, System};
use crate::config::{DeploymentConfig, Mode, Settings};
use crate::dns::DnsVerifier;
use crate::environment::{self, EnvironmentFiles, EnvironmentState};
use crate::envfile;
use crate::error::{ProvisionError, ProvisionResult};
use crate::nginx;
use crate::platform;
use crate::prereq;
use crate::proxy;

/// How a run ended when no phase failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Containers are up behind Nginx with a certificate.
    Deployed,
    /// Live mode wrote placeholder credentials; the operator edits
    /// them and re-runs the same command.
    AwaitingCredentials { env_file: PathBuf },
    /// Nothing was changed.
    DryRun,
}

/// Provisioning workflow:
///
/// 1. **Validate** - platform and privilege checks
/// 2. **Install prerequisites** and **generate environment** -
///    skipped when both files already exist
/// 3. **Verify DNS** - the domain must resolve to this host
/// 4. **Start containers** - `docker compose up -d`
/// 5. **Configure proxy and TLS** - Nginx site plus Certbot
///
/// The first failing phase ends the run. Nothing is rolled back.
pub struct Pipeline {
    config: DeploymentConfig,
    settings: Settings,
    runner: Box<dyn CommandRunner>,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: DeploymentConfig, settings: Settings) -> Self {
        Self {
            config,
            settings,
            runner: Box::new(System),
        }
    }

    #[must_use]
    pub fn runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run every phase in order.
    pub fn run(&self) -> ProvisionResult<Outcome> {
        let runner = &*self.runner;

        tracing::info!(
            "provisioning {} ({} mode)",
            self.config.domain(),
            self.config.mode()
        );

        platform::ensure_ubuntu(&self.settings.os_release)?;
        platform::ensure_root(runner)?;

        match environment::detect(&self.settings) {
            EnvironmentState::Partial(paths) => {
                return Err(ProvisionError::ExistingDeployment(paths));
            }
            EnvironmentState::Clean => {
                prereq::install(runner)?;
                environment::generate(&self.config, &self.settings)?;

                if self.config.mode() == Mode::Live {
                    let env_file = self.settings.env_path();
                    print_credentials_instructions(&env_file);
                    return Ok(Outcome::AwaitingCredentials { env_file });
                }
            }
            EnvironmentState::Complete => {
                tracing::info!("existing environment found, skipping setup");
                self.warn_placeholders()?;
            }
        }

        DnsVerifier::new(runner, &self.settings.public_ip_url).verify(self.config.domain())?;

        self.start_containers()?;

        proxy::configure(runner, &self.config, &self.settings)?;

        tracing::info!("deployment complete");
        tracing::info!("n8n available at: {}", self.config.webhook_url());
        Ok(Outcome::Deployed)
    }

    /// Print what a run would generate and do, without touching
    /// the host.
    #[allow(clippy::unnecessary_wraps)]
    pub fn dry_run(&self) -> ProvisionResult<Outcome> {
        let files = EnvironmentFiles::render(&self.config, &self.settings);
        let site = proxy::site_for(&self.config, &self.settings);

        eprintln!("=== Dry run: no changes will be made ===");
        eprintln!();

        eprintln!("--- {} ---", self.settings.compose_file);
        println!("{}", files.compose);

        eprintln!("--- {} ---", self.settings.env_file);
        println!("{}", files.env.redacted(&[envfile::DB_PASSWORD]).render());

        eprintln!("--- nginx site: {} ---", site.file_name());
        println!("{}", nginx::render(&site));

        eprintln!("--- Actions that would be performed ---");
        eprintln!("1. Install docker, nginx, certbot and dnsutils if missing");
        eprintln!(
            "2. Write {} and {}",
            self.settings.compose_path().display(),
            self.settings.env_path().display()
        );
        if self.config.mode() == Mode::Live {
            eprintln!("3. Stop and wait for database credentials to be filled in");
        } else {
            eprintln!("3. Verify that {} resolves to this host", self.config.domain());
            eprintln!("4. Start containers via docker compose");
            eprintln!(
                "5. Enable the nginx site and request a certificate for {} ({})",
                self.config.domain(),
                self.config.email()
            );
        }

        Ok(Outcome::DryRun)
    }

    fn start_containers(&self) -> ProvisionResult<()> {
        tracing::info!("starting containers");

        let work_dir = self.settings.work_dir.to_string_lossy();
        let compose = self.settings.compose_path();
        let env = self.settings.env_path();
        let compose = compose.to_string_lossy();
        let env = env.to_string_lossy();

        self.runner
            .run_interactive(
                "docker",
                &[
                    "compose",
                    "--project-directory",
                    &work_dir,
                    "-f",
                    &compose,
                    "--env-file",
                    &env,
                    "up",
                    "-d",
                ],
            )
            .map_err(|e| ProvisionError::ContainerStart(e.detail()))
    }

    fn warn_placeholders(&self) -> ProvisionResult<()> {
        let pending = environment::pending_placeholders(&self.settings)?;
        if !pending.is_empty() {
            tracing::warn!(
                "{} still has placeholder values for: {}",
                self.settings.env_path().display(),
                pending.join(", ")
            );
        }
        Ok(())
    }
}

fn print_credentials_instructions(env_file: &std::path::Path) {
    tracing::warn!("live mode: database credentials are required before deploying");
    tracing::warn!(
        "edit {} and set {}, {}, {} and {}",
        env_file.display(),
        envfile::DB_HOST,
        envfile::DB_PORT,
        envfile::DB_USER,
        envfile::DB_PASSWORD
    );
    tracing::warn!("then re-run the same command to continue with DNS and deployment");
}
