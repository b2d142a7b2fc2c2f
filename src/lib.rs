//! One-command provisioning of a single-node n8n deployment.
//!
//! `n8n-provision` turns a fresh Ubuntu host into a running n8n
//! instance behind Nginx with a Let's Encrypt certificate. It
//! installs Docker, Nginx and Certbot, generates a
//! `docker-compose.yml` and `.env` pair, checks DNS, starts the
//! containers and configures the reverse proxy.
//!
//! # Modes
//!
//! - **dev** - bundles a Postgres container with a generated
//!   password. n8n waits for the database healthcheck before
//!   starting.
//! - **live** - n8n only, pointed at an external database. The
//!   first run writes placeholder credentials and stops; edit
//!   `.env` and run the same command again to deploy.
//!
//! # Architecture
//!
//! A [`Pipeline`] runs the phases in order and stops at the first
//! error:
//!
//! 1. **Validate** - domain, email, mode, Ubuntu, root
//! 2. **Install prerequisites** and **generate environment** -
//!    skipped when both generated files are already present
//! 3. **Verify DNS** - the domain's A record must equal this
//!    host's public IP
//! 4. **Start containers** - `docker compose up -d`
//! 5. **Configure proxy and TLS** - Nginx site, `nginx -t`,
//!   reload, `certbot --nginx --redirect --hsts`, reload
//!
//! Every external program runs through the [`CommandRunner`]
//! trait, so the whole workflow can be driven by a scripted runner.
//!
//! # Example
//!
//! ```rust,no_run
//! use n8n_provision::{DeploymentConfig, Pipeline, Settings};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = DeploymentConfig::new("n8n.example.com", "ops@example.com", "dev")?;
//!     let settings = Settings::new().work_dir("/opt/n8n");
//!
//!     Pipeline::new(config, settings).run()?;
//!     Ok(())
//! }
//! ```
//!
//! [`CommandRunner`]: cmd::CommandRunner

#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod cli;
pub mod cmd;
pub mod compose;
pub mod config;
pub mod dns;
pub mod environment;
pub mod envfile;
pub mod error;
pub mod nginx;
pub mod pipeline;
pub mod platform;
pub mod prereq;
pub mod proxy;
pub mod secret;
pub mod validate;

pub use config::{DeploymentConfig, Mode, Settings};
pub use dns::DnsVerifier;
pub use envfile::EnvFile;
pub use nginx::NginxSite;
pub use pipeline::{Outcome, Pipeline};
