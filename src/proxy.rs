use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use crate::cmd::CommandRunner;
use crate::config::{DeploymentConfig, Settings};
use crate::error::{ProvisionError, ProvisionResult};
use crate::nginx::{self, NginxSite};

/// Build the site served in front of the application.
#[must_use]
pub fn site_for(config: &DeploymentConfig, settings: &Settings) -> NginxSite {
    NginxSite::new(config.domain(), settings.app_port)
        .websockets()
        .client_max_body_size("16M")
}

/// Write and enable the Nginx site, validate and reload Nginx, then
/// obtain a certificate with HTTPS redirect and HSTS.
pub fn configure(
    runner: &dyn CommandRunner,
    config: &DeploymentConfig,
    settings: &Settings,
) -> ProvisionResult<()> {
    let site = site_for(config, settings);

    let available = write_site(&site, &settings.sites_available)?;
    enable_exclusively(&available, &settings.sites_enabled)?;

    check_config(runner)?;
    reload(runner)?;

    issue_certificate(runner, config.domain(), config.email())?;

    // Certbot rewrote the site; make sure those edits are live.
    reload(runner)?;

    tracing::info!("nginx and TLS configured for {}", config.domain());
    Ok(())
}

/// Write the server block under `sites-available` and return its path.
pub fn write_site(site: &NginxSite, sites_available: &Path) -> ProvisionResult<PathBuf> {
    fs::create_dir_all(sites_available).map_err(|e| {
        ProvisionError::ProxyConfig(format!(
            "cannot create {}: {e}",
            sites_available.display()
        ))
    })?;

    let path = sites_available.join(site.file_name());
    tracing::info!("writing {}", path.display());
    fs::write(&path, nginx::render(site))
        .map_err(|e| ProvisionError::ProxyConfig(format!("cannot write {}: {e}", path.display())))?;
    Ok(path)
}

/// Make `site` the only entry in `sites-enabled`, removing the
/// stock `default` site and anything else linked there.
pub fn enable_exclusively(site: &Path, sites_enabled: &Path) -> ProvisionResult<()> {
    let proxy_err = |e: std::io::Error| ProvisionError::ProxyConfig(e.to_string());

    fs::create_dir_all(sites_enabled).map_err(proxy_err)?;

    for entry in fs::read_dir(sites_enabled).map_err(proxy_err)? {
        let path = entry.map_err(proxy_err)?.path();
        tracing::info!("disabling site {}", path.display());
        fs::remove_file(&path).map_err(proxy_err)?;
    }

    let name = site
        .file_name()
        .ok_or_else(|| ProvisionError::ProxyConfig(format!("bad site path {}", site.display())))?;
    let link = sites_enabled.join(name);
    tracing::info!("enabling site {}", link.display());
    symlink(site, &link).map_err(proxy_err)
}

fn check_config(runner: &dyn CommandRunner) -> ProvisionResult<()> {
    tracing::info!("validating nginx configuration");
    runner
        .run("nginx", &["-t"])
        .map(|_| ())
        .map_err(|e| ProvisionError::ProxyConfig(e.detail()))
}

fn reload(runner: &dyn CommandRunner) -> ProvisionResult<()> {
    tracing::info!("reloading nginx");
    runner
        .run("systemctl", &["reload", "nginx"])
        .map(|_| ())
        .map_err(|e| ProvisionError::ProxyConfig(e.detail()))
}

fn issue_certificate(runner: &dyn CommandRunner, domain: &str, email: &str) -> ProvisionResult<()> {
    tracing::info!("requesting certificate for {domain}");
    runner
        .run_interactive(
            "certbot",
            &[
                "--nginx",
                "-d",
                domain,
                "--non-interactive",
                "--agree-tos",
                "-m",
                email,
                "--redirect",
                "--hsts",
            ],
        )
        .map_err(|e| ProvisionError::CertificateIssuance(e.detail()))
}
