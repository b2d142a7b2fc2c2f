use crate::cmd::CommandRunner;
use crate::error::{ProvisionError, ProvisionResult};

/// A host tool and the apt packages that provide it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prerequisite {
    pub binary: &'static str,
    pub packages: &'static [&'static str],
}

pub const NGINX: Prerequisite = Prerequisite {
    binary: "nginx",
    packages: &["nginx"],
};

pub const CERTBOT: Prerequisite = Prerequisite {
    binary: "certbot",
    packages: &["certbot", "python3-certbot-nginx"],
};

pub const DIG: Prerequisite = Prerequisite {
    binary: "dig",
    packages: &["dnsutils"],
};

/// Tools installed from the Ubuntu archive when missing. Docker is
/// handled separately through its upstream convenience script.
pub const APT_PREREQUISITES: &[Prerequisite] = &[NGINX, CERTBOT, DIG];

const DOCKER_INSTALL: &str = "curl -fsSL https://get.docker.com | sh";

/// Keeps debconf and needrestart from prompting on the inherited
/// terminal during `apt-get install`.
const APT_ENV: &[&str] = &["DEBIAN_FRONTEND=noninteractive", "NEEDRESTART_MODE=a"];

/// Make sure Docker (with the compose plugin), Nginx, Certbot and
/// `dig` are available. Each tool is checked before installing, so
/// re-runs only install what is missing.
pub fn install(runner: &dyn CommandRunner) -> ProvisionResult<()> {
    tracing::info!("checking prerequisites");

    let missing: Vec<&Prerequisite> = APT_PREREQUISITES
        .iter()
        .filter(|p| {
            let present = runner.command_exists(p.binary);
            if present {
                tracing::info!("{} is already installed", p.binary);
            }
            !present
        })
        .collect();

    if !missing.is_empty() {
        apt_install(runner, missing.iter().flat_map(|p| p.packages.iter().copied()))?;
    }

    ensure_docker(runner)?;

    tracing::info!("prerequisites OK");
    Ok(())
}

/// Install a single tool if it is not on PATH yet.
pub fn ensure(runner: &dyn CommandRunner, prerequisite: &Prerequisite) -> ProvisionResult<()> {
    if runner.command_exists(prerequisite.binary) {
        return Ok(());
    }
    apt_install(runner, prerequisite.packages.iter().copied())
}

fn ensure_docker(runner: &dyn CommandRunner) -> ProvisionResult<()> {
    if runner.command_exists("docker") {
        tracing::info!("docker is already installed");
    } else {
        tracing::info!("installing docker");
        runner
            .run_pipeline(DOCKER_INSTALL)
            .map_err(|e| install_error("docker", &e))?;
        runner
            .run("systemctl", &["enable", "--now", "docker"])
            .map_err(|e| install_error("docker", &e))?;
    }

    if runner.run("docker", &["compose", "version"]).is_err() {
        tracing::info!("installing docker compose plugin");
        apt_install(runner, ["docker-compose-plugin"])?;
    }

    Ok(())
}

fn apt_install<'a>(
    runner: &dyn CommandRunner,
    packages: impl IntoIterator<Item = &'a str>,
) -> ProvisionResult<()> {
    let packages: Vec<&str> = packages.into_iter().collect();
    let list = packages.join(" ");
    tracing::info!("installing {list}");

    runner
        .run("apt-get", &["update"])
        .map_err(|e| install_error(&list, &e))?;

    let mut args = APT_ENV.to_vec();
    args.extend(["apt-get", "install", "-y"]);
    args.extend(packages.iter().copied());
    runner
        .run_interactive("env", &args)
        .map_err(|e| install_error(&list, &e))
}

fn install_error(what: &str, source: &ProvisionError) -> ProvisionError {
    ProvisionError::PrerequisiteInstall(format!("{what}: {}", source.detail()))
}
