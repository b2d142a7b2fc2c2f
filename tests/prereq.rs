mod common;

use common::{APT_INSTALL, ScriptedRunner};
use n8n_provision::error::ProvisionError;
use n8n_provision::prereq;

#[test]
fn nothing_installed_when_everything_present() {
    let runner = ScriptedRunner::default();

    prereq::install(&runner).unwrap();

    assert!(!runner.called("apt-get"));
    assert!(!runner.called(APT_INSTALL));
    assert!(!runner.called("sh -c"));
    assert!(runner.called("docker compose version"));
}

#[test]
fn installs_only_missing_packages() {
    let runner = ScriptedRunner::default().missing("nginx").missing("certbot");

    prereq::install(&runner).unwrap();

    assert_eq!(runner.count("apt-get update"), 1);
    assert!(runner.called(&format!(
        "{APT_INSTALL} nginx certbot python3-certbot-nginx"
    )));
    assert!(!runner.called(&format!("{APT_INSTALL} dnsutils")));
}

#[test]
fn installs_docker_with_convenience_script() {
    let runner = ScriptedRunner::default().missing("docker");

    prereq::install(&runner).unwrap();

    assert!(runner.called("sh -c curl -fsSL https://get.docker.com | sh"));
    assert!(runner.called("systemctl enable --now docker"));
}

#[test]
fn installs_compose_plugin_when_missing() {
    let runner = ScriptedRunner::default().fail("docker compose version", "unknown command");

    prereq::install(&runner).unwrap();

    assert!(runner.called(&format!("{APT_INSTALL} docker-compose-plugin")));
}

#[test]
fn apt_failure_is_prerequisite_error() {
    let runner = ScriptedRunner::default()
        .missing("certbot")
        .fail(APT_INSTALL, "E: Unable to locate package");

    let err = prereq::install(&runner).unwrap_err();

    assert!(matches!(err, ProvisionError::PrerequisiteInstall(_)));
    assert!(err.to_string().contains("certbot"));
}

#[test]
fn ensure_skips_present_tool() {
    let runner = ScriptedRunner::default();

    prereq::ensure(&runner, &prereq::DIG).unwrap();

    assert!(runner.calls().is_empty());
}

#[test]
fn apt_list_covers_proxy_tls_and_dns_tools() {
    let binaries: Vec<&str> = prereq::APT_PREREQUISITES.iter().map(|p| p.binary).collect();

    assert_eq!(binaries, vec!["nginx", "certbot", "dig"]);
}

#[test]
fn apt_install_never_prompts() {
    let runner = ScriptedRunner::default().missing("nginx");

    prereq::install(&runner).unwrap();

    let install = runner
        .calls()
        .into_iter()
        .find(|c| c.contains("apt-get install"))
        .unwrap();
    assert!(install.starts_with("env DEBIAN_FRONTEND=noninteractive "));
    assert!(install.contains("NEEDRESTART_MODE=a"));
}
