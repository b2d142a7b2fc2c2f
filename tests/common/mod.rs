#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use n8n_provision::Settings;
use n8n_provision::cmd::{CommandRunner, format_command};
use n8n_provision::error::{ProvisionError, ProvisionResult};

pub const PUBLIC_IP: &str = "203.0.113.10";

/// How package installs appear in the call log.
pub const APT_INSTALL: &str = "env DEBIAN_FRONTEND=noninteractive NEEDRESTART_MODE=a apt-get install -y";

pub const UBUNTU_OS_RELEASE: &str = "\
NAME=\"Ubuntu\"
VERSION_ID=\"24.04\"
ID=ubuntu
ID_LIKE=debian
";

#[derive(Default)]
struct State {
    calls: Vec<String>,
    responses: Vec<(String, Result<String, String>)>,
    missing: HashSet<String>,
}

/// Records every command and answers from a script. Unscripted
/// commands succeed with empty output; every binary exists unless
/// marked missing. Later rules win over earlier ones.
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    state: Rc<RefCell<State>>,
}

impl ScriptedRunner {
    /// A runner for a healthy Ubuntu host running as root whose
    /// DNS already points at it.
    pub fn healthy_host() -> Self {
        Self::default()
            .respond("id -u", "0")
            .respond("curl", &format!("{{\"ip\":\"{PUBLIC_IP}\"}}"))
            .respond("dig +short A", PUBLIC_IP)
    }

    pub fn respond(self, prefix: &str, stdout: &str) -> Self {
        self.state
            .borrow_mut()
            .responses
            .push((prefix.to_string(), Ok(stdout.to_string())));
        self
    }

    pub fn fail(self, prefix: &str, stderr: &str) -> Self {
        self.state
            .borrow_mut()
            .responses
            .push((prefix.to_string(), Err(stderr.to_string())));
        self
    }

    pub fn missing(self, binary: &str) -> Self {
        self.state.borrow_mut().missing.insert(binary.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.position(prefix).is_some()
    }

    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.state
            .borrow()
            .calls
            .iter()
            .position(|c| c.starts_with(prefix))
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn answer(&self, program: &str, args: &[&str]) -> ProvisionResult<String> {
        let command = format_command(program, args);
        let mut state = self.state.borrow_mut();
        state.calls.push(command.clone());

        let rule = state
            .responses
            .iter()
            .rev()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, r)| r.clone());

        match rule {
            Some(Ok(stdout)) => Ok(stdout),
            Some(Err(stderr)) => Err(ProvisionError::CommandFailed {
                command,
                code: Some(1),
                stderr,
            }),
            None => Ok(String::new()),
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str]) -> ProvisionResult<String> {
        self.answer(program, args)
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> ProvisionResult<()> {
        self.answer(program, args).map(|_| ())
    }

    fn command_exists(&self, program: &str) -> bool {
        !self.state.borrow().missing.contains(program)
    }
}

/// Settings rooted in a scratch directory: working dir, Nginx
/// trees with a stock `default` site, and an Ubuntu os-release.
pub fn scratch_settings(root: &Path) -> Settings {
    let available = root.join("nginx/sites-available");
    let enabled = root.join("nginx/sites-enabled");
    fs::create_dir_all(&available).unwrap();
    fs::create_dir_all(&enabled).unwrap();
    fs::write(available.join("default"), "server { listen 80 default_server; }\n").unwrap();
    std::os::unix::fs::symlink(available.join("default"), enabled.join("default")).unwrap();

    let os_release = root.join("os-release");
    fs::write(&os_release, UBUNTU_OS_RELEASE).unwrap();

    Settings::new()
        .work_dir(root.join("work"))
        .nginx_dirs(available, enabled)
        .os_release(os_release)
        .public_ip_url("https://ip.test/?format=json")
}
