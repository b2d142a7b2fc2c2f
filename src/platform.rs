use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::cmd::CommandRunner;
use crate::error::{ProvisionError, ProvisionResult};

/// Parse `os-release` content into key-value pairs.
#[must_use]
pub fn parse_os_release(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim_matches('"');
            map.insert(key.to_string(), value.to_string());
        }
    }
    map
}

/// Ensure the host runs Ubuntu.
pub fn ensure_ubuntu(os_release: &Path) -> ProvisionResult<()> {
    let content = fs::read_to_string(os_release).map_err(|e| {
        ProvisionError::UnsupportedPlatform(format!(
            "cannot read {}: {e}",
            os_release.display()
        ))
    })?;

    let release = parse_os_release(&content);
    let id = release.get("ID").map_or("unknown", String::as_str);
    if id != "ubuntu" {
        return Err(ProvisionError::UnsupportedPlatform(format!(
            "only Ubuntu is supported (detected OS: {id})"
        )));
    }

    let version = release.get("VERSION_ID").map_or("unknown", String::as_str);
    tracing::info!("detected Ubuntu ({version})");
    Ok(())
}

/// Ensure the process runs with root privileges.
pub fn ensure_root(runner: &dyn CommandRunner) -> ProvisionResult<()> {
    let uid = runner.run("id", &["-u"])?;
    if uid.trim() != "0" {
        return Err(ProvisionError::PermissionDenied(
            "must run as root (try: sudo n8n-provision ...)".into(),
        ));
    }
    Ok(())
}
