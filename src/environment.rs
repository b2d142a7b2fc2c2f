use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use crate::compose;
use crate::config::{DeploymentConfig, Settings};
use crate::envfile::{self, EnvFile};
use crate::error::{ProvisionError, ProvisionResult};

/// What the working directory holds before a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentState {
    /// Neither file exists.
    Clean,
    /// Both files exist: a previous run generated them.
    Complete,
    /// Only one of the two exists.
    Partial(Vec<PathBuf>),
}

/// The descriptor and secret file contents for one deployment.
#[derive(Debug, Clone)]
pub struct EnvironmentFiles {
    pub compose: String,
    pub env: EnvFile,
}

impl EnvironmentFiles {
    #[must_use]
    pub fn render(config: &DeploymentConfig, settings: &Settings) -> Self {
        Self {
            compose: compose::render(config.mode(), settings),
            env: envfile::for_config(config, settings),
        }
    }
}

/// Inspect the working directory for a previous deployment.
#[must_use]
pub fn detect(settings: &Settings) -> EnvironmentState {
    let existing = existing_files(settings);
    match existing.len() {
        0 => EnvironmentState::Clean,
        2 => EnvironmentState::Complete,
        _ => EnvironmentState::Partial(existing),
    }
}

/// Write both files into the working directory. Fails without
/// touching anything if either file is already there.
pub fn generate(
    config: &DeploymentConfig,
    settings: &Settings,
) -> ProvisionResult<EnvironmentFiles> {
    let existing = existing_files(settings);
    if !existing.is_empty() {
        return Err(ProvisionError::ExistingDeployment(existing));
    }

    let files = EnvironmentFiles::render(config, settings);

    fs::create_dir_all(&settings.work_dir)?;

    let compose_path = settings.compose_path();
    tracing::info!("writing {}", compose_path.display());
    write_new(&compose_path, &files.compose, 0o644)?;

    let env_path = settings.env_path();
    tracing::info!("writing {} ({} mode)", env_path.display(), config.mode());
    if let Err(e) = write_new(&env_path, &files.env.render(), 0o600) {
        if let Err(cleanup) = fs::remove_file(&compose_path) {
            tracing::warn!(
                "could not remove {} after failed write: {cleanup}",
                compose_path.display()
            );
        }
        return Err(e);
    }

    Ok(files)
}

/// Read back the secret file of an existing deployment.
pub fn load_env(settings: &Settings) -> ProvisionResult<EnvFile> {
    let content = fs::read_to_string(settings.env_path())?;
    Ok(EnvFile::parse(&content))
}

/// Keys in the existing secret file that still hold a
/// `CHANGE_ME_` placeholder. Decided by file content alone, so a
/// re-run in either mode sees the same answer.
pub fn pending_placeholders(settings: &Settings) -> ProvisionResult<Vec<String>> {
    let env = load_env(settings)?;
    Ok(env.placeholders().into_iter().map(str::to_string).collect())
}

fn existing_files(settings: &Settings) -> Vec<PathBuf> {
    [settings.compose_path(), settings.env_path()]
        .into_iter()
        .filter(|p| p.exists())
        .collect()
}

fn write_new(path: &Path, content: &str, mode: u32) -> ProvisionResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(mode)
        .open(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
