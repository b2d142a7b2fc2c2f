use crate::config::{DeploymentConfig, Mode, Settings};

/// Prefix marking a value the operator still has to fill in.
pub const PLACEHOLDER_PREFIX: &str = "CHANGE_ME_";

pub const DB_USER: &str = "DB_USER";
pub const DB_PASSWORD: &str = "DB_PASSWORD";
pub const DB_DATABASE: &str = "DB_DATABASE";
pub const DB_HOST: &str = "DB_HOST";
pub const DB_PORT: &str = "DB_PORT";
pub const N8N_HOST: &str = "N8N_HOST";
pub const WEBHOOK_URL: &str = "WEBHOOK_URL";

/// Ordered `KEY=value` pairs making up the secret/config file read
/// by docker compose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    pub entries: Vec<(String, String)>,
}

impl EnvFile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, replacing an earlier value for the same key.
    #[must_use]
    pub fn set(mut self, key: &str, value: &str) -> Self {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value.to_string();
        } else {
            self.entries.push((key.to_string(), value.to_string()));
        }
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Keys whose value is still a placeholder.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, v)| v.starts_with(PLACEHOLDER_PREFIX))
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Copy with the named keys' values masked, for display.
    #[must_use]
    pub fn redacted(&self, keys: &[&str]) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(k, v)| {
                let value = if keys.contains(&k.as_str()) {
                    "<redacted>".to_string()
                } else {
                    v.clone()
                };
                (k.clone(), value)
            })
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("# Generated by n8n-provision. Keep this file private.\n");
        for (k, v) in &self.entries {
            out.push_str(k);
            out.push('=');
            out.push_str(v);
            out.push('\n');
        }
        out
    }

    /// Parse `KEY=value` lines, skipping blanks and `#` comments.
    /// Values keep everything after the first `=`.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter_map(|l| l.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        Self { entries }
    }
}

/// Build the secret file for the configured mode.
#[must_use]
pub fn for_config(config: &DeploymentConfig, settings: &Settings) -> EnvFile {
    let env = match config.mode() {
        Mode::Dev => EnvFile::new()
            .set(DB_USER, &settings.db_user)
            .set(DB_PASSWORD, config.db_password().unwrap_or_default())
            .set(DB_DATABASE, &settings.db_name),
        Mode::Live => EnvFile::new()
            .set(DB_HOST, &placeholder(DB_HOST))
            .set(DB_PORT, &placeholder(DB_PORT))
            .set(DB_USER, &placeholder(DB_USER))
            .set(DB_PASSWORD, &placeholder(DB_PASSWORD))
            .set(DB_DATABASE, &settings.db_name),
    };

    env.set(N8N_HOST, config.domain())
        .set(WEBHOOK_URL, &config.webhook_url())
}

fn placeholder(key: &str) -> String {
    format!("{PLACEHOLDER_PREFIX}{key}")
}
