use std::collections::HashMap;

use serde::Deserialize;

use calguard_core::error::{GuardError, Result};
use calguard_core::limits::{MAX_COLLECTIONS_KEY, SETTINGS_NAMESPACE, UNLIMITED_SENTINEL};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    /// Integer settings: namespace -> key -> value.
    #[serde(default)]
    pub settings: HashMap<String, HashMap<String, i64>>,

    #[serde(default)]
    pub directory: DirectorySection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GuardError::UnsupportedVersion);
        }

        self.gateway.validate()?;

        if let Some(max) = self
            .settings
            .get(SETTINGS_NAMESPACE)
            .and_then(|ns| ns.get(MAX_COLLECTIONS_KEY))
        {
            if *max < UNLIMITED_SENTINEL {
                return Err(GuardError::BadRequest(format!(
                    "settings.{SETTINGS_NAMESPACE}.{MAX_COLLECTIONS_KEY} must be -1 (unlimited) or >= 0"
                )));
            }
        }

        if self.directory.actors.iter().any(|a| a.is_empty() || a.contains('/')) {
            return Err(GuardError::BadRequest(
                "directory.actors entries must be non-empty and contain no '/'".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path prefix stripped before classification.
    #[serde(default = "default_mount")]
    pub mount: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            mount: default_mount(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !self.mount.starts_with('/') || (self.mount.len() > 1 && self.mount.ends_with('/')) {
            return Err(GuardError::BadRequest(
                "gateway.mount must start with '/' and not end with '/'".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_mount() -> String {
    "/dav".into()
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DirectorySection {
    /// Actor uids known to the in-memory resolver.
    #[serde(default)]
    pub actors: Vec<String>,
}
