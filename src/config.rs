use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{Result, VrtError};

/// Relative path of the optional configuration file.
pub const CONFIG_FILE_PATH: &str = "vrt.json";

const ENV_API_URL: &str = "VRT_APIURL";
const ENV_BRANCH_NAME: &str = "VRT_BRANCHNAME";
const ENV_BASELINE_BRANCH_NAME: &str = "VRT_BASELINEBRANCHNAME";
const ENV_PROJECT: &str = "VRT_PROJECT";
const ENV_API_KEY: &str = "VRT_APIKEY";
const ENV_CI_BUILD_ID: &str = "VRT_CIBUILDID";
const ENV_ENABLE_SOFT_ASSERT: &str = "VRT_ENABLESOFTASSERT";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub api_url: String,
    pub branch_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_branch_name: Option<String>,
    pub project: String,
    pub api_key: String,
    #[serde(default)]
    pub enable_soft_assert: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_build_id: Option<String>,
}

/// One source of configuration values; unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigLayer {
    pub api_url: Option<String>,
    pub branch_name: Option<String>,
    pub baseline_branch_name: Option<String>,
    pub project: Option<String>,
    pub api_key: Option<String>,
    pub enable_soft_assert: Option<bool>,
    pub ci_build_id: Option<String>,
}

impl ConfigLayer {
    /// Read a layer from a JSON file. A missing file, or JSON that is not an
    /// object, yields `None`.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&raw).map_err(|e| {
            VrtError::config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        if !value.is_object() {
            tracing::debug!(path = %path.display(), "config file is not a JSON object, skipping");
            return Ok(None);
        }
        let layer: ConfigLayer = serde_json::from_value(value).map_err(|e| {
            VrtError::config(format!("Invalid config {}: {}", path.display(), e))
        })?;
        Ok(Some(layer.without_empty()))
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a layer from `VRT_*` variables resolved through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            api_url: read(ENV_API_URL),
            branch_name: read(ENV_BRANCH_NAME),
            baseline_branch_name: read(ENV_BASELINE_BRANCH_NAME),
            project: read(ENV_PROJECT),
            api_key: read(ENV_API_KEY),
            enable_soft_assert: lookup(ENV_ENABLE_SOFT_ASSERT).map(|v| v == "true"),
            ci_build_id: read(ENV_CI_BUILD_ID),
        }
    }

    fn without_empty(self) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            api_url: keep(self.api_url),
            branch_name: keep(self.branch_name),
            baseline_branch_name: keep(self.baseline_branch_name),
            project: keep(self.project),
            api_key: keep(self.api_key),
            enable_soft_assert: self.enable_soft_assert,
            ci_build_id: keep(self.ci_build_id),
        }
    }

    /// Overlay the values set in `self` on top of `config`.
    pub fn apply(self, config: &mut Config) {
        if let Some(v) = self.api_url {
            config.api_url = v;
        }
        if let Some(v) = self.branch_name {
            config.branch_name = v;
        }
        if let Some(v) = self.baseline_branch_name {
            config.baseline_branch_name = Some(v);
        }
        if let Some(v) = self.project {
            config.project = v;
        }
        if let Some(v) = self.api_key {
            config.api_key = v;
        }
        if let Some(v) = self.enable_soft_assert {
            config.enable_soft_assert = v;
        }
        if let Some(v) = self.ci_build_id {
            config.ci_build_id = Some(v);
        }
    }
}

impl Config {
    /// Resolve configuration from `vrt.json` in the working directory and the
    /// environment.
    pub fn load() -> Result<Self> {
        Self::resolve(None, Some(Path::new(CONFIG_FILE_PATH)), ConfigLayer::from_env())
    }

    /// Resolve with precedence explicit > file > environment, then validate.
    pub fn resolve(
        explicit: Option<Config>,
        file: Option<&Path>,
        env: ConfigLayer,
    ) -> Result<Self> {
        let config = match explicit {
            Some(config) => config,
            None => {
                let mut config = Config::default();
                env.apply(&mut config);
                if let Some(layer) = file.map(ConfigLayer::from_file).transpose()?.flatten() {
                    layer.apply(&mut config);
                }
                config
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("apiKey", &self.api_key),
            ("branchName", &self.branch_name),
            ("apiUrl", &self.api_url),
            ("project", &self.project),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(VrtError::config(format!("{field} is not specified")));
        }
        Url::parse(&self.api_url)?;
        Ok(())
    }
}
