use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::models::metric::CostMetric;
use crate::core::period::BoundaryOffsets;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// What to do when the caller identity cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityPolicy {
    /// Log the failure and report with an empty account id.
    Lenient,
    /// Abort the run.
    Strict,
}

impl IdentityPolicy {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "lenient" => Some(Self::Lenient),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingSettings {
    #[serde(default = "default_metric")]
    pub metric: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_total_end_offset")]
    pub total_end_offset_days: u32,
    #[serde(default)]
    pub services_end_offset_days: u32,
    #[serde(default = "default_identity_policy")]
    pub identity_policy: String,
}

fn default_metric() -> String {
    "unblended".to_string()
}
fn default_region() -> String {
    "ap-northeast-1".to_string()
}
fn default_total_end_offset() -> u32 {
    1
}
fn default_identity_policy() -> String {
    "lenient".to_string()
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            metric: default_metric(),
            region: default_region(),
            total_end_offset_days: default_total_end_offset(),
            services_end_offset_days: 0,
            identity_policy: default_identity_policy(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifySettings {
    #[serde(default = "default_webhook_parameter")]
    pub webhook_parameter: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_icon_emoji")]
    pub icon_emoji: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_webhook_parameter() -> String {
    "NotifyAwsBillingToSlack.WebHookUrl".to_string()
}
fn default_username() -> String {
    "aws-cost-and-usage-report (webhook)".to_string()
}
fn default_icon_emoji() -> String {
    ":aws-cost-and-usage-report:".to_string()
}
fn default_color() -> String {
    "good".to_string()
}
fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            webhook_parameter: default_webhook_parameter(),
            username: default_username(),
            icon_emoji: default_icon_emoji(),
            color: default_color(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub billing: BillingSettings,
    #[serde(default)]
    pub notify: NotifySettings,
}

/// Validated, typed view of the billing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSettings {
    pub metric: CostMetric,
    pub offsets: BoundaryOffsets,
    pub identity_policy: IdentityPolicy,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("billing-notify").join("config.toml")
    }

    /// Load config from `path`, or from the default path when none is given.
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::config_path();
                if !default_path.exists() {
                    return Ok(Self::default());
                }
                default_path
            }
        };
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Serialize and write this config to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if CostMetric::from_id(&self.billing.metric).is_none() {
            let known: Vec<&str> = CostMetric::all().iter().map(|m| m.id()).collect();
            issues.push(format!(
                "Invalid metric: '{}' (must be one of: {})",
                self.billing.metric,
                known.join(", ")
            ));
        }
        if IdentityPolicy::from_id(&self.billing.identity_policy).is_none() {
            issues.push(format!(
                "Invalid identity_policy: '{}' (must be 'lenient' or 'strict')",
                self.billing.identity_policy
            ));
        }
        if self.billing.region.trim().is_empty() {
            issues.push("region must not be empty".to_string());
        }
        if self.notify.webhook_parameter.trim().is_empty() {
            issues.push("webhook_parameter must not be empty".to_string());
        }
        if self.notify.username.trim().is_empty() {
            issues.push("username must not be empty".to_string());
        }
        issues
    }

    pub fn job_settings(&self) -> Result<JobSettings, ConfigError> {
        let issues = self.validate();
        if !issues.is_empty() {
            return Err(ConfigError::Invalid(issues));
        }
        // validate() guarantees both parse
        let metric = CostMetric::from_id(&self.billing.metric).unwrap_or_default();
        let identity_policy = IdentityPolicy::from_id(&self.billing.identity_policy)
            .unwrap_or(IdentityPolicy::Lenient);
        Ok(JobSettings {
            metric,
            offsets: BoundaryOffsets {
                total_end_days: self.billing.total_end_offset_days,
                services_end_days: self.billing.services_end_offset_days,
            },
            identity_policy,
        })
    }
}
