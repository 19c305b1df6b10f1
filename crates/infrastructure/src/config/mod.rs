//! Worker configuration: structs, parsing, and validation.
//!
//! Tenants and runbooks are externally authored, read-only data; the worker
//! loads them from the YAML config at startup. Runbook filters and actions
//! are structured values here, parsed once into their typed domain form.

mod common;

pub use common::ConfigError;

use std::path::Path;

use domain::common::entity::{Tenant, TenantId};
use domain::runbook::config::{FindingFilter, RunbookActions, RunbookConfig};
use domain::runbook::entity::Runbook;
use domain::ticket::walker::{DEFAULT_MAX_WALK_STEPS, WalkPolicy};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_INDEX_URL, DEFAULT_LINK_STORE_PATH, DEFAULT_VENDOR_API_URL, JOB_CHANNEL_CAPACITY,
};
use common::{default_true, warn_if_world_readable};

// ── Top-level config ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    #[serde(default)]
    pub worker: WorkerSection,

    #[serde(default)]
    pub workflow: WorkflowSection,

    pub tenants: Vec<TenantEntry>,

    #[serde(default)]
    pub runbooks: Vec<RunbookEntry>,
}

impl WorkerConfig {
    /// Load config from a YAML file.
    ///
    /// On Unix, logs a warning if the file is world-readable, since it
    /// carries vendor and tracker credentials.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        warn_if_world_readable(path, "config file");
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Return a copy with credentials masked, safe for logging.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let mut sanitized = self.clone();
        for tenant in &mut sanitized.tenants {
            tenant.access_token = "***".to_string();
            tenant.tracker_token = "***".to_string();
        }
        sanitized
    }

    /// Validate the config after deserialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workflow.max_steps == 0 {
            return Err(ConfigError::Validation {
                field: "workflow.max_steps".to_string(),
                message: "step cap must be at least 1".to_string(),
            });
        }

        let mut tenant_ids = Vec::new();
        for (idx, tenant) in self.tenants.iter().enumerate() {
            tenant.validate(idx)?;
            if tenant_ids.contains(&tenant.id) {
                return Err(ConfigError::Validation {
                    field: format!("tenants[{idx}].id"),
                    message: format!("duplicate tenant id '{}'", tenant.id),
                });
            }
            tenant_ids.push(tenant.id.clone());
        }

        let mut runbook_ids = Vec::new();
        for (idx, runbook) in self.runbooks.iter().enumerate() {
            if runbook.runbook_id.is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("runbooks[{idx}].runbook_id"),
                    message: "runbook id must not be empty".to_string(),
                });
            }
            if runbook_ids.contains(&runbook.runbook_id) {
                return Err(ConfigError::Validation {
                    field: format!("runbooks[{idx}].runbook_id"),
                    message: format!("duplicate runbook id '{}'", runbook.runbook_id),
                });
            }
            runbook_ids.push(runbook.runbook_id.clone());

            if !tenant_ids.contains(&runbook.tenant_id) {
                return Err(ConfigError::Validation {
                    field: format!("runbooks[{idx}].tenant_id"),
                    message: format!("unknown tenant id '{}'", runbook.tenant_id),
                });
            }
        }

        Ok(())
    }

    /// Convert tenant entries to domain tenants.
    pub fn tenants(&self) -> Vec<Tenant> {
        self.tenants.iter().map(TenantEntry::to_domain).collect()
    }

    /// Convert runbook entries to domain runbooks.
    pub fn runbooks(&self) -> Vec<Runbook> {
        self.runbooks.iter().map(RunbookEntry::to_domain).collect()
    }

    /// Convert runbook entries to their typed configs.
    pub fn runbook_configs(&self) -> Vec<RunbookConfig> {
        self.runbooks.iter().map(RunbookEntry::to_config).collect()
    }

    pub fn walk_policy(&self) -> WalkPolicy {
        WalkPolicy {
            max_steps: self.workflow.max_steps,
        }
    }
}

// ── Worker section ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSection {
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Base URL of the vendor alert API.
    #[serde(default = "default_vendor_api_url")]
    pub vendor_api_url: String,

    /// Base URL of the index store holding canonical findings.
    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Path of the embedded ticket-link database.
    #[serde(default = "default_link_store_path")]
    pub link_store_path: String,

    /// Capacity of the inbound job channel.
    #[serde(default = "default_job_channel_capacity")]
    pub job_channel_capacity: usize,
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            vendor_api_url: default_vendor_api_url(),
            index_url: default_index_url(),
            link_store_path: default_link_store_path(),
            job_channel_capacity: default_job_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorkflowSection {
    /// Maximum transitions applied per ticket walk before giving up.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}
fn default_log_format() -> LogFormat {
    LogFormat::Json
}
fn default_vendor_api_url() -> String {
    DEFAULT_VENDOR_API_URL.to_string()
}
fn default_index_url() -> String {
    DEFAULT_INDEX_URL.to_string()
}
fn default_link_store_path() -> String {
    DEFAULT_LINK_STORE_PATH.to_string()
}
fn default_job_channel_capacity() -> usize {
    JOB_CHANNEL_CAPACITY
}
fn default_max_steps() -> usize {
    DEFAULT_MAX_WALK_STEPS
}

// ── Tenant entries ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantEntry {
    pub id: String,
    pub access_token: String,
    pub owner: String,
    pub repo: String,
    pub index: String,
    pub tracker_site: String,
    pub project_key: String,
    pub tracker_user: String,
    pub tracker_token: String,
}

impl TenantEntry {
    fn validate(&self, idx: usize) -> Result<(), ConfigError> {
        let fields = [
            ("id", &self.id),
            ("access_token", &self.access_token),
            ("owner", &self.owner),
            ("repo", &self.repo),
            ("index", &self.index),
            ("tracker_site", &self.tracker_site),
            ("project_key", &self.project_key),
            ("tracker_user", &self.tracker_user),
            ("tracker_token", &self.tracker_token),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("tenants[{idx}].{name}"),
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    fn to_domain(&self) -> Tenant {
        Tenant {
            id: TenantId(self.id.clone()),
            access_token: self.access_token.clone(),
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            index: self.index.clone(),
            tracker_site: self.tracker_site.clone(),
            project_key: self.project_key.clone(),
            tracker_user: self.tracker_user.clone(),
            tracker_token: self.tracker_token.clone(),
        }
    }
}

// ── Runbook entries ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunbookEntry {
    pub runbook_id: String,
    pub tenant_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub trigger: String,
    #[serde(default)]
    pub filters: FindingFilter,
    #[serde(default)]
    pub actions: RunbookActions,
}

impl RunbookEntry {
    fn to_domain(&self) -> Runbook {
        Runbook {
            runbook_id: self.runbook_id.clone(),
            tenant_id: TenantId(self.tenant_id.clone()),
            name: self.name.clone(),
            enabled: self.enabled,
        }
    }

    fn to_config(&self) -> RunbookConfig {
        RunbookConfig {
            runbook_id: self.runbook_id.clone(),
            trigger: self.trigger.clone(),
            filter: self.filters.clone(),
            actions: self.actions.clone(),
        }
    }
}

// ── Log level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(format!(
                "invalid log level '{s}': expected error|warn|info|debug|trace"
            )),
        }
    }
}

// ── Log format ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "pretty" => Ok(Self::Text),
            _ => Err(format!("invalid log format '{s}': expected json|text")),
        }
    }
}
