//! Policy configuration loading and compilation.

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Env var overriding the config file location (useful for testing).
pub const CONFIG_ENV: &str = "GOVERNANCE_HOOK_CONFIG";

/// Env var overriding the audit log location (useful for testing).
pub const AUDIT_LOG_ENV: &str = "GOVERNANCE_HOOK_AUDIT_LOG";

/// Env var independently supplying the remote collector URL.
pub const AUDIT_ENDPOINT_ENV: &str = "GOVERNANCE_AUDIT_ENDPOINT";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Built-in PII categories, in redaction priority order. These are never
/// removable; user patterns only add new categories after them.
const BUILTIN_PII: &[(&str, &str)] = &[
    ("EMAIL", r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"),
    ("SSN", r"\b\d{3}-\d{2}-\d{4}\b"),
    ("CREDIT_CARD", r"\b\d(?:[ -]?\d){12,15}\b"),
];

/// Built-in high-risk keywords, scanned in order.
const BUILTIN_KEYWORDS: &[&str] = &[
    "confidential",
    "secret",
    "hr decision",
    "medical diagnosis",
    "financial advice",
];

/// HITL behavior for high-risk prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitlMode {
    /// Deny high-risk prompts outright.
    #[default]
    Block,
    /// Ask a human on the controlling terminal.
    Interactive,
}

/// Raw on-disk configuration. All fields are optional; an absent or
/// malformed file falls back to defaults silently.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PolicyConfig {
    /// Extra PII categories: name -> regex pattern.
    pub pii_patterns: BTreeMap<String, String>,

    /// Extra high-risk keywords, appended after the built-in list.
    pub high_risk_keywords: Vec<String>,

    /// HITL behavior for high-risk prompts.
    pub hitl_mode: HitlMode,

    /// Remote audit collector URL.
    pub audit_endpoint: Option<String>,

    /// Bearer token for the collector.
    pub audit_token: Option<String>,

    /// Local audit log path override.
    pub audit_log_path: Option<String>,
}

/// Compiled configuration with pre-built regexes and resolved paths.
/// Constructed once per process and passed explicitly into every
/// component call.
pub struct CompiledPolicy {
    /// PII categories in redaction priority order: built-ins first, then
    /// user categories in sorted-name order.
    pub pii_categories: Vec<(String, Regex)>,

    /// High-risk keywords, lowercased, scanned in order.
    pub high_risk_keywords: Vec<String>,

    /// HITL behavior for high-risk prompts.
    pub hitl_mode: HitlMode,

    /// Remote audit collector URL, if any.
    pub audit_endpoint: Option<String>,

    /// Bearer token for the collector, if any.
    pub audit_token: Option<String>,

    /// Resolved local audit log path.
    pub audit_log_path: PathBuf,
}

impl PolicyConfig {
    /// Load the per-user config. Any failure falls back to defaults;
    /// configuration problems never abort startup.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::from_file(&path).unwrap_or_default()
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// User config path: ~/.claude/governance.json unless overridden.
    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|h| h.join(".claude/governance.json"))
    }

    /// Compile patterns and resolve paths. Never fails: an invalid user
    /// regex is skipped, leaving the remaining categories intact.
    pub fn compile(self) -> CompiledPolicy {
        let mut pii_categories: Vec<(String, Regex)> = BUILTIN_PII
            .iter()
            .filter_map(|(name, pattern)| {
                Regex::new(pattern).ok().map(|re| ((*name).to_string(), re))
            })
            .collect();

        for (name, pattern) in &self.pii_patterns {
            let tag = name.to_uppercase();
            if pii_categories.iter().any(|(existing, _)| *existing == tag) {
                continue; // Built-ins are not overridable
            }
            if let Ok(re) = Regex::new(pattern) {
                pii_categories.push((tag, re));
            }
            // Invalid user patterns are skipped; detection still runs
        }

        let mut high_risk_keywords: Vec<String> =
            BUILTIN_KEYWORDS.iter().map(|k| k.to_string()).collect();
        high_risk_keywords.extend(self.high_risk_keywords.iter().map(|k| k.to_lowercase()));

        let audit_endpoint = std::env::var(AUDIT_ENDPOINT_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .or(self.audit_endpoint);

        let audit_log_path = std::env::var(AUDIT_LOG_ENV)
            .ok()
            .map(PathBuf::from)
            .or_else(|| self.audit_log_path.as_ref().map(PathBuf::from))
            .or_else(|| dirs::home_dir().map(|h| h.join(".claude/governance_audit.log")))
            .unwrap_or_else(|| PathBuf::from("governance_audit.log"));

        CompiledPolicy {
            pii_categories,
            high_risk_keywords,
            hitl_mode: self.hitl_mode,
            audit_endpoint,
            audit_token: self.audit_token,
            audit_log_path,
        }
    }
}
