//! Durable local audit logging and best-effort remote forwarding.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::config::CompiledPolicy;
use crate::risk::RiskLevel;

/// Timeout for the remote collector POST. The decision path must never
/// wait on a slow or unreachable collector.
const FORWARD_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors from the local audit log, the system's one durability guarantee.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("cannot write audit log: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot serialize audit entry: {0}")]
    Json(#[from] serde_json::Error),
}

/// How the policy engine disposed of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Allowed,
    Blocked,
    Approved,
    Denied,
}

/// One write-once audit record, serialized as a single JSON line.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub event_type: &'static str,
    pub risk_level: RiskLevel,
    pub decision: Verdict,
    /// Opaque event-specific payload.
    pub details: Value,
    pub model_version: String,
}

impl AuditEntry {
    /// Env var carrying the model version tag stamped on every entry.
    pub const MODEL_VERSION_ENV: &'static str = "CLAUDE_MODEL_VERSION";

    pub fn new(
        event_type: &'static str,
        risk_level: RiskLevel,
        decision: Verdict,
        details: Value,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            risk_level,
            decision,
            details,
            model_version: std::env::var(Self::MODEL_VERSION_ENV)
                .unwrap_or_else(|_| "unknown".to_string()),
        }
    }
}

/// Append-only local log plus an optional remote collector.
pub struct AuditSink {
    path: PathBuf,
    endpoint: Option<String>,
    token: Option<String>,
}

impl AuditSink {
    pub fn new(path: PathBuf, endpoint: Option<String>, token: Option<String>) -> Self {
        Self {
            path,
            endpoint,
            token,
        }
    }

    pub fn from_policy(policy: &CompiledPolicy) -> Self {
        Self::new(
            policy.audit_log_path.clone(),
            policy.audit_endpoint.clone(),
            policy.audit_token.clone(),
        )
    }

    /// Append the entry locally, then forward best-effort. Local failure is
    /// the one fatal sink condition; a failed forward is recorded locally
    /// as a secondary entry and otherwise swallowed. No retries.
    pub fn record(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        self.append_local(entry)?;

        if let Some(endpoint) = &self.endpoint {
            if let Err(reason) = self.forward(endpoint, entry) {
                let failure = AuditEntry::new(
                    "AUDIT_FORWARD_FAILURE",
                    RiskLevel::Low,
                    Verdict::Allowed,
                    json!({"endpoint": endpoint, "error": reason}),
                );
                // Local-only; a dead collector must not cascade
                let _ = self.append_local(&failure);
            }
        }

        Ok(())
    }

    /// Open-append-close per entry so overlapping invocations interleave
    /// whole lines, never partial ones.
    fn append_local(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Single bounded-timeout POST. Response body ignored; only
    /// success/failure matters.
    fn forward(&self, endpoint: &str, entry: &AuditEntry) -> Result<(), String> {
        let agent = ureq::AgentBuilder::new().timeout(FORWARD_TIMEOUT).build();
        let mut request = agent
            .post(endpoint)
            .set("Content-Type", "application/json");
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        request.send_json(entry).map(|_| ()).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry() -> AuditEntry {
        AuditEntry::new(
            "INPUT_CHECK",
            RiskLevel::Low,
            Verdict::Allowed,
            json!({"session_id": "s1", "has_pii": false}),
        )
    }

    #[test]
    fn test_entry_serializes() {
        let json = serde_json::to_string(&entry()).unwrap();
        assert!(json.contains("\"event_type\":\"INPUT_CHECK\""));
        assert!(json.contains("\"risk_level\":\"LOW\""));
        assert!(json.contains("\"decision\":\"ALLOWED\""));
        assert!(json.contains("\"model_version\""));
    }

    #[test]
    fn test_record_appends_one_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.log");
        let sink = AuditSink::new(path.clone(), None, None);

        sink.record(&entry()).unwrap();
        sink.record(&entry()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: Value = serde_json::from_str(line).unwrap();
            assert_eq!(parsed["event_type"], "INPUT_CHECK");
        }
    }

    #[test]
    fn test_parent_dir_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/audit.log");
        let sink = AuditSink::new(path.clone(), None, None);
        sink.record(&entry()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_unwritable_path_is_fatal() {
        let dir = TempDir::new().unwrap();
        // A directory at the log path makes the open fail
        let path = dir.path().join("audit.log");
        fs::create_dir(&path).unwrap();
        let sink = AuditSink::new(path, None, None);
        assert!(sink.record(&entry()).is_err());
    }

    #[test]
    fn test_forward_failure_swallowed_and_logged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.log");
        // Nothing listens on port 9; the connection is refused immediately
        let sink = AuditSink::new(
            path.clone(),
            Some("http://127.0.0.1:9/audit".to_string()),
            Some("tok".to_string()),
        );

        sink.record(&entry()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let secondary: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(secondary["event_type"], "AUDIT_FORWARD_FAILURE");
    }
}
