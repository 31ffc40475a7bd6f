//! Policy decision types and the exit-code contract.

use crate::audit::AuditEntry;
use std::process::ExitCode;

/// What the host should do with the intercepted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Let the event proceed.
    Allow,
    /// Governance block: PII present or a high-risk denial.
    Block,
    /// Guardrail trip: catastrophic command, distinct from governance.
    HardBlock,
}

impl Action {
    /// The exit code the host interprets: 0 allow, 1 governance block,
    /// 2 hard guardrail block.
    pub fn exit_code(self) -> ExitCode {
        match self {
            Action::Allow => ExitCode::SUCCESS,
            Action::Block => ExitCode::from(1),
            Action::HardBlock => ExitCode::from(2),
        }
    }

    pub fn is_blocked(self) -> bool {
        !matches!(self, Action::Allow)
    }
}

/// A handler's verdict plus everything the process boundary must surface:
/// audit entries in emission order and stderr alert lines. Keeping these
/// as data keeps the policy logic testable without spawning processes.
#[derive(Debug)]
pub struct Outcome {
    pub action: Action,
    pub entries: Vec<AuditEntry>,
    pub alerts: Vec<String>,
}

impl Outcome {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            entries: Vec::new(),
            alerts: Vec::new(),
        }
    }

    pub fn with_entry(mut self, entry: AuditEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn with_alert(mut self, alert: impl Into<String>) -> Self {
        self.alerts.push(alert.into());
        self
    }
}
